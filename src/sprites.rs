//! Procedural stand-ins for the image assets, used when no asset directory is
//! configured. Sizes are in logical face units.

use crate::assets::Bitmap;
use crate::render::Pixel;

pub(crate) const BODY_W: u32 = 120;
pub(crate) const BODY_H: u32 = 100;
const ICON: u32 = 64;

const INK: Pixel = Pixel { r: 20, g: 16, b: 28, a: 255 };
const BLUSH: Pixel = Pixel { r: 255, g: 120, b: 150, a: 150 };
const TEAR: Pixel = Pixel { r: 110, g: 170, b: 255, a: 230 };

fn fill(b: &mut Bitmap, inside: impl Fn(f32, f32) -> bool, col: Pixel) {
    for y in 0..b.h as i32 {
        for x in 0..b.w as i32 {
            if inside(x as f32 + 0.5, y as f32 + 0.5) {
                b.set(x, y, col);
            }
        }
    }
}

fn disc(b: &mut Bitmap, cx: f32, cy: f32, r: f32, col: Pixel) {
    fill(b, |x, y| (x - cx).powi(2) + (y - cy).powi(2) <= r * r, col);
}

fn ellipse(b: &mut Bitmap, cx: f32, cy: f32, rx: f32, ry: f32, col: Pixel) {
    fill(
        b,
        |x, y| ((x - cx) / rx).powi(2) + ((y - cy) / ry).powi(2) <= 1.0,
        col,
    );
}

/// Parabolic stroke; positive `bend` smiles, negative frowns.
fn curve(b: &mut Bitmap, cx: f32, cy: f32, w: f32, bend: f32, thick: f32, col: Pixel) {
    let steps = (w * 2.0) as i32;
    for i in 0..=steps {
        let t = i as f32 / steps as f32 * 2.0 - 1.0;
        let x = cx + t * w / 2.0;
        let y = cy + bend * (1.0 - t * t);
        disc(b, x, y, thick / 2.0, col);
    }
}

pub(crate) fn body() -> Bitmap {
    let mut b = Bitmap::new(BODY_W, BODY_H);
    let w = BODY_W as f32;
    let h = BODY_H as f32;
    let shell = Pixel { r: 250, g: 196, b: 120, a: 255 };
    let belly = Pixel { r: 255, g: 228, b: 180, a: 255 };
    ellipse(&mut b, w * 0.25, h * 0.92, w * 0.12, h * 0.07, shell);
    ellipse(&mut b, w * 0.75, h * 0.92, w * 0.12, h * 0.07, shell);
    ellipse(&mut b, w / 2.0, h * 0.5, w * 0.46, h * 0.42, shell);
    ellipse(&mut b, w / 2.0, h * 0.66, w * 0.28, h * 0.2, belly);
    ellipse(&mut b, w * 0.97, h * 0.52, w * 0.06, h * 0.1, shell);
    b
}

fn face_base() -> Bitmap {
    Bitmap::new(BODY_W, BODY_H)
}

fn dot_eyes(b: &mut Bitmap) {
    disc(b, 42.0, 44.0, 5.0, INK);
    disc(b, 78.0, 44.0, 5.0, INK);
}

fn blush(b: &mut Bitmap) {
    ellipse(b, 30.0, 58.0, 7.0, 4.0, BLUSH);
    ellipse(b, 90.0, 58.0, 7.0, 4.0, BLUSH);
}

pub(crate) fn happy_faces() -> Vec<Bitmap> {
    let mut a = face_base();
    dot_eyes(&mut a);
    blush(&mut a);
    curve(&mut a, 60.0, 58.0, 22.0, 6.0, 3.0, INK);

    let mut b = face_base();
    curve(&mut b, 42.0, 46.0, 12.0, -5.0, 3.0, INK);
    curve(&mut b, 78.0, 46.0, 12.0, -5.0, 3.0, INK);
    blush(&mut b);
    curve(&mut b, 60.0, 58.0, 24.0, 7.0, 3.0, INK);

    let mut c = face_base();
    dot_eyes(&mut c);
    blush(&mut c);
    ellipse(&mut c, 60.0, 64.0, 8.0, 7.0, INK);
    ellipse(&mut c, 60.0, 67.0, 5.0, 3.0, BLUSH);

    vec![a, b, c]
}

pub(crate) fn sad_faces() -> Vec<Bitmap> {
    let mut a = face_base();
    dot_eyes(&mut a);
    curve(&mut a, 60.0, 66.0, 22.0, -6.0, 3.0, INK);

    let mut b = face_base();
    curve(&mut b, 42.0, 42.0, 12.0, 3.0, 3.0, INK);
    curve(&mut b, 78.0, 42.0, 12.0, 3.0, 3.0, INK);
    ellipse(&mut b, 40.0, 56.0, 3.0, 5.0, TEAR);
    curve(&mut b, 60.0, 68.0, 20.0, -5.0, 3.0, INK);

    vec![a, b]
}

pub(crate) fn background(w: u32, h: u32) -> Bitmap {
    let mut b = Bitmap::new(w, h);
    let horizon = h as f32 * 0.72;
    for y in 0..h {
        let t = y as f32 / h.max(1) as f32;
        let col = if (y as f32) < horizon {
            Pixel {
                r: (18.0 + 40.0 * t) as u8,
                g: (22.0 + 30.0 * t) as u8,
                b: (60.0 + 70.0 * t) as u8,
                a: 255,
            }
        } else {
            Pixel {
                r: 40,
                g: (90.0 + 40.0 * (1.0 - t)) as u8,
                b: 60,
                a: 255,
            }
        };
        for x in 0..w {
            b.set(x as i32, y as i32, col);
        }
    }
    b
}

/// Icons for the stock attributes; anything else gets a plain badge.
pub(crate) fn icon(attribute: &str) -> Bitmap {
    let mut b = Bitmap::new(ICON, ICON);
    let s = ICON as f32;
    match attribute {
        "energy" => {
            let col = Pixel { r: 255, g: 255, b: 125, a: 255 };
            let bolt = [
                (0.58, 0.05),
                (0.22, 0.55),
                (0.48, 0.55),
                (0.38, 0.95),
                (0.78, 0.40),
                (0.52, 0.40),
            ];
            let poly: Vec<(f32, f32)> = bolt.iter().map(|(x, y)| (x * s, y * s)).collect();
            fill(&mut b, |x, y| point_in_polygon(&poly, x, y), col);
        }
        "happiness" => {
            let col = Pixel { r: 125, g: 255, b: 125, a: 255 };
            fill(
                &mut b,
                |x, y| {
                    let u = (x / s - 0.5) * 2.6;
                    let v = (0.5 - y / s) * 2.6;
                    (u * u + v * v - 1.0).powi(3) - u * u * v.powi(3) <= 0.0
                },
                col,
            );
        }
        "social" => {
            let col = Pixel { r: 255, g: 125, b: 125, a: 255 };
            disc(&mut b, s * 0.32, s * 0.3, s * 0.13, col);
            disc(&mut b, s * 0.68, s * 0.3, s * 0.13, col);
            ellipse(&mut b, s * 0.32, s * 0.75, s * 0.2, s * 0.25, col);
            ellipse(&mut b, s * 0.68, s * 0.75, s * 0.2, s * 0.25, col);
        }
        _ => {
            let col = Pixel { r: 220, g: 220, b: 230, a: 255 };
            disc(&mut b, s / 2.0, s / 2.0, s * 0.35, col);
        }
    }
    b
}

fn point_in_polygon(poly: &[(f32, f32)], x: f32, y: f32) -> bool {
    let mut inside = false;
    let mut j = poly.len() - 1;
    for i in 0..poly.len() {
        let (xi, yi) = poly[i];
        let (xj, yj) = poly[j];
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}
