//! Per-frame geometry, computed without a drawing surface.

use crate::config::LayoutConfig;
use crate::model::Attribute;
use crate::motion::{Facing, Vec3};
use crate::render::Pixel;
use std::f32::consts::{PI, TAU};

/// Arcs start at 12 o'clock and sweep clockwise (y grows downward).
pub(crate) const ARC_START: f32 = 1.5 * PI;

pub(crate) const GREEN: Pixel = Pixel { r: 0x23, g: 0x88, b: 0x23, a: 255 };
pub(crate) const AMBER: Pixel = Pixel { r: 0xff, g: 0xd9, b: 0x00, a: 255 };
pub(crate) const RED: Pixel = Pixel { r: 0xd2, g: 0x22, b: 0x2d, a: 255 };
pub(crate) const TEXT: Pixel = Pixel { r: 255, g: 255, b: 255, a: 255 };

pub(crate) const TRACK_ALPHA: u8 = 0x22;
pub(crate) const ALARM_ALPHA: u8 = 0x99;

/// Icon side relative to the indicator radius.
const ICON_SCALE: f32 = 0.7;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Point {
    pub(crate) x: f32,
    pub(crate) y: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Rect {
    pub(crate) x: f32,
    pub(crate) y: f32,
    pub(crate) w: f32,
    pub(crate) h: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Circle {
    pub(crate) cx: f32,
    pub(crate) cy: f32,
    pub(crate) r: f32,
}

impl Circle {
    pub(crate) fn contains(&self, p: Point) -> bool {
        let dx = p.x - self.cx;
        let dy = p.y - self.cy;
        dx * dx + dy * dy <= self.r * self.r
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ArcStroke {
    pub(crate) cx: f32,
    pub(crate) cy: f32,
    pub(crate) radius: f32,
    pub(crate) start: f32,
    pub(crate) end: f32,
    pub(crate) line_width: f32,
}

impl ArcStroke {
    pub(crate) fn sweep(&self) -> f32 {
        self.end - self.start
    }
}

/// Clickable area of one indicator, valid for the frame it was laid out in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct HitRegion {
    pub(crate) attribute: usize,
    pub(crate) shape: Circle,
}

/// Hard thresholds: above 66% green, above 33% amber, red otherwise.
pub(crate) fn severity_color(fraction: f32) -> Pixel {
    if fraction > 0.66 {
        GREEN
    } else if fraction > 0.33 {
        AMBER
    } else {
        RED
    }
}

/// `HH:MM`, with the separator replaced by a space on blink frames.
pub(crate) fn time_text(hour: u32, minute: u32, blink: bool) -> String {
    let sep = if blink { ' ' } else { ':' };
    format!("{:02}{}{:02}", hour % 24, sep, minute % 60)
}

pub(crate) fn centered_x(cfg: &LayoutConfig, text_width: f32) -> f32 {
    cfg.width / 2.0 - text_width / 2.0
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct CreaturePlacement {
    pub(crate) body: Rect,
    pub(crate) face: Rect,
    pub(crate) scale: f32,
    pub(crate) flip_x: bool,
}

/// Body and face share a scale and a left edge; the body sits
/// `body_face_offset` units higher. Offsets are fractions of the sprite size.
pub(crate) fn creature(
    cfg: &LayoutConfig,
    position: Vec3,
    scale: f32,
    facing: Facing,
    body_size: (f32, f32),
    face_size: (f32, f32),
) -> CreaturePlacement {
    let (bw, bh) = (body_size.0 * scale, body_size.1 * scale);
    let cx = cfg.width / 2.0 + position.x * bw;
    let cy = cfg.creature_center_y + position.y * bh;
    let left = cx - bw / 2.0;
    let top = cy - bh / 2.0;
    CreaturePlacement {
        body: Rect {
            x: left,
            y: top - cfg.body_face_offset * scale,
            w: bw,
            h: bh,
        },
        face: Rect {
            x: left,
            y: top,
            w: face_size.0 * scale,
            h: face_size.1 * scale,
        },
        scale,
        flip_x: facing == Facing::Left,
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct IndicatorLayout {
    pub(crate) attribute: usize,
    pub(crate) color: Pixel,
    pub(crate) track: ArcStroke,
    pub(crate) track_alpha: u8,
    pub(crate) fill: ArcStroke,
    pub(crate) icon: Rect,
    pub(crate) hit: HitRegion,
}

/// Indicator rings left to right, centred as a group on the face.
///
/// A depleted attribute's track flips to `ALARM_ALPHA` on blink frames.
pub(crate) fn indicators(cfg: &LayoutConfig, attrs: &[Attribute], blink: bool) -> Vec<IndicatorLayout> {
    let r = cfg.indicator_radius;
    let step = r * 1.5;
    let mut x = cfg.width / 2.0 - (attrs.len().saturating_sub(1)) as f32 * step;
    let y = cfg.indicator_row_y;

    let mut out = Vec::with_capacity(attrs.len());
    for (i, a) in attrs.iter().enumerate() {
        let fraction = a.fraction();
        let ring = |end: f32| ArcStroke {
            cx: x,
            cy: y,
            radius: r,
            start: ARC_START,
            end,
            line_width: cfg.indicator_line_width,
        };
        let icon_r = r * ICON_SCALE;
        out.push(IndicatorLayout {
            attribute: i,
            color: severity_color(fraction),
            track: ring(ARC_START + TAU),
            track_alpha: if a.is_depleted() && blink {
                ALARM_ALPHA
            } else {
                TRACK_ALPHA
            },
            fill: ring(ARC_START + TAU * fraction),
            icon: Rect {
                x: x - icon_r,
                y: y - icon_r,
                w: 2.0 * icon_r,
                h: 2.0 * icon_r,
            },
            hit: HitRegion {
                attribute: i,
                shape: Circle { cx: x, cy: y, r },
            },
        });
        x += step * 2.0;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MoodKind;

    fn attrs() -> Vec<Attribute> {
        vec![
            Attribute::new("energy", 10, MoodKind::Tired),
            Attribute::new("happiness", 10, MoodKind::Sad),
            Attribute::new("social", 10, MoodKind::Lonely),
        ]
    }

    #[test]
    fn test_severity_bands() {
        assert_eq!(severity_color(0.70), GREEN);
        assert_eq!(severity_color(0.50), AMBER);
        assert_eq!(severity_color(0.10), RED);

        assert_eq!(severity_color(0.67), GREEN);
        assert_eq!(severity_color(0.66), AMBER);
        assert_eq!(severity_color(0.34), AMBER);
        assert_eq!(severity_color(0.33), RED);
        assert_eq!(severity_color(0.0), RED);
        assert_eq!(severity_color(1.0), GREEN);
    }

    #[test]
    fn test_time_text_blinks_separator() {
        assert_eq!(time_text(7, 5, false), "07:05");
        assert_eq!(time_text(7, 5, true), "07 05");
        assert_eq!(time_text(23, 59, false), "23:59");
    }

    #[test]
    fn test_indicators_centered_as_group() {
        let cfg = LayoutConfig::default();
        let l = indicators(&cfg, &attrs(), false);
        assert_eq!(l.len(), 3);
        let xs: Vec<f32> = l.iter().map(|i| i.hit.shape.cx).collect();
        assert_eq!(xs, vec![240.0 - 105.0, 240.0, 240.0 + 105.0]);
        assert!(l.iter().all(|i| i.hit.shape.cy == cfg.indicator_row_y));

        let single = indicators(&cfg, &attrs()[..1], false);
        assert_eq!(single[0].hit.shape.cx, 240.0);
    }

    #[test]
    fn test_fill_sweep_tracks_fraction() {
        let cfg = LayoutConfig::default();
        let mut a = attrs();
        a[0].current = 0;
        a[1].current = 5;
        let l = indicators(&cfg, &a, false);

        assert_eq!(l[0].fill.sweep(), 0.0);
        assert!((l[1].fill.sweep() - PI).abs() < 1e-5);
        assert!((l[2].fill.sweep() - TAU).abs() < 1e-5);
        for i in &l {
            assert_eq!(i.fill.start, ARC_START);
            assert_eq!(i.track.start, ARC_START);
            assert!((i.track.sweep() - TAU).abs() < 1e-5);
        }
        assert_eq!(l[0].color, RED);
        assert_eq!(l[1].color, AMBER);
        assert_eq!(l[2].color, GREEN);
    }

    #[test]
    fn test_depleted_track_pulses_with_blink() {
        let cfg = LayoutConfig::default();
        let mut a = attrs();
        a[1].current = 0;
        let on = indicators(&cfg, &a, true);
        let off = indicators(&cfg, &a, false);
        assert_eq!(on[1].track_alpha, ALARM_ALPHA);
        assert_eq!(off[1].track_alpha, TRACK_ALPHA);
        assert_eq!(on[0].track_alpha, TRACK_ALPHA);
        assert_eq!(on[2].track_alpha, TRACK_ALPHA);
    }

    #[test]
    fn test_hit_regions_do_not_overlap() {
        let cfg = LayoutConfig::default();
        let l = indicators(&cfg, &attrs(), false);
        let p = Point { x: l[1].hit.shape.cx + 20.0, y: l[1].hit.shape.cy - 10.0 };
        let hits: Vec<usize> = l.iter().filter(|i| i.hit.shape.contains(p)).map(|i| i.attribute).collect();
        assert_eq!(hits, vec![1]);
    }

    #[test]
    fn test_creature_placement() {
        let cfg = LayoutConfig::default();
        let p = creature(
            &cfg,
            Vec3 { x: 0.0, y: 0.0, z: 1.0 },
            1.0,
            Facing::Right,
            (120.0, 100.0),
            (120.0, 100.0),
        );
        assert_eq!(p.face, Rect { x: 180.0, y: 330.0, w: 120.0, h: 100.0 });
        assert_eq!(p.body.y, 310.0);
        assert_eq!(p.body.x, p.face.x);
        assert!(!p.flip_x);

        let q = creature(
            &cfg,
            Vec3 { x: 0.25, y: 0.0, z: 0.5 },
            2.0,
            Facing::Left,
            (120.0, 100.0),
            (120.0, 100.0),
        );
        assert_eq!(q.face.w, 240.0);
        assert_eq!(q.body.y, q.face.y - 40.0);
        assert_eq!(q.face.x + q.face.w / 2.0, 240.0 + 60.0);
        assert!(q.flip_x);
    }
}
