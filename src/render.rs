use crate::assets::Bitmap;
use crate::compositor::Surface;
use crate::config::RenderMode;
use crate::layout::{ArcStroke, Point, Rect};
use crossterm::{
    cursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::f32::consts::TAU;
use std::io::{self, Write};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Cell {
    pub(crate) ch: char,
    pub(crate) fg: Color,
    pub(crate) bg: Color,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Color::White,
            bg: Color::Black,
        }
    }
}

pub(crate) struct CellBuffer {
    pub(crate) w: u16,
    pub(crate) h: u16,
    pub(crate) cells: Vec<Cell>,
}

impl CellBuffer {
    pub(crate) fn new(w: u16, h: u16) -> Self {
        Self {
            w,
            h,
            cells: vec![Cell::default(); (w as usize) * (h as usize)],
        }
    }
    pub(crate) fn idx(&self, x: u16, y: u16) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }
    #[cfg(test)]
    pub(crate) fn get(&self, x: u16, y: u16) -> Cell {
        self.cells[self.idx(x, y)]
    }
    pub(crate) fn set(&mut self, x: u16, y: u16, c: Cell) {
        if x < self.w && y < self.h {
            let i = self.idx(x, y);
            self.cells[i] = c;
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Pixel {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

impl Pixel {
    /// Colour over black, alpha folded in.
    fn flatten(self) -> (u8, u8, u8) {
        let a = self.a as u32;
        (
            (self.r as u32 * a / 255) as u8,
            (self.g as u32 * a / 255) as u8,
            (self.b as u32 * a / 255) as u8,
        )
    }

    fn luma(self) -> f32 {
        let (r, g, b) = self.flatten();
        (0.2126 * r as f32 + 0.7152 * g as f32 + 0.0722 * b as f32) / 255.0
    }
}

/* -----------------------------
   Logical face -> device pixels
------------------------------ */

/// Uniform scale plus centring offset from the logical face to the canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ViewTransform {
    pub(crate) scale: f32,
    pub(crate) ox: f32,
    pub(crate) oy: f32,
}

impl ViewTransform {
    pub(crate) fn fit(logical_w: f32, logical_h: f32, device_w: u32, device_h: u32) -> Self {
        let scale = (device_w as f32 / logical_w).min(device_h as f32 / logical_h);
        Self {
            scale,
            ox: (device_w as f32 - logical_w * scale) / 2.0,
            oy: (device_h as f32 - logical_h * scale) / 2.0,
        }
    }

    pub(crate) fn to_device(&self, x: f32, y: f32) -> (f32, f32) {
        (self.ox + x * self.scale, self.oy + y * self.scale)
    }

    pub(crate) fn to_logical(&self, dx: f32, dy: f32) -> Point {
        if self.scale <= 0.0 {
            return Point { x: -1.0, y: -1.0 };
        }
        Point {
            x: (dx - self.ox) / self.scale,
            y: (dy - self.oy) / self.scale,
        }
    }
}

pub(crate) struct PixelCanvas {
    pub(crate) w: u32,
    pub(crate) h: u32,
    pub(crate) px: Vec<Pixel>,
    pub(crate) view: ViewTransform,
}

impl PixelCanvas {
    pub(crate) fn new(w: u32, h: u32, logical_w: f32, logical_h: f32) -> Self {
        Self {
            w,
            h,
            px: vec![Pixel::default(); (w as usize) * (h as usize)],
            view: ViewTransform::fit(logical_w, logical_h, w, h),
        }
    }
    pub(crate) fn idx(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }
    pub(crate) fn get(&self, x: u32, y: u32) -> Pixel {
        if x >= self.w || y >= self.h {
            return Pixel::default();
        }
        self.px[self.idx(x, y)]
    }
    fn blend_over(&mut self, x: i32, y: i32, src: Pixel) {
        if x < 0 || y < 0 || src.a == 0 {
            return;
        }
        let (x, y) = (x as u32, y as u32);
        if x >= self.w || y >= self.h {
            return;
        }
        let i = self.idx(x, y);
        let dst = self.px[i];

        let sa = src.a as f32 / 255.0;
        let da = dst.a as f32 / 255.0;

        let out_a = sa + da * (1.0 - sa);
        if out_a <= 1e-6 {
            self.px[i] = Pixel::default();
            return;
        }

        let blend = |sc: u8, dc: u8| -> u8 {
            let sc = sc as f32 / 255.0;
            let dc = dc as f32 / 255.0;
            let out = (sc * sa + dc * da * (1.0 - sa)) / out_a;
            (out.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
        };

        self.px[i] = Pixel {
            r: blend(src.r, dst.r),
            g: blend(src.g, dst.g),
            b: blend(src.b, dst.b),
            a: (out_a.clamp(0.0, 1.0) * 255.0 + 0.5) as u8,
        };
    }

    /// Device pixel span covering a logical rect, clipped to the canvas.
    fn device_span(&self, r: Rect) -> (i32, i32, i32, i32, f32, f32, f32, f32) {
        let (x0, y0) = self.view.to_device(r.x, r.y);
        let (dw, dh) = (r.w * self.view.scale, r.h * self.view.scale);
        let ix0 = x0.floor().max(0.0) as i32;
        let iy0 = y0.floor().max(0.0) as i32;
        let ix1 = ((x0 + dw).ceil() as i32).min(self.w as i32);
        let iy1 = ((y0 + dh).ceil() as i32).min(self.h as i32);
        (ix0, iy0, ix1, iy1, x0, y0, dw, dh)
    }

    fn fill_rect(&mut self, r: Rect, color: Pixel) {
        let (ix0, iy0, ix1, iy1, ..) = self.device_span(r);
        for y in iy0..iy1 {
            for x in ix0..ix1 {
                self.blend_over(x, y, color);
            }
        }
    }
}

impl Surface for PixelCanvas {
    fn clear(&mut self) {
        self.px.fill(Pixel::default());
    }

    fn draw_image(&mut self, img: &Bitmap, dst: Rect, flip_x: bool) {
        if img.w == 0 || img.h == 0 || dst.w <= 0.0 || dst.h <= 0.0 {
            return;
        }
        let (ix0, iy0, ix1, iy1, x0, y0, dw, dh) = self.device_span(dst);
        for y in iy0..iy1 {
            let v = ((y as f32 + 0.5 - y0) / dh * img.h as f32).floor();
            if v < 0.0 || v >= img.h as f32 {
                continue;
            }
            for x in ix0..ix1 {
                let u = ((x as f32 + 0.5 - x0) / dw * img.w as f32).floor();
                if u < 0.0 || u >= img.w as f32 {
                    continue;
                }
                let u = if flip_x { img.w - 1 - u as u32 } else { u as u32 };
                self.blend_over(x, y, img.get(u, v as u32));
            }
        }
    }

    fn stroke_arc(&mut self, arc: &ArcStroke, color: Pixel) {
        let sweep = arc.sweep();
        if sweep <= 0.0 {
            return;
        }
        let (cx, cy) = self.view.to_device(arc.cx, arc.cy);
        let r = arc.radius * self.view.scale;
        let half = (arc.line_width * self.view.scale / 2.0).max(0.5);
        let outer = r + half;

        let x0 = (cx - outer).floor() as i32;
        let x1 = (cx + outer).ceil() as i32;
        let y0 = (cy - outer).floor() as i32;
        let y1 = (cy + outer).ceil() as i32;
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                let d = (dx * dx + dy * dy).sqrt();
                if (d - r).abs() > half {
                    continue;
                }
                if sweep < TAU {
                    let rel = (dy.atan2(dx) - arc.start).rem_euclid(TAU);
                    if rel > sweep {
                        continue;
                    }
                }
                self.blend_over(x, y, color);
            }
        }
    }

    fn measure_text(&self, text: &str, size: f32) -> f32 {
        font::text_width(text, size)
    }

    fn fill_text(&mut self, text: &str, x: f32, baseline: f32, size: f32, color: Pixel) {
        let dot = font::dot(size);
        let top = baseline - font::ROWS as f32 * dot;
        let mut pen = x;
        for ch in text.chars() {
            let rows = font::glyph(ch);
            for (gy, bits) in rows.iter().enumerate() {
                for gx in 0..font::COLS {
                    if bits & (1 << (font::COLS - 1 - gx)) == 0 {
                        continue;
                    }
                    self.fill_rect(
                        Rect {
                            x: pen + gx as f32 * dot,
                            y: top + gy as f32 * dot,
                            w: dot,
                            h: dot,
                        },
                        color,
                    );
                }
            }
            pen += font::advance(size);
        }
    }
}

/* -----------------------------
   5×7 clock digits
------------------------------ */

mod font {
    pub(super) const COLS: usize = 5;
    pub(super) const ROWS: usize = 7;

    /// One dot is an eighth of the em size; glyphs are 7 dots tall.
    pub(super) fn dot(size: f32) -> f32 {
        size / 8.0
    }

    pub(super) fn advance(size: f32) -> f32 {
        dot(size) * (COLS as f32 + 1.0)
    }

    pub(super) fn text_width(text: &str, size: f32) -> f32 {
        let n = text.chars().count();
        if n == 0 {
            return 0.0;
        }
        advance(size) * n as f32 - dot(size)
    }

    pub(super) fn glyph(ch: char) -> [u8; ROWS] {
        match ch {
            '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
            '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
            '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
            '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
            '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
            '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
            '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
            '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
            '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
            '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
            ':' => [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00],
            _ => [0; ROWS],
        }
    }
}

/* -----------------------------
   Canvas -> terminal cells
------------------------------ */

/// Device pixels per terminal cell for each encoding.
pub(crate) fn cell_pixels(mode: RenderMode) -> (u32, u32) {
    match mode {
        RenderMode::HalfBlock => (1, 2),
        RenderMode::Braille => (2, 4),
    }
}

/// Logical face point under the centre of terminal cell `(col, row)`.
pub(crate) fn cell_to_logical(view: &ViewTransform, mode: RenderMode, col: u16, row: u16) -> Point {
    let (pw, ph) = cell_pixels(mode);
    let dx = col as f32 * pw as f32 + pw as f32 / 2.0;
    let dy = row as f32 * ph as f32 + ph as f32 / 2.0;
    view.to_logical(dx, dy)
}

fn rgb(p: Pixel) -> Color {
    let (r, g, b) = p.flatten();
    Color::Rgb { r, g, b }
}

/// Upper half block: foreground is the top pixel, background the bottom one.
pub(crate) fn canvas_to_half_blocks(canvas: &PixelCanvas, out: &mut CellBuffer) {
    for cy in 0..out.h {
        for cx in 0..out.w {
            let top = canvas.get(cx as u32, cy as u32 * 2);
            let bottom = canvas.get(cx as u32, cy as u32 * 2 + 1);
            out.set(
                cx,
                cy,
                Cell {
                    ch: '▀',
                    fg: rgb(top),
                    bg: rgb(bottom),
                },
            );
        }
    }
}

fn braille_bit(dx: u32, dy: u32) -> u8 {
    // Dot mapping:
    // (0,0)=1 (0,1)=2 (0,2)=4 (0,3)=64
    // (1,0)=8 (1,1)=16 (1,2)=32 (1,3)=128
    match (dx, dy) {
        (0, 0) => 0x01,
        (0, 1) => 0x02,
        (0, 2) => 0x04,
        (0, 3) => 0x40,
        (1, 0) => 0x08,
        (1, 1) => 0x10,
        (1, 2) => 0x20,
        (1, 3) => 0x80,
        _ => 0x00,
    }
}

fn bayer_2x4_threshold(dx: u32, dy: u32) -> f32 {
    const M: [[u8; 2]; 4] = [[0, 4], [6, 2], [1, 5], [7, 3]];
    let v = M[(dy & 3) as usize][(dx & 1) as usize] as f32;
    (v + 0.5) / 8.0
}

/// Dots lit by ordered dither on luminance; the cell takes the mean lit colour.
pub(crate) fn canvas_to_braille(canvas: &PixelCanvas, out: &mut CellBuffer) {
    for cy in 0..out.h as u32 {
        for cx in 0..out.w as u32 {
            let mut mask: u8 = 0;
            let (mut sr, mut sg, mut sb, mut n) = (0u32, 0u32, 0u32, 0u32);

            for dy in 0..4 {
                for dx in 0..2 {
                    let p = canvas.get(cx * 2 + dx, cy * 4 + dy);
                    if p.luma() > bayer_2x4_threshold(dx, dy) {
                        mask |= braille_bit(dx, dy);
                        let (r, g, b) = p.flatten();
                        sr += r as u32;
                        sg += g as u32;
                        sb += b as u32;
                        n += 1;
                    }
                }
            }

            let ch = char::from_u32(0x2800 + mask as u32).unwrap_or(' ');
            let fg = if n > 0 {
                Color::Rgb {
                    r: (sr / n) as u8,
                    g: (sg / n) as u8,
                    b: (sb / n) as u8,
                }
            } else {
                Color::White
            };
            out.set(
                cx as u16,
                cy as u16,
                Cell {
                    ch,
                    fg,
                    bg: Color::Black,
                },
            );
        }
    }
}

pub(crate) fn draw_text(buf: &mut CellBuffer, x: u16, y: u16, s: &str, fg: Color, bg: Color) {
    for (i, ch) in s.chars().enumerate() {
        let xx = x.saturating_add(i as u16);
        if xx >= buf.w || y >= buf.h {
            break;
        }
        buf.set(
            xx,
            y,
            Cell {
                ch,
                fg,
                bg,
            },
        );
    }
}

/* -----------------------------
   Terminal (diffed presentation)
------------------------------ */

pub(crate) struct Terminal {
    pub(crate) out: io::Stdout,
    pub(crate) cols: u16,
    pub(crate) rows: u16,
    pub(crate) mode: RenderMode,
    pub(crate) prev: CellBuffer,
    pub(crate) cur: CellBuffer,
    pub(crate) canvas: PixelCanvas,
    logical: (f32, f32),
}

impl Terminal {
    pub(crate) fn begin(mode: RenderMode, logical_w: f32, logical_h: f32) -> anyhow::Result<Self> {
        let mut out = io::stdout();
        execute!(
            out,
            EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            DisableLineWrap,
            terminal::Clear(ClearType::All)
        )?;
        terminal::enable_raw_mode()?;

        let (cols, rows) = terminal::size()?;
        let (pw, ph) = cell_pixels(mode);
        Ok(Self {
            out,
            cols,
            rows,
            mode,
            prev: CellBuffer::new(cols, rows),
            cur: CellBuffer::new(cols, rows),
            canvas: PixelCanvas::new(cols as u32 * pw, rows as u32 * ph, logical_w, logical_h),
            logical: (logical_w, logical_h),
        })
    }

    pub(crate) fn end(&mut self) -> anyhow::Result<()> {
        queue!(
            self.out,
            BeginSynchronizedUpdate,
            ResetColor,
            Clear(ClearType::All),
            cursor::Show,
            EnableLineWrap,
            EndSynchronizedUpdate,
            DisableMouseCapture,
            LeaveAlternateScreen
        )?;
        self.out.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    pub(crate) fn resize_if_needed(&mut self) -> anyhow::Result<bool> {
        let (c, r) = terminal::size()?;
        if c == self.cols && r == self.rows {
            return Ok(false);
        }
        log::debug!("resize {}x{} -> {}x{}", self.cols, self.rows, c, r);
        self.cols = c;
        self.rows = r;
        self.prev = CellBuffer::new(c, r);
        self.cur = CellBuffer::new(c, r);
        let (pw, ph) = cell_pixels(self.mode);
        self.canvas = PixelCanvas::new(c as u32 * pw, r as u32 * ph, self.logical.0, self.logical.1);
        Ok(true)
    }

    /// Encode the canvas into the current cell buffer.
    pub(crate) fn encode(&mut self) {
        match self.mode {
            RenderMode::HalfBlock => canvas_to_half_blocks(&self.canvas, &mut self.cur),
            RenderMode::Braille => canvas_to_braille(&self.canvas, &mut self.cur),
        }
    }

    pub(crate) fn click_point(&self, col: u16, row: u16) -> Point {
        cell_to_logical(&self.canvas.view, self.mode, col, row)
    }

    pub(crate) fn present(&mut self, diff_only: bool) -> anyhow::Result<()> {
        queue!(self.out, BeginSynchronizedUpdate)?;

        let mut last_fg = None;
        let mut last_bg = None;

        for y in 0..self.rows {
            for x in 0..self.cols {
                let i = self.cur.idx(x, y);
                let c = self.cur.cells[i];
                if diff_only && c == self.prev.cells[i] {
                    continue;
                }

                queue!(self.out, cursor::MoveTo(x, y))?;

                if last_fg != Some(c.fg) {
                    queue!(self.out, SetForegroundColor(c.fg))?;
                    last_fg = Some(c.fg);
                }
                if last_bg != Some(c.bg) {
                    queue!(self.out, SetBackgroundColor(c.bg))?;
                    last_bg = Some(c.bg);
                }

                queue!(self.out, Print(c.ch))?;
            }
        }

        queue!(self.out, ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()?;
        self.prev.cells.copy_from_slice(&self.cur.cells);
        Ok(())
    }
}
