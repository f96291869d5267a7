use crate::assets::{Assets, Bitmap};
use crate::config::LayoutConfig;
use crate::layout::{self, ArcStroke, HitRegion, Rect};
use crate::render::Pixel;
use crate::sim::Companion;
use chrono::{NaiveTime, Timelike};
use rand::Rng;

/// 2D drawing target in logical face coordinates.
pub(crate) trait Surface {
    fn clear(&mut self);
    fn draw_image(&mut self, img: &Bitmap, dst: Rect, flip_x: bool);
    fn stroke_arc(&mut self, arc: &ArcStroke, color: Pixel);
    fn measure_text(&self, text: &str, size: f32) -> f32;
    fn fill_text(&mut self, text: &str, x: f32, baseline: f32, size: f32, color: Pixel);
}

/// Paints whole frames back to front and keeps the hit regions of the last
/// completed frame.
pub(crate) struct Compositor {
    cfg: LayoutConfig,
    blink: bool,
    regions: Vec<HitRegion>,
    frames: u64,
}

impl Compositor {
    pub(crate) fn new(cfg: LayoutConfig) -> Self {
        Self {
            cfg,
            blink: false,
            regions: Vec::new(),
            frames: 0,
        }
    }

    pub(crate) fn frames(&self) -> u64 {
        self.frames
    }

    /// Regions from the most recent `render_frame`; empty before the first.
    pub(crate) fn hit_regions(&self) -> &[HitRegion] {
        &self.regions
    }

    pub(crate) fn render_frame<S: Surface, R: Rng>(
        &mut self,
        surface: &mut S,
        companion: &mut Companion<R>,
        assets: &Assets,
        now: NaiveTime,
    ) {
        surface.clear();

        if let Some(bg) = assets.background.get() {
            surface.draw_image(
                bg,
                Rect {
                    x: 0.0,
                    y: 0.0,
                    w: bg.w as f32,
                    h: bg.h as f32,
                },
                false,
            );
        }

        self.draw_time(surface, now);

        let face = companion.next_face(&assets.faces).and_then(|h| h.get());
        self.draw_creature(surface, companion, assets.body.get(), face);

        self.draw_indicators(surface, companion, assets);
        self.frames += 1;
    }

    fn draw_time<S: Surface>(&mut self, surface: &mut S, now: NaiveTime) {
        self.blink = !self.blink;
        let text = layout::time_text(now.hour(), now.minute(), self.blink);
        let width = surface.measure_text(&text, self.cfg.time_px);
        surface.fill_text(
            &text,
            layout::centered_x(&self.cfg, width),
            self.cfg.time_y,
            self.cfg.time_px,
            layout::TEXT,
        );
    }

    fn draw_creature<S: Surface, R: Rng>(
        &self,
        surface: &mut S,
        companion: &Companion<R>,
        body: Option<&Bitmap>,
        face: Option<&Bitmap>,
    ) {
        let size = |b: &Bitmap| (b.w as f32, b.h as f32);
        let Some(reference) = body.or(face).map(size) else {
            return;
        };
        let motion = companion.motion();
        let place = layout::creature(
            &self.cfg,
            motion.position(),
            motion.scale(),
            motion.facing(),
            reference,
            face.map(size).unwrap_or(reference),
        );
        if let Some(b) = body {
            surface.draw_image(b, place.body, place.flip_x);
        }
        if let Some(f) = face {
            surface.draw_image(f, place.face, place.flip_x);
        }
    }

    fn draw_indicators<S: Surface, R: Rng>(
        &mut self,
        surface: &mut S,
        companion: &Companion<R>,
        assets: &Assets,
    ) {
        let attrs = companion.store().attributes();
        let mut regions = Vec::with_capacity(attrs.len());
        for ind in layout::indicators(&self.cfg, attrs, self.blink) {
            surface.stroke_arc(
                &ind.track,
                Pixel {
                    a: ind.track_alpha,
                    ..ind.color
                },
            );
            if ind.fill.sweep() > 0.0 {
                surface.stroke_arc(&ind.fill, ind.color);
            }
            if let Some(icon) = assets.icons.get(ind.attribute).and_then(|h| h.get()) {
                surface.draw_image(icon, ind.icon, false);
            }
            regions.push(ind.hit);
        }
        self.regions = regions;
    }
}
