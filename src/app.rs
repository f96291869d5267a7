use crate::assets::Assets;
use crate::compositor::Compositor;
use crate::config::{Config, RenderMode};
use crate::input::{collect_input_nonblocking, HostEvent};
use crate::interaction::handle_click;
use crate::render::{draw_text, Terminal};
use crate::sim::Companion;
use crossterm::style::Color;
use std::time::{Duration, Instant};

pub(crate) struct App {
    cfg: Config,
    fps: u32,
    companion: Companion,
    compositor: Compositor,
    assets: Assets,
    term: Terminal,
    should_quit: bool,
    repaint: bool,
}

impl App {
    fn init(cfg: Config, fps: u32) -> anyhow::Result<Self> {
        let assets = match &cfg.asset_dir {
            Some(dir) => Assets::load(dir, &cfg.attributes),
            None => Assets::builtin(&cfg.attributes, cfg.layout.width, cfg.layout.height),
        };
        let companion = Companion::new(&cfg);
        let compositor = Compositor::new(cfg.layout.clone());
        let term = Terminal::begin(cfg.render_mode, cfg.layout.width, cfg.layout.height)?;

        Ok(Self {
            fps,
            companion,
            compositor,
            assets,
            term,
            should_quit: false,
            repaint: true,
            cfg,
        })
    }

    fn run(&mut self) -> anyhow::Result<()> {
        let fps = self.fps.clamp(10, 240);
        let frame_dt = Duration::from_secs_f32(1.0 / fps as f32);
        let sim_step = Duration::from_millis(self.cfg.tick_interval_ms);

        let mut last_frame = Instant::now();
        let mut sim_accum = Duration::ZERO;

        while !self.should_quit {
            if self.term.resize_if_needed()? {
                self.repaint = true;
            }

            // input
            for ev in collect_input_nonblocking(frame_dt)? {
                match ev {
                    HostEvent::Quit => {
                        self.should_quit = true;
                        break;
                    }
                    HostEvent::Resize => self.repaint = true,
                    HostEvent::Click { col, row } => {
                        let p = self.term.click_point(col, row);
                        handle_click(p, self.compositor.hit_regions(), &mut self.companion);
                    }
                }
            }

            // sim fixed-step; every completed tick asks for one repaint
            let now = Instant::now();
            sim_accum = sim_accum.saturating_add(now.saturating_duration_since(last_frame));
            last_frame = now;

            while sim_accum >= sim_step {
                self.companion.tick();
                sim_accum = sim_accum.saturating_sub(sim_step);
                self.repaint = true;
            }

            if self.repaint {
                self.render_frame()?;
                self.repaint = false;
            }

            spin_sleep(frame_dt, Instant::now());
        }

        self.term.end()?;
        log::info!(
            "shutting down after {} ticks, {} frames",
            self.companion.ticks(),
            self.compositor.frames()
        );
        Ok(())
    }

    fn render_frame(&mut self) -> anyhow::Result<()> {
        let now = chrono::Local::now().time();
        self.compositor
            .render_frame(&mut self.term.canvas, &mut self.companion, &self.assets, now);
        self.term.encode();

        if self.cfg.hud {
            self.draw_hud();
        }

        self.term.present(true)?;
        Ok(())
    }

    fn draw_hud(&mut self) {
        let mut line = format!("{:?}", self.companion.mood());
        for a in self.companion.store().attributes() {
            line.push_str(&format!("  {} {}/{}", a.name, a.current.min(a.max), a.max));
        }
        line.push_str("  | click a ring to care, q quits");
        let y = self.term.rows.saturating_sub(1);
        let fg = match self.cfg.render_mode {
            RenderMode::HalfBlock => Color::White,
            RenderMode::Braille => Color::Grey,
        };
        draw_text(&mut self.term.cur, 0, y, &line, fg, Color::Black);
    }
}

pub(crate) fn run(cfg: Config, fps: u32) -> anyhow::Result<()> {
    log::info!(
        "starting: {} attributes, tick {} ms, {:?} motion, {:?} rendering",
        cfg.attributes.len(),
        cfg.tick_interval_ms,
        cfg.motion.mode,
        cfg.render_mode
    );
    let mut app = App::init(cfg, fps)?;
    let result = app.run();
    if result.is_err() {
        let _ = app.term.end();
    }
    result
}

/* -----------------------------
   Frame pacing helper
------------------------------ */

fn spin_sleep(target: Duration, now: Instant) {
    let end = now + target;
    loop {
        let t = Instant::now();
        if t >= end {
            break;
        }
        let left = end - t;
        if left > Duration::from_millis(2) {
            std::thread::sleep(Duration::from_millis(1));
        } else {
            std::hint::spin_loop();
        }
    }
}
