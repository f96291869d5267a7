use crate::config::{AxisBounds, MotionConfig, MotionMode};
use crate::model::MoodKind;
use rand::Rng;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Vec3 {
    pub(crate) x: f32,
    pub(crate) y: f32,
    pub(crate) z: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Facing {
    Left,
    Right,
}

/// Per-axis direction, each component in {-1, 0, +1}.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Direction {
    pub(crate) x: i8,
    pub(crate) y: i8,
    pub(crate) z: i8,
}

/// Constrained random walk. Moves only while the companion is content.
///
/// Directions are re-rolled every `re_roll_period + 1` active ticks. Hitting a
/// bound clamps the axis without touching its direction, so the creature may
/// idle against an edge until the next re-roll.
#[derive(Clone, Debug)]
pub(crate) struct MotionModel {
    mode: MotionMode,
    bounds: [AxisBounds; 3],
    step_size: f32,
    re_roll_period: u32,
    position: Vec3,
    direction: Direction,
    steps_remaining: u32,
    facing: Facing,
}

impl MotionModel {
    pub(crate) fn new(cfg: &MotionConfig) -> Self {
        let b = cfg.bounds;
        let position = match cfg.mode {
            MotionMode::Volume => Vec3 {
                x: b.x.clamp(0.0),
                y: b.y.clamp(0.0),
                z: b.z.clamp(1.0),
            },
            MotionMode::Lane => Vec3 {
                x: b.x.clamp(0.0),
                y: 0.0,
                z: 1.0,
            },
        };
        Self {
            mode: cfg.mode,
            bounds: [b.x, b.y, b.z],
            step_size: cfg.step_size,
            re_roll_period: cfg.re_roll_period,
            position,
            direction: Direction::default(),
            steps_remaining: 0,
            facing: Facing::Right,
        }
    }

    pub(crate) fn position(&self) -> Vec3 {
        self.position
    }

    #[cfg(test)]
    pub(crate) fn direction(&self) -> Direction {
        self.direction
    }

    pub(crate) fn facing(&self) -> Facing {
        self.facing
    }

    #[cfg(test)]
    pub(crate) fn steps_remaining(&self) -> u32 {
        self.steps_remaining
    }

    /// Render scale from depth, `1/z`. Depth bounds are validated positive.
    pub(crate) fn scale(&self) -> f32 {
        match self.mode {
            MotionMode::Volume => 1.0 / self.position.z,
            MotionMode::Lane => 1.0,
        }
    }

    /// One simulation tick. Returns true when the direction was re-rolled.
    pub(crate) fn advance<R: Rng>(&mut self, mood: MoodKind, rng: &mut R) -> bool {
        if !mood.is_content() {
            return false;
        }

        let rerolled = self.steps_remaining < 1;
        if rerolled {
            self.direction = self.roll_direction(rng);
            self.steps_remaining = self.re_roll_period;
            self.facing = if self.direction.x < 0 {
                Facing::Left
            } else {
                Facing::Right
            };
        } else {
            self.steps_remaining -= 1;
        }

        let [bx, by, bz] = self.bounds;
        let d = self.direction;
        let s = self.step_size;
        self.position.x = bx.clamp(self.position.x + d.x as f32 * s);
        if self.mode == MotionMode::Volume {
            self.position.y = by.clamp(self.position.y + d.y as f32 * s);
            self.position.z = bz.clamp(self.position.z + d.z as f32 * s);
        }
        rerolled
    }

    fn roll_direction<R: Rng>(&self, rng: &mut R) -> Direction {
        let mut sign = || if rng.gen::<bool>() { 1 } else { -1 };
        match self.mode {
            MotionMode::Volume => Direction {
                x: sign(),
                y: sign(),
                z: sign(),
            },
            MotionMode::Lane => Direction {
                x: sign(),
                y: 0,
                z: 0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::{mock::StepRng, StdRng};
    use rand::SeedableRng;

    // `gen::<bool>()` reads the top bit of `next_u32`.
    fn always_negative() -> StepRng {
        StepRng::new(0, 0)
    }
    fn always_positive() -> StepRng {
        StepRng::new(u64::MAX, 0)
    }

    #[test]
    fn test_never_leaves_bounds() {
        let cfg = MotionConfig::default();
        let mut m = MotionModel::new(&cfg);
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..10_000 {
            m.advance(MoodKind::Content, &mut rng);
            let p = m.position();
            assert!(cfg.bounds.x.contains(p.x), "x out of bounds: {}", p.x);
            assert!(cfg.bounds.y.contains(p.y), "y out of bounds: {}", p.y);
            assert!(cfg.bounds.z.contains(p.z), "z out of bounds: {}", p.z);
            let s = m.scale();
            assert!(s >= 1.0 / cfg.bounds.z.max() - 1e-6);
            assert!(s <= 1.0 / cfg.bounds.z.min() + 1e-6);
        }
    }

    #[test]
    fn test_frozen_unless_content() {
        let mut m = MotionModel::new(&MotionConfig::default());
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..3 {
            m.advance(MoodKind::Content, &mut rng);
        }
        let (pos, dir, steps, facing) = (m.position(), m.direction(), m.steps_remaining(), m.facing());

        for mood in [MoodKind::Tired, MoodKind::Sad, MoodKind::Lonely] {
            for _ in 0..20 {
                assert!(!m.advance(mood, &mut rng));
            }
        }
        assert_eq!(m.position(), pos);
        assert_eq!(m.direction(), dir);
        assert_eq!(m.steps_remaining(), steps);
        assert_eq!(m.facing(), facing);
    }

    #[test]
    fn test_saturates_at_bound_without_reflecting() {
        let cfg = MotionConfig::default();
        let mut m = MotionModel::new(&cfg);
        let mut rng = always_negative();
        for _ in 0..6 {
            m.advance(MoodKind::Content, &mut rng);
        }
        assert_eq!(m.position().x, cfg.bounds.x.min());
        assert_eq!(m.position().y, cfg.bounds.y.min());
        assert_eq!(m.position().z, cfg.bounds.z.min());
        assert_eq!(m.direction(), Direction { x: -1, y: -1, z: -1 });
    }

    #[test]
    fn test_facing_flips_only_on_reroll() {
        let mut m = MotionModel::new(&MotionConfig::default());

        assert!(m.advance(MoodKind::Content, &mut always_negative()));
        assert_eq!(m.direction().x, -1);
        assert_eq!(m.facing(), Facing::Left);

        // The next re-roll would go right; it must not take effect mid-walk.
        let mut rng = always_positive();
        let mut flips = Vec::new();
        let mut last = m.facing();
        for tick in 2..=7 {
            let rerolled = m.advance(MoodKind::Content, &mut rng);
            if m.facing() != last {
                flips.push((tick, rerolled));
                last = m.facing();
            }
        }
        assert_eq!(flips, vec![(7, true)]);
        assert_eq!(m.facing(), Facing::Right);
    }

    #[test]
    fn test_reroll_period() {
        let mut m = MotionModel::new(&MotionConfig::default());
        let mut rng = StdRng::seed_from_u64(5);
        let rerolls: Vec<bool> = (0..13)
            .map(|_| m.advance(MoodKind::Content, &mut rng))
            .collect();
        let at: Vec<usize> = rerolls
            .iter()
            .enumerate()
            .filter(|(_, r)| **r)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(at, vec![0, 6, 12]);
    }

    #[test]
    fn test_lane_mode_moves_only_horizontally() {
        let mut cfg = MotionConfig::default();
        cfg.mode = MotionMode::Lane;
        let mut m = MotionModel::new(&cfg);
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..200 {
            m.advance(MoodKind::Content, &mut rng);
            assert_eq!(m.position().y, 0.0);
            assert_eq!(m.position().z, 1.0);
            assert_eq!(m.direction().y, 0);
            assert_eq!(m.direction().z, 0);
            assert_eq!(m.scale(), 1.0);
            assert!(cfg.bounds.x.contains(m.position().x));
        }
    }

    #[test]
    fn test_scale_is_reciprocal_depth() {
        let mut m = MotionModel::new(&MotionConfig::default());
        assert_eq!(m.scale(), 1.0);
        for _ in 0..6 {
            m.advance(MoodKind::Content, &mut always_positive());
        }
        assert!((m.position().z - 1.5).abs() < 1e-6);
        assert!((m.scale() - 1.0 / 1.5).abs() < 1e-6);
    }
}
