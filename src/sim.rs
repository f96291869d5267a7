use crate::config::Config;
use crate::face::{FaceSelector, FrameSets};
use crate::model::{AttributeStore, MoodKind};
use crate::motion::MotionModel;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Everything that changes between ticks: attributes, motion, the face frame
/// and the random source driving both.
pub(crate) struct Companion<R = StdRng> {
    store: AttributeStore,
    motion: MotionModel,
    faces: FaceSelector,
    rng: R,
    ticks: u64,
    last_mood: MoodKind,
}

impl Companion<StdRng> {
    pub(crate) fn new(cfg: &Config) -> Self {
        Self::with_rng(cfg, StdRng::seed_from_u64(cfg.seed))
    }
}

impl<R: Rng> Companion<R> {
    pub(crate) fn with_rng(cfg: &Config, rng: R) -> Self {
        let store = AttributeStore::from_config(&cfg.attributes);
        let last_mood = store.mood();
        Self {
            store,
            motion: MotionModel::new(&cfg.motion),
            faces: FaceSelector::default(),
            rng,
            ticks: 0,
            last_mood,
        }
    }

    pub(crate) fn store(&self) -> &AttributeStore {
        &self.store
    }

    pub(crate) fn motion(&self) -> &MotionModel {
        &self.motion
    }

    pub(crate) fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Recomputed from the attributes on every call.
    pub(crate) fn mood(&self) -> MoodKind {
        self.store.mood()
    }

    /// Decay first, then move under the mood that decay produced.
    pub(crate) fn tick(&mut self) {
        self.ticks += 1;
        self.store.decay();
        let mood = self.note_mood();
        self.motion.advance(mood, &mut self.rng);
    }

    pub(crate) fn cure(&mut self, name: &str) -> bool {
        let cured = self.store.cure(name);
        self.note_mood();
        cured
    }

    pub(crate) fn next_face<'a, T>(&mut self, sets: &'a FrameSets<T>) -> Option<&'a T> {
        let mood = self.store.mood();
        self.faces.select(mood, sets, &mut self.rng)
    }

    fn note_mood(&mut self) -> MoodKind {
        let mood = self.store.mood();
        if mood != self.last_mood {
            log::info!("mood {:?} -> {:?} at tick {}", self.last_mood, mood, self.ticks);
            self.last_mood = mood;
        }
        mood
    }
}
