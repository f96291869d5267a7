use crate::model::MoodKind;
use rand::Rng;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FrameSetKind {
    Happy,
    Sad,
}

impl FrameSetKind {
    pub(crate) fn for_mood(mood: MoodKind) -> Self {
        if mood.is_content() {
            FrameSetKind::Happy
        } else {
            FrameSetKind::Sad
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct FrameSets<T> {
    pub(crate) happy: Vec<T>,
    pub(crate) sad: Vec<T>,
}

impl<T> FrameSets<T> {
    pub(crate) fn get(&self, kind: FrameSetKind) -> &[T] {
        match kind {
            FrameSetKind::Happy => &self.happy,
            FrameSetKind::Sad => &self.sad,
        }
    }
}

/// Picks one face frame per render, never the same index twice in a row.
#[derive(Clone, Debug)]
pub(crate) struct FaceSelector {
    kind: FrameSetKind,
    index: usize,
}

impl Default for FaceSelector {
    fn default() -> Self {
        Self {
            kind: FrameSetKind::Happy,
            index: 0,
        }
    }
}

impl FaceSelector {
    #[cfg(test)]
    pub(crate) fn kind(&self) -> FrameSetKind {
        self.kind
    }

    #[cfg(test)]
    pub(crate) fn index(&self) -> usize {
        self.index
    }

    /// Samples uniformly over every index except the previous one, so it
    /// always terminates. Sets of one frame always yield index 0; an empty set
    /// yields nothing and leaves the selection untouched.
    pub(crate) fn select<'a, T, R: Rng>(
        &mut self,
        mood: MoodKind,
        sets: &'a FrameSets<T>,
        rng: &mut R,
    ) -> Option<&'a T> {
        let kind = FrameSetKind::for_mood(mood);
        let frames = sets.get(kind);
        let next = match frames.len() {
            0 => return None,
            1 => 0,
            n if self.index < n => {
                let i = rng.gen_range(0..n - 1);
                if i >= self.index {
                    i + 1
                } else {
                    i
                }
            }
            n => rng.gen_range(0..n),
        };
        self.kind = kind;
        self.index = next;
        frames.get(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sets(happy: usize, sad: usize) -> FrameSets<usize> {
        FrameSets {
            happy: (0..happy).collect(),
            sad: (100..100 + sad).collect(),
        }
    }

    #[test]
    fn test_never_repeats_index() {
        let mut rng = StdRng::seed_from_u64(1);
        for n in [2, 3, 5] {
            let s = sets(n, 2);
            let mut sel = FaceSelector::default();
            let mut prev = None;
            let mut seen = vec![false; n];
            for _ in 0..1000 {
                let f = *sel.select(MoodKind::Content, &s, &mut rng).unwrap();
                assert_ne!(Some(f), prev);
                assert_eq!(sel.index(), f);
                seen[f] = true;
                prev = Some(f);
            }
            assert!(seen.iter().all(|v| *v), "every frame of {n} shows up");
        }
    }

    #[test]
    fn test_single_frame_floors_to_zero() {
        let mut rng = StdRng::seed_from_u64(2);
        let s = sets(1, 1);
        let mut sel = FaceSelector::default();
        for _ in 0..10 {
            assert_eq!(sel.select(MoodKind::Content, &s, &mut rng), Some(&0));
            assert_eq!(sel.select(MoodKind::Sad, &s, &mut rng), Some(&100));
        }
    }

    #[test]
    fn test_empty_set_yields_nothing() {
        let mut rng = StdRng::seed_from_u64(3);
        let s = sets(3, 0);
        let mut sel = FaceSelector::default();
        sel.select(MoodKind::Content, &s, &mut rng);
        let before = (sel.kind(), sel.index());
        assert_eq!(sel.select(MoodKind::Tired, &s, &mut rng), None);
        assert_eq!((sel.kind(), sel.index()), before);
    }

    #[test]
    fn test_set_follows_mood() {
        let mut rng = StdRng::seed_from_u64(4);
        let s = sets(3, 2);
        let mut sel = FaceSelector::default();
        for _ in 0..20 {
            let f = *sel.select(MoodKind::Lonely, &s, &mut rng).unwrap();
            assert!(f >= 100);
            assert_eq!(sel.kind(), FrameSetKind::Sad);
        }
        let f = *sel.select(MoodKind::Content, &s, &mut rng).unwrap();
        assert!(f < 100);
        assert_eq!(sel.kind(), FrameSetKind::Happy);
    }

    #[test]
    fn test_switching_to_smaller_set_still_avoids_repeat() {
        let mut rng = StdRng::seed_from_u64(5);
        let s = sets(3, 2);
        let mut sel = FaceSelector::default();
        // Walk until the happy index is out of range for the sad set.
        while sel.index() != 2 {
            sel.select(MoodKind::Content, &s, &mut rng);
        }
        for _ in 0..50 {
            let prev = sel.index();
            sel.select(MoodKind::Sad, &s, &mut rng);
            assert!(sel.index() < 2);
            if prev < 2 {
                assert_ne!(sel.index(), prev);
            }
        }
    }
}
