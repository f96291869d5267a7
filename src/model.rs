use crate::config::AttributeConfig;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub(crate) enum MoodKind {
    Content,
    Tired,
    Sad,
    Lonely,
}

impl MoodKind {
    pub(crate) fn is_content(self) -> bool {
        matches!(self, MoodKind::Content)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Attribute {
    pub(crate) name: String,
    pub(crate) current: u32,
    pub(crate) max: u32,
    pub(crate) mood_if_depleted: MoodKind,
}

impl Attribute {
    /// Starts one above `max` so the first decay tick lands exactly on `max`.
    pub(crate) fn new(name: impl Into<String>, max: u32, mood_if_depleted: MoodKind) -> Self {
        Self {
            name: name.into(),
            current: max.saturating_add(1),
            max,
            mood_if_depleted,
        }
    }

    pub(crate) fn is_depleted(&self) -> bool {
        self.current == 0
    }

    /// Fill level in `[0, 1]`; the extra point above `max` reads as full.
    pub(crate) fn fraction(&self) -> f32 {
        if self.max == 0 {
            return 0.0;
        }
        (self.current as f32 / self.max as f32).clamp(0.0, 1.0)
    }
}

/// Well-being attributes in declaration order. The set is fixed at startup.
#[derive(Clone, Debug)]
pub(crate) struct AttributeStore {
    attrs: Vec<Attribute>,
}

impl AttributeStore {
    pub(crate) fn new(attrs: Vec<Attribute>) -> Self {
        Self { attrs }
    }

    pub(crate) fn from_config(cfg: &[AttributeConfig]) -> Self {
        Self::new(
            cfg.iter()
                .map(|a| Attribute::new(a.name.clone(), a.max, a.mood_on_empty))
                .collect(),
        )
    }

    pub(crate) fn attributes(&self) -> &[Attribute] {
        &self.attrs
    }

    #[cfg(test)]
    pub(crate) fn get(&self, name: &str) -> Option<&Attribute> {
        self.attrs.iter().find(|a| a.name == name)
    }

    pub(crate) fn decay(&mut self) {
        for a in &mut self.attrs {
            a.current = a.current.saturating_sub(1);
        }
    }

    /// Unknown names are ignored. Returns whether an attribute was reset.
    pub(crate) fn cure(&mut self, name: &str) -> bool {
        match self.attrs.iter().position(|a| a.name == name) {
            Some(i) => self.cure_at(i),
            None => false,
        }
    }

    pub(crate) fn cure_at(&mut self, index: usize) -> bool {
        match self.attrs.get_mut(index) {
            Some(a) => {
                a.current = a.max.saturating_add(1);
                true
            }
            None => false,
        }
    }

    #[cfg(test)]
    pub(crate) fn is_depleted(&self, name: &str) -> bool {
        self.get(name).map(Attribute::is_depleted).unwrap_or(false)
    }

    pub(crate) fn mood(&self) -> MoodKind {
        resolve_mood(&self.attrs)
    }
}

/// Mood for the given attributes, in declaration order.
///
/// When several attributes are depleted at once the one declared *last* wins,
/// so the declaration order doubles as a priority list (lowest first). With no
/// depleted attribute the mood is `Content`.
pub(crate) fn resolve_mood(attrs: &[Attribute]) -> MoodKind {
    attrs
        .iter()
        .rev()
        .find(|a| a.is_depleted())
        .map(|a| a.mood_if_depleted)
        .unwrap_or(MoodKind::Content)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> AttributeStore {
        AttributeStore::new(vec![
            Attribute::new("energy", 10, MoodKind::Tired),
            Attribute::new("happiness", 4, MoodKind::Sad),
            Attribute::new("social", 7, MoodKind::Lonely),
        ])
    }

    #[test]
    fn test_new_attribute_starts_above_max() {
        let a = Attribute::new("energy", 10, MoodKind::Tired);
        assert_eq!(a.current, 11);
        assert!(!a.is_depleted());
    }

    #[test]
    fn test_decay_is_monotonic_and_floored() {
        let mut s = store();
        let mut prev: Vec<u32> = s.attributes().iter().map(|a| a.current).collect();
        for _ in 0..40 {
            s.decay();
            for (a, p) in s.attributes().iter().zip(prev.iter()) {
                assert!(a.current <= *p);
                assert!(a.current <= a.max + 1);
            }
            prev = s.attributes().iter().map(|a| a.current).collect();
        }
        assert!(s.attributes().iter().all(|a| a.current == 0));
    }

    #[test]
    fn test_energy_depletes_and_recovers() {
        let mut s = AttributeStore::new(vec![Attribute::new("energy", 10, MoodKind::Tired)]);
        assert_eq!(s.get("energy").map(|a| a.current), Some(11));

        for _ in 0..10 {
            s.decay();
        }
        assert_eq!(s.get("energy").map(|a| a.current), Some(1));
        assert_eq!(s.mood(), MoodKind::Content);

        s.decay();
        assert_eq!(s.get("energy").map(|a| a.current), Some(0));
        assert!(s.is_depleted("energy"));
        assert_eq!(s.mood(), MoodKind::Tired);

        assert!(s.cure("energy"));
        assert_eq!(s.get("energy").map(|a| a.current), Some(11));
        assert_eq!(s.mood(), MoodKind::Content);
    }

    #[test]
    fn test_cure_always_resets_to_max_plus_one() {
        let mut s = store();
        s.cure("happiness");
        assert_eq!(s.get("happiness").map(|a| a.current), Some(5));

        for _ in 0..3 {
            s.decay();
        }
        s.cure("happiness");
        s.cure("happiness");
        assert_eq!(s.get("happiness").map(|a| a.current), Some(5));
    }

    #[test]
    fn test_cure_unknown_name_is_noop() {
        let mut s = store();
        s.decay();
        let before: Vec<u32> = s.attributes().iter().map(|a| a.current).collect();
        assert!(!s.cure("hunger"));
        assert!(!s.cure_at(99));
        let after: Vec<u32> = s.attributes().iter().map(|a| a.current).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_mood_content_iff_nothing_depleted() {
        let mut s = store();
        assert_eq!(s.mood(), MoodKind::Content);
        for _ in 0..5 {
            s.decay();
        }
        assert!(s.is_depleted("happiness"));
        assert_eq!(s.mood(), MoodKind::Sad);
    }

    #[test]
    fn test_last_depleted_attribute_wins() {
        let mut energy = Attribute::new("energy", 10, MoodKind::Tired);
        let mut happiness = Attribute::new("happiness", 10, MoodKind::Sad);
        energy.current = 0;
        happiness.current = 0;
        let attrs = vec![energy.clone(), happiness.clone()];
        assert_eq!(resolve_mood(&attrs), MoodKind::Sad);

        let reversed = vec![happiness, energy];
        assert_eq!(resolve_mood(&reversed), MoodKind::Tired);
    }

    #[test]
    fn test_fraction_clamps_overfull() {
        let a = Attribute::new("energy", 10, MoodKind::Tired);
        assert_eq!(a.fraction(), 1.0);
        let mut b = a.clone();
        b.current = 5;
        assert!((b.fraction() - 0.5).abs() < 1e-6);
    }
}
