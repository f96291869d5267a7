use crate::layout::{HitRegion, Point};
use crate::sim::Companion;
use rand::Rng;

/// Cures every attribute whose region contains `point`. Regions are whatever
/// the compositor recorded for the last completed frame, read at click time.
/// Returns the names of the cured attributes.
pub(crate) fn handle_click<R: Rng>(
    point: Point,
    regions: &[HitRegion],
    companion: &mut Companion<R>,
) -> Vec<String> {
    let hits: Vec<usize> = regions
        .iter()
        .filter(|r| r.shape.contains(point))
        .map(|r| r.attribute)
        .collect();

    let mut cured = Vec::with_capacity(hits.len());
    for i in hits {
        let Some(name) = companion.store().attributes().get(i).map(|a| a.name.clone()) else {
            continue;
        };
        if companion.cure(&name) {
            log::info!("cured {name} at ({:.0}, {:.0})", point.x, point.y);
            cured.push(name);
        }
    }
    cured
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::layout::Circle;
    use crate::model::MoodKind;

    fn drained() -> Companion {
        let mut c = Companion::new(&Config::default());
        for _ in 0..40 {
            c.tick();
        }
        assert!(c.store().attributes().iter().all(|a| a.is_depleted()));
        c
    }

    fn regions() -> Vec<HitRegion> {
        (0..3)
            .map(|i| HitRegion {
                attribute: i,
                shape: Circle {
                    cx: 135.0 + 105.0 * i as f32,
                    cy: 100.0,
                    r: 35.0,
                },
            })
            .collect()
    }

    #[test]
    fn test_click_cures_only_hit_indicator() {
        let mut c = drained();
        let cured = handle_click(Point { x: 250.0, y: 90.0 }, &regions(), &mut c);
        assert_eq!(cured, vec!["happiness".to_string()]);

        let cur: Vec<u32> = c.store().attributes().iter().map(|a| a.current).collect();
        assert_eq!(cur, vec![0, 16, 0]);
        assert_eq!(c.mood(), MoodKind::Lonely);
    }

    #[test]
    fn test_miss_changes_nothing() {
        let mut c = drained();
        assert!(handle_click(Point { x: 10.0, y: 400.0 }, &regions(), &mut c).is_empty());
        assert!(handle_click(Point { x: 135.0, y: 100.0 }, &[], &mut c).is_empty());
        assert!(c.store().attributes().iter().all(|a| a.current == 0));
    }

    #[test]
    fn test_overlapping_regions_all_cured() {
        let mut c = drained();
        let overlapping = vec![
            HitRegion {
                attribute: 0,
                shape: Circle { cx: 100.0, cy: 100.0, r: 50.0 },
            },
            HitRegion {
                attribute: 2,
                shape: Circle { cx: 140.0, cy: 100.0, r: 50.0 },
            },
            HitRegion {
                attribute: 7,
                shape: Circle { cx: 120.0, cy: 100.0, r: 50.0 },
            },
        ];
        let cured = handle_click(Point { x: 120.0, y: 100.0 }, &overlapping, &mut c);
        assert_eq!(cured, vec!["energy".to_string(), "social".to_string()]);
        assert_eq!(c.mood(), MoodKind::Sad);
    }

    #[test]
    fn test_clicks_use_latest_frame_regions() {
        use crate::compositor::tests::Recorder;
        use crate::compositor::Compositor;

        let cfg = Config::default();
        let mut c = drained();
        let assets = crate::assets::Assets::builtin(&cfg.attributes, 480.0, 480.0);
        let mut comp = Compositor::new(cfg.layout.clone());

        let p = Point { x: 240.0 + 105.0, y: 100.0 };
        assert!(handle_click(p, comp.hit_regions(), &mut c).is_empty());

        let now = chrono::NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        comp.render_frame(&mut Recorder::default(), &mut c, &assets, now);
        assert_eq!(handle_click(p, comp.hit_regions(), &mut c), vec!["social".to_string()]);
    }
}
