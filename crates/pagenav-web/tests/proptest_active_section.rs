//! Property tests for the active-section rule and programmatic-scroll gating.

use core::time::Duration;

use pagenav_web::config::NavConfig;
use pagenav_web::simulated::SimulatedPage;
use pagenav_web::sync::{NavigateOptions, NavigationSynchronizer};
use pagenav_web::PageHost;
use proptest::prelude::*;

/// Brute force: the last section (in document order) whose top has reached
/// the threshold, or `current` if none has.
fn oracle<'a>(ids: &'a [String], tops: &[f64], scroll_y: f64, current: &'a str) -> &'a str {
    let mut active = None;
    for (id, top) in ids.iter().zip(tops) {
        if top - scroll_y <= 100.0 {
            active = Some(id.as_str());
        }
    }
    active.unwrap_or(current)
}

fn layout() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(100.0f64..1500.0, 1..8)
}

fn build(heights: &[f64]) -> (SimulatedPage, Vec<String>, Vec<f64>) {
    let ids: Vec<String> = (0..heights.len()).map(|i| format!("section-{i}")).collect();
    let stack: Vec<(&str, f64)> = ids.iter().map(String::as_str).zip(heights.iter().copied()).collect();
    let page = SimulatedPage::stacked(800.0, &stack);
    let tops = ids
        .iter()
        .map(|id| page.section_top(id).unwrap_or_default())
        .collect();
    (page, ids, tops)
}

proptest! {
    #[test]
    fn active_section_matches_oracle(
        heights in layout(),
        samples in prop::collection::vec(0.0f64..1.0, 1..20),
    ) {
        let (mut page, ids, tops) = build(&heights);
        let mut nav = NavigationSynchronizer::new(NavConfig::default());
        nav.register_sections(ids.iter().cloned()).unwrap();

        for fraction in samples {
            let y = (fraction * page.max_scroll()).round();
            page.set_scroll_y(y);
            let current = nav.active_section().unwrap_or_default().to_string();
            nav.on_scroll(&page);
            let expected = oracle(&ids, &tops, page.scroll_y(), &current);
            prop_assert_eq!(nav.active_section(), Some(expected));
        }
    }

    #[test]
    fn exactly_one_section_is_always_active(
        heights in layout(),
        samples in prop::collection::vec(-200.0f64..10_000.0, 1..20),
    ) {
        let (mut page, ids, _) = build(&heights);
        let mut nav = NavigationSynchronizer::default();
        nav.register_sections(ids.iter().cloned()).unwrap();
        for y in samples {
            page.overscroll_to(y);
            nav.on_scroll(&page);
            let active = nav.active_section();
            prop_assert!(active.is_some_and(|a| ids.iter().any(|id| id == a)));
        }
    }

    #[test]
    fn programmatic_scroll_pins_target(
        heights in layout(),
        target_seed in any::<prop::sample::Index>(),
        frames in 1usize..80,
    ) {
        let (mut page, ids, _) = build(&heights);
        let mut nav = NavigationSynchronizer::default();
        nav.register_sections(ids.iter().cloned()).unwrap();
        let target = &ids[target_seed.index(ids.len())];

        nav.navigate_to(target, NavigateOptions::default(), &page).unwrap();
        for _ in 0..frames {
            nav.advance(Duration::from_millis(16), &mut page);
            nav.on_scroll(&page);
            if nav.is_programmatic_scroll() {
                prop_assert_eq!(nav.active_section(), Some(target.as_str()));
            }
        }
        if frames >= 50 {
            prop_assert!(!nav.is_programmatic_scroll());
        }
    }

    #[test]
    fn is_scrolled_tracks_threshold(y in -100.0f64..400.0) {
        let (mut page, ids, _) = build(&[1000.0, 1000.0]);
        let mut nav = NavigationSynchronizer::default();
        nav.register_sections(ids.iter().cloned()).unwrap();
        page.overscroll_to(y);
        nav.on_scroll(&page);
        prop_assert_eq!(nav.is_scrolled(), y > 50.0);
    }
}
