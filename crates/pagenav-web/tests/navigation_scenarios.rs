//! End-to-end navigation scenarios against a simulated page.

use core::time::Duration;

use pagenav_core::event::Changes;
use pagenav_web::config::NavConfig;
use pagenav_web::simulated::SimulatedPage;
use pagenav_web::sync::{NavEvent, NavigateOptions, NavigationSynchronizer};
use pagenav_web::{ConfigurationError, NavError, PageHost};
use pretty_assertions::assert_eq;

const FRAME: Duration = Duration::from_millis(16);

/// Sections at 0, 800, 1600 and 2400.
fn four_sections() -> (SimulatedPage, NavigationSynchronizer) {
    let page = SimulatedPage::stacked(
        900.0,
        &[
            ("home", 800.0),
            ("about", 800.0),
            ("services", 800.0),
            ("projects", 800.0),
        ],
    );
    let mut nav = NavigationSynchronizer::new(NavConfig::default());
    nav.register_sections(["home", "about", "services", "projects"])
        .unwrap();
    (page, nav)
}

fn full_site() -> (SimulatedPage, NavigationSynchronizer) {
    let page = SimulatedPage::stacked(
        900.0,
        &[
            ("home", 900.0),
            ("about", 800.0),
            ("services", 900.0),
            ("projects", 1100.0),
            ("testimonials", 700.0),
            ("contact", 900.0),
        ],
    );
    let mut nav = NavigationSynchronizer::new(NavConfig::default());
    nav.register_sections([
        "home",
        "about",
        "services",
        "projects",
        "testimonials",
        "contact",
    ])
    .unwrap();
    nav.drain_events();
    (page, nav)
}

fn scroll_to(page: &mut SimulatedPage, nav: &mut NavigationSynchronizer, y: f64) -> Changes {
    page.set_scroll_y(y);
    nav.on_scroll(page)
}

fn run_until_idle(page: &mut SimulatedPage, nav: &mut NavigationSynchronizer) -> usize {
    let mut frames = 0;
    while nav.is_programmatic_scroll() {
        nav.advance(FRAME, page);
        nav.on_scroll(page);
        frames += 1;
        assert!(frames < 500, "scroll animation never finished");
    }
    frames
}

#[test]
fn scroll_past_threshold_activates_deepest_section() {
    let (mut page, mut nav) = four_sections();
    scroll_to(&mut page, &mut nav, 850.0);
    assert_eq!(nav.active_section(), Some("about"));
    scroll_to(&mut page, &mut nav, 0.0);
    assert_eq!(nav.active_section(), Some("home"));
}

#[test]
fn activation_boundary_is_inclusive() {
    let mut page = SimulatedPage::stacked(
        900.0,
        &[("home", 800.0), ("about", 800.0), ("services", 800.0)],
    );
    let mut nav = NavigationSynchronizer::default();
    nav.register_sections(["home", "about", "services"]).unwrap();

    scroll_to(&mut page, &mut nav, 699.0);
    assert_eq!(nav.active_section(), Some("home"));
    scroll_to(&mut page, &mut nav, 700.0);
    assert_eq!(nav.active_section(), Some("about"));
    scroll_to(&mut page, &mut nav, 720.0);
    assert_eq!(nav.active_section(), Some("about"));
}

#[test]
fn unchanged_offset_is_idempotent() {
    let (mut page, mut nav) = four_sections();
    scroll_to(&mut page, &mut nav, 1700.0);
    let state = nav.state();
    nav.drain_events();
    assert_eq!(nav.on_scroll(&page), Changes::empty());
    assert_eq!(nav.on_scroll(&page), Changes::empty());
    assert_eq!(nav.state(), state);
    assert!(nav.drain_events().is_empty());
}

#[test]
fn link_click_holds_target_until_animation_ends() {
    let (mut page, mut nav) = four_sections();
    nav.navigate_to("about", NavigateOptions::default(), &page)
        .unwrap();
    assert_eq!(nav.active_section(), Some("about"));
    assert!(nav.is_programmatic_scroll());

    // A passive sample taken at the very start, where "home" would win.
    assert!(!nav.on_scroll(&page).contains(Changes::ACTIVE_SECTION));
    assert_eq!(nav.active_section(), Some("about"));

    let frames = run_until_idle(&mut page, &mut nav);
    assert_eq!(frames, 50);
    assert_eq!(page.scroll_y(), 720.0);
    assert_eq!(nav.active_section(), Some("about"));
}

#[test]
fn unknown_target_is_rejected_without_side_effects() {
    let (page, mut nav) = four_sections();
    let before = nav.state();
    nav.drain_events();
    let err = nav
        .navigate_to("nonexistent", NavigateOptions::default(), &page)
        .unwrap_err();
    assert_eq!(
        err,
        NavError::NotFound {
            id: "nonexistent".into()
        }
    );
    assert_eq!(nav.state(), before);
    assert_eq!(nav.active_section(), Some("home"));
    assert!(nav.drain_events().is_empty());
}

#[test]
fn second_link_click_supersedes_first() {
    let (mut page, mut nav) = full_site();
    nav.navigate_to("projects", NavigateOptions::default(), &page)
        .unwrap();
    for _ in 0..20 {
        nav.advance(FRAME, &mut page);
        nav.on_scroll(&page);
    }
    assert_eq!(nav.active_section(), Some("projects"));

    nav.navigate_to("contact", NavigateOptions::default(), &page)
        .unwrap();
    assert_eq!(nav.active_section(), Some("contact"));

    let mut cleared = 0;
    let mut was_programmatic = nav.is_programmatic_scroll();
    while nav.is_programmatic_scroll() {
        nav.advance(FRAME, &mut page);
        nav.on_scroll(&page);
        if was_programmatic && !nav.is_programmatic_scroll() {
            cleared += 1;
        }
        was_programmatic = nav.is_programmatic_scroll();
        assert_eq!(nav.active_section(), Some("contact"));
    }
    assert_eq!(cleared, 1);

    let events = nav.drain_events();
    let lifecycle: Vec<_> = events
        .into_iter()
        .filter(|e| !matches!(e, NavEvent::ActiveChanged { .. }))
        .map(|e| match e {
            NavEvent::ScrollStarted { target, .. } => format!("start:{target}"),
            NavEvent::ScrollCancelled { target } => format!("cancel:{target}"),
            NavEvent::ScrollFinished { target } => format!("finish:{target}"),
            NavEvent::ScrolledChanged(on) => format!("scrolled:{on}"),
            NavEvent::ActiveChanged { .. } => unreachable!(),
        })
        .collect();
    assert_eq!(
        lifecycle,
        vec![
            "start:projects",
            "scrolled:true",
            "cancel:projects",
            "start:contact",
            "finish:contact",
        ]
    );
    assert_eq!(page.scroll_y(), 4320.0);
}

#[test]
fn duplicate_ids_are_a_configuration_error() {
    let mut nav = NavigationSynchronizer::default();
    assert_eq!(
        nav.register_sections(["home", "home"]),
        Err(NavError::Configuration(ConfigurationError::DuplicateId(
            "home".into()
        )))
    );
    assert_eq!(nav.active_section(), None);
}

#[test]
fn overscroll_above_page_keeps_current_section() {
    let (mut page, mut nav) = four_sections();
    scroll_to(&mut page, &mut nav, 900.0);
    assert_eq!(nav.active_section(), Some("about"));

    // Elastic bounce above the top: every section is below the threshold.
    page.overscroll_to(-150.0);
    let changes = nav.on_scroll(&page);
    assert!(!changes.contains(Changes::ACTIVE_SECTION));
    assert_eq!(nav.active_section(), Some("about"));
    assert!(!nav.is_scrolled());
}

#[test]
fn missing_section_skips_cycle() {
    let (mut page, mut nav) = full_site();
    scroll_to(&mut page, &mut nav, 1000.0);
    assert_eq!(nav.active_section(), Some("about"));

    page.remove_element("testimonials");
    scroll_to(&mut page, &mut nav, 2700.0);
    assert_eq!(nav.active_section(), Some("about"));

    page.insert_element(
        "testimonials",
        pagenav_core::geometry::Extent::new(3700.0, 700.0),
    );
    nav.on_scroll(&page);
    assert_eq!(nav.active_section(), Some("projects"));
}

#[test]
fn scrolled_flag_updates_during_programmatic_scroll() {
    let (mut page, mut nav) = full_site();
    nav.navigate_to("about", NavigateOptions::default(), &page)
        .unwrap();
    let mut saw_scrolled = false;
    while nav.is_programmatic_scroll() {
        nav.advance(FRAME, &mut page);
        nav.on_scroll(&page);
        saw_scrolled |= nav.is_scrolled();
    }
    assert!(saw_scrolled);
    assert!(nav.is_scrolled());
}

#[test]
fn custom_offset_and_linear_easing() {
    let (mut page, mut nav) = four_sections();
    let options = NavigateOptions {
        offset: 0.0,
        duration: Duration::from_millis(160),
        easing: pagenav_core::animation::EasingKind::Linear,
    };
    nav.navigate_to("services", options, &page).unwrap();
    nav.advance(Duration::from_millis(80), &mut page);
    assert!((page.scroll_y() - 800.0).abs() < 1e-9);
    nav.advance(Duration::from_millis(80), &mut page);
    assert_eq!(page.scroll_y(), 1600.0);
    assert!(!nav.is_programmatic_scroll());
}
