#![forbid(unsafe_code)]

//! Host-driven page runtime.
//!
//! [`PageProgram`] bundles everything the page root owns (the navigation
//! synchronizer, reveal tracking, the mobile menu and the contact form) and
//! advances it without threads or timers. The host controls the loop:
//!
//! 1. Push events via [`PageProgram::push_event`].
//! 2. Advance time via [`PageProgram::advance_time`] or [`PageProgram::set_time`].
//! 3. Call [`PageProgram::step`] once per animation frame.
//! 4. Read [`PageProgram::snapshot`] when the returned changes need a redraw.
//!
//! # Example
//!
//! ```
//! use core::time::Duration;
//! use pagenav_core::event::PageEvent;
//! use pagenav_web::config::NavConfig;
//! use pagenav_web::page_program::PageProgram;
//! use pagenav_web::simulated::SimulatedPage;
//!
//! let page = SimulatedPage::stacked(900.0, &[("home", 800.0), ("about", 800.0), ("contact", 800.0)]);
//! let mut prog = PageProgram::new(page, NavConfig::default());
//! prog.init(["home", "about", "contact"]).unwrap();
//!
//! prog.push_event(PageEvent::navigate("about"));
//! for _ in 0..60 {
//!     prog.advance_time(Duration::from_millis(16));
//!     prog.step();
//! }
//! assert_eq!(prog.snapshot().active_section.as_deref(), Some("about"));
//! ```

use core::time::Duration;

use pagenav_core::event::{Changes, LinkSource, PageEvent};
use pagenav_core::event_coalescer::EventCoalescer;
use pagenav_core::reveal::RevealObserver;
use serde::{Deserialize, Serialize};
use tracing::{debug, debug_span, info, warn};

use crate::config::NavConfig;
use crate::contact::{ContactForm, FormPhase};
use crate::menu::MobileMenu;
use crate::sync::{NavEvent, NavigateOptions, NavigationSynchronizer};
use crate::{DeterministicClock, NavError, PageEventSource, PageHost};

/// Result of a single [`PageProgram::step`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepResult {
    /// Whether the program is still running (false after `shutdown`).
    pub running: bool,
    /// Number of events taken from the queue during this step.
    pub events_processed: u32,
    /// Number of steps taken so far, including this one.
    pub frame_idx: u64,
    /// What changed during this step.
    pub changes: Changes,
}

/// Everything the navigation bar and page chrome render from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavSnapshot {
    pub active_section: Option<String>,
    pub scrolled: bool,
    pub programmatic_scroll: bool,
    pub scroll_y: f64,
    pub menu_open: bool,
    pub revealed: Vec<String>,
    pub form: FormPhase,
}

/// Host-driven, non-blocking page runtime.
///
/// # Lifecycle
///
/// 1. [`PageProgram::new`] with a host and configuration.
/// 2. [`PageProgram::init`] once with the page's section ids.
/// 3. [`PageProgram::step`] repeatedly from the host frame loop.
/// 4. [`PageProgram::shutdown`] when the page unmounts.
pub struct PageProgram<H: PageHost> {
    host: H,
    config: NavConfig,
    clock: DeterministicClock,
    events: PageEventSource,
    coalescer: EventCoalescer,
    nav: NavigationSynchronizer,
    reveal: RevealObserver,
    menu: MobileMenu,
    contact: ContactForm,
    running: bool,
    frame_idx: u64,
    last_step: Duration,
    errors: Vec<NavError>,
}

impl<H: PageHost> PageProgram<H> {
    /// Create a program over `host`. Nothing is observed until [`init`](Self::init).
    #[must_use]
    pub fn new(host: H, config: NavConfig) -> Self {
        Self {
            host,
            nav: NavigationSynchronizer::new(config.clone()),
            config,
            clock: DeterministicClock::new(),
            events: PageEventSource::new(),
            coalescer: EventCoalescer::new(),
            reveal: RevealObserver::new(),
            menu: MobileMenu::new(),
            contact: ContactForm::new(),
            running: true,
            frame_idx: 0,
            last_step: Duration::ZERO,
            errors: Vec::new(),
        }
    }

    /// Register the page's sections, observe them for reveal, and take the
    /// first sample.
    pub fn init<I, S>(&mut self, sections: I) -> Result<Changes, NavError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: Vec<String> = sections.into_iter().map(Into::into).collect();
        self.nav.register_sections(ids.iter().cloned())?;
        for id in ids {
            let amount = self.config.reveal_amount_of(&id);
            self.reveal.observe(id, amount);
        }
        Ok(Changes::ACTIVE_SECTION | self.sample())
    }

    /// Advance animations by the time elapsed since the previous step, process
    /// queued events, and re-sample the page if it moved.
    pub fn step(&mut self) -> StepResult {
        let _span = debug_span!("page_step", frame = self.frame_idx).entered();

        if !self.running {
            return StepResult {
                running: false,
                events_processed: 0,
                frame_idx: self.frame_idx,
                changes: Changes::empty(),
            };
        }

        let now = self.clock.now_mono();
        let dt = now.saturating_sub(self.last_step);
        self.last_step = now;

        let mut changes = Changes::empty();
        let mut needs_sample = false;

        // 1. Time-driven state. Only a scroll animation that was already
        //    running when this step began owns the elapsed time; one started
        //    by the events below begins at `now`.
        let scrolled = self.nav.advance(dt, &mut self.host);
        needs_sample |= scrolled.contains(Changes::SCROLL_OFFSET);
        changes |= scrolled;
        if self.contact.tick(dt) {
            changes |= Changes::FORM;
        }
        self.reveal.tick(dt);

        // 2. Events. Scroll and resize coalesce; anything else first applies
        //    what is pending so it sees the page as the user left it.
        let batch: Vec<PageEvent> = self.events.drain_events().collect();
        let events_processed = u32::try_from(batch.len()).unwrap_or(u32::MAX);
        for event in batch {
            if let Some(event) = self.coalescer.push(event) {
                needs_sample |= self.flush_coalesced();
                changes |= self.handle_event(event, &mut needs_sample);
            }
        }
        needs_sample |= self.flush_coalesced();

        // 3. One measurement pass per frame.
        if needs_sample {
            changes |= self.sample();
        }

        self.frame_idx += 1;
        StepResult {
            running: self.running,
            events_processed,
            frame_idx: self.frame_idx,
            changes,
        }
    }

    /// Queue an event for the next [`step`](Self::step).
    pub fn push_event(&mut self, event: PageEvent) {
        self.events.push_event(event);
    }

    /// Advance the deterministic clock by `dt`.
    pub fn advance_time(&mut self, dt: Duration) {
        self.clock.advance(dt);
    }

    /// Set the deterministic clock to an absolute time. Moving backwards is ignored.
    pub fn set_time(&mut self, now: Duration) {
        self.clock.set(now);
    }

    /// Current monotonic time.
    pub fn now(&self) -> Duration {
        self.clock.now_mono()
    }

    /// Unregister navigation and stop processing. Idempotent.
    pub fn shutdown(&mut self) {
        if !self.running {
            return;
        }
        self.nav.unregister();
        self.coalescer.clear();
        self.events.clear();
        self.running = false;
        info!(frames = self.frame_idx, "page program shut down");
    }

    /// State for rendering the navigation bar and page chrome.
    #[must_use]
    pub fn snapshot(&self) -> NavSnapshot {
        NavSnapshot {
            active_section: self.nav.active_section().map(str::to_string),
            scrolled: self.nav.is_scrolled(),
            programmatic_scroll: self.nav.is_programmatic_scroll(),
            scroll_y: self.host.scroll_y(),
            menu_open: self.menu.is_open(),
            revealed: self.reveal.revealed_keys().map(str::to_string).collect(),
            form: self.contact.phase(),
        }
    }

    /// Take navigation events reported since the last call.
    pub fn drain_nav_events(&mut self) -> Vec<NavEvent> {
        self.nav.drain_events()
    }

    /// Take navigation errors raised by queued events.
    pub fn drain_errors(&mut self) -> Vec<NavError> {
        std::mem::take(&mut self.errors)
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn config(&self) -> &NavConfig {
        &self.config
    }

    pub fn nav(&self) -> &NavigationSynchronizer {
        &self.nav
    }

    pub fn reveal(&self) -> &RevealObserver {
        &self.reveal
    }

    pub fn menu(&self) -> &MobileMenu {
        &self.menu
    }

    pub fn contact(&self) -> &ContactForm {
        &self.contact
    }

    pub fn contact_mut(&mut self) -> &mut ContactForm {
        &mut self.contact
    }

    /// Whether the program is still running.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Number of steps taken.
    pub fn frame_idx(&self) -> u64 {
        self.frame_idx
    }

    // --- Private helpers ---

    /// Apply pending coalesced events. Returns whether anything was applied.
    fn flush_coalesced(&mut self) -> bool {
        if !self.coalescer.has_pending() {
            return false;
        }
        let dropped = self.coalescer.dropped();
        if dropped > 0 {
            debug!(dropped, "coalesced page events");
        }
        for event in self.coalescer.flush() {
            match event {
                PageEvent::Resize { width, height } => {
                    self.host.set_viewport_size(width, height);
                    self.nav.relayout(&self.host);
                }
                PageEvent::Scroll { offset_y } => {
                    if self.host.follows_scroll_samples() && self.host.scroll_y() != offset_y {
                        self.host.set_scroll_y(offset_y);
                    }
                }
                _ => {}
            }
        }
        true
    }

    fn handle_event(&mut self, event: PageEvent, needs_sample: &mut bool) -> Changes {
        match event {
            PageEvent::Navigate { target, source } => {
                let mut changes = Changes::empty();
                if source == LinkSource::Mobile && self.menu.close() {
                    changes |= Changes::MENU;
                }
                let options = NavigateOptions::from_config(&self.config);
                let result = self.nav.navigate_to(&target, options, &self.host);
                changes | self.record(result)
            }
            PageEvent::ScrollToTop => {
                let options = NavigateOptions::from_config(&self.config);
                let result = self.nav.navigate_to_top(options, &self.host);
                self.record(result)
            }
            PageEvent::ToggleMenu => {
                self.menu.toggle();
                Changes::MENU
            }
            PageEvent::Layout => {
                self.nav.relayout(&self.host);
                *needs_sample = true;
                Changes::empty()
            }
            PageEvent::Tick | PageEvent::Scroll { .. } | PageEvent::Resize { .. } => {
                Changes::empty()
            }
        }
    }

    fn record(&mut self, result: Result<Changes, NavError>) -> Changes {
        match result {
            Ok(changes) => changes,
            Err(err) => {
                warn!(error = %err, "navigation request rejected");
                self.errors.push(err);
                Changes::empty()
            }
        }
    }

    fn sample(&mut self) -> Changes {
        let mut changes = self.nav.on_scroll(&self.host);
        let host = &self.host;
        let revealed = self
            .reveal
            .update(host.viewport(), |key| host.element_extent(key));
        if !revealed.is_empty() {
            changes |= Changes::REVEAL;
        }
        changes
    }
}

impl<H: PageHost + core::fmt::Debug> core::fmt::Debug for PageProgram<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PageProgram")
            .field("host", &self.host)
            .field("running", &self.running)
            .field("frame_idx", &self.frame_idx)
            .field("nav", &self.nav)
            .field("menu", &self.menu)
            .finish_non_exhaustive()
    }
}
