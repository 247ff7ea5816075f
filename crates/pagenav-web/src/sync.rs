#![forbid(unsafe_code)]

//! Scroll-spy navigation state.
//!
//! [`NavigationSynchronizer`] keeps the navigation bar's highlighted section in
//! step with the scroll position, and scrolls smoothly to a section when a link
//! is activated.
//!
//! # Active-section rule
//!
//! On each scroll sample every section's document top is measured and turned
//! into a viewport-relative top (`top - scroll_y`). Sections are then walked
//! from last to first, and the first one whose relative top is at or above the
//! activation threshold wins. Walking backwards picks the lowest section that
//! has reached the threshold; a forward scan would pick the first section on
//! the page, which is always above the threshold once the page has scrolled.
//!
//! # Invariants
//!
//! 1. Once sections are registered, exactly one section is active.
//! 2. While a programmatic scroll is in flight, passive samples never change
//!    the active section.
//! 3. `programmatic_scroll` is cleared exactly once per chain of superseding
//!    navigations: when the last animation in the chain finishes, or on
//!    `unregister`.
//! 4. A failed `navigate_to` changes nothing.
//!
//! # Failure Modes
//!
//! - A section whose element is missing during a passive sample: the sample
//!   is skipped and the previous active section is kept.
//! - No section at or above the threshold (overscroll above the page top):
//!   the previous active section is kept.

use core::time::Duration;

use pagenav_core::animation::{Animation, EasingKind, ScrollTween};
use pagenav_core::event::Changes;
use tracing::{debug, info, trace};

use crate::config::NavConfig;
use crate::{ConfigurationError, NavError, PageHost};

/// One registered page section.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    id: String,
    top_offset: Option<f64>,
}

impl Section {
    /// Section id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Last measured document top, `None` until measured or while absent.
    #[must_use]
    pub fn top_offset(&self) -> Option<f64> {
        self.top_offset
    }
}

/// Page-wide navigation state, owned by the page root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigationState {
    active: Option<usize>,
    programmatic_scroll: bool,
    scrolled: bool,
}

impl NavigationState {
    /// Index of the active section in registration order.
    #[must_use]
    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    /// Whether a programmatic scroll is in flight.
    #[must_use]
    pub fn is_programmatic_scroll(&self) -> bool {
        self.programmatic_scroll
    }

    /// Whether the page has scrolled past the backdrop threshold.
    #[must_use]
    pub fn is_scrolled(&self) -> bool {
        self.scrolled
    }
}

/// Parameters of a programmatic scroll.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavigateOptions {
    /// Stop this many pixels above the section top.
    pub offset: f64,
    /// Animation duration.
    pub duration: Duration,
    /// Animation easing.
    pub easing: EasingKind,
}

impl NavigateOptions {
    /// Options for navigation-bar links under `config`.
    #[must_use]
    pub fn from_config(config: &NavConfig) -> Self {
        Self {
            offset: config.nav_offset,
            duration: config.scroll_duration,
            easing: config.easing,
        }
    }
}

impl Default for NavigateOptions {
    fn default() -> Self {
        Self::from_config(&NavConfig::default())
    }
}

/// Reported by the synchronizer; drain with
/// [`NavigationSynchronizer::drain_events`].
#[derive(Debug, Clone, PartialEq)]
pub enum NavEvent {
    /// The active section changed. `from` is `None` on first activation.
    ActiveChanged { from: Option<String>, to: String },
    /// The backdrop flag flipped.
    ScrolledChanged(bool),
    /// A programmatic scroll began.
    ScrollStarted { target: String, from: f64, to: f64 },
    /// A programmatic scroll was abandoned (superseded or torn down).
    ScrollCancelled { target: String },
    /// A programmatic scroll reached its destination.
    ScrollFinished { target: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Unregistered,
    Observing,
    Detached,
}

#[derive(Debug, Clone)]
struct InFlight {
    target: usize,
    tween: ScrollTween,
}

/// Maps scroll position to the active section and runs link scrolling.
///
/// Host-driven: every call that needs the page takes a [`PageHost`].
#[derive(Debug, Clone)]
pub struct NavigationSynchronizer {
    config: NavConfig,
    sections: Vec<Section>,
    state: NavigationState,
    in_flight: Option<InFlight>,
    lifecycle: Lifecycle,
    events: Vec<NavEvent>,
}

impl Default for NavigationSynchronizer {
    fn default() -> Self {
        Self::new(NavConfig::default())
    }
}

impl NavigationSynchronizer {
    /// Create a synchronizer. Call [`register_sections`](Self::register_sections)
    /// before sampling.
    #[must_use]
    pub fn new(config: NavConfig) -> Self {
        Self {
            config,
            sections: Vec::new(),
            state: NavigationState::default(),
            in_flight: None,
            lifecycle: Lifecycle::Unregistered,
            events: Vec::new(),
        }
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &NavConfig {
        &self.config
    }

    /// Register the page's sections in document order. The first becomes active.
    ///
    /// Fails on an empty list, an empty or repeated id, a second registration,
    /// or registration after [`unregister`](Self::unregister). Nothing is
    /// registered on failure.
    pub fn register_sections<I, S>(&mut self, ordered_ids: I) -> Result<(), NavError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        match self.lifecycle {
            Lifecycle::Unregistered => {}
            Lifecycle::Observing => return Err(ConfigurationError::AlreadyRegistered.into()),
            Lifecycle::Detached => return Err(ConfigurationError::Detached.into()),
        }

        let mut sections: Vec<Section> = Vec::new();
        for id in ordered_ids {
            let id = id.into();
            if id.is_empty() {
                return Err(ConfigurationError::EmptyId.into());
            }
            if sections.iter().any(|s| s.id == id) {
                return Err(ConfigurationError::DuplicateId(id).into());
            }
            sections.push(Section {
                id,
                top_offset: None,
            });
        }
        if sections.is_empty() {
            return Err(ConfigurationError::NoSections.into());
        }

        info!(count = sections.len(), "navigation sections registered");
        self.sections = sections;
        self.lifecycle = Lifecycle::Observing;
        self.set_active(0);
        Ok(())
    }

    /// Sample the scroll position and update the active section and the
    /// `is_scrolled` flag. Never fails; see the module docs for skipped samples.
    pub fn on_scroll<H: PageHost + ?Sized>(&mut self, host: &H) -> Changes {
        if self.lifecycle != Lifecycle::Observing {
            return Changes::empty();
        }
        let scroll_y = host.scroll_y();
        let mut changes = self.update_scrolled(scroll_y);

        if self.state.programmatic_scroll {
            trace!(scroll_y, "sample ignored during programmatic scroll");
            return changes;
        }

        let mut complete = true;
        for section in &mut self.sections {
            section.top_offset = host.section_top(&section.id);
            complete &= section.top_offset.is_some();
        }
        if !complete {
            debug!(scroll_y, "section missing from page; keeping active section");
            return changes;
        }

        let threshold = self.config.activation_threshold;
        let reached = self.sections.iter().rposition(|section| {
            section
                .top_offset
                .is_some_and(|top| top - scroll_y <= threshold)
        });
        if let Some(idx) = reached {
            changes |= self.set_active(idx);
        }
        changes
    }

    /// Scroll to `target_id`, highlighting it immediately.
    ///
    /// A call while another navigation is in flight cancels that animation and
    /// starts from the current offset; the programmatic flag stays set.
    pub fn navigate_to<H: PageHost + ?Sized>(
        &mut self,
        target_id: &str,
        options: NavigateOptions,
        host: &H,
    ) -> Result<Changes, NavError> {
        self.ensure_observing()?;
        let not_found = || NavError::NotFound {
            id: target_id.to_string(),
        };
        let idx = self.index_of(target_id).ok_or_else(not_found)?;
        let top = host.section_top(target_id).ok_or_else(not_found)?;
        self.sections[idx].top_offset = Some(top);

        let mut changes = Changes::PROGRAMMATIC_SCROLL;
        if let Some(previous) = self.in_flight.take() {
            let superseded = self.sections[previous.target].id.clone();
            debug!(superseded = %superseded, target = target_id, "navigation superseded");
            self.events.push(NavEvent::ScrollCancelled { target: superseded });
        }

        let from = host.scroll_y();
        let to = (top - options.offset).max(0.0);
        self.state.programmatic_scroll = true;
        changes |= self.set_active(idx);

        debug!(target = target_id, from, to, "programmatic scroll started");
        self.events.push(NavEvent::ScrollStarted {
            target: target_id.to_string(),
            from,
            to,
        });
        self.in_flight = Some(InFlight {
            target: idx,
            tween: ScrollTween::new(from, to, options.duration).easing(options.easing.function()),
        });
        Ok(changes)
    }

    /// Scroll back to the first section.
    pub fn navigate_to_top<H: PageHost + ?Sized>(
        &mut self,
        options: NavigateOptions,
        host: &H,
    ) -> Result<Changes, NavError> {
        self.ensure_observing()?;
        let first = self.sections[0].id.clone();
        self.navigate_to(&first, options, host)
    }

    /// Advance the in-flight scroll animation by `dt` and write the new offset
    /// to the host.
    pub fn advance<H: PageHost + ?Sized>(&mut self, dt: Duration, host: &mut H) -> Changes {
        let Some(flight) = self.in_flight.as_mut() else {
            return Changes::empty();
        };
        flight.tween.tick(dt);
        host.set_scroll_y(flight.tween.position());
        if !flight.tween.is_complete() {
            return Changes::SCROLL_OFFSET;
        }

        let target = flight.target;
        self.in_flight = None;
        self.state.programmatic_scroll = false;
        let id = self.sections[target].id.clone();
        debug!(target = %id, "programmatic scroll finished");
        self.events.push(NavEvent::ScrollFinished { target: id });
        Changes::SCROLL_OFFSET | Changes::PROGRAMMATIC_SCROLL
    }

    /// Measure every section again after a layout change. The active section
    /// is left alone; the next scroll sample picks up the new offsets.
    pub fn relayout<H: PageHost + ?Sized>(&mut self, host: &H) {
        if self.lifecycle != Lifecycle::Observing {
            return;
        }
        for section in &mut self.sections {
            section.top_offset = host.section_top(&section.id);
        }
    }

    /// Detach: cancel any animation and stop observing. Idempotent.
    pub fn unregister(&mut self) {
        if self.lifecycle == Lifecycle::Detached {
            return;
        }
        if let Some(flight) = self.in_flight.take() {
            let target = self.sections[flight.target].id.clone();
            self.events.push(NavEvent::ScrollCancelled { target });
        }
        self.state.programmatic_scroll = false;
        self.lifecycle = Lifecycle::Detached;
        info!("navigation unregistered");
    }

    /// Id of the active section.
    #[must_use]
    pub fn active_section(&self) -> Option<&str> {
        self.state.active.map(|idx| self.sections[idx].id.as_str())
    }

    /// Whether the page has scrolled past the backdrop threshold.
    #[must_use]
    pub fn is_scrolled(&self) -> bool {
        self.state.scrolled
    }

    /// Whether a programmatic scroll is in flight.
    #[must_use]
    pub fn is_programmatic_scroll(&self) -> bool {
        self.state.programmatic_scroll
    }

    /// Destination of the in-flight programmatic scroll.
    #[must_use]
    pub fn scroll_target(&self) -> Option<&str> {
        self.in_flight
            .as_ref()
            .map(|flight| self.sections[flight.target].id.as_str())
    }

    /// Whether sections are registered and observation is live.
    #[must_use]
    pub fn is_observing(&self) -> bool {
        self.lifecycle == Lifecycle::Observing
    }

    /// Registered sections in document order.
    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Current state snapshot.
    #[must_use]
    pub fn state(&self) -> NavigationState {
        self.state
    }

    /// Take queued events.
    pub fn drain_events(&mut self) -> Vec<NavEvent> {
        std::mem::take(&mut self.events)
    }

    fn ensure_observing(&self) -> Result<(), NavError> {
        match self.lifecycle {
            Lifecycle::Observing => Ok(()),
            Lifecycle::Unregistered => Err(ConfigurationError::NotRegistered.into()),
            Lifecycle::Detached => Err(ConfigurationError::Detached.into()),
        }
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.sections.iter().position(|section| section.id == id)
    }

    fn set_active(&mut self, idx: usize) -> Changes {
        if self.state.active == Some(idx) {
            return Changes::empty();
        }
        let from = self.state.active.map(|prev| self.sections[prev].id.clone());
        let to = self.sections[idx].id.clone();
        debug!(from = ?from, to = %to, "active section changed");
        self.state.active = Some(idx);
        self.events.push(NavEvent::ActiveChanged { from, to });
        Changes::ACTIVE_SECTION
    }

    fn update_scrolled(&mut self, scroll_y: f64) -> Changes {
        let scrolled = scroll_y > self.config.scrolled_threshold;
        if scrolled == self.state.scrolled {
            return Changes::empty();
        }
        self.state.scrolled = scrolled;
        self.events.push(NavEvent::ScrolledChanged(scrolled));
        Changes::SCROLLED
    }
}
