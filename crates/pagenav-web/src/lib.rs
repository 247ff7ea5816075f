#![forbid(unsafe_code)]

//! `pagenav-web` keeps a single-page site's navigation state in step with its
//! scroll position.
//!
//! Design goals:
//! - **Host-driven I/O**: the embedding page pushes scroll, resize and link
//!   events, and answers measurement queries through [`PageHost`].
//! - **Deterministic time**: the host advances a monotonic clock explicitly,
//!   so scroll animations replay identically.
//! - **No blocking / no threads**: suitable for `wasm32-unknown-unknown`.
//!
//! The pieces:
//! - [`sync::NavigationSynchronizer`] maps scroll position to the active
//!   section and runs programmatic scroll-to-section animations.
//! - [`page_program::PageProgram`] drives the synchronizer, reveal tracking,
//!   mobile menu and contact form from one `step()` per animation frame.
//! - [`simulated::SimulatedPage`] is an in-memory [`PageHost`] for tests and
//!   trace replay.

pub mod config;
pub mod contact;
pub mod menu;
pub mod page_program;
pub mod session_record;
pub mod simulated;
pub mod sync;

use core::time::Duration;
use std::collections::VecDeque;

use pagenav_core::event::PageEvent;
use pagenav_core::geometry::{Extent, Viewport};

/// Navigation error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavError {
    /// The synchronizer was set up incorrectly. Fix the caller; do not retry.
    Configuration(ConfigurationError),
    /// A navigation target is not a registered section, or its element is not
    /// on the page. Nothing changed.
    NotFound {
        /// The requested section id.
        id: String,
    },
}

/// Setup mistakes reported as [`NavError::Configuration`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// The same id was registered twice.
    DuplicateId(String),
    /// An empty string was registered as an id.
    EmptyId,
    /// Registration was attempted with no ids.
    NoSections,
    /// Sections were already registered; the set is fixed for the page's lifetime.
    AlreadyRegistered,
    /// An operation needing sections ran before registration.
    NotRegistered,
    /// An operation ran after `unregister`.
    Detached,
}

impl core::fmt::Display for NavError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Configuration(err) => write!(f, "configuration error: {err}"),
            Self::NotFound { id } => write!(f, "section not found: {id:?}"),
        }
    }
}

impl core::fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::DuplicateId(id) => write!(f, "duplicate section id {id:?}"),
            Self::EmptyId => f.write_str("empty section id"),
            Self::NoSections => f.write_str("no sections to register"),
            Self::AlreadyRegistered => f.write_str("sections are already registered"),
            Self::NotRegistered => f.write_str("sections have not been registered"),
            Self::Detached => f.write_str("navigation has been unregistered"),
        }
    }
}

impl std::error::Error for NavError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Configuration(err) => Some(err),
            Self::NotFound { .. } => None,
        }
    }
}

impl std::error::Error for ConfigurationError {}

impl From<ConfigurationError> for NavError {
    fn from(err: ConfigurationError) -> Self {
        Self::Configuration(err)
    }
}

/// The page as seen by the navigation runtime.
///
/// A browser implementation reads `window.scrollY` and element bounding
/// rectangles; [`simulated::SimulatedPage`] answers from a fixed layout.
pub trait PageHost {
    /// Current vertical scroll offset.
    fn scroll_y(&self) -> f64;

    /// Visible viewport height.
    fn viewport_height(&self) -> f64;

    /// Document extent of the element with `id`, or `None` if it is absent.
    fn element_extent(&self, id: &str) -> Option<Extent>;

    /// Move the page to `y`. Hosts may clamp to their scrollable range.
    fn set_scroll_y(&mut self, y: f64);

    /// Apply a viewport size reported by a resize event. Browsers have
    /// already resized by then, so the default does nothing.
    fn set_viewport_size(&mut self, _width: f64, _height: f64) {}

    /// Whether a reported scroll sample should be written back through
    /// [`set_scroll_y`](Self::set_scroll_y). Browsers report where they
    /// already are, so the default is `false`.
    fn follows_scroll_samples(&self) -> bool {
        false
    }

    /// The current viewport.
    fn viewport(&self) -> Viewport {
        Viewport::new(self.scroll_y(), self.viewport_height())
    }

    /// Document-relative top edge of the element with `id`.
    fn section_top(&self, id: &str) -> Option<f64> {
        self.element_extent(id).map(|extent| extent.top)
    }
}

/// Deterministic monotonic clock controlled by the host.
#[derive(Debug, Default, Clone)]
pub struct DeterministicClock {
    now: Duration,
}

impl DeterministicClock {
    /// Create a clock starting at `0`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
        }
    }

    /// Current monotonic time.
    #[must_use]
    pub const fn now_mono(&self) -> Duration {
        self.now
    }

    /// Set current monotonic time. Moving backwards is ignored.
    pub fn set(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }

    /// Advance monotonic time by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }
}

/// Host-driven FIFO of page events.
#[derive(Debug, Clone, Default)]
pub struct PageEventSource {
    queue: VecDeque<PageEvent>,
}

impl PageEventSource {
    /// Create an empty event source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push an event into the queue.
    pub fn push_event(&mut self, event: PageEvent) {
        self.queue.push_back(event);
    }

    /// Whether any events are queued.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Pop the oldest event.
    pub fn read_event(&mut self) -> Option<PageEvent> {
        self.queue.pop_front()
    }

    /// Drain all pending events.
    pub fn drain_events(&mut self) -> impl Iterator<Item = PageEvent> + '_ {
        self.queue.drain(..)
    }

    /// Drop all pending events.
    pub fn clear(&mut self) {
        self.queue.clear();
    }
}
