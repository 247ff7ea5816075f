#![forbid(unsafe_code)]

//! Event coalescing for high-frequency page events.
//!
//! Browsers can fire dozens of scroll events between two animation frames.
//! Measuring every section for each of them is wasted layout work, since only
//! the offset at frame time is ever displayed.
//!
//! [`EventCoalescer`] keeps:
//! - the latest scroll offset (older samples are dropped),
//! - the latest viewport size,
//!
//! and passes every other event through immediately. The caller flushes once
//! per frame, which bounds active-section evaluation to one per frame.
//!
//! # Usage
//!
//! ```
//! use pagenav_core::event::PageEvent;
//! use pagenav_core::event_coalescer::EventCoalescer;
//!
//! let mut coalescer = EventCoalescer::new();
//!
//! assert!(coalescer.push(PageEvent::scroll(10.0)).is_none());
//! assert!(coalescer.push(PageEvent::scroll(40.0)).is_none());
//!
//! // Navigation passes through immediately (no auto-flush).
//! assert!(coalescer.push(PageEvent::navigate("about")).is_some());
//!
//! let pending = coalescer.flush();
//! assert_eq!(pending, vec![PageEvent::scroll(40.0)]);
//! ```

use crate::event::PageEvent;

/// Coalesces scroll and resize storms into at most one event each per flush.
///
/// Not thread-safe; use it from the page's event thread.
#[derive(Debug, Clone, Default)]
pub struct EventCoalescer {
    /// Latest scroll offset.
    pending_scroll: Option<f64>,

    /// Latest viewport size.
    pending_resize: Option<(f64, f64)>,

    /// Samples dropped since the last flush.
    dropped: u32,
}

impl EventCoalescer {
    /// Create a new coalescer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push an event into the coalescer.
    ///
    /// Returns `Some(event)` if the event should be processed immediately,
    /// or `None` if it was absorbed into pending state.
    ///
    /// # Coalescing Rules
    ///
    /// - **Scroll**: replaces any pending scroll offset. Returns `None`.
    /// - **Resize**: replaces any pending size. Returns `None`.
    /// - **Other events**: returned as-is. Pending state is NOT flushed; the
    ///   caller decides whether to flush first.
    pub fn push(&mut self, event: PageEvent) -> Option<PageEvent> {
        match event {
            PageEvent::Scroll { offset_y } => {
                if self.pending_scroll.replace(offset_y).is_some() {
                    self.dropped = self.dropped.saturating_add(1);
                }
                None
            }
            PageEvent::Resize { width, height } => {
                if self.pending_resize.replace((width, height)).is_some() {
                    self.dropped = self.dropped.saturating_add(1);
                }
                None
            }
            other => Some(other),
        }
    }

    /// Flush all pending coalesced events.
    ///
    /// Order: resize first (it changes layout), then scroll (it is measured
    /// against the new layout). After calling `flush()`, the coalescer is empty.
    #[must_use]
    pub fn flush(&mut self) -> Vec<PageEvent> {
        let mut events = Vec::with_capacity(2);
        self.flush_each(|event| events.push(event));
        events
    }

    /// Flush pending events, calling a closure for each.
    pub fn flush_each<F>(&mut self, mut f: F)
    where
        F: FnMut(PageEvent),
    {
        if let Some((width, height)) = self.pending_resize.take() {
            f(PageEvent::Resize { width, height });
        }
        if let Some(offset_y) = self.pending_scroll.take() {
            f(PageEvent::Scroll { offset_y });
        }
        self.dropped = 0;
    }

    /// Check if there are any pending coalesced events.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending_scroll.is_some() || self.pending_resize.is_some()
    }

    /// Number of samples superseded since the last flush.
    #[must_use]
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    /// Discard pending events without processing them (page teardown).
    pub fn clear(&mut self) {
        self.pending_scroll = None;
        self.pending_resize = None;
        self.dropped = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::LinkSource;

    #[test]
    fn new_coalescer_has_no_pending() {
        let coalescer = EventCoalescer::new();
        assert!(!coalescer.has_pending());
        assert_eq!(coalescer.dropped(), 0);
    }

    #[test]
    fn scroll_latest_wins() {
        let mut coalescer = EventCoalescer::new();
        for y in [10.0, 25.0, 90.0, 60.0] {
            assert!(coalescer.push(PageEvent::scroll(y)).is_none());
        }
        assert_eq!(coalescer.dropped(), 3);
        assert_eq!(coalescer.flush(), vec![PageEvent::scroll(60.0)]);
        assert!(!coalescer.has_pending());
        assert_eq!(coalescer.dropped(), 0);
    }

    #[test]
    fn resize_flushes_before_scroll() {
        let mut coalescer = EventCoalescer::new();
        coalescer.push(PageEvent::scroll(300.0));
        coalescer.push(PageEvent::Resize {
            width: 800.0,
            height: 600.0,
        });
        coalescer.push(PageEvent::Resize {
            width: 1024.0,
            height: 768.0,
        });
        assert_eq!(
            coalescer.flush(),
            vec![
                PageEvent::Resize {
                    width: 1024.0,
                    height: 768.0
                },
                PageEvent::scroll(300.0),
            ]
        );
    }

    #[test]
    fn navigation_passes_through_without_flushing() {
        let mut coalescer = EventCoalescer::new();
        coalescer.push(PageEvent::scroll(5.0));
        let nav = PageEvent::Navigate {
            target: "contact".to_string(),
            source: LinkSource::Mobile,
        };
        assert_eq!(coalescer.push(nav.clone()), Some(nav));
        assert!(coalescer.has_pending());
    }

    #[test]
    fn flush_each_visits_in_order() {
        let mut coalescer = EventCoalescer::new();
        coalescer.push(PageEvent::scroll(1.0));
        coalescer.push(PageEvent::Resize {
            width: 1.0,
            height: 2.0,
        });
        let mut seen = Vec::new();
        coalescer.flush_each(|e| seen.push(e));
        assert!(matches!(seen[0], PageEvent::Resize { .. }));
        assert!(matches!(seen[1], PageEvent::Scroll { .. }));
    }

    #[test]
    fn clear_discards_pending() {
        let mut coalescer = EventCoalescer::new();
        coalescer.push(PageEvent::scroll(1.0));
        coalescer.push(PageEvent::scroll(2.0));
        coalescer.clear();
        assert!(!coalescer.has_pending());
        assert!(coalescer.flush().is_empty());
    }

    #[test]
    fn empty_flush_is_empty() {
        let mut coalescer = EventCoalescer::new();
        assert!(coalescer.flush().is_empty());
    }
}
