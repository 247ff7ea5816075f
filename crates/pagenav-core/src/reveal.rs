#![forbid(unsafe_code)]

//! One-shot reveal-on-intersection tracking.
//!
//! Page sections animate in the first time they scroll into view and stay
//! visible afterwards. [`RevealObserver`] models that as a per-element state
//! transition `Hidden -> Visible` driven by viewport samples.
//!
//! # Invariants
//!
//! 1. An element is revealed at most once; later samples never re-trigger it,
//!    even after it leaves the viewport.
//! 2. An element is revealed when its visible fraction reaches its `amount`.
//! 3. An element whose bounds cannot be measured is skipped for that sample
//!    and stays hidden.
//! 4. `drain`-style delivery: [`update`](RevealObserver::update) returns the
//!    newly revealed keys; nothing is replayed on later calls.

use std::time::Duration;

use crate::animation::{Animation, Fade, ease_out};
use crate::geometry::{Extent, Viewport};

/// Default entrance duration for a revealed element.
pub const DEFAULT_ENTRANCE: Duration = Duration::from_millis(600);

/// Emitted the first time an element becomes visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevealEvent {
    /// The element with this key crossed its visibility amount.
    Revealed(String),
}

#[derive(Debug, Clone)]
enum RevealState {
    Hidden,
    Visible(Fade),
}

#[derive(Debug, Clone)]
struct Entry {
    key: String,
    amount: f64,
    state: RevealState,
}

/// Tracks which observed elements have been revealed.
#[derive(Debug, Clone)]
pub struct RevealObserver {
    entries: Vec<Entry>,
    entrance: Duration,
}

impl Default for RevealObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl RevealObserver {
    /// Create an observer with the default 600ms entrance.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            entrance: DEFAULT_ENTRANCE,
        }
    }

    /// Set the entrance duration used for elements revealed from now on.
    #[must_use]
    pub fn with_entrance(mut self, entrance: Duration) -> Self {
        self.entrance = entrance;
        self
    }

    /// Start observing `key`. `amount` is the visible fraction required to
    /// reveal it, clamped to [0.0, 1.0] (a NaN amount is treated as 0.0).
    ///
    /// Returns `false` if `key` is already observed; its amount is unchanged.
    pub fn observe(&mut self, key: impl Into<String>, amount: f64) -> bool {
        let key = key.into();
        if self.entries.iter().any(|e| e.key == key) {
            return false;
        }
        let amount = if amount.is_nan() {
            0.0
        } else {
            amount.clamp(0.0, 1.0)
        };
        self.entries.push(Entry {
            key,
            amount,
            state: RevealState::Hidden,
        });
        true
    }

    /// Stop observing `key`. Returns `true` if it was observed.
    pub fn unobserve(&mut self, key: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.key != key);
        self.entries.len() != before
    }

    /// Number of observed elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is observed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sample the viewport. `measure` returns the document extent of an
    /// element, or `None` if it is not currently on the page.
    ///
    /// Returns the elements revealed by this sample, in observation order.
    pub fn update<F>(&mut self, viewport: Viewport, mut measure: F) -> Vec<RevealEvent>
    where
        F: FnMut(&str) -> Option<Extent>,
    {
        let mut events = Vec::new();
        for entry in &mut self.entries {
            if matches!(entry.state, RevealState::Visible(_)) {
                continue;
            }
            let Some(extent) = measure(&entry.key) else {
                continue;
            };
            let fraction = viewport.visible_fraction(&extent);
            let reached = if entry.amount == 0.0 {
                fraction > 0.0 || viewport.extent().contains(extent.top)
            } else {
                fraction >= entry.amount
            };
            if reached {
                crate::debug!(key = %entry.key, fraction, "element revealed");
                entry.state = RevealState::Visible(Fade::new(self.entrance).easing(ease_out));
                events.push(RevealEvent::Revealed(entry.key.clone()));
            }
        }
        events
    }

    /// Advance entrance animations of revealed elements.
    pub fn tick(&mut self, dt: Duration) {
        for entry in &mut self.entries {
            if let RevealState::Visible(fade) = &mut entry.state {
                fade.tick(dt);
            }
        }
    }

    /// Whether `key` has been revealed.
    #[must_use]
    pub fn is_revealed(&self, key: &str) -> bool {
        self.entries
            .iter()
            .any(|e| e.key == key && matches!(e.state, RevealState::Visible(_)))
    }

    /// Eased entrance progress of `key`: `None` while hidden or unobserved.
    #[must_use]
    pub fn entrance_progress(&self, key: &str) -> Option<f64> {
        self.entries.iter().find(|e| e.key == key).and_then(|e| match &e.state {
            RevealState::Hidden => None,
            RevealState::Visible(fade) => Some(fade.value()),
        })
    }

    /// Keys revealed so far, in observation order.
    pub fn revealed_keys(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|e| matches!(e.state, RevealState::Visible(_)))
            .map(|e| e.key.as_str())
    }

    /// Whether every observed element has been revealed.
    #[must_use]
    pub fn all_revealed(&self) -> bool {
        self.entries
            .iter()
            .all(|e| matches!(e.state, RevealState::Visible(_)))
    }

    /// Stop observing everything.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
