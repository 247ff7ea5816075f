#![forbid(unsafe_code)]

//! Canonical page events.
//!
//! The embedding page translates DOM signals into [`PageEvent`] values and
//! pushes them into the runtime in arrival order. Events derive `Serialize`
//! and `Deserialize` so recorded sessions can be written as JSONL and replayed.
//!
//! # Design Notes
//!
//! - Offsets are CSS pixels relative to the document top.
//! - Link activation names the target section id; whether the id exists is
//!   decided by the navigation runtime, not here.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Canonical page event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageEvent {
    /// The page scrolled; `offset_y` is the new vertical scroll offset.
    Scroll {
        /// New vertical scroll offset.
        offset_y: f64,
    },

    /// The viewport was resized.
    Resize {
        /// New viewport width.
        width: f64,
        /// New viewport height.
        height: f64,
    },

    /// Layout changed without a resize (fonts or images loaded); section
    /// offsets must be measured again.
    Layout,

    /// A navigation link was activated.
    Navigate {
        /// Target section id.
        target: String,
        /// Where the link lives.
        #[serde(default)]
        source: LinkSource,
    },

    /// The floating scroll-to-top affordance was activated.
    ScrollToTop,

    /// The mobile menu button was pressed.
    ToggleMenu,

    /// A frame tick with no other input.
    Tick,
}

impl PageEvent {
    /// Shorthand for a scroll sample.
    #[must_use]
    pub const fn scroll(offset_y: f64) -> Self {
        Self::Scroll { offset_y }
    }

    /// Shorthand for a desktop link activation.
    #[must_use]
    pub fn navigate(target: impl Into<String>) -> Self {
        Self::Navigate {
            target: target.into(),
            source: LinkSource::Desktop,
        }
    }

    /// Check whether this event can be merged with a later one of the same kind.
    #[must_use]
    pub const fn is_coalescable(&self) -> bool {
        matches!(self, Self::Scroll { .. } | Self::Resize { .. })
    }
}

/// The navigation surface a link belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkSource {
    /// The desktop navigation bar.
    #[default]
    Desktop,
    /// The expanded mobile menu. Activation closes the menu.
    Mobile,
}

bitflags! {
    /// What changed during one runtime step.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Changes: u8 {
        /// The active section id changed.
        const ACTIVE_SECTION      = 0b0000_0001;
        /// The `is_scrolled` backdrop flag flipped.
        const SCROLLED            = 0b0000_0010;
        /// A programmatic scroll started, was superseded or finished.
        const PROGRAMMATIC_SCROLL = 0b0000_0100;
        /// The scroll offset was written by an animation frame.
        const SCROLL_OFFSET       = 0b0000_1000;
        /// The mobile menu opened or closed.
        const MENU                = 0b0001_0000;
        /// At least one element was revealed.
        const REVEAL              = 0b0010_0000;
        /// The contact form changed phase.
        const FORM                = 0b0100_0000;
    }
}

impl Changes {
    /// Whether the navigation bar needs to be redrawn.
    #[must_use]
    pub const fn affects_navbar(self) -> bool {
        self.intersects(
            Self::ACTIVE_SECTION
                .union(Self::SCROLLED)
                .union(Self::MENU),
        )
    }
}
