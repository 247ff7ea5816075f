#![forbid(unsafe_code)]

//! Mobile navigation drawer.

/// Open/closed state of the mobile menu.
///
/// Every mutator returns whether the state actually changed, so callers can
/// skip a redraw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MobileMenu {
    open: bool,
}

impl MobileMenu {
    /// A closed menu.
    #[must_use]
    pub const fn new() -> Self {
        Self { open: false }
    }

    /// Whether the drawer is showing.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    /// Flip the drawer. Always a change.
    pub fn toggle(&mut self) -> bool {
        self.open = !self.open;
        true
    }

    /// Show the drawer.
    pub fn open(&mut self) -> bool {
        !std::mem::replace(&mut self.open, true)
    }

    /// Hide the drawer, e.g. after a menu link was followed.
    pub fn close(&mut self) -> bool {
        std::mem::replace(&mut self.open, false)
    }
}
