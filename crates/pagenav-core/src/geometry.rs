#![forbid(unsafe_code)]

//! Vertical geometry in document coordinates (CSS pixels, origin at the top
//! of the document, growing downward).

/// A vertical span of the document, such as a section or an element.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Extent {
    /// Top edge (inclusive).
    pub top: f64,
    /// Height in pixels. Negative heights are treated as zero.
    pub height: f64,
}

impl Extent {
    /// Create a new extent.
    #[inline]
    pub const fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.top + self.height.max(0.0)
    }

    /// Check if the extent has zero height.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.height <= 0.0
    }

    /// Check if a document offset falls inside the extent.
    #[inline]
    pub fn contains(&self, y: f64) -> bool {
        y >= self.top && y < self.bottom()
    }

    /// Length of the overlap with another extent (zero if disjoint).
    #[must_use]
    pub fn overlap(&self, other: &Extent) -> f64 {
        let top = self.top.max(other.top);
        let bottom = self.bottom().min(other.bottom());
        (bottom - top).max(0.0)
    }
}

/// The visible window onto the document.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    /// Current vertical scroll offset.
    pub scroll_y: f64,
    /// Visible height.
    pub height: f64,
}

impl Viewport {
    /// Create a new viewport.
    #[inline]
    pub const fn new(scroll_y: f64, height: f64) -> Self {
        Self { scroll_y, height }
    }

    /// The document span currently on screen.
    #[inline]
    pub fn extent(&self) -> Extent {
        Extent::new(self.scroll_y, self.height)
    }

    /// Convert a document offset into a viewport-relative offset, the value a
    /// browser reports as `getBoundingClientRect().top`.
    #[inline]
    pub fn relative_top(&self, document_top: f64) -> f64 {
        document_top - self.scroll_y
    }

    /// Fraction of `element` that is on screen, in [0.0, 1.0].
    ///
    /// A zero-height element counts as fully visible when its top edge is on
    /// screen, and invisible otherwise.
    #[must_use]
    pub fn visible_fraction(&self, element: &Extent) -> f64 {
        let screen = self.extent();
        if element.is_empty() {
            return if screen.contains(element.top) { 1.0 } else { 0.0 };
        }
        (screen.overlap(element) / element.height).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extent_edges() {
        let e = Extent::new(800.0, 800.0);
        assert_eq!(e.bottom(), 1600.0);
        assert!(e.contains(800.0));
        assert!(e.contains(1599.5));
        assert!(!e.contains(1600.0));
        assert!(!e.is_empty());
    }

    #[test]
    fn negative_height_is_empty() {
        let e = Extent::new(100.0, -5.0);
        assert!(e.is_empty());
        assert_eq!(e.bottom(), 100.0);
    }

    #[test]
    fn overlap_disjoint_is_zero() {
        let a = Extent::new(0.0, 100.0);
        let b = Extent::new(200.0, 100.0);
        assert_eq!(a.overlap(&b), 0.0);
        assert_eq!(b.overlap(&a), 0.0);
    }

    #[test]
    fn overlap_partial() {
        let a = Extent::new(0.0, 100.0);
        let b = Extent::new(60.0, 100.0);
        assert_eq!(a.overlap(&b), 40.0);
    }

    #[test]
    fn relative_top_matches_bounding_rect() {
        let vp = Viewport::new(750.0, 900.0);
        assert_eq!(vp.relative_top(800.0), 50.0);
        assert_eq!(vp.relative_top(0.0), -750.0);
    }

    #[test]
    fn visible_fraction_partial_element() {
        let vp = Viewport::new(0.0, 900.0);
        let element = Extent::new(800.0, 400.0);
        assert!((vp.visible_fraction(&element) - 0.25).abs() < 1e-9);
    }

    #[test]
    fn visible_fraction_offscreen() {
        let vp = Viewport::new(0.0, 900.0);
        assert_eq!(vp.visible_fraction(&Extent::new(2000.0, 100.0)), 0.0);
    }

    #[test]
    fn visible_fraction_zero_height() {
        let vp = Viewport::new(0.0, 900.0);
        assert_eq!(vp.visible_fraction(&Extent::new(10.0, 0.0)), 1.0);
        assert_eq!(vp.visible_fraction(&Extent::new(950.0, 0.0)), 0.0);
    }
}
