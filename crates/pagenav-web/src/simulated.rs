#![forbid(unsafe_code)]

//! In-memory [`PageHost`] with a fixed layout.
//!
//! Used by tests and by trace replay, where no browser is available.

use pagenav_core::geometry::Extent;

use crate::PageHost;

/// A page whose elements sit at known document offsets.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedPage {
    viewport_width: f64,
    viewport_height: f64,
    scroll_y: f64,
    elements: Vec<(String, Extent)>,
    document_height: Option<f64>,
}

impl SimulatedPage {
    /// Empty page with the given viewport height.
    #[must_use]
    pub fn new(viewport_height: f64) -> Self {
        Self {
            viewport_width: 1280.0,
            viewport_height,
            scroll_y: 0.0,
            elements: Vec::new(),
            document_height: None,
        }
    }

    /// Page of sections stacked top to bottom with the given heights.
    #[must_use]
    pub fn stacked(viewport_height: f64, sections: &[(&str, f64)]) -> Self {
        let mut page = Self::new(viewport_height);
        let mut top = 0.0;
        for &(id, height) in sections {
            page.insert_element(id, Extent::new(top, height));
            top += height;
        }
        page
    }

    /// Add an element, builder style.
    #[must_use]
    pub fn with_element(mut self, id: impl Into<String>, extent: Extent) -> Self {
        self.insert_element(id, extent);
        self
    }

    /// Add or replace an element.
    pub fn insert_element(&mut self, id: impl Into<String>, extent: Extent) {
        let id = id.into();
        match self.elements.iter_mut().find(|(key, _)| *key == id) {
            Some((_, slot)) => *slot = extent,
            None => self.elements.push((id, extent)),
        }
    }

    /// Take an element off the page.
    pub fn remove_element(&mut self, id: &str) -> Option<Extent> {
        let idx = self.elements.iter().position(|(key, _)| key == id)?;
        Some(self.elements.remove(idx).1)
    }

    /// Move an element to a new document top. Returns `false` if absent.
    pub fn move_element(&mut self, id: &str, top: f64) -> bool {
        match self.elements.iter_mut().find(|(key, _)| key == id) {
            Some((_, extent)) => {
                extent.top = top;
                true
            }
            None => false,
        }
    }

    /// Fix the document height instead of deriving it from the elements.
    pub fn set_document_height(&mut self, height: f64) {
        self.document_height = Some(height.max(0.0));
    }

    /// Document height: the fixed value, or the lowest element bottom.
    #[must_use]
    pub fn document_height(&self) -> f64 {
        self.document_height.unwrap_or_else(|| {
            self.elements
                .iter()
                .map(|(_, extent)| extent.bottom())
                .fold(0.0, f64::max)
        })
    }

    /// Largest reachable scroll offset.
    #[must_use]
    pub fn max_scroll(&self) -> f64 {
        (self.document_height() - self.viewport_height).max(0.0)
    }

    /// Viewport width.
    #[must_use]
    pub fn viewport_width(&self) -> f64 {
        self.viewport_width
    }

    /// Change the viewport size. The scroll offset is re-clamped.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.viewport_width = width.max(0.0);
        self.viewport_height = height.max(0.0);
        self.scroll_y = self.scroll_y.clamp(0.0, self.max_scroll());
    }

    /// Set the offset without clamping, as an elastic overscroll would.
    pub fn overscroll_to(&mut self, y: f64) {
        self.scroll_y = y;
    }
}

impl PageHost for SimulatedPage {
    fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    fn element_extent(&self, id: &str) -> Option<Extent> {
        self.elements
            .iter()
            .find(|(key, _)| key == id)
            .map(|(_, extent)| *extent)
    }

    fn set_scroll_y(&mut self, y: f64) {
        if y.is_finite() {
            self.scroll_y = y.clamp(0.0, self.max_scroll());
        }
    }

    fn set_viewport_size(&mut self, width: f64, height: f64) {
        self.resize(width, height);
    }

    fn follows_scroll_samples(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    fn page() -> SimulatedPage {
        SimulatedPage::stacked(900.0, &[("home", 800.0), ("about", 800.0), ("contact", 600.0)])
    }

    #[test]
    fn stacked_sections_are_contiguous() {
        let page = page();
        assert_eq!(page.section_top("home"), Some(0.0));
        assert_eq!(page.section_top("about"), Some(800.0));
        assert_eq!(page.section_top("contact"), Some(1600.0));
        assert_eq!(page.document_height(), 2200.0);
        assert_eq!(page.max_scroll(), 1300.0);
    }

    #[test]
    fn scroll_is_clamped_to_document() {
        let mut page = page();
        page.set_scroll_y(5000.0);
        assert_eq!(page.scroll_y(), 1300.0);
        page.set_scroll_y(-20.0);
        assert_eq!(page.scroll_y(), 0.0);
        page.set_scroll_y(f64::NAN);
        assert_eq!(page.scroll_y(), 0.0);
    }

    #[test]
    fn overscroll_bypasses_clamp() {
        let mut page = page();
        page.overscroll_to(-120.0);
        assert_eq!(page.scroll_y(), -120.0);
    }

    #[test]
    fn remove_and_move_elements() {
        let mut page = page();
        assert_eq!(page.remove_element("about"), Some(Extent::new(800.0, 800.0)));
        assert_eq!(page.element_extent("about"), None);
        assert_eq!(page.remove_element("about"), None);

        assert!(page.move_element("contact", 900.0));
        assert_eq!(page.section_top("contact"), Some(900.0));
        assert!(!page.move_element("missing", 0.0));
    }

    #[test]
    fn fixed_document_height_and_resize() {
        let mut page = page();
        page.set_document_height(4000.0);
        page.set_scroll_y(3000.0);
        assert_eq!(page.scroll_y(), 3000.0);

        page.resize(375.0, 1200.0);
        assert_eq!(page.viewport_width(), 375.0);
        assert_eq!(page.scroll_y(), 2800.0);
    }

    #[test]
    fn viewport_reflects_scroll() {
        let mut page = SimulatedPage::new(600.0).with_element("hero", Extent::new(0.0, 1200.0));
        page.set_scroll_y(300.0);
        let viewport = page.viewport();
        assert_eq!(viewport.scroll_y, 300.0);
        assert_eq!(viewport.height, 600.0);
    }
}
