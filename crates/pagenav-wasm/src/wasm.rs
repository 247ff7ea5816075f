#![forbid(unsafe_code)]

use pagenav_core::event::PageEvent;
use pagenav_core::geometry::Extent;
use pagenav_web::PageHost;
use pagenav_web::config::NavConfig;
use pagenav_web::page_program::PageProgram;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Window};

use crate::{frame_time, link_event};

fn js_error(message: &str) -> JsValue {
    js_sys::Error::new(message).into()
}

/// [`PageHost`] backed by the browser window.
pub struct DomHost {
    window: Window,
    document: Document,
}

impl DomHost {
    /// Bind to the global `window`.
    pub fn from_window() -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| js_error("no global window"))?;
        let document = window
            .document()
            .ok_or_else(|| js_error("window has no document"))?;
        Ok(Self { window, document })
    }
}

impl PageHost for DomHost {
    fn scroll_y(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn viewport_height(&self) -> f64 {
        self.window
            .inner_height()
            .ok()
            .and_then(|h| h.as_f64())
            .unwrap_or(0.0)
    }

    fn element_extent(&self, id: &str) -> Option<Extent> {
        let element = self.document.get_element_by_id(id)?;
        let rect = element.get_bounding_client_rect();
        Some(Extent::new(rect.top() + self.scroll_y(), rect.height()))
    }

    fn set_scroll_y(&mut self, y: f64) {
        self.window.scroll_to_with_x_and_y(0.0, y);
    }
}

/// Navigation runtime for a single-page site.
///
/// Events are queued by the handlers below and applied on the next `frame`.
#[wasm_bindgen]
pub struct PageNav {
    program: Option<PageProgram<DomHost>>,
}

#[wasm_bindgen]
impl PageNav {
    /// Register the page's section ids in document order.
    #[wasm_bindgen(constructor)]
    pub fn new(sections: Vec<String>) -> Result<PageNav, JsValue> {
        let host = DomHost::from_window()?;
        let mut program = PageProgram::new(host, NavConfig::default());
        program
            .init(sections)
            .map_err(|err| js_error(&err.to_string()))?;
        Ok(Self {
            program: Some(program),
        })
    }

    /// Forward a `scroll` event.
    #[wasm_bindgen(js_name = onScroll)]
    pub fn on_scroll(&mut self) {
        if let Some(program) = &mut self.program {
            let y = program.host().scroll_y();
            program.push_event(PageEvent::scroll(y));
        }
    }

    /// Scroll to a section. Unknown ids are rejected immediately.
    #[wasm_bindgen(js_name = navigateTo)]
    pub fn navigate_to(&mut self, id: &str, mobile: Option<bool>) -> Result<(), JsValue> {
        let program = self
            .program
            .as_mut()
            .ok_or_else(|| js_error("PageNav has been destroyed"))?;
        if !program.nav().sections().iter().any(|s| s.id() == id) {
            return Err(js_error(&format!("section not found: {id:?}")));
        }
        program.push_event(link_event(id, mobile.unwrap_or(false)));
        Ok(())
    }

    /// Scroll back to the first section.
    #[wasm_bindgen(js_name = scrollToTop)]
    pub fn scroll_to_top(&mut self) {
        if let Some(program) = &mut self.program {
            program.push_event(PageEvent::ScrollToTop);
        }
    }

    /// Open or close the mobile drawer.
    #[wasm_bindgen(js_name = toggleMenu)]
    pub fn toggle_menu(&mut self) {
        if let Some(program) = &mut self.program {
            program.push_event(PageEvent::ToggleMenu);
        }
    }

    /// Forward a `resize` event.
    pub fn resize(&mut self, width: f64, height: f64) {
        if let Some(program) = &mut self.program {
            program.push_event(PageEvent::Resize { width, height });
        }
    }

    /// Re-measure sections after content changed size (images, fonts).
    pub fn layout(&mut self) {
        if let Some(program) = &mut self.program {
            program.push_event(PageEvent::Layout);
        }
    }

    /// Advance to `now_ms` (a `requestAnimationFrame` timestamp) and apply
    /// queued events. Returns the change bits; zero means nothing to redraw.
    pub fn frame(&mut self, now_ms: f64) -> u8 {
        let Some(program) = &mut self.program else {
            return 0;
        };
        if let Some(now) = frame_time(now_ms) {
            program.set_time(now);
        }
        let result = program.step();
        // Rejections are already logged by the program.
        program.drain_errors();
        result.changes.bits()
    }

    /// Id of the highlighted section.
    #[wasm_bindgen(js_name = activeSection)]
    pub fn active_section(&self) -> Option<String> {
        self.program
            .as_ref()
            .and_then(|p| p.nav().active_section().map(str::to_string))
    }

    /// Whether the navigation bar should show its backdrop.
    #[wasm_bindgen(js_name = isScrolled)]
    pub fn is_scrolled(&self) -> bool {
        self.program.as_ref().is_some_and(|p| p.nav().is_scrolled())
    }

    /// Whether the mobile drawer is open.
    #[wasm_bindgen(js_name = isMenuOpen)]
    pub fn is_menu_open(&self) -> bool {
        self.program.as_ref().is_some_and(|p| p.menu().is_open())
    }

    /// Whether a section has played its entrance animation.
    #[wasm_bindgen(js_name = isRevealed)]
    pub fn is_revealed(&self, id: &str) -> bool {
        self.program
            .as_ref()
            .is_some_and(|p| p.reveal().is_revealed(id))
    }

    /// Full state as JSON.
    pub fn snapshot(&self) -> Result<String, JsValue> {
        let program = self
            .program
            .as_ref()
            .ok_or_else(|| js_error("PageNav has been destroyed"))?;
        serde_json::to_string(&program.snapshot()).map_err(|err| js_error(&err.to_string()))
    }

    /// Explicit teardown for JS callers. Stops any scroll animation and drops
    /// the DOM references.
    pub fn destroy(&mut self) {
        if let Some(mut program) = self.program.take() {
            program.shutdown();
        }
    }
}
