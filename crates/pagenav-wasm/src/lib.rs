#![forbid(unsafe_code)]

//! Browser binding for the page navigation runtime.
//!
//! On `wasm32` this crate exports `PageNav`, a `wasm-bindgen` class that owns a
//! [`PageProgram`](pagenav_web::page_program::PageProgram) over the live DOM.
//! The page script forwards `scroll`, `resize` and link `click` events to it
//! and calls `frame(now)` from `requestAnimationFrame`:
//!
//! ```js
//! const nav = new PageNav(["home", "about", "services", "projects", "testimonials", "contact"]);
//! window.addEventListener("scroll", () => nav.onScroll(), { passive: true });
//! link.addEventListener("click", (e) => { e.preventDefault(); nav.navigateTo("about"); });
//! requestAnimationFrame(function loop(now) {
//!   if (nav.frame(now) !== 0) render(nav.activeSection(), nav.isScrolled());
//!   requestAnimationFrame(loop);
//! });
//! ```

use core::time::Duration;

use pagenav_core::event::{LinkSource, PageEvent};

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::{DomHost, PageNav};

/// Native builds compile this crate as a stub so `cargo check --workspace` stays
/// green on non-wasm targets.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Default)]
pub struct PageNav;

#[cfg(not(target_arch = "wasm32"))]
impl PageNav {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self
    }
}

/// Convert a `requestAnimationFrame` timestamp (milliseconds) to a clock value.
/// Non-finite or negative timestamps yield `None`.
#[must_use]
pub fn frame_time(now_ms: f64) -> Option<Duration> {
    if !now_ms.is_finite() || now_ms < 0.0 {
        return None;
    }
    Duration::try_from_secs_f64(now_ms / 1000.0).ok()
}

/// Event for a navigation link. `mobile` links live in the drawer and close it.
#[must_use]
pub fn link_event(target: &str, mobile: bool) -> PageEvent {
    PageEvent::Navigate {
        target: target.to_string(),
        source: if mobile {
            LinkSource::Mobile
        } else {
            LinkSource::Desktop
        },
    }
}
