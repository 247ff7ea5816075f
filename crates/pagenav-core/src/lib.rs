#![forbid(unsafe_code)]

//! Core: page events, scroll animation, coalescing, geometry and reveal tracking.
//!
//! Everything here is platform-free and clock-free: time only moves when the
//! caller passes a `Duration` in.

pub mod animation;
pub mod event;
pub mod event_coalescer;
pub mod geometry;
pub mod logging;
pub mod reveal;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, debug_span, info, trace, warn};
