//! Terminal renderer.
//!
//! ```text
//! MemoryHost scene → paint → FrameBuffer → DiffRenderer → terminal
//! ```
//!
//! Painting is a pure function of the scene; the diff renderer keeps the
//! previous buffer and writes only cells that changed.

pub mod buffer;
pub mod diff;
pub mod paint;

pub use buffer::{Cell, ClipRect, FrameBuffer};
pub use diff::DiffRenderer;
pub use paint::paint;
