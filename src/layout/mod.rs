//! Layout - flexbox-style geometry for host containers.
//!
//! # Architecture
//!
//! - [`LayoutRecord`]: the layout-relevant part of a node's style, with
//!   defaults applied. Patches compare records to decide whether geometry
//!   changed.
//! - [`compute_children`]: frames for one container's direct children
//!   (row, column, or stack; grow/shrink, gap, justify, align, wrap).
//! - [`intrinsic_size`] and [`resolve_box`]: natural and resolved box sizes.
//!
//! The engine is pure. The reconciler decides when a container needs a pass
//! and pushes the resulting frames to the host.

mod engine;
mod record;
mod text_measure;

pub use engine::{LayoutItem, compute_children, intrinsic_size, resolve_box};
pub use record::LayoutRecord;
pub use text_measure::{measure_text, string_width, wrap_text};
