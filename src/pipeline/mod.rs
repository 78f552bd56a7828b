//! Runtime pipeline
//!
//! Connects the reconciler to the host's frame loop.
//!
//! # Pipeline Architecture
//!
//! ```text
//! Setter::set → Scheduler → flush (re-render, patch, layout) → FrameQueue → frame (hit areas)
//! ```
//!
//! ## Data Flow
//!
//! 1. **mount** - builds the scene for a tree and lays it out
//! 2. **flush** - re-renders every component with a pending update,
//!    shallowest first; one render per component no matter how many
//!    setter calls it received
//! 3. **frame** - refreshes hit areas of nodes whose geometry changed in an
//!    earlier pass
//!
//! `tick` runs steps 2 and 3 and is meant to be called once per host frame.

pub mod mount;

pub use mount::{MountHandle, Runtime};
