//! # spark-scene
//!
//! Retained-mode UI core: function components with hooks, a VNode
//! reconciler, and an incremental flexbox layout engine, driving any native
//! scene graph through a small host bridge.
//!
//! ## Architecture
//!
//! Components are plain functions from props to a [`VNode`] tree. The
//! reconciler mounts trees onto a [`HostBridge`], keeps one mount record per
//! VNode in a generational arena, and on every re-render patches only what
//! changed. Layout runs per container and only when layout-relevant input
//! changed.
//!
//! ```text
//! Component → VNode tree → reconciler (mount/patch/unmount) → HostBridge
//!                                   ↓
//!                          layout engine → place/clip
//! ```
//!
//! ## Modules
//!
//! - [`vdom`] - VNodes, props, styles, components
//! - [`hooks`] - render scope, state/ref/memo/effect hooks, scheduler
//! - [`layout`] - flex/stack engine and text measurement
//! - [`reconciler`] - diagnostics raised while reconciling
//! - [`host`] - host bridge trait and the in-memory scene graph
//! - [`theme`] - style context resolution
//! - [`gesture`] - hit-area sink notified after layout
//! - [`pipeline`] - [`Runtime`] and mount handles
//! - [`renderer`] - terminal output for [`MemoryHost`] scenes

mod arena;

pub mod config;
pub mod error;
pub mod gesture;
pub mod hooks;
pub mod host;
pub mod layout;
pub mod pipeline;
pub mod reconciler;
pub mod renderer;
pub mod theme;
pub mod types;
pub mod vdom;

// Re-export commonly used items
pub use config::{Config, DiagnosticsConfig};
pub use error::{Error, Result};

pub use types::{Align, AlignContent, Dimension, Direction, Edges, Frame, Justify, Overflow, Point, Size, Wrap};

pub use vdom::{
    Callback, Component, Element, Key, NodeRef, Props, RefSlot, Style, VNode, Value, element, fragment,
    keyed_fragment, text, view,
};

pub use hooks::{Cleanup, Scope, Setter};

pub use host::{HostBridge, MemoryHost, NodeCaps, NodeId};

pub use theme::{DefaultTheme, ThemeOverride, ThemeResolver};

pub use gesture::{GestureSink, HitAreas};

pub use reconciler::{Diagnostic, DiagnosticKind};

pub use pipeline::{MountHandle, Runtime};

pub use renderer::{DiffRenderer, FrameBuffer};
