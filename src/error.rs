//! Error types.
//!
//! Only contract violations surface as errors. Recoverable tree problems
//! (malformed nodes, missing keys, avoidable remounts) are reported as
//! [`Diagnostic`](crate::reconciler::Diagnostic)s and never abort a pass.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A hook slot was consumed by a different hook than on the previous render.
    #[error("hook order changed in `{component}`: slot {slot} held {expected}, render asked for {found}")]
    HookOrder {
        component: String,
        slot: usize,
        expected: &'static str,
        found: &'static str,
    },

    /// A re-render consumed a different number of hook slots.
    #[error("`{component}` used {found} hooks but its first render used {expected}")]
    HookCount {
        component: String,
        expected: usize,
        found: usize,
    },

    /// A fragment resolved to no mountable children.
    #[error("fragment at {path} has no children to mount")]
    EmptyFragment { path: String },

    #[error("invalid dimension `{input}`: {reason}")]
    InvalidDimension { input: String, reason: &'static str },

    #[error("no tree is mounted on root {0}")]
    NotMounted(String),

    /// The runtime was re-entered from a callback while a pass was running.
    #[error("runtime is busy: {0} called during a render, effect, or layout pass")]
    RuntimeBusy(&'static str),

    #[error("the runtime behind this handle has been dropped")]
    RuntimeDropped,
}

pub type Result<T> = std::result::Result<T, Error>;
