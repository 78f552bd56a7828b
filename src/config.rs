//! Runtime configuration.
//!
//! # Example
//!
//! ```
//! use spark_scene::config::Config;
//! use spark_scene::types::Size;
//!
//! let config = Config::default()
//!     .with_viewport(Size::new(800.0, 600.0))
//!     .without_key_warnings();
//! assert!(!config.diagnostics.missing_keys);
//! ```

use crate::types::Size;

/// Which diagnostics are reported and how the list-key heuristic is tuned.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosticsConfig {
    /// Report malformed nodes replaced by placeholders.
    pub malformed: bool,
    /// Report sibling lists that look dynamic but lack keys.
    pub missing_keys: bool,
    /// Report remounts caused by unstable component or callback identity.
    pub remounts: bool,
    /// Siblings of one type (all unkeyed) at or above this count look like a list.
    pub list_threshold: usize,
    /// Fraction of unkeyed siblings that triggers a warning once any sibling is keyed.
    pub missing_key_ratio: f32,
    /// Retained diagnostics; older entries are dropped first.
    pub capacity: usize,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            malformed: true,
            missing_keys: true,
            remounts: true,
            list_threshold: 5,
            missing_key_ratio: 0.5,
            capacity: 256,
        }
    }
}

/// Runtime configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    /// Size of the root content area and the basis for `vw`/`vh`.
    ///
    /// When `None`, the host's cached size of the root node is used.
    pub viewport: Option<Size>,
    pub diagnostics: DiagnosticsConfig,
}

impl Config {
    pub fn with_viewport(mut self, viewport: Size) -> Self {
        self.viewport = Some(viewport);
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: DiagnosticsConfig) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn without_key_warnings(mut self) -> Self {
        self.diagnostics.missing_keys = false;
        self
    }

    /// Disable every diagnostic.
    pub fn quiet(mut self) -> Self {
        self.diagnostics.malformed = false;
        self.diagnostics.missing_keys = false;
        self.diagnostics.remounts = false;
        self
    }
}
