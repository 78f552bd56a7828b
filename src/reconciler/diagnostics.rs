//! Developer diagnostics.
//!
//! Problems that don't stop a pass: malformed nodes, unkeyed lists,
//! avoidable remounts. Each one is logged with `tracing::warn!` and kept in
//! a bounded buffer the runtime exposes.

use std::collections::VecDeque;
use std::fmt;

use tracing::warn;

use crate::config::DiagnosticsConfig;
use crate::vdom::VNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// A node couldn't be mounted as written and was replaced by a placeholder.
    MalformedNode,
    /// Siblings look like a dynamic list but lack keys.
    MissingKeys,
    /// A subtree remounted because a component's identity changed while its name didn't.
    UnnecessaryRemount,
    /// A memoized component re-rendered only because a callback prop changed identity.
    UnstableCallback,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::MalformedNode => "malformed node",
            Self::MissingKeys => "missing keys",
            Self::UnnecessaryRemount => "unnecessary remount",
            Self::UnstableCallback => "unstable callback",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Component/element path, e.g. `App > List > view[3]`.
    pub path: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}: {}", self.kind, self.path, self.message)
    }
}

pub(crate) struct Diagnostics {
    config: DiagnosticsConfig,
    entries: VecDeque<Diagnostic>,
}

impl Diagnostics {
    pub fn new(config: DiagnosticsConfig) -> Self {
        Self {
            config,
            entries: VecDeque::new(),
        }
    }

    pub fn enabled(&self, kind: DiagnosticKind) -> bool {
        match kind {
            DiagnosticKind::MalformedNode => self.config.malformed,
            DiagnosticKind::MissingKeys => self.config.missing_keys,
            DiagnosticKind::UnnecessaryRemount | DiagnosticKind::UnstableCallback => self.config.remounts,
        }
    }

    pub fn report(&mut self, kind: DiagnosticKind, path: String, message: String) {
        if !self.enabled(kind) {
            return;
        }
        warn!(%kind, %path, "{message}");
        if self.config.capacity == 0 {
            return;
        }
        if self.entries.len() >= self.config.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(Diagnostic { kind, path, message });
    }

    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries.iter().cloned().collect()
    }

    pub fn take(&mut self) -> Vec<Diagnostic> {
        self.entries.drain(..).collect()
    }

    /// Whether `children` look like a dynamic list missing keys.
    ///
    /// Either some type repeats `list_threshold` times among unkeyed siblings
    /// while nothing is keyed, or some siblings are keyed and the unkeyed
    /// share reaches `missing_key_ratio`. Text children are ignored.
    pub fn missing_keys(&self, children: &[VNode]) -> Option<String> {
        let candidates: Vec<&VNode> = children.iter().filter(|c| !matches!(c, VNode::Text(_))).collect();
        if candidates.len() < 2 {
            return None;
        }

        let unkeyed: Vec<&VNode> = candidates.iter().copied().filter(|c| c.key().is_none()).collect();
        if unkeyed.is_empty() {
            return None;
        }
        let keyed = candidates.len() - unkeyed.len();

        if keyed == 0 {
            let mut counts: Vec<(&str, usize)> = Vec::new();
            for child in &unkeyed {
                let name = child.display_name();
                match counts.iter_mut().find(|(n, _)| *n == name) {
                    Some((_, count)) => *count += 1,
                    None => counts.push((name, 1)),
                }
            }
            let (name, count) = counts.into_iter().max_by_key(|(_, count)| *count)?;
            return (count >= self.config.list_threshold.max(2))
                .then(|| format!("{count} unkeyed `{name}` siblings; give list items a stable key"));
        }

        let ratio = unkeyed.len() as f32 / candidates.len() as f32;
        (ratio >= self.config.missing_key_ratio).then(|| {
            format!(
                "{} of {} siblings have no key while others do; key every list item",
                unkeyed.len(),
                candidates.len()
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vdom::view;

    fn diagnostics() -> Diagnostics {
        Diagnostics::new(DiagnosticsConfig::default())
    }

    #[test]
    fn test_unkeyed_list_detected() {
        let children: Vec<VNode> = (0..5).map(|_| view().build()).collect();
        assert!(diagnostics().missing_keys(&children).is_some());
        assert!(diagnostics().missing_keys(&children[..4]).is_none());
    }

    #[test]
    fn test_mixed_keys_detected() {
        let children = vec![view().key(1).build(), view().build(), view().build()];
        assert!(diagnostics().missing_keys(&children).is_some());

        let mostly_keyed = vec![view().key(1).build(), view().key(2).build(), view().key(3).build(), view().build()];
        assert!(diagnostics().missing_keys(&mostly_keyed).is_none());
    }

    #[test]
    fn test_buffer_is_bounded() {
        let mut d = Diagnostics::new(DiagnosticsConfig {
            capacity: 2,
            ..DiagnosticsConfig::default()
        });
        for i in 0..3 {
            d.report(DiagnosticKind::MalformedNode, format!("p{i}"), String::new());
        }
        let paths: Vec<_> = d.take().into_iter().map(|e| e.path).collect();
        assert_eq!(paths, ["p1", "p2"]);
        assert!(d.entries().is_empty());
    }

    #[test]
    fn test_disabled_kinds_are_dropped() {
        let mut d = Diagnostics::new(DiagnosticsConfig {
            missing_keys: false,
            ..DiagnosticsConfig::default()
        });
        d.report(DiagnosticKind::MissingKeys, "App".into(), "x".into());
        assert!(d.entries().is_empty());
    }
}
