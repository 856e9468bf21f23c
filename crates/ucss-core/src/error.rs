//! Error types for configuration resolution and token compilation.
//!
//! Errors fall into two groups. Configuration defects (an invalid pattern, a
//! variant chain that never terminates) are fatal: they abort the current
//! batch and retrying will not help. Handler failures belong to a single
//! token and leave the rest of a batch untouched.

use std::fmt;

use thiserror::Error;

/// Errors that can occur while resolving a configuration or compiling tokens.
///
/// # Examples
///
/// ```rust
/// use ucss_core::config::UserConfig;
/// use ucss_core::registry::resolve_config;
/// use ucss_core::rule::{Rule, emit};
/// use ucss_core::entries::CssBlock;
///
/// // An unbalanced group is rejected when the registry is built.
/// let config = UserConfig::new().with_rule(Rule::dynamic("^m-(\\d+", |_, _| {
///     emit(CssBlock::new().entry("margin", "0"))
/// }));
/// let err = resolve_config(config).unwrap_err();
/// assert!(err.is_fatal());
/// ```
#[derive(Error, Debug)]
pub enum UcssError {
    /// Variant resolution kept matching past the handler limit.
    #[error("too many variants applied to \"{raw}\" (limit {limit})")]
    VariantCycle { raw: String, limit: usize },

    /// A rule, shortcut or blocklist pattern failed to compile.
    #[error("invalid {kind} pattern `{pattern}`")]
    InvalidPattern {
        kind: PatternKind,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A rule or shortcut handler reported a failure for one token.
    #[error("handler failed for \"{raw}\": {message}")]
    Handler { raw: String, message: String },

    /// The configuration is structurally invalid.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl UcssError {
    /// Returns true for configuration defects that must abort a whole batch.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, UcssError::Handler { .. })
    }
}

/// Which registry entry a pattern belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    Rule,
    Shortcut,
    Blocklist,
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PatternKind::Rule => "rule",
            PatternKind::Shortcut => "shortcut",
            PatternKind::Blocklist => "blocklist",
        })
    }
}

/// Error returned by rule and shortcut handlers.
///
/// Returning `Ok(None)` from a handler means "declined" and lets the next
/// rule try; returning this error means the handler itself failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct HandlerError {
    pub message: String,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, UcssError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handler_errors_are_not_fatal() {
        let err = UcssError::Handler {
            raw: "bg-nope".into(),
            message: "unknown color".into(),
        };
        assert!(!err.is_fatal());
        assert_eq!(
            err.to_string(),
            "handler failed for \"bg-nope\": unknown color"
        );
    }

    #[test]
    fn cycle_errors_are_fatal() {
        let err = UcssError::VariantCycle {
            raw: "x".into(),
            limit: 500,
        };
        assert!(err.is_fatal());
    }
}
