//! Blocklist entries: tokens that must never produce CSS.

use std::fmt;
use std::sync::Arc;

use regex::Regex;

use crate::error::{PatternKind, Result, UcssError};

pub type BlockPredicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// How a blocklist entry recognises tokens.
#[derive(Clone)]
pub enum BlocklistRule {
    Exact(String),
    Pattern(String),
    Predicate(BlockPredicate),
}

/// Which kind of blocklist entry excluded a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Exact,
    Pattern,
    Predicate,
}

impl BlocklistRule {
    pub fn kind(&self) -> BlockKind {
        match self {
            BlocklistRule::Exact(_) => BlockKind::Exact,
            BlocklistRule::Pattern(_) => BlockKind::Pattern,
            BlocklistRule::Predicate(_) => BlockKind::Predicate,
        }
    }
}

impl fmt::Debug for BlocklistRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlocklistRule::Exact(value) => f.debug_tuple("Exact").field(value).finish(),
            BlocklistRule::Pattern(pattern) => f.debug_tuple("Pattern").field(pattern).finish(),
            BlocklistRule::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// Reporting metadata for a blocklist entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlocklistMeta {
    /// Why the token is blocked, for linters.
    pub message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct BlocklistEntry {
    pub rule: BlocklistRule,
    pub meta: BlocklistMeta,
}

impl BlocklistEntry {
    pub fn exact(token: impl Into<String>) -> Self {
        Self::from_rule(BlocklistRule::Exact(token.into()))
    }

    pub fn pattern(pattern: impl Into<String>) -> Self {
        Self::from_rule(BlocklistRule::Pattern(pattern.into()))
    }

    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self::from_rule(BlocklistRule::Predicate(Arc::new(f)))
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.meta.message = Some(message.into());
        self
    }

    fn from_rule(rule: BlocklistRule) -> Self {
        Self {
            rule,
            meta: BlocklistMeta::default(),
        }
    }
}

/// A blocklist entry with its pattern compiled.
#[derive(Debug, Clone)]
pub struct CompiledBlocklistEntry {
    pub entry: BlocklistEntry,
    regex: Option<Regex>,
}

impl CompiledBlocklistEntry {
    pub fn compile(entry: BlocklistEntry) -> Result<Self> {
        let regex = match &entry.rule {
            BlocklistRule::Pattern(pattern) => {
                Some(Regex::new(pattern).map_err(|source| UcssError::InvalidPattern {
                    kind: PatternKind::Blocklist,
                    pattern: pattern.clone(),
                    source,
                })?)
            }
            _ => None,
        };
        Ok(Self { entry, regex })
    }

    pub fn matches(&self, raw: &str) -> bool {
        match (&self.entry.rule, &self.regex) {
            (BlocklistRule::Exact(token), _) => token == raw,
            (BlocklistRule::Pattern(_), Some(regex)) => regex.is_match(raw),
            (BlocklistRule::Pattern(_), None) => false,
            (BlocklistRule::Predicate(f), _) => f(raw),
        }
    }
}
