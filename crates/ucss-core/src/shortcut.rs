//! Shortcuts: tokens that expand into other tokens or inline CSS.

use std::fmt;
use std::sync::Arc;

use crate::entries::CssBlock;
use crate::rule::{Captures, RuleContext};

/// One element of a shortcut expansion.
#[derive(Debug, Clone)]
pub enum ShortcutItem {
    /// Whitespace-separated utilities; variant groups are allowed.
    Token(String),
    /// Inline CSS emitted under the shortcut's own selector.
    Css(CssBlock),
}

impl From<&str> for ShortcutItem {
    fn from(tokens: &str) -> Self {
        ShortcutItem::Token(tokens.to_string())
    }
}

impl From<String> for ShortcutItem {
    fn from(tokens: String) -> Self {
        ShortcutItem::Token(tokens)
    }
}

impl From<CssBlock> for ShortcutItem {
    fn from(block: CssBlock) -> Self {
        ShortcutItem::Css(block)
    }
}

pub type ShortcutValue = Vec<ShortcutItem>;

/// Metadata attached to a shortcut.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShortcutMeta {
    /// Target layer; the configured shortcuts layer when unset.
    pub layer: Option<String>,
    pub sort: Option<i32>,
    /// Required prefixes, stripped before matching and offered to prefixed rules.
    pub prefix: Vec<String>,
    pub no_merge: bool,
}

impl ShortcutMeta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layer(mut self, layer: impl Into<String>) -> Self {
        self.layer = Some(layer.into());
        self
    }

    pub fn with_sort(mut self, sort: i32) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn with_prefix<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prefix = prefixes.into_iter().map(Into::into).collect();
        self
    }

    pub fn no_merge(mut self) -> Self {
        self.no_merge = true;
        self
    }
}

pub type ShortcutFn =
    Arc<dyn Fn(&Captures, &RuleContext<'_>) -> Option<ShortcutValue> + Send + Sync>;

/// A shortcut as declared in a configuration.
#[derive(Clone)]
pub enum Shortcut {
    Static {
        key: String,
        value: ShortcutValue,
        meta: ShortcutMeta,
    },
    Dynamic {
        pattern: String,
        handler: ShortcutFn,
        meta: ShortcutMeta,
    },
}

impl Shortcut {
    /// A static shortcut expanding to a utility list, e.g. `"px-4 py-2 rounded"`.
    pub fn new(key: impl Into<String>, tokens: impl Into<String>) -> Self {
        Shortcut::Static {
            key: key.into(),
            value: vec![ShortcutItem::Token(tokens.into())],
            meta: ShortcutMeta::default(),
        }
    }

    /// A static shortcut with mixed token and inline CSS items.
    pub fn with_items(key: impl Into<String>, value: ShortcutValue) -> Self {
        Shortcut::Static {
            key: key.into(),
            value,
            meta: ShortcutMeta::default(),
        }
    }

    pub fn dynamic<F>(pattern: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Captures, &RuleContext<'_>) -> Option<ShortcutValue> + Send + Sync + 'static,
    {
        Shortcut::Dynamic {
            pattern: pattern.into(),
            handler: Arc::new(handler),
            meta: ShortcutMeta::default(),
        }
    }

    pub fn with_meta(mut self, new_meta: ShortcutMeta) -> Self {
        match &mut self {
            Shortcut::Static { meta, .. } | Shortcut::Dynamic { meta, .. } => *meta = new_meta,
        }
        self
    }

    pub fn meta(&self) -> &ShortcutMeta {
        match self {
            Shortcut::Static { meta, .. } | Shortcut::Dynamic { meta, .. } => meta,
        }
    }
}

impl fmt::Debug for Shortcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shortcut::Static { key, value, meta } => f
                .debug_struct("Static")
                .field("key", key)
                .field("value", value)
                .field("meta", meta)
                .finish(),
            Shortcut::Dynamic { pattern, meta, .. } => f
                .debug_struct("Dynamic")
                .field("pattern", pattern)
                .field("meta", meta)
                .finish_non_exhaustive(),
        }
    }
}
