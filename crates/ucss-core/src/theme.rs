//! Read-only theme lookup for rule and variant handlers.
//!
//! The engine treats the theme as opaque nested key/value data. Handlers
//! look values up by dotted path:
//!
//! ```rust
//! use ucss_core::theme::Theme;
//!
//! let theme = Theme::new()
//!     .with("colors.red.500", "#ef4444")
//!     .with("breakpoints.sm", "640px");
//!
//! assert_eq!(theme.get_str("colors.red.500"), Some("#ef4444"));
//! assert!(theme.get("colors.red").is_some());
//! assert_eq!(theme.get_str("colors.red"), None);
//! ```

use indexmap::IndexMap;

/// A theme node: either a leaf value or a nested table.
#[derive(Debug, Clone, PartialEq)]
pub enum ThemeValue {
    Value(String),
    Table(IndexMap<String, ThemeValue>),
}

impl ThemeValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ThemeValue::Value(value) => Some(value),
            ThemeValue::Table(_) => None,
        }
    }

    pub fn as_table(&self) -> Option<&IndexMap<String, ThemeValue>> {
        match self {
            ThemeValue::Table(table) => Some(table),
            ThemeValue::Value(_) => None,
        }
    }
}

impl From<&str> for ThemeValue {
    fn from(value: &str) -> Self {
        ThemeValue::Value(value.to_string())
    }
}

impl From<String> for ThemeValue {
    fn from(value: String) -> Self {
        ThemeValue::Value(value)
    }
}

/// Nested theme data keyed by dotted paths.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Theme {
    root: IndexMap<String, ThemeValue>,
}

impl Theme {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Builder form of [`Theme::insert`].
    pub fn with(mut self, path: &str, value: impl Into<ThemeValue>) -> Self {
        self.insert(path, value);
        self
    }

    /// Inserts a value at a dotted path, creating intermediate tables.
    ///
    /// A leaf sitting where a table is needed is replaced by the table.
    pub fn insert(&mut self, path: &str, value: impl Into<ThemeValue>) {
        let mut segments = path.split('.').filter(|s| !s.is_empty()).peekable();
        let mut table = &mut self.root;
        while let Some(segment) = segments.next() {
            if segments.peek().is_none() {
                table.insert(segment.to_string(), value.into());
                return;
            }
            let node = table
                .entry(segment.to_string())
                .or_insert_with(|| ThemeValue::Table(IndexMap::new()));
            if let ThemeValue::Value(_) = node {
                *node = ThemeValue::Table(IndexMap::new());
            }
            table = match node {
                ThemeValue::Table(inner) => inner,
                ThemeValue::Value(_) => return,
            };
        }
    }

    /// Looks up a node by dotted path.
    pub fn get(&self, path: &str) -> Option<&ThemeValue> {
        let mut segments = path.split('.').filter(|s| !s.is_empty());
        let mut node = self.root.get(segments.next()?)?;
        for segment in segments {
            node = node.as_table()?.get(segment)?;
        }
        Some(node)
    }

    /// Looks up a leaf value by dotted path.
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(ThemeValue::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_insert_and_lookup() {
        let mut theme = Theme::new();
        theme.insert("colors.blue.400", "#60a5fa");
        theme.insert("colors.blue.500", "#3b82f6");

        assert_eq!(theme.get_str("colors.blue.400"), Some("#60a5fa"));
        let blues = theme.get("colors.blue").and_then(ThemeValue::as_table).unwrap();
        assert_eq!(blues.len(), 2);
    }

    #[test]
    fn missing_paths() {
        let theme = Theme::new().with("spacing.1", "0.25rem");
        assert!(theme.get("spacing.2").is_none());
        assert!(theme.get("spacing.1.x").is_none());
        assert!(theme.get("").is_none());
    }

    #[test]
    fn leaf_is_replaced_by_table() {
        let theme = Theme::new().with("colors.black", "#000").with("colors.black.soft", "#111");
        assert_eq!(theme.get_str("colors.black.soft"), Some("#111"));
    }
}
