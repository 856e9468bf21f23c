//! CSS property/value entries and the blocks rules emit.
//!
//! A rule produces [`CssBlock`]s: an ordered list of [`CssEntry`] pairs plus
//! an optional side channel that lets the rule request extra variants or
//! override the parent scope, selector, layer or sort key of its own output.

use crate::variant::VariantHandler;

/// A single `property: value` pair.
///
/// A `None` value marks the property as absent; it is kept so variants can
/// see and fill it, but it is dropped when the block is serialized.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CssEntry {
    pub property: String,
    pub value: Option<String>,
}

impl CssEntry {
    pub fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            value: Some(value.into()),
        }
    }

    /// An entry with no value.
    pub fn absent(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            value: None,
        }
    }
}

pub type CssEntries = Vec<CssEntry>;

/// Serializes entries as `property:value;` pairs.
///
/// Absent values are skipped, and an entry identical to an earlier one is
/// emitted only once.
pub fn entries_to_css(entries: &[CssEntry]) -> String {
    let mut out = String::new();
    for (idx, entry) in entries.iter().enumerate() {
        let Some(value) = &entry.value else {
            continue;
        };
        if entries[..idx].contains(entry) {
            continue;
        }
        out.push_str(&entry.property);
        out.push(':');
        out.push_str(value);
        out.push(';');
    }
    out
}

/// The output of a rule: entries plus side-channel overrides.
#[derive(Debug, Clone, Default)]
pub struct CssBlock {
    pub entries: CssEntries,
    /// Variant handlers to apply on top of the ones stripped from the token.
    pub variants: Vec<VariantHandler>,
    /// Parent scope override, e.g. `@supports (display: grid)`.
    pub parent: Option<String>,
    /// Selector override.
    pub selector: Option<String>,
    pub layer: Option<String>,
    pub sort: Option<i32>,
    /// Keep this block out of selector merging.
    pub no_merge: bool,
}

impl CssBlock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a `property: value` entry.
    pub fn entry(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.push(CssEntry::new(property, value));
        self
    }

    pub fn with_variant(mut self, handler: VariantHandler) -> Self {
        self.variants.push(handler);
        self
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(selector.into());
        self
    }

    pub fn with_layer(mut self, layer: impl Into<String>) -> Self {
        self.layer = Some(layer.into());
        self
    }

    pub fn with_sort(mut self, sort: i32) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn no_merge(mut self) -> Self {
        self.no_merge = true;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when the block carries any override besides its entries.
    pub fn has_side_channel(&self) -> bool {
        !self.variants.is_empty()
            || self.parent.is_some()
            || self.selector.is_some()
            || self.layer.is_some()
            || self.sort.is_some()
    }
}

impl From<CssEntries> for CssBlock {
    fn from(entries: CssEntries) -> Self {
        Self {
            entries,
            ..Default::default()
        }
    }
}

impl<K, V> FromIterator<(K, V)> for CssBlock
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .map(|(property, value)| CssEntry::new(property, value))
            .collect::<CssEntries>()
            .into()
    }
}

/// A compiled utility before serialization, as seen by postprocessors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UtilObject {
    pub selector: String,
    pub entries: CssEntries,
    pub parent: Option<String>,
    pub layer: Option<String>,
    pub sort: Option<i32>,
    pub no_merge: Option<bool>,
}
