//! Rules: static lookups and pattern-driven handlers.
//!
//! A static rule maps an exact token to fixed output. A dynamic rule pairs a
//! regular expression with a [`RuleHandler`] that turns the captured groups
//! into output, or declines by returning `Ok(None)` so later rules get a
//! chance even though the pattern matched.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use bitflags::bitflags;

use crate::entries::{CssBlock, CssEntries};
use crate::error::HandlerError;
use crate::theme::Theme;
use crate::variant::VariantHandler;

bitflags! {
    /// Behaviour flags carried by rule metadata.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct RuleFlags: u8 {
        /// Only matches from inside a shortcut expansion.
        const INTERNAL = 0b0000_0001;
        /// Output is never merged with other selectors.
        const NO_MERGE = 0b0000_0010;
    }
}

/// Metadata attached to a rule.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleMeta {
    pub layer: Option<String>,
    pub sort: Option<i32>,
    /// Required token prefixes, stripped before pattern matching.
    pub prefix: Vec<String>,
    pub flags: RuleFlags,
}

impl RuleMeta {
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

    pub fn internal(mut self) -> Self {
        self.flags |= RuleFlags::INTERNAL;
        self
    }

    pub fn no_merge(mut self) -> Self {
        self.flags |= RuleFlags::NO_MERGE;
        self
    }

    pub fn is_internal(&self) -> bool {
        self.flags.contains(RuleFlags::INTERNAL)
    }

    pub fn is_no_merge(&self) -> bool {
        self.flags.contains(RuleFlags::NO_MERGE)
    }
}

/// One output of a rule.
#[derive(Debug, Clone)]
pub enum RuleItem {
    Block(CssBlock),
    /// Raw CSS text emitted as-is, outside any selector.
    Raw(String),
}

impl From<CssBlock> for RuleItem {
    fn from(block: CssBlock) -> Self {
        RuleItem::Block(block)
    }
}

impl From<CssEntries> for RuleItem {
    fn from(entries: CssEntries) -> Self {
        RuleItem::Block(entries.into())
    }
}

impl From<String> for RuleItem {
    fn from(css: String) -> Self {
        RuleItem::Raw(css)
    }
}

impl From<&str> for RuleItem {
    fn from(css: &str) -> Self {
        RuleItem::Raw(css.to_string())
    }
}

/// `Ok(None)` declines, `Err` fails the token.
pub type HandlerResult = Result<Option<Vec<RuleItem>>, HandlerError>;

/// Emits a single output.
pub fn emit(item: impl Into<RuleItem>) -> HandlerResult {
    Ok(Some(vec![item.into()]))
}

/// Emits every item of a lazily produced sequence. An empty sequence declines.
pub fn emit_all<I, T>(items: I) -> HandlerResult
where
    I: IntoIterator<Item = T>,
    T: Into<RuleItem>,
{
    let items: Vec<RuleItem> = items.into_iter().map(Into::into).collect();
    Ok((!items.is_empty()).then_some(items))
}

/// Captured groups of a pattern match; group 0 is the whole match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captures(Vec<Option<String>>);

impl Captures {
    pub fn new(groups: Vec<Option<String>>) -> Self {
        Self(groups)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).and_then(|group| group.as_deref())
    }

    /// The whole matched text.
    pub fn full(&self) -> &str {
        self.get(0).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&regex::Captures<'_>> for Captures {
    fn from(caps: &regex::Captures<'_>) -> Self {
        Self(
            caps.iter()
                .map(|group| group.map(|m| m.as_str().to_string()))
                .collect(),
        )
    }
}

/// Read-only context handed to rule and shortcut handlers.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    /// The token as written, variants included.
    pub raw: &'a str,
    /// The token after variant stripping.
    pub current: &'a str,
    pub theme: &'a Theme,
    pub variant_handlers: &'a [VariantHandler],
    /// Prefixes supplied by an enclosing shortcut.
    pub shortcut_prefix: Option<&'a [String]>,
}

/// Produces output for a dynamic rule. May suspend.
#[async_trait]
pub trait RuleHandler: Send + Sync {
    async fn handle(&self, captures: &Captures, ctx: &RuleContext<'_>) -> HandlerResult;
}

struct FnRuleHandler<F>(F);

#[async_trait]
impl<F> RuleHandler for FnRuleHandler<F>
where
    F: Fn(&Captures, &RuleContext<'_>) -> HandlerResult + Send + Sync,
{
    async fn handle(&self, captures: &Captures, ctx: &RuleContext<'_>) -> HandlerResult {
        (self.0)(captures, ctx)
    }
}

/// A rule as declared in a configuration.
#[derive(Clone)]
pub enum Rule {
    Static {
        key: String,
        items: Vec<RuleItem>,
        meta: RuleMeta,
    },
    Dynamic {
        pattern: String,
        handler: Arc<dyn RuleHandler>,
        meta: RuleMeta,
    },
}

impl Rule {
    /// A static rule with a single output.
    pub fn new_static(key: impl Into<String>, item: impl Into<RuleItem>) -> Self {
        Rule::Static {
            key: key.into(),
            items: vec![item.into()],
            meta: RuleMeta::default(),
        }
    }

    /// A static rule with several outputs.
    pub fn static_items(key: impl Into<String>, items: Vec<RuleItem>) -> Self {
        Rule::Static {
            key: key.into(),
            items,
            meta: RuleMeta::default(),
        }
    }

    /// A dynamic rule backed by a synchronous closure.
    pub fn dynamic<F>(pattern: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Captures, &RuleContext<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        Rule::Dynamic {
            pattern: pattern.into(),
            handler: Arc::new(FnRuleHandler(handler)),
            meta: RuleMeta::default(),
        }
    }

    /// A dynamic rule backed by an asynchronous handler.
    pub fn dynamic_async(pattern: impl Into<String>, handler: impl RuleHandler + 'static) -> Self {
        Rule::Dynamic {
            pattern: pattern.into(),
            handler: Arc::new(handler),
            meta: RuleMeta::default(),
        }
    }

    pub fn with_meta(mut self, new_meta: RuleMeta) -> Self {
        match &mut self {
            Rule::Static { meta, .. } | Rule::Dynamic { meta, .. } => *meta = new_meta,
        }
        self
    }

    pub fn meta(&self) -> &RuleMeta {
        match self {
            Rule::Static { meta, .. } | Rule::Dynamic { meta, .. } => meta,
        }
    }

    pub fn is_static(&self) -> bool {
        matches!(self, Rule::Static { .. })
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Static { key, items, meta } => f
                .debug_struct("Static")
                .field("key", key)
                .field("items", items)
                .field("meta", meta)
                .finish(),
            Rule::Dynamic { pattern, meta, .. } => f
                .debug_struct("Dynamic")
                .field("pattern", pattern)
                .field("meta", meta)
                .finish_non_exhaustive(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_from_regex() {
        let re = regex::Regex::new(r"^m-(\d+)(?:-(x))?$").unwrap();
        let caps = Captures::from(&re.captures("m-4").unwrap());
        assert_eq!(caps.full(), "m-4");
        assert_eq!(caps.get(1), Some("4"));
        assert_eq!(caps.get(2), None);
        assert_eq!(caps.get(9), None);
    }

    #[test]
    fn emit_all_declines_on_empty() {
        assert!(emit_all(Vec::<RuleItem>::new()).unwrap().is_none());
        let items = emit_all(["a{}", "b{}"]).unwrap().unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn meta_flags() {
        let meta = RuleMeta::new().internal().with_prefix(["foo-"]);
        assert!(meta.is_internal());
        assert!(!meta.is_no_merge());
        assert_eq!(meta.prefix, vec!["foo-".to_string()]);
    }

    #[tokio::test]
    async fn closure_handlers_run_through_the_trait() {
        let rule = Rule::dynamic("^p-(\\d+)$", |caps, _| {
            emit(CssBlock::new().entry("padding", format!("{}px", caps.get(1).unwrap_or("0"))))
        });
        let Rule::Dynamic { handler, .. } = rule else {
            panic!("expected a dynamic rule");
        };
        let theme = Theme::new();
        let ctx = RuleContext {
            raw: "p-2",
            current: "p-2",
            theme: &theme,
            variant_handlers: &[],
            shortcut_prefix: None,
        };
        let caps = Captures::new(vec![Some("p-2".into()), Some("2".into())]);
        let out = handler.handle(&caps, &ctx).await.unwrap().unwrap();
        match &out[0] {
            RuleItem::Block(block) => assert_eq!(block.entries[0].value.as_deref(), Some("2px")),
            RuleItem::Raw(_) => panic!("expected a block"),
        }
    }
}
