//! Applying variant handlers and serializing a utility.

use std::sync::Arc;

use log::trace;
use ucss_core::entries::{UtilObject, entries_to_css};
use ucss_core::escape::to_escaped_selector;
use ucss_core::registry::ResolvedConfig;
use ucss_core::variant::{VariantHandler, VariantHandlerContext};

use crate::cache::ParentOrders;
use crate::matcher::{ParsedItem, ParsedUtil};

/// Layer, sort key and merge eligibility of a compiled utility.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UtilMeta {
    pub layer: Option<String>,
    pub sort: Option<i32>,
    pub no_merge: bool,
}

/// Provenance kept when `details` is enabled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceContext {
    pub raw: String,
    /// The token after preprocessing and variant stripping.
    pub current_selector: String,
    pub variants: Vec<String>,
    /// Keys or patterns of the rules that produced output.
    pub rules: Vec<String>,
    pub shortcuts: Vec<String>,
}

/// One compiled utility, ready for assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct StringifiedUtil {
    /// Declaration index of the producing rule; `usize::MAX` for inline
    /// shortcut CSS.
    pub index: usize,
    /// `None` for raw CSS.
    pub selector: Option<String>,
    pub body: String,
    pub parent: Option<String>,
    pub meta: UtilMeta,
    /// The variant-stripped token, used as a sort tie-breaker.
    pub current: String,
    pub context: Option<Arc<SourceContext>>,
    /// Merge override set by a variant.
    pub variant_no_merge: Option<bool>,
}

impl StringifiedUtil {
    pub fn layer(&self) -> Option<&str> {
        self.meta.layer.as_deref()
    }

    /// True when this utility must be emitted as its own block.
    pub fn never_merge(&self) -> bool {
        self.variant_no_merge.unwrap_or(self.meta.no_merge)
    }
}

fn compose(handlers: &[&VariantHandler], input: VariantHandlerContext) -> VariantHandlerContext {
    let Some((handler, rest)) = handlers.split_first() else {
        return input;
    };
    let output = handler.apply(input);
    match &handler.handle {
        Some(handle) => handle(output, &|ctx| compose(rest, ctx)),
        None => compose(rest, output),
    }
}

/// Runs `handlers` over a parsed utility and the postprocessors over the
/// result. `raw` is the token the selector is escaped from.
pub fn apply_variants(
    config: &ResolvedConfig,
    util: &ParsedUtil,
    handlers: &[VariantHandler],
    raw: &str,
    parent_orders: &ParentOrders,
) -> UtilObject {
    let mut sorted: Vec<&VariantHandler> = handlers.iter().collect();
    sorted.sort_by_key(|handler| handler.order);

    let input = VariantHandlerContext {
        selector: to_escaped_selector(raw),
        entries: util.entries.clone(),
        ..Default::default()
    };
    let result = compose(&sorted, input);

    if let (Some(parent), Some(order)) = (&result.parent, result.parent_order) {
        parent_orders.record(parent, order);
    }

    let mut obj = UtilObject {
        selector: result.selector,
        entries: result.entries,
        parent: result.parent,
        layer: result.layer,
        sort: result.sort,
        no_merge: result.no_merge,
    };
    for postprocess in &config.postprocess {
        postprocess(&mut obj);
    }
    obj
}

/// Serializes one parsed item. An empty body yields `None`.
pub fn stringify_util(
    config: &ResolvedConfig,
    item: &ParsedItem,
    raw: &str,
    current: &str,
    parent_orders: &ParentOrders,
) -> Option<StringifiedUtil> {
    match item {
        ParsedItem::Raw {
            index, css, meta, ..
        } => Some(StringifiedUtil {
            index: *index,
            selector: None,
            body: css.clone(),
            parent: None,
            meta: UtilMeta {
                layer: meta.as_ref().and_then(|m| m.layer.clone()),
                sort: meta.as_ref().and_then(|m| m.sort),
                no_merge: meta.as_ref().is_some_and(|m| m.is_no_merge()),
            },
            current: current.to_string(),
            context: None,
            variant_no_merge: None,
        }),
        ParsedItem::Util(util) => {
            let obj = apply_variants(config, util, &util.handlers, raw, parent_orders);
            let body = entries_to_css(&obj.entries);
            if body.is_empty() {
                trace!("`{raw}` produced an empty body");
                return None;
            }
            let meta = util.meta.as_ref();
            Some(StringifiedUtil {
                index: util.index,
                selector: Some(obj.selector),
                body,
                parent: obj.parent,
                meta: UtilMeta {
                    layer: obj.layer.or_else(|| meta.and_then(|m| m.layer.clone())),
                    sort: obj.sort.or_else(|| meta.and_then(|m| m.sort)),
                    no_merge: meta.is_some_and(|m| m.is_no_merge()),
                },
                current: current.to_string(),
                context: None,
                variant_no_merge: obj.no_merge,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ucss_core::config::UserConfig;
    use ucss_core::entries::CssEntry;
    use ucss_core::registry::resolve_config;
    use ucss_core::rule::RuleMeta;

    fn util(handlers: Vec<VariantHandler>) -> ParsedUtil {
        ParsedUtil {
            index: 3,
            raw: "hover:c-red".into(),
            entries: vec![CssEntry::new("color", "red")],
            meta: Some(RuleMeta::new().with_layer("colors")),
            handlers,
            rule: "^c-(.+)$".into(),
        }
    }

    #[test]
    fn handlers_apply_in_order() {
        let config = resolve_config(UserConfig::new()).unwrap();
        let orders = ParentOrders::new();
        let parsed = util(Vec::new());
        let handlers = vec![
            VariantHandler::transform()
                .with_order(2)
                .with_selector(|s, _| Some(format!("{s}:focus"))),
            VariantHandler::transform()
                .with_order(1)
                .with_selector(|s, _| Some(format!("{s}:hover"))),
        ];
        let obj = apply_variants(&config, &parsed, &handlers, "hover:c-red", &orders);
        assert_eq!(obj.selector, ".hover\\:c-red:hover:focus");
    }

    #[test]
    fn handle_wraps_the_rest_of_the_chain() {
        let config = resolve_config(UserConfig::new()).unwrap();
        let orders = ParentOrders::new();
        let handlers = vec![
            VariantHandler::transform().with_handle(|input, next| {
                let mut out = next(input);
                out.selector = format!(".dark {}", out.selector);
                out
            }),
            VariantHandler::transform().with_selector(|s, _| Some(format!("{s}:hover"))),
        ];
        let obj = apply_variants(&config, &util(Vec::new()), &handlers, "a", &orders);
        assert_eq!(obj.selector, ".dark .a:hover");
    }

    #[test]
    fn parent_order_is_recorded() {
        let config = resolve_config(UserConfig::new()).unwrap();
        let orders = ParentOrders::new();
        let handlers = vec![VariantHandler::transform().with_parent_order("@media (min-width: 640px)", 100)];
        let obj = apply_variants(&config, &util(Vec::new()), &handlers, "sm:a", &orders);
        assert_eq!(obj.parent.as_deref(), Some("@media (min-width: 640px)"));
        assert_eq!(orders.get("@media (min-width: 640px)"), Some(100));
    }

    #[test]
    fn variant_layer_overrides_rule_layer() {
        let config = resolve_config(UserConfig::new()).unwrap();
        let orders = ParentOrders::new();

        let item = ParsedItem::Util(util(Vec::new()));
        let out = stringify_util(&config, &item, "c-red", "c-red", &orders).unwrap();
        assert_eq!(out.layer(), Some("colors"));
        assert_eq!(out.body, "color:red;");

        let item = ParsedItem::Util(util(vec![VariantHandler::transform().with_layer("print")]));
        let out = stringify_util(&config, &item, "c-red", "c-red", &orders).unwrap();
        assert_eq!(out.layer(), Some("print"));
    }

    #[test]
    fn empty_body_is_no_output() {
        let config = resolve_config(UserConfig::new()).unwrap();
        let orders = ParentOrders::new();
        let item = ParsedItem::Util(util(vec![VariantHandler::transform().with_body(|_| Some(Vec::new()))]));
        assert!(stringify_util(&config, &item, "c-red", "c-red", &orders).is_none());
    }

    #[test]
    fn postprocessors_see_the_final_object() {
        let config = resolve_config(UserConfig::new().with_postprocess(|obj| {
            obj.selector = format!(":where({})", obj.selector);
        }))
        .unwrap();
        let orders = ParentOrders::new();
        let obj = apply_variants(&config, &util(Vec::new()), &[], "a", &orders);
        assert_eq!(obj.selector, ":where(.a)");
    }
}
