//! Shortcut expansion and shortcut stringification.
//!
//! A shortcut expands into utility tokens and inline CSS. Expansion recurses
//! into the tokens it produces until the depth budget runs out. The
//! resulting utilities are compiled under the shortcut's own selector and
//! grouped so that one shortcut usually yields one rule per
//! `(layer, selector, parent)`.

use futures::future::try_join_all;
use indexmap::{IndexMap, IndexSet};
use log::warn;
use ucss_core::entries::{CssBlock, CssEntries, entries_to_css};
use ucss_core::error::{Result, UcssError};
use ucss_core::registry::{ResolvedConfig, ResolvedShortcut};
use ucss_core::rule::{Captures, RuleContext, RuleMeta};
use ucss_core::shortcut::{ShortcutItem, ShortcutMeta};
use ucss_core::variant::VariantHandler;
use ucss_core::variant_group::expand_variant_group;

use crate::cache::ParentOrders;
use crate::matcher::{ParsedItem, ParsedUtil, parse_util, side_channel_handlers};
use crate::stringify::{StringifiedUtil, UtilMeta, apply_variants, stringify_util};
use crate::variants::{VariantMatched, match_variants};

/// Marker used as the raw token of inline shortcut CSS.
const INLINE_RAW: &str = "{inline}";

/// One element of a flattened expansion.
#[derive(Debug, Clone)]
pub enum ExpandedItem {
    Token(String),
    /// Inline CSS with the handlers of any variants stripped on the way.
    Inline {
        block: CssBlock,
        handlers: Vec<VariantHandler>,
    },
}

#[derive(Debug, Clone)]
pub struct Expansion {
    pub items: Vec<ExpandedItem>,
    pub meta: Option<ShortcutMeta>,
}

/// Puts `item` where `processed` sat inside `raw`, keeping the variants
/// around it.
fn reattach_variants(raw: &str, processed: &str, item: &str) -> String {
    match raw.rfind(processed) {
        Some(pos) => format!("{}{}{}", &raw[..pos], item, &raw[pos + processed.len()..]),
        None => item.to_string(),
    }
}

fn find_shortcut(
    config: &ResolvedConfig,
    input: &str,
    ctx: &RuleContext<'_>,
    record: &mut Vec<String>,
) -> Option<(Vec<ShortcutItem>, ShortcutMeta)> {
    for shortcut in &config.shortcuts {
        let meta = shortcut.meta();
        let unprefixed = if meta.prefix.is_empty() {
            input
        } else {
            match meta.prefix.iter().find(|p| input.starts_with(p.as_str())) {
                Some(prefix) => &input[prefix.len()..],
                None => continue,
            }
        };

        let value = match shortcut {
            ResolvedShortcut::Static { key, value, .. } => (key == unprefixed).then(|| value.clone()),
            ResolvedShortcut::Dynamic {
                pattern, handler, ..
            } => pattern
                .captures(unprefixed)
                .and_then(|caps| handler(&Captures::from(&caps), ctx)),
        };

        if let Some(value) = value {
            record.push(shortcut.name().to_string());
            return Some((value, meta.clone()));
        }
    }
    None
}

/// Expands `input` if it names a shortcut, directly or behind variants.
///
/// Returns `Ok(None)` when nothing matches or `depth` is exhausted. Names of
/// the shortcuts used are appended to `record`.
pub fn expand_shortcut(
    config: &ResolvedConfig,
    input: &str,
    ctx: &RuleContext<'_>,
    depth: usize,
    record: &mut Vec<String>,
) -> Result<Option<Expansion>> {
    if depth == 0 {
        return Ok(None);
    }

    let mut meta = None;
    let mut tokens: Vec<String> = Vec::new();
    let mut inline = Vec::new();

    if let Some((value, found)) = find_shortcut(config, input, ctx, record) {
        meta = Some(found);
        let mut unique = IndexSet::new();
        for item in value {
            match item {
                ShortcutItem::Token(list) => {
                    let expanded = expand_variant_group(list.trim());
                    unique.extend(expanded.split_whitespace().map(str::to_string));
                }
                ShortcutItem::Css(block) => inline.push(ExpandedItem::Inline {
                    block,
                    handlers: Vec::new(),
                }),
            }
        }
        tokens = unique.into_iter().collect();
    } else {
        let matched = match_variants(config, input, None)?;
        if matched.processed != input {
            if let Some(inner) = expand_shortcut(config, &matched.processed, ctx, depth - 1, record)? {
                meta = inner.meta;
                for item in inner.items {
                    match item {
                        ExpandedItem::Token(token) => {
                            tokens.push(reattach_variants(input, &matched.processed, &token));
                        }
                        ExpandedItem::Inline {
                            block,
                            mut handlers,
                        } => {
                            handlers.extend(matched.handlers.iter().cloned());
                            inline.push(ExpandedItem::Inline { block, handlers });
                        }
                    }
                }
            }
        }
    }

    if tokens.is_empty() && inline.is_empty() {
        return Ok(None);
    }

    let mut items = Vec::with_capacity(tokens.len() + inline.len());
    for token in tokens {
        match expand_shortcut(config, &token, ctx, depth - 1, record)? {
            Some(inner) => items.extend(inner.items),
            None => items.push(ExpandedItem::Token(token)),
        }
    }
    items.extend(inline);

    Ok(Some(Expansion { items, meta }))
}

struct GroupEntry {
    entries: CssEntries,
    no_merge: bool,
    sort: i32,
}

struct Group {
    index: usize,
    entries: Vec<GroupEntry>,
}

/// Compiles an expansion under the shortcut's selector.
///
/// `parent` is the shortcut token with its own variants matched; its
/// handlers apply after each item's. `raw` is the token the selector is
/// escaped from. Keys of matched rules are appended to `rules`.
pub async fn stringify_shortcuts(
    config: &ResolvedConfig,
    parent: &VariantMatched,
    raw: &str,
    expansion: &Expansion,
    parent_orders: &ParentOrders,
    rules: &mut Vec<String>,
) -> Result<Vec<StringifiedUtil>> {
    let meta = expansion.meta.as_ref();
    let prefix = meta
        .map(|m| m.prefix.as_slice())
        .filter(|prefix| !prefix.is_empty());

    let mut tokens = IndexSet::new();
    let mut parsed: Vec<ParsedItem> = Vec::new();
    for item in &expansion.items {
        match item {
            ExpandedItem::Token(token) => {
                tokens.insert(token.as_str());
            }
            ExpandedItem::Inline { block, handlers } => {
                let mut all = side_channel_handlers(block);
                all.extend(handlers.iter().cloned());
                parsed.push(ParsedItem::Util(ParsedUtil {
                    index: usize::MAX,
                    raw: INLINE_RAW.to_string(),
                    entries: block.entries.clone(),
                    meta: block.no_merge.then(|| RuleMeta::new().no_merge()),
                    handlers: all,
                    rule: INLINE_RAW.to_string(),
                }));
            }
        }
    }

    let results = try_join_all(tokens.iter().map(|token| async move {
        let matched = match_variants(config, token, None)?;
        let items = parse_util(config, &matched, true, prefix).await?;
        Ok::<_, UcssError>((*token, items))
    }))
    .await?;

    for (token, items) in results {
        match items {
            Some(items) => parsed.extend(items),
            None if config.warn => {
                warn!("unmatched utility `{token}` in shortcut `{}`", parent.raw);
            }
            None => {}
        }
    }
    parsed.sort_by_key(ParsedItem::index);

    let default_layer = meta
        .and_then(|m| m.layer.clone())
        .unwrap_or_else(|| config.shortcuts_layer.clone());
    let mut out = Vec::new();
    let mut groups: IndexMap<(String, String, Option<String>), Group> = IndexMap::new();

    for item in &parsed {
        rules.push(item.rule().to_string());
        let util = match item {
            ParsedItem::Raw { .. } => {
                out.extend(stringify_util(config, item, raw, &parent.processed, parent_orders));
                continue;
            }
            ParsedItem::Util(util) => util,
        };

        let mut handlers = util.handlers.clone();
        handlers.extend(parent.handlers.iter().cloned());
        let obj = apply_variants(config, util, &handlers, raw, parent_orders);

        let layer = obj.layer.unwrap_or_else(|| default_layer.clone());
        let no_merge = obj
            .no_merge
            .unwrap_or_else(|| util.meta.as_ref().is_some_and(RuleMeta::is_no_merge));
        let sort = obj.sort.or_else(|| meta.and_then(|m| m.sort)).unwrap_or(0);

        groups
            .entry((layer, obj.selector, obj.parent))
            .or_insert_with(|| Group {
                index: util.index,
                entries: Vec::new(),
            })
            .entries
            .push(GroupEntry {
                entries: obj.entries,
                no_merge,
                sort,
            });
    }

    let shortcut_no_merge = meta.is_some_and(|m| m.no_merge);
    let make = |index: usize, layer: &str, selector: &str, scope: &Option<String>, body: String, sort: i32, no_merge: bool| {
        StringifiedUtil {
            index,
            selector: Some(selector.to_string()),
            body,
            parent: scope.clone(),
            meta: UtilMeta {
                layer: Some(layer.to_string()),
                sort: Some(sort),
                no_merge,
            },
            current: parent.processed.clone(),
            context: None,
            variant_no_merge: None,
        }
    };

    for ((layer, selector, scope), group) in groups {
        let (separate, mergeable): (Vec<GroupEntry>, Vec<GroupEntry>) =
            group.entries.into_iter().partition(|entry| entry.no_merge);

        for entry in separate {
            let body = entries_to_css(&entry.entries);
            if !body.is_empty() {
                out.push(make(group.index, &layer, &selector, &scope, body, entry.sort, true));
            }
        }

        if !mergeable.is_empty() {
            let sort = mergeable.iter().map(|entry| entry.sort).max().unwrap_or(0);
            let entries: CssEntries = mergeable.into_iter().flat_map(|entry| entry.entries).collect();
            let body = entries_to_css(&entries);
            if !body.is_empty() {
                out.push(make(group.index, &layer, &selector, &scope, body, sort, shortcut_no_merge));
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ucss_core::config::UserConfig;
    use ucss_core::registry::resolve_config;
    use ucss_core::rule::{Rule, emit};
    use ucss_core::shortcut::Shortcut;
    use ucss_core::theme::Theme;
    use ucss_core::variant::Variant;

    fn config() -> ResolvedConfig {
        let config = UserConfig::new()
            .with_rule(Rule::dynamic("^p-(\\d+)$", |caps, _| {
                emit(CssBlock::new().entry("padding", format!("{}px", caps.get(1).unwrap_or("0"))))
            }))
            .with_rule(Rule::new_static("rounded", CssBlock::new().entry("border-radius", "4px")))
            .with_variant(Variant::with_prefix("hover", "hover:", |h| {
                h.with_selector(|s, _| Some(format!("{s}:hover")))
            }))
            .with_shortcut(Shortcut::new("btn", "p-2 rounded p-2"))
            .with_shortcut(Shortcut::new("btn-lg", "btn p-4"))
            .with_shortcut(Shortcut::new("loop", "loop rounded"))
            .with_shortcut(Shortcut::with_items(
                "card",
                vec!["rounded".into(), CssBlock::new().entry("box-shadow", "none").into()],
            ))
            .with_shortcut(Shortcut::dynamic("^gap-box-(\\d+)$", |caps, _| {
                Some(vec![format!("p-{}", caps.get(1).unwrap_or("0")).into()])
            }));
        resolve_config(config).unwrap()
    }

    fn expand(config: &ResolvedConfig, input: &str, depth: usize) -> Option<Vec<String>> {
        let theme = Theme::new();
        let ctx = RuleContext {
            raw: input,
            current: input,
            theme: &theme,
            variant_handlers: &[],
            shortcut_prefix: None,
        };
        let mut record = Vec::new();
        expand_shortcut(config, input, &ctx, depth, &mut record)
            .unwrap()
            .map(|expansion| {
                expansion
                    .items
                    .into_iter()
                    .map(|item| match item {
                        ExpandedItem::Token(token) => token,
                        ExpandedItem::Inline { .. } => "<inline>".to_string(),
                    })
                    .collect()
            })
    }

    #[test]
    fn static_expansion_dedupes() {
        assert_eq!(expand(&config(), "btn", 5).unwrap(), vec!["p-2", "rounded"]);
    }

    #[test]
    fn nested_shortcuts_flatten() {
        assert_eq!(expand(&config(), "btn-lg", 5).unwrap(), vec!["p-2", "rounded", "p-4"]);
    }

    #[test]
    fn variants_carry_onto_expanded_tokens() {
        assert_eq!(
            expand(&config(), "hover:btn", 5).unwrap(),
            vec!["hover:p-2", "hover:rounded"]
        );
    }

    #[test]
    fn dynamic_and_inline_items() {
        let config = config();
        assert_eq!(expand(&config, "gap-box-3", 5).unwrap(), vec!["p-3"]);
        assert_eq!(expand(&config, "card", 5).unwrap(), vec!["rounded", "<inline>"]);
    }

    #[test]
    fn depth_bounds_self_reference() {
        let config = config();
        assert!(expand(&config, "btn", 0).is_none());
        assert_eq!(
            expand(&config, "loop", 3).unwrap(),
            vec!["loop", "rounded", "rounded", "rounded"]
        );
        assert!(expand(&config, "p-2", 5).is_none());
    }

    #[test]
    fn reattach_replaces_the_last_occurrence() {
        assert_eq!(reattach_variants("hover:btn", "btn", "p-2"), "hover:p-2");
        assert_eq!(reattach_variants("btn:btn", "btn", "p-2"), "btn:p-2");
    }

    #[tokio::test]
    async fn shortcut_utilities_merge_into_one_block() {
        let config = config();
        let theme = Theme::new();
        let ctx = RuleContext {
            raw: "btn",
            current: "btn",
            theme: &theme,
            variant_handlers: &[],
            shortcut_prefix: None,
        };
        let mut record = Vec::new();
        let expansion = expand_shortcut(&config, "btn", &ctx, 5, &mut record).unwrap().unwrap();
        assert_eq!(record, vec!["btn"]);

        let orders = ParentOrders::new();
        let mut rules = Vec::new();
        let parent = VariantMatched::bare("btn");
        let utils = stringify_shortcuts(&config, &parent, "btn", &expansion, &orders, &mut rules)
            .await
            .unwrap();

        assert_eq!(utils.len(), 1);
        assert_eq!(utils[0].selector.as_deref(), Some(".btn"));
        assert_eq!(utils[0].body, "padding:2px;border-radius:4px;");
        assert_eq!(utils[0].layer(), Some("shortcuts"));
        assert_eq!(utils[0].index, 0);
        assert_eq!(rules, vec!["^p-(\\d+)$", "rounded"]);
    }
}
