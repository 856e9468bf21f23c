//! Rule matching: static lookup first, then dynamic rules in declaration
//! order. The first rule that yields output wins.

use log::trace;
use ucss_core::entries::{CssBlock, CssEntries};
use ucss_core::error::{Result, UcssError};
use ucss_core::registry::ResolvedConfig;
use ucss_core::rule::{Captures, RuleContext, RuleItem, RuleMeta};
use ucss_core::variant::VariantHandler;

use crate::variants::VariantMatched;

/// A rule output with variants still to be applied.
#[derive(Debug, Clone)]
pub struct ParsedUtil {
    /// Declaration index of the matched rule.
    pub index: usize,
    pub raw: String,
    pub entries: CssEntries,
    pub meta: Option<RuleMeta>,
    pub handlers: Vec<VariantHandler>,
    /// Key or pattern of the matched rule.
    pub rule: String,
}

#[derive(Debug, Clone)]
pub enum ParsedItem {
    Util(ParsedUtil),
    /// Raw CSS emitted verbatim.
    Raw {
        index: usize,
        css: String,
        meta: Option<RuleMeta>,
        rule: String,
    },
}

impl ParsedItem {
    pub fn index(&self) -> usize {
        match self {
            ParsedItem::Util(util) => util.index,
            ParsedItem::Raw { index, .. } => *index,
        }
    }

    pub fn rule(&self) -> &str {
        match self {
            ParsedItem::Util(util) => &util.rule,
            ParsedItem::Raw { rule, .. } => rule,
        }
    }
}

/// Converts a block's overrides into handlers, in application order.
pub(crate) fn side_channel_handlers(block: &CssBlock) -> Vec<VariantHandler> {
    if !block.has_side_channel() {
        return Vec::new();
    }
    let mut handlers = block.variants.clone();
    if let Some(parent) = &block.parent {
        handlers.push(VariantHandler::transform().with_parent(parent.clone()));
    }
    if let Some(selector) = &block.selector {
        let selector = selector.clone();
        handlers.push(VariantHandler::transform().with_selector(move |_, _| Some(selector.clone())));
    }
    if let Some(layer) = &block.layer {
        handlers.push(VariantHandler::transform().with_layer(layer.clone()));
    }
    if let Some(sort) = block.sort {
        handlers.push(VariantHandler::transform().with_sort(sort));
    }
    handlers
}

fn to_parsed(
    index: usize,
    rule: &str,
    matched: &VariantMatched,
    meta: &RuleMeta,
    items: Vec<RuleItem>,
) -> Vec<ParsedItem> {
    items
        .into_iter()
        .map(|item| match item {
            RuleItem::Raw(css) => ParsedItem::Raw {
                index,
                css,
                meta: Some(meta.clone()),
                rule: rule.to_string(),
            },
            RuleItem::Block(block) => {
                let mut handlers = side_channel_handlers(&block);
                handlers.extend(matched.handlers.iter().cloned());
                let mut meta = meta.clone();
                if block.no_merge {
                    meta = meta.no_merge();
                }
                ParsedItem::Util(ParsedUtil {
                    index,
                    raw: matched.raw.clone(),
                    entries: block.entries,
                    meta: Some(meta),
                    handlers,
                    rule: rule.to_string(),
                })
            }
        })
        .collect()
}

/// Finds the rule for a variant-stripped token.
///
/// `internal` allows rules flagged internal, which only match from inside a
/// shortcut. `shortcut_prefix` is the prefix context of an enclosing
/// shortcut; prefixed rules then match without the token carrying the prefix.
pub async fn parse_util(
    config: &ResolvedConfig,
    matched: &VariantMatched,
    internal: bool,
    shortcut_prefix: Option<&[String]>,
) -> Result<Option<Vec<ParsedItem>>> {
    let processed = matched.processed.as_str();

    if let Some(entry) = config.rules_static.get(processed) {
        if internal || !entry.meta.is_internal() {
            trace!("static rule `{}` matched `{}`", entry.key, matched.raw);
            return Ok(Some(to_parsed(
                entry.index,
                &entry.key,
                matched,
                &entry.meta,
                entry.items.clone(),
            )));
        }
    }

    let ctx = RuleContext {
        raw: &matched.raw,
        current: processed,
        theme: &config.theme,
        variant_handlers: &matched.handlers,
        shortcut_prefix,
    };

    for rule in &config.rules_dynamic {
        if rule.meta.is_internal() && !internal {
            continue;
        }

        let mut unprefixed = processed;
        if !rule.meta.prefix.is_empty() {
            match shortcut_prefix {
                Some(context) => {
                    if !rule.meta.prefix.iter().any(|p| context.contains(p)) {
                        continue;
                    }
                }
                None => {
                    let Some(prefix) = rule.meta.prefix.iter().find(|p| processed.starts_with(p.as_str()))
                    else {
                        continue;
                    };
                    unprefixed = &processed[prefix.len()..];
                }
            }
        }

        let captures = match rule.pattern.captures(unprefixed) {
            Some(caps) => Captures::from(&caps),
            None => continue,
        };

        let items = rule
            .handler
            .handle(&captures, &ctx)
            .await
            .map_err(|err| UcssError::Handler {
                raw: matched.raw.clone(),
                message: err.message,
            })?;

        match items {
            Some(items) if !items.is_empty() => {
                trace!("rule `{}` matched `{}`", rule.source, matched.raw);
                return Ok(Some(to_parsed(
                    rule.index,
                    &rule.source,
                    matched,
                    &rule.meta,
                    items,
                )));
            }
            _ => {}
        }
    }

    Ok(None)
}
