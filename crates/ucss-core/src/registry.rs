//! The resolved, read-only entry registry.
//!
//! [`resolve_config`] flattens presets and user entries into a
//! [`ResolvedConfig`]: static rules land in a lookup table keyed by token,
//! dynamic rules and shortcuts keep declaration order with their patterns
//! compiled, variants are stable-sorted by `order`, and layer weights are
//! merged over the defaults. Nothing in a `ResolvedConfig` changes after it
//! is built; sessions share it behind an `Arc`.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use regex::Regex;

use crate::blocklist::{BlocklistEntry, CompiledBlocklistEntry};
use crate::config::{Postprocessor, Preprocessor, UserConfig};
use crate::error::{PatternKind, Result, UcssError};
use crate::extractor::Extractor;
use crate::layer::{self, default_layers};
use crate::preflight::Preflight;
use crate::rule::{Rule, RuleHandler, RuleItem, RuleMeta};
use crate::shortcut::{Shortcut, ShortcutFn, ShortcutMeta, ShortcutValue};
use crate::theme::Theme;
use crate::variant::Variant;

/// A static rule in the lookup table. `index` is its declaration position.
#[derive(Debug, Clone)]
pub struct StaticRuleEntry {
    pub index: usize,
    pub key: String,
    pub items: Vec<RuleItem>,
    pub meta: RuleMeta,
}

#[derive(Clone)]
pub struct DynamicRuleEntry {
    pub index: usize,
    /// The pattern as declared.
    pub source: String,
    pub pattern: Regex,
    pub handler: Arc<dyn RuleHandler>,
    pub meta: RuleMeta,
}

impl fmt::Debug for DynamicRuleEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicRuleEntry")
            .field("index", &self.index)
            .field("source", &self.source)
            .field("meta", &self.meta)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub enum ResolvedShortcut {
    Static {
        key: String,
        value: ShortcutValue,
        meta: ShortcutMeta,
    },
    Dynamic {
        source: String,
        pattern: Regex,
        handler: ShortcutFn,
        meta: ShortcutMeta,
    },
}

impl ResolvedShortcut {
    pub fn meta(&self) -> &ShortcutMeta {
        match self {
            ResolvedShortcut::Static { meta, .. } | ResolvedShortcut::Dynamic { meta, .. } => meta,
        }
    }

    /// The key or pattern source, used for provenance.
    pub fn name(&self) -> &str {
        match self {
            ResolvedShortcut::Static { key, .. } => key,
            ResolvedShortcut::Dynamic { source, .. } => source,
        }
    }
}

impl fmt::Debug for ResolvedShortcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedShortcut::Static { key, meta, .. } => f
                .debug_struct("Static")
                .field("key", key)
                .field("meta", meta)
                .finish_non_exhaustive(),
            ResolvedShortcut::Dynamic { source, meta, .. } => f
                .debug_struct("Dynamic")
                .field("source", source)
                .field("meta", meta)
                .finish_non_exhaustive(),
        }
    }
}

/// The immutable registry every session reads from.
#[derive(Clone)]
pub struct ResolvedConfig {
    pub rules_static: HashMap<String, StaticRuleEntry>,
    pub rules_dynamic: Vec<DynamicRuleEntry>,
    /// Total number of declared rules, static and dynamic.
    pub rules_count: usize,
    pub variants: Vec<Variant>,
    pub shortcuts: Vec<ResolvedShortcut>,
    pub blocklist: Vec<CompiledBlocklistEntry>,
    pub safelist: Vec<String>,
    pub preflights: Vec<Preflight>,
    pub layers: IndexMap<String, i32>,
    pub shortcuts_layer: String,
    pub theme: Theme,
    pub details: bool,
    pub merge_selectors: bool,
    pub warn: bool,
    pub preprocess: Vec<Preprocessor>,
    pub postprocess: Vec<Postprocessor>,
    pub extractors: Vec<Arc<dyn Extractor>>,
    pub extractor_default: bool,
    pub shortcut_depth: usize,
}

impl ResolvedConfig {
    /// Orders layer names by `(weight, name)`.
    pub fn sort_layers<I>(&self, names: I) -> Vec<String>
    where
        I: IntoIterator<Item = String>,
    {
        layer::sort_layers(names, &self.layers)
    }

    /// The weight of a layer; 0 when undeclared.
    pub fn layer_weight(&self, name: &str) -> i32 {
        self.layers.get(name).copied().unwrap_or(0)
    }

    pub fn is_blocked(&self, raw: &str) -> bool {
        self.get_blocked(raw).is_some()
    }

    /// The first blocklist entry that matches `raw`.
    pub fn get_blocked(&self, raw: &str) -> Option<&BlocklistEntry> {
        self.blocklist
            .iter()
            .find(|entry| entry.matches(raw))
            .map(|entry| &entry.entry)
    }

    /// Applies every preprocessor in order.
    pub fn preprocess(&self, raw: &str) -> String {
        self.preprocess
            .iter()
            .fold(raw.to_string(), |token, f| f(&token))
    }
}

impl fmt::Debug for ResolvedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedConfig")
            .field("rules_static", &self.rules_static.len())
            .field("rules_dynamic", &self.rules_dynamic)
            .field("variants", &self.variants)
            .field("shortcuts", &self.shortcuts)
            .field("blocklist", &self.blocklist.len())
            .field("layers", &self.layers)
            .field("shortcuts_layer", &self.shortcuts_layer)
            .field("details", &self.details)
            .field("merge_selectors", &self.merge_selectors)
            .finish_non_exhaustive()
    }
}

fn compile(kind: PatternKind, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| UcssError::InvalidPattern {
        kind,
        pattern: pattern.to_string(),
        source,
    })
}

/// Builds the registry from a user configuration.
///
/// Preset entries come first, in preset order, followed by the user's own.
/// A later static rule with the same key replaces an earlier one but keeps
/// its own declaration index.
pub fn resolve_config(config: UserConfig) -> Result<ResolvedConfig> {
    let UserConfig {
        presets,
        rules,
        variants,
        shortcuts,
        theme,
        blocklist,
        safelist,
        preflights,
        layers,
        shortcuts_layer,
        details,
        merge_selectors,
        warn,
        preprocess,
        postprocess,
        extractors,
        extractor_default,
        shortcut_depth,
    } = config;

    let mut all_rules = Vec::new();
    let mut all_variants = Vec::new();
    let mut all_shortcuts = Vec::new();
    let mut all_blocklist = Vec::new();
    let mut all_safelist = Vec::new();
    let mut all_preflights = Vec::new();
    let mut all_layers = default_layers();
    let mut all_preprocess = Vec::new();
    let mut all_postprocess = Vec::new();
    let mut all_extractors = Vec::new();
    let mut preset_theme = None;

    for preset in presets {
        all_rules.extend(preset.rules);
        all_variants.extend(preset.variants);
        all_shortcuts.extend(preset.shortcuts);
        all_blocklist.extend(preset.blocklist);
        all_safelist.extend(preset.safelist);
        all_preflights.extend(preset.preflights);
        all_layers.extend(preset.layers);
        all_preprocess.extend(preset.preprocess);
        all_postprocess.extend(preset.postprocess);
        all_extractors.extend(preset.extractors);
        if !preset.theme.is_empty() {
            preset_theme = Some(preset.theme);
        }
    }

    all_rules.extend(rules);
    all_variants.extend(variants);
    all_shortcuts.extend(shortcuts);
    all_blocklist.extend(blocklist);
    all_safelist.extend(safelist);
    all_preflights.extend(preflights);
    all_layers.extend(layers);
    all_preprocess.extend(preprocess);
    all_postprocess.extend(postprocess);
    all_extractors.extend(extractors);

    let rules_count = all_rules.len();
    let mut rules_static = HashMap::new();
    let mut rules_dynamic = Vec::new();
    for (index, rule) in all_rules.into_iter().enumerate() {
        match rule {
            Rule::Static { key, items, meta } => {
                if key.is_empty() {
                    return Err(UcssError::Config(format!(
                        "static rule #{index} has an empty key"
                    )));
                }
                // Prefixed static rules are looked up under every prefixed key.
                let lookup_keys: Vec<String> = if meta.prefix.is_empty() {
                    vec![key.clone()]
                } else {
                    meta.prefix.iter().map(|p| format!("{p}{key}")).collect()
                };
                let entry = StaticRuleEntry {
                    index,
                    key,
                    items,
                    meta,
                };
                for lookup in lookup_keys {
                    rules_static.insert(lookup, entry.clone());
                }
            }
            Rule::Dynamic {
                pattern,
                handler,
                meta,
            } => {
                let compiled = compile(PatternKind::Rule, &pattern)?;
                rules_dynamic.push(DynamicRuleEntry {
                    index,
                    source: pattern,
                    pattern: compiled,
                    handler,
                    meta,
                });
            }
        }
    }

    // `sort_by_key` is stable, so equal orders keep declaration order.
    all_variants.sort_by_key(|variant| variant.order);

    let shortcuts = all_shortcuts
        .into_iter()
        .map(|shortcut| match shortcut {
            Shortcut::Static { key, value, meta } => {
                if key.is_empty() {
                    return Err(UcssError::Config("shortcut with an empty key".into()));
                }
                Ok(ResolvedShortcut::Static { key, value, meta })
            }
            Shortcut::Dynamic {
                pattern,
                handler,
                meta,
            } => Ok(ResolvedShortcut::Dynamic {
                pattern: compile(PatternKind::Shortcut, &pattern)?,
                source: pattern,
                handler,
                meta,
            }),
        })
        .collect::<Result<Vec<_>>>()?;

    let blocklist = all_blocklist
        .into_iter()
        .map(CompiledBlocklistEntry::compile)
        .collect::<Result<Vec<_>>>()?;

    all_extractors.sort_by_key(|extractor: &Arc<dyn Extractor>| extractor.order());

    let theme = if theme.is_empty() {
        preset_theme.unwrap_or_default()
    } else {
        theme
    };

    Ok(ResolvedConfig {
        rules_static,
        rules_dynamic,
        rules_count,
        variants: all_variants,
        shortcuts,
        blocklist,
        safelist: all_safelist,
        preflights: all_preflights,
        layers: all_layers,
        shortcuts_layer,
        theme,
        details,
        merge_selectors,
        warn,
        preprocess: all_preprocess,
        postprocess: all_postprocess,
        extractors: all_extractors,
        extractor_default,
        shortcut_depth,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Preset;
    use crate::entries::CssBlock;
    use crate::rule::emit;

    fn margin_rule() -> Rule {
        Rule::dynamic("^m-(\\d+)$", |caps, _| {
            emit(CssBlock::new().entry("margin", format!("{}px", caps.get(1).unwrap_or("0"))))
        })
    }

    #[test]
    fn static_and_dynamic_rules_share_one_index_space() {
        let config = UserConfig::new()
            .with_rule(Rule::new_static("flex", CssBlock::new().entry("display", "flex")))
            .with_rule(margin_rule())
            .with_rule(Rule::new_static("block", CssBlock::new().entry("display", "block")));
        let resolved = resolve_config(config).unwrap();

        assert_eq!(resolved.rules_count, 3);
        assert_eq!(resolved.rules_static["flex"].index, 0);
        assert_eq!(resolved.rules_dynamic[0].index, 1);
        assert_eq!(resolved.rules_static["block"].index, 2);
    }

    #[test]
    fn presets_come_before_user_entries() {
        let preset = Preset::new("base")
            .with_rule(Rule::new_static("flex", CssBlock::new().entry("display", "flex")))
            .with_theme(Theme::new().with("colors.red", "#f00"))
            .with_layer("components", -5);
        let config = UserConfig::new()
            .with_preset(preset)
            .with_rule(Rule::new_static("flex", CssBlock::new().entry("display", "inline-flex")));
        let resolved = resolve_config(config).unwrap();

        let flex = &resolved.rules_static["flex"];
        assert_eq!(flex.index, 1);
        assert_eq!(resolved.theme.get_str("colors.red"), Some("#f00"));
        assert_eq!(resolved.layer_weight("components"), -5);
        assert_eq!(resolved.layer_weight("shortcuts"), -10);
        assert_eq!(resolved.layer_weight("unknown"), 0);
    }

    #[test]
    fn prefixed_static_rules_register_each_prefix() {
        let rule = Rule::new_static("flex", CssBlock::new().entry("display", "flex"))
            .with_meta(RuleMeta::new().with_prefix(["tw-", "u-"]));
        let resolved = resolve_config(UserConfig::new().with_rule(rule)).unwrap();
        assert!(resolved.rules_static.contains_key("tw-flex"));
        assert!(resolved.rules_static.contains_key("u-flex"));
        assert!(!resolved.rules_static.contains_key("flex"));
    }

    #[test]
    fn variants_are_stable_sorted_by_order() {
        let config = UserConfig::new()
            .with_variant(Variant::new("late", |_, _| None).with_order(10))
            .with_variant(Variant::new("a", |_, _| None))
            .with_variant(Variant::new("b", |_, _| None));
        let resolved = resolve_config(config).unwrap();
        let names: Vec<_> = resolved.variants.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "late"]);
    }

    #[test]
    fn invalid_shortcut_pattern_is_reported() {
        let config = UserConfig::new().with_shortcut(Shortcut::dynamic("^btn-(", |_, _| None));
        let err = resolve_config(config).unwrap_err();
        assert!(matches!(
            err,
            UcssError::InvalidPattern {
                kind: PatternKind::Shortcut,
                ..
            }
        ));
    }

    #[test]
    fn empty_static_key_is_rejected() {
        let config =
            UserConfig::new().with_rule(Rule::new_static("", CssBlock::new().entry("a", "b")));
        assert!(matches!(resolve_config(config), Err(UcssError::Config(_))));
    }

    #[test]
    fn blocklist_lookup_returns_first_match() {
        let config = UserConfig::new()
            .with_blocklist(BlocklistEntry::pattern("^m-").with_message("use spacing tokens"))
            .with_blocklist(BlocklistEntry::exact("m-1"));
        let resolved = resolve_config(config).unwrap();
        let entry = resolved.get_blocked("m-1").unwrap();
        assert_eq!(entry.meta.message.as_deref(), Some("use spacing tokens"));
        assert!(!resolved.is_blocked("p-1"));
    }

    #[test]
    fn preprocessors_chain() {
        let config = UserConfig::new()
            .with_preprocess(|t| t.trim_start_matches("tw-").to_string())
            .with_preprocess(|t| t.replace("_", "-"));
        let resolved = resolve_config(config).unwrap();
        assert_eq!(resolved.preprocess("tw-m_2"), "m-2");
    }
}
