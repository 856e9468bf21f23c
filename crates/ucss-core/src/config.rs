//! User-facing configuration and presets.
//!
//! A [`UserConfig`] is assembled with builder methods and turned into the
//! read-only entry registry by [`crate::registry::resolve_config`].
//!
//! ```rust
//! use ucss_core::config::UserConfig;
//! use ucss_core::entries::CssBlock;
//! use ucss_core::rule::Rule;
//! use ucss_core::shortcut::Shortcut;
//!
//! let config = UserConfig::new()
//!     .with_rule(Rule::new_static("flex", CssBlock::new().entry("display", "flex")))
//!     .with_shortcut(Shortcut::new("center", "flex items-center"))
//!     .with_layer("components", -5);
//!
//! assert_eq!(config.rules.len(), 1);
//! assert_eq!(config.layers.get("components"), Some(&-5));
//! ```

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::blocklist::BlocklistEntry;
use crate::entries::UtilObject;
use crate::extractor::Extractor;
use crate::layer::LAYER_SHORTCUTS;
use crate::preflight::Preflight;
use crate::rule::Rule;
use crate::shortcut::Shortcut;
use crate::theme::Theme;
use crate::variant::Variant;

/// Rewrites a token before it is resolved.
pub type Preprocessor = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Adjusts a compiled utility before it is serialized.
pub type Postprocessor = Arc<dyn Fn(&mut UtilObject) + Send + Sync>;

/// Default recursion budget for shortcut expansion.
pub const DEFAULT_SHORTCUT_DEPTH: usize = 5;

/// A named bundle of registry entries, merged ahead of the user's own.
#[derive(Clone, Default)]
pub struct Preset {
    pub name: String,
    pub rules: Vec<Rule>,
    pub variants: Vec<Variant>,
    pub shortcuts: Vec<Shortcut>,
    pub theme: Theme,
    pub blocklist: Vec<BlocklistEntry>,
    pub safelist: Vec<String>,
    pub preflights: Vec<Preflight>,
    pub layers: IndexMap<String, i32>,
    pub preprocess: Vec<Preprocessor>,
    pub postprocess: Vec<Postprocessor>,
    pub extractors: Vec<Arc<dyn Extractor>>,
}

impl Preset {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_rules(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.rules.extend(rules);
        self
    }

    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variants.push(variant);
        self
    }

    pub fn with_variants(mut self, variants: impl IntoIterator<Item = Variant>) -> Self {
        self.variants.extend(variants);
        self
    }

    pub fn with_shortcut(mut self, shortcut: Shortcut) -> Self {
        self.shortcuts.push(shortcut);
        self
    }

    pub fn with_shortcuts(mut self, shortcuts: impl IntoIterator<Item = Shortcut>) -> Self {
        self.shortcuts.extend(shortcuts);
        self
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn with_preflight(mut self, preflight: Preflight) -> Self {
        self.preflights.push(preflight);
        self
    }

    pub fn with_layer(mut self, name: impl Into<String>, weight: i32) -> Self {
        self.layers.insert(name.into(), weight);
        self
    }
}

impl fmt::Debug for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Preset")
            .field("name", &self.name)
            .field("rules", &self.rules.len())
            .field("variants", &self.variants.len())
            .field("shortcuts", &self.shortcuts.len())
            .finish_non_exhaustive()
    }
}

/// Configuration supplied by the host.
#[derive(Clone)]
pub struct UserConfig {
    pub presets: Vec<Preset>,
    pub rules: Vec<Rule>,
    pub variants: Vec<Variant>,
    pub shortcuts: Vec<Shortcut>,
    pub theme: Theme,
    pub blocklist: Vec<BlocklistEntry>,
    /// Tokens always compiled when `GenerateOptions::safelist` is on.
    pub safelist: Vec<String>,
    pub preflights: Vec<Preflight>,
    /// Layer weights merged over the defaults.
    pub layers: IndexMap<String, i32>,
    pub shortcuts_layer: String,
    /// Keep provenance (matched rules and shortcuts) on compiled output.
    pub details: bool,
    pub merge_selectors: bool,
    /// Log unmatched utilities inside shortcut expansions.
    pub warn: bool,
    pub preprocess: Vec<Preprocessor>,
    pub postprocess: Vec<Postprocessor>,
    pub extractors: Vec<Arc<dyn Extractor>>,
    /// Append the whitespace/quote splitting extractor.
    pub extractor_default: bool,
    pub shortcut_depth: usize,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            presets: Vec::new(),
            rules: Vec::new(),
            variants: Vec::new(),
            shortcuts: Vec::new(),
            theme: Theme::default(),
            blocklist: Vec::new(),
            safelist: Vec::new(),
            preflights: Vec::new(),
            layers: IndexMap::new(),
            shortcuts_layer: LAYER_SHORTCUTS.to_string(),
            details: false,
            merge_selectors: true,
            warn: true,
            preprocess: Vec::new(),
            postprocess: Vec::new(),
            extractors: Vec::new(),
            extractor_default: true,
            shortcut_depth: DEFAULT_SHORTCUT_DEPTH,
        }
    }
}

impl UserConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preset(mut self, preset: Preset) -> Self {
        self.presets.push(preset);
        self
    }

    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_rules(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.rules.extend(rules);
        self
    }

    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variants.push(variant);
        self
    }

    pub fn with_shortcut(mut self, shortcut: Shortcut) -> Self {
        self.shortcuts.push(shortcut);
        self
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn with_blocklist(mut self, entry: BlocklistEntry) -> Self {
        self.blocklist.push(entry);
        self
    }

    pub fn with_safelist<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.safelist.extend(tokens.into_iter().map(Into::into));
        self
    }

    pub fn with_preflight(mut self, preflight: Preflight) -> Self {
        self.preflights.push(preflight);
        self
    }

    pub fn with_layer(mut self, name: impl Into<String>, weight: i32) -> Self {
        self.layers.insert(name.into(), weight);
        self
    }

    pub fn with_shortcuts_layer(mut self, layer: impl Into<String>) -> Self {
        self.shortcuts_layer = layer.into();
        self
    }

    pub fn with_details(mut self, details: bool) -> Self {
        self.details = details;
        self
    }

    pub fn with_merge_selectors(mut self, merge: bool) -> Self {
        self.merge_selectors = merge;
        self
    }

    pub fn with_warn(mut self, warn: bool) -> Self {
        self.warn = warn;
        self
    }

    pub fn with_preprocess<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.preprocess.push(Arc::new(f));
        self
    }

    pub fn with_postprocess<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut UtilObject) + Send + Sync + 'static,
    {
        self.postprocess.push(Arc::new(f));
        self
    }

    pub fn with_extractor(mut self, extractor: impl Extractor + 'static) -> Self {
        self.extractors.push(Arc::new(extractor));
        self
    }

    pub fn with_extractor_default(mut self, enabled: bool) -> Self {
        self.extractor_default = enabled;
        self
    }

    pub fn with_shortcut_depth(mut self, depth: usize) -> Self {
        self.shortcut_depth = depth;
        self
    }
}

impl fmt::Debug for UserConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserConfig")
            .field("presets", &self.presets)
            .field("rules", &self.rules.len())
            .field("variants", &self.variants.len())
            .field("shortcuts", &self.shortcuts.len())
            .field("layers", &self.layers)
            .field("details", &self.details)
            .finish_non_exhaustive()
    }
}
