//! The generator: per-token resolution and batch generation.
//!
//! A [`Generator`] owns the current [`Session`], which pairs a resolved
//! registry with the caches built against it. Reloading the configuration
//! swaps in a fresh session atomically; batches already running keep the
//! session they started with.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use arc_swap::ArcSwap;
use futures::future::{join_all, try_join_all};
use indexmap::{IndexMap, IndexSet};
use log::{debug, trace, warn};
use ucss_core::blocklist::BlocklistEntry;
use ucss_core::config::UserConfig;
use ucss_core::error::Result;
use ucss_core::layer::LAYER_DEFAULT;
use ucss_core::preflight::PreflightContext;
use ucss_core::registry::{ResolvedConfig, resolve_config};
use ucss_core::rule::RuleContext;
use ucss_core::token_set::TokenSet;

use crate::cache::{CachedUtils, ParentOrders, TokenCache, cache_key};
use crate::extractor;
use crate::matcher::parse_util;
use crate::sheet::{AssemblyOptions, ExtendedTokenInfo, GenerateResult, Matched};
use crate::shortcuts::{expand_shortcut, stringify_shortcuts};
use crate::stringify::{SourceContext, StringifiedUtil, stringify_util};
use crate::variants::{VariantMatched, match_variants};

/// Options for one [`Generator::generate`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Identifier of the source, passed to extractors.
    pub id: Option<String>,
    /// Drop newlines and layer comments.
    pub minify: bool,
    pub preflights: bool,
    pub safelist: bool,
    /// Selector prefix substituted for the scope placeholder.
    pub scope: Option<String>,
    /// Keep per-token output and occurrence counts in [`Matched`].
    pub extended_info: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            id: None,
            minify: false,
            preflights: true,
            safelist: true,
            scope: None,
            extended_info: false,
        }
    }
}

impl GenerateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn minify(mut self) -> Self {
        self.minify = true;
        self
    }

    pub fn with_preflights(mut self, enabled: bool) -> Self {
        self.preflights = enabled;
        self
    }

    pub fn with_safelist(mut self, enabled: bool) -> Self {
        self.safelist = enabled;
        self
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn extended_info(mut self) -> Self {
        self.extended_info = true;
        self
    }
}

/// What to generate from.
#[derive(Debug, Clone)]
pub enum GenerateInput {
    /// Source text, run through the extractors.
    Code(String),
    Tokens(TokenSet),
}

impl From<&str> for GenerateInput {
    fn from(code: &str) -> Self {
        GenerateInput::Code(code.to_string())
    }
}

impl From<String> for GenerateInput {
    fn from(code: String) -> Self {
        GenerateInput::Code(code)
    }
}

impl From<TokenSet> for GenerateInput {
    fn from(tokens: TokenSet) -> Self {
        GenerateInput::Tokens(tokens)
    }
}

/// A registry together with the caches derived from it.
#[derive(Debug)]
pub struct Session {
    pub config: Arc<ResolvedConfig>,
    pub cache: TokenCache,
    pub parent_orders: ParentOrders,
}

impl Session {
    pub fn new(config: Arc<ResolvedConfig>) -> Self {
        Self {
            config,
            cache: TokenCache::new(),
            parent_orders: ParentOrders::new(),
        }
    }

    /// Compiles one token, consulting and filling the cache.
    ///
    /// `alias` is the name the selector is built from when the token is
    /// resolved on behalf of another one.
    pub async fn parse_token(&self, raw: &str, alias: Option<&str>) -> Result<CachedUtils> {
        if self.cache.is_blocked(raw) {
            return Ok(None);
        }
        let key = cache_key(raw, alias);
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached);
        }

        let config = &*self.config;
        let current = config.preprocess(raw);
        if config.is_blocked(raw) || config.is_blocked(&current) {
            trace!("`{raw}` is blocked");
            self.cache.block(raw);
            self.cache.insert(key, None);
            return Ok(None);
        }

        let matched = match_variants(config, raw, Some(&current))?;
        if config.is_blocked(&matched.processed) {
            trace!("`{raw}` is blocked after variant stripping");
            self.cache.block(raw);
            self.cache.insert(key, None);
            return Ok(None);
        }

        let selector_raw = alias.unwrap_or(raw);
        let mut shortcuts = Vec::new();
        let mut rules = Vec::new();

        let expansion = {
            let ctx = RuleContext {
                raw,
                current: &matched.processed,
                theme: &config.theme,
                variant_handlers: &matched.handlers,
                shortcut_prefix: None,
            };
            expand_shortcut(
                config,
                &matched.processed,
                &ctx,
                config.shortcut_depth,
                &mut shortcuts,
            )?
        };

        let mut utils: Vec<StringifiedUtil> = match expansion {
            Some(expansion) => {
                stringify_shortcuts(
                    config,
                    &matched,
                    selector_raw,
                    &expansion,
                    &self.parent_orders,
                    &mut rules,
                )
                .await?
            }
            None => self.compile_rules(&matched, selector_raw, &mut rules).await?,
        };

        if utils.is_empty() {
            self.cache.insert(key, None);
            return Ok(None);
        }

        if config.details {
            let context = Arc::new(SourceContext {
                raw: raw.to_string(),
                current_selector: matched.processed.clone(),
                variants: matched.applied.clone(),
                rules,
                shortcuts,
            });
            for util in &mut utils {
                util.context = Some(context.clone());
            }
        }

        let utils: Arc<[StringifiedUtil]> = utils.into();
        self.cache.insert(key, Some(utils.clone()));
        Ok(Some(utils))
    }

    async fn compile_rules(
        &self,
        matched: &VariantMatched,
        selector_raw: &str,
        rules: &mut Vec<String>,
    ) -> Result<Vec<StringifiedUtil>> {
        let Some(items) = parse_util(&self.config, matched, false, None).await? else {
            return Ok(Vec::new());
        };
        rules.extend(items.iter().map(|item| item.rule().to_string()));
        Ok(items
            .iter()
            .filter_map(|item| {
                stringify_util(
                    &self.config,
                    item,
                    selector_raw,
                    &matched.processed,
                    &self.parent_orders,
                )
            })
            .collect())
    }
}

/// Compiles utility tokens to CSS.
///
/// ```rust
/// use ucss::{GenerateOptions, Generator};
/// use ucss_core::config::UserConfig;
/// use ucss_core::entries::CssBlock;
/// use ucss_core::rule::Rule;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let generator = Generator::new(
///     UserConfig::new().with_rule(Rule::new_static("flex", CssBlock::new().entry("display", "flex"))),
/// )
/// .unwrap();
///
/// let result = generator.generate("<div class=\"flex\">", &GenerateOptions::new()).await.unwrap();
/// assert_eq!(result.css(), "/* layer: default */\n.flex{display:flex;}");
/// # });
/// ```
pub struct Generator {
    session: ArcSwap<Session>,
}

impl Generator {
    pub fn new(config: UserConfig) -> Result<Self> {
        Ok(Self::from_resolved(resolve_config(config)?))
    }

    pub fn from_resolved(config: ResolvedConfig) -> Self {
        Self {
            session: ArcSwap::from_pointee(Session::new(Arc::new(config))),
        }
    }

    pub fn config(&self) -> Arc<ResolvedConfig> {
        self.session.load().config.clone()
    }

    /// The session new work runs against.
    pub fn session(&self) -> Arc<Session> {
        self.session.load_full()
    }

    /// Replaces the registry and drops every cache built against the old one.
    pub fn set_config(&self, config: UserConfig) -> Result<()> {
        let resolved = resolve_config(config)?;
        debug!("configuration reloaded");
        self.session.store(Arc::new(Session::new(Arc::new(resolved))));
        Ok(())
    }

    /// Drops all cached token results and parent orders.
    pub fn invalidate(&self) {
        debug!("token cache invalidated");
        let config = self.config();
        self.session.store(Arc::new(Session::new(config)));
    }

    pub fn match_variants(&self, raw: &str, current: Option<&str>) -> Result<VariantMatched> {
        match_variants(&self.config(), raw, current)
    }

    pub fn is_blocked(&self, raw: &str) -> bool {
        self.config().is_blocked(raw)
    }

    /// The blocklist entry that excludes `raw`, if any.
    pub fn get_blocked(&self, raw: &str) -> Option<BlocklistEntry> {
        self.config().get_blocked(raw).cloned()
    }

    pub async fn parse_token(&self, raw: &str, alias: Option<&str>) -> Result<CachedUtils> {
        self.session().parse_token(raw, alias).await
    }

    pub async fn apply_extractors(&self, code: &str, id: Option<&str>) -> TokenSet {
        extractor::apply_extractors(&self.config(), code, id).await
    }

    /// Compiles a batch of tokens into a stylesheet.
    ///
    /// Tokens resolve concurrently. A handler failure drops only the token
    /// it belongs to; a configuration error aborts the batch.
    pub async fn generate(
        &self,
        input: impl Into<GenerateInput>,
        options: &GenerateOptions,
    ) -> Result<GenerateResult> {
        let session = self.session();
        let config = &*session.config;

        let mut tokens = match input.into() {
            GenerateInput::Code(code) => {
                extractor::apply_extractors(config, &code, options.id.as_deref()).await
            }
            GenerateInput::Tokens(tokens) => tokens,
        };
        if options.safelist {
            for token in &config.safelist {
                if !tokens.contains(token) {
                    tokens.insert(token.clone());
                }
            }
        }

        let session_ref = &session;
        let resolved = try_join_all(tokens.iter().map(|(raw, count)| async move {
            match session_ref.parse_token(raw, None).await {
                Ok(utils) => Ok((raw, count, utils)),
                Err(err) if !err.is_fatal() => {
                    warn!("skipping `{raw}`: {err}");
                    Ok((raw, count, None))
                }
                Err(err) => Err(err),
            }
        }))
        .await?;

        let mut sheet: IndexMap<String, Vec<StringifiedUtil>> = IndexMap::new();
        let mut layer_set: IndexSet<String> = IndexSet::new();
        layer_set.insert(LAYER_DEFAULT.to_string());
        let mut matched_tokens = BTreeSet::new();
        let mut matched_info = BTreeMap::new();

        for (raw, count, utils) in resolved {
            let Some(utils) = utils else {
                continue;
            };
            for util in utils.iter() {
                layer_set.insert(util.layer().unwrap_or(LAYER_DEFAULT).to_string());
                sheet
                    .entry(util.parent.clone().unwrap_or_default())
                    .or_default()
                    .push(util.clone());
            }
            if options.extended_info {
                matched_info.insert(raw.to_string(), ExtendedTokenInfo { data: utils, count });
            } else {
                matched_tokens.insert(raw.to_string());
            }
        }

        let mut preflights: HashMap<String, Vec<String>> = HashMap::new();
        if options.preflights {
            let ctx = PreflightContext {
                theme: &config.theme,
            };
            let ctx = &ctx;
            let outputs = join_all(config.preflights.iter().map(|preflight| async move {
                (preflight.layer(), preflight.get_css(ctx).await)
            }))
            .await;
            for (layer, css) in outputs {
                if let Some(css) = css.filter(|css| !css.is_empty()) {
                    layer_set.insert(layer.to_string());
                    preflights.entry(layer.to_string()).or_default().push(css);
                }
            }
        }
        let nl = if options.minify { "" } else { "\n" };
        let preflights = preflights
            .into_iter()
            .map(|(layer, parts)| (layer, parts.join(nl)))
            .collect();

        let layers = config.sort_layers(layer_set);
        let matched = if options.extended_info {
            Matched::Extended(matched_info)
        } else {
            Matched::Tokens(matched_tokens)
        };
        debug!(
            "generated {} tokens into {} layers ({} matched)",
            tokens.len(),
            layers.len(),
            matched.len()
        );

        Ok(GenerateResult::new(
            layers,
            matched,
            sheet,
            preflights,
            session.parent_orders.snapshot(),
            AssemblyOptions {
                minify: options.minify,
                scope: options.scope.clone(),
                merge_selectors: config.merge_selectors,
            },
        ))
    }
}

impl std::fmt::Debug for Generator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Generator")
            .field("config", &self.config())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ucss_core::entries::CssBlock;
    use ucss_core::rule::Rule;

    fn generator() -> Generator {
        Generator::new(
            UserConfig::new()
                .with_rule(Rule::new_static("flex", CssBlock::new().entry("display", "flex")))
                .with_safelist(["flex"]),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn tokens_are_cached_including_misses() {
        let generator = generator();
        let session = generator.session();

        assert!(generator.parse_token("flex", None).await.unwrap().is_some());
        assert!(generator.parse_token("nope", None).await.unwrap().is_none());
        assert_eq!(session.cache.len(), 2);
        assert!(matches!(session.cache.get("nope"), Some(None)));
    }

    #[tokio::test]
    async fn alias_builds_the_selector() {
        let generator = generator();
        let utils = generator.parse_token("flex", Some("row")).await.unwrap().unwrap();
        assert_eq!(utils[0].selector.as_deref(), Some(".row"));
        assert!(generator.session().cache.contains("flex row"));
    }

    #[tokio::test]
    async fn invalidate_starts_a_fresh_session() {
        let generator = generator();
        generator.parse_token("flex", None).await.unwrap();
        let before = generator.session();
        generator.invalidate();
        let after = generator.session();
        assert_eq!(before.cache.len(), 1);
        assert!(after.cache.is_empty());
        assert!(Arc::ptr_eq(&before.config, &after.config));
    }

    #[tokio::test]
    async fn safelist_can_be_disabled() {
        let generator = generator();
        let result = generator.generate("", &GenerateOptions::new()).await.unwrap();
        assert!(result.matched().contains("flex"));

        let options = GenerateOptions::new().with_safelist(false);
        let result = generator.generate("", &options).await.unwrap();
        assert!(result.matched().is_empty());
        assert_eq!(result.css(), "");
        assert_eq!(result.layers(), ["default"]);
    }
}
