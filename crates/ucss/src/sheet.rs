//! Merge and layer assembly of compiled utilities.
//!
//! Assembly happens once per [`GenerateResult`], after every token of the
//! batch has been resolved. Each layer is rendered on first request and
//! memoized.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use once_cell::sync::OnceCell;
use ucss_core::layer::{LAYER_DEFAULT, PARENT_JOINER, SCOPE_PLACEHOLDER};

use crate::stringify::StringifiedUtil;

/// Prefixes `selector` with `scope`, or substitutes the scope placeholder.
///
/// At-rules are left untouched.
///
/// ```rust
/// use ucss::sheet::apply_scope;
///
/// assert_eq!(apply_scope(".m-2", Some(".app")), ".app .m-2");
/// assert_eq!(apply_scope(".dark $$ .m-2", Some(".app")), ".dark .app .m-2");
/// assert_eq!(apply_scope(".dark $$ .m-2", None), ".dark .m-2");
/// ```
pub fn apply_scope(selector: &str, scope: Option<&str>) -> String {
    if selector.starts_with('@') {
        return selector.to_string();
    }
    let scope = scope.filter(|scope| !scope.is_empty());
    if selector.contains(SCOPE_PLACEHOLDER) {
        let replacement = match scope {
            Some(scope) => format!(" {scope} "),
            None => " ".to_string(),
        };
        return selector.replace(SCOPE_PLACEHOLDER, &replacement).trim().to_string();
    }
    match scope {
        Some(scope) => format!("{scope} {selector}"),
        None => selector.to_string(),
    }
}

fn compare_utils(a: &StringifiedUtil, b: &StringifiedUtil) -> Ordering {
    a.index
        .cmp(&b.index)
        .then_with(|| a.meta.sort.unwrap_or(0).cmp(&b.meta.sort.unwrap_or(0)))
        .then_with(|| a.current.cmp(&b.current))
        .then_with(|| a.selector.cmp(&b.selector))
        .then_with(|| a.body.cmp(&b.body))
}

/// Per-token match information kept with `extended_info`.
#[derive(Debug, Clone)]
pub struct ExtendedTokenInfo {
    pub data: Arc<[StringifiedUtil]>,
    /// Occurrences of the token in the input.
    pub count: usize,
}

/// The tokens that produced CSS in a batch.
#[derive(Debug, Clone)]
pub enum Matched {
    Tokens(BTreeSet<String>),
    Extended(BTreeMap<String, ExtendedTokenInfo>),
}

impl Matched {
    pub fn len(&self) -> usize {
        match self {
            Matched::Tokens(tokens) => tokens.len(),
            Matched::Extended(tokens) => tokens.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, token: &str) -> bool {
        match self {
            Matched::Tokens(tokens) => tokens.contains(token),
            Matched::Extended(tokens) => tokens.contains_key(token),
        }
    }

    /// Matched tokens in sorted order.
    pub fn tokens(&self) -> Vec<&str> {
        match self {
            Matched::Tokens(tokens) => tokens.iter().map(String::as_str).collect(),
            Matched::Extended(tokens) => tokens.keys().map(String::as_str).collect(),
        }
    }

    /// Per-token details, when the batch kept them.
    pub fn info(&self, token: &str) -> Option<&ExtendedTokenInfo> {
        match self {
            Matched::Tokens(_) => None,
            Matched::Extended(tokens) => tokens.get(token),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct AssemblyOptions {
    pub minify: bool,
    pub scope: Option<String>,
    pub merge_selectors: bool,
}

struct Block {
    selectors: Option<Vec<(String, i32)>>,
    body: String,
    no_merge: bool,
}

/// The outcome of one `generate` call.
#[derive(Debug)]
pub struct GenerateResult {
    layers: Vec<String>,
    matched: Matched,
    /// Utilities grouped by parent scope; `""` holds the unscoped ones.
    sheet: IndexMap<String, Vec<StringifiedUtil>>,
    preflights: HashMap<String, String>,
    parent_orders: HashMap<String, i32>,
    options: AssemblyOptions,
    layer_cache: HashMap<String, OnceCell<String>>,
    css: OnceCell<String>,
}

impl GenerateResult {
    pub(crate) fn new(
        layers: Vec<String>,
        matched: Matched,
        sheet: IndexMap<String, Vec<StringifiedUtil>>,
        preflights: HashMap<String, String>,
        parent_orders: HashMap<String, i32>,
        options: AssemblyOptions,
    ) -> Self {
        let layer_cache = layers
            .iter()
            .map(|layer| (layer.clone(), OnceCell::new()))
            .collect();
        Self {
            layers,
            matched,
            sheet,
            preflights,
            parent_orders,
            options,
            layer_cache,
            css: OnceCell::new(),
        }
    }

    /// Layer names in output order.
    pub fn layers(&self) -> &[String] {
        &self.layers
    }

    pub fn matched(&self) -> &Matched {
        &self.matched
    }

    /// The whole stylesheet.
    pub fn css(&self) -> &str {
        self.css.get_or_init(|| self.get_layers(None, None))
    }

    /// One layer's CSS, or `None` when the batch has no such layer.
    pub fn get_layer(&self, name: &str) -> Option<&str> {
        self.layer_cache
            .get(name)
            .map(|cell| cell.get_or_init(|| self.build_layer(name)).as_str())
    }

    /// Concatenates layers in order, filtered by `include` and `exclude`.
    pub fn get_layers(&self, include: Option<&[&str]>, exclude: Option<&[&str]>) -> String {
        self.layers
            .iter()
            .filter(|layer| include.is_none_or(|names| names.contains(&layer.as_str())))
            .filter(|layer| !exclude.is_some_and(|names| names.contains(&layer.as_str())))
            .filter_map(|layer| self.get_layer(layer))
            .filter(|css| !css.is_empty())
            .collect::<Vec<_>>()
            .join(self.newline())
    }

    fn newline(&self) -> &'static str {
        if self.options.minify { "" } else { "\n" }
    }

    fn build_layer(&self, layer: &str) -> String {
        let nl = self.newline();
        let order = |parent: &str| self.parent_orders.get(parent).copied().unwrap_or(0);

        let mut parents: Vec<(&String, &Vec<StringifiedUtil>)> = self.sheet.iter().collect();
        parents.sort_by(|(a, _), (b, _)| order(a).cmp(&order(b)).then_with(|| a.cmp(b)));

        let mut css = parents
            .into_iter()
            .filter_map(|(parent, utils)| self.build_parent(layer, parent, utils))
            .collect::<Vec<_>>()
            .join(nl);

        if let Some(preflight) = self.preflights.get(layer).filter(|css| !css.is_empty()) {
            css = if css.is_empty() {
                preflight.clone()
            } else {
                format!("{preflight}{nl}{css}")
            };
        }

        if css.is_empty() {
            String::new()
        } else if self.options.minify {
            css
        } else {
            format!("/* layer: {layer} */{nl}{css}")
        }
    }

    fn build_parent(&self, layer: &str, parent: &str, utils: &[StringifiedUtil]) -> Option<String> {
        let nl = self.newline();
        let mut sorted: Vec<&StringifiedUtil> = utils
            .iter()
            .filter(|util| util.layer().unwrap_or(LAYER_DEFAULT) == layer)
            .collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(|a, b| compare_utils(a, b));

        let scope = self.options.scope.as_deref();
        let mut blocks: Vec<Block> = sorted
            .iter()
            .map(|util| Block {
                selectors: util
                    .selector
                    .as_ref()
                    .map(|selector| vec![(apply_scope(selector, scope), util.meta.sort.unwrap_or(0))]),
                body: util.body.clone(),
                no_merge: util.never_merge(),
            })
            .collect();

        // Walk backwards, folding each block into the nearest earlier block
        // with the same body.
        let mut rendered = Vec::with_capacity(blocks.len());
        for idx in (0..blocks.len()).rev() {
            if !blocks[idx].no_merge && self.options.merge_selectors {
                let current = &blocks[idx];
                let target = (0..idx).rev().find(|&j| {
                    let other = &blocks[j];
                    !other.no_merge
                        && other.selectors.is_some() == current.selectors.is_some()
                        && other.body == current.body
                });
                if let Some(target) = target {
                    if let Some(moved) = blocks[idx].selectors.take() {
                        if let Some(selectors) = blocks[target].selectors.as_mut() {
                            selectors.extend(moved);
                        }
                    }
                    continue;
                }
            }

            let block = &blocks[idx];
            let line = match &block.selectors {
                Some(pairs) => {
                    let mut pairs = pairs.clone();
                    pairs.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
                    let selectors: IndexSet<&str> = pairs
                        .iter()
                        .map(|(selector, _)| selector.as_str())
                        .filter(|selector| !selector.is_empty())
                        .collect();
                    if selectors.is_empty() {
                        block.body.clone()
                    } else {
                        let joiner = format!(",{nl}");
                        let selectors: Vec<&str> = selectors.into_iter().collect();
                        format!("{}{{{}}}", selectors.join(&joiner), block.body)
                    }
                }
                None => block.body.clone(),
            };
            rendered.push(line);
        }
        rendered.reverse();
        let rules = rendered.join(nl);

        if parent.is_empty() {
            return Some(rules);
        }
        let scopes: Vec<&str> = parent.split(PARENT_JOINER).collect();
        Some(format!(
            "{}{{{nl}{rules}{nl}{}",
            scopes.join("{"),
            "}".repeat(scopes.len())
        ))
    }
}
