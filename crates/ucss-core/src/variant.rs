//! Variants and the handlers they contribute.
//!
//! A [`Variant`] recognises a prefix or suffix of a token (`hover:`, `sm:`,
//! `!`) and returns the remaining token plus, optionally, a
//! [`VariantHandler`] describing how to transform the CSS the rest of the
//! token produces. Every transform on a handler is optional; a missing one
//! passes its input through unchanged.

use std::fmt;
use std::sync::Arc;

use crate::entries::{CssEntries, CssEntry};
use crate::theme::Theme;

/// Rewrites a selector. Receives the current selector and entries.
pub type SelectorFn = Arc<dyn Fn(&str, &[CssEntry]) -> Option<String> + Send + Sync>;

/// Rewrites the entry list.
pub type BodyFn = Arc<dyn Fn(CssEntries) -> Option<CssEntries> + Send + Sync>;

/// Continuation handed to a [`HandleFn`].
pub type Next<'a> = &'a dyn Fn(VariantHandlerContext) -> VariantHandlerContext;

/// Full control over the rest of the composition chain.
pub type HandleFn =
    Arc<dyn Fn(VariantHandlerContext, Next<'_>) -> VariantHandlerContext + Send + Sync>;

/// Recognises a variant on the current token.
pub type VariantMatcherFn =
    Arc<dyn Fn(&str, &VariantContext<'_>) -> Option<VariantMatch> + Send + Sync>;

/// The state threaded through variant composition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariantHandlerContext {
    pub prefix: String,
    pub selector: String,
    pub pseudo: String,
    pub entries: CssEntries,
    pub parent: Option<String>,
    pub parent_order: Option<i32>,
    pub layer: Option<String>,
    pub sort: Option<i32>,
    pub no_merge: Option<bool>,
}

/// A transform contributed by one applied variant.
#[derive(Clone, Default)]
pub struct VariantHandler {
    /// The token left after stripping this variant.
    pub matcher: Option<String>,
    /// Application priority; lower applies first.
    pub order: i32,
    pub selector: Option<SelectorFn>,
    pub body: Option<BodyFn>,
    /// Parent scope with an optional ordering weight.
    pub parent: Option<(String, Option<i32>)>,
    pub layer: Option<String>,
    pub sort: Option<i32>,
    pub no_merge: Option<bool>,
    pub handle: Option<HandleFn>,
}

impl VariantHandler {
    /// A handler that only consumes part of the token.
    pub fn new(matcher: impl Into<String>) -> Self {
        Self {
            matcher: Some(matcher.into()),
            ..Default::default()
        }
    }

    /// A handler that does not change the token, used for side-channel overrides.
    pub fn transform() -> Self {
        Self::default()
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn with_selector<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &[CssEntry]) -> Option<String> + Send + Sync + 'static,
    {
        self.selector = Some(Arc::new(f));
        self
    }

    pub fn with_body<F>(mut self, f: F) -> Self
    where
        F: Fn(CssEntries) -> Option<CssEntries> + Send + Sync + 'static,
    {
        self.body = Some(Arc::new(f));
        self
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some((parent.into(), None));
        self
    }

    /// Sets a parent scope together with its ordering weight.
    pub fn with_parent_order(mut self, parent: impl Into<String>, order: i32) -> Self {
        self.parent = Some((parent.into(), Some(order)));
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

    pub fn with_no_merge(mut self, no_merge: bool) -> Self {
        self.no_merge = Some(no_merge);
        self
    }

    pub fn with_handle<F>(mut self, f: F) -> Self
    where
        F: Fn(VariantHandlerContext, Next<'_>) -> VariantHandlerContext + Send + Sync + 'static,
    {
        self.handle = Some(Arc::new(f));
        self
    }

    /// Applies this handler's own transforms, without `handle`.
    pub fn apply(&self, input: VariantHandlerContext) -> VariantHandlerContext {
        let entries = match &self.body {
            Some(body) => {
                let original = input.entries.clone();
                body(input.entries).unwrap_or(original)
            }
            None => input.entries,
        };
        let selector = self
            .selector
            .as_ref()
            .and_then(|f| f(&input.selector, &entries))
            .unwrap_or(input.selector);
        let (parent, parent_order) = match &self.parent {
            Some((parent, order)) => (Some(parent.clone()), order.or(input.parent_order)),
            None => (input.parent, input.parent_order),
        };

        VariantHandlerContext {
            prefix: input.prefix,
            selector,
            pseudo: input.pseudo,
            entries,
            parent,
            parent_order,
            layer: self.layer.clone().or(input.layer),
            sort: self.sort.or(input.sort),
            no_merge: self.no_merge.or(input.no_merge),
        }
    }
}

impl fmt::Debug for VariantHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariantHandler")
            .field("matcher", &self.matcher)
            .field("order", &self.order)
            .field("selector", &self.selector.is_some())
            .field("body", &self.body.is_some())
            .field("parent", &self.parent)
            .field("layer", &self.layer)
            .field("sort", &self.sort)
            .field("no_merge", &self.no_merge)
            .field("handle", &self.handle.is_some())
            .finish()
    }
}

/// What a variant matcher returns.
#[derive(Debug, Clone)]
pub enum VariantMatch {
    /// Continue resolving with this token, no transform.
    Rest(String),
    Handler(VariantHandler),
}

impl From<String> for VariantMatch {
    fn from(rest: String) -> Self {
        VariantMatch::Rest(rest)
    }
}

impl From<&str> for VariantMatch {
    fn from(rest: &str) -> Self {
        VariantMatch::Rest(rest.to_string())
    }
}

impl From<VariantHandler> for VariantMatch {
    fn from(handler: VariantHandler) -> Self {
        VariantMatch::Handler(handler)
    }
}

/// Read-only context for variant matchers.
#[derive(Debug, Clone, Copy)]
pub struct VariantContext<'a> {
    /// The full token being resolved.
    pub raw: &'a str,
    pub theme: &'a Theme,
}

/// A named matcher over the current token.
#[derive(Clone)]
pub struct Variant {
    pub name: String,
    matcher: VariantMatcherFn,
    /// May apply more than once to the same token.
    pub multi_pass: bool,
    /// Position among variants; lower is scanned first.
    pub order: i32,
}

impl Variant {
    pub fn new<F>(name: impl Into<String>, matcher: F) -> Self
    where
        F: Fn(&str, &VariantContext<'_>) -> Option<VariantMatch> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            matcher: Arc::new(matcher),
            multi_pass: false,
            order: 0,
        }
    }

    /// A variant that strips a literal prefix and decorates the handler.
    ///
    /// ```rust
    /// use ucss_core::variant::Variant;
    ///
    /// let hover = Variant::with_prefix("hover", "hover:", |h| {
    ///     h.with_selector(|s, _| Some(format!("{s}:hover")))
    /// });
    /// assert_eq!(hover.name, "hover");
    /// ```
    pub fn with_prefix<F>(name: impl Into<String>, prefix: impl Into<String>, build: F) -> Self
    where
        F: Fn(VariantHandler) -> VariantHandler + Send + Sync + 'static,
    {
        let prefix = prefix.into();
        Self::new(name, move |input, _| {
            let rest = input.strip_prefix(prefix.as_str())?;
            if rest.is_empty() {
                return None;
            }
            Some(VariantMatch::Handler(build(VariantHandler::new(rest))))
        })
    }

    pub fn multi_pass(mut self) -> Self {
        self.multi_pass = true;
        self
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn matches(&self, input: &str, ctx: &VariantContext<'_>) -> Option<VariantMatch> {
        (self.matcher)(input, ctx)
    }
}

impl fmt::Debug for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variant")
            .field("name", &self.name)
            .field("multi_pass", &self.multi_pass)
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}
