//! Preflights: raw CSS injected ahead of the utilities of a layer.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::layer::LAYER_PREFLIGHTS;
use crate::theme::Theme;

#[derive(Debug, Clone, Copy)]
pub struct PreflightContext<'a> {
    pub theme: &'a Theme,
}

/// Computes preflight CSS, possibly from external data.
#[async_trait]
pub trait PreflightProvider: Send + Sync {
    async fn css(&self, ctx: &PreflightContext<'_>) -> Option<String>;
}

#[derive(Clone)]
pub enum PreflightCss {
    Static(String),
    Dynamic(Arc<dyn PreflightProvider>),
}

#[derive(Clone)]
pub struct Preflight {
    pub css: PreflightCss,
    pub layer: Option<String>,
}

impl Preflight {
    pub fn new(css: impl Into<String>) -> Self {
        Self {
            css: PreflightCss::Static(css.into()),
            layer: None,
        }
    }

    pub fn dynamic(provider: impl PreflightProvider + 'static) -> Self {
        Self {
            css: PreflightCss::Dynamic(Arc::new(provider)),
            layer: None,
        }
    }

    pub fn with_layer(mut self, layer: impl Into<String>) -> Self {
        self.layer = Some(layer.into());
        self
    }

    /// The target layer, `preflights` by default.
    pub fn layer(&self) -> &str {
        self.layer.as_deref().unwrap_or(LAYER_PREFLIGHTS)
    }

    pub async fn get_css(&self, ctx: &PreflightContext<'_>) -> Option<String> {
        match &self.css {
            PreflightCss::Static(css) => Some(css.clone()),
            PreflightCss::Dynamic(provider) => provider.css(ctx).await,
        }
    }
}

impl fmt::Debug for Preflight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let css = match &self.css {
            PreflightCss::Static(css) => css.as_str(),
            PreflightCss::Dynamic(_) => "<dynamic>",
        };
        f.debug_struct("Preflight")
            .field("css", &css)
            .field("layer", &self.layer)
            .finish()
    }
}
