//! Iterative variant resolution.
//!
//! Variants are scanned in registry order. The first one that applies
//! contributes a handler, which goes to the front of the handler list, and
//! the scan restarts on the remaining token. Resolution ends when a full scan
//! matches nothing.

use log::trace;
use ucss_core::error::{Result, UcssError};
use ucss_core::registry::ResolvedConfig;
use ucss_core::variant::{VariantContext, VariantHandler, VariantMatch};

/// Upper bound on handlers collected for one token.
pub const MAX_VARIANT_HANDLERS: usize = 500;

/// A token with its variants stripped.
#[derive(Debug, Clone)]
pub struct VariantMatched {
    /// The token as written.
    pub raw: String,
    /// What is left once every variant has been stripped.
    pub processed: String,
    /// Handlers, most recently matched first.
    pub handlers: Vec<VariantHandler>,
    /// Names of the variants that applied, in match order.
    pub applied: Vec<String>,
}

impl VariantMatched {
    /// A token with no variants.
    pub fn bare(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        Self {
            processed: raw.clone(),
            raw,
            handlers: Vec::new(),
            applied: Vec::new(),
        }
    }
}

/// Strips variants from `current` (or `raw` when absent).
///
/// Fails with [`UcssError::VariantCycle`] once more than
/// [`MAX_VARIANT_HANDLERS`] handlers accumulate.
pub fn match_variants(
    config: &ResolvedConfig,
    raw: &str,
    current: Option<&str>,
) -> Result<VariantMatched> {
    let ctx = VariantContext {
        raw,
        theme: &config.theme,
    };
    let mut processed = current.unwrap_or(raw).to_string();
    let mut handlers: Vec<VariantHandler> = Vec::new();
    let mut applied_indices: Vec<usize> = Vec::new();
    let mut applied = Vec::new();

    loop {
        let mut matched = false;

        for (index, variant) in config.variants.iter().enumerate() {
            if !variant.multi_pass && applied_indices.contains(&index) {
                continue;
            }
            let handler = match variant.matches(&processed, &ctx) {
                None => continue,
                Some(VariantMatch::Rest(rest)) if rest == processed => continue,
                Some(VariantMatch::Rest(rest)) => VariantHandler::new(rest),
                Some(VariantMatch::Handler(handler)) => handler,
            };

            trace!("variant `{}` matched `{}`", variant.name, processed);
            if let Some(rest) = &handler.matcher {
                processed = rest.clone();
            }
            handlers.insert(0, handler);
            applied_indices.push(index);
            applied.push(variant.name.clone());
            matched = true;
            break;
        }

        if !matched {
            break;
        }
        if handlers.len() > MAX_VARIANT_HANDLERS {
            return Err(UcssError::VariantCycle {
                raw: raw.to_string(),
                limit: MAX_VARIANT_HANDLERS,
            });
        }
    }

    Ok(VariantMatched {
        raw: raw.to_string(),
        processed,
        handlers,
        applied,
    })
}
