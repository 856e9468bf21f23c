//! # ucss-core - Data model for the ucss utility CSS engine
//!
//! Everything a configuration is made of, and the read-only registry built
//! from it. The compilation engine itself lives in the `ucss` crate.
//!
//! - **Entries**: [`CssEntry`](entries::CssEntry) pairs and the
//!   [`CssBlock`](entries::CssBlock) rules emit, with a typed side channel
//!   for parent, selector, layer, sort and extra variants
//! - **Rules**: static lookups and pattern-driven async handlers
//! - **Variants**: matchers that strip `hover:`-style prefixes and contribute
//!   composable [`VariantHandler`](variant::VariantHandler)s
//! - **Shortcuts**: tokens expanding into other tokens or inline CSS
//! - **Registry**: [`resolve_config`](registry::resolve_config) turns a
//!   [`UserConfig`](config::UserConfig) into a [`ResolvedConfig`](registry::ResolvedConfig)
//!
//! ## Quick Start
//!
//! ```rust
//! use ucss_core::config::UserConfig;
//! use ucss_core::entries::CssBlock;
//! use ucss_core::registry::resolve_config;
//! use ucss_core::rule::{Rule, emit};
//!
//! let config = UserConfig::new()
//!     .with_rule(Rule::new_static("flex", CssBlock::new().entry("display", "flex")))
//!     .with_rule(Rule::dynamic("^m-(\\d+)$", |caps, _| {
//!         let n: u32 = caps.get(1).unwrap_or("0").parse().unwrap_or(0);
//!         emit(CssBlock::new().entry("margin", format!("{}rem", n as f32 / 4.0)))
//!     }));
//!
//! let resolved = resolve_config(config).expect("valid config");
//! assert!(resolved.rules_static.contains_key("flex"));
//! assert_eq!(resolved.rules_dynamic.len(), 1);
//! ```
//!
//! ## Modules
//!
//! - [`entries`]: CSS entries, blocks and serialization
//! - [`rule`], [`variant`], [`shortcut`], [`blocklist`], [`preflight`]: registry entry kinds
//! - [`config`], [`registry`]: user configuration and its resolved form
//! - [`theme`], [`layer`]: theme lookup and layer weights
//! - [`escape`], [`variant_group`]: selector escaping and `hover:(a b)` expansion
//! - [`extractor`], [`token_set`]: the token extraction seam
//! - [`error`]: error types

pub mod blocklist;
pub mod config;
pub mod entries;
pub mod error;
pub mod escape;
pub mod extractor;
pub mod layer;
pub mod preflight;
pub mod registry;
pub mod rule;
pub mod shortcut;
pub mod theme;
pub mod token_set;
pub mod variant;
pub mod variant_group;

pub use config::{Preset, UserConfig};
pub use entries::{CssBlock, CssEntries, CssEntry, UtilObject};
pub use error::{HandlerError, Result, UcssError};
pub use registry::{ResolvedConfig, resolve_config};
pub use rule::{Rule, RuleMeta};
pub use shortcut::{Shortcut, ShortcutMeta};
pub use theme::Theme;
pub use token_set::TokenSet;
pub use variant::{Variant, VariantHandler};
