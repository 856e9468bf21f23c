//! On-demand utility CSS.
//!
//! This crate bundles the engine ([`ucss`]) with its configuration model
//! ([`ucss_core`]) and re-exports the types most hosts need.
//!
//! ```rust
//! use ucss_rs::prelude::*;
//!
//! let generator = create_generator(
//!     UserConfig::new().with_rule(Rule::new_static("flex", CssBlock::new().entry("display", "flex"))),
//! )
//! .unwrap();
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let result = generator
//!     .generate("<div class=\"flex\">", &GenerateOptions::new().minify())
//!     .await
//!     .unwrap();
//! assert_eq!(result.css(), ".flex{display:flex;}");
//! # });
//! ```

pub use ucss;
pub use ucss_core;

pub use ucss::{GenerateInput, GenerateOptions, GenerateResult, Generator};
pub use ucss_core::{Preset, Result, UcssError, UserConfig};

/// Resolves `config` and returns a generator ready to compile tokens.
pub fn create_generator(config: UserConfig) -> Result<Generator> {
    Generator::new(config)
}

/// The types needed to write a preset and run a generator.
pub mod prelude {
    pub use super::create_generator;
    pub use ucss::{GenerateOptions, GenerateResult, Generator};
    pub use ucss_core::blocklist::BlocklistEntry;
    pub use ucss_core::entries::{CssBlock, CssEntry};
    pub use ucss_core::error::HandlerError;
    pub use ucss_core::preflight::Preflight;
    pub use ucss_core::rule::{Rule, RuleMeta, emit};
    pub use ucss_core::shortcut::{Shortcut, ShortcutMeta};
    pub use ucss_core::theme::Theme;
    pub use ucss_core::variant::{Variant, VariantHandler};
    pub use ucss_core::{Preset, UserConfig};
}
