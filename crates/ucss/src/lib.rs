//! # ucss - On-demand utility CSS engine
//!
//! Turns utility tokens such as `hover:bg-red-500` or `sm:m-2` into CSS,
//! generating only what the input actually uses.
//!
//! The pipeline for one token:
//!
//! 1. **Variants** ([`variants`]): `hover:`, `sm:`, `!` and friends are
//!    stripped iteratively, each contributing a handler
//! 2. **Shortcuts** ([`shortcuts`]): the remainder may expand into other
//!    tokens, recursively and within a depth budget
//! 3. **Rules** ([`matcher`]): static lookup, then pattern rules in
//!    declaration order; the first non-empty result wins
//! 4. **Stringify** ([`stringify`]): handlers are composed over the entries to
//!    produce selector, body, parent scope and layer
//!
//! Results are cached per token ([`cache`]). A batch call resolves all tokens
//! concurrently and then merges, orders and nests them into layers
//! ([`sheet`]).
//!
//! ## Quick Start
//!
//! ```rust
//! use ucss::{GenerateOptions, Generator};
//! use ucss_core::config::UserConfig;
//! use ucss_core::entries::CssBlock;
//! use ucss_core::rule::{Rule, emit};
//! use ucss_core::variant::Variant;
//!
//! let config = UserConfig::new()
//!     .with_rule(Rule::dynamic("^m-(\\d+)$", |caps, _| {
//!         emit(CssBlock::new().entry("margin", format!("{}px", caps.get(1).unwrap_or("0"))))
//!     }))
//!     .with_variant(Variant::with_prefix("hover", "hover:", |h| {
//!         h.with_selector(|s, _| Some(format!("{s}:hover")))
//!     }));
//!
//! let generator = Generator::new(config).expect("valid config");
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let result = generator
//!     .generate("m-2 hover:m-2", &GenerateOptions::new().minify())
//!     .await
//!     .expect("generation succeeds");
//! assert_eq!(result.css(), ".hover\\:m-2:hover,.m-2{margin:2px;}");
//! # });
//! ```
//!
//! ## Modules
//!
//! - [`generator`]: [`Generator`], sessions and batch generation
//! - [`variants`], [`matcher`], [`shortcuts`], [`stringify`]: the per-token pipeline
//! - [`sheet`]: layer assembly and [`GenerateResult`]
//! - [`cache`]: token cache and parent-scope ordering
//! - [`extractor`]: the default extractor

pub mod cache;
pub mod extractor;
pub mod generator;
pub mod matcher;
pub mod sheet;
pub mod shortcuts;
pub mod stringify;
pub mod variants;

pub use extractor::SplitExtractor;
pub use generator::{GenerateInput, GenerateOptions, Generator, Session};
pub use sheet::{GenerateResult, Matched};
pub use stringify::{SourceContext, StringifiedUtil};
pub use variants::VariantMatched;
