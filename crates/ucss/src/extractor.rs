//! The default extractor and extractor dispatch.

use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use ucss_core::extractor::{Extractor, ExtractorContext};
use ucss_core::registry::ResolvedConfig;
use ucss_core::token_set::TokenSet;

static SPLIT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"[\\:]?[\s'"`;{}]+"#).expect("split pattern is valid")
});

static VALID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\w\x{00A0}-\x{FFFF}%-?]").expect("selector filter is valid")
});

/// True when `token` could plausibly be a utility.
pub fn is_valid_selector(token: &str) -> bool {
    VALID_RE.is_match(token)
}

/// Splits source code on whitespace, quotes, backticks, `;`, `{` and `}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SplitExtractor;

impl SplitExtractor {
    pub fn split(code: &str) -> impl Iterator<Item = &str> {
        SPLIT_RE
            .split(code)
            .filter(|token| !token.is_empty() && is_valid_selector(token))
    }
}

#[async_trait]
impl Extractor for SplitExtractor {
    fn name(&self) -> &str {
        "split"
    }

    async fn extract(&self, ctx: &ExtractorContext<'_>) -> Option<Vec<String>> {
        Some(Self::split(ctx.code).map(str::to_string).collect())
    }
}

/// Runs every configured extractor over `code`, counting occurrences.
pub async fn apply_extractors(config: &ResolvedConfig, code: &str, id: Option<&str>) -> TokenSet {
    let mut extractors: Vec<Arc<dyn Extractor>> = config.extractors.clone();
    if config.extractor_default {
        extractors.push(Arc::new(SplitExtractor));
    }
    extractors.sort_by_key(|extractor| extractor.order());

    let ctx = ExtractorContext { code, id };
    let mut tokens = TokenSet::new();
    for extractor in extractors {
        if let Some(found) = extractor.extract(&ctx).await {
            log::trace!("extractor `{}` found {} tokens", extractor.name(), found.len());
            tokens.extend(found);
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use ucss_core::config::UserConfig;
    use ucss_core::registry::resolve_config;

    #[test]
    fn splits_markup() {
        let code = r#"<div class="flex hover:m-2" id='x'>{ `p-1`; }</div>"#;
        let tokens: Vec<&str> = SplitExtractor::split(code).collect();
        assert_eq!(
            tokens,
            vec!["<div", "class=", "flex", "hover:m-2", "id=", "x", ">", "p-1", "</div>"]
        );
    }

    #[test]
    fn rejects_punctuation_only() {
        assert!(is_valid_selector("m-2"));
        assert!(!is_valid_selector("{}"));
        assert!(!is_valid_selector("!"));
    }

    struct Words;

    #[async_trait]
    impl Extractor for Words {
        fn name(&self) -> &str {
            "words"
        }

        fn order(&self) -> i32 {
            -1
        }

        async fn extract(&self, ctx: &ExtractorContext<'_>) -> Option<Vec<String>> {
            ctx.id
                .filter(|id| id.ends_with(".txt"))
                .map(|_| ctx.code.split(' ').map(str::to_string).collect())
        }
    }

    #[tokio::test]
    async fn custom_extractors_add_to_the_default() {
        let config = resolve_config(UserConfig::new().with_extractor(Words)).unwrap();
        let tokens = apply_extractors(&config, "flex m-2", Some("a.txt")).await;
        assert_eq!(tokens.count("flex"), 2);
        assert_eq!(tokens.count("m-2"), 2);

        let tokens = apply_extractors(&config, "flex m-2", Some("a.html")).await;
        assert_eq!(tokens.count("flex"), 1);

        let config = resolve_config(
            UserConfig::new().with_extractor(Words).with_extractor_default(false),
        )
        .unwrap();
        let tokens = apply_extractors(&config, "flex", None).await;
        assert!(tokens.is_empty());
    }
}
