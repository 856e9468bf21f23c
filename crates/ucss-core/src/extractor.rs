//! The extractor seam: turning source text into candidate tokens.

use async_trait::async_trait;

#[derive(Debug, Clone, Copy)]
pub struct ExtractorContext<'a> {
    pub code: &'a str,
    /// Identifier of the source, usually a file path.
    pub id: Option<&'a str>,
}

/// Pulls candidate tokens out of source code.
///
/// Returning `None` means the extractor does not handle this source.
#[async_trait]
pub trait Extractor: Send + Sync {
    fn name(&self) -> &str;

    /// Extractors run in ascending order.
    fn order(&self) -> i32 {
        0
    }

    async fn extract(&self, ctx: &ExtractorContext<'_>) -> Option<Vec<String>>;
}
