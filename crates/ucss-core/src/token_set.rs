//! An insertion-ordered set of candidate tokens that counts occurrences.

use indexmap::IndexMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenSet {
    counts: IndexMap<String, usize>,
}

impl TokenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one occurrence of `token`.
    pub fn insert(&mut self, token: impl Into<String>) {
        *self.counts.entry(token.into()).or_insert(0) += 1;
    }

    pub fn insert_count(&mut self, token: impl Into<String>, count: usize) {
        *self.counts.entry(token.into()).or_insert(0) += count;
    }

    pub fn contains(&self, token: &str) -> bool {
        self.counts.contains_key(token)
    }

    /// Occurrences seen so far; 0 when absent.
    pub fn count(&self, token: &str) -> usize {
        self.counts.get(token).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(token, count)| (token.as_str(), *count))
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.counts.keys().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for TokenSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = TokenSet::new();
        set.extend(iter);
        set
    }
}

impl<S: Into<String>> Extend<S> for TokenSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for token in iter {
            self.insert(token);
        }
    }
}
