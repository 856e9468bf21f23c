//! Layer names, default weights and parent-scope helpers.

use indexmap::IndexMap;

pub const LAYER_DEFAULT: &str = "default";
pub const LAYER_PREFLIGHTS: &str = "preflights";
pub const LAYER_SHORTCUTS: &str = "shortcuts";
pub const LAYER_IMPORTS: &str = "imports";

/// Joins nested parent scopes, e.g. `@media (min-width: 640px) $$ @supports (display: grid)`.
pub const PARENT_JOINER: &str = " $$ ";

/// Marks where `GenerateOptions::scope` is substituted inside a selector.
pub const SCOPE_PLACEHOLDER: &str = " $$ ";

/// The built-in layer weights.
pub fn default_layers() -> IndexMap<String, i32> {
    [
        (LAYER_IMPORTS, -200),
        (LAYER_PREFLIGHTS, -100),
        (LAYER_SHORTCUTS, -10),
        (LAYER_DEFAULT, 0),
    ]
    .into_iter()
    .map(|(name, weight)| (name.to_string(), weight))
    .collect()
}

/// Orders layer names by weight, then by name. Unknown layers weigh 0.
pub fn sort_layers<I>(names: I, weights: &IndexMap<String, i32>) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut names: Vec<String> = names.into_iter().collect();
    names.sort_by(|a, b| {
        let wa = weights.get(a).copied().unwrap_or(0);
        let wb = weights.get(b).copied().unwrap_or(0);
        wa.cmp(&wb).then_with(|| a.cmp(b))
    });
    names.dedup();
    names
}

/// Nests `inner` inside an existing parent scope.
pub fn join_parent(outer: Option<&str>, inner: &str) -> String {
    match outer {
        Some(outer) if !outer.is_empty() => format!("{outer}{PARENT_JOINER}{inner}"),
        _ => inner.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_order() {
        let names = ["default", "shortcuts", "preflights", "imports"]
            .into_iter()
            .map(String::from);
        assert_eq!(
            sort_layers(names, &default_layers()),
            vec!["imports", "preflights", "shortcuts", "default"]
        );
    }

    #[test]
    fn unweighted_layers_sort_lexically_at_zero() {
        let names = ["zeta", "default", "alpha", "shortcuts"]
            .into_iter()
            .map(String::from);
        assert_eq!(
            sort_layers(names, &default_layers()),
            vec!["shortcuts", "alpha", "default", "zeta"]
        );
    }

    #[test]
    fn nested_parents() {
        assert_eq!(join_parent(None, "@media print"), "@media print");
        assert_eq!(
            join_parent(Some("@media print"), "@supports (display: grid)"),
            "@media print $$ @supports (display: grid)"
        );
    }
}
