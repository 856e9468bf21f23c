//! Variant group expansion.
//!
//! Shortcut bodies may group several utilities under one prefix:
//! `hover:(bg-red-500 text-white)` is shorthand for
//! `hover:bg-red-500 hover:text-white`. Groups nest, `~` inside a group
//! stands for the prefix itself, and a leading `!` on an item stays in front
//! of the expanded token.

/// Separators recognised between a group prefix and its `(`.
pub const DEFAULT_SEPARATORS: [char; 2] = [':', '-'];

/// Maximum group nesting expanded by [`expand_variant_group`].
pub const DEFAULT_GROUP_DEPTH: usize = 5;

/// Expands variant groups with the default separators and depth.
///
/// The result is whitespace-normalized: items are joined by single spaces.
pub fn expand_variant_group(input: &str) -> String {
    expand_variant_group_with(input, &DEFAULT_SEPARATORS, DEFAULT_GROUP_DEPTH)
}

/// Expands variant groups using custom separators and nesting depth.
pub fn expand_variant_group_with(input: &str, separators: &[char], depth: usize) -> String {
    split_top_level(input)
        .into_iter()
        .flat_map(|item| expand_item(item, separators, depth))
        .collect::<Vec<_>>()
        .join(" ")
}

fn expand_item(item: &str, separators: &[char], depth: usize) -> Vec<String> {
    if depth == 0 {
        return vec![item.to_string()];
    }
    let Some((prefix, sep, body)) = find_group(item, separators) else {
        return vec![item.to_string()];
    };

    let mut out = Vec::new();
    for inner in split_top_level(body) {
        for expanded in expand_item(inner, separators, depth - 1) {
            if expanded == "~" {
                out.push(prefix.to_string());
                continue;
            }
            let (bang, rest) = match expanded.strip_prefix('!') {
                Some(rest) => ("!", rest),
                None => ("", expanded.as_str()),
            };
            out.push(format!("{bang}{prefix}{sep}{rest}"));
        }
    }
    out
}

/// Finds `prefix<sep>(body)` spanning the whole item.
fn find_group<'a>(item: &'a str, separators: &[char]) -> Option<(&'a str, char, &'a str)> {
    let bytes = item.as_bytes();
    let mut brackets = 0usize;

    for (idx, ch) in item.char_indices() {
        match ch {
            '[' => brackets += 1,
            ']' => brackets = brackets.saturating_sub(1),
            '(' if brackets == 0 && idx >= 2 => {
                let sep = bytes[idx - 1] as char;
                if !separators.contains(&sep) {
                    continue;
                }
                let close = matching_paren(item, idx)?;
                if close != item.len() - 1 {
                    return None;
                }
                let prefix = &item[..idx - 1];
                let body = &item[idx + 1..close];
                if prefix.is_empty() || body.trim().is_empty() {
                    return None;
                }
                return Some((prefix, sep, body));
            }
            _ => {}
        }
    }
    None
}

fn matching_paren(item: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (idx, ch) in item[open..].char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + idx);
                }
            }
            _ => {}
        }
    }
    None
}

/// Splits on whitespace that is not inside parentheses or brackets.
fn split_top_level(input: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut start: Option<usize> = None;

    for (idx, ch) in input.char_indices() {
        match ch {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            _ => {}
        }
        if ch.is_whitespace() && depth == 0 {
            if let Some(begin) = start.take() {
                items.push(&input[begin..idx]);
            }
        } else if start.is_none() {
            start = Some(idx);
        }
    }
    if let Some(begin) = start {
        items.push(&input[begin..]);
    }
    items
}
