//! Selector escaping.
//!
//! Utility tokens contain characters that are significant in CSS selectors
//! (`:`, `/`, `[`, `.`), so the class selector for `hover:bg-red-500/50` has
//! to be written as `.hover\:bg-red-500\/50`. The algorithm follows the
//! CSSOM `CSS.escape()` definition.

use std::fmt::Write;

/// Escapes a string for use as a CSS identifier.
pub fn escape_selector(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let first = chars.first().copied();
    let mut out = String::with_capacity(input.len() + 4);

    for (index, &ch) in chars.iter().enumerate() {
        let code = ch as u32;

        if code == 0 {
            out.push('\u{FFFD}');
            continue;
        }

        let leading_digit = ch.is_ascii_digit() && (index == 0 || (index == 1 && first == Some('-')));
        if (0x01..=0x1F).contains(&code) || code == 0x7F || leading_digit {
            let _ = write!(out, "\\{:x} ", code);
            continue;
        }

        // A lone hyphen is not a valid identifier.
        if index == 0 && ch == '-' && chars.len() == 1 {
            out.push('\\');
            out.push(ch);
            continue;
        }

        if code >= 0x80 || ch == '-' || ch == '_' || ch.is_ascii_alphanumeric() {
            out.push(ch);
            continue;
        }

        out.push('\\');
        out.push(ch);
    }

    out
}

/// Builds the class selector for a raw token.
pub fn to_escaped_selector(raw: &str) -> String {
    format!(".{}", escape_selector(raw))
}
