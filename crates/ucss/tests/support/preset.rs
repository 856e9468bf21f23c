//! A small preset shared by the integration tests.
//!
//! Rule indices, in declaration order:
//!
//! | index | rule                      |
//! |-------|---------------------------|
//! | 0     | `flex`                    |
//! | 1     | `block`                   |
//! | 2     | `font-bold`               |
//! | 3     | `m-N` (N * 4px)           |
//! | 4     | `p-N` (N * 4px)           |
//! | 5     | `bg-COLOR-SHADE` (theme)  |
//! | 6     | `bg-ANY` fallback         |
//! | 7     | `text-COLOR-SHADE`        |
//! | 8     | `foo-bar` (prefixed)      |
//! | 9     | `sr-internal` (internal)  |
//! | 10    | `boom` (fails)            |
//! | 11    | `grid-safe` (parent)      |
//! | 12    | `print-only` (layer)      |
//! | 13    | `raw-reset` (raw CSS)     |

#![allow(dead_code)]

use ucss::{GenerateOptions, Generator};
use ucss_core::config::{Preset, UserConfig};
use ucss_core::entries::{CssBlock, CssEntries};
use ucss_core::error::HandlerError;
use ucss_core::layer::join_parent;
use ucss_core::rule::{Captures, HandlerResult, Rule, RuleContext, RuleItem, RuleMeta, emit};
use ucss_core::shortcut::{Shortcut, ShortcutMeta};
use ucss_core::theme::Theme;
use ucss_core::token_set::TokenSet;
use ucss_core::variant::{Variant, VariantHandler};

fn spacing(property: &'static str) -> impl Fn(&Captures, &RuleContext<'_>) -> HandlerResult {
    move |caps, _| {
        let n: u32 = caps.get(1).unwrap_or("0").parse().unwrap_or(0);
        emit(CssBlock::new().entry(property, format!("{}px", n * 4)))
    }
}

fn theme_color(property: &'static str) -> impl Fn(&Captures, &RuleContext<'_>) -> HandlerResult {
    move |caps, ctx| {
        let path = format!("colors.{}.{}", caps.get(1).unwrap_or_default(), caps.get(2).unwrap_or_default());
        match ctx.theme.get_str(&path) {
            Some(color) => emit(CssBlock::new().entry(property, color)),
            None => Ok(None),
        }
    }
}

fn important(entries: CssEntries) -> Option<CssEntries> {
    Some(
        entries
            .into_iter()
            .map(|mut entry| {
                if let Some(value) = entry.value.as_mut() {
                    value.push_str(" !important");
                }
                entry
            })
            .collect(),
    )
}

pub fn theme() -> Theme {
    Theme::new()
        .with("colors.blue.400", "#60a5fa")
        .with("colors.blue.500", "#3b82f6")
        .with("colors.blue.600", "#2563eb")
        .with("colors.red.500", "#ef4444")
}

pub fn rules() -> Vec<Rule> {
    vec![
        Rule::new_static("flex", CssBlock::new().entry("display", "flex")),
        Rule::new_static("block", CssBlock::new().entry("display", "block")),
        Rule::new_static("font-bold", CssBlock::new().entry("font-weight", "700")),
        Rule::dynamic("^m-(\\d+)$", spacing("margin")),
        Rule::dynamic("^p-(\\d+)$", spacing("padding")),
        Rule::dynamic("^bg-([a-z]+)-(\\d+)$", theme_color("background-color")),
        Rule::dynamic("^bg-(.+)$", |caps, _| {
            emit(CssBlock::new().entry("background", format!("var(--{})", caps.get(1).unwrap_or_default())))
        }),
        Rule::dynamic("^text-([a-z]+)-(\\d+)$", theme_color("color")),
        Rule::dynamic("^bar$", |_, _| emit(CssBlock::new().entry("content", "bar")))
            .with_meta(RuleMeta::new().with_prefix(["foo-"])),
        Rule::new_static("sr-internal", CssBlock::new().entry("position", "absolute"))
            .with_meta(RuleMeta::new().internal()),
        Rule::dynamic("^boom$", |_, _| Err(HandlerError::new("kaboom"))),
        Rule::dynamic("^grid-safe$", |_, _| {
            emit(
                CssBlock::new()
                    .entry("display", "grid")
                    .with_parent("@supports (display: grid)"),
            )
        }),
        Rule::dynamic("^print-only$", |_, _| {
            emit(CssBlock::new().entry("display", "none").with_layer("print"))
        }),
        Rule::static_items("raw-reset", vec![RuleItem::Raw("*{margin:0;}".into())]),
    ]
}

pub fn variants() -> Vec<Variant> {
    vec![
        Variant::with_prefix("hover", "hover:", |h| {
            h.with_selector(|s, _| Some(format!("{s}:hover")))
        }),
        Variant::with_prefix("focus", "focus:", |h| {
            h.with_selector(|s, _| Some(format!("{s}:focus")))
        }),
        Variant::with_prefix("sm", "sm:", |h| {
            h.with_parent_order("@media (min-width: 640px)", 100)
        }),
        Variant::with_prefix("md", "md:", |h| {
            h.with_parent_order("@media (min-width: 768px)", 200)
        }),
        Variant::with_prefix("dark", "dark:", |h| {
            h.with_selector(|s, _| Some(format!(".dark $$ {s}")))
        }),
        Variant::with_prefix("supports-grid", "supports-grid:", |h| {
            h.with_handle(|input, next| {
                let mut out = next(input);
                out.parent = Some(join_parent(out.parent.as_deref(), "@supports (display: grid)"));
                out
            })
        }),
        Variant::new("important", |input, _| {
            let rest = input.strip_prefix('!').filter(|rest| !rest.is_empty())?;
            Some(VariantHandler::new(rest).with_body(important).into())
        }),
    ]
}

pub fn shortcuts() -> Vec<Shortcut> {
    vec![
        Shortcut::new("btn", "p-2 font-bold"),
        Shortcut::new("btn-primary", "btn bg-blue-500 hover:bg-blue-600"),
        Shortcut::new("btn-hover", "hover:(p-2 m-1)"),
        Shortcut::new("loop", "loop m-1"),
        Shortcut::new("uses-bar", "bar").with_meta(ShortcutMeta::new().with_prefix(["foo-"])),
        Shortcut::new("hidden-helper", "sr-internal"),
        Shortcut::dynamic("^card-(\\d+)$", |caps, _| {
            Some(vec![
                format!("p-{}", caps.get(1).unwrap_or("0")).into(),
                CssBlock::new().entry("border-radius", "4px").into(),
            ])
        }),
    ]
}

pub fn preset() -> Preset {
    Preset::new("test")
        .with_rules(rules())
        .with_variants(variants())
        .with_theme(theme())
        .with_shortcuts(shortcuts())
}

pub fn config() -> UserConfig {
    UserConfig::new().with_preset(preset())
}

pub fn generator() -> Generator {
    Generator::new(config()).expect("fixture config is valid")
}

pub fn tokens(list: &[&str]) -> TokenSet {
    list.iter().copied().collect()
}

/// Generates `list` and returns the stylesheet.
pub async fn css(generator: &Generator, list: &[&str]) -> String {
    generator
        .generate(tokens(list), &GenerateOptions::new())
        .await
        .expect("generation succeeds")
        .css()
        .to_string()
}
