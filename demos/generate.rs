//! Generate Example
//!
//! Compiles the utilities used by one or more source files and prints the
//! stylesheet:
//!
//! ```text
//! cargo run --example generate -- index.html app.tsx
//! ```
//!
//! Without arguments a built-in snippet is used. Set `UCSS_LOG=1` to see the
//! engine's debug output on stderr.

use std::fs;

use log::{Level, LevelFilter, Metadata, Record};
use ucss_rs::prelude::*;

struct StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Debug
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

const SAMPLE: &str = r#"
<main class="flex p-4 sm:p-8">
  <button class="btn hover:bg-blue-600 focus:m-1">Save</button>
  <span class="text-gray-500 md:hidden">draft</span>
</main>
"#;

fn spacing(property: &'static str) -> Rule {
    Rule::dynamic(format!("^{}-(\\d+)$", &property[..1]), move |caps, _| {
        let n: f32 = caps.get(1).unwrap_or("0").parse().unwrap_or(0.0);
        emit(CssBlock::new().entry(property, format!("{}rem", n / 4.0)))
    })
}

fn color(prefix: &'static str, property: &'static str) -> Rule {
    Rule::dynamic(format!("^{prefix}-([a-z]+)-(\\d+)$"), move |caps, ctx| {
        let path = format!(
            "colors.{}.{}",
            caps.get(1).unwrap_or_default(),
            caps.get(2).unwrap_or_default()
        );
        Ok(ctx
            .theme
            .get_str(&path)
            .map(|value| vec![CssBlock::new().entry(property, value).into()]))
    })
}

fn preset() -> Preset {
    let theme = Theme::new()
        .with("colors.blue.500", "#3b82f6")
        .with("colors.blue.600", "#2563eb")
        .with("colors.gray.500", "#6b7280");

    Preset::new("demo")
        .with_theme(theme)
        .with_rules([
            Rule::new_static("flex", CssBlock::new().entry("display", "flex")),
            Rule::new_static("hidden", CssBlock::new().entry("display", "none")),
            spacing("margin"),
            spacing("padding"),
            color("bg", "background-color"),
            color("text", "color"),
        ])
        .with_variants([
            Variant::with_prefix("hover", "hover:", |h| h.with_selector(|s, _| Some(format!("{s}:hover")))),
            Variant::with_prefix("focus", "focus:", |h| h.with_selector(|s, _| Some(format!("{s}:focus")))),
            Variant::with_prefix("sm", "sm:", |h| h.with_parent_order("@media (min-width: 640px)", 640)),
            Variant::with_prefix("md", "md:", |h| h.with_parent_order("@media (min-width: 768px)", 768)),
        ])
        .with_shortcut(Shortcut::new("btn", "p-2 m-1 bg-blue-500 text-gray-500"))
}

fn main() {
    if std::env::var_os("UCSS_LOG").is_some() {
        let _ = log::set_boxed_logger(Box::new(StderrLogger));
        log::set_max_level(LevelFilter::Debug);
    }

    let paths: Vec<String> = std::env::args().skip(1).collect();
    let sources: Vec<(String, String)> = if paths.is_empty() {
        vec![("sample.html".to_string(), SAMPLE.to_string())]
    } else {
        paths
            .into_iter()
            .filter_map(|path| match fs::read_to_string(&path) {
                Ok(code) => Some((path, code)),
                Err(err) => {
                    eprintln!("skipping {path}: {err}");
                    None
                }
            })
            .collect()
    };

    let generator = match create_generator(UserConfig::new().with_preset(preset())) {
        Ok(generator) => generator,
        Err(err) => {
            eprintln!("invalid configuration: {err}");
            std::process::exit(1);
        }
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("failed to start runtime");

    runtime.block_on(async {
        let mut tokens = ucss_rs::ucss_core::TokenSet::new();
        for (path, code) in &sources {
            for (token, count) in generator.apply_extractors(code, Some(path)).await.iter() {
                tokens.insert_count(token, count);
            }
        }

        match generator.generate(tokens, &GenerateOptions::new()).await {
            Ok(result) => {
                println!("{}", result.css());
                eprintln!("{} utilities matched", result.matched().len());
            }
            Err(err) => eprintln!("generation failed: {err}"),
        }
    });
}
