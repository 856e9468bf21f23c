#[path = "support/preset.rs"]
mod preset;

use preset::{config, css, generator};
use ucss::Generator;
use ucss_core::shortcut::{Shortcut, ShortcutMeta};

#[tokio::test]
async fn shortcut_utilities_merge_into_one_block() {
    let generator = generator();
    let css = css(&generator, &["btn"]).await;
    assert_eq!(css, "/* layer: shortcuts */\n.btn{font-weight:700;padding:8px;}");
}

#[tokio::test]
async fn nested_shortcuts_flatten() {
    let generator = generator();
    let css = css(&generator, &["btn-primary"]).await;
    insta::assert_snapshot!(css, @r"
    /* layer: shortcuts */
    .btn-primary{font-weight:700;padding:8px;background-color:#3b82f6;}
    .btn-primary:hover{background-color:#2563eb;}
    ");
}

#[tokio::test]
async fn outer_variants_wrap_the_whole_shortcut() {
    let generator = generator();
    let css = css(&generator, &["sm:btn"]).await;
    insta::assert_snapshot!(css, @r"
    /* layer: shortcuts */
    @media (min-width: 640px){
    .sm\:btn{font-weight:700;padding:8px;}
    }
    ");
}

#[tokio::test]
async fn variant_groups_expand_inside_shortcuts() {
    let generator = generator();
    let css = css(&generator, &["btn-hover"]).await;
    assert_eq!(css, "/* layer: shortcuts */\n.btn-hover:hover{margin:4px;padding:8px;}");
}

#[tokio::test]
async fn dynamic_shortcuts_mix_tokens_and_inline_css() {
    let generator = generator();
    let css = css(&generator, &["card-3"]).await;
    assert_eq!(css, "/* layer: shortcuts */\n.card-3{padding:12px;border-radius:4px;}");
}

#[tokio::test]
async fn inline_css_keeps_variants_stripped_from_a_nested_shortcut() {
    let generator =
        Generator::new(config().with_shortcut(Shortcut::new("hover-card", "hover:card-3"))).unwrap();
    let out = css(&generator, &["hover-card"]).await;
    assert_eq!(
        out,
        "/* layer: shortcuts */\n.hover-card:hover{padding:12px;border-radius:4px;}"
    );
}

#[tokio::test]
async fn shortcuts_reach_internal_rules() {
    let generator = generator();
    let css = css(&generator, &["hidden-helper"]).await;
    assert_eq!(css, "/* layer: shortcuts */\n.hidden-helper{position:absolute;}");
}

#[tokio::test]
async fn prefixed_shortcuts_pass_their_prefix_to_rules() {
    let generator = generator();
    let css = css(&generator, &["foo-uses-bar", "uses-bar"]).await;
    assert_eq!(css, "/* layer: shortcuts */\n.foo-uses-bar{content:bar;}");
}

#[tokio::test]
async fn self_reference_stops_at_the_depth_limit() {
    let generator = generator();
    let bounded = css(&generator, &["loop"]).await;
    assert_eq!(bounded, "/* layer: shortcuts */\n.loop{margin:4px;}");

    let generator = Generator::new(config().with_shortcut_depth(0)).unwrap();
    let disabled = css(&generator, &["loop", "btn"]).await;
    assert_eq!(disabled, "");
}

#[tokio::test]
async fn shortcut_meta_controls_layer_and_merging() {
    let generator = Generator::new(
        config()
            .with_shortcut(
                Shortcut::new("stack", "p-2 m-1")
                    .with_meta(ShortcutMeta::new().with_layer("components").no_merge()),
            )
            .with_shortcut(Shortcut::new("pad", "p-2"))
            .with_layer("components", -5),
    )
    .unwrap();

    let result = generator
        .generate(preset::tokens(&["stack", "pad"]), &ucss::GenerateOptions::new())
        .await
        .unwrap();
    assert_eq!(result.layers(), ["shortcuts", "components", "default"]);
    insta::assert_snapshot!(result.css(), @r"
    /* layer: shortcuts */
    .pad{padding:8px;}
    /* layer: components */
    .stack{margin:4px;padding:8px;}
    ");
}

#[tokio::test]
async fn custom_shortcuts_layer() {
    let generator = Generator::new(config().with_shortcuts_layer("components")).unwrap();
    let css = css(&generator, &["btn"]).await;
    assert_eq!(css, "/* layer: components */\n.btn{font-weight:700;padding:8px;}");
}
