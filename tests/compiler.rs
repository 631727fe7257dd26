use less_hsl::{compile, compile_file, compile_mixin_call, compile_value, CompileOptions, LessError};
use pretty_assertions::assert_eq;
use std::path::Path;

fn value(source: &str) -> String {
    compile_value(source, &CompileOptions::default()).unwrap()
}

fn minified(source: &str) -> String {
    compile_value(
        source,
        &CompileOptions {
            minify: true,
            ..CompileOptions::default()
        },
    )
    .unwrap()
}

fn fixture(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures").join(name)
}

#[test]
fn constant_colors_fold_at_compile_time() {
    assert_eq!(value("lighten(hsl(200, 50%, 50%), 10%)"), "hsl(200, 50%, 60%)");
    assert_eq!(value("darken(hsl(0, 0%, 5%), 10%)"), "hsl(0, 0%, 0%)");
    assert_eq!(value("spin(hsl(350, 50%, 50%), 20)"), "hsl(10, 50%, 50%)");
    assert_eq!(value("saturate(hsl(120, 30%, 40%), 15%)"), "hsl(120, 45%, 40%)");
    assert_eq!(minified("desaturate(hsl(120, 30%, 40%), 15%)"), "hsl(120,15%,40%)");
}

#[test]
fn lighten_on_theme_variable_is_deferred() {
    assert_eq!(
        value("lighten(var(--brand), 10%)"),
        "hsl(\n  var(--brand--h),\n  var(--brand--s),\n  calc(var(--brand--l) + 10%),\n  var(--brand--a)\n)"
    );
    assert_eq!(
        minified("lighten(var(--brand), 10%)"),
        "hsl(var(--brand--h),var(--brand--s),calc(var(--brand--l) + 10%),var(--brand--a))"
    );
}

#[test]
fn unmodified_variable_keeps_shorthand() {
    assert_eq!(value("var(--theme)"), "var(--theme)");
    assert_eq!(value("1px solid var(--theme)"), "1px solid var(--theme)");
}

#[test]
fn channel_variables_build_opaque_color() {
    assert_eq!(
        minified("hsl(var(--theme--h), var(--theme--s), var(--theme--l))"),
        "hsl(var(--theme--h),var(--theme--s),var(--theme--l))"
    );
}

#[test]
fn chained_transforms_never_nest_calc() {
    let css = minified("lighten(lighten(var(--brand), 10%), 5%)");
    assert!(css.contains("calc((var(--brand--l) + 10%) + 5%)"));
    assert!(!css.contains("calc(calc"));
}

#[test]
fn mix_with_equal_weight_is_symmetric() {
    let forward = value("mix(hsl(0, 100%, 50%), hsl(240, 100%, 50%), 50%)");
    let backward = value("mix(hsl(240, 100%, 50%), hsl(0, 100%, 50%), 50%)");
    assert_eq!(forward, "hsl(120, 100%, 50%)");
    assert_eq!(forward, backward);
}

#[test]
fn greyscale_is_idempotent() {
    let once = value("greyscale(hsl(10, 40%, 30%))");
    assert_eq!(once, "hsl(10, 0%, 30%)");
    assert_eq!(value("greyscale(greyscale(hsl(10, 40%, 30%)))"), once);
}

#[test]
fn opaque_alpha_is_omitted() {
    assert_eq!(value("fade(hsl(10, 40%, 30%), 100%)"), "hsl(10, 40%, 30%)");
    assert_eq!(value("fadeout(hsl(10, 40%, 30%), 25%)"), "hsl(10, 40%, 30%, 0.75)");
    assert_eq!(value("fadein(hsl(10, 40%, 30%, 0.5), 0.2)"), "hsl(10, 40%, 30%, 0.7)");
}

#[test]
fn diminish_scales_by_runtime_variable() {
    assert_eq!(
        minified("xf-diminish(var(--brand), 5%)"),
        "hsl(var(--brand--h),var(--brand--s),calc(var(--brand--l) - (5% * var(--xf-color-adjust))),var(--brand--a))"
    );
    assert_eq!(
        minified("xf-intensify(hsl(0, 0%, 50%), 10%)"),
        "hsl(0,0%,calc(50% + (10% * var(--xf-color-adjust))))"
    );

    let options = CompileOptions {
        minify: true,
        color_adjust_variable: "theme-scale".into(),
        ..CompileOptions::default()
    };
    let css = compile_value("xf-diminish(var(--brand), 5%)", &options).unwrap();
    assert!(css.contains("(5% * var(--theme-scale))"));
}

#[test]
fn accessors_return_components() {
    assert_eq!(value("hue(hsl(200, 50%, 50%))"), "200");
    assert_eq!(value("lightness(var(--brand))"), "var(--brand--l)");
    assert_eq!(
        value("lightness(lighten(var(--brand), 10%))"),
        "calc(var(--brand--l) + 10%)"
    );
    assert_eq!(value("red(var(--brand))"), "0");
}

#[test]
fn component_references_work_as_amounts() {
    assert_eq!(
        minified("lighten(var(--brand), lightness(var(--other)))"),
        "hsl(var(--brand--h),var(--brand--s),calc(var(--brand--l) + var(--other--l)),var(--brand--a))"
    );
}

#[test]
fn contrast_flips_lightness_around_threshold() {
    assert_eq!(value("contrast(hsl(0, 0%, 80%))"), "hsl(0, 0%, 0%)");
    assert_eq!(value("contrast(hsl(0, 0%, 20%))"), "hsl(0, 0%, 100%)");
}

#[test]
fn rgb_colors_join_theme_arithmetic() {
    let css = minified("mix(#ff0000, var(--brand))");
    assert!(css.contains("(var(--brand--h) * 0.5)"));
    assert!(css.starts_with("hsl("));
}

#[test]
fn every_transform_defers_on_whole_variable() {
    let cases = [
        (
            "saturate(var(--x), 10%)",
            "hsl(var(--x--h),calc(var(--x--s) + 10%),var(--x--l),var(--x--a))",
        ),
        (
            "desaturate(var(--x), 10%)",
            "hsl(var(--x--h),calc(var(--x--s) - 10%),var(--x--l),var(--x--a))",
        ),
        (
            "lighten(var(--x), 10%)",
            "hsl(var(--x--h),var(--x--s),calc(var(--x--l) + 10%),var(--x--a))",
        ),
        (
            "darken(var(--x), 10%)",
            "hsl(var(--x--h),var(--x--s),calc(var(--x--l) - 10%),var(--x--a))",
        ),
        (
            "xf-diminish(var(--x), 10%)",
            "hsl(var(--x--h),var(--x--s),calc(var(--x--l) - (10% * var(--xf-color-adjust))),var(--x--a))",
        ),
        (
            "xf-intensify(var(--x), 10%)",
            "hsl(var(--x--h),var(--x--s),calc(var(--x--l) + (10% * var(--xf-color-adjust))),var(--x--a))",
        ),
        (
            "fadein(var(--x), 10%)",
            "hsl(var(--x--h),var(--x--s),var(--x--l),calc(var(--x--a) + 0.1))",
        ),
        (
            "fadeout(var(--x), 10%)",
            "hsl(var(--x--h),var(--x--s),var(--x--l),calc(var(--x--a) - 0.1))",
        ),
        (
            "fade(var(--x), 40%)",
            "hsl(var(--x--h),var(--x--s),var(--x--l),0.4)",
        ),
        (
            "spin(var(--x), 30)",
            "hsl(calc(var(--x--h) + 30),var(--x--s),var(--x--l),var(--x--a))",
        ),
        (
            "mix(var(--x), var(--y), 30%)",
            "hsl(calc((var(--x--h) * 0.3) + (var(--y--h) * 0.7)),\
calc((var(--x--s) * 0.3) + (var(--y--s) * 0.7)),\
calc((var(--x--l) * 0.3) + (var(--y--l) * 0.7)),\
calc((var(--x--a) * 0.3) + (var(--y--a) * 0.7)))",
        ),
        (
            "tint(var(--x), 20%)",
            "hsl(var(--x--h),calc(var(--x--s) * 0.8),calc(20% + (var(--x--l) * 0.8)),var(--x--a))",
        ),
        (
            "shade(var(--x), 20%)",
            "hsl(var(--x--h),var(--x--s),calc(var(--x--l) * 0.8),var(--x--a))",
        ),
        (
            "greyscale(var(--x))",
            "hsl(var(--x--h),0%,var(--x--l),var(--x--a))",
        ),
        (
            "contrast(var(--x))",
            "hsl(var(--x--h),var(--x--s),calc(-100 * (var(--x--l) - 67%)),var(--x--a))",
        ),
        ("hue(var(--x))", "var(--x--h)"),
        ("saturation(var(--x))", "var(--x--s)"),
        ("lightness(var(--x))", "var(--x--l)"),
        ("alpha(var(--x))", "var(--x--a)"),
        ("green(var(--x))", "0"),
        ("blue(var(--x))", "0"),
    ];
    for (source, expected) in cases {
        assert_eq!(minified(source), expected, "{source}");
    }
}

#[test]
fn rgb_only_calls_keep_host_results() {
    assert_eq!(value("darken(#336699, 10%)"), "#264c73");
    assert_eq!(value("spin(red, 120)"), "#00ff00");
    assert_eq!(value("mix(#ff0000, #0000ff)"), "#800080");
    assert_eq!(value("tint(#ff0000, 50%)"), "#ff8080");
    assert_eq!(value("shade(#ff0000, 50%)"), "#800000");
    assert_eq!(value("xf-diminish(#336699, 5%)"), "xf-diminish(#336699, 5%)");
}

#[test]
fn non_ascii_hex_is_kept_as_text() {
    assert_eq!(value("#a\u{e9}aaa"), "#a\u{e9}aaa");
    assert_eq!(value("1px solid #\u{e9}\u{e9}\u{e9}"), "1px solid #\u{e9}\u{e9}\u{e9}");
}

#[test]
fn hue_near_full_turn_wraps_to_zero() {
    assert_eq!(value("spin(hsl(359.99996, 10%, 10%), 0)"), "hsl(0, 10%, 10%)");
}

#[test]
fn css_filter_functions_with_variables_are_theme_calls() {
    let err = compile_value("saturate(var(--amount))", &CompileOptions::default()).unwrap_err();
    match err {
        LessError::TypeError { function, .. } => assert_eq!(function, "saturate"),
        other => panic!("期待类型错误: {other:?}"),
    }
    assert_eq!(
        minified("contrast(var(--x))"),
        "hsl(var(--x--h),var(--x--s),calc(-100 * (var(--x--l) - 67%)),var(--x--a))"
    );
}

#[test]
fn unhandled_calls_fall_back_to_host() {
    assert_eq!(value("contrast(150%)"), "contrast(150%)");
    assert_eq!(value("saturate(2)"), "saturate(2)");
    assert_eq!(value("hue(10px)"), "hue(10px)");
    assert_eq!(value("hsl(red, 1px)"), "hsl(red, 1px)");
    assert_eq!(value("lighten(#336699, 20%)"), "#6699cc");
    assert_eq!(value("fade(#ffffff, 40%)"), "rgba(255, 255, 255, 0.4)");
}

#[test]
fn invalid_arguments_raise_type_errors() {
    let err = compile_value(
        "saturate(hsl(0, 0%, 0%), \"red\")",
        &CompileOptions::default(),
    )
    .unwrap_err();
    match err {
        LessError::TypeError { function, .. } => assert_eq!(function, "saturate"),
        other => panic!("期待类型错误: {other:?}"),
    }

    let err = compile_value("lighten(var(--brand))", &CompileOptions::default()).unwrap_err();
    assert!(matches!(err, LessError::TypeError { .. }));
    assert!(err.to_string().contains("lighten()"));
}

#[test]
fn declarations_block_minified() {
    let src = r"@brand: var(--brand);
@space: 4px;
color: lighten(@brand, 10%);
border: 1px solid fade(@brand, 50%);
margin: @space !important;";
    let css = compile(
        src,
        CompileOptions {
            minify: true,
            ..CompileOptions::default()
        },
    )
    .unwrap();
    assert_eq!(
        css,
        "color:hsl(var(--brand--h),var(--brand--s),calc(var(--brand--l) + 10%),var(--brand--a));\
border:1px solid hsl(var(--brand--h),var(--brand--s),var(--brand--l),0.5);\
margin:4px!important"
    );
}

#[test]
fn declarations_block_pretty() {
    let src = "@surface: hsl(210, 20%, 98%);\nbackground: @surface;\nborder-color: darken(@surface, 10%);";
    let css = compile(src, CompileOptions::default()).unwrap();
    assert_eq!(
        css,
        "background: hsl(210, 20%, 98%);\nborder-color: hsl(210, 20%, 88%);"
    );
}

#[test]
fn theme_fixture_compiles() {
    let css = compile_file(fixture("theme.less"), CompileOptions::default()).unwrap();
    assert!(css.contains("background-color: var(--brand);"));
    assert!(css.contains("text-decoration-color: #6699cc;"));
    assert!(css.contains("filter: contrast(150%) saturate(2);"));
    assert!(css.contains("transform: translate(10px, -5px) !important;"));
    assert!(css.contains("calc(var(--brand--l) - (4% * var(--xf-color-adjust)))"));
    assert!(!css.contains("calc(calc"));
}

#[test]
fn file_errors_carry_filename() {
    let err = compile_file(fixture("invalid.less"), CompileOptions::default()).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("saturate()"));
    assert!(message.contains("invalid.less"));
}

#[test]
fn mixin_call_arguments_are_compiled() {
    let call = compile_mixin_call(
        ".button-variant(@color: lighten(var(--brand), 10%); @bg: #fff) !important;",
        &CompileOptions::default(),
    )
    .unwrap();
    assert_eq!(call.selector.value, ".button-variant");
    assert!(call.important);
    assert_eq!(call.argument("bg").unwrap().to_css(false), "#fff");
    assert_eq!(
        call.to_css(true),
        ".button-variant(@color:hsl(var(--brand--h),var(--brand--s),calc(var(--brand--l) + 10%),var(--brand--a));@bg:#fff)!important"
    );
}

#[test]
fn mixin_selector_is_interpolated() {
    let mut options = CompileOptions::default();
    options.variables.insert("prefix".into(), "xf".into());
    let call = compile_mixin_call(".@{prefix}-btn(var(--theme), 2px)", &options).unwrap();
    assert_eq!(call.selector.value, ".xf-btn");
    assert_eq!(call.to_css(false), ".xf-btn(var(--theme); 2px)");

    let host = call.into_mixin_call();
    assert_eq!(host.selector.value, ".xf-btn");
    assert_eq!(host.args.len(), 2);
    assert!(host.args.iter().all(|arg| arg.name.is_none()));
}
