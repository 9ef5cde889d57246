//! Saving: standalone documents, byte stability and failure modes.

mod common;

use chartify_grammar::notebook::Notebook;
use chartify_grammar::{
    field, repeat, Chart, ChartSpec, EmbedOptions, EmbedRenderer, Encoding, ExportError, FieldType,
    RenderError, RepeatRef, Scale, Viewer,
};
use common::happiness;
use serde_json::Value;
use std::fs;

fn svg_options() -> EmbedOptions {
    EmbedOptions {
        renderer: EmbedRenderer::Svg,
        ..EmbedOptions::default()
    }
}

#[test]
fn test_save_html_writes_standalone_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("webchart.html");
    Notebook::new(happiness())
        .interactive_matrix()
        .save(&path, &svg_options())
        .unwrap();

    let html = fs::read_to_string(&path).unwrap();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("vega-embed@6"));
    assert!(html.contains(r#""renderer":"svg""#));
    assert!(html.contains(r#""bind":"scales""#));
    assert!(html.contains(r#""repeat":{"#));
    assert!(html.contains("<noscript>"));
    assert!(html.contains("Denmark"));
}

#[test]
fn test_reexport_is_byte_stable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("webchart.html");
    let notebook = Notebook::new(happiness());
    notebook.interactive_matrix().save(&path, &svg_options()).unwrap();
    let first = fs::read(&path).unwrap();
    notebook.interactive_matrix().save(&path, &svg_options()).unwrap();
    assert_eq!(fs::read(&path).unwrap(), first);
}

#[test]
fn test_save_json_is_vega_lite() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chart.json");
    Notebook::new(happiness())
        .side_by_side()
        .save(&path, &EmbedOptions::default())
        .unwrap();

    let doc: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert!(doc["$schema"].as_str().unwrap().contains("vega-lite/v5"));
    assert_eq!(doc["hconcat"].as_array().unwrap().len(), 2);
    assert_eq!(doc["datasets"].as_object().unwrap().len(), 1);
    assert_eq!(doc["config"]["view"]["continuousWidth"], 300);
}

#[test]
fn test_save_svg_is_static_rendering() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bars.svg");
    Notebook::new(happiness())
        .region_bars()
        .save(&path, &EmbedOptions::default())
        .unwrap();
    let svg = fs::read_to_string(&path).unwrap();
    assert!(svg.contains("<svg"));
    assert!(svg.contains("North America"));
}

#[test]
fn test_unwritable_path_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("nested").join("chart.html");
    let err = Notebook::new(happiness())
        .region_bars()
        .save(&path, &EmbedOptions::default())
        .unwrap_err();
    assert!(matches!(err, ExportError::Io { .. }));
}

#[test]
fn test_unknown_extension_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chart.pdf");
    let err = Notebook::new(happiness())
        .region_bars()
        .save(&path, &EmbedOptions::default())
        .unwrap_err();
    assert!(matches!(err, ExportError::UnsupportedFormat(ext) if ext == "pdf"));
    assert!(!path.exists());
}

#[test]
fn test_invalid_chart_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.html");
    let chart = Chart::new(happiness())
        .mark_circle()
        .encode(Encoding::new().x("Trust").y("Happiness Score"));
    let err = ChartSpec::from(chart)
        .save(&path, &EmbedOptions::default())
        .unwrap_err();
    assert!(matches!(err, ExportError::Render(RenderError::UnknownField { .. })));
    assert!(!path.exists());
}

fn assert_save_fails(spec: ChartSpec, file: &str, options: &EmbedOptions) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(file);
    let err = spec.save(&path, options).unwrap_err();
    assert!(matches!(err, ExportError::Render(_)), "unexpected error: {}", err);
    assert!(!path.exists());
}

#[test]
fn test_json_save_checks_typed_fields() {
    let chart = Chart::new(happiness())
        .mark_circle()
        .encode(Encoding::new().x("Trust:Q").y("Happiness Score"));
    assert_save_fails(chart.into(), "chart.json", &EmbedOptions::default());
}

#[test]
fn test_json_save_checks_fold_and_scheme() {
    let folded = Chart::new(happiness())
        .transform_fold(["Family", "Trust"])
        .mark_line()
        .encode(Encoding::new().x("key:N").y("value:Q"));
    assert_save_fails(folded.into(), "fold.json", &EmbedOptions::default());

    let scheme = Chart::new(happiness())
        .mark_circle()
        .encode(Encoding::new().color(field("Region").scale(Scale::scheme("nope"))));
    assert_save_fails(scheme.into(), "scheme.json", &EmbedOptions::default());
}

#[test]
fn test_json_save_checks_repeat_references() {
    let grid = Chart::new(happiness())
        .mark_circle()
        .encode(
            Encoding::new()
                .x(repeat(RepeatRef::Column).ty(FieldType::Quantitative))
                .y(repeat(RepeatRef::Row).ty(FieldType::Quantitative)),
        )
        .repeat(Vec::<&str>::new(), ["Family"]);
    assert_save_fails(grid.into(), "grid.json", &EmbedOptions::default());
}

#[test]
fn test_html_without_fallback_still_checks_fields() {
    let chart = Chart::new(happiness())
        .mark_circle()
        .encode(Encoding::new().x("Trust:Q").y("Happiness Score"));
    let options = EmbedOptions {
        static_fallback: false,
        ..EmbedOptions::default()
    };
    assert_save_fails(chart.into(), "chart.html", &options);
}

#[test]
fn test_display_writes_into_viewer_dir() {
    let dir = tempfile::tempdir().unwrap();
    let viewer = Viewer::new(dir.path().join("charts"));
    let path = Notebook::new(happiness())
        .health_scatter()
        .display(&viewer)
        .unwrap();
    assert!(path.starts_with(viewer.dir()));
    assert_eq!(path.extension().and_then(|e| e.to_str()), Some("svg"));
    assert!(fs::read_to_string(&path).unwrap().contains("Happiness Score"));
}
