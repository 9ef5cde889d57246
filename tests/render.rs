//! Rendering: bar heights, composition layout, repeat grids and deferred validation.

mod common;

use chartify_grammar::charts::Transform;
use chartify_grammar::render::{MarkItem, ViewScene};
use chartify_grammar::{
    field, repeat, Chart, ChartSpec, Encoding, FieldType, RenderError, RepeatRef, Scale,
};
use common::{happiness, region_scores};
use serde_json::json;
use std::sync::Arc;

fn bars(view: &ViewScene) -> Vec<(f64, f64, f64, f64)> {
    view.marks
        .iter()
        .filter_map(|m| match m {
            MarkItem::Rect {
                x,
                y,
                width,
                height,
                ..
            } => Some((*x, *y, *width, *height)),
            _ => None,
        })
        .collect()
}

#[test]
fn test_region_bars_have_value_heights() {
    let spec = ChartSpec::from(
        Chart::new(region_scores())
            .mark_bar()
            .encode(Encoding::new().x("Region").y("Happiness Score")),
    );
    let rendering = spec.render().unwrap();
    let view = &rendering.scene.views[0];
    let bars = bars(view);
    assert_eq!(bars.len(), 2);

    // Niced domain is [0, 8] over 300px
    let px_per_unit = view.height / 8.0;
    assert!((bars[0].3 - 7.5 * px_per_unit).abs() < 1e-6);
    assert!((bars[1].3 - 4.1 * px_per_unit).abs() < 1e-6);
    // Both bars stand on the baseline
    assert!((bars[0].1 + bars[0].3 - view.height).abs() < 1e-6);
    assert!((bars[1].1 + bars[1].3 - view.height).abs() < 1e-6);

    let x_axis = view.x_axis.as_ref().unwrap();
    let labels: Vec<&str> = x_axis.ticks.iter().map(|t| t.label.as_str()).collect();
    assert_eq!(labels, ["Sub-Saharan Africa", "Western Europe"]);
    assert!(rendering.svg.contains("Western Europe"));
}

#[test]
fn test_same_encoding_renders_identically() {
    let data = happiness();
    let build = || {
        ChartSpec::from(
            Chart::new(Arc::clone(&data))
                .mark_circle()
                .encode(Encoding::new().x("Health (Life Expectancy)").y("Happiness Score")),
        )
    };
    let a = build().render().unwrap();
    let b = build().render().unwrap();
    assert_eq!(a.scene, b.scene);
    assert_eq!(a.svg, b.svg);
}

#[test]
fn test_hconcat_places_views_side_by_side() {
    let data = happiness();
    let c1 = Chart::new(Arc::clone(&data))
        .mark_circle()
        .encode(Encoding::new().x("Health (Life Expectancy)").y("Happiness Score"));
    let c2 = Chart::new(Arc::clone(&data))
        .mark_circle()
        .encode(Encoding::new().x("Generosity").y("Happiness Score"));

    let alone = ChartSpec::from(c1.clone()).render().unwrap();
    let both = (c1 | c2).render().unwrap();
    let views = &both.scene.views;
    assert_eq!(views.len(), 2);
    assert_eq!(views[0].y, views[1].y);
    assert!(views[1].x > views[0].x + views[0].width);
    assert!(both.scene.width > alone.scene.width);
    assert_eq!(views[0].marks, alone.scene.views[0].marks);
}

#[test]
fn test_concatenation_is_associative() {
    let data = happiness();
    let chart = |x: &str| {
        Chart::new(Arc::clone(&data))
            .mark_point()
            .encode(Encoding::new().x(x).y("Happiness Score"))
    };
    let left = ((chart("Family") | chart("Freedom")) | chart("Generosity")).render().unwrap();
    let right = (chart("Family") | (chart("Freedom") | chart("Generosity"))).render().unwrap();
    assert_eq!(left.scene, right.scene);
    assert_eq!(left.svg, right.svg);
}

#[test]
fn test_vconcat_stacks_views() {
    let data = happiness();
    let top = Chart::new(Arc::clone(&data))
        .mark_bar()
        .encode(Encoding::new().x("Region").y("Happiness Score"));
    let bottom = Chart::new(Arc::clone(&data))
        .mark_bar()
        .encode(Encoding::new().x("Happiness Score").y("Region"));
    let rendering = (top & bottom).render().unwrap();
    let views = &rendering.scene.views;
    assert_eq!(views.len(), 2);
    assert!(views[1].y > views[0].y + views[0].height);
}

#[test]
fn test_repeat_yields_row_by_column_cells() {
    let rows = ["Health (Life Expectancy)", "Generosity"];
    let columns = ["Family", "Freedom", "Generosity"];
    let spec = ChartSpec::from(
        Chart::new(happiness())
            .mark_circle()
            .encode(
                Encoding::new()
                    .x(repeat(RepeatRef::Column).ty(FieldType::Quantitative))
                    .y(repeat(RepeatRef::Row).ty(FieldType::Quantitative)),
            )
            .properties(125, 125)
            .repeat(rows, columns),
    );
    let rendering = spec.render().unwrap();
    let views = &rendering.scene.views;
    assert_eq!(views.len(), rows.len() * columns.len());

    for (i, view) in views.iter().enumerate() {
        let (r, c) = (i / columns.len(), i % columns.len());
        assert_eq!(view.x_axis.as_ref().unwrap().title, columns[c]);
        assert_eq!(view.y_axis.as_ref().unwrap().title, rows[r]);
        assert_eq!(view.marks.len(), 5);
    }
    // Row-major: the second view is to the right of the first, the fourth below it
    assert!(views[1].x > views[0].x);
    assert_eq!(views[1].y, views[0].y);
    assert!(views[3].y > views[0].y + views[0].height);
}

#[test]
fn test_unknown_field_fails_at_render_not_build() {
    let data = happiness();
    let before = data.records().to_vec();

    // Building succeeds
    let chart = Chart::new(Arc::clone(&data))
        .mark_bar()
        .encode(Encoding::new().x("Region").y("Trust"));

    let err = ChartSpec::from(chart.clone()).render().unwrap_err();
    assert!(matches!(&err, RenderError::UnknownField { field, .. } if field == "Trust"));
    assert!(err.to_string().contains("Trust"));

    let err = ChartSpec::from(chart).to_vega_lite().unwrap_err();
    assert!(matches!(err, RenderError::UnknownField { .. }));

    assert_eq!(data.records(), before.as_slice());
    assert_eq!(data.height(), 5);
}

#[test]
fn test_failure_does_not_affect_other_charts() {
    let data = happiness();
    let good = Chart::new(Arc::clone(&data))
        .mark_bar()
        .encode(Encoding::new().x("Region").y("Happiness Score"));
    let bad = good.clone().encode(Encoding::new().x("Region").y("Missing"));

    let first = ChartSpec::from(good.clone()).render().unwrap();
    assert!((good.clone() | bad).render().is_err());
    let again = ChartSpec::from(good).render().unwrap();
    assert_eq!(first.svg, again.svg);
}

#[test]
fn test_unknown_scheme_fails_at_render() {
    let chart = Chart::new(happiness()).mark_circle().encode(
        Encoding::new()
            .x("Generosity")
            .y("Happiness Score")
            .color(field("Region").scale(Scale::scheme("not-a-scheme"))),
    );
    assert!(matches!(
        ChartSpec::from(chart).render(),
        Err(RenderError::UnknownScheme(_))
    ));
}

#[test]
fn test_fold_transform_with_unknown_field_fails() {
    let chart = Chart::new(happiness())
        .transform(Transform::fold(["Family", "Trust"]))
        .mark_line()
        .encode(Encoding::new().x("key:N").y("value:Q"));
    let err = ChartSpec::from(chart).render().unwrap_err();
    assert!(matches!(err, RenderError::UnknownField { field, .. } if field == "Trust"));
}

#[test]
fn test_tooltip_values_are_carried_by_marks() {
    let chart = Chart::new(happiness()).mark_circle().encode(
        Encoding::new()
            .x("Generosity")
            .y("Happiness Score")
            .tooltip(["Country", "Happiness Score"]),
    );
    let rendering = ChartSpec::from(chart).render().unwrap();
    let first = rendering.scene.views[0]
        .marks
        .iter()
        .find_map(|m| match m {
            MarkItem::Symbol { datum, .. } => Some(datum.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(first.y, json!(7.526));
    assert_eq!(
        first.tooltip,
        [
            ("Country".to_string(), "Denmark".to_string()),
            ("Happiness Score".to_string(), "7.526".to_string()),
        ]
    );
}
