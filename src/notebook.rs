//! Notebook Module
//! The World Happiness walkthrough: one method per chart, in presentation order.

use std::sync::Arc;

use crate::charts::{
    field, repeat, value, Chart, ChartSpec, Encoding, FieldType, RepeatChart, RepeatRef, Scale,
    WindowOp,
};
use crate::data::Dataset;

pub const REGION: &str = "Region";
pub const COUNTRY: &str = "Country";
pub const HAPPINESS_SCORE: &str = "Happiness Score";
pub const HAPPINESS_RANK: &str = "Happiness Rank";
pub const HEALTH: &str = "Health (Life Expectancy)";
pub const GENEROSITY: &str = "Generosity";
pub const FAMILY: &str = "Family";
pub const FREEDOM: &str = "Freedom";

/// Dimensions compared by the scatterplot matrix and parallel coordinates.
pub const DIMENSIONS: [&str; 4] = [HEALTH, GENEROSITY, FAMILY, FREEDOM];

/// Charts of the walkthrough, all built over one shared dataset.
pub struct Notebook {
    data: Arc<Dataset>,
}

impl Notebook {
    pub fn new(data: Arc<Dataset>) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &Arc<Dataset> {
        &self.data
    }

    fn chart(&self) -> Chart {
        Chart::new(Arc::clone(&self.data))
    }

    pub fn region_bars(&self) -> Chart {
        self.chart()
            .mark_bar()
            .encode(Encoding::new().x(REGION).y(HAPPINESS_SCORE))
    }

    pub fn health_scatter(&self) -> Chart {
        self.chart()
            .mark_circle()
            .encode(Encoding::new().x(HEALTH).y(HAPPINESS_SCORE))
    }

    pub fn rank_health_line(&self) -> Chart {
        self.chart()
            .mark_line()
            .encode(Encoding::new().x(HAPPINESS_RANK).y(HEALTH))
    }

    pub fn region_colored(&self) -> Chart {
        self.chart()
            .mark_circle()
            .encode(Encoding::new().x(HEALTH).y(HAPPINESS_SCORE).color(REGION))
    }

    fn spectral_encoding() -> Encoding {
        Encoding::new()
            .x(HEALTH)
            .y(HAPPINESS_SCORE)
            .color(field(REGION).scale(Scale::scheme("spectral")))
    }

    pub fn spectral(&self) -> Chart {
        self.chart().mark_circle().encode(Self::spectral_encoding())
    }

    pub fn with_tooltip(&self) -> Chart {
        self.chart()
            .mark_circle()
            .encode(Self::spectral_encoding().tooltip([COUNTRY, HAPPINESS_SCORE]))
    }

    pub fn side_by_side(&self) -> ChartSpec {
        let c1 = self
            .chart()
            .mark_circle()
            .encode(Encoding::new().x(HEALTH).y(HAPPINESS_SCORE));
        let c2 = self
            .chart()
            .mark_circle()
            .encode(Encoding::new().x(GENEROSITY).y(HAPPINESS_SCORE));
        c1 | c2
    }

    /// 4x4 scatterplot matrix colored by happiness.
    pub fn scatter_matrix(&self) -> RepeatChart {
        self.chart()
            .mark_circle()
            .encode(
                Encoding::new()
                    .x(repeat(RepeatRef::Column).ty(FieldType::Quantitative))
                    .y(repeat(RepeatRef::Row).ty(FieldType::Quantitative))
                    .color(HAPPINESS_SCORE)
                    .tooltip([COUNTRY, HAPPINESS_SCORE]),
            )
            .properties(125, 125)
            .repeat(DIMENSIONS, DIMENSIONS)
    }

    /// One line per country across the four dimensions.
    pub fn parallel_coordinates(&self) -> Chart {
        self.chart()
            .transform_window("index", WindowOp::Count)
            .transform_fold(DIMENSIONS)
            .mark_line()
            .encode(
                Encoding::new()
                    .x("key:N")
                    .y("value:Q")
                    .detail("index:N")
                    .opacity(value(0.5))
                    .color(field("Happiness Rank:Q").scale(Scale::scheme("Magma")))
                    .tooltip([COUNTRY]),
            )
            .width(700)
            .interactive()
    }

    /// The matrix with pan/zoom, as saved to the web page.
    pub fn interactive_matrix(&self) -> RepeatChart {
        self.scatter_matrix().interactive()
    }

    pub fn horizontal_bars(&self) -> Chart {
        self.chart()
            .mark_bar()
            .encode(Encoding::new().x(HAPPINESS_SCORE).y(REGION))
    }

    pub fn generosity_sized(&self) -> Chart {
        self.chart().mark_circle().encode(
            Self::spectral_encoding()
                .size(GENEROSITY)
                .tooltip([COUNTRY, HAPPINESS_SCORE]),
        )
    }

    /// Every displayed cell with a short label.
    pub fn cells(&self) -> Vec<(&'static str, ChartSpec)> {
        vec![
            ("region bars", self.region_bars().into()),
            ("health vs happiness", self.health_scatter().into()),
            ("rank vs health", self.rank_health_line().into()),
            ("regional color", self.region_colored().into()),
            ("spectral scheme", self.spectral().into()),
            ("tooltips", self.with_tooltip().into()),
            ("side by side", self.side_by_side()),
            ("scatterplot matrix", self.scatter_matrix().into()),
            ("parallel coordinates", self.parallel_coordinates().into()),
            ("horizontal bars", self.horizontal_bars().into()),
            ("generosity as size", self.generosity_sized().into()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::MarkItem;
    use polars::prelude::*;

    fn notebook() -> Notebook {
        let frame = df!(
            "Country" => ["Denmark", "Switzerland", "Togo"],
            "Region" => ["Western Europe", "Western Europe", "Sub-Saharan Africa"],
            "Happiness Rank" => [1i64, 2, 157],
            "Happiness Score" => [7.526, 7.509, 3.303],
            "Family" => [1.16374, 1.14524, 0.0],
            "Health (Life Expectancy)" => [0.79504, 0.86303, 0.28123],
            "Freedom" => [0.57941, 0.58557, 0.36453],
            "Generosity" => [0.36171, 0.28083, 0.2054],
        )
        .unwrap();
        Notebook::new(Arc::new(Dataset::from_frame(frame).unwrap()))
    }

    #[test]
    fn test_every_cell_renders() {
        let nb = notebook();
        for (label, spec) in nb.cells() {
            assert!(spec.render().is_ok(), "cell '{}' failed to render", label);
            assert!(spec.to_vega_lite().is_ok(), "cell '{}' failed to serialize", label);
        }
    }

    #[test]
    fn test_scatter_matrix_has_sixteen_views() {
        let spec = ChartSpec::from(notebook().scatter_matrix());
        let rendering = spec.render().unwrap();
        assert_eq!(rendering.scene.views.len(), 16);
        assert!(rendering.scene.views.iter().all(|v| v.width == 125.0 && v.height == 125.0));
    }

    #[test]
    fn test_parallel_coordinates_draws_one_line_per_country() {
        let spec = ChartSpec::from(notebook().parallel_coordinates());
        let rendering = spec.render().unwrap();
        let view = &rendering.scene.views[0];
        assert_eq!(view.width, 700.0);
        let lines: Vec<_> = view
            .marks
            .iter()
            .filter_map(|m| match m {
                MarkItem::Line { points, opacity, .. } => Some((points.len(), *opacity)),
                _ => None,
            })
            .collect();
        assert_eq!(lines, [(4, 0.5), (4, 0.5), (4, 0.5)]);
    }

    #[test]
    fn test_parallel_coordinates_vega_lite() {
        let doc = ChartSpec::from(notebook().parallel_coordinates())
            .to_vega_lite()
            .unwrap();
        assert_eq!(doc["transform"][0]["window"][0]["op"], "count");
        assert_eq!(doc["transform"][1]["fold"][0], HEALTH);
        assert_eq!(doc["encoding"]["color"]["scale"]["scheme"], "Magma");
        assert_eq!(doc["encoding"]["opacity"]["value"], 0.5);
        assert!(doc["params"][0]["bind"] == "scales");
    }
}
