//! Vega-Lite Serialization Module
//! Converts chart specifications into Vega-Lite v5 JSON documents.

use serde_json::{json, Map, Value};

use crate::charts::chart::Chart;
use crate::charts::compose::ChartSpec;
use crate::charts::encoding::{Channel, ChannelDef, FieldDef, FieldRef};
use crate::render::RenderError;

pub const SCHEMA_URL: &str = "https://vega.github.io/schema/vega-lite/v5.20.1.json";

/// Default size of continuous views, mirrored by the renderer.
pub const CONTINUOUS_SIZE: u32 = 300;

/// Writes one document. Holds the selection-parameter counter so names are
/// unique within the document and stable across runs.
struct VegaLiteWriter {
    next_param: usize,
    datasets: Map<String, Value>,
    shared_data: Option<String>,
}

impl ChartSpec {
    /// Serialize to a standalone Vega-Lite document with inlined datasets.
    pub fn to_vega_lite(&self) -> Result<Value, RenderError> {
        self.validate()?;
        let units = self.unit_charts();
        let mut names: Vec<&str> = units.iter().map(|c| c.data().name()).collect();
        names.sort_unstable();
        names.dedup();

        let mut writer = VegaLiteWriter {
            next_param: 1,
            datasets: Map::new(),
            shared_data: (names.len() == 1).then(|| names[0].to_string()),
        };
        for chart in &units {
            let data = chart.data();
            if !writer.datasets.contains_key(data.name()) {
                writer
                    .datasets
                    .insert(data.name().to_string(), Value::from(data.records().to_vec()));
            }
        }

        let body = writer.write_spec(self)?;
        let Value::Object(mut doc) = body else {
            return Err(RenderError::Serialize("top-level spec is not an object".into()));
        };
        doc.insert("$schema".into(), json!(SCHEMA_URL));
        doc.insert(
            "config".into(),
            json!({"view": {"continuousWidth": CONTINUOUS_SIZE, "continuousHeight": CONTINUOUS_SIZE}}),
        );
        if let Some(name) = &writer.shared_data {
            doc.insert("data".into(), json!({"name": name}));
        }
        doc.insert("datasets".into(), Value::Object(writer.datasets));
        Ok(Value::Object(doc))
    }

    /// Pretty-printed Vega-Lite JSON.
    pub fn to_json_string(&self) -> Result<String, RenderError> {
        let doc = self.to_vega_lite()?;
        serde_json::to_string_pretty(&doc).map_err(|e| RenderError::Serialize(e.to_string()))
    }
}

impl VegaLiteWriter {
    fn write_spec(&mut self, spec: &ChartSpec) -> Result<Value, RenderError> {
        match spec {
            ChartSpec::Unit(chart) => self.write_unit(chart),
            ChartSpec::Repeat(repeat) => {
                let mut grid = Map::new();
                if !repeat.rows().is_empty() {
                    grid.insert("row".into(), json!(repeat.rows()));
                }
                if !repeat.columns().is_empty() {
                    grid.insert("column".into(), json!(repeat.columns()));
                }
                let mut inner = self.write_unit(repeat.template())?;
                let mut obj = Map::new();
                // Data belongs to the repeat operator, not the templated spec
                if let Some(data) = inner.as_object_mut().and_then(|o| o.remove("data")) {
                    obj.insert("data".into(), data);
                }
                obj.insert("repeat".into(), Value::Object(grid));
                obj.insert("spec".into(), inner);
                Ok(Value::Object(obj))
            }
            ChartSpec::HConcat(specs) => {
                let parts = specs
                    .iter()
                    .map(|s| self.write_spec(s))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(json!({"hconcat": parts}))
            }
            ChartSpec::VConcat(specs) => {
                let parts = specs
                    .iter()
                    .map(|s| self.write_spec(s))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(json!({"vconcat": parts}))
            }
        }
    }

    fn write_unit(&mut self, chart: &Chart) -> Result<Value, RenderError> {
        let mark = chart.mark_def().ok_or(RenderError::MissingMark)?;
        let mut obj = Map::new();

        if self.shared_data.is_none() {
            obj.insert("data".into(), json!({"name": chart.data().name()}));
        }
        obj.insert("mark".into(), mark.to_json());

        let mut encoding = Map::new();
        for (channel, def) in chart.encoding().channels() {
            encoding.insert(channel.as_str().into(), channel_json(chart, channel, def)?);
        }
        if !chart.encoding().tooltip.is_empty() {
            let tooltip = chart
                .encoding()
                .tooltip
                .iter()
                .map(|def| field_json(chart, Channel::Tooltip, def))
                .collect::<Result<Vec<_>, _>>()?;
            encoding.insert("tooltip".into(), Value::Array(tooltip));
        }
        obj.insert("encoding".into(), Value::Object(encoding));

        if !chart.transforms().is_empty() {
            let transforms: Vec<Value> = chart.transforms().iter().map(|t| t.to_json()).collect();
            obj.insert("transform".into(), Value::Array(transforms));
        }
        if let Some(width) = chart.view_width() {
            obj.insert("width".into(), json!(width));
        }
        if let Some(height) = chart.view_height() {
            obj.insert("height".into(), json!(height));
        }
        if let Some(title) = chart.view_title() {
            obj.insert("title".into(), json!(title));
        }
        if chart.is_interactive() {
            let name = format!("param_{}", self.next_param);
            self.next_param += 1;
            obj.insert(
                "params".into(),
                json!([{
                    "name": name,
                    "select": {"type": "interval", "encodings": ["x", "y"]},
                    "bind": "scales"
                }]),
            );
        }
        Ok(Value::Object(obj))
    }
}

fn channel_json(chart: &Chart, channel: Channel, def: &ChannelDef) -> Result<Value, RenderError> {
    match def {
        ChannelDef::Value(v) => Ok(json!({"value": v})),
        ChannelDef::Field(fd) => field_json(chart, channel, fd),
    }
}

fn field_json(chart: &Chart, channel: Channel, def: &FieldDef) -> Result<Value, RenderError> {
    let mut obj = Map::new();
    match &def.field {
        Some(FieldRef::Name(name)) => {
            obj.insert("field".into(), json!(name));
        }
        Some(FieldRef::Repeat(which)) => {
            obj.insert("field".into(), json!({"repeat": which.as_str()}));
        }
        None => {}
    }

    let ty = match chart.field_type(def) {
        Some(ty) => ty,
        None => {
            return Err(match (def.repeat_ref(), def.field_name()) {
                (Some(which), _) => RenderError::UnresolvedType { channel, which },
                (None, Some(name)) => RenderError::UnknownField {
                    context: channel.to_string(),
                    field: name.to_string(),
                },
                (None, None) => RenderError::MissingField(channel),
            })
        }
    };
    obj.insert("type".into(), json!(ty.as_str()));

    if let Some(agg) = def.aggregate {
        obj.insert("aggregate".into(), json!(agg.as_str()));
    }
    if let Some(scale) = def.scale.as_ref().filter(|s| !s.is_empty()) {
        let mut s = Map::new();
        if let Some(scheme) = &scale.scheme {
            s.insert("scheme".into(), json!(scheme));
        }
        if let Some(zero) = scale.zero {
            s.insert("zero".into(), json!(zero));
        }
        obj.insert("scale".into(), Value::Object(s));
    }
    if let Some(title) = &def.title {
        obj.insert("title".into(), json!(title));
    }
    Ok(Value::Object(obj))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::encoding::{repeat, value, Encoding, FieldType, RepeatRef, Scale};
    use crate::charts::encoding::field;
    use crate::charts::transform::WindowOp;
    use crate::data::Dataset;
    use polars::prelude::*;
    use std::sync::Arc;

    fn data() -> Arc<Dataset> {
        let frame = df!(
            "Region" => ["Western Europe", "Sub-Saharan Africa"],
            "Happiness Score" => [7.5, 4.1],
        )
        .unwrap();
        Arc::new(Dataset::from_frame(frame).unwrap())
    }

    #[test]
    fn test_unit_document_shape() {
        let spec: ChartSpec = Chart::new(data())
            .mark_bar()
            .encode(Encoding::new().x("Region").y("Happiness Score"))
            .into();
        let doc = spec.to_vega_lite().unwrap();
        let name = data().name().to_string();

        assert_eq!(doc["$schema"], json!(SCHEMA_URL));
        assert_eq!(doc["mark"], json!({"type": "bar"}));
        assert_eq!(doc["data"], json!({"name": name}));
        assert_eq!(
            doc["encoding"]["x"],
            json!({"field": "Region", "type": "nominal"})
        );
        assert_eq!(
            doc["encoding"]["y"],
            json!({"field": "Happiness Score", "type": "quantitative"})
        );
        assert_eq!(doc["datasets"][name.as_str()].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_scale_value_and_tooltip() {
        let spec: ChartSpec = Chart::new(data())
            .mark_circle()
            .encode(
                Encoding::new()
                    .color(field("Region").scale(Scale::scheme("spectral")))
                    .opacity(value(0.5))
                    .tooltip(["Region", "Happiness Score"]),
            )
            .into();
        let doc = spec.to_vega_lite().unwrap();
        assert_eq!(
            doc["encoding"]["color"],
            json!({"field": "Region", "type": "nominal", "scale": {"scheme": "spectral"}})
        );
        assert_eq!(doc["encoding"]["opacity"], json!({"value": 0.5}));
        assert_eq!(doc["encoding"]["tooltip"][1]["field"], json!("Happiness Score"));
    }

    #[test]
    fn test_repeat_moves_data_to_operator() {
        let spec: ChartSpec = Chart::new(data())
            .mark_circle()
            .encode(Encoding::new().x(repeat(RepeatRef::Column).ty(FieldType::Quantitative)))
            .repeat(["Happiness Score"], ["Happiness Score"])
            .interactive()
            .into();
        let doc = spec.to_vega_lite().unwrap();
        assert_eq!(doc["repeat"]["row"], json!(["Happiness Score"]));
        assert_eq!(
            doc["spec"]["encoding"]["x"],
            json!({"field": {"repeat": "column"}, "type": "quantitative"})
        );
        assert_eq!(doc["spec"]["params"][0]["bind"], json!("scales"));
        assert!(doc["spec"].get("data").is_none());
    }

    #[test]
    fn test_param_names_are_unique_per_document() {
        let a = Chart::new(data()).mark_point().interactive();
        let doc = (a.clone() | a).to_vega_lite().unwrap();
        assert_eq!(doc["hconcat"][0]["params"][0]["name"], json!("param_1"));
        assert_eq!(doc["hconcat"][1]["params"][0]["name"], json!("param_2"));
    }

    #[test]
    fn test_unknown_untyped_field_fails_at_serialization() {
        let spec: ChartSpec = Chart::new(data())
            .mark_point()
            .encode(Encoding::new().x("Trust"))
            .into();
        let err = spec.to_vega_lite().unwrap_err();
        assert!(matches!(err, RenderError::UnknownField { field, .. } if field == "Trust"));
    }

    #[test]
    fn test_untyped_repeat_field_is_rejected() {
        let spec: ChartSpec = Chart::new(data())
            .mark_point()
            .encode(Encoding::new().x(repeat(RepeatRef::Column)))
            .repeat(["Happiness Score"], ["Happiness Score"])
            .into();
        assert!(matches!(
            spec.to_vega_lite(),
            Err(RenderError::UnresolvedType { .. })
        ));
    }

    #[test]
    fn test_window_and_fold_serialize() {
        let spec: ChartSpec = Chart::new(data())
            .transform_window("index", WindowOp::Count)
            .transform_fold(["Happiness Score"])
            .mark_line()
            .encode(Encoding::new().x("key").y("value").detail("index:N"))
            .into();
        let doc = spec.to_vega_lite().unwrap();
        assert_eq!(doc["transform"][1], json!({"fold": ["Happiness Score"]}));
        assert_eq!(doc["encoding"]["x"]["type"], json!("nominal"));
        assert_eq!(doc["encoding"]["detail"]["type"], json!("nominal"));
    }
}
