//! Data checks shared by every output path.
//!
//! Static rendering and Vega-Lite serialization both run these before
//! producing anything, so an invalid chart never reaches a file.

use super::color::lookup_scheme;
use super::RenderError;
use crate::charts::{Aggregate, Channel, ChannelDef, Chart, ChartSpec};

impl ChartSpec {
    /// Check every unit chart and every repeat cell against its data.
    pub fn validate(&self) -> Result<(), RenderError> {
        match self {
            ChartSpec::Unit(chart) => check_unit(chart),
            ChartSpec::Repeat(repeat) => repeat
                .cells()?
                .iter()
                .try_for_each(|cell| check_unit(&cell.chart)),
            ChartSpec::HConcat(specs) | ChartSpec::VConcat(specs) => {
                specs.iter().try_for_each(ChartSpec::validate)
            }
        }
    }
}

/// Mark present, transforms applied in order to known fields, every encoded
/// field visible after the transforms, repeat references resolved and color
/// schemes known.
pub(crate) fn check_unit(chart: &Chart) -> Result<(), RenderError> {
    chart.mark_def().ok_or(RenderError::MissingMark)?;

    let mut fields: Vec<String> = chart.data().column_names().to_vec();
    for transform in chart.transforms() {
        transform.validate(&fields)?;
        transform.output_fields(&mut fields);
    }

    for (channel, def) in chart.encoding().field_defs() {
        if let Some(which) = def.repeat_ref() {
            return Err(RenderError::UnresolvedRepeat { channel, which });
        }
        match def.field_name() {
            Some(name) if !fields.iter().any(|f| f == name) => {
                return Err(RenderError::UnknownField {
                    context: channel.to_string(),
                    field: name.to_string(),
                })
            }
            None if def.aggregate != Some(Aggregate::Count) => {
                return Err(RenderError::MissingField(channel))
            }
            _ => {}
        }
    }

    if let Some(ChannelDef::Field(def)) = chart.encoding().get(Channel::Color) {
        if let Some(scheme) = def.scale.as_ref().and_then(|s| s.scheme.as_deref()) {
            lookup_scheme(scheme).ok_or_else(|| RenderError::UnknownScheme(scheme.to_string()))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::{field, repeat, Encoding, FieldType, RepeatRef, Scale};
    use crate::data::Dataset;
    use polars::prelude::*;
    use std::sync::Arc;

    fn data() -> Arc<Dataset> {
        let frame = df!(
            "Region" => ["Western Europe", "Sub-Saharan Africa"],
            "Family" => [1.1, 0.6],
        )
        .unwrap();
        Arc::new(Dataset::from_frame(frame).unwrap())
    }

    #[test]
    fn test_typed_unknown_field_is_rejected() {
        let spec: ChartSpec = Chart::new(data())
            .mark_point()
            .encode(Encoding::new().x("Trust:Q"))
            .into();
        assert!(matches!(
            spec.validate(),
            Err(RenderError::UnknownField { field, .. }) if field == "Trust"
        ));
    }

    #[test]
    fn test_fold_input_is_checked() {
        let spec: ChartSpec = Chart::new(data())
            .transform_fold(["Family", "Trust"])
            .mark_line()
            .encode(Encoding::new().x("key:N").y("value:Q"))
            .into();
        assert!(matches!(
            spec.validate(),
            Err(RenderError::UnknownField { field, .. }) if field == "Trust"
        ));
    }

    #[test]
    fn test_unknown_scheme_is_rejected() {
        let spec: ChartSpec = Chart::new(data())
            .mark_point()
            .encode(Encoding::new().color(field("Region").scale(Scale::scheme("nope"))))
            .into();
        assert!(matches!(
            spec.validate(),
            Err(RenderError::UnknownScheme(name)) if name == "nope"
        ));
    }

    #[test]
    fn test_repeat_cells_are_checked() {
        let template = Chart::new(data()).mark_point().encode(
            Encoding::new()
                .x(repeat(RepeatRef::Column).ty(FieldType::Quantitative))
                .y(repeat(RepeatRef::Row).ty(FieldType::Quantitative)),
        );
        let missing_rows: ChartSpec = template
            .clone()
            .repeat(Vec::<&str>::new(), ["Family"])
            .into();
        assert!(matches!(
            missing_rows.validate(),
            Err(RenderError::UnresolvedRepeat { which: RepeatRef::Row, .. })
        ));

        let empty: ChartSpec = template
            .clone()
            .repeat(Vec::<&str>::new(), Vec::<&str>::new())
            .into();
        assert!(matches!(empty.validate(), Err(RenderError::EmptyRepeat)));

        let bad_cell: ChartSpec = template.repeat(["Family"], ["Family", "Trust"]).into();
        assert!(matches!(
            bad_cell.validate(),
            Err(RenderError::UnknownField { field, .. }) if field == "Trust"
        ));
    }

    #[test]
    fn test_valid_concat_passes() {
        let a = Chart::new(data())
            .mark_bar()
            .encode(Encoding::new().x("Region").y("Family"));
        assert!((a.clone() | a).validate().is_ok());
    }
}
