//! Legend projection from a style mode state.
//!
//! The legend is derived from the same [`StyleModeState`] the style
//! builders consume, so what is listed always matches what is drawn.

use parcel_map_style_models::{
    ColorMapping, FieldValue, Legend, LegendEntry, RangeStyle, RenderTarget, StyleModeState,
};

use crate::{StyleError, classify, ramp};

/// Projects a legend for a layer drawn on `geo_type`.
///
/// `style` is `None` when no custom style is active, which yields a legend
/// without a style type or color mapping. `sample` is the in-memory set of
/// field values already fetched for the layer. The choropleth min, max, and
/// breaks are computed over that sample only, so they describe the sample
/// rather than the full table.
///
/// # Errors
///
/// Returns [`StyleError::UnknownPalette`] or [`StyleError::UnknownBinCount`]
/// if a choropleth state names a ramp that does not exist.
pub fn project(
    geo_type: RenderTarget,
    style: Option<&StyleModeState>,
    sample: &[FieldValue],
) -> Result<Legend, StyleError> {
    let Some(state) = style else {
        return Ok(Legend {
            geo_type,
            style_type: None,
            color_mapping: None,
        });
    };

    let color_mapping = match state {
        StyleModeState::Category { items } => ColorMapping::Category(
            items
                .iter()
                .map(|item| LegendEntry {
                    value: item.category.clone(),
                    color: item.color.clone(),
                })
                .collect(),
        ),
        StyleModeState::Range(RangeStyle { min, max, color }) => ColorMapping::Range {
            min: *min,
            max: *max,
            color: color.clone(),
        },
        StyleModeState::Choropleth(choropleth) => {
            let colors = ramp::resolve(
                &choropleth.palette,
                choropleth.bin_count,
                choropleth.reverse,
            )?;
            let numbers: Vec<f64> = sample
                .iter()
                .filter_map(FieldValue::as_f64)
                .filter(|v| v.is_finite())
                .collect();
            ColorMapping::Choropleth {
                breaks: classify::class_breaks(choropleth.method, &numbers, colors.len()),
                colors,
                min: numbers.iter().copied().reduce(f64::min),
                max: numbers.iter().copied().reduce(f64::max),
            }
        }
    };

    Ok(Legend {
        geo_type,
        style_type: Some(state.mode()),
        color_mapping: Some(color_mapping),
    })
}

#[cfg(test)]
mod tests {
    use parcel_map_style_models::{
        CategoryColor, ChoroplethStyle, QuantificationMethod, StyleMode,
    };
    use serde_json::json;

    use super::*;
    use crate::builder::build_category_style;
    use crate::css::{Literal, Predicate};
    use crate::query::tests::{assessments, field};

    #[test]
    fn category_entries_follow_style_order() {
        let items = vec![
            CategoryColor::new("RESIDENTIAL", "red"),
            CategoryColor::new("COMMERCIAL", "blue"),
            CategoryColor::new("INDUSTRIAL", "teal"),
        ];
        let state = StyleModeState::Category {
            items: items.clone(),
        };

        let legend = project(RenderTarget::Polygon, Some(&state), &[]).unwrap();
        let Some(ColorMapping::Category(entries)) = legend.color_mapping else {
            panic!("expected category mapping");
        };

        let sheet = build_category_style(
            &assessments(),
            &field("classdesc"),
            &items,
            RenderTarget::Polygon,
        )
        .unwrap();
        let drawn: Vec<String> = sheet
            .rules
            .iter()
            .filter_map(|rule| match &rule.predicate {
                Predicate::Field {
                    value: Literal::Text(value),
                    ..
                } => Some(value.clone()),
                _ => None,
            })
            .collect();
        let listed: Vec<String> = entries.into_iter().map(|e| e.value).collect();
        assert_eq!(drawn, listed);
        assert_eq!(legend.style_type, Some(StyleMode::Category));
    }

    #[test]
    fn range_is_carried_verbatim() {
        let state = StyleModeState::Range(RangeStyle {
            min: 10.0,
            max: 20.0,
            color: "blue".to_string(),
        });
        let legend = project(RenderTarget::Line, Some(&state), &[]).unwrap();
        assert_eq!(
            serde_json::to_value(&legend).unwrap(),
            json!({
                "geoType": "line",
                "styleType": "range",
                "colorMapping": {"min": 10.0, "max": 20.0, "color": "blue"},
            })
        );
    }

    #[test]
    fn choropleth_uses_resolved_ramp_and_sample_extent() {
        let state = StyleModeState::Choropleth(ChoroplethStyle {
            palette: "blue".to_string(),
            bin_count: 3,
            method: QuantificationMethod::Equal,
            reverse: true,
        });
        let sample = [
            FieldValue::from(40.0),
            FieldValue::from("n/a"),
            FieldValue::from(" 10 "),
            FieldValue::from(100.0),
        ];
        let legend = project(RenderTarget::Polygon, Some(&state), &sample).unwrap();
        assert_eq!(
            legend.color_mapping,
            Some(ColorMapping::Choropleth {
                colors: ramp::resolve("blue", 3, true).unwrap(),
                min: Some(10.0),
                max: Some(100.0),
                breaks: vec![40.0, 70.0],
            })
        );
    }

    #[test]
    fn choropleth_without_sample_has_no_extent() {
        let state = StyleModeState::Choropleth(ChoroplethStyle {
            palette: "orange".to_string(),
            bin_count: 5,
            method: QuantificationMethod::Quantiles,
            reverse: false,
        });
        let legend = project(RenderTarget::Polygon, Some(&state), &[]).unwrap();
        let Some(ColorMapping::Choropleth {
            colors,
            min,
            max,
            breaks,
        }) = legend.color_mapping
        else {
            panic!("expected choropleth mapping");
        };
        assert_eq!(colors.len(), 5);
        assert_eq!((min, max), (None, None));
        assert!(breaks.is_empty());
    }

    #[test]
    fn choropleth_with_unknown_palette_fails() {
        let state = StyleModeState::Choropleth(ChoroplethStyle {
            palette: "mauve".to_string(),
            bin_count: 5,
            method: QuantificationMethod::Quantiles,
            reverse: false,
        });
        assert!(matches!(
            project(RenderTarget::Polygon, Some(&state), &[]),
            Err(StyleError::UnknownPalette { .. })
        ));
    }

    #[test]
    fn no_custom_style() {
        let legend = project(RenderTarget::Polygon, None, &[FieldValue::from(1.0)]).unwrap();
        assert_eq!(legend.style_type, None);
        assert_eq!(legend.color_mapping, None);
    }
}
