//! Style-sheet builders, one per styling mode.
//!
//! Each builder scopes its rules under the dataset's
//! [`carto_css_id`](parcel_map_style_models::CartoConnection::carto_css_id)
//! so several styled layers can coexist on one map.

use parcel_map_style_models::{
    CategoryColor, ChoroplethStyle, Dataset, Field, QuantificationMethod, RangeStyle,
    RenderTarget, StyleModeState,
};

use crate::css::{Comparison, Declaration, Literal, Predicate, Property, Ramp, Rule, StyleSheet, Value};
use crate::{StyleError, ramp, validate};

/// Below this zoom level boundary strokes are suppressed.
pub const STROKE_MIN_ZOOM: u8 = 15;

/// Color of parcel boundary strokes.
const BOUNDARY_COLOR: &str = "#000";

/// Boundary width drawn over choropleth fills at high zoom.
const CHOROPLETH_LINE_WIDTH: f64 = 0.5;

/// Line width of the category base rule per target.
const fn category_line_width(target: RenderTarget) -> f64 {
    match target {
        RenderTarget::Polygon => 0.0,
        RenderTarget::Line => 10.0,
    }
}

/// Line width of the range base rule per target.
const fn range_line_width(target: RenderTarget) -> f64 {
    match target {
        RenderTarget::Polygon => 0.0,
        RenderTarget::Line => 3.0,
    }
}

fn low_zoom_stroke_rule() -> Rule {
    Rule::nested(
        Predicate::Zoom {
            op: Comparison::Lt,
            level: STROKE_MIN_ZOOM,
        },
        vec![Declaration::number(Property::LineWidth, 0.0)],
    )
}

/// Parses an optional quantification method name, defaulting to
/// [`QuantificationMethod::Quantiles`].
///
/// # Errors
///
/// Returns [`StyleError::UnsupportedQuantificationMethod`] for an
/// unrecognized name.
pub fn parse_quantification_method(
    method: Option<&str>,
) -> Result<QuantificationMethod, StyleError> {
    method.map_or(Ok(QuantificationMethod::default()), |name| {
        name.parse()
            .map_err(|_| StyleError::UnsupportedQuantificationMethod {
                method: name.to_string(),
            })
    })
}

/// Builds a category style: every feature starts fully transparent, and
/// each `(category, color)` pair adds a rule making features whose `field`
/// equals the category visible in that color.
///
/// Rules are emitted in the order given, so if two pairs share a category
/// the later one wins. Values matching no pair stay invisible.
///
/// # Errors
///
/// Returns [`StyleError::InvalidColor`] if any pair carries an unknown
/// color, or a descriptor error if `dataset` or `field` is malformed.
pub fn build_category_style(
    dataset: &Dataset,
    field: &Field,
    items: &[CategoryColor],
    target: RenderTarget,
) -> Result<StyleSheet, StyleError> {
    validate::dataset(dataset)?;
    validate::field(field)?;
    for item in items {
        validate::color(&item.color)?;
    }

    let sheet = items.iter().fold(
        StyleSheet::new(&dataset.carto_connection.carto_css_id)
            .with(Declaration::number(Property::PolygonOpacity, 0.0))
            .with(Declaration::color(Property::LineColor, BOUNDARY_COLOR))
            .with(Declaration::number(Property::LineOpacity, 0.0))
            .with(Declaration::number(
                Property::LineWidth,
                category_line_width(target),
            )),
        |sheet, item| {
            sheet.with_rule(Rule::nested(
                Predicate::field(
                    &field.id,
                    Comparison::Eq,
                    Literal::Text(item.category.clone()),
                ),
                vec![
                    Declaration::number(Property::opacity_of(target), 1.0),
                    Declaration::color(Property::color_of(target), &item.color),
                ],
            ))
        },
    );

    log::debug!(
        "Category style for {}.{}: {} categories",
        dataset.id,
        field.id,
        items.len()
    );
    Ok(sheet)
}

/// Builds a choropleth style: a single ramp over `field` split into
/// `bin_count` bins by `method` (default `quantiles`), plus thin boundary
/// strokes from zoom [`STROKE_MIN_ZOOM`] up.
///
/// # Errors
///
/// Returns [`StyleError::UnsupportedQuantificationMethod`],
/// [`StyleError::UnknownPalette`], [`StyleError::UnknownBinCount`], or a
/// descriptor error.
pub fn build_choropleth_style(
    dataset: &Dataset,
    field: &Field,
    bin_count: usize,
    palette: &str,
    method: Option<&str>,
    reverse: bool,
) -> Result<StyleSheet, StyleError> {
    let style = ChoroplethStyle {
        palette: palette.to_string(),
        bin_count,
        method: parse_quantification_method(method)?,
        reverse,
    };
    choropleth_sheet(dataset, field, &style)
}

fn choropleth_sheet(
    dataset: &Dataset,
    field: &Field,
    style: &ChoroplethStyle,
) -> Result<StyleSheet, StyleError> {
    validate::dataset(dataset)?;
    validate::field(field)?;
    let colors = ramp::resolve(&style.palette, style.bin_count, style.reverse)?;

    log::debug!(
        "Choropleth style for {}.{}: {} {}({})",
        dataset.id,
        field.id,
        style.palette,
        style.method,
        style.bin_count
    );

    Ok(StyleSheet::new(&dataset.carto_connection.carto_css_id)
        .with(Declaration::number(Property::PolygonOpacity, 1.0))
        .with(Declaration::color(Property::LineColor, BOUNDARY_COLOR))
        .with(Declaration::number(
            Property::LineWidth,
            CHOROPLETH_LINE_WIDTH,
        ))
        .with(Declaration::number(Property::LineOpacity, 1.0))
        .with(Declaration {
            property: Property::PolygonFill,
            value: Value::Ramp(Ramp {
                field: field.id.clone(),
                colors,
                method: style.method,
            }),
        })
        .with_rule(low_zoom_stroke_rule()))
}

/// Builds a range style: features are drawn in `color` only when
/// `min <= field <= max`.
///
/// The base rule is transparent; three rules follow in order:
/// `field <= max` makes the target opaque, then `field < min` and
/// `field > max` make it transparent again. Strokes are suppressed below
/// zoom [`STROKE_MIN_ZOOM`].
///
/// # Errors
///
/// Returns [`StyleError::InvalidRange`] if `min > max` or either bound is
/// not finite, [`StyleError::InvalidColor`] for an unknown color, or a
/// descriptor error.
pub fn build_range_style(
    dataset: &Dataset,
    field: &Field,
    min: f64,
    max: f64,
    color: &str,
    target: RenderTarget,
) -> Result<StyleSheet, StyleError> {
    validate::dataset(dataset)?;
    validate::field(field)?;
    if !min.is_finite() || !max.is_finite() || min > max {
        return Err(StyleError::InvalidRange { min, max });
    }
    validate::color(color)?;

    // The untargeted color property keeps the boundary color.
    let (untargeted, line_opacity) = match target {
        RenderTarget::Polygon => (Property::LineColor, 1.0),
        RenderTarget::Line => (Property::PolygonFill, 0.0),
    };
    let opacity = Property::opacity_of(target);
    let bound = |op, value| Predicate::field(&field.id, op, Literal::Number(value));

    log::debug!(
        "Range style for {}.{}: [{min}, {max}] in {color}",
        dataset.id,
        field.id
    );

    Ok(StyleSheet::new(&dataset.carto_connection.carto_css_id)
        .with(Declaration::color(Property::color_of(target), color))
        .with(Declaration::color(untargeted, BOUNDARY_COLOR))
        .with(Declaration::number(Property::PolygonOpacity, 0.0))
        .with(Declaration::number(
            Property::LineWidth,
            range_line_width(target),
        ))
        .with(Declaration::number(Property::LineOpacity, line_opacity))
        .with_rule(low_zoom_stroke_rule())
        .with_rule(Rule::attached(
            bound(Comparison::Le, max),
            vec![Declaration::number(opacity, 1.0)],
        ))
        .with_rule(Rule::attached(
            bound(Comparison::Lt, min),
            vec![Declaration::number(opacity, 0.0)],
        ))
        .with_rule(Rule::attached(
            bound(Comparison::Gt, max),
            vec![Declaration::number(opacity, 0.0)],
        )))
}

/// Builds the style for a typed mode state.
///
/// Unlike the per-mode builders, this also enforces that the field's
/// declared type suits the mode. Choropleth always colors polygon fills.
///
/// # Errors
///
/// Returns [`StyleError::IncompatibleFieldType`] or any error of the
/// per-mode builder.
pub fn build_style(
    dataset: &Dataset,
    field: &Field,
    state: &StyleModeState,
    target: RenderTarget,
) -> Result<StyleSheet, StyleError> {
    let mode = state.mode();
    if field.field_type != mode.field_type() {
        return Err(StyleError::IncompatibleFieldType {
            field: field.id.clone(),
            field_type: field.field_type,
            mode,
        });
    }

    match state {
        StyleModeState::Category { items } => build_category_style(dataset, field, items, target),
        StyleModeState::Range(RangeStyle { min, max, color }) => {
            build_range_style(dataset, field, *min, *max, color, target)
        }
        StyleModeState::Choropleth(style) => choropleth_sheet(dataset, field, style),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use parcel_map_style_models::{FieldType, FieldValue};

    use super::*;
    use crate::query::tests::{assessments, field};

    fn feature(field: &str, value: impl Into<FieldValue>) -> BTreeMap<String, FieldValue> {
        BTreeMap::from([(field.to_string(), value.into())])
    }

    #[test]
    fn category_style_text() {
        let css = build_category_style(
            &assessments(),
            &field("classdesc"),
            &[
                CategoryColor::new("RESIDENTIAL", "red"),
                CategoryColor::new("COMMERCIAL", "blue"),
            ],
            RenderTarget::Polygon,
        )
        .unwrap()
        .to_string();

        assert_eq!(
            css,
            "#assessments {\n  polygon-opacity: 0;\n  line-color: #000;\n  line-opacity: 0;\n  \
             line-width: 0;\n  \
             [classdesc = \"RESIDENTIAL\"] { polygon-opacity: 1; polygon-fill: red; }\n  \
             [classdesc = \"COMMERCIAL\"] { polygon-opacity: 1; polygon-fill: blue; }\n}"
        );
    }

    #[test]
    fn category_style_is_idempotent() {
        let items = [
            CategoryColor::new("A", "teal"),
            CategoryColor::new("B", "pink"),
        ];
        let build = || {
            build_category_style(&assessments(), &field("classdesc"), &items, RenderTarget::Line)
                .unwrap()
                .to_string()
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn category_line_target_colors_stroke() {
        let sheet = build_category_style(
            &assessments(),
            &field("classdesc"),
            &[CategoryColor::new("A", "teal")],
            RenderTarget::Line,
        )
        .unwrap();
        let css = sheet.to_string();
        assert!(css.contains("line-width: 10;"));
        assert!(css.contains("[classdesc = \"A\"] { line-opacity: 1; line-color: teal; }"));

        let style = sheet.evaluate(&feature("classdesc", "A"), 16);
        assert!(style.is_visible(RenderTarget::Line));
        assert_eq!(style.color(Property::LineColor), Some("teal"));
    }

    #[test]
    fn category_duplicates_last_wins_and_unmatched_is_invisible() {
        let sheet = build_category_style(
            &assessments(),
            &field("classdesc"),
            &[
                CategoryColor::new("A", "red"),
                CategoryColor::new("A", "green"),
            ],
            RenderTarget::Polygon,
        )
        .unwrap();

        let matched = sheet.evaluate(&feature("classdesc", "A"), 16);
        assert_eq!(matched.color(Property::PolygonFill), Some("green"));
        assert!(matched.is_visible(RenderTarget::Polygon));

        let unmatched = sheet.evaluate(&feature("classdesc", "Z"), 16);
        assert!(!unmatched.is_visible(RenderTarget::Polygon));
        assert_eq!(unmatched.number(Property::LineWidth), Some(0.0));
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let sheet = build_range_style(
            &assessments(),
            &field("fairmarkettotal"),
            10.0,
            20.0,
            "blue",
            RenderTarget::Polygon,
        )
        .unwrap();

        for value in [9.0, 21.0] {
            let style = sheet.evaluate(&feature("fairmarkettotal", value), 16);
            assert!(!style.is_visible(RenderTarget::Polygon), "{value} visible");
        }
        for value in [10.0, 15.0, 20.0] {
            let style = sheet.evaluate(&feature("fairmarkettotal", value), 16);
            assert!((style.opacity(RenderTarget::Polygon) - 1.0).abs() < f64::EPSILON);
            assert_eq!(style.color(Property::PolygonFill), Some("blue"));
        }
        assert!(!sheet.evaluate(&BTreeMap::new(), 16).is_visible(RenderTarget::Polygon));
    }

    #[test]
    fn range_style_text_and_zoom() {
        let sheet = build_range_style(
            &assessments(),
            &field("fairmarkettotal"),
            1.5,
            20.0,
            "orange",
            RenderTarget::Line,
        )
        .unwrap();
        let css = sheet.to_string();
        assert!(css.starts_with("#assessments {\n  line-color: orange;\n  polygon-fill: #000;"));
        assert!(css.contains("  [zoom < 15] { line-width: 0; }\n}"));
        assert!(css.ends_with(
            "#assessments[fairmarkettotal <= 20] { line-opacity: 1; }\n\
             #assessments[fairmarkettotal < 1.5] { line-opacity: 0; }\n\
             #assessments[fairmarkettotal > 20] { line-opacity: 0; }"
        ));

        let low = sheet.evaluate(&feature("fairmarkettotal", 5.0), 14);
        assert_eq!(low.number(Property::LineWidth), Some(0.0));
        let high = sheet.evaluate(&feature("fairmarkettotal", 5.0), 15);
        assert_eq!(high.number(Property::LineWidth), Some(3.0));
        assert_eq!(high.color(Property::LineColor), Some("orange"));
        assert!(high.is_visible(RenderTarget::Line));
    }

    #[test]
    fn range_rejects_inverted_bounds() {
        let result = build_range_style(
            &assessments(),
            &field("fairmarkettotal"),
            21.0,
            20.0,
            "blue",
            RenderTarget::Polygon,
        );
        assert_eq!(result, Err(StyleError::InvalidRange { min: 21.0, max: 20.0 }));
        assert!(
            build_range_style(
                &assessments(),
                &field("fairmarkettotal"),
                f64::NAN,
                20.0,
                "blue",
                RenderTarget::Polygon,
            )
            .is_err()
        );
        assert!(
            build_range_style(
                &assessments(),
                &field("fairmarkettotal"),
                5.0,
                5.0,
                "blue",
                RenderTarget::Polygon,
            )
            .is_ok()
        );
        for (min, max) in [
            (f64::NEG_INFINITY, f64::INFINITY),
            (0.0, f64::INFINITY),
            (f64::NEG_INFINITY, 0.0),
        ] {
            assert_eq!(
                build_range_style(
                    &assessments(),
                    &field("fairmarkettotal"),
                    min,
                    max,
                    "blue",
                    RenderTarget::Polygon,
                ),
                Err(StyleError::InvalidRange { min, max })
            );
        }
    }

    #[test]
    fn category_rejects_colors_that_escape_the_rule() {
        let result = build_category_style(
            &assessments(),
            &field("classdesc"),
            &[
                CategoryColor::new("A", "red"),
                CategoryColor::new("B", "red; } #assessments { polygon-opacity: 1"),
            ],
            RenderTarget::Polygon,
        );
        assert_eq!(
            result,
            Err(StyleError::InvalidColor {
                color: "red; } #assessments { polygon-opacity: 1".to_string()
            })
        );

        let sheet = build_category_style(
            &assessments(),
            &field("classdesc"),
            &[CategoryColor::new("A", "#0e66f7")],
            RenderTarget::Line,
        )
        .unwrap();
        assert!(sheet.to_string().contains("line-color: #0e66f7;"));
    }

    #[test]
    fn range_rejects_colors_that_escape_the_rule() {
        for target in [RenderTarget::Polygon, RenderTarget::Line] {
            assert_eq!(
                build_range_style(
                    &assessments(),
                    &field("fairmarkettotal"),
                    10.0,
                    20.0,
                    "blue;} x{",
                    target,
                ),
                Err(StyleError::InvalidColor {
                    color: "blue;} x{".to_string()
                })
            );
        }
    }

    #[test]
    fn choropleth_references_blue_ramp_in_order() {
        let blue = ramp::lookup("blue", 5).unwrap().join(", ");
        let css = build_choropleth_style(
            &assessments(),
            &field("fairmarkettotal"),
            5,
            "blue",
            Some("quantiles"),
            false,
        )
        .unwrap()
        .to_string();
        assert!(css.contains(&format!(
            "polygon-fill: ramp([fairmarkettotal], ({blue}), quantiles(5));"
        )));
        assert!(css.contains("[zoom < 15] { line-width: 0; }"));
        assert!(css.contains("line-width: 0.5;"));

        let reversed: Vec<&str> = ramp::lookup("blue", 5).unwrap().iter().rev().copied().collect();
        let css = build_choropleth_style(
            &assessments(),
            &field("fairmarkettotal"),
            5,
            "blue",
            Some("quantiles"),
            true,
        )
        .unwrap()
        .to_string();
        assert!(css.contains(&format!("({})", reversed.join(", "))));
    }

    #[test]
    fn choropleth_method_defaults_and_errors() {
        let css = build_choropleth_style(
            &assessments(),
            &field("fairmarkettotal"),
            3,
            "orange",
            None,
            false,
        )
        .unwrap()
        .to_string();
        assert!(css.contains("quantiles(3)"));

        let css = build_choropleth_style(
            &assessments(),
            &field("fairmarkettotal"),
            4,
            "black",
            Some("equal-intervals"),
            false,
        )
        .unwrap()
        .to_string();
        assert!(css.contains("equal(4)"));

        assert_eq!(
            build_choropleth_style(
                &assessments(),
                &field("fairmarkettotal"),
                5,
                "blue",
                Some("invalid-method"),
                false,
            ),
            Err(StyleError::UnsupportedQuantificationMethod {
                method: "invalid-method".to_string()
            })
        );
        assert!(matches!(
            build_choropleth_style(&assessments(), &field("fairmarkettotal"), 8, "blue", None, false),
            Err(StyleError::UnknownBinCount { bin_count: 8, .. })
        ));
        assert!(matches!(
            build_choropleth_style(&assessments(), &field("fairmarkettotal"), 5, "mauve", None, false),
            Err(StyleError::UnknownPalette { .. })
        ));
    }

    #[test]
    fn choropleth_ramp_resolves_with_breaks() {
        let sheet = build_choropleth_style(
            &assessments(),
            &field("fairmarkettotal"),
            3,
            "orange",
            None,
            false,
        )
        .unwrap();
        let style = sheet.evaluate(&feature("fairmarkettotal", 50.0), 12);
        let Some(Value::Ramp(ramp)) = style.get(Property::PolygonFill) else {
            panic!("expected a ramp fill");
        };
        assert_eq!(ramp.color_for(50.0, &[10.0, 20.0]), Some("#e34a33"));
        assert_eq!(ramp.color_for(5.0, &[10.0, 20.0]), Some("#fee8c8"));
        assert_eq!(style.number(Property::LineWidth), Some(0.0));
    }

    #[test]
    fn typed_dispatch_checks_field_type() {
        let state = StyleModeState::Range(RangeStyle {
            min: 0.0,
            max: 1.0,
            color: "red".to_string(),
        });
        let category_field = field("classdesc");
        assert_eq!(category_field.field_type, FieldType::Category);
        assert!(matches!(
            build_style(&assessments(), &category_field, &state, RenderTarget::Polygon),
            Err(StyleError::IncompatibleFieldType { .. })
        ));
        let sheet = build_style(
            &assessments(),
            &field("fairmarkettotal"),
            &state,
            RenderTarget::Polygon,
        )
        .unwrap();
        assert_eq!(
            sheet,
            build_range_style(
                &assessments(),
                &field("fairmarkettotal"),
                0.0,
                1.0,
                "red",
                RenderTarget::Polygon
            )
            .unwrap()
        );
    }

    #[test]
    fn malformed_descriptors_fail_without_output() {
        let mut dataset = assessments();
        dataset.carto_connection.carto_css_id = String::new();
        assert!(matches!(
            build_category_style(&dataset, &field("classdesc"), &[], RenderTarget::Polygon),
            Err(StyleError::InvalidDatasetDescriptor {
                attribute: "carto_css_id",
                ..
            })
        ));
    }
}
