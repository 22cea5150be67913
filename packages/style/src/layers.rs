//! Ready-made (query, style) pairs for the layers every map carries.

use parcel_map_style_models::{BaseTable, CategoryColor, Dataset, Field, FieldValue, RenderTarget};

use crate::css::{Comparison, Declaration, Predicate, Property, Rule, StyleSheet};
use crate::{StyleError, build_category_style, query};

/// Selector used for layers that are not tied to a dataset.
pub const DEFAULT_SELECTOR: &str = "layer";

/// Outline and fill color of the selected parcel.
const SELECTION_COLOR: &str = "#0e66f7";

/// A query and the style sheet to render it with.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleLayer {
    /// SQL selecting the features to draw.
    pub query: String,
    /// Style applied to those features.
    pub style: StyleSheet,
}

impl StyleLayer {
    /// The rendered CartoCSS text of [`Self::style`].
    #[must_use]
    pub fn css(&self) -> String {
        self.style.to_string()
    }
}

/// Style the host applies when a layer is requested without one.
#[must_use]
pub fn default_style() -> StyleSheet {
    StyleSheet::new(DEFAULT_SELECTOR)
        .with(Declaration::color(Property::PolygonFill, "#FFF"))
        .with(Declaration::number(Property::PolygonOpacity, 0.2))
        .with(Declaration::color(Property::LineColor, "#000"))
        .with(Declaration::number(Property::LineOpacity, 1.0))
}

fn zoom_rule(op: Comparison, level: u8, declarations: Vec<Declaration>) -> Rule {
    Rule::nested(Predicate::Zoom { op, level }, declarations)
}

/// All parcel outlines, hidden until zoom 15 and thicker from zoom 17.
#[must_use]
pub fn base_parcel_layer(base: &BaseTable) -> StyleLayer {
    let selector = base
        .table
        .rsplit_once('.')
        .map_or(base.table.as_str(), |(_, name)| name);

    StyleLayer {
        query: format!("SELECT * FROM {}", base.table),
        style: StyleSheet::new(selector)
            .with(Declaration::color(Property::PolygonFill, "#FFFFFF"))
            .with(Declaration::number(Property::PolygonOpacity, 0.0))
            .with(Declaration::color(Property::LineColor, "#4d4d4d"))
            .with(Declaration::number(Property::LineOpacity, 0.0))
            .with_rule(zoom_rule(
                Comparison::Ge,
                15,
                vec![
                    Declaration::number(Property::LineOpacity, 0.8),
                    Declaration::number(Property::LineWidth, 0.5),
                ],
            ))
            .with_rule(zoom_rule(
                Comparison::Ge,
                17,
                vec![
                    Declaration::number(Property::LineOpacity, 0.8),
                    Declaration::number(Property::LineWidth, 1.0),
                ],
            )),
    }
}

/// The clicked parcel, filled and outlined in the selection color.
#[must_use]
pub fn selected_parcel_layer(base: &BaseTable, parcel_id: &str) -> StyleLayer {
    StyleLayer {
        query: query::single_shape_query(base, parcel_id),
        style: StyleSheet::new(DEFAULT_SELECTOR)
            .with(Declaration::color(Property::LineColor, SELECTION_COLOR))
            .with(Declaration::color(Property::PolygonFill, SELECTION_COLOR))
            .with(Declaration::number(Property::PolygonOpacity, 0.4))
            .with_rule(zoom_rule(
                Comparison::Lt,
                16,
                vec![Declaration::number(Property::LineWidth, 2.0)],
            ))
            .with_rule(zoom_rule(
                Comparison::Ge,
                16,
                vec![Declaration::number(Property::LineWidth, 4.0)],
            )),
    }
}

/// Highlights every parcel whose `field` equals `value`.
///
/// This is a one-entry category style, so it accepts fields of either type.
///
/// # Errors
///
/// Returns [`StyleError::InvalidColor`] for an unknown color, or a
/// descriptor error if `dataset` or `field` is malformed.
pub fn similar_items_layer(
    base: &BaseTable,
    dataset: &Dataset,
    field: &Field,
    value: &FieldValue,
    color: &str,
    target: RenderTarget,
) -> Result<StyleLayer, StyleError> {
    let items = [CategoryColor::new(value.to_string(), color)];
    Ok(StyleLayer {
        query: query::build_style_query(base, dataset, field)?,
        style: build_category_style(dataset, field, &items, target)?,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::query::tests::{assessments, field};

    #[test]
    fn default_style_text() {
        assert_eq!(
            default_style().to_string(),
            "#layer {\n  polygon-fill: #FFF;\n  polygon-opacity: 0.2;\n  line-color: #000;\n  \
             line-opacity: 1;\n}"
        );
    }

    #[test]
    fn base_layer_uses_unqualified_selector() {
        let layer = base_parcel_layer(&BaseTable::default());
        assert_eq!(
            layer.query,
            "SELECT * FROM wprdc.allegheny_county_parcel_boundaries"
        );
        assert!(layer.css().starts_with("#allegheny_county_parcel_boundaries {"));

        let style = &layer.style;
        let at = |zoom| style.evaluate(&BTreeMap::new(), zoom);
        assert!(!at(14).is_visible(RenderTarget::Line));
        assert_eq!(at(15).number(Property::LineWidth), Some(0.5));
        assert_eq!(at(17).number(Property::LineWidth), Some(1.0));
    }

    #[test]
    fn selected_parcel_widens_at_high_zoom() {
        let layer = selected_parcel_layer(&BaseTable::default(), "0028F00194000000");
        assert!(layer.query.ends_with("WHERE \"pin\" = '0028F00194000000'"));
        let style = &layer.style;
        assert_eq!(
            style.evaluate(&BTreeMap::new(), 15).number(Property::LineWidth),
            Some(2.0)
        );
        assert_eq!(
            style.evaluate(&BTreeMap::new(), 16).number(Property::LineWidth),
            Some(4.0)
        );
    }

    #[test]
    fn similar_items_highlights_matching_values() {
        let layer = similar_items_layer(
            &BaseTable::default(),
            &assessments(),
            &field("fairmarkettotal"),
            &FieldValue::from(125_000.0),
            "pink",
            RenderTarget::Polygon,
        )
        .unwrap();
        assert!(layer.css().contains("[fairmarkettotal = \"125000\"]"));

        let matching = BTreeMap::from([(
            "fairmarkettotal".to_string(),
            FieldValue::from(125_000.0),
        )]);
        let other = BTreeMap::from([("fairmarkettotal".to_string(), FieldValue::from(1.0))]);
        assert!(layer.style.evaluate(&matching, 16).is_visible(RenderTarget::Polygon));
        assert!(!layer.style.evaluate(&other, 16).is_visible(RenderTarget::Polygon));
    }

    #[test]
    fn similar_items_rejects_invalid_color() {
        let result = similar_items_layer(
            &BaseTable::default(),
            &assessments(),
            &field("classdesc"),
            &FieldValue::from("RESIDENTIAL"),
            "pink; } #assessments { polygon-opacity: 1",
            RenderTarget::Polygon,
        );
        assert!(matches!(result, Err(StyleError::InvalidColor { .. })));
    }
}
