#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Value types shared by the parcel map styling core.
//!
//! A [`Dataset`] describes a table hosted on the rendering service that can
//! be joined onto the parcel boundary table. A [`StyleModeState`] holds the
//! user's choices for exactly one styling mode, and a [`Legend`] is the
//! display projection of that state. All of these are immutable value
//! objects built fresh for every style computation.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Named colors offered for category and range styling.
pub const COLORS: &[&str] = &[
    "red", "blue", "green", "yellow", "orange", "purple", "pink", "teal", "black", "white", "gray",
];

/// Declared type of a dataset column.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FieldType {
    /// Discrete values, styled one color per value.
    Category,
    /// Continuous numbers, styled by range or choropleth.
    Numeric,
}

/// A column descriptor within a [`Dataset`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    /// Column name in the hosted table.
    pub id: String,
    /// Human-readable label.
    #[serde(default)]
    pub name: String,
    /// Declared column type.
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

fn default_row_id_column() -> String {
    "cartodb_id".to_string()
}

/// Where a dataset lives on the rendering host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartoConnection {
    /// Account that owns the table.
    pub account: String,
    /// Table name within the account.
    pub table: String,
    /// Optional saved-map identifier on the host.
    #[serde(default)]
    pub map_id: Option<String>,
    /// Selector namespace for generated style rules, so layers built from
    /// different datasets never share a selector.
    pub carto_css_id: String,
    /// Per-row identifier column the host adds to every table.
    #[serde(default = "default_row_id_column")]
    pub row_id_column: String,
}

/// A tabular data source that can be joined onto the parcel boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    /// Unique identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Column in this dataset holding the parcel identifier used as the
    /// join key against [`BaseTable::id_field`].
    pub parcel_id_field: String,
    /// Host location and style namespace.
    pub carto_connection: CartoConnection,
    /// Columns available for styling.
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl Dataset {
    /// Whether any field of this dataset has the given type.
    #[must_use]
    pub fn accommodates_type(&self, field_type: FieldType) -> bool {
        self.fields.iter().any(|f| f.field_type == field_type)
    }

    /// Looks up a field by its column identifier.
    #[must_use]
    pub fn field(&self, id: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == id)
    }
}

/// The base geometry table every dataset is joined onto.
///
/// Read from host configuration files, so its keys stay snake_case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseTable {
    /// Fully qualified table reference (e.g. `"wprdc.allegheny_county_parcel_boundaries"`).
    pub table: String,
    /// Parcel identifier column.
    pub id_field: String,
    /// Geometry columns the renderer needs.
    pub geometry_columns: Vec<String>,
}

impl Default for BaseTable {
    fn default() -> Self {
        Self {
            table: "wprdc.allegheny_county_parcel_boundaries".to_string(),
            id_field: "pin".to_string(),
            geometry_columns: vec!["the_geom".to_string(), "the_geom_webmercator".to_string()],
        }
    }
}

/// Styling mode tag.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StyleMode {
    /// One color per category value.
    Category,
    /// A single color for values inside `[min, max]`.
    Range,
    /// A color ramp binned by a quantification method.
    Choropleth,
}

impl StyleMode {
    /// The field type this mode can style.
    #[must_use]
    pub const fn field_type(self) -> FieldType {
        match self {
            Self::Category => FieldType::Category,
            Self::Range | Self::Choropleth => FieldType::Numeric,
        }
    }
}

/// Which geometric primitive a style rule colors.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RenderTarget {
    /// Polygon fill.
    #[default]
    Polygon,
    /// Line stroke.
    Line,
}

/// Binning algorithm for choropleth styling.
///
/// The string form is the name of the host's binning function.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum QuantificationMethod {
    /// Equal-count bins.
    #[default]
    #[serde(rename = "quantiles")]
    #[strum(serialize = "quantiles")]
    Quantiles,
    /// Jenks natural breaks.
    #[serde(rename = "jenks")]
    #[strum(serialize = "jenks")]
    Jenks,
    /// Equal-width bins.
    #[serde(rename = "equal", alias = "equal-intervals", alias = "equal_intervals")]
    #[strum(
        to_string = "equal",
        serialize = "equal-intervals",
        serialize = "equal_intervals"
    )]
    Equal,
    /// Head/tails breaks for heavy-tailed distributions.
    #[serde(rename = "headtails")]
    #[strum(serialize = "headtails")]
    HeadTails,
}

impl QuantificationMethod {
    /// Human-readable title.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Quantiles => "Quantiles",
            Self::Jenks => "Jenks",
            Self::Equal => "Equal Intervals",
            Self::HeadTails => "Head/Tails",
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Quantiles, Self::Jenks, Self::Equal, Self::HeadTails]
    }
}

/// A category value paired with the color it is drawn in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryColor {
    /// Field value as produced by the data source.
    pub category: String,
    /// Color name or hex value.
    pub color: String,
}

impl CategoryColor {
    /// Creates a new pair.
    #[must_use]
    pub fn new(category: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            color: color.into(),
        }
    }
}

/// Range mode parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeStyle {
    /// Lower bound, inclusive.
    pub min: f64,
    /// Upper bound, inclusive.
    pub max: f64,
    /// Color applied to values inside the range.
    pub color: String,
}

/// Choropleth mode parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoroplethStyle {
    /// Color ramp name.
    pub palette: String,
    /// Number of bins (3 through 7).
    pub bin_count: usize,
    /// Binning algorithm.
    #[serde(default)]
    pub method: QuantificationMethod,
    /// Reverse the ramp order.
    #[serde(default)]
    pub reverse: bool,
}

/// The user's choices for the active styling mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum StyleModeState {
    /// Category mode.
    Category {
        /// Ordered (value, color) pairs.
        items: Vec<CategoryColor>,
    },
    /// Range mode.
    Range(RangeStyle),
    /// Choropleth mode.
    Choropleth(ChoroplethStyle),
}

impl StyleModeState {
    /// The tag of the active mode.
    #[must_use]
    pub const fn mode(&self) -> StyleMode {
        match self {
            Self::Category { .. } => StyleMode::Category,
            Self::Range(_) => StyleMode::Range,
            Self::Choropleth(_) => StyleMode::Choropleth,
        }
    }
}

/// A single field value as returned by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Numeric value.
    Number(f64),
    /// Text value.
    Text(String),
}

impl FieldValue {
    /// Returns the value as a number, parsing text when possible.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Total ordering used to sort samples: numbers ascending, then text
    /// ascending.
    #[must_use]
    pub fn sort_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Number(_), Self::Text(_)) => Ordering::Less,
            (Self::Text(_), Self::Number(_)) => Ordering::Greater,
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// One row of a category legend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendEntry {
    /// Category value.
    pub value: String,
    /// Color drawn for that value.
    pub color: String,
}

/// Mode-specific value-to-color description shown in a legend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorMapping {
    /// Category entries in style order.
    Category(Vec<LegendEntry>),
    /// The range bounds and color.
    Range {
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
        /// Color inside the range.
        color: String,
    },
    /// The resolved ramp and sample statistics.
    Choropleth {
        /// Ramp colors after the reverse flag was applied.
        colors: Vec<String>,
        /// Smallest numeric value in the sample, if any.
        min: Option<f64>,
        /// Largest numeric value in the sample, if any.
        max: Option<f64>,
        /// Interior class breaks computed from the sample.
        breaks: Vec<f64>,
    },
}

/// Display projection of a layer's style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Legend {
    /// Geometry the layer is drawn on.
    pub geo_type: RenderTarget,
    /// Active mode, or `None` for default rendering.
    pub style_type: Option<StyleMode>,
    /// Value-to-color description, or `None` for default rendering.
    pub color_mapping: Option<ColorMapping>,
}
