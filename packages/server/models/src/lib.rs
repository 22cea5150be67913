#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the parcel map server.
//!
//! These types are serialized to JSON for the REST API. They are kept apart
//! from the styling value objects so the API contract can evolve on its
//! own.

use parcel_map_style_models::{
    Dataset, Field, FieldValue, Legend, QuantificationMethod, RenderTarget, StyleMode,
    StyleModeState,
};
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the server is healthy.
    pub healthy: bool,
    /// Server version.
    pub version: String,
}

/// One ramp of a palette.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRamp {
    /// Number of bins.
    pub bin_count: usize,
    /// Colors, lowest bin first.
    pub colors: Vec<String>,
}

/// A palette with every ramp it defines.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPalette {
    /// Palette name.
    pub name: String,
    /// Ramps in ascending bin count.
    pub ramps: Vec<ApiRamp>,
}

/// A choropleth quantification method.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMethod {
    /// Name accepted in style requests.
    pub name: QuantificationMethod,
    /// Human-readable title.
    pub title: String,
}

/// A dataset with the fields usable in the requested mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDataset {
    /// Dataset id.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Fields, sorted by id.
    pub fields: Vec<Field>,
}

impl ApiDataset {
    /// Builds the API view of a dataset from its already-filtered fields.
    #[must_use]
    pub fn new(dataset: &Dataset, fields: Vec<&Field>) -> Self {
        Self {
            id: dataset.id.clone(),
            name: dataset.name.clone(),
            fields: fields.into_iter().cloned().collect(),
        }
    }
}

/// Query parameters selecting a styling mode.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModeParams {
    /// Mode to filter by; absent keeps everything.
    pub mode: Option<StyleMode>,
}

/// Body of `POST /api/style` and `POST /api/tiles`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleRequest {
    /// Dataset id.
    pub dataset_id: String,
    /// Field id within the dataset.
    pub field_id: String,
    /// Geometry to color; defaults to polygon fill.
    #[serde(default)]
    pub render_target: RenderTarget,
    /// Active mode and its parameters.
    pub style: StyleModeState,
    /// Field values already fetched for the legend.
    #[serde(default)]
    pub sample: Vec<FieldValue>,
}

/// A generated query and style sheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiLayer {
    /// SQL selecting the features.
    pub sql: String,
    /// Style sheet text.
    pub css: String,
}

/// Response of `POST /api/style`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleResponse {
    /// SQL selecting the features.
    pub sql: String,
    /// Style sheet text.
    pub css: String,
    /// Legend matching the style.
    pub legend: Legend,
}

/// Response of `POST /api/tiles`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TilesResponse {
    /// Tile URL template with `{z}`, `{x}`, `{y}` placeholders.
    pub tile_url: String,
}

/// Body of `POST /api/highlight`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightRequest {
    /// Dataset id.
    pub dataset_id: String,
    /// Field id within the dataset.
    pub field_id: String,
    /// Value to highlight.
    pub value: FieldValue,
    /// Highlight color.
    pub color: String,
    /// Geometry to color; defaults to polygon fill.
    #[serde(default)]
    pub render_target: RenderTarget,
}

/// Query parameters of `GET /api/parcel`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PointParams {
    /// Latitude (WGS84).
    pub lat: f64,
    /// Longitude (WGS84).
    pub lng: f64,
}

/// Response of `GET /api/parcel`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiParcel {
    /// Parcel id.
    pub parcel_id: String,
    /// Query and style outlining the parcel.
    pub layer: ApiLayer,
}
