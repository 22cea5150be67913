//! Layer-group requests to the host's map API.

use serde::{Deserialize, Serialize};

use crate::CartoError;
use crate::config::HostConfig;

/// Payload asking the host to compile a layer group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapConfig {
    /// Map-config format version.
    pub version: String,
    /// Layers to compile, bottom first.
    pub layers: Vec<MapLayer>,
}

/// One layer of a [`MapConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapLayer {
    /// Renderer kind.
    #[serde(rename = "type")]
    pub kind: String,
    /// Query and style.
    pub options: LayerOptions,
}

/// The query and style of a [`MapLayer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerOptions {
    /// Style-language version.
    pub cartocss_version: String,
    /// Style sheet text.
    pub cartocss: String,
    /// SQL selecting the features.
    pub sql: String,
}

impl MapConfig {
    /// A map config holding a single layer.
    #[must_use]
    pub fn single_layer(host: &HostConfig, query: &str, style: &str) -> Self {
        Self {
            version: host.style_version.clone(),
            layers: vec![MapLayer {
                kind: host.renderer.clone(),
                options: LayerOptions {
                    cartocss_version: host.cartocss_version.clone(),
                    cartocss: style.to_string(),
                    sql: query.to_string(),
                },
            }],
        }
    }
}

#[derive(Deserialize)]
struct LayerGroupResponse {
    #[serde(default)]
    layergroupid: Option<String>,
    #[serde(default)]
    errors: Vec<String>,
}

/// Extracts the layer-group id from a map API response body.
///
/// # Errors
///
/// Returns [`CartoError::Service`] if the body lists errors,
/// [`CartoError::MissingLayerGroup`] if it has no id, or
/// [`CartoError::Json`] if it is not JSON.
pub fn parse_layer_group(body: &str) -> Result<String, CartoError> {
    let response: LayerGroupResponse = serde_json::from_str(body)?;
    if !response.errors.is_empty() {
        return Err(CartoError::Service {
            errors: response.errors,
        });
    }
    response.layergroupid.ok_or(CartoError::MissingLayerGroup)
}

/// Tile URL template for a compiled layer group.
#[must_use]
pub fn tile_url_template(host: &HostConfig, layer_group_id: &str) -> String {
    format!(
        "{}/{layer_group_id}/{{z}}/{{x}}/{{y}}.png",
        host.map_api_url.trim_end_matches('/')
    )
}
