//! Rendering host configuration.
//!
//! The default host is embedded at compile time. Setting
//! `PARCEL_MAP_HOST_CONFIG` to the path of a TOML file with the same shape
//! replaces it.

use parcel_map_style_models::BaseTable;
use serde::{Deserialize, Serialize};

use crate::CartoError;

/// Environment variable naming a host config file.
pub const HOST_CONFIG_ENV: &str = "PARCEL_MAP_HOST_CONFIG";

const DEFAULT_HOST_TOML: &str = include_str!("../hosts/wprdc.toml");

/// Where the rendering host lives and how to talk to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostConfig {
    /// Label used in log messages.
    pub name: String,
    /// Map API endpoint that compiles layer groups and serves tiles.
    pub map_api_url: String,
    /// SQL API endpoint.
    pub sql_api_url: String,
    /// Map-config format version sent with every layer request.
    pub style_version: String,
    /// Style-language version of the rendered style sheets.
    pub cartocss_version: String,
    /// Layer renderer kind.
    pub renderer: String,
    /// Parcel geometry table every dataset joins onto.
    pub base_table: BaseTable,
}

impl HostConfig {
    /// Parses a host config from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`CartoError::Config`] if the TOML is malformed or missing
    /// required keys.
    pub fn from_toml(toml_str: &str) -> Result<Self, CartoError> {
        toml::de::from_str(toml_str).map_err(|e| CartoError::Config {
            message: e.to_string(),
        })
    }

    /// The embedded default host.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is malformed, which the tests rule out.
    #[must_use]
    pub fn embedded() -> Self {
        Self::from_toml(DEFAULT_HOST_TOML)
            .unwrap_or_else(|e| panic!("Failed to parse embedded host config: {e}"))
    }

    /// Loads the host named by [`HOST_CONFIG_ENV`], or the embedded default
    /// when the variable is unset.
    ///
    /// # Errors
    ///
    /// Returns [`CartoError::Config`] if the file cannot be read or parsed.
    pub fn load() -> Result<Self, CartoError> {
        let Ok(path) = std::env::var(HOST_CONFIG_ENV) else {
            return Ok(Self::embedded());
        };
        log::info!("Loading host config from {path}");
        let contents = std::fs::read_to_string(&path).map_err(|e| CartoError::Config {
            message: format!("{path}: {e}"),
        })?;
        Self::from_toml(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_host_matches_default_base_table() {
        let host = HostConfig::embedded();
        assert_eq!(host.name, "wprdc");
        assert_eq!(host.style_version, "1.3.1");
        assert_eq!(host.cartocss_version, "2.1.1");
        assert_eq!(host.renderer, "cartodb");
        assert_eq!(host.base_table, BaseTable::default());
    }

    #[test]
    fn missing_keys_are_config_errors() {
        let err = HostConfig::from_toml("name = \"partial\"").unwrap_err();
        assert!(matches!(err, CartoError::Config { .. }), "{err}");
    }
}
