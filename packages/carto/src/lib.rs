#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Client for the Carto rendering host.
//!
//! Generated (query, style) pairs are posted to the host's map API, which
//! compiles them into a layer group and answers with an id used to build a
//! tile URL template. Field samples, value extents, and point lookups go
//! through the host's SQL API. Request building and response parsing are
//! plain functions in [`map_config`] and [`sql`]; [`CartoClient`] only
//! performs the exchanges.

pub mod config;
pub mod map_config;
pub mod sql;

use parcel_map_style::layers::{StyleLayer, default_style};
use parcel_map_style::{StyleError, query};
use parcel_map_style_models::{Dataset, Field, FieldValue};
use thiserror::Error;

pub use config::HostConfig;
pub use map_config::{MapConfig, parse_layer_group, tile_url_template};
pub use sql::Extent;

/// Errors that can occur while talking to the rendering host.
#[derive(Debug, Error)]
pub enum CartoError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The host answered with a non-success status.
    #[error("Host responded with status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// The host answered with a structured error body.
    #[error("Host reported errors: {}", errors.join("; "))]
    Service {
        /// Error messages from the host.
        errors: Vec<String>,
    },

    /// A map API response carried no layer-group id.
    #[error("Host response has no layer group id")]
    MissingLayerGroup,

    /// A lookup matched nothing.
    #[error("No {what} found")]
    NotFound {
        /// What was looked up.
        what: String,
    },

    /// Host configuration could not be loaded.
    #[error("Configuration error: {message}")]
    Config {
        /// Description.
        message: String,
    },

    /// The query or style could not be generated.
    #[error(transparent)]
    Style(#[from] StyleError),
}

/// Performs map and SQL API exchanges against one host.
#[derive(Debug, Clone)]
pub struct CartoClient {
    host: HostConfig,
    client: reqwest::Client,
}

impl CartoClient {
    /// Creates a client for `host`.
    #[must_use]
    pub fn new(host: HostConfig) -> Self {
        Self {
            host,
            client: reqwest::Client::new(),
        }
    }

    /// The host this client talks to.
    #[must_use]
    pub const fn host(&self) -> &HostConfig {
        &self.host
    }

    /// Compiles a single-layer map and returns its tile URL template.
    ///
    /// Without a style the host renders [`default_style`].
    ///
    /// # Errors
    ///
    /// Returns [`CartoError::Status`] on a non-success response, or any
    /// error of [`parse_layer_group`].
    pub async fn request_tiles(
        &self,
        query: &str,
        style: Option<&str>,
    ) -> Result<String, CartoError> {
        let style = style.map_or_else(|| default_style().to_string(), ToString::to_string);
        let config = MapConfig::single_layer(&self.host, query, &style);

        log::info!("{}: requesting layer group", self.host.name);
        log::debug!("{}: map config {config:?}", self.host.name);

        let response = self
            .client
            .post(&self.host.map_api_url)
            .json(&config)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            log::warn!("{}: map API returned {status}: {body}", self.host.name);
            return Err(CartoError::Status {
                status: status.as_u16(),
            });
        }

        let id = parse_layer_group(&body)?;
        log::info!("{}: layer group {id}", self.host.name);
        Ok(tile_url_template(&self.host, &id))
    }

    /// Compiles a [`StyleLayer`] and returns its tile URL template.
    ///
    /// # Errors
    ///
    /// See [`Self::request_tiles`].
    pub async fn request_layer(&self, layer: &StyleLayer) -> Result<String, CartoError> {
        self.request_tiles(&layer.query, Some(&layer.css())).await
    }

    /// Runs a query through the SQL API and returns the raw body.
    ///
    /// # Errors
    ///
    /// Returns [`CartoError::Http`] or [`CartoError::Status`].
    pub async fn sql(&self, query: &str) -> Result<String, CartoError> {
        log::debug!("{}: SQL {query}", self.host.name);
        let response = self
            .client
            .get(&self.host.sql_api_url)
            .query(&[("q", query)])
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            log::warn!("{}: SQL API returned {status}: {body}", self.host.name);
            return Err(CartoError::Status {
                status: status.as_u16(),
            });
        }
        Ok(body)
    }

    /// The distinct values of a field, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`CartoError::Style`] for malformed descriptors, or any error
    /// of the exchange.
    pub async fn field_values(
        &self,
        dataset: &Dataset,
        field: &Field,
    ) -> Result<Vec<FieldValue>, CartoError> {
        let body = self
            .sql(&query::distinct_values_query(dataset, field)?)
            .await?;
        let values = sql::parse_field_values(&body, &field.id)?;
        log::info!(
            "{}: {} distinct values for {}.{}",
            self.host.name,
            values.len(),
            dataset.id,
            field.id
        );
        Ok(values)
    }

    /// The smallest and largest value of a numeric field.
    ///
    /// # Errors
    ///
    /// Returns [`CartoError::NotFound`] when the field holds no numbers, or
    /// any error of the exchange.
    pub async fn min_max(&self, dataset: &Dataset, field: &Field) -> Result<Extent, CartoError> {
        let body = self.sql(&query::min_max_query(dataset, field)?).await?;
        sql::parse_extent(&body)
    }

    /// The id of the parcel containing a WGS84 point.
    ///
    /// # Errors
    ///
    /// Returns [`CartoError::NotFound`] when no parcel contains the point,
    /// or any error of the exchange.
    pub async fn parcel_at_point(&self, lat: f64, lng: f64) -> Result<String, CartoError> {
        let base = &self.host.base_table;
        let body = self
            .sql(&query::parcel_at_point_query(base, lng, lat))
            .await?;
        sql::parse_parcel_id(&body, &base.id_field)
    }
}
