#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the parcel map.
//!
//! Exposes the dataset catalog, the palette table, and style/legend
//! generation to the browser UI, and forwards generated layers to the
//! rendering host to obtain tile URLs.

pub mod compose;
mod handlers;

use actix_cors::Cors;
use actix_web::http::StatusCode;
use actix_web::{App, HttpResponse, HttpServer, ResponseError, middleware, web};
use parcel_map_carto::{CartoClient, CartoError};
use parcel_map_catalog::{Catalog, CatalogError};
use parcel_map_style::StyleError;
use thiserror::Error;

/// Shared application state.
pub struct AppState {
    /// Dataset catalog.
    pub catalog: Catalog,
    /// Rendering host client.
    pub carto: CartoClient,
}

/// Errors a handler can answer with.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Unknown dataset or field.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The requested style could not be built.
    #[error(transparent)]
    Style(#[from] StyleError),

    /// The rendering host failed.
    #[error(transparent)]
    Carto(#[from] CartoError),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Catalog(_) | Self::Carto(CartoError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Style(_) | Self::Carto(CartoError::Style(_)) => StatusCode::BAD_REQUEST,
            Self::Carto(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("{self}");
        } else {
            log::warn!("{self}");
        }
        HttpResponse::build(status).json(serde_json::json!({
            "error": self.to_string()
        }))
    }
}

/// Starts the HTTP server on `BIND_ADDR`:`PORT` (default
/// `127.0.0.1:8080`).
///
/// # Errors
///
/// Returns an error if the server fails to bind or encounters a fatal I/O
/// error.
pub async fn run_server(state: AppState) -> std::io::Result<()> {
    let state = web::Data::new(state);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!(
        "Starting server on {bind_addr}:{port} (host {})",
        state.carto.host().name
    );

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .service(
                web::scope("/api")
                    .route("/health", web::get().to(handlers::health))
                    .route("/palettes", web::get().to(handlers::palettes))
                    .route("/methods", web::get().to(handlers::methods))
                    .route("/datasets", web::get().to(handlers::datasets))
                    .route("/datasets/{id}/fields", web::get().to(handlers::fields))
                    .route(
                        "/datasets/{id}/fields/{field}/values",
                        web::get().to(handlers::field_values),
                    )
                    .route(
                        "/datasets/{id}/fields/{field}/extent",
                        web::get().to(handlers::field_extent),
                    )
                    .route("/style", web::post().to(handlers::style))
                    .route("/tiles", web::post().to(handlers::tiles))
                    .route("/highlight", web::post().to(handlers::highlight))
                    .route("/layers/base", web::get().to(handlers::base_layer))
                    .route("/parcel", web::get().to(handlers::parcel)),
            )
    })
    .bind((bind_addr, port))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_status_codes() {
        let unknown = ApiError::from(CatalogError::UnknownDataset {
            dataset: "x".to_string(),
        });
        assert_eq!(unknown.status_code(), StatusCode::NOT_FOUND);

        let invalid = ApiError::from(StyleError::InvalidRange { min: 2.0, max: 1.0 });
        assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);

        let wrapped = ApiError::from(CartoError::Style(StyleError::UnknownPalette {
            palette: "mauve".to_string(),
        }));
        assert_eq!(wrapped.status_code(), StatusCode::BAD_REQUEST);

        let upstream = ApiError::from(CartoError::Status { status: 500 });
        assert_eq!(upstream.status_code(), StatusCode::BAD_GATEWAY);

        let missing = ApiError::from(CartoError::NotFound {
            what: "parcel".to_string(),
        });
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
    }
}
