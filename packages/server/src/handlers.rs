//! HTTP handler functions for the parcel map API.

use actix_web::{HttpResponse, web};
use parcel_map_server_models::{
    ApiHealth, HighlightRequest, ModeParams, PointParams, StyleRequest, TilesResponse,
};

use crate::{ApiError, AppState, compose};

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/palettes`
pub async fn palettes() -> HttpResponse {
    HttpResponse::Ok().json(compose::palettes())
}

/// `GET /api/methods`
pub async fn methods() -> HttpResponse {
    HttpResponse::Ok().json(compose::methods())
}

/// `GET /api/datasets?mode=`
///
/// Lists datasets with at least one field the mode can style.
pub async fn datasets(state: web::Data<AppState>, params: web::Query<ModeParams>) -> HttpResponse {
    HttpResponse::Ok().json(compose::datasets(&state.catalog, params.mode))
}

/// `GET /api/datasets/{id}/fields?mode=`
pub async fn fields(
    state: web::Data<AppState>,
    path: web::Path<String>,
    params: web::Query<ModeParams>,
) -> Result<HttpResponse, ApiError> {
    let dataset = compose::dataset(&state.catalog, params.mode, &path)?;
    Ok(HttpResponse::Ok().json(dataset.fields))
}

/// `GET /api/datasets/{id}/fields/{field}/values`
///
/// Returns the distinct values of a field, sorted, fetched from the host.
pub async fn field_values(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, ApiError> {
    let (dataset_id, field_id) = path.into_inner();
    let dataset = state.catalog.get_dataset(&dataset_id)?;
    let field = state.catalog.get_field(&dataset_id, &field_id)?;
    let values = state.carto.field_values(dataset, field).await?;
    Ok(HttpResponse::Ok().json(values))
}

/// `GET /api/datasets/{id}/fields/{field}/extent`
///
/// Returns the minimum and maximum of a numeric field, for seeding range
/// bounds.
pub async fn field_extent(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, ApiError> {
    let (dataset_id, field_id) = path.into_inner();
    let dataset = state.catalog.get_dataset(&dataset_id)?;
    let field = state.catalog.get_field(&dataset_id, &field_id)?;
    let extent = state.carto.min_max(dataset, field).await?;
    Ok(HttpResponse::Ok().json(extent))
}

/// `POST /api/style`
///
/// Builds the query, style, and legend for a styled dataset layer.
pub async fn style(
    state: web::Data<AppState>,
    body: web::Json<StyleRequest>,
) -> Result<HttpResponse, ApiError> {
    let base = &state.carto.host().base_table;
    let response = compose::style(&state.catalog, base, &body)?;
    Ok(HttpResponse::Ok().json(response))
}

/// `POST /api/tiles`
///
/// Builds a styled layer and compiles it on the host.
pub async fn tiles(
    state: web::Data<AppState>,
    body: web::Json<StyleRequest>,
) -> Result<HttpResponse, ApiError> {
    let base = &state.carto.host().base_table;
    let layer = compose::style_layer(&state.catalog, base, &body)?;
    let tile_url = state.carto.request_layer(&layer).await?;
    Ok(HttpResponse::Ok().json(TilesResponse { tile_url }))
}

/// `POST /api/highlight`
///
/// Builds the layer highlighting parcels that share a value.
pub async fn highlight(
    state: web::Data<AppState>,
    body: web::Json<HighlightRequest>,
) -> Result<HttpResponse, ApiError> {
    let base = &state.carto.host().base_table;
    let layer = compose::highlight(&state.catalog, base, &body)?;
    Ok(HttpResponse::Ok().json(layer))
}

/// `GET /api/layers/base`
pub async fn base_layer(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(compose::base_layer(&state.carto.host().base_table))
}

/// `GET /api/parcel?lat=&lng=`
///
/// Finds the parcel under a point and returns its selection outline.
pub async fn parcel(
    state: web::Data<AppState>,
    params: web::Query<PointParams>,
) -> Result<HttpResponse, ApiError> {
    let parcel_id = state.carto.parcel_at_point(params.lat, params.lng).await?;
    let base = &state.carto.host().base_table;
    Ok(HttpResponse::Ok().json(compose::selected_parcel(base, parcel_id)))
}
