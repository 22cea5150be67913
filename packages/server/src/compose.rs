//! Request-to-response composition that does not touch the network.

use parcel_map_server_models::{
    ApiDataset, ApiLayer, ApiMethod, ApiParcel, ApiPalette, ApiRamp, HighlightRequest,
    StyleRequest, StyleResponse,
};
use parcel_map_catalog::Catalog;
use parcel_map_style::layers::{self, StyleLayer};
use parcel_map_style::{build_style, legend, query, ramp};
use parcel_map_style_models::{BaseTable, QuantificationMethod, StyleMode};

use crate::ApiError;

fn api_layer(layer: &StyleLayer) -> ApiLayer {
    ApiLayer {
        sql: layer.query.clone(),
        css: layer.css(),
    }
}

/// Every palette with all of its ramps.
#[must_use]
pub fn palettes() -> Vec<ApiPalette> {
    ramp::COLOR_RAMPS
        .iter()
        .map(|palette| ApiPalette {
            name: palette.name.to_string(),
            ramps: (ramp::MIN_BIN_COUNT..=ramp::MAX_BIN_COUNT)
                .filter_map(|bin_count| {
                    palette.colors(bin_count).map(|colors| ApiRamp {
                        bin_count,
                        colors: colors.iter().map(ToString::to_string).collect(),
                    })
                })
                .collect(),
        })
        .collect()
}

/// Every quantification method with its title, default first.
#[must_use]
pub fn methods() -> Vec<ApiMethod> {
    QuantificationMethod::all()
        .iter()
        .map(|method| ApiMethod {
            name: *method,
            title: method.title().to_string(),
        })
        .collect()
}

/// Datasets usable in `mode`, each with its usable fields.
#[must_use]
pub fn datasets(catalog: &Catalog, mode: Option<StyleMode>) -> Vec<ApiDataset> {
    catalog
        .available_datasets(mode)
        .into_iter()
        .map(|dataset| {
            ApiDataset::new(
                dataset,
                parcel_map_style::filter::filter_fields(mode, dataset),
            )
        })
        .collect()
}

/// One dataset with its fields usable in `mode`.
///
/// # Errors
///
/// Returns [`ApiError::Catalog`] if the dataset does not exist.
pub fn dataset(
    catalog: &Catalog,
    mode: Option<StyleMode>,
    dataset_id: &str,
) -> Result<ApiDataset, ApiError> {
    let dataset = catalog.get_dataset(dataset_id)?;
    Ok(ApiDataset::new(
        dataset,
        catalog.available_fields(mode, dataset_id)?,
    ))
}

/// The styled layer for a request.
///
/// # Errors
///
/// Returns [`ApiError::Catalog`] for unknown ids or [`ApiError::Style`] if
/// the style cannot be built.
pub fn style_layer(
    catalog: &Catalog,
    base: &BaseTable,
    request: &StyleRequest,
) -> Result<StyleLayer, ApiError> {
    let dataset = catalog.get_dataset(&request.dataset_id)?;
    let field = catalog.get_field(&request.dataset_id, &request.field_id)?;
    Ok(StyleLayer {
        query: query::build_style_query(base, dataset, field)?,
        style: build_style(dataset, field, &request.style, request.render_target)?,
    })
}

/// The query, style, and legend for a request.
///
/// # Errors
///
/// See [`style_layer`].
pub fn style(
    catalog: &Catalog,
    base: &BaseTable,
    request: &StyleRequest,
) -> Result<StyleResponse, ApiError> {
    let layer = style_layer(catalog, base, request)?;
    let legend = legend::project(request.render_target, Some(&request.style), &request.sample)?;
    Ok(StyleResponse {
        sql: layer.query.clone(),
        css: layer.css(),
        legend,
    })
}

/// The "highlight similar items" layer for a request.
///
/// # Errors
///
/// Returns [`ApiError::Catalog`] for unknown ids or [`ApiError::Style`] for
/// malformed descriptors.
pub fn highlight(
    catalog: &Catalog,
    base: &BaseTable,
    request: &HighlightRequest,
) -> Result<ApiLayer, ApiError> {
    let dataset = catalog.get_dataset(&request.dataset_id)?;
    let field = catalog.get_field(&request.dataset_id, &request.field_id)?;
    let layer = layers::similar_items_layer(
        base,
        dataset,
        field,
        &request.value,
        &request.color,
        request.render_target,
    )?;
    Ok(api_layer(&layer))
}

/// The outline layer of every parcel.
#[must_use]
pub fn base_layer(base: &BaseTable) -> ApiLayer {
    api_layer(&layers::base_parcel_layer(base))
}

/// The selection outline for a parcel.
#[must_use]
pub fn selected_parcel(base: &BaseTable, parcel_id: String) -> ApiParcel {
    let layer = layers::selected_parcel_layer(base, &parcel_id);
    ApiParcel {
        parcel_id,
        layer: api_layer(&layer),
    }
}
