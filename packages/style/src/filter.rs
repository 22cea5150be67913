//! Dataset and field filtering by styling mode.
//!
//! Both filters return results sorted by identifier so UI lists populate
//! the same way on every call.

use parcel_map_style_models::{Dataset, Field, StyleMode};

/// Datasets with at least one field the mode can style, sorted by id.
///
/// `None` keeps every dataset.
#[must_use]
pub fn filter_datasets<'a>(
    mode: Option<StyleMode>,
    datasets: impl IntoIterator<Item = &'a Dataset>,
) -> Vec<&'a Dataset> {
    let mut kept: Vec<&Dataset> = datasets
        .into_iter()
        .filter(|dataset| mode.is_none_or(|m| dataset.accommodates_type(m.field_type())))
        .collect();
    kept.sort_by(|a, b| a.id.cmp(&b.id));
    kept
}

/// Fields of `dataset` the mode can style, sorted by id.
///
/// `None` keeps every field.
#[must_use]
pub fn filter_fields(mode: Option<StyleMode>, dataset: &Dataset) -> Vec<&Field> {
    let mut kept: Vec<&Field> = dataset
        .fields
        .iter()
        .filter(|field| mode.is_none_or(|m| field.field_type == m.field_type()))
        .collect();
    kept.sort_by(|a, b| a.id.cmp(&b.id));
    kept
}
