#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Catalog of datasets that can be joined onto the parcel map.
//!
//! The [`Catalog`] answers the synchronous dataset and field lookups the
//! style builders rely on. Its default contents come from the embedded
//! [`registry`].

pub mod registry;

use std::collections::BTreeMap;

use parcel_map_style::filter;
use parcel_map_style_models::{Dataset, Field, FieldType, StyleMode};
use thiserror::Error;

pub use registry::all_datasets;

/// Errors raised by catalog lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// No dataset has the requested id.
    #[error("Unknown dataset: {dataset}")]
    UnknownDataset {
        /// Requested dataset id.
        dataset: String,
    },

    /// The dataset has no field with the requested id.
    #[error("Dataset {dataset} has no field {field}")]
    UnknownField {
        /// Dataset id.
        dataset: String,
        /// Requested field id.
        field: String,
    },
}

/// Immutable set of datasets keyed by id.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    datasets: BTreeMap<String, Dataset>,
}

impl Catalog {
    /// Builds a catalog from explicit datasets. A later dataset replaces an
    /// earlier one with the same id.
    #[must_use]
    pub fn new(datasets: impl IntoIterator<Item = Dataset>) -> Self {
        let datasets = datasets
            .into_iter()
            .map(|dataset| (dataset.id.clone(), dataset))
            .collect::<BTreeMap<_, _>>();
        log::debug!("Catalog loaded with {} datasets", datasets.len());
        Self { datasets }
    }

    /// Builds a catalog from the embedded dataset registry.
    #[must_use]
    pub fn from_registry() -> Self {
        Self::new(all_datasets())
    }

    /// Looks up a dataset by id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownDataset`] if no dataset has that id.
    pub fn get_dataset(&self, id: &str) -> Result<&Dataset, CatalogError> {
        self.datasets
            .get(id)
            .ok_or_else(|| CatalogError::UnknownDataset {
                dataset: id.to_string(),
            })
    }

    /// Looks up a field of a dataset.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownDataset`] or
    /// [`CatalogError::UnknownField`].
    pub fn get_field(&self, dataset_id: &str, field_id: &str) -> Result<&Field, CatalogError> {
        self.get_dataset(dataset_id)?
            .field(field_id)
            .ok_or_else(|| CatalogError::UnknownField {
                dataset: dataset_id.to_string(),
                field: field_id.to_string(),
            })
    }

    /// All datasets in ascending id order.
    #[must_use]
    pub fn get_datasets(&self) -> Vec<&Dataset> {
        self.datasets.values().collect()
    }

    /// Whether the dataset has any field of `field_type`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownDataset`] if no dataset has that id.
    pub fn accommodates_type(
        &self,
        dataset_id: &str,
        field_type: FieldType,
    ) -> Result<bool, CatalogError> {
        Ok(self.get_dataset(dataset_id)?.accommodates_type(field_type))
    }

    /// Datasets offering at least one field `mode` can style.
    #[must_use]
    pub fn available_datasets(&self, mode: Option<StyleMode>) -> Vec<&Dataset> {
        filter::filter_datasets(mode, self.datasets.values())
    }

    /// Fields of a dataset `mode` can style.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownDataset`] if no dataset has that id.
    pub fn available_fields(
        &self,
        mode: Option<StyleMode>,
        dataset_id: &str,
    ) -> Result<Vec<&Field>, CatalogError> {
        Ok(filter::filter_fields(mode, self.get_dataset(dataset_id)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_lookups() {
        let catalog = Catalog::from_registry();
        let dataset = catalog.get_dataset("assessments").unwrap();
        assert_eq!(dataset.parcel_id_field, "parid");

        let field = catalog.get_field("assessments", "classdesc").unwrap();
        assert_eq!(field.field_type, FieldType::Category);

        assert_eq!(
            catalog.get_dataset("nope"),
            Err(CatalogError::UnknownDataset {
                dataset: "nope".to_string()
            })
        );
        assert_eq!(
            catalog.get_field("assessments", "nope"),
            Err(CatalogError::UnknownField {
                dataset: "assessments".to_string(),
                field: "nope".to_string()
            })
        );
    }

    #[test]
    fn datasets_are_sorted_by_id() {
        let catalog = Catalog::from_registry();
        let ids: Vec<&str> = catalog
            .get_datasets()
            .iter()
            .map(|d| d.id.as_str())
            .collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn numeric_only_dataset_is_hidden_from_category_mode() {
        let catalog = Catalog::from_registry();
        assert_eq!(
            catalog.accommodates_type("tax_liens", FieldType::Category),
            Ok(false)
        );

        let category: Vec<&str> = catalog
            .available_datasets(Some(StyleMode::Category))
            .iter()
            .map(|d| d.id.as_str())
            .collect();
        assert!(!category.contains(&"tax_liens"));
        assert!(category.contains(&"assessments"));

        let choropleth = catalog.available_datasets(Some(StyleMode::Choropleth));
        assert_eq!(choropleth.len(), catalog.get_datasets().len());
    }

    #[test]
    fn available_fields_filter_by_mode() {
        let catalog = Catalog::from_registry();
        let fields = catalog
            .available_fields(Some(StyleMode::Category), "assessments")
            .unwrap();
        let ids: Vec<&str> = fields.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, ["classdesc", "schooldesc", "usedesc"]);
        assert!(catalog.available_fields(None, "missing").is_err());
    }

    #[test]
    fn later_duplicate_replaces_earlier() {
        let mut first = all_datasets().remove(0);
        let mut second = first.clone();
        first.name = "First".to_string();
        second.name = "Second".to_string();
        let catalog = Catalog::new([first, second]);
        assert_eq!(catalog.get_datasets().len(), 1);
        assert_eq!(catalog.get_datasets()[0].name, "Second");
    }
}
