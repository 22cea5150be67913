//! Dataset registry: loads every dataset definition from embedded TOML.
//!
//! Each `.toml` file in `packages/catalog/datasets/` is baked into the
//! binary at compile time via [`include_str!`]. Adding a dataset means
//! creating a TOML file and adding it to the list below.

use parcel_map_style_models::{CartoConnection, Dataset, Field};
use serde::Deserialize;

/// TOML configs embedded at compile time.
const DATASET_TOMLS: &[(&str, &str)] = &[
    ("assessments", include_str!("../datasets/assessments.toml")),
    (
        "property_sales",
        include_str!("../datasets/property_sales.toml"),
    ),
    ("tax_liens", include_str!("../datasets/tax_liens.toml")),
];

/// Total number of configured datasets (used in tests).
#[cfg(test)]
const EXPECTED_DATASET_COUNT: usize = 3;

/// Host location section of a dataset TOML.
#[derive(Debug, Clone, Deserialize)]
struct CartoDefinition {
    account: String,
    table: String,
    #[serde(default)]
    map_id: Option<String>,
    carto_css_id: String,
    #[serde(default)]
    row_id_column: Option<String>,
}

/// On-disk shape of a dataset definition.
#[derive(Debug, Clone, Deserialize)]
struct DatasetDefinition {
    id: String,
    name: String,
    parcel_id_field: String,
    carto: CartoDefinition,
    #[serde(default)]
    fields: Vec<Field>,
}

impl From<DatasetDefinition> for Dataset {
    fn from(def: DatasetDefinition) -> Self {
        Self {
            id: def.id,
            name: def.name,
            parcel_id_field: def.parcel_id_field,
            carto_connection: CartoConnection {
                account: def.carto.account,
                table: def.carto.table,
                map_id: def.carto.map_id,
                carto_css_id: def.carto.carto_css_id,
                row_id_column: def
                    .carto
                    .row_id_column
                    .unwrap_or_else(|| "cartodb_id".to_string()),
            },
            fields: def.fields,
        }
    }
}

/// Parses a [`Dataset`] from a TOML string.
///
/// # Errors
///
/// Returns an error if the TOML is malformed or missing required fields.
pub fn parse_dataset_toml(toml_str: &str) -> Result<Dataset, String> {
    toml::de::from_str::<DatasetDefinition>(toml_str)
        .map(Dataset::from)
        .map_err(|e| e.to_string())
}

/// Returns all configured datasets, parsed from embedded TOML.
///
/// # Panics
///
/// Panics if any TOML config is malformed. The configs are embedded, so a
/// parse failure is a development error caught by the tests below.
#[must_use]
pub fn all_datasets() -> Vec<Dataset> {
    DATASET_TOMLS
        .iter()
        .map(|(name, toml)| {
            parse_dataset_toml(toml).unwrap_or_else(|e| panic!("Failed to parse {name}.toml: {e}"))
        })
        .collect()
}
