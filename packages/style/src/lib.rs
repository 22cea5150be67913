#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Query and style-rule generation for parcel map layers.
//!
//! Given a [`Dataset`](parcel_map_style_models::Dataset), one of its fields,
//! and the parameters of a styling mode, this crate deterministically
//! produces the pair the rendering host needs: a SQL query joining the
//! dataset onto the parcel boundaries ([`query`]) and a CartoCSS style
//! sheet ([`builder`], modelled explicitly in [`css`]). [`legend`] projects
//! the same inputs into a legend so the map and its legend never diverge.
//!
//! Everything here is pure: no I/O, no shared state.

pub mod builder;
pub mod classify;
pub mod css;
pub mod filter;
pub mod layers;
pub mod legend;
pub mod query;
pub mod ramp;

mod validate;

pub use builder::{
    build_category_style, build_choropleth_style, build_range_style, build_style,
    parse_quantification_method,
};
pub use css::StyleSheet;
pub use layers::StyleLayer;

use parcel_map_style_models::{FieldType, StyleMode};
use thiserror::Error;

/// Errors raised while generating queries, styles, or legends.
///
/// All of these are deterministic validation failures; none is transient.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StyleError {
    /// A required dataset attribute is missing or malformed.
    #[error("Invalid dataset descriptor '{dataset}': missing or malformed {attribute}")]
    InvalidDatasetDescriptor {
        /// Dataset identifier (may be empty).
        dataset: String,
        /// Name of the offending attribute.
        attribute: &'static str,
    },

    /// A required field attribute is missing or malformed.
    #[error("Invalid field descriptor '{field}': missing or malformed {attribute}")]
    InvalidFieldDescriptor {
        /// Field identifier (may be empty).
        field: String,
        /// Name of the offending attribute.
        attribute: &'static str,
    },

    /// The palette is not registered in the ramp table.
    #[error("Unknown palette: {palette}")]
    UnknownPalette {
        /// Requested palette name.
        palette: String,
    },

    /// The palette has no ramp for the requested number of bins.
    #[error("Palette {palette} has no ramp with {bin_count} bins")]
    UnknownBinCount {
        /// Palette name.
        palette: String,
        /// Requested number of bins.
        bin_count: usize,
    },

    /// The quantification method name is not recognized.
    #[error("Unsupported quantification method '{method}': expected one of quantiles, jenks, equal, headtails")]
    UnsupportedQuantificationMethod {
        /// Requested method name.
        method: String,
    },

    /// A color is neither a named palette color nor a hex value.
    #[error("Invalid color '{color}': expected a named color or #rgb, #rgba, #rrggbb, #rrggbbaa")]
    InvalidColor {
        /// Requested color.
        color: String,
    },

    /// The range bounds are not finite or the lower bound exceeds the upper
    /// bound.
    #[error("Invalid range: [{min}, {max}]")]
    InvalidRange {
        /// Requested lower bound.
        min: f64,
        /// Requested upper bound.
        max: f64,
    },

    /// The field's declared type cannot be styled with the requested mode.
    #[error("Field {field} has type {field_type}, which {mode} styling does not support")]
    IncompatibleFieldType {
        /// Field identifier.
        field: String,
        /// Declared type of the field.
        field_type: FieldType,
        /// Requested mode.
        mode: StyleMode,
    },
}
