//! Per-call descriptor checks.
//!
//! The catalog is trusted to be internally consistent; these checks only
//! guard the attributes each builder interpolates into query or style text.

use parcel_map_style_models::{COLORS, Dataset, Field};

use crate::StyleError;

/// Whether `s` is a bare SQL/CartoCSS identifier (`[A-Za-z_][A-Za-z0-9_]*`).
pub(crate) fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Checks the attributes every builder reads from a dataset.
pub(crate) fn dataset(dataset: &Dataset) -> Result<(), StyleError> {
    let conn = &dataset.carto_connection;
    let invalid = |attribute| StyleError::InvalidDatasetDescriptor {
        dataset: dataset.id.clone(),
        attribute,
    };

    if !is_identifier(&dataset.parcel_id_field) {
        return Err(invalid("parcel_id_field"));
    }
    if conn.account.trim().is_empty() {
        return Err(invalid("account"));
    }
    if conn.table.trim().is_empty() {
        return Err(invalid("table"));
    }
    if !is_identifier(&conn.carto_css_id) {
        return Err(invalid("carto_css_id"));
    }
    if !is_identifier(&conn.row_id_column) {
        return Err(invalid("row_id_column"));
    }
    Ok(())
}

/// Checks that a field carries a usable column identifier.
pub(crate) fn field(field: &Field) -> Result<(), StyleError> {
    if is_identifier(&field.id) {
        Ok(())
    } else {
        Err(StyleError::InvalidFieldDescriptor {
            field: field.id.clone(),
            attribute: "id",
        })
    }
}

/// Checks that a color is one of [`COLORS`] or a `#` hex value with 3, 4,
/// 6, or 8 digits.
pub(crate) fn color(color: &str) -> Result<(), StyleError> {
    let named = COLORS.iter().any(|c| c.eq_ignore_ascii_case(color));
    let hex = color.strip_prefix('#').is_some_and(|digits| {
        matches!(digits.len(), 3 | 4 | 6 | 8) && digits.chars().all(|c| c.is_ascii_hexdigit())
    });
    if named || hex {
        Ok(())
    } else {
        Err(StyleError::InvalidColor {
            color: color.to_string(),
        })
    }
}
