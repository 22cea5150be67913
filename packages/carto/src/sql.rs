//! Parsing of SQL API responses.
//!
//! The SQL API answers `{"rows": [...], "fields": {...}}` on success and
//! `{"error": ["..."]}` on failure.

use parcel_map_style_models::FieldValue;
use serde::{Deserialize, Serialize};

use crate::CartoError;

type Row = serde_json::Map<String, serde_json::Value>;

#[derive(Deserialize)]
struct SqlResponse {
    #[serde(default)]
    rows: Vec<Row>,
    #[serde(default)]
    error: Vec<String>,
}

/// Smallest and largest value of a numeric column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    /// Minimum.
    pub min: f64,
    /// Maximum.
    pub max: f64,
}

/// Parses the rows of a SQL API response.
///
/// # Errors
///
/// Returns [`CartoError::Service`] if the body carries errors, or
/// [`CartoError::Json`] if it is not JSON.
pub fn parse_rows(body: &str) -> Result<Vec<Row>, CartoError> {
    let response: SqlResponse = serde_json::from_str(body)?;
    if response.error.is_empty() {
        Ok(response.rows)
    } else {
        Err(CartoError::Service {
            errors: response.error,
        })
    }
}

fn to_field_value(value: &serde_json::Value) -> Option<FieldValue> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::Number(n) => n.as_f64().map(FieldValue::Number),
        serde_json::Value::String(s) => Some(FieldValue::Text(s.clone())),
        other => Some(FieldValue::Text(other.to_string())),
    }
}

/// Collects the non-null values of `column`, sorted with numbers first.
///
/// # Errors
///
/// See [`parse_rows`].
pub fn parse_field_values(body: &str, column: &str) -> Result<Vec<FieldValue>, CartoError> {
    let mut values: Vec<FieldValue> = parse_rows(body)?
        .iter()
        .filter_map(|row| row.get(column).and_then(to_field_value))
        .collect();
    values.sort_by(FieldValue::sort_cmp);
    Ok(values)
}

/// Reads the `min` and `max` columns of the first row.
///
/// # Errors
///
/// Returns [`CartoError::NotFound`] when the table is empty or the column
/// holds no numbers, or any error of [`parse_rows`].
pub fn parse_extent(body: &str) -> Result<Extent, CartoError> {
    let rows = parse_rows(body)?;
    let number = |key: &str| {
        rows.first()
            .and_then(|row| row.get(key))
            .and_then(to_field_value)
            .and_then(|v| v.as_f64())
    };
    match (number("min"), number("max")) {
        (Some(min), Some(max)) => Ok(Extent { min, max }),
        _ => Err(CartoError::NotFound {
            what: "numeric values".to_string(),
        }),
    }
}

/// Reads `column` of the first row as a parcel id.
///
/// # Errors
///
/// Returns [`CartoError::NotFound`] when no row matched, or any error of
/// [`parse_rows`].
pub fn parse_parcel_id(body: &str, column: &str) -> Result<String, CartoError> {
    parse_rows(body)?
        .first()
        .and_then(|row| row.get(column))
        .and_then(to_field_value)
        .map(|v| v.to_string())
        .ok_or_else(|| CartoError::NotFound {
            what: "parcel".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn field_values_sorted_and_nulls_dropped() {
        let body = json!({
            "rows": [
                {"classdesc": "RESIDENTIAL"},
                {"classdesc": null},
                {"classdesc": "COMMERCIAL"},
                {"classdesc": 12},
            ],
            "time": 0.01,
        })
        .to_string();
        assert_eq!(
            parse_field_values(&body, "classdesc").unwrap(),
            vec![
                FieldValue::from(12.0),
                FieldValue::from("COMMERCIAL"),
                FieldValue::from("RESIDENTIAL"),
            ]
        );
    }

    #[test]
    fn extent_from_aggregate_row() {
        let body = json!({"rows": [{"min": 0, "max": 2_500_000.5}]}).to_string();
        assert_eq!(
            parse_extent(&body).unwrap(),
            Extent {
                min: 0.0,
                max: 2_500_000.5
            }
        );

        let empty = json!({"rows": [{"min": null, "max": null}]}).to_string();
        assert!(matches!(
            parse_extent(&empty),
            Err(CartoError::NotFound { .. })
        ));
    }

    #[test]
    fn parcel_id_lookup() {
        let body = json!({"rows": [{"pin": "0028F00194000000"}]}).to_string();
        assert_eq!(parse_parcel_id(&body, "pin").unwrap(), "0028F00194000000");

        let none = json!({"rows": []}).to_string();
        assert!(matches!(
            parse_parcel_id(&none, "pin"),
            Err(CartoError::NotFound { .. })
        ));
    }

    #[test]
    fn sql_errors_are_surfaced() {
        let body = json!({"error": ["relation \"nope\" does not exist"]}).to_string();
        assert!(matches!(
            parse_rows(&body),
            Err(CartoError::Service { .. })
        ));
    }
}
