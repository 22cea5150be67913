//! SQL generation for styled layers and host lookups.
//!
//! [`build_style_query`] selects the minimum columns a styled layer needs:
//! the parcel geometry from the base table plus the dataset's join key and
//! the styled field. The remaining functions build the lookup queries sent
//! to the host's SQL API.

use parcel_map_style_models::{BaseTable, CartoConnection, Dataset, Field};

use crate::{StyleError, validate};

/// Quotes a SQL identifier, doubling embedded quotes.
fn quote_ident(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Quotes a SQL string literal, doubling embedded quotes.
fn quote_literal(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// `"account"."table"` for a dataset.
fn qualified_table(conn: &CartoConnection) -> String {
    format!("{}.{}", quote_ident(&conn.account), quote_ident(&conn.table))
}

/// Builds the query backing a styled dataset layer.
///
/// Every row carries the base-table geometry columns (to render) and the
/// dataset's join key and `field` (to evaluate style predicates). The join
/// condition compares the base table's id column against the dataset's
/// join key.
///
/// # Errors
///
/// Returns [`StyleError::InvalidDatasetDescriptor`] or
/// [`StyleError::InvalidFieldDescriptor`] if a required attribute is
/// missing or malformed.
pub fn build_style_query(
    base: &BaseTable,
    dataset: &Dataset,
    field: &Field,
) -> Result<String, StyleError> {
    validate::dataset(dataset)?;
    validate::field(field)?;
    let conn = &dataset.carto_connection;
    let join_key = &dataset.parcel_id_field;

    let mut columns = vec![format!("ds.{}", conn.row_id_column)];
    columns.extend(base.geometry_columns.iter().map(|c| format!("pb.{c}")));
    columns.push(format!("ds.{}", field.id));
    if field.id != *join_key {
        columns.push(format!("ds.{join_key}"));
    }

    let sql = format!(
        "SELECT {} FROM {} pb JOIN {} ds ON pb.{} = ds.{join_key}",
        columns.join(", "),
        base.table,
        qualified_table(conn),
        base.id_field,
    );
    log::debug!("Style query for {}.{}: {sql}", dataset.id, field.id);
    Ok(sql)
}

/// Builds a query listing the distinct values of `field`.
///
/// # Errors
///
/// Returns a descriptor error if `dataset` or `field` is malformed.
pub fn distinct_values_query(dataset: &Dataset, field: &Field) -> Result<String, StyleError> {
    validate::dataset(dataset)?;
    validate::field(field)?;
    Ok(format!(
        "SELECT DISTINCT({}) FROM {}",
        field.id,
        qualified_table(&dataset.carto_connection)
    ))
}

/// Builds a query returning the minimum and maximum of `field` as `min` and
/// `max`.
///
/// # Errors
///
/// Returns a descriptor error if `dataset` or `field` is malformed.
pub fn min_max_query(dataset: &Dataset, field: &Field) -> Result<String, StyleError> {
    validate::dataset(dataset)?;
    validate::field(field)?;
    Ok(format!(
        "SELECT MIN({0}) as min, MAX({0}) as max FROM {1}",
        field.id,
        qualified_table(&dataset.carto_connection)
    ))
}

/// Builds a query returning the id of the parcel containing a WGS84 point.
#[must_use]
pub fn parcel_at_point_query(base: &BaseTable, lon: f64, lat: f64) -> String {
    format!(
        "SELECT {} FROM {} WHERE ST_Contains(the_geom, ST_SetSRID(ST_Point({lon}, {lat}), 4326))",
        base.id_field, base.table
    )
}

/// Builds a query selecting one parcel's geometry by id.
#[must_use]
pub fn single_shape_query(base: &BaseTable, id: &str) -> String {
    format!(
        "SELECT {0}, {1} FROM {2} WHERE {0} = {3}",
        quote_ident(&base.id_field),
        base.geometry_columns.join(", "),
        base.table,
        quote_literal(id),
    )
}
