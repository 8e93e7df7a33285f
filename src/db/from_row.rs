//! Row mapping trait and helpers for reducing boilerplate in queries.
//!
//! Every entity is parsed into its typed record here, once, so nothing past
//! the store boundary reads loosely-typed columns.

use rusqlite::{Connection, OptionalExtension, Row, ToSql};

use crate::models::*;

/// Parse a string column into an enum type, converting parse errors to rusqlite errors.
///
/// Corrupt enum values surface as an error instead of a panic.
fn parse_enum<T: std::str::FromStr>(row: &Row, col: usize, col_name: &str) -> rusqlite::Result<T> {
    row.get::<_, String>(col)?.parse::<T>().map_err(|_| {
        rusqlite::Error::InvalidColumnType(col, col_name.to_string(), rusqlite::types::Type::Text)
    })
}

/// Trait for constructing a type from a database row.
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
}

/// Query for a single optional result.
pub fn query_one<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Option<T>> {
    conn.query_row(sql, params, T::from_row)
        .optional()
        .map_err(Into::into)
}

/// Query for multiple results.
pub fn query_all<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, T::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ============ SQL SELECT Constants ============

pub const LICENSE_COLS: &str = "id, key, plan, max_activations, expires_at, status, created_at";

pub const ACTIVATION_COLS: &str = "id, license_id, site_url, site_hash, wp_version, plugin_version, activated_at, deactivated_at, last_check_at, status";

pub const RELEASE_COLS: &str =
    "id, slug, version, changelog, signature, artifact_key, created_at";

pub const UPDATE_TOKEN_COLS: &str =
    "id, slug, version, license_id, site_hash, expires_at, created_at, redeemed_at";

// ============ FromRow Implementations ============

impl FromRow for License {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(License {
            id: row.get(0)?,
            key: row.get(1)?,
            plan: row.get(2)?,
            max_activations: row.get(3)?,
            expires_at: row.get(4)?,
            status: parse_enum(row, 5, "status")?,
            created_at: row.get(6)?,
        })
    }
}

impl FromRow for Activation {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Activation {
            id: row.get(0)?,
            license_id: row.get(1)?,
            site_url: row.get(2)?,
            site_hash: row.get(3)?,
            wp_version: row.get(4)?,
            plugin_version: row.get(5)?,
            activated_at: row.get(6)?,
            deactivated_at: row.get(7)?,
            last_check_at: row.get(8)?,
            status: parse_enum(row, 9, "status")?,
        })
    }
}

impl FromRow for Release {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Release {
            id: row.get(0)?,
            slug: row.get(1)?,
            version: row.get(2)?,
            changelog: row.get(3)?,
            signature: row.get(4)?,
            artifact_key: row.get(5)?,
            created_at: row.get(6)?,
        })
    }
}

impl FromRow for UpdateToken {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(UpdateToken {
            id: row.get(0)?,
            slug: row.get(1)?,
            version: row.get(2)?,
            license_id: row.get(3)?,
            site_hash: row.get(4)?,
            expires_at: row.get(5)?,
            created_at: row.get(6)?,
            redeemed_at: row.get(7)?,
        })
    }
}
