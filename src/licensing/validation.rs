use rusqlite::Connection;

use super::{DenialReason, require_activation, resolve_license};
use crate::db::queries;
use crate::error::{AppError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Valid {
        plan: String,
        expires_at: Option<i64>,
    },
    Invalid(DenialReason),
}

/// Check a key for a site. This is the plugin's periodic heartbeat.
///
/// Reasons are checked in order: `invalid_key`, `expired`, `not_activated`.
/// On success the activation's `last_check_at` is refreshed, and its plugin
/// version is updated only when one is supplied.
pub fn validate(
    conn: &Connection,
    key: &str,
    site_hash: &str,
    plugin_version: Option<&str>,
    now: i64,
) -> Result<Validation> {
    let checked = resolve_license(conn, key, now)
        .and_then(|license| require_activation(conn, &license, site_hash).map(|a| (license, a)));

    let (license, activation) = match checked {
        Ok(pair) => pair,
        Err(AppError::Denied(reason)) => {
            tracing::debug!(%reason, "License validation failed");
            return Ok(Validation::Invalid(reason));
        }
        Err(e) => return Err(e),
    };

    queries::touch_activation(conn, &activation.id, plugin_version, now)?;

    Ok(Validation::Valid {
        plan: license.plan,
        expires_at: license.expires_at,
    })
}
