//! License lifecycle and update distribution.
//!
//! Each operation takes its collaborators and the current time explicitly so
//! it can be exercised without the HTTP layer.

pub mod activation;
pub mod tokens;
pub mod updates;
pub mod validation;

pub use activation::{ActivationOutcome, activate, deactivate};
pub use tokens::{Download, TokenPolicy, issue, redeem};
pub use updates::{UpdateCheck, UpdateOffer, UpdateQuery, check_update, download_url};
pub use validation::{Validation, validate};

use std::fmt;

use rusqlite::Connection;
use serde::Serialize;

use crate::db::queries;
use crate::error::{AppError, Result};
use crate::models::{Activation, License};

/// Why a license may not be used. Each reason reaches the client verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    InvalidKey,
    Expired,
    NotActivated,
}

impl DenialReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenialReason::InvalidKey => "invalid_key",
            DenialReason::Expired => "expired",
            DenialReason::NotActivated => "not_activated",
        }
    }
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve a key to a license that is active and unexpired.
///
/// Unknown or non-active keys are `invalid_key`; the expiry check comes second.
pub fn resolve_license(conn: &Connection, key: &str, now: i64) -> Result<License> {
    let license = queries::get_active_license_by_key(conn, key)?
        .ok_or(AppError::Denied(DenialReason::InvalidKey))?;

    if license.is_expired_at(now) {
        return Err(AppError::Denied(DenialReason::Expired));
    }

    Ok(license)
}

/// The site's active activation for this license, or `not_activated`.
pub fn require_activation(
    conn: &Connection,
    license: &License,
    site_hash: &str,
) -> Result<Activation> {
    queries::get_active_activation(conn, &license.id, site_hash)?
        .ok_or(AppError::Denied(DenialReason::NotActivated))
}
