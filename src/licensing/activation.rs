use rusqlite::{Connection, TransactionBehavior};

use crate::db::queries;
use crate::error::{AppError, Result};
use crate::models::{Activation, CreateActivation, License};

/// Result of an activation request.
#[derive(Debug, Clone)]
pub enum ActivationOutcome {
    /// The site was already active; nothing was written and no quota consumed
    Existing(Activation),
    Created(Activation),
}

impl ActivationOutcome {
    pub fn activation(&self) -> &Activation {
        match self {
            ActivationOutcome::Existing(a) | ActivationOutcome::Created(a) => a,
        }
    }

    pub fn into_activation(self) -> Activation {
        match self {
            ActivationOutcome::Existing(a) | ActivationOutcome::Created(a) => a,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, ActivationOutcome::Created(_))
    }
}

/// Bind a site to a license, enforcing the license's activation quota.
///
/// Re-activating an already active site returns the existing record. The
/// lookup, count and insert run in one IMMEDIATE transaction, which takes the
/// SQLite write lock up front, so concurrent callers cannot both pass the
/// count check and overshoot the quota.
///
/// # PostgreSQL Migration Note
/// Lock the license row (`SELECT ... FOR UPDATE`) before counting to keep the
/// same guarantee.
pub fn activate(
    conn: &mut Connection,
    license: &License,
    input: &CreateActivation,
    now: i64,
) -> Result<ActivationOutcome> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    if let Some(existing) = queries::get_active_activation(&tx, &license.id, &input.site_hash)? {
        tx.commit()?;
        tracing::debug!(
            license_id = %license.id,
            activation_id = %existing.id,
            "Site already active, reusing activation"
        );
        return Ok(ActivationOutcome::Existing(existing));
    }

    let active = queries::count_active_activations(&tx, &license.id)?;
    if active >= license.max_activations {
        tracing::info!(
            license_id = %license.id,
            active,
            max = license.max_activations,
            "Activation limit reached"
        );
        return Err(AppError::LimitExceeded {
            max: license.max_activations,
        });
    }

    let activation = queries::create_activation(&tx, &license.id, input, now)?;
    tx.commit()?;

    tracing::info!(
        license_id = %license.id,
        activation_id = %activation.id,
        site_url = %activation.site_url,
        "Site activated"
    );

    Ok(ActivationOutcome::Created(activation))
}

/// Revoke the site's active activation(s). Revoking nothing is not an error.
///
/// Returns how many activations were revoked.
pub fn deactivate(conn: &Connection, license_id: &str, site_hash: &str, now: i64) -> Result<usize> {
    let revoked = queries::revoke_activations(conn, license_id, site_hash, now)?;
    tracing::info!(license_id, revoked, "Site deactivated");
    Ok(revoked)
}
