use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};

use crate::error::Result;
use crate::id::EntityType;
use crate::models::*;

use super::from_row::{
    ACTIVATION_COLS, LICENSE_COLS, RELEASE_COLS, UPDATE_TOKEN_COLS, query_all, query_one,
};

fn now() -> i64 {
    Utc::now().timestamp()
}

// ============ Licenses ============

/// Insert a license. Licenses are issued outside this service; this exists for
/// seeding and fixtures.
pub fn create_license(conn: &Connection, input: &CreateLicense) -> Result<License> {
    let id = EntityType::License.gen_id();
    let now = now();

    conn.execute(
        "INSERT INTO licenses (id, key, plan, max_activations, expires_at, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            &id,
            &input.key,
            &input.plan,
            input.max_activations,
            input.expires_at,
            input.status.as_ref(),
            now
        ],
    )?;

    Ok(License {
        id,
        key: input.key.clone(),
        plan: input.plan.clone(),
        max_activations: input.max_activations,
        expires_at: input.expires_at,
        status: input.status,
        created_at: now,
    })
}

pub fn get_license_by_id(conn: &Connection, id: &str) -> Result<Option<License>> {
    query_one(
        conn,
        &format!("SELECT {} FROM licenses WHERE id = ?1", LICENSE_COLS),
        &[&id],
    )
}

/// Look up a license by key regardless of status.
pub fn get_license_by_key(conn: &Connection, key: &str) -> Result<Option<License>> {
    query_one(
        conn,
        &format!("SELECT {} FROM licenses WHERE key = ?1", LICENSE_COLS),
        &[&key],
    )
}

/// Look up a license by key only if its status is active. Expiry is not checked here.
pub fn get_active_license_by_key(conn: &Connection, key: &str) -> Result<Option<License>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM licenses WHERE key = ?1 AND status = 'active'",
            LICENSE_COLS
        ),
        &[&key],
    )
}

// ============ Activations ============

pub fn create_activation(
    conn: &Connection,
    license_id: &str,
    input: &CreateActivation,
    activated_at: i64,
) -> Result<Activation> {
    let id = EntityType::Activation.gen_id();

    conn.execute(
        "INSERT INTO activations (id, license_id, site_url, site_hash, wp_version, plugin_version, activated_at, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 'active')",
        params![
            &id,
            license_id,
            &input.site_url,
            &input.site_hash,
            &input.wp_version,
            &input.plugin_version,
            activated_at
        ],
    )?;

    Ok(Activation {
        id,
        license_id: license_id.to_string(),
        site_url: input.site_url.clone(),
        site_hash: input.site_hash.clone(),
        wp_version: input.wp_version.clone(),
        plugin_version: input.plugin_version.clone(),
        activated_at,
        deactivated_at: None,
        last_check_at: None,
        status: ActivationStatus::Active,
    })
}

pub fn get_activation_by_id(conn: &Connection, id: &str) -> Result<Option<Activation>> {
    query_one(
        conn,
        &format!("SELECT {} FROM activations WHERE id = ?1", ACTIVATION_COLS),
        &[&id],
    )
}

pub fn get_active_activation(
    conn: &Connection,
    license_id: &str,
    site_hash: &str,
) -> Result<Option<Activation>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM activations WHERE license_id = ?1 AND site_hash = ?2 AND status = 'active'",
            ACTIVATION_COLS
        ),
        &[&license_id, &site_hash],
    )
}

pub fn list_activations_for_license(conn: &Connection, license_id: &str) -> Result<Vec<Activation>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM activations WHERE license_id = ?1 ORDER BY activated_at DESC, rowid DESC",
            ACTIVATION_COLS
        ),
        &[&license_id],
    )
}

pub fn count_active_activations(conn: &Connection, license_id: &str) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM activations WHERE license_id = ?1 AND status = 'active'",
        params![license_id],
        |row| row.get(0),
    )
    .map_err(Into::into)
}

/// Revoke every active activation for the site. Returns the number of rows changed.
pub fn revoke_activations(
    conn: &Connection,
    license_id: &str,
    site_hash: &str,
    deactivated_at: i64,
) -> Result<usize> {
    let affected = conn.execute(
        "UPDATE activations SET status = 'revoked', deactivated_at = ?1
         WHERE license_id = ?2 AND site_hash = ?3 AND status = 'active'",
        params![deactivated_at, license_id, site_hash],
    )?;
    Ok(affected)
}

/// Record a successful validation. An absent plugin version keeps the stored one.
pub fn touch_activation(
    conn: &Connection,
    id: &str,
    plugin_version: Option<&str>,
    checked_at: i64,
) -> Result<()> {
    conn.execute(
        "UPDATE activations SET last_check_at = ?1, plugin_version = COALESCE(?2, plugin_version)
         WHERE id = ?3",
        params![checked_at, plugin_version, id],
    )?;
    Ok(())
}

// ============ Releases ============

/// Insert a release created now. Publishing happens outside this service;
/// this exists for seeding and fixtures.
pub fn create_release(conn: &Connection, input: &CreateRelease) -> Result<Release> {
    create_release_at(conn, input, now())
}

pub fn create_release_at(
    conn: &Connection,
    input: &CreateRelease,
    created_at: i64,
) -> Result<Release> {
    let id = EntityType::Release.gen_id();

    conn.execute(
        "INSERT INTO releases (id, slug, version, changelog, signature, artifact_key, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            &id,
            &input.slug,
            &input.version,
            &input.changelog,
            &input.signature,
            &input.artifact_key,
            created_at
        ],
    )?;

    Ok(Release {
        id,
        slug: input.slug.clone(),
        version: input.version.clone(),
        changelog: input.changelog.clone(),
        signature: input.signature.clone(),
        artifact_key: input.artifact_key.clone(),
        created_at,
    })
}

/// The most recently created release for a slug. Ties go to the later insert.
pub fn get_latest_release(conn: &Connection, slug: &str) -> Result<Option<Release>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM releases WHERE slug = ?1 ORDER BY created_at DESC, rowid DESC LIMIT 1",
            RELEASE_COLS
        ),
        &[&slug],
    )
}

pub fn get_release(conn: &Connection, slug: &str, version: &str) -> Result<Option<Release>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM releases WHERE slug = ?1 AND version = ?2",
            RELEASE_COLS
        ),
        &[&slug, &version],
    )
}

// ============ Update Tokens ============

pub fn create_update_token(conn: &Connection, token: &UpdateToken) -> Result<()> {
    conn.execute(
        "INSERT INTO update_tokens (id, slug, version, license_id, site_hash, expires_at, created_at, redeemed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            &token.id,
            &token.slug,
            &token.version,
            &token.license_id,
            &token.site_hash,
            token.expires_at,
            token.created_at,
            token.redeemed_at
        ],
    )?;
    Ok(())
}

pub fn get_update_token(conn: &Connection, id: &str) -> Result<Option<UpdateToken>> {
    query_one(
        conn,
        &format!("SELECT {} FROM update_tokens WHERE id = ?1", UPDATE_TOKEN_COLS),
        &[&id],
    )
}

/// Atomically mark a token redeemed if it is unclaimed and still live.
///
/// Returns false when another redemption won the claim or the token expired.
pub fn try_claim_update_token(conn: &Connection, id: &str, now: i64) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE update_tokens SET redeemed_at = ?1
         WHERE id = ?2 AND redeemed_at IS NULL AND expires_at > ?1",
        params![now, id],
    )?;
    Ok(affected > 0)
}

/// Delete tokens that expired before `cutoff`. Expired tokens are already
/// unusable; this only bounds table growth.
pub fn purge_expired_update_tokens(conn: &Connection, cutoff: i64) -> Result<usize> {
    let deleted = conn.execute(
        "DELETE FROM update_tokens WHERE expires_at < ?1",
        params![cutoff],
    )?;
    Ok(deleted)
}

// ============ Key-Value Entries ============

pub fn get_kv_entry(conn: &Connection, key: &str) -> Result<Option<String>> {
    conn.query_row(
        "SELECT value FROM kv_entries WHERE key = ?1",
        params![key],
        |row| row.get(0),
    )
    .optional()
    .map_err(Into::into)
}

pub fn put_kv_entry(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO kv_entries (key, value, updated_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        params![key, value, now()],
    )?;
    Ok(())
}
