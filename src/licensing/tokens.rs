use rusqlite::Connection;

use crate::db::{DbPool, queries};
use crate::error::{AppError, Result};
use crate::id::EntityType;
use crate::models::{Release, UpdateToken};
use crate::storage::{BlobObject, BlobStore};

const DEFAULT_CONTENT_TYPE: &str = "application/zip";

/// How long download tokens live and whether a redemption consumes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenPolicy {
    pub ttl_secs: i64,
    /// false: any number of redemptions until expiry
    pub single_use: bool,
}

impl Default for TokenPolicy {
    fn default() -> Self {
        Self {
            ttl_secs: 15 * 60,
            single_use: false,
        }
    }
}

/// An artifact ready to stream back to the client.
#[derive(Debug)]
pub struct Download {
    pub release: Release,
    pub object: BlobObject,
}

impl Download {
    pub fn filename(&self) -> String {
        self.release.download_filename()
    }

    pub fn content_type(&self) -> &str {
        self.object
            .content_type
            .as_deref()
            .unwrap_or(DEFAULT_CONTENT_TYPE)
    }
}

/// Issue a token authorizing one site of one license to download one release.
pub fn issue(
    conn: &Connection,
    release: &Release,
    license_id: &str,
    site_hash: &str,
    policy: TokenPolicy,
    now: i64,
) -> Result<UpdateToken> {
    let token = UpdateToken {
        id: EntityType::UpdateToken.gen_id(),
        slug: release.slug.clone(),
        version: release.version.clone(),
        license_id: license_id.to_string(),
        site_hash: site_hash.to_string(),
        expires_at: now + policy.ttl_secs,
        created_at: now,
        redeemed_at: None,
    };
    queries::create_update_token(conn, &token)?;

    tracing::info!(
        license_id,
        slug = %token.slug,
        version = %token.version,
        expires_at = token.expires_at,
        "Update token issued"
    );

    Ok(token)
}

/// Exchange a live token for its release artifact.
///
/// Unknown, malformed and expired tokens all fail with `TokenExpired`. A
/// release whose artifact is missing fails with `ArtifactNotFound`. Under a
/// single-use policy the token is claimed only once the artifact is known to
/// exist, so a publishing defect never burns a token.
pub async fn redeem(
    db: &DbPool,
    blobs: &dyn BlobStore,
    token_id: &str,
    policy: TokenPolicy,
    now: i64,
) -> Result<Download> {
    if !EntityType::UpdateToken.matches(token_id) {
        return Err(AppError::TokenExpired);
    }

    let release = {
        let conn = db.get()?;
        let token = queries::get_update_token(&conn, token_id)?
            .filter(|t| t.is_live_at(now))
            .ok_or(AppError::TokenExpired)?;

        if policy.single_use && token.redeemed_at.is_some() {
            return Err(AppError::TokenExpired);
        }

        queries::get_release(&conn, &token.slug, &token.version)?.ok_or_else(|| {
            tracing::warn!(
                slug = %token.slug,
                version = %token.version,
                "Update token points at a release that does not exist"
            );
            AppError::ArtifactNotFound(format!("{}@{}", token.slug, token.version))
        })?
    };

    let object = blobs.get(&release.artifact_key).await?.ok_or_else(|| {
        tracing::warn!(
            slug = %release.slug,
            version = %release.version,
            artifact_key = %release.artifact_key,
            "Release artifact missing from blob store"
        );
        AppError::ArtifactNotFound(release.artifact_key.clone())
    })?;

    if policy.single_use {
        let conn = db.get()?;
        if !queries::try_claim_update_token(&conn, token_id, now)? {
            return Err(AppError::TokenExpired);
        }
    }

    Ok(Download { release, object })
}
