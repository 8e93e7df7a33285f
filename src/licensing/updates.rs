use rusqlite::Connection;
use url::Url;

use super::{TokenPolicy, issue, require_activation, resolve_license};
use crate::db::queries;
use crate::error::{AppError, Result};
use crate::models::{Release, UpdateToken};
use crate::version;

pub const DOWNLOAD_PATH: &str = "/v1/updates/download";

#[derive(Debug, Clone)]
pub struct UpdateQuery<'a> {
    pub slug: &'a str,
    pub current_version: &'a str,
    pub key: &'a str,
    pub site_hash: &'a str,
}

#[derive(Debug, Clone)]
pub struct UpdateOffer {
    pub release: Release,
    pub token: UpdateToken,
}

#[derive(Debug, Clone)]
pub enum UpdateCheck {
    NoUpdate,
    Available(UpdateOffer),
}

/// Decide whether the caller should update, issuing a download token if so.
///
/// Every license or activation failure collapses into `NoUpdate`, so this
/// channel reveals nothing about whether a key is valid.
pub fn check_update(
    conn: &Connection,
    query: &UpdateQuery<'_>,
    policy: TokenPolicy,
    now: i64,
) -> Result<UpdateCheck> {
    let authorized = resolve_license(conn, query.key, now).and_then(|license| {
        require_activation(conn, &license, query.site_hash).map(|_| license)
    });

    let license = match authorized {
        Ok(license) => license,
        Err(AppError::Denied(reason)) => {
            tracing::debug!(%reason, slug = query.slug, "Update check denied");
            return Ok(UpdateCheck::NoUpdate);
        }
        Err(e) => return Err(e),
    };

    let Some(release) = queries::get_latest_release(conn, query.slug)? else {
        return Ok(UpdateCheck::NoUpdate);
    };

    if !version::is_newer(&release.version, query.current_version) {
        return Ok(UpdateCheck::NoUpdate);
    }

    let token = issue(conn, &release, &license.id, query.site_hash, policy, now)?;
    Ok(UpdateCheck::Available(UpdateOffer { release, token }))
}

/// Absolute download link embedding the token id.
pub fn download_url(base_url: &str, token_id: &str) -> Result<String> {
    let mut url = Url::parse(base_url)?.join(DOWNLOAD_PATH)?;
    url.query_pairs_mut().append_pair("token", token_id);
    Ok(url.into())
}
