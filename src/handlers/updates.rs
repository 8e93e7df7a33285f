use axum::{
    body::Body,
    extract::State,
    http::{StatusCode, header},
    response::Response,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::db::AppState;
use crate::error::{AppError, Result};
use crate::extractors::{Json, Query};
use crate::licensing::{self, UpdateCheck, UpdateQuery};

#[derive(Debug, Deserialize)]
pub struct UpdateCheckParams {
    pub slug: String,
    /// The caller's installed version
    pub version: String,
    pub key: String,
    pub site_hash: String,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum UpdateCheckResponse {
    Available {
        has_update: bool,
        new_version: String,
        download_url: String,
        changelog: Option<String>,
        signature: Option<String>,
    },
    UpToDate {
        has_update: bool,
    },
}

/// GET /v1/updates/check
///
/// Answers `has_update: false` for every unauthorized caller, never an error.
pub async fn check_for_update(
    State(state): State<AppState>,
    Query(params): Query<UpdateCheckParams>,
) -> Result<Json<UpdateCheckResponse>> {
    let conn = state.db.get()?;

    let query = UpdateQuery {
        slug: &params.slug,
        current_version: &params.version,
        key: &params.key,
        site_hash: &params.site_hash,
    };

    let response = match licensing::check_update(
        &conn,
        &query,
        state.token_policy,
        Utc::now().timestamp(),
    )? {
        UpdateCheck::NoUpdate => UpdateCheckResponse::UpToDate { has_update: false },
        UpdateCheck::Available(offer) => UpdateCheckResponse::Available {
            has_update: true,
            download_url: licensing::download_url(&state.base_url, &offer.token.id)?,
            new_version: offer.release.version,
            changelog: offer.release.changelog,
            signature: offer.release.signature,
        },
    };

    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
pub struct DownloadParams {
    #[serde(default)]
    pub token: String,
}

/// Filename safe to place inside a quoted `content-disposition` value.
fn header_safe_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            if c.is_ascii_graphic() && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// GET /v1/updates/download
///
/// Streams the artifact straight from the blob store. A missing token is
/// treated like an expired one.
pub async fn download_update(
    State(state): State<AppState>,
    Query(params): Query<DownloadParams>,
) -> Result<Response> {
    let download = licensing::redeem(
        &state.db,
        state.blobs.as_ref(),
        &params.token,
        state.token_policy,
        Utc::now().timestamp(),
    )
    .await?;

    let content_type = download.content_type().to_string();
    let disposition = format!(
        "attachment; filename=\"{}\"",
        header_safe_filename(&download.filename())
    );
    let object = download.object;

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_DISPOSITION, disposition);
    if let Some(size) = object.size {
        builder = builder.header(header::CONTENT_LENGTH, size);
    }

    builder
        .body(Body::from_stream(object.body))
        .map_err(|e| AppError::Internal(format!("Failed to build download response: {}", e)))
}
