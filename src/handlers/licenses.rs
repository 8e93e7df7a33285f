use axum::extract::State;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::db::{AppState, queries};
use crate::error::{AppError, Result};
use crate::extractors::{Json, Query, non_empty, require};
use crate::licensing::{self, DenialReason, Validation};
use crate::models::{CreateActivation, License};

#[derive(Debug, Deserialize)]
pub struct ActivateRequest {
    pub key: String,
    pub site_url: String,
    pub site_hash: String,
    #[serde(default)]
    pub wp_version: Option<String>,
    #[serde(default)]
    pub plugin_version: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LicenseSummary {
    pub plan: String,
    pub max_activations: i64,
    pub expires_at: Option<i64>,
}

impl From<&License> for LicenseSummary {
    fn from(license: &License) -> Self {
        Self {
            plan: license.plan.clone(),
            max_activations: license.max_activations,
            expires_at: license.expires_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ActivateResponse {
    pub ok: bool,
    pub license: LicenseSummary,
    pub activation_id: String,
}

/// POST /v1/licenses/activate
///
/// Idempotent per site: a site that is already active gets its existing
/// activation back without consuming quota.
pub async fn activate_license(
    State(state): State<AppState>,
    Json(req): Json<ActivateRequest>,
) -> Result<Json<ActivateResponse>> {
    require(&req.site_hash, "site_hash")?;

    let now = Utc::now().timestamp();
    let mut conn = state.db.get()?;

    let license = licensing::resolve_license(&conn, &req.key, now)?;

    let input = CreateActivation {
        site_url: req.site_url,
        site_hash: req.site_hash,
        wp_version: non_empty(req.wp_version),
        plugin_version: non_empty(req.plugin_version),
    };
    let outcome = licensing::activate(&mut conn, &license, &input, now)?;

    Ok(Json(ActivateResponse {
        ok: true,
        license: LicenseSummary::from(&license),
        activation_id: outcome.into_activation().id,
    }))
}

#[derive(Debug, Deserialize)]
pub struct DeactivateRequest {
    pub key: String,
    pub site_hash: String,
}

#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

/// POST /v1/licenses/deactivate
///
/// Works for licenses in any status so a lapsed license can still free its sites.
pub async fn deactivate_license(
    State(state): State<AppState>,
    Json(req): Json<DeactivateRequest>,
) -> Result<Json<OkResponse>> {
    require(&req.site_hash, "site_hash")?;

    let conn = state.db.get()?;
    let license = queries::get_license_by_key(&conn, &req.key)?
        .ok_or(AppError::Denied(DenialReason::InvalidKey))?;

    licensing::deactivate(&conn, &license.id, &req.site_hash, Utc::now().timestamp())?;

    Ok(Json(OkResponse { ok: true }))
}

#[derive(Debug, Deserialize)]
pub struct ValidateParams {
    pub key: String,
    pub site_hash: String,
    #[serde(default)]
    pub plugin_version: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ValidateResponse {
    Valid {
        valid: bool,
        plan: String,
        expires_at: Option<i64>,
    },
    Invalid {
        valid: bool,
        reason: DenialReason,
    },
}

impl From<Validation> for ValidateResponse {
    fn from(validation: Validation) -> Self {
        match validation {
            Validation::Valid { plan, expires_at } => ValidateResponse::Valid {
                valid: true,
                plan,
                expires_at,
            },
            Validation::Invalid(reason) => ValidateResponse::Invalid {
                valid: false,
                reason,
            },
        }
    }
}

/// GET /v1/licenses/validate
///
/// Always 200; a failed check is reported in the body with its reason.
pub async fn validate_license(
    State(state): State<AppState>,
    Query(params): Query<ValidateParams>,
) -> Result<Json<ValidateResponse>> {
    require(&params.site_hash, "site_hash")?;

    let conn = state.db.get()?;
    let plugin_version = non_empty(params.plugin_version);

    let validation = licensing::validate(
        &conn,
        &params.key,
        &params.site_hash,
        plugin_version.as_deref(),
        Utc::now().timestamp(),
    )?;

    Ok(Json(validation.into()))
}
