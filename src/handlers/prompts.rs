use axum::extract::State;
use serde::Deserialize;

use crate::db::AppState;
use crate::error::Result;
use crate::extractors::{Json, Query};
use crate::prompts::{PromptBundle, fetch_prompts};

#[derive(Debug, Deserialize)]
pub struct PromptParams {
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

/// GET /v1/prompts
pub async fn get_prompts(
    State(state): State<AppState>,
    Query(params): Query<PromptParams>,
) -> Result<Json<PromptBundle>> {
    let bundle = fetch_prompts(
        state.kv.as_ref(),
        params.section.as_deref(),
        params.version.as_deref(),
    )
    .await?;
    Ok(Json(bundle))
}
