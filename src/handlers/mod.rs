mod licenses;
mod prompts;
mod updates;

pub use licenses::*;
pub use prompts::*;
pub use updates::*;

use axum::{
    Json, Router,
    routing::{get, post},
};
use serde::Serialize;

use crate::db::AppState;
use crate::error::AppError;

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn not_found() -> AppError {
    AppError::NotFound("No route".into())
}

/// Every endpoint the plugin talks to. Unknown paths and methods answer 404.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/licenses/activate", post(activate_license))
        .route("/v1/licenses/deactivate", post(deactivate_license))
        .route("/v1/licenses/validate", get(validate_license))
        .route("/v1/prompts", get(get_prompts))
        .route("/v1/updates/check", get(check_for_update))
        .route("/v1/updates/download", get(download_update))
        .route("/api/health", get(health))
        .fallback(not_found)
        .method_not_allowed_fallback(not_found)
}
