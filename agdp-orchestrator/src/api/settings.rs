//! Settings API Handlers

use agdp_core::domain::settings::Settings;
use agdp_core::dto::settings::UpdateSettings;
use axum::{Json, extract::State};

use crate::api::AppState;
use crate::api::error::ApiResult;
use crate::service::settings_service;

/// GET /api/settings
pub async fn get_settings(State(state): State<AppState>) -> ApiResult<Json<Settings>> {
    tracing::debug!("Getting settings");

    let settings = settings_service::get_settings(&*state.store).await?;

    Ok(Json(settings))
}

/// PUT /api/settings
/// Update the fields present in the body
pub async fn update_settings(
    State(state): State<AppState>,
    Json(req): Json<UpdateSettings>,
) -> ApiResult<Json<Settings>> {
    let settings = settings_service::update_settings(&*state.store, req).await?;

    Ok(Json(settings))
}
