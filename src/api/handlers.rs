use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{ApiReference, ConsumerReference, PluginConfigurationReference};
use crate::store::postgres::{NewApiReference, NewConsumerReference, NewPluginReference};
use crate::sync::Synchronizer;
use crate::AppState;

// ── Request / Response DTOs ──────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateApiRequest {
    pub target_url: Option<String>,
    pub public_dns: Option<String>,
    pub name: Option<String>,
    pub enabled: Option<bool>,
}

#[derive(Deserialize)]
pub struct UpdateConsumerRequest {
    pub username: Option<String>,
    pub custom_id: Option<String>,
    pub enabled: Option<bool>,
}

#[derive(Deserialize)]
pub struct UpdatePluginRequest {
    pub consumer_id: Option<Uuid>,
    pub name: Option<String>,
    pub config: Option<serde_json::Value>,
    pub enabled: Option<bool>,
}

#[derive(Deserialize)]
pub struct PluginListParams {
    pub api_id: Option<Uuid>,
}

/// Reference plus the derived `synchronized` flag.
#[derive(Serialize)]
pub struct ReferenceResponse<T: Serialize> {
    #[serde(flatten)]
    pub reference: T,
    pub synchronized: bool,
}

impl From<ApiReference> for ReferenceResponse<ApiReference> {
    fn from(reference: ApiReference) -> Self {
        let synchronized = reference.synchronized();
        Self {
            reference,
            synchronized,
        }
    }
}

impl From<ConsumerReference> for ReferenceResponse<ConsumerReference> {
    fn from(reference: ConsumerReference) -> Self {
        let synchronized = reference.synchronized();
        Self {
            reference,
            synchronized,
        }
    }
}

impl From<PluginConfigurationReference> for ReferenceResponse<PluginConfigurationReference> {
    fn from(reference: PluginConfigurationReference) -> Self {
        let synchronized = reference.synchronized();
        Self {
            reference,
            synchronized,
        }
    }
}

// ── API reference handlers ───────────────────────────────────

/// GET /api/v1/apis
pub async fn list_apis(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ReferenceResponse<ApiReference>>>, AppError> {
    let refs = state.db.list_apis().await?;
    Ok(Json(refs.into_iter().map(Into::into).collect()))
}

/// POST /api/v1/apis — create a local reference (possibly incomplete)
pub async fn create_api(
    State(state): State<Arc<AppState>>,
    Json(mut payload): Json<NewApiReference>,
) -> Result<(StatusCode, Json<ReferenceResponse<ApiReference>>), AppError> {
    // Don't store empty strings — treat them as unset.
    payload.public_dns = payload.public_dns.filter(|s| !s.is_empty());
    payload.name = payload.name.filter(|s| !s.is_empty());
    let reference = state.db.insert_api(&payload).await?;
    Ok((StatusCode::CREATED, Json(reference.into())))
}

/// GET /api/v1/apis/:id
pub async fn get_api(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReferenceResponse<ApiReference>>, AppError> {
    let reference = state
        .db
        .get_api(id)
        .await?
        .ok_or(AppError::ReferenceNotFound)?;
    Ok(Json(reference.into()))
}

/// PUT /api/v1/apis/:id — update local desired state (no remote call)
pub async fn update_api(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateApiRequest>,
) -> Result<Json<ReferenceResponse<ApiReference>>, AppError> {
    let mut reference = state
        .db
        .get_api(id)
        .await?
        .ok_or(AppError::ReferenceNotFound)?;

    if let Some(target_url) = payload.target_url {
        reference.target_url = target_url;
    }
    if let Some(public_dns) = payload.public_dns {
        reference.public_dns = Some(public_dns);
    }
    if let Some(name) = payload.name {
        reference.name = Some(name);
    }
    if let Some(enabled) = payload.enabled {
        reference.enabled = enabled;
    }
    reference.normalize();

    state.db.save_api(&reference).await?;
    Ok(Json(reference.into()))
}

/// DELETE /api/v1/apis/:id — local delete only; remote cleanup is the
/// caller's job (withdraw first).
pub async fn delete_api(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let reference = state
        .db
        .get_api(id)
        .await?
        .ok_or(AppError::ReferenceNotFound)?;
    if reference.synchronized() {
        tracing::warn!(
            reference_id = %id,
            kong_id = ?reference.kong_id,
            "deleting a synchronized api reference; the kong resource is left behind"
        );
    }
    state.db.delete_api(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/apis/:id/synchronize
pub async fn synchronize_api(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReferenceResponse<ApiReference>>, AppError> {
    let mut reference = state
        .db
        .get_api(id)
        .await?
        .ok_or(AppError::ReferenceNotFound)?;
    state
        .api_engine
        .synchronize(&state.kong, &mut reference)
        .await?;
    Ok(Json(reference.into()))
}

/// POST /api/v1/apis/:id/withdraw
pub async fn withdraw_api(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReferenceResponse<ApiReference>>, AppError> {
    let mut reference = state
        .db
        .get_api(id)
        .await?
        .ok_or(AppError::ReferenceNotFound)?;
    state
        .api_engine
        .withdraw(&state.kong, &mut reference)
        .await?;
    Ok(Json(reference.into()))
}

// ── Consumer reference handlers ──────────────────────────────

/// GET /api/v1/consumers
pub async fn list_consumers(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ReferenceResponse<ConsumerReference>>>, AppError> {
    let refs = state.db.list_consumers().await?;
    Ok(Json(refs.into_iter().map(Into::into).collect()))
}

/// POST /api/v1/consumers
pub async fn create_consumer(
    State(state): State<Arc<AppState>>,
    Json(mut payload): Json<NewConsumerReference>,
) -> Result<(StatusCode, Json<ReferenceResponse<ConsumerReference>>), AppError> {
    payload.username = payload.username.filter(|s| !s.is_empty());
    payload.custom_id = payload.custom_id.filter(|s| !s.is_empty());
    let reference = state.db.insert_consumer(&payload).await?;
    Ok((StatusCode::CREATED, Json(reference.into())))
}

/// GET /api/v1/consumers/:id
pub async fn get_consumer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReferenceResponse<ConsumerReference>>, AppError> {
    let reference = state
        .db
        .get_consumer(id)
        .await?
        .ok_or(AppError::ReferenceNotFound)?;
    Ok(Json(reference.into()))
}

/// PUT /api/v1/consumers/:id
pub async fn update_consumer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateConsumerRequest>,
) -> Result<Json<ReferenceResponse<ConsumerReference>>, AppError> {
    let mut reference = state
        .db
        .get_consumer(id)
        .await?
        .ok_or(AppError::ReferenceNotFound)?;

    if let Some(username) = payload.username {
        reference.username = Some(username);
    }
    if let Some(custom_id) = payload.custom_id {
        reference.custom_id = Some(custom_id);
    }
    if let Some(enabled) = payload.enabled {
        reference.enabled = enabled;
    }
    reference.normalize();

    state.db.save_consumer(&reference).await?;
    Ok(Json(reference.into()))
}

/// DELETE /api/v1/consumers/:id
pub async fn delete_consumer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let reference = state
        .db
        .get_consumer(id)
        .await?
        .ok_or(AppError::ReferenceNotFound)?;
    if reference.synchronized() {
        tracing::warn!(
            reference_id = %id,
            kong_id = ?reference.kong_id,
            "deleting a synchronized consumer reference; the kong resource is left behind"
        );
    }
    state.db.delete_consumer(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/consumers/:id/synchronize
pub async fn synchronize_consumer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReferenceResponse<ConsumerReference>>, AppError> {
    let mut reference = state
        .db
        .get_consumer(id)
        .await?
        .ok_or(AppError::ReferenceNotFound)?;
    state
        .consumer_engine
        .synchronize(&state.kong, &mut reference)
        .await?;
    Ok(Json(reference.into()))
}

/// POST /api/v1/consumers/:id/withdraw
pub async fn withdraw_consumer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReferenceResponse<ConsumerReference>>, AppError> {
    let mut reference = state
        .db
        .get_consumer(id)
        .await?
        .ok_or(AppError::ReferenceNotFound)?;
    state
        .consumer_engine
        .withdraw(&state.kong, &mut reference)
        .await?;
    Ok(Json(reference.into()))
}

// ── Plugin configuration handlers ────────────────────────────

/// GET /api/v1/plugins?api_id=…
pub async fn list_plugins(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PluginListParams>,
) -> Result<Json<Vec<ReferenceResponse<PluginConfigurationReference>>>, AppError> {
    let refs = state.db.list_plugins(params.api_id).await?;
    Ok(Json(refs.into_iter().map(Into::into).collect()))
}

/// POST /api/v1/plugins
pub async fn create_plugin(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewPluginReference>,
) -> Result<(StatusCode, Json<ReferenceResponse<PluginConfigurationReference>>), AppError> {
    // The parent reference must exist locally, synchronized or not.
    state
        .db
        .get_api(payload.api_id)
        .await?
        .ok_or(AppError::ReferenceNotFound)?;
    let reference = state.db.insert_plugin(&payload).await?;
    Ok((StatusCode::CREATED, Json(reference.into())))
}

/// GET /api/v1/plugins/:id
pub async fn get_plugin(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReferenceResponse<PluginConfigurationReference>>, AppError> {
    let reference = state
        .db
        .get_plugin(id)
        .await?
        .ok_or(AppError::ReferenceNotFound)?;
    Ok(Json(reference.into()))
}

/// PUT /api/v1/plugins/:id
pub async fn update_plugin(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePluginRequest>,
) -> Result<Json<ReferenceResponse<PluginConfigurationReference>>, AppError> {
    let mut reference = state
        .db
        .get_plugin(id)
        .await?
        .ok_or(AppError::ReferenceNotFound)?;

    if let Some(consumer_id) = payload.consumer_id {
        reference.consumer_id = Some(consumer_id);
    }
    if let Some(name) = payload.name {
        reference.name = name;
    }
    if let Some(config) = payload.config {
        reference.config = config;
    }
    if let Some(enabled) = payload.enabled {
        reference.enabled = enabled;
    }

    state.db.save_plugin(&reference).await?;
    Ok(Json(reference.into()))
}

/// DELETE /api/v1/plugins/:id
pub async fn delete_plugin(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let reference = state
        .db
        .get_plugin(id)
        .await?
        .ok_or(AppError::ReferenceNotFound)?;
    if reference.synchronized() {
        tracing::warn!(
            reference_id = %id,
            kong_id = ?reference.kong_id,
            "deleting a synchronized plugin reference; the kong resource is left behind"
        );
    }
    state.db.delete_plugin(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/plugins/:id/synchronize
pub async fn synchronize_plugin(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReferenceResponse<PluginConfigurationReference>>, AppError> {
    let mut reference = state
        .db
        .get_plugin(id)
        .await?
        .ok_or(AppError::ReferenceNotFound)?;
    state
        .plugin_engine
        .synchronize(&state.kong, &mut reference)
        .await?;
    Ok(Json(reference.into()))
}

/// POST /api/v1/plugins/:id/withdraw
pub async fn withdraw_plugin(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReferenceResponse<PluginConfigurationReference>>, AppError> {
    let mut reference = state
        .db
        .get_plugin(id)
        .await?
        .ok_or(AppError::ReferenceNotFound)?;
    state
        .plugin_engine
        .withdraw(&state.kong, &mut reference)
        .await?;
    Ok(Json(reference.into()))
}
