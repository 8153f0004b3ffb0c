use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::kong::objects::PluginPayload;

/// Local reference for a plugin configuration attached to an API.
///
/// The plugin object lives nested under the API on the gateway, so the
/// parent `ApiReference` must be synchronized before this one can be.
/// `consumer_id` optionally scopes the plugin to a single consumer.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PluginConfigurationReference {
    pub id: Uuid,
    pub kong_id: Option<Uuid>,
    pub api_id: Uuid,
    pub consumer_id: Option<Uuid>,
    /// Kong plugin name, e.g. "rate-limiting" or "key-auth".
    pub name: String,
    pub config: serde_json::Value,
    pub enabled: bool,
    pub synchronized_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PluginConfigurationReference {
    pub fn synchronized(&self) -> bool {
        self.kong_id.is_some()
    }

    /// Build the gateway payload. `consumer_kong_id` is the remote id of the
    /// scoping consumer, already resolved by the engine.
    pub fn kong_payload(
        &self,
        consumer_kong_id: Option<Uuid>,
    ) -> Result<PluginPayload, AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::IncompleteReference(
                "plugin name must be set".into(),
            ));
        }
        if !self.config.is_object() {
            return Err(AppError::IncompleteReference(
                "plugin config must be a JSON object".into(),
            ));
        }
        Ok(PluginPayload {
            name: self.name.clone(),
            config: self.config.clone(),
            enabled: self.enabled,
            consumer_id: consumer_kong_id,
        })
    }
}
