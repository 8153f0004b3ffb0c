//! Request and response shapes for the Kong admin API.
//!
//! Payload structs carry the full desired field set (create and update both
//! send everything — update is a full replace). Response structs mirror what
//! the gateway returns, of which only `id` matters to the sync engines.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiPayload {
    pub name: String,
    pub public_dns: String,
    pub target_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KongApi {
    pub id: Uuid,
    pub name: Option<String>,
    pub public_dns: Option<String>,
    pub target_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumerPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KongConsumer {
    pub id: Uuid,
    pub username: Option<String>,
    pub custom_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginPayload {
    pub name: String,
    pub config: serde_json::Value,
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumer_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KongPlugin {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub config: serde_json::Value,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub consumer_id: Option<Uuid>,
}

fn default_enabled() -> bool {
    true
}
