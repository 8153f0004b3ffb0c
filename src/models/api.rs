use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::errors::AppError;
use crate::kong::objects::ApiPayload;

/// Local reference for an API object on the Kong gateway.
///
/// Holds the desired state for the remote resource. `kong_id` is null until
/// the first successful sync; its presence is what "synchronized" means.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ApiReference {
    pub id: Uuid,
    pub kong_id: Option<Uuid>,
    pub target_url: String,
    pub public_dns: Option<String>,
    /// Display name on the gateway. Falls back to `public_dns` when unset.
    pub name: Option<String>,
    pub enabled: bool,
    pub synchronized_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ApiReference {
    pub fn synchronized(&self) -> bool {
        self.kong_id.is_some()
    }

    /// Don't store empty strings — treat them as unset.
    pub fn normalize(&mut self) {
        if self.public_dns.as_deref() == Some("") {
            self.public_dns = None;
        }
        if self.name.as_deref() == Some("") {
            self.name = None;
        }
    }

    /// Build the Kong admin API payload, or fail with an incomplete-reference
    /// error when required fields are missing or malformed.
    pub fn kong_payload(&self) -> Result<ApiPayload, AppError> {
        let mut missing = Vec::new();
        if self.target_url.trim().is_empty() {
            missing.push("target_url");
        }
        let public_dns = match self.public_dns.as_deref() {
            Some(dns) if !dns.is_empty() => dns,
            _ => {
                missing.push("public_dns");
                ""
            }
        };
        if !missing.is_empty() {
            return Err(AppError::IncompleteReference(format!(
                "missing required fields: {}",
                missing.join(", ")
            )));
        }
        if Url::parse(&self.target_url).is_err() {
            return Err(AppError::IncompleteReference(format!(
                "target_url is not a valid URL: {}",
                self.target_url
            )));
        }

        Ok(ApiPayload {
            name: self
                .name
                .clone()
                .unwrap_or_else(|| public_dns.to_string()),
            public_dns: public_dns.to_string(),
            target_url: self.target_url.clone(),
        })
    }
}
