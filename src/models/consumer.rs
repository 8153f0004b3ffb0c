use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::kong::objects::ConsumerPayload;

/// Local reference for a consumer on the Kong gateway.
///
/// At least one of `username` / `custom_id` must be set before the reference
/// can be synchronized.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ConsumerReference {
    pub id: Uuid,
    pub kong_id: Option<Uuid>,
    pub username: Option<String>,
    pub custom_id: Option<String>,
    pub enabled: bool,
    pub synchronized_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ConsumerReference {
    pub fn synchronized(&self) -> bool {
        self.kong_id.is_some()
    }

    /// Don't store empty strings — treat them as unset.
    pub fn normalize(&mut self) {
        if self.username.as_deref() == Some("") {
            self.username = None;
        }
        if self.custom_id.as_deref() == Some("") {
            self.custom_id = None;
        }
    }

    pub fn kong_payload(&self) -> Result<ConsumerPayload, AppError> {
        if self.username.is_none() && self.custom_id.is_none() {
            return Err(AppError::IncompleteReference(
                "at least one of username and custom_id must be set".into(),
            ));
        }
        Ok(ConsumerPayload {
            username: self.username.clone(),
            custom_id: self.custom_id.clone(),
        })
    }
}
