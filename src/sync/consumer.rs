use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use crate::errors::AppError;
use crate::kong::KongClient;
use crate::models::ConsumerReference;

use super::{ReferenceStore, Synchronizer};

/// Reconciles [`ConsumerReference`] records against the gateway's
/// `/consumers`.
pub struct ConsumerSyncEngine<S> {
    store: S,
}

impl<S: ReferenceStore> ConsumerSyncEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: ReferenceStore> Synchronizer for ConsumerSyncEngine<S> {
    type Reference = ConsumerReference;

    async fn synchronize(
        &self,
        client: &KongClient,
        reference: &mut ConsumerReference,
    ) -> Result<(), AppError> {
        reference.normalize();
        let payload = reference.kong_payload()?;

        match reference.kong_id {
            None => {
                let created = client.create_consumer(&payload).await?;
                reference.kong_id = Some(created.id);
                reference.synchronized_at = Some(Utc::now());
                self.store.persist_consumer(reference).await?;
                info!(
                    reference_id = %reference.id,
                    kong_id = %created.id,
                    username = payload.username.as_deref().unwrap_or("-"),
                    "created consumer on kong"
                );
            }
            Some(kong_id) => {
                client.update_consumer(kong_id, &payload).await?;
                reference.synchronized_at = Some(Utc::now());
                self.store.persist_consumer(reference).await?;
                info!(
                    reference_id = %reference.id,
                    %kong_id,
                    username = payload.username.as_deref().unwrap_or("-"),
                    "updated consumer on kong"
                );
            }
        }
        Ok(())
    }

    async fn withdraw(
        &self,
        client: &KongClient,
        reference: &mut ConsumerReference,
    ) -> Result<(), AppError> {
        let Some(kong_id) = reference.kong_id else {
            return Ok(());
        };

        client.delete_consumer(kong_id).await?;
        reference.kong_id = None;
        reference.synchronized_at = None;
        self.store.persist_consumer(reference).await?;
        info!(reference_id = %reference.id, %kong_id, "withdrew consumer from kong");
        Ok(())
    }
}
