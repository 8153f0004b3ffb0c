use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use crate::errors::AppError;
use crate::kong::KongClient;
use crate::models::ApiReference;

use super::{ReferenceStore, Synchronizer};

/// Reconciles [`ApiReference`] records against the gateway's `/apis`.
pub struct ApiSyncEngine<S> {
    store: S,
}

impl<S: ReferenceStore> ApiSyncEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: ReferenceStore> Synchronizer for ApiSyncEngine<S> {
    type Reference = ApiReference;

    async fn synchronize(
        &self,
        client: &KongClient,
        reference: &mut ApiReference,
    ) -> Result<(), AppError> {
        reference.normalize();
        let payload = reference.kong_payload()?;

        match reference.kong_id {
            None => {
                let created = client.create_api(&payload).await?;
                reference.kong_id = Some(created.id);
                reference.synchronized_at = Some(Utc::now());
                self.store.persist_api(reference).await?;
                info!(
                    reference_id = %reference.id,
                    kong_id = %created.id,
                    public_dns = payload.public_dns,
                    "created api on kong"
                );
            }
            Some(kong_id) => {
                client.update_api(kong_id, &payload).await?;
                reference.synchronized_at = Some(Utc::now());
                self.store.persist_api(reference).await?;
                info!(
                    reference_id = %reference.id,
                    %kong_id,
                    public_dns = payload.public_dns,
                    "updated api on kong"
                );
            }
        }
        Ok(())
    }

    async fn withdraw(
        &self,
        client: &KongClient,
        reference: &mut ApiReference,
    ) -> Result<(), AppError> {
        let Some(kong_id) = reference.kong_id else {
            // Never synchronized; nothing to delete.
            return Ok(());
        };

        client.delete_api(kong_id).await?;
        reference.kong_id = None;
        reference.synchronized_at = None;
        self.store.persist_api(reference).await?;
        info!(reference_id = %reference.id, %kong_id, "withdrew api from kong");
        Ok(())
    }
}
