use async_trait::async_trait;
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::kong::KongClient;
use crate::models::PluginConfigurationReference;

use super::{ReferenceStore, Synchronizer};

/// Reconciles [`PluginConfigurationReference`] records against the plugin
/// objects nested under an API on the gateway.
///
/// The parent API reference must already be synchronized — the plugin is
/// addressed through the API's remote id. The same holds for the scoping
/// consumer when one is set.
pub struct PluginSyncEngine<S> {
    store: S,
}

impl<S: ReferenceStore> PluginSyncEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    async fn parent_kong_id(
        &self,
        reference: &PluginConfigurationReference,
    ) -> Result<Uuid, AppError> {
        let api = self
            .store
            .get_api(reference.api_id)
            .await?
            .ok_or(AppError::ReferenceNotFound)?;
        api.kong_id
            .ok_or(AppError::ApiNotSynchronized(reference.api_id))
    }

    async fn consumer_kong_id(
        &self,
        reference: &PluginConfigurationReference,
    ) -> Result<Option<Uuid>, AppError> {
        let Some(consumer_id) = reference.consumer_id else {
            return Ok(None);
        };
        let consumer = self
            .store
            .get_consumer(consumer_id)
            .await?
            .ok_or(AppError::ReferenceNotFound)?;
        consumer
            .kong_id
            .map(Some)
            .ok_or(AppError::ConsumerNotSynchronized(consumer_id))
    }
}

#[async_trait]
impl<S: ReferenceStore> Synchronizer for PluginSyncEngine<S> {
    type Reference = PluginConfigurationReference;

    async fn synchronize(
        &self,
        client: &KongClient,
        reference: &mut PluginConfigurationReference,
    ) -> Result<(), AppError> {
        let consumer_kong_id = self.consumer_kong_id(reference).await?;
        let payload = reference.kong_payload(consumer_kong_id)?;
        let api_kong_id = self.parent_kong_id(reference).await?;

        match reference.kong_id {
            None => {
                let created = client.create_plugin(api_kong_id, &payload).await?;
                reference.kong_id = Some(created.id);
                reference.synchronized_at = Some(Utc::now());
                self.store.persist_plugin(reference).await?;
                info!(
                    reference_id = %reference.id,
                    kong_id = %created.id,
                    %api_kong_id,
                    plugin = payload.name,
                    "created plugin configuration on kong"
                );
            }
            Some(kong_id) => {
                client.update_plugin(api_kong_id, kong_id, &payload).await?;
                reference.synchronized_at = Some(Utc::now());
                self.store.persist_plugin(reference).await?;
                info!(
                    reference_id = %reference.id,
                    %kong_id,
                    %api_kong_id,
                    plugin = payload.name,
                    "updated plugin configuration on kong"
                );
            }
        }
        Ok(())
    }

    async fn withdraw(
        &self,
        client: &KongClient,
        reference: &mut PluginConfigurationReference,
    ) -> Result<(), AppError> {
        let Some(kong_id) = reference.kong_id else {
            return Ok(());
        };

        let api = self
            .store
            .get_api(reference.api_id)
            .await?
            .ok_or(AppError::ReferenceNotFound)?;

        match api.kong_id {
            Some(api_kong_id) => {
                client.delete_plugin(api_kong_id, kong_id).await?;
            }
            None => {
                // Kong removed the plugin together with its withdrawn parent;
                // only the local state is left to clear.
                info!(
                    reference_id = %reference.id,
                    api_id = %reference.api_id,
                    "parent api already withdrawn, clearing local plugin state"
                );
            }
        }

        reference.kong_id = None;
        reference.synchronized_at = None;
        self.store.persist_plugin(reference).await?;
        info!(reference_id = %reference.id, %kong_id, "withdrew plugin configuration from kong");
        Ok(())
    }
}
