//! In-memory `ReferenceStore` so the sync engines can run against a mock
//! gateway without Postgres.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use kongbridge::models::{ApiReference, ConsumerReference, PluginConfigurationReference};
use kongbridge::sync::ReferenceStore;

#[derive(Clone, Default)]
pub struct MemoryStore {
    apis: Arc<RwLock<HashMap<Uuid, ApiReference>>>,
    consumers: Arc<RwLock<HashMap<Uuid, ConsumerReference>>>,
    plugins: Arc<RwLock<HashMap<Uuid, PluginConfigurationReference>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put_api(&self, reference: ApiReference) {
        self.apis.write().await.insert(reference.id, reference);
    }

    pub async fn put_consumer(&self, reference: ConsumerReference) {
        self.consumers
            .write()
            .await
            .insert(reference.id, reference);
    }

    pub async fn put_plugin(&self, reference: PluginConfigurationReference) {
        self.plugins.write().await.insert(reference.id, reference);
    }

    pub async fn api(&self, id: Uuid) -> Option<ApiReference> {
        self.apis.read().await.get(&id).cloned()
    }

    pub async fn consumer(&self, id: Uuid) -> Option<ConsumerReference> {
        self.consumers.read().await.get(&id).cloned()
    }

    pub async fn plugin(&self, id: Uuid) -> Option<PluginConfigurationReference> {
        self.plugins.read().await.get(&id).cloned()
    }
}

#[async_trait]
impl ReferenceStore for MemoryStore {
    async fn persist_api(&self, reference: &ApiReference) -> anyhow::Result<()> {
        self.put_api(reference.clone()).await;
        Ok(())
    }

    async fn persist_consumer(&self, reference: &ConsumerReference) -> anyhow::Result<()> {
        self.put_consumer(reference.clone()).await;
        Ok(())
    }

    async fn persist_plugin(
        &self,
        reference: &PluginConfigurationReference,
    ) -> anyhow::Result<()> {
        self.put_plugin(reference.clone()).await;
        Ok(())
    }

    async fn get_api(&self, id: Uuid) -> anyhow::Result<Option<ApiReference>> {
        Ok(self.api(id).await)
    }

    async fn get_consumer(&self, id: Uuid) -> anyhow::Result<Option<ConsumerReference>> {
        Ok(self.consumer(id).await)
    }
}
