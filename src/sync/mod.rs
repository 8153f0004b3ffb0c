//! Reconciliation engines for Kong references.
//!
//! Each engine reconciles one local reference kind against the gateway:
//! `synchronize` validates the reference, then creates (no `kong_id`) or
//! updates (has `kong_id`) the remote resource and persists the reference;
//! `withdraw` deletes the remote resource and clears the local sync state.
//!
//! Engines are storage-agnostic: they persist through the [`ReferenceStore`]
//! trait, so tests run them against an in-memory store while the service
//! uses Postgres.

pub mod api;
pub mod consumer;
pub mod plugin;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppError;
use crate::kong::KongClient;
use crate::models::{ApiReference, ConsumerReference, PluginConfigurationReference};

pub use api::ApiSyncEngine;
pub use consumer::ConsumerSyncEngine;
pub use plugin::PluginSyncEngine;

/// Persistence seam for the sync engines.
///
/// `persist_*` writes the reference's current field values, including
/// `kong_id` and `synchronized_at`, back to durable storage. The `get_*`
/// lookups exist for the plugin engine, which must resolve the remote ids
/// of its parent API and scoping consumer.
#[async_trait]
pub trait ReferenceStore: Send + Sync {
    async fn persist_api(&self, reference: &ApiReference) -> anyhow::Result<()>;
    async fn persist_consumer(&self, reference: &ConsumerReference) -> anyhow::Result<()>;
    async fn persist_plugin(&self, reference: &PluginConfigurationReference)
        -> anyhow::Result<()>;

    async fn get_api(&self, id: Uuid) -> anyhow::Result<Option<ApiReference>>;
    async fn get_consumer(&self, id: Uuid) -> anyhow::Result<Option<ConsumerReference>>;
}

/// The create-or-update / delete contract every engine implements.
///
/// `synchronize` performs exactly one remote write per successful call —
/// repeated calls with unchanged fields re-assert remote state rather than
/// short-circuiting. `withdraw` is an idempotent no-op when the reference
/// holds no `kong_id`. Remote failures surface verbatim and leave the
/// reference untouched.
#[async_trait]
pub trait Synchronizer {
    type Reference;

    async fn synchronize(
        &self,
        client: &KongClient,
        reference: &mut Self::Reference,
    ) -> Result<(), AppError>;

    async fn withdraw(
        &self,
        client: &KongClient,
        reference: &mut Self::Reference,
    ) -> Result<(), AppError>;
}
