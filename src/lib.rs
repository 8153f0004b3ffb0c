//! Kongbridge — reference store and sync service for the Kong admin API.
//!
//! Local Postgres records ("references") hold the desired state for Kong
//! APIs, consumers, and plugin configurations; the engines in [`sync`]
//! reconcile them against a running gateway through [`kong::KongClient`].

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod kong;
pub mod models;
pub mod store;
pub mod sync;

use kong::KongClient;
use store::PgStore;
use sync::{ApiSyncEngine, ConsumerSyncEngine, PluginSyncEngine};

/// Shared application state passed to handlers and the CLI commands.
pub struct AppState {
    pub db: PgStore,
    pub kong: KongClient,
    pub api_engine: ApiSyncEngine<PgStore>,
    pub consumer_engine: ConsumerSyncEngine<PgStore>,
    pub plugin_engine: PluginSyncEngine<PgStore>,
    pub config: config::Config,
}

impl AppState {
    pub fn new(db: PgStore, kong: KongClient, config: config::Config) -> Self {
        Self {
            api_engine: ApiSyncEngine::new(db.clone()),
            consumer_engine: ConsumerSyncEngine::new(db.clone()),
            plugin_engine: PluginSyncEngine::new(db.clone()),
            db,
            kong,
            config,
        }
    }
}
