use async_trait::async_trait;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{ApiReference, ConsumerReference, PluginConfigurationReference};
use crate::sync::ReferenceStore;

const API_COLUMNS: &str = "id, kong_id, target_url, public_dns, name, enabled, \
     synchronized_at, created_at, updated_at";
const CONSUMER_COLUMNS: &str = "id, kong_id, username, custom_id, enabled, \
     synchronized_at, created_at, updated_at";
const PLUGIN_COLUMNS: &str = "id, kong_id, api_id, consumer_id, name, config, enabled, \
     synchronized_at, created_at, updated_at";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

/// Fields accepted when creating an API reference locally. Incomplete
/// references are allowed — completeness is checked at sync time.
#[derive(Debug, Deserialize)]
pub struct NewApiReference {
    pub target_url: String,
    pub public_dns: Option<String>,
    pub name: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct NewConsumerReference {
    pub username: Option<String>,
    pub custom_id: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct NewPluginReference {
    pub api_id: Uuid,
    pub consumer_id: Option<Uuid>,
    pub name: String,
    #[serde(default = "default_config")]
    pub config: serde_json::Value,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

fn default_config() -> serde_json::Value {
    serde_json::json!({})
}

impl PgStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run pending migrations from the migrations/ directory.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    // -- API reference operations --

    pub async fn insert_api(&self, new: &NewApiReference) -> anyhow::Result<ApiReference> {
        let row = sqlx::query_as::<_, ApiReference>(&format!(
            "INSERT INTO api_references (target_url, public_dns, name, enabled) \
             VALUES ($1, $2, $3, $4) RETURNING {API_COLUMNS}"
        ))
        .bind(&new.target_url)
        .bind(&new.public_dns)
        .bind(&new.name)
        .bind(new.enabled)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn get_api(&self, id: Uuid) -> anyhow::Result<Option<ApiReference>> {
        let row = sqlx::query_as::<_, ApiReference>(&format!(
            "SELECT {API_COLUMNS} FROM api_references WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list_apis(&self) -> anyhow::Result<Vec<ApiReference>> {
        let rows = sqlx::query_as::<_, ApiReference>(&format!(
            "SELECT {API_COLUMNS} FROM api_references ORDER BY created_at ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Write the reference's current field values back, including sync state.
    pub async fn save_api(&self, reference: &ApiReference) -> anyhow::Result<()> {
        sqlx::query(
            "UPDATE api_references \
             SET target_url = $2, public_dns = $3, name = $4, enabled = $5, \
                 kong_id = $6, synchronized_at = $7, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(reference.id)
        .bind(&reference.target_url)
        .bind(&reference.public_dns)
        .bind(&reference.name)
        .bind(reference.enabled)
        .bind(reference.kong_id)
        .bind(reference.synchronized_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn delete_api(&self, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM api_references WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -- Consumer reference operations --

    pub async fn insert_consumer(
        &self,
        new: &NewConsumerReference,
    ) -> anyhow::Result<ConsumerReference> {
        let row = sqlx::query_as::<_, ConsumerReference>(&format!(
            "INSERT INTO consumer_references (username, custom_id, enabled) \
             VALUES ($1, $2, $3) RETURNING {CONSUMER_COLUMNS}"
        ))
        .bind(&new.username)
        .bind(&new.custom_id)
        .bind(new.enabled)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn get_consumer(&self, id: Uuid) -> anyhow::Result<Option<ConsumerReference>> {
        let row = sqlx::query_as::<_, ConsumerReference>(&format!(
            "SELECT {CONSUMER_COLUMNS} FROM consumer_references WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list_consumers(&self) -> anyhow::Result<Vec<ConsumerReference>> {
        let rows = sqlx::query_as::<_, ConsumerReference>(&format!(
            "SELECT {CONSUMER_COLUMNS} FROM consumer_references ORDER BY created_at ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn save_consumer(&self, reference: &ConsumerReference) -> anyhow::Result<()> {
        sqlx::query(
            "UPDATE consumer_references \
             SET username = $2, custom_id = $3, enabled = $4, \
                 kong_id = $5, synchronized_at = $6, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(reference.id)
        .bind(&reference.username)
        .bind(&reference.custom_id)
        .bind(reference.enabled)
        .bind(reference.kong_id)
        .bind(reference.synchronized_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn delete_consumer(&self, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM consumer_references WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -- Plugin configuration operations --

    pub async fn insert_plugin(
        &self,
        new: &NewPluginReference,
    ) -> anyhow::Result<PluginConfigurationReference> {
        let row = sqlx::query_as::<_, PluginConfigurationReference>(&format!(
            "INSERT INTO plugin_configuration_references (api_id, consumer_id, name, config, enabled) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {PLUGIN_COLUMNS}"
        ))
        .bind(new.api_id)
        .bind(new.consumer_id)
        .bind(&new.name)
        .bind(&new.config)
        .bind(new.enabled)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn get_plugin(
        &self,
        id: Uuid,
    ) -> anyhow::Result<Option<PluginConfigurationReference>> {
        let row = sqlx::query_as::<_, PluginConfigurationReference>(&format!(
            "SELECT {PLUGIN_COLUMNS} FROM plugin_configuration_references WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list_plugins(
        &self,
        api_id: Option<Uuid>,
    ) -> anyhow::Result<Vec<PluginConfigurationReference>> {
        let rows = match api_id {
            Some(api_id) => {
                sqlx::query_as::<_, PluginConfigurationReference>(&format!(
                    "SELECT {PLUGIN_COLUMNS} FROM plugin_configuration_references \
                     WHERE api_id = $1 ORDER BY created_at ASC"
                ))
                .bind(api_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, PluginConfigurationReference>(&format!(
                    "SELECT {PLUGIN_COLUMNS} FROM plugin_configuration_references \
                     ORDER BY created_at ASC"
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(rows)
    }

    pub async fn save_plugin(
        &self,
        reference: &PluginConfigurationReference,
    ) -> anyhow::Result<()> {
        sqlx::query(
            "UPDATE plugin_configuration_references \
             SET consumer_id = $2, name = $3, config = $4, enabled = $5, \
                 kong_id = $6, synchronized_at = $7, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(reference.id)
        .bind(reference.consumer_id)
        .bind(&reference.name)
        .bind(&reference.config)
        .bind(reference.enabled)
        .bind(reference.kong_id)
        .bind(reference.synchronized_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn delete_plugin(&self, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM plugin_configuration_references WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ReferenceStore for PgStore {
    async fn persist_api(&self, reference: &ApiReference) -> anyhow::Result<()> {
        self.save_api(reference).await
    }

    async fn persist_consumer(&self, reference: &ConsumerReference) -> anyhow::Result<()> {
        self.save_consumer(reference).await
    }

    async fn persist_plugin(
        &self,
        reference: &PluginConfigurationReference,
    ) -> anyhow::Result<()> {
        self.save_plugin(reference).await
    }

    async fn get_api(&self, id: Uuid) -> anyhow::Result<Option<ApiReference>> {
        PgStore::get_api(self, id).await
    }

    async fn get_consumer(&self, id: Uuid) -> anyhow::Result<Option<ConsumerReference>> {
        PgStore::get_consumer(self, id).await
    }
}
