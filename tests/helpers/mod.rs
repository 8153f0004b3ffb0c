pub mod memory_store;

use chrono::Utc;
use uuid::Uuid;

use kongbridge::models::{ApiReference, ConsumerReference, PluginConfigurationReference};

/// Build an API reference the way the service would after a local create.
pub fn api_reference(target_url: &str, public_dns: Option<&str>) -> ApiReference {
    ApiReference {
        id: Uuid::new_v4(),
        kong_id: None,
        target_url: target_url.to_string(),
        public_dns: public_dns.map(String::from),
        name: None,
        enabled: true,
        synchronized_at: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn consumer_reference(username: Option<&str>) -> ConsumerReference {
    ConsumerReference {
        id: Uuid::new_v4(),
        kong_id: None,
        username: username.map(String::from),
        custom_id: None,
        enabled: true,
        synchronized_at: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn plugin_reference(api_id: Uuid, name: &str) -> PluginConfigurationReference {
    PluginConfigurationReference {
        id: Uuid::new_v4(),
        kong_id: None,
        api_id,
        consumer_id: None,
        name: name.to_string(),
        config: serde_json::json!({}),
        enabled: true,
        synchronized_at: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}
