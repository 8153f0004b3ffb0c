pub mod api;
pub mod consumer;
pub mod plugin;

pub use api::ApiReference;
pub use consumer::ConsumerReference;
pub use plugin::PluginConfigurationReference;
