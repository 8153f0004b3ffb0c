//! Client for the Kong admin REST API.

pub mod client;
pub mod error;
pub mod objects;

pub use client::KongClient;
pub use error::KongError;
