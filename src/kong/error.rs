use thiserror::Error;

/// Errors surfaced by the Kong admin client.
///
/// 404 and 409 get their own variants so callers can match on them; every
/// other non-2xx status lands in `Remote` with the body verbatim. No retry
/// happens at this layer.
#[derive(Debug, Error)]
pub enum KongError {
    #[error("kong resource not found: {0}")]
    NotFound(String),

    #[error("kong rejected the request as conflicting: {0}")]
    Conflict(String),

    #[error("kong admin API returned {status}: {body}")]
    Remote { status: u16, body: String },

    #[error("transport error talking to kong: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to decode kong response: {0}")]
    Decode(String),

    #[error("invalid kong client configuration: {0}")]
    InvalidConfig(String),
}
