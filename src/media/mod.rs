//! External media storage ("DMAPI").

use async_trait::async_trait;

mod dmapi;

pub use dmapi::DmapiClient;

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("media '{0}' not found")]
    NotFound(String),

    #[error("media service responded with {0}")]
    Upstream(reqwest::StatusCode),

    #[error("media service unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Media operations the route layer needs.
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn delete(&self, media_id: &str) -> Result<(), MediaError>;
}
