use async_trait::async_trait;
use reqwest::StatusCode;
use url::Url;

use super::{MediaError, MediaStore};
use crate::config::MediaConfig;
use crate::service_token::{self, ServiceToken};

/// HTTP client for the DMAPI media service.
pub struct DmapiClient {
    http: reqwest::Client,
    base_url: Url,
    service_token: Option<ServiceToken>,
}

impl DmapiClient {
    pub fn new(http: reqwest::Client, base_url: Url, service_token: Option<ServiceToken>) -> Self {
        Self {
            http,
            base_url,
            service_token,
        }
    }

    pub fn from_config(config: &MediaConfig, service_token: Option<ServiceToken>) -> Self {
        Self::new(reqwest::Client::new(), config.base_url.clone(), service_token)
    }

    fn media_url(&self, media_id: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("media").push(media_id);
        }
        url
    }
}

#[async_trait]
impl MediaStore for DmapiClient {
    async fn delete(&self, media_id: &str) -> Result<(), MediaError> {
        let request = self.http.delete(self.media_url(media_id));
        let response = service_token::authorize(request, self.service_token.as_ref())
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                tracing::info!("Deleted media {}", media_id);
                Ok(())
            }
            StatusCode::NOT_FOUND => Err(MediaError::NotFound(media_id.to_string())),
            status => Err(MediaError::Upstream(status)),
        }
    }
}
