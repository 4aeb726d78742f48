//! Retrieval of image bytes.
//!
//! Supports absolute `http(s)` URLs, URLs relative to the API base
//! (e.g. `/api/placeholder/300/300`), and inline `data:` URLs.

use async_trait::async_trait;
use base64::Engine;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::config::ApiSettings;

/// Why a single retrieval failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError(pub String);

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for FetchError {}

/// Anything that can turn an image URL into its bytes
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// HTTP implementation of [`AssetFetcher`]
#[derive(Debug, Clone)]
pub struct HttpAssetFetcher {
    client: reqwest::Client,
    /// Base that relative URLs are resolved against
    base: Option<Url>,
}

impl HttpAssetFetcher {
    pub fn new(settings: &ApiSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(settings.connect_timeout))
            .build()
            .map_err(|e| FetchError(e.to_string()))?;
        Ok(Self::with_client(client, asset_base(&settings.base_url)))
    }

    pub fn with_client(client: reqwest::Client, base: Option<Url>) -> Self {
        Self { client, base }
    }

    /// Resolve `url` against the base address when it is relative
    pub fn resolve(&self, url: &str) -> Result<Url, FetchError> {
        match Url::parse(url) {
            Ok(absolute) => Ok(absolute),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let base = self
                    .base
                    .as_ref()
                    .ok_or_else(|| FetchError(format!("relative URL '{}' without a base", url)))?;
                base.join(url).map_err(|e| FetchError(e.to_string()))
            }
            Err(e) => Err(FetchError(e.to_string())),
        }
    }
}

#[async_trait]
impl AssetFetcher for HttpAssetFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        if url.starts_with("data:") {
            return decode_data_url(url);
        }

        let target = self.resolve(url)?;
        debug!(url = %target, "fetching image");

        let response = self
            .client
            .get(target)
            .send()
            .await
            .map_err(|e| FetchError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError(format!("HTTP {}", status.as_u16())));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

/// Parse the API base as a directory so relative joins keep its path prefix
fn asset_base(base_url: &str) -> Option<Url> {
    Url::parse(&format!("{}/", base_url.trim().trim_end_matches('/'))).ok()
}

/// Decode a `data:[<mediatype>][;base64],<payload>` URL
pub fn decode_data_url(url: &str) -> Result<Vec<u8>, FetchError> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| FetchError("not a data URL".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| FetchError("data URL has no payload".to_string()))?;

    if header.ends_with(";base64") {
        base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| FetchError(format!("bad base64 payload: {}", e)))
    } else {
        Ok(payload.as_bytes().to_vec())
    }
}
