use async_trait::async_trait;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, warn};

use crate::backends::traits::ObjectStorage;
use crate::constants::HTTP_TIMEOUT_SECS;
use crate::models::ObjectKey;
use crate::utils::errors::{Result, RosterError};

// Object names go into a single path segment, so '/' must be escaped too
const OBJECT_NAME: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StorageObject {
    name: String,
    #[serde(default)]
    download_tokens: Option<String>,
}

/// Firebase Storage bucket accessed over its REST upload endpoint.
#[derive(Debug, Clone)]
pub struct FirebaseStorage {
    client: reqwest::Client,
    base_url: String,
    bucket: String,
}

impl FirebaseStorage {
    pub fn new(base_url: impl Into<String>, bucket: impl Into<String>) -> Result<Self> {
        let bucket = bucket.into();
        if bucket.is_empty() {
            return Err(RosterError::Configuration(
                "storage bucket is not set".to_string(),
            ));
        }

        // Large videos need more than the default request timeout
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS * 4))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bucket,
        })
    }

    pub fn download_url(&self, name: &str, token: Option<&str>) -> String {
        let mut url = format!(
            "{}/v0/b/{}/o/{}?alt=media",
            self.base_url,
            self.bucket,
            utf8_percent_encode(name, OBJECT_NAME)
        );
        if let Some(token) = token {
            url.push_str("&token=");
            url.push_str(token);
        }
        url
    }
}

#[async_trait]
impl ObjectStorage for FirebaseStorage {
    async fn upload(&self, key: &ObjectKey, bytes: Vec<u8>, content_type: &str) -> Result<String> {
        let url = format!("{}/v0/b/{}/o", self.base_url, self.bucket);
        let size = bytes.len();

        let response = self
            .client
            .post(&url)
            .query(&[("uploadType", "media"), ("name", key.as_str())])
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Upload of {} failed with status {}: {}", key, status, body);
            return Err(match status.as_u16() {
                401 | 403 => RosterError::PermissionDenied(format!("upload of {}: {}", key, body)),
                _ => RosterError::Upload(format!("{} - {}", status, body)),
            });
        }

        let object: StorageObject = response.json().await?;
        let token = object
            .download_tokens
            .as_deref()
            .and_then(|tokens| tokens.split(',').next())
            .filter(|t| !t.is_empty());

        info!("Uploaded {} ({} bytes) to bucket {}", object.name, size, self.bucket);
        Ok(self.download_url(&object.name, token))
    }

    fn name(&self) -> &str {
        "firebase-storage"
    }
}
