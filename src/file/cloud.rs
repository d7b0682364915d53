//! Remote asset host storage (Cloudinary-compatible upload API).
//!
//! Uploads go to `{api_base}/{cloud_name}/auto/upload` as signed multipart
//! requests; deletions go to `{api_base}/{cloud_name}/{resource_type}/destroy`.
//! Requests are signed with SHA-256 over the sorted parameters followed by
//! the API secret.

use std::time::Duration;

use chrono::Utc;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::config::CloudConfig;
use crate::{Result, ShareError};

/// An asset stored on the remote host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudAsset {
    /// Public id (includes the folder prefix).
    pub public_id: String,
    /// HTTPS delivery URL.
    pub secure_url: String,
    /// Resource type the host assigned (image, video, raw).
    pub resource_type: String,
}

#[derive(Debug, Deserialize)]
struct UploadReply {
    public_id: String,
    secure_url: String,
    resource_type: String,
}

#[derive(Debug, Deserialize)]
struct DestroyReply {
    result: String,
}

#[derive(Debug, Deserialize)]
struct ErrorReply {
    error: ErrorMessage,
}

#[derive(Debug, Deserialize)]
struct ErrorMessage {
    message: String,
}

/// Client for the remote asset host.
#[derive(Debug, Clone)]
pub struct CloudStorage {
    client: reqwest::Client,
    config: CloudConfig,
}

impl CloudStorage {
    /// Create a client from configuration.
    pub fn new(config: &CloudConfig) -> Result<Self> {
        if !config.has_credentials() {
            return Err(ShareError::Config(
                "asset host credentials are not configured".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Upload content and return the stored asset.
    pub async fn upload(
        &self,
        content: &[u8],
        original_name: &str,
        content_type: &str,
    ) -> Result<CloudAsset> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = sign(
            &[
                ("folder", self.config.folder.as_str()),
                ("timestamp", timestamp.as_str()),
            ],
            &self.config.api_secret,
        );

        let part = Part::bytes(content.to_vec())
            .file_name(original_name.to_string())
            .mime_str(content_type)?;

        let form = Form::new()
            .part("file", part)
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", self.config.folder.clone())
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        let url = format!(
            "{}/{}/auto/upload",
            self.config.api_base.trim_end_matches('/'),
            self.config.cloud_name
        );

        tracing::debug!(url = %url, name = %original_name, "Uploading to asset host");

        let response = self.client.post(&url).multipart(form).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ShareError::Storage(format!(
                "asset host rejected upload ({status}): {}",
                error_message(&body)
            )));
        }

        let reply: UploadReply = response.json().await?;

        Ok(CloudAsset {
            public_id: reply.public_id,
            secure_url: reply.secure_url,
            resource_type: reply.resource_type,
        })
    }

    /// Delete an asset.
    ///
    /// # Returns
    ///
    /// `true` if the host deleted it, `false` if it was already gone.
    pub async fn destroy(&self, public_id: &str, resource_type: &str) -> Result<bool> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = sign(
            &[("public_id", public_id), ("timestamp", timestamp.as_str())],
            &self.config.api_secret,
        );

        let url = format!(
            "{}/{}/{}/destroy",
            self.config.api_base.trim_end_matches('/'),
            self.config.cloud_name,
            resource_type
        );

        let params = [
            ("public_id", public_id),
            ("api_key", self.config.api_key.as_str()),
            ("timestamp", timestamp.as_str()),
            ("signature", signature.as_str()),
            ("signature_algorithm", "sha256"),
        ];

        let response = self.client.post(&url).form(&params).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ShareError::Storage(format!(
                "asset host rejected delete ({status}): {}",
                error_message(&body)
            )));
        }

        let reply: DestroyReply = response.json().await?;
        match reply.result.as_str() {
            "ok" => Ok(true),
            "not found" => Ok(false),
            other => Err(ShareError::Storage(format!(
                "unexpected delete result: {other}"
            ))),
        }
    }
}

/// Compute a request signature.
///
/// Parameters are sorted by key, joined as `key=value` with `&`, the secret
/// is appended and the result hashed with SHA-256 (lowercase hex).
pub fn sign(params: &[(&str, &str)], secret: &str) -> String {
    let mut sorted: Vec<&(&str, &str)> = params.iter().filter(|(_, v)| !v.is_empty()).collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let to_sign = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let digest = Sha256::digest(format!("{to_sign}{secret}").as_bytes());
    format!("{digest:x}")
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorReply>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string())
}
