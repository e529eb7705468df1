use anyhow::Context;
use async_trait::async_trait;
use aws_config::{defaults, BehaviorVersion};
use aws_credential_types::Credentials;
use aws_sdk_s3::{
    config::{Builder as S3ConfigBuilder, Region},
    Client,
};
use aws_smithy_types::byte_stream::ByteStream;
use bytes::Bytes;

use crate::config::ImageHostConfig;

/// External image host. Production talks to an S3-compatible store; tests
/// substitute a fake.
#[async_trait]
pub trait ImageHost: Send + Sync {
    /// Store the object under `key` and return its public URL.
    async fn upload_image(
        &self,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> anyhow::Result<String>;
}

#[derive(Clone)]
pub struct S3ImageHost {
    client: Client,
    endpoint: String,
    bucket: String,
}

impl S3ImageHost {
    pub async fn new(config: &ImageHostConfig) -> anyhow::Result<Self> {
        let shared = defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(Credentials::new(
                config.access_key.as_str(),
                config.secret_key.as_str(),
                None,
                None,
                "static",
            ))
            .endpoint_url(&config.endpoint)
            .load()
            .await;

        // MinIO and friends only speak path-style addressing.
        let conf = S3ConfigBuilder::from(&shared)
            .endpoint_url(&config.endpoint)
            .force_path_style(true)
            .build();

        Ok(Self {
            client: Client::from_conf(conf),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            bucket: config.bucket.clone(),
        })
    }
}

#[async_trait]
impl ImageHost for S3ImageHost {
    async fn upload_image(
        &self,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> anyhow::Result<String> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .context("s3 put_object")?;

        Ok(format!("{}/{}/{}", self.endpoint, self.bucket, key))
    }
}

/// File extension for an accepted avatar content type. Anything outside the
/// allowlist is rejected.
pub fn ext_from_mime(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/png" => Some("png"),
        "image/jpeg" => Some("jpg"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

#[cfg(test)]
mod storage_tests {
    use super::*;

    #[test]
    fn ext_from_mime_allows_only_the_avatar_formats() {
        assert_eq!(ext_from_mime("image/png"), Some("png"));
        assert_eq!(ext_from_mime("image/jpeg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/webp"), Some("webp"));
        assert_eq!(ext_from_mime("image/gif"), None);
        assert_eq!(ext_from_mime("text/plain"), None);
        assert_eq!(ext_from_mime(""), None);
    }
}
