use std::fmt::Debug;

use anyhow::Context;
use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use axum::body::Bytes;
use serde::Deserialize;
use tracing::info;

/// An uploaded image file as received from a multipart form.
#[derive(Clone, Debug)]
pub struct ImageFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl ImageFile {
    pub fn extension(&self) -> &str {
        let from_name = self
            .file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty() && ext.chars().all(char::is_alphanumeric));

        if let Some(ext) = from_name {
            return ext;
        }

        match self.content_type.as_deref() {
            Some("image/png") => "png",
            Some("image/jpeg") => "jpg",
            Some("image/gif") => "gif",
            Some("image/webp") => "webp",
            Some("image/svg+xml") => "svg",
            _ => "bin",
        }
    }
}

/// External host that stores images and hands back a public URL.
#[async_trait]
pub trait ImageHost: Send + Sync + Debug {
    async fn upload(&self, image: ImageFile) -> anyhow::Result<String>;
}

/// `[media]` table of `Config.toml`.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Media {
    /// Key prefix inside the bucket.
    pub folder: String,
    /// Public base URL the bucket is served from.
    pub public_url: String,
}

impl Default for Media {
    fn default() -> Self {
        Self {
            folder: "DevEvent".to_string(),
            public_url: "http://localhost:9000/devevent".to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct S3ImageHost {
    s3: aws_sdk_s3::Client,
    bucket: String,
    media: Media,
}

impl S3ImageHost {
    pub fn new(s3: aws_sdk_s3::Client, bucket: String, media: Media) -> Self {
        Self { s3, bucket, media }
    }

    fn key_for(&self, image: &ImageFile) -> String {
        format!(
            "{}/{}.{}",
            self.media.folder.trim_matches('/'),
            uuid::Uuid::new_v4(),
            image.extension().to_lowercase()
        )
    }
}

#[async_trait]
impl ImageHost for S3ImageHost {
    async fn upload(&self, image: ImageFile) -> anyhow::Result<String> {
        let key = self.key_for(&image);
        let content_type = image
            .content_type
            .clone()
            .unwrap_or_else(|| "application/octet-stream".to_string());

        self.s3
            .put_object()
            .bucket(&self.bucket)
            .content_type(content_type)
            .key(&key)
            .body(ByteStream::from(image.bytes))
            .send()
            .await
            .context("failed to put object")?;

        let url =
            format!("{}/{}", self.media.public_url.trim_end_matches('/'), key);
        info!(task = "image uploaded", url = %url);

        Ok(url)
    }
}
