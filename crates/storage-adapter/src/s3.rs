//! AWS S3 object storage client
//!
//! Available with the `s3` feature. Credentials and retries come from the
//! standard AWS SDK configuration chain.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::Client as S3Client;
use tracing::debug;

use common::error::{Error, Result};

use crate::remote::{ObjectListing, ObjectStoreClient};
use crate::s3path::s3_path;

/// Largest page the list API returns
const MAX_PAGE_SIZE: usize = 1000;

/// Object storage client backed by the AWS SDK
#[derive(Clone)]
pub struct S3ObjectClient {
    client: S3Client,
}

impl S3ObjectClient {
    /// Creates a client from the default AWS configuration chain
    pub async fn from_env(region: Option<String>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(aws_config::Region::new(region));
        }
        let aws_config = loader.load().await;

        Self {
            client: S3Client::new(&aws_config),
        }
    }

    /// Wraps an existing SDK client
    pub fn from_client(client: S3Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStoreClient for S3ObjectClient {
    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        delimiter: Option<&str>,
        max_keys: usize,
    ) -> Result<ObjectListing> {
        let mut listing = ObjectListing::default();
        let mut continuation_token: Option<String> = None;

        loop {
            let returned = listing.keys.len() + listing.common_prefixes.len();
            if returned >= max_keys {
                break;
            }
            let page_size = (max_keys - returned).min(MAX_PAGE_SIZE);

            let mut request = self
                .client
                .list_objects_v2()
                .bucket(bucket)
                .prefix(prefix)
                .max_keys(page_size as i32);
            if let Some(delimiter) = delimiter {
                request = request.delimiter(delimiter);
            }
            if let Some(token) = continuation_token.take() {
                request = request.continuation_token(token);
            }

            let output = request
                .send()
                .await
                .map_err(|e| Error::backend(s3_path(bucket, prefix), e))?;

            for common_prefix in output.common_prefixes() {
                if let Some(p) = common_prefix.prefix() {
                    listing.common_prefixes.push(p.to_string());
                }
            }
            for object in output.contents() {
                if let Some(key) = object.key() {
                    listing.keys.push(key.to_string());
                }
            }

            match (output.is_truncated(), output.next_continuation_token()) {
                (Some(true), Some(token)) => continuation_token = Some(token.to_string()),
                _ => break,
            }
        }

        debug!(
            "Listed s3://{}/{}: {} prefixes, {} keys",
            bucket,
            prefix,
            listing.common_prefixes.len(),
            listing.keys.len()
        );

        Ok(listing)
    }

    async fn head_object(&self, bucket: &str, key: &str) -> Result<bool> {
        match self.client.head_object().bucket(bucket).key(key).send().await {
            Ok(_) => Ok(true),
            Err(err) => {
                if matches!(err.as_service_error(), Some(service_err) if service_err.is_not_found()) {
                    Ok(false)
                } else {
                    Err(Error::backend(s3_path(bucket, key), err))
                }
            }
        }
    }
}
