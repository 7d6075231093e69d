use crate::traits::{ObjectBackend, ObjectStream, PutObjectOutput, StorageError, StorageResult};
use async_trait::async_trait;
use aws_config::retry::RetryConfig;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::operation::head_bucket::HeadBucketError;
use aws_sdk_s3::operation::head_object::HeadObjectError;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::{ByteStream, DateTime as AwsDateTime};
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use aws_sdk_s3::Client;
use bytes::Bytes;
use campus_core::models::{ObjectStat, StoredObject};
use campus_core::GatewayConfig;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt, TryStreamExt};
use std::collections::HashMap;
use std::time::Duration;

// Buckets in the default region must be created without a location constraint.
const DEFAULT_REGION: &str = "us-east-1";

/// S3-compatible backend (MinIO, AWS S3, ...) reached through `aws-sdk-s3`
#[derive(Clone)]
pub struct S3Backend {
    client: Client,
    endpoint_url: String,
}

impl S3Backend {
    /// Build a client from static credentials.
    ///
    /// Path-style addressing is forced so bucket names never become DNS
    /// labels, and SDK retries are disabled: retry policy belongs to callers.
    pub fn new(config: &GatewayConfig) -> StorageResult<Self> {
        config
            .validate()
            .map_err(|e| StorageError::Configuration(e.to_string()))?;

        let endpoint_url = config.endpoint_url();
        let credentials = Credentials::new(
            config.access_key.clone(),
            config.secret_key.clone(),
            None,
            None,
            "campus-static",
        );

        let s3_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&endpoint_url)
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .force_path_style(true)
            .retry_config(RetryConfig::disabled())
            .build();

        Ok(S3Backend {
            client: Client::from_conf(s3_config),
            endpoint_url,
        })
    }

    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }
}

fn to_chrono(value: &AwsDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(value.secs(), value.subsec_nanos())
}

fn clean_etag(etag: Option<&str>) -> Option<String> {
    etag.map(|t| t.trim_matches('"').to_string())
}

fn non_negative(value: Option<i64>) -> u64 {
    value.unwrap_or(0).max(0) as u64
}

#[async_trait]
impl ObjectBackend for S3Backend {
    async fn bucket_exists(&self, bucket: &str) -> StorageResult<bool> {
        match self.client.head_bucket().bucket(bucket).send().await {
            Ok(_) => Ok(true),
            Err(e) => match &e {
                SdkError::ServiceError(service_err)
                    if matches!(service_err.err(), HeadBucketError::NotFound(_))
                        || service_err.raw().status().as_u16() == 404 =>
                {
                    Ok(false)
                }
                _ => Err(StorageError::Backend(e.to_string())),
            },
        }
    }

    async fn make_bucket(&self, bucket: &str, region: &str) -> StorageResult<()> {
        let mut request = self.client.create_bucket().bucket(bucket);

        if region != DEFAULT_REGION {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(region))
                    .build(),
            );
        }

        request
            .send()
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(())
    }

    async fn set_bucket_policy(&self, bucket: &str, policy: &str) -> StorageResult<()> {
        self.client
            .put_bucket_policy()
            .bucket(bucket)
            .policy(policy)
            .send()
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: &str,
        metadata: HashMap<String, String>,
    ) -> StorageResult<PutObjectOutput> {
        let size = data.len() as i64;

        let output = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(data))
            .content_length(size)
            .content_type(content_type)
            .set_metadata(Some(metadata))
            .send()
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(PutObjectOutput {
            etag: clean_etag(output.e_tag()),
        })
    }

    async fn remove_object(&self, bucket: &str, key: &str) -> StorageResult<()> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(())
    }

    async fn stat_object(&self, bucket: &str, key: &str) -> StorageResult<ObjectStat> {
        match self.client.head_object().bucket(bucket).key(key).send().await {
            Ok(output) => Ok(ObjectStat {
                size: non_negative(output.content_length()),
                last_modified: output.last_modified().and_then(to_chrono),
                etag: clean_etag(output.e_tag()),
                content_type: output.content_type().map(str::to_string),
            }),
            Err(e) => match &e {
                SdkError::ServiceError(service_err) => match service_err.err() {
                    HeadObjectError::NotFound(_) => {
                        Err(StorageError::NotFound(format!("{}/{}", bucket, key)))
                    }
                    _ => Err(StorageError::Backend(e.to_string())),
                },
                _ => Err(StorageError::Backend(e.to_string())),
            },
        }
    }

    fn list_objects(&self, bucket: &str, prefix: Option<&str>, recursive: bool) -> ObjectStream {
        let client = self.client.clone();
        let bucket = bucket.to_string();
        let prefix = prefix.map(str::to_string);

        // State: Some(token) while pages remain; the first page has no token.
        let pages = stream::try_unfold(Some(None::<String>), move |state| {
            let client = client.clone();
            let bucket = bucket.clone();
            let prefix = prefix.clone();

            async move {
                let Some(token) = state else {
                    return Ok::<_, StorageError>(None);
                };

                let mut request = client
                    .list_objects_v2()
                    .bucket(&bucket)
                    .set_prefix(prefix)
                    .set_continuation_token(token);

                if !recursive {
                    request = request.delimiter("/");
                }

                let response = request.send().await.map_err(|e| {
                    tracing::error!(error = %e, bucket = %bucket, "S3 list_objects failed");
                    StorageError::Backend(e.to_string())
                })?;

                let objects: Vec<StoredObject> = response
                    .contents()
                    .iter()
                    .filter_map(|obj| {
                        let key = obj.key()?;
                        Some(StoredObject {
                            bucket: bucket.clone(),
                            key: key.to_string(),
                            size: non_negative(obj.size()),
                            last_modified: obj.last_modified().and_then(to_chrono),
                            etag: clean_etag(obj.e_tag()),
                        })
                    })
                    .collect();

                let next = if response.is_truncated().unwrap_or(false) {
                    response
                        .next_continuation_token()
                        .map(|t| Some(t.to_string()))
                } else {
                    None
                };

                Ok(Some((objects, next)))
            }
        });

        pages
            .map_ok(|objects| stream::iter(objects.into_iter().map(Ok::<_, StorageError>)))
            .try_flatten()
            .boxed()
    }

    async fn presigned_get_object(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        let presigning_config = PresigningConfig::expires_in(expires_in)
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        let presigned_request = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .presigned(presigning_config)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(presigned_request.uri().to_string())
    }
}
