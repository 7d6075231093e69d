//! Mock object backend implementation for testing

use crate::traits::{ObjectBackend, ObjectStream, PutObjectOutput, StorageError, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;
use campus_core::models::{ObjectStat, StoredObject};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct MockObject {
    pub data: Bytes,
    pub content_type: String,
    pub metadata: HashMap<String, String>,
    pub last_modified: Option<DateTime<Utc>>,
    pub etag: String,
}

#[derive(Default)]
struct MockState {
    buckets: BTreeMap<String, BTreeMap<String, MockObject>>,
    policies: HashMap<String, String>,
    failing_make_bucket: HashSet<String>,
    failing_remove: HashSet<(String, String)>,
    failing_list: HashSet<String>,
    failing_stat: HashSet<(String, String)>,
    stat_calls: usize,
    etag_counter: usize,
}

/// Mock backend that keeps buckets and objects in memory
#[derive(Default)]
pub struct MockBackend {
    state: Mutex<MockState>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with the given buckets already present
    pub fn with_buckets(buckets: &[&str]) -> Self {
        let backend = Self::new();
        for bucket in buckets {
            backend.create_bucket(bucket);
        }
        backend
    }

    pub fn create_bucket(&self, bucket: &str) {
        self.state
            .lock()
            .unwrap()
            .buckets
            .entry(bucket.to_string())
            .or_default();
    }

    pub fn has_bucket(&self, bucket: &str) -> bool {
        self.state.lock().unwrap().buckets.contains_key(bucket)
    }

    /// Insert an object directly, bypassing `put_object`
    pub fn insert_object(
        &self,
        bucket: &str,
        key: &str,
        size: usize,
        last_modified: Option<DateTime<Utc>>,
    ) {
        let mut state = self.state.lock().unwrap();
        state.etag_counter += 1;
        let etag = format!("etag-{}", state.etag_counter);
        state.buckets.entry(bucket.to_string()).or_default().insert(
            key.to_string(),
            MockObject {
                data: Bytes::from(vec![0u8; size]),
                content_type: "application/octet-stream".to_string(),
                metadata: HashMap::new(),
                last_modified,
                etag,
            },
        );
    }

    pub fn has_object(&self, bucket: &str, key: &str) -> bool {
        self.object(bucket, key).is_some()
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<MockObject> {
        self.state
            .lock()
            .unwrap()
            .buckets
            .get(bucket)
            .and_then(|objects| objects.get(key))
            .cloned()
    }

    pub fn object_count(&self, bucket: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .buckets
            .get(bucket)
            .map(|objects| objects.len())
            .unwrap_or(0)
    }

    pub fn policy(&self, bucket: &str) -> Option<String> {
        self.state.lock().unwrap().policies.get(bucket).cloned()
    }

    pub fn fail_make_bucket(&self, bucket: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_make_bucket
            .insert(bucket.to_string());
    }

    pub fn fail_remove(&self, bucket: &str, key: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_remove
            .insert((bucket.to_string(), key.to_string()));
    }

    pub fn fail_list(&self, bucket: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_list
            .insert(bucket.to_string());
    }

    pub fn fail_stat(&self, bucket: &str, key: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_stat
            .insert((bucket.to_string(), key.to_string()));
    }

    /// Number of `stat_object` calls received so far
    pub fn stat_calls(&self) -> usize {
        self.state.lock().unwrap().stat_calls
    }
}

#[async_trait]
impl ObjectBackend for MockBackend {
    async fn bucket_exists(&self, bucket: &str) -> StorageResult<bool> {
        Ok(self.has_bucket(bucket))
    }

    async fn make_bucket(&self, bucket: &str, _region: &str) -> StorageResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.failing_make_bucket.contains(bucket) {
            return Err(StorageError::Backend(format!(
                "AccessDenied: cannot create bucket {}",
                bucket
            )));
        }
        state.buckets.entry(bucket.to_string()).or_default();
        Ok(())
    }

    async fn set_bucket_policy(&self, bucket: &str, policy: &str) -> StorageResult<()> {
        let mut state = self.state.lock().unwrap();
        if !state.buckets.contains_key(bucket) {
            return Err(StorageError::Backend(format!("NoSuchBucket: {}", bucket)));
        }
        state
            .policies
            .insert(bucket.to_string(), policy.to_string());
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
        let mut state = self.state.lock().unwrap();
        state.etag_counter += 1;
        let etag = format!("etag-{}", state.etag_counter);
        let objects = state
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| StorageError::Backend(format!("NoSuchBucket: {}", bucket)))?;
        objects.insert(
            key.to_string(),
            MockObject {
                data,
                content_type: content_type.to_string(),
                metadata,
                last_modified: Some(Utc::now()),
                etag: etag.clone(),
            },
        );
        Ok(PutObjectOutput { etag: Some(etag) })
    }

    async fn remove_object(&self, bucket: &str, key: &str) -> StorageResult<()> {
        let mut state = self.state.lock().unwrap();
        if state
            .failing_remove
            .contains(&(bucket.to_string(), key.to_string()))
        {
            return Err(StorageError::Backend(format!(
                "AccessDenied: cannot remove {}/{}",
                bucket, key
            )));
        }
        if let Some(objects) = state.buckets.get_mut(bucket) {
            objects.remove(key);
        }
        Ok(())
    }

    async fn stat_object(&self, bucket: &str, key: &str) -> StorageResult<ObjectStat> {
        let mut state = self.state.lock().unwrap();
        state.stat_calls += 1;
        if state
            .failing_stat
            .contains(&(bucket.to_string(), key.to_string()))
        {
            return Err(StorageError::Backend("connection reset".to_string()));
        }
        state
            .buckets
            .get(bucket)
            .and_then(|objects| objects.get(key))
            .map(|obj| ObjectStat {
                size: obj.data.len() as u64,
                last_modified: obj.last_modified,
                etag: Some(obj.etag.clone()),
                content_type: Some(obj.content_type.clone()),
            })
            .ok_or_else(|| StorageError::NotFound(format!("{}/{}", bucket, key)))
    }

    fn list_objects(&self, bucket: &str, prefix: Option<&str>, recursive: bool) -> ObjectStream {
        let state = self.state.lock().unwrap();

        if state.failing_list.contains(bucket) {
            let err = StorageError::Backend(format!("listing interrupted for {}", bucket));
            return stream::iter(vec![Err(err)]).boxed();
        }

        let Some(objects) = state.buckets.get(bucket) else {
            let err = StorageError::Backend(format!("NoSuchBucket: {}", bucket));
            return stream::iter(vec![Err(err)]).boxed();
        };

        let prefix = prefix.unwrap_or("");
        let listed: Vec<StorageResult<StoredObject>> = objects
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .filter(|(key, _)| recursive || !key[prefix.len()..].contains('/'))
            .map(|(key, obj)| {
                Ok(StoredObject {
                    bucket: bucket.to_string(),
                    key: key.clone(),
                    size: obj.data.len() as u64,
                    last_modified: obj.last_modified,
                    etag: Some(obj.etag.clone()),
                })
            })
            .collect();

        stream::iter(listed).boxed()
    }

    async fn presigned_get_object(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        if !self.has_bucket(bucket) {
            return Err(StorageError::Backend(format!("NoSuchBucket: {}", bucket)));
        }
        Ok(format!(
            "http://mock-storage/{}/{}?X-Amz-Expires={}",
            bucket,
            key,
            expires_in.as_secs()
        ))
    }
}
