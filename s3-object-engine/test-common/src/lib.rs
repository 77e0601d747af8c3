/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Test helpers shared by the integration tests: an in-memory [`ObjectTransport`] that records
//! every call and can be told to fail, plus file fixtures.

use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use aws_smithy_types::byte_stream::ByteStream;
use bytes::{Bytes, BytesMut};
use s3_object_engine::error::BoxError;
use s3_object_engine::transport::{ETag, ObjectTransport};
use s3_object_engine::types::{ByteRange, CompletedPart, ObjectMetadata, ObjectPath, UploadedPart};
use tempfile::NamedTempFile;
use tokio::sync::RwLock;

/// A call made against [`InMemoryTransport`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GetObjectSize,
    ReadRange(Option<ByteRange>),
    InitiateMultipartUpload(ObjectMetadata),
    UploadPart(u64),
    ListParts,
    CompleteMultipartUpload(Vec<u64>),
    AbortMultipartUpload,
    PutObject(Option<ByteRange>),
    DeleteObject,
}

/// A call that should fail instead of succeeding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailOn {
    UploadPart(u64),
    /// ranged read starting at this offset
    ReadRange(u64),
    /// ranged put starting at this offset
    PutRange(u64),
    InitiateMultipartUpload,
    CompleteMultipartUpload,
    AbortMultipartUpload,
    DeleteObject,
}

#[derive(Debug)]
struct MultipartUpload {
    path: ObjectPath,
    parts: BTreeMap<u64, Bytes>,
}

#[derive(Debug, Default)]
struct State {
    objects: RwLock<HashMap<ObjectPath, Bytes>>,
    uploads: RwLock<HashMap<String, MultipartUpload>>,
    calls: Mutex<Vec<Call>>,
    failures: Mutex<Vec<FailOn>>,
    next_upload_id: AtomicU64,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    max_delay_ms: AtomicU64,
}

/// An in-memory object store implementing [`ObjectTransport`].
///
/// Clones share the same store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTransport {
    state: Arc<State>,
}

fn part_etag(part_number: u64, data: &[u8]) -> ETag {
    format!("\"part-{part_number}-{}\"", data.len())
}

struct InFlight<'a>(&'a State);

impl<'a> InFlight<'a> {
    fn enter(state: &'a State) -> Self {
        let now = state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        state.max_in_flight.fetch_max(now, Ordering::SeqCst);
        Self(state)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay part uploads and ranged reads by a random amount up to `max`
    pub fn with_random_delay(self, max: Duration) -> Self {
        self.state
            .max_delay_ms
            .store(max.as_millis() as u64, Ordering::SeqCst);
        self
    }

    /// Make the given call fail every time it is made
    pub fn fail_on(self, failure: FailOn) -> Self {
        self.state.failures.lock().unwrap().push(failure);
        self
    }

    pub async fn insert_object(&self, path: &ObjectPath, data: impl Into<Bytes>) {
        self.state
            .objects
            .write()
            .await
            .insert(path.clone(), data.into());
    }

    pub async fn object(&self, path: &ObjectPath) -> Option<Bytes> {
        self.state.objects.read().await.get(path).cloned()
    }

    /// Number of multipart uploads neither completed nor aborted
    pub async fn pending_uploads(&self) -> usize {
        self.state.uploads.read().await.len()
    }

    /// Start a multipart upload directly, as an earlier interrupted transfer would have
    pub async fn seed_upload(
        &self,
        path: &ObjectPath,
        parts: impl IntoIterator<Item = (u64, Bytes)>,
    ) -> String {
        let upload_id = self.new_upload_id();
        self.state.uploads.write().await.insert(
            upload_id.clone(),
            MultipartUpload {
                path: path.clone(),
                parts: parts.into_iter().collect(),
            },
        );
        upload_id
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.calls.lock().unwrap().clone()
    }

    /// Number of recorded calls matching `predicate`
    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|call| predicate(call)).count()
    }

    /// The most part uploads or ranged reads that were running at the same time
    pub fn max_in_flight(&self) -> usize {
        self.state.max_in_flight.load(Ordering::SeqCst)
    }

    fn record(&self, call: Call) {
        self.state.calls.lock().unwrap().push(call);
    }

    fn check(&self, failure: FailOn) -> Result<(), BoxError> {
        if self.state.failures.lock().unwrap().contains(&failure) {
            return Err(format!("injected failure: {failure:?}").into());
        }
        Ok(())
    }

    fn new_upload_id(&self) -> String {
        let id = self.state.next_upload_id.fetch_add(1, Ordering::SeqCst);
        format!("upload-{id}")
    }

    async fn random_delay(&self) {
        let max = self.state.max_delay_ms.load(Ordering::SeqCst);
        if max > 0 {
            tokio::time::sleep(Duration::from_millis(fastrand::u64(0..=max))).await;
        }
    }
}

#[async_trait]
impl ObjectTransport for InMemoryTransport {
    async fn get_object_size(&self, path: &ObjectPath) -> Result<u64, BoxError> {
        self.record(Call::GetObjectSize);
        let objects = self.state.objects.read().await;
        let data = objects.get(path).ok_or("no such key")?;
        Ok(data.len() as u64)
    }

    async fn read_range(
        &self,
        path: &ObjectPath,
        range: Option<ByteRange>,
    ) -> Result<ByteStream, BoxError> {
        self.record(Call::ReadRange(range));
        let _in_flight = InFlight::enter(&self.state);
        self.random_delay().await;
        if let Some(range) = range {
            self.check(FailOn::ReadRange(range.start()))?;
        }

        let objects = self.state.objects.read().await;
        let data = objects.get(path).ok_or("no such key")?;
        let data = match range {
            Some(range) => {
                let start = range.start() as usize;
                let end = (range.end() as usize + 1).min(data.len());
                if start >= data.len() {
                    return Err("invalid range".into());
                }
                data.slice(start..end)
            }
            None => data.clone(),
        };
        Ok(ByteStream::from(data))
    }

    async fn initiate_multipart_upload(
        &self,
        path: &ObjectPath,
        metadata: &ObjectMetadata,
    ) -> Result<String, BoxError> {
        self.record(Call::InitiateMultipartUpload(metadata.clone()));
        self.check(FailOn::InitiateMultipartUpload)?;
        let upload_id = self.new_upload_id();
        self.state.uploads.write().await.insert(
            upload_id.clone(),
            MultipartUpload {
                path: path.clone(),
                parts: BTreeMap::new(),
            },
        );
        Ok(upload_id)
    }

    async fn upload_part(
        &self,
        _path: &ObjectPath,
        upload_id: &str,
        part_number: u64,
        data: Bytes,
    ) -> Result<ETag, BoxError> {
        self.record(Call::UploadPart(part_number));
        let _in_flight = InFlight::enter(&self.state);
        self.random_delay().await;
        self.check(FailOn::UploadPart(part_number))?;

        let e_tag = part_etag(part_number, &data);
        let mut uploads = self.state.uploads.write().await;
        let upload = uploads.get_mut(upload_id).ok_or("no such upload")?;
        upload.parts.insert(part_number, data);
        Ok(e_tag)
    }

    async fn list_parts(
        &self,
        _path: &ObjectPath,
        upload_id: &str,
    ) -> Result<Vec<UploadedPart>, BoxError> {
        self.record(Call::ListParts);
        let uploads = self.state.uploads.read().await;
        let upload = uploads.get(upload_id).ok_or("no such upload")?;
        Ok(upload
            .parts
            .iter()
            .map(|(part_number, data)| UploadedPart {
                part_number: *part_number,
                e_tag: part_etag(*part_number, data),
                size: data.len() as u64,
            })
            .collect())
    }

    async fn complete_multipart_upload(
        &self,
        _path: &ObjectPath,
        upload_id: &str,
        parts: &[CompletedPart],
    ) -> Result<ETag, BoxError> {
        self.record(Call::CompleteMultipartUpload(
            parts.iter().map(|part| part.part_number).collect(),
        ));
        self.check(FailOn::CompleteMultipartUpload)?;

        if parts.windows(2).any(|w| w[0].part_number >= w[1].part_number) {
            return Err("parts must be in ascending order".into());
        }

        let mut uploads = self.state.uploads.write().await;
        let upload = uploads.remove(upload_id).ok_or("no such upload")?;
        let mut combined = BytesMut::new();
        for part in parts {
            let data = upload
                .parts
                .get(&part.part_number)
                .ok_or_else(|| format!("no such part {}", part.part_number))?;
            if part_etag(part.part_number, data) != part.e_tag {
                return Err(format!("etag mismatch for part {}", part.part_number).into());
            }
            combined.extend_from_slice(data);
        }

        self.state
            .objects
            .write()
            .await
            .insert(upload.path, combined.freeze());
        Ok(format!("\"complete-{}\"", parts.len()))
    }

    async fn abort_multipart_upload(
        &self,
        _path: &ObjectPath,
        upload_id: &str,
    ) -> Result<(), BoxError> {
        self.record(Call::AbortMultipartUpload);
        self.check(FailOn::AbortMultipartUpload)?;
        self.state
            .uploads
            .write()
            .await
            .remove(upload_id)
            .ok_or("no such upload")?;
        Ok(())
    }

    async fn put_object(
        &self,
        path: &ObjectPath,
        data: Bytes,
        range: Option<ByteRange>,
        _metadata: Option<&ObjectMetadata>,
    ) -> Result<Option<ETag>, BoxError> {
        self.record(Call::PutObject(range));
        let mut objects = self.state.objects.write().await;
        match range {
            None => {
                let e_tag = format!("\"object-{}\"", data.len());
                objects.insert(path.clone(), data);
                Ok(Some(e_tag))
            }
            Some(range) => {
                self.check(FailOn::PutRange(range.start()))?;
                let existing = objects.get(path).ok_or("no such key")?;
                let start = range.start() as usize;
                if start > existing.len() || range.len() != data.len() as u64 {
                    return Err("invalid range".into());
                }
                let end = start + data.len();
                let mut updated = BytesMut::from(&existing[..]);
                if updated.len() < end {
                    updated.resize(end, 0);
                }
                updated[start..end].copy_from_slice(&data);
                objects.insert(path.clone(), updated.freeze());
                Ok(None)
            }
        }
    }

    async fn delete_object(&self, path: &ObjectPath) -> Result<(), BoxError> {
        self.record(Call::DeleteObject);
        self.check(FailOn::DeleteObject)?;
        self.state.objects.write().await.remove(path);
        Ok(())
    }
}

/// Random bytes of the given size
pub fn random_bytes(size: usize) -> Bytes {
    let mut data = vec![0u8; size];
    fastrand::fill(&mut data);
    Bytes::from(data)
}

/// Create a temporary file of `size` random bytes, returning the file and its contents
pub fn create_test_file(size: usize) -> (NamedTempFile, Bytes) {
    let data = random_bytes(size);
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(&data).unwrap();
    file.flush().unwrap();
    (file, data)
}
