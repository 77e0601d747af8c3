/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::auth::{Signer, SigningConfig};
use crate::error::{self, Error};
use crate::progress::ProgressListener;
use crate::runtime::WorkerPool;
use crate::transport::ObjectTransport;
use crate::types::{ConcurrencySetting, FailedMultipartUploadPolicy, PartSize, UploadMode};
use crate::MEBIBYTE;
use std::cmp;
use std::sync::Arc;
use url::Url;

/// Load configuration from the environment
pub mod loader;

/// Minimum upload part size in bytes
pub(crate) const MIN_UPLOAD_PART_SIZE_BYTES: u64 = 4 * MEBIBYTE;

/// Minimum download part size in bytes
pub(crate) const MIN_DOWNLOAD_PART_SIZE_BYTES: u64 = 2 * MEBIBYTE;

/// Configuration for a [`Client`](crate::client::Client)
#[derive(Debug, Clone)]
pub struct Config {
    multipart_threshold: PartSize,
    upload_part_size: PartSize,
    download_part_size: PartSize,
    parallel_download_threshold: PartSize,
    concurrency: ConcurrencySetting,
    worker_pool: Option<WorkerPool>,
    progress_listener: Option<Arc<dyn ProgressListener>>,
    failed_multipart_upload_policy: FailedMultipartUploadPolicy,
    upload_mode: UploadMode,
    transport: Arc<dyn ObjectTransport>,
    signer: Option<Signer>,
    endpoint: Option<Url>,
    min_upload_part_size: u64,
    min_download_part_size: u64,
}

impl Config {
    /// Create a new `Config` builder
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Returns a reference to the multipart upload threshold
    pub fn multipart_threshold(&self) -> &PartSize {
        &self.multipart_threshold
    }

    /// Returns a reference to the target part size for uploads
    pub fn upload_part_size(&self) -> &PartSize {
        &self.upload_part_size
    }

    /// Returns a reference to the target part size for downloads
    pub fn download_part_size(&self) -> &PartSize {
        &self.download_part_size
    }

    /// Returns a reference to the object size at which downloads switch to parallel ranged GETs
    pub fn parallel_download_threshold(&self) -> &PartSize {
        &self.parallel_download_threshold
    }

    /// Returns the number of workers used by each transfer that doesn't share a caller pool
    pub fn concurrency(&self) -> &ConcurrencySetting {
        &self.concurrency
    }

    /// The caller owned worker pool shared by every transfer, if any
    pub fn worker_pool(&self) -> Option<&WorkerPool> {
        self.worker_pool.as_ref()
    }

    /// The listener notified of transfer progress, if any
    pub fn progress_listener(&self) -> Option<&Arc<dyn ProgressListener>> {
        self.progress_listener.as_ref()
    }

    /// What happens to a multipart upload that failed
    pub fn failed_multipart_upload_policy(&self) -> &FailedMultipartUploadPolicy {
        &self.failed_multipart_upload_policy
    }

    /// How objects above the multipart threshold are uploaded
    pub fn upload_mode(&self) -> &UploadMode {
        &self.upload_mode
    }

    /// The transport requests are sent through
    pub fn transport(&self) -> &Arc<dyn ObjectTransport> {
        &self.transport
    }

    /// The signer used for presigned URLs and caller signed requests, if any
    pub fn signer(&self) -> Option<&Signer> {
        self.signer.as_ref()
    }

    /// The endpoint presigned URLs point at, if any
    pub fn endpoint(&self) -> Option<&Url> {
        self.endpoint.as_ref()
    }

    pub(crate) fn min_upload_part_size(&self) -> u64 {
        self.min_upload_part_size
    }

    pub(crate) fn min_download_part_size(&self) -> u64 {
        self.min_download_part_size
    }
}

/// Fluent style builder for [Config]
#[derive(Debug, Clone, Default)]
pub struct Builder {
    multipart_threshold: PartSize,
    upload_part_size: PartSize,
    download_part_size: PartSize,
    parallel_download_threshold: PartSize,
    concurrency: ConcurrencySetting,
    worker_pool: Option<WorkerPool>,
    progress_listener: Option<Arc<dyn ProgressListener>>,
    failed_multipart_upload_policy: FailedMultipartUploadPolicy,
    upload_mode: UploadMode,
    transport: Option<Arc<dyn ObjectTransport>>,
    signing_config: Option<SigningConfig>,
    endpoint: Option<Url>,
    min_upload_part_size: Option<u64>,
    min_download_part_size: Option<u64>,
}

fn at_least(part_size: PartSize, minimum: u64) -> PartSize {
    match part_size {
        PartSize::Target(part_size) => PartSize::Target(cmp::max(part_size, minimum)),
        tps => tps,
    }
}

impl Builder {
    /// Minimum object size that should trigger a multipart upload.
    ///
    /// Smaller objects are uploaded with a single request.
    /// Default is [PartSize::Auto] (16 MiB)
    pub fn multipart_threshold(mut self, threshold: PartSize) -> Self {
        self.multipart_threshold = threshold;
        self
    }

    /// The target size of each part of a multipart upload.
    ///
    /// The minimum part size is 4 MiB, any part size less than that will be rounded up.
    ///
    /// NOTE: The actual part size used may be larger than the configured part size if
    /// the current value would result in more than 10,000 parts for an upload request.
    ///
    /// Default is [PartSize::Auto] (8 MiB)
    pub fn upload_part_size(mut self, part_size: PartSize) -> Self {
        self.upload_part_size = at_least(part_size, MIN_UPLOAD_PART_SIZE_BYTES);
        self
    }

    /// The target size of each ranged GET of a parallel download.
    ///
    /// The minimum part size is 2 MiB, any part size less than that will be rounded up.
    /// Default is [PartSize::Auto] (32 MiB)
    pub fn download_part_size(mut self, part_size: PartSize) -> Self {
        self.download_part_size = at_least(part_size, MIN_DOWNLOAD_PART_SIZE_BYTES);
        self
    }

    /// Set the upload part size and lower the planner minimum to match, so tests can use tiny
    /// parts
    #[cfg(test)]
    pub(crate) fn set_upload_part_size(mut self, part_size: PartSize) -> Self {
        if let PartSize::Target(size) = part_size {
            self.min_upload_part_size = Some(size);
        }
        self.upload_part_size = part_size;
        self
    }

    /// Set the download part size and lower the planner minimum to match
    #[cfg(test)]
    pub(crate) fn set_download_part_size(mut self, part_size: PartSize) -> Self {
        if let PartSize::Target(size) = part_size {
            self.min_download_part_size = Some(size);
        }
        self.download_part_size = part_size;
        self
    }

    /// Minimum object size that should be downloaded with parallel ranged GETs.
    ///
    /// Objects of exactly this size or larger are split into ranged GETs, smaller objects are
    /// streamed with a single GET.
    /// Default is [PartSize::Auto] (128 MiB)
    pub fn parallel_download_threshold(mut self, threshold: PartSize) -> Self {
        self.parallel_download_threshold = threshold;
        self
    }

    /// Set the number of workers each transfer runs its parts on.
    ///
    /// Ignored when a [`worker_pool`](Self::worker_pool) is set.
    /// Default is [ConcurrencySetting::Auto] (8 workers).
    pub fn concurrency(mut self, concurrency: ConcurrencySetting) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Run the parts of every transfer on a caller owned pool.
    ///
    /// Transfers never shut this pool down.
    pub fn worker_pool(mut self, pool: WorkerPool) -> Self {
        self.worker_pool = Some(pool);
        self
    }

    /// Notify `listener` as bytes are transferred
    pub fn progress_listener(mut self, listener: Arc<dyn ProgressListener>) -> Self {
        self.progress_listener = Some(listener);
        self
    }

    /// Set what happens to a multipart upload that failed.
    ///
    /// Default is [FailedMultipartUploadPolicy::AbortUpload]
    pub fn failed_multipart_upload_policy(mut self, policy: FailedMultipartUploadPolicy) -> Self {
        self.failed_multipart_upload_policy = policy;
        self
    }

    /// Set how objects above the multipart threshold are uploaded.
    ///
    /// Default is [UploadMode::Multipart]
    pub fn upload_mode(mut self, upload_mode: UploadMode) -> Self {
        self.upload_mode = upload_mode;
        self
    }

    /// Set the transport used to send requests
    pub fn transport(mut self, transport: Arc<dyn ObjectTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Sign requests and presigned URLs with `signing_config`
    pub fn signing_config(mut self, signing_config: SigningConfig) -> Self {
        self.signing_config = Some(signing_config);
        self
    }

    /// Base URL of the server, e.g. `https://s3.example.com:9021`.
    ///
    /// Presigned URLs are built path style under it.
    pub fn endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    /// Use an `aws-sdk-s3` client as the transport
    pub fn client(self, client: aws_sdk_s3::Client) -> Self {
        self.transport(Arc::new(client))
    }

    /// Consumes the builder and constructs a [`Config`](crate::config::Config)
    ///
    /// Fails with [`ErrorKind::Configuration`](crate::error::ErrorKind::Configuration) when no
    /// transport was set.
    pub fn build(mut self) -> Result<Config, Error> {
        let transport = self
            .transport
            .take()
            .ok_or_else(|| error::configuration("a transport or client must be set"))?;
        Ok(self.build_with(transport))
    }

    pub(crate) fn build_with(self, transport: Arc<dyn ObjectTransport>) -> Config {
        Config {
            multipart_threshold: self.multipart_threshold,
            upload_part_size: self.upload_part_size,
            download_part_size: self.download_part_size,
            parallel_download_threshold: self.parallel_download_threshold,
            concurrency: self.concurrency,
            worker_pool: self.worker_pool,
            progress_listener: self.progress_listener,
            failed_multipart_upload_policy: self.failed_multipart_upload_policy,
            upload_mode: self.upload_mode,
            transport,
            signer: self.signing_config.map(Signer::new),
            endpoint: self.endpoint,
            min_upload_part_size: self
                .min_upload_part_size
                .unwrap_or(MIN_UPLOAD_PART_SIZE_BYTES),
            min_download_part_size: self
                .min_download_part_size
                .unwrap_or(MIN_DOWNLOAD_PART_SIZE_BYTES),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Config;
    use crate::error::ErrorKind;
    use crate::types::PartSize;
    use crate::MEBIBYTE;

    #[test]
    fn test_missing_transport() {
        let err = Config::builder().build().unwrap_err();
        assert_eq!(&ErrorKind::Configuration, err.kind());
    }

    #[test]
    fn test_part_size_minimums() {
        let config = Config::builder()
            .upload_part_size(PartSize::Target(1))
            .download_part_size(PartSize::Target(1))
            .multipart_threshold(PartSize::Target(1))
            .client(aws_sdk_s3::Client::from_conf(
                aws_sdk_s3::Config::builder()
                    .behavior_version(aws_sdk_s3::config::BehaviorVersion::latest())
                    .build(),
            ))
            .build()
            .unwrap();

        assert_eq!(&PartSize::Target(4 * MEBIBYTE), config.upload_part_size());
        assert_eq!(&PartSize::Target(2 * MEBIBYTE), config.download_part_size());
        assert_eq!(&PartSize::Target(1), config.multipart_threshold());
    }
}
