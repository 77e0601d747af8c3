/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::sync::Arc;

use aws_types::SdkConfig;

use crate::config::Builder;
use crate::progress::ProgressListener;
use crate::runtime::WorkerPool;
use crate::types::{ConcurrencySetting, FailedMultipartUploadPolicy, PartSize, UploadMode};
use crate::Config;

/// Load [`Config`] from the environment.
///
/// The transport is an `aws-sdk-s3` client configured from the shared AWS environment
/// (credentials, region, profile) via `aws-config`.
#[derive(Default, Debug)]
pub struct ConfigLoader {
    builder: Builder,
    endpoint_url: Option<String>,
    force_path_style: Option<bool>,
}

impl ConfigLoader {
    /// Minimum object size that should trigger a multipart upload.
    ///
    /// Default is [PartSize::Auto]
    pub fn multipart_threshold(mut self, threshold: PartSize) -> Self {
        self.builder = self.builder.multipart_threshold(threshold);
        self
    }

    /// The target size of each part of a multipart upload.
    ///
    /// The minimum part size is 4 MiB, any part size less than that will be rounded up.
    /// Default is [PartSize::Auto]
    pub fn upload_part_size(mut self, part_size: PartSize) -> Self {
        self.builder = self.builder.upload_part_size(part_size);
        self
    }

    /// The target size of each ranged GET of a parallel download.
    ///
    /// The minimum part size is 2 MiB, any part size less than that will be rounded up.
    /// Default is [PartSize::Auto]
    pub fn download_part_size(mut self, part_size: PartSize) -> Self {
        self.builder = self.builder.download_part_size(part_size);
        self
    }

    /// Minimum object size that should be downloaded with parallel ranged GETs.
    ///
    /// Default is [PartSize::Auto]
    pub fn parallel_download_threshold(mut self, threshold: PartSize) -> Self {
        self.builder = self.builder.parallel_download_threshold(threshold);
        self
    }

    /// Set the number of workers each transfer runs its parts on.
    ///
    /// Default is [ConcurrencySetting::Auto].
    pub fn concurrency(mut self, concurrency: ConcurrencySetting) -> Self {
        self.builder = self.builder.concurrency(concurrency);
        self
    }

    /// Run the parts of every transfer on a caller owned pool
    pub fn worker_pool(mut self, pool: WorkerPool) -> Self {
        self.builder = self.builder.worker_pool(pool);
        self
    }

    /// Notify `listener` as bytes are transferred
    pub fn progress_listener(mut self, listener: Arc<dyn ProgressListener>) -> Self {
        self.builder = self.builder.progress_listener(listener);
        self
    }

    /// Set what happens to a multipart upload that failed
    pub fn failed_multipart_upload_policy(mut self, policy: FailedMultipartUploadPolicy) -> Self {
        self.builder = self.builder.failed_multipart_upload_policy(policy);
        self
    }

    /// Set how objects above the multipart threshold are uploaded
    pub fn upload_mode(mut self, upload_mode: UploadMode) -> Self {
        self.builder = self.builder.upload_mode(upload_mode);
        self
    }

    /// Send requests to an S3-compatible endpoint instead of AWS
    pub fn endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }

    /// Address buckets as `endpoint/bucket` instead of `bucket.endpoint`
    pub fn force_path_style(mut self, force_path_style: bool) -> Self {
        self.force_path_style = Some(force_path_style);
        self
    }

    /// Load the default configuration
    ///
    /// If fields have been overridden during builder construction, the override values will be
    /// used. Otherwise, the default values for each field will be provided.
    pub async fn load(self) -> Config {
        let shared_config = aws_config::from_env().load().await;
        self.load_with(&shared_config)
    }

    /// Build the configuration using an already loaded shared AWS config
    pub fn load_with(self, shared_config: &SdkConfig) -> Config {
        let mut s3_config = aws_sdk_s3::config::Builder::from(shared_config);
        if let Some(endpoint_url) = self.endpoint_url {
            s3_config = s3_config.endpoint_url(endpoint_url);
        }
        if let Some(force_path_style) = self.force_path_style {
            s3_config = s3_config.force_path_style(force_path_style);
        }

        let s3_client = aws_sdk_s3::Client::from_conf(s3_config.build());
        tracing::debug!("loaded config with an aws-sdk-s3 transport");
        self.builder.build_with(Arc::new(s3_client))
    }
}
