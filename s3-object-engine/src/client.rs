/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::auth::{PresignRequest, SignableRequest, Signer};
use crate::error::{self, Error};
use crate::runtime::PoolLease;
use crate::transport::ObjectTransport;
use crate::types::{ConcurrencySetting, ObjectPath, PartSize};
use crate::Config;
use crate::{DEFAULT_CONCURRENCY, MEBIBYTE};
use chrono::{DateTime, Utc};
use http::Method;
use std::sync::Arc;
use url::Url;

/// Transfer client for S3-compatible object storage.
#[derive(Debug, Clone)]
pub struct Client {
    pub(crate) handle: Arc<Handle>,
}

/// Whatever is needed to carry out operations, e.g. config, defaults, worker pools
#[derive(Debug)]
pub(crate) struct Handle {
    pub(crate) config: crate::Config,
}

impl Handle {
    /// Get the concrete number of workers to use based on the concurrency setting.
    pub(crate) fn num_workers(&self) -> usize {
        match self.config.concurrency() {
            ConcurrencySetting::Explicit(concurrency) => *concurrency,
            ConcurrencySetting::Auto => DEFAULT_CONCURRENCY,
        }
    }

    /// Get the concrete minimum upload size in bytes to use to determine whether multipart uploads
    /// are enabled for a given request.
    pub(crate) fn mpu_threshold_bytes(&self) -> u64 {
        match self.config.multipart_threshold() {
            PartSize::Auto => 16 * MEBIBYTE,
            PartSize::Target(explicit) => *explicit,
        }
    }

    /// Get the concrete target part size to use for uploads
    pub(crate) fn upload_part_size_bytes(&self) -> u64 {
        match self.config.upload_part_size() {
            PartSize::Auto => 8 * MEBIBYTE,
            PartSize::Target(explicit) => *explicit,
        }
    }

    /// Smallest part the planner may produce for an upload
    pub(crate) fn min_upload_part_size_bytes(&self) -> u64 {
        self.config.min_upload_part_size()
    }

    /// Get the concrete target part size to use for downloads
    pub(crate) fn download_part_size_bytes(&self) -> u64 {
        match self.config.download_part_size() {
            PartSize::Auto => 32 * MEBIBYTE,
            PartSize::Target(explicit) => *explicit,
        }
    }

    /// Smallest part the planner may produce for a download
    pub(crate) fn min_download_part_size_bytes(&self) -> u64 {
        self.config.min_download_part_size()
    }

    /// Get the concrete object size at which downloads use parallel ranged GETs.
    ///
    /// An object whose size equals the threshold is downloaded in parallel.
    pub(crate) fn parallel_download_threshold_bytes(&self) -> u64 {
        match self.config.parallel_download_threshold() {
            PartSize::Auto => 128 * MEBIBYTE,
            PartSize::Target(explicit) => *explicit,
        }
    }

    pub(crate) fn transport(&self) -> &Arc<dyn ObjectTransport> {
        self.config.transport()
    }

    pub(crate) fn signer(&self) -> Result<&Signer, Error> {
        self.config
            .signer()
            .ok_or_else(|| error::configuration("no signing config was set"))
    }

    /// The worker pool a transfer runs its parts on.
    ///
    /// A caller owned pool is borrowed, otherwise a new pool owned by the transfer is created.
    pub(crate) fn lease_pool(&self) -> PoolLease {
        match self.config.worker_pool() {
            Some(pool) => PoolLease::borrowed(pool.clone()),
            None => PoolLease::owned(self.num_workers()),
        }
    }
}

impl Client {
    /// Creates a new client from a config.
    pub fn new(config: Config) -> Client {
        let handle = Arc::new(Handle { config });
        Client { handle }
    }

    /// Returns the client's configuration
    pub fn config(&self) -> &Config {
        &self.handle.config
    }

    /// Upload a single object.
    ///
    /// Objects below the multipart threshold are sent with one request, larger objects are
    /// split into parts uploaded concurrently.
    ///
    /// Constructs a fluent builder for the
    /// [`Upload`](crate::operation::upload::builders::UploadFluentBuilder) operation.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::error::Error;
    /// use std::path::Path;
    /// use s3_object_engine::io::UploadSource;
    ///
    /// async fn upload_file(
    ///     client: &s3_object_engine::Client,
    ///     path: impl AsRef<Path>
    /// ) -> Result<(), Box<dyn Error>> {
    ///     let source = UploadSource::from_path(path)?;
    ///     let output = client.upload()
    ///         .bucket("my-bucket")
    ///         .key("my-key")
    ///         .source(source)
    ///         .send()
    ///         .await?;
    ///     println!("uploaded {} bytes", output.content_length());
    ///     Ok(())
    /// }
    /// ```
    pub fn upload(&self) -> crate::operation::upload::builders::UploadFluentBuilder {
        crate::operation::upload::builders::UploadFluentBuilder::new(self.handle.clone())
    }

    /// Download a single object to a file.
    ///
    /// Objects at or above the parallel download threshold are split into concurrent ranged
    /// GET requests written straight into the destination file.
    ///
    /// Constructs a fluent builder for the
    /// [`Download`](crate::operation::download::builders::DownloadFluentBuilder) operation.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::error::Error;
    ///
    /// async fn get_object(client: &s3_object_engine::Client) -> Result<(), Box<dyn Error>> {
    ///     let output = client
    ///         .download()
    ///         .bucket("my-bucket")
    ///         .key("my-key")
    ///         .destination("/tmp/my-key")
    ///         .send()
    ///         .await?;
    ///     println!("downloaded {} bytes", output.content_length());
    ///     Ok(())
    /// }
    /// ```
    pub fn download(&self) -> crate::operation::download::builders::DownloadFluentBuilder {
        crate::operation::download::builders::DownloadFluentBuilder::new(self.handle.clone())
    }

    /// Sign `request` in place with the configured
    /// [`SigningConfig`](crate::auth::SigningConfig).
    ///
    /// Fails with [`ErrorKind::Configuration`](crate::error::ErrorKind::Configuration) when no
    /// signing config was set.
    pub fn sign(&self, request: &mut SignableRequest) -> Result<(), Error> {
        self.handle.signer()?.sign(request)
    }

    /// A presigned URL for `method` on the object at `path`, valid until `expires_at`.
    ///
    /// The URL is path style (`{endpoint}/{bucket}/{key}`). Requires both a
    /// [`signing_config`](crate::config::Builder::signing_config) and an
    /// [`endpoint`](crate::config::Builder::endpoint).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use chrono::{TimeDelta, Utc};
    /// use s3_object_engine::types::ObjectPath;
    ///
    /// fn share(client: &s3_object_engine::Client) -> Result<(), s3_object_engine::error::Error> {
    ///     let url = client.presign_object(
    ///         http::Method::GET,
    ///         &ObjectPath::new("my-bucket", "my-key"),
    ///         Utc::now() + TimeDelta::hours(1),
    ///     )?;
    ///     println!("{url}");
    ///     Ok(())
    /// }
    /// ```
    pub fn presign_object(
        &self,
        method: Method,
        path: &ObjectPath,
        expires_at: DateTime<Utc>,
    ) -> Result<Url, Error> {
        let signer = self.handle.signer()?;
        let endpoint = self
            .handle
            .config
            .endpoint()
            .ok_or_else(|| error::configuration("presigning requires an endpoint"))?;

        let mut url = endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| error::configuration(format!("endpoint `{endpoint}` cannot hold a path")))?
            .pop_if_empty()
            .push(&path.bucket)
            .extend(path.key.split('/'));

        let request = PresignRequest::new(method, url, expires_at)
            .resource(format!("/{}/{}", path.bucket, path.key));
        signer.presign(&request)
    }
}

#[cfg(test)]
mod tests {
    use super::Client;
    use crate::runtime::WorkerPool;
    use crate::types::{ConcurrencySetting, PartSize};
    use crate::{Config, MEBIBYTE};

    fn s3_client() -> aws_sdk_s3::Client {
        aws_sdk_s3::Client::from_conf(
            aws_sdk_s3::Config::builder()
                .behavior_version(aws_sdk_s3::config::BehaviorVersion::latest())
                .build(),
        )
    }

    #[test]
    fn test_defaults() {
        let client = Client::new(Config::builder().client(s3_client()).build().unwrap());
        let handle = &client.handle;
        assert_eq!(8, handle.num_workers());
        assert_eq!(16 * MEBIBYTE, handle.mpu_threshold_bytes());
        assert_eq!(8 * MEBIBYTE, handle.upload_part_size_bytes());
        assert_eq!(32 * MEBIBYTE, handle.download_part_size_bytes());
        assert_eq!(128 * MEBIBYTE, handle.parallel_download_threshold_bytes());
    }

    #[test]
    fn test_planner_minimums() {
        let client = Client::new(
            Config::builder()
                .client(s3_client())
                .upload_part_size(PartSize::Target(30))
                .build()
                .unwrap(),
        );
        assert_eq!(4 * MEBIBYTE, client.handle.min_upload_part_size_bytes());
        assert_eq!(2 * MEBIBYTE, client.handle.min_download_part_size_bytes());
        assert_eq!(4 * MEBIBYTE, client.handle.upload_part_size_bytes());

        let client = Client::new(
            Config::builder()
                .client(s3_client())
                .set_upload_part_size(PartSize::Target(30))
                .set_download_part_size(PartSize::Target(20))
                .build()
                .unwrap(),
        );
        assert_eq!(30, client.handle.min_upload_part_size_bytes());
        assert_eq!(20, client.handle.min_download_part_size_bytes());
    }

    #[test]
    fn test_explicit_settings() {
        let config = Config::builder()
            .client(s3_client())
            .concurrency(ConcurrencySetting::Explicit(3))
            .multipart_threshold(PartSize::Target(1024))
            .upload_part_size(PartSize::Target(6 * MEBIBYTE))
            .build()
            .unwrap();
        let client = Client::new(config);
        assert_eq!(3, client.handle.num_workers());
        assert_eq!(1024, client.handle.mpu_threshold_bytes());
        assert_eq!(6 * MEBIBYTE, client.handle.upload_part_size_bytes());
    }

    #[test]
    fn test_lease_pool() {
        let owned = Client::new(
            Config::builder()
                .client(s3_client())
                .concurrency(ConcurrencySetting::Explicit(2))
                .build()
                .unwrap(),
        );
        let lease = owned.handle.lease_pool();
        assert!(lease.is_owned());
        assert_eq!(2, lease.pool().size());

        let pool = WorkerPool::new(5);
        let borrowed = Client::new(
            Config::builder()
                .client(s3_client())
                .worker_pool(pool.clone())
                .build()
                .unwrap(),
        );
        let lease = borrowed.handle.lease_pool();
        assert!(!lease.is_owned());
        assert_eq!(5, lease.pool().size());
        drop(lease);
        assert!(!pool.is_shutdown());
    }
}
