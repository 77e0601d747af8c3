/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

/* Automatically managed default lints */
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
/* End of automatically managed default lints */
#![warn(
    missing_debug_implementations,
    missing_docs,
    rustdoc::missing_crate_level_docs,
    unreachable_pub,
    rust_2018_idioms
)]

//! Client-side engine for S3-compatible object storage.
//!
//! The crate covers the two parts of an S3 client where correctness and throughput are decided:
//!
//! * Request signing with the legacy HMAC-SHA1 scheme (V2) and AWS Signature Version 4, both for
//!   `Authorization` headers and for presigned URLs. See [`auth`].
//! * Concurrent transfer of large objects. Uploads and downloads are split into ordered byte-range
//!   parts which are executed on a bounded worker pool and reassembled, with abort/cleanup on
//!   failure. See [`Client::upload`] and [`Client::download`].
//!
//! Requests are sent through an [`ObjectTransport`](crate::transport::ObjectTransport). The
//! crate ships an implementation for [`aws_sdk_s3::Client`].
//!
//! # Examples
//!
//! Load the default configuration:
//!
//! ```no_run
//! # async fn example() {
//! let config = s3_object_engine::from_env().load().await;
//! let client = s3_object_engine::Client::new(config);
//! # }
//! ```
//!
//! Upload a file:
//!
//! ```no_run
//! # async fn example() -> Result<(), s3_object_engine::error::Error> {
//! use s3_object_engine::io::UploadSource;
//!
//! let config = s3_object_engine::from_env().load().await;
//! let client = s3_object_engine::Client::new(config);
//!
//! let output = client
//!     .upload()
//!     .bucket("my-bucket")
//!     .key("my-key")
//!     .source(UploadSource::from_path("/tmp/large-file")?)
//!     .send()
//!     .await?;
//!
//! println!("uploaded with etag {:?}", output.e_tag());
//! # Ok(())
//! # }
//! ```

/// Bytes in a mebibyte
pub(crate) const MEBIBYTE: u64 = 1024 * 1024;

/// Default worker pool size
pub(crate) const DEFAULT_CONCURRENCY: usize = 8;

/// Error types emitted by `s3-object-engine`
pub mod error;

/// Common types used by `s3-object-engine`
pub mod types;

/// Request signing (V2 and V4) and presigned URLs
pub mod auth;

/// Types and helpers for I/O
pub mod io;

/// Transfer progress reporting
pub mod progress;

/// The transport contract the transfer engine calls into
pub mod transport;

/// Transfer client
pub mod client;

/// Transfer operations
pub mod operation;

/// Client configuration
pub mod config;

/// Tower related middleware and components
pub(crate) mod middleware;

/// Worker pool and other runtime components
pub mod runtime;

pub use self::client::Client;
use self::config::loader::ConfigLoader;
pub use self::config::Config;

/// Create a config loader
pub fn from_env() -> ConfigLoader {
    ConfigLoader::default()
}
