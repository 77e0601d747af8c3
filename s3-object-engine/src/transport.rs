/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::fmt;

use async_trait::async_trait;
use aws_smithy_types::byte_stream::ByteStream;
use bytes::Bytes;

use crate::error::BoxError;
use crate::types::{ByteRange, CompletedPart, ObjectMetadata, ObjectPath, UploadedPart};

mod s3;

/// An entity tag returned by the server
pub type ETag = String;

/// The requests the transfer engine makes against an S3-compatible server.
///
/// Implementations are responsible for signing, retries and connection management. The
/// engine only decides which requests to make and in which order, and classifies the errors
/// returned here into [`Error`](crate::error::Error)s.
///
/// An implementation for [`aws_sdk_s3::Client`] is provided.
#[async_trait]
pub trait ObjectTransport: Send + Sync + fmt::Debug {
    /// Size of the object in bytes
    async fn get_object_size(&self, path: &ObjectPath) -> Result<u64, BoxError>;

    /// Read the whole object, or only `range` of it
    async fn read_range(
        &self,
        path: &ObjectPath,
        range: Option<ByteRange>,
    ) -> Result<ByteStream, BoxError>;

    /// Start a multipart upload and return its upload id
    async fn initiate_multipart_upload(
        &self,
        path: &ObjectPath,
        metadata: &ObjectMetadata,
    ) -> Result<String, BoxError>;

    /// Upload one part of a multipart upload and return the part's ETag
    async fn upload_part(
        &self,
        path: &ObjectPath,
        upload_id: &str,
        part_number: u64,
        data: Bytes,
    ) -> Result<ETag, BoxError>;

    /// Parts already uploaded to an in-progress multipart upload
    async fn list_parts(
        &self,
        path: &ObjectPath,
        upload_id: &str,
    ) -> Result<Vec<UploadedPart>, BoxError>;

    /// Finish a multipart upload. `parts` are in ascending part number order.
    async fn complete_multipart_upload(
        &self,
        path: &ObjectPath,
        upload_id: &str,
        parts: &[CompletedPart],
    ) -> Result<ETag, BoxError>;

    /// Abandon a multipart upload, discarding its parts
    async fn abort_multipart_upload(&self, path: &ObjectPath, upload_id: &str)
        -> Result<(), BoxError>;

    /// Write `data` as the whole object, or at `range` of an existing object.
    ///
    /// `metadata` is only given when the object is created.
    async fn put_object(
        &self,
        path: &ObjectPath,
        data: Bytes,
        range: Option<ByteRange>,
        metadata: Option<&ObjectMetadata>,
    ) -> Result<Option<ETag>, BoxError>;

    /// Delete the object
    async fn delete_object(&self, path: &ObjectPath) -> Result<(), BoxError>;
}
