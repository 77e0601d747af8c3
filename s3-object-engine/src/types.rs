/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::collections::BTreeMap;
use std::fmt;

/// The target part size for an upload or download request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PartSize {
    /// Use the default part size for the operation.
    #[default]
    Auto,

    /// Target part size explicitly given.
    ///
    /// NOTE: This is a suggestion and will be used if possible but may be adjusted for an individual request
    /// as required by the minimum part size and maximum part count.
    Target(u64),
}

/// The number of workers to use for a single upload or download request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConcurrencySetting {
    /// Use the default worker count (8).
    #[default]
    Auto,

    /// Explicitly configured worker count.
    Explicit(usize),
}

/// How an upload at or above the multipart threshold is sent to the server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UploadMode {
    /// Multipart upload: initiate, upload parts concurrently, complete.
    #[default]
    Multipart,

    /// Create an empty object, then write each part with a ranged `PUT`.
    ///
    /// For S3-compatible servers that support byte-range updates but not multipart uploads.
    ByteRange,
}

/// What to do with a multipart upload session when the upload fails.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FailedMultipartUploadPolicy {
    /// Abort the multipart upload on the server.
    #[default]
    AbortUpload,

    /// Leave the multipart upload in place so it can be resumed later.
    Retain,
}

/// Identifies an object on the server.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectPath {
    /// Bucket name
    pub bucket: String,
    /// Object key
    pub key: String,
}

impl ObjectPath {
    /// Create a new object path
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

/// An inclusive byte range `[start, end]` of an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    start: u64,
    end: u64,
}

impl ByteRange {
    /// Create the range covering `len` bytes starting at `offset`.
    ///
    /// `len` must be non-zero.
    pub fn from_offset(offset: u64, len: u64) -> Self {
        debug_assert!(len > 0, "empty byte range");
        Self {
            start: offset,
            end: offset + len - 1,
        }
    }

    /// First byte of the range
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Last byte of the range (inclusive)
    pub fn end(&self) -> u64 {
        self.end
    }

    /// Number of bytes covered
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Always false, a range covers at least one byte
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The value of an HTTP `Range` header for this range
    pub fn to_header_value(&self) -> String {
        format!("bytes={}-{}", self.start, self.end)
    }
}

/// Metadata applied to an object when it is created.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectMetadata {
    /// `Content-Type` of the object
    pub content_type: Option<String>,
    /// User metadata, sent as `x-amz-meta-*` headers
    pub user_metadata: BTreeMap<String, String>,
    /// Canned ACL, e.g. `public-read`
    pub canned_acl: Option<String>,
}

/// A part uploaded as part of a multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedPart {
    /// 1-based part number
    pub part_number: u64,
    /// ETag returned by the server for the part
    pub e_tag: String,
}

/// A part as reported by the server when listing the parts of a multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedPart {
    /// 1-based part number
    pub part_number: u64,
    /// ETag of the part
    pub e_tag: String,
    /// Size of the part in bytes
    pub size: u64,
}

impl From<UploadedPart> for CompletedPart {
    fn from(value: UploadedPart) -> Self {
        CompletedPart {
            part_number: value.part_number,
            e_tag: value.e_tag,
        }
    }
}
