/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::types::CompletedPart;

/// Response type for a single object upload
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutput {
    /// Entity tag of the new object, if the server returned one
    pub e_tag: Option<String>,

    /// The id of the multipart upload, `None` unless the object was uploaded in parts
    pub upload_id: Option<String>,

    /// Size of the object in bytes
    pub content_length: u64,

    /// The parts of a multipart upload in ascending part number order
    pub parts: Vec<CompletedPart>,
}

impl UploadOutput {
    /// Entity tag of the new object
    pub fn e_tag(&self) -> Option<&str> {
        self.e_tag.as_deref()
    }

    /// The id of the multipart upload
    pub fn upload_id(&self) -> Option<&str> {
        self.upload_id.as_deref()
    }

    /// Size of the object in bytes
    pub fn content_length(&self) -> u64 {
        self.content_length
    }

    /// The parts of a multipart upload in ascending part number order
    pub fn parts(&self) -> &[CompletedPart] {
        &self.parts
    }
}
