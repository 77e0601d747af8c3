/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::collections::BTreeMap;

use crate::error::{self, Error};
use crate::io::UploadSource;
use crate::types::{ObjectMetadata, ObjectPath, UploadedPart};

/// Input type for uploading a single object
#[non_exhaustive]
#[derive(Debug)]
pub struct UploadInput {
    /// The object to create
    pub path: ObjectPath,

    /// The bytes to upload
    pub source: UploadSource,

    /// Metadata applied when the object is created
    pub metadata: ObjectMetadata,

    /// Continue an earlier multipart upload instead of starting a new one
    pub resume: Option<ResumeContext>,
}

impl UploadInput {
    /// Creates a new builder-style object to manufacture [`UploadInput`].
    pub fn builder() -> UploadInputBuilder {
        UploadInputBuilder::default()
    }

    /// The object to create
    pub fn path(&self) -> &ObjectPath {
        &self.path
    }

    /// The bytes to upload
    pub fn source(&self) -> &UploadSource {
        &self.source
    }

    /// Metadata applied when the object is created
    pub fn metadata(&self) -> &ObjectMetadata {
        &self.metadata
    }

    /// The multipart upload being continued, if any
    pub fn resume(&self) -> Option<&ResumeContext> {
        self.resume.as_ref()
    }
}

/// An existing multipart upload to continue.
///
/// Parts the server already holds with the planned size are not uploaded again. When the
/// uploaded parts are not given they are listed from the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeContext {
    upload_id: String,
    parts: Option<BTreeMap<u64, UploadedPart>>,
}

impl ResumeContext {
    /// Continue the multipart upload `upload_id`
    pub fn new(upload_id: impl Into<String>) -> Self {
        Self {
            upload_id: upload_id.into(),
            parts: None,
        }
    }

    /// Parts known to be uploaded already
    pub fn with_parts(mut self, parts: impl IntoIterator<Item = UploadedPart>) -> Self {
        self.parts = Some(
            parts
                .into_iter()
                .map(|part| (part.part_number, part))
                .collect(),
        );
        self
    }

    /// The id of the multipart upload
    pub fn upload_id(&self) -> &str {
        &self.upload_id
    }

    /// Parts known to be uploaded already, keyed by part number
    pub fn parts(&self) -> Option<&BTreeMap<u64, UploadedPart>> {
        self.parts.as_ref()
    }

    pub(crate) fn into_parts(self) -> (String, Option<BTreeMap<u64, UploadedPart>>) {
        (self.upload_id, self.parts)
    }
}

/// A builder for [`UploadInput`].
#[non_exhaustive]
#[derive(Debug, Default)]
pub struct UploadInputBuilder {
    pub(crate) bucket: Option<String>,
    pub(crate) key: Option<String>,
    pub(crate) source: Option<UploadSource>,
    pub(crate) metadata: ObjectMetadata,
    pub(crate) resume: Option<ResumeContext>,
}

impl UploadInputBuilder {
    /// The bucket name to which the object is uploaded.
    ///
    /// This field is required.
    pub fn bucket(mut self, input: impl Into<String>) -> Self {
        self.bucket = Some(input.into());
        self
    }

    /// The bucket name to which the object is uploaded.
    pub fn set_bucket(mut self, input: Option<String>) -> Self {
        self.bucket = input;
        self
    }

    /// The bucket name to which the object is uploaded.
    pub fn get_bucket(&self) -> &Option<String> {
        &self.bucket
    }

    /// Object key for which the upload was initiated.
    ///
    /// This field is required.
    pub fn key(mut self, input: impl Into<String>) -> Self {
        self.key = Some(input.into());
        self
    }

    /// Object key for which the upload was initiated.
    pub fn set_key(mut self, input: Option<String>) -> Self {
        self.key = input;
        self
    }

    /// Object key for which the upload was initiated.
    pub fn get_key(&self) -> &Option<String> {
        &self.key
    }

    /// The bytes to upload.
    ///
    /// This field is required.
    pub fn source(mut self, input: impl Into<UploadSource>) -> Self {
        self.source = Some(input.into());
        self
    }

    /// The bytes to upload.
    pub fn set_source(mut self, input: Option<UploadSource>) -> Self {
        self.source = input;
        self
    }

    /// The bytes to upload.
    pub fn get_source(&self) -> &Option<UploadSource> {
        &self.source
    }

    /// Content type, user metadata and ACL of the new object
    pub fn metadata(mut self, input: ObjectMetadata) -> Self {
        self.metadata = input;
        self
    }

    /// Content type, user metadata and ACL of the new object
    pub fn get_metadata(&self) -> &ObjectMetadata {
        &self.metadata
    }

    /// Continue an existing multipart upload
    pub fn resume(mut self, input: ResumeContext) -> Self {
        self.resume = Some(input);
        self
    }

    /// Continue an existing multipart upload
    pub fn set_resume(mut self, input: Option<ResumeContext>) -> Self {
        self.resume = input;
        self
    }

    /// Continue an existing multipart upload
    pub fn get_resume(&self) -> &Option<ResumeContext> {
        &self.resume
    }

    /// Consumes the builder and constructs a [`UploadInput`].
    ///
    /// Fails with [`ErrorKind::InputInvalid`](crate::error::ErrorKind::InputInvalid) when the
    /// bucket, key or source is missing.
    pub fn build(self) -> Result<UploadInput, Error> {
        let bucket = self
            .bucket
            .ok_or_else(|| error::invalid_input("bucket is required"))?;
        let key = self
            .key
            .ok_or_else(|| error::invalid_input("key is required"))?;
        let source = self
            .source
            .ok_or_else(|| error::invalid_input("source is required"))?;

        Ok(UploadInput {
            path: ObjectPath::new(bucket, key),
            source,
            metadata: self.metadata,
            resume: self.resume,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{ResumeContext, UploadInput};
    use crate::error::ErrorKind;
    use crate::types::UploadedPart;

    #[test]
    fn test_missing_fields() {
        let err = UploadInput::builder()
            .bucket("bucket")
            .source("data")
            .build()
            .unwrap_err();
        assert_eq!(&ErrorKind::InputInvalid, err.kind());

        let input = UploadInput::builder()
            .bucket("bucket")
            .key("key")
            .source("data")
            .build()
            .unwrap();
        assert_eq!("bucket/key", input.path().to_string());
        assert_eq!(4, input.source().len());
    }

    #[test]
    fn test_resume_parts_keyed_by_number() {
        let resume = ResumeContext::new("upload-1").with_parts(vec![
            UploadedPart {
                part_number: 2,
                e_tag: "b".to_owned(),
                size: 10,
            },
            UploadedPart {
                part_number: 1,
                e_tag: "a".to_owned(),
                size: 10,
            },
        ]);
        let parts = resume.parts().unwrap();
        assert_eq!(vec![&1, &2], parts.keys().collect::<Vec<_>>());
        assert_eq!("upload-1", resume.upload_id());
    }
}
