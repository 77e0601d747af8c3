/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::sync::Arc;

use crate::error::Error;
use crate::io::UploadSource;
use crate::types::ObjectMetadata;

use super::{ResumeContext, UploadInputBuilder, UploadOutput};

/// Fluent builder for constructing a single object upload transfer
#[derive(Debug)]
pub struct UploadFluentBuilder {
    handle: Arc<crate::client::Handle>,
    inner: UploadInputBuilder,
}

impl UploadFluentBuilder {
    pub(crate) fn new(handle: Arc<crate::client::Handle>) -> Self {
        Self {
            handle,
            inner: ::std::default::Default::default(),
        }
    }

    /// Upload the object and wait for the transfer to finish
    pub async fn send(self) -> Result<UploadOutput, Error> {
        let input = self.inner.build()?;
        crate::operation::upload::Upload::orchestrate(self.handle, input).await
    }

    /// The bucket name to which the object is uploaded.
    pub fn bucket(mut self, input: impl Into<String>) -> Self {
        self.inner = self.inner.bucket(input);
        self
    }

    /// The bucket name to which the object is uploaded.
    pub fn get_bucket(&self) -> &Option<String> {
        self.inner.get_bucket()
    }

    /// Object key for which the upload is initiated.
    pub fn key(mut self, input: impl Into<String>) -> Self {
        self.inner = self.inner.key(input);
        self
    }

    /// Object key for which the upload is initiated.
    pub fn get_key(&self) -> &Option<String> {
        self.inner.get_key()
    }

    /// The bytes to upload
    pub fn source(mut self, input: impl Into<UploadSource>) -> Self {
        self.inner = self.inner.source(input);
        self
    }

    /// Content type, user metadata and ACL of the new object
    pub fn metadata(mut self, input: ObjectMetadata) -> Self {
        self.inner = self.inner.metadata(input);
        self
    }

    /// Continue an existing multipart upload
    pub fn resume(mut self, input: ResumeContext) -> Self {
        self.inner = self.inner.resume(input);
        self
    }
}

impl crate::operation::upload::input::UploadInputBuilder {
    /// Upload a single object with this input using the given client.
    pub async fn send_with(self, client: &crate::Client) -> Result<UploadOutput, Error> {
        let mut fluent_builder = client.upload();
        fluent_builder.inner = self;
        fluent_builder.send().await
    }
}
