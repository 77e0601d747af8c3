/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::path::Path;
use std::sync::Arc;

use crate::error::Error;

use super::{DownloadInputBuilder, DownloadOutput};

/// Fluent builder for constructing a single object download transfer
#[derive(Debug)]
pub struct DownloadFluentBuilder {
    handle: Arc<crate::client::Handle>,
    inner: DownloadInputBuilder,
}

impl DownloadFluentBuilder {
    pub(crate) fn new(handle: Arc<crate::client::Handle>) -> Self {
        Self {
            handle,
            inner: ::std::default::Default::default(),
        }
    }

    /// Download the object and wait for the transfer to finish
    pub async fn send(self) -> Result<DownloadOutput, Error> {
        let input = self.inner.build()?;
        crate::operation::download::Download::orchestrate(self.handle, input).await
    }

    /// The bucket containing the object.
    pub fn bucket(mut self, input: impl Into<String>) -> Self {
        self.inner = self.inner.bucket(input);
        self
    }

    /// The bucket containing the object.
    pub fn get_bucket(&self) -> &Option<String> {
        self.inner.get_bucket()
    }

    /// Key of the object to get.
    pub fn key(mut self, input: impl Into<String>) -> Self {
        self.inner = self.inner.key(input);
        self
    }

    /// Key of the object to get.
    pub fn get_key(&self) -> &Option<String> {
        self.inner.get_key()
    }

    /// File the object is written to
    pub fn destination(mut self, input: impl AsRef<Path>) -> Self {
        self.inner = self.inner.destination(input);
        self
    }
}

impl crate::operation::download::input::DownloadInputBuilder {
    /// Download a single object with this input using the given client.
    pub async fn send_with(self, client: &crate::Client) -> Result<DownloadOutput, Error> {
        let mut fluent_builder = client.download();
        fluent_builder.inner = self;
        fluent_builder.send().await
    }
}
