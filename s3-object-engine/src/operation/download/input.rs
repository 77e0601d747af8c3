/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::path::{Path, PathBuf};

use crate::error::{self, Error};
use crate::types::ObjectPath;

/// Input type for downloading a single object
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadInput {
    /// The object to download
    pub path: ObjectPath,

    /// File the object is written to. An existing file is truncated.
    pub destination: PathBuf,
}

impl DownloadInput {
    /// Creates a new builder-style object to manufacture [`DownloadInput`].
    pub fn builder() -> DownloadInputBuilder {
        DownloadInputBuilder::default()
    }

    /// The object to download
    pub fn path(&self) -> &ObjectPath {
        &self.path
    }

    /// File the object is written to
    pub fn destination(&self) -> &Path {
        &self.destination
    }
}

/// A builder for [`DownloadInput`].
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadInputBuilder {
    pub(crate) bucket: Option<String>,
    pub(crate) key: Option<String>,
    pub(crate) destination: Option<PathBuf>,
}

impl DownloadInputBuilder {
    /// The bucket containing the object.
    ///
    /// This field is required.
    pub fn bucket(mut self, input: impl Into<String>) -> Self {
        self.bucket = Some(input.into());
        self
    }

    /// The bucket containing the object.
    pub fn set_bucket(mut self, input: Option<String>) -> Self {
        self.bucket = input;
        self
    }

    /// The bucket containing the object.
    pub fn get_bucket(&self) -> &Option<String> {
        &self.bucket
    }

    /// Key of the object to get.
    ///
    /// This field is required.
    pub fn key(mut self, input: impl Into<String>) -> Self {
        self.key = Some(input.into());
        self
    }

    /// Key of the object to get.
    pub fn set_key(mut self, input: Option<String>) -> Self {
        self.key = input;
        self
    }

    /// Key of the object to get.
    pub fn get_key(&self) -> &Option<String> {
        &self.key
    }

    /// File the object is written to.
    ///
    /// This field is required.
    pub fn destination(mut self, input: impl AsRef<Path>) -> Self {
        self.destination = Some(input.as_ref().to_owned());
        self
    }

    /// File the object is written to.
    pub fn set_destination(mut self, input: Option<PathBuf>) -> Self {
        self.destination = input;
        self
    }

    /// File the object is written to.
    pub fn get_destination(&self) -> &Option<PathBuf> {
        &self.destination
    }

    /// Consumes the builder and constructs a [`DownloadInput`].
    pub fn build(self) -> Result<DownloadInput, Error> {
        let bucket = self
            .bucket
            .ok_or_else(|| error::invalid_input("bucket is required"))?;
        let key = self
            .key
            .ok_or_else(|| error::invalid_input("key is required"))?;
        let destination = self
            .destination
            .ok_or_else(|| error::invalid_input("destination is required"))?;
        Ok(DownloadInput {
            path: ObjectPath::new(bucket, key),
            destination,
        })
    }
}
