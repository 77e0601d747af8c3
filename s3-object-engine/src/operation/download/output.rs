/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

/// How an object was downloaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadMode {
    /// Concurrent ranged GETs written at their offsets
    Parallel {
        /// Number of ranged GETs
        parts: usize,
    },
    /// One GET streamed to the destination
    SingleStream,
}

/// Response type for a single object download
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutput {
    /// Size of the object in bytes
    pub content_length: u64,

    /// How the object was downloaded
    pub mode: DownloadMode,

    /// Whether the parts ran on a worker pool
    pub used_pool: bool,
}

impl DownloadOutput {
    /// Size of the object in bytes
    pub fn content_length(&self) -> u64 {
        self.content_length
    }

    /// How the object was downloaded
    pub fn mode(&self) -> DownloadMode {
        self.mode
    }

    /// Whether the parts ran on a worker pool
    pub fn used_pool(&self) -> bool {
        self.used_pool
    }
}
