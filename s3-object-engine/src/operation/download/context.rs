/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::path::PathBuf;

use crate::operation::TransferContext;

/// Shared context used across a single download request
pub(crate) type DownloadContext = TransferContext<DownloadState>;

#[derive(Debug)]
pub(crate) struct DownloadState {
    pub(crate) destination: PathBuf,
}
