/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::sync::Arc;

use crate::progress::TransferProgress;
use crate::runtime::PoolLease;
use crate::transport::ObjectTransport;
use crate::types::ObjectPath;

/// Types for single object upload operation
pub mod upload;

/// Types for single object download operation
pub mod download;

/// Splitting an object into ordered byte range parts
pub(crate) mod plan;

/// Container for maintaining context required to carry out a single operation/transfer.
///
/// `State` is whatever additional operation specific state is required for the operation.
#[derive(Debug)]
pub(crate) struct TransferContext<State> {
    handle: Arc<crate::client::Handle>,
    path: Arc<ObjectPath>,
    progress: TransferProgress,
    state: Arc<State>,
}

impl<State> TransferContext<State> {
    pub(crate) fn new(
        handle: Arc<crate::client::Handle>,
        path: ObjectPath,
        total_bytes: u64,
        state: State,
    ) -> Self {
        let progress =
            TransferProgress::new(total_bytes, handle.config.progress_listener().cloned());
        Self {
            handle,
            path: Arc::new(path),
            progress,
            state: Arc::new(state),
        }
    }

    /// The transport to send requests through
    pub(crate) fn transport(&self) -> &Arc<dyn ObjectTransport> {
        self.handle.transport()
    }

    /// The object being transferred
    pub(crate) fn path(&self) -> &ObjectPath {
        &self.path
    }

    pub(crate) fn progress(&self) -> &TransferProgress {
        &self.progress
    }

    pub(crate) fn handle(&self) -> &crate::client::Handle {
        &self.handle
    }

    pub(crate) fn state(&self) -> &State {
        &self.state
    }

    /// The worker pool to run parts on for this transfer
    pub(crate) fn lease_pool(&self) -> PoolLease {
        self.handle.lease_pool()
    }
}

impl<State> Clone for TransferContext<State> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle.clone(),
            path: self.path.clone(),
            progress: self.progress.clone(),
            state: self.state.clone(),
        }
    }
}
