/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::future::Future;
use std::sync::Arc;

use futures_util::TryFutureExt;
use pin_project_lite::pin_project;
use tokio::sync::{OwnedSemaphorePermit, Semaphore, TryAcquireError};

use crate::error;

/// A bounded pool of workers that part tasks run on.
///
/// Every part acquires one permit before calling the transport and releases it when done, so
/// at most [`size`](WorkerPool::size) parts are in flight at once across every transfer
/// sharing the pool. The pool is internally reference-counted and can be freely cloned.
///
/// A pool passed in through [`Config`](crate::Config) is owned by the caller and is never shut
/// down by a transfer. Pools created by a transfer are shut down when the transfer ends.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    semaphore: Arc<Semaphore>,
    size: usize,
}

impl WorkerPool {
    /// Create a new pool with `size` workers (at least one).
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(size)),
            size,
        }
    }

    /// Number of workers in the pool
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of workers not currently running a part
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Shut the pool down.
    ///
    /// Parts already running finish normally. Parts waiting for a worker, and any acquired
    /// afterwards, fail with [`ErrorKind::RuntimeError`](crate::error::ErrorKind::RuntimeError).
    pub fn shutdown(&self) {
        tracing::trace!("shutting down worker pool of size {}", self.size);
        self.semaphore.close();
    }

    /// True once [`shutdown`](WorkerPool::shutdown) has been called
    pub fn is_shutdown(&self) -> bool {
        self.semaphore.is_closed()
    }

    /// Acquire a permit to run one part
    pub(crate) fn acquire_permit(&self) -> AcquirePermitFuture {
        match self.semaphore.clone().try_acquire_owned() {
            Ok(permit) => AcquirePermitFuture::ready(Ok(OwnedWorkPermit::from(permit))),
            Err(TryAcquireError::NoPermits) => {
                let inner = self
                    .semaphore
                    .clone()
                    .acquire_owned()
                    .map_ok(OwnedWorkPermit::from)
                    .map_err(|_| error::pool_shutdown());
                AcquirePermitFuture::new(inner)
            }
            Err(TryAcquireError::Closed) => AcquirePermitFuture::ready(Err(error::pool_shutdown())),
        }
    }
}

/// A worker pool together with whether the current transfer owns it.
///
/// Dropping an owned lease shuts the pool down. Dropping a borrowed lease leaves the pool
/// untouched.
#[derive(Debug)]
pub struct PoolLease {
    pool: WorkerPool,
    owned: bool,
}

impl PoolLease {
    /// Create a new pool of `size` workers owned by the lease
    pub fn owned(size: usize) -> Self {
        Self {
            pool: WorkerPool::new(size),
            owned: true,
        }
    }

    /// Borrow a caller supplied pool
    pub fn borrowed(pool: WorkerPool) -> Self {
        Self { pool, owned: false }
    }

    /// The leased pool
    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// True when the pool is shut down together with the lease
    pub fn is_owned(&self) -> bool {
        self.owned
    }
}

impl Drop for PoolLease {
    fn drop(&mut self) {
        if self.owned {
            self.pool.shutdown();
        }
    }
}

/// An owned permit from the pool to run one part.
#[must_use]
#[clippy::has_significant_drop]
#[derive(Debug)]
pub(crate) struct OwnedWorkPermit {
    _inner: OwnedSemaphorePermit,
}

impl From<OwnedSemaphorePermit> for OwnedWorkPermit {
    fn from(value: OwnedSemaphorePermit) -> Self {
        Self { _inner: value }
    }
}

pin_project! {
    #[derive(Debug)]
    pub(crate) struct AcquirePermitFuture {
        #[pin]
        inner: aws_smithy_async::future::now_or_later::NowOrLater<
            Result<OwnedWorkPermit, error::Error>,
            aws_smithy_async::future::BoxFuture<'static, OwnedWorkPermit, error::Error>
        >,
    }
}

impl AcquirePermitFuture {
    fn new<F>(future: F) -> Self
    where
        F: Future<Output = Result<OwnedWorkPermit, error::Error>> + Send + 'static,
    {
        Self {
            inner: aws_smithy_async::future::now_or_later::NowOrLater::new(Box::pin(future)),
        }
    }

    fn ready(result: Result<OwnedWorkPermit, error::Error>) -> Self {
        Self {
            inner: aws_smithy_async::future::now_or_later::NowOrLater::ready(result),
        }
    }
}

impl Future for AcquirePermitFuture {
    type Output = Result<OwnedWorkPermit, error::Error>;

    fn poll(
        self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Self::Output> {
        let this = self.project();
        this.inner.poll(cx)
    }
}
