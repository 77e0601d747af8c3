/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::task::Poll;

use tower::Service;

use super::future::ResponseFuture;
use crate::error;
use crate::runtime::WorkerPool;

/// Enforces a limit on the concurrent requests an underlying service receives
/// using the workers of the given [`WorkerPool`].
#[derive(Debug)]
pub(crate) struct PoolLimit<T> {
    inner: T,
    pool: WorkerPool,
}

impl<T> PoolLimit<T> {
    /// Create a new pool limiter
    pub(crate) fn new(inner: T, pool: WorkerPool) -> Self {
        PoolLimit { inner, pool }
    }
}

impl<S, Request> Service<Request> for PoolLimit<S>
where
    S: Service<Request> + Clone,
    S::Error: From<error::Error>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = ResponseFuture<S, Request>;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        // Parts are submitted eagerly, so acquiring a worker here would hold it long before
        // the part runs. The worker is acquired in the response future instead and the inner
        // service is treated as a oneshot.
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let permit_fut = self.pool.acquire_permit();
        ResponseFuture::new(self.inner.clone(), req, permit_fut)
    }
}

impl<T: Clone> Clone for PoolLimit<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            pool: self.pool.clone(),
        }
    }
}
