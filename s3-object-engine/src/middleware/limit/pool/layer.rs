/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::runtime::WorkerPool;
use tower::Layer;

use super::service::PoolLimit;

/// Runs each request of the underlying service on a worker of the given pool.
#[derive(Debug, Clone)]
pub(crate) struct PoolLimitLayer {
    pool: WorkerPool,
}

impl PoolLimitLayer {
    /// Create a new pool limit layer.
    pub(crate) const fn new(pool: WorkerPool) -> Self {
        PoolLimitLayer { pool }
    }
}

impl<S> Layer<S> for PoolLimitLayer {
    type Service = PoolLimit<S>;

    fn layer(&self, service: S) -> Self::Service {
        PoolLimit::new(service, self.pool.clone())
    }
}
