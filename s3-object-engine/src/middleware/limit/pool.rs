/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Limit the number of requests being concurrently processed by a service to the number of
//! workers in a [`WorkerPool`](crate::runtime::WorkerPool).
//!
//! This middleware is similar to `tower::limit::concurrency` but the limit is shared by every
//! service built on the same pool, and a shut down pool fails requests instead of queuing them.

mod future;
mod layer;
mod service;

pub(crate) use self::layer::PoolLimitLayer;
