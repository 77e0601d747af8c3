/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

/// Bounded worker pool that part tasks acquire permits from
pub mod worker_pool;

pub use worker_pool::{PoolLease, WorkerPool};
