/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

/// Run each request on a worker from a [`WorkerPool`](crate::runtime::WorkerPool)
pub(crate) mod pool;
