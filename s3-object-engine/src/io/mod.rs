/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

/// Random access download destinations
pub(crate) mod destination;
mod file_util;
mod source;

// re-exports
pub use self::source::UploadSource;
pub(crate) use self::source::{SeekableSource, SequentialReader, SourceReader};
