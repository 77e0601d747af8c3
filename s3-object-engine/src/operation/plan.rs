/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::cmp;

use crate::types::ByteRange;

/// Maximum number of parts that a single S3 multipart upload supports
pub(crate) const MAX_PARTS: u64 = 10_000;

/// One contiguous byte range of an object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Part {
    pub(crate) part_number: u64,
    pub(crate) offset: u64,
    pub(crate) length: u64,
}

impl Part {
    pub(crate) fn range(&self) -> ByteRange {
        ByteRange::from_offset(self.offset, self.length)
    }
}

/// Ordered parts covering `[0, total_size)` exactly once
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TransferPlan {
    part_size: u64,
    parts: Vec<Part>,
}

impl TransferPlan {
    /// The effective part size, every part but the last has exactly this length
    pub(crate) fn part_size(&self) -> u64 {
        self.part_size
    }

    pub(crate) fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub(crate) fn len(&self) -> usize {
        self.parts.len()
    }

    pub(crate) fn into_parts(self) -> Vec<Part> {
        self.parts
    }
}

/// Split `total_size` bytes into parts.
///
/// The part size is the largest of `requested_part_size`, `min_part_size` and whatever keeps
/// the part count at or below `max_parts`. The final part holds the remainder.
pub(crate) fn plan(
    total_size: u64,
    requested_part_size: u64,
    min_part_size: u64,
    max_parts: u64,
) -> TransferPlan {
    debug_assert!(max_parts > 0, "max_parts must be non-zero");
    let part_size = cmp::max(
        cmp::max(requested_part_size, min_part_size),
        total_size.div_ceil(cmp::max(max_parts, 1)),
    )
    .max(1);

    let mut parts = Vec::with_capacity(total_size.div_ceil(part_size) as usize);
    let mut offset = 0;
    let mut part_number = 1;
    while offset < total_size {
        let length = cmp::min(part_size, total_size - offset);
        parts.push(Part {
            part_number,
            offset,
            length,
        });
        offset += length;
        part_number += 1;
    }

    TransferPlan { part_size, parts }
}
