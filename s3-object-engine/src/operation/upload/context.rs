/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::fmt;

use crate::operation::TransferContext;
use crate::types::ObjectMetadata;

/// Internal context used to drive a single Upload operation
pub(crate) type UploadContext = TransferContext<UploadState>;

/// Upload specific state shared by the part tasks
#[derive(Debug)]
pub(crate) struct UploadState {
    /// metadata applied when the object is created
    pub(crate) metadata: ObjectMetadata,
}

/// Stages of a multipart upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Stage {
    Init,
    Planned,
    Initiated,
    Uploading,
    Collected,
    Completed,
    Aborting,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Init => "init",
            Stage::Planned => "planned",
            Stage::Initiated => "initiated",
            Stage::Uploading => "uploading",
            Stage::Collected => "collected",
            Stage::Completed => "completed",
            Stage::Aborting => "aborting",
            Stage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Tracks the stage of one multipart upload and logs every transition.
#[derive(Debug)]
pub(crate) struct StageTracker {
    stage: Stage,
}

impl StageTracker {
    pub(crate) fn new() -> Self {
        Self { stage: Stage::Init }
    }

    pub(crate) fn stage(&self) -> Stage {
        self.stage
    }

    pub(crate) fn advance(&mut self, next: Stage) {
        debug_assert!(
            self.can_advance(next),
            "invalid upload transition {} -> {next}",
            self.stage
        );
        tracing::debug!("upload stage {} -> {next}", self.stage);
        self.stage = next;
    }

    fn can_advance(&self, next: Stage) -> bool {
        use Stage::*;
        matches!(
            (self.stage, next),
            (Init, Planned)
                | (Planned, Initiated)
                | (Initiated, Uploading)
                | (Uploading, Collected)
                | (Collected, Completed)
                | (Initiated | Uploading | Collected, Aborting)
                | (Aborting, Failed)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{Stage, StageTracker};

    #[test]
    fn test_happy_path_transitions() {
        let mut tracker = StageTracker::new();
        for next in [
            Stage::Planned,
            Stage::Initiated,
            Stage::Uploading,
            Stage::Collected,
            Stage::Completed,
        ] {
            tracker.advance(next);
        }
        assert_eq!(Stage::Completed, tracker.stage());
    }

    #[test]
    #[should_panic(expected = "invalid upload transition")]
    fn test_cannot_abort_before_initiate() {
        let mut tracker = StageTracker::new();
        tracker.advance(Stage::Planned);
        tracker.advance(Stage::Aborting);
    }
}
