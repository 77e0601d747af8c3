/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Receives progress notifications while an object is transferred.
///
/// Callbacks are invoked from the part tasks, possibly concurrently, and should return quickly.
pub trait ProgressListener: Send + Sync + fmt::Debug {
    /// `completed` of `total` bytes have been transferred so far
    fn progress(&self, completed: u64, total: u64);

    /// Another `bytes` have been transferred
    fn transferred(&self, bytes: u64);
}

/// Byte counter shared by every part task of one transfer.
#[derive(Debug, Clone)]
pub(crate) struct TransferProgress {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    transferred: AtomicU64,
    total: u64,
    listener: Option<Arc<dyn ProgressListener>>,
}

impl TransferProgress {
    pub(crate) fn new(total: u64, listener: Option<Arc<dyn ProgressListener>>) -> Self {
        Self {
            inner: Arc::new(Inner {
                transferred: AtomicU64::new(0),
                total,
                listener,
            }),
        }
    }

    /// Record `delta` newly transferred bytes and notify the listener
    pub(crate) fn record(&self, delta: u64) {
        let completed = self.inner.transferred.fetch_add(delta, Ordering::SeqCst) + delta;
        tracing::trace!("transferred {completed}/{} bytes", self.inner.total);
        if let Some(listener) = &self.inner.listener {
            listener.transferred(delta);
            listener.progress(completed, self.inner.total);
        }
    }

    /// Count `bytes` that were transferred by an earlier attempt without notifying `transferred`
    pub(crate) fn skip(&self, bytes: u64) {
        let completed = self.inner.transferred.fetch_add(bytes, Ordering::SeqCst) + bytes;
        if let Some(listener) = &self.inner.listener {
            listener.progress(completed, self.inner.total);
        }
    }

    pub(crate) fn transferred(&self) -> u64 {
        self.inner.transferred.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
pub(crate) mod test_util {
    use super::ProgressListener;
    use std::sync::Mutex;

    /// Records every notification
    #[derive(Debug, Default)]
    pub(crate) struct RecordingListener {
        pub(crate) progress: Mutex<Vec<(u64, u64)>>,
        pub(crate) transferred: Mutex<Vec<u64>>,
    }

    impl ProgressListener for RecordingListener {
        fn progress(&self, completed: u64, total: u64) {
            self.progress.lock().unwrap().push((completed, total));
        }

        fn transferred(&self, bytes: u64) {
            self.transferred.lock().unwrap().push(bytes);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_util::RecordingListener;
    use super::TransferProgress;
    use std::sync::Arc;

    #[test]
    fn test_record_notifies_listener() {
        let listener = Arc::new(RecordingListener::default());
        let progress = TransferProgress::new(30, Some(listener.clone()));

        progress.record(10);
        progress.skip(5);
        progress.record(15);

        assert_eq!(30, progress.transferred());
        assert_eq!(vec![10, 15], *listener.transferred.lock().unwrap());
        assert_eq!(
            vec![(10, 30), (15, 30), (30, 30)],
            *listener.progress.lock().unwrap()
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_concurrent_records() {
        let progress = TransferProgress::new(64 * 100, None);
        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..64 {
            let progress = progress.clone();
            tasks.spawn(async move {
                for _ in 0..100 {
                    progress.record(1);
                }
            });
        }
        while let Some(res) = tasks.join_next().await {
            res.unwrap();
        }
        assert_eq!(6400, progress.transferred());
    }
}
