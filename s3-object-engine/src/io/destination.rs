/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;

use super::file_util;
use crate::error::Error;

/// A download destination written at arbitrary offsets by concurrent part tasks.
///
/// Parts of one download never overlap, so writes need no coordination beyond the shared
/// handle.
#[derive(Debug, Clone)]
pub(crate) struct RandomAccessFile {
    file: Arc<File>,
}

impl RandomAccessFile {
    /// Create (or truncate) the file at `path` and pre-size it to `length` bytes
    pub(crate) async fn create(path: impl AsRef<Path>, length: u64) -> Result<Self, Error> {
        let path = path.as_ref().to_owned();
        let handle = tokio::task::spawn_blocking(move || {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&path)?;
            file.set_len(length)?;
            Ok::<File, Error>(file)
        });

        let file = handle.await??;
        Ok(Self {
            file: Arc::new(file),
        })
    }

    /// Write all of `data` starting at `offset`
    pub(crate) async fn write_at(&self, offset: u64, data: Bytes) -> Result<(), Error> {
        let file = self.file.clone();
        let handle = tokio::task::spawn_blocking(move || {
            file_util::write_file_chunk_sync(&file, &data, offset)
        });
        handle.await??;
        Ok(())
    }

    /// Flush file contents to disk
    pub(crate) async fn sync_all(&self) -> Result<(), Error> {
        let file = self.file.clone();
        tokio::task::spawn_blocking(move || file.sync_all()).await??;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::RandomAccessFile;
    use bytes::Bytes;

    #[tokio::test]
    async fn test_out_of_order_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("object");
        let file = RandomAccessFile::create(&path, 12).await.unwrap();
        assert_eq!(12, std::fs::metadata(&path).unwrap().len());

        file.write_at(8, Bytes::from_static(b"ijkl")).await.unwrap();
        file.write_at(0, Bytes::from_static(b"abcd")).await.unwrap();
        file.write_at(4, Bytes::from_static(b"efgh")).await.unwrap();
        file.sync_all().await.unwrap();

        assert_eq!(b"abcdefghijkl".to_vec(), std::fs::read(&path).unwrap());
    }

    #[tokio::test]
    async fn test_create_truncates_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("object");
        std::fs::write(&path, b"previous contents that are longer").unwrap();

        let file = RandomAccessFile::create(&path, 4).await.unwrap();
        file.write_at(0, Bytes::from_static(b"new!")).await.unwrap();
        assert_eq!(b"new!".to_vec(), std::fs::read(&path).unwrap());
    }
}
