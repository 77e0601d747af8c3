/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};

use super::file_util;
use crate::error::{self, Error};

/// Source of the data for an upload.
///
/// Seekable sources (a file or an in-memory buffer) have their parts read independently by the
/// part tasks and can be uploaded in parallel. A non-seekable reader is read in order by the
/// upload itself, one part at a time.
pub struct UploadSource {
    inner: RawSource,
}

enum RawSource {
    Buf(Bytes),
    Path { path: PathBuf, length: u64 },
    Reader {
        reader: Pin<Box<dyn AsyncRead + Send>>,
        length: u64,
    },
}

impl UploadSource {
    /// Upload the file at `path`.
    ///
    /// The file must exist and be a regular file. Its length is read once here and the contents
    /// MUST NOT change while the upload runs.
    ///
    /// # Examples
    /// ```no_run
    /// use s3_object_engine::io::UploadSource;
    ///
    /// let source = UploadSource::from_path("docs/rows.csv").expect("file should be readable");
    /// ```
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path).map_err(|err| {
            error::invalid_input(format!("cannot read `{}`: {err}", path.display()))
        })?;
        if !metadata.is_file() {
            return Err(error::invalid_input(format!(
                "`{}` is not a regular file",
                path.display()
            )));
        }

        Ok(Self {
            inner: RawSource::Path {
                path: path.to_owned(),
                length: metadata.len(),
            },
        })
    }

    /// Upload `length` bytes read from `reader`.
    ///
    /// The reader cannot be rewound, so its parts are uploaded one at a time. Reaching EOF
    /// before `length` bytes were read fails the upload.
    pub fn from_reader<R>(reader: R, length: u64) -> Self
    where
        R: AsyncRead + Send + 'static,
    {
        Self {
            inner: RawSource::Reader {
                reader: Box::pin(reader),
                length,
            },
        }
    }

    /// Total number of bytes to upload
    pub fn len(&self) -> u64 {
        match &self.inner {
            RawSource::Buf(buf) => buf.len() as u64,
            RawSource::Path { length, .. } => *length,
            RawSource::Reader { length, .. } => *length,
        }
    }

    /// True when there is nothing to upload
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when parts can be read in any order
    pub fn is_seekable(&self) -> bool {
        !matches!(self.inner, RawSource::Reader { .. })
    }

    pub(crate) fn into_reader(self) -> SourceReader {
        match self.inner {
            RawSource::Buf(buf) => SourceReader::Seekable(SeekableSource::Buf(buf)),
            RawSource::Path { path, .. } => SourceReader::Seekable(SeekableSource::Path(path)),
            RawSource::Reader { reader, length } => SourceReader::Sequential(SequentialReader {
                reader,
                remaining: length,
            }),
        }
    }
}

impl fmt::Debug for UploadSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            RawSource::Buf(buf) => f.debug_tuple("UploadSource::Buf").field(&buf.len()).finish(),
            RawSource::Path { path, length } => f
                .debug_struct("UploadSource::Path")
                .field("path", path)
                .field("length", length)
                .finish(),
            RawSource::Reader { length, .. } => f
                .debug_struct("UploadSource::Reader")
                .field("length", length)
                .finish(),
        }
    }
}

impl Default for UploadSource {
    fn default() -> Self {
        Self::from(Bytes::new())
    }
}

impl From<Bytes> for UploadSource {
    fn from(value: Bytes) -> Self {
        Self {
            inner: RawSource::Buf(value),
        }
    }
}

impl From<Vec<u8>> for UploadSource {
    fn from(value: Vec<u8>) -> Self {
        Self::from(Bytes::from(value))
    }
}

impl From<&'static [u8]> for UploadSource {
    fn from(slice: &'static [u8]) -> Self {
        Self::from(Bytes::from_static(slice))
    }
}

impl From<&'static str> for UploadSource {
    fn from(slice: &'static str) -> Self {
        Self::from(Bytes::from_static(slice.as_bytes()))
    }
}

/// How the parts of an upload source are read
#[derive(Debug)]
pub(crate) enum SourceReader {
    /// Any part can be read at any time
    Seekable(SeekableSource),
    /// Parts must be read in order
    Sequential(SequentialReader),
}

/// A source that can be read at any offset. Cheap to clone.
#[derive(Debug, Clone)]
pub(crate) enum SeekableSource {
    Buf(Bytes),
    Path(PathBuf),
}

impl SeekableSource {
    /// Read exactly `length` bytes starting at `offset`
    pub(crate) async fn read_range(&self, offset: u64, length: u64) -> Result<Bytes, Error> {
        match self {
            SeekableSource::Buf(buf) => {
                let start = offset as usize;
                let end = start + length as usize;
                if end > buf.len() {
                    return Err(error::invalid_input(format!(
                        "range {start}..{end} is out of bounds for a {} byte buffer",
                        buf.len()
                    )));
                }
                Ok(buf.slice(start..end))
            }
            SeekableSource::Path(path) => {
                let path = path.clone();
                let handle = tokio::task::spawn_blocking(move || {
                    let file = File::open(path)?;
                    let mut dst = vec![0; length as usize];
                    file_util::read_file_chunk_sync(&file, &mut dst, offset)?;
                    Ok::<Bytes, Error>(Bytes::from(dst))
                });
                handle.await?
            }
        }
    }
}

/// A source that can only be read front to back.
pub(crate) struct SequentialReader {
    reader: Pin<Box<dyn AsyncRead + Send>>,
    remaining: u64,
}

impl SequentialReader {
    /// Read the next `length` bytes
    pub(crate) async fn next_chunk(&mut self, length: u64) -> Result<Bytes, Error> {
        if length > self.remaining {
            return Err(error::invalid_input(format!(
                "requested {length} bytes but only {} remain in the source",
                self.remaining
            )));
        }

        let mut dst = BytesMut::zeroed(length as usize);
        self.reader.read_exact(&mut dst).await?;
        self.remaining -= length;
        Ok(dst.freeze())
    }
}

impl fmt::Debug for SequentialReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequentialReader")
            .field("remaining", &self.remaining)
            .finish_non_exhaustive()
    }
}
