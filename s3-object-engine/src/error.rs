/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::fmt;

/// A boxed error that is `Send` and `Sync`.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors returned by this library
///
/// NOTE: Use [`aws_smithy_types::error::display::DisplayErrorContext`] or similar to display
/// the entire error cause/source chain.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    source: BoxError,
}

/// General categories of errors.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Bad key material, missing transport or other unusable configuration. Never retried.
    Configuration,

    /// Operation input validation issues
    InputInvalid,

    /// I/O errors
    IOError,

    /// A transport call outside of any single part failed (size lookup, initiate, complete, etc)
    Transport,

    /// Failed to upload or download a part of an object
    ChunkFailed(ChunkFailed),

    /// Some kind of internal runtime issue (e.g. task failure, worker pool shut down, etc)
    RuntimeError,
}

/// Stores information about a failed part
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChunkFailed {
    part_number: u64,
}

impl ChunkFailed {
    /// The (1-based) number of the part that failed
    pub fn part_number(&self) -> u64 {
        self.part_number
    }
}

impl Error {
    /// Creates a new [`Error`] from a known kind of error as well as an arbitrary error
    /// source.
    pub fn new<E>(kind: ErrorKind, err: E) -> Error
    where
        E: Into<BoxError>,
    {
        Error {
            kind,
            source: err.into(),
        }
    }

    /// Returns the corresponding [`ErrorKind`] for this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::Configuration => write!(f, "invalid configuration"),
            ErrorKind::InputInvalid => write!(f, "invalid input"),
            ErrorKind::IOError => write!(f, "I/O error"),
            ErrorKind::Transport => write!(f, "transport request failed"),
            ErrorKind::ChunkFailed(chunk_failed) => {
                write!(f, "failed to transfer part {}", chunk_failed.part_number)
            }
            ErrorKind::RuntimeError => write!(f, "runtime error"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref())
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::new(ErrorKind::IOError, value)
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(value: tokio::task::JoinError) -> Self {
        Self::new(ErrorKind::RuntimeError, value)
    }
}

impl From<tokio::sync::AcquireError> for Error {
    fn from(value: tokio::sync::AcquireError) -> Self {
        Self::new(ErrorKind::RuntimeError, value)
    }
}

impl From<aws_smithy_types::byte_stream::error::Error> for Error {
    fn from(value: aws_smithy_types::byte_stream::error::Error) -> Self {
        Self::new(ErrorKind::IOError, value)
    }
}

pub(crate) fn invalid_input<E>(err: E) -> Error
where
    E: Into<BoxError>,
{
    Error::new(ErrorKind::InputInvalid, err)
}

pub(crate) fn configuration<E>(err: E) -> Error
where
    E: Into<BoxError>,
{
    Error::new(ErrorKind::Configuration, err)
}

pub(crate) fn transport<E>(err: E) -> Error
where
    E: Into<BoxError>,
{
    Error::new(ErrorKind::Transport, err)
}

pub(crate) fn chunk_failed<E>(part_number: u64, err: E) -> Error
where
    E: Into<BoxError>,
{
    Error::new(ErrorKind::ChunkFailed(ChunkFailed { part_number }), err)
}

pub(crate) fn from_kind<E>(kind: ErrorKind) -> impl FnOnce(E) -> Error
where
    E: Into<BoxError>,
{
    |err| Error::new(kind, err)
}

static POOL_SHUTDOWN_ERROR: &str = "worker pool has been shut down";

pub(crate) fn pool_shutdown() -> Error {
    Error::new(ErrorKind::RuntimeError, POOL_SHUTDOWN_ERROR)
}
