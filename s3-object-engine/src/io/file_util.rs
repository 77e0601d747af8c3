/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Positional reads and writes on a [`std::fs::File`]. Callers run these on a blocking thread.

#[cfg(unix)]
pub(super) use unix::{read_file_chunk_sync, write_file_chunk_sync};
#[cfg(windows)]
pub(super) use windows::{read_file_chunk_sync, write_file_chunk_sync};

#[cfg(unix)]
mod unix {
    use std::fs::File;
    use std::io;
    use std::os::unix::fs::FileExt;

    pub(crate) fn read_file_chunk_sync(file: &File, dst: &mut [u8], offset: u64) -> io::Result<()> {
        file.read_exact_at(dst, offset)
    }

    pub(crate) fn write_file_chunk_sync(file: &File, src: &[u8], offset: u64) -> io::Result<()> {
        file.write_all_at(src, offset)
    }
}

#[cfg(windows)]
mod windows {
    use std::fs::File;
    use std::io;
    use std::os::windows::fs::FileExt;

    pub(crate) fn read_file_chunk_sync(file: &File, mut dst: &mut [u8], mut offset: u64) -> io::Result<()> {
        while !dst.is_empty() {
            match file.seek_read(dst, offset)? {
                0 => return Err(io::ErrorKind::UnexpectedEof.into()),
                n => {
                    dst = &mut dst[n..];
                    offset += n as u64;
                }
            }
        }
        Ok(())
    }

    pub(crate) fn write_file_chunk_sync(file: &File, mut src: &[u8], mut offset: u64) -> io::Result<()> {
        while !src.is_empty() {
            match file.seek_write(src, offset)? {
                0 => return Err(io::ErrorKind::WriteZero.into()),
                n => {
                    src = &src[n..];
                    offset += n as u64;
                }
            }
        }
        Ok(())
    }
}
