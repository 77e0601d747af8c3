/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

/// Operation builders
pub mod builders;

mod input;
/// Request type for downloading a single object
pub use input::{DownloadInput, DownloadInputBuilder};

mod output;
/// Response type for downloading a single object
pub use output::{DownloadMode, DownloadOutput};

mod context;
mod service;

use std::sync::Arc;

use tokio::io::AsyncWriteExt;

use crate::error::{self, Error, ErrorKind};
use crate::io::destination::RandomAccessFile;
use crate::operation::plan::{self, MAX_PARTS};
use context::{DownloadContext, DownloadState};

/// Operation struct for single object download
#[derive(Clone, Default, Debug)]
pub(crate) struct Download;

impl Download {
    /// Execute a single `Download` transfer operation
    #[tracing::instrument(skip_all, level = "debug", fields(path = %input.path))]
    pub(crate) async fn orchestrate(
        handle: Arc<crate::client::Handle>,
        input: DownloadInput,
    ) -> Result<DownloadOutput, Error> {
        let DownloadInput { path, destination } = input;

        let content_length = handle
            .transport()
            .get_object_size(&path)
            .await
            .map_err(error::transport)?;
        let threshold = handle.parallel_download_threshold_bytes();
        let ctx = DownloadContext::new(handle, path, content_length, DownloadState { destination });

        if content_length >= threshold {
            tracing::debug!("object size {content_length} at or above parallel threshold {threshold}");
            download_parallel(ctx, content_length).await
        } else {
            tracing::debug!("object size {content_length} below parallel threshold {threshold}");
            download_single_stream(ctx, content_length).await
        }
    }
}

async fn download_parallel(
    ctx: DownloadContext,
    content_length: u64,
) -> Result<DownloadOutput, Error> {
    let plan = plan::plan(
        content_length,
        ctx.handle().download_part_size_bytes(),
        ctx.handle().min_download_part_size_bytes(),
        MAX_PARTS,
    );
    let parts = plan.len();
    let file = RandomAccessFile::create(&ctx.state().destination, content_length).await?;

    let lease = ctx.lease_pool();
    service::download_parts(&ctx, plan.into_parts(), &file, lease.pool()).await?;
    drop(lease);

    file.sync_all().await?;
    Ok(DownloadOutput {
        content_length,
        mode: DownloadMode::Parallel { parts },
        used_pool: true,
    })
}

async fn download_single_stream(
    ctx: DownloadContext,
    content_length: u64,
) -> Result<DownloadOutput, Error> {
    let mut body = ctx
        .transport()
        .read_range(ctx.path(), None)
        .await
        .map_err(error::transport)?;
    let mut file = tokio::fs::File::create(&ctx.state().destination).await?;

    let mut received = 0;
    while let Some(buf) = body.try_next().await? {
        file.write_all(&buf).await?;
        received += buf.len() as u64;
        ctx.progress().record(buf.len() as u64);
    }
    file.flush().await?;

    if received != content_length {
        return Err(Error::new(
            ErrorKind::Transport,
            format!("received {received} bytes of a {content_length} byte object"),
        ));
    }

    Ok(DownloadOutput {
        content_length,
        mode: DownloadMode::SingleStream,
        used_pool: false,
    })
}
