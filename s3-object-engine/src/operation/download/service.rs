/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */
use crate::error::{self, BoxError, Error};
use crate::io::destination::RandomAccessFile;
use crate::middleware::limit::pool::PoolLimitLayer;
use crate::operation::download::DownloadContext;
use crate::operation::plan::Part;
use crate::runtime::WorkerPool;
use tokio::task::JoinSet;
use tower::{service_fn, Service, ServiceBuilder, ServiceExt};
use tracing::Instrument;

/// Request/input type for our "chunk" service.
#[derive(Debug, Clone)]
pub(super) struct DownloadChunkRequest {
    pub(super) ctx: DownloadContext,
    pub(super) part: Part,
    pub(super) file: RandomAccessFile,
}

/// handler (service fn) for a single chunk
async fn download_chunk_handler(request: DownloadChunkRequest) -> Result<u64, Error> {
    let DownloadChunkRequest { ctx, part, file } = request;
    let written = write_range(&ctx, &part, &file)
        .await
        .map_err(|err| error::chunk_failed(part.part_number, err))?;
    ctx.progress().record(written);
    Ok(written)
}

/// Stream `part` of the object into `file` at the part's offset
async fn write_range(
    ctx: &DownloadContext,
    part: &Part,
    file: &RandomAccessFile,
) -> Result<u64, BoxError> {
    let mut body = ctx
        .transport()
        .read_range(ctx.path(), Some(part.range()))
        .await?;

    let mut written = 0;
    while let Some(buf) = body.try_next().await? {
        let len = buf.len() as u64;
        if written + len > part.length {
            return Err(format!(
                "received more than the {} bytes requested for part {}",
                part.length, part.part_number
            )
            .into());
        }
        file.write_at(part.offset + written, buf).await?;
        written += len;
    }

    if written != part.length {
        return Err(format!(
            "received {written} of the {} bytes requested for part {}",
            part.length, part.part_number
        )
        .into());
    }
    Ok(written)
}

/// Create a new tower::Service for downloading individual chunks of an object
pub(super) fn chunk_service(
    pool: &WorkerPool,
) -> impl Service<DownloadChunkRequest, Response = u64, Error = Error, Future: Send> + Clone + Send
{
    let svc = service_fn(download_chunk_handler);
    ServiceBuilder::new()
        .layer(PoolLimitLayer::new(pool.clone()))
        .service(svc)
}

/// Spawn one task per part and wait for all of them to settle.
///
/// The first error observed wins.
pub(super) async fn download_parts(
    ctx: &DownloadContext,
    parts: Vec<Part>,
    file: &RandomAccessFile,
    pool: &WorkerPool,
) -> Result<(), Error> {
    let svc = chunk_service(pool);
    let mut tasks = JoinSet::new();

    for part in parts {
        tracing::trace!("distributing chunk {:?}", part);
        let req = DownloadChunkRequest {
            ctx: ctx.clone(),
            part,
            file: file.clone(),
        };
        let svc = svc.clone();
        tasks.spawn(
            svc.oneshot(req)
                .instrument(tracing::debug_span!("download-chunk", part_number = part.part_number)),
        );
    }
    tracing::trace!("work fully distributed");

    let mut first_err = None;
    while let Some(joined) = tasks.join_next().await {
        match joined.map_err(Error::from).and_then(|result| result) {
            Ok(_) => {}
            Err(err) if first_err.is_none() => first_err = Some(err),
            Err(err) => tracing::debug!("ignoring later chunk failure: {err}"),
        }
    }

    match first_err {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
