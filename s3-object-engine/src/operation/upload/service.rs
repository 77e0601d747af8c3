/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::collections::BTreeMap;
use std::sync::Arc;

use bytes::Bytes;
use tokio::task::JoinSet;
use tower::{service_fn, Service, ServiceBuilder, ServiceExt};
use tracing::Instrument;

use crate::error::{self, Error};
use crate::io::{SeekableSource, SequentialReader};
use crate::middleware::limit::pool::PoolLimitLayer;
use crate::operation::plan::Part;
use crate::runtime::WorkerPool;
use crate::types::{CompletedPart, UploadedPart};

use super::context::UploadContext;

/// Where a part task gets its bytes from
#[derive(Debug, Clone)]
pub(super) enum PartBody {
    /// the task reads its own range
    Source(SeekableSource),
    /// already read by the coordinator
    Buffered(Bytes),
}

/// Request/input type for our "upload_part" service.
#[derive(Debug, Clone)]
pub(super) struct UploadPartRequest {
    pub(super) ctx: UploadContext,
    pub(super) upload_id: Arc<str>,
    pub(super) part: Part,
    pub(super) body: PartBody,
}

/// handler (service fn) for a single part
async fn upload_part_handler(request: UploadPartRequest) -> Result<CompletedPart, Error> {
    let UploadPartRequest {
        ctx,
        upload_id,
        part,
        body,
    } = request;
    let part_number = part.part_number;

    let data = match body {
        PartBody::Source(source) => source
            .read_range(part.offset, part.length)
            .await
            .map_err(|err| error::chunk_failed(part_number, err))?,
        PartBody::Buffered(data) => data,
    };

    let e_tag = ctx
        .transport()
        .upload_part(ctx.path(), &upload_id, part_number, data)
        .await
        .map_err(|err| error::chunk_failed(part_number, err))?;

    tracing::trace!("completed upload of part number {part_number}");
    ctx.progress().record(part.length);
    Ok(CompletedPart {
        part_number,
        e_tag,
    })
}

/// Create a new tower::Service for uploading individual parts of an object
pub(super) fn upload_part_service(
    pool: &WorkerPool,
) -> impl Service<UploadPartRequest, Response = CompletedPart, Error = Error, Future: Send>
       + Clone
       + Send {
    let svc = service_fn(upload_part_handler);
    ServiceBuilder::new()
        .layer(PoolLimitLayer::new(pool.clone()))
        .service(svc)
}

/// Parts the server already holds with the planned size
fn already_uploaded<'a>(
    part: &Part,
    known: &'a BTreeMap<u64, UploadedPart>,
) -> Option<&'a UploadedPart> {
    known
        .get(&part.part_number)
        .filter(|uploaded| uploaded.size == part.length)
}

/// Upload every part of a seekable source.
///
/// One task per remaining part is spawned up front, each waits for a worker of `pool`. Every
/// task is allowed to settle, the first error observed wins.
pub(super) async fn upload_parts(
    ctx: &UploadContext,
    upload_id: Arc<str>,
    parts: Vec<Part>,
    known: &BTreeMap<u64, UploadedPart>,
    source: SeekableSource,
    pool: &WorkerPool,
) -> Result<Vec<CompletedPart>, Error> {
    let svc = upload_part_service(pool);
    let mut completed = Vec::with_capacity(parts.len());
    let mut tasks = JoinSet::new();

    for part in parts {
        if let Some(uploaded) = already_uploaded(&part, known) {
            tracing::debug!("skipping part {} uploaded earlier", part.part_number);
            ctx.progress().skip(part.length);
            completed.push(CompletedPart::from(uploaded.clone()));
            continue;
        }

        let req = UploadPartRequest {
            ctx: ctx.clone(),
            upload_id: upload_id.clone(),
            part,
            body: PartBody::Source(source.clone()),
        };
        let svc = svc.clone();
        let span = tracing::debug_span!("upload-part", part_number = part.part_number);
        tasks.spawn(svc.oneshot(req).instrument(span));
    }
    tracing::trace!("work distributed for uploading parts");

    let mut first_err = None;
    while let Some(joined) = tasks.join_next().await {
        match joined.map_err(Error::from).and_then(|result| result) {
            Ok(part) => completed.push(part),
            Err(err) if first_err.is_none() => first_err = Some(err),
            Err(err) => tracing::debug!("ignoring later part failure: {err}"),
        }
    }

    match first_err {
        Some(err) => Err(err),
        None => Ok(completed),
    }
}

/// Upload every part of a source that can only be read in order.
///
/// Parts are read and sent one at a time, the first failure ends the upload.
pub(super) async fn upload_parts_sequential(
    ctx: &UploadContext,
    upload_id: Arc<str>,
    parts: Vec<Part>,
    known: &BTreeMap<u64, UploadedPart>,
    mut reader: SequentialReader,
    pool: &WorkerPool,
) -> Result<Vec<CompletedPart>, Error> {
    let svc = upload_part_service(pool);
    let mut completed = Vec::with_capacity(parts.len());

    for part in parts {
        let data = reader
            .next_chunk(part.length)
            .await
            .map_err(|err| error::chunk_failed(part.part_number, err))?;

        if let Some(uploaded) = already_uploaded(&part, known) {
            tracing::debug!("skipping part {} uploaded earlier", part.part_number);
            ctx.progress().skip(part.length);
            completed.push(CompletedPart::from(uploaded.clone()));
            continue;
        }

        let req = UploadPartRequest {
            ctx: ctx.clone(),
            upload_id: upload_id.clone(),
            part,
            body: PartBody::Buffered(data),
        };
        let span = tracing::debug_span!("upload-part", part_number = part.part_number);
        let part = svc.clone().oneshot(req).instrument(span).await?;
        completed.push(part);
    }

    Ok(completed)
}
