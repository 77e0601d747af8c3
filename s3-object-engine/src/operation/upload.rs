/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

/// Operation builders
pub mod builders;
mod input;
mod output;

mod context;
mod service;

use std::collections::BTreeMap;
use std::sync::Arc;

use aws_smithy_types::error::display::DisplayErrorContext;

use crate::error::{self, BoxError, Error};
use crate::io::{SourceReader, UploadSource};
use crate::operation::plan::{self, Part, MAX_PARTS};
use crate::runtime::PoolLease;
use crate::transport::ETag;
use crate::types::{FailedMultipartUploadPolicy, ObjectMetadata, UploadMode, UploadedPart};
use context::{Stage, StageTracker, UploadContext, UploadState};
/// Request type for uploading a single object
pub use input::{ResumeContext, UploadInput, UploadInputBuilder};
/// Response type for uploading a single object
pub use output::UploadOutput;

/// Operation struct for single object upload
#[derive(Clone, Default, Debug)]
pub(crate) struct Upload;

impl Upload {
    /// Execute a single `Upload` transfer operation
    #[tracing::instrument(skip_all, level = "debug", fields(path = %input.path))]
    pub(crate) async fn orchestrate(
        handle: Arc<crate::client::Handle>,
        input: UploadInput,
    ) -> Result<UploadOutput, Error> {
        let UploadInput {
            path,
            source,
            metadata,
            resume,
        } = input;

        let mpu_threshold = handle.mpu_threshold_bytes();
        let upload_mode = handle.config.upload_mode().clone();
        let content_length = source.len();
        let ctx = UploadContext::new(handle, path, content_length, UploadState { metadata });

        match (upload_mode, resume) {
            (UploadMode::Multipart, Some(resume)) => {
                try_upload_multipart(ctx, source, Some(resume)).await
            }
            (UploadMode::ByteRange, Some(_)) => Err(error::invalid_input(
                "only multipart uploads can be resumed",
            )),
            _ if content_length == 0 || content_length < mpu_threshold => {
                tracing::trace!("upload request content size ({content_length}) less than multipart threshold ({mpu_threshold}); sending as single put");
                put_object(ctx, source).await
            }
            (UploadMode::Multipart, None) => try_upload_multipart(ctx, source, None).await,
            (UploadMode::ByteRange, None) => upload_byte_ranges(ctx, source).await,
        }
    }
}

fn metadata(ctx: &UploadContext) -> &ObjectMetadata {
    &ctx.state().metadata
}

/// Upload the whole source with one request
async fn put_object(ctx: UploadContext, source: UploadSource) -> Result<UploadOutput, Error> {
    let content_length = source.len();
    let data = match source.into_reader() {
        SourceReader::Seekable(source) => source.read_range(0, content_length).await?,
        SourceReader::Sequential(mut reader) => reader.next_chunk(content_length).await?,
    };

    let e_tag = ctx
        .transport()
        .put_object(ctx.path(), data, None, Some(metadata(&ctx)))
        .await
        .map_err(error::transport)?;
    ctx.progress().record(content_length);

    Ok(UploadOutput {
        e_tag,
        upload_id: None,
        content_length,
        parts: Vec::new(),
    })
}

/// Upload the source as a multipart upload, aborting the upload on failure unless asked to
/// retain it.
async fn try_upload_multipart(
    ctx: UploadContext,
    source: UploadSource,
    resume: Option<ResumeContext>,
) -> Result<UploadOutput, Error> {
    let content_length = source.len();
    let mut stage = StageTracker::new();

    let plan = plan::plan(
        content_length,
        ctx.handle().upload_part_size_bytes(),
        ctx.handle().min_upload_part_size_bytes(),
        MAX_PARTS,
    );
    let reader = source.into_reader();
    // parts of a stream are read in order, one at a time
    let lease = match &reader {
        SourceReader::Seekable(_) => ctx.lease_pool(),
        SourceReader::Sequential(_) => PoolLease::owned(1),
    };
    tracing::trace!(
        "upload request using multipart upload with part size: {} bytes, {} parts",
        plan.part_size(),
        plan.len()
    );
    stage.advance(Stage::Planned);

    let (upload_id, known) = match resume {
        Some(resume) => {
            let (upload_id, parts) = resume.into_parts();
            let known = match parts {
                Some(parts) => parts,
                None => list_parts(&ctx, &upload_id).await?,
            };
            tracing::debug!(
                "resuming multipart upload {upload_id} with {} parts uploaded",
                known.len()
            );
            (upload_id, known)
        }
        None => {
            let upload_id = ctx
                .transport()
                .initiate_multipart_upload(ctx.path(), metadata(&ctx))
                .await
                .map_err(error::transport)?;
            tracing::trace!("multipart upload started with upload id: {upload_id}");
            (upload_id, BTreeMap::new())
        }
    };
    stage.advance(Stage::Initiated);

    let upload_id: Arc<str> = Arc::from(upload_id);
    stage.advance(Stage::Uploading);
    let result = match reader {
        SourceReader::Seekable(source) => {
            service::upload_parts(
                &ctx,
                upload_id.clone(),
                plan.into_parts(),
                &known,
                source,
                lease.pool(),
            )
            .await
        }
        SourceReader::Sequential(reader) => {
            service::upload_parts_sequential(
                &ctx,
                upload_id.clone(),
                plan.into_parts(),
                &known,
                reader,
                lease.pool(),
            )
            .await
        }
    };
    drop(lease);

    let result = match result {
        Ok(mut parts) => {
            stage.advance(Stage::Collected);
            parts.sort_by_key(|part| part.part_number);
            ctx.transport()
                .complete_multipart_upload(ctx.path(), &upload_id, &parts)
                .await
                .map(|e_tag| (e_tag, parts))
                .map_err(error::transport)
        }
        Err(err) => Err(err),
    };

    match result {
        Ok((e_tag, parts)) => {
            stage.advance(Stage::Completed);
            Ok(UploadOutput {
                e_tag: Some(e_tag),
                upload_id: Some(upload_id.to_string()),
                content_length,
                parts,
            })
        }
        Err(err) => {
            stage.advance(Stage::Aborting);
            abort_upload(&ctx, &upload_id).await;
            stage.advance(Stage::Failed);
            Err(err)
        }
    }
}

async fn list_parts(
    ctx: &UploadContext,
    upload_id: &str,
) -> Result<BTreeMap<u64, UploadedPart>, Error> {
    let parts = ctx
        .transport()
        .list_parts(ctx.path(), upload_id)
        .await
        .map_err(error::transport)?;
    Ok(parts
        .into_iter()
        .map(|part| (part.part_number, part))
        .collect())
}

/// Best effort abort of a failed multipart upload, failures are logged and dropped
async fn abort_upload(ctx: &UploadContext, upload_id: &str) {
    match ctx.handle().config.failed_multipart_upload_policy() {
        FailedMultipartUploadPolicy::Retain => {
            tracing::debug!("retaining failed multipart upload {upload_id}");
        }
        FailedMultipartUploadPolicy::AbortUpload => {
            if let Err(err) = ctx
                .transport()
                .abort_multipart_upload(ctx.path(), upload_id)
                .await
            {
                let err = error::transport(err);
                tracing::error!(
                    "failed to abort multipart upload {upload_id}: {}",
                    DisplayErrorContext(&err)
                );
            }
        }
    }
}

/// Create an empty object, then write each part with a ranged put. The object is deleted
/// again on failure.
async fn upload_byte_ranges(ctx: UploadContext, source: UploadSource) -> Result<UploadOutput, Error> {
    let content_length = source.len();
    let plan = plan::plan(
        content_length,
        ctx.handle().upload_part_size_bytes(),
        ctx.handle().min_upload_part_size_bytes(),
        MAX_PARTS,
    );

    ctx.transport()
        .put_object(ctx.path(), bytes::Bytes::new(), None, Some(metadata(&ctx)))
        .await
        .map_err(error::transport)?;
    tracing::debug!("created empty object, writing {} ranges", plan.len());

    let mut reader = source.into_reader();
    let mut e_tag = None;
    for part in plan.parts() {
        let written = put_range(&ctx, &mut reader, part)
            .await
            .map_err(|err| error::chunk_failed(part.part_number, err));

        match written {
            Ok(tag) => {
                ctx.progress().record(part.length);
                e_tag = tag.or(e_tag);
            }
            Err(err) => {
                if let Err(cleanup) = ctx.transport().delete_object(ctx.path()).await {
                    let cleanup = error::transport(cleanup);
                    tracing::error!(
                        "failed to delete partially written object {}: {}",
                        ctx.path(),
                        DisplayErrorContext(&cleanup)
                    );
                }
                return Err(err);
            }
        }
    }

    Ok(UploadOutput {
        e_tag,
        upload_id: None,
        content_length,
        parts: Vec::new(),
    })
}

async fn put_range(
    ctx: &UploadContext,
    reader: &mut SourceReader,
    part: &Part,
) -> Result<Option<ETag>, BoxError> {
    let data = match reader {
        SourceReader::Seekable(source) => source.read_range(part.offset, part.length).await?,
        SourceReader::Sequential(reader) => reader.next_chunk(part.length).await?,
    };
    ctx.transport()
        .put_object(ctx.path(), data, Some(part.range()), None)
        .await
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use aws_sdk_s3::operation::abort_multipart_upload::AbortMultipartUploadOutput;
    use aws_sdk_s3::operation::complete_multipart_upload::CompleteMultipartUploadOutput;
    use aws_sdk_s3::operation::create_multipart_upload::CreateMultipartUploadOutput;
    use aws_sdk_s3::operation::put_object::PutObjectOutput;
    use aws_sdk_s3::operation::upload_part::UploadPartOutput;
    use aws_smithy_mocks_experimental::{mock, mock_client, RuleMode};
    use aws_smithy_runtime_api::client::orchestrator::HttpResponse;
    use aws_smithy_runtime_api::http::StatusCode;
    use aws_smithy_types::body::SdkBody;
    use bytes::Bytes;

    use crate::error::ErrorKind;
    use crate::io::UploadSource;
    use crate::operation::upload::{ResumeContext, UploadInput};
    use crate::progress::test_util::RecordingListener;
    use crate::types::{ConcurrencySetting, PartSize, UploadMode, UploadedPart};

    const BODY: &[u8] = b"every adolescent dog goes bonkers early";

    fn config(client: aws_sdk_s3::Client) -> crate::config::Builder {
        crate::Config::builder()
            .concurrency(ConcurrencySetting::Explicit(1))
            .multipart_threshold(PartSize::Target(10))
            .set_upload_part_size(PartSize::Target(30))
            .client(client)
    }

    fn input() -> crate::operation::upload::UploadInputBuilder {
        UploadInput::builder()
            .bucket("test-bucket")
            .key("test-key")
            .source(Bytes::from_static(BODY))
    }

    #[tokio::test]
    async fn test_basic_mpu() {
        let create_mpu = mock!(aws_sdk_s3::Client::create_multipart_upload).then_output(|| {
            CreateMultipartUploadOutput::builder()
                .upload_id("test-upload")
                .build()
        });
        let upload_1 = mock!(aws_sdk_s3::Client::upload_part)
            .match_requests(|r| {
                r.upload_id() == Some("test-upload")
                    && r.part_number() == Some(1)
                    && r.content_length() == Some(30)
            })
            .then_output(|| UploadPartOutput::builder().e_tag("e1").build());
        let upload_2 = mock!(aws_sdk_s3::Client::upload_part)
            .match_requests(|r| {
                r.upload_id() == Some("test-upload")
                    && r.part_number() == Some(2)
                    && r.content_length() == Some(9)
            })
            .then_output(|| UploadPartOutput::builder().e_tag("e2").build());
        let complete_mpu = mock!(aws_sdk_s3::Client::complete_multipart_upload)
            .match_requests(|r| {
                let parts = r.multipart_upload().map(|m| m.parts()).unwrap_or_default();
                r.upload_id() == Some("test-upload")
                    && parts.iter().map(|p| p.part_number()).collect::<Vec<_>>()
                        == vec![Some(1), Some(2)]
            })
            .then_output(|| {
                CompleteMultipartUploadOutput::builder()
                    .e_tag("test-e-tag")
                    .build()
            });

        let client = mock_client!(
            aws_sdk_s3,
            RuleMode::MatchAny,
            &[&create_mpu, &upload_1, &upload_2, &complete_mpu]
        );
        let listener = Arc::new(RecordingListener::default());
        let tm_config = config(client)
            .progress_listener(listener.clone())
            .build()
            .unwrap();
        let tm = crate::Client::new(tm_config);

        let resp = input().send_with(&tm).await.unwrap();
        assert_eq!(Some("test-upload"), resp.upload_id());
        assert_eq!(Some("test-e-tag"), resp.e_tag());
        assert_eq!(39, resp.content_length());
        let part_numbers: Vec<_> = resp.parts().iter().map(|p| p.part_number).collect();
        assert_eq!(vec![1, 2], part_numbers);

        let transferred: u64 = listener.transferred.lock().unwrap().iter().sum();
        assert_eq!(39, transferred);
        assert_eq!(Some(&(39, 39)), listener.progress.lock().unwrap().last());
    }

    #[tokio::test]
    async fn test_basic_upload_object() {
        let put_object = mock!(aws_sdk_s3::Client::put_object)
            .match_requests(|r| r.content_length() == Some(39))
            .then_output(|| PutObjectOutput::builder().e_tag("test-etag").build());
        let client = mock_client!(aws_sdk_s3, RuleMode::Sequential, &[&put_object]);

        let tm_config = crate::Config::builder()
            .multipart_threshold(PartSize::Target(10 * 1024 * 1024))
            .client(client)
            .build()
            .unwrap();
        let tm = crate::Client::new(tm_config);

        let resp = input().send_with(&tm).await.unwrap();
        assert_eq!(None, resp.upload_id());
        assert_eq!(Some("test-etag"), resp.e_tag());
        assert!(resp.parts().is_empty());
    }

    #[tokio::test]
    async fn test_failed_part_aborts_upload() {
        let create_mpu = mock!(aws_sdk_s3::Client::create_multipart_upload).then_output(|| {
            CreateMultipartUploadOutput::builder()
                .upload_id("test-upload")
                .build()
        });
        let upload_1 = mock!(aws_sdk_s3::Client::upload_part)
            .match_requests(|r| r.part_number() == Some(1))
            .then_output(|| UploadPartOutput::builder().e_tag("e1").build());
        let upload_2 = mock!(aws_sdk_s3::Client::upload_part)
            .match_requests(|r| r.part_number() == Some(2))
            .then_http_response(|| {
                HttpResponse::new(StatusCode::try_from(403).unwrap(), SdkBody::empty())
            });
        let abort_mpu = mock!(aws_sdk_s3::Client::abort_multipart_upload)
            .match_requests(|r| r.upload_id() == Some("test-upload"))
            .then_output(|| AbortMultipartUploadOutput::builder().build());

        let client = mock_client!(
            aws_sdk_s3,
            RuleMode::MatchAny,
            &[&create_mpu, &upload_1, &upload_2, &abort_mpu]
        );
        let tm = crate::Client::new(config(client).build().unwrap());

        let err = input().send_with(&tm).await.unwrap_err();
        match err.kind() {
            ErrorKind::ChunkFailed(chunk) => assert_eq!(2, chunk.part_number()),
            other => panic!("unexpected error kind {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_resume_skips_uploaded_parts() {
        let upload_2 = mock!(aws_sdk_s3::Client::upload_part)
            .match_requests(|r| r.upload_id() == Some("earlier-upload") && r.part_number() == Some(2))
            .then_output(|| UploadPartOutput::builder().e_tag("e2").build());
        let complete_mpu = mock!(aws_sdk_s3::Client::complete_multipart_upload)
            .match_requests(|r| {
                let parts = r.multipart_upload().map(|m| m.parts()).unwrap_or_default();
                parts.len() == 2 && parts[0].e_tag() == Some("e1") && parts[1].e_tag() == Some("e2")
            })
            .then_output(|| {
                CompleteMultipartUploadOutput::builder()
                    .e_tag("resumed")
                    .build()
            });
        let client = mock_client!(
            aws_sdk_s3,
            RuleMode::Sequential,
            &[&upload_2, &complete_mpu]
        );
        let tm = crate::Client::new(config(client).build().unwrap());

        let resume = ResumeContext::new("earlier-upload").with_parts(vec![UploadedPart {
            part_number: 1,
            e_tag: "e1".to_owned(),
            size: 30,
        }]);
        let resp = input().resume(resume).send_with(&tm).await.unwrap();
        assert_eq!(Some("resumed"), resp.e_tag());
        assert_eq!(Some("earlier-upload"), resp.upload_id());
    }

    #[tokio::test]
    async fn test_stream_source_uploads_in_order() {
        let create_mpu = mock!(aws_sdk_s3::Client::create_multipart_upload).then_output(|| {
            CreateMultipartUploadOutput::builder()
                .upload_id("test-upload")
                .build()
        });
        let upload_1 = mock!(aws_sdk_s3::Client::upload_part)
            .match_requests(|r| r.part_number() == Some(1))
            .then_output(|| UploadPartOutput::builder().e_tag("e1").build());
        let upload_2 = mock!(aws_sdk_s3::Client::upload_part)
            .match_requests(|r| r.part_number() == Some(2))
            .then_output(|| UploadPartOutput::builder().e_tag("e2").build());
        let complete_mpu = mock!(aws_sdk_s3::Client::complete_multipart_upload).then_output(|| {
            CompleteMultipartUploadOutput::builder()
                .e_tag("test-e-tag")
                .build()
        });

        let client = mock_client!(
            aws_sdk_s3,
            RuleMode::Sequential,
            &[&create_mpu, &upload_1, &upload_2, &complete_mpu]
        );
        let tm = crate::Client::new(
            config(client)
                .concurrency(ConcurrencySetting::Explicit(4))
                .build()
                .unwrap(),
        );

        let source = UploadSource::from_reader(BODY, BODY.len() as u64);
        let resp = tm
            .upload()
            .bucket("test-bucket")
            .key("test-key")
            .source(source)
            .send()
            .await
            .unwrap();
        assert_eq!(Some("test-e-tag"), resp.e_tag());
    }

    #[tokio::test]
    async fn test_byte_range_mode() {
        let create_empty = mock!(aws_sdk_s3::Client::put_object)
            .match_requests(|r| r.content_length() == Some(0))
            .then_output(|| PutObjectOutput::builder().build());
        let range_1 = mock!(aws_sdk_s3::Client::put_object)
            .match_requests(|r| r.content_length() == Some(30))
            .then_output(|| PutObjectOutput::builder().build());
        let range_2 = mock!(aws_sdk_s3::Client::put_object)
            .match_requests(|r| r.content_length() == Some(9))
            .then_output(|| PutObjectOutput::builder().e_tag("final").build());

        let client = mock_client!(
            aws_sdk_s3,
            RuleMode::Sequential,
            &[&create_empty, &range_1, &range_2]
        );
        let tm = crate::Client::new(
            config(client)
                .upload_mode(UploadMode::ByteRange)
                .build()
                .unwrap(),
        );

        let resp = input().send_with(&tm).await.unwrap();
        assert_eq!(Some("final"), resp.e_tag());
        assert_eq!(None, resp.upload_id());
    }

    #[tokio::test]
    async fn test_missing_source_is_invalid_input() {
        let client = aws_sdk_s3::Client::from_conf(
            aws_sdk_s3::Config::builder()
                .behavior_version(aws_sdk_s3::config::BehaviorVersion::latest())
                .build(),
        );
        let tm = crate::Client::new(config(client).build().unwrap());
        let err = tm
            .upload()
            .bucket("test-bucket")
            .key("test-key")
            .send()
            .await
            .unwrap_err();
        assert_eq!(&ErrorKind::InputInvalid, err.kind());
    }
}
