/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_s3::types::{CompletedMultipartUpload, ObjectCannedAcl};
use aws_smithy_types::byte_stream::ByteStream;
use bytes::Bytes;

use super::{ETag, ObjectTransport};
use crate::error::BoxError;
use crate::types::{ByteRange, CompletedPart, ObjectMetadata, ObjectPath, UploadedPart};

fn to_i32(value: u64, what: &str) -> Result<i32, BoxError> {
    i32::try_from(value).map_err(|_| format!("{what} {value} does not fit the S3 API").into())
}

fn to_i64(value: usize) -> Result<i64, BoxError> {
    i64::try_from(value).map_err(|_| format!("content length {value} does not fit the S3 API").into())
}

#[async_trait]
impl ObjectTransport for aws_sdk_s3::Client {
    async fn get_object_size(&self, path: &ObjectPath) -> Result<u64, BoxError> {
        let resp = self
            .head_object()
            .bucket(&path.bucket)
            .key(&path.key)
            .send()
            .await?;

        let length = resp
            .content_length()
            .ok_or_else(|| format!("HeadObject for {path} returned no content length"))?;
        Ok(u64::try_from(length)?)
    }

    async fn read_range(
        &self,
        path: &ObjectPath,
        range: Option<ByteRange>,
    ) -> Result<ByteStream, BoxError> {
        let resp = self
            .get_object()
            .bucket(&path.bucket)
            .key(&path.key)
            .set_range(range.map(|r| r.to_header_value()))
            .send()
            .await?;
        Ok(resp.body)
    }

    async fn initiate_multipart_upload(
        &self,
        path: &ObjectPath,
        metadata: &ObjectMetadata,
    ) -> Result<String, BoxError> {
        let resp = self
            .create_multipart_upload()
            .bucket(&path.bucket)
            .key(&path.key)
            .set_content_type(metadata.content_type.clone())
            .set_metadata(user_metadata(metadata))
            .set_acl(metadata.canned_acl.as_deref().map(ObjectCannedAcl::from))
            .send()
            .await?;

        let upload_id = resp
            .upload_id()
            .ok_or_else(|| format!("CreateMultipartUpload for {path} returned no upload id"))?;
        Ok(upload_id.to_owned())
    }

    async fn upload_part(
        &self,
        path: &ObjectPath,
        upload_id: &str,
        part_number: u64,
        data: Bytes,
    ) -> Result<ETag, BoxError> {
        let resp = self
            .upload_part()
            .bucket(&path.bucket)
            .key(&path.key)
            .upload_id(upload_id)
            .part_number(to_i32(part_number, "part number")?)
            .content_length(to_i64(data.len())?)
            .body(ByteStream::from(data))
            .send()
            .await?;

        let e_tag = resp
            .e_tag()
            .ok_or_else(|| format!("UploadPart {part_number} for {path} returned no ETag"))?;
        Ok(e_tag.to_owned())
    }

    async fn list_parts(
        &self,
        path: &ObjectPath,
        upload_id: &str,
    ) -> Result<Vec<UploadedPart>, BoxError> {
        let mut parts = Vec::new();
        let mut marker: Option<String> = None;
        loop {
            let resp = self
                .list_parts()
                .bucket(&path.bucket)
                .key(&path.key)
                .upload_id(upload_id)
                .set_part_number_marker(marker.take())
                .send()
                .await?;

            for part in resp.parts() {
                let (Some(part_number), Some(e_tag)) = (part.part_number(), part.e_tag()) else {
                    continue;
                };
                parts.push(UploadedPart {
                    part_number: u64::try_from(part_number)?,
                    e_tag: e_tag.to_owned(),
                    size: u64::try_from(part.size().unwrap_or_default())?,
                });
            }

            match (resp.is_truncated(), resp.next_part_number_marker()) {
                (Some(true), Some(next)) => marker = Some(next.to_owned()),
                _ => break,
            }
        }
        Ok(parts)
    }

    async fn complete_multipart_upload(
        &self,
        path: &ObjectPath,
        upload_id: &str,
        parts: &[CompletedPart],
    ) -> Result<ETag, BoxError> {
        let mut completed = Vec::with_capacity(parts.len());
        for part in parts {
            completed.push(
                aws_sdk_s3::types::CompletedPart::builder()
                    .part_number(to_i32(part.part_number, "part number")?)
                    .e_tag(&part.e_tag)
                    .build(),
            );
        }

        let resp = self
            .complete_multipart_upload()
            .bucket(&path.bucket)
            .key(&path.key)
            .upload_id(upload_id)
            .multipart_upload(
                CompletedMultipartUpload::builder()
                    .set_parts(Some(completed))
                    .build(),
            )
            .send()
            .await?;

        let e_tag = resp
            .e_tag()
            .ok_or_else(|| format!("CompleteMultipartUpload for {path} returned no ETag"))?;
        Ok(e_tag.to_owned())
    }

    async fn abort_multipart_upload(
        &self,
        path: &ObjectPath,
        upload_id: &str,
    ) -> Result<(), BoxError> {
        self.abort_multipart_upload()
            .bucket(&path.bucket)
            .key(&path.key)
            .upload_id(upload_id)
            .send()
            .await?;
        Ok(())
    }

    async fn put_object(
        &self,
        path: &ObjectPath,
        data: Bytes,
        range: Option<ByteRange>,
        metadata: Option<&ObjectMetadata>,
    ) -> Result<Option<ETag>, BoxError> {
        let mut request = self
            .put_object()
            .bucket(&path.bucket)
            .key(&path.key)
            .content_length(to_i64(data.len())?)
            .body(ByteStream::from(data));
        if let Some(metadata) = metadata {
            request = request
                .set_content_type(metadata.content_type.clone())
                .set_metadata(user_metadata(metadata))
                .set_acl(metadata.canned_acl.as_deref().map(ObjectCannedAcl::from));
        }

        let resp = match range {
            // S3-compatible servers that support partial updates accept a Range on PUT
            Some(range) => {
                let value = range.to_header_value();
                request
                    .customize()
                    .mutate_request(move |req| {
                        req.headers_mut().insert("Range", value.clone());
                    })
                    .send()
                    .await?
            }
            None => request.send().await?,
        };
        Ok(resp.e_tag().map(str::to_owned))
    }

    async fn delete_object(&self, path: &ObjectPath) -> Result<(), BoxError> {
        self.delete_object()
            .bucket(&path.bucket)
            .key(&path.key)
            .send()
            .await?;
        Ok(())
    }
}

fn user_metadata(metadata: &ObjectMetadata) -> Option<HashMap<String, String>> {
    if metadata.user_metadata.is_empty() {
        return None;
    }
    Some(
        metadata
            .user_metadata
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    )
}
