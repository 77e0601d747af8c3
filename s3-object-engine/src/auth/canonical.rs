/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Canonicalization of headers and query parameters shared by the V2 and V4 signers.

use std::collections::BTreeMap;

use http::HeaderMap;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::error::{self, Error};

pub(crate) const AMZ_PREFIX: &str = "x-amz-";
pub(crate) const EMC_PREFIX: &str = "x-emc-";

/// Everything except RFC 3986 unreserved characters
const URI_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

const PATH_ENCODE_SET: &AsciiSet = &URI_ENCODE_SET.remove(b'/');

/// Sub-resources and response overrides that are part of a V2 signature, in signing order.
const SIGNED_PARAMETERS: &[&str] = &[
    "acl",
    "cors",
    "delete",
    "endpoint",
    "isstaleallowed",
    "lifecycle",
    "location",
    "logging",
    "notification",
    "partNumber",
    "policy",
    PARAM_QUERY,
    "requestPayment",
    "response-cache-control",
    "response-content-disposition",
    "response-content-encoding",
    "response-content-language",
    "response-content-type",
    "response-expires",
    "restore",
    PARAM_SEARCH_METADATA,
    "tagging",
    "torrent",
    "uploadId",
    "uploads",
    "versionId",
    "versioning",
    "versions",
    "website",
];

const PARAM_QUERY: &str = "query";
const PARAM_SEARCH_METADATA: &str = "searchmetadata";

/// Query parameters of a request. A parameter without a value (e.g. `?acl`) maps to `None`.
pub type Parameters = BTreeMap<String, Option<String>>;

/// Percent-encode `value` leaving only RFC 3986 unreserved characters as-is.
pub(crate) fn uri_encode(value: &str) -> String {
    utf8_percent_encode(value, URI_ENCODE_SET).to_string()
}

/// Percent-encode a resource path, keeping `/` separators.
pub(crate) fn uri_encode_path(path: &str) -> String {
    utf8_percent_encode(path, PATH_ENCODE_SET).to_string()
}

/// All values of header `name`, each trimmed, joined by `,`.
pub(crate) fn joined_header_value(headers: &HeaderMap, name: &str) -> Result<Option<String>, Error> {
    let mut values = Vec::new();
    for value in headers.get_all(name) {
        let value = value.to_str().map_err(error::invalid_input)?;
        values.push(value.trim());
    }

    if values.is_empty() {
        return Ok(None);
    }
    Ok(Some(values.join(",")))
}

/// The first value of header `name`
pub(crate) fn first_header_value<'a>(
    headers: &'a HeaderMap,
    name: &str,
) -> Result<Option<&'a str>, Error> {
    headers
        .get(name)
        .map(|v| v.to_str().map_err(error::invalid_input))
        .transpose()
}

/// Headers prefixed with `x-amz-` or `x-emc-`, plus `x-amz-` query parameters, keyed by
/// lower-cased name and sorted.
pub fn vendor_headers(
    headers: &HeaderMap,
    parameters: &Parameters,
) -> Result<BTreeMap<String, String>, Error> {
    let mut canonical = BTreeMap::new();
    for name in headers.keys() {
        let name = name.as_str();
        if name.starts_with(AMZ_PREFIX) || name.starts_with(EMC_PREFIX) {
            if let Some(value) = joined_header_value(headers, name)? {
                canonical.insert(name.to_owned(), value);
            }
        }
    }

    for (name, value) in parameters {
        let name = name.to_ascii_lowercase();
        if name.starts_with(AMZ_PREFIX) {
            canonical.insert(name, value.clone().unwrap_or_default());
        }
    }

    Ok(canonical)
}

/// The signed sub-resource suffix of a V2 resource, e.g. `?acl` or `?partNumber=2&uploadId=abc`.
///
/// Parameters are emitted in signing order, not in request order. `query` and `searchmetadata`
/// are only included when `sign_metadata_search` is set.
pub fn signed_parameters(parameters: &Parameters, sign_metadata_search: bool) -> String {
    let mut suffix = String::new();
    for name in SIGNED_PARAMETERS {
        if !sign_metadata_search && (*name == PARAM_QUERY || *name == PARAM_SEARCH_METADATA) {
            continue;
        }

        if let Some(value) = parameters.get(*name) {
            suffix.push(if suffix.is_empty() { '?' } else { '&' });
            suffix.push_str(name);
            if let Some(value) = value {
                suffix.push('=');
                suffix.push_str(value);
            }
        }
    }
    suffix
}

/// Every header except `authorization`, keyed by lower-cased name with trimmed, comma-joined values.
pub fn signed_headers(headers: &HeaderMap) -> Result<BTreeMap<String, String>, Error> {
    let mut canonical = BTreeMap::new();
    for name in headers.keys() {
        if *name == http::header::AUTHORIZATION {
            continue;
        }
        let value = joined_header_value(headers, name.as_str())?.unwrap_or_default();
        canonical.insert(name.as_str().to_owned(), value);
    }
    Ok(canonical)
}

/// The V4 canonical query string: `key=value` pairs, percent-encoded and sorted by key.
pub fn canonical_query_string(parameters: &Parameters) -> String {
    let mut encoded: Vec<(String, String)> = parameters
        .iter()
        .map(|(name, value)| {
            (
                uri_encode(name),
                uri_encode(value.as_deref().unwrap_or_default()),
            )
        })
        .collect();
    encoded.sort();

    encoded
        .into_iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}
