/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};

use crate::error::{self, Error};

/// `Date` header format, e.g. `Tue, 27 Mar 2007 19:36:42 +0000`
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

/// V4 timestamp format, e.g. `20070327T193642Z`
const V4_TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%SZ";

const V4_SHORT_DATE_FORMAT: &str = "%Y%m%d";

/// Current time adjusted by the configured clock skew
pub(crate) fn now_with_skew(clock_skew: TimeDelta) -> DateTime<Utc> {
    Utc::now() + clock_skew
}

pub(crate) fn format_http_date(time: DateTime<Utc>) -> String {
    time.format(HTTP_DATE_FORMAT).to_string()
}

pub(crate) fn format_v4_timestamp(time: DateTime<Utc>) -> String {
    time.format(V4_TIMESTAMP_FORMAT).to_string()
}

/// Parse a `Date` header value (RFC 1123 with numeric zone or `GMT`).
pub(crate) fn parse_http_date(value: &str) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc2822(value.trim())
        .map(|d| d.with_timezone(&Utc))
        .map_err(|err| error::invalid_input(format!("invalid date header `{value}`: {err}")))
}

pub(crate) fn parse_v4_timestamp(value: &str) -> Result<DateTime<Utc>, Error> {
    NaiveDateTime::parse_from_str(value.trim(), V4_TIMESTAMP_FORMAT)
        .map(|d| d.and_utc())
        .map_err(|err| error::invalid_input(format!("invalid V4 timestamp `{value}`: {err}")))
}

/// Parse an `x-amz-date` value which may be in either V4 or HTTP date form.
pub(crate) fn parse_amz_date(value: &str) -> Result<DateTime<Utc>, Error> {
    parse_v4_timestamp(value).or_else(|_| parse_http_date(value))
}

/// The `yyyyMMdd` portion of a V4 timestamp.
///
/// The short date is always taken from the timestamp being signed so the scope and the
/// timestamp agree no matter what the local clock says.
pub(crate) fn short_date(timestamp: &str) -> Result<String, Error> {
    let parsed = parse_v4_timestamp(timestamp)?;
    Ok(parsed.format(V4_SHORT_DATE_FORMAT).to_string())
}
