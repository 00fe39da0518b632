//! Conditional GET validators
//!
//! Handles `ETag` and `Last-Modified` validation for `If-None-Match` and
//! `If-Modified-Since` requests.

use super::Variant;
use fileserve_vfs::FileAttributes;
use http::HeaderMap;
use http::header::{IF_MODIFIED_SINCE, IF_NONE_MATCH};
use std::time::{SystemTime, UNIX_EPOCH};

/// Computes the strong entity tag of a file representation.
///
/// The tag is derived from the source file's modification time and length.
/// Encoded and decoded representations of the same source get distinct tags.
///
/// # Examples
///
/// ```
/// use fileserve_http::{Variant, entity_tag};
/// use fileserve_vfs::FileAttributes;
///
/// let attrs = FileAttributes::new(255, 4096);
/// assert_eq!(entity_tag(&attrs, Variant::Identity), "\"1000-ff\"");
/// assert_eq!(entity_tag(&attrs, Variant::Encoded("br")), "\"1000-ff-br\"");
/// assert_eq!(entity_tag(&attrs, Variant::Decoded("gzip")), "\"1000-ff-gzip-decoded\"");
/// ```
pub fn entity_tag(attributes: &FileAttributes, variant: Variant) -> String {
	let base = format!(
		"{:x}-{:x}",
		attributes.last_modified_millis(),
		attributes.length()
	);
	match variant {
		Variant::Identity => format!("\"{base}\""),
		Variant::Encoded(encoding) => format!("\"{base}-{encoding}\""),
		Variant::Decoded(encoding) => format!("\"{base}-{encoding}-decoded\""),
	}
}

/// Returns whether the request's validators match, i.e. the client copy is
/// current and a `304 Not Modified` may be sent.
///
/// `If-None-Match` takes precedence; `If-Modified-Since` is only consulted
/// when it is absent, and is compared with second precision.
pub(crate) fn is_not_modified(headers: &HeaderMap, etag: &str, last_modified: SystemTime) -> bool {
	if let Some(value) = headers.get(IF_NONE_MATCH) {
		let Ok(value) = value.to_str() else {
			return false;
		};
		return etag_matches(etag, value);
	}

	let Some(since) = headers
		.get(IF_MODIFIED_SINCE)
		.and_then(|v| v.to_str().ok())
		.and_then(|v| httpdate::parse_http_date(v).ok())
	else {
		return false;
	};

	match (epoch_seconds(last_modified), epoch_seconds(since)) {
		(Some(modified), Some(since)) => modified <= since,
		_ => false,
	}
}

/// Weak comparison against a comma-separated `If-None-Match` list.
fn etag_matches(etag: &str, if_none_match: &str) -> bool {
	let etag = etag.trim_start_matches("W/");
	if_none_match
		.split(',')
		.map(str::trim)
		.any(|candidate| candidate == "*" || candidate.trim_start_matches("W/") == etag)
}

fn epoch_seconds(time: SystemTime) -> Option<u64> {
	time.duration_since(UNIX_EPOCH).ok().map(|d| d.as_secs())
}

#[cfg(test)]
mod tests {
	use super::*;
	use http::HeaderValue;
	use rstest::rstest;
	use std::time::Duration;

	fn headers(name: http::header::HeaderName, value: &'static str) -> HeaderMap {
		let mut headers = HeaderMap::new();
		headers.insert(name, HeaderValue::from_static(value));
		headers
	}

	#[rstest]
	#[case("\"1-2\"", true)]
	#[case("W/\"1-2\"", true)]
	#[case("\"0-0\", \"1-2\"", true)]
	#[case("*", true)]
	#[case("\"1-3\"", false)]
	fn test_if_none_match(#[case] value: &'static str, #[case] expected: bool) {
		let headers = headers(IF_NONE_MATCH, value);
		assert_eq!(is_not_modified(&headers, "\"1-2\"", UNIX_EPOCH), expected);
	}

	#[rstest]
	fn test_if_modified_since_uses_second_precision() {
		// Sun, 06 Nov 1994 08:49:37 GMT
		let since = UNIX_EPOCH + Duration::from_secs(784_111_777);
		let headers = headers(IF_MODIFIED_SINCE, "Sun, 06 Nov 1994 08:49:37 GMT");

		assert!(is_not_modified(&headers, "\"x\"", since + Duration::from_millis(999)));
		assert!(!is_not_modified(&headers, "\"x\"", since + Duration::from_secs(1)));
	}

	#[rstest]
	fn test_if_none_match_takes_precedence() {
		let mut headers = headers(IF_NONE_MATCH, "\"other\"");
		headers.insert(
			IF_MODIFIED_SINCE,
			HeaderValue::from_static("Sun, 06 Nov 1994 08:49:37 GMT"),
		);
		assert!(!is_not_modified(&headers, "\"x\"", UNIX_EPOCH));
	}

	#[rstest]
	fn test_unparseable_date_is_ignored() {
		let headers = headers(IF_MODIFIED_SINCE, "yesterday");
		assert!(!is_not_modified(&headers, "\"x\"", UNIX_EPOCH));
	}
}
