//! Content-Encoding negotiation
//!
//! Picks the pre-compressed variants a client can receive, in server
//! preference order. Matching is deliberately loose: a candidate is accepted
//! when its wire value occurs anywhere in one of the comma-separated
//! `Accept-Encoding` tokens. Quality values and wildcards are not evaluated.

use http::HeaderMap;
use http::HeaderValue;
use http::header::ACCEPT_ENCODING;

/// A content encoding the file service can serve pre-compressed files for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EncodingCandidate {
	/// Suffix of the pre-compressed file, e.g. `.br`
	pub extension: &'static str,
	/// Value of the `Content-Encoding` header, e.g. `br`
	pub wire_value: &'static str,
	/// Lower is preferred
	pub priority: u8,
}

/// Supported encodings in preference order.
pub const ENCODING_CANDIDATES: &[EncodingCandidate] = &[
	EncodingCandidate {
		extension: ".br",
		wire_value: "br",
		priority: 0,
	},
	EncodingCandidate {
		extension: ".gz",
		wire_value: "gzip",
		priority: 1,
	},
];

/// Returns the candidates accepted by `accept_encoding`, most preferred
/// first.
///
/// Always empty when `serve_compressed` is `false`, when the header is
/// missing, or when it is not valid UTF-8.
///
/// # Examples
///
/// ```
/// use fileserve_service::encoding::negotiate;
/// use http::HeaderValue;
///
/// let header = HeaderValue::from_static("gzip, deflate, br");
/// let accepted: Vec<_> = negotiate(true, Some(&header))
///     .into_iter()
///     .map(|c| c.wire_value)
///     .collect();
/// assert_eq!(accepted, ["br", "gzip"]);
///
/// assert!(negotiate(false, Some(&header)).is_empty());
/// ```
pub fn negotiate(
	serve_compressed: bool,
	accept_encoding: Option<&HeaderValue>,
) -> Vec<&'static EncodingCandidate> {
	if !serve_compressed {
		return Vec::new();
	}
	let Some(header) = accept_encoding.and_then(|v| v.to_str().ok()) else {
		return Vec::new();
	};

	let mut accepted: Vec<&'static EncodingCandidate> = ENCODING_CANDIDATES
		.iter()
		.filter(|candidate| {
			header
				.split(',')
				.any(|token| token.contains(candidate.wire_value))
		})
		.collect();
	accepted.sort_by_key(|candidate| candidate.priority);
	accepted
}

/// The outcome of negotiating a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedEncodings {
	candidates: Vec<&'static EncodingCandidate>,
	decompress: bool,
}

impl AcceptedEncodings {
	/// Negotiates the encodings for a request with the given headers.
	///
	/// With `auto_decompress` enabled, a client accepting none of the
	/// candidates gets every candidate back, marked for decoding on the
	/// server.
	pub fn negotiate(serve_compressed: bool, auto_decompress: bool, headers: &HeaderMap) -> Self {
		let candidates = negotiate(serve_compressed, headers.get(ACCEPT_ENCODING));
		if candidates.is_empty() && serve_compressed && auto_decompress {
			let mut all: Vec<_> = ENCODING_CANDIDATES.iter().collect();
			all.sort_by_key(|candidate| candidate.priority);
			return Self {
				candidates: all,
				decompress: true,
			};
		}
		Self {
			candidates,
			decompress: false,
		}
	}

	/// The candidates to try, most preferred first.
	pub fn candidates(&self) -> &[&'static EncodingCandidate] {
		&self.candidates
	}

	/// Whether the candidates must be decoded before serving.
	pub fn decompress(&self) -> bool {
		self.decompress
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn wire_values(accept: &'static str) -> Vec<&'static str> {
		negotiate(true, Some(&HeaderValue::from_static(accept)))
			.into_iter()
			.map(|c| c.wire_value)
			.collect()
	}

	#[rstest]
	#[case("gzip", vec!["gzip"])]
	#[case("br", vec!["br"])]
	#[case("gzip, br", vec!["br", "gzip"])]
	#[case("br;q=0, gzip", vec!["br", "gzip"])]
	#[case("x-gzip", vec!["gzip"])]
	#[case("identity", vec![])]
	#[case("*", vec![])]
	#[case("", vec![])]
	fn test_substring_matching(#[case] accept: &'static str, #[case] expected: Vec<&'static str>) {
		assert_eq!(wire_values(accept), expected);
	}

	#[rstest]
	fn test_non_utf8_header_is_ignored() {
		let header = HeaderValue::from_bytes(b"gzip\xff").unwrap();
		assert!(negotiate(true, Some(&header)).is_empty());
	}

	#[rstest]
	fn test_priority_is_explicit() {
		let priorities: Vec<_> = ENCODING_CANDIDATES.iter().map(|c| c.priority).collect();
		assert_eq!(priorities, [0, 1]);
	}

	#[rstest]
	#[case(true, true, "identity", true, 2)]
	#[case(true, true, "gzip", false, 1)]
	#[case(true, false, "identity", false, 0)]
	#[case(false, true, "identity", false, 0)]
	fn test_auto_decompress(
		#[case] serve_compressed: bool,
		#[case] auto_decompress: bool,
		#[case] accept: &'static str,
		#[case] decompress: bool,
		#[case] count: usize,
	) {
		let mut headers = HeaderMap::new();
		headers.insert(ACCEPT_ENCODING, HeaderValue::from_static(accept));
		let accepted = AcceptedEncodings::negotiate(serve_compressed, auto_decompress, &headers);
		assert_eq!(accepted.decompress(), decompress);
		assert_eq!(accepted.candidates().len(), count);
	}
}
