//! HTTP request representation

use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::{Method, Uri, Version};
use percent_encoding::percent_decode_str;

/// HTTP request as seen by a file service.
///
/// Besides the raw request line and headers it carries the *mapped path*: the
/// part of the path left over after the router stripped the mount prefix,
/// already percent-decoded.
///
/// # Examples
///
/// ```
/// use fileserve_http::Request;
/// use http::{HeaderMap, Method, Uri, Version};
///
/// let request = Request::new(
///     Method::GET,
///     Uri::from_static("/static/caf%C3%A9.txt?v=1"),
///     Version::HTTP_11,
///     HeaderMap::new(),
/// )
/// .with_mapped_path("/café.txt");
///
/// assert_eq!(request.decoded_path(), "/static/café.txt");
/// assert_eq!(request.decoded_mapped_path(), "/café.txt");
/// assert_eq!(request.query(), Some("v=1"));
/// ```
#[derive(Debug, Clone)]
pub struct Request {
	pub method: Method,
	pub uri: Uri,
	pub version: Version,
	pub headers: HeaderMap,
	mapped_path: Option<String>,
}

impl Request {
	/// Creates a request without a mapped path.
	pub fn new(method: Method, uri: Uri, version: Version, headers: HeaderMap) -> Self {
		Self {
			method,
			uri,
			version,
			headers,
			mapped_path: None,
		}
	}

	/// Creates an HTTP/1.1 `GET` request for `uri`.
	pub fn get(uri: Uri) -> Self {
		Self::new(Method::GET, uri, Version::HTTP_11, HeaderMap::new())
	}

	/// Sets the decoded path relative to the mount point.
	pub fn with_mapped_path(mut self, path: impl Into<String>) -> Self {
		self.mapped_path = Some(path.into());
		self
	}

	/// Adds a header, keeping existing values of the same name.
	pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.headers.append(name, value);
		self
	}

	/// The raw (still percent-encoded) request path.
	pub fn path(&self) -> &str {
		self.uri.path()
	}

	/// The query string without the leading `?`.
	pub fn query(&self) -> Option<&str> {
		self.uri.query()
	}

	/// The percent-decoded request path.
	///
	/// Invalid UTF-8 sequences are replaced with `U+FFFD`.
	pub fn decoded_path(&self) -> String {
		percent_decode_str(self.uri.path())
			.decode_utf8_lossy()
			.into_owned()
	}

	/// The decoded path relative to the mount point, falling back to the full
	/// decoded path when the request was not routed through a prefix.
	pub fn decoded_mapped_path(&self) -> String {
		match &self.mapped_path {
			Some(path) => path.clone(),
			None => self.decoded_path(),
		}
	}

	/// Returns whether the method is `HEAD`.
	pub fn is_head(&self) -> bool {
		self.method == Method::HEAD
	}

	/// Returns whether the method is `GET` or `HEAD`.
	pub fn is_get_or_head(&self) -> bool {
		self.method == Method::GET || self.method == Method::HEAD
	}
}
