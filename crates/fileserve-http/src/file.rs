//! Servable file resources
//!
//! An [`HttpFile`] is the outcome of resolving a request path: a file to
//! stream from its byte source, an in-memory snapshot, a redirect, or nothing
//! at all. Serving a file builds the full response, including validators and
//! conditional GET handling.

mod aggregated;
mod conditional;
mod decompress;
mod vfs_file;

pub use aggregated::AggregatedHttpFile;
pub use conditional::entity_tag;
pub use decompress::{DecompressingFile, decode};
pub use vfs_file::VfsFile;

use crate::{Body, Clock, GuessMediaType, MediaTypeResolver, Request, Response, Result, SystemClock};
use fileserve_vfs::{BufferPool, FileAttributes};
use http::header::{
	CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_TYPE, DATE, ETAG, HeaderValue, LAST_MODIFIED, VARY,
};
use http::{HeaderMap, StatusCode};
use std::fmt;
use std::sync::Arc;

/// Which representation of a source file is being served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
	/// The file as stored
	Identity,
	/// A pre-compressed file served with `Content-Encoding`
	Encoded(&'static str),
	/// A pre-compressed file decoded before serving
	Decoded(&'static str),
}

impl Variant {
	/// The `Content-Encoding` sent with this representation.
	pub fn content_encoding(self) -> Option<&'static str> {
		match self {
			Variant::Encoded(encoding) => Some(encoding),
			_ => None,
		}
	}

	/// The encoding of the stored bytes, if any.
	pub fn source_encoding(self) -> Option<&'static str> {
		match self {
			Variant::Identity => None,
			Variant::Encoded(encoding) | Variant::Decoded(encoding) => Some(encoding),
		}
	}
}

/// Settings shared by every file a service produces.
///
/// Cloning is cheap; the clock and the media type resolver are shared.
#[derive(Clone)]
pub struct FileOptions {
	clock: Arc<dyn Clock>,
	headers: HeaderMap,
	media_types: Arc<dyn MediaTypeResolver>,
}

impl FileOptions {
	/// Creates options with the system clock, no default headers and
	/// extension-based media types.
	pub fn new() -> Self {
		Self {
			clock: Arc::new(SystemClock),
			headers: HeaderMap::new(),
			media_types: Arc::new(GuessMediaType),
		}
	}

	/// Sets the clock used for the `Date` header.
	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = clock;
		self
	}

	/// Sets headers added to every file response.
	///
	/// Default headers override the headers derived from the file itself.
	pub fn with_headers(mut self, headers: HeaderMap) -> Self {
		self.headers = headers;
		self
	}

	/// Sets the media type resolver.
	pub fn with_media_types(mut self, media_types: Arc<dyn MediaTypeResolver>) -> Self {
		self.media_types = media_types;
		self
	}

	/// The configured clock.
	pub fn clock(&self) -> &Arc<dyn Clock> {
		&self.clock
	}

	/// The configured default headers.
	pub fn headers(&self) -> &HeaderMap {
		&self.headers
	}

	/// The configured media type resolver.
	pub fn media_types(&self) -> &Arc<dyn MediaTypeResolver> {
		&self.media_types
	}

	/// Builds the headers describing a representation of the file at `path`.
	///
	/// `Content-Length` is added when the response is completed.
	pub fn file_headers(
		&self,
		path: &str,
		variant: Variant,
		attributes: &FileAttributes,
	) -> Result<HeaderMap> {
		let mut headers = HeaderMap::new();
		if let Some(content_type) = self.media_types.guess(path, variant.source_encoding()) {
			headers.insert(CONTENT_TYPE, content_type);
		}
		if let Some(encoding) = variant.content_encoding() {
			headers.insert(CONTENT_ENCODING, HeaderValue::from_static(encoding));
		}
		if variant.source_encoding().is_some() {
			headers.insert(VARY, HeaderValue::from_static("accept-encoding"));
		}
		headers.insert(
			LAST_MODIFIED,
			HeaderValue::from_str(&httpdate::fmt_http_date(attributes.last_modified()))?,
		);
		headers.insert(
			ETAG,
			HeaderValue::from_str(&entity_tag(attributes, variant))?,
		);
		for (name, value) in &self.headers {
			headers.insert(name.clone(), value.clone());
		}
		Ok(headers)
	}

	/// Completes a file response: applies conditional GET, sets `Date` and
	/// `Content-Length`, and drops the body for `HEAD`.
	pub(crate) fn complete(
		&self,
		request: &Request,
		mut headers: HeaderMap,
		attributes: &FileAttributes,
		content_length: u64,
		body: Body,
	) -> Result<Response> {
		headers.insert(
			DATE,
			HeaderValue::from_str(&httpdate::fmt_http_date(self.clock.now()))?,
		);

		let etag = headers
			.get(ETAG)
			.and_then(|v| v.to_str().ok())
			.unwrap_or_default();
		if conditional::is_not_modified(&request.headers, etag, attributes.last_modified()) {
			headers.remove(CONTENT_TYPE);
			return Ok(Response {
				status: StatusCode::NOT_MODIFIED,
				headers,
				body: Body::Empty,
			});
		}

		headers.insert(CONTENT_LENGTH, HeaderValue::from(content_length));
		let body = if request.is_head() { Body::Empty } else { body };
		Ok(Response {
			status: StatusCode::OK,
			headers,
			body,
		})
	}
}

impl Default for FileOptions {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for FileOptions {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FileOptions")
			.field("clock", &self.clock)
			.field("headers", &self.headers)
			.field("media_types", &self.media_types)
			.finish()
	}
}

/// The outcome of resolving a request path.
#[derive(Debug)]
pub enum HttpFile {
	/// Nothing to serve; answered with `404 Not Found`
	NonExistent,
	/// A `307 Temporary Redirect` to the given location
	Redirect(String),
	/// A file streamed from its byte source
	Vfs(VfsFile),
	/// A pre-compressed file decoded when served
	Decompressing(DecompressingFile),
	/// A file whose content is held in memory
	Aggregated(AggregatedHttpFile),
}

impl HttpFile {
	/// Creates a redirect to `location`.
	pub fn redirect(location: impl Into<String>) -> Self {
		HttpFile::Redirect(location.into())
	}

	/// Returns the attributes of the served file.
	///
	/// `None` means there is no file to serve, which is also the case for
	/// redirects.
	pub fn attributes(&self) -> Option<FileAttributes> {
		match self {
			HttpFile::NonExistent | HttpFile::Redirect(_) => None,
			HttpFile::Vfs(file) => Some(*file.attributes()),
			HttpFile::Decompressing(file) => Some(*file.attributes()),
			HttpFile::Aggregated(file) => Some(*file.attributes()),
		}
	}

	/// Returns whether the file is a [`HttpFile::NonExistent`].
	pub fn is_non_existent(&self) -> bool {
		matches!(self, HttpFile::NonExistent)
	}

	/// The `Content-Encoding` the file is served with.
	pub fn content_encoding(&self) -> Option<&'static str> {
		match self {
			HttpFile::Vfs(file) => file.variant().content_encoding(),
			HttpFile::Aggregated(file) => file.variant().content_encoding(),
			_ => None,
		}
	}

	/// Reads the whole content into a buffer leased from `pool`.
	///
	/// Returns `None` if there is no content to read. An already aggregated
	/// file yields a snapshot.
	pub async fn aggregate(&self, pool: &BufferPool) -> Result<Option<AggregatedHttpFile>> {
		match self {
			HttpFile::NonExistent | HttpFile::Redirect(_) => Ok(None),
			HttpFile::Vfs(file) => file.aggregate(pool).await.map(Some),
			HttpFile::Decompressing(file) => file.aggregate(pool).await.map(Some),
			HttpFile::Aggregated(file) => Ok(Some(file.snapshot())),
		}
	}

	/// Serves the file as a response to `request`.
	///
	/// Any pooled buffer held by the file is released once the response is
	/// built; the response body keeps its own reference to the content.
	///
	/// # Errors
	///
	/// Returns an error if the byte source fails or a decoder rejects the
	/// content.
	pub async fn serve(self, request: &Request) -> Result<Response> {
		match self {
			HttpFile::NonExistent => Ok(Response::not_found()),
			HttpFile::Redirect(location) => Response::temporary_redirect(&location),
			HttpFile::Vfs(file) => file.serve(request).await,
			HttpFile::Decompressing(file) => file.serve(request).await,
			HttpFile::Aggregated(file) => file.serve(request),
		}
	}
}
