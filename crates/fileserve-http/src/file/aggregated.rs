use super::{FileOptions, Variant};
use crate::{Body, Request, Response, Result};
use bytes::Bytes;
use fileserve_vfs::{FileAttributes, PooledBuffer};
use http::HeaderValue;
use http::header::CONTENT_TYPE;
use std::fmt;

/// A file whose whole content is held in memory.
///
/// A freshly aggregated file owns the pooled buffer its content was read into.
/// [`AggregatedHttpFile::snapshot`] yields a copy that shares the content but
/// not the lease, which is what a cache hands out while it keeps the owning
/// instance.
pub struct AggregatedHttpFile {
	path: String,
	variant: Variant,
	attributes: FileAttributes,
	content: Bytes,
	content_type: Option<HeaderValue>,
	lease: Option<PooledBuffer>,
	options: FileOptions,
}

impl AggregatedHttpFile {
	/// Creates a file owning `buffer`.
	///
	/// `attributes` are those of the source file at aggregation time; for a
	/// decoded variant they differ from the content length.
	pub fn new(
		path: impl Into<String>,
		variant: Variant,
		attributes: FileAttributes,
		buffer: PooledBuffer,
		options: FileOptions,
	) -> Self {
		Self {
			path: path.into(),
			variant,
			attributes,
			content: buffer.retained(),
			content_type: None,
			lease: Some(buffer),
			options,
		}
	}

	/// Sets the `Content-Type` instead of guessing it from the path.
	///
	/// A `Content-Type` among the default headers still takes precedence.
	pub fn with_content_type(mut self, content_type: HeaderValue) -> Self {
		self.content_type = Some(content_type);
		self
	}

	/// Path of the source file.
	pub fn path(&self) -> &str {
		&self.path
	}

	/// The representation held.
	pub fn variant(&self) -> Variant {
		self.variant
	}

	/// Attributes of the source file at aggregation time.
	pub fn attributes(&self) -> &FileAttributes {
		&self.attributes
	}

	/// The content.
	pub fn content(&self) -> &Bytes {
		&self.content
	}

	/// Returns whether this instance still holds a pool lease.
	pub fn holds_lease(&self) -> bool {
		self.lease.is_some()
	}

	/// Returns a copy sharing the content but not the lease.
	pub fn snapshot(&self) -> Self {
		Self {
			path: self.path.clone(),
			variant: self.variant,
			attributes: self.attributes,
			content: self.content.clone(),
			content_type: self.content_type.clone(),
			lease: None,
			options: self.options.clone(),
		}
	}

	pub(crate) fn serve(self, request: &Request) -> Result<Response> {
		let mut headers = self
			.options
			.file_headers(&self.path, self.variant, &self.attributes)?;
		if let Some(content_type) = &self.content_type {
			if !self.options.headers().contains_key(CONTENT_TYPE) {
				headers.insert(CONTENT_TYPE, content_type.clone());
			}
		}
		let response = self.options.complete(
			request,
			headers,
			&self.attributes,
			self.content.len() as u64,
			Body::Full(self.content.clone()),
		);
		drop(self.lease);
		response
	}
}

impl fmt::Debug for AggregatedHttpFile {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("AggregatedHttpFile")
			.field("path", &self.path)
			.field("variant", &self.variant)
			.field("attributes", &self.attributes)
			.field("len", &self.content.len())
			.field("holds_lease", &self.lease.is_some())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use fileserve_vfs::BufferPool;
	use http::header::{IF_NONE_MATCH, ETAG};
	use http::{Method, StatusCode, Uri};
	use rstest::rstest;

	fn aggregated(pool: &BufferPool) -> AggregatedHttpFile {
		AggregatedHttpFile::new(
			"/a.txt",
			Variant::Identity,
			FileAttributes::new(5, 1_000),
			pool.wrap("hello"),
			FileOptions::new(),
		)
	}

	#[rstest]
	fn test_serve_releases_lease() {
		let pool = BufferPool::new();
		let file = aggregated(&pool);

		let response = file.serve(&Request::get(Uri::from_static("/a.txt"))).unwrap();
		assert_eq!(pool.stats().outstanding, 0);
		assert!(matches!(response.body, Body::Full(ref b) if b.as_ref() == b"hello"));
	}

	#[rstest]
	fn test_snapshot_does_not_hold_lease() {
		let pool = BufferPool::new();
		let file = aggregated(&pool);
		let snapshot = file.snapshot();
		assert!(!snapshot.holds_lease());

		drop(file);
		assert_eq!(pool.stats().outstanding, 0);
		assert_eq!(snapshot.content().as_ref(), b"hello");
	}

	#[rstest]
	fn test_head_has_headers_but_no_body() {
		let pool = BufferPool::new();
		let request = Request::new(
			Method::HEAD,
			Uri::from_static("/a.txt"),
			http::Version::HTTP_11,
			http::HeaderMap::new(),
		);
		let response = aggregated(&pool).serve(&request).unwrap();
		assert_eq!(response.headers["content-length"], "5");
		assert!(matches!(response.body, Body::Empty));
	}

	#[rstest]
	fn test_matching_etag_is_not_modified() {
		let pool = BufferPool::new();
		let first = aggregated(&pool)
			.serve(&Request::get(Uri::from_static("/a.txt")))
			.unwrap();
		let etag = first.headers[ETAG].clone();

		let request = Request::get(Uri::from_static("/a.txt")).with_header(IF_NONE_MATCH, etag);
		let response = aggregated(&pool).serve(&request).unwrap();
		assert_eq!(response.status, StatusCode::NOT_MODIFIED);
		assert!(!response.headers.contains_key("content-length"));
		assert!(matches!(response.body, Body::Empty));
	}
}
