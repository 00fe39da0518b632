use bytes::{Bytes, BytesMut};
use fileserve_vfs::ByteStream;
use futures::TryStreamExt;
use http::header::{CONTENT_TYPE, HeaderName, HeaderValue, LOCATION};
use http::{HeaderMap, StatusCode};
use std::fmt;
use std::io;

/// Response body.
pub enum Body {
	/// No body at all (`HEAD`, `304`, redirects)
	Empty,
	/// In-memory content
	Full(Bytes),
	/// Content streamed from the byte source
	Stream(ByteStream),
}

impl Body {
	/// Collects the body into a single buffer.
	pub async fn collect(self) -> io::Result<Bytes> {
		match self {
			Body::Empty => Ok(Bytes::new()),
			Body::Full(bytes) => Ok(bytes),
			Body::Stream(stream) => {
				let buf = stream
					.try_fold(BytesMut::new(), |mut buf, chunk| async move {
						buf.extend_from_slice(&chunk);
						Ok(buf)
					})
					.await?;
				Ok(buf.freeze())
			}
		}
	}
}

impl fmt::Debug for Body {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Body::Empty => f.write_str("Empty"),
			Body::Full(bytes) => f.debug_tuple("Full").field(&bytes.len()).finish(),
			Body::Stream(_) => f.write_str("Stream(..)"),
		}
	}
}

/// HTTP Response representation
#[derive(Debug)]
pub struct Response {
	pub status: StatusCode,
	pub headers: HeaderMap,
	pub body: Body,
}

impl Response {
	/// Create a new Response with the given status code
	///
	/// # Examples
	///
	/// ```
	/// use fileserve_http::Response;
	/// use http::StatusCode;
	///
	/// let response = Response::new(StatusCode::OK);
	/// assert_eq!(response.status, StatusCode::OK);
	/// ```
	pub fn new(status: StatusCode) -> Self {
		Self {
			status,
			headers: HeaderMap::new(),
			body: Body::Empty,
		}
	}

	/// Create a Response with HTTP 200 OK status
	pub fn ok() -> Self {
		Self::new(StatusCode::OK)
	}

	/// Create a Response with HTTP 304 Not Modified status
	pub fn not_modified() -> Self {
		Self::new(StatusCode::NOT_MODIFIED)
	}

	/// Create a Response with HTTP 404 Not Found status
	pub fn not_found() -> Self {
		Self::new(StatusCode::NOT_FOUND).with_text("404 Not Found")
	}

	/// Create a Response with HTTP 405 Method Not Allowed status
	pub fn method_not_allowed() -> Self {
		Self::new(StatusCode::METHOD_NOT_ALLOWED)
			.with_header(http::header::ALLOW, HeaderValue::from_static("GET, HEAD"))
			.with_text("405 Method Not Allowed")
	}

	/// Create a Response with HTTP 500 Internal Server Error status
	pub fn internal_server_error() -> Self {
		Self::new(StatusCode::INTERNAL_SERVER_ERROR).with_text("500 Internal Server Error")
	}

	/// Create a HTTP 307 Temporary Redirect pointing at `location`
	///
	/// # Examples
	///
	/// ```
	/// use fileserve_http::Response;
	/// use http::StatusCode;
	///
	/// let response = Response::temporary_redirect("/docs/?page=2").unwrap();
	/// assert_eq!(response.status, StatusCode::TEMPORARY_REDIRECT);
	/// assert_eq!(response.headers["location"], "/docs/?page=2");
	/// ```
	pub fn temporary_redirect(location: &str) -> crate::Result<Self> {
		let location = HeaderValue::from_str(location)?;
		Ok(Self::new(StatusCode::TEMPORARY_REDIRECT).with_header(LOCATION, location))
	}

	/// Set the body
	pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = Body::Full(body.into());
		self
	}

	/// Set a plain text body
	pub fn with_text(self, text: &'static str) -> Self {
		self.with_header(
			CONTENT_TYPE,
			HeaderValue::from_static("text/plain; charset=utf-8"),
		)
		.with_body(Bytes::from_static(text.as_bytes()))
	}

	/// Set a streaming body
	pub fn with_stream(mut self, stream: ByteStream) -> Self {
		self.body = Body::Stream(stream);
		self
	}

	/// Set a header, replacing any previous value
	pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.headers.insert(name, value);
		self
	}

	/// Returns the first value of header `name` as a string, if it is valid
	/// visible ASCII.
	pub fn header_str(&self, name: impl http::header::AsHeaderName) -> Option<&str> {
		self.headers.get(name).and_then(|v| v.to_str().ok())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use futures::stream;
	use rstest::rstest;

	#[rstest]
	#[tokio::test]
	async fn test_collect_stream_body() {
		let chunks = vec![Ok(Bytes::from_static(b"ab")), Ok(Bytes::from_static(b"cd"))];
		let body = Body::Stream(Box::pin(stream::iter(chunks)));
		assert_eq!(body.collect().await.unwrap(), Bytes::from_static(b"abcd"));
	}

	#[rstest]
	fn test_redirect_rejects_invalid_location() {
		assert!(Response::temporary_redirect("/a\nb").is_err());
	}
}
