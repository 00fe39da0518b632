use fileserve_http::Variant;

/// Identifies one negotiated variant of one file.
///
/// `/app.js.br` served with `Content-Encoding: br`, `/app.js.br` decoded for
/// a client without brotli support and `/app.js.br` requested by its own
/// name are three different keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
	path: String,
	variant: Variant,
}

impl CacheKey {
	/// Creates a key for the file at `path` served as `variant`.
	pub fn new(path: impl Into<String>, variant: Variant) -> Self {
		Self {
			path: path.into(),
			variant,
		}
	}

	/// Path of the file within its byte source.
	pub fn path(&self) -> &str {
		&self.path
	}

	/// The representation the file is served as.
	pub fn variant(&self) -> Variant {
		self.variant
	}

	/// The `Content-Encoding` the file is served with.
	pub fn content_encoding(&self) -> Option<&'static str> {
		self.variant.content_encoding()
	}
}
