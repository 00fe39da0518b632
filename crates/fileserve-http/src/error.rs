//! Error types

use std::io;

/// Errors raised while resolving or serving a file.
///
/// A missing file is not an error; it resolves to
/// [`HttpFile::NonExistent`](crate::HttpFile::NonExistent) and is answered with
/// `404 Not Found`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// The byte source failed to stat, read or list a path.
	#[error("I/O error: {0}")]
	Io(#[from] io::Error),

	/// A response could not be assembled.
	#[error("HTTP error: {0}")]
	Http(#[from] http::Error),

	/// A header value (e.g. a redirect location) contained invalid bytes.
	#[error("Invalid header value: {0}")]
	InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),

	/// A pre-compressed file could not be decoded.
	#[error("Failed to decompress {encoding} content: {source}")]
	Decompress {
		/// Wire value of the content encoding, e.g. `br`
		encoding: &'static str,
		/// The decoder error
		#[source]
		source: io::Error,
	},
}

/// Result type alias for file serving operations.
pub type Result<T> = std::result::Result<T, Error>;
