//! Media type guessing

use http::HeaderValue;
use std::fmt;

/// Resolves the `Content-Type` of a file from its path.
pub trait MediaTypeResolver: Send + Sync + fmt::Debug {
	/// Guesses the media type of the file at `path`.
	///
	/// When `content_encoding` is set, `path` names a pre-compressed variant
	/// (e.g. `app.js.br`) and the media type is that of the original file.
	/// Returning `None` omits the `Content-Type` header.
	fn guess(&self, path: &str, content_encoding: Option<&str>) -> Option<HeaderValue>;
}

/// Guesses media types from file extensions via `mime_guess`.
///
/// Textual types get `charset=utf-8`.
///
/// # Example
///
/// ```rust
/// use fileserve_http::{GuessMediaType, MediaTypeResolver};
///
/// let resolver = GuessMediaType;
/// assert_eq!(resolver.guess("/a.html", None).unwrap(), "text/html; charset=utf-8");
/// assert_eq!(resolver.guess("/a.css.br", Some("br")).unwrap(), "text/css; charset=utf-8");
/// assert_eq!(resolver.guess("/a.png", None).unwrap(), "image/png");
/// assert!(resolver.guess("/a.unknown-extension", None).is_none());
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct GuessMediaType;

impl MediaTypeResolver for GuessMediaType {
	fn guess(&self, path: &str, content_encoding: Option<&str>) -> Option<HeaderValue> {
		let path = match content_encoding {
			Some(_) => strip_extension(path),
			None => path,
		};
		let mime = mime_guess::from_path(path).first()?;
		let textual = mime.type_() == mime_guess::mime::TEXT
			|| matches!(
				mime.essence_str(),
				"application/javascript" | "application/json" | "application/xml"
			);
		let value = if textual && mime.get_param(mime_guess::mime::CHARSET).is_none() {
			format!("{}; charset=utf-8", mime.essence_str())
		} else {
			mime.to_string()
		};
		HeaderValue::from_str(&value).ok()
	}
}

/// Removes the last extension of the file name in `path`.
pub(crate) fn strip_extension(path: &str) -> &str {
	let name_start = path.rfind('/').map_or(0, |i| i + 1);
	match path[name_start..].rfind('.') {
		Some(dot) if dot > 0 => &path[..name_start + dot],
		_ => path,
	}
}
