//! Path normalization shared by the byte sources

/// Splits a request path into its normalized segments.
///
/// Empty segments and `.` are dropped. Returns `None` if the path tries to
/// escape the root through a `..` segment or contains a backslash or NUL
/// byte.
///
/// # Example
///
/// ```rust
/// use fileserve_vfs::path::segments;
///
/// assert_eq!(segments("/css//./app.css"), Some(vec!["css", "app.css"]));
/// assert_eq!(segments("/"), Some(vec![]));
/// assert_eq!(segments("/../etc/passwd"), None);
/// ```
pub fn segments(path: &str) -> Option<Vec<&str>> {
	let mut out = Vec::new();
	for segment in path.split('/') {
		match segment {
			"" | "." => continue,
			".." => return None,
			s if s.contains('\\') || s.contains('\0') => return None,
			s => out.push(s),
		}
	}
	Some(out)
}

/// Normalizes a request path into a root-relative key such as `css/app.css`.
///
/// Returns `None` for paths rejected by [`segments`]. Traversal attempts are
/// logged.
pub fn normalize(path: &str) -> Option<String> {
	match segments(path) {
		Some(parts) => Some(parts.join("/")),
		None => {
			tracing::warn!("Path traversal attempt blocked: {}", path);
			None
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("/foo.txt", Some("foo.txt"))]
	#[case("/dir/", Some("dir"))]
	#[case("dir/sub/file", Some("dir/sub/file"))]
	#[case("/", Some(""))]
	#[case("/a/../b", None)]
	#[case("/a\\b", None)]
	fn test_normalize(#[case] input: &str, #[case] expected: Option<&str>) {
		assert_eq!(normalize(input).as_deref(), expected);
	}
}
