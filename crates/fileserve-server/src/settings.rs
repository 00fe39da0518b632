//! Settings file
//!
//! The `fileserve` binary reads its settings from a TOML file. Every field is
//! optional:
//!
//! ```toml
//! root = "public"
//! bind = "0.0.0.0:8080"
//! mount = "/static/"
//! cache_spec = "maximumSize=512,expireAfterAccess=10m"
//! max_cache_entry_size_bytes = 65536
//! serve_compressed = true
//! auto_decompress = true
//! auto_index = false
//! max_blocking_threads = 64
//!
//! [headers]
//! cache-control = "public, max-age=3600"
//! ```

use crate::{Result, ServerError};
use fileserve_service::{CacheSpec, FileService};
use fileserve_service::config::DEFAULT_MAX_CACHE_ENTRY_SIZE_BYTES;
use fileserve_vfs::FileSystemVfs;
use http::{HeaderMap, HeaderName, HeaderValue};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Default listen address.
pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

/// Default number of threads serving blocking file system calls.
pub const DEFAULT_MAX_BLOCKING_THREADS: usize = 512;

/// Settings of a `fileserve` process.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
	/// Directory the files are served from.
	pub root: PathBuf,
	/// Listen address.
	pub bind: SocketAddr,
	/// Path prefix the files are mounted under.
	pub mount: String,
	/// Aggregation cache spec. The service default applies when unset.
	pub cache_spec: Option<CacheSpec>,
	/// Files larger than this are streamed instead of cached.
	pub max_cache_entry_size_bytes: u64,
	/// Serve `.br`/`.gz` variants to clients that accept them.
	pub serve_compressed: bool,
	/// Decode compressed variants for clients that accept none.
	pub auto_decompress: bool,
	/// Render listings for directories without an `index.html`.
	pub auto_index: bool,
	/// Headers added to every file response.
	pub headers: BTreeMap<String, String>,
	/// Upper bound of the blocking thread pool.
	pub max_blocking_threads: usize,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			root: PathBuf::from("."),
			bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
			mount: "/".to_string(),
			cache_spec: None,
			max_cache_entry_size_bytes: DEFAULT_MAX_CACHE_ENTRY_SIZE_BYTES,
			serve_compressed: false,
			auto_decompress: false,
			auto_index: false,
			headers: BTreeMap::new(),
			max_blocking_threads: DEFAULT_MAX_BLOCKING_THREADS,
		}
	}
}

impl Settings {
	/// Reads settings from a TOML file.
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let content = std::fs::read_to_string(path).map_err(|source| ServerError::ReadSettings {
			path: path.to_path_buf(),
			source,
		})?;
		Self::from_toml_str(&content)
	}

	/// Parses settings from TOML text.
	///
	/// # Examples
	///
	/// ```
	/// use fileserve_server::Settings;
	///
	/// let settings = Settings::from_toml_str(r#"
	///     root = "public"
	///     serve_compressed = true
	/// "#).unwrap();
	/// assert_eq!(settings.root.to_str(), Some("public"));
	/// assert!(settings.serve_compressed);
	/// assert_eq!(settings.mount, "/");
	/// ```
	pub fn from_toml_str(content: &str) -> Result<Self> {
		Ok(toml::from_str(content)?)
	}

	/// The configured headers as a header map.
	pub fn header_map(&self) -> Result<HeaderMap> {
		let mut map = HeaderMap::with_capacity(self.headers.len());
		for (name, value) in &self.headers {
			let header_name =
				HeaderName::from_bytes(name.as_bytes()).map_err(|err| ServerError::InvalidHeader {
					name: name.clone(),
					reason: err.to_string(),
				})?;
			let header_value = HeaderValue::from_str(value).map_err(|err| ServerError::InvalidHeader {
				name: name.clone(),
				reason: err.to_string(),
			})?;
			map.append(header_name, header_value);
		}
		Ok(map)
	}

	/// Builds the file service described by these settings.
	pub fn build_service(&self) -> Result<FileService> {
		let mut builder = FileService::builder(FileSystemVfs::new(self.root.clone()))
			.serve_compressed(self.serve_compressed)
			.auto_decompress(self.auto_decompress)
			.auto_index(self.auto_index)
			.max_cache_entry_size_bytes(self.max_cache_entry_size_bytes)
			.headers(self.header_map()?);
		if let Some(spec) = self.cache_spec {
			builder = builder.entry_cache_spec(spec);
		}
		Ok(builder.build())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::time::Duration;

	#[rstest]
	fn test_empty_file_uses_defaults() {
		let settings = Settings::from_toml_str("").unwrap();
		assert_eq!(settings, Settings::default());
		assert_eq!(settings.bind.to_string(), DEFAULT_BIND);
	}

	#[rstest]
	fn test_full_settings() {
		let settings = Settings::from_toml_str(
			r#"
			root = "/srv/www"
			bind = "0.0.0.0:9000"
			mount = "/assets/"
			cache_spec = "maximumSize=16,expireAfterWrite=2m"
			max_cache_entry_size_bytes = 1024
			serve_compressed = true
			auto_decompress = true
			auto_index = true
			max_blocking_threads = 8

			[headers]
			cache-control = "no-cache"
			"#,
		)
		.unwrap();

		assert_eq!(settings.root, PathBuf::from("/srv/www"));
		assert_eq!(settings.bind.port(), 9000);
		assert_eq!(settings.mount, "/assets/");
		let spec = settings.cache_spec.unwrap();
		assert_eq!(spec.maximum_size(), Some(16));
		assert_eq!(spec.expire_after_write(), Some(Duration::from_secs(120)));
		assert_eq!(settings.max_cache_entry_size_bytes, 1024);
		assert!(settings.serve_compressed && settings.auto_decompress && settings.auto_index);
		assert_eq!(settings.max_blocking_threads, 8);
		assert_eq!(settings.header_map().unwrap()["cache-control"], "no-cache");
	}

	#[rstest]
	#[case("cache_spec = \"maximumSize=ten\"")]
	#[case("unknown = 1")]
	#[case("bind = \"not an address\"")]
	fn test_invalid_settings_are_rejected(#[case] content: &str) {
		assert!(matches!(
			Settings::from_toml_str(content),
			Err(ServerError::Settings(_))
		));
	}

	#[rstest]
	#[case("bad header", "x")]
	#[case("x-ok", "line\nbreak")]
	fn test_invalid_header_is_rejected(#[case] name: &str, #[case] value: &str) {
		let mut settings = Settings::default();
		settings.headers.insert(name.to_string(), value.to_string());
		assert!(matches!(
			settings.header_map(),
			Err(ServerError::InvalidHeader { .. })
		));
	}

	#[rstest]
	fn test_missing_file() {
		let dir = tempfile::tempdir().unwrap();
		let result = Settings::from_file(dir.path().join("missing.toml"));
		assert!(matches!(result, Err(ServerError::ReadSettings { .. })));
	}

	#[rstest]
	fn test_build_service_applies_settings() {
		let settings = Settings::from_toml_str(
			r#"
			serve_compressed = true
			auto_index = true
			cache_spec = "off"
			"#,
		)
		.unwrap();
		let service = settings.build_service().unwrap();
		assert!(service.config().serve_compressed());
		assert!(service.config().auto_index());
		assert!(!service.cache().is_enabled());
	}
}
