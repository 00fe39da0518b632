//! The file service and its resolution pipeline
//!
//! A request path is resolved by trying, in order:
//!
//! 1. the accepted pre-compressed variants, then the file itself,
//! 2. for a directory path (`/docs/`), its `index.html`, then a generated
//!    listing,
//! 3. for any other path (`/docs`), a redirect to `/docs/` if that would
//!    find an index or a listing.
//!
//! Anything else is not found.

use crate::cache::{AggregationCache, CacheKey, CacheStatistics};
use crate::encoding::AcceptedEncodings;
use crate::{FileServiceBuilder, FileServiceConfig, OrElse, autoindex};
use async_trait::async_trait;
use fileserve_http::{
	AggregatedHttpFile, DecompressingFile, Handler, HttpFile, Registration, Request, Response,
	Result, Variant, VfsFile,
};
use fileserve_vfs::{FileAttributes, FileSystemVfs, HttpVfs, path};
use http::HeaderValue;
use std::path::PathBuf;
use std::sync::Arc;

/// Serves files from a byte source.
///
/// # Examples
///
/// ```
/// use fileserve_http::{Handler, Request};
/// use fileserve_service::FileService;
/// use fileserve_vfs::MemoryVfs;
/// use http::{StatusCode, Uri};
///
/// # tokio_test::block_on(async {
/// let vfs = MemoryVfs::new();
/// vfs.insert("/docs/index.html", "<h1>Docs</h1>");
/// let service = FileService::of(vfs);
///
/// let response = service.handle(Request::get(Uri::from_static("/docs/"))).await.unwrap();
/// assert_eq!(response.status, StatusCode::OK);
///
/// let response = service.handle(Request::get(Uri::from_static("/docs?lang=en"))).await.unwrap();
/// assert_eq!(response.status, StatusCode::TEMPORARY_REDIRECT);
/// assert_eq!(response.headers["location"], "/docs/?lang=en");
/// # });
/// ```
#[derive(Debug)]
pub struct FileService {
	config: Arc<FileServiceConfig>,
	cache: AggregationCache,
}

impl FileService {
	pub(crate) fn new(config: FileServiceConfig) -> Self {
		let config = Arc::new(config);
		let cache = AggregationCache::new(Arc::clone(&config));
		Self { config, cache }
	}

	/// Returns a builder for a service serving files from `vfs`.
	pub fn builder(vfs: impl HttpVfs + 'static) -> FileServiceBuilder {
		FileServiceBuilder::new(vfs)
	}

	/// Creates a service with default settings serving files from `vfs`.
	pub fn of(vfs: impl HttpVfs + 'static) -> Self {
		FileServiceBuilder::new(vfs).build()
	}

	/// Creates a service with default settings serving the directory `root`.
	pub fn for_path(root: impl Into<PathBuf>) -> Self {
		Self::of(FileSystemVfs::new(root))
	}

	/// The service configuration.
	pub fn config(&self) -> &FileServiceConfig {
		&self.config
	}

	/// The aggregation cache.
	pub fn cache(&self) -> &AggregationCache {
		&self.cache
	}

	/// Returns a snapshot of the cache counters.
	pub fn statistics(&self) -> CacheStatistics {
		self.cache.statistics()
	}

	/// Combines this service with a fallback handler for requests that do not
	/// resolve to a file.
	pub fn or_else<S: Handler>(self, next: S) -> OrElse<S> {
		OrElse::new(self, next)
	}

	/// Empties the cache, releasing every cached buffer.
	pub async fn close(&self) {
		self.cache.close().await;
	}

	/// Resolves `request` to the file to serve.
	///
	/// The mapped path of the request is used, see
	/// [`Request::decoded_mapped_path`].
	///
	/// # Errors
	///
	/// Returns an error if the byte source fails. A missing file is not an
	/// error but [`HttpFile::NonExistent`].
	pub async fn find_file(&self, request: &Request) -> Result<HttpFile> {
		let Some(path) = canonical_path(&request.decoded_mapped_path()) else {
			return Ok(HttpFile::NonExistent);
		};
		let encodings = AcceptedEncodings::negotiate(
			self.config.serve_compressed(),
			self.config.auto_decompress(),
			&request.headers,
		);

		if let Some(file) = self.find_variant(&path, &encodings).await? {
			return Ok(file);
		}

		if path.ends_with('/') {
			if let Some(file) = self
				.find_variant(&format!("{path}index.html"), &encodings)
				.await?
			{
				return Ok(file);
			}
			if !self.config.auto_index() || !self.config.vfs().can_list(&path).await? {
				return Ok(HttpFile::NonExistent);
			}
			return self.listing(request, &path).await;
		}

		let has_index = self
			.find_variant(&format!("{path}/index.html"), &encodings)
			.await?
			.is_some();
		if has_index || (self.config.auto_index() && self.config.vfs().can_list(&path).await?) {
			let location = match request.query() {
				Some(query) => format!("{}/?{}", request.path(), query),
				None => format!("{}/", request.path()),
			};
			return Ok(HttpFile::redirect(location));
		}

		Ok(HttpFile::NonExistent)
	}

	/// Serves a resolved file, answering anything but `GET` and `HEAD` with
	/// `405 Method Not Allowed`.
	pub(crate) async fn serve_file(&self, file: HttpFile, request: &Request) -> Result<Response> {
		if !request.is_get_or_head() {
			return Ok(Response::method_not_allowed());
		}
		file.serve(request).await
	}

	async fn find_variant(
		&self,
		path: &str,
		encodings: &AcceptedEncodings,
	) -> Result<Option<HttpFile>> {
		if encodings.decompress() {
			if let Some(file) = self.lookup(path.to_string(), Variant::Identity).await? {
				return Ok(Some(file));
			}
			for candidate in encodings.candidates() {
				let variant = Variant::Decoded(candidate.wire_value);
				if let Some(file) = self
					.lookup(format!("{path}{}", candidate.extension), variant)
					.await?
				{
					return Ok(Some(file));
				}
			}
			return Ok(None);
		}

		for candidate in encodings.candidates() {
			let variant = Variant::Encoded(candidate.wire_value);
			if let Some(file) = self
				.lookup(format!("{path}{}", candidate.extension), variant)
				.await?
			{
				return Ok(Some(file));
			}
		}
		self.lookup(path.to_string(), Variant::Identity).await
	}

	async fn lookup(&self, path: String, variant: Variant) -> Result<Option<HttpFile>> {
		let key = CacheKey::new(path.clone(), variant);
		let vfs = Arc::clone(self.config.vfs());
		let options = self.config.file_options().clone();
		let pool = self.config.buffer_pool().clone();
		self.cache
			.lookup(key, self.config.vfs().as_ref(), move |attributes| {
				let file = VfsFile::new(vfs, path, variant, attributes, options);
				match variant {
					Variant::Decoded(encoding) => {
						HttpFile::Decompressing(DecompressingFile::new(file, encoding, pool))
					}
					_ => HttpFile::Vfs(file),
				}
			})
			.await
	}

	async fn listing(&self, request: &Request, path: &str) -> Result<HttpFile> {
		let children = self.config.vfs().list(path).await?;
		tracing::debug!(path, children = children.len(), "generating directory listing");
		let html = autoindex::render(&request.decoded_path(), &children);
		let options = self.config.file_options();
		let attributes = FileAttributes::from_system_time(html.len() as u64, options.clock().now());
		let content = self.config.buffer_pool().wrap(html);
		let file = AggregatedHttpFile::new(path, Variant::Identity, attributes, content, options.clone())
			.with_content_type(HeaderValue::from_static("text/html; charset=utf-8"));
		Ok(HttpFile::Aggregated(file))
	}
}

#[async_trait]
impl Handler for FileService {
	async fn handle(&self, request: Request) -> Result<Response> {
		if !request.is_get_or_head() {
			return Ok(Response::method_not_allowed());
		}
		let file = self.find_file(&request).await?;
		self.serve_file(file, &request).await
	}

	fn on_registered(&self, registration: &Registration) -> Result<()> {
		let cache = self
			.config
			.cache_spec()
			.map_or_else(|| "off".to_string(), ToString::to_string);
		tracing::info!(
			route = registration.route(),
			vfs = %self.config.vfs().meter_tag(),
			cache = %cache,
			serve_compressed = self.config.serve_compressed(),
			auto_index = self.config.auto_index(),
			"Registered file service"
		);
		Ok(())
	}

	fn should_cache_path(&self, _path: &str, _query: Option<&str>) -> bool {
		// A bounded file cache implies a finite set of paths.
		self.cache.is_enabled()
	}
}

/// Rebuilds `decoded` from its normalized segments, keeping a trailing `/`.
///
/// Returns `None` for traversal attempts.
fn canonical_path(decoded: &str) -> Option<String> {
	let relative = path::normalize(decoded)?;
	if relative.is_empty() {
		return Some("/".to_string());
	}
	if decoded.ends_with('/') {
		Some(format!("/{relative}/"))
	} else {
		Some(format!("/{relative}"))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("/", Some("/"))]
	#[case("", Some("/"))]
	#[case("/a//b/", Some("/a/b/"))]
	#[case("/a/./b", Some("/a/b"))]
	#[case("/a/../../etc/passwd", None)]
	fn test_canonical_path(#[case] decoded: &str, #[case] expected: Option<&str>) {
		assert_eq!(canonical_path(decoded).as_deref(), expected);
	}
}
