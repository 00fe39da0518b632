//! Builder for [`FileService`]

use crate::cache_spec::DEFAULT_MAXIMUM_SIZE;
use crate::config::DEFAULT_MAX_CACHE_ENTRY_SIZE_BYTES;
use crate::{CacheSpec, FileService, FileServiceConfig};
use fileserve_http::{Clock, FileOptions, MediaTypeResolver};
use fileserve_vfs::{BufferPool, HttpVfs};
use http::header::{HeaderName, HeaderValue};
use http::HeaderMap;
use std::sync::Arc;

/// Builds a [`FileService`].
///
/// Defaults: pre-compressed variants are not served, directory listings are
/// off, up to 1024 files of at most 64 KiB each are cached.
///
/// # Examples
///
/// ```
/// use fileserve_service::FileServiceBuilder;
/// use fileserve_vfs::MemoryVfs;
///
/// let service = FileServiceBuilder::new(MemoryVfs::new())
///     .serve_compressed(true)
///     .auto_index(true)
///     .max_cache_entries(128)
///     .build();
///
/// assert!(service.config().serve_compressed());
/// assert_eq!(service.config().cache_spec().unwrap().maximum_size(), Some(128));
/// ```
pub struct FileServiceBuilder {
	vfs: Arc<dyn HttpVfs>,
	cache_spec: Option<CacheSpec>,
	max_cache_entry_size_bytes: u64,
	serve_compressed: bool,
	auto_decompress: bool,
	auto_index: bool,
	clock: Option<Arc<dyn Clock>>,
	media_types: Option<Arc<dyn MediaTypeResolver>>,
	headers: HeaderMap,
	buffer_pool: BufferPool,
}

impl FileServiceBuilder {
	/// Creates a builder serving files from `vfs`.
	pub fn new(vfs: impl HttpVfs + 'static) -> Self {
		Self::from_arc(Arc::new(vfs))
	}

	/// Creates a builder serving files from a shared byte source.
	pub fn from_arc(vfs: Arc<dyn HttpVfs>) -> Self {
		Self {
			vfs,
			cache_spec: Some(CacheSpec::with_maximum_size(DEFAULT_MAXIMUM_SIZE)),
			max_cache_entry_size_bytes: DEFAULT_MAX_CACHE_ENTRY_SIZE_BYTES,
			serve_compressed: false,
			auto_decompress: false,
			auto_index: false,
			clock: None,
			media_types: None,
			headers: HeaderMap::new(),
			buffer_pool: BufferPool::new(),
		}
	}

	/// Serves `.br` and `.gz` siblings of a file to clients accepting those
	/// encodings.
	pub fn serve_compressed(mut self, serve_compressed: bool) -> Self {
		self.serve_compressed = serve_compressed;
		self
	}

	/// Decodes pre-compressed files for clients that accept none of the
	/// supported encodings, when no uncompressed file exists.
	///
	/// Only effective together with [`serve_compressed`](Self::serve_compressed).
	pub fn auto_decompress(mut self, auto_decompress: bool) -> Self {
		self.auto_decompress = auto_decompress;
		self
	}

	/// Generates an HTML listing for directories without an `index.html`.
	pub fn auto_index(mut self, auto_index: bool) -> Self {
		self.auto_index = auto_index;
		self
	}

	/// Bounds the cache to `max_entries` files. `0` disables caching.
	pub fn max_cache_entries(mut self, max_entries: u64) -> Self {
		self.cache_spec = Some(CacheSpec::with_maximum_size(max_entries));
		self
	}

	/// Sets the cache bounds and expiry.
	pub fn entry_cache_spec(mut self, spec: CacheSpec) -> Self {
		self.cache_spec = Some(spec);
		self
	}

	/// Disables caching.
	pub fn disable_cache(mut self) -> Self {
		self.cache_spec = None;
		self
	}

	/// Files larger than `size` bytes are streamed instead of cached.
	pub fn max_cache_entry_size_bytes(mut self, size: u64) -> Self {
		self.max_cache_entry_size_bytes = size;
		self
	}

	/// Sets the clock used for the `Date` header.
	pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = Some(clock);
		self
	}

	/// Sets the resolver for the `Content-Type` header.
	pub fn media_types(mut self, media_types: Arc<dyn MediaTypeResolver>) -> Self {
		self.media_types = Some(media_types);
		self
	}

	/// Adds a header to every file response.
	pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.headers.append(name, value);
		self
	}

	/// Adds headers to every file response.
	pub fn headers(mut self, headers: HeaderMap) -> Self {
		self.headers.extend(headers);
		self
	}

	/// Sets the pool aggregated content is read into.
	pub fn buffer_pool(mut self, pool: BufferPool) -> Self {
		self.buffer_pool = pool;
		self
	}

	/// Builds the service.
	pub fn build(self) -> FileService {
		let mut file_options = FileOptions::new().with_headers(self.headers);
		if let Some(clock) = self.clock {
			file_options = file_options.with_clock(clock);
		}
		if let Some(media_types) = self.media_types {
			file_options = file_options.with_media_types(media_types);
		}
		let config = FileServiceConfig::new(
			self.vfs,
			file_options,
			self.cache_spec,
			self.max_cache_entry_size_bytes,
			self.serve_compressed,
			self.auto_decompress,
			self.auto_index,
			self.buffer_pool,
		);
		FileService::new(config)
	}
}
