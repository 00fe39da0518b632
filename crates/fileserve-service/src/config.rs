//! File service configuration

use crate::CacheSpec;
use fileserve_http::FileOptions;
use fileserve_vfs::{BufferPool, HttpVfs};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Default size limit, in bytes, of a file kept in the aggregation cache.
pub const DEFAULT_MAX_CACHE_ENTRY_SIZE_BYTES: u64 = 65_536;

/// Immutable configuration of a [`FileService`](crate::FileService).
///
/// Built by [`FileServiceBuilder`](crate::FileServiceBuilder).
pub struct FileServiceConfig {
	pub(crate) vfs: Arc<dyn HttpVfs>,
	pub(crate) file_options: FileOptions,
	pub(crate) cache_spec: Option<CacheSpec>,
	pub(crate) max_cache_entry_size_bytes: u64,
	pub(crate) serve_compressed: bool,
	pub(crate) auto_decompress: bool,
	pub(crate) auto_index: bool,
	pub(crate) buffer_pool: BufferPool,
	oversized_variant_warned: AtomicBool,
}

impl FileServiceConfig {
	#[allow(clippy::too_many_arguments)]
	pub(crate) fn new(
		vfs: Arc<dyn HttpVfs>,
		file_options: FileOptions,
		cache_spec: Option<CacheSpec>,
		max_cache_entry_size_bytes: u64,
		serve_compressed: bool,
		auto_decompress: bool,
		auto_index: bool,
		buffer_pool: BufferPool,
	) -> Self {
		Self {
			vfs,
			file_options,
			cache_spec: cache_spec.filter(|spec| !spec.is_disabled()),
			max_cache_entry_size_bytes,
			serve_compressed,
			auto_decompress,
			auto_index,
			buffer_pool,
			oversized_variant_warned: AtomicBool::new(false),
		}
	}

	/// The byte source files are served from.
	pub fn vfs(&self) -> &Arc<dyn HttpVfs> {
		&self.vfs
	}

	/// Clock, default headers and media types used for responses.
	pub fn file_options(&self) -> &FileOptions {
		&self.file_options
	}

	/// The cache spec, or `None` if caching is disabled.
	pub fn cache_spec(&self) -> Option<&CacheSpec> {
		self.cache_spec.as_ref()
	}

	/// Files larger than this are streamed instead of cached.
	pub fn max_cache_entry_size_bytes(&self) -> u64 {
		self.max_cache_entry_size_bytes
	}

	/// Whether pre-compressed `.br`/`.gz` variants are served.
	pub fn serve_compressed(&self) -> bool {
		self.serve_compressed
	}

	/// Whether pre-compressed variants are decoded for clients that accept
	/// none of them.
	pub fn auto_decompress(&self) -> bool {
		self.auto_decompress
	}

	/// Whether directory listings are generated.
	pub fn auto_index(&self) -> bool {
		self.auto_index
	}

	/// The pool aggregated content is read into.
	pub fn buffer_pool(&self) -> &BufferPool {
		&self.buffer_pool
	}

	/// Logs, once per configuration, that a pre-compressed variant is too
	/// large to be cached.
	pub(crate) fn warn_oversized_variant(&self, path: &str, length: u64) {
		if !self.oversized_variant_warned.swap(true, Ordering::Relaxed) {
			tracing::warn!(
				path,
				length,
				limit = self.max_cache_entry_size_bytes,
				"Pre-compressed file exceeds the cache entry size limit and will be read on every request"
			);
		}
	}
}

impl fmt::Debug for FileServiceConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FileServiceConfig")
			.field("vfs", &self.vfs.meter_tag())
			.field("file_options", &self.file_options)
			.field("cache_spec", &self.cache_spec.map(|spec| spec.to_string()))
			.field("max_cache_entry_size_bytes", &self.max_cache_entry_size_bytes)
			.field("serve_compressed", &self.serve_compressed)
			.field("auto_decompress", &self.auto_decompress)
			.field("auto_index", &self.auto_index)
			.finish()
	}
}
