//! Aggregation cache
//!
//! Keeps the full content of small files in memory, keyed by [`CacheKey`].
//! Every lookup stats the file first; a cached entry is only served while its
//! recorded attributes equal the fresh ones. Content is held in pooled
//! buffers, and every removal from the cache (capacity, expiry, invalidation,
//! replacement, shutdown) releases the entry's buffer exactly once.

mod key;

pub use key::CacheKey;

use crate::{CacheSpec, FileServiceConfig};
use fileserve_http::{AggregatedHttpFile, HttpFile, Result};
use fileserve_vfs::{FileAttributes, HttpVfs};
use moka::future::Cache;
use moka::notification::RemovalCause;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Cache counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStatistics {
	/// Lookups served from the cache
	pub hits: u64,
	/// Lookups that had to aggregate the file
	pub misses: u64,
	/// Entries removed because of the size bound or expiry
	pub evictions: u64,
	/// Approximate number of entries
	pub entry_count: u64,
	/// Approximate total weight of all entries
	pub weighted_size: u64,
}

#[derive(Debug, Default)]
struct Counters {
	hits: AtomicU64,
	misses: AtomicU64,
	evictions: AtomicU64,
}

/// A cache entry. The aggregated file is taken out, and its buffer released,
/// when the entry leaves the cache.
#[derive(Debug)]
struct CachedFile {
	file: Mutex<Option<AggregatedHttpFile>>,
	weight: u32,
}

impl CachedFile {
	fn new(file: AggregatedHttpFile) -> Self {
		let weight = u32::try_from(file.content().len()).unwrap_or(u32::MAX);
		Self {
			file: Mutex::new(Some(file)),
			weight,
		}
	}

	/// Checks the entry against fresh `attributes`.
	fn check(&self, attributes: &FileAttributes) -> Freshness {
		match self.file.lock().as_ref() {
			None => Freshness::Released,
			Some(file) if file.attributes() == attributes => Freshness::Fresh(file.snapshot()),
			Some(_) => Freshness::Stale,
		}
	}

	fn release(&self) -> bool {
		self.file.lock().take().is_some()
	}
}

enum Freshness {
	Fresh(AggregatedHttpFile),
	Stale,
	/// Already removed from the cache; the key may hold a newer entry.
	Released,
}

/// In-memory cache of aggregated files.
pub struct AggregationCache {
	cache: Option<Cache<CacheKey, Arc<CachedFile>>>,
	config: Arc<FileServiceConfig>,
	counters: Arc<Counters>,
}

impl AggregationCache {
	/// Creates the cache described by the configuration's cache spec.
	pub fn new(config: Arc<FileServiceConfig>) -> Self {
		let counters = Arc::new(Counters::default());
		let cache = config
			.cache_spec()
			.map(|spec| build_cache(spec, Arc::clone(&counters)));
		Self {
			cache,
			config,
			counters,
		}
	}

	/// Returns whether files are cached at all.
	pub fn is_enabled(&self) -> bool {
		self.cache.is_some()
	}

	/// Resolves the file identified by `key`.
	///
	/// The file is always stat'ed through `vfs` first. Returns `None` if it
	/// does not exist. Otherwise `file` turns the fresh attributes into the
	/// uncached representation, which is returned as-is when caching is
	/// disabled, when the file exceeds the size limit, or when it cannot be
	/// aggregated. In all other cases the result is an in-memory snapshot,
	/// either of a fresh cache entry or of a newly aggregated one.
	///
	/// # Errors
	///
	/// Returns an error if `vfs` fails to stat the file. Aggregation failures
	/// are logged and fall back to the uncached file.
	pub async fn lookup<F>(
		&self,
		key: CacheKey,
		vfs: &dyn HttpVfs,
		file: F,
	) -> Result<Option<HttpFile>>
	where
		F: FnOnce(FileAttributes) -> HttpFile + Send,
	{
		let Some(attributes) = vfs.attributes(key.path()).await? else {
			self.invalidate(&key).await;
			return Ok(None);
		};
		let uncached = file(attributes);
		let Some(cache) = &self.cache else {
			return Ok(Some(uncached));
		};

		let limit = self.config.max_cache_entry_size_bytes();
		if attributes.length() > limit {
			tracing::debug!(path = key.path(), length = attributes.length(), "file too large to cache");
			if key.content_encoding().is_some() {
				self.config
					.warn_oversized_variant(key.path(), attributes.length());
			}
			self.invalidate(&key).await;
			return Ok(Some(uncached));
		}

		if let Some(entry) = cache.get(&key).await {
			match entry.check(&attributes) {
				Freshness::Fresh(snapshot) => {
					self.counters.hits.fetch_add(1, Ordering::Relaxed);
					tracing::trace!(path = key.path(), "cache hit");
					return Ok(Some(HttpFile::Aggregated(snapshot)));
				}
				Freshness::Stale => {
					tracing::debug!(path = key.path(), "cached file is stale");
					cache.invalidate(&key).await;
				}
				Freshness::Released => {
					tracing::trace!(path = key.path(), "cached file was removed during lookup");
				}
			}
		}
		self.counters.misses.fetch_add(1, Ordering::Relaxed);

		let aggregated = match uncached.aggregate(self.config.buffer_pool()).await {
			Ok(Some(aggregated)) => aggregated,
			Ok(None) => return Ok(Some(uncached)),
			Err(e) => {
				tracing::warn!(
					path = key.path(),
					vfs = %vfs.meter_tag(),
					"Failed to aggregate file, serving it uncached: {}",
					e
				);
				return Ok(Some(uncached));
			}
		};

		// Decoded content may exceed the limit even if the source did not.
		if aggregated.content().len() as u64 > limit {
			cache.invalidate(&key).await;
			return Ok(Some(HttpFile::Aggregated(aggregated)));
		}

		let snapshot = aggregated.snapshot();
		cache.insert(key, Arc::new(CachedFile::new(aggregated))).await;
		Ok(Some(HttpFile::Aggregated(snapshot)))
	}

	/// Removes the entry for `key`, releasing its buffer. A missing entry is
	/// ignored.
	pub async fn invalidate(&self, key: &CacheKey) {
		if let Some(cache) = &self.cache {
			cache.invalidate(key).await;
		}
	}

	/// Processes pending maintenance such as size-bound evictions.
	pub async fn run_pending_tasks(&self) {
		if let Some(cache) = &self.cache {
			cache.run_pending_tasks().await;
		}
	}

	/// Returns a snapshot of the cache counters.
	pub fn statistics(&self) -> CacheStatistics {
		let (entry_count, weighted_size) = match &self.cache {
			Some(cache) => (cache.entry_count(), cache.weighted_size()),
			None => (0, 0),
		};
		CacheStatistics {
			hits: self.counters.hits.load(Ordering::Relaxed),
			misses: self.counters.misses.load(Ordering::Relaxed),
			evictions: self.counters.evictions.load(Ordering::Relaxed),
			entry_count,
			weighted_size,
		}
	}

	/// Removes every entry, releasing all cached buffers.
	pub async fn close(&self) {
		let Some(cache) = &self.cache else {
			return;
		};
		let keys: Vec<Arc<CacheKey>> = cache.iter().map(|(key, _)| key).collect();
		for key in keys {
			cache.invalidate(key.as_ref()).await;
		}
		cache.invalidate_all();
		cache.run_pending_tasks().await;
	}
}

impl std::fmt::Debug for AggregationCache {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("AggregationCache")
			.field("enabled", &self.is_enabled())
			.field("statistics", &self.statistics())
			.finish()
	}
}

fn build_cache(spec: &CacheSpec, counters: Arc<Counters>) -> Cache<CacheKey, Arc<CachedFile>> {
	let mut builder = Cache::builder();
	if let Some(size) = spec.maximum_size() {
		builder = builder.max_capacity(size);
	}
	if let Some(weight) = spec.maximum_weight() {
		builder = builder
			.max_capacity(weight)
			.weigher(|_key: &CacheKey, entry: &Arc<CachedFile>| entry.weight);
	}
	if let Some(ttl) = spec.expire_after_access() {
		builder = builder.time_to_idle(ttl);
	}
	if let Some(ttl) = spec.expire_after_write() {
		builder = builder.time_to_live(ttl);
	}
	builder
		.eviction_listener(move |key: Arc<CacheKey>, entry: Arc<CachedFile>, cause| {
			let released = entry.release();
			if cause.was_evicted() {
				counters.evictions.fetch_add(1, Ordering::Relaxed);
			}
			tracing::debug!(
				path = key.path(),
				variant = ?key.variant(),
				released,
				cause = ?cause,
				"removed file from cache"
			);
			if cause == RemovalCause::Replaced {
				tracing::trace!(path = key.path(), "concurrent aggregation replaced a cached file");
			}
		})
		.build()
}
