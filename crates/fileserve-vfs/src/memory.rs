//! In-memory byte source

use crate::path::normalize;
use crate::{BufferPool, FileAttributes, HttpVfs, PooledBuffer};
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::sync::Arc;
use std::time::SystemTime;

#[derive(Debug, Clone)]
struct MemoryEntry {
	content: Bytes,
	last_modified_millis: i64,
}

/// Serves files held in memory.
///
/// Directories are implied by the paths of the stored files: `/a/b.txt`
/// makes `/a/` listable. Useful for assets embedded into the binary and for
/// tests that need exact control over modification times.
///
/// # Example
///
/// ```rust
/// use fileserve_vfs::{HttpVfs, MemoryVfs};
///
/// # tokio_test::block_on(async {
/// let vfs = MemoryVfs::new();
/// vfs.insert_with_modified("/docs/a.txt", "a", 1_000);
/// vfs.insert("/docs/sub/b.txt", "b");
///
/// assert!(vfs.can_list("/docs/").await.unwrap());
/// assert_eq!(vfs.list("/docs/").await.unwrap(), vec!["a.txt", "sub/"]);
/// # });
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryVfs {
	files: Arc<RwLock<BTreeMap<String, MemoryEntry>>>,
}

impl MemoryVfs {
	/// Creates an empty byte source.
	pub fn new() -> Self {
		Self::default()
	}

	/// Stores `content` at `path`, stamped with the current time.
	pub fn insert(&self, path: &str, content: impl Into<Bytes>) {
		let now = FileAttributes::from_system_time(0, SystemTime::now()).last_modified_millis();
		self.insert_with_modified(path, content, now);
	}

	/// Stores `content` at `path` with an explicit modification time in
	/// milliseconds since the Unix epoch.
	pub fn insert_with_modified(&self, path: &str, content: impl Into<Bytes>, millis: i64) {
		let Some(key) = normalize(path) else {
			return;
		};
		self.files.write().insert(
			key,
			MemoryEntry {
				content: content.into(),
				last_modified_millis: millis,
			},
		);
	}

	/// Removes the file at `path`, returning whether it existed.
	pub fn remove(&self, path: &str) -> bool {
		match normalize(path) {
			Some(key) => self.files.write().remove(&key).is_some(),
			None => false,
		}
	}

	fn get(&self, path: &str) -> Option<MemoryEntry> {
		let key = normalize(path)?;
		self.files.read().get(&key).cloned()
	}

	fn dir_prefix(path: &str) -> Option<String> {
		let key = normalize(path)?;
		if key.is_empty() {
			Some(String::new())
		} else {
			Some(format!("{}/", key))
		}
	}
}

#[async_trait]
impl HttpVfs for MemoryVfs {
	async fn attributes(&self, path: &str) -> io::Result<Option<FileAttributes>> {
		if path.ends_with('/') {
			return Ok(None);
		}
		Ok(self.get(path).map(|entry| {
			FileAttributes::new(entry.content.len() as u64, entry.last_modified_millis)
		}))
	}

	async fn read(&self, path: &str, pool: &BufferPool) -> io::Result<PooledBuffer> {
		let entry = self.get(path).ok_or_else(|| {
			io::Error::new(io::ErrorKind::NotFound, format!("File not found: {}", path))
		})?;
		let mut writer = pool.acquire(entry.content.len());
		writer.extend_from_slice(&entry.content);
		Ok(writer.freeze())
	}

	async fn can_list(&self, path: &str) -> io::Result<bool> {
		let Some(prefix) = Self::dir_prefix(path) else {
			return Ok(false);
		};
		if prefix.is_empty() {
			return Ok(true);
		}
		let files = self.files.read();
		Ok(files
			.range(prefix.clone()..)
			.next()
			.is_some_and(|(key, _)| key.starts_with(&prefix)))
	}

	async fn list(&self, path: &str) -> io::Result<Vec<String>> {
		let prefix = Self::dir_prefix(path).ok_or_else(|| {
			io::Error::new(io::ErrorKind::NotFound, format!("Not a directory: {}", path))
		})?;
		let files = self.files.read();
		let mut children = BTreeSet::new();
		for key in files.range(prefix.clone()..).map(|(k, _)| k) {
			let Some(rest) = key.strip_prefix(&prefix) else {
				break;
			};
			match rest.split_once('/') {
				Some((dir, _)) => children.insert(format!("{}/", dir)),
				None => children.insert(rest.to_string()),
			};
		}
		Ok(children.into_iter().collect())
	}

	fn meter_tag(&self) -> String {
		"memory".to_string()
	}
}
