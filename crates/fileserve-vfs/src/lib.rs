//! # fileserve-vfs
//!
//! Byte sources for the fileserve static file service.
//!
//! A byte source ([`HttpVfs`]) knows how to stat, read and list paths of some
//! storage. The file service never touches the storage directly; it goes
//! through this trait so that the same resolution logic works for a directory
//! on disk and for an in-memory bundle of embedded assets.
//!
//! ## Implementations
//!
//! - [`FileSystemVfs`] - serves a directory of the O/S file system
//! - [`MemoryVfs`] - serves files held in memory (embedded assets, tests)
//!
//! ## Pooled buffers
//!
//! Full reads are written into buffers leased from a [`BufferPool`]. A lease is
//! released exactly once, when its [`BufferWriter`] or [`PooledBuffer`] is
//! dropped or explicitly released, and the pool keeps counters of acquired and
//! released leases so callers can verify nothing leaked.
//!
//! ```rust
//! use fileserve_vfs::{BufferPool, HttpVfs, MemoryVfs};
//!
//! # tokio_test::block_on(async {
//! let vfs = MemoryVfs::new();
//! vfs.insert("/hello.txt", "hello");
//!
//! let pool = BufferPool::new();
//! let attrs = vfs.attributes("/hello.txt").await.unwrap().unwrap();
//! assert_eq!(attrs.length(), 5);
//!
//! let buffer = vfs.read("/hello.txt", &pool).await.unwrap();
//! assert_eq!(buffer.bytes().as_ref(), b"hello");
//! drop(buffer);
//! assert_eq!(pool.stats().outstanding, 0);
//! # });
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]

pub mod attributes;
pub mod buffer;
pub mod fs;
pub mod memory;
pub mod path;

pub use attributes::FileAttributes;
pub use buffer::{BufferPool, BufferStats, BufferWriter, PooledBuffer};
pub use fs::FileSystemVfs;
pub use memory::MemoryVfs;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, Stream};
use std::io;
use std::pin::Pin;

/// A stream of file content chunks.
pub type ByteStream = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send>>;

/// A virtual file system that provides the content served by a file service.
///
/// Paths are absolute, `/`-separated and already percent-decoded, e.g.
/// `/css/app.css`. A path ending with `/` denotes a directory.
#[async_trait]
pub trait HttpVfs: Send + Sync {
	/// Returns the attributes of the regular file at `path`, or `None` if no
	/// such file exists.
	async fn attributes(&self, path: &str) -> io::Result<Option<FileAttributes>>;

	/// Reads the whole file at `path` into a buffer leased from `pool`.
	///
	/// # Errors
	///
	/// Returns [`io::ErrorKind::NotFound`] if the file does not exist, or any
	/// error raised by the underlying storage.
	async fn read(&self, path: &str, pool: &BufferPool) -> io::Result<PooledBuffer>;

	/// Opens the file at `path` as a stream of chunks.
	///
	/// The default implementation reads the whole file and yields it as a
	/// single chunk.
	async fn stream(&self, path: &str) -> io::Result<ByteStream> {
		let pool = BufferPool::new();
		let content = self.read(path, &pool).await?.into_bytes();
		Ok(Box::pin(stream::once(async move { Ok(content) })))
	}

	/// Returns whether `path` is a directory that can be listed.
	async fn can_list(&self, path: &str) -> io::Result<bool>;

	/// Lists the immediate children of the directory at `path`.
	///
	/// Names are sorted; sub-directory names carry a trailing `/`.
	async fn list(&self, path: &str) -> io::Result<Vec<String>>;

	/// Returns a short label identifying this byte source in log output.
	fn meter_tag(&self) -> String;
}
