//! Byte source backed by a directory of the O/S file system

use crate::path::segments;
use crate::{BufferPool, ByteStream, FileAttributes, HttpVfs, PooledBuffer};
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;
use tokio_util::io::ReaderStream;

/// Serves the files below a root directory.
///
/// All I/O goes through `tokio::fs`, which runs the blocking system calls on
/// the runtime's shared blocking thread pool.
///
/// # Example
///
/// ```rust,no_run
/// use fileserve_vfs::{FileSystemVfs, HttpVfs};
///
/// # async fn example() -> std::io::Result<()> {
/// let vfs = FileSystemVfs::new("public");
/// if let Some(attrs) = vfs.attributes("/index.html").await? {
///     println!("{} bytes", attrs.length());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct FileSystemVfs {
	root: PathBuf,
}

impl FileSystemVfs {
	/// Creates a byte source rooted at `root`.
	pub fn new<P: Into<PathBuf>>(root: P) -> Self {
		Self { root: root.into() }
	}

	/// The root directory.
	pub fn root(&self) -> &Path {
		&self.root
	}

	fn resolve(&self, path: &str) -> Option<PathBuf> {
		match segments(path) {
			Some(parts) => {
				let mut resolved = self.root.clone();
				resolved.extend(parts);
				Some(resolved)
			}
			None => {
				tracing::warn!(
					"Path traversal attempt blocked in FileSystemVfs: {}",
					path
				);
				None
			}
		}
	}

	fn not_found(path: &str) -> io::Error {
		io::Error::new(io::ErrorKind::NotFound, format!("File not found: {}", path))
	}
}

#[async_trait]
impl HttpVfs for FileSystemVfs {
	async fn attributes(&self, path: &str) -> io::Result<Option<FileAttributes>> {
		let Some(file_path) = self.resolve(path) else {
			return Ok(None);
		};
		let metadata = match tokio::fs::metadata(&file_path).await {
			Ok(metadata) => metadata,
			Err(e) if is_missing(&e) => return Ok(None),
			Err(e) => return Err(e),
		};
		if !metadata.is_file() {
			return Ok(None);
		}
		Ok(Some(FileAttributes::from_system_time(
			metadata.len(),
			metadata.modified()?,
		)))
	}

	async fn read(&self, path: &str, pool: &BufferPool) -> io::Result<PooledBuffer> {
		let file_path = self.resolve(path).ok_or_else(|| Self::not_found(path))?;
		let mut file = tokio::fs::File::open(&file_path).await?;
		let hint = file.metadata().await.map(|m| m.len() as usize).unwrap_or(0);

		// The writer returns its lease if this future is dropped mid-read.
		let mut writer = pool.acquire(hint);
		loop {
			if writer.buf_mut().capacity() == writer.len() {
				writer.buf_mut().reserve(8 * 1024);
			}
			let n = file.read_buf(writer.buf_mut()).await?;
			writer.sync();
			if n == 0 {
				break;
			}
		}
		Ok(writer.freeze())
	}

	async fn stream(&self, path: &str) -> io::Result<ByteStream> {
		let file_path = self.resolve(path).ok_or_else(|| Self::not_found(path))?;
		let file = tokio::fs::File::open(&file_path).await?;
		Ok(Box::pin(ReaderStream::new(file)))
	}

	async fn can_list(&self, path: &str) -> io::Result<bool> {
		let Some(dir_path) = self.resolve(path) else {
			return Ok(false);
		};
		match tokio::fs::metadata(&dir_path).await {
			Ok(metadata) => Ok(metadata.is_dir()),
			Err(e) if is_missing(&e) => Ok(false),
			Err(e) => Err(e),
		}
	}

	async fn list(&self, path: &str) -> io::Result<Vec<String>> {
		let dir_path = self.resolve(path).ok_or_else(|| Self::not_found(path))?;
		let mut entries = tokio::fs::read_dir(&dir_path).await?;
		let mut names = Vec::new();
		while let Some(entry) = entries.next_entry().await? {
			let mut name = entry.file_name().to_string_lossy().into_owned();
			if entry.file_type().await?.is_dir() {
				name.push('/');
			}
			names.push(name);
		}
		names.sort();
		Ok(names)
	}

	fn meter_tag(&self) -> String {
		format!("file:{}", self.root.display())
	}
}

/// `NotADirectory` shows up when a path component is a regular file, e.g.
/// `/foo.txt/index.html`; treat it like a missing file.
fn is_missing(e: &io::Error) -> bool {
	matches!(
		e.kind(),
		io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
	)
}
