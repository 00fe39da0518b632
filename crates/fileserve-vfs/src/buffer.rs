//! Pooled buffers for aggregated file content
//!
//! A [`BufferPool`] hands out leases. While a file is being read the lease is
//! held by a [`BufferWriter`]; once the read completes the writer is frozen
//! into a [`PooledBuffer`] which can then be moved into a cache entry or
//! served directly. Whoever holds the buffer last releases it, either by
//! calling [`PooledBuffer::release`] or by dropping it, so a cancelled read or
//! a panic never leaks a lease.

use bytes::{Bytes, BytesMut};
use std::fmt;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Lease counters of a [`BufferPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BufferStats {
	/// Number of leases handed out so far
	pub acquired: u64,
	/// Number of leases returned so far
	pub released: u64,
	/// Leases currently held
	pub outstanding: u64,
	/// Bytes currently held by outstanding leases
	pub outstanding_bytes: u64,
}

#[derive(Debug, Default)]
struct PoolInner {
	acquired: AtomicU64,
	released: AtomicU64,
	outstanding_bytes: AtomicU64,
}

/// A shared, thread-safe source of buffer leases.
///
/// Cloning a pool yields a handle to the same counters.
///
/// # Example
///
/// ```rust
/// use fileserve_vfs::BufferPool;
///
/// let pool = BufferPool::new();
/// let mut writer = pool.acquire(16);
/// writer.extend_from_slice(b"abc");
/// let buffer = writer.freeze();
/// assert_eq!(pool.stats().outstanding, 1);
///
/// buffer.release();
/// assert_eq!(pool.stats().outstanding, 0);
/// assert_eq!(pool.stats().released, 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct BufferPool {
	inner: Arc<PoolInner>,
}

impl BufferPool {
	/// Creates a new pool with zeroed counters.
	pub fn new() -> Self {
		Self::default()
	}

	/// Leases a writable buffer with at least `capacity` bytes reserved.
	pub fn acquire(&self, capacity: usize) -> BufferWriter {
		self.inner.acquired.fetch_add(1, Ordering::Relaxed);
		BufferWriter {
			buf: BytesMut::with_capacity(capacity),
			lease: Lease {
				pool: Arc::clone(&self.inner),
				accounted: 0,
			},
		}
	}

	/// Wraps already materialized content in a lease from this pool.
	pub fn wrap(&self, content: impl Into<Bytes>) -> PooledBuffer {
		let bytes = content.into();
		let mut writer = self.acquire(0);
		writer.lease.account(bytes.len());
		PooledBuffer {
			bytes,
			lease: writer.lease,
		}
	}

	/// Returns a snapshot of the lease counters.
	pub fn stats(&self) -> BufferStats {
		let acquired = self.inner.acquired.load(Ordering::Acquire);
		let released = self.inner.released.load(Ordering::Acquire);
		BufferStats {
			acquired,
			released,
			outstanding: acquired.saturating_sub(released),
			outstanding_bytes: self.inner.outstanding_bytes.load(Ordering::Acquire),
		}
	}
}

/// The lease shared by a writer and the buffer it freezes into.
///
/// Returning the lease happens in `Drop`, which runs exactly once.
struct Lease {
	pool: Arc<PoolInner>,
	accounted: u64,
}

impl Lease {
	fn account(&mut self, len: usize) {
		let len = len as u64;
		if len > self.accounted {
			self.pool
				.outstanding_bytes
				.fetch_add(len - self.accounted, Ordering::Relaxed);
		} else {
			self.pool
				.outstanding_bytes
				.fetch_sub(self.accounted - len, Ordering::Relaxed);
		}
		self.accounted = len;
	}
}

impl Drop for Lease {
	fn drop(&mut self) {
		self.pool
			.outstanding_bytes
			.fetch_sub(self.accounted, Ordering::Relaxed);
		self.pool.released.fetch_add(1, Ordering::Release);
		tracing::trace!(bytes = self.accounted, "released pooled buffer");
	}
}

/// A buffer being filled by an in-flight read.
pub struct BufferWriter {
	buf: BytesMut,
	lease: Lease,
}

impl BufferWriter {
	/// Appends `data` to the buffer.
	pub fn extend_from_slice(&mut self, data: &[u8]) {
		self.buf.extend_from_slice(data);
		self.lease.account(self.buf.capacity());
	}

	/// Gives mutable access to the underlying buffer, e.g. for
	/// `AsyncReadExt::read_buf`.
	///
	/// Call [`BufferWriter::sync`] after writing through this reference so
	/// the pool's byte counter follows the buffer's capacity.
	pub fn buf_mut(&mut self) -> &mut BytesMut {
		&mut self.buf
	}

	/// Brings the pool's byte counter up to date with the buffer capacity.
	pub fn sync(&mut self) {
		self.lease.account(self.buf.capacity());
	}

	/// Number of bytes written so far.
	pub fn len(&self) -> usize {
		self.buf.len()
	}

	/// Returns `true` if nothing has been written.
	pub fn is_empty(&self) -> bool {
		self.buf.is_empty()
	}

	/// Completes the write, transferring the lease to the returned buffer.
	pub fn freeze(mut self) -> PooledBuffer {
		let bytes = self.buf.split().freeze();
		self.lease.account(bytes.len());
		PooledBuffer {
			bytes,
			lease: self.lease,
		}
	}
}

impl io::Write for BufferWriter {
	fn write(&mut self, data: &[u8]) -> io::Result<usize> {
		self.extend_from_slice(data);
		Ok(data.len())
	}

	fn flush(&mut self) -> io::Result<()> {
		Ok(())
	}
}

impl fmt::Debug for BufferWriter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("BufferWriter")
			.field("len", &self.buf.len())
			.finish()
	}
}

/// Immutable content holding a pool lease.
pub struct PooledBuffer {
	bytes: Bytes,
	lease: Lease,
}

impl PooledBuffer {
	/// The content.
	pub fn bytes(&self) -> &Bytes {
		&self.bytes
	}

	/// Returns a reference-counted view of the content that stays valid after
	/// this buffer is released.
	pub fn retained(&self) -> Bytes {
		self.bytes.clone()
	}

	/// Content length in bytes.
	pub fn len(&self) -> usize {
		self.bytes.len()
	}

	/// Returns `true` if the content is empty.
	pub fn is_empty(&self) -> bool {
		self.bytes.is_empty()
	}

	/// Returns the lease to the pool and hands back the content.
	pub fn into_bytes(self) -> Bytes {
		let Self { bytes, lease } = self;
		drop(lease);
		bytes
	}

	/// Returns the lease to the pool.
	pub fn release(self) {
		drop(self);
	}
}

impl fmt::Debug for PooledBuffer {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("PooledBuffer")
			.field("len", &self.bytes.len())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_dropped_writer_releases_lease() {
		let pool = BufferPool::new();
		{
			let mut writer = pool.acquire(8);
			writer.extend_from_slice(b"partial");
			assert_eq!(pool.stats().outstanding, 1);
		}
		let stats = pool.stats();
		assert_eq!(stats.acquired, 1);
		assert_eq!(stats.released, 1);
		assert_eq!(stats.outstanding_bytes, 0);
	}

	#[rstest]
	fn test_freeze_transfers_lease() {
		let pool = BufferPool::new();
		let mut writer = pool.acquire(0);
		writer.extend_from_slice(b"hello");
		let buffer = writer.freeze();

		assert_eq!(pool.stats().outstanding, 1);
		assert_eq!(pool.stats().outstanding_bytes, 5);
		assert_eq!(buffer.bytes().as_ref(), b"hello");

		let retained = buffer.retained();
		buffer.release();
		assert_eq!(pool.stats().outstanding, 0);
		assert_eq!(pool.stats().outstanding_bytes, 0);
		assert_eq!(retained.as_ref(), b"hello");
	}

	#[rstest]
	fn test_wrap_accounts_content() {
		let pool = BufferPool::new();
		let buffer = pool.wrap(Bytes::from_static(b"listing"));
		assert_eq!(pool.stats().outstanding_bytes, 7);
		let bytes = buffer.into_bytes();
		assert_eq!(bytes.as_ref(), b"listing");
		assert_eq!(pool.stats().outstanding, 0);
	}

	#[rstest]
	fn test_clones_share_counters() {
		let pool = BufferPool::new();
		let other = pool.clone();
		let buffer = other.wrap("x");
		assert_eq!(pool.stats().outstanding, 1);
		drop(buffer);
		assert_eq!(pool.stats().released, 1);
	}
}
