//! Decoding of pre-compressed files for clients that accept no encoding

use super::{AggregatedHttpFile, Variant, VfsFile};
use crate::{Error, Request, Response, Result};
use fileserve_vfs::{BufferPool, FileAttributes, PooledBuffer};
use std::io;

/// Decodes `input`, compressed with `encoding`, into a buffer leased from
/// `pool`.
///
/// Supported encodings are `gzip` and `br`.
///
/// # Errors
///
/// Returns [`Error::Decompress`] if the content is corrupt or the encoding is
/// not supported.
///
/// # Examples
///
/// ```
/// use fileserve_http::decode;
/// use fileserve_vfs::BufferPool;
/// use flate2::{Compression, write::GzEncoder};
/// use std::io::Write;
///
/// let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
/// encoder.write_all(b"hello gzip").unwrap();
/// let compressed = encoder.finish().unwrap();
///
/// let pool = BufferPool::new();
/// let decoded = decode("gzip", &compressed, &pool).unwrap();
/// assert_eq!(decoded.bytes().as_ref(), b"hello gzip");
/// ```
pub fn decode(encoding: &'static str, input: &[u8], pool: &BufferPool) -> Result<PooledBuffer> {
	let mut writer = pool.acquire(input.len().saturating_mul(2));
	decode_into(encoding, input, &mut writer).map_err(|source| Error::Decompress { encoding, source })?;
	Ok(writer.freeze())
}

#[cfg(feature = "compression")]
fn decode_into(encoding: &str, input: &[u8], output: &mut impl io::Write) -> io::Result<()> {
	match encoding {
		"gzip" => {
			let mut decoder = flate2::read::GzDecoder::new(input);
			io::copy(&mut decoder, output)?;
		}
		"br" => {
			let mut decoder = brotli::Decompressor::new(input, 4096);
			io::copy(&mut decoder, output)?;
		}
		other => {
			return Err(io::Error::new(
				io::ErrorKind::InvalidInput,
				format!("unsupported content encoding: {other}"),
			));
		}
	}
	Ok(())
}

#[cfg(not(feature = "compression"))]
fn decode_into(encoding: &str, _input: &[u8], _output: &mut impl io::Write) -> io::Result<()> {
	Err(io::Error::new(
		io::ErrorKind::Unsupported,
		format!("decoding {encoding} requires the `compression` feature"),
	))
}

/// A pre-compressed file that is decoded when served.
#[derive(Debug, Clone)]
pub struct DecompressingFile {
	file: VfsFile,
	encoding: &'static str,
	pool: BufferPool,
}

impl DecompressingFile {
	/// Wraps the compressed `file`, encoded with `encoding`.
	///
	/// Buffers for the compressed and decoded content are leased from `pool`.
	pub fn new(file: VfsFile, encoding: &'static str, pool: BufferPool) -> Self {
		Self {
			file,
			encoding,
			pool,
		}
	}

	/// Path of the compressed source file.
	pub fn path(&self) -> &str {
		self.file.path()
	}

	/// Attributes of the compressed source file.
	pub fn attributes(&self) -> &FileAttributes {
		self.file.attributes()
	}

	/// The encoding being removed.
	pub fn encoding(&self) -> &'static str {
		self.encoding
	}

	/// Reads and decodes the whole file.
	pub async fn aggregate(&self, pool: &BufferPool) -> Result<AggregatedHttpFile> {
		let compressed = self.file.vfs().read(self.file.path(), pool).await?;
		let decoded = decode(self.encoding, compressed.bytes(), pool)?;
		compressed.release();
		Ok(AggregatedHttpFile::new(
			self.file.path(),
			Variant::Decoded(self.encoding),
			*self.file.attributes(),
			decoded,
			self.file.options().clone(),
		))
	}

	pub(crate) async fn serve(self, request: &Request) -> Result<Response> {
		match self.aggregate(&self.pool).await {
			Ok(file) => file.serve(request),
			Err(Error::Io(e)) if e.kind() == io::ErrorKind::NotFound => Ok(Response::not_found()),
			Err(e) => Err(e),
		}
	}
}
