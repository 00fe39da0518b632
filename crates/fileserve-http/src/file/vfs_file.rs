use super::{AggregatedHttpFile, FileOptions, Variant};
use crate::{Body, Request, Response, Result};
use fileserve_vfs::{BufferPool, FileAttributes, HttpVfs};
use std::fmt;
use std::io;
use std::sync::Arc;

/// A file served straight from its byte source.
///
/// The content is only opened when the file is served, and then streamed.
#[derive(Clone)]
pub struct VfsFile {
	vfs: Arc<dyn HttpVfs>,
	path: String,
	variant: Variant,
	attributes: FileAttributes,
	options: FileOptions,
}

impl VfsFile {
	/// Creates a file for `path` whose attributes were just obtained from
	/// `vfs`.
	pub fn new(
		vfs: Arc<dyn HttpVfs>,
		path: impl Into<String>,
		variant: Variant,
		attributes: FileAttributes,
		options: FileOptions,
	) -> Self {
		Self {
			vfs,
			path: path.into(),
			variant,
			attributes,
			options,
		}
	}

	/// Path of the file within its byte source.
	pub fn path(&self) -> &str {
		&self.path
	}

	/// The representation being served.
	pub fn variant(&self) -> Variant {
		self.variant
	}

	/// Attributes observed when the file was resolved.
	pub fn attributes(&self) -> &FileAttributes {
		&self.attributes
	}

	pub(crate) fn vfs(&self) -> &Arc<dyn HttpVfs> {
		&self.vfs
	}

	pub(crate) fn options(&self) -> &FileOptions {
		&self.options
	}

	/// Reads the whole file into a buffer leased from `pool`.
	///
	/// The resulting file keeps the attributes observed at resolution time so
	/// a cache can compare them with a later stat.
	pub async fn aggregate(&self, pool: &BufferPool) -> Result<AggregatedHttpFile> {
		let content = self.vfs.read(&self.path, pool).await?;
		Ok(AggregatedHttpFile::new(
			self.path.clone(),
			self.variant,
			self.attributes,
			content,
			self.options.clone(),
		))
	}

	pub(crate) async fn serve(self, request: &Request) -> Result<Response> {
		let headers = self
			.options
			.file_headers(&self.path, self.variant, &self.attributes)?;
		let body = if request.is_head() {
			Body::Empty
		} else {
			match self.vfs.stream(&self.path).await {
				Ok(stream) => Body::Stream(stream),
				Err(e) if e.kind() == io::ErrorKind::NotFound => {
					tracing::debug!(path = %self.path, "file disappeared before it could be served");
					return Ok(Response::not_found());
				}
				Err(e) => return Err(e.into()),
			}
		};
		self.options.complete(
			request,
			headers,
			&self.attributes,
			self.attributes.length(),
			body,
		)
	}
}

impl fmt::Debug for VfsFile {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("VfsFile")
			.field("vfs", &self.vfs.meter_tag())
			.field("path", &self.path)
			.field("variant", &self.variant)
			.field("attributes", &self.attributes)
			.finish()
	}
}
