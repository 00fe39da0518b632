//! # fileserve
//!
//! Static file serving for HTTP services.
//!
//! A [`FileService`] resolves request paths against a virtual file system
//! ([`HttpVfs`]). It serves pre-compressed `.br`/`.gz` variants to clients
//! that accept them, falls back to `index.html` and generated directory
//! listings, and keeps small files in a bounded aggregation cache that is
//! revalidated against fresh file attributes on every request.
//!
//! ## Crates
//!
//! - [`vfs`]: file systems, file attributes and pooled buffers
//! - [`http`]: requests, responses, the [`Handler`] trait and file responses
//! - [`service`]: the file service, its cache and encoding negotiation
//! - `server` (feature `server`, on by default): hyper transport, router,
//!   settings and the `fileserve` binary
//!
//! ## Quick Example
//!
//! ```
//! use fileserve::prelude::*;
//! use ::http::{StatusCode, Uri};
//!
//! # tokio_test::block_on(async {
//! let vfs = MemoryVfs::new();
//! vfs.insert("/docs/index.html", "<h1>docs</h1>");
//!
//! let files = FileService::builder(vfs).auto_index(true).build();
//!
//! let response = files.handle(Request::get(Uri::from_static("/docs/"))).await.unwrap();
//! assert_eq!(response.status, StatusCode::OK);
//!
//! let response = files.handle(Request::get(Uri::from_static("/docs"))).await.unwrap();
//! assert_eq!(response.status, StatusCode::TEMPORARY_REDIRECT);
//! # });
//! ```

pub use fileserve_http as http;
pub use fileserve_service as service;
pub use fileserve_vfs as vfs;

#[cfg(feature = "server")]
pub use fileserve_server as server;

pub use fileserve_http::{Body, Error, Handler, HttpFile, Request, Response, Result};
pub use fileserve_service::{CacheSpec, ConfigError, FileService, FileServiceBuilder, OrElse};
pub use fileserve_vfs::{BufferPool, FileAttributes, FileSystemVfs, HttpVfs, MemoryVfs};

#[cfg(feature = "server")]
pub use fileserve_server::{HttpServer, Router, ServerError, Settings};

/// Commonly used types.
pub mod prelude {
	pub use crate::{
		Body, CacheSpec, FileService, FileSystemVfs, Handler, HttpFile, HttpVfs, MemoryVfs,
		Request, Response,
	};

	#[cfg(feature = "server")]
	pub use crate::{HttpServer, Router, Settings};

	pub use async_trait::async_trait;
}
