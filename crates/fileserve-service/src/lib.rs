//! # fileserve-service
//!
//! The static file service: resolves request paths against a byte source,
//! negotiates pre-compressed variants, generates directory listings and keeps
//! small files in an in-memory aggregation cache.
//!
//! ## Features
//!
//! - **Pre-compressed variants**: `app.js.br` and `app.js.gz` are served for
//!   `/app.js` to clients accepting `br` or `gzip` (brotli preferred)
//! - **Decompression**: pre-compressed files without an uncompressed sibling
//!   can be decoded for clients accepting neither encoding
//! - **Index documents and listings**: `/dir/` serves `/dir/index.html` or a
//!   generated listing, `/dir` redirects to `/dir/`
//! - **Aggregation cache**: content of small files is kept in pooled buffers
//!   and revalidated against the byte source on every request
//!
//! ## Quick Start
//!
//! ```rust
//! use fileserve_http::{Handler, Request};
//! use fileserve_service::FileService;
//! use fileserve_vfs::MemoryVfs;
//! use http::header::{ACCEPT_ENCODING, CONTENT_ENCODING};
//! use http::{HeaderValue, Uri};
//!
//! # tokio_test::block_on(async {
//! let vfs = MemoryVfs::new();
//! vfs.insert("/app.js", "plain");
//! vfs.insert("/app.js.br", "brotli");
//!
//! let service = FileService::builder(vfs).serve_compressed(true).build();
//!
//! let request = Request::get(Uri::from_static("/app.js"))
//!     .with_header(ACCEPT_ENCODING, HeaderValue::from_static("gzip, br"));
//! let response = service.handle(request).await.unwrap();
//! assert_eq!(response.headers[CONTENT_ENCODING], "br");
//! # });
//! ```
//!
//! ## Module Structure
//!
//! - [`encoding`] - `Accept-Encoding` negotiation
//! - [`cache`] - the aggregation cache
//! - [`cache_spec`] - textual cache configuration
//! - [`autoindex`] - directory listing pages
//! - [`service`] - the resolution pipeline

#![warn(rustdoc::broken_intra_doc_links)]

pub mod autoindex;
pub mod builder;
pub mod cache;
pub mod cache_spec;
pub mod config;
pub mod encoding;
pub mod error;
pub mod or_else;
pub mod service;

pub use builder::FileServiceBuilder;
pub use cache::{AggregationCache, CacheKey, CacheStatistics};
pub use cache_spec::CacheSpec;
pub use config::FileServiceConfig;
pub use encoding::{AcceptedEncodings, ENCODING_CANDIDATES, EncodingCandidate};
pub use error::ConfigError;
pub use or_else::OrElse;
pub use service::FileService;
