//! # fileserve-http
//!
//! HTTP types and servable file resources for fileserve.
//!
//! ## Overview
//!
//! - [`Request`] / [`Response`] / [`Body`] - the transport-neutral request and
//!   response representation
//! - [`Handler`] - the async request handler abstraction
//! - [`HttpFile`] - the outcome of resolving a path, able to serve itself
//!   with `Date`, `Last-Modified`, `ETag`, `Content-Type` and conditional GET
//!   handling
//! - [`Clock`] and [`MediaTypeResolver`] - pluggable sources of the `Date` and
//!   `Content-Type` headers
//!
//! ## Example
//!
//! ```rust
//! use fileserve_http::{AggregatedHttpFile, FileOptions, HttpFile, Request, Variant};
//! use fileserve_vfs::{BufferPool, FileAttributes};
//! use http::{StatusCode, Uri};
//!
//! # tokio_test::block_on(async {
//! let pool = BufferPool::new();
//! let file = HttpFile::Aggregated(AggregatedHttpFile::new(
//!     "/hello.txt",
//!     Variant::Identity,
//!     FileAttributes::new(5, 0),
//!     pool.wrap("hello"),
//!     FileOptions::new(),
//! ));
//!
//! let response = file.serve(&Request::get(Uri::from_static("/hello.txt"))).await.unwrap();
//! assert_eq!(response.status, StatusCode::OK);
//! assert_eq!(response.headers["content-type"], "text/plain; charset=utf-8");
//! assert_eq!(pool.stats().outstanding, 0);
//! # });
//! ```

pub mod clock;
pub mod error;
pub mod file;
pub mod handler;
pub mod media_type;
pub mod request;
pub mod response;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{Error, Result};
pub use file::{
	AggregatedHttpFile, DecompressingFile, FileOptions, HttpFile, Variant, VfsFile, decode,
	entity_tag,
};
pub use handler::{Handler, Registration};
pub use media_type::{GuessMediaType, MediaTypeResolver};
pub use request::Request;
pub use response::{Body, Response};
