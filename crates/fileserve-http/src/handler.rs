//! Handler trait for HTTP request processing.
//!
//! A [`Handler`] turns a [`Request`] into a [`Response`]. Besides request
//! handling it exposes two hooks the transport layer uses:
//!
//! - [`Handler::on_registered`] is invoked once when the handler is mounted,
//! - [`Handler::should_cache_path`] advises whether responses for a path are
//!   worth caching upstream.
//!
//! ```rust
//! use fileserve_http::{Handler, Request, Response, Result};
//! use async_trait::async_trait;
//!
//! struct Hello;
//!
//! #[async_trait]
//! impl Handler for Hello {
//!     async fn handle(&self, _request: Request) -> Result<Response> {
//!         Ok(Response::ok().with_body("Hello!"))
//!     }
//! }
//! ```

use crate::{Request, Response, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Where and how a handler was mounted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
	route: String,
}

impl Registration {
	/// Creates a registration for the given route prefix, e.g. `/static/`.
	pub fn new(route: impl Into<String>) -> Self {
		Self {
			route: route.into(),
		}
	}

	/// The route prefix the handler is mounted under.
	pub fn route(&self) -> &str {
		&self.route
	}
}

/// Handler trait for processing requests.
///
/// This is the core abstraction - the file service, its compositions and
/// any fallback handler implement this trait.
#[async_trait]
pub trait Handler: Send + Sync {
	/// Handles an HTTP request and produces a response.
	///
	/// # Errors
	///
	/// Returns an error if the request cannot be processed, e.g. because the
	/// byte source failed. Missing files are answered with `404`, not an error.
	async fn handle(&self, request: Request) -> Result<Response>;

	/// Called once when the handler is mounted.
	fn on_registered(&self, _registration: &Registration) -> Result<()> {
		Ok(())
	}

	/// Returns whether responses for `path` may be cached upstream.
	fn should_cache_path(&self, _path: &str, _query: Option<&str>) -> bool {
		false
	}
}

/// Blanket implementation for `Arc<T>` where T: Handler.
///
/// This allows `Arc<dyn Handler>` to be used as a Handler,
/// enabling shared ownership of handlers across threads.
#[async_trait]
impl<T: Handler + ?Sized> Handler for Arc<T> {
	async fn handle(&self, request: Request) -> Result<Response> {
		(**self).handle(request).await
	}

	fn on_registered(&self, registration: &Registration) -> Result<()> {
		(**self).on_registered(registration)
	}

	fn should_cache_path(&self, path: &str, query: Option<&str>) -> bool {
		(**self).should_cache_path(path, query)
	}
}
