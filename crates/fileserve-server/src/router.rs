//! Prefix router

use crate::{Result, ServerError};
use async_trait::async_trait;
use fileserve_http::{Handler, Registration, Request, Response};
use percent_encoding::percent_decode_str;
use std::sync::Arc;

struct Route {
	prefix: String,
	handler: Arc<dyn Handler>,
}

/// Dispatches requests to handlers mounted under path prefixes.
///
/// The longest matching prefix wins. The handler sees the remainder of the
/// path, decoded and starting with `/`, as the request's mapped path.
///
/// # Examples
///
/// ```
/// use fileserve_http::{Handler, Request};
/// use fileserve_server::Router;
/// use fileserve_service::FileService;
/// use fileserve_vfs::MemoryVfs;
/// use http::{StatusCode, Uri};
/// use std::sync::Arc;
///
/// # tokio_test::block_on(async {
/// let vfs = MemoryVfs::new();
/// vfs.insert("/app.css", "body {}");
///
/// let router = Router::new()
///     .mount("/static/", Arc::new(FileService::of(vfs)))
///     .unwrap();
///
/// let response = router.handle(Request::get(Uri::from_static("/static/app.css"))).await.unwrap();
/// assert_eq!(response.status, StatusCode::OK);
///
/// let response = router.handle(Request::get(Uri::from_static("/app.css"))).await.unwrap();
/// assert_eq!(response.status, StatusCode::NOT_FOUND);
/// # });
/// ```
#[derive(Default)]
pub struct Router {
	routes: Vec<Route>,
}

impl Router {
	/// Creates a router without routes.
	pub fn new() -> Self {
		Self::default()
	}

	/// Mounts `handler` under `prefix` and invokes its registration hook.
	///
	/// A missing leading or trailing `/` is added to the prefix.
	///
	/// # Errors
	///
	/// Fails if the prefix is already taken or the handler rejects the
	/// registration.
	pub fn mount(mut self, prefix: &str, handler: Arc<dyn Handler>) -> Result<Self> {
		let prefix = normalize_prefix(prefix);
		if self.routes.iter().any(|route| route.prefix == prefix) {
			return Err(ServerError::InvalidRoute(prefix));
		}
		handler.on_registered(&Registration::new(prefix.clone()))?;
		self.routes.push(Route { prefix, handler });
		self.routes
			.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));
		Ok(self)
	}

	/// The mounted prefixes, longest first.
	pub fn prefixes(&self) -> impl Iterator<Item = &str> {
		self.routes.iter().map(|route| route.prefix.as_str())
	}

	fn route(&self, path: &str) -> Option<(&Route, String)> {
		self.routes.iter().find_map(|route| {
			let rest = path.strip_prefix(route.prefix.as_str())?;
			let mapped = format!("/{rest}");
			Some((route, percent_decode_str(&mapped).decode_utf8_lossy().into_owned()))
		})
	}

	/// Finds a route mounted at `path` + `/`, for requests missing the
	/// trailing slash of a mount point.
	fn mount_point(&self, path: &str) -> Option<&Route> {
		self.routes
			.iter()
			.find(|route| route.prefix.len() > 1 && route.prefix[..route.prefix.len() - 1] == *path)
	}
}

#[async_trait]
impl Handler for Router {
	async fn handle(&self, request: Request) -> fileserve_http::Result<Response> {
		let path = request.path().to_string();
		if let Some((route, mapped)) = self.route(&path) {
			tracing::trace!(prefix = %route.prefix, mapped = %mapped, "routing request");
			return route.handler.handle(request.with_mapped_path(mapped)).await;
		}
		if let Some(route) = self.mount_point(&path) {
			let location = match request.query() {
				Some(query) => format!("{}?{}", route.prefix, query),
				None => route.prefix.clone(),
			};
			return Response::temporary_redirect(&location);
		}
		Ok(Response::not_found())
	}

	fn should_cache_path(&self, path: &str, query: Option<&str>) -> bool {
		match self.route(path) {
			Some((route, mapped)) => route.handler.should_cache_path(&mapped, query),
			None => false,
		}
	}
}

fn normalize_prefix(prefix: &str) -> String {
	let trimmed = prefix.trim_matches('/');
	if trimmed.is_empty() {
		"/".to_string()
	} else {
		format!("/{trimmed}/")
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use fileserve_service::FileService;
	use fileserve_vfs::MemoryVfs;
	use http::{StatusCode, Uri};
	use rstest::rstest;

	struct Echo;

	#[async_trait]
	impl Handler for Echo {
		async fn handle(&self, request: Request) -> fileserve_http::Result<Response> {
			Ok(Response::ok().with_body(request.decoded_mapped_path()))
		}
	}

	async fn body(router: &Router, uri: &'static str) -> String {
		let response = router.handle(Request::get(Uri::from_static(uri))).await.unwrap();
		let bytes = response.body.collect().await.unwrap();
		String::from_utf8(bytes.to_vec()).unwrap()
	}

	#[rstest]
	#[case("static", "/static/")]
	#[case("/static", "/static/")]
	#[case("/a/b/", "/a/b/")]
	#[case("", "/")]
	fn test_normalize_prefix(#[case] input: &str, #[case] expected: &str) {
		assert_eq!(normalize_prefix(input), expected);
	}

	#[rstest]
	#[tokio::test]
	async fn test_longest_prefix_wins() {
		let router = Router::new()
			.mount("/", Arc::new(Echo))
			.unwrap()
			.mount("/static/", Arc::new(Echo))
			.unwrap();

		assert_eq!(body(&router, "/static/css/a%20b.css").await, "/css/a b.css");
		assert_eq!(body(&router, "/other/x").await, "/other/x");
	}

	#[rstest]
	#[tokio::test]
	async fn test_mount_point_without_slash_redirects() {
		let router = Router::new().mount("/static/", Arc::new(Echo)).unwrap();
		let response = router
			.handle(Request::get(Uri::from_static("/static?v=2")))
			.await
			.unwrap();
		assert_eq!(response.status, StatusCode::TEMPORARY_REDIRECT);
		assert_eq!(response.headers["location"], "/static/?v=2");
	}

	#[rstest]
	fn test_duplicate_prefix_is_rejected() {
		let result = Router::new()
			.mount("/static/", Arc::new(Echo))
			.unwrap()
			.mount("static", Arc::new(Echo));
		assert!(matches!(result, Err(ServerError::InvalidRoute(_))));
	}

	#[rstest]
	fn test_should_cache_path_follows_handler() {
		let cached = FileService::of(MemoryVfs::new());
		let router = Router::new()
			.mount("/static/", Arc::new(cached))
			.unwrap()
			.mount("/echo/", Arc::new(Echo))
			.unwrap();
		assert!(router.should_cache_path("/static/a.css", None));
		assert!(!router.should_cache_path("/echo/a", None));
		assert!(!router.should_cache_path("/nowhere", None));
	}
}
