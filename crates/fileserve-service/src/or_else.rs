use crate::FileService;
use async_trait::async_trait;
use fileserve_http::{Handler, Registration, Request, Response, Result};

/// Serves files from a [`FileService`], handing requests that do not resolve
/// to a file over to another handler.
///
/// Built by [`FileService::or_else`]. Redirects count as unresolved, so a
/// request for `/docs` falls through to the fallback even if `/docs/`
/// exists.
///
/// # Examples
///
/// ```
/// use fileserve_http::{Handler, Request};
/// use fileserve_service::FileService;
/// use fileserve_vfs::MemoryVfs;
/// use http::Uri;
///
/// # tokio_test::block_on(async {
/// let primary = MemoryVfs::new();
/// primary.insert("/a.txt", "primary");
/// let fallback = MemoryVfs::new();
/// fallback.insert("/b.txt", "fallback");
///
/// let service = FileService::of(primary).or_else(FileService::of(fallback));
///
/// let response = service.handle(Request::get(Uri::from_static("/b.txt"))).await.unwrap();
/// assert_eq!(response.body.collect().await.unwrap().as_ref(), b"fallback");
/// # });
/// ```
#[derive(Debug)]
pub struct OrElse<S> {
	first: FileService,
	second: S,
}

impl<S: Handler> OrElse<S> {
	pub(crate) fn new(first: FileService, second: S) -> Self {
		Self { first, second }
	}

	/// The primary file service.
	pub fn first(&self) -> &FileService {
		&self.first
	}

	/// The fallback handler.
	pub fn second(&self) -> &S {
		&self.second
	}
}

#[async_trait]
impl<S: Handler> Handler for OrElse<S> {
	async fn handle(&self, request: Request) -> Result<Response> {
		let file = self.first.find_file(&request).await?;
		if file.attributes().is_some() {
			return self.first.serve_file(file, &request).await;
		}
		self.second.handle(request).await
	}

	fn on_registered(&self, registration: &Registration) -> Result<()> {
		self.first.on_registered(registration)?;
		self.second.on_registered(registration)
	}

	fn should_cache_path(&self, path: &str, query: Option<&str>) -> bool {
		self.first.should_cache_path(path, query) && self.second.should_cache_path(path, query)
	}
}
