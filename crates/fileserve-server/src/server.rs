use crate::Result;
use bytes::Bytes;
use fileserve_http::{Body, Handler, Request, Response};
use futures::TryStreamExt;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Empty, Full, StreamBody};
use hyper::body::{Frame, Incoming};
use hyper::server::conn::http1;
use hyper::service::Service;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};

/// Body type of the responses sent by [`HttpServer`].
pub type ResponseBody = UnsyncBoxBody<Bytes, io::Error>;

/// HTTP/1 server dispatching every request to a single handler.
pub struct HttpServer {
	handler: Arc<dyn Handler>,
}

impl HttpServer {
	/// Create a new server with the given handler
	///
	/// # Examples
	///
	/// ```
	/// use std::sync::Arc;
	/// use fileserve_server::HttpServer;
	/// use fileserve_service::FileService;
	///
	/// let server = HttpServer::new(Arc::new(FileService::for_path("public")));
	/// ```
	pub fn new(handler: Arc<dyn Handler>) -> Self {
		Self { handler }
	}

	/// Start the server and listen on the given address
	///
	/// Runs until accepting a connection fails.
	///
	/// # Examples
	///
	/// ```no_run
	/// use std::sync::Arc;
	/// use std::net::SocketAddr;
	/// use fileserve_server::HttpServer;
	/// use fileserve_service::FileService;
	///
	/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
	/// let server = HttpServer::new(Arc::new(FileService::for_path("public")));
	/// let addr: SocketAddr = "127.0.0.1:8080".parse()?;
	/// server.listen(addr).await?;
	/// # Ok(())
	/// # }
	/// ```
	pub async fn listen(self, addr: SocketAddr) -> Result<()> {
		self.listen_with_shutdown(addr, std::future::pending()).await
	}

	/// Start the server and stop accepting connections once `shutdown`
	/// completes
	///
	/// Connections already accepted are served to completion in the
	/// background.
	pub async fn listen_with_shutdown(
		self,
		addr: SocketAddr,
		shutdown: impl Future<Output = ()>,
	) -> Result<()> {
		let listener = TcpListener::bind(addr).await?;
		self.serve(listener, shutdown).await
	}

	/// Serve connections accepted from an already bound `listener`
	pub async fn serve(self, listener: TcpListener, shutdown: impl Future<Output = ()>) -> Result<()> {
		tracing::info!("Server listening on http://{}", listener.local_addr()?);
		tokio::pin!(shutdown);

		loop {
			tokio::select! {
				result = listener.accept() => {
					let (stream, remote_addr) = result?;
					let handler = Arc::clone(&self.handler);
					tokio::task::spawn(async move {
						if let Err(err) = Self::handle_connection(stream, remote_addr, handler).await {
							tracing::debug!(%remote_addr, "Error handling connection: {:?}", err);
						}
					});
				}
				_ = &mut shutdown => {
					tracing::info!("Shutdown signal received, stopping server...");
					break;
				}
			}
		}
		Ok(())
	}

	/// Handle a single TCP connection by processing HTTP requests
	pub async fn handle_connection(
		stream: TcpStream,
		remote_addr: SocketAddr,
		handler: Arc<dyn Handler>,
	) -> std::result::Result<(), hyper::Error> {
		let io = TokioIo::new(stream);
		let service = RequestService {
			handler,
			remote_addr,
		};
		http1::Builder::new().serve_connection(io, service).await
	}
}

/// Service implementation for hyper
struct RequestService {
	handler: Arc<dyn Handler>,
	remote_addr: SocketAddr,
}

impl Service<hyper::Request<Incoming>> for RequestService {
	type Response = hyper::Response<ResponseBody>;
	type Error = http::Error;
	type Future = Pin<Box<dyn Future<Output = std::result::Result<Self::Response, Self::Error>> + Send>>;

	fn call(&self, req: hyper::Request<Incoming>) -> Self::Future {
		let handler = Arc::clone(&self.handler);
		let remote_addr = self.remote_addr;

		Box::pin(async move {
			// Request bodies are never read; only GET and HEAD are served.
			let (parts, _body) = req.into_parts();
			let method = parts.method.clone();
			let uri = parts.uri.clone();
			let request = Request::new(parts.method, parts.uri, parts.version, parts.headers);

			let response = match handler.handle(request).await {
				Ok(response) => response,
				Err(err) => {
					tracing::warn!(%remote_addr, %method, %uri, "Failed to serve request: {}", err);
					Response::internal_server_error()
				}
			};
			tracing::debug!(%remote_addr, %method, %uri, status = response.status.as_u16(), "served request");
			into_hyper(response)
		})
	}
}

/// Converts a handler response into a hyper response.
pub fn into_hyper(response: Response) -> std::result::Result<hyper::Response<ResponseBody>, http::Error> {
	let mut builder = hyper::Response::builder().status(response.status);
	if let Some(headers) = builder.headers_mut() {
		*headers = response.headers;
	}
	let body = match response.body {
		Body::Empty => Empty::<Bytes>::new()
			.map_err(|never: Infallible| match never {})
			.boxed_unsync(),
		Body::Full(bytes) => Full::new(bytes)
			.map_err(|never: Infallible| match never {})
			.boxed_unsync(),
		Body::Stream(stream) => StreamBody::new(stream.map_ok(Frame::data)).boxed_unsync(),
	};
	builder.body(body)
}
