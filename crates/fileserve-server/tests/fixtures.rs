//! Shared fixtures for fileserve-server integration tests

#![allow(dead_code)]

use bytes::Bytes;
use fileserve_http::Handler;
use fileserve_server::{HttpServer, Result};
use http::{HeaderMap, Method, StatusCode};
use http_body_util::{BodyExt, Empty};
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use rstest::fixture;
use std::fs;
use std::net::SocketAddr;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// A small site: `index.html`, `app.css`, `app.css.gz` and `docs/readme.txt`.
#[fixture]
pub fn site_dir() -> TempDir {
	let dir = TempDir::new().unwrap();
	let root = dir.path();
	fs::write(root.join("index.html"), "<h1>home</h1>").unwrap();
	fs::write(root.join("app.css"), "body { color: red; }").unwrap();
	fs::write(root.join("app.css.gz"), "gzip-bytes").unwrap();
	fs::create_dir_all(root.join("docs")).unwrap();
	fs::write(root.join("docs/readme.txt"), "read me").unwrap();
	dir
}

/// A server running on an ephemeral local port.
pub struct RunningServer {
	pub addr: SocketAddr,
	shutdown: Option<oneshot::Sender<()>>,
	task: JoinHandle<Result<()>>,
}

impl RunningServer {
	/// Binds `127.0.0.1:0` and serves `handler` in the background.
	pub async fn start(handler: Arc<dyn Handler>) -> Self {
		let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
		let addr = listener.local_addr().unwrap();
		let (tx, rx) = oneshot::channel::<()>();
		let task = tokio::spawn(HttpServer::new(handler).serve(listener, async move {
			let _ = rx.await;
		}));
		Self {
			addr,
			shutdown: Some(tx),
			task,
		}
	}

	/// Sends a request and collects the response.
	pub async fn fetch(
		&self,
		method: Method,
		path: &str,
		headers: &[(&str, &str)],
	) -> (StatusCode, HeaderMap, Bytes) {
		let client = Client::builder(TokioExecutor::new()).build_http::<Empty<Bytes>>();
		let mut builder = hyper::Request::builder()
			.method(method)
			.uri(format!("http://{}{}", self.addr, path));
		for (name, value) in headers {
			builder = builder.header(*name, *value);
		}
		let response = client
			.request(builder.body(Empty::new()).unwrap())
			.await
			.unwrap();
		let (parts, body) = response.into_parts();
		let body = body.collect().await.unwrap().to_bytes();
		(parts.status, parts.headers, body)
	}

	/// Sends a GET request.
	pub async fn get(&self, path: &str) -> (StatusCode, HeaderMap, Bytes) {
		self.fetch(Method::GET, path, &[]).await
	}

	/// Signals shutdown and waits for the accept loop to stop.
	pub async fn stop(mut self) -> Result<()> {
		if let Some(tx) = self.shutdown.take() {
			let _ = tx.send(());
		}
		self.task.await.unwrap()
	}
}
