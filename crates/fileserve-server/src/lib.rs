//! # fileserve-server
//!
//! HTTP/1 transport for file services.
//!
//! ## Overview
//!
//! - [`HttpServer`]: accepts connections with hyper and hands every request
//!   to one [`Handler`](fileserve_http::Handler)
//! - [`Router`]: mounts handlers under path prefixes
//! - [`Settings`]: TOML settings read by the `fileserve` binary
//!
//! ## Quick Start
//!
//! ```no_run
//! use fileserve_server::{HttpServer, Router};
//! use fileserve_service::FileService;
//! use std::sync::Arc;
//!
//! # async fn example() -> fileserve_server::Result<()> {
//! let files = FileService::builder(fileserve_vfs::FileSystemVfs::new("public"))
//!     .serve_compressed(true)
//!     .build();
//! let router = Router::new().mount("/static/", Arc::new(files))?;
//!
//! HttpServer::new(Arc::new(router))
//!     .listen("127.0.0.1:8080".parse().unwrap())
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod router;
pub mod server;
pub mod settings;

pub use error::{Result, ServerError};
pub use router::Router;
pub use server::{HttpServer, ResponseBody, into_hyper};
pub use settings::Settings;
