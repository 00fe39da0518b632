//! fileserve
//!
//! Serves a directory over HTTP.
//!
//! ## Usage
//!
//! ```bash
//! fileserve public --serve-compressed --auto-index
//! fileserve --config fileserve.toml --bind 0.0.0.0:8080
//! ```
//!
//! Command-line flags override the values of the settings file.

use clap::Parser;
use fileserve_server::{HttpServer, Result, Router, Settings};
use fileserve_service::CacheSpec;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fileserve")]
#[command(about = "Serve static files over HTTP", long_about = None)]
#[command(version)]
struct Cli {
	/// Directory to serve
	#[arg(value_name = "ROOT")]
	root: Option<PathBuf>,

	/// Settings file (TOML)
	#[arg(short, long, value_name = "FILE")]
	config: Option<PathBuf>,

	/// Listen address
	#[arg(short, long, value_name = "ADDR")]
	bind: Option<SocketAddr>,

	/// Path prefix to mount the files under
	#[arg(short, long, value_name = "PREFIX")]
	mount: Option<String>,

	/// Aggregation cache spec, e.g. `maximumSize=512,expireAfterAccess=10m` or `off`
	#[arg(long, value_name = "SPEC")]
	cache_spec: Option<CacheSpec>,

	/// Files larger than this many bytes are streamed instead of cached
	#[arg(long, value_name = "BYTES")]
	max_cache_entry_size: Option<u64>,

	/// Serve pre-compressed `.br`/`.gz` variants
	#[arg(long)]
	serve_compressed: bool,

	/// Decode compressed variants for clients that do not accept them
	#[arg(long)]
	auto_decompress: bool,

	/// List directories without an index.html
	#[arg(long)]
	auto_index: bool,

	/// Header added to every file response (can be repeated)
	#[arg(long = "header", value_name = "NAME=VALUE", value_parser = parse_header)]
	headers: Vec<(String, String)>,

	/// Verbosity level (can be repeated)
	#[arg(short, long, action = clap::ArgAction::Count)]
	verbosity: u8,
}

impl Cli {
	fn settings(&self) -> Result<Settings> {
		let mut settings = match &self.config {
			Some(path) => Settings::from_file(path)?,
			None => Settings::default(),
		};
		if let Some(root) = &self.root {
			settings.root = root.clone();
		}
		if let Some(bind) = self.bind {
			settings.bind = bind;
		}
		if let Some(mount) = &self.mount {
			settings.mount = mount.clone();
		}
		if let Some(spec) = self.cache_spec {
			settings.cache_spec = Some(spec);
		}
		if let Some(size) = self.max_cache_entry_size {
			settings.max_cache_entry_size_bytes = size;
		}
		settings.serve_compressed |= self.serve_compressed;
		settings.auto_decompress |= self.auto_decompress;
		settings.auto_index |= self.auto_index;
		settings.headers.extend(self.headers.iter().cloned());
		Ok(settings)
	}
}

fn parse_header(value: &str) -> std::result::Result<(String, String), String> {
	match value.split_once('=') {
		Some((name, value)) if !name.trim().is_empty() => {
			Ok((name.trim().to_string(), value.trim().to_string()))
		}
		_ => Err(format!("expected NAME=VALUE, got '{value}'")),
	}
}

fn init_tracing(verbosity: u8) {
	let level = match verbosity {
		0 => "info",
		1 => "debug",
		_ => "trace",
	};
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
	tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn serve(settings: Settings) -> Result<()> {
	let files = Arc::new(settings.build_service()?);
	let router = Router::new().mount(&settings.mount, files.clone())?;
	tracing::info!(
		root = %settings.root.display(),
		mount = %settings.mount,
		"Serving files"
	);

	let shutdown = async {
		if let Err(err) = tokio::signal::ctrl_c().await {
			tracing::error!("Failed to listen for the shutdown signal: {}", err);
		}
	};
	HttpServer::new(Arc::new(router))
		.listen_with_shutdown(settings.bind, shutdown)
		.await?;

	files.close().await;
	Ok(())
}

fn run(cli: Cli) -> Result<()> {
	let settings = cli.settings()?;
	let runtime = tokio::runtime::Builder::new_multi_thread()
		.enable_all()
		.max_blocking_threads(settings.max_blocking_threads.max(1))
		.build()?;
	runtime.block_on(serve(settings))
}

fn main() {
	let cli = Cli::parse();
	init_tracing(cli.verbosity);

	if let Err(e) = run(cli) {
		eprintln!("Error: {}", e);
		process::exit(1);
	}
}
