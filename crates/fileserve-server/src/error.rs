//! Server errors

use std::io;
use std::path::PathBuf;

/// Errors raised while configuring or running the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
	/// Binding or accepting on the listen socket failed.
	#[error("I/O error: {0}")]
	Io(#[from] io::Error),

	/// The settings file could not be read.
	#[error("Failed to read settings from {path}: {source}")]
	ReadSettings {
		/// The settings file
		path: PathBuf,
		/// The underlying error
		#[source]
		source: io::Error,
	},

	/// The settings file is not valid TOML or has unexpected fields.
	#[error("Invalid settings: {0}")]
	Settings(#[from] toml::de::Error),

	/// A cache spec was rejected.
	#[error(transparent)]
	Config(#[from] fileserve_service::ConfigError),

	/// A configured response header is invalid.
	#[error("Invalid header '{name}': {reason}")]
	InvalidHeader {
		/// Header name as configured
		name: String,
		/// What is wrong with it
		reason: String,
	},

	/// A route prefix is invalid or mounted twice.
	#[error("Invalid route '{0}'")]
	InvalidRoute(String),

	/// A handler refused to be mounted.
	#[error("Failed to register handler: {0}")]
	Registration(#[from] fileserve_http::Error),
}

/// Result type alias for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;
