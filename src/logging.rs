//! Logging prelude module for convenient access to tracing macros.
//!
//! # Usage
//!
//! ```ignore
//! use treecmp::logging::*;
//!
//! info!("This is an info message");
//! warn!("This is a warning");
//! ```

pub use tracing::{debug, error, info, warn};

/// Filter directive for a configured level raised by `-v` flags
pub fn level_for(default_level: &str, verbose: u8) -> String {
	match verbose {
		0 => default_level.to_string(),
		1 => "debug".to_string(),
		_ => "trace".to_string(),
	}
}

/// Initialize the tracing subscriber with environment filter support.
///
/// Logs go to stderr so stdout carries only the report (and, for `serve`,
/// the protocol). `RUST_LOG` takes precedence over the configured level:
///
/// ```bash
/// RUST_LOG=debug treecmp compare ...
/// RUST_LOG=treecmp::protocol=trace treecmp compare ...
/// ```
pub fn init_tracing(default_level: &str, verbose: u8) {
	let level = level_for(default_level, verbose);
	tracing_subscriber::fmt()
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
		)
		.with_writer(std::io::stderr)
		.init();
}


// vim: ts=4
