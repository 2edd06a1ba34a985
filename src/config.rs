//! Configuration for treecmp runs
//!
//! The configuration follows a priority chain:
//! 1. Built-in defaults (Config::default())
//! 2. Config file (~/.config/treecmp/config.toml, or --config with .toml/.json/.json5)
//! 3. Environment variables (TREECMP_* prefix)
//! 4. CLI flags (highest priority)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::CompareError;
use crate::strategies::{ChecksumAlgorithm, ColorMode, OutputFormat};
use crate::validation;

/// Environment variable holding the SSH password
pub const ENV_PASSWORD: &str = "TREECMP_PASSWORD";

/// Environment variable holding the private key path
pub const ENV_KEY: &str = "TREECMP_KEY";

/// Environment variable holding the remote user name
pub const ENV_USER: &str = "TREECMP_USER";

// ============================================================================
// MAIN CONFIGURATION STRUCT
// ============================================================================

/// Configuration of one comparison run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
	// ========================================================================
	// TREES
	// ========================================================================
	/// Local source directory
	pub source: Option<PathBuf>,

	/// Remote targets, compared in order
	pub targets: Vec<String>,

	/// Absolute directory compared on every target
	pub remote_root: String,

	/// Glob patterns excluded on both sides (e.g., "*.tmp", "cache/**")
	pub exclude_patterns: Vec<String>,

	// ========================================================================
	// CREDENTIALS
	// ========================================================================
	/// Remote user name (default: ssh's own choice)
	pub username: Option<String>,

	/// Private key; takes precedence over the password
	pub key_path: Option<PathBuf>,

	/// Password for hosts without key authentication
	#[serde(skip_serializing)]
	pub password: Option<String>,

	// ========================================================================
	// COMPARISON & DELETION
	// ========================================================================
	/// Content digest
	pub algorithm: ChecksumAlgorithm,

	/// Offer to delete remote files missing locally
	pub auto_delete: bool,

	/// Refuse deletion plans with more files than this
	pub max_delete_count: Option<usize>,

	/// Refuse deletion plans covering more than this share of the target (0-100)
	pub max_delete_percent: Option<u8>,

	// ========================================================================
	// OUTPUT
	// ========================================================================
	pub output_format: OutputFormat,

	pub color_mode: ColorMode,

	/// Default tracing filter when RUST_LOG is unset
	pub log_level: String,

	// ========================================================================
	// TRANSPORT
	// ========================================================================
	pub ssh: SshConfig,
}

impl Default for Config {
	fn default() -> Self {
		Config {
			source: None,
			targets: vec![],
			remote_root: String::new(),
			exclude_patterns: vec![],
			username: None,
			key_path: None,
			password: None,
			algorithm: ChecksumAlgorithm::default(),
			auto_delete: false,
			max_delete_count: None,
			max_delete_percent: None,
			output_format: OutputFormat::default(),
			color_mode: ColorMode::default(),
			log_level: "info".to_string(),
			ssh: SshConfig::default(),
		}
	}
}

impl Config {
	/// Location of the per-user config file, if one exists
	pub fn default_file() -> Option<PathBuf> {
		let home = std::env::var("HOME").ok()?;
		let path = PathBuf::from(home).join(".config").join("treecmp").join("config.toml");
		if path.is_file() {
			Some(path)
		} else {
			None
		}
	}

	/// Load a config file; the format follows the extension
	///
	/// `.json` and `.json5` are read as JSON5, anything else as TOML.
	pub fn load_file(path: &Path) -> Result<Self, CompareError> {
		let text = std::fs::read_to_string(path)?;
		Self::parse(&text, path)
	}

	fn parse(text: &str, path: &Path) -> Result<Self, CompareError> {
		let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("").to_lowercase();
		let parsed = match ext.as_str() {
			"json" | "json5" => json5::from_str(text).map_err(|e| e.to_string()),
			_ => toml::from_str(text).map_err(|e| e.to_string()),
		};
		parsed.map_err(|message| CompareError::InvalidConfig {
			message: format!("{}: {}", path.display(), message),
		})
	}

	/// Apply TREECMP_* variables from the process environment
	pub fn apply_env(&mut self) {
		self.apply_env_from(|name| std::env::var(name).ok());
	}

	/// Apply TREECMP_* variables from an arbitrary lookup
	pub fn apply_env_from<F>(&mut self, lookup: F)
	where
		F: Fn(&str) -> Option<String>,
	{
		let non_empty = |name: &str| lookup(name).filter(|v| !v.is_empty());

		if let Some(password) = non_empty(ENV_PASSWORD) {
			self.password = Some(password);
		}
		if let Some(key) = non_empty(ENV_KEY) {
			self.key_path = Some(PathBuf::from(key));
		}
		if let Some(user) = non_empty(ENV_USER) {
			self.username = Some(user);
		}
	}

	/// Check the settings a run cannot start without
	pub fn validate(&self) -> Result<(), CompareError> {
		let invalid = |message: String| CompareError::InvalidConfig { message };

		if self.source.is_none() {
			return Err(invalid("no source directory given".to_string()));
		}
		if self.targets.is_empty() {
			return Err(invalid("no targets given".to_string()));
		}
		if let Some(empty) = self.targets.iter().find(|t| t.trim().is_empty()) {
			return Err(invalid(format!("empty target {:?}", empty)));
		}
		validation::validate_remote_root(&self.remote_root).map_err(|e| invalid(e.to_string()))?;
		validation::validate_timeout_secs("connectTimeoutSecs", self.ssh.connect_timeout_secs)
			.map_err(|e| invalid(e.to_string()))?;
		validation::validate_timeout_secs("ioTimeoutSecs", self.ssh.io_timeout_secs)
			.map_err(|e| invalid(e.to_string()))?;
		if let Some(percent) = self.max_delete_percent {
			validation::validate_percent(percent).map_err(|e| invalid(e.to_string()))?;
		}
		Ok(())
	}
}

// ============================================================================
// NESTED CONFIGURATION STRUCTS
// ============================================================================

/// SSH transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SshConfig {
	/// Custom SSH command (overrides default "ssh")
	pub ssh_command: Option<String>,

	/// Custom port
	pub port: Option<u16>,

	/// Command started on the remote host
	pub remote_command: String,

	/// Time allowed for the remote side to greet
	pub connect_timeout_secs: u64,

	/// Time allowed for any single response
	pub io_timeout_secs: u64,
}

impl Default for SshConfig {
	fn default() -> Self {
		SshConfig {
			ssh_command: None,
			port: None,
			remote_command: "treecmp serve".to_string(),
			connect_timeout_secs: 30,
			io_timeout_secs: 60,
		}
	}
}


// vim: ts=4
