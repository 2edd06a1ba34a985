//! Consolidated strategy and mode enums
//!
//! Each enum implements FromStr for CLI parsing and Display for reporting,
//! and (de)serializes in kebab-case for config files.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

// ============================================================================
// CHECKSUM ALGORITHM
// ============================================================================

/// Digest used to fingerprint file content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ChecksumAlgorithm {
	/// SHA-256 (default)
	#[default]
	Sha256,

	/// SHA-512
	Sha512,

	/// BLAKE3
	Blake3,
}

impl ChecksumAlgorithm {
	/// Length of the hex encoded digest
	pub fn hex_len(self) -> usize {
		match self {
			Self::Sha256 | Self::Blake3 => 64,
			Self::Sha512 => 128,
		}
	}
}

impl FromStr for ChecksumAlgorithm {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_lowercase().as_str() {
			"sha256" | "sha-256" => Ok(Self::Sha256),
			"sha512" | "sha-512" => Ok(Self::Sha512),
			"blake3" | "b3" => Ok(Self::Blake3),
			_ => Err(format!(
				"Unknown checksum algorithm: {}. Valid options: sha256, sha512, blake3",
				s
			)),
		}
	}
}

impl std::fmt::Display for ChecksumAlgorithm {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Sha256 => write!(f, "sha256"),
			Self::Sha512 => write!(f, "sha512"),
			Self::Blake3 => write!(f, "blake3"),
		}
	}
}

// ============================================================================
// OUTPUT FORMAT
// ============================================================================

/// How comparison results are written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
	/// Human readable, optionally colored
	#[default]
	Text,

	/// One JSON object per line
	Json,
}

impl FromStr for OutputFormat {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_lowercase().as_str() {
			"text" | "human" => Ok(Self::Text),
			"json" | "jsonl" => Ok(Self::Json),
			_ => Err(format!("Unknown output format: {}. Valid options: text, json", s)),
		}
	}
}

impl std::fmt::Display for OutputFormat {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Text => write!(f, "text"),
			Self::Json => write!(f, "json"),
		}
	}
}

// ============================================================================
// COLOR MODE
// ============================================================================

/// Color output mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ColorMode {
	/// Color when stdout is a terminal
	#[default]
	Auto,
	Always,
	Never,
}

impl ColorMode {
	/// Resolve against the actual stdout
	pub fn enabled(self) -> bool {
		use std::io::IsTerminal;
		match self {
			Self::Auto => std::io::stdout().is_terminal(),
			Self::Always => true,
			Self::Never => false,
		}
	}
}

impl FromStr for ColorMode {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_lowercase().as_str() {
			"auto" => Ok(Self::Auto),
			"always" | "yes" => Ok(Self::Always),
			"never" | "no" => Ok(Self::Never),
			_ => Err(format!("Unknown color mode: {}. Valid options: auto, always, never", s)),
		}
	}
}

impl std::fmt::Display for ColorMode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Auto => write!(f, "auto"),
			Self::Always => write!(f, "always"),
			Self::Never => write!(f, "never"),
		}
	}
}


// vim: ts=4
