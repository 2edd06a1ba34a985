//! Error types for treecmp operations

use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::session::SessionError;

/// Top-level error for a comparison run or a single target
#[derive(Debug)]
pub enum CompareError {
	/// Invalid configuration
	InvalidConfig { message: String },

	/// Could not establish a session with a target
	Connection(ConnectionError),

	/// Tree enumeration or hashing failed
	Scan(ScanError),

	/// Operator prompt could not be shown or answered
	Prompt { message: String },

	/// I/O error outside of scanning
	Io(io::Error),
}

impl fmt::Display for CompareError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			CompareError::InvalidConfig { message } => {
				write!(f, "Invalid configuration: {}", message)
			}
			CompareError::Connection(e) => write!(f, "Connection error: {}", e),
			CompareError::Scan(e) => write!(f, "Scan error: {}", e),
			CompareError::Prompt { message } => write!(f, "Confirmation prompt failed: {}", message),
			CompareError::Io(e) => write!(f, "I/O error: {}", e),
		}
	}
}

impl Error for CompareError {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		match self {
			CompareError::Connection(e) => Some(e),
			CompareError::Scan(e) => Some(e),
			CompareError::Io(e) => Some(e),
			_ => None,
		}
	}
}

impl From<io::Error> for CompareError {
	fn from(e: io::Error) -> Self {
		CompareError::Io(e)
	}
}

impl From<ConnectionError> for CompareError {
	fn from(e: ConnectionError) -> Self {
		CompareError::Connection(e)
	}
}

impl From<ScanError> for CompareError {
	fn from(e: ScanError) -> Self {
		CompareError::Scan(e)
	}
}

/// Session acquisition errors (auth failure, unreachable host, bad target)
#[derive(Debug)]
pub enum ConnectionError {
	/// Target string could not be interpreted
	InvalidTarget { target: String, message: String },

	/// Subprocess spawn failed
	SpawnFailed { cmd: String, source: io::Error },

	/// Stdio of the transport subprocess unavailable
	StdioUnavailable { what: String },

	/// Remote side did not complete the handshake
	HandshakeFailed { target: String, message: String },

	/// Handshake did not complete in time
	Timeout { target: String, secs: u64 },

	/// Local target directory missing or unreadable
	LocalRoot { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConnectionError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ConnectionError::InvalidTarget { target, message } => {
				write!(f, "Invalid target '{}': {}", target, message)
			}
			ConnectionError::SpawnFailed { cmd, source } => {
				write!(f, "Failed to spawn '{}': {}", cmd, source)
			}
			ConnectionError::StdioUnavailable { what } => {
				write!(f, "Stdio unavailable: {}", what)
			}
			ConnectionError::HandshakeFailed { target, message } => {
				write!(f, "Handshake with {} failed: {}", target, message)
			}
			ConnectionError::Timeout { target, secs } => {
				write!(f, "Connection to {} timed out after {}s", target, secs)
			}
			ConnectionError::LocalRoot { path, source } => {
				write!(f, "Cannot open local target {}: {}", path.display(), source)
			}
		}
	}
}

impl Error for ConnectionError {}

/// Errors while hashing a single file
#[derive(Debug)]
pub enum ChecksumError {
	/// File or stream could not be opened
	Open { path: String, source: io::Error },

	/// Read failed before end of stream
	Read { path: String, source: io::Error },
}

impl fmt::Display for ChecksumError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ChecksumError::Open { path, source } => {
				write!(f, "Cannot open {} for hashing: {}", path, source)
			}
			ChecksumError::Read { path, source } => {
				write!(f, "Read failed while hashing {}: {}", path, source)
			}
		}
	}
}

impl Error for ChecksumError {}

/// Tree enumeration errors; any of these aborts the whole scan
#[derive(Debug)]
pub enum ScanError {
	/// Scan root missing, unreadable or not a directory
	Root { path: String, message: String },

	/// Local directory walk failed
	Walk { path: String, message: String },

	/// Remote listing failed
	Listing { path: String, source: SessionError },

	/// Remote file could not be opened
	Open { path: String, source: SessionError },

	/// Hashing failed
	Checksum(ChecksumError),

	/// Entry name cannot be turned into a RelativePath
	InvalidPath { path: String, message: String },
}

impl fmt::Display for ScanError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ScanError::Root { path, message } => {
				write!(f, "Cannot scan root {}: {}", path, message)
			}
			ScanError::Walk { path, message } => {
				write!(f, "Directory walk failed at {}: {}", path, message)
			}
			ScanError::Listing { path, source } => {
				write!(f, "Listing {} failed: {}", path, source)
			}
			ScanError::Open { path, source } => write!(f, "Opening {} failed: {}", path, source),
			ScanError::Checksum(e) => write!(f, "{}", e),
			ScanError::InvalidPath { path, message } => {
				write!(f, "Invalid path {}: {}", path, message)
			}
		}
	}
}

impl Error for ScanError {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		match self {
			ScanError::Listing { source, .. } | ScanError::Open { source, .. } => Some(source),
			ScanError::Checksum(e) => Some(e),
			_ => None,
		}
	}
}

impl From<ChecksumError> for ScanError {
	fn from(e: ChecksumError) -> Self {
		ScanError::Checksum(e)
	}
}


// vim: ts=4
