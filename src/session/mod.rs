//! Remote session capability
//!
//! A session is the handle the comparison engine uses to reach one target:
//! list a directory, stream a file, remove a file. [`LocalSession`] serves a
//! directory of the local filesystem; the SSH transport lives in
//! [`crate::protocol::ProtocolClient`].

mod local;

pub use local::LocalSession;

use async_trait::async_trait;
use std::error::Error;
use std::fmt;
use std::io;

use crate::checksum::ByteSource;
use crate::protocol::ProtocolError;
use crate::types::RemoteEntry;

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;

/// Operations a target must provide
///
/// Paths are absolute, `/`-separated remote paths.
#[async_trait]
pub trait RemoteSession: Send {
	/// Identifier of the target this session is connected to
	fn target(&self) -> &str;

	/// List the entries of one directory (not recursive)
	async fn list_directory(&mut self, path: &str) -> SessionResult<Vec<RemoteEntry>>;

	/// Open a file for sequential reading
	///
	/// The stream borrows the session; it must be read to end of stream
	/// before the session is used again.
	async fn open_read<'a>(&'a mut self, path: &str) -> SessionResult<Box<dyn ByteSource + 'a>>;

	/// Remove a single file
	async fn delete_file(&mut self, path: &str) -> SessionResult<()>;

	/// Release the session
	async fn close(&mut self) -> SessionResult<()>;
}

/// Session operation errors
#[derive(Debug)]
pub enum SessionError {
	/// Path does not exist
	NotFound { path: String },

	/// Access denied
	PermissionDenied { path: String },

	/// Local I/O error
	Io { path: String, source: io::Error },

	/// Error reported by the remote side
	Remote { path: String, message: String },

	/// Transport or wire format failure
	Protocol(ProtocolError),
}

impl SessionError {
	/// Classify an I/O error for `path`
	pub fn from_io(path: &str, e: io::Error) -> Self {
		match e.kind() {
			io::ErrorKind::NotFound => SessionError::NotFound { path: path.to_string() },
			io::ErrorKind::PermissionDenied => {
				SessionError::PermissionDenied { path: path.to_string() }
			}
			_ => SessionError::Io { path: path.to_string(), source: e },
		}
	}

	pub fn is_not_found(&self) -> bool {
		matches!(self, SessionError::NotFound { .. })
	}
}

impl fmt::Display for SessionError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SessionError::NotFound { path } => write!(f, "No such file: {}", path),
			SessionError::PermissionDenied { path } => write!(f, "Permission denied: {}", path),
			SessionError::Io { path, source } => write!(f, "I/O error on {}: {}", path, source),
			SessionError::Remote { path, message } => {
				write!(f, "Remote error on {}: {}", path, message)
			}
			SessionError::Protocol(e) => write!(f, "{}", e),
		}
	}
}

impl Error for SessionError {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		match self {
			SessionError::Io { source, .. } => Some(source),
			SessionError::Protocol(e) => Some(e),
			_ => None,
		}
	}
}

impl From<ProtocolError> for SessionError {
	fn from(e: ProtocolError) -> Self {
		SessionError::Protocol(e)
	}
}


// vim: ts=4
