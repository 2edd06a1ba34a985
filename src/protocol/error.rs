//! Protocol error types

use std::fmt;
use std::io;

/// Protocol error type
#[derive(Debug)]
pub enum ProtocolError {
	/// I/O error on the transport
	Io(io::Error),
	/// Message could not be encoded or decoded
	Json(String),
	/// Protocol violation (unexpected message for the current state)
	ProtocolViolation(String),
	/// Peer closed the connection
	Disconnected,
	/// No response within the I/O timeout
	Timeout { secs: u64 },
	/// Peer speaks another protocol version
	VersionMismatch { local: u32, remote: u32 },
}

impl fmt::Display for ProtocolError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ProtocolError::Io(e) => write!(f, "I/O error: {}", e),
			ProtocolError::Json(msg) => write!(f, "JSON error: {}", msg),
			ProtocolError::ProtocolViolation(msg) => write!(f, "Protocol violation: {}", msg),
			ProtocolError::Disconnected => write!(f, "Connection closed by peer"),
			ProtocolError::Timeout { secs } => write!(f, "No response within {}s", secs),
			ProtocolError::VersionMismatch { local, remote } => {
				write!(f, "Protocol version mismatch: local={}, remote={}", local, remote)
			}
		}
	}
}

impl std::error::Error for ProtocolError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			ProtocolError::Io(e) => Some(e),
			_ => None,
		}
	}
}

impl From<io::Error> for ProtocolError {
	fn from(e: io::Error) -> Self {
		ProtocolError::Io(e)
	}
}

impl From<serde_json::Error> for ProtocolError {
	fn from(e: serde_json::Error) -> Self {
		ProtocolError::Json(e.to_string())
	}
}

impl From<ProtocolError> for io::Error {
	fn from(e: ProtocolError) -> Self {
		match e {
			ProtocolError::Io(e) => e,
			ProtocolError::Disconnected => io::Error::new(io::ErrorKind::UnexpectedEof, e.to_string()),
			ProtocolError::Timeout { .. } => io::Error::new(io::ErrorKind::TimedOut, e.to_string()),
			other => io::Error::new(io::ErrorKind::InvalidData, other.to_string()),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_into_io_error_kinds() {
		let e: io::Error = ProtocolError::Timeout { secs: 5 }.into();
		assert_eq!(e.kind(), io::ErrorKind::TimedOut);

		let e: io::Error = ProtocolError::Disconnected.into();
		assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof);

		let e: io::Error = ProtocolError::ProtocolViolation("x".to_string()).into();
		assert_eq!(e.kind(), io::ErrorKind::InvalidData);
	}
}

// vim: ts=4
