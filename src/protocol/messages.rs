//! Wire messages
//!
//! One JSON object per line in both directions. File content follows a
//! `DATA` header as exactly `len` raw bytes; a `DATA` header with `len` 0
//! ends the stream.
//!
//! ```text
//! server: {"cmd":"READY","ver":1}
//! client: {"cmd":"LIST","pth":"/srv/www"}
//! server: {"cmd":"ENT","typ":"F","nam":"index.html"}
//! server: {"cmd":"END"}
//! client: {"cmd":"READ","pth":"/srv/www/index.html"}
//! server: {"cmd":"DATA","len":512}
//! server: <512 bytes>
//! server: {"cmd":"DATA","len":0}
//! client: {"cmd":"DEL","pth":"/srv/www/old.html"}
//! server: {"cmd":"ERR","kind":"not-found","msg":"No such file: /srv/www/old.html"}
//! client: {"cmd":"QUIT"}
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use super::error::ProtocolError;
use crate::session::SessionError;
use crate::types::EntryKind;

/// Version announced in the READY message
pub const PROTOCOL_VERSION: u32 = 1;

/// Maximum payload of a single DATA frame
pub const FRAME_SIZE: usize = 32 * 1024;

/// Client to server
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "cmd", rename_all = "UPPERCASE")]
pub enum Request {
	List {
		#[serde(rename = "pth")]
		path: String,
	},
	Read {
		#[serde(rename = "pth")]
		path: String,
	},
	Del {
		#[serde(rename = "pth")]
		path: String,
	},
	Quit,
}

/// Server to client
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "cmd", rename_all = "UPPERCASE")]
pub enum Response {
	Ready {
		ver: u32,
	},
	Ent {
		#[serde(rename = "typ")]
		kind: EntryKind,
		#[serde(rename = "nam")]
		name: String,
	},
	End,
	Data {
		len: usize,
	},
	#[serde(rename = "OK")]
	Done,
	Err {
		kind: RemoteErrorKind,
		msg: String,
	},
}

/// Failure class carried by an ERR response
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum RemoteErrorKind {
	NotFound,
	PermissionDenied,
	Other,
}

impl Response {
	/// ERR response describing a failed session operation
	pub fn from_session_error(e: &SessionError) -> Self {
		let kind = match e {
			SessionError::NotFound { .. } => RemoteErrorKind::NotFound,
			SessionError::PermissionDenied { .. } => RemoteErrorKind::PermissionDenied,
			_ => RemoteErrorKind::Other,
		};
		Response::Err { kind, msg: e.to_string() }
	}
}

/// Turn an ERR response received for `path` back into a session error
pub fn remote_error(path: &str, kind: RemoteErrorKind, msg: String) -> SessionError {
	match kind {
		RemoteErrorKind::NotFound => SessionError::NotFound { path: path.to_string() },
		RemoteErrorKind::PermissionDenied => SessionError::PermissionDenied { path: path.to_string() },
		RemoteErrorKind::Other => SessionError::Remote { path: path.to_string(), message: msg },
	}
}

/// Write one message line (not flushed)
pub async fn write_message<W, T>(writer: &mut W, message: &T) -> Result<(), ProtocolError>
where
	W: AsyncWrite + Unpin,
	T: Serialize,
{
	let mut line = serde_json::to_string(message)?;
	line.push('\n');
	writer.write_all(line.as_bytes()).await?;
	Ok(())
}

/// Read the next non-empty message line; `None` at end of stream
pub async fn read_message<R, T>(reader: &mut R) -> Result<Option<T>, ProtocolError>
where
	R: AsyncBufRead + Unpin,
	T: DeserializeOwned,
{
	let mut line = String::new();
	loop {
		line.clear();
		if reader.read_line(&mut line).await? == 0 {
			return Ok(None);
		}
		let trimmed = line.trim();
		if trimmed.is_empty() {
			continue;
		}
		return Ok(Some(serde_json::from_str(trimmed)?));
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_request_wire_format() {
		let json = serde_json::to_string(&Request::List { path: "/srv".to_string() }).unwrap();
		assert_eq!(json, r#"{"cmd":"LIST","pth":"/srv"}"#);
		assert_eq!(serde_json::to_string(&Request::Quit).unwrap(), r#"{"cmd":"QUIT"}"#);
	}

	#[test]
	fn test_response_wire_format() {
		let json = serde_json::to_string(&Response::Ent {
			kind: EntryKind::File,
			name: "a.txt".to_string(),
		})
		.unwrap();
		assert_eq!(json, r#"{"cmd":"ENT","typ":"F","nam":"a.txt"}"#);
		assert_eq!(serde_json::to_string(&Response::Done).unwrap(), r#"{"cmd":"OK"}"#);

		let err: Response =
			serde_json::from_str(r#"{"cmd":"ERR","kind":"not-found","msg":"gone"}"#).unwrap();
		assert_eq!(err, Response::Err { kind: RemoteErrorKind::NotFound, msg: "gone".to_string() });
	}

	#[tokio::test]
	async fn test_read_message_skips_blank_lines() {
		let input = b"\n\n{\"cmd\":\"END\"}\n";
		let mut reader = tokio::io::BufReader::new(&input[..]);
		let first: Option<Response> = read_message(&mut reader).await.unwrap();
		assert_eq!(first, Some(Response::End));
		let second: Option<Response> = read_message(&mut reader).await.unwrap();
		assert_eq!(second, None);
	}

	#[test]
	fn test_remote_error_mapping() {
		let e = remote_error("/x", RemoteErrorKind::NotFound, "gone".to_string());
		assert!(e.is_not_found());
		let e = remote_error("/x", RemoteErrorKind::Other, "disk on fire".to_string());
		assert!(e.to_string().contains("disk on fire"));
	}
}

// vim: ts=4
