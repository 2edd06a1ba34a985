//! Server side of the wire protocol (`treecmp serve`)
//!
//! Answers LIST/READ/DEL requests from a [`RemoteSession`], normally a
//! [`LocalSession`] rooted at `/`. A malformed request is answered with ERR
//! and the loop keeps going; only transport failures end it early.

use std::io;
use tokio::io::{AsyncBufRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use super::error::ProtocolError;
use super::messages::{
	read_message, write_message, RemoteErrorKind, Request, Response, FRAME_SIZE, PROTOCOL_VERSION,
};
use crate::session::{LocalSession, RemoteSession};

/// Serve requests until QUIT or end of input
pub async fn serve<S, R, W>(session: &mut S, mut reader: R, mut writer: W) -> Result<(), ProtocolError>
where
	S: RemoteSession + ?Sized,
	R: AsyncBufRead + Unpin,
	W: AsyncWrite + Unpin,
{
	write_message(&mut writer, &Response::Ready { ver: PROTOCOL_VERSION }).await?;
	writer.flush().await?;

	loop {
		let request = match read_message::<_, Request>(&mut reader).await {
			Ok(Some(request)) => request,
			Ok(None) => {
				debug!("Client closed input");
				break;
			}
			Err(ProtocolError::Json(msg)) => {
				warn!("Malformed request: {}", msg);
				let response = Response::Err { kind: RemoteErrorKind::Other, msg };
				write_message(&mut writer, &response).await?;
				writer.flush().await?;
				continue;
			}
			Err(e) => return Err(e),
		};

		match request {
			Request::List { path } => handle_list(session, &mut writer, &path).await?,
			Request::Read { path } => handle_read(session, &mut writer, &path).await?,
			Request::Del { path } => handle_delete(session, &mut writer, &path).await?,
			Request::Quit => {
				debug!("QUIT received");
				break;
			}
		}
		writer.flush().await?;
	}

	if let Err(e) = session.close().await {
		warn!("Closing session failed: {}", e);
	}
	Ok(())
}

/// Serve the whole local filesystem over stdin/stdout
pub async fn serve_stdio() -> Result<(), ProtocolError> {
	info!("Serving on stdio (protocol v{})", PROTOCOL_VERSION);
	let mut session = LocalSession::new("stdio", "/");
	serve(&mut session, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await
}

async fn handle_list<S, W>(session: &mut S, writer: &mut W, path: &str) -> Result<(), ProtocolError>
where
	S: RemoteSession + ?Sized,
	W: AsyncWrite + Unpin,
{
	match session.list_directory(path).await {
		Ok(entries) => {
			for entry in entries {
				write_message(writer, &Response::Ent { kind: entry.kind, name: entry.name }).await?;
			}
			write_message(writer, &Response::End).await
		}
		Err(e) => {
			debug!("LIST {} failed: {}", path, e);
			write_message(writer, &Response::from_session_error(&e)).await
		}
	}
}

async fn handle_read<S, W>(session: &mut S, writer: &mut W, path: &str) -> Result<(), ProtocolError>
where
	S: RemoteSession + ?Sized,
	W: AsyncWrite + Unpin,
{
	let mut source = match session.open_read(path).await {
		Ok(source) => source,
		Err(e) => {
			debug!("READ {} failed: {}", path, e);
			return write_message(writer, &Response::from_session_error(&e)).await;
		}
	};

	let mut buf = vec![0u8; FRAME_SIZE];
	loop {
		match source.read_chunk(&mut buf).await {
			Ok(0) => return write_message(writer, &Response::Data { len: 0 }).await,
			Ok(n) => {
				write_message(writer, &Response::Data { len: n }).await?;
				writer.write_all(&buf[..n]).await?;
			}
			Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
			Err(e) => {
				warn!("READ {} aborted: {}", path, e);
				let kind = match e.kind() {
					io::ErrorKind::NotFound => RemoteErrorKind::NotFound,
					io::ErrorKind::PermissionDenied => RemoteErrorKind::PermissionDenied,
					_ => RemoteErrorKind::Other,
				};
				return write_message(writer, &Response::Err { kind, msg: e.to_string() }).await;
			}
		}
	}
}

async fn handle_delete<S, W>(session: &mut S, writer: &mut W, path: &str) -> Result<(), ProtocolError>
where
	S: RemoteSession + ?Sized,
	W: AsyncWrite + Unpin,
{
	match session.delete_file(path).await {
		Ok(()) => {
			info!("Deleted {}", path);
			write_message(writer, &Response::Done).await
		}
		Err(e) => {
			debug!("DEL {} failed: {}", path, e);
			write_message(writer, &Response::from_session_error(&e)).await
		}
	}
}

// vim: ts=4
