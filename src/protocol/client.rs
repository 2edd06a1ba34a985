//! Client side of the wire protocol
//!
//! The client owns both halves of the transport (normally the stdio of an
//! `ssh host treecmp serve` child) and exposes them as a [`RemoteSession`].
//! Every wait for the peer is bounded by the I/O timeout.

use async_trait::async_trait;
use std::io;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout};
use tracing::{debug, trace, warn};

use super::error::ProtocolError;
use super::messages::{
	read_message, remote_error, write_message, RemoteErrorKind, Request, Response, PROTOCOL_VERSION,
};
use crate::checksum::ByteSource;
use crate::error::ConnectionError;
use crate::session::{RemoteSession, SessionError, SessionResult};
use crate::types::RemoteEntry;

/// Protocol client over the stdio of an SSH child process
pub type SshSession = ProtocolClient<BufReader<ChildStdout>, ChildStdin>;

/// How long `close` waits for the transport process to exit
const EXIT_WAIT: Duration = Duration::from_secs(5);

pub struct ProtocolClient<R, W> {
	target: String,
	reader: R,
	writer: W,
	io_timeout: Duration,
	child: Option<Child>,
	closed: bool,
}

impl<R, W> ProtocolClient<R, W>
where
	R: AsyncBufRead + Unpin + Send + 'static,
	W: AsyncWrite + Unpin + Send + 'static,
{
	/// Wait for the server greeting and return a ready session
	pub async fn connect(
		target: impl Into<String>,
		mut reader: R,
		writer: W,
		connect_timeout: Duration,
		io_timeout: Duration,
	) -> Result<Self, ConnectionError> {
		let target = target.into();

		let greeting = tokio::time::timeout(connect_timeout, read_message::<_, Response>(&mut reader))
			.await
			.map_err(|_| ConnectionError::Timeout {
				target: target.clone(),
				secs: connect_timeout.as_secs(),
			})?;

		match greeting {
			Ok(Some(Response::Ready { ver })) if ver == PROTOCOL_VERSION => {
				debug!("{}: protocol v{} ready", target, ver);
			}
			Ok(Some(Response::Ready { ver })) => {
				return Err(ConnectionError::HandshakeFailed {
					target,
					message: ProtocolError::VersionMismatch { local: PROTOCOL_VERSION, remote: ver }
						.to_string(),
				});
			}
			Ok(Some(other)) => {
				return Err(ConnectionError::HandshakeFailed {
					target,
					message: format!("unexpected greeting {:?}", other),
				});
			}
			Ok(None) => {
				return Err(ConnectionError::HandshakeFailed {
					target,
					message: "connection closed before handshake".to_string(),
				});
			}
			Err(e) => {
				return Err(ConnectionError::HandshakeFailed { target, message: e.to_string() });
			}
		}

		Ok(Self { target, reader, writer, io_timeout, child: None, closed: false })
	}

	/// Attach the transport process so `close` can reap it
	pub fn with_child(mut self, child: Child) -> Self {
		self.child = Some(child);
		self
	}

	async fn send(&mut self, request: &Request) -> Result<(), ProtocolError> {
		trace!("{} <- {:?}", self.target, request);
		let io_timeout = self.io_timeout;
		let writer = &mut self.writer;
		let write = async move {
			write_message(writer, request).await?;
			writer.flush().await?;
			Ok::<(), ProtocolError>(())
		};
		match tokio::time::timeout(io_timeout, write).await {
			Ok(result) => result,
			Err(_) => Err(ProtocolError::Timeout { secs: io_timeout.as_secs() }),
		}
	}

	async fn recv(&mut self) -> Result<Response, ProtocolError> {
		let secs = self.io_timeout.as_secs();
		let message = tokio::time::timeout(self.io_timeout, read_message::<_, Response>(&mut self.reader))
			.await
			.map_err(|_| ProtocolError::Timeout { secs })??;
		let response = message.ok_or(ProtocolError::Disconnected)?;
		trace!("{} -> {:?}", self.target, response);
		Ok(response)
	}

	/// Read raw payload bytes of the current DATA frame
	async fn recv_payload(&mut self, buf: &mut [u8]) -> Result<usize, ProtocolError> {
		let secs = self.io_timeout.as_secs();
		let n = tokio::time::timeout(self.io_timeout, self.reader.read(buf))
			.await
			.map_err(|_| ProtocolError::Timeout { secs })??;
		if n == 0 {
			return Err(ProtocolError::Disconnected);
		}
		Ok(n)
	}

	async fn shutdown(&mut self) -> SessionResult<()> {
		if self.closed {
			return Ok(());
		}
		self.closed = true;

		let quit = self.send(&Request::Quit).await;
		if let Err(e) = &quit {
			debug!("{}: QUIT not delivered: {}", self.target, e);
		}
		// EOF on stdin ends the server even if QUIT was lost
		let _ = self.writer.shutdown().await;

		if let Some(mut child) = self.child.take() {
			match tokio::time::timeout(EXIT_WAIT, child.wait()).await {
				Ok(Ok(status)) if status.success() => {}
				Ok(Ok(status)) => debug!("{}: transport exited with {}", self.target, status),
				Ok(Err(e)) => warn!("{}: waiting for transport failed: {}", self.target, e),
				Err(_) => {
					warn!("{}: transport did not exit, killing it", self.target);
					let _ = child.kill().await;
				}
			}
		}
		Ok(())
	}
}

fn io_kind(kind: RemoteErrorKind) -> io::ErrorKind {
	match kind {
		RemoteErrorKind::NotFound => io::ErrorKind::NotFound,
		RemoteErrorKind::PermissionDenied => io::ErrorKind::PermissionDenied,
		RemoteErrorKind::Other => io::ErrorKind::Other,
	}
}

#[async_trait]
impl<R, W> RemoteSession for ProtocolClient<R, W>
where
	R: AsyncBufRead + Unpin + Send + 'static,
	W: AsyncWrite + Unpin + Send + 'static,
{
	fn target(&self) -> &str {
		&self.target
	}

	async fn list_directory(&mut self, path: &str) -> SessionResult<Vec<RemoteEntry>> {
		self.send(&Request::List { path: path.to_string() }).await?;

		let mut entries = Vec::new();
		loop {
			match self.recv().await? {
				Response::Ent { kind, name } => entries.push(RemoteEntry { name, kind }),
				Response::End => return Ok(entries),
				Response::Err { kind, msg } => return Err(remote_error(path, kind, msg)),
				other => {
					return Err(ProtocolError::ProtocolViolation(format!(
						"unexpected {:?} in listing of {}",
						other, path
					))
					.into())
				}
			}
		}
	}

	async fn open_read<'a>(&'a mut self, path: &str) -> SessionResult<Box<dyn ByteSource + 'a>> {
		self.send(&Request::Read { path: path.to_string() }).await?;

		match self.recv().await? {
			Response::Data { len } => {
				Ok(Box::new(RemoteStream { client: self, remaining: len, finished: len == 0 }))
			}
			Response::Err { kind, msg } => Err(remote_error(path, kind, msg)),
			other => Err(ProtocolError::ProtocolViolation(format!(
				"unexpected {:?} opening {}",
				other, path
			))
			.into()),
		}
	}

	async fn delete_file(&mut self, path: &str) -> SessionResult<()> {
		self.send(&Request::Del { path: path.to_string() }).await?;

		match self.recv().await? {
			Response::Done => Ok(()),
			Response::Err { kind, msg } => Err(remote_error(path, kind, msg)),
			other => Err(SessionError::Protocol(ProtocolError::ProtocolViolation(format!(
				"unexpected {:?} deleting {}",
				other, path
			)))),
		}
	}

	async fn close(&mut self) -> SessionResult<()> {
		self.shutdown().await
	}
}

/// File content arriving as a sequence of DATA frames
struct RemoteStream<'a, R, W> {
	client: &'a mut ProtocolClient<R, W>,
	remaining: usize,
	finished: bool,
}

#[async_trait]
impl<'a, R, W> ByteSource for RemoteStream<'a, R, W>
where
	R: AsyncBufRead + Unpin + Send + 'static,
	W: AsyncWrite + Unpin + Send + 'static,
{
	async fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
		loop {
			if self.finished || buf.is_empty() {
				return Ok(0);
			}

			if self.remaining > 0 {
				let want = buf.len().min(self.remaining);
				let n = self.client.recv_payload(&mut buf[..want]).await?;
				self.remaining -= n;
				return Ok(n);
			}

			match self.client.recv().await? {
				Response::Data { len: 0 } => self.finished = true,
				Response::Data { len } => self.remaining = len,
				Response::Err { kind, msg } => {
					self.finished = true;
					return Err(io::Error::new(io_kind(kind), msg));
				}
				other => {
					self.finished = true;
					return Err(ProtocolError::ProtocolViolation(format!(
						"unexpected {:?} in data stream",
						other
					))
					.into());
				}
			}
		}
	}
}

// vim: ts=4
