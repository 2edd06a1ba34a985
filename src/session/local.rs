//! Session backed by a directory of the local filesystem
//!
//! Remote absolute paths are resolved underneath `base`, so a base of `/`
//! gives direct access to the machine this runs on (the `serve` side), and
//! any other base lets a local directory stand in for a remote host.

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

use super::{RemoteSession, SessionError, SessionResult};
use crate::checksum::{ByteSource, ReaderSource};
use crate::error::ConnectionError;
use crate::types::{EntryKind, RemoteEntry};

pub struct LocalSession {
	target: String,
	base: PathBuf,
}

impl LocalSession {
	/// Create a session without checking the base directory
	pub fn new(target: impl Into<String>, base: impl Into<PathBuf>) -> Self {
		Self { target: target.into(), base: base.into() }
	}

	/// Create a session after checking that `base` is a readable directory
	pub async fn open(target: impl Into<String>, base: impl Into<PathBuf>) -> Result<Self, ConnectionError> {
		let base = base.into();
		let meta = tokio::fs::metadata(&base)
			.await
			.map_err(|e| ConnectionError::LocalRoot { path: base.clone(), source: e })?;
		if !meta.is_dir() {
			return Err(ConnectionError::LocalRoot {
				path: base,
				source: std::io::Error::new(std::io::ErrorKind::Other, "not a directory"),
			});
		}
		Ok(Self::new(target, base))
	}

	pub fn base(&self) -> &Path {
		&self.base
	}

	/// Map a remote absolute path below `base`
	fn resolve(&self, remote_path: &str) -> SessionResult<PathBuf> {
		let relative = Path::new(remote_path.trim_start_matches('/'));
		if relative.components().any(|c| matches!(c, Component::ParentDir)) {
			return Err(SessionError::Remote {
				path: remote_path.to_string(),
				message: "path contains parent directory reference (..)".to_string(),
			});
		}
		Ok(self.base.join(relative))
	}
}

#[async_trait]
impl RemoteSession for LocalSession {
	fn target(&self) -> &str {
		&self.target
	}

	async fn list_directory(&mut self, path: &str) -> SessionResult<Vec<RemoteEntry>> {
		let dir = self.resolve(path)?;
		let mut reader = tokio::fs::read_dir(&dir).await.map_err(|e| SessionError::from_io(path, e))?;

		let mut entries = Vec::new();
		while let Some(entry) = reader.next_entry().await.map_err(|e| SessionError::from_io(path, e))? {
			let name = entry.file_name().into_string().map_err(|name| SessionError::Remote {
				path: path.to_string(),
				message: format!("Non UTF-8 file name: {:?}", name),
			})?;
			let file_type = entry.file_type().await.map_err(|e| SessionError::from_io(path, e))?;

			let kind = if file_type.is_symlink() {
				EntryKind::SymLink
			} else if file_type.is_dir() {
				EntryKind::Directory
			} else if file_type.is_file() {
				EntryKind::File
			} else {
				debug!("Skipping special file {}/{}", path, name);
				continue;
			};
			entries.push(RemoteEntry { name, kind });
		}

		entries.sort_by(|a, b| a.name.cmp(&b.name));
		Ok(entries)
	}

	async fn open_read<'a>(&'a mut self, path: &str) -> SessionResult<Box<dyn ByteSource + 'a>> {
		let file = tokio::fs::File::open(self.resolve(path)?)
			.await
			.map_err(|e| SessionError::from_io(path, e))?;
		Ok(Box::new(ReaderSource::new(file)))
	}

	async fn delete_file(&mut self, path: &str) -> SessionResult<()> {
		tokio::fs::remove_file(self.resolve(path)?).await.map_err(|e| SessionError::from_io(path, e))
	}

	async fn close(&mut self) -> SessionResult<()> {
		Ok(())
	}
}


// vim: ts=4
