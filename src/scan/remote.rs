//! Remote tree scanner

use std::future::Future;
use std::pin::Pin;
use tracing::{debug, info};

use super::ScanOptions;
use crate::checksum::checksum;
use crate::error::{ChecksumError, ScanError};
use crate::session::RemoteSession;
use crate::types::{EntryKind, FileLocation, FileRecord, RelativePath, TreeSnapshot};
use crate::validation;

type WalkFuture<'a> = Pin<Box<dyn Future<Output = Result<(), ScanError>> + Send + 'a>>;

/// Depth-first scan of `root` on a target
///
/// Any failed listing or read aborts the whole scan.
pub async fn scan_remote<S>(session: &mut S, root: &str, options: &ScanOptions) -> Result<TreeSnapshot, ScanError>
where
	S: RemoteSession + ?Sized,
{
	let mut snapshot = TreeSnapshot::new();
	walk(session, root, None, options, &mut snapshot).await?;
	info!("Scanned {} files in {}:{}", snapshot.len(), session.target(), root);
	Ok(snapshot)
}

/// Scan one directory; `prefix` is the relative path of `dir` (None at the root)
fn walk<'a, S>(
	session: &'a mut S,
	dir: &'a str,
	prefix: Option<&'a RelativePath>,
	options: &'a ScanOptions,
	snapshot: &'a mut TreeSnapshot,
) -> WalkFuture<'a>
where
	S: RemoteSession + ?Sized,
{
	Box::pin(async move {
		let entries = session
			.list_directory(dir)
			.await
			.map_err(|e| ScanError::Listing { path: dir.to_string(), source: e })?;

		for entry in entries {
			let remote_path = validation::join_remote(dir, &entry.name);
			let relative = match prefix {
				Some(parent) => parent.join(&entry.name),
				None => RelativePath::from_name(&entry.name),
			}
			.map_err(|e| ScanError::InvalidPath { path: remote_path.clone(), message: e.to_string() })?;

			if options.exclusions.is_excluded(relative.as_str()) {
				debug!("Excluded {}", relative);
				continue;
			}

			match entry.kind {
				EntryKind::SymLink => debug!("Skipping symlink {}", remote_path),
				EntryKind::Directory => {
					walk(&mut *session, &remote_path, Some(&relative), options, &mut *snapshot).await?;
				}
				EntryKind::File => {
					let checksum = {
						let mut source = session
							.open_read(&remote_path)
							.await
							.map_err(|e| ScanError::Open { path: remote_path.clone(), source: e })?;
						checksum(source.as_mut(), options.algorithm)
							.await
							.map_err(|e| ChecksumError::Read { path: remote_path.clone(), source: e })?
					};
					debug!("{} {}", checksum, relative);
					snapshot.insert(relative, FileRecord { checksum, location: FileLocation::Remote(remote_path) });
				}
			}
		}
		Ok(())
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::checksum::{checksum_bytes, ByteSource, ReaderSource};
	use crate::exclusion::PatternMatcher;
	use crate::session::{SessionError, SessionResult};
	use crate::strategies::ChecksumAlgorithm;
	use crate::types::RemoteEntry;
	use async_trait::async_trait;
	use std::collections::HashMap;

	/// In-memory target: directories map to listings, files to content
	#[derive(Default)]
	struct FakeSession {
		dirs: HashMap<String, Vec<RemoteEntry>>,
		files: HashMap<String, Vec<u8>>,
		fail_read: Option<String>,
	}

	#[async_trait]
	impl RemoteSession for FakeSession {
		fn target(&self) -> &str {
			"fake"
		}

		async fn list_directory(&mut self, path: &str) -> SessionResult<Vec<RemoteEntry>> {
			self.dirs.get(path).cloned().ok_or(SessionError::NotFound { path: path.to_string() })
		}

		async fn open_read<'a>(&'a mut self, path: &str) -> SessionResult<Box<dyn ByteSource + 'a>> {
			if self.fail_read.as_deref() == Some(path) {
				return Err(SessionError::PermissionDenied { path: path.to_string() });
			}
			let data = self.files.get(path).ok_or(SessionError::NotFound { path: path.to_string() })?;
			Ok(Box::new(ReaderSource::new(&data[..])))
		}

		async fn delete_file(&mut self, path: &str) -> SessionResult<()> {
			self.files.remove(path).map(|_| ()).ok_or(SessionError::NotFound { path: path.to_string() })
		}

		async fn close(&mut self) -> SessionResult<()> {
			Ok(())
		}
	}

	fn sample() -> FakeSession {
		let mut session = FakeSession::default();
		session.dirs.insert(
			"/srv".to_string(),
			vec![
				RemoteEntry::new("a.txt", EntryKind::File),
				RemoteEntry::new("link", EntryKind::SymLink),
				RemoteEntry::new("sub", EntryKind::Directory),
			],
		);
		session.dirs.insert("/srv/sub".to_string(), vec![RemoteEntry::new("b.txt", EntryKind::File)]);
		session.files.insert("/srv/a.txt".to_string(), b"hi".to_vec());
		session.files.insert("/srv/sub/b.txt".to_string(), b"x".to_vec());
		session
	}

	#[tokio::test]
	async fn test_scan_builds_relative_keys() {
		let mut session = sample();
		let snapshot = scan_remote(&mut session, "/srv", &ScanOptions::default()).await.unwrap();

		let keys: Vec<&str> = snapshot.keys().map(|k| k.as_str()).collect();
		assert_eq!(keys, vec!["a.txt", "sub/b.txt"]);

		let b = &snapshot[&RelativePath::new("sub/b.txt").unwrap()];
		assert_eq!(b.location, FileLocation::Remote("/srv/sub/b.txt".to_string()));
		assert_eq!(b.checksum, checksum_bytes(b"x", ChecksumAlgorithm::Sha256));
	}

	#[tokio::test]
	async fn test_repeated_scans_do_not_share_state() {
		let mut session = sample();
		let first = scan_remote(&mut session, "/srv/sub", &ScanOptions::default()).await.unwrap();
		let second = scan_remote(&mut session, "/srv/sub", &ScanOptions::default()).await.unwrap();
		assert_eq!(first, second);
		assert!(first.contains_key(&RelativePath::new("b.txt").unwrap()));
	}

	#[tokio::test]
	async fn test_read_failure_aborts_scan() {
		let mut session = sample();
		session.fail_read = Some("/srv/sub/b.txt".to_string());
		let err = scan_remote(&mut session, "/srv", &ScanOptions::default()).await.unwrap_err();
		assert!(matches!(err, ScanError::Open { .. }));
	}

	#[tokio::test]
	async fn test_missing_root_is_listing_error() {
		let mut session = sample();
		let err = scan_remote(&mut session, "/nope", &ScanOptions::default()).await.unwrap_err();
		assert!(matches!(err, ScanError::Listing { .. }));
	}

	#[tokio::test]
	async fn test_excluded_directory_not_listed() {
		let mut session = sample();
		session.dirs.remove("/srv/sub");
		let exclusions = PatternMatcher::new(&["sub".to_string()]).unwrap();
		let options = ScanOptions::new(ChecksumAlgorithm::Sha256, exclusions);
		let snapshot = scan_remote(&mut session, "/srv", &options).await.unwrap();
		assert_eq!(snapshot.len(), 1);
	}
}

// vim: ts=4
