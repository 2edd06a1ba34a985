//! Local tree scanner

use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::ScanOptions;
use crate::checksum::checksum_file;
use crate::error::ScanError;
use crate::exclusion::PatternMatcher;
use crate::types::{FileLocation, FileRecord, RelativePath, TreeSnapshot};
use crate::validation;

/// Hash every regular file below `root`
///
/// Fails if `root` is not a readable directory or if any file cannot be
/// read; a partial snapshot is never returned.
pub async fn scan_local(root: &Path, options: &ScanOptions) -> Result<TreeSnapshot, ScanError> {
	let meta = tokio::fs::metadata(root).await.map_err(|e| ScanError::Root {
		path: root.display().to_string(),
		message: e.to_string(),
	})?;
	if !meta.is_dir() {
		return Err(ScanError::Root {
			path: root.display().to_string(),
			message: "not a directory".to_string(),
		});
	}

	let walk_root = root.to_path_buf();
	let exclusions = options.exclusions.clone();
	let files = tokio::task::spawn_blocking(move || collect_files(&walk_root, &exclusions))
		.await
		.map_err(|e| ScanError::Walk { path: root.display().to_string(), message: e.to_string() })??;

	let mut snapshot = TreeSnapshot::new();
	for (relative, path) in files {
		let checksum = checksum_file(&path, options.algorithm).await?;
		debug!("{} {}", checksum, relative);
		snapshot.insert(relative, FileRecord { checksum, location: FileLocation::Local(path) });
	}

	info!("Scanned {} local files in {}", snapshot.len(), root.display());
	Ok(snapshot)
}

/// Enumerate regular files, skipping symlinks, special files and exclusions
fn collect_files(root: &Path, exclusions: &PatternMatcher) -> Result<Vec<(RelativePath, PathBuf)>, ScanError> {
	let filter_root = root.to_path_buf();
	let filter = exclusions.clone();

	let mut builder = WalkBuilder::new(root);
	builder
		.standard_filters(false)
		.hidden(false)
		.follow_links(false)
		.filter_entry(move |entry| {
			if entry.depth() == 0 {
				return true;
			}
			match validation::relative_key(entry.path(), &filter_root) {
				Ok(key) if filter.is_excluded(&key) => {
					debug!("Excluded {}", key);
					false
				}
				_ => true,
			}
		});

	let mut files = Vec::new();
	for result in builder.build() {
		let entry = result.map_err(|e| ScanError::Walk {
			path: root.display().to_string(),
			message: e.to_string(),
		})?;

		let Some(file_type) = entry.file_type() else {
			continue;
		};
		if file_type.is_dir() {
			continue;
		}
		if file_type.is_symlink() {
			debug!("Skipping symlink {}", entry.path().display());
			continue;
		}
		if !file_type.is_file() {
			debug!("Skipping special file {}", entry.path().display());
			continue;
		}

		let key = validation::relative_key(entry.path(), root).map_err(|e| ScanError::InvalidPath {
			path: entry.path().display().to_string(),
			message: e.to_string(),
		})?;
		let relative = RelativePath::new(&key).map_err(|e| ScanError::InvalidPath {
			path: entry.path().display().to_string(),
			message: e.to_string(),
		})?;
		files.push((relative, entry.into_path()));
	}

	Ok(files)
}


// vim: ts=4
