//! Snapshot differ
//!
//! Classifies every path of `source ∪ destination` into exactly one of
//! added, deleted, modified or unchanged. Unchanged is derived from the
//! other three and never stored.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::types::{RelativePath, TreeSnapshot};

/// Classification of a single relative path
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Classification {
	/// Only in the source
	Added,
	/// Only in the destination
	Deleted,
	/// In both, content differs
	Modified,
	/// In both, same content
	Unchanged,
}

impl Classification {
	pub const ALL: [Classification; 4] =
		[Classification::Added, Classification::Deleted, Classification::Modified, Classification::Unchanged];
}

impl fmt::Display for Classification {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Classification::Added => write!(f, "added"),
			Classification::Deleted => write!(f, "deleted"),
			Classification::Modified => write!(f, "modified"),
			Classification::Unchanged => write!(f, "unchanged"),
		}
	}
}

/// Added, deleted and modified paths of one comparison
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffResult {
	pub added: BTreeSet<RelativePath>,
	pub deleted: BTreeSet<RelativePath>,
	pub modified: BTreeSet<RelativePath>,
}

/// Compare two snapshots by key set and checksum
pub fn diff(source: &TreeSnapshot, destination: &TreeSnapshot) -> DiffResult {
	let mut result = DiffResult::default();

	for (path, record) in source {
		match destination.get(path) {
			None => {
				result.added.insert(path.clone());
			}
			Some(other) if other.checksum != record.checksum => {
				result.modified.insert(path.clone());
			}
			Some(_) => {}
		}
	}
	for path in destination.keys() {
		if !source.contains_key(path) {
			result.deleted.insert(path.clone());
		}
	}

	result
}

impl DiffResult {
	/// Paths present on both sides with equal checksums
	pub fn unchanged(&self, source: &TreeSnapshot, destination: &TreeSnapshot) -> BTreeSet<RelativePath> {
		source
			.keys()
			.filter(|path| destination.contains_key(*path) && !self.modified.contains(*path))
			.cloned()
			.collect()
	}

	/// Nothing added, deleted or modified
	pub fn is_clean(&self) -> bool {
		self.added.is_empty() && self.deleted.is_empty() && self.modified.is_empty()
	}

	/// Class of a path known to one of the two snapshots
	pub fn classify(&self, path: &RelativePath) -> Classification {
		if self.added.contains(path) {
			Classification::Added
		} else if self.deleted.contains(path) {
			Classification::Deleted
		} else if self.modified.contains(path) {
			Classification::Modified
		} else {
			Classification::Unchanged
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::types::{FileLocation, FileRecord};
	use proptest::prelude::*;

	fn snapshot(files: &[(&str, &str)]) -> TreeSnapshot {
		files
			.iter()
			.map(|(path, checksum)| {
				(
					RelativePath::new(path).unwrap(),
					FileRecord {
						checksum: checksum.to_string(),
						location: FileLocation::Remote(format!("/{}", path)),
					},
				)
			})
			.collect()
	}

	fn set(paths: &[&str]) -> BTreeSet<RelativePath> {
		paths.iter().map(|p| RelativePath::new(p).unwrap()).collect()
	}

	#[test]
	fn test_added_deleted_unchanged() {
		let source = snapshot(&[("a.txt", "h1"), ("sub/b.txt", "h2")]);
		let destination = snapshot(&[("a.txt", "h1"), ("c.txt", "h3")]);

		let result = diff(&source, &destination);
		assert_eq!(result.added, set(&["sub/b.txt"]));
		assert_eq!(result.deleted, set(&["c.txt"]));
		assert!(result.modified.is_empty());
		assert_eq!(result.unchanged(&source, &destination), set(&["a.txt"]));
	}

	#[test]
	fn test_modified() {
		let source = snapshot(&[("a.txt", "h1")]);
		let destination = snapshot(&[("a.txt", "h2")]);

		let result = diff(&source, &destination);
		assert_eq!(result.modified, set(&["a.txt"]));
		assert!(result.added.is_empty() && result.deleted.is_empty());
		assert!(result.unchanged(&source, &destination).is_empty());
		assert_eq!(result.classify(&RelativePath::new("a.txt").unwrap()), Classification::Modified);
	}

	#[test]
	fn test_empty_sides() {
		let empty = TreeSnapshot::new();
		let full = snapshot(&[("a", "1")]);
		assert_eq!(diff(&full, &empty).added, set(&["a"]));
		assert_eq!(diff(&empty, &full).deleted, set(&["a"]));
		assert!(diff(&empty, &empty).is_clean());
	}

	fn snapshot_strategy() -> impl Strategy<Value = TreeSnapshot> {
		prop::collection::btree_map("[a-d]{1,2}(/[a-d]{1,2}){0,2}", "[0-2]", 0..20).prop_map(|files| {
			files
				.into_iter()
				.map(|(path, checksum)| {
					(
						RelativePath::new(&path).unwrap(),
						FileRecord { checksum, location: FileLocation::Remote(path) },
					)
				})
				.collect()
		})
	}

	proptest! {
		#[test]
		fn prop_classes_partition_union(source in snapshot_strategy(), destination in snapshot_strategy()) {
			let result = diff(&source, &destination);
			let unchanged = result.unchanged(&source, &destination);

			prop_assert!(result.added.is_disjoint(&result.deleted));
			prop_assert!(result.added.is_disjoint(&result.modified));
			prop_assert!(result.deleted.is_disjoint(&result.modified));
			prop_assert!(unchanged.is_disjoint(&result.modified));

			let union: BTreeSet<RelativePath> = source.keys().chain(destination.keys()).cloned().collect();
			let total = result.added.len() + result.deleted.len() + result.modified.len() + unchanged.len();
			prop_assert_eq!(total, union.len());
			for path in &union {
				let class = result.classify(path);
				prop_assert_eq!(class == Classification::Unchanged, unchanged.contains(path));
			}
		}

		#[test]
		fn prop_self_diff_is_clean(source in snapshot_strategy()) {
			let result = diff(&source, &source);
			prop_assert!(result.is_clean());
			prop_assert_eq!(result.unchanged(&source, &source).len(), source.len());
		}
	}
}

// vim: ts=4
