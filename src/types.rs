//! Core data model: relative path keys, file records and tree snapshots

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::validation::{self, ValidationError};

/// Canonical path of a file relative to its tree root
///
/// Forward-slash separated, never starts with `/`, never contains `.` or `..`.
/// This is the join key between the local and remote snapshots.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RelativePath(String);

impl RelativePath {
	/// Parse and canonicalize a slash-separated relative path
	pub fn new(raw: &str) -> Result<Self, ValidationError> {
		validation::normalize_relative(raw).map(RelativePath)
	}

	/// Relative path of a single top-level entry
	pub fn from_name(name: &str) -> Result<Self, ValidationError> {
		validation::validate_entry_name(name)?;
		Ok(RelativePath(name.to_string()))
	}

	/// Extend this path by one entry name
	pub fn join(&self, name: &str) -> Result<Self, ValidationError> {
		validation::validate_entry_name(name)?;
		Ok(RelativePath(format!("{}/{}", self.0, name)))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for RelativePath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl TryFrom<String> for RelativePath {
	type Error = ValidationError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		RelativePath::new(&value)
	}
}

impl From<RelativePath> for String {
	fn from(value: RelativePath) -> Self {
		value.0
	}
}

impl AsRef<str> for RelativePath {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

/// Where a scanned file lives on its own side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileLocation {
	Local(PathBuf),
	Remote(String),
}

impl fmt::Display for FileLocation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			FileLocation::Local(path) => write!(f, "{}", path.display()),
			FileLocation::Remote(path) => f.write_str(path),
		}
	}
}

/// One scanned file: content checksum plus its absolute location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
	/// Lowercase hex digest
	pub checksum: String,
	pub location: FileLocation,
}

/// Complete file state of one side at one point in time
pub type TreeSnapshot = BTreeMap<RelativePath, FileRecord>;

/// Type of entry reported by a directory listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
	#[serde(rename = "F")]
	File,
	#[serde(rename = "D")]
	Directory,
	#[serde(rename = "S")]
	SymLink,
}

/// A single entry of a remote directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEntry {
	pub name: String,
	pub kind: EntryKind,
}

impl RemoteEntry {
	pub fn new(name: impl Into<String>, kind: EntryKind) -> Self {
		Self { name: name.into(), kind }
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_relative_path_join() {
		let sub = RelativePath::from_name("sub").unwrap();
		assert_eq!(sub.join("b.txt").unwrap().as_str(), "sub/b.txt");
		assert!(sub.join("..").is_err());
		assert!(sub.join("x/y").is_err());
	}

	#[test]
	fn test_relative_path_canonical_forms_are_equal() {
		let a = RelativePath::new("sub/b.txt").unwrap();
		let b = RelativePath::new("./sub//b.txt").unwrap();
		assert_eq!(a, b);
		assert_ne!(a, RelativePath::new("Sub/b.txt").unwrap());
	}

	#[test]
	fn test_relative_path_serde() {
		let p = RelativePath::new("sub/b.txt").unwrap();
		let json = serde_json::to_string(&p).unwrap();
		assert_eq!(json, "\"sub/b.txt\"");
		let back: RelativePath = serde_json::from_str(&json).unwrap();
		assert_eq!(back, p);
		assert!(serde_json::from_str::<RelativePath>("\"../x\"").is_err());
	}

	#[test]
	fn test_entry_kind_wire_names() {
		assert_eq!(serde_json::to_string(&EntryKind::Directory).unwrap(), "\"D\"");
		let kind: EntryKind = serde_json::from_str("\"S\"").unwrap();
		assert_eq!(kind, EntryKind::SymLink);
	}
}

// vim: ts=4
