//! Path validation and canonicalization
//!
//! RelativePath keys are compared as plain strings on both sides, so both
//! scanners must produce them through the functions here:
//! forward-slash separated, no leading slash, no `.` or `..` components.
//! Matching is case-sensitive.

use std::path::{Component, Path};

use super::ValidationError;

/// Check if a path is safe (no parent directory references)
pub fn is_path_safe(path: &Path) -> bool {
	!path.components().any(|c| matches!(c, Component::ParentDir))
}

/// Validate a single directory entry name as reported by a listing
///
/// Names must be non-empty, must not be `.` or `..` and must not contain `/`.
pub fn validate_entry_name(name: &str) -> Result<(), ValidationError> {
	if name.is_empty() {
		return Err(ValidationError::PathError("Empty entry name".to_string()));
	}
	if name == "." || name == ".." {
		return Err(ValidationError::PathError(format!("Reserved entry name {:?}", name)));
	}
	if name.contains('/') || name.contains('\0') {
		return Err(ValidationError::PathError(format!("Entry name contains separator: {:?}", name)));
	}
	Ok(())
}

/// Canonicalize a slash-separated relative path string
///
/// Empty and `.` components are dropped, a leading `/` is stripped,
/// `..` is rejected.
pub fn normalize_relative(raw: &str) -> Result<String, ValidationError> {
	let mut parts = Vec::new();
	for part in raw.split('/') {
		match part {
			"" | "." => continue,
			".." => {
				return Err(ValidationError::PathError(format!(
					"Path contains parent directory reference (..): {:?}",
					raw
				)))
			}
			p => parts.push(p),
		}
	}
	if parts.is_empty() {
		return Err(ValidationError::PathError(format!("Path has no components: {:?}", raw)));
	}
	Ok(parts.join("/"))
}

/// Build the canonical relative key for a local path underneath `root`
///
/// Fails for paths outside `root` and for non-UTF-8 names.
pub fn relative_key(path: &Path, root: &Path) -> Result<String, ValidationError> {
	let rel = path.strip_prefix(root).map_err(|_| {
		ValidationError::PathError(format!(
			"Path {:?} is outside root directory {:?}",
			path, root
		))
	})?;
	if !is_path_safe(rel) {
		return Err(ValidationError::PathError(format!(
			"Path contains parent directory reference (..): {:?}",
			rel
		)));
	}

	let mut parts = Vec::new();
	for component in rel.components() {
		match component {
			Component::Normal(name) => {
				let name = name.to_str().ok_or_else(|| {
					ValidationError::PathError(format!("Non UTF-8 file name: {:?}", name))
				})?;
				parts.push(name);
			}
			Component::CurDir => continue,
			other => {
				return Err(ValidationError::PathError(format!(
					"Unexpected path component {:?} in {:?}",
					other, rel
				)))
			}
		}
	}
	if parts.is_empty() {
		return Err(ValidationError::PathError(format!("Path has no components: {:?}", rel)));
	}
	Ok(parts.join("/"))
}

/// Join a remote directory and a relative path with a single `/`
pub fn join_remote(root: &str, relative: &str) -> String {
	let root = root.trim_end_matches('/');
	let relative = relative.trim_start_matches('/');
	if relative.is_empty() {
		if root.is_empty() {
			return "/".to_string();
		}
		return root.to_string();
	}
	format!("{}/{}", root, relative)
}


// vim: ts=4
