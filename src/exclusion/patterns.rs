//! Pattern-based path exclusion using glob patterns

use super::ExclusionError;
use globset::{Glob, GlobSet, GlobSetBuilder};

/// Matches canonical relative paths against user supplied globs
///
/// `*` crosses directory separators, so `*.tmp` excludes `sub/x.tmp`.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
	exclude_set: GlobSet,
	patterns: Vec<String>,
}

impl PatternMatcher {
	/// Compile the given patterns
	pub fn new(exclude_patterns: &[String]) -> Result<Self, ExclusionError> {
		let mut builder = GlobSetBuilder::new();
		for pattern in exclude_patterns {
			let glob = Glob::new(pattern)
				.map_err(|e| ExclusionError::InvalidPattern(format!("{}: {}", pattern, e)))?;
			builder.add(glob);
		}
		let exclude_set = builder.build().map_err(|e| {
			ExclusionError::InvalidPattern(format!("Failed to build pattern set: {}", e))
		})?;

		Ok(Self { exclude_set, patterns: exclude_patterns.to_vec() })
	}

	/// Matcher that excludes nothing
	pub fn empty() -> Self {
		Self { exclude_set: GlobSet::empty(), patterns: Vec::new() }
	}

	/// Check a canonical relative path
	pub fn is_excluded(&self, relative: &str) -> bool {
		!self.patterns.is_empty() && self.exclude_set.is_match(relative)
	}

	pub fn patterns(&self) -> &[String] {
		&self.patterns
	}
}

impl Default for PatternMatcher {
	fn default() -> Self {
		Self::empty()
	}
}


// vim: ts=4
