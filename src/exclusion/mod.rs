//! Exclusion of paths from both snapshots
//!
//! The same matcher is applied to the local walk and the remote listing, so
//! an excluded path never shows up as added or deleted.

mod patterns;

pub use patterns::PatternMatcher;

use std::error::Error;
use std::fmt;

/// Exclusion errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExclusionError {
	/// Glob pattern failed to compile
	InvalidPattern(String),
}

impl fmt::Display for ExclusionError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ExclusionError::InvalidPattern(msg) => write!(f, "Invalid exclusion pattern: {}", msg),
		}
	}
}

impl Error for ExclusionError {}

// vim: ts=4
