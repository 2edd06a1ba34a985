//! Tree scanners
//!
//! Both scanners produce a [`TreeSnapshot`](crate::types::TreeSnapshot) keyed
//! by canonical [`RelativePath`](crate::types::RelativePath), so a local and a
//! remote snapshot can be diffed directly. Symlinks and special files are
//! skipped on both sides; excluded directories are not descended into.

mod local;
mod remote;

pub use local::scan_local;
pub use remote::scan_remote;

use crate::exclusion::PatternMatcher;
use crate::strategies::ChecksumAlgorithm;

/// Settings shared by the local and the remote scan
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
	pub algorithm: ChecksumAlgorithm,
	pub exclusions: PatternMatcher,
}

impl ScanOptions {
	pub fn new(algorithm: ChecksumAlgorithm, exclusions: PatternMatcher) -> Self {
		Self { algorithm, exclusions }
	}
}

// vim: ts=4
