//! # treecmp - Content-Based Directory Tree Comparison
//!
//! treecmp compares a local directory tree against the same directory on one
//! or more remote hosts. Every file is fingerprinted by content checksum on
//! both sides and every relative path is classified as added, deleted,
//! modified or unchanged. Remote files that no longer exist locally can be
//! removed after explicit confirmation.
//!
//! Remote hosts are reached by running `treecmp serve` over ssh; a target
//! that is a local directory is compared directly.
//!
//! ## Using the Builder Pattern
//!
//! ```rust,ignore
//! use treecmp::compare::CompareBuilder;
//! use treecmp::output::ConsoleReporter;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let summary = CompareBuilder::new()
//!         .source("./site")
//!         .target("web1.example.com")
//!         .target("web2.example.com")
//!         .remote_root("/srv/www")
//!         .callbacks(Box::new(ConsoleReporter::stdout(true)))
//!         .build()?
//!         .run()
//!         .await?;
//!     println!("{} targets failed", summary.failed_targets().len());
//!     Ok(())
//! }
//! ```
//!
//! ## Using the Core Directly
//!
//! ```rust,ignore
//! use treecmp::diff::diff;
//! use treecmp::scan::{scan_local, ScanOptions};
//!
//! let options = ScanOptions::default();
//! let left = scan_local("./a".as_ref(), &options).await?;
//! let right = scan_local("./b".as_ref(), &options).await?;
//! let result = diff(&left, &right);
//! ```

pub mod callbacks;
pub mod checksum;
pub mod compare;
pub mod config;
pub mod confirm;
pub mod connection;
pub mod delete;
pub mod diff;
pub mod error;
pub mod exclusion;
pub mod logging;
pub mod output;
pub mod protocol;
pub mod scan;
pub mod session;
pub mod strategies;
pub mod types;
pub mod validation;

// Re-export commonly used types and functions
pub use compare::{CompareBuilder, CompareSummary, Comparer};
pub use config::Config;
pub use diff::{diff, Classification, DiffResult};
pub use error::{ChecksumError, CompareError, ConnectionError, ScanError};
pub use types::{FileLocation, FileRecord, RelativePath, TreeSnapshot};

// vim: ts=4
