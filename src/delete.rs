//! Guarded remote deletion
//!
//! Deletion is two-phase: [`compute_deletion_plan`] turns a diff into the set
//! of doomed paths, and [`execute_deletion`] removes them. Asking the operator
//! happens in between and is the caller's business.

use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{error, info};

use crate::diff::DiffResult;
use crate::session::RemoteSession;
use crate::types::{RelativePath, TreeSnapshot};
use crate::validation;

/// Limits a deletion plan must stay within
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteProtection {
	/// Maximum number of files to delete on one target (None = unlimited)
	pub max_delete_count: Option<usize>,

	/// Maximum percentage of the target's files to delete (0-100, None = unlimited)
	pub max_delete_percent: Option<u8>,
}

impl DeleteProtection {
	pub fn new(max_delete_count: Option<usize>, max_delete_percent: Option<u8>) -> Self {
		Self { max_delete_count, max_delete_percent }
	}

	/// No limits
	pub fn disabled() -> Self {
		Self::default()
	}

	pub fn is_enabled(&self) -> bool {
		self.max_delete_count.is_some() || self.max_delete_percent.is_some()
	}

	/// Check if deleting `delete_count` of `total_files` is allowed
	///
	/// Returns Err with the reason if not.
	pub fn check_allowed(&self, delete_count: usize, total_files: usize) -> Result<(), String> {
		if let Some(max_count) = self.max_delete_count {
			if delete_count > max_count {
				return Err(format!(
					"Deletion limit exceeded: {} files to delete, but max is {}",
					delete_count, max_count
				));
			}
		}

		if let Some(max_percent) = self.max_delete_percent {
			if total_files > 0 {
				// compare without rounding: count/total > max/100
				if delete_count * 100 > max_percent as usize * total_files {
					return Err(format!(
						"Deletion percentage limit exceeded: {} of {} files ({}%), but max is {}%",
						delete_count,
						total_files,
						(delete_count * 100) / total_files,
						max_percent
					));
				}
			}
		}

		Ok(())
	}
}

/// Files to remove from one target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionPlan {
	paths: BTreeSet<RelativePath>,
	remote_root: String,
	destination_total: usize,
}

/// Plan removal of every path the destination has and the source lacks
pub fn compute_deletion_plan(diff: &DiffResult, destination: &TreeSnapshot, remote_root: &str) -> DeletionPlan {
	DeletionPlan {
		paths: diff.deleted.clone(),
		remote_root: remote_root.to_string(),
		destination_total: destination.len(),
	}
}

impl DeletionPlan {
	pub fn len(&self) -> usize {
		self.paths.len()
	}

	pub fn is_empty(&self) -> bool {
		self.paths.is_empty()
	}

	pub fn paths(&self) -> &BTreeSet<RelativePath> {
		&self.paths
	}

	pub fn remote_root(&self) -> &str {
		&self.remote_root
	}

	/// Number of files on the target when the plan was made
	pub fn destination_total(&self) -> usize {
		self.destination_total
	}

	/// Check the plan against protection limits
	pub fn check(&self, protection: &DeleteProtection) -> Result<(), String> {
		protection.check_allowed(self.len(), self.destination_total)
	}
}

/// Result of deleting one path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum DeleteOutcome {
	Deleted,
	/// Already gone when we got there
	NotFound,
	Failed { message: String },
}

/// Per-path outcomes of a remediation run, in path order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionReport {
	pub outcomes: Vec<(RelativePath, DeleteOutcome)>,
}

impl DeletionReport {
	fn count(&self, pred: impl Fn(&DeleteOutcome) -> bool) -> usize {
		self.outcomes.iter().filter(|(_, outcome)| pred(outcome)).count()
	}

	pub fn deleted(&self) -> usize {
		self.count(|o| matches!(o, DeleteOutcome::Deleted))
	}

	pub fn not_found(&self) -> usize {
		self.count(|o| matches!(o, DeleteOutcome::NotFound))
	}

	pub fn failed(&self) -> usize {
		self.count(|o| matches!(o, DeleteOutcome::Failed { .. }))
	}

	/// No path failed (missing files do not count as failures)
	pub fn is_success(&self) -> bool {
		self.failed() == 0
	}
}

/// Remove every path of a confirmed plan
pub async fn execute_deletion<S>(session: &mut S, plan: &DeletionPlan) -> DeletionReport
where
	S: RemoteSession + ?Sized,
{
	delete_remote(session, &plan.paths, &plan.remote_root).await
}

/// Remove `remote_root/path` for each path, continuing past failures
pub async fn delete_remote<S>(session: &mut S, paths: &BTreeSet<RelativePath>, remote_root: &str) -> DeletionReport
where
	S: RemoteSession + ?Sized,
{
	let mut report = DeletionReport::default();

	for path in paths {
		let remote_path = validation::join_remote(remote_root, path.as_str());
		let outcome = match session.delete_file(&remote_path).await {
			Ok(()) => {
				info!("{}: deleted {}", session.target(), remote_path);
				DeleteOutcome::Deleted
			}
			Err(e) if e.is_not_found() => {
				info!("{}: {} already gone", session.target(), remote_path);
				DeleteOutcome::NotFound
			}
			Err(e) => {
				error!("{}: failed to delete {}: {}", session.target(), remote_path, e);
				DeleteOutcome::Failed { message: e.to_string() }
			}
		};
		report.outcomes.push((path.clone(), outcome));
	}

	report
}


// vim: ts=4
