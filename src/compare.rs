//! Per-target comparison orchestration
//!
//! The local tree is scanned once; every target is then compared against
//! that snapshot in order. A target that fails is reported and skipped, the
//! remaining targets still run. The session of a target is closed whatever
//! happened while it was in use.

use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::{error, info, warn};

use crate::callbacks::{CompareCallbacks, NoCallbacks, TargetStats};
use crate::config::{Config, SshConfig};
use crate::confirm::{DeletionConfirmer, PromptConfirmer};
use crate::connection::{Connector, Credential, SshConnector};
use crate::delete::{compute_deletion_plan, execute_deletion, DeleteProtection, DeletionReport};
use crate::diff::{diff, Classification, DiffResult};
use crate::error::CompareError;
use crate::exclusion::PatternMatcher;
use crate::scan::{scan_local, scan_remote, ScanOptions};
use crate::session::RemoteSession;
use crate::strategies::ChecksumAlgorithm;
use crate::types::{RelativePath, TreeSnapshot};
use crate::validation;

/// What happened to the deleted set of a target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletionStatus {
	/// Auto-delete is off
	NotRequested,
	/// Nothing on the target is missing locally
	NothingToDelete,
	/// Protection limits rejected the plan
	Refused { reason: String },
	/// The operator said no
	Declined,
	Executed(DeletionReport),
}

/// Result of a successfully compared target
#[derive(Debug, Clone)]
pub struct TargetReport {
	pub diff: DiffResult,
	pub unchanged: BTreeSet<RelativePath>,
	pub stats: TargetStats,
	pub deletion: DeletionStatus,
}

impl TargetReport {
	/// No refused plan and no failed deletion
	pub fn is_success(&self) -> bool {
		match &self.deletion {
			DeletionStatus::Refused { .. } => false,
			DeletionStatus::Executed(report) => report.is_success(),
			_ => true,
		}
	}
}

/// Outcome of one target
#[derive(Debug)]
pub struct TargetOutcome {
	pub target: String,
	pub result: Result<TargetReport, CompareError>,
}

/// Outcome of a whole run
#[derive(Debug)]
pub struct CompareSummary {
	/// Files in the local snapshot
	pub local_files: usize,
	pub targets: Vec<TargetOutcome>,
}

impl CompareSummary {
	pub fn failed_targets(&self) -> Vec<&str> {
		self.targets
			.iter()
			.filter(|t| !matches!(&t.result, Ok(report) if report.is_success()))
			.map(|t| t.target.as_str())
			.collect()
	}

	pub fn is_success(&self) -> bool {
		self.failed_targets().is_empty()
	}
}

/// Compares one local tree against a list of targets
pub struct Comparer {
	source: PathBuf,
	targets: Vec<String>,
	remote_root: String,
	options: ScanOptions,
	auto_delete: bool,
	protection: DeleteProtection,
	connector: Box<dyn Connector>,
	confirmer: Box<dyn DeletionConfirmer>,
	callbacks: Box<dyn CompareCallbacks>,
}

impl Comparer {
	/// Scan the local tree, then compare every target in order
	///
	/// Only a failed local scan is an error here; target failures end up in
	/// the summary.
	pub async fn run(&self) -> Result<CompareSummary, CompareError> {
		let local = scan_local(&self.source, &self.options).await?;
		info!("Local snapshot of {}: {} files", self.source.display(), local.len());

		let mut targets = Vec::with_capacity(self.targets.len());
		for target in &self.targets {
			self.callbacks.on_target_start(target);
			let result = self.compare_target(target, &local).await;
			if let Err(e) = &result {
				error!("{}: {}", target, e);
				self.callbacks.on_target_error(target, e);
			}
			targets.push(TargetOutcome { target: target.clone(), result });
		}

		Ok(CompareSummary { local_files: local.len(), targets })
	}

	async fn compare_target(&self, target: &str, local: &TreeSnapshot) -> Result<TargetReport, CompareError> {
		let mut session = self.connector.connect(target).await?;
		let result = self.compare_with_session(session.as_mut(), target, local).await;
		if let Err(e) = session.close().await {
			warn!("{}: closing session failed: {}", target, e);
		}
		result
	}

	async fn compare_with_session<S: RemoteSession + ?Sized>(
		&self,
		session: &mut S,
		target: &str,
		local: &TreeSnapshot,
	) -> Result<TargetReport, CompareError> {
		let remote = scan_remote(session, &self.remote_root, &self.options).await?;
		let result = diff(local, &remote);
		let unchanged = result.unchanged(local, &remote);

		let stats = TargetStats {
			added: result.added.len(),
			deleted: result.deleted.len(),
			modified: result.modified.len(),
			unchanged: unchanged.len(),
		};
		for class in Classification::ALL {
			let paths = match class {
				Classification::Added => &result.added,
				Classification::Deleted => &result.deleted,
				Classification::Modified => &result.modified,
				Classification::Unchanged => &unchanged,
			};
			self.callbacks.on_class_start(target, class, paths.len());
			for path in paths {
				self.callbacks.on_entry(target, class, path);
			}
		}
		self.callbacks.on_target_summary(target, &stats);
		info!(
			"{}: {} added, {} deleted, {} modified, {} unchanged",
			target, stats.added, stats.deleted, stats.modified, stats.unchanged
		);

		let deletion = self.remediate(session, target, &result, &remote).await?;
		Ok(TargetReport { diff: result, unchanged, stats, deletion })
	}

	async fn remediate<S: RemoteSession + ?Sized>(
		&self,
		session: &mut S,
		target: &str,
		result: &DiffResult,
		remote: &TreeSnapshot,
	) -> Result<DeletionStatus, CompareError> {
		if !self.auto_delete {
			return Ok(DeletionStatus::NotRequested);
		}
		if result.deleted.is_empty() {
			return Ok(DeletionStatus::NothingToDelete);
		}

		let plan = compute_deletion_plan(result, remote, &self.remote_root);
		if let Err(reason) = plan.check(&self.protection) {
			warn!("{}: {}", target, reason);
			self.callbacks.on_deletion_refused(target, &reason);
			return Ok(DeletionStatus::Refused { reason });
		}

		if !self.confirmer.confirm(target, plan.len())? {
			info!("{}: deletion of {} files declined", target, plan.len());
			self.callbacks.on_deletion_declined(target, plan.len());
			return Ok(DeletionStatus::Declined);
		}

		let report = execute_deletion(session, &plan).await;
		for (path, outcome) in &report.outcomes {
			self.callbacks.on_deletion(target, path, outcome);
		}
		info!(
			"{}: {} deleted, {} already gone, {} failed",
			target,
			report.deleted(),
			report.not_found(),
			report.failed()
		);
		Ok(DeletionStatus::Executed(report))
	}
}

/// Builder for [`Comparer`]
pub struct CompareBuilder {
	source: Option<PathBuf>,
	targets: Vec<String>,
	remote_root: String,
	algorithm: ChecksumAlgorithm,
	exclude_patterns: Vec<String>,
	auto_delete: bool,
	protection: DeleteProtection,
	connector: Option<Box<dyn Connector>>,
	confirmer: Option<Box<dyn DeletionConfirmer>>,
	callbacks: Option<Box<dyn CompareCallbacks>>,
}

impl CompareBuilder {
	pub fn new() -> Self {
		CompareBuilder {
			source: None,
			targets: Vec::new(),
			remote_root: String::new(),
			algorithm: ChecksumAlgorithm::default(),
			exclude_patterns: Vec::new(),
			auto_delete: false,
			protection: DeleteProtection::disabled(),
			connector: None,
			confirmer: None,
			callbacks: None,
		}
	}

	/// Builder preloaded from a configuration, with an ssh connector
	pub fn from_config(config: &Config) -> Self {
		let mut builder = Self::new()
			.targets(config.targets.iter().cloned())
			.remote_root(&config.remote_root)
			.algorithm(config.algorithm)
			.exclude_patterns(config.exclude_patterns.clone())
			.auto_delete(config.auto_delete)
			.protection(DeleteProtection::new(config.max_delete_count, config.max_delete_percent))
			.connector(SshConnector::from_config(config));
		if let Some(source) = &config.source {
			builder = builder.source(source.clone());
		}
		builder
	}

	pub fn source(mut self, source: impl Into<PathBuf>) -> Self {
		self.source = Some(source.into());
		self
	}

	pub fn target(mut self, target: impl Into<String>) -> Self {
		self.targets.push(target.into());
		self
	}

	pub fn targets<I, T>(mut self, targets: I) -> Self
	where
		I: IntoIterator<Item = T>,
		T: Into<String>,
	{
		self.targets.extend(targets.into_iter().map(Into::into));
		self
	}

	pub fn remote_root(mut self, root: impl Into<String>) -> Self {
		self.remote_root = root.into();
		self
	}

	pub fn algorithm(mut self, algorithm: ChecksumAlgorithm) -> Self {
		self.algorithm = algorithm;
		self
	}

	pub fn exclude_patterns(mut self, patterns: Vec<String>) -> Self {
		self.exclude_patterns = patterns;
		self
	}

	pub fn auto_delete(mut self, enabled: bool) -> Self {
		self.auto_delete = enabled;
		self
	}

	pub fn protection(mut self, protection: DeleteProtection) -> Self {
		self.protection = protection;
		self
	}

	pub fn connector(mut self, connector: impl Connector + 'static) -> Self {
		self.connector = Some(Box::new(connector));
		self
	}

	pub fn confirmer(mut self, confirmer: impl DeletionConfirmer + 'static) -> Self {
		self.confirmer = Some(Box::new(confirmer));
		self
	}

	pub fn callbacks(mut self, callbacks: Box<dyn CompareCallbacks>) -> Self {
		self.callbacks = Some(callbacks);
		self
	}

	pub fn build(self) -> Result<Comparer, CompareError> {
		let invalid = |message: String| CompareError::InvalidConfig { message };

		let source = self.source.ok_or_else(|| invalid("no source directory given".to_string()))?;
		if self.targets.is_empty() {
			return Err(invalid("no targets given".to_string()));
		}
		validation::validate_remote_root(&self.remote_root).map_err(|e| invalid(e.to_string()))?;
		let exclusions = PatternMatcher::new(&self.exclude_patterns).map_err(|e| invalid(e.to_string()))?;

		Ok(Comparer {
			source,
			targets: self.targets,
			remote_root: self.remote_root,
			options: ScanOptions::new(self.algorithm, exclusions),
			auto_delete: self.auto_delete,
			protection: self.protection,
			connector: self.connector.unwrap_or_else(|| {
				Box::new(SshConnector::new(None, Credential::Default, SshConfig::default()))
			}),
			confirmer: self.confirmer.unwrap_or_else(|| Box::new(PromptConfirmer)),
			callbacks: self.callbacks.unwrap_or_else(|| Box::new(NoCallbacks)),
		})
	}
}

impl Default for CompareBuilder {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_build_requires_source_targets_and_root() {
		assert!(CompareBuilder::new().target("web1").remote_root("/srv").build().is_err());
		assert!(CompareBuilder::new().source("/data").remote_root("/srv").build().is_err());
		assert!(CompareBuilder::new().source("/data").target("web1").remote_root("srv").build().is_err());
		assert!(CompareBuilder::new().source("/data").target("web1").remote_root("/srv").build().is_ok());
	}

	#[test]
	fn test_build_rejects_bad_pattern() {
		let result = CompareBuilder::new()
			.source("/data")
			.target("web1")
			.remote_root("/srv")
			.exclude_patterns(vec!["[".to_string()])
			.build();
		assert!(matches!(result, Err(CompareError::InvalidConfig { .. })));
	}

	#[test]
	fn test_from_config() {
		let config = Config {
			source: Some(PathBuf::from("/data")),
			targets: vec!["a".to_string(), "b".to_string()],
			remote_root: "/srv".to_string(),
			max_delete_count: Some(3),
			..Config::default()
		};
		let comparer = CompareBuilder::from_config(&config).build().unwrap();
		assert_eq!(comparer.targets, vec!["a", "b"]);
		assert_eq!(comparer.protection.max_delete_count, Some(3));
	}
}

// vim: ts=4
