//! Callback traits for comparison reporting
//!
//! The comparison engine never prints; every result goes through a
//! [`CompareCallbacks`] implementation chosen by the caller.

use serde::Serialize;

use crate::delete::DeleteOutcome;
use crate::diff::Classification;
use crate::error::CompareError;
use crate::types::RelativePath;

// Type aliases to reduce complexity
type EntryFn = dyn Fn(&str, Classification, &RelativePath) + Send + Sync;
type SummaryFn = dyn Fn(&str, &TargetStats) + Send + Sync;
type ErrorFn = dyn Fn(&str, &CompareError) + Send + Sync;
type DeletionFn = dyn Fn(&str, &RelativePath, &DeleteOutcome) + Send + Sync;

/// Number of paths per classification for one target
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TargetStats {
	pub added: usize,
	pub deleted: usize,
	pub modified: usize,
	pub unchanged: usize,
}

impl TargetStats {
	pub fn get(&self, class: Classification) -> usize {
		match class {
			Classification::Added => self.added,
			Classification::Deleted => self.deleted,
			Classification::Modified => self.modified,
			Classification::Unchanged => self.unchanged,
		}
	}
}

/// Combined callback handler for all comparison events
pub trait CompareCallbacks: Send + Sync {
	/// Called before a target is connected
	fn on_target_start(&self, _target: &str) {}

	/// Called before the entries of one classification are reported
	fn on_class_start(&self, _target: &str, _class: Classification, _count: usize) {}

	/// Called once per classified path
	fn on_entry(&self, _target: &str, _class: Classification, _path: &RelativePath) {}

	/// Called after all entries of a target were reported
	fn on_target_summary(&self, _target: &str, _stats: &TargetStats) {}

	/// Called when a target could not be compared
	fn on_target_error(&self, _target: &str, _error: &CompareError) {}

	/// Called when protection limits refuse a deletion plan
	fn on_deletion_refused(&self, _target: &str, _reason: &str) {}

	/// Called when the operator declines a deletion plan
	fn on_deletion_declined(&self, _target: &str, _count: usize) {}

	/// Called once per path of an executed deletion plan
	fn on_deletion(&self, _target: &str, _path: &RelativePath, _outcome: &DeleteOutcome) {}
}

/// Default callback implementation that does nothing
pub struct NoCallbacks;

impl CompareCallbacks for NoCallbacks {}

/// Builder for callbacks using function closures
pub struct CallbackBuilder {
	entry: Option<Box<EntryFn>>,
	summary: Option<Box<SummaryFn>>,
	error: Option<Box<ErrorFn>>,
	deletion: Option<Box<DeletionFn>>,
}

impl CallbackBuilder {
	/// Create a new callback builder
	pub fn new() -> Self {
		CallbackBuilder { entry: None, summary: None, error: None, deletion: None }
	}

	/// Set classified path callback
	pub fn on_entry<F>(mut self, callback: F) -> Self
	where
		F: Fn(&str, Classification, &RelativePath) + Send + Sync + 'static,
	{
		self.entry = Some(Box::new(callback));
		self
	}

	/// Set per target summary callback
	pub fn on_target_summary<F>(mut self, callback: F) -> Self
	where
		F: Fn(&str, &TargetStats) + Send + Sync + 'static,
	{
		self.summary = Some(Box::new(callback));
		self
	}

	/// Set target error callback
	pub fn on_target_error<F>(mut self, callback: F) -> Self
	where
		F: Fn(&str, &CompareError) + Send + Sync + 'static,
	{
		self.error = Some(Box::new(callback));
		self
	}

	/// Set deletion outcome callback
	pub fn on_deletion<F>(mut self, callback: F) -> Self
	where
		F: Fn(&str, &RelativePath, &DeleteOutcome) + Send + Sync + 'static,
	{
		self.deletion = Some(Box::new(callback));
		self
	}

	/// Build the callbacks handler
	pub fn build(self) -> Box<dyn CompareCallbacks> {
		Box::new(CompositeCallbacks {
			entry: self.entry,
			summary: self.summary,
			error: self.error,
			deletion: self.deletion,
		})
	}
}

impl Default for CallbackBuilder {
	fn default() -> Self {
		Self::new()
	}
}

/// Internal composite callbacks implementation
struct CompositeCallbacks {
	entry: Option<Box<EntryFn>>,
	summary: Option<Box<SummaryFn>>,
	error: Option<Box<ErrorFn>>,
	deletion: Option<Box<DeletionFn>>,
}

impl CompareCallbacks for CompositeCallbacks {
	fn on_entry(&self, target: &str, class: Classification, path: &RelativePath) {
		if let Some(ref callback) = self.entry {
			callback(target, class, path);
		}
	}

	fn on_target_summary(&self, target: &str, stats: &TargetStats) {
		if let Some(ref callback) = self.summary {
			callback(target, stats);
		}
	}

	fn on_target_error(&self, target: &str, error: &CompareError) {
		if let Some(ref callback) = self.error {
			callback(target, error);
		}
	}

	fn on_deletion(&self, target: &str, path: &RelativePath, outcome: &DeleteOutcome) {
		if let Some(ref callback) = self.deletion {
			callback(target, path, outcome);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::{Arc, Mutex};

	#[test]
	fn test_builder_routes_entries() {
		let seen = Arc::new(Mutex::new(Vec::new()));
		let sink = seen.clone();
		let callbacks = CallbackBuilder::new()
			.on_entry(move |target, class, path| {
				sink.lock().unwrap().push(format!("{} {} {}", target, class, path));
			})
			.build();

		let path = RelativePath::new("a.txt").unwrap();
		callbacks.on_entry("web1", Classification::Added, &path);
		callbacks.on_target_start("web1");

		assert_eq!(*seen.lock().unwrap(), vec!["web1 added a.txt".to_string()]);
	}

	#[test]
	fn test_stats_lookup() {
		let stats = TargetStats { added: 1, deleted: 2, modified: 3, unchanged: 4 };
		let total: usize = Classification::ALL.iter().map(|c| stats.get(*c)).sum();
		assert_eq!(total, 10);
	}
}

// vim: ts=4
