//! Console and JSON reporters

use owo_colors::OwoColorize;
use serde_json::json;
use std::io::{self, Write};
use std::sync::Mutex;

use crate::callbacks::{CompareCallbacks, TargetStats};
use crate::delete::DeleteOutcome;
use crate::diff::Classification;
use crate::error::CompareError;
use crate::types::RelativePath;

// ============================================================================
// CONSOLE REPORTER
// ============================================================================

/// Human readable report, colored per classification
pub struct ConsoleReporter<W: Write + Send> {
	out: Mutex<W>,
	color: bool,
}

impl ConsoleReporter<io::Stdout> {
	pub fn stdout(color: bool) -> Self {
		Self::new(io::stdout(), color)
	}
}

impl<W: Write + Send> ConsoleReporter<W> {
	pub fn new(out: W, color: bool) -> Self {
		Self { out: Mutex::new(out), color }
	}

	pub fn into_inner(self) -> W {
		match self.out.into_inner() {
			Ok(out) => out,
			Err(poisoned) => poisoned.into_inner(),
		}
	}

	fn line(&self, text: &str) {
		if let Ok(mut out) = self.out.lock() {
			let _ = writeln!(out, "{}", text);
		}
	}

	fn paint(&self, class: Classification, text: &str) -> String {
		if !self.color {
			return text.to_string();
		}
		match class {
			Classification::Added => text.green().to_string(),
			Classification::Deleted => text.red().to_string(),
			Classification::Modified => text.yellow().to_string(),
			Classification::Unchanged => text.to_string(),
		}
	}

	fn heading(&self, text: &str) -> String {
		if self.color {
			text.cyan().bold().to_string()
		} else {
			text.to_string()
		}
	}

	fn alert(&self, text: &str) -> String {
		if self.color {
			text.red().bold().to_string()
		} else {
			text.to_string()
		}
	}
}

fn title(class: Classification) -> &'static str {
	match class {
		Classification::Added => "Added",
		Classification::Deleted => "Deleted",
		Classification::Modified => "Modified",
		Classification::Unchanged => "Unchanged",
	}
}

fn marker(class: Classification) -> char {
	match class {
		Classification::Added => '+',
		Classification::Deleted => '-',
		Classification::Modified => '~',
		Classification::Unchanged => ' ',
	}
}

impl<W: Write + Send> CompareCallbacks for ConsoleReporter<W> {
	fn on_target_start(&self, target: &str) {
		self.line(&self.heading(&format!("== {} ==", target)));
	}

	fn on_class_start(&self, _target: &str, class: Classification, count: usize) {
		self.line(&format!("{} ({}):", title(class), count));
		if count == 0 {
			self.line(&format!("  No {} files.", class));
		}
	}

	fn on_entry(&self, _target: &str, class: Classification, path: &RelativePath) {
		self.line(&self.paint(class, &format!("  {} {}", marker(class), path)));
	}

	fn on_target_summary(&self, target: &str, stats: &TargetStats) {
		self.line(&format!(
			"Summary {}: {} added, {} deleted, {} modified, {} unchanged",
			target, stats.added, stats.deleted, stats.modified, stats.unchanged
		));
	}

	fn on_target_error(&self, target: &str, error: &CompareError) {
		self.line(&self.alert(&format!("{}: {}", target, error)));
	}

	fn on_deletion_refused(&self, target: &str, reason: &str) {
		self.line(&self.alert(&format!("Deletion on {} refused: {}", target, reason)));
	}

	fn on_deletion_declined(&self, target: &str, count: usize) {
		self.line(&format!("Deletion of {} files on {} skipped.", count, target));
	}

	fn on_deletion(&self, _target: &str, path: &RelativePath, outcome: &DeleteOutcome) {
		let text = match outcome {
			DeleteOutcome::Deleted => self.paint(Classification::Deleted, &format!("  removed {}", path)),
			DeleteOutcome::NotFound => format!("  {} was already gone", path),
			DeleteOutcome::Failed { message } => self.alert(&format!("  failed to remove {}: {}", path, message)),
		};
		self.line(&text);
	}
}

// ============================================================================
// JSON REPORTER
// ============================================================================

/// One JSON object per event, one event per line
pub struct JsonReporter<W: Write + Send> {
	out: Mutex<W>,
}

impl JsonReporter<io::Stdout> {
	pub fn stdout() -> Self {
		Self::new(io::stdout())
	}
}

impl<W: Write + Send> JsonReporter<W> {
	pub fn new(out: W) -> Self {
		Self { out: Mutex::new(out) }
	}

	pub fn into_inner(self) -> W {
		match self.out.into_inner() {
			Ok(out) => out,
			Err(poisoned) => poisoned.into_inner(),
		}
	}

	fn emit(&self, value: serde_json::Value) {
		if let Ok(mut out) = self.out.lock() {
			let _ = writeln!(out, "{}", value);
		}
	}
}

impl<W: Write + Send> CompareCallbacks for JsonReporter<W> {
	fn on_entry(&self, target: &str, class: Classification, path: &RelativePath) {
		self.emit(json!({ "event": "entry", "target": target, "class": class, "path": path }));
	}

	fn on_target_summary(&self, target: &str, stats: &TargetStats) {
		self.emit(json!({ "event": "summary", "target": target, "stats": stats }));
	}

	fn on_target_error(&self, target: &str, error: &CompareError) {
		self.emit(json!({ "event": "error", "target": target, "message": error.to_string() }));
	}

	fn on_deletion_refused(&self, target: &str, reason: &str) {
		self.emit(json!({ "event": "deletion-refused", "target": target, "reason": reason }));
	}

	fn on_deletion_declined(&self, target: &str, count: usize) {
		self.emit(json!({ "event": "deletion-declined", "target": target, "count": count }));
	}

	fn on_deletion(&self, target: &str, path: &RelativePath, outcome: &DeleteOutcome) {
		self.emit(json!({ "event": "deletion", "target": target, "path": path, "result": outcome }));
	}
}


// vim: ts=4
