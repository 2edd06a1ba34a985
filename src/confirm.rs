//! Operator confirmation for remote deletion

use dialoguer::Confirm;
use std::io::IsTerminal;
use tracing::warn;

use crate::error::CompareError;

/// Yes/no decision on deleting `count` files from `target`
pub trait DeletionConfirmer: Send + Sync {
	fn confirm(&self, target: &str, count: usize) -> Result<bool, CompareError>;
}

/// Ask on the terminal; declines when there is no terminal to ask on
pub struct PromptConfirmer;

impl DeletionConfirmer for PromptConfirmer {
	fn confirm(&self, target: &str, count: usize) -> Result<bool, CompareError> {
		if !std::io::stdin().is_terminal() {
			warn!("No terminal to confirm deletion of {} files on {}, skipping", count, target);
			return Ok(false);
		}

		Confirm::new()
			.with_prompt(format!("Delete {} files on {} that no longer exist locally?", count, target))
			.default(false)
			.interact()
			.map_err(|e| CompareError::Prompt { message: format!("Failed to get user input: {}", e) })
	}
}

/// Fixed answer (`--yes`, tests)
pub struct AutoConfirm(pub bool);

impl DeletionConfirmer for AutoConfirm {
	fn confirm(&self, _target: &str, _count: usize) -> Result<bool, CompareError> {
		Ok(self.0)
	}
}

// vim: ts=4
