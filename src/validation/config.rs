//! Configuration validation functions

use super::ValidationError;

/// Validate a timeout in seconds (1..=3600)
pub fn validate_timeout_secs(name: &str, timeout_secs: u64) -> Result<(), ValidationError> {
	if timeout_secs == 0 {
		return Err(ValidationError::ConfigError(format!("{} must be greater than 0", name)));
	}
	if timeout_secs > 3600 {
		return Err(ValidationError::ConfigError(format!(
			"{} too large: {} seconds (max 3600)",
			name, timeout_secs
		)));
	}
	Ok(())
}

/// Validate a deletion percentage limit (0-100)
pub fn validate_percent(percent: u8) -> Result<(), ValidationError> {
	if percent > 100 {
		return Err(ValidationError::ConfigError(format!(
			"maxDeletePercent must be at most 100, got {}",
			percent
		)));
	}
	Ok(())
}

/// Validate the remote root: non-empty and absolute on the remote side
pub fn validate_remote_root(root: &str) -> Result<(), ValidationError> {
	if root.is_empty() {
		return Err(ValidationError::ConfigError("remoteRoot must not be empty".to_string()));
	}
	if !root.starts_with('/') {
		return Err(ValidationError::ConfigError(format!(
			"remoteRoot must be an absolute path, got {:?}",
			root
		)));
	}
	Ok(())
}


// vim: ts=4
