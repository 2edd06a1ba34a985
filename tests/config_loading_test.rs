//! Configuration file loading and layering

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use treecmp::compare::CompareBuilder;
use treecmp::config::{Config, ENV_KEY, ENV_PASSWORD};
use treecmp::strategies::{ChecksumAlgorithm, ColorMode, OutputFormat};
use treecmp::CompareError;

#[test]
fn test_load_toml() {
	let temp = TempDir::new().unwrap();
	let path = temp.path().join("treecmp.toml");
	fs::write(
		&path,
		r#"
source = "/data/site"
targets = ["web1", "web2"]
remoteRoot = "/srv/www"
algorithm = "blake3"
autoDelete = true
excludePatterns = ["*.tmp", "cache"]
maxDeletePercent = 10
outputFormat = "json"
colorMode = "never"

[ssh]
port = 2222
ioTimeoutSecs = 15
"#,
	)
	.unwrap();

	let config = Config::load_file(&path).unwrap();
	assert_eq!(config.source, Some(PathBuf::from("/data/site")));
	assert_eq!(config.targets, vec!["web1", "web2"]);
	assert_eq!(config.algorithm, ChecksumAlgorithm::Blake3);
	assert!(config.auto_delete);
	assert_eq!(config.exclude_patterns.len(), 2);
	assert_eq!(config.max_delete_percent, Some(10));
	assert_eq!(config.output_format, OutputFormat::Json);
	assert_eq!(config.color_mode, ColorMode::Never);
	assert_eq!(config.ssh.port, Some(2222));
	assert_eq!(config.ssh.io_timeout_secs, 15);
	// untouched fields keep their defaults
	assert_eq!(config.ssh.connect_timeout_secs, 30);
	assert!(config.validate().is_ok());
}

#[test]
fn test_load_json5() {
	let temp = TempDir::new().unwrap();
	let path = temp.path().join("treecmp.json5");
	fs::write(
		&path,
		r#"{
	// deploy mirrors
	source: "./site",
	targets: ["mirror1"],
	remoteRoot: "/var/www",
	keyPath: "/home/deploy/.ssh/id_ed25519",
}"#,
	)
	.unwrap();

	let config = Config::load_file(&path).unwrap();
	assert_eq!(config.targets, vec!["mirror1"]);
	assert_eq!(config.key_path, Some(PathBuf::from("/home/deploy/.ssh/id_ed25519")));
	assert_eq!(config.algorithm, ChecksumAlgorithm::Sha256);
}

#[test]
fn test_invalid_file_reports_path() {
	let temp = TempDir::new().unwrap();
	let path = temp.path().join("broken.toml");
	fs::write(&path, "targets = \"not a list\"").unwrap();

	match Config::load_file(&path) {
		Err(CompareError::InvalidConfig { message }) => assert!(message.contains("broken.toml")),
		other => panic!("unexpected result {:?}", other.map(|_| ())),
	}
	assert!(matches!(Config::load_file(&temp.path().join("absent.toml")), Err(CompareError::Io(_))));
}

#[test]
fn test_env_layer_over_file() {
	let mut config = Config { key_path: Some(PathBuf::from("/from/file")), ..Config::default() };
	config.apply_env_from(|name| match name {
		n if n == ENV_KEY => Some("/from/env".to_string()),
		n if n == ENV_PASSWORD => Some("pw".to_string()),
		_ => None,
	});
	assert_eq!(config.key_path, Some(PathBuf::from("/from/env")));
	assert_eq!(config.password.as_deref(), Some("pw"));
}

#[test]
fn test_builder_from_loaded_config() {
	let temp = TempDir::new().unwrap();
	let path = temp.path().join("c.json");
	fs::write(&path, r#"{"source": "/data", "targets": ["a"], "remoteRoot": "/srv", "excludePatterns": ["["]}"#)
		.unwrap();

	let config = Config::load_file(&path).unwrap();
	assert!(matches!(CompareBuilder::from_config(&config).build(), Err(CompareError::InvalidConfig { .. })));
}

// vim: ts=4
