//! Session acquisition for local and remote targets

use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::BufReader;
use tracing::{debug, info};

use crate::config::{Config, SshConfig};
use crate::error::ConnectionError;
use crate::protocol::ProtocolClient;
use crate::session::{LocalSession, RemoteSession};

/// Connection type indicator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionType {
	/// Directory on this machine standing in for a remote host
	Local { path: PathBuf },
	/// Host reached over ssh (`host` or `user@host`)
	Remote { host: String },
}

impl ConnectionType {
	/// Detect connection type from a target string
	pub fn detect(target: &str) -> Self {
		let is_path = target.starts_with('/') || target.starts_with('.') || target.starts_with('~');

		if is_path {
			return ConnectionType::Local { path: expand_home(target) };
		}
		ConnectionType::Remote { host: target.to_string() }
	}
}

fn expand_home(path: &str) -> PathBuf {
	if let Some(rest) = path.strip_prefix('~') {
		if rest.is_empty() || rest.starts_with('/') {
			if let Ok(home) = std::env::var("HOME") {
				return PathBuf::from(format!("{}{}", home, rest));
			}
		}
	}
	PathBuf::from(path)
}

/// How to authenticate against remote targets
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
	/// Private key file
	Key(PathBuf),
	/// Password, handed to sshpass through the environment
	Password(String),
	/// Whatever ssh finds on its own (agent, ~/.ssh/config)
	Default,
}

impl Credential {
	/// Pick the credential; a key wins over a password
	pub fn resolve(key_path: Option<PathBuf>, password: Option<String>) -> Self {
		match (key_path, password) {
			(Some(key), _) => Credential::Key(key),
			(None, Some(password)) => Credential::Password(password),
			(None, None) => Credential::Default,
		}
	}
}

impl fmt::Debug for Credential {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Credential::Key(path) => f.debug_tuple("Key").field(path).finish(),
			Credential::Password(_) => f.write_str("Password(***)"),
			Credential::Default => f.write_str("Default"),
		}
	}
}

/// Fully resolved transport command line
#[derive(Clone)]
pub struct SshCommand {
	pub program: String,
	pub args: Vec<String>,
	pub env: Vec<(String, String)>,
}

impl SshCommand {
	fn to_command(&self) -> tokio::process::Command {
		let mut cmd = tokio::process::Command::new(&self.program);
		cmd.args(&self.args);
		for (key, value) in &self.env {
			cmd.env(key, value);
		}
		cmd
	}
}

impl fmt::Display for SshCommand {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.program)?;
		for arg in &self.args {
			write!(f, " {}", arg)?;
		}
		Ok(())
	}
}

/// Build the command line that starts the protocol server on `host`
pub fn build_ssh_command(
	host: &str,
	username: Option<&str>,
	credential: &Credential,
	ssh: &SshConfig,
) -> SshCommand {
	let ssh_program = ssh.ssh_command.clone().unwrap_or_else(|| "ssh".to_string());
	let mut args = Vec::new();
	let mut env = Vec::new();

	let program = match credential {
		Credential::Password(password) => {
			env.push(("SSHPASS".to_string(), password.clone()));
			args.push("-e".to_string());
			args.push(ssh_program);
			"sshpass".to_string()
		}
		_ => ssh_program,
	};

	match credential {
		Credential::Key(key) => {
			args.push("-i".to_string());
			args.push(key.display().to_string());
			args.push("-o".to_string());
			args.push("IdentitiesOnly=yes".to_string());
			args.push("-o".to_string());
			args.push("BatchMode=yes".to_string());
		}
		Credential::Password(_) => {
			args.push("-o".to_string());
			args.push("PubkeyAuthentication=no".to_string());
		}
		Credential::Default => {}
	}

	if let Some(port) = ssh.port {
		args.push("-p".to_string());
		args.push(port.to_string());
	}
	if let Some(user) = username {
		args.push("-l".to_string());
		args.push(user.to_string());
	}

	args.push(host.to_string());
	args.extend(ssh.remote_command.split_whitespace().map(str::to_string));

	SshCommand { program, args, env }
}

/// Acquires a session for a target
#[async_trait]
pub trait Connector: Send + Sync {
	async fn connect(&self, target: &str) -> Result<Box<dyn RemoteSession>, ConnectionError>;
}

/// Connector for ssh hosts and local directories
#[derive(Debug, Clone)]
pub struct SshConnector {
	username: Option<String>,
	credential: Credential,
	ssh: SshConfig,
}

impl SshConnector {
	pub fn new(username: Option<String>, credential: Credential, ssh: SshConfig) -> Self {
		Self { username, credential, ssh }
	}

	pub fn from_config(config: &Config) -> Self {
		Self::new(
			config.username.clone(),
			Credential::resolve(config.key_path.clone(), config.password.clone()),
			config.ssh.clone(),
		)
	}

	pub fn command_for(&self, host: &str) -> SshCommand {
		build_ssh_command(host, self.username.as_deref(), &self.credential, &self.ssh)
	}

	async fn connect_remote(&self, target: &str, host: &str) -> Result<Box<dyn RemoteSession>, ConnectionError> {
		let command = self.command_for(host);
		debug!("Spawning {}", command);

		let mut child = command
			.to_command()
			.stdin(Stdio::piped())
			.stdout(Stdio::piped())
			.stderr(Stdio::inherit())
			.kill_on_drop(true)
			.spawn()
			.map_err(|e| ConnectionError::SpawnFailed { cmd: command.program.clone(), source: e })?;

		let send = child
			.stdin
			.take()
			.ok_or(ConnectionError::StdioUnavailable { what: "stdin".to_string() })?;
		let stdout = child
			.stdout
			.take()
			.ok_or(ConnectionError::StdioUnavailable { what: "stdout".to_string() })?;

		let client = ProtocolClient::connect(
			target,
			BufReader::new(stdout),
			send,
			Duration::from_secs(self.ssh.connect_timeout_secs),
			Duration::from_secs(self.ssh.io_timeout_secs),
		)
		.await?;

		info!("Connected to {}", target);
		Ok(Box::new(client.with_child(child)))
	}
}

#[async_trait]
impl Connector for SshConnector {
	async fn connect(&self, target: &str) -> Result<Box<dyn RemoteSession>, ConnectionError> {
		if target.trim().is_empty() || target.chars().any(char::is_whitespace) {
			return Err(ConnectionError::InvalidTarget {
				target: target.to_string(),
				message: "target must be a host name or a directory without whitespace".to_string(),
			});
		}

		match ConnectionType::detect(target) {
			ConnectionType::Local { path } => {
				let session = LocalSession::open(target, path).await?;
				info!("Using local directory {} as target", target);
				Ok(Box::new(session))
			}
			ConnectionType::Remote { host } => self.connect_remote(target, &host).await,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::TempDir;

	#[test]
	fn test_detect() {
		assert_eq!(
			ConnectionType::detect("/tmp/mirror"),
			ConnectionType::Local { path: PathBuf::from("/tmp/mirror") }
		);
		assert!(matches!(ConnectionType::detect("./mirror"), ConnectionType::Local { .. }));
		assert_eq!(
			ConnectionType::detect("deploy@web1"),
			ConnectionType::Remote { host: "deploy@web1".to_string() }
		);
	}

	#[test]
	fn test_key_takes_precedence() {
		let credential = Credential::resolve(Some(PathBuf::from("/k")), Some("pw".to_string()));
		assert_eq!(credential, Credential::Key(PathBuf::from("/k")));
		assert_eq!(Credential::resolve(None, None), Credential::Default);
		assert_eq!(format!("{:?}", Credential::Password("pw".to_string())), "Password(***)");
	}

	#[test]
	fn test_key_command() {
		let ssh = SshConfig { port: Some(2222), ..SshConfig::default() };
		let cmd = build_ssh_command("web1", Some("deploy"), &Credential::Key(PathBuf::from("/k")), &ssh);
		assert_eq!(cmd.program, "ssh");
		assert_eq!(
			cmd.args,
			vec![
				"-i", "/k", "-o", "IdentitiesOnly=yes", "-o", "BatchMode=yes", "-p", "2222", "-l", "deploy",
				"web1", "treecmp", "serve"
			]
		);
		assert!(cmd.env.is_empty());
	}

	#[test]
	fn test_password_stays_off_command_line() {
		let cmd = build_ssh_command(
			"web1",
			None,
			&Credential::Password("s3cret".to_string()),
			&SshConfig::default(),
		);
		assert_eq!(cmd.program, "sshpass");
		assert_eq!(&cmd.args[..2], &["-e", "ssh"]);
		assert!(!cmd.to_string().contains("s3cret"));
		assert_eq!(cmd.env, vec![("SSHPASS".to_string(), "s3cret".to_string())]);
	}

	#[tokio::test]
	async fn test_connect_local_directory() {
		let temp = TempDir::new().unwrap();
		let connector = SshConnector::new(None, Credential::Default, SshConfig::default());
		let target = temp.path().display().to_string();
		let session = connector.connect(&target).await.unwrap();
		assert_eq!(session.target(), target);

		let missing = temp.path().join("missing").display().to_string();
		assert!(matches!(connector.connect(&missing).await, Err(ConnectionError::LocalRoot { .. })));
	}

	#[tokio::test]
	async fn test_invalid_target() {
		let connector = SshConnector::new(None, Credential::Default, SshConfig::default());
		assert!(matches!(connector.connect("").await, Err(ConnectionError::InvalidTarget { .. })));
		assert!(matches!(connector.connect("a b").await, Err(ConnectionError::InvalidTarget { .. })));
	}
}

// vim: ts=4
