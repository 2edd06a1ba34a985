use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use treecmp::callbacks::CompareCallbacks;
use treecmp::compare::CompareBuilder;
use treecmp::config::Config;
use treecmp::confirm::{AutoConfirm, PromptConfirmer};
use treecmp::logging::{self, error, info};
use treecmp::output::{ConsoleReporter, JsonReporter};
use treecmp::protocol;
use treecmp::strategies::OutputFormat;

fn cli() -> Command {
	Command::new("treecmp")
		.version(env!("CARGO_PKG_VERSION"))
		.author("Szilard Hajba <szilu@symbion.hu>")
		.about("Compare a local directory tree with remote copies by content checksum")
		.subcommand_required(true)
		.arg(
			Arg::new("verbose")
				.short('v')
				.long("verbose")
				.action(ArgAction::Count)
				.global(true)
				.help("More logging (-v debug, -vv trace)"),
		)
		.subcommand(
			Command::new("compare")
				.about("Compare the source tree against every target")
				.arg(Arg::new("config").short('c').long("config").value_name("FILE").help("Config file (.toml, .json, .json5)"))
				.arg(Arg::new("source").short('s').long("source").value_name("DIR").help("Local source directory"))
				.arg(
					Arg::new("target")
						.short('t')
						.long("target")
						.value_name("HOST")
						.action(ArgAction::Append)
						.help("Target host or local directory (repeatable)"),
				)
				.arg(Arg::new("remote-root").short('r').long("remote-root").value_name("PATH").help("Directory compared on each target"))
				.arg(Arg::new("user").short('u').long("user").value_name("USER").help("Remote user name"))
				.arg(Arg::new("key").short('k').long("key").value_name("FILE").help("Private key (wins over password)"))
				.arg(
					Arg::new("password")
						.long("password")
						.value_name("PASSWORD")
						.help("SSH password (prefer TREECMP_PASSWORD)"),
				)
				.arg(Arg::new("port").short('p').long("port").value_parser(value_parser!(u16)).help("SSH port"))
				.arg(Arg::new("ssh-command").long("ssh-command").value_name("CMD").help("SSH client to run"))
				.arg(
					Arg::new("remote-command")
						.long("remote-command")
						.value_name("CMD")
						.help("Command started on the target (default: treecmp serve)"),
				)
				.arg(Arg::new("auto-delete").long("auto-delete").action(ArgAction::SetTrue).help("Offer to delete remote files missing locally"))
				.arg(Arg::new("yes").short('y').long("yes").action(ArgAction::SetTrue).help("Answer yes to deletion prompts"))
				.arg(Arg::new("max-delete").long("max-delete").value_parser(value_parser!(usize)).help("Refuse to delete more files than this per target"))
				.arg(
					Arg::new("max-delete-percent")
						.long("max-delete-percent")
						.value_parser(value_parser!(u8))
						.help("Refuse to delete more than this percentage of a target"),
				)
				.arg(Arg::new("algorithm").short('a').long("algorithm").value_name("ALGO").help("sha256 (default), sha512 or blake3"))
				.arg(
					Arg::new("exclude")
						.short('e')
						.long("exclude")
						.value_name("GLOB")
						.action(ArgAction::Append)
						.help("Exclude matching paths on both sides (repeatable)"),
				)
				.arg(Arg::new("format").short('f').long("format").value_name("FORMAT").help("text (default) or json"))
				.arg(Arg::new("color").long("color").value_name("WHEN").help("auto (default), always or never"))
				.arg(Arg::new("log-level").long("log-level").value_name("LEVEL").help("Log filter when RUST_LOG is unset")),
		)
		.subcommand(Command::new("serve").about("Serve the protocol on stdin/stdout (started over ssh)"))
}

/// Defaults < config file < environment < command line
fn build_config(matches: &ArgMatches) -> Result<Config, Box<dyn Error>> {
	let mut config = match matches.get_one::<String>("config") {
		Some(path) => Config::load_file(Path::new(path))?,
		None => match Config::default_file() {
			Some(path) => Config::load_file(&path)?,
			None => Config::default(),
		},
	};
	config.apply_env();

	if let Some(source) = matches.get_one::<String>("source") {
		config.source = Some(PathBuf::from(source));
	}
	if let Some(targets) = matches.get_many::<String>("target") {
		config.targets = targets.cloned().collect();
	}
	if let Some(root) = matches.get_one::<String>("remote-root") {
		config.remote_root = root.clone();
	}
	if let Some(user) = matches.get_one::<String>("user") {
		config.username = Some(user.clone());
	}
	if let Some(key) = matches.get_one::<String>("key") {
		config.key_path = Some(PathBuf::from(key));
	}
	if let Some(password) = matches.get_one::<String>("password") {
		config.password = Some(password.clone());
	}
	if let Some(port) = matches.get_one::<u16>("port") {
		config.ssh.port = Some(*port);
	}
	if let Some(cmd) = matches.get_one::<String>("ssh-command") {
		config.ssh.ssh_command = Some(cmd.clone());
	}
	if let Some(cmd) = matches.get_one::<String>("remote-command") {
		config.ssh.remote_command = cmd.clone();
	}
	if matches.get_flag("auto-delete") {
		config.auto_delete = true;
	}
	if let Some(count) = matches.get_one::<usize>("max-delete") {
		config.max_delete_count = Some(*count);
	}
	if let Some(percent) = matches.get_one::<u8>("max-delete-percent") {
		config.max_delete_percent = Some(*percent);
	}
	if let Some(algorithm) = matches.get_one::<String>("algorithm") {
		config.algorithm = algorithm.parse()?;
	}
	if let Some(patterns) = matches.get_many::<String>("exclude") {
		config.exclude_patterns.extend(patterns.cloned());
	}
	if let Some(format) = matches.get_one::<String>("format") {
		config.output_format = format.parse()?;
	}
	if let Some(color) = matches.get_one::<String>("color") {
		config.color_mode = color.parse()?;
	}
	if let Some(level) = matches.get_one::<String>("log-level") {
		config.log_level = level.clone();
	}

	config.validate()?;
	Ok(config)
}

/// Returns whether every target compared cleanly
async fn compare(config: Config, assume_yes: bool) -> Result<bool, Box<dyn Error>> {
	let callbacks: Box<dyn CompareCallbacks> = match config.output_format {
		OutputFormat::Text => Box::new(ConsoleReporter::stdout(config.color_mode.enabled())),
		OutputFormat::Json => Box::new(JsonReporter::stdout()),
	};

	let builder = CompareBuilder::from_config(&config).callbacks(callbacks);
	let builder = if assume_yes { builder.confirmer(AutoConfirm(true)) } else { builder.confirmer(PromptConfirmer) };

	let summary = builder.build()?.run().await?;
	let failed = summary.failed_targets();
	if failed.is_empty() {
		info!("All {} targets compared", summary.targets.len());
	} else {
		error!("{} of {} targets failed: {}", failed.len(), summary.targets.len(), failed.join(", "));
	}
	Ok(summary.is_success())
}

#[tokio::main]
async fn main() -> ExitCode {
	let matches = cli().get_matches();
	let verbose = matches.get_count("verbose");

	if matches.subcommand_matches("serve").is_some() {
		logging::init_tracing("warn", verbose);
		return match protocol::serve_stdio().await {
			Ok(()) => ExitCode::SUCCESS,
			Err(e) => {
				error!("serve: {}", e);
				ExitCode::FAILURE
			}
		};
	}

	let Some(sub_matches) = matches.subcommand_matches("compare") else {
		return ExitCode::from(2);
	};

	let config = match build_config(sub_matches) {
		Ok(config) => config,
		Err(e) => {
			eprintln!("treecmp: {}", e);
			return ExitCode::from(2);
		}
	};
	logging::init_tracing(&config.log_level, verbose);

	match compare(config, sub_matches.get_flag("yes")).await {
		Ok(true) => ExitCode::SUCCESS,
		Ok(false) => ExitCode::FAILURE,
		Err(e) => {
			error!("{}", e);
			ExitCode::FAILURE
		}
	}
}


// vim: ts=4
