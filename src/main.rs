use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use markrep_cli::config::{
	CONFIG_FILE_NAME, MergedConfig, discover_configs, generate_init_template, load_merged_config,
	user_config_path,
};
use markrep_cli::engine::evaluate_compiled;
use markrep_cli::render::{OutputFormat, render, summary};
use markrep_cli::rules::{CompiledRules, compile_rules};

#[derive(Parser)]
#[command(name = "markrep")]
#[command(
	author,
	version,
	about = "Apply many search and replace rules to text in a single pass"
)]
struct Cli {
	#[command(subcommand)]
	command: Option<Commands>,

	/// Rule line to apply (repeatable); replaces rules from config files
	#[arg(short = 'e', long = "rule", value_name = "RULE", global = true)]
	rules: Vec<String>,

	/// File of rule lines; replaces rules from config files
	#[arg(short = 'f', long, value_name = "FILE", global = true)]
	rules_file: Option<PathBuf>,

	/// Output format (defaults to the config's format, then plain)
	#[arg(long, value_enum)]
	format: Option<OutputFormat>,

	/// Write output to FILE instead of stdout
	#[arg(short, long, value_name = "FILE")]
	output: Option<PathBuf>,

	/// Print match and replacement counts to stderr
	#[arg(long)]
	stats: bool,

	/// Create a template .markrep.toml in the current directory
	#[arg(long)]
	init: bool,

	/// Overwrite existing .markrep.toml when using --init
	#[arg(long, requires = "init")]
	force: bool,

	/// Source text to process; reads stdin when omitted or "-"
	#[arg(value_name = "INPUT")]
	input: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
	/// Compile the effective rules and report what each one does
	Check,
	/// Configuration management commands
	Config {
		#[command(subcommand)]
		action: ConfigAction,
	},
}

#[derive(Subcommand)]
enum ConfigAction {
	/// Display every config file in the cascade with its settings
	Show,
	/// Check all config files for errors without running anything
	Validate,
}

fn main() -> ExitCode {
	env_logger::Builder::from_env(env_logger::Env::default().filter_or("MARKREP_LOG", "warn"))
		.format_timestamp(None)
		.init();

	match run() {
		Ok(code) => code,
		Err(e) => {
			eprintln!("error: {e:?}");
			ExitCode::FAILURE
		}
	}
}

fn run() -> Result<ExitCode> {
	let cli = Cli::parse();

	if cli.init {
		return handle_init(cli.force);
	}

	if let Some(command) = &cli.command {
		return match command {
			Commands::Check => handle_check(&cli.rules, cli.rules_file.as_deref()),
			Commands::Config { action } => match action {
				ConfigAction::Show => handle_config_show(),
				ConfigAction::Validate => handle_config_validate(),
			},
		};
	}

	handle_evaluate(&cli)
}

fn handle_init(force: bool) -> Result<ExitCode> {
	let config_path = PathBuf::from(CONFIG_FILE_NAME);

	if config_path.exists() && !force {
		anyhow::bail!("{CONFIG_FILE_NAME} already exists. Use --force to overwrite.");
	}

	std::fs::write(&config_path, generate_init_template())
		.with_context(|| format!("Failed to write {}", config_path.display()))?;

	println!("Created {CONFIG_FILE_NAME}");
	Ok(ExitCode::SUCCESS)
}

fn load_config() -> Result<MergedConfig> {
	let cwd = std::env::current_dir().context("Failed to get current directory")?;
	load_merged_config(&cwd).context("Failed to load configuration")
}

/// Rule text from the command line if any was given, otherwise from config.
fn effective_rule_text(
	cli_rules: &[String],
	rules_file: Option<&Path>,
	config: &MergedConfig,
) -> Result<String> {
	if cli_rules.is_empty() && rules_file.is_none() {
		return Ok(config.rule_text());
	}

	let mut blocks = Vec::new();
	if let Some(path) = rules_file {
		let text = std::fs::read_to_string(path)
			.with_context(|| format!("Failed to read rules file: {}", path.display()))?;
		blocks.push(text);
	}
	blocks.extend(cli_rules.iter().cloned());
	Ok(blocks.join("\n"))
}

fn read_input(input: Option<&Path>) -> Result<String> {
	match input {
		Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
			.map_err(|source| markrep_cli::MarkrepError::InputReadError {
				path: path.to_path_buf(),
				source,
			})
			.context("Failed to read source text"),
		_ => {
			let mut text = String::new();
			std::io::stdin()
				.read_to_string(&mut text)
				.context("Failed to read source text from stdin")?;
			Ok(text)
		}
	}
}

fn handle_evaluate(cli: &Cli) -> Result<ExitCode> {
	let config = load_config()?;
	let rule_text = effective_rule_text(&cli.rules, cli.rules_file.as_deref(), &config)?;
	let format = cli.format.or(config.format).unwrap_or_default();

	let source = read_input(cli.input.as_deref())?;
	let rules = compile_rules(&rule_text);
	let eval = evaluate_compiled(&rules, &source)?;

	let mut rendered = render(&eval, format);
	if format == OutputFormat::Json {
		rendered.push('\n');
	}

	match &cli.output {
		Some(path) => std::fs::write(path, &rendered)
			.with_context(|| format!("Failed to write {}", path.display()))?,
		None => {
			let mut stdout = std::io::stdout().lock();
			stdout
				.write_all(rendered.as_bytes())
				.and_then(|()| stdout.flush())
				.context("Failed to write output")?;
		}
	}

	if cli.stats {
		eprintln!("{}", summary(&eval));
	}

	Ok(ExitCode::SUCCESS)
}

fn handle_check(cli_rules: &[String], rules_file: Option<&Path>) -> Result<ExitCode> {
	let config = load_config()?;
	let rule_text = effective_rule_text(cli_rules, rules_file, &config)?;
	let compiled = compile_rules(&rule_text);

	print_compiled(&compiled);

	if compiled.warnings.is_empty() {
		Ok(ExitCode::SUCCESS)
	} else {
		Ok(ExitCode::FAILURE)
	}
}

fn print_compiled(compiled: &CompiledRules) {
	if compiled.rules.is_empty() && compiled.warnings.is_empty() {
		println!("No rules defined.");
		return;
	}

	for (i, compiled_rule) in compiled.rules.iter().enumerate() {
		let rule = &compiled_rule.rule;
		println!("Rule {} (line {}):", i + 1, rule.line);
		println!("    search: {}", rule.raw_search);
		println!(
			"    mode: {}",
			if rule.is_line_mode { "line" } else { "text" }
		);
		println!(
			"    alternatives: {}",
			compiled_rule.matcher.alternatives.join(" | ")
		);
		if !compiled_rule.matcher.wildcard_order.is_empty() {
			let kinds: Vec<_> = compiled_rule
				.matcher
				.wildcard_order
				.iter()
				.map(|kind| kind.marker())
				.collect();
			println!("    wildcards: {}", kinds.join(" "));
		}
		if rule.is_delete {
			println!("    action: delete");
		} else if rule.is_replacement {
			println!("    action: replace with {:?}", rule.raw_replace);
		} else {
			println!("    action: highlight");
		}
		println!();
	}

	for warning in &compiled.warnings {
		println!(
			"Skipped rule on line {} ({}): {}",
			warning.line, warning.search, warning.message
		);
	}
}

fn handle_config_show() -> Result<ExitCode> {
	let cwd = std::env::current_dir().context("Failed to get current directory")?;
	let configs = discover_configs(&cwd).context("Failed to discover config files")?;

	if configs.is_empty() {
		println!("No configuration files found.");
		return Ok(ExitCode::SUCCESS);
	}

	println!("Configuration files (in cascade order):\n");

	for loaded in &configs {
		println!("# Source: {}", loaded.path.display());
		println!("# root: {}", loaded.config.root);
		println!("# no-external-lookup: {}", loaded.config.no_external_lookup);
		if let Some(ref env_var) = loaded.config.root_config_lookup_disable_env_var {
			println!("# root-config-lookup-disable-env-var: {}", env_var);
		}
		if let Some(ref format) = loaded.config.format {
			println!("# format: {:?}", format);
		}
		if let Some(path) = loaded.rules_file_path() {
			println!("# rules-file: {}", path.display());
		}
		println!("# rules: {}", loaded.config.rules.len());
		println!();

		for (i, rule) in loaded.config.rules.iter().enumerate() {
			println!("  Rule {}: {}", i + 1, rule);
		}
		if !loaded.config.rules.is_empty() {
			println!();
		}
	}

	if let Ok(user_path) = user_config_path() {
		println!("User config path: {}", user_path.display());
		if user_path.exists() {
			println!("  (exists)");
		} else {
			println!("  (not found)");
		}
	}

	Ok(ExitCode::SUCCESS)
}

fn handle_config_validate() -> Result<ExitCode> {
	let cwd = std::env::current_dir().context("Failed to get current directory")?;

	let result = discover_configs(&cwd).and_then(|configs| {
		markrep_cli::config::merge_configs(&configs).map(|merged| (configs, merged))
	});

	match result {
		Ok((configs, merged)) => {
			if configs.is_empty() {
				println!("No configuration files found.");
				return Ok(ExitCode::SUCCESS);
			}

			let compiled = compile_rules(&merged.rule_text());
			println!("All configuration files are valid:");
			for loaded in &configs {
				println!(
					"  {} ({} inline rules)",
					loaded.path.display(),
					loaded.config.rules.len()
				);
			}
			println!("{} rules compiled", compiled.rules.len());

			if compiled.warnings.is_empty() {
				Ok(ExitCode::SUCCESS)
			} else {
				for warning in &compiled.warnings {
					eprintln!(
						"Rule on line {} ({}) was skipped: {}",
						warning.line, warning.search, warning.message
					);
				}
				Ok(ExitCode::FAILURE)
			}
		}
		Err(e) => {
			eprintln!("Configuration error: {}", e);
			Ok(ExitCode::FAILURE)
		}
	}
}
