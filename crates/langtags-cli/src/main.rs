//! langtags CLI - validate BCP 47 language tags against the IANA registry

mod output;
mod report;

use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use langtags_core::config::CONFIG_FILE_NAME;
use langtags_core::{LangtagsConfig, RegistryIndex, TagValidator};

use crate::report::TagReport;

/// Environment variable naming the registry file.
const REGISTRY_ENV: &str = "LANGTAGS_REGISTRY";
/// Environment variable holding a tracing filter directive.
const LOG_ENV: &str = "LANGTAGS_LOG";

#[derive(Parser, Debug)]
#[command(name = "langtags", version)]
#[command(about = "Validate BCP 47 language tags against the IANA Language Subtag Registry")]
struct Cli {
    /// Language tags to validate
    #[arg(value_name = "TAGS")]
    tags: Vec<String>,

    /// Path to the IANA language-subtag-registry file
    #[arg(short, long, value_name = "PATH")]
    registry: Option<PathBuf>,

    /// Config file path (default: ./.langtags.toml when present)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Rewrite `_` and `/` separators to `-` before validating
    #[arg(short, long)]
    normalize: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Read additional tags from stdin, one per line
    #[arg(long)]
    stdin: bool,

    /// Only check the tag grammar; no registry is loaded
    #[arg(long)]
    well_formed: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_tracing(cli.verbose);
    if cli.no_color || cli.format == OutputFormat::Json {
        colored::control::set_override(false);
    }

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            eprintln!("{} {:#}", "error:".red().bold(), err);
            ExitCode::from(2)
        }
    }
}

fn setup_tracing(verbose: bool) {
    let default = if verbose {
        "langtags=debug,langtags_core=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Returns whether every tag passed.
fn run(cli: &Cli) -> anyhow::Result<bool> {
    let mut config = load_config(cli.config.as_deref());
    config.normalize |= cli.normalize;

    let tags = collect_tags(cli)?;
    if tags.is_empty() {
        bail!("no language tags given; pass them as arguments or use --stdin");
    }

    let (reports, registry_date) = if cli.well_formed {
        let reports = tags
            .iter()
            .map(|t| report::check_well_formed(t, config.normalize))
            .collect::<Vec<_>>();
        (reports, None)
    } else {
        let path = resolve_registry_path(cli.registry.as_deref(), &config).with_context(|| {
            format!(
                "no registry file configured; use --registry, set {}, or add `registry` to {}",
                REGISTRY_ENV, CONFIG_FILE_NAME
            )
        })?;
        let registry = RegistryIndex::load(&path)
            .with_context(|| format!("failed to load registry from {}", path.display()))?;
        tracing::debug!(tags = tags.len(), "validating tags");

        let validator = TagValidator::new(&registry);
        let reports = report::check_registered(&validator, &tags, &config);
        (reports, registry.file_date().map(|d| d.to_string()))
    };

    match cli.format {
        OutputFormat::Text => print!("{}", output::format_text(&reports)),
        OutputFormat::Json => println!(
            "{}",
            output::format_json(&reports, registry_date).context("failed to serialize results")?
        ),
    }

    Ok(reports.iter().all(|r: &TagReport| r.valid))
}

/// Explicit `--config`, else `.langtags.toml` in the working directory.
/// Load failures fall back to defaults with a warning on stderr.
fn load_config(explicit: Option<&Path>) -> LangtagsConfig {
    let default_path = Path::new(CONFIG_FILE_NAME);
    let path = match explicit {
        Some(p) => Some(p),
        None if default_path.is_file() => Some(default_path),
        None => None,
    };

    let (config, warning) = LangtagsConfig::load_or_default(path);
    if let Some(warning) = warning {
        eprintln!("{} {}", "warning:".yellow().bold(), warning);
    }
    config
}

/// `--registry`, then `LANGTAGS_REGISTRY`, then the config file.
fn resolve_registry_path(flag: Option<&Path>, config: &LangtagsConfig) -> Option<PathBuf> {
    if let Some(path) = flag {
        return Some(path.to_path_buf());
    }
    if let Some(value) = std::env::var_os(REGISTRY_ENV)
        && !value.is_empty()
    {
        return Some(PathBuf::from(value));
    }
    config.registry.clone()
}

fn collect_tags(cli: &Cli) -> anyhow::Result<Vec<String>> {
    let mut tags = cli.tags.clone();
    if cli.stdin {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let line = line.context("failed to read tags from stdin")?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            tags.push(line.to_string());
        }
    }
    Ok(tags)
}
