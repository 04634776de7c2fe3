use clap::Parser;
use colored::Colorize;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

use apiuse::pattern::parse_patterns;
use apiuse::{ReportFormat, UseConfig, UseReporter, UseTask};

/// apiuse - Find API and internal use across the components of a distribution
#[derive(Parser, Debug)]
#[command(name = "apiuse")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Baseline snapshot file or directory to search
    baseline: Option<PathBuf>,

    /// Report file to write (removed before the search starts)
    #[arg(short, long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Report references to API members
    #[arg(long)]
    api: bool,

    /// Report references to internal members
    #[arg(long)]
    internal: bool,

    /// Regex selecting the components to scan (must match the whole id)
    #[arg(long, value_name = "REGEX")]
    scope_pattern: Option<String>,

    /// Regex selecting the components references are reported into
    #[arg(long, value_name = "REGEX")]
    reference_pattern: Option<String>,

    /// Archives to skip, comma-separated `componentId:suffix` entries
    #[arg(long, value_name = "LIST")]
    archive_patterns: Option<String>,

    /// Package regexes to treat as API (comma-separated)
    #[arg(long, value_name = "LIST")]
    api_patterns: Option<String>,

    /// Package regexes to treat as internal (comma-separated)
    #[arg(long, value_name = "LIST")]
    internal_patterns: Option<String>,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Scan components in parallel
    #[arg(long)]
    parallel: bool,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode - only write the report file
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum OutputFormat {
    Terminal,
    Json,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Terminal => ReportFormat::Terminal,
            OutputFormat::Json => ReportFormat::Json,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    info!("apiuse v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&cli)?;
    run(config, &cli)
}

fn init_logging(verbose: bool, quiet: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<UseConfig> {
    let mut config = if let Some(config_path) = &cli.config {
        UseConfig::from_file(config_path)?
    } else {
        let cwd = std::env::current_dir().into_diagnostic()?;
        UseConfig::from_default_locations(&cwd)?
    };

    // Override with CLI arguments
    if cli.baseline.is_some() {
        config.baseline = cli.baseline.clone();
    }
    if cli.report.is_some() {
        config.report = cli.report.clone();
    }
    if cli.api {
        config.include_api = true;
    }
    if cli.internal {
        config.include_internal = true;
    }
    if cli.scope_pattern.is_some() {
        config.scope_pattern = cli.scope_pattern.clone();
    }
    if cli.reference_pattern.is_some() {
        config.reference_pattern = cli.reference_pattern.clone();
    }
    if let Some(patterns) = parse_patterns(cli.archive_patterns.as_deref()) {
        config.archive_patterns = Some(patterns);
    }
    if let Some(patterns) = parse_patterns(cli.api_patterns.as_deref()) {
        config.api_patterns = Some(patterns);
    }
    if let Some(patterns) = parse_patterns(cli.internal_patterns.as_deref()) {
        config.internal_patterns = Some(patterns);
    }
    if let Some(format) = cli.format {
        config.format = format.into();
    }
    if cli.parallel {
        config.parallel = true;
    }

    Ok(config)
}

fn run(config: UseConfig, cli: &Cli) -> Result<()> {
    let start_time = Instant::now();

    let task = UseTask::new(config)
        .into_diagnostic()?
        .with_progress(!cli.quiet);

    let (Some(report), format) = (task.config().report.clone(), task.config().format) else {
        return Err(miette::miette!("No report location given"));
    };
    let mut reporter = UseReporter::new(report)
        .with_format(format)
        .with_quiet(cli.quiet);

    let stats = task.execute(&mut reporter)?;
    reporter.finish()?;

    if !cli.quiet && format == ReportFormat::Terminal {
        println!(
            "{}",
            format!(
                "Searched {} components in {:.2}s",
                stats.components_scanned,
                start_time.elapsed().as_secs_f64()
            )
            .dimmed()
        );
    }

    Ok(())
}
