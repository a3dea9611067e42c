use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use cmdtree_discovery::config::DiscoveryConfig;
use cmdtree_discovery::discover::{collect_package_paths, load_and_validate_packages};
use cmdtree_discovery::discover_command_tree;
use cmdtree_discovery::output::{OutputFormat, format_page_record, format_report, format_tree};
use cmdtree_discovery::parser::PageReader;
use tracing::debug;

/// CLI-specific output format enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
    Markdown,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(fmt: CliOutputFormat) -> Self {
        match fmt {
            CliOutputFormat::Json => Self::Json,
            CliOutputFormat::Yaml => Self::Yaml,
            CliOutputFormat::Markdown => Self::Markdown,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "cmdtree")]
#[command(about = "Command tree discovery from CLI reference documentation")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch the reference index and every group page, and emit the command tree.
    Discover(DiscoverArgs),
    /// Read one saved group page into flat command records.
    ReadPage(ReadPageArgs),
    /// Validate tree package JSON files.
    Validate(ValidateArgs),
}

#[derive(Debug, Args)]
struct DiscoverArgs {
    /// YAML discovery config. Defaults target the Azure CLI reference.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the index page URL.
    #[arg(long)]
    index_url: Option<String>,

    /// Write the tree here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Tree output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,

    /// Write the run report here (YAML for .yaml/.yml, JSON otherwise).
    #[arg(long)]
    report: Option<PathBuf>,

    /// Abort on the first base command failure.
    #[arg(long)]
    fail_fast: bool,
}

#[derive(Debug, Args)]
struct ReadPageArgs {
    /// Saved HTML group page.
    #[arg(long)]
    input: PathBuf,

    /// Config supplying the tool name and path prefix.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format (markdown renders as JSON).
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Package files and/or directories containing package JSON files.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    configure_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Command::Discover(args) => run_discover(args),
        Command::ReadPage(args) => run_read_page(args),
        Command::Validate(args) => run_validate(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn configure_logging(verbose: u8, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<DiscoveryConfig, String> {
    match path {
        Some(path) => DiscoveryConfig::load(path)
            .map_err(|err| format!("Failed to load config '{}': {err}", path.display())),
        None => Ok(DiscoveryConfig::default()),
    }
}

fn run_discover(args: DiscoverArgs) -> Result<(), String> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(index_url) = args.index_url {
        config.index_url = index_url;
    }
    if args.fail_fast {
        config.fail_fast = true;
    }
    debug!(index_url = %config.index_url, "Starting discovery");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| format!("Failed to start async runtime: {err}"))?;
    let outcome = runtime
        .block_on(discover_command_tree(config))
        .map_err(|err| err.to_string())?;

    let raw = format_tree(&outcome.package, args.format.into())?;
    match args.output {
        Some(ref path) => {
            write_file(path, &raw)?;
            println!(
                "Wrote {} node(s) to '{}'.",
                outcome.package.node_count(),
                path.display()
            );
        }
        None => println!("{raw}"),
    }

    if let Some(ref path) = args.report {
        let report_raw = format_report(&outcome.report, report_format(path))?;
        write_file(path, &report_raw)?;
    }

    let report = &outcome.report;
    if !report.failures.is_empty() {
        let breakdown: Vec<String> = report
            .failure_code_summary()
            .iter()
            .map(|(code, count)| format!("{count} {code}"))
            .collect();
        eprintln!(
            "{} base command failure(s) ({}): {}",
            report.failures.len(),
            breakdown.join(", "),
            report.failures.join(", ")
        );
    }

    let warnings: usize = report.base_commands.iter().map(|b| b.warnings.len()).sum();
    if warnings > 0 {
        eprintln!("{warnings} warning(s) emitted during discovery.");
    }

    Ok(())
}

fn run_read_page(args: ReadPageArgs) -> Result<(), String> {
    let config = load_config(args.config.as_deref())?;
    let html = fs::read_to_string(&args.input)
        .map_err(|err| format!("Failed to read '{}': {err}", args.input.display()))?;

    let reader = PageReader::from_config(&config);
    let page = reader.read_page(&html).map_err(|err| err.to_string())?;
    println!("{}", format_page_record(&page, args.format.into())?);
    Ok(())
}

fn run_validate(args: ValidateArgs) -> Result<(), String> {
    let paths = collect_package_paths(&args.inputs).map_err(|e| e.to_string())?;
    let packages = load_and_validate_packages(&paths).map_err(|e| e.to_string())?;
    let nodes: usize = packages.iter().map(|p| p.node_count()).sum();
    println!(
        "Validated {} package file(s) with {nodes} node(s).",
        packages.len()
    );
    Ok(())
}

fn write_file(path: &Path, raw: &str) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| {
                format!(
                    "Failed to create output directory '{}': {err}",
                    parent.display()
                )
            })?;
        }
    }
    fs::write(path, raw).map_err(|err| format!("Failed to write '{}': {err}", path.display()))
}

fn report_format(path: &Path) -> OutputFormat {
    match path.extension().and_then(OsStr::to_str) {
        Some("yaml" | "yml") => OutputFormat::Yaml,
        Some("md") => OutputFormat::Markdown,
        _ => OutputFormat::Json,
    }
}
