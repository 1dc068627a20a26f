mod logging;

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{info, warn};

use complexity_core::config::{Config, CONFIG_FILE_NAME};
use complexity_core::{AnalysisPipeline, CancellationToken, TechnologyPlugin};

use complexity_cpp::CppPlugin;
use complexity_dotnet::DotNetPlugin;
use complexity_python::PythonPlugin;
use complexity_report::{json, markdown, text};
use complexity_typescript::TypeScriptPlugin;

use logging::LoggingConfig;

#[derive(Parser)]
#[command(name = "complexity")]
#[command(about = "Estimate code complexity and team size for multi-project repositories")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Minimum level for diagnostics on stderr (RUST_LOG overrides)
    #[arg(long, global = true, default_value = "warn", value_parser = logging::LEVELS)]
    log_level: String,
    /// Emit diagnostics as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a local repository checkout and print a report
    Analyze(AnalyzeArgs),
    /// Create a default .complexity.toml configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
    /// List registered technology plugins in discovery order
    Plugins,
}

#[derive(Args)]
struct AnalyzeArgs {
    /// Path to the repository root
    path: PathBuf,
    /// Repository URL shown in the report (defaults to the path)
    #[arg(long)]
    url: Option<String>,
    /// Config file path (defaults to .complexity.toml in the repository or a parent)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Report format
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Markdown)]
    format: ReportFormat,
    /// Write the report to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Projects analyzed concurrently (overrides project.jobs)
    #[arg(short, long)]
    jobs: Option<usize>,
    /// Single-line JSON (only with --format json)
    #[arg(long)]
    compact: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Markdown,
    Text,
    Json,
}

fn main() {
    let cli = Cli::parse();

    logging::init_logging(&LoggingConfig {
        level: logging::parse_level(&cli.log_level),
        use_json: cli.log_json,
    });

    let result = match cli.command {
        Commands::Analyze(args) => cmd_analyze(args),
        Commands::Init { force } => cmd_init(force),
        Commands::Plugins => cmd_plugins(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(2);
    }
}

fn cmd_analyze(args: AnalyzeArgs) -> Result<()> {
    let path = args.path.as_path();
    let mut config = load_config(path, args.config.as_deref())?;
    if let Some(jobs) = args.jobs {
        config.project.jobs = jobs;
    }

    let plugins = registered_plugins(&config);
    if plugins.is_empty() {
        warn!("every plugin is disabled by configuration, no projects will be found");
    }

    // A missing path is reported by the pipeline, so canonicalization is best effort.
    let repo_root = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let repo_url = args.url.unwrap_or_else(|| path.display().to_string());

    let pipeline = AnalysisPipeline::new(plugins, config);
    let analysis = pipeline
        .analyze_repository(&repo_root, &repo_url, &CancellationToken::new())
        .with_context(|| format!("failed to analyze {}", path.display()))?;

    let report = match args.format {
        ReportFormat::Markdown => markdown::format_report(&analysis),
        ReportFormat::Text => text::format_report(&analysis),
        ReportFormat::Json => {
            json::format_report(&analysis, args.compact).context("failed to serialize report")?
        }
    };

    match args.output.as_deref() {
        Some(target) => write_report(target, &report)?,
        None => print!("{report}"),
    }
    Ok(())
}

fn cmd_init(force: bool) -> Result<()> {
    let target = PathBuf::from(CONFIG_FILE_NAME);
    if target.exists() && !force {
        anyhow::bail!("{CONFIG_FILE_NAME} already exists. Use --force to overwrite.");
    }
    fs::write(&target, Config::default_toml())
        .with_context(|| format!("failed to write {CONFIG_FILE_NAME}"))?;
    println!("Created {CONFIG_FILE_NAME} with default configuration.");
    Ok(())
}

fn cmd_plugins() -> Result<()> {
    for plugin in all_plugins() {
        println!("{}", plugin.name());
    }
    Ok(())
}

/// Every plugin this binary ships with, in registration order.
fn all_plugins() -> Vec<Box<dyn TechnologyPlugin>> {
    vec![
        Box::new(DotNetPlugin::new()),
        Box::new(TypeScriptPlugin::new()),
        Box::new(PythonPlugin::new()),
        Box::new(CppPlugin::new()),
    ]
}

fn registered_plugins(config: &Config) -> Vec<Box<dyn TechnologyPlugin>> {
    all_plugins()
        .into_iter()
        .filter(|plugin| config.project.plugin_enabled(plugin.name()))
        .collect()
}

fn load_config(repo_path: &Path, config_path: Option<&Path>) -> Result<Config> {
    match config_path {
        Some(p) => Config::load(p),
        None => Ok(Config::load_or_default(repo_path)),
    }
}

fn write_report(target: &Path, report: &str) -> Result<()> {
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(target, report).with_context(|| format!("failed to write {}", target.display()))?;
    info!(path = %target.display(), "report saved");
    println!("Report written to {}", target.display());
    Ok(())
}
