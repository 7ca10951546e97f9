//! Command-line interface for codeward.

use clap::{ArgAction, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use crate::analysis::{AnalysisResult, Severity};
use crate::config::Config;
use crate::report::{self, OutputFormat};
use crate::server::McpServer;
use crate::service::Service;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Environment variable holding the log filter.
pub const ENV_LOG: &str = "CODEWARD_LOG";

/// Security review service backed by a language model.
///
/// Without a subcommand codeward speaks MCP (line-delimited JSON-RPC) on
/// stdin/stdout, exposing `analyze_security`, `health_check` and
/// `list_supported_languages` tools.
#[derive(Parser)]
#[command(name = "codeward")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a YAML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the MCP server on stdin/stdout (default)
    Serve,
    /// Analyze a source file and print a report
    Analyze(AnalyzeArgs),
    /// Check service and backend health
    Health,
    /// List supported languages
    Languages,
    /// Print the server name and version
    Version,
}

/// Arguments for the analyze command.
#[derive(Parser)]
pub struct AnalyzeArgs {
    /// Source file to analyze
    pub path: PathBuf,

    /// Language tag, or "auto" to classify
    #[arg(short, long)]
    pub language: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Markdown)]
    pub format: OutputFormat,

    /// Exit with status 1 when a finding at or above this severity exists
    #[arg(long, value_name = "SEVERITY")]
    pub fail_on: Option<Severity>,
}

/// Install the stderr log subscriber. stdout carries protocol and reports.
pub fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_env(ENV_LOG).unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Load configuration, reporting failures the way every command does.
pub fn load_config(path: Option<&std::path::Path>) -> Result<Config, i32> {
    Config::load(path).map_err(|e| {
        eprintln!("Error: {:#}", e);
        EXIT_ERROR
    })
}

fn build_service(config: Config) -> Result<Service, i32> {
    Service::from_config(config).map_err(|e| {
        eprintln!("Error: {}", e);
        EXIT_ERROR
    })
}

/// Dispatch a parsed command line.
pub async fn run(cli: Cli) -> i32 {
    let config = match load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(code) => return code,
    };

    if let Some(Commands::Version) = cli.command {
        println!("{}", version_line(&config));
        return EXIT_SUCCESS;
    }

    let service = match build_service(config) {
        Ok(s) => s,
        Err(code) => return code,
    };

    let result = match cli.command {
        None | Some(Commands::Serve) => run_serve(service).await,
        Some(Commands::Analyze(args)) => {
            run_analyze(&service, &args, &mut std::io::stdout().lock()).await
        }
        Some(Commands::Health) => Ok(run_health(&service).await),
        Some(Commands::Languages) => Ok(run_languages(&service)),
        Some(Commands::Version) => Ok(EXIT_SUCCESS),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            EXIT_ERROR
        }
    }
}

/// `<name> v<version>`.
pub fn version_line(config: &Config) -> String {
    format!("{} v{}", config.server.name, config.server.version)
}

/// Run the MCP server until stdin closes.
pub async fn run_serve(service: Service) -> anyhow::Result<i32> {
    McpServer::new(service).serve_stdio().await?;
    Ok(EXIT_SUCCESS)
}

/// Run the analyze command, writing the report to `out`.
pub async fn run_analyze<W: Write>(
    service: &Service,
    args: &AnalyzeArgs,
    out: &mut W,
) -> anyhow::Result<i32> {
    let code = match std::fs::read_to_string(&args.path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: cannot read {}: {}", args.path.display(), e);
            return Ok(EXIT_ERROR);
        }
    };

    let path_str = args.path.to_string_lossy().to_string();
    let spinner = spinner(&format!("Analyzing {}...", path_str));

    let outcome = service
        .analyze(&code, Some(&path_str), args.language.as_deref())
        .await;

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    let result = match outcome {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let rendered = report::render(&result, args.format)?;
    writeln!(out, "{}", rendered.trim_end())?;

    if exceeds_threshold(&result, args.fail_on) {
        Ok(EXIT_FAILED)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

/// True when some finding is at or above `fail_on`.
pub fn exceeds_threshold(result: &AnalysisResult, fail_on: Option<Severity>) -> bool {
    match (fail_on, result.max_severity()) {
        (Some(threshold), Some(max)) => max >= threshold,
        _ => false,
    }
}

fn spinner(message: &str) -> Option<ProgressBar> {
    if !std::io::stderr().is_terminal() {
        return None;
    }
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg} [{elapsed}]") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    Some(spinner)
}

/// Run the health command. Always succeeds; the status says what is wrong.
pub async fn run_health(service: &Service) -> i32 {
    let health = service.health().await;
    report::write_health(&health);
    EXIT_SUCCESS
}

/// Run the languages command.
pub fn run_languages(service: &Service) -> i32 {
    report::write_languages(&service.supported_languages());
    EXIT_SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["codeward"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_analyze_args() {
        let cli = Cli::try_parse_from([
            "codeward", "-v", "analyze", "App.java", "--format", "sarif", "--fail-on", "high",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Some(Commands::Analyze(args)) => {
                assert_eq!(args.path, PathBuf::from("App.java"));
                assert_eq!(args.format, OutputFormat::Sarif);
                assert_eq!(args.fail_on, Some(Severity::High));
                assert_eq!(args.language, None);
            }
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["codeward", "analyze", "a.java", "--format", "xml"]).is_err());
    }

    #[test]
    fn test_version_line() {
        let config = Config::default();
        assert_eq!(
            version_line(&config),
            format!("codeward v{}", env!("CARGO_PKG_VERSION"))
        );
    }
}
