//! paramdoc CLI - Resolve report parameters to XML
//!
//! Usage:
//!   paramdoc generate <report> [-p name=value]... [--format xml|json]
//!   paramdoc list <report>
//!   paramdoc validate <report>
//!   paramdoc decode <text>
//!
//! Examples:
//!   paramdoc generate reports/prd3882.toml
//!   paramdoc generate sales -p region=EMEA -p year=2024 --format json
//!   paramdoc decode Gg==

use clap::{Parser, Subcommand, ValueEnum};
use paramdoc::config::Settings;
use paramdoc::encoding;
use paramdoc::generate::{OutputFormat, ParameterContentGenerator};
use paramdoc::report::{self, QuerySource};
use paramdoc::resolver::{DependencyGraph, ParameterOverrides};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "paramdoc")]
#[command(about = "paramdoc - Resolve report parameters and render them as an XML prompt document")]
#[command(version)]
struct Cli {
    /// Config file (defaults to PARAMDOC_CONFIG, ./paramdoc.toml, then the user config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a report's parameters and print the document
    Generate {
        /// Report definition path or logical id
        report: String,

        /// Parameter override as name=value (repeatable)
        #[arg(short, long = "param", value_parser = parse_override)]
        params: Vec<(String, String)>,

        /// Output format
        #[arg(short, long, default_value = "xml")]
        format: FormatArg,
    },

    /// List the parameters and queries a report declares
    List {
        /// Report definition path or logical id
        report: String,
    },

    /// Validate a report definition and its parameter dependencies
    Validate {
        /// Report definition path or logical id
        report: String,
    },

    /// Decode a transport-encoded value
    Decode {
        /// Encoded text as found in a value or label attribute
        text: String,
    },
}

#[derive(Clone, ValueEnum)]
enum FormatArg {
    Xml,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Xml => OutputFormat::Xml,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

fn parse_override(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(name, value)| (name.trim().to_string(), value.to_string()))
        .filter(|(name, _)| !name.is_empty())
        .ok_or_else(|| format!("expected name=value, got '{}'", s))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    };
    let settings = match settings {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = paramdoc::logging::init(&settings.logging, cli.verbose) {
        eprintln!("Warning: {}", e);
    }

    match cli.command {
        Commands::Generate {
            report,
            params,
            format,
        } => cmd_generate(settings, &report, params, format).await,
        Commands::List { report } => cmd_list(&settings, &report),
        Commands::Validate { report } => cmd_validate(&settings, &report),
        Commands::Decode { text } => cmd_decode(&text),
    }
}

async fn cmd_generate(
    settings: Settings,
    report: &str,
    params: Vec<(String, String)>,
    format: FormatArg,
) -> ExitCode {
    let generator = match ParameterContentGenerator::from_settings(settings) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let overrides: ParameterOverrides = params.into_iter().collect();
    let stdout = io::stdout();

    match generator
        .generate(report, &overrides, format.into(), stdout.lock())
        .await
    {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_list(settings: &Settings, report_id: &str) -> ExitCode {
    let path = settings.resolve_report(report_id);
    let report = match report::load(&path) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("Report: {} ({})", report.name, path.display());
    println!();

    if !report.queries.is_empty() {
        println!("Queries:");
        for query in &report.queries {
            match &query.source {
                QuerySource::Static(table) => println!(
                    "  - {} (static: {} columns, {} rows)",
                    query.name,
                    table.column_count(),
                    table.row_count()
                ),
                QuerySource::Connection { connection, .. } => {
                    println!("  - {} (connection: {})", query.name, connection)
                }
            }
        }
        println!();
    }

    if report.parameters.is_empty() {
        println!("No parameters declared.");
        return ExitCode::SUCCESS;
    }

    println!("Parameters:");
    for param in &report.parameters {
        let mut line = format!(
            "  - {} ({}, {})",
            param.name,
            param.value_type,
            param.kind.as_str()
        );
        if let Some(list) = &param.list {
            line.push_str(&format!(" list from '{}'", list.query));
        }
        if param.mandatory {
            line.push_str(" mandatory");
        }
        if !param.depends_on.is_empty() {
            line.push_str(&format!(" depends on {}", param.depends_on.join(", ")));
        }
        println!("{}", line);
    }

    ExitCode::SUCCESS
}

fn cmd_validate(settings: &Settings, report_id: &str) -> ExitCode {
    let path = settings.resolve_report(report_id);
    let report = match report::load(&path) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Validation error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = DependencyGraph::build(&report) {
        eprintln!("Validation error: {}", e);
        return ExitCode::FAILURE;
    }

    println!("OK: {} is valid", path.display());
    ExitCode::SUCCESS
}

fn cmd_decode(text: &str) -> ExitCode {
    match encoding::decode(text) {
        Ok(decoded) => {
            println!("{:?}", decoded);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
