use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use anyhow::Result;
use std::path::{Path, PathBuf};

use schemadoc_catalog::open_source_in;
use schemadoc_core::{Config, Report, Schema};
use schemadoc_graph::{detect_full_table_name, RelationGraph};
use schemadoc_lint::Linter;

mod dot;

const DEFAULT_CONFIG: &str = "schemadoc.toml";
const DSN_ENV: &str = "SCHEMADOC_DSN";
const LOG_ENV: &str = "SCHEMADOC_LOG";

/// SchemaDoc - Database schema documentation and linting
#[derive(Parser)]
#[command(name = "schemadoc")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: schemadoc.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lint the schema against the configured rules
    Lint {
        /// Output file for report.json
        #[arg(short, long, default_value = "report.json")]
        output: PathBuf,

        /// Also output markdown report
        #[arg(short, long)]
        markdown: Option<PathBuf>,
    },

    /// Show a table and its related tables within a number of hops
    Closure {
        /// Table name (qualified, or resolved through the search path)
        table: String,

        /// Hops to follow (default: er.distance from config)
        #[arg(short, long)]
        distance: Option<usize>,

        /// Leave the starting table out of the table list
        #[arg(long)]
        no_root: bool,

        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,
    },

    /// Print the whole schema as Graphviz DOT
    Dot,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Dot,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    init_tracing(cli.verbose);

    let mut config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else if Path::new(DEFAULT_CONFIG).exists() {
        Config::from_file(Path::new(DEFAULT_CONFIG))?
    } else {
        if cli.verbose {
            eprintln!("{}", "No config file found, using defaults".yellow());
        }
        Config::default()
    };

    if let Ok(dsn) = std::env::var(DSN_ENV) {
        config = config.with_dsn(dsn);
    }

    match cli.command {
        Commands::Lint { output, markdown } => {
            lint_command(&config, &output, markdown.as_deref(), cli.verbose).await
        }
        Commands::Closure { table, distance, no_root, format } => {
            let distance = distance.unwrap_or(config.er.distance);
            closure_command(&config, &table, distance, !no_root, format, cli.verbose).await
        }
        Commands::Dot => dot_command(&config, cli.verbose).await,
    }
}

/// Log to stderr, filtered by SCHEMADOC_LOG
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn load_schema(config: &Config, verbose: bool) -> Result<Schema> {
    let dsn = config.dsn.as_ref().ok_or_else(|| {
        anyhow::anyhow!(
            "No data source configured. Set `dsn` in {} or the {} environment variable.",
            DEFAULT_CONFIG,
            DSN_ENV
        )
    })?;

    let source = open_source_in(dsn, &config.project_root)?;
    if verbose {
        eprintln!("{} {} source", "Loading schema from".cyan(), source.name());
    }

    source
        .load()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load schema: {}", e))
}

/// Lint command - run every enabled rule and write the report
async fn lint_command(
    config: &Config,
    output: &Path,
    markdown: Option<&Path>,
    verbose: bool,
) -> Result<()> {
    let schema = load_schema(config, verbose).await?;

    let linter = Linter::from_config(config);
    if verbose {
        eprintln!(
            "{} {} rules over {} tables...",
            "Running".cyan(),
            linter.enabled_count(),
            schema.tables.len()
        );
    }

    let report = linter.report(&schema);

    report.save_to_file(output)?;
    if verbose {
        eprintln!("{} {}", "Report saved to:".green(), output.display());
    }

    if let Some(md_path) = markdown {
        std::fs::write(md_path, report.to_markdown())?;
        if verbose {
            eprintln!("{} {}", "Markdown report saved to:".green(), md_path.display());
        }
    }

    print_report_summary(&report);

    if report.has_warnings() {
        std::process::exit(1);
    }

    Ok(())
}

/// Closure command - print a table's neighborhood
async fn closure_command(
    config: &Config,
    table: &str,
    distance: usize,
    include_root: bool,
    format: OutputFormat,
    verbose: bool,
) -> Result<()> {
    let schema = load_schema(config, verbose).await?;

    let name = if schema.table_position(table).is_some() {
        table.to_string()
    } else {
        detect_full_table_name(table, schema.search_paths(), schema.table_names())
            .map_err(|e| anyhow::anyhow!("Unknown table '{}': {}", table, e))?
    };

    if verbose {
        eprintln!("{} {} (distance {})", "Collecting closure of".cyan(), name, distance);
    }

    let graph = RelationGraph::from_schema(&schema);
    let closure = graph.closure(&name, distance, include_root)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&closure)?),
        OutputFormat::Dot => {
            print!("{}", dot::render_closure(&name, &closure, config.er.comment));
        }
    }

    Ok(())
}

/// Dot command - render the whole schema
async fn dot_command(config: &Config, verbose: bool) -> Result<()> {
    let schema = load_schema(config, verbose).await?;

    let tables: Vec<_> = schema.tables.iter().chain(schema.external_tables.iter()).collect();
    let relations: Vec<_> = schema.relations.iter().collect();
    print!("{}", dot::render(&schema.name, &tables, &relations, config.er.comment));

    Ok(())
}

/// Print report summary to stdout
fn print_report_summary(report: &Report) {
    println!("\n{}", "=".repeat(60).bright_blue());
    println!("{}", "Schema Lint Report".bold().bright_blue());
    println!("{}", "=".repeat(60).bright_blue());
    println!();

    println!("Schema: {}", report.schema);
    println!("Version: {}", report.version);
    println!("Timestamp: {}", report.timestamp);
    println!();

    println!("{}", "Summary:".bold());
    println!("  Rules run:      {}", report.summary.rules_run);
    println!("  Tables checked: {}", report.summary.tables_checked);
    if report.summary.total > 0 {
        println!("  Warnings:       {}", format!("{}", report.summary.total).yellow().bold());
    } else {
        println!("  Warnings:       {}", format!("{}", report.summary.total).green());
    }
    println!();

    if report.warnings.is_empty() {
        println!("{}", "✓ No issues found!".green().bold());
    } else {
        println!("{}", "Warnings:".bold());
        for warning in &report.warnings {
            println!(
                "  [{}] {}: {}",
                warning.rule.as_str().yellow(),
                warning.target,
                warning.message
            );
        }
    }

    println!();
    println!("{}", "=".repeat(60).bright_blue());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn closure_flags() {
        let cli = Cli::try_parse_from([
            "schemadoc", "closure", "orders", "--distance", "3", "--no-root", "--format", "dot",
        ])
        .unwrap();

        match cli.command {
            Commands::Closure { table, distance, no_root, format } => {
                assert_eq!(table, "orders");
                assert_eq!(distance, Some(3));
                assert!(no_root);
                assert!(matches!(format, OutputFormat::Dot));
            }
            _ => panic!("expected closure command"),
        }
    }
}
