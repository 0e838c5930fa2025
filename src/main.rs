use std::path::PathBuf;

use clap::Parser;
use sheetsql::shell::{self, DisplayOptions, OutputFormat};
use sheetsql::{AppConfig, QueryCatalog, Session};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Query spreadsheet workbooks with SQL
#[derive(Parser, Debug)]
#[command(name = "sheetsql")]
#[command(version, about = "Load workbooks into an in-memory SQL engine and query them", long_about = None)]
struct Args {
    /// Workbooks to load at startup (xlsx, xlsm, xlsb, xls, ods, csv)
    workbooks: Vec<PathBuf>,

    /// Run one query, print the result and exit
    #[arg(short = 'c', long = "command")]
    command: Option<String>,

    /// Output format for results
    #[arg(short = 'o', long, value_enum)]
    output: Option<OutputFormat>,

    /// Saved-query catalog file
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Keep saved queries in memory only
    #[arg(long, conflicts_with = "catalog")]
    no_catalog: bool,

    /// Configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "sheetsql=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(args.verbose);

    // CLI args override file and environment settings
    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(path) = args.catalog {
        config.catalog_path = path;
    }
    if let Some(format) = args.output {
        config.output_format = format;
    }
    debug!(?config, "resolved configuration");

    let catalog = if args.no_catalog {
        QueryCatalog::in_memory()
    } else {
        QueryCatalog::open_file(&config.catalog_path)?
    };
    let mut session = Session::new(catalog)?;

    if !args.workbooks.is_empty() {
        let tables = session.load_workbooks(&args.workbooks)?;
        if args.command.is_none() {
            println!("✓ Loaded {} table(s): {}", tables.len(), tables.join(", "));
        }
    }

    match args.command {
        Some(query) => {
            let command = sheetsql::parse_command(&query)?;
            let (_, output) = shell::dispatch(&mut session, command, DisplayOptions::from(&config))?;
            print!("{output}");
        }
        None => shell::run(&mut session, &config)?,
    }

    Ok(())
}
