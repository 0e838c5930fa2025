use clap::{Parser, Subcommand};
use sheetsql::catalog::backend::{decode, encode};
use sheetsql::catalog::{CatalogBackend, JsonFileBackend};
use sheetsql::shell::format_catalog;
use sheetsql::{AppConfig, QueryCatalog};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "sheetsql_catalog")]
#[command(about = "Inspect, back up and restore the sheetsql saved-query catalog", long_about = None)]
struct Args {
    /// Catalog file (default: from configuration)
    #[arg(long)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    action: Action,
}

#[derive(Debug, Subcommand)]
enum Action {
    /// Print saved queries grouped by folder
    List,
    /// Write the catalog document
    Dump {
        /// Output file (default: stdout)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },
    /// Replace the catalog with a dump or a legacy array-style catalog file
    Restore {
        /// File to read
        input: PathBuf,

        /// Overwrite a catalog that already holds queries
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let catalog_path = match args.catalog {
        Some(path) => path,
        None => AppConfig::load(None)?.catalog_path,
    };

    match args.action {
        Action::List => {
            let catalog = QueryCatalog::open_file(&catalog_path)?;
            print!("{}", format_catalog(&catalog.list()));
        }
        Action::Dump { output } => {
            let snapshot = JsonFileBackend::new(&catalog_path).load()?;
            let document = encode(&snapshot)?;

            // Determine output writer (stdout or file)
            let mut out: Box<dyn Write> = if let Some(path) = &output {
                Box::new(File::create(path)?)
            } else {
                Box::new(io::stdout())
            };
            writeln!(out, "{document}")?;
        }
        Action::Restore { input, force } => {
            let snapshot = decode(&fs::read_to_string(&input)?, &input)?;

            let mut backend = JsonFileBackend::new(&catalog_path);
            let existing = backend.load()?;
            if !existing.entries.is_empty() && !force {
                eprintln!(
                    "✗ {} already holds {} saved queries; use --force to replace them",
                    catalog_path.display(),
                    existing.entries.len()
                );
                std::process::exit(1);
            }

            backend.persist(&snapshot)?;
            println!(
                "✓ Restored {} folders and {} saved queries into {}",
                snapshot.folders.len(),
                snapshot.entries.len(),
                catalog_path.display()
            );
        }
    }

    Ok(())
}
