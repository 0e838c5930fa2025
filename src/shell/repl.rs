use std::path::Path;

use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use tracing::warn;

use super::completer::SheetHelper;
use super::formatter::{format_catalog, format_columns, format_result, format_stats, OutputFormat};
use crate::config::AppConfig;
use crate::core::SessionError;
use crate::export::ExportFormat;
use crate::parser::{parse_command, Command};
use crate::session::Session;
use crate::suggest::BUILTIN_TEMPLATES;

const PROMPT: &str = "sheetsql> ";

pub const HELP: &str = "\
Meta-commands:
  \\load FILE...                 Load workbooks (xlsx, xls, ods, csv)
  \\tables, \\dt                  List tables
  \\d TABLE                      Describe a table
  \\save FOLDER/LABEL [QUERY]    Save QUERY, or the last query run
  \\queries, \\lq                 List saved queries
  \\run SELECTOR                 Run a saved query
  \\show SELECTOR                Print a saved query
  \\rename SELECTOR LABEL        Rename a saved query
  \\mv SELECTOR FOLDER           Move a saved query to another folder
  \\edit SELECTOR QUERY          Replace the text of a saved query
  \\rm SELECTOR                  Delete a saved query
  \\mkdir FOLDER                 Create an empty folder
  \\rmdir FOLDER                 Delete a folder and its queries
  \\renamedir OLD NEW            Rename a folder
  \\export PATH [FORMAT]         Write the current result (csv, xlsx, json)
  \\stats                        Summarize the current result
  \\templates                    List query templates
  \\template NAME TABLE          Run a template against a table
  \\suggest TABLE                Propose queries for a table
  \\?                            Show this help
  \\q                            Quit

A SELECTOR is a saved query's FOLDER/LABEL, its id, or an id prefix.
Quote arguments that contain spaces. Anything else is run as SQL.
";

/// Whether the loop keeps reading after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Per-session display settings
#[derive(Debug, Clone, Copy)]
pub struct DisplayOptions {
    pub format: OutputFormat,
    pub max_rows: usize,
}

impl From<&AppConfig> for DisplayOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            format: config.output_format,
            max_rows: config.max_rows,
        }
    }
}

/// Interactive loop with line editing and persistent history
pub fn run(session: &mut Session, config: &AppConfig) -> Result<(), ReadlineError> {
    let mut rl: Editor<SheetHelper, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(SheetHelper::default()));
    refresh_completions(&mut rl, session);
    let display = DisplayOptions::from(config);

    if let Some(path) = &config.history_file {
        // Missing history on first start
        let _ = rl.load_history(path);
    }

    println!("sheetsql {}", env!("CARGO_PKG_VERSION"));
    println!("Catalog: {}", session.catalog().location());
    println!("Type \\? for help, \\q to quit.\n");

    loop {
        match rl.readline(PROMPT) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line);

                let command = match parse_command(line) {
                    Ok(command) => command,
                    Err(e) => {
                        eprintln!("✗ {e}");
                        continue;
                    }
                };

                match dispatch(session, command, display) {
                    Ok((Flow::Quit, _)) => break,
                    Ok((Flow::Continue, output)) => print!("{output}"),
                    Err(e) => eprintln!("✗ {e}"),
                }
                refresh_completions(&mut rl, session);
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("\\q");
                break;
            }
            Err(err) => {
                save_history(&mut rl, config);
                return Err(err);
            }
        }
    }

    save_history(&mut rl, config);
    Ok(())
}

// Queries may create or drop tables
fn refresh_completions(rl: &mut Editor<SheetHelper, DefaultHistory>, session: &Session) {
    if let Some(helper) = rl.helper_mut() {
        match session.completions() {
            Ok(words) => helper.set_words(words),
            Err(e) => warn!(error = %e, "could not refresh completions"),
        }
    }
}

fn save_history(rl: &mut Editor<SheetHelper, DefaultHistory>, config: &AppConfig) {
    if let Some(path) = &config.history_file {
        if let Err(e) = rl.save_history(path) {
            warn!(path = %path.display(), error = %e, "could not save history");
        }
    }
}

/// Execute one parsed command and return what should be printed
pub fn dispatch(session: &mut Session, command: Command, display: DisplayOptions) -> Result<(Flow, String), SessionError> {
    let output = match command {
        Command::Quit => return Ok((Flow::Quit, String::new())),
        Command::Help => HELP.to_string(),
        Command::Sql(query) => match session.execute(&query)? {
            Some(result) => format_result(result, display.format, display.max_rows)?,
            None => String::new(),
        },
        Command::Load(paths) => {
            let tables = session.load_workbooks(&paths)?;
            format!("✓ Loaded {} table(s): {}\n", tables.len(), tables.join(", "))
        }
        Command::Tables => {
            let tables = session.tables()?;
            if tables.is_empty() {
                "(no tables loaded)\n".to_string()
            } else {
                tables.iter().map(|t| format!("{t}\n")).collect()
            }
        }
        Command::Describe(table) => {
            let columns = session.columns(&table)?;
            format_columns(&table, &columns, session.row_count(&table)?)
        }
        Command::Save { full_name, query } => {
            let id = session.save_query(&full_name, query.as_deref())?;
            format!("✓ Saved '{full_name}' [{}]\n", id.short())
        }
        Command::Queries => format_catalog(&session.saved_queries()),
        Command::Run(selector) => match session.run_saved(&selector)? {
            Some(result) => format_result(result, display.format, display.max_rows)?,
            None => String::new(),
        },
        Command::Show(selector) => {
            let entry = session.saved_query(&selector)?;
            format!(
                "{} [{}] saved {}\n{}\n",
                entry.full_name,
                entry.id.short(),
                entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
                entry.query
            )
        }
        Command::Rename { selector, label } => {
            session.rename_saved(&selector, &label)?;
            format!("✓ Renamed to '{label}'\n")
        }
        Command::Move { selector, folder } => {
            session.move_saved(&selector, &folder)?;
            format!("✓ Moved to '{folder}'\n")
        }
        Command::Edit { selector, query } => {
            session.update_saved(&selector, &query)?;
            "✓ Query updated\n".to_string()
        }
        Command::Remove(selector) => {
            let removed = session.delete_saved(&selector)?;
            format!("✓ Deleted '{}'\n", removed.full_name)
        }
        Command::MakeFolder(name) => {
            session.create_folder(&name)?;
            format!("✓ Created folder '{name}'\n")
        }
        Command::RemoveFolder(name) => {
            let removed = session.delete_folder(&name)?;
            format!("✓ Deleted folder '{name}' and {removed} saved quer{}\n", if removed == 1 { "y" } else { "ies" })
        }
        Command::RenameFolder { old, new } => {
            session.rename_folder(&old, &new)?;
            format!("✓ Renamed folder '{old}' to '{new}'\n")
        }
        Command::Export { path, format } => {
            let format = format.map(|f| f.parse::<ExportFormat>()).transpose()?;
            let written = session.export(Path::new(&path), format)?;
            format!("✓ Exported to {}\n", written.display())
        }
        Command::Stats => format_stats(&session.stats()?),
        Command::Templates => BUILTIN_TEMPLATES
            .iter()
            .map(|t| format!("{:<28} {}\n", t.title(), t.text))
            .collect(),
        Command::Template { name, table } => {
            let query = session.template_query(&name, &table)?;
            let mut output = format!("{query}\n");
            if let Some(result) = session.execute(&query)? {
                output.push_str(&format_result(result, display.format, display.max_rows)?);
            }
            output
        }
        Command::Suggest(table) => {
            let (format, queries) = session.suggest(&table)?;
            let mut output = format!("'{table}' looks like {format} data\n");
            for query in queries {
                output.push_str(&format!("  {:<26} {}\n", query.name, query.query));
            }
            output
        }
    };
    Ok((Flow::Continue, output))
}
