use super::command::Command;
use super::common::{argument, arguments, command_name, remainder};
use crate::core::ParseError;
use nom::sequence::pair;

/// Parse a `\`-prefixed meta-command and its arguments
pub fn meta_command(input: &str) -> Result<Command, ParseError> {
    let (args, name) = command_name(input)
        .map_err(|_| ParseError::UnknownCommand(input.trim_start_matches('\\').to_string()))?;

    match name {
        "q" | "quit" => Ok(Command::Quit),
        "?" | "h" | "help" => Ok(Command::Help),
        "load" | "i" => {
            let paths = words(args);
            if paths.is_empty() {
                Err(ParseError::Usage("\\load FILE..."))
            } else {
                Ok(Command::Load(paths))
            }
        }
        "tables" | "dt" => Ok(Command::Tables),
        // psql: \d alone lists tables
        "d" => match <[String; 1]>::try_from(words(args)) {
            Ok([table]) => Ok(Command::Describe(table)),
            Err(rest) if rest.is_empty() => Ok(Command::Tables),
            Err(_) => Err(ParseError::Usage("\\d [TABLE]")),
        },
        "save" => {
            let usage = ParseError::Usage("\\save FOLDER/LABEL [QUERY]");
            let (_, (full_name, query)) = pair(argument, remainder)(args).map_err(|_| usage)?;
            Ok(Command::Save { full_name, query })
        }
        "queries" | "lq" => Ok(Command::Queries),
        "run" => exactly::<1>(args, "\\run SELECTOR").map(|[s]| Command::Run(s)),
        "show" => exactly::<1>(args, "\\show SELECTOR").map(|[s]| Command::Show(s)),
        "rename" => exactly::<2>(args, "\\rename SELECTOR LABEL")
            .map(|[selector, label]| Command::Rename { selector, label }),
        "mv" => exactly::<2>(args, "\\mv SELECTOR FOLDER")
            .map(|[selector, folder]| Command::Move { selector, folder }),
        "edit" => {
            let usage = "\\edit SELECTOR QUERY";
            match pair(argument, remainder)(args) {
                Ok((_, (selector, Some(query)))) => Ok(Command::Edit { selector, query }),
                _ => Err(ParseError::Usage(usage)),
            }
        }
        "rm" => exactly::<1>(args, "\\rm SELECTOR").map(|[s]| Command::Remove(s)),
        "mkdir" => exactly::<1>(args, "\\mkdir FOLDER").map(|[f]| Command::MakeFolder(f)),
        "rmdir" => exactly::<1>(args, "\\rmdir FOLDER").map(|[f]| Command::RemoveFolder(f)),
        "renamedir" => {
            exactly::<2>(args, "\\renamedir OLD NEW").map(|[old, new]| Command::RenameFolder { old, new })
        }
        "export" | "o" => {
            let mut words = words(args).into_iter();
            match (words.next(), words.next(), words.next()) {
                (Some(path), format, None) => Ok(Command::Export { path, format }),
                _ => Err(ParseError::Usage("\\export PATH [csv|xlsx|json]")),
            }
        }
        "stats" => Ok(Command::Stats),
        "templates" => Ok(Command::Templates),
        "template" => exactly::<2>(args, "\\template NAME TABLE")
            .map(|[name, table]| Command::Template { name, table }),
        "suggest" => exactly::<1>(args, "\\suggest TABLE").map(|[t]| Command::Suggest(t)),
        other => Err(ParseError::UnknownCommand(other.to_string())),
    }
}

fn words(input: &str) -> Vec<String> {
    arguments(input).map(|(_, args)| args).unwrap_or_default()
}

fn exactly<const N: usize>(input: &str, usage: &'static str) -> Result<[String; N], ParseError> {
    <[String; N]>::try_from(words(input)).map_err(|_| ParseError::Usage(usage))
}
