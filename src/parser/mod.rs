// Module declarations
mod command;
mod common;
mod meta;

pub use command::Command;

use crate::core::ParseError;
use common::ws;
use nom::{
    branch::alt,
    bytes::complete::tag_no_case,
    combinator::all_consuming,
};

/// Classify one line of REPL input.
///
/// Lines starting with `\` are meta-commands; bare `quit`/`exit` leave;
/// everything else is handed to the engine as SQL.
pub fn parse_command(input: &str) -> Result<Command, ParseError> {
    let input = input.trim();

    if input.starts_with('\\') {
        return meta::meta_command(input);
    }

    let quit: nom::IResult<&str, &str> =
        all_consuming(ws(alt((tag_no_case("quit"), tag_no_case("exit")))))(input);
    if quit.is_ok() {
        return Ok(Command::Quit);
    }

    Ok(Command::Sql(input.to_string()))
}
