//! Tab completion over meta-commands and the tables currently loaded.

use rustyline::completion::Completer;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

const META_COMMANDS: &[&str] = &[
    "\\load", "\\tables", "\\dt", "\\d", "\\save", "\\queries", "\\lq", "\\run", "\\show", "\\rename", "\\mv",
    "\\edit", "\\rm", "\\mkdir", "\\rmdir", "\\renamedir", "\\export", "\\stats", "\\templates", "\\template",
    "\\suggest", "\\help", "\\q",
];

/// Line-editor helper; `words` holds table and `table.column` names
#[derive(Debug, Default)]
pub struct SheetHelper {
    words: Vec<String>,
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '.' | '\\')
}

impl SheetHelper {
    pub fn set_words(&mut self, words: Vec<String>) {
        self.words = words;
    }

    /// Start of the word before `pos` and the known names it prefixes, case-insensitively
    #[must_use]
    pub fn candidates(&self, line: &str, pos: usize) -> (usize, Vec<String>) {
        let head = line.get(..pos).unwrap_or(line);
        let start = head
            .char_indices()
            .rev()
            .take_while(|(_, c)| is_word_char(*c))
            .last()
            .map_or(head.len(), |(i, _)| i);

        let prefix = head[start..].to_lowercase();
        if prefix.is_empty() {
            return (start, Vec::new());
        }

        let mut matches: Vec<String> = META_COMMANDS
            .iter()
            .map(|c| (*c).to_string())
            .chain(self.words.iter().cloned())
            .filter(|w| w.to_lowercase().starts_with(&prefix))
            .collect();
        matches.sort();
        matches.dedup();
        (start, matches)
    }
}

impl Completer for SheetHelper {
    type Candidate = String;

    fn complete(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> rustyline::Result<(usize, Vec<String>)> {
        Ok(self.candidates(line, pos))
    }
}

impl Hinter for SheetHelper {
    type Hint = String;
}

impl Highlighter for SheetHelper {}

impl Validator for SheetHelper {}

impl Helper for SheetHelper {}
