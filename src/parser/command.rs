/// One line of REPL input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Anything that is not a meta-command goes to the engine as-is
    Sql(String),
    Load(Vec<String>),
    Tables,
    Describe(String),
    Save {
        full_name: String,
        query: Option<String>,
    },
    Queries,
    Run(String),
    Show(String),
    Rename {
        selector: String,
        label: String,
    },
    Move {
        selector: String,
        folder: String,
    },
    Edit {
        selector: String,
        query: String,
    },
    Remove(String),
    MakeFolder(String),
    RemoveFolder(String),
    RenameFolder {
        old: String,
        new: String,
    },
    Export {
        path: String,
        format: Option<String>,
    },
    Stats,
    Templates,
    Template {
        name: String,
        table: String,
    },
    Suggest(String),
    Help,
    Quit,
}
