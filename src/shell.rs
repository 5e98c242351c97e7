use std::io::Write;

use crate::{
    storage::storage_manager::StorageManager,
    types::error::DatabaseError,
};

pub const HELP_TEXT: &str = r#"
Available commands:
  .dbinfo          - Show the page size and number of tables
  .tables          - List user tables
  .help            - Show this help message
  .exit, .quit     - Leave the shell
  SELECT ...       - Run a query (one table, COUNT(*) or columns, WHERE col = value)

Use '\' at the end of a line for multiline input.
Use Up/Down arrows to navigate command history.
"#;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    DbInfo,
    Tables,
    Help,
    Exit,
    Sql(String),
}

impl Command {
    /// Dot-prefixed input is a shell command; anything else is SQL.
    pub fn parse(input: &str) -> Result<Self, DatabaseError> {
        let trimmed = input.trim();
        match trimmed {
            ".dbinfo" => Ok(Command::DbInfo),
            ".tables" => Ok(Command::Tables),
            ".help" => Ok(Command::Help),
            ".exit" | ".quit" => Ok(Command::Exit),
            dot if dot.starts_with('.') => Err(DatabaseError::UnknownCommand(dot.to_string())),
            sql => Ok(Command::Sql(sql.to_string())),
        }
    }
}

/// Run one command. Output is produced in full before anything is written,
/// so a failing command writes nothing.
pub fn run_command<W: Write>(
    db: &mut StorageManager,
    command: &Command,
    out: &mut W,
) -> Result<(), DatabaseError> {
    let lines = match command {
        Command::DbInfo => {
            let info = db.database_info();
            vec![
                format!("database page size: {}", info.page_size),
                format!("number of tables: {}", info.table_count),
            ]
        }
        Command::Tables => vec![db.get_table_names().join(" ")],
        Command::Help => vec![HELP_TEXT.trim_matches('\n').to_string()],
        Command::Exit => Vec::new(),
        Command::Sql(sql) => db.execute_sql(sql)?.lines(),
    };

    for line in lines {
        writeln!(out, "{}", line)?;
    }
    Ok(())
}
