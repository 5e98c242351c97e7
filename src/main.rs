use std::{env, io::Write, path::PathBuf, process::ExitCode};

use pindai::{
    shell::{Command, run_command},
    storage::storage_manager::StorageManager,
};
use rustyline::{DefaultEditor, error::ReadlineError};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: pindai <database-file> [command]";

fn read_multiline_command(rl: &mut DefaultEditor) -> rustyline::Result<String> {
    let mut input = String::new();
    let mut prompt = "pindai> ".to_string();

    loop {
        let line = rl.readline(&prompt)?;
        let trimmed_line = line.trim_end();

        // Check if line ends with backslash (multiline continuation)
        if let Some(continued) = trimmed_line.strip_suffix('\\') {
            input.push_str(continued);
            input.push(' ');
            prompt = "   ...> ".to_string();
        } else {
            input.push_str(trimmed_line);
            break;
        }
    }

    Ok(input)
}

fn history_path() -> PathBuf {
    env::var_os("PINDAI_HISTORY")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(".pindai_history"))
}

fn run_shell(db: &mut StorageManager) -> rustyline::Result<()> {
    let mut rl = DefaultEditor::new()?;
    let history = history_path();
    if rl.load_history(&history).is_err() {
        debug!(path = %history.display(), "no shell history loaded");
    }

    let mut stdout = std::io::stdout();
    loop {
        match read_multiline_command(&mut rl) {
            Ok(input) => {
                let input = input.trim();
                if input.is_empty() {
                    continue;
                }
                rl.add_history_entry(input)?;

                match Command::parse(input) {
                    Ok(Command::Exit) => break,
                    Ok(command) => {
                        if let Err(err) = run_command(db, &command, &mut stdout) {
                            eprintln!("Error: {}", err);
                        }
                    }
                    Err(err) => eprintln!("Error: {}", err),
                }
                let _ = stdout.flush();
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err),
        }
    }

    if let Err(err) = rl.save_history(&history) {
        warn!(path = %history.display(), error = %err, "failed to save shell history");
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let (path, command) = match args.as_slice() {
        [path] => (path, None),
        [path, command] => (path, Some(command)),
        _ => {
            eprintln!("{}", USAGE);
            return ExitCode::from(2);
        }
    };

    let mut db = match StorageManager::open(path) {
        Ok(db) => db,
        Err(err) => {
            eprintln!("Error: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let outcome = match command {
        Some(command) => Command::parse(command)
            .and_then(|command| run_command(&mut db, &command, &mut std::io::stdout())),
        None => match run_shell(&mut db) {
            Ok(()) => Ok(()),
            Err(err) => {
                eprintln!("Error: {}", err);
                return ExitCode::FAILURE;
            }
        },
    };

    db.close();
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}
