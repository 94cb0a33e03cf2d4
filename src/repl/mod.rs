pub mod commands;

pub use commands::{MetaCommand, Statement};

use std::io::Write;
use std::path::PathBuf;

use log::info;

use crate::storage::StudentStore;

/// Starts an interactive session against the store backed by `path`.
///
/// The data file is loaded up front (a missing or empty file means a
/// fresh store) and written back on `.exit`.
pub fn start_repl(name: String, path: PathBuf) {
    let mut store = StudentStore::new();

    let loaded = store.load_file(&path);
    if loaded == 0 {
        println!("No existing data found. Starting fresh.");
    } else {
        info!("loaded {loaded} records from {}", path.display());
    }

    loop {
        print!("{name} > ");

        let mut input: String = String::new();
        std::io::stdout()
            .flush()
            .expect("failed to print to screen");
        if std::io::stdin()
            .read_line(&mut input)
            .expect("failed to read command")
            == 0
        {
            // stdin closed; behave like .exit so piped sessions persist
            save_and_report(&store, &path);
            break;
        }
        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input.starts_with('.') {
            match input.try_into() {
                Ok(MetaCommand::Exit) => {
                    save_and_report(&store, &path);
                    break;
                }
                Ok(MetaCommand::Help) => MetaCommand::print_help(),
                Err(e) => println!("error: {e}"),
            }
            continue;
        }

        let result: Result<Statement, _> = input.try_into();
        match result {
            Ok(statement) => statement.execute(&mut store),
            Err(e) => println!("error: {e}"),
        }
    }
}

fn save_and_report(store: &StudentStore, path: &PathBuf) {
    match store.save_file(path) {
        Ok(()) => println!("Saved {} records.", store.len()),
        Err(e) => println!("error: failed to save; {e}"),
    }
}
