use std::path::PathBuf;

use clap::Parser;
use student_db::start_repl;

#[derive(Parser)]
#[command(version, about,long_about = None)]
struct Cli {
    /// Optional session name shown in the prompt
    name: Option<String>,

    /// Optionally, sets a data file to use
    #[arg(short, long, value_name = "FILE")]
    file: Option<PathBuf>,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let name = cli.name.unwrap_or("students".into());
    let path = cli.file.unwrap_or("students.db".into());

    start_repl(name, path)
}
