mod app;
mod calc;
mod codec;
mod model;
mod report;
mod store;
mod ui;

use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "rollbook",
    version,
    about = "Role-based console manager for users, attendance and grades"
)]
struct Cli {
    /// Directory holding users.json, attendance.csv and grades.csv.
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Directory report files are written into.
    #[arg(long, default_value = "reports")]
    reports_dir: PathBuf,

    /// Log file. Falls back to stderr when it cannot be opened.
    #[arg(long, default_value = "logs/system.log")]
    log_file: PathBuf,
}

fn init_logging(path: &Path) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            let _ = std::fs::create_dir_all(parent);
        }
    }
    match std::fs::OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Arc::new(file))
            .init(),
        Err(_) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_file);

    let store = match store::Store::new(&cli.data_dir) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to initialize storage: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    // Hard gate: refuse to run against a store that fails validation.
    if !store.validate_integrity() {
        eprintln!("Data integrity check failed. Aborting.");
        return ExitCode::FAILURE;
    }
    println!("System initialized successfully.");

    app::run(&store, &cli.reports_dir);
    ExitCode::SUCCESS
}
