use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "worktime.log";
const LOG_ENV: &str = "WORKTIME_LOG";

/// Routes `tracing` output to a file; the terminal belongs to the TUI.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    let Ok(file) = OpenOptions::new().create(true).append(true).open(LOG_FILE) else {
        return;
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}
