mod application;
mod domain;
mod infrastructure;
mod ui;
mod utils;

use clap::{Parser, Subcommand};
use crossterm::event::{self, Event, KeyEventKind};
use std::io;
use std::time::Duration;
use tracing::{error, info};

use crate::application::app::App;
use crate::application::cli::{ApiCommand, run_api};
use crate::application::input::handle_key;
use crate::ui::tui::{Tui, restore_terminal, setup_terminal};
use crate::ui::ui;

#[derive(Debug, Parser)]
#[command(author, version, about = "Log the day's work times from the terminal", long_about = None)]
struct Cli {
    /// Submit and list entries for this user instead of the configured one
    #[arg(long, global = true)]
    user_id: Option<i64>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive timesheet (default)
    Tui,
    /// Scriptable access to the work time API, JSON output
    #[command(subcommand)]
    Api(ApiCommand),
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    utils::logging::init();

    let cli = Cli::parse();
    match cli.command {
        None | Some(Command::Tui) => run_tui(cli.user_id)?,
        Some(Command::Api(command)) => {
            if let Err(e) = run_api(command, cli.user_id) {
                error!(error = %e, "api command failed");
                eprintln!("{e:#}");
                std::process::exit(1);
            }
        }
    }
    Ok(())
}

fn run_tui(user_id_override: Option<i64>) -> io::Result<()> {
    info!(version = utils::version::build_version(), "starting timesheet");
    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, App::new(user_id_override));
    restore_terminal(&mut terminal)?;
    result
}

fn run_app(terminal: &mut Tui, mut app: App) -> io::Result<()> {
    loop {
        terminal.draw(|frame| ui(frame, &mut app))?;

        app.tick();

        if event::poll(Duration::from_millis(250))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && handle_key(&mut app, key.code, key.modifiers)
                {
                    return Ok(());
                }
            }
        }
    }
}
