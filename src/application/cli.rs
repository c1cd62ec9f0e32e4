use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand};
use serde::Serialize;
use tracing::info;

use crate::application::entry_form::EntryForm;
use crate::domain::draft::{Field, SessionContext};
use crate::domain::models::{Project, SubmitOutcome, SubmittedEntry};
use crate::infrastructure::api_client::WorkTimeGateway;
use crate::infrastructure::config::{build_client, load_config};
use crate::utils::parsing::{api_date, resolve_date};
use crate::utils::time::format_duration;

#[derive(Debug, Subcommand)]
pub enum ApiCommand {
    /// List the projects available for new entries
    Projects(OutputArgs),
    /// List the entries saved for a day
    Entries(EntriesArgs),
    /// Validate and create a work time
    CreateEntry(CreateEntryArgs),
}

#[derive(Debug, Args)]
pub struct OutputArgs {
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Debug, Args)]
pub struct EntriesArgs {
    /// Day to list (YYYY-MM-DD or DD/MM/YYYY), defaults to today
    #[arg(long)]
    pub date: Option<String>,
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args)]
pub struct CreateEntryArgs {
    #[arg(long)]
    pub project_id: i64,
    #[arg(long, default_value = "")]
    pub body: String,
    #[arg(long, default_value = "")]
    pub task: String,
    #[arg(long)]
    pub starts_at: String,
    #[arg(long)]
    pub ends_at: String,
    #[arg(long)]
    pub date: Option<String>,
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Serialize)]
struct EntryOutput {
    id: i64,
    project: String,
    body: String,
    task: String,
    starts_at: String,
    ends_at: String,
    duration: String,
}

#[derive(Serialize)]
struct EntriesOutput {
    date: String,
    total: String,
    entries: Vec<EntryOutput>,
}

#[derive(Serialize)]
struct RejectedOutput<'a> {
    ok: bool,
    errors: &'a std::collections::BTreeMap<String, Vec<String>>,
}

pub fn run_api(command: ApiCommand, user_id_override: Option<i64>) -> Result<()> {
    let config = load_config();
    let client = build_client(&config).context("Failed to build HTTP client")?;
    let session = SessionContext {
        current_user_id: config.user_id,
        user_id_override,
    };

    match command {
        ApiCommand::Projects(output) => cmd_projects(&client, output.pretty),
        ApiCommand::Entries(args) => cmd_entries(&client, &session, args),
        ApiCommand::CreateEntry(args) => cmd_create_entry(&client, &session, args),
    }
}

fn cmd_projects(client: &dyn WorkTimeGateway, pretty: bool) -> Result<()> {
    let projects = client
        .fetch_simple_projects()
        .context("Failed to fetch projects")?;
    print_json(&projects, pretty)
}

fn cmd_entries(
    client: &dyn WorkTimeGateway,
    session: &SessionContext,
    args: EntriesArgs,
) -> Result<()> {
    let date = resolve_date(args.date.as_deref()).map_err(anyhow::Error::msg)?;
    let entries = client
        .fetch_day_entries(date, session.acting_user_id())
        .context("Failed to fetch entries")?;

    let total: i64 = entries.iter().map(SubmittedEntry::duration_minutes).sum();
    let output = EntriesOutput {
        date: api_date(date),
        total: format_duration(total),
        entries: entries.iter().map(entry_output).collect(),
    };
    print_json(&output, args.output.pretty)
}

fn cmd_create_entry(
    client: &dyn WorkTimeGateway,
    session: &SessionContext,
    args: CreateEntryArgs,
) -> Result<()> {
    let date = resolve_date(args.date.as_deref()).map_err(anyhow::Error::msg)?;
    let projects = client
        .fetch_simple_projects()
        .context("Failed to fetch projects")?;
    let project = find_project(&projects, args.project_id)?;

    let mut form = EntryForm::new(projects);
    form.set_date(date);
    form.set_field(Field::StartsAt, args.starts_at);
    form.set_field(Field::EndsAt, args.ends_at);
    form.select_project(project);
    form.set_field(Field::Body, args.body);
    form.set_field(Field::Task, args.task);

    let Some(payload) = form.prepare_submission(session) else {
        let problems: Vec<String> = form
            .errors()
            .iter()
            .map(|(field, messages)| format!("{} {}", field.label(), messages.join(", ")))
            .collect();
        bail!("Invalid entry: {}", problems.join("; "));
    };

    match client
        .create_work_time(&payload)
        .context("Failed to create work time")?
    {
        SubmitOutcome::Created(entry) => {
            info!(id = entry.id, "work time created from CLI");
            print_json(&entry_output(&entry), args.output.pretty)
        }
        SubmitOutcome::Rejected(errors) => {
            print_json(
                &RejectedOutput {
                    ok: false,
                    errors: &errors,
                },
                args.output.pretty,
            )?;
            bail!("There was an error while trying to add work time")
        }
        SubmitOutcome::Failed(status) => bail!("Internal server error ({status})"),
    }
}

fn find_project(projects: &[Project], id: i64) -> Result<Project> {
    projects
        .iter()
        .find(|p| p.id == id)
        .cloned()
        .with_context(|| format!("Unknown project id: {id}"))
}

fn entry_output(entry: &SubmittedEntry) -> EntryOutput {
    EntryOutput {
        id: entry.id,
        project: entry.project_name(),
        body: entry.body.clone().unwrap_or_default(),
        task: entry.task.clone().unwrap_or_default(),
        starts_at: entry.starts_at.format("%H:%M").to_string(),
        ends_at: entry.ends_at.format("%H:%M").to_string(),
        duration: format_duration(entry.duration_minutes()),
    }
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }?;
    println!("{json}");
    Ok(())
}
