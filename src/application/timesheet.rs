use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use chrono::NaiveDate;
use tracing::{error, info, warn};

use crate::application::entry_form::EntryForm;
use crate::application::history::EntryHistory;
use crate::domain::draft::{EntryTemplate, SessionContext};
use crate::domain::errors::ApiError;
use crate::domain::models::{Project, SubmitOutcome, SubmittedEntry};
use crate::infrastructure::api_client::WorkTimeGateway;
use crate::utils::parsing::display_date;

pub const REJECTED_NOTICE: &str = "There was an error while trying to add work time";
pub const FAILURE_NOTICE: &str = "Internal server error";

/// Messages children send to the container.
#[derive(Debug, Clone, PartialEq)]
pub enum TimesheetEvent {
    Copy(EntryTemplate),
    LastProject(Option<Project>),
}

type Pending<T> = Option<Receiver<Result<T, ApiError>>>;

/// Owns the form and the history and is the only place that calls across them.
pub struct Timesheet {
    gateway: Arc<dyn WorkTimeGateway>,
    session: SessionContext,
    projects: Vec<Project>,
    form: EntryForm,
    history: EntryHistory,
    events_rx: Receiver<TimesheetEvent>,
    rx_projects: Pending<Vec<Project>>,
    rx_history: Pending<Vec<SubmittedEntry>>,
    rx_submit: Pending<SubmitOutcome>,
    history_date: Option<NaiveDate>,
    submitted_date: Option<NaiveDate>,
    mounted: bool,
    pub notice: String,
}

impl Timesheet {
    pub fn new(gateway: Arc<dyn WorkTimeGateway>, session: SessionContext) -> Self {
        Self::with_form(gateway, session, EntryForm::new(Vec::new()))
    }

    pub fn with_form(
        gateway: Arc<dyn WorkTimeGateway>,
        session: SessionContext,
        form: EntryForm,
    ) -> Self {
        let (events_tx, events_rx): (Sender<TimesheetEvent>, _) = mpsc::channel();
        Self {
            gateway,
            session,
            projects: Vec::new(),
            form,
            history: EntryHistory::new(Vec::new(), events_tx),
            events_rx,
            rx_projects: None,
            rx_history: None,
            rx_submit: None,
            history_date: None,
            submitted_date: None,
            mounted: false,
            notice: String::new(),
        }
    }

    /// Starts the one-time catalog fetch. The day's history follows once the
    /// catalog is in.
    pub fn mount(&mut self) {
        if self.mounted {
            return;
        }
        self.mounted = true;
        self.notice = "loading projects...".to_string();
        let gateway = Arc::clone(&self.gateway);
        self.rx_projects = Some(spawn_call(move || gateway.fetch_simple_projects()));
    }

    pub fn is_ready(&self) -> bool {
        !self.projects.is_empty()
    }

    pub fn is_submitting(&self) -> bool {
        self.rx_submit.is_some()
    }

    pub fn form(&self) -> &EntryForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut EntryForm {
        &mut self.form
    }

    pub fn history(&self) -> &EntryHistory {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut EntryHistory {
        &mut self.history
    }

    /// Reloads the history for the draft's date.
    pub fn refresh_history(&mut self) {
        let date = self.form.draft().date;
        let user_id = self.session.acting_user_id();
        let gateway = Arc::clone(&self.gateway);
        self.history_date = Some(date);
        self.notice = format!("loading {}...", display_date(date));
        self.rx_history = Some(spawn_call(move || gateway.fetch_day_entries(date, user_id)));
    }

    /// Reloads the history once the draft is committed to another day.
    fn follow_draft_date(&mut self) {
        let date = self.form.draft().date;
        if self.history_date.is_some_and(|shown| shown != date) {
            self.refresh_history();
        }
    }

    pub fn set_last_project(&mut self, project: Option<Project>) {
        if let Some(project) = project.filter(|p| p.id != 0) {
            self.form.paste(EntryTemplate::project_only(project));
        }
    }

    pub fn submit(&mut self) {
        if self.is_submitting() {
            self.notice = "submission in progress".to_string();
            return;
        }

        let Some(payload) = self.form.prepare_submission(&self.session) else {
            self.notice = "fix the highlighted fields".to_string();
            return;
        };
        self.follow_draft_date();
        self.submitted_date = Some(self.form.draft().date);

        info!(project_id = payload.project_id, "submitting work time");
        self.notice = "saving...".to_string();
        let gateway = Arc::clone(&self.gateway);
        self.rx_submit = Some(spawn_call(move || gateway.create_work_time(&payload)));
    }

    /// Drains finished background calls and child events. Called every tick.
    pub fn poll(&mut self) {
        self.follow_draft_date();

        if let Some(result) = take_ready(&mut self.rx_projects) {
            self.apply_projects(result);
        }
        if let Some(result) = take_ready(&mut self.rx_history) {
            self.apply_history(result);
        }
        // A created entry lands after the day it belongs to has loaded.
        if self.rx_history.is_none() {
            if let Some(result) = take_ready(&mut self.rx_submit) {
                self.apply_submit(result);
            }
        }

        while let Ok(event) = self.events_rx.try_recv() {
            match event {
                TimesheetEvent::Copy(template) => {
                    self.form.paste(template);
                    self.notice = "entry copied".to_string();
                }
                TimesheetEvent::LastProject(project) if self.form.draft().project.is_none() => {
                    self.set_last_project(project)
                }
                TimesheetEvent::LastProject(_) => {}
            }
        }
    }

    fn apply_projects(&mut self, result: Result<Vec<Project>, ApiError>) {
        match result {
            Ok(projects) if projects.is_empty() => {
                warn!("project catalog is empty");
                self.notice = "no projects available".to_string();
            }
            Ok(projects) => {
                info!(count = projects.len(), "projects loaded");
                self.notice = format!("projects loaded: {}", projects.len());
                self.form.selector.set_projects(projects.clone());
                self.history.set_projects(projects.clone());
                self.projects = projects;
                self.refresh_history();
            }
            Err(e) => {
                error!(error = %e, "could not load projects");
                self.notice = format!("error loading projects: {e}");
            }
        }
    }

    fn apply_history(&mut self, result: Result<Vec<SubmittedEntry>, ApiError>) {
        match result {
            Ok(entries) => {
                if let Some(date) = self.history_date {
                    self.notice = format!("{} entries on {}", entries.len(), display_date(date));
                }
                self.history.replace(entries);
            }
            Err(e) => {
                error!(error = %e, "could not load history");
                self.notice = format!("error loading history: {e}");
            }
        }
    }

    fn apply_submit(&mut self, result: Result<SubmitOutcome, ApiError>) {
        let submitted_date = self.submitted_date.take();
        match result {
            Ok(SubmitOutcome::Created(entry)) => {
                info!(id = entry.id, "work time saved");
                if submitted_date == self.history_date {
                    self.history.push_entry(entry);
                }
                self.form.reset_after_submit();
                self.notice = "work time saved".to_string();
            }
            Ok(SubmitOutcome::Rejected(errors)) => {
                self.form.apply_server_errors(errors);
                self.notice = REJECTED_NOTICE.to_string();
            }
            Ok(SubmitOutcome::Failed(status)) => {
                error!(status, "work time creation failed");
                self.notice = FAILURE_NOTICE.to_string();
            }
            Err(e) => {
                error!(error = %e, "work time creation failed");
                self.notice = FAILURE_NOTICE.to_string();
            }
        }
    }
}

fn spawn_call<T, F>(call: F) -> Receiver<Result<T, ApiError>>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(call());
    });
    rx
}

/// Takes the result out of a pending call once it has arrived. A dropped
/// sender also clears the slot.
fn take_ready<T>(slot: &mut Pending<T>) -> Option<Result<T, ApiError>> {
    let rx = slot.as_ref()?;
    match rx.try_recv() {
        Ok(result) => {
            *slot = None;
            Some(result)
        }
        Err(mpsc::TryRecvError::Empty) => None,
        Err(mpsc::TryRecvError::Disconnected) => {
            *slot = None;
            None
        }
    }
}
