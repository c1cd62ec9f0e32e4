use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::models::{Project, SubmittedEntry};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Body,
    Task,
    Project,
    Date,
    StartsAt,
    EndsAt,
    Duration,
    Base,
}

impl Field {
    /// Maps a key of the server's error object onto a form field.
    pub fn from_server_key(key: &str) -> Self {
        match key {
            "body" => Field::Body,
            "task" => Field::Task,
            "project" | "project_id" => Field::Project,
            "date" => Field::Date,
            "starts_at" => Field::StartsAt,
            "ends_at" => Field::EndsAt,
            "duration" => Field::Duration,
            _ => Field::Base,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Body => "body",
            Field::Task => "task",
            Field::Project => "project",
            Field::Date => "date",
            Field::StartsAt => "starts at",
            Field::EndsAt => "ends at",
            Field::Duration => "duration",
            Field::Base => "entry",
        }
    }
}

pub type FieldErrors = BTreeMap<Field, Vec<String>>;

/// Acting-user resolution for submissions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionContext {
    pub current_user_id: Option<i64>,
    pub user_id_override: Option<i64>,
}

impl SessionContext {
    pub fn acting_user_id(&self) -> Option<i64> {
        self.user_id_override.or(self.current_user_id)
    }
}

/// What a paste carries into the draft. `None` leaves the field as it is.
#[derive(Clone, Debug, PartialEq)]
pub struct EntryTemplate {
    pub body: Option<String>,
    pub task: Option<String>,
    pub project: Project,
}

impl EntryTemplate {
    pub fn project_only(project: Project) -> Self {
        Self {
            body: None,
            task: None,
            project,
        }
    }

    pub fn from_entry(entry: &SubmittedEntry, project: Project) -> Self {
        Self {
            body: Some(entry.body.clone().unwrap_or_default()),
            task: Some(entry.task.clone().unwrap_or_default()),
            project,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct WorkTimeDraft {
    pub body: Option<String>,
    pub task: String,
    pub project: Option<Project>,
    pub date: NaiveDate,
    pub starts_at: String,
    pub ends_at: String,
    pub duration_minutes: i64,
    pub errors: FieldErrors,
}

impl WorkTimeDraft {
    pub fn new(date: NaiveDate, now: String) -> Self {
        Self {
            body: None,
            task: String::new(),
            project: None,
            date,
            starts_at: now.clone(),
            ends_at: now,
            duration_minutes: 0,
            errors: FieldErrors::new(),
        }
    }

    pub fn counts_duration(&self) -> bool {
        self.project.as_ref().is_some_and(|p| p.count_duration)
    }

    pub fn is_special(&self) -> bool {
        self.project.as_ref().is_some_and(Project::is_special)
    }
}
