use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, Local};
use serde::{Deserialize, Serialize};

/// A project as served by `GET /api/projects/simple`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub count_duration: bool,
    #[serde(default)]
    pub lunch: bool,
    #[serde(default)]
    pub autofill: bool,
    #[serde(rename = "work_times_allows_task", default)]
    pub allows_task: bool,
}

impl Project {
    /// Lunch and autofill projects fill their own times and skip validation.
    pub fn is_special(&self) -> bool {
        self.lunch || self.autofill
    }
}

/// A work time confirmed by the server.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubmittedEntry {
    pub id: i64,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub task: Option<String>,
    #[serde(default)]
    pub project_id: i64,
    #[serde(default)]
    pub project: Option<Project>,
    pub starts_at: DateTime<FixedOffset>,
    pub ends_at: DateTime<FixedOffset>,
    /// Seconds, when the server reports it.
    #[serde(default)]
    pub duration: Option<i64>,
}

impl SubmittedEntry {
    pub fn duration_minutes(&self) -> i64 {
        match self.duration {
            Some(seconds) => seconds / 60,
            None => (self.ends_at - self.starts_at).num_minutes().max(0),
        }
    }

    pub fn project_name(&self) -> String {
        match &self.project {
            Some(project) if !project.name.trim().is_empty() => project.name.clone(),
            _ => format!("Project {}", self.project_id),
        }
    }
}

/// Inner object of the `POST /api/work_times` body.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CreateWorkTime {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    pub body: String,
    pub task: String,
    pub project_id: i64,
    pub starts_at: DateTime<Local>,
    pub ends_at: DateTime<Local>,
}

#[derive(Serialize)]
pub struct CreateWorkTimeRequest<'a> {
    pub work_time: &'a CreateWorkTime,
}

/// Field-keyed messages as sent back with a 422.
pub type ServerErrors = BTreeMap<String, Vec<String>>;

/// How the gateway answered a create request.
#[derive(Clone, Debug, PartialEq)]
pub enum SubmitOutcome {
    Created(SubmittedEntry),
    Rejected(ServerErrors),
    Failed(u16),
}
