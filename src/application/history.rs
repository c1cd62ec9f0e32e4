use std::sync::mpsc::Sender;

use ratatui::widgets::ListState;
use tracing::debug;

use crate::application::timesheet::TimesheetEvent;
use crate::domain::draft::EntryTemplate;
use crate::domain::models::{Project, SubmittedEntry};

/// Entries already saved for the day, oldest first.
pub struct EntryHistory {
    entries: Vec<SubmittedEntry>,
    projects: Vec<Project>,
    pub list_state: ListState,
    events: Sender<TimesheetEvent>,
}

impl EntryHistory {
    pub fn new(projects: Vec<Project>, events: Sender<TimesheetEvent>) -> Self {
        Self {
            entries: Vec::new(),
            projects,
            list_state: ListState::default(),
            events,
        }
    }

    pub fn entries(&self) -> &[SubmittedEntry] {
        &self.entries
    }

    pub fn set_projects(&mut self, projects: Vec<Project>) {
        self.projects = projects;
    }

    /// Initial load for the day. Announces the most recent project so the
    /// next entry can default to it.
    pub fn replace(&mut self, entries: Vec<SubmittedEntry>) {
        self.entries = entries;
        self.list_state
            .select(self.entries.len().checked_sub(1));
        let _ = self
            .events
            .send(TimesheetEvent::LastProject(self.last_project()));
    }

    /// Appends a newly created entry. An entry the day's reload already
    /// brought in is only re-selected.
    pub fn push_entry(&mut self, entry: SubmittedEntry) {
        if let Some(idx) = self.entries.iter().position(|e| e.id == entry.id) {
            self.list_state.select(Some(idx));
            return;
        }
        debug!(id = entry.id, "entry added to history");
        self.entries.push(entry);
        self.list_state.select(Some(self.entries.len() - 1));
    }

    pub fn project_for(&self, entry: &SubmittedEntry) -> Option<Project> {
        entry
            .project
            .clone()
            .filter(|p| p.id != 0)
            .or_else(|| self.projects.iter().find(|p| p.id == entry.project_id).cloned())
    }

    pub fn last_project(&self) -> Option<Project> {
        self.entries.last().and_then(|entry| self.project_for(entry))
    }

    pub fn selected(&self) -> Option<&SubmittedEntry> {
        self.list_state.selected().and_then(|idx| self.entries.get(idx))
    }

    /// Asks the container to paste the highlighted entry into the form.
    pub fn copy_selected(&self) {
        let Some(entry) = self.selected() else {
            return;
        };
        let Some(project) = self.project_for(entry) else {
            debug!(project_id = entry.project_id, "copied entry has unknown project");
            return;
        };
        let _ = self
            .events
            .send(TimesheetEvent::Copy(EntryTemplate::from_entry(entry, project)));
    }

    pub fn next(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        let next = match self.list_state.selected() {
            Some(idx) if idx + 1 < self.entries.len() => idx + 1,
            _ => 0,
        };
        self.list_state.select(Some(next));
    }

    pub fn previous(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        let prev = match self.list_state.selected() {
            Some(0) | None => self.entries.len() - 1,
            Some(idx) => idx - 1,
        };
        self.list_state.select(Some(prev));
    }

    pub fn total_minutes(&self) -> i64 {
        self.entries.iter().map(SubmittedEntry::duration_minutes).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, FixedOffset};
    use std::sync::mpsc::{self, Receiver};

    fn at(clock: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(&format!("2024-03-07T{clock}:00+01:00")).unwrap()
    }

    fn entry(id: i64, project_id: i64, from: &str, to: &str) -> SubmittedEntry {
        SubmittedEntry {
            id,
            user_id: Some(1),
            body: Some(format!("entry {id}")),
            task: None,
            project_id,
            project: None,
            starts_at: at(from),
            ends_at: at(to),
            duration: None,
        }
    }

    fn catalog() -> Vec<Project> {
        vec![
            Project {
                id: 1,
                name: "Internal".to_string(),
                ..Project::default()
            },
            Project {
                id: 2,
                name: "Client".to_string(),
                ..Project::default()
            },
        ]
    }

    fn history() -> (EntryHistory, Receiver<TimesheetEvent>) {
        let (tx, rx) = mpsc::channel();
        (EntryHistory::new(catalog(), tx), rx)
    }

    #[test]
    fn push_keeps_insertion_order() {
        let (mut history, _rx) = history();
        history.push_entry(entry(1, 1, "09:00", "10:00"));
        history.push_entry(entry(2, 2, "10:00", "10:45"));
        let ids: Vec<_> = history.entries().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(history.selected().map(|e| e.id), Some(2));
        assert_eq!(history.total_minutes(), 105);
    }

    #[test]
    fn push_skips_entries_already_loaded() {
        let (mut history, _rx) = history();
        history.replace(vec![entry(1, 1, "09:00", "10:00"), entry(2, 2, "10:00", "11:00")]);
        history.previous();
        history.push_entry(entry(2, 2, "10:00", "11:00"));
        assert_eq!(history.entries().len(), 2);
        assert_eq!(history.selected().map(|e| e.id), Some(2));
    }

    #[test]
    fn replace_announces_last_project() {
        let (mut history, rx) = history();
        history.replace(vec![entry(1, 1, "09:00", "10:00"), entry(2, 2, "10:00", "11:00")]);
        match rx.try_recv() {
            Ok(TimesheetEvent::LastProject(Some(project))) => assert_eq!(project.name, "Client"),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn empty_day_announces_no_project() {
        let (mut history, rx) = history();
        history.replace(Vec::new());
        assert!(matches!(rx.try_recv(), Ok(TimesheetEvent::LastProject(None))));
        assert!(history.selected().is_none());
    }

    #[test]
    fn copy_sends_template_of_selected_entry() {
        let (mut history, rx) = history();
        history.push_entry(entry(1, 1, "09:00", "10:00"));
        history.push_entry(entry(2, 2, "10:00", "11:00"));
        history.previous();
        history.copy_selected();

        match rx.try_recv() {
            Ok(TimesheetEvent::Copy(template)) => {
                assert_eq!(template.body.as_deref(), Some("entry 1"));
                assert_eq!(template.task.as_deref(), Some(""));
                assert_eq!(template.project.id, 1);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn copy_skips_unknown_projects() {
        let (mut history, rx) = history();
        history.push_entry(entry(1, 99, "09:00", "10:00"));
        history.copy_selected();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn navigation_wraps() {
        let (mut history, _rx) = history();
        history.push_entry(entry(1, 1, "09:00", "10:00"));
        history.push_entry(entry(2, 1, "10:00", "11:00"));
        history.next();
        assert_eq!(history.selected().map(|e| e.id), Some(1));
        history.previous();
        assert_eq!(history.selected().map(|e| e.id), Some(2));
    }
}
