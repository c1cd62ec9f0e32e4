use ratatui::widgets::ListState;

use crate::domain::models::Project;

const MAX_VISIBLE: usize = 20;

/// Searchable project picker. Confirming a row hands the project back to the
/// owner; it never changes the draft on its own.
pub struct ProjectSelector {
    projects: Vec<Project>,
    pub search: String,
    pub filtered_indices: Vec<usize>,
    pub list_state: ListState,
}

impl ProjectSelector {
    pub fn new(projects: Vec<Project>) -> Self {
        let mut selector = Self {
            projects,
            search: String::new(),
            filtered_indices: Vec::new(),
            list_state: ListState::default(),
        };
        selector.update_filter();
        selector
    }

    pub fn set_projects(&mut self, projects: Vec<Project>) {
        self.projects = projects;
        self.update_filter();
    }

    pub fn filtered(&self) -> impl Iterator<Item = &Project> {
        self.filtered_indices
            .iter()
            .filter_map(|&idx| self.projects.get(idx))
    }

    pub fn push_char(&mut self, ch: char) {
        self.search.push(ch);
        self.update_filter();
    }

    pub fn backspace(&mut self) {
        self.search.pop();
        self.update_filter();
    }

    pub fn update_filter(&mut self) {
        let query = self.search.trim().to_lowercase();
        self.filtered_indices = self
            .projects
            .iter()
            .enumerate()
            .filter(|(_, p)| query.is_empty() || p.name.to_lowercase().contains(&query))
            .map(|(i, _)| i)
            .take(MAX_VISIBLE)
            .collect();

        if self.filtered_indices.is_empty() {
            self.list_state.select(None);
        } else {
            self.list_state.select(Some(0));
        }
    }

    pub fn nav_up(&mut self) {
        if let Some(i) = self.list_state.selected() {
            if i > 0 {
                self.list_state.select(Some(i - 1));
            }
        }
    }

    pub fn nav_down(&mut self) {
        if let Some(i) = self.list_state.selected() {
            if i + 1 < self.filtered_indices.len() {
                self.list_state.select(Some(i + 1));
            }
        }
    }

    /// Picks the highlighted row and returns it for the owner to apply.
    pub fn confirm(&mut self) -> Option<Project> {
        let idx = self.list_state.selected()?;
        let project = self.projects.get(*self.filtered_indices.get(idx)?)?.clone();
        self.assign(&project);
        Some(project)
    }

    /// Shows `project` as the current choice without reporting it back.
    pub fn assign(&mut self, project: &Project) {
        self.search = project.name.clone();
        self.filtered_indices.clear();
        self.list_state.select(None);
    }
}
