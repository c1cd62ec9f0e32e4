use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone};
use tracing::debug;

use crate::application::project_selector::ProjectSelector;
use crate::domain::draft::*;
use crate::domain::models::{CreateWorkTime, Project, ServerErrors};
use crate::utils::parsing::{display_date, parse_date};
use crate::utils::time::*;
use crate::utils::validation::{require_greater_than, require_presence};

const LUNCH_MINUTES: i64 = 30;
const AUTOFILL_STARTS_AT: &str = "09:00";
const AUTOFILL_HOURS: i64 = 8;
const INVALID_DATE: &str = "is not a valid date";

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum FormField {
    Body,
    Task,
    Project,
    StartsAt,
    EndsAt,
    Date,
}

/// The in-progress entry and the editing state around it.
pub struct EntryForm {
    draft: WorkTimeDraft,
    pub focused: FormField,
    pub date_input: String,
    pub selector: ProjectSelector,
}

impl EntryForm {
    pub fn new(projects: Vec<Project>) -> Self {
        let now = Local::now();
        Self::starting_at(projects, now.date_naive(), now.time())
    }

    pub fn starting_at(projects: Vec<Project>, date: NaiveDate, now: NaiveTime) -> Self {
        Self {
            draft: WorkTimeDraft::new(date, format_time(now)),
            focused: FormField::Body,
            date_input: display_date(date),
            selector: ProjectSelector::new(projects),
        }
    }

    pub fn draft(&self) -> &WorkTimeDraft {
        &self.draft
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.draft.errors
    }

    pub fn duration_display(&self) -> String {
        format_duration(self.draft.duration_minutes)
    }

    pub fn set_field(&mut self, field: Field, value: String) {
        match field {
            Field::Body => self.draft.body = Some(value),
            Field::Task => self.draft.task = value,
            Field::StartsAt => self.draft.starts_at = value,
            Field::EndsAt => self.draft.ends_at = value,
            Field::Project | Field::Date | Field::Duration | Field::Base => return,
        }
        self.remove_errors_for(field);
    }

    pub fn set_date(&mut self, date: NaiveDate) {
        self.draft.date = date;
        self.date_input = display_date(date);
        self.remove_errors_for(Field::Date);
    }

    pub fn select_project(&mut self, project: Project) {
        if project.lunch {
            if let Some(start) = parse_time(&self.draft.starts_at) {
                self.draft.ends_at = format_time(add_minutes(start, LUNCH_MINUTES));
            }
        } else if project.autofill {
            self.draft.starts_at = AUTOFILL_STARTS_AT.to_string();
            if let Some(start) = parse_time(AUTOFILL_STARTS_AT) {
                self.draft.ends_at = format_time(add_minutes(start, AUTOFILL_HOURS * 60));
            }
        }

        debug!(project_id = project.id, name = %project.name, "project selected");
        self.selector.assign(&project);
        self.draft.project = Some(project);
        self.remove_errors_for(Field::Project);
        self.recount_duration();
    }

    pub fn recount_duration(&mut self) {
        let starts_at = parse_time(&self.draft.starts_at);
        let ends_at = parse_time(&self.draft.ends_at);

        if let Some(start) = starts_at {
            self.draft.starts_at = format_time(start);
        }
        if let Some(end) = ends_at {
            self.draft.ends_at = format_time(end);
        }

        self.draft.duration_minutes = self.counted_minutes(starts_at, ends_at);
        self.remove_errors_for(Field::Duration);
    }

    pub fn paste(&mut self, template: EntryTemplate) {
        if let Some(body) = template.body {
            self.draft.body = Some(body);
        }
        if let Some(task) = template.task {
            self.draft.task = task;
        }
        self.selector.assign(&template.project);
        self.draft.project = Some(template.project);
        self.remove_errors_for(Field::Project);

        let starts_at = parse_time(&self.draft.starts_at);
        let ends_at = parse_time(&self.draft.ends_at);
        self.draft.duration_minutes = self.counted_minutes(starts_at, ends_at);
    }

    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.draft.is_special() {
            return errors;
        }

        let checks = [
            (Field::Body, require_presence(self.draft.body.as_deref())),
            (Field::StartsAt, require_presence(Some(self.draft.starts_at.as_str()))),
            (Field::EndsAt, require_presence(Some(self.draft.ends_at.as_str()))),
            (
                Field::Project,
                require_presence(
                    self.draft
                        .project
                        .as_ref()
                        .filter(|p| p.id != 0)
                        .map(|_| "selected"),
                ),
            ),
            (
                Field::Duration,
                require_greater_than(0, self.draft.duration_minutes),
            ),
        ];

        for (field, error) in checks {
            if let Some(message) = error {
                errors.insert(field, vec![message]);
            }
        }
        errors
    }

    /// Validates and builds the create payload. On failure the errors are
    /// stored on the draft and nothing is returned.
    pub fn prepare_submission(&mut self, session: &SessionContext) -> Option<CreateWorkTime> {
        let mut errors = self.validate();
        if parse_date(&self.date_input) != Some(self.draft.date) {
            errors.insert(Field::Date, vec![INVALID_DATE.to_string()]);
        }
        if !errors.is_empty() {
            debug!(count = errors.len(), "draft failed validation");
            self.draft.errors = errors;
            return None;
        }

        let project_id = self.draft.project.as_ref().map(|p| p.id).unwrap_or_default();
        let starts_at = self.timestamp(&self.draft.starts_at);
        let ends_at = self.timestamp(&self.draft.ends_at);

        let (Some(starts_at), Some(ends_at)) = (starts_at, ends_at) else {
            if starts_at.is_none() {
                self.add_error(Field::StartsAt, "is not a valid time");
            }
            if ends_at.is_none() {
                self.add_error(Field::EndsAt, "is not a valid time");
            }
            return None;
        };

        Some(CreateWorkTime {
            user_id: session.acting_user_id(),
            body: self.draft.body.clone().unwrap_or_default(),
            task: self.draft.task.clone(),
            project_id,
            starts_at,
            ends_at,
        })
    }

    /// Starts the next entry where the submitted one ended.
    pub fn reset_after_submit(&mut self) {
        self.draft.starts_at = self.draft.ends_at.clone();
        self.draft.duration_minutes = 0;
        self.draft.body = Some(String::new());
        self.draft.task.clear();
        self.draft.errors.clear();
        self.focused = self.visible_fields()[0];
    }

    pub fn apply_server_errors(&mut self, server_errors: ServerErrors) {
        self.draft.errors.clear();
        for (key, messages) in server_errors {
            self.draft
                .errors
                .entry(Field::from_server_key(&key))
                .or_default()
                .extend(messages);
        }
    }

    fn counted_minutes(&self, start: Option<NaiveTime>, end: Option<NaiveTime>) -> i64 {
        match (start, end) {
            (Some(start), Some(end)) if self.draft.counts_duration() => span_minutes(start, end),
            _ => 0,
        }
    }

    fn timestamp(&self, time: &str) -> Option<DateTime<Local>> {
        let time = parse_time(time)?;
        Local
            .from_local_datetime(&self.draft.date.and_time(time))
            .earliest()
    }

    fn remove_errors_for(&mut self, field: Field) {
        self.draft.errors.remove(&field);
    }

    fn add_error(&mut self, field: Field, message: &str) {
        self.draft
            .errors
            .entry(field)
            .or_default()
            .push(message.to_string());
    }

    // Keyboard editing

    pub fn shows_body(&self) -> bool {
        !self.draft.project.as_ref().is_some_and(|p| p.lunch)
    }

    pub fn shows_task(&self) -> bool {
        self.draft.project.as_ref().is_some_and(|p| p.allows_task)
    }

    fn visible_fields(&self) -> Vec<FormField> {
        let mut fields = Vec::with_capacity(6);
        if self.shows_body() {
            fields.push(FormField::Body);
        }
        if self.shows_task() {
            fields.push(FormField::Task);
        }
        fields.extend([
            FormField::Project,
            FormField::StartsAt,
            FormField::EndsAt,
            FormField::Date,
        ]);
        fields
    }

    pub fn next_field(&mut self) {
        self.leave_field();
        let fields = self.visible_fields();
        let pos = fields.iter().position(|f| *f == self.focused).unwrap_or(0);
        self.focused = fields[(pos + 1) % fields.len()];
    }

    pub fn prev_field(&mut self) {
        self.leave_field();
        let fields = self.visible_fields();
        let pos = fields.iter().position(|f| *f == self.focused).unwrap_or(0);
        self.focused = fields[(pos + fields.len() - 1) % fields.len()];
    }

    /// Blur handling: times recount, the date text is parsed.
    pub fn leave_field(&mut self) {
        match self.focused {
            FormField::StartsAt | FormField::EndsAt => self.recount_duration(),
            FormField::Date => match parse_date(&self.date_input) {
                Some(date) => self.set_date(date),
                None => {
                    self.draft.errors.remove(&Field::Date);
                    self.add_error(Field::Date, INVALID_DATE);
                }
            },
            FormField::Project => {
                if let Some(project) = self.draft.project.clone() {
                    self.selector.assign(&project);
                }
            }
            FormField::Body | FormField::Task => {}
        }
    }

    pub fn input_push(&mut self, ch: char) {
        match self.focused {
            FormField::Body => {
                let mut value = self.draft.body.clone().unwrap_or_default();
                value.push(ch);
                self.set_field(Field::Body, value);
            }
            FormField::Task => {
                let mut value = self.draft.task.clone();
                value.push(ch);
                self.set_field(Field::Task, value);
            }
            FormField::StartsAt => {
                let mut value = self.draft.starts_at.clone();
                value.push(ch);
                self.set_field(Field::StartsAt, value);
            }
            FormField::EndsAt => {
                let mut value = self.draft.ends_at.clone();
                value.push(ch);
                self.set_field(Field::EndsAt, value);
            }
            FormField::Date => self.date_input.push(ch),
            FormField::Project => self.selector.push_char(ch),
        }
    }

    pub fn input_backspace(&mut self) {
        match self.focused {
            FormField::Body => {
                let mut value = self.draft.body.clone().unwrap_or_default();
                value.pop();
                self.set_field(Field::Body, value);
            }
            FormField::Task => {
                let mut value = self.draft.task.clone();
                value.pop();
                self.set_field(Field::Task, value);
            }
            FormField::StartsAt => {
                let mut value = self.draft.starts_at.clone();
                value.pop();
                self.set_field(Field::StartsAt, value);
            }
            FormField::EndsAt => {
                let mut value = self.draft.ends_at.clone();
                value.pop();
                self.set_field(Field::EndsAt, value);
            }
            FormField::Date => {
                self.date_input.pop();
            }
            FormField::Project => self.selector.backspace(),
        }
    }

    /// Clears the focused text field at once (Ctrl+U).
    pub fn clear_focused(&mut self) {
        match self.focused {
            FormField::Body => self.set_field(Field::Body, String::new()),
            FormField::Task => self.set_field(Field::Task, String::new()),
            FormField::StartsAt => self.set_field(Field::StartsAt, String::new()),
            FormField::EndsAt => self.set_field(Field::EndsAt, String::new()),
            FormField::Date => self.date_input.clear(),
            FormField::Project => {
                self.selector.search.clear();
                self.selector.update_filter();
            }
        }
    }

    /// Enter on the project list picks the highlighted project.
    pub fn confirm_project(&mut self) -> bool {
        if self.focused != FormField::Project {
            return false;
        }
        match self.selector.confirm() {
            Some(project) => {
                self.select_project(project);
                self.next_field();
                true
            }
            None => false,
        }
    }

    pub fn value_of(&self, field: FormField) -> &str {
        match field {
            FormField::Body => self.draft.body.as_deref().unwrap_or(""),
            FormField::Task => &self.draft.task,
            FormField::Project => &self.selector.search,
            FormField::StartsAt => &self.draft.starts_at,
            FormField::EndsAt => &self.draft.ends_at,
            FormField::Date => &self.date_input,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 7).unwrap()
    }

    fn project(id: i64) -> Project {
        Project {
            id,
            name: format!("Project {id}"),
            active: true,
            count_duration: true,
            ..Project::default()
        }
    }

    fn lunch() -> Project {
        Project {
            lunch: true,
            count_duration: true,
            ..project(90)
        }
    }

    fn autofill() -> Project {
        Project {
            autofill: true,
            count_duration: true,
            ..project(91)
        }
    }

    fn form() -> EntryForm {
        EntryForm::starting_at(vec![project(1), lunch(), autofill()], day(), time(9, 0))
    }

    fn filled_form() -> EntryForm {
        let mut form = form();
        form.set_field(Field::Body, "code review".to_string());
        form.select_project(project(1));
        form.set_field(Field::EndsAt, "17:00".to_string());
        form.recount_duration();
        form
    }

    #[test]
    fn new_draft_defaults_to_the_given_clock() {
        let form = form();
        assert_eq!(form.draft().starts_at, "09:00");
        assert_eq!(form.draft().ends_at, "09:00");
        assert_eq!(form.draft().date, day());
        assert_eq!(form.draft().duration_minutes, 0);
        assert!(form.draft().project.is_none());
        assert_eq!(form.date_input, "07/03/2024");
    }

    #[test]
    fn body_error_iff_blank() {
        for (body, expect_error) in [
            (None, true),
            (Some(""), true),
            (Some("   "), true),
            (Some("x"), false),
        ] {
            let mut form = filled_form();
            match body {
                Some(body) => form.set_field(Field::Body, body.to_string()),
                None => form.draft.body = None,
            }
            let errors = form.validate();
            assert_eq!(errors.contains_key(&Field::Body), expect_error, "{body:?}");
        }
    }

    #[test]
    fn special_projects_skip_validation() {
        for special in [lunch(), autofill()] {
            let mut form = form();
            form.select_project(special);
            form.set_field(Field::StartsAt, String::new());
            form.set_field(Field::EndsAt, String::new());
            form.recount_duration();
            assert!(form.validate().is_empty());
        }
    }

    #[test]
    fn full_day_counts_480_minutes() {
        let form = filled_form();
        assert_eq!(form.draft().duration_minutes, 480);
        assert_eq!(form.duration_display(), "08:00");
        assert!(form.validate().is_empty());
    }

    #[test]
    fn non_counting_project_forces_zero() {
        let mut form = filled_form();
        form.select_project(Project {
            count_duration: false,
            ..project(2)
        });
        assert_eq!(form.draft().duration_minutes, 0);
        assert!(form.validate().contains_key(&Field::Duration));
    }

    #[test]
    fn recount_normalizes_times() {
        let mut form = form();
        form.select_project(project(1));
        form.set_field(Field::StartsAt, "9:5".to_string());
        form.set_field(Field::EndsAt, "1030".to_string());
        form.recount_duration();
        assert_eq!(form.draft().starts_at, "09:05");
        assert_eq!(form.draft().ends_at, "10:30");
        assert_eq!(form.draft().duration_minutes, 85);
    }

    #[test]
    fn reversed_times_are_rejected() {
        let mut form = filled_form();
        form.set_field(Field::StartsAt, "18:00".to_string());
        form.recount_duration();
        assert_eq!(form.draft().duration_minutes, 0);
        assert_eq!(
            form.validate().get(&Field::Duration),
            Some(&vec!["must be greater than 0".to_string()])
        );
    }

    #[test]
    fn lunch_ends_half_an_hour_after_start() {
        let mut form = form();
        form.set_field(Field::StartsAt, "12:00".to_string());
        form.select_project(lunch());
        assert_eq!(form.draft().ends_at, "12:30");
        assert_eq!(form.draft().duration_minutes, 30);
        assert!(!form.shows_body());
    }

    #[test]
    fn autofill_forces_office_hours() {
        let mut form = form();
        form.set_field(Field::StartsAt, "06:15".to_string());
        form.set_field(Field::EndsAt, "07:00".to_string());
        form.select_project(autofill());
        assert_eq!(form.draft().starts_at, "09:00");
        assert_eq!(form.draft().ends_at, "17:00");
        assert_eq!(form.draft().duration_minutes, 480);
    }

    #[test]
    fn lunch_wins_over_autofill() {
        let mut form = form();
        form.set_field(Field::StartsAt, "12:00".to_string());
        form.select_project(Project {
            autofill: true,
            ..lunch()
        });
        assert_eq!(form.draft().starts_at, "12:00");
        assert_eq!(form.draft().ends_at, "12:30");
    }

    #[test]
    fn set_field_clears_only_its_own_error() {
        let mut form = form();
        form.prepare_submission(&SessionContext::default());
        assert!(form.errors().contains_key(&Field::Body));
        assert!(form.errors().contains_key(&Field::Project));
        assert!(form.errors().contains_key(&Field::Duration));

        form.set_field(Field::Body, "x".to_string());
        assert!(!form.errors().contains_key(&Field::Body));
        assert!(form.errors().contains_key(&Field::Project));
        assert!(form.errors().contains_key(&Field::Duration));
        assert!(!form.validate().contains_key(&Field::Body));
    }

    #[test]
    fn set_date_clears_date_error() {
        let mut form = form();
        form.focused = FormField::Date;
        form.date_input = "garbage".to_string();
        form.leave_field();
        assert!(form.errors().contains_key(&Field::Date));

        let next = day().succ_opt().unwrap();
        form.set_date(next);
        assert!(!form.errors().contains_key(&Field::Date));
        assert_eq!(form.draft().date, next);
        assert_eq!(form.date_input, "08/03/2024");
    }

    #[test]
    fn paste_keeps_times_and_date() {
        let mut form = filled_form();
        form.paste(EntryTemplate {
            body: Some("deploy".to_string()),
            task: Some("https://tracker/42".to_string()),
            project: project(5),
        });
        assert_eq!(form.draft().body.as_deref(), Some("deploy"));
        assert_eq!(form.draft().task, "https://tracker/42");
        assert_eq!(form.draft().project.as_ref().map(|p| p.id), Some(5));
        assert_eq!(form.draft().starts_at, "09:00");
        assert_eq!(form.draft().ends_at, "17:00");
        assert_eq!(form.draft().date, day());
        assert_eq!(form.selector.search, "Project 5");
    }

    #[test]
    fn project_only_paste_leaves_body() {
        let mut form = filled_form();
        form.paste(EntryTemplate::project_only(project(6)));
        assert_eq!(form.draft().body.as_deref(), Some("code review"));
        assert_eq!(form.draft().project.as_ref().map(|p| p.id), Some(6));
    }

    #[test]
    fn invalid_draft_is_not_submitted() {
        let mut form = form();
        assert!(form.prepare_submission(&SessionContext::default()).is_none());
        assert!(!form.errors().is_empty());
        assert!(!form.errors().contains_key(&Field::StartsAt));
    }

    #[test]
    fn unparsed_date_blocks_submission() {
        let mut form = filled_form();
        form.focused = FormField::Date;
        form.date_input = "31/02/2024".to_string();
        form.leave_field();
        assert_eq!(form.draft().date, day());

        assert!(form.prepare_submission(&SessionContext::default()).is_none());
        assert_eq!(form.errors()[&Field::Date], vec![INVALID_DATE]);
    }

    #[test]
    fn uncommitted_date_text_blocks_submission() {
        let mut form = filled_form();
        form.date_input = "08/03/2024".to_string();
        assert!(form.prepare_submission(&SessionContext::default()).is_none());
        assert!(form.errors().contains_key(&Field::Date));

        form.focused = FormField::Date;
        form.leave_field();
        let payload = form.prepare_submission(&SessionContext::default()).unwrap();
        assert_eq!(payload.starts_at.date_naive(), NaiveDate::from_ymd_opt(2024, 3, 8).unwrap());
    }

    #[test]
    fn payload_combines_date_and_time() {
        let mut form = filled_form();
        let session = SessionContext {
            current_user_id: Some(3),
            user_id_override: None,
        };
        let payload = form.prepare_submission(&session).unwrap();
        assert_eq!(payload.user_id, Some(3));
        assert_eq!(payload.project_id, 1);
        assert_eq!(payload.body, "code review");
        assert_eq!(payload.starts_at.naive_local(), day().and_time(time(9, 0)));
        assert_eq!(payload.ends_at.naive_local(), day().and_time(time(17, 0)));
    }

    #[test]
    fn user_override_wins() {
        let mut form = filled_form();
        let session = SessionContext {
            current_user_id: Some(3),
            user_id_override: Some(11),
        };
        assert_eq!(form.prepare_submission(&session).unwrap().user_id, Some(11));
    }

    #[test]
    fn reset_continues_from_end_time() {
        let mut form = filled_form();
        form.set_field(Field::Task, "T-1".to_string());
        form.reset_after_submit();
        assert_eq!(form.draft().starts_at, "17:00");
        assert_eq!(form.draft().body.as_deref(), Some(""));
        assert_eq!(form.draft().task, "");
        assert_eq!(form.draft().duration_minutes, 0);
        assert_eq!(form.draft().project.as_ref().map(|p| p.id), Some(1));
    }

    #[test]
    fn server_errors_map_to_fields() {
        let mut form = filled_form();
        let before = form.draft().clone();
        let mut server = ServerErrors::new();
        server.insert("project_id".to_string(), vec!["is archived".to_string()]);
        server.insert("base".to_string(), vec!["overlaps".to_string()]);
        form.apply_server_errors(server);

        assert_eq!(form.errors()[&Field::Project], vec!["is archived"]);
        assert_eq!(form.errors()[&Field::Base], vec!["overlaps"]);
        assert_eq!(form.draft().body, before.body);
        assert_eq!(form.draft().starts_at, before.starts_at);
        assert_eq!(form.draft().ends_at, before.ends_at);
    }

    #[test]
    fn typing_edits_the_focused_field() {
        let mut form = form();
        form.focused = FormField::Body;
        for ch in "fix".chars() {
            form.input_push(ch);
        }
        form.input_backspace();
        assert_eq!(form.draft().body.as_deref(), Some("fi"));

        form.focused = FormField::EndsAt;
        form.clear_focused();
        for ch in "1000".chars() {
            form.input_push(ch);
        }
        form.select_project(project(1));
        form.focused = FormField::EndsAt;
        form.next_field();
        assert_eq!(form.draft().ends_at, "10:00");
        assert_eq!(form.draft().duration_minutes, 60);
        assert_eq!(form.focused, FormField::Date);
    }

    #[test]
    fn task_field_only_for_projects_allowing_it() {
        let mut form = form();
        form.select_project(project(1));
        form.focused = FormField::Body;
        form.next_field();
        assert_eq!(form.focused, FormField::Project);

        form.select_project(Project {
            allows_task: true,
            ..project(2)
        });
        form.focused = FormField::Body;
        form.next_field();
        assert_eq!(form.focused, FormField::Task);
    }

    #[test]
    fn confirming_project_applies_it() {
        let mut form = form();
        form.focused = FormField::Project;
        form.set_field(Field::StartsAt, "12:00".to_string());
        for ch in "project 90".chars() {
            form.input_push(ch);
        }
        assert!(form.confirm_project());
        assert_eq!(form.draft().project.as_ref().map(|p| p.id), Some(90));
        assert_eq!(form.draft().ends_at, "12:30");
        assert_eq!(form.focused, FormField::StartsAt);
    }
}
