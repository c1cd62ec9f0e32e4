use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{error, info};

use crate::application::entry_form::FormField;
use crate::application::timesheet::Timesheet;
use crate::domain::config::AppConfig;
use crate::domain::draft::SessionContext;
use crate::domain::errors::ApiError;
use crate::domain::models::{CreateWorkTime, Project, SubmitOutcome, SubmittedEntry};
use crate::infrastructure::api_client::WorkTimeGateway;
use crate::infrastructure::config::{
    build_client, effective_base_url, effective_token, load_config, save_config,
};
use crate::ui::theme::{THEME_CATALOG, resolve_theme_name};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum InputMode {
    Normal,
    Configuring,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AppFocus {
    Form,
    History,
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum ConfigField {
    Token,
    BaseUrl,
    UserId,
    Theme,
}

pub struct ConfigForm {
    pub token: String,
    pub base_url: String,
    pub user_id: String,
    pub theme: String,
    pub focused: ConfigField,
}

pub struct App {
    pub timesheet: Timesheet,
    pub focus: AppFocus,
    pub input_mode: InputMode,
    pub config: AppConfig,
    pub config_form: Option<ConfigForm>,
    user_id_override: Option<i64>,
}

impl App {
    pub fn new(user_id_override: Option<i64>) -> Self {
        let config = load_config();
        let mut timesheet = build_timesheet(&config, user_id_override);
        timesheet.mount();

        Self {
            timesheet,
            focus: AppFocus::Form,
            input_mode: InputMode::Normal,
            config,
            config_form: None,
            user_id_override,
        }
    }

    pub fn tick(&mut self) {
        self.timesheet.poll();
    }

    pub fn focus_form(&mut self) {
        self.focus = AppFocus::Form;
    }

    pub fn focus_history(&mut self) {
        self.timesheet.form_mut().leave_field();
        self.focus = AppFocus::History;
    }

    pub fn copy_selected_entry(&mut self) {
        self.timesheet.history().copy_selected();
        self.timesheet.poll();
        self.focus = AppFocus::Form;
    }

    pub fn submit(&mut self) {
        self.timesheet.form_mut().leave_field();
        self.timesheet.submit();
    }

    pub fn form_enter(&mut self) {
        let form = self.timesheet.form_mut();
        if form.focused == FormField::Project && form.confirm_project() {
            return;
        }
        if form.focused == FormField::Date {
            self.submit();
        } else {
            form.next_field();
        }
    }

    // Config Modal Methods
    pub fn open_config(&mut self) {
        self.config_form = Some(ConfigForm {
            token: effective_token(&self.config),
            base_url: effective_base_url(&self.config),
            user_id: self
                .config
                .user_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
            theme: resolve_theme_name(&self.config.theme).slug().to_string(),
            focused: ConfigField::Token,
        });
        self.input_mode = InputMode::Configuring;
    }

    pub fn close_config(&mut self) {
        self.config_form = None;
        self.input_mode = InputMode::Normal;
    }

    pub fn save_config_form(&mut self) {
        let Some(form) = &self.config_form else {
            return;
        };

        let user_id = form.user_id.trim();
        let user_id = if user_id.is_empty() {
            None
        } else {
            match user_id.parse::<i64>() {
                Ok(id) if id > 0 => Some(id),
                _ => {
                    self.timesheet.notice = format!("invalid user id: {user_id}");
                    return;
                }
            }
        };

        let new_config = AppConfig {
            api_token: form.token.trim().to_string(),
            base_url: form.base_url.trim().to_string(),
            user_id,
            theme: form.theme.clone(),
        };

        match save_config(&new_config) {
            Ok(()) => {
                info!("configuration saved");
                self.config = new_config;
                self.config_form = None;
                self.input_mode = InputMode::Normal;
                self.timesheet = build_timesheet(&self.config, self.user_id_override);
                self.timesheet.mount();
            }
            Err(e) => {
                error!(error = %e, "could not save configuration");
                self.timesheet.notice = format!("error saving configuration: {e}");
            }
        }
    }

    pub fn config_next_field(&mut self) {
        if let Some(form) = &mut self.config_form {
            form.focused = match form.focused {
                ConfigField::Token => ConfigField::BaseUrl,
                ConfigField::BaseUrl => ConfigField::UserId,
                ConfigField::UserId => ConfigField::Theme,
                ConfigField::Theme => ConfigField::Token,
            };
        }
    }

    pub fn config_prev_field(&mut self) {
        if let Some(form) = &mut self.config_form {
            form.focused = match form.focused {
                ConfigField::Token => ConfigField::Theme,
                ConfigField::BaseUrl => ConfigField::Token,
                ConfigField::UserId => ConfigField::BaseUrl,
                ConfigField::Theme => ConfigField::UserId,
            };
        }
    }

    pub fn config_input(&mut self, ch: char) {
        if let Some(form) = &mut self.config_form {
            match form.focused {
                ConfigField::Token => form.token.push(ch),
                ConfigField::BaseUrl => form.base_url.push(ch),
                ConfigField::UserId if ch.is_ascii_digit() => form.user_id.push(ch),
                ConfigField::UserId | ConfigField::Theme => {}
            }
        }
    }

    pub fn config_backspace(&mut self) {
        if let Some(form) = &mut self.config_form {
            match form.focused {
                ConfigField::Token => {
                    form.token.pop();
                }
                ConfigField::BaseUrl => {
                    form.base_url.pop();
                }
                ConfigField::UserId => {
                    form.user_id.pop();
                }
                ConfigField::Theme => {}
            }
        }
    }

    pub fn config_clear_field(&mut self) {
        if let Some(form) = &mut self.config_form {
            match form.focused {
                ConfigField::Token => form.token.clear(),
                ConfigField::BaseUrl => form.base_url.clear(),
                ConfigField::UserId => form.user_id.clear(),
                ConfigField::Theme => {}
            }
        }
    }

    pub fn config_theme_next(&mut self) {
        self.shift_theme(1);
    }

    pub fn config_theme_previous(&mut self) {
        self.shift_theme(THEME_CATALOG.len() - 1);
    }

    fn shift_theme(&mut self, step: usize) {
        if let Some(form) = &mut self.config_form {
            if form.focused != ConfigField::Theme {
                return;
            }
            let current = THEME_CATALOG
                .iter()
                .position(|slug| *slug == form.theme)
                .unwrap_or(0);
            form.theme = THEME_CATALOG[(current + step) % THEME_CATALOG.len()].to_string();
        }
    }
}

fn build_timesheet(config: &AppConfig, user_id_override: Option<i64>) -> Timesheet {
    let session = SessionContext {
        current_user_id: config.user_id,
        user_id_override,
    };
    let gateway: Arc<dyn WorkTimeGateway> = match build_client(config) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!(error = %e, "could not build HTTP client");
            Arc::new(OfflineGateway(e.to_string()))
        }
    };
    Timesheet::new(gateway, session)
}

/// Stands in when no HTTP client could be built; every call reports why.
struct OfflineGateway(String);

impl WorkTimeGateway for OfflineGateway {
    fn fetch_simple_projects(&self) -> Result<Vec<Project>, ApiError> {
        Err(ApiError::Unavailable(self.0.clone()))
    }

    fn fetch_day_entries(
        &self,
        _date: NaiveDate,
        _user_id: Option<i64>,
    ) -> Result<Vec<SubmittedEntry>, ApiError> {
        Err(ApiError::Unavailable(self.0.clone()))
    }

    fn create_work_time(&self, _work_time: &CreateWorkTime) -> Result<SubmitOutcome, ApiError> {
        Err(ApiError::Unavailable(self.0.clone()))
    }
}
