use crossterm::event::{KeyCode, KeyModifiers};

use crate::application::app::{App, AppFocus, InputMode};
use crate::application::entry_form::FormField;

/// Returns true when the app should quit.
pub fn handle_key(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> bool {
    let ctrl = modifiers.contains(KeyModifiers::CONTROL);
    if code == KeyCode::Char('c') && ctrl {
        return true;
    }

    if app.input_mode == InputMode::Configuring {
        match code {
            KeyCode::Esc => app.close_config(),
            KeyCode::BackTab => app.config_prev_field(),
            KeyCode::Tab => app.config_next_field(),
            KeyCode::Up => app.config_theme_previous(),
            KeyCode::Down => app.config_theme_next(),
            KeyCode::Enter => app.save_config_form(),
            KeyCode::Backspace => app.config_backspace(),
            KeyCode::Char('u') if ctrl => app.config_clear_field(),
            KeyCode::Char(value) => app.config_input(value),
            _ => {}
        }
        return false;
    }

    if !app.timesheet.is_ready() {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('o') => app.open_config(),
            _ => {}
        }
        return false;
    }

    match app.focus {
        AppFocus::Form => handle_form_key(app, code, ctrl),
        AppFocus::History => return handle_history_key(app, code),
    }
    false
}

fn handle_form_key(app: &mut App, code: KeyCode, ctrl: bool) {
    let on_project = app.timesheet.form().focused == FormField::Project;
    match code {
        KeyCode::Esc => app.focus_history(),
        KeyCode::Char('s') if ctrl => app.submit(),
        KeyCode::Char('u') if ctrl => app.timesheet.form_mut().clear_focused(),
        KeyCode::Tab => app.timesheet.form_mut().next_field(),
        KeyCode::BackTab => app.timesheet.form_mut().prev_field(),
        KeyCode::Enter => app.form_enter(),
        KeyCode::Up if on_project => app.timesheet.form_mut().selector.nav_up(),
        KeyCode::Down if on_project => app.timesheet.form_mut().selector.nav_down(),
        KeyCode::Backspace => app.timesheet.form_mut().input_backspace(),
        KeyCode::Char(value) if !ctrl => app.timesheet.form_mut().input_push(value),
        _ => {}
    }
}

fn handle_history_key(app: &mut App, code: KeyCode) -> bool {
    match code {
        KeyCode::Char('q') => return true,
        KeyCode::Down | KeyCode::Char('j') => app.timesheet.history_mut().next(),
        KeyCode::Up | KeyCode::Char('k') => app.timesheet.history_mut().previous(),
        KeyCode::Char('y') | KeyCode::Char('d') => app.copy_selected_entry(),
        KeyCode::Char('r') => app.timesheet.refresh_history(),
        KeyCode::Char('o') => app.open_config(),
        KeyCode::Enter | KeyCode::Tab | KeyCode::Char('i') | KeyCode::Esc => app.focus_form(),
        _ => {}
    }
    false
}
