pub mod components;
pub mod helpers;
pub mod theme;
pub mod tui;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::Style,
    widgets::{Block, Borders, Paragraph},
};

use crate::application::app::{App, AppFocus, InputMode};
use crate::ui::components::config_modal::render_config_modal;
use crate::ui::components::entry_form::render_entry_form;
use crate::ui::components::history_panel::render_history;
use crate::ui::theme::palette_from_config;
use crate::utils::parsing::display_date;

pub fn ui(frame: &mut Frame, app: &mut App) {
    let palette = palette_from_config(&app.config);
    frame.render_widget(
        Block::default().style(Style::default().bg(palette.bg).fg(palette.fg)),
        frame.area(),
    );

    // Nothing is editable until the project catalog has arrived.
    if !app.timesheet.is_ready() {
        let text = if app.timesheet.notice.is_empty() {
            "Loading projects...".to_string()
        } else {
            format!("{}\n\no: settings | q: quit", app.timesheet.notice)
        };
        let area = helpers::centered_rect(60, 20, frame.area());
        frame.render_widget(
            Paragraph::new(text)
                .alignment(Alignment::Center)
                .style(Style::default().fg(palette.muted)),
            area,
        );
        if app.input_mode == InputMode::Configuring {
            render_config_modal(frame, app);
        }
        return;
    }

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(11),
            Constraint::Min(4),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let form_active = app.focus == AppFocus::Form && app.input_mode == InputMode::Normal;
    let submitting = app.timesheet.is_submitting();
    let date_label = display_date(app.timesheet.form().draft().date);

    render_entry_form(
        frame,
        layout[0],
        app.timesheet.form_mut(),
        &palette,
        form_active,
        submitting,
    );
    render_history(
        frame,
        layout[1],
        app.timesheet.history_mut(),
        &palette,
        app.focus == AppFocus::History,
        &date_label,
    );

    let keys = match app.focus {
        AppFocus::Form => "Tab: field | Enter: next/pick | Ctrl+S: save | Ctrl+U: clear | Esc: entries",
        AppFocus::History => "j/k: move | y: copy to form | r: refresh | o: settings | i: form | q: quit",
    };
    let footer = if app.timesheet.notice.is_empty() {
        keys.to_string()
    } else {
        format!("{keys} | {}", app.timesheet.notice)
    };
    frame.render_widget(
        Paragraph::new(footer)
            .block(Block::default().title("Actions").borders(Borders::ALL))
            .style(Style::default().fg(palette.muted)),
        layout[2],
    );

    if app.input_mode == InputMode::Configuring {
        render_config_modal(frame, app);
    }
}
