use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
};
use ratatui_themes::ThemePalette;

use crate::application::entry_form::{EntryForm, FormField};
use crate::domain::draft::Field;
use crate::ui::helpers::error_suffix;

const LUNCH_PLACEHOLDER: &str = "Lunch break";

pub fn render_entry_form(
    frame: &mut Frame,
    area: Rect,
    form: &mut EntryForm,
    palette: &ThemePalette,
    active: bool,
    submitting: bool,
) {
    let title = if submitting {
        "New entry (saving...)"
    } else {
        "New entry"
    };
    let border = if active { palette.accent } else { palette.muted };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .style(Style::default().bg(palette.bg).fg(palette.fg));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(inner);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(rows[0]);
    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);
    let times = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(20),
            Constraint::Percentage(30),
        ])
        .split(rows[2]);

    let style_focused = Style::default()
        .fg(palette.accent)
        .add_modifier(Modifier::BOLD);
    let style_normal = Style::default().fg(palette.fg);
    let style_error = Style::default().fg(Color::Red);

    let render_field = |f: &mut Frame, label: &str, field: FormField, key: Field, field_area: Rect| {
        let focused = active && form.focused == field;
        let errors = form.errors().get(&key);
        let border = if errors.is_some() {
            style_error
        } else if focused {
            style_focused
        } else {
            style_normal
        };
        let title = Line::from(vec![
            Span::raw(label.to_string()),
            Span::styled(error_suffix(errors), style_error),
        ]);
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(border);
        let text_style = if focused { style_focused } else { style_normal };
        f.render_widget(
            Paragraph::new(form.value_of(field).to_string())
                .block(block)
                .style(text_style),
            field_area,
        );
    };

    if form.shows_body() {
        render_field(frame, "Body", FormField::Body, Field::Body, top[0]);
    } else {
        frame.render_widget(
            Paragraph::new(LUNCH_PLACEHOLDER)
                .block(Block::default().borders(Borders::ALL).title("Body"))
                .style(Style::default().fg(palette.muted)),
            top[0],
        );
    }

    if form.shows_task() {
        render_field(frame, "Task", FormField::Task, Field::Task, top[1]);
    }
    render_field(frame, "Project", FormField::Project, Field::Project, middle[0]);
    render_field(frame, "Date", FormField::Date, Field::Date, middle[1]);
    render_field(frame, "Starts at", FormField::StartsAt, Field::StartsAt, times[0]);
    render_field(frame, "Ends at", FormField::EndsAt, Field::EndsAt, times[1]);

    let duration_errors = form.errors().get(&Field::Duration);
    let duration_style = if duration_errors.is_some() {
        style_error
    } else {
        Style::default().fg(Color::Cyan)
    };
    frame.render_widget(
        Paragraph::new(form.duration_display())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("Duration{}", error_suffix(duration_errors))),
            )
            .style(duration_style),
        times[2],
    );

    if let Some(base) = form.errors().get(&Field::Base) {
        frame.render_widget(
            Paragraph::new(base.join(", ")).style(style_error),
            times[3],
        );
    }

    if !active {
        return;
    }

    let (cursor_area, text_len) = match form.focused {
        FormField::Body => (top[0], form.value_of(FormField::Body).chars().count()),
        FormField::Task => (top[1], form.value_of(FormField::Task).chars().count()),
        FormField::Project => (middle[0], form.selector.search.chars().count()),
        FormField::StartsAt => (times[0], form.draft().starts_at.chars().count()),
        FormField::EndsAt => (times[1], form.draft().ends_at.chars().count()),
        FormField::Date => (middle[1], form.date_input.chars().count()),
    };
    if cursor_area.width > 2 {
        let max_x = cursor_area.x + cursor_area.width - 2;
        let x = (cursor_area.x + 1 + text_len as u16).min(max_x);
        frame.set_cursor_position((x, cursor_area.y + 1));
    }

    if form.focused == FormField::Project {
        render_project_dropdown(frame, middle[0], form, palette);
    }
}

fn render_project_dropdown(
    frame: &mut Frame,
    anchor: Rect,
    form: &mut EntryForm,
    palette: &ThemePalette,
) {
    let items: Vec<ListItem> = form
        .selector
        .filtered()
        .map(|project| ListItem::new(project.name.clone()))
        .collect();
    if items.is_empty() {
        return;
    }

    let area = frame.area();
    let y = anchor.y + anchor.height;
    let height = (items.len() as u16 + 2)
        .min(10)
        .min(area.height.saturating_sub(y));
    if height < 3 {
        return;
    }
    let dropdown_area = Rect {
        x: anchor.x,
        y,
        width: anchor.width,
        height,
    };

    let list = List::new(items)
        .block(
            Block::default()
                .title("Projects")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.accent))
                .style(Style::default().bg(palette.selection).fg(palette.fg)),
        )
        .highlight_style(Style::default().bg(palette.accent).fg(palette.bg))
        .highlight_symbol("-> ");

    frame.render_widget(Clear, dropdown_area);
    frame.render_stateful_widget(list, dropdown_area, &mut form.selector.list_state);
}
