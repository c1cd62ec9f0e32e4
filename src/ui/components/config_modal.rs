use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

use crate::application::app::{App, ConfigField, ConfigForm};
use crate::ui::helpers::centered_rect;
use crate::ui::theme::{THEME_CATALOG, palette_with_override, resolve_theme_name};
use crate::utils::version::build_version;

fn masked_token(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() > 4 {
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("...{tail}")
    } else if value.is_empty() {
        String::new()
    } else {
        "***".to_string()
    }
}

pub fn render_config_modal(frame: &mut Frame, app: &App) {
    let Some(form) = app.config_form.as_ref() else {
        return;
    };

    let area = centered_rect(72, 70, frame.area());
    frame.render_widget(Clear, area);

    let palette = palette_with_override(&app.config, Some(form.theme.as_str()));
    let version = build_version();

    let block = Block::default()
        .title(format!("Settings [{version}]"))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.accent))
        .style(Style::default().bg(palette.bg).fg(palette.fg));
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
        ])
        .split(area);

    let style_focused = Style::default()
        .fg(palette.accent)
        .add_modifier(Modifier::BOLD);
    let style_normal = Style::default().fg(palette.fg);

    let render_field = |f: &mut Frame, title: &str, value: &str, field: ConfigField, field_area: Rect| {
        let is_focused = form.focused == field;
        let style = if is_focused { style_focused } else { style_normal };
        let display_value = if field == ConfigField::Token && !is_focused {
            masked_token(value)
        } else {
            value.to_string()
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(style)
            .style(Style::default().bg(palette.bg));
        f.render_widget(Paragraph::new(display_value).block(block).style(style), field_area);
    };

    render_field(frame, "API token", &form.token, ConfigField::Token, chunks[0]);
    render_field(frame, "Base URL", &form.base_url, ConfigField::BaseUrl, chunks[1]);
    render_field(frame, "User id (blank: token owner)", &form.user_id, ConfigField::UserId, chunks[2]);
    render_field(frame, "Theme (list)", &form.theme, ConfigField::Theme, chunks[3]);

    let help_text = format!(
        "Build: {}\nTheme: {} (applied: {})\n\
         Tab/Shift+Tab: field | Up/Down: theme | Ctrl+U: clear | Enter: save | Esc: cancel{}",
        version,
        form.theme,
        resolve_theme_name(&form.theme).slug(),
        if app.timesheet.notice.is_empty() {
            String::new()
        } else {
            format!("\n{}", app.timesheet.notice)
        }
    );
    frame.render_widget(
        Paragraph::new(help_text)
            .style(Style::default().fg(palette.muted))
            .alignment(Alignment::Center),
        chunks[4],
    );

    let (cursor_rect, text_len) = match form.focused {
        ConfigField::Token => (chunks[0], form.token.chars().count()),
        ConfigField::BaseUrl => (chunks[1], form.base_url.chars().count()),
        ConfigField::UserId => (chunks[2], form.user_id.chars().count()),
        ConfigField::Theme => (chunks[3], form.theme.chars().count()),
    };
    if cursor_rect.width > 0 {
        frame.set_cursor_position((cursor_rect.x + 1 + text_len as u16, cursor_rect.y + 1));
    }

    if form.focused == ConfigField::Theme {
        render_theme_dropdown(frame, chunks[3], form, &palette);
    }
}

fn render_theme_dropdown(
    frame: &mut Frame,
    anchor: Rect,
    form: &ConfigForm,
    palette: &ratatui_themes::ThemePalette,
) {
    let dropdown_area = Rect {
        x: anchor.x,
        y: anchor.y + 3,
        width: anchor.width,
        height: (THEME_CATALOG.len() as u16 + 2)
            .min(10)
            .min(frame.area().height.saturating_sub(anchor.y + 3)),
    };

    let items: Vec<ListItem> = THEME_CATALOG
        .iter()
        .map(|theme| ListItem::new(theme.to_string()))
        .collect();
    let mut state =
        ListState::default().with_selected(THEME_CATALOG.iter().position(|t| *t == form.theme));

    let list = List::new(items)
        .block(
            Block::default()
                .title("Themes")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.accent))
                .style(Style::default().bg(palette.selection).fg(palette.fg)),
        )
        .highlight_style(Style::default().bg(palette.accent).fg(palette.bg))
        .highlight_symbol("-> ");

    frame.render_widget(Clear, dropdown_area);
    frame.render_stateful_widget(list, dropdown_area, &mut state);
}
