use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};
use ratatui_themes::ThemePalette;

use crate::application::history::EntryHistory;
use crate::utils::time::format_duration;

pub fn render_history(
    frame: &mut Frame,
    area: Rect,
    history: &mut EntryHistory,
    palette: &ThemePalette,
    active: bool,
    date_label: &str,
) {
    let items: Vec<ListItem> = history
        .entries()
        .iter()
        .map(|entry| {
            let project = history
                .project_for(entry)
                .map(|p| p.name)
                .unwrap_or_else(|| entry.project_name());
            let mut spans = vec![
                Span::styled(
                    format!(
                        "{}-{}  ",
                        entry.starts_at.format("%H:%M"),
                        entry.ends_at.format("%H:%M")
                    ),
                    Style::default().fg(Color::Cyan),
                ),
                Span::styled(
                    format!("{:>5}  ", format_duration(entry.duration_minutes())),
                    Style::default().fg(Color::Green),
                ),
                Span::styled(
                    format!("{project:<18} "),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(entry.body.clone().unwrap_or_default()),
            ];
            if let Some(task) = entry.task.as_deref().filter(|t| !t.is_empty()) {
                spans.push(Span::styled(
                    format!("  [{task}]"),
                    Style::default().fg(palette.muted),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let title = format!(
        "Entries {} ({}) total {}",
        date_label,
        history.entries().len(),
        format_duration(history.total_minutes())
    );
    let border = if active { palette.accent } else { palette.muted };
    let list = List::new(items)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
                .style(Style::default().bg(palette.bg).fg(palette.fg)),
        )
        .highlight_style(
            Style::default()
                .bg(palette.selection)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(if active { "> " } else { "  " });

    frame.render_stateful_widget(list, area, &mut history.list_state);
}
