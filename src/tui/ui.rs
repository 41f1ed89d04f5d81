use chrono::Utc;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap},
    Frame,
};

use super::app::{App, Focus};
use super::form::{FormField, FormMode};
use super::list::{Badge, ListItem};

pub fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Session
            Constraint::Min(0),    // List + form
            Constraint::Length(3), // Help
        ])
        .split(f.area());

    draw_session(f, app, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(chunks[1]);

    draw_list(f, app, body[0]);
    draw_form(f, app, body[1]);

    let help_text = if app.delete_flow.pending().is_some() {
        "y/Enter: Delete | n/Esc: Keep"
    } else {
        match app.focus {
            Focus::List => "q: Quit | j/k: Move | Space: Done | e/Enter: Edit | d: Delete | a: New task",
            Focus::Form => "Tab/Shift-Tab: Field | Enter: Save | Esc: Cancel",
        }
    };
    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);

    if let Some(id) = app.delete_flow.pending() {
        let title = app
            .tasks()
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.title.clone())
            .unwrap_or_else(|| id.to_string());
        draw_confirm(f, &title);
    }
}

fn draw_session(f: &mut Frame, app: &App, area: Rect) {
    let line = match (&app.session.user, app.session.ready) {
        (Some(user), true) => Line::from(vec![
            Span::styled("Signed in ", Style::default().fg(Color::Green)),
            Span::raw(format!(
                "{} ({})",
                user.uid,
                if user.is_anonymous { "anonymous" } else { "token" }
            )),
        ]),
        _ if app.session.sign_in_failed => Line::from(Span::styled(
            "Not signed in (see log)",
            Style::default().fg(Color::Red),
        )),
        _ => Line::from(Span::styled("Signing in…", Style::default().fg(Color::Yellow))),
    };
    let widget = Paragraph::new(line).block(Block::default().borders(Borders::ALL).title("tasksync"));
    f.render_widget(widget, area);
}

fn draw_list(f: &mut Frame, app: &mut App, area: Rect) {
    let now = Utc::now();
    let rows: Vec<Row> = app
        .tasks()
        .iter()
        .map(|t| {
            let item = ListItem::from_task(t, now);
            let style = if item.completed {
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT)
            } else {
                match item.badge {
                    Some(Badge::Overdue) => Style::default().fg(Color::Red),
                    Some(Badge::DueSoon) => Style::default().fg(Color::Yellow),
                    None => Style::default(),
                }
            };
            Row::new(vec![
                Cell::from(item.checkbox()),
                Cell::from(item.title),
                Cell::from(item.description.unwrap_or_default()),
                Cell::from(item.deadline.unwrap_or_default()),
                Cell::from(item.badge.map(Badge::label).unwrap_or_default()),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(3),
        Constraint::Min(16),
        Constraint::Min(16),
        Constraint::Length(22),
        Constraint::Length(9),
    ];

    let border = if app.focus == Focus::List { Color::Cyan } else { Color::Reset };
    let table = Table::new(rows, widths)
        .header(Row::new(vec!["", "Title", "Description", "Deadline", "Status"])
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .bottom_margin(1))
        .block(Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(format!("Tasks ({})", app.tasks().len())))
        .row_highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray))
        .highlight_symbol(">> ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn draw_form(f: &mut Frame, app: &App, area: Rect) {
    let title = match app.form.mode {
        FormMode::Create => "New task",
        FormMode::Edit { .. } => "Edit task",
    };
    let outer = Block::default().borders(Borders::ALL).title(title);
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(inner);

    let fields = [
        (FormField::Title, "Title"),
        (FormField::Description, "Description"),
        (FormField::Deadline, "Deadline (YYYY-MM-DD HH:MM)"),
    ];
    for (i, (field, label)) in fields.into_iter().enumerate() {
        let focused = app.focus == Focus::Form && app.form.focus == field;
        let mut text = app.form.input(field).to_string();
        if focused {
            text.push('▏');
        }
        let style = if focused { Style::default().fg(Color::Yellow) } else { Style::default() };
        let input = Paragraph::new(text)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).border_style(style).title(label));
        f.render_widget(input, chunks[i]);
    }

    if let Some(status) = &app.status {
        let status = Paragraph::new(status.as_str())
            .style(Style::default().fg(Color::Magenta))
            .wrap(Wrap { trim: true });
        f.render_widget(status, chunks[3]);
    }
}

fn draw_confirm(f: &mut Frame, title: &str) {
    let area = centered_rect(50, 5, f.area());
    f.render_widget(Clear, area);
    let body = vec![
        Line::from(format!("Delete \"{}\"?", title)),
        Line::from(Span::styled("This cannot be undone. [y/N]", Style::default().fg(Color::Gray))),
    ];
    let dialog = Paragraph::new(body)
        .wrap(Wrap { trim: true })
        .block(Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red))
            .title("Confirm delete"));
    f.render_widget(dialog, area);
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let margin = r.height.saturating_sub(height) / 2;
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(margin),
            Constraint::Length(height),
            Constraint::Length(margin),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
