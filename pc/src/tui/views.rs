//! TUI views and rendering
//!
//! All rendering logic is contained here. The views module is responsible
//! for drawing the UI based on AppState, but never modifies state.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use tracing::trace;

use super::state::{AppState, CatalogStatus, Focus, InteractionMode, View};
use crate::catalog::display_value;
use crate::compose::Mode;
use crate::diagnostic::{DiagnosticStatus, MISSING_HINT};
use crate::form::{Control, FORM_COLUMNS, FormField};
use crate::selection::Resolution;

mod colors {
    use ratatui::style::Color;

    pub const HEADER: Color = Color::Rgb(0, 255, 255); // Cyan
    pub const KEYBIND: Color = Color::Rgb(0, 255, 255); // Cyan
    pub const FOCUS: Color = Color::Rgb(255, 215, 0); // Gold
    pub const SELECTED_BG: Color = Color::Rgb(40, 40, 40);
    pub const INFO: Color = Color::Rgb(100, 149, 237); // Cornflower blue
    pub const OK: Color = Color::Rgb(50, 205, 50); // Lime green
    pub const ERROR: Color = Color::Rgb(220, 20, 60); // Crimson
    pub const WARN: Color = Color::Rgb(255, 165, 0); // Orange
    pub const DIM: Color = Color::DarkGray;
}

/// Lines each form field occupies: label, value, spacer
const FIELD_HEIGHT: usize = 3;

/// Main render function
pub fn render(state: &AppState, frame: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Main content
            Constraint::Length(3), // Footer
        ])
        .split(frame.area());

    render_header(state, frame, chunks[0]);

    match state.current_view {
        View::Browse => render_browse(state, frame, chunks[1]),
        View::Doctor => render_doctor(state, frame, chunks[1]),
    }

    render_footer(state, frame, chunks[2]);

    if state.interaction_mode == InteractionMode::Help {
        render_help_overlay(frame, chunks[1]);
    }
}

/// Render the header bar
fn render_header(state: &AppState, frame: &mut Frame, area: Rect) {
    trace!("render_header: called");
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "Prompt Copilot ",
            Style::default().fg(colors::HEADER).add_modifier(Modifier::BOLD),
        ),
        Span::raw("│ "),
        Span::styled(state.current_view.display_name(), Style::default().fg(Color::Yellow)),
        Span::raw(" │ "),
        Span::styled(
            state.catalog_path.display().to_string(),
            Style::default().fg(colors::DIM),
        ),
        Span::raw(" │ mode: "),
        Span::styled(state.mode.label(), Style::default().fg(colors::INFO)),
    ]))
    .block(Block::default().borders(Borders::ALL));

    frame.render_widget(header, area);
}

/// Render the browser: sidebar plus variables and result
fn render_browse(state: &AppState, frame: &mut Frame, area: Rect) {
    match &state.catalog {
        CatalogStatus::Pending => {
            render_empty_message(frame, area, "Loading catalog...");
            return;
        }
        CatalogStatus::Missing => {
            let message = format!(
                "Catalog file `{}` not found. Make sure it is in the same directory.",
                state.catalog_path.display()
            );
            render_blocking_error(frame, area, &message, MISSING_HINT);
            return;
        }
        CatalogStatus::Failed { detail } => {
            render_blocking_error(frame, area, detail, "Run `pc doctor` for details");
            return;
        }
        CatalogStatus::Loaded(_) => {}
    }

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(area);

    render_sidebar(state, frame, columns[0]);
    render_main(state, frame, columns[1]);
}

fn render_sidebar(state: &AppState, frame: &mut Frame, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(50),
            Constraint::Min(3),
            Constraint::Length(Mode::ALL.len() as u16 + 2),
        ])
        .split(area);

    let categories = state.category_names();
    render_selector(
        frame,
        chunks[0],
        " Category ",
        &categories,
        state.category_selection.selected_index,
        state.focus == Focus::Category,
    );

    let tasks = state.task_names();
    render_selector(
        frame,
        chunks[1],
        " Task ",
        &tasks,
        state.task_selection.selected_index,
        state.focus == Focus::Task,
    );

    let modes: Vec<&str> = Mode::ALL.iter().map(Mode::label).collect();
    render_selector(
        frame,
        chunks[2],
        " Output Mode ",
        &modes,
        state.mode.index(),
        state.focus == Focus::Mode,
    );
}

/// Render a single-choice list with the selected row highlighted
fn render_selector(frame: &mut Frame, area: Rect, title: &str, items: &[&str], selected: usize, focused: bool) {
    trace!(%title, items = items.len(), selected, "render_selector: called");
    let list_items: Vec<ListItem> = items.iter().map(|item| ListItem::new(item.to_string())).collect();

    let highlight = if focused {
        Style::default()
            .bg(colors::SELECTED_BG)
            .fg(colors::FOCUS)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().bg(colors::SELECTED_BG)
    };

    let list = List::new(list_items)
        .block(panel_block(title, focused))
        .highlight_style(highlight)
        .highlight_symbol("▸ ");

    let mut list_state = ListState::default().with_selected((!items.is_empty()).then_some(selected));
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn render_main(state: &AppState, frame: &mut Frame, area: Rect) {
    let task = match state.resolution() {
        Resolution::TaskSelected { task, .. } => task,
        Resolution::CategorySelected { .. } => {
            render_empty_message(frame, area, "This category has no tasks");
            return;
        }
        Resolution::NoSelection => {
            render_empty_message(frame, area, "Select a category");
            return;
        }
    };

    let description_height = if task.description.is_some() { 3 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(description_height),
            Constraint::Percentage(45),
            Constraint::Min(3),
        ])
        .split(area);

    if let Some(description) = &task.description {
        let info = Paragraph::new(Line::from(vec![
            Span::styled("ℹ ", Style::default().fg(colors::INFO)),
            Span::raw(description.as_str()),
        ]))
        .block(Block::default().borders(Borders::ALL))
        .wrap(Wrap { trim: true });
        frame.render_widget(info, chunks[0]);
    }

    render_variables(state, frame, chunks[1]);
    render_result(state, frame, chunks[2]);
}

/// Render the form in two columns
fn render_variables(state: &AppState, frame: &mut Frame, area: Rect) {
    let focused = state.focus == Focus::Variables;
    let block = panel_block(" Variables ", focused);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if state.form.is_empty() {
        render_empty_message(frame, inner, "No variables");
        return;
    }

    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(inner);

    let selected = state.field_selection.selected_index;
    let editing = match &state.interaction_mode {
        InteractionMode::EditField { index, buffer } => Some((*index, buffer.as_str())),
        _ => None,
    };

    for column in 0..FORM_COLUMNS {
        let mut lines = Vec::new();
        let mut selected_row = None;
        for (row, (index, field)) in state.form.column(column).enumerate() {
            let is_selected = focused && index == selected;
            if index == selected {
                selected_row = Some(row);
            }
            let edit_buffer = editing.filter(|(i, _)| *i == index).map(|(_, buffer)| buffer);
            lines.extend(field_lines(field, is_selected, edit_buffer));
        }

        // Keep the selected field visible
        let height = halves[column].height as usize;
        let scroll = selected_row
            .map(|row| ((row + 1) * FIELD_HEIGHT).saturating_sub(height))
            .unwrap_or(0);

        let paragraph = Paragraph::new(lines).scroll((scroll as u16, 0));
        frame.render_widget(paragraph, halves[column].inner(Margin::new(1, 0)));
    }
}

/// Lines for one field: label, current value, spacer
fn field_lines<'a>(field: &'a FormField, selected: bool, edit_buffer: Option<&'a str>) -> Vec<Line<'a>> {
    let label_style = if selected {
        Style::default().fg(colors::FOCUS).add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };
    let marker = if selected { "▸ " } else { "  " };

    let value_line = match (&field.control, edit_buffer) {
        (Control::Text { .. }, Some(buffer)) => Line::from(vec![
            Span::raw("  ["),
            Span::styled(buffer, Style::default().fg(Color::Yellow)),
            Span::styled("▏", Style::default().fg(Color::Yellow)),
            Span::raw("]"),
        ]),
        (Control::Text { value }, None) => Line::from(vec![Span::raw("  ["), Span::raw(value.as_str()), Span::raw("]")]),
        (Control::Choice { options, selected: choice }, _) => {
            let current = options.get(*choice).map(display_value).unwrap_or_default();
            Line::from(vec![
                Span::styled("  ◀ ", Style::default().fg(colors::DIM)),
                Span::raw(current),
                Span::styled(" ▶", Style::default().fg(colors::DIM)),
                Span::styled(
                    format!("  {}/{}", (*choice + 1).min(options.len()), options.len()),
                    Style::default().fg(colors::DIM),
                ),
            ])
        }
        (Control::MultiChoice { options, chosen, cursor }, _) => {
            let mut spans = vec![Span::raw("  ")];
            for (i, (option, on)) in options.iter().zip(chosen).enumerate() {
                let mut style = if *on {
                    Style::default().fg(colors::OK)
                } else {
                    Style::default()
                };
                if selected && i == *cursor {
                    style = style.add_modifier(Modifier::UNDERLINED | Modifier::BOLD);
                }
                let mark = if *on { "[x] " } else { "[ ] " };
                spans.push(Span::styled(format!("{}{}", mark, display_value(option)), style));
                spans.push(Span::raw("  "));
            }
            Line::from(spans)
        }
    };

    vec![
        Line::from(vec![
            Span::styled(marker, label_style),
            Span::styled(field.label.as_str(), label_style),
        ]),
        value_line,
        Line::from(""),
    ]
}

/// Render the composed prompt or the composition error
fn render_result(state: &AppState, frame: &mut Frame, area: Rect) {
    let block = panel_block(" Result (y to copy) ", state.focus == Focus::Result);

    let paragraph = match state.composed() {
        Some(Ok(prompt)) => Paragraph::new(prompt)
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((state.result_scroll, 0)),
        Some(Err(e)) => Paragraph::new(format!("Failed to compose prompt, check the template: {}", e))
            .style(Style::default().fg(colors::ERROR))
            .block(block)
            .wrap(Wrap { trim: false }),
        None => Paragraph::new("").block(block),
    };

    frame.render_widget(paragraph, area);
}

/// Render the diagnostics view
fn render_doctor(state: &AppState, frame: &mut Frame, area: Rect) {
    let Some(report) = &state.diagnostic else {
        render_empty_message(frame, area, "Running diagnostics...");
        return;
    };

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    let entries: Vec<ListItem> = report
        .entries
        .iter()
        .map(|entry| {
            let style = if *entry == report.filename {
                Style::default().fg(colors::OK).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(entry.as_str()).style(style)
        })
        .collect();
    let title = format!(" Files in {} ", report.dir);
    let list = List::new(entries).block(panel_block(&title, false));
    frame.render_widget(list, columns[0]);

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Looking for: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(report.filename.as_str()),
        ]),
        Line::from(""),
    ];
    match &report.status {
        DiagnosticStatus::Missing => {
            lines.push(Line::from(Span::styled(
                format!("⚠ {} not found", report.filename),
                Style::default().fg(colors::WARN).add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(MISSING_HINT));
        }
        DiagnosticStatus::Malformed { detail } => {
            lines.push(Line::from(Span::styled(
                "✗ JSON parse error",
                Style::default().fg(colors::ERROR).add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(detail.as_str()));
        }
        DiagnosticStatus::Valid { category_count } => {
            lines.push(Line::from(Span::styled(
                format!("✓ Catalog is valid: {} categories", category_count),
                Style::default().fg(colors::OK).add_modifier(Modifier::BOLD),
            )));
        }
    }

    let status = Paragraph::new(lines)
        .block(panel_block(" Status ", false))
        .wrap(Wrap { trim: true });
    frame.render_widget(status, columns[1]);
}

/// Render the footer with key hints or the status message
fn render_footer(state: &AppState, frame: &mut Frame, area: Rect) {
    let content = if let Some(status) = &state.status {
        let color = if status.is_error { colors::ERROR } else { colors::OK };
        Line::from(Span::styled(status.text.as_str(), Style::default().fg(color)))
    } else {
        let hints: &[(&str, &str)] = match (&state.interaction_mode, state.current_view, state.focus) {
            (InteractionMode::EditField { .. }, _, _) => &[("Enter", "save"), ("Esc", "cancel"), ("^U", "clear")],
            (InteractionMode::Help, _, _) => &[("Esc", "close help")],
            (_, View::Doctor, _) => &[("Esc/D", "back"), ("r", "reload"), ("q", "quit")],
            (_, View::Browse, Focus::Variables) => &[
                ("j/k", "field"),
                ("←/→", "option"),
                ("Space", "toggle"),
                ("Enter", "edit"),
                ("Tab", "panel"),
                ("y", "copy"),
                ("?", "help"),
            ],
            (_, View::Browse, _) => &[
                ("j/k", "move"),
                ("Tab", "panel"),
                ("y", "copy"),
                ("D", "doctor"),
                ("?", "help"),
                ("q", "quit"),
            ],
        };
        let mut spans = Vec::new();
        for (key, desc) in hints {
            spans.push(Span::styled(format!("[{}]", key), Style::default().fg(colors::KEYBIND)));
            spans.push(Span::raw(format!(" {}  ", desc)));
        }
        Line::from(spans)
    };

    let footer = Paragraph::new(content).block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, area);
}

/// Render help overlay
fn render_help_overlay(frame: &mut Frame, area: Rect) {
    trace!("render_help_overlay: called");
    let popup_area = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup_area);

    let help_text = vec![
        Line::from(vec![Span::styled(
            "Keyboard Shortcuts",
            Style::default()
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
                .fg(colors::HEADER),
        )]),
        Line::from(""),
        section_line("Global"),
        key_line("Tab", "Next panel (Category → Task → Mode → Variables → Result)"),
        key_line("Shift-Tab", "Previous panel"),
        key_line("y", "Copy the composed prompt"),
        key_line("r", "Reload the catalog file"),
        key_line("D", "Toggle diagnostics"),
        key_line("?", "Toggle help"),
        key_line("q", "Quit"),
        Line::from(""),
        section_line("Lists"),
        key_line("j/↓", "Move down"),
        key_line("k/↑", "Move up"),
        key_line("Enter", "Go to next panel"),
        Line::from(""),
        section_line("Variables"),
        key_line("j/k", "Select field"),
        key_line("←/→", "Change choice / move over options"),
        key_line("Space", "Toggle option (multi-choice)"),
        key_line("Enter", "Edit text field"),
        Line::from(""),
        section_line("Result"),
        key_line("j/k", "Scroll"),
        key_line("g", "Scroll to top"),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Help (? to close) ")
                .style(Style::default().bg(Color::Black)),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(help, popup_area);
}

fn section_line(title: &str) -> Line<'_> {
    Line::from(vec![Span::styled(title, Style::default().add_modifier(Modifier::BOLD))])
}

/// Helper to create a key binding line
fn key_line<'a>(key: &'a str, desc: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(format!("{:<12}", key), Style::default().fg(colors::KEYBIND)),
        Span::raw(desc),
    ])
}

/// Bordered block whose border lights up when focused
fn panel_block<'a>(title: &'a str, focused: bool) -> Block<'a> {
    let border = if focused {
        Style::default().fg(colors::FOCUS)
    } else {
        Style::default().fg(colors::DIM)
    };
    Block::default().borders(Borders::ALL).title(title).border_style(border)
}

/// Render a blocking error in place of the browser
fn render_blocking_error(frame: &mut Frame, area: Rect, message: &str, hint: &str) {
    trace!(%message, "render_blocking_error: called");
    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("✗ {}", message),
            Style::default().fg(colors::ERROR).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(hint, Style::default().fg(colors::DIM))),
    ];

    let error = Paragraph::new(content)
        .block(Block::default().borders(Borders::ALL).title(" Error "))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(error, area);
}

/// Render empty state message
fn render_empty_message(frame: &mut Frame, area: Rect, message: &str) {
    trace!(%message, "render_empty_message: called");
    let inner = area.inner(Margin {
        horizontal: 2,
        vertical: 2,
    });

    let empty = Paragraph::new(message)
        .style(Style::default().fg(colors::DIM))
        .alignment(Alignment::Center);

    frame.render_widget(empty, inner);
}

/// Helper to create a centered rect
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
