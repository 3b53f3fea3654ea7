//! UI rendering for the TUI.
//!
//! Handles layout and widget rendering using ratatui.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::app::AppMode;
use crate::core::UserInput;
use crate::wizard::{UploadState, View, WizardStep, COLUMNS};
use crate::App;

/// Spinner frames for the busy indicator.
const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

/// Draw the main UI.
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Step pills
            Constraint::Min(8),    // Current step or board
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    draw_header(frame, app, chunks[0]);
    match app.status.view {
        View::Step(WizardStep::Description) => draw_description(frame, app, chunks[1]),
        View::Step(step @ (WizardStep::Requirements | WizardStep::Inspiration)) => {
            draw_upload_step(frame, app, step, chunks[1]);
        }
        View::Step(WizardStep::Integrations) => draw_integrations(frame, app, chunks[1]),
        View::TaskBoard => draw_task_board(frame, app, chunks[1]),
    }
    draw_status_bar(frame, app, chunks[2]);

    match app.mode {
        AppMode::Help => draw_help_overlay(frame, app),
        AppMode::ConfirmReset => draw_reset_overlay(frame, app),
        AppMode::Normal => {}
    }
}

/// Draw the step pills.
fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let mut spans = Vec::new();

    for step in WizardStep::ALL {
        let label = format!(" {} {} ", step.index() + 1, step.title());
        let style = if app.status.view == View::Step(step) {
            Style::default().fg(theme.text).bg(theme.primary).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.text_dim)
        };
        spans.push(Span::styled(label, style));
        spans.push(Span::raw(" "));
    }

    let board_style = if app.on_task_board() {
        Style::default().fg(theme.text).bg(theme.primary).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.text_dim)
    };
    spans.push(Span::styled(" Tasks ", board_style));

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border))
            .title(" planwise ")
            .title_style(Style::default().fg(theme.primary).add_modifier(Modifier::BOLD)),
    );
    frame.render_widget(header, area);
}

fn step_block<'a>(app: &App, title: &'a str) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.primary))
        .title(title)
        .title_style(Style::default().fg(app.theme.primary).add_modifier(Modifier::BOLD))
}

/// Draw the description editor.
fn draw_description(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(3)])
        .split(area);

    let hint = Paragraph::new(Line::from(Span::styled(
        " Describe the project you want to build. Enter adds a line, Tab moves on.",
        Style::default().fg(theme.text_dim),
    )));
    frame.render_widget(hint, chunks[0]);

    let block = step_block(app, " Project description ");
    let inner = block.inner(chunks[1]);
    let text = app.description.as_str();
    let editor = if text.is_empty() {
        Paragraph::new(Span::styled("A voice assistant for...", Style::default().fg(theme.text_dim)))
    } else {
        Paragraph::new(text).style(Style::default().fg(theme.text))
    };

    // Keep the cursor line visible
    let (row, col) = cursor_row_col(text, app.description.cursor());
    let scroll = row.saturating_sub(inner.height.saturating_sub(1));
    frame.render_widget(editor.block(block).scroll((scroll, 0)), chunks[1]);
    frame.set_cursor_position((
        inner.x + col.min(inner.width.saturating_sub(1)),
        inner.y + row - scroll,
    ));
}

/// Row and column of a byte offset in multi-line text.
fn cursor_row_col(text: &str, cursor: usize) -> (u16, u16) {
    let before = &text[..cursor.min(text.len())];
    let row = before.matches('\n').count();
    let col = before.rsplit('\n').next().map_or(0, |line| line.chars().count());
    (u16::try_from(row).unwrap_or(u16::MAX), u16::try_from(col).unwrap_or(u16::MAX))
}

/// Draw a file step: prompt, upload state and what has been extracted so far.
fn draw_upload_step(frame: &mut Frame, app: &App, step: WizardStep, area: Rect) {
    let theme = &app.theme;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Accepted files
            Constraint::Length(3), // Path prompt
            Constraint::Length(1), // Upload state
            Constraint::Min(3),    // Stored result
        ])
        .split(area);

    let (title, what) = match step {
        WizardStep::Requirements => (" Requirements document ", "a requirements document"),
        _ => (" Inspiration images ", "one or more images, separated by commas"),
    };
    let accepted = app.controller.policy(step).map_or_else(String::new, |policy| {
        format!(
            " {} up to {}",
            policy.allowed_extensions.join(" "),
            format_size(policy.max_file_size)
        )
    });
    let hint = Paragraph::new(vec![
        Line::from(Span::styled(
            format!(" Enter the path of {what} and press Enter."),
            Style::default().fg(theme.text_dim),
        )),
        Line::from(Span::styled(accepted, Style::default().fg(theme.text_dim))),
    ]);
    frame.render_widget(hint, chunks[0]);

    let block = step_block(app, title);
    let inner = block.inner(chunks[1]);
    let prompt = Paragraph::new(app.path_input.as_str())
        .style(Style::default().fg(theme.text))
        .block(block);
    frame.render_widget(prompt, chunks[1]);
    let (_, col) = cursor_row_col(app.path_input.as_str(), app.path_input.cursor());
    frame.set_cursor_position((inner.x + col.min(inner.width.saturating_sub(1)), inner.y));

    let state = match step {
        WizardStep::Requirements => app.status.requirements_upload,
        _ => app.status.inspiration_upload,
    };
    let label = match state {
        UploadState::Idle => "No file uploaded yet".to_string(),
        UploadState::Uploading => format!("{} Processing...", spinner()),
        UploadState::Success => "Processed".to_string(),
        UploadState::Error => "Upload failed".to_string(),
    };
    frame.render_widget(
        Paragraph::new(Span::styled(format!(" {label}"), Style::default().fg(theme.upload_color(state)))),
        chunks[2],
    );

    let input = app.controller.store().user_input();
    let lines = match step {
        WizardStep::Requirements => requirements_lines(&input),
        _ => inspiration_lines(&input),
    };
    let stored = Paragraph::new(lines)
        .style(Style::default().fg(theme.text))
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border))
                .title(" Extracted "),
        );
    frame.render_widget(stored, chunks[3]);
}

fn requirements_lines(input: &UserInput) -> Vec<Line<'static>> {
    let requirements = &input.requirements;
    if requirements.content.is_empty() {
        return vec![Line::from("Nothing extracted yet")];
    }
    let mut lines = Vec::new();
    if let Some(ref file_type) = requirements.file_type {
        lines.push(Line::from(Span::styled(
            format!("Type: {file_type}"),
            Style::default().add_modifier(Modifier::ITALIC),
        )));
    }
    lines.extend(requirements.content.lines().map(|l| Line::from(l.to_string())));
    lines
}

fn inspiration_lines(input: &UserInput) -> Vec<Line<'static>> {
    let inspiration = &input.inspiration;
    if inspiration.images.is_empty() {
        return vec![Line::from("No images yet")];
    }
    let mut lines: Vec<Line<'static>> = inspiration
        .images
        .iter()
        .map(|image| {
            Line::from(format!("{} ({}, {})", image.name, image.mime_type, format_size(image.size)))
        })
        .collect();
    if let Some(ref text) = inspiration.processed_text {
        lines.push(Line::from(""));
        lines.extend(text.lines().map(|l| Line::from(l.to_string())));
    }
    lines
}

/// Draw the integration checklist.
fn draw_integrations(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(3)])
        .split(area);

    let hint = Paragraph::new(Line::from(Span::styled(
        " Space toggles an integration. Enter generates the task plan.",
        Style::default().fg(theme.text_dim),
    )));
    frame.render_widget(hint, chunks[0]);

    let items: Vec<ListItem> = app
        .integrations
        .iter()
        .map(|name| {
            let selected = app.is_integration_selected(name);
            let (mark, style) = if selected {
                ("[x] ", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
            } else {
                ("[ ] ", Style::default().fg(theme.text))
            };
            ListItem::new(Line::from(vec![Span::styled(mark, style), Span::styled(name.as_str(), style)]))
        })
        .collect();

    let list = List::new(items)
        .block(step_block(app, " Integrations "))
        .highlight_style(Style::default().bg(theme.selected_bg))
        .highlight_symbol("> ");
    let mut state = ListState::default().with_selected(Some(app.integration_cursor));
    frame.render_stateful_widget(list, chunks[1], &mut state);
}

/// Draw the task board: one column per status and a detail pane.
fn draw_task_board(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;

    if app.board.is_empty() {
        let empty = Paragraph::new("No tasks were generated. Press Esc to go back.")
            .alignment(Alignment::Center)
            .style(Style::default().fg(theme.text_dim))
            .block(step_block(app, " Tasks "));
        frame.render_widget(empty, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(8)])
        .split(area);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3); 3])
        .split(chunks[0]);

    let selected = app.board.selected_task();
    for (status, column_area) in COLUMNS.iter().zip(columns.iter()) {
        let tasks = app.board.column(*status);
        let color = theme.status_color(*status);
        let items: Vec<ListItem> = tasks
            .iter()
            .map(|task| {
                let is_selected = selected.is_some_and(|s| s.id == task.id);
                let style = if is_selected {
                    Style::default().fg(theme.text).bg(theme.selected_bg).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(theme.text)
                };
                ListItem::new(Line::from(vec![
                    Span::styled(format!("{} ", task.id), Style::default().fg(color)),
                    Span::styled(task.title.as_str(), style),
                ]))
            })
            .collect();

        let list = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .title(format!(" {} ({}) ", status.label(), tasks.len()))
                .title_style(Style::default().fg(color).add_modifier(Modifier::BOLD)),
        );
        frame.render_widget(list, *column_area);
    }

    let detail = match selected {
        Some(task) => vec![
            Line::from(vec![
                Span::styled(format!("{} ", task.id), Style::default().fg(theme.status_color(task.status))),
                Span::styled(task.title.as_str(), Style::default().add_modifier(Modifier::BOLD)),
            ]),
            Line::from(Span::styled(
                format!("{}  order {}", task.status.label(), task.order),
                Style::default().fg(theme.text_dim),
            )),
            Line::from(""),
            Line::from(task.description.as_str()),
        ],
        None => vec![Line::from("")],
    };
    let detail = Paragraph::new(detail)
        .style(Style::default().fg(theme.text))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border))
                .title(" Details "),
        );
    frame.render_widget(detail, chunks[1]);
}

/// Draw the status bar: busy indicator, errors, then key hints.
fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let status = &app.status;

    let (text, color) = if status.busy {
        (format!("{} Working...", spinner()), theme.warning)
    } else if let Some(ref error) = status.last_error {
        (error.clone(), theme.error)
    } else if let Some(ref warning) = status.warning {
        (warning.clone(), theme.warning)
    } else if let Some(ref message) = app.status_message {
        (message.clone(), theme.text_dim)
    } else {
        (hints(app).to_string(), theme.text_dim)
    };

    frame.render_widget(
        Paragraph::new(Span::styled(format!(" {text}"), Style::default().fg(color))),
        area,
    );
}

fn hints(app: &App) -> &'static str {
    match app.status.view {
        View::TaskBoard => "j/k select • Esc back • r start over • q quit • ? help",
        View::Step(WizardStep::Integrations) => {
            "Space toggle • Enter generate • Shift+Tab back • F1 help"
        }
        View::Step(_) => "Tab next • Shift+Tab back • Alt+1-4 jump • F1 help • Esc quit",
    }
}

fn spinner() -> &'static str {
    let tick = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() / 150)
        .unwrap_or(0);
    SPINNER[(tick % SPINNER.len() as u128) as usize]
}

/// A rectangle centered in `area`.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width.saturating_sub(width)) / 2,
        area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    )
}

fn draw_help_overlay(frame: &mut Frame, app: &App) {
    let theme = &app.theme;
    let popup_area = centered(frame.area(), 56, 16);
    frame.render_widget(Clear, popup_area);

    let lines = vec![
        help_line("Tab / Ctrl+N", "Next step, generate on the last", app),
        help_line("Shift+Tab", "Previous step", app),
        help_line("Alt+1..4", "Jump to a step", app),
        help_line("Enter", "Upload typed paths / new line", app),
        help_line("Space", "Toggle integration", app),
        help_line("j / k", "Move selection", app),
        help_line("Esc", "Back from the board, else quit", app),
        help_line("Ctrl+R", "Start over", app),
        help_line("Ctrl+C", "Quit", app),
        Line::from(""),
        Line::from(Span::styled(" Press Esc to close ", Style::default().fg(theme.text_dim)))
            .alignment(Alignment::Center),
    ];

    let popup = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.primary))
            .title(" Keyboard Shortcuts ")
            .title_style(Style::default().fg(theme.primary).add_modifier(Modifier::BOLD)),
    );
    frame.render_widget(popup, popup_area);
}

/// Helper to create a help line with key and description.
fn help_line<'a>(key: &'a str, description: &'a str, app: &App) -> Line<'a> {
    Line::from(vec![
        Span::styled(
            format!("  {key:14}"),
            Style::default().fg(app.theme.accent).add_modifier(Modifier::BOLD),
        ),
        Span::styled(description, Style::default().fg(app.theme.text)),
    ])
}

fn draw_reset_overlay(frame: &mut Frame, app: &App) {
    let theme = &app.theme;
    let popup_area = centered(frame.area(), 50, 5);
    frame.render_widget(Clear, popup_area);

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Clear all input and generated tasks? ",
            Style::default().fg(theme.text),
        )),
        Line::from(vec![
            Span::styled(" [y] Yes  ", Style::default().fg(theme.error)),
            Span::styled("[n] No", Style::default().fg(theme.text_dim)),
        ]),
    ];
    let popup = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.warning))
            .title(" Start Over ")
            .title_style(Style::default().fg(theme.warning).add_modifier(Modifier::BOLD)),
    );
    frame.render_widget(popup, popup_area);
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1}MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1}KB", bytes as f64 / KB as f64)
    } else {
        format!("{}B", bytes)
    }
}
