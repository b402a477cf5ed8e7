// ============================================================================
// RENDERING - All UI output functions
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
};

use crate::app::{App, Control, NoticeKind, Screen};
use crate::columns::LANGUAGES;
use crate::layout::{cell_lines, grid_rows, header_labels};

/// Get centered popup area for overlays
fn get_popup_area(frame_width: u16, frame_height: u16, width_percent: u16, height_percent: u16) -> Rect {
    let width = frame_width.saturating_mul(width_percent) / 100;
    let height = frame_height.saturating_mul(height_percent) / 100;
    let x = (frame_width.saturating_sub(width)) / 2;
    let y = (frame_height.saturating_sub(height)) / 2;
    Rect { x, y, width, height }
}

// Helper: Render button with color
fn render_button(frame: &mut ratatui::Frame, text: &str, area: Rect, color: Color) {
    let btn = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center)
        .style(Style::default().fg(color));
    frame.render_widget(btn, area);
}

// Helper: Split a rectangular area into N equal horizontal chunks
fn split_equal_horizontal(area: Rect, count: usize) -> Vec<Rect> {
    if count == 0 {
        return Vec::new();
    }
    let constraints = vec![Constraint::Ratio(1, count as u32); count];
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area)
        .to_vec()
}

pub fn draw(frame: &mut ratatui::Frame, app: &mut App) {
    app.control_btns.clear();
    app.cell_items.clear();
    app.language_items.clear();

    match app.screen {
        Screen::LanguageSelect => draw_language_screen(frame, app),
        Screen::Study => draw_study_screen(frame, app),
    }

    if app.notice.is_some() {
        draw_notice_popup(frame, app);
    }
}

fn draw_language_screen(frame: &mut ratatui::Frame, app: &mut App) {
    let size = frame.size();
    let area = get_popup_area(size.width, size.height, 50, 60);
    let theme = app.theme;

    let block = Block::default()
        .title(" FluencyFlow ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .style(Style::default().fg(theme.border));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(LANGUAGES.len() as u16),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(inner);

    frame.render_widget(
        Paragraph::new("Choose a language").style(Style::default().fg(theme.muted)),
        rows[0],
    );

    for (idx, language) in LANGUAGES.iter().enumerate() {
        let line_area = Rect {
            y: rows[1].y + idx as u16,
            height: 1,
            ..rows[1]
        };
        let selected = idx == app.language_idx;
        let marker = if selected { "> " } else { "  " };
        let style = if selected {
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.text)
        };
        frame.render_widget(Paragraph::new(format!("{}{}", marker, language)).style(style), line_area);
        app.language_items.push((idx, line_area));
    }

    let theme_row = split_equal_horizontal(rows[3], 3);
    frame.render_widget(Paragraph::new("<").alignment(Alignment::Center), theme_row[0]);
    frame.render_widget(
        Paragraph::new(format!("Theme: {}", theme.name))
            .alignment(Alignment::Center)
            .style(Style::default().fg(theme.accent)),
        theme_row[1],
    );
    frame.render_widget(Paragraph::new(">").alignment(Alignment::Center), theme_row[2]);
    app.control_btns.push((Control::PrevTheme, theme_row[0]));
    app.control_btns.push((Control::NextTheme, theme_row[2]));

    render_button(frame, "Start", rows[5], theme.accent);
    app.control_btns.push((Control::Start, rows[5]));

    frame.render_widget(
        Paragraph::new("Up/Down language  Left/Right theme  Enter start  q quit")
            .alignment(Alignment::Center)
            .style(Style::default().fg(theme.muted).italic()),
        rows[6],
    );
}

fn draw_study_screen(frame: &mut ratatui::Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // controls
            Constraint::Length(3), // column toggles
            Constraint::Length(1), // numbered header
            Constraint::Min(4),    // grid
            Constraint::Length(2), // status
        ])
        .split(frame.size());

    draw_controls(frame, app, chunks[0]);
    draw_toggles(frame, app, chunks[1]);
    draw_header(frame, app, chunks[2]);
    draw_grid(frame, app, chunks[3]);
    draw_status(frame, app, chunks[4]);
}

fn draw_controls(frame: &mut ratatui::Frame, app: &mut App, area: Rect) {
    let theme = app.theme;
    let buttons = [
        ("Back", Control::Return, theme.muted),
        ("< Prev", Control::PrevPage, theme.accent),
        ("Next >", Control::NextPage, theme.accent),
        ("Hide Known", Control::HideKnown, theme.text),
        ("Show All", Control::ShowAll, theme.text),
        ("Reset", Control::Reset, Color::Red),
        ("Copy Known", Control::ExportKnown, theme.focus),
        ("Copy Next 20", Control::ExportNextUnknown, theme.focus),
        ("Theme", Control::NextTheme, theme.muted),
    ];

    let areas = split_equal_horizontal(area, buttons.len());
    for ((label, control, color), rect) in buttons.into_iter().zip(areas) {
        render_button(frame, label, rect, color);
        app.control_btns.push((control, rect));
    }
}

fn draw_toggles(frame: &mut ratatui::Frame, app: &mut App, area: Rect) {
    let Some(session) = app.session.as_ref() else {
        return;
    };
    let theme = app.theme;
    let mapping = *session.mapping();
    let columns = *session.columns();

    let mut buttons: Vec<(String, Control, Color)> = mapping
        .available_toggles()
        .into_iter()
        .enumerate()
        .map(|(slot, toggle)| {
            let verb = if columns.is_shown(toggle) { "Hide" } else { "Show" };
            (
                format!("{} {} [{}]", verb, mapping.toggle_label(toggle), slot + 1),
                Control::Column(toggle),
                theme.text,
            )
        })
        .collect();
    if session.lesson_video().is_some() {
        buttons.push(("Lesson Video [v]".to_string(), Control::OpenVideo, theme.accent));
    }

    let areas = split_equal_horizontal(area, buttons.len());
    for ((label, control, color), rect) in buttons.into_iter().zip(areas) {
        render_button(frame, &label, rect, color);
        app.control_btns.push((control, rect));
    }
}

fn draw_header(frame: &mut ratatui::Frame, app: &mut App, area: Rect) {
    let language = app
        .session
        .as_ref()
        .map(|s| s.language().to_string())
        .unwrap_or_default();
    let labels = header_labels(&language, app.viewport.column_count());
    let areas = split_equal_horizontal(area, labels.len());
    for (label, rect) in labels.into_iter().zip(areas) {
        frame.render_widget(
            Paragraph::new(label)
                .alignment(Alignment::Center)
                .style(Style::default().fg(app.theme.accent).add_modifier(Modifier::BOLD)),
            rect,
        );
    }
}

fn draw_grid(frame: &mut ratatui::Frame, app: &mut App, area: Rect) {
    let theme = app.theme;
    let columns = app.viewport.column_count();
    let Some(session) = app.session.as_ref() else {
        return;
    };

    let page = session.current_page();
    if page.is_empty() {
        let message = if session.load_failed() {
            "No words loaded."
        } else if session.dataset().is_empty() {
            "The word list is empty."
        } else {
            "Nothing to show on this page."
        };
        frame.render_widget(
            Paragraph::new(message)
                .alignment(Alignment::Center)
                .style(Style::default().fg(theme.muted)),
            area,
        );
        return;
    }

    let mapping = session.mapping();
    let flags = session.columns();
    let cells: Vec<(usize, Vec<String>)> = page
        .iter()
        .map(|&index| {
            let lines = session
                .dataset()
                .get(index)
                .map(|record| cell_lines(record, mapping, flags))
                .unwrap_or_default();
            (index, lines)
        })
        .collect();
    let cell_height = cells.iter().map(|(_, l)| l.len()).max().unwrap_or(1) as u16 + 2;

    let rows = grid_rows(page, columns);
    let rows_in_view = ((area.height / cell_height.max(1)) as usize).max(1);

    // Keep the focused cell on screen.
    let focus_row = app.focus / columns.max(1);
    let mut row_scroll = app.row_scroll.min(rows.len().saturating_sub(rows_in_view));
    if focus_row < row_scroll {
        row_scroll = focus_row;
    } else if focus_row >= row_scroll + rows_in_view {
        row_scroll = focus_row + 1 - rows_in_view;
    }

    let mut cell_items = Vec::with_capacity(page.len());
    for (visible_row, row_cells) in rows.iter().enumerate().skip(row_scroll).take(rows_in_view) {
        let row_area = Rect {
            y: area.y + ((visible_row - row_scroll) as u16) * cell_height,
            height: cell_height,
            ..area
        };
        let slots = split_equal_horizontal(row_area, columns);
        for (col, &index) in row_cells.iter().enumerate() {
            let rect = slots[col];
            let position = visible_row * columns + col;
            let lines = &cells[position].1;
            let known = session.is_known(index);
            let focused = position == app.focus;

            let mut block = Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border));
            if focused {
                block = block
                    .border_type(BorderType::Thick)
                    .border_style(Style::default().fg(theme.focus));
            }
            let style = if known {
                Style::default().fg(theme.known_fg).bg(theme.known_bg)
            } else {
                Style::default().fg(theme.text)
            };

            let text: Vec<Line> = lines
                .iter()
                .enumerate()
                .map(|(i, line)| {
                    if i == 0 {
                        Line::from(Span::styled(line.clone(), style.add_modifier(Modifier::BOLD)))
                    } else {
                        Line::from(Span::styled(line.clone(), style))
                    }
                })
                .collect();

            frame.render_widget(
                Paragraph::new(text)
                    .block(block)
                    .style(style)
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true }),
                rect,
            );
            cell_items.push((index, rect));
        }
    }

    app.row_scroll = row_scroll;
    app.cell_items = cell_items;
}

fn draw_status(frame: &mut ratatui::Frame, app: &mut App, area: Rect) {
    let theme = app.theme;
    let Some(session) = app.session.as_ref() else {
        return;
    };

    let mut spans = vec![
        Span::styled(format!(" {} ", session.language()), Style::default().fg(theme.accent).bold()),
        Span::raw(format!("| Known: {} ", session.known_count())),
    ];
    if let Some(label) = session.page_label() {
        spans.push(Span::raw(format!("| Page: {} ", label)));
    }
    spans.push(Span::raw(format!(
        "| Showing {} of {} ",
        session.pager().visible().len(),
        session.dataset().len()
    )));
    if session.pager().is_hiding() {
        spans.push(Span::styled("| hiding known ", Style::default().fg(theme.focus)));
    }
    if let Some(url) = session.lesson_video() {
        spans.push(Span::styled(format!("| video: {} ", url), Style::default().fg(theme.muted)));
    }

    let hint = Line::from(Span::styled(
        " arrows move  space mark  n/p page  f hide  a all  R reset  e/u copy  1-4 columns  t theme  b back  q quit",
        Style::default().fg(theme.muted).italic(),
    ));

    frame.render_widget(Paragraph::new(vec![Line::from(spans), hint]), area);
}

fn draw_notice_popup(frame: &mut ratatui::Frame, app: &App) {
    let Some(notice) = app.notice.as_ref() else {
        return;
    };
    let size = frame.size();
    let area = get_popup_area(size.width, size.height, 55, 40);

    let (title, color) = match notice.kind {
        NoticeKind::Success => ("[OK] Done", Color::Green),
        NoticeKind::Warning => ("[!] Notice", Color::Yellow),
        NoticeKind::Error => ("[!] Error", Color::Red),
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .style(Style::default().fg(color).bg(Color::Black));

    let inner = block.inner(area);
    frame.render_widget(Clear, area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(2), Constraint::Length(1)])
        .split(inner);

    let para = Paragraph::new(notice.message.as_str())
        .wrap(Wrap { trim: false })
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::White));
    frame.render_widget(para, chunks[0]);

    let hint = Paragraph::new("Press any key to dismiss")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray).italic());
    frame.render_widget(hint, chunks[1]);
}
