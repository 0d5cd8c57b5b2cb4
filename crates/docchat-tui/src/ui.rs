use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use docchat_core::{ChatRole, UploadStatus, PLACEHOLDER_TEXT};
use crate::app::{App, FocusPane};

/// Render a line of an answer, turning `**bold**` runs into bold spans.
/// An unmatched `**` is kept as literal text.
fn styled_answer_line(text: &str) -> Line<'static> {
    let parts: Vec<&str> = text.split("**").collect();
    let unmatched = parts.len() % 2 == 0;
    let mut spans: Vec<Span<'static>> = Vec::new();

    for (i, part) in parts.iter().enumerate() {
        let last = i == parts.len() - 1;
        if unmatched && last {
            spans.push(Span::raw(format!("**{}", part)));
        } else if i % 2 == 1 {
            if !part.is_empty() {
                spans.push(Span::styled(
                    part.to_string(),
                    Style::default().add_modifier(Modifier::BOLD),
                ));
            }
        } else if !part.is_empty() {
            spans.push(Span::raw(part.to_string()));
        }
    }

    Line::from(spans)
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    let [header_area, upload_area, status_area, chat_area, query_area, footer_area] =
        Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .areas(area);

    render_header(app, frame, header_area);
    render_upload_form(app, frame, upload_area);
    render_status(app, frame, status_area);
    render_chat(app, frame, chat_area);
    render_query(app, frame, query_area);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let document = match app.controller.current_document() {
        Some(name) => format!(" [Current PDF: {}]", name),
        None => String::new(),
    };

    let title = Line::from(vec![
        Span::styled(" PDF Chat ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(document, Style::default().fg(Color::White)),
        Span::raw(" "),
        Span::styled(app.server_url.clone(), Style::default().fg(Color::Gray)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_upload_form(app: &mut App, frame: &mut Frame, area: Rect) {
    let [file_area, button_area] =
        Layout::horizontal([Constraint::Min(0), Constraint::Length(12)]).areas(area);

    app.file_area = Some(file_area);
    app.upload_button_area = Some(button_area);

    let focused = app.focus == FocusPane::File;
    render_input(
        frame,
        file_area,
        " PDF file (path) ",
        &app.file_input,
        app.file_cursor,
        focused,
        true,
    );

    let busy = app.controller.is_uploading();
    let label = if busy { "Uploading" } else { "Upload" };
    render_button(frame, button_area, label, !busy);
}

fn render_status(app: &App, frame: &mut Frame, area: Rect) {
    let status = app.controller.status();
    let color = match status {
        UploadStatus::Idle => Color::DarkGray,
        UploadStatus::Uploading => Color::Yellow,
        UploadStatus::Succeeded => Color::Green,
        UploadStatus::Failed | UploadStatus::Error(_) => Color::Red,
    };

    let mut text = status.text();
    if *status == UploadStatus::Uploading {
        text.truncate(text.trim_end_matches('.').len());
        text.push_str(&".".repeat(app.animation_frame as usize + 1));
    }

    let line = Paragraph::new(Line::from(Span::styled(
        format!(" {}", text),
        Style::default().fg(color),
    )));
    frame.render_widget(line, area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    app.chat_area = Some(area);

    // Inner size minus borders, used for scroll calculations
    app.chat_height = area.height.saturating_sub(2);
    app.chat_width = area.width.saturating_sub(2);

    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Chat ");

    let transcript = app.controller.transcript();

    let chat_text = if transcript.is_empty() {
        let hint = if app.controller.is_query_enabled() {
            "Ask a question about your PDF..."
        } else {
            "Upload a PDF to start asking questions."
        };
        Text::from(Span::styled(hint, Style::default().fg(Color::DarkGray)))
    } else {
        let mut lines: Vec<Line> = Vec::new();

        for msg in transcript.messages() {
            match msg.role {
                ChatRole::User => {
                    lines.push(Line::from(Span::styled(
                        "You:",
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    )));
                    for line in msg.content.lines() {
                        lines.push(Line::from(line.to_string()));
                    }
                }
                ChatRole::Assistant => {
                    lines.push(Line::from(Span::styled(
                        "AI:",
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                    )));
                    let style = if msg.content.starts_with("Error: ") {
                        Style::default().fg(Color::Red)
                    } else {
                        Style::default()
                    };
                    for line in msg.content.lines() {
                        lines.push(styled_answer_line(line).patch_style(style));
                    }
                }
            }
            lines.push(Line::default());
        }

        if transcript.has_placeholder() {
            lines.push(Line::from(Span::styled(
                "AI:",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat(app.animation_frame as usize + 1);
            lines.push(Line::from(Span::styled(
                format!("{}{}", PLACEHOLDER_TEXT.trim_end_matches('.'), dots),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }

        Text::from(lines)
    };

    let chat = Paragraph::new(chat_text).wrap(Wrap { trim: true });

    // Measured without the block so the count is in inner rows
    let total_lines = u16::try_from(chat.line_count(app.chat_width)).unwrap_or(u16::MAX);
    app.chat_max_scroll = total_lines.saturating_sub(app.chat_height);
    if app.stick_to_bottom {
        app.chat_scroll = app.chat_max_scroll;
        app.stick_to_bottom = false;
    }
    app.chat_scroll = app.chat_scroll.min(app.chat_max_scroll);

    let chat = chat.block(chat_block).scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

fn render_query(app: &mut App, frame: &mut Frame, area: Rect) {
    let [input_area, button_area] =
        Layout::horizontal([Constraint::Min(0), Constraint::Length(10)]).areas(area);

    app.query_area = Some(input_area);
    app.send_button_area = Some(button_area);

    let enabled = app.controller.is_query_enabled();
    let focused = app.focus == FocusPane::Query;
    render_input(
        frame,
        input_area,
        " Ask ",
        app.controller.query_input(),
        app.query_cursor,
        focused,
        enabled,
    );

    render_button(frame, button_area, "Send", app.controller.is_send_enabled());
}

/// Single-line text field with horizontal scrolling to keep the cursor visible.
fn render_input(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    text: &str,
    cursor: usize,
    focused: bool,
    enabled: bool,
) {
    let border_color = match (enabled, focused) {
        (false, _) => Color::DarkGray,
        (true, true) => Color::Yellow,
        (true, false) => Color::Gray,
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title.to_string());

    // Inner width = total width - 2 (for borders)
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor = cursor.min(text.chars().count());

    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor >= inner_width {
        cursor - inner_width + 1
    } else {
        0
    };

    let visible_text: String = text.chars().skip(scroll_offset).take(inner_width).collect();

    let text_color = if enabled { Color::Cyan } else { Color::DarkGray };
    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(text_color))
        .block(block);

    frame.render_widget(input, area);

    if focused && enabled {
        let cursor_x = (cursor - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_button(frame: &mut Frame, area: Rect, label: &str, enabled: bool) {
    let style = if enabled {
        Style::default().fg(Color::Black).bg(Color::Cyan).bold()
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let button = Paragraph::new(Line::from(label.to_string()).centered())
        .style(style)
        .block(Block::default().borders(Borders::ALL).border_style(style));

    frame.render_widget(button, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Cyan).bold());
    let desc = |d: &'static str| Span::styled(d, Style::default().fg(Color::Gray));

    let enter_desc = match app.focus {
        FocusPane::File => " upload  ",
        FocusPane::Query => " send  ",
    };

    let footer = Paragraph::new(Line::from(vec![
        Span::raw(" "),
        key("Enter"),
        desc(enter_desc),
        key("Tab"),
        desc(" switch field  "),
        key("PgUp/PgDn"),
        desc(" scroll  "),
        key("Ctrl+L"),
        desc(" clear chat  "),
        key("Esc"),
        desc(" quit"),
    ]));

    frame.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedBackend;
    use docchat_core::SelectedFile;
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    fn plain(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_bold_runs() {
        let line = styled_answer_line("see **page 4** now");
        assert_eq!(plain(&line), "see page 4 now");
        assert_eq!(line.spans.len(), 3);
        assert!(line.spans[1].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_unmatched_marker_is_literal() {
        let line = styled_answer_line("a **b");
        assert_eq!(plain(&line), "a **b");
    }

    fn screen_text(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal.draw(|frame| render(app, frame)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// An app with a document uploaded and `query` sent but not yet answered.
    fn app_asking(query: &str) -> App {
        let mut app = App::new(Arc::new(ScriptedBackend::default()), "http://test");
        let controller = &mut app.controller;
        controller.select_file(SelectedFile::new("doc.pdf", b"%PDF".to_vec()));
        controller.begin_upload();
        controller.finish_upload(Ok(()));
        controller.set_query_input(query);
        controller.begin_send();
        app
    }

    #[test]
    fn test_render_shows_transcript_and_placeholder() {
        let mut app = app_asking("Hello");

        let screen = screen_text(&mut app);

        assert!(screen.contains("You:"));
        assert!(screen.contains("Hello"));
        assert!(screen.contains("Thinking."));
        assert!(screen.contains("[Current PDF: doc.pdf]"));
        assert_eq!(app.chat_height, 20 - 9 - 2);
        assert!(app.send_button_area.is_some());
    }

    #[test]
    fn test_long_tokens_scroll_fully_into_view() {
        let mut app = app_asking("Where is the config?");
        let mut answer = vec!["x".repeat(39); 30].join(" ");
        answer.push_str(" ENDMARK");
        app.controller.finish_send(Ok(answer));

        screen_text(&mut app);
        app.follow_transcript();
        let screen = screen_text(&mut app);

        assert!(screen.contains("ENDMARK"));
        assert_eq!(app.chat_scroll, app.chat_max_scroll);
        assert!(app.chat_max_scroll > 0);
    }

    #[test]
    fn test_scroll_is_clamped_to_content() {
        let mut app = app_asking("Hi");
        app.chat_scroll = 500;

        screen_text(&mut app);

        assert_eq!(app.chat_max_scroll, 0);
        assert_eq!(app.chat_scroll, 0);
    }

    #[test]
    fn test_render_prompts_for_upload_first() {
        let mut app = App::new(Arc::new(ScriptedBackend::default()), "http://test");
        let screen = screen_text(&mut app);
        assert!(screen.contains("Upload a PDF to start asking questions."));
    }
}
