use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use crate::app::{App, FocusPane};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key).await,
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse).await,
        AppEvent::Paste(text) => handle_paste(app, &text),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick_animation(),
    }

    app.poll_tasks().await;
    app.follow_transcript();
    Ok(())
}

async fn handle_key(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('c') if ctrl => app.should_quit = true,
        KeyCode::Esc => app.should_quit = true,

        // Clear chat history
        KeyCode::Char('l') if ctrl => app.clear_history(),

        KeyCode::Tab | KeyCode::BackTab => app.toggle_focus(),

        KeyCode::PageUp => app.scroll_chat_up((app.chat_height / 2).max(1)),
        KeyCode::PageDown => app.scroll_chat_down((app.chat_height / 2).max(1)),

        KeyCode::Enter => match app.focus {
            FocusPane::File => app.submit_upload().await,
            FocusPane::Query => app.submit_query(),
        },

        _ if ctrl => {}

        _ => match app.focus {
            FocusPane::File => {
                edit_field(&mut app.file_input, &mut app.file_cursor, key.code);
            }
            // A disabled field takes no input
            FocusPane::Query if app.controller.is_query_enabled() => {
                edit_field(app.controller.query_input_mut(), &mut app.query_cursor, key.code);
            }
            FocusPane::Query => {}
        },
    }
}

/// Apply a line-editing key to a text field. Returns false for keys that
/// don't edit.
fn edit_field(text: &mut String, cursor: &mut usize, code: KeyCode) -> bool {
    let char_count = text.chars().count();
    *cursor = (*cursor).min(char_count);

    match code {
        KeyCode::Backspace => {
            if *cursor > 0 {
                *cursor -= 1;
                let byte_pos = char_to_byte_index(text, *cursor);
                text.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            if *cursor < char_count {
                let byte_pos = char_to_byte_index(text, *cursor);
                text.remove(byte_pos);
            }
        }
        KeyCode::Left => *cursor = cursor.saturating_sub(1),
        KeyCode::Right => *cursor = (*cursor + 1).min(char_count),
        KeyCode::Home => *cursor = 0,
        KeyCode::End => *cursor = char_count,
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(text, *cursor);
            text.insert(byte_pos, c);
            *cursor += 1;
        }
        _ => return false,
    }
    true
}

fn handle_paste(app: &mut App, pasted: &str) {
    // Fields are single-line
    let pasted: String = pasted.chars().filter(|c| !c.is_control()).collect();

    let (text, cursor) = match app.focus {
        FocusPane::File => (&mut app.file_input, &mut app.file_cursor),
        FocusPane::Query if app.controller.is_query_enabled() => {
            (app.controller.query_input_mut(), &mut app.query_cursor)
        }
        FocusPane::Query => return,
    };

    *cursor = (*cursor).min(text.chars().count());
    let byte_pos = char_to_byte_index(text, *cursor);
    text.insert_str(byte_pos, &pasted);
    *cursor += pasted.chars().count();
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

async fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let x = mouse.column;
    let y = mouse.row;
    let hit = |area: Option<Rect>| area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);

    match mouse.kind {
        MouseEventKind::ScrollDown if hit(app.chat_area) => app.scroll_chat_down(3),
        MouseEventKind::ScrollUp if hit(app.chat_area) => app.scroll_chat_up(3),
        MouseEventKind::Down(MouseButton::Left) => {
            if hit(app.upload_button_area) {
                app.focus = FocusPane::File;
                app.submit_upload().await;
            } else if hit(app.send_button_area) {
                app.focus = FocusPane::Query;
                app.submit_query();
            } else if hit(app.file_area) {
                app.focus = FocusPane::File;
            } else if hit(app.query_area) {
                app.focus = FocusPane::Query;
            }
        }
        _ => {}
    }
}
