use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use crossterm::event::{KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{backend::TestBackend, layout::Rect, Terminal};
use docchat_core::{ChatBackend, ClientError, SelectedFile};

use crate::app::App;
use crate::tui::AppEvent;
use crate::ui;

/// Backend double: uploads succeed and every question gets the same answer.
/// With `hang_chat` set, chat requests never complete. With `failure` set,
/// every request fails with that transport error.
#[derive(Default)]
pub struct ScriptedBackend {
    answer: String,
    hang_chat: bool,
    failure: Option<String>,
    pub chat_calls: Arc<AtomicUsize>,
}

impl ScriptedBackend {
    pub fn answering(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            ..Self::default()
        }
    }

    pub fn hanging() -> Self {
        Self {
            hang_chat: true,
            ..Self::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn chat_call_count(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.chat_calls)
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn upload(&self, _file: &SelectedFile) -> Result<(), ClientError> {
        match &self.failure {
            Some(message) => Err(ClientError::Transport(message.clone())),
            None => Ok(()),
        }
    }

    async fn chat(&self, _query: &str) -> Result<String, ClientError> {
        self.chat_calls.fetch_add(1, Ordering::SeqCst);
        if self.hang_chat {
            std::future::pending::<()>().await;
        }
        match &self.failure {
            Some(message) => Err(ClientError::Transport(message.clone())),
            None => Ok(self.answer.clone()),
        }
    }
}

/// Let spawned requests run and apply their results.
pub async fn settle(app: &mut App) {
    for _ in 0..200 {
        if app.upload_task.is_none() && app.chat_task.is_none() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
        app.poll_tasks().await;
    }
    panic!("requests did not finish");
}

/// Render one frame so the widget areas used for mouse hit-testing are set.
pub fn draw(app: &mut App) {
    let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
    terminal.draw(|frame| ui::render(app, frame)).unwrap();
}

/// A left click in the middle of `area`.
pub fn click(area: Option<Rect>) -> AppEvent {
    let area = area.expect("area is set on render");
    AppEvent::Mouse(MouseEvent {
        kind: MouseEventKind::Down(MouseButton::Left),
        column: area.x + area.width / 2,
        row: area.y + area.height / 2,
        modifiers: KeyModifiers::NONE,
    })
}

/// An app whose query field is already enabled.
pub async fn ready_app(backend: ScriptedBackend) -> App {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("doc.pdf");
    std::fs::write(&path, b"%PDF").unwrap();

    let mut app = App::new(Arc::new(backend), "http://test");
    app.set_file_input(path.display().to_string());
    app.submit_upload().await;
    settle(&mut app).await;
    assert!(app.controller.is_query_enabled());
    app
}
