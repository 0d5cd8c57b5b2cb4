use std::path::PathBuf;
use std::sync::Arc;
use ratatui::layout::Rect;
use tokio::task::JoinHandle;
use docchat_core::{ChatBackend, ChatController, ClientError, SelectedFile};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    File,
    Query,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub focus: FocusPane,
    pub controller: ChatController,
    pub server_url: String,
    backend: Arc<dyn ChatBackend>,

    // File picker field (path typed by the user)
    pub file_input: String,
    pub file_cursor: usize,

    // Cursor into controller.query_input(), in chars
    pub query_cursor: usize,

    // Chat view
    pub chat_scroll: u16,
    pub chat_height: u16, // Inner height of the chat area, set on render
    pub chat_width: u16,  // Inner width of the chat area, set on render
    pub chat_max_scroll: u16, // Wrapped transcript height minus chat_height, set on render
    pub stick_to_bottom: bool,
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Areas for mouse hit-testing
    pub chat_area: Option<Rect>,
    pub file_area: Option<Rect>,
    pub query_area: Option<Rect>,
    pub upload_button_area: Option<Rect>,
    pub send_button_area: Option<Rect>,

    // Outstanding requests
    pub upload_task: Option<JoinHandle<Result<(), ClientError>>>,
    pub chat_task: Option<JoinHandle<Result<String, ClientError>>>,
}

impl App {
    pub fn new(backend: Arc<dyn ChatBackend>, server_url: impl Into<String>) -> Self {
        Self {
            should_quit: false,
            focus: FocusPane::File,
            controller: ChatController::new(),
            server_url: server_url.into(),
            backend,
            file_input: String::new(),
            file_cursor: 0,
            query_cursor: 0,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            chat_max_scroll: 0,
            stick_to_bottom: false,
            animation_frame: 0,
            chat_area: None,
            file_area: None,
            query_area: None,
            upload_button_area: None,
            send_button_area: None,
            upload_task: None,
            chat_task: None,
        }
    }

    pub fn set_file_input(&mut self, path: impl Into<String>) {
        self.file_input = path.into();
        self.file_cursor = self.file_input.chars().count();
    }

    /// Submit the upload form. An empty path means no file is selected.
    pub async fn submit_upload(&mut self) {
        let path = self.file_input.trim();
        if path.is_empty() || self.controller.is_uploading() {
            return;
        }

        match SelectedFile::load(expand_home(path)).await {
            Ok(file) => self.controller.select_file(file),
            Err(err) => {
                tracing::warn!(path, error = %err, "could not read selected file");
                self.controller.report_file_error(&err);
                return;
            }
        }

        if let Some(file) = self.controller.begin_upload() {
            let backend = Arc::clone(&self.backend);
            self.upload_task = Some(tokio::spawn(async move { backend.upload(&file).await }));
        }
    }

    /// Send the typed query, if the controller accepts it.
    pub fn submit_query(&mut self) {
        if let Some(query) = self.controller.begin_send() {
            self.query_cursor = 0;
            self.animation_frame = 0;

            let backend = Arc::clone(&self.backend);
            self.chat_task = Some(tokio::spawn(async move { backend.chat(&query).await }));
        }
    }

    /// Apply the result of any request that has finished.
    pub async fn poll_tasks(&mut self) {
        if self.upload_task.as_ref().is_some_and(|task| task.is_finished()) {
            if let Some(task) = self.upload_task.take() {
                let result = task.await.unwrap_or_else(|err| Err(err.into()));
                self.controller.finish_upload(result);
                if self.controller.is_query_enabled() {
                    self.focus = FocusPane::Query;
                }
            }
        }

        if self.chat_task.as_ref().is_some_and(|task| task.is_finished()) {
            if let Some(task) = self.chat_task.take() {
                let result = task.await.unwrap_or_else(|err| Err(err.into()));
                self.controller.finish_send(result);
            }
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.controller.is_chat_pending() || self.controller.is_uploading() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    /// Jump to the end of the chat if anything was appended since last time.
    /// The jump happens on the next render, once the wrapped height is known.
    pub fn follow_transcript(&mut self) {
        if self.controller.take_scroll_request() {
            self.stick_to_bottom = true;
        }
    }

    pub fn scroll_chat_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn scroll_chat_down(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(self.chat_max_scroll);
    }

    pub fn clear_history(&mut self) {
        if self.controller.clear_history() {
            self.chat_scroll = 0;
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            FocusPane::File => FocusPane::Query,
            FocusPane::Query => FocusPane::File,
        };
    }
}

/// Expand a leading `~/` the way a shell would.
fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
