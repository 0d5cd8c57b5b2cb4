//! The chat session controller.
//!
//! `ChatController` owns everything the screen shows: the upload status
//! line, the query field and its enablement, and the transcript. Each flow is
//! split into a `begin_*` step that runs before the network call and a
//! `finish_*` step that applies its result, so a front end can run the call on
//! a background task and stay responsive in between. `upload` and `send` run
//! both halves inline.

use crate::client::{ChatBackend, SelectedFile};
use crate::error::ClientError;
use crate::state::{ChatMessage, Transcript, UploadStatus};

#[derive(Debug, Default)]
pub struct ChatController {
    selected_file: Option<SelectedFile>,
    status: UploadStatus,
    query_input: String,
    query_enabled: bool,
    transcript: Transcript,
    // Name of the file whose upload is outstanding
    uploading: Option<String>,
    chat_pending: bool,
    current_document: Option<String>,
}

impl ChatController {
    pub fn new() -> Self {
        Self::default()
    }

    // --- view state ---

    pub fn status(&self) -> &UploadStatus {
        &self.status
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Whether the view should jump to the end of the transcript since the
    /// last call. Set by every append, placeholder included.
    pub fn take_scroll_request(&mut self) -> bool {
        self.transcript.take_scroll_request()
    }

    pub fn query_input(&self) -> &str {
        &self.query_input
    }

    pub fn query_input_mut(&mut self) -> &mut String {
        &mut self.query_input
    }

    pub fn set_query_input(&mut self, text: impl Into<String>) {
        self.query_input = text.into();
    }

    pub fn is_query_enabled(&self) -> bool {
        self.query_enabled
    }

    /// The send control is active only when the query field is and no answer
    /// is outstanding.
    pub fn is_send_enabled(&self) -> bool {
        self.query_enabled && !self.chat_pending
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading.is_some()
    }

    pub fn is_chat_pending(&self) -> bool {
        self.chat_pending
    }

    pub fn current_document(&self) -> Option<&str> {
        self.current_document.as_deref()
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.selected_file.as_ref()
    }

    // --- upload flow ---

    /// Replaces any previous selection.
    pub fn select_file(&mut self, file: SelectedFile) {
        self.selected_file = Some(file);
    }

    pub fn clear_selection(&mut self) {
        self.selected_file = None;
    }

    /// The picked file couldn't be read, so nothing was selected.
    pub fn report_file_error(&mut self, err: &ClientError) {
        self.selected_file = None;
        self.status = UploadStatus::Error(err.to_string());
    }

    /// Start an upload of the selected file.
    ///
    /// Returns `None` without touching any state when no file is selected or
    /// an upload is already outstanding.
    pub fn begin_upload(&mut self) -> Option<SelectedFile> {
        if self.uploading.is_some() {
            tracing::debug!("upload already in flight, ignoring submit");
            return None;
        }
        let file = self.selected_file.take()?;

        tracing::info!(file = %file.name, size = file.bytes.len(), "uploading document");
        self.status = UploadStatus::Uploading;
        self.uploading = Some(file.name.clone());
        Some(file)
    }

    /// Apply the outcome of the upload started by `begin_upload`.
    ///
    /// Failure never disables a query field that was already enabled.
    pub fn finish_upload(&mut self, result: Result<(), ClientError>) {
        let name = self.uploading.take();

        match result {
            Ok(()) => {
                tracing::info!(file = ?name, "upload succeeded");
                self.status = UploadStatus::Succeeded;
                self.query_enabled = true;
                self.current_document = name;
            }
            Err(ClientError::Application { status, message }) => {
                tracing::warn!(file = ?name, status, %message, "upload rejected");
                self.status = UploadStatus::Failed;
            }
            Err(err) => {
                tracing::warn!(file = ?name, error = %err, "upload failed");
                self.status = UploadStatus::Error(err.to_string());
            }
        }
    }

    pub async fn upload(&mut self, backend: &dyn ChatBackend) {
        if let Some(file) = self.begin_upload() {
            let result = backend.upload(&file).await;
            self.finish_upload(result);
        }
    }

    // --- chat flow ---

    /// Commit the typed query and show the placeholder.
    ///
    /// Returns the query to send, or `None` when the trimmed input is empty,
    /// the field is disabled, or an answer is still outstanding. In those cases
    /// the input and transcript are left as they were.
    pub fn begin_send(&mut self) -> Option<String> {
        if !self.query_enabled {
            return None;
        }
        if self.chat_pending {
            tracing::debug!("chat request in flight, ignoring send");
            return None;
        }

        let query = self.query_input.trim().to_string();
        if query.is_empty() {
            return None;
        }

        self.transcript.commit(ChatMessage::user(query.clone()));
        self.query_input.clear();
        self.transcript.show_placeholder();
        self.chat_pending = true;

        tracing::info!(chars = query.chars().count(), "sending chat query");
        Some(query)
    }

    /// Replace the placeholder with the answer or an error message.
    pub fn finish_send(&mut self, result: Result<String, ClientError>) {
        self.transcript.remove_placeholder();
        self.chat_pending = false;

        match result {
            Ok(answer) => {
                tracing::info!(chars = answer.chars().count(), "chat answer received");
                self.transcript.commit(ChatMessage::assistant(answer));
            }
            Err(err) => {
                tracing::warn!(error = %err, "chat request failed");
                self.transcript
                    .commit(ChatMessage::assistant(format!("Error: {}", err)));
            }
        }
    }

    pub async fn send(&mut self, backend: &dyn ChatBackend) {
        if let Some(query) = self.begin_send() {
            let result = backend.chat(&query).await;
            self.finish_send(result);
        }
    }

    /// Empty the transcript. Refused while an answer is outstanding so the
    /// placeholder stays attached to its turn.
    pub fn clear_history(&mut self) -> bool {
        if self.chat_pending {
            return false;
        }
        self.transcript.clear();
        true
    }
}
