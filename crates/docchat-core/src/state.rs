//! UI-agnostic session state types
//!
//! These structures are shared by every front end (the TUI, the one-shot
//! commands, tests) and don't depend on any UI framework.

use serde::{Deserialize, Serialize};

/// Text shown while an answer is outstanding.
pub const PLACEHOLDER_TEXT: &str = "Thinking...";

/// A committed message in the chat transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatRole {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "ai")]
    Assistant,
}

/// Ordered, append-only list of chat messages plus at most one trailing
/// placeholder.
///
/// The placeholder is never stored as a message: it is a flag rendered after
/// the last committed message, so it can only ever be shown once. Only
/// `ChatController` mutates a transcript.
#[derive(Debug, Default, Clone)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
    placeholder: bool,
    scroll_pending: bool,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty() && !self.placeholder
    }

    pub fn has_placeholder(&self) -> bool {
        self.placeholder
    }

    /// Append a committed message. The placeholder must already be gone.
    pub(crate) fn commit(&mut self, message: ChatMessage) {
        debug_assert!(!self.placeholder, "placeholder must be removed before commit");
        self.messages.push(message);
        self.scroll_pending = true;
    }

    /// Returns false if a placeholder was already showing.
    pub(crate) fn show_placeholder(&mut self) -> bool {
        if self.placeholder {
            return false;
        }
        self.placeholder = true;
        self.scroll_pending = true;
        true
    }

    /// Returns false if there was nothing to remove.
    pub(crate) fn remove_placeholder(&mut self) -> bool {
        std::mem::replace(&mut self.placeholder, false)
    }

    /// Whether the view should jump to the end since the last call.
    pub(crate) fn take_scroll_request(&mut self) -> bool {
        std::mem::replace(&mut self.scroll_pending, false)
    }

    pub(crate) fn clear(&mut self) {
        self.messages.clear();
        self.placeholder = false;
        self.scroll_pending = true;
    }
}

/// Status line of the upload form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UploadStatus {
    #[default]
    Idle,
    Uploading,
    Succeeded,
    Failed,
    Error(String),
}

impl UploadStatus {
    pub fn text(&self) -> String {
        match self {
            UploadStatus::Idle => String::new(),
            UploadStatus::Uploading => "Uploading and processing...".to_string(),
            UploadStatus::Succeeded => "Upload successful! You can now ask questions.".to_string(),
            UploadStatus::Failed => "Upload failed.".to_string(),
            UploadStatus::Error(message) => format!("Error: {}", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_is_never_duplicated() {
        let mut transcript = Transcript::new();
        assert!(transcript.show_placeholder());
        assert!(!transcript.show_placeholder());
        assert!(transcript.remove_placeholder());
        assert!(!transcript.remove_placeholder());
        assert!(transcript.is_empty());
    }

    #[test]
    fn test_every_append_requests_scroll() {
        let mut transcript = Transcript::new();
        assert!(!transcript.take_scroll_request());

        transcript.commit(ChatMessage::user("hi"));
        assert!(transcript.take_scroll_request());
        assert!(!transcript.take_scroll_request());

        transcript.show_placeholder();
        assert!(transcript.take_scroll_request());
    }

    #[test]
    fn test_role_serializes_as_user_and_ai() {
        let json = serde_json::to_string(&ChatMessage::assistant("42")).unwrap();
        assert_eq!(json, r#"{"role":"ai","content":"42"}"#);
        let json = serde_json::to_string(&ChatMessage::user("q")).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"q"}"#);
    }

    #[test]
    fn test_status_text() {
        assert_eq!(UploadStatus::Idle.text(), "");
        assert_eq!(UploadStatus::Failed.text(), "Upload failed.");
        assert_eq!(
            UploadStatus::Error("connection refused".into()).text(),
            "Error: connection refused"
        );
    }
}
