pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod state;

// Re-export main types for convenience
pub use client::{ChatBackend, HttpBackend, SelectedFile};
pub use config::Config;
pub use controller::ChatController;
pub use error::ClientError;
pub use state::{ChatMessage, ChatRole, Transcript, UploadStatus, PLACEHOLDER_TEXT};
