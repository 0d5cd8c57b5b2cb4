//! Line-mode commands: `upload`, `ask` and `repl`.

use std::path::Path;
use anyhow::{bail, Result};
use colored::*;
use dialoguer::{Input, theme::ColorfulTheme};
use docchat_core::{ChatBackend, ChatController, ClientError, SelectedFile, UploadStatus};

pub async fn upload(backend: &dyn ChatBackend, path: &Path) -> Result<()> {
    let file = SelectedFile::load(path).await?;
    let name = file.name.clone();

    let mut controller = ChatController::new();
    controller.select_file(file);

    println!("📄 {} {}", "Uploading".bold().blue(), name.cyan());
    controller.upload(backend).await;

    let status = controller.status();
    match status {
        UploadStatus::Succeeded => {
            println!("{}", status.text().green());
            Ok(())
        }
        UploadStatus::Error(message) => bail!("{}", message),
        _ => bail!("{}", status.text()),
    }
}

pub async fn ask(backend: &dyn ChatBackend, question: &str) -> Result<()> {
    let question = question.trim();
    if question.is_empty() {
        println!("{}", "Nothing to ask.".yellow());
        return Ok(());
    }

    println!("{}", "Thinking...".dimmed());
    let answer = backend.chat(question).await?;
    print_reply(Ok(answer));
    Ok(())
}

/// Ask questions until the user enters `q`.
pub async fn repl(backend: &dyn ChatBackend) -> Result<()> {
    println!("\n{}", "💬 Ask about your PDF".bold().blue());
    println!("{}", "Upload a document first with `docchat upload <PATH>`.".dimmed());

    loop {
        let input: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Question (or 'q' to quit)")
            .allow_empty(true)
            .interact_text()?;

        if is_quit(&input) {
            break;
        }
        if input.trim().is_empty() {
            continue;
        }

        println!("{}", "Thinking...".dimmed());
        print_reply(backend.chat(input.trim()).await);
    }

    Ok(())
}

fn is_quit(input: &str) -> bool {
    input.trim().eq_ignore_ascii_case("q")
}

fn print_reply(reply: Result<String, ClientError>) {
    match reply {
        Ok(answer) => {
            println!("\n{}", "AI:".bold().yellow());
            println!("{}\n", answer);
        }
        Err(err) => {
            println!("{}", format!("Error: {}", err).red());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedBackend;
    use std::sync::atomic::Ordering;

    #[test]
    fn test_is_quit() {
        assert!(is_quit("q"));
        assert!(is_quit(" Q \n"));
        assert!(!is_quit("quit the intro?"));
        assert!(!is_quit(""));
    }

    #[tokio::test]
    async fn test_ask_skips_blank_question() {
        let backend = ScriptedBackend::answering("42");
        let calls = backend.chat_call_count();

        ask(&backend, "   ").await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        ask(&backend, "why?").await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_upload_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.pdf");
        std::fs::write(&path, b"%PDF").unwrap();

        upload(&ScriptedBackend::default(), &path).await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_upload_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.pdf");
        std::fs::write(&path, b"%PDF").unwrap();

        let err = upload(&ScriptedBackend::failing("connection refused"), &path)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "connection refused");
    }

    #[tokio::test]
    async fn test_ask_failure_is_error() {
        let backend = ScriptedBackend::failing("network down");
        let err = ask(&backend, "why?").await.unwrap_err();
        assert_eq!(err.to_string(), "network down");
    }

    #[tokio::test]
    async fn test_upload_missing_file_is_error() {
        let backend = ScriptedBackend::default();
        assert!(upload(&backend, Path::new("/no/such/file.pdf")).await.is_err());
    }
}
