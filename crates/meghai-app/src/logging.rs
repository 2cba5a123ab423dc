use anyhow::Result;
use chrono::Local;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;

#[derive(Serialize)]
struct LogEntry<'a> {
    timestamp: String, // ISO-8601 local time
    kind: &'a str,
    question: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    answer: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    model: &'a str,
}

/// Append-only JSONL log of exchanges and failed submissions. This is the
/// diagnostic sink; a logging error never fails a submit.
pub struct ConversationLogger {
    file_path: PathBuf,
    file: Option<File>,
    model: String,
}

impl ConversationLogger {
    /// Create a new logger; the file name is derived from the current
    /// local time, under `<workspace>/logs/`.
    pub async fn new(workspace: &Path, model: &str) -> Result<Self> {
        let logs_dir = workspace.join("logs");
        fs::create_dir_all(&logs_dir).await?;

        let filename = format!("meghai-{}.jsonl", Local::now().format("%Y-%m-%d-%H%M%S"));
        let file_path = logs_dir.join(filename);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file_path)
            .await?;

        Ok(Self {
            file_path,
            file: Some(file),
            model: model.to_string(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Append a successful exchange.
    pub async fn log_exchange(&mut self, question: &str, answer: &str) {
        let entry = LogEntry {
            timestamp: Local::now().to_rfc3339(),
            kind: "exchange",
            question,
            answer: Some(answer),
            error: None,
            model: &self.model,
        };
        Self::append(&mut self.file, &entry).await;
    }

    /// Append a failed submission (the draft is preserved by the session;
    /// it is recorded here for diagnostics only).
    pub async fn log_failure(&mut self, question: &str, error: &str) {
        let entry = LogEntry {
            timestamp: Local::now().to_rfc3339(),
            kind: "failure",
            question,
            answer: None,
            error: Some(error),
            model: &self.model,
        };
        Self::append(&mut self.file, &entry).await;
    }

    async fn append(file: &mut Option<File>, entry: &LogEntry<'_>) {
        let Some(file) = file else { return };
        let Ok(json) = serde_json::to_string(entry) else {
            return;
        };
        if let Err(e) = file.write_all(json.as_bytes()).await {
            eprintln!("[Logging error] {}", e);
        } else if let Err(e) = file.write_all(b"\n").await {
            eprintln!("[Logging error] {}", e);
        } else {
            let _ = file.flush().await;
        }
    }

    /// Flush and close on graceful shutdown.
    pub async fn shutdown(&mut self) {
        if let Some(file) = self.file.take() {
            let _ = file.sync_all().await;
        }
    }
}
