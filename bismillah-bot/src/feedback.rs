//! Append-only feedback log

use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

/// One `<chat id>: <text>` line per feedback message
#[derive(Debug, Clone)]
pub struct FeedbackLog {
    path: PathBuf,
}

impl FeedbackLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn append(&self, chat_id: i64, text: &str) -> std::io::Result<()> {
        // Keep one entry per line
        let line = format!("{}: {}\n", chat_id, text.replace('\n', " "));

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_append_lines() {
        let dir = TempDir::new().unwrap();
        let log = FeedbackLog::new(dir.path().join("feedback.txt"));

        log.append(42, "great bot").await.unwrap();
        log.append(7, "two\nlines").await.unwrap();

        let content = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(content, "42: great bot\n7: two lines\n");
    }
}
