use async_trait::async_trait;
use anyhow::{Context, Result};
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tracing::warn;

use crate::storage::{SeenSet, SeenStore};

/// Flat-file memory: one pretty-printed JSON array of notified links,
/// fully rewritten on each save.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SeenStore for JsonFileStore {
    async fn load(&self) -> Result<SeenSet> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(SeenSet::new()),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("failed to read memory file {}", self.path.display())
                })
            }
        };

        match serde_json::from_slice::<Vec<String>>(&bytes) {
            Ok(links) => Ok(links.into_iter().collect()),
            Err(e) => {
                warn!(
                    "Memory file {} is corrupt ({}), resetting memory",
                    self.path.display(),
                    e
                );
                Ok(SeenSet::new())
            }
        }
    }

    async fn save(&self, seen: &SeenSet) -> Result<()> {
        // Sorted so the file stays stable across runs
        let mut links: Vec<&String> = seen.iter().collect();
        links.sort();
        let bytes = serde_json::to_vec_pretty(&links)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        // Write to a temp file, then rename, so a crash mid-save cannot
        // leave a half-written memory behind
        let tmp = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("failed to replace memory file {}", self.path.display()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_missing_file_returns_empty_set() {
        let tmp = TempDir::new().unwrap();
        let store = JsonFileStore::new(tmp.path().join("seen.json"));

        let seen = store.load().await.unwrap();
        assert!(seen.is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load_round_trip() {
        let tmp = TempDir::new().unwrap();
        let store = JsonFileStore::new(tmp.path().join("seen.json"));

        let mut seen = SeenSet::new();
        seen.insert("https://example.com/a".to_string());
        seen.insert("https://example.com/b".to_string());
        store.save(&seen).await.unwrap();

        assert_eq!(store.load().await.unwrap(), seen);
    }

    #[tokio::test]
    async fn test_load_corrupt_file_resets_memory() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("seen.json");
        tokio::fs::write(&path, b"{ not json").await.unwrap();

        let store = JsonFileStore::new(&path);
        let seen = store.load().await.unwrap();
        assert!(seen.is_empty());
    }

    #[tokio::test]
    async fn test_save_replaces_previous_contents() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("seen.json");
        let store = JsonFileStore::new(&path);

        let mut seen = SeenSet::new();
        seen.insert("https://example.com/old".to_string());
        store.save(&seen).await.unwrap();

        let mut replacement = SeenSet::new();
        replacement.insert("https://example.com/new".to_string());
        store.save(&replacement).await.unwrap();

        assert_eq!(store.load().await.unwrap(), replacement);
    }

    #[tokio::test]
    async fn test_file_is_a_pretty_printed_string_array() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("seen.json");
        let store = JsonFileStore::new(&path);

        let mut seen = SeenSet::new();
        seen.insert("https://example.com/b".to_string());
        seen.insert("https://example.com/a".to_string());
        store.save(&seen).await.unwrap();

        let text = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(text.contains('\n'));
        let parsed: Vec<String> = serde_json::from_str(&text).unwrap();
        assert_eq!(
            parsed,
            vec![
                "https://example.com/a".to_string(),
                "https://example.com/b".to_string()
            ]
        );
    }
}
