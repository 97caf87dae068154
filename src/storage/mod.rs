use async_trait::async_trait;
use anyhow::Result;
use std::collections::HashSet;

mod json_file;
pub use json_file::JsonFileStore;

/// Links that have already been notified.
pub type SeenSet = HashSet<String>;

#[async_trait]
pub trait SeenStore: Send + Sync {
    async fn load(&self) -> Result<SeenSet>;
    async fn save(&self, seen: &SeenSet) -> Result<()>;
}
