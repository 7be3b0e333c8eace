use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::plan::DownloadPlan;
use crate::core::error::{UpdaterError, UpdaterResult};

pub const DEFAULT_CACHE_FILE: &str = ".download_cache.json";

/// A captured plan plus the engine version it was built for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub minecraft_version: String,
    pub downloads: DownloadPlan,
}

impl CacheEntry {
    pub fn is_stale(&self, live_engine_version: &str) -> bool {
        self.minecraft_version != live_engine_version
    }
}

/// The persisted plan file. Whole-document overwrite, no locking.
#[derive(Debug, Clone)]
pub struct PlanCache {
    path: PathBuf,
}

impl PlanCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `None` when the file is missing or unreadable as a plan.
    pub async fn load(&self) -> Option<CacheEntry> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No cache file found at {:?}", self.path);
                return None;
            }
            Err(e) => {
                warn!("Could not read cache {:?}: {}", self.path, e);
                return None;
            }
        };

        match serde_json::from_str::<CacheEntry>(&raw) {
            Ok(entry) => {
                info!("Loaded cache file {:?} ({} item(s))", self.path, entry.downloads.len());
                Some(entry)
            }
            Err(e) => {
                warn!("Ignoring corrupt cache {:?}: {}", self.path, e);
                None
            }
        }
    }

    pub async fn save(&self, entry: &CacheEntry) -> UpdaterResult<()> {
        let json = serde_json::to_string_pretty(entry)?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| UpdaterError::io(&self.path, e))?;
        info!("Cache saved to {:?}", self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::downloader::plan::{DownloadItem, ItemKind};

    fn entry(version: &str) -> CacheEntry {
        let mut downloads = DownloadPlan::new();
        downloads.insert(
            "minecraft".into(),
            DownloadItem {
                kind: ItemKind::Minecraft,
                name: "Minecraft Server".into(),
                version: version.into(),
                url: "https://piston-data/server.jar".into(),
                filename: "server.jar".into(),
                destinations: vec![PathBuf::from("server/server.jar")],
                environment: None,
                slug: None,
            },
        );
        CacheEntry {
            minecraft_version: version.into(),
            downloads,
        }
    }

    #[tokio::test]
    async fn missing_or_corrupt_cache_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PlanCache::new(dir.path().join(DEFAULT_CACHE_FILE));
        assert!(cache.load().await.is_none());

        std::fs::write(cache.path(), "{not json").unwrap();
        assert!(cache.load().await.is_none());
    }

    #[tokio::test]
    async fn save_overwrites_whole_document() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PlanCache::new(dir.path().join(DEFAULT_CACHE_FILE));

        cache.save(&entry("1.21.1")).await.unwrap();
        cache.save(&entry("1.21.3")).await.unwrap();

        let loaded = cache.load().await.unwrap();
        assert_eq!(loaded, entry("1.21.3"));
    }

    #[test]
    fn staleness_compares_captured_engine_version() {
        let cached = entry("1.21.1");
        assert!(!cached.is_stale("1.21.1"));
        assert!(cached.is_stale("1.21.3"));
    }
}
