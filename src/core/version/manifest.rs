// ─── Version Manifest ───
// Handles fetching and parsing the Mojang version manifest.

use serde::Deserialize;
use tracing::info;

use crate::core::error::UpdaterResult;
use crate::core::http::{fetch_json, Lookup};

pub const VERSION_MANIFEST_URL: &str =
    "https://launchermeta.mojang.com/mc/game/version_manifest.json";

/// Top-level Mojang version manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct VersionManifest {
    #[serde(default)]
    pub latest: LatestVersions,
    #[serde(default)]
    pub versions: Vec<VersionEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LatestVersions {
    pub release: Option<String>,
    pub snapshot: Option<String>,
}

/// A single entry in the manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct VersionEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub version_type: String,
    pub url: String,
    #[serde(default, rename = "releaseTime")]
    pub release_time: Option<String>,
}

impl VersionEntry {
    pub fn is_release(&self) -> bool {
        self.version_type == "release"
    }
}

/// Releases listed ahead of the running version, in manifest order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseScan {
    pub newer: Vec<String>,
    /// `false` when the walk ran off the end without meeting the current id.
    pub current_found: bool,
}

impl VersionManifest {
    /// Fetch the version manifest from `url`.
    pub async fn fetch(client: &reqwest::Client, url: &str) -> UpdaterResult<Lookup<Self>> {
        info!("Fetching Minecraft version manifest...");

        let manifest = fetch_json::<VersionManifest>(client, url, &[], &[]).await?;
        if let Lookup::Found(m) = &manifest {
            info!("Loaded {} versions from manifest", m.versions.len());
        }
        Ok(manifest)
    }

    /// Find a specific version entry by ID (e.g. "1.20.4").
    pub fn find_version(&self, id: &str) -> Option<&VersionEntry> {
        self.versions.iter().find(|v| v.id == id)
    }

    /// Walk the manifest from the top, collecting release ids until `current`
    /// shows up. The manifest's own order is kept; nothing is re-sorted.
    pub fn releases_newer_than(&self, current: &str) -> ReleaseScan {
        let mut scan = ReleaseScan::default();
        for entry in &self.versions {
            if entry.id == current {
                scan.current_found = true;
                break;
            }
            if entry.is_release() {
                scan.newer.push(entry.id.clone());
            }
        }
        scan
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest() -> VersionManifest {
        serde_json::from_str(
            r#"{
                "latest": {"release": "1.21.3", "snapshot": "24w46a"},
                "versions": [
                    {"id": "24w46a", "type": "snapshot", "url": "https://example.com/24w46a.json"},
                    {"id": "1.21.3", "type": "release", "url": "https://example.com/1.21.3.json"},
                    {"id": "1.21.2", "type": "release", "url": "https://example.com/1.21.2.json"},
                    {"id": "1.21.1", "type": "release", "url": "https://example.com/1.21.1.json"},
                    {"id": "1.21", "type": "release", "url": "https://example.com/1.21.json"}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn deserialize_manifest_entry() {
        let json = r#"{
            "id": "1.20.4",
            "type": "release",
            "releaseTime": "2023-12-07T08:00:00+00:00",
            "url": "https://example.com/1.20.4.json",
            "sha1": "abc123"
        }"#;
        let entry: VersionEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.id, "1.20.4");
        assert!(entry.is_release());
        assert_eq!(
            entry.release_time.as_deref(),
            Some("2023-12-07T08:00:00+00:00")
        );
    }

    #[test]
    fn newer_releases_skip_snapshots_and_keep_order() {
        let scan = manifest().releases_newer_than("1.21.1");
        assert_eq!(scan.newer, vec!["1.21.3", "1.21.2"]);
        assert!(scan.current_found);
    }

    #[test]
    fn latest_release_has_no_newer_candidates() {
        let scan = manifest().releases_newer_than("1.21.3");
        assert!(scan.newer.is_empty());
        assert!(scan.current_found);
    }

    #[test]
    fn unknown_current_version_collects_everything() {
        let scan = manifest().releases_newer_than("1.7.10");
        assert_eq!(scan.newer.len(), 4);
        assert!(!scan.current_found);
    }
}
