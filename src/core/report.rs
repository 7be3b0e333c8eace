// ─── Reports ───
// JSON documents written by `check` for downstream tooling.

use std::path::Path;

use chrono::{DateTime, Local};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::info;

use crate::core::error::{UpdaterError, UpdaterResult};
use crate::core::resolver::{AxisUpdate, ModUpdateReport, SearchOutcome};

pub const UPDATES_FILE: &str = "updates.json";
pub const COMPATIBILITY_FILE: &str = "compatibility_report.json";

// ── updates.json ────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct AxisEntry {
    pub current_version: String,
    pub latest_version: Option<String>,
    pub has_update: bool,
    pub newer_versions: Vec<String>,
}

impl From<&AxisUpdate> for AxisEntry {
    fn from(update: &AxisUpdate) -> Self {
        Self {
            current_version: update.current.clone(),
            latest_version: update.latest.clone(),
            has_update: update.has_update(),
            newer_versions: update.newer.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ModEntry {
    pub current_version: String,
    pub latest_version: String,
    pub download_url: String,
}

#[derive(Debug, Serialize)]
pub struct UpdateReport {
    pub timestamp: DateTime<Local>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minecraft: Option<AxisEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loader: Option<AxisEntry>,
    pub mods: IndexMap<String, ModEntry>,
}

impl UpdateReport {
    pub fn new(
        minecraft: Option<&AxisUpdate>,
        loader: Option<&AxisUpdate>,
        mods: Option<&ModUpdateReport>,
    ) -> Self {
        Self {
            timestamp: Local::now(),
            minecraft: minecraft.map(AxisEntry::from),
            loader: loader.map(AxisEntry::from),
            mods: mods
                .map(|r| {
                    r.updates
                        .iter()
                        .map(|(name, u)| {
                            (
                                name.clone(),
                                ModEntry {
                                    current_version: u.current.clone(),
                                    latest_version: u.latest.clone(),
                                    download_url: u.download_url.clone(),
                                },
                            )
                        })
                        .collect()
                })
                .unwrap_or_default(),
        }
    }

    /// Components with at least one newer version.
    pub fn total_updates(&self) -> usize {
        let axis = |e: &Option<AxisEntry>| e.as_ref().is_some_and(|e| e.has_update) as usize;
        axis(&self.minecraft) + axis(&self.loader) + self.mods.len()
    }
}

// ── compatibility_report.json ───────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeTag {
    None,
    Fail,
    Success,
}

#[derive(Debug, Serialize)]
pub struct VersionMove {
    pub current_version: String,
    pub target_version: String,
}

#[derive(Debug, Serialize)]
pub struct CompatibleMod {
    pub version: String,
    pub download_url: String,
    pub project_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TestedVersions {
    pub mc_versions_tested: usize,
    pub loader_versions_tested: usize,
}

#[derive(Debug, Serialize)]
pub struct CompatibilityReport {
    pub timestamp: DateTime<Local>,
    pub outcome: OutcomeTag,
    pub compatible_update_found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minecraft: Option<VersionMove>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loader: Option<VersionMove>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub mods: IndexMap<String, CompatibleMod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tested_versions: Option<TestedVersions>,
}

impl CompatibilityReport {
    pub fn from_outcome(outcome: &SearchOutcome, current_engine: &str, current_loader: &str) -> Self {
        let base = |outcome: OutcomeTag, message: String, tested: Option<TestedVersions>| Self {
            timestamp: Local::now(),
            outcome,
            compatible_update_found: false,
            message: Some(message),
            minecraft: None,
            loader: None,
            mods: IndexMap::new(),
            tested_versions: tested,
        };

        match outcome {
            SearchOutcome::None => base(
                OutcomeTag::None,
                "Already running the latest Minecraft release".to_string(),
                None,
            ),
            SearchOutcome::Fail {
                reason,
                engines_tried,
                loaders_tried,
            } => base(
                OutcomeTag::Fail,
                format!("No compatible update configuration found: {}", reason),
                Some(TestedVersions {
                    mc_versions_tested: *engines_tried,
                    loader_versions_tested: *loaders_tried,
                }),
            ),
            SearchOutcome::Success(result) => Self {
                timestamp: Local::now(),
                outcome: OutcomeTag::Success,
                compatible_update_found: true,
                message: None,
                minecraft: Some(VersionMove {
                    current_version: current_engine.to_string(),
                    target_version: result.engine_version.clone(),
                }),
                loader: Some(VersionMove {
                    current_version: current_loader.to_string(),
                    target_version: result.loader_version.clone(),
                }),
                mods: result
                    .mods
                    .iter()
                    .map(|(name, r)| {
                        (
                            name.clone(),
                            CompatibleMod {
                                version: r.version.clone(),
                                download_url: r.download_url.clone(),
                                project_id: r.project_id.clone(),
                            },
                        )
                    })
                    .collect(),
                tested_versions: Some(TestedVersions {
                    mc_versions_tested: result.engines_tried,
                    loader_versions_tested: result.loaders_tried,
                }),
            },
        }
    }
}

/// Pretty-printed JSON, whole-file overwrite.
pub async fn write_json<T: Serialize>(path: &Path, document: &T) -> UpdaterResult<()> {
    let json = serde_json::to_string_pretty(document)?;
    tokio::fs::write(path, json)
        .await
        .map_err(|e| UpdaterError::io(path, e))?;
    info!("Report saved to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ModSourceKind;
    use crate::core::resolver::{CompatibilityResult, FailReason};
    use crate::core::sources::ModResolution;

    #[test]
    fn update_report_counts_components() {
        let mc = AxisUpdate {
            current: "1.21.1".into(),
            latest: Some("1.21.3".into()),
            newer: vec!["1.21.3".into(), "1.21.2".into()],
            current_found: true,
        };
        let loader = AxisUpdate {
            current: "0.16.10".into(),
            latest: Some("0.16.10".into()),
            newer: vec![],
            current_found: true,
        };
        let report = UpdateReport::new(Some(&mc), Some(&loader), None);
        assert_eq!(report.total_updates(), 1);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["minecraft"]["newer_versions"][1], "1.21.2");
        assert_eq!(json["loader"]["has_update"], false);
        assert!(json["timestamp"].as_str().unwrap().contains('T'));
    }

    #[test]
    fn success_report_lists_targets_and_mods() {
        let mut mods = IndexMap::new();
        mods.insert(
            "lithium".to_string(),
            ModResolution {
                mod_name: "lithium".into(),
                version: "0.6.0".into(),
                download_url: "https://cdn/l.jar".into(),
                file_name: "l.jar".into(),
                provider: ModSourceKind::Modrinth,
                project_id: Some("gvQqBUqZ".into()),
                environment: None,
                file_id: None,
            },
        );
        let outcome = SearchOutcome::Success(CompatibilityResult {
            engine_version: "1.21.3".into(),
            loader_version: "0.16.9".into(),
            mods,
            engines_tried: 1,
            loaders_tried: 2,
        });

        let json = serde_json::to_value(CompatibilityReport::from_outcome(&outcome, "1.21.1", "0.16.5")).unwrap();
        assert_eq!(json["outcome"], "success");
        assert_eq!(json["compatible_update_found"], true);
        assert_eq!(json["minecraft"]["target_version"], "1.21.3");
        assert_eq!(json["loader"]["current_version"], "0.16.5");
        assert_eq!(json["mods"]["lithium"]["project_id"], "gvQqBUqZ");
        assert_eq!(json["tested_versions"]["loader_versions_tested"], 2);
        assert!(json.get("message").is_none());
    }

    #[test]
    fn fail_report_carries_reason_and_counts() {
        let outcome = SearchOutcome::Fail {
            reason: FailReason::NoLoaderSupport {
                engine_version: "1.21.4".into(),
            },
            engines_tried: 1,
            loaders_tried: 0,
        };
        let json = serde_json::to_value(CompatibilityReport::from_outcome(&outcome, "1.21.1", "0.16.5")).unwrap();
        assert_eq!(json["outcome"], "fail");
        assert_eq!(json["compatible_update_found"], false);
        assert!(json["message"].as_str().unwrap().contains("1.21.4"));
        assert!(json.get("minecraft").is_none());
    }

    #[tokio::test]
    async fn write_json_overwrites_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(UPDATES_FILE);
        std::fs::write(&path, "old").unwrap();

        write_json(&path, &UpdateReport::new(None, None, None)).await.unwrap();
        let back: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(back["mods"].as_object().unwrap().is_empty());
    }
}
