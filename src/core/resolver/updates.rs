// ─── Single-Axis Update Checks ───
// Informational scans of one axis at a time. None of these gate on each
// other or run the cross-axis search.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::axes::VersionAxes;
use crate::core::config::{ModSourceKind, ModSpec};
use crate::core::error::UpdaterResult;
use crate::core::http::Lookup;
use crate::core::sources::{ModProvider, ModQuery, UnresolvedReason};
use crate::core::version::{is_newer, VersionManifest};

/// Where one axis stands relative to its registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AxisUpdate {
    pub current: String,
    pub latest: Option<String>,
    /// Candidates listed ahead of `current`, registry order.
    pub newer: Vec<String>,
    pub current_found: bool,
}

impl AxisUpdate {
    pub fn has_update(&self) -> bool {
        !self.newer.is_empty()
    }
}

/// Engine axis against an already fetched manifest.
pub fn engine_update(manifest: &VersionManifest, current: &str) -> AxisUpdate {
    let scan = manifest.releases_newer_than(current);
    if !scan.current_found {
        warn!("Minecraft {} is not listed in the manifest", current);
    }
    AxisUpdate {
        current: current.to_string(),
        latest: manifest.latest.release.clone(),
        newer: scan.newer,
        current_found: scan.current_found,
    }
}

pub async fn check_engine(
    client: &reqwest::Client,
    manifest_url: &str,
    current: &str,
) -> UpdaterResult<AxisUpdate> {
    match VersionManifest::fetch(client, manifest_url).await? {
        Lookup::Found(manifest) => Ok(engine_update(&manifest, current)),
        Lookup::NotFound => {
            warn!("Version manifest not found at {}", manifest_url);
            Ok(AxisUpdate {
                current: current.to_string(),
                ..AxisUpdate::default()
            })
        }
    }
}

/// Loader axis, pinned to `engine_version`. Everything listed before the
/// current loader version counts as newer.
pub async fn check_loader<A: VersionAxes>(
    axes: &A,
    engine_version: &str,
    current: &str,
) -> UpdaterResult<AxisUpdate> {
    let candidates = axes.loader_candidates(engine_version).await?;
    let current_found = candidates.iter().any(|v| v == current);
    let newer: Vec<String> = candidates
        .iter()
        .take_while(|v| v.as_str() != current)
        .cloned()
        .collect();

    if candidates.is_empty() {
        warn!("No {} versions available for Minecraft {}", axes.loader_kind(), engine_version);
    } else if !current_found {
        warn!(
            "Current {} version {} not found for Minecraft {}",
            axes.loader_kind(),
            current,
            engine_version
        );
    }

    Ok(AxisUpdate {
        current: current.to_string(),
        latest: candidates.first().cloned(),
        newer,
        current_found,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModUpdate {
    pub current: String,
    pub latest: String,
    pub download_url: String,
}

#[derive(Debug, Default)]
pub struct ModUpdateReport {
    pub updates: IndexMap<String, ModUpdate>,
    pub up_to_date: usize,
    pub errors: Vec<(String, UnresolvedReason)>,
    /// Direct links and mods without a declared version.
    pub skipped: Vec<String>,
}

/// Mod axis, pinned to the pair in `query` (its own pin is ignored).
pub async fn check_mods<M: ModProvider>(
    provider: &M,
    specs: &[ModSpec],
    query: ModQuery<'_>,
) -> ModUpdateReport {
    let query = query.pinned(None);
    let mut report = ModUpdateReport::default();

    for spec in specs {
        let current = match (&spec.version, spec.source) {
            (Some(v), source) if source != ModSourceKind::Custom => v,
            _ => {
                debug!("{}: skipped (direct link or no version)", spec.name);
                report.skipped.push(spec.name.clone());
                continue;
            }
        };

        let latest = match provider.resolve(spec, &query).await {
            Ok(r) => r,
            Err(reason) => {
                warn!("{}: {}", spec.name, reason);
                report.errors.push((spec.name.clone(), reason));
                continue;
            }
        };

        if latest.version != *current && is_newer(&latest.version, current) {
            info!("{}: {} -> {}", spec.name, current, latest.version);
            report.updates.insert(
                spec.name.clone(),
                ModUpdate {
                    current: current.clone(),
                    latest: latest.version,
                    download_url: latest.download_url,
                },
            );
        } else {
            debug!("{}: up to date ({})", spec.name, current);
            report.up_to_date += 1;
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::UpdaterError;
    use crate::core::loaders::LoaderKind;
    use crate::core::sources::{ModResolution, Resolution};
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct FixedLoaders(Vec<&'static str>);

    #[async_trait]
    impl VersionAxes for FixedLoaders {
        fn loader_kind(&self) -> LoaderKind {
            LoaderKind::Fabric
        }

        async fn engine_exists(&self, _version: &str) -> UpdaterResult<bool> {
            Ok(true)
        }

        async fn engine_candidates(&self, _current: &str) -> UpdaterResult<Vec<String>> {
            Ok(Vec::new())
        }

        async fn loader_candidates(&self, _engine: &str) -> UpdaterResult<Vec<String>> {
            if self.0.is_empty() {
                return Err(UpdaterError::unavailable("meta", "HTTP 502"));
            }
            Ok(self.0.iter().map(|s| s.to_string()).collect())
        }
    }

    struct LatestIs(HashMap<&'static str, &'static str>);

    #[async_trait]
    impl ModProvider for LatestIs {
        async fn resolve(&self, spec: &ModSpec, query: &ModQuery<'_>) -> Resolution {
            assert!(query.pinned_version.is_none());
            let version = self
                .0
                .get(spec.name.as_str())
                .ok_or(UnresolvedReason::NotFound)?;
            Ok(ModResolution {
                mod_name: spec.name.clone(),
                version: version.to_string(),
                download_url: format!("https://cdn/{}-{}.jar", spec.name, version),
                file_name: format!("{}.jar", spec.name),
                provider: spec.source,
                project_id: None,
                environment: None,
                file_id: None,
            })
        }
    }

    fn versioned(name: &str, version: &str) -> ModSpec {
        let mut spec = ModSpec::new(name, ModSourceKind::Modrinth);
        spec.version = Some(version.into());
        spec
    }

    #[test]
    fn engine_update_lists_releases_ahead_of_current() {
        let manifest: VersionManifest = serde_json::from_value(serde_json::json!({
            "latest": {"release": "1.21.3", "snapshot": "24w46a"},
            "versions": [
                {"id": "24w46a", "type": "snapshot", "url": "u"},
                {"id": "1.21.3", "type": "release", "url": "u"},
                {"id": "1.21.2", "type": "release", "url": "u"},
                {"id": "1.21.1", "type": "release", "url": "u"}
            ]
        }))
        .unwrap();

        let update = engine_update(&manifest, "1.21.1");
        assert_eq!(update.latest.as_deref(), Some("1.21.3"));
        assert_eq!(update.newer, vec!["1.21.3", "1.21.2"]);
        assert!(update.current_found && update.has_update());

        let current = engine_update(&manifest, "1.21.3");
        assert!(!current.has_update());
    }

    #[tokio::test]
    async fn loader_newer_versions_are_the_prefix_before_current() {
        let axes = FixedLoaders(vec!["0.16.10", "0.16.9", "0.16.5", "0.15.0"]);

        let update = check_loader(&axes, "1.21.1", "0.16.5").await.unwrap();
        assert_eq!(update.latest.as_deref(), Some("0.16.10"));
        assert_eq!(update.newer, vec!["0.16.10", "0.16.9"]);
        assert!(update.current_found);
    }

    #[tokio::test]
    async fn unlisted_loader_version_treats_whole_list_as_newer() {
        let axes = FixedLoaders(vec!["0.16.10", "0.16.9"]);
        let update = check_loader(&axes, "1.21.1", "0.14.0").await.unwrap();
        assert!(!update.current_found);
        assert_eq!(update.newer.len(), 2);
    }

    #[tokio::test]
    async fn loader_registry_outage_propagates() {
        let axes = FixedLoaders(vec![]);
        assert!(check_loader(&axes, "1.21.1", "0.16.5").await.is_err());
    }

    #[tokio::test]
    async fn mod_updates_use_numeric_comparison() {
        let provider = LatestIs(HashMap::from([
            ("lithium", "0.5.10"),
            ("sodium", "0.6.0"),
            ("ferritecore", "7.0.0"),
        ]));
        let mut direct = ModSpec::new("tweaks", ModSourceKind::Custom);
        direct.version = Some("1.0".into());
        let specs = vec![
            versioned("lithium", "0.5.9"),
            versioned("sodium", "0.6.0"),
            versioned("ferritecore", "7.1.0"),
            versioned("missing", "1.0.0"),
            ModSpec::new("unversioned", ModSourceKind::Modrinth),
            direct,
        ];
        let query = ModQuery::latest("1.21.1", LoaderKind::Fabric, "0.16.5").pinned(Some("x"));

        let report = check_mods(&provider, &specs, query).await;

        assert_eq!(report.updates.len(), 1);
        assert_eq!(report.updates["lithium"].latest, "0.5.10");
        // equal, and locally newer than the registry
        assert_eq!(report.up_to_date, 2);
        assert_eq!(
            report.errors,
            vec![("missing".to_string(), UnresolvedReason::NotFound)]
        );
        assert_eq!(report.skipped, vec!["unversioned", "tweaks"]);
    }
}
