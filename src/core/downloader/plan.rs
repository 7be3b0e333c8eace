// ─── Download Plan ───
// A flat, keyed list of artifacts and where each one lands on disk.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::client::Downloader;
use crate::core::config::{fill_template, Environment, ModSourceKind, ModSpec, ServerConfig, SourceMappings};
use crate::core::error::{UpdaterError, UpdaterResult};
use crate::core::loaders::LoaderKind;
use crate::core::resolver::CompatibilityResult;
use crate::core::sources::{ModProvider, ModQuery, ModResolution};
use crate::core::version::resolve_server_jar;

/// Subdirectory of a mod target dir that receives client-side copies.
pub const CLIENT_SUBDIR: &str = "client";

const DEFAULT_ENGINE_FILENAME: &str = "server.jar";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Minecraft,
    Loader,
    Mod,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadItem {
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub name: String,
    pub version: String,
    pub url: String,
    pub filename: String,
    pub destinations: Vec<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<Environment>,
    /// Registry project the mod came from, for reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

/// Keyed by logical id: `minecraft`, the loader id, `mod_<name>`.
pub type DownloadPlan = IndexMap<String, DownloadItem>;

/// Server path for server-side mods, `client/` for client-side ones, both
/// for `both`.
pub fn destinations(environment: Environment, target_dir: &Path, filename: &str) -> Vec<PathBuf> {
    let mut out = Vec::with_capacity(2);
    if environment.on_server() {
        out.push(target_dir.join(filename));
    }
    if environment.on_client() {
        out.push(target_dir.join(CLIENT_SUBDIR).join(filename));
    }
    out
}

pub fn mod_key(name: &str) -> String {
    format!("mod_{}", name)
}

/// Resolves config entries (or a search result) into plan items.
pub struct PlanBuilder<'a, M: ModProvider> {
    client: &'a reqwest::Client,
    mappings: &'a SourceMappings,
    provider: &'a M,
}

impl<'a, M: ModProvider> PlanBuilder<'a, M> {
    pub fn new(client: &'a reqwest::Client, mappings: &'a SourceMappings, provider: &'a M) -> Self {
        Self {
            client,
            mappings,
            provider,
        }
    }

    // ── Axis items ──────────────────────────────────────

    async fn engine_item(&self, source: &str, version: &str) -> UpdaterResult<Option<DownloadItem>> {
        let target_dir = self.mappings.target_dir(source)?;
        let manifest_url = self.mappings.engine_manifest_url();

        let url = match resolve_server_jar(self.client, &manifest_url, version).await {
            Ok(Some(url)) => url,
            Ok(None) => {
                warn!("Minecraft {}: no server download listed", version);
                return Ok(None);
            }
            Err(e) => {
                warn!("Minecraft {}: {}", version, e);
                return Ok(None);
            }
        };

        let filename = self
            .mappings
            .get(source)
            .and_then(|m| m.filename_pattern.as_deref())
            .map(|p| fill_template(p, &[("version", version)]))
            .unwrap_or_else(|| DEFAULT_ENGINE_FILENAME.to_string());

        Ok(Some(DownloadItem {
            kind: ItemKind::Minecraft,
            name: "Minecraft Server".to_string(),
            version: version.to_string(),
            url,
            destinations: vec![target_dir.join(&filename)],
            filename,
            environment: None,
            slug: None,
        }))
    }

    fn loader_item(
        &self,
        kind: LoaderKind,
        minecraft_version: &str,
        version: &str,
    ) -> UpdaterResult<Option<DownloadItem>> {
        let target_dir = self.mappings.target_dir(kind.id())?;
        let Some(template) = self.mappings.loader_artifact_url(kind) else {
            warn!("{} {}: no artifact URL configured", kind, version);
            return Ok(None);
        };

        let vars = [("minecraft_version", minecraft_version), ("version", version)];
        let filename = self
            .mappings
            .get(kind.id())
            .and_then(|m| m.filename_pattern.as_deref())
            .map(|p| fill_template(p, &vars))
            .unwrap_or_else(|| format!("{}-server-launch.jar", kind.id()));

        Ok(Some(DownloadItem {
            kind: ItemKind::Loader,
            name: format!("{} Loader", kind),
            version: version.to_string(),
            url: fill_template(&template, &vars),
            destinations: vec![target_dir.join(&filename)],
            filename,
            environment: None,
            slug: None,
        }))
    }

    fn mod_item(&self, spec: &ModSpec, resolution: &ModResolution) -> UpdaterResult<DownloadItem> {
        let target_dir = self.mappings.target_dir(spec.source.id())?;
        let environment = spec
            .environment
            .or(resolution.environment)
            .unwrap_or_default();
        let slug = resolution.project_id.as_ref().map(|id| match resolution.provider {
            ModSourceKind::Curseforge => format!("cf_{}", id),
            _ => id.clone(),
        });

        Ok(DownloadItem {
            kind: ItemKind::Mod,
            name: spec.name.clone(),
            version: resolution.version.clone(),
            url: resolution.download_url.clone(),
            destinations: destinations(environment, &target_dir, &resolution.file_name),
            filename: resolution.file_name.clone(),
            environment: Some(environment),
            slug,
        })
    }

    fn insert_axes(plan: &mut DownloadPlan, kind: LoaderKind, engine: Option<DownloadItem>, loader: Option<DownloadItem>) {
        if let Some(item) = engine {
            plan.insert("minecraft".to_string(), item);
        }
        if let Some(item) = loader {
            plan.insert(kind.id().to_string(), item);
        }
    }

    // ── Whole plans ─────────────────────────────────────

    /// Plan for exactly what `config.yaml` declares, each mod pinned to its
    /// configured version.
    pub async fn build_from_config(&self, config: &ServerConfig) -> UpdaterResult<DownloadPlan> {
        let mc = &config.minecraft.version;
        let kind = config.loader.source;
        info!("Building download plan for Minecraft {} + {} {}", mc, kind, config.loader.version);

        let mut plan = DownloadPlan::new();
        let engine = self.engine_item(&config.minecraft.source, mc).await?;
        let loader = self.loader_item(kind, mc, &config.loader.version)?;
        Self::insert_axes(&mut plan, kind, engine, loader);

        for spec in &config.mods {
            let Some(version) = spec.version.as_deref() else {
                warn!("{}: no version configured, run validate first", spec.name);
                continue;
            };
            let query = ModQuery::latest(mc, kind, &config.loader.version).pinned(Some(version));
            match self.provider.resolve(spec, &query).await {
                Ok(resolution) => {
                    plan.insert(mod_key(&spec.name), self.mod_item(spec, &resolution)?);
                }
                Err(reason) => warn!("{} {}: {}", spec.name, version, reason),
            }
        }

        info!("Total items resolved: {}", plan.len());
        Ok(plan)
    }

    /// Plan for the upgrade target a compatibility search settled on. Mods
    /// keep the resolutions the search produced.
    pub async fn build_from_result(
        &self,
        config: &ServerConfig,
        result: &CompatibilityResult,
    ) -> UpdaterResult<DownloadPlan> {
        let kind = config.loader.source;
        let mut plan = DownloadPlan::new();
        let engine = self
            .engine_item(&config.minecraft.source, &result.engine_version)
            .await?;
        let loader = self.loader_item(kind, &result.engine_version, &result.loader_version)?;
        Self::insert_axes(&mut plan, kind, engine, loader);

        for spec in &config.mods {
            if let Some(resolution) = result.mods.get(&spec.name) {
                plan.insert(mod_key(&spec.name), self.mod_item(spec, resolution)?);
            }
        }
        Ok(plan)
    }
}

// ── Execution ───────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadSummary {
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Fetch every item in plan order. A destination that already exists is
/// taken as satisfied. Multi-destination items download once and copy.
pub async fn execute(plan: &DownloadPlan, downloader: &Downloader) -> DownloadSummary {
    let mut summary = DownloadSummary::default();

    for (key, item) in plan {
        let missing: Vec<&PathBuf> = item.destinations.iter().filter(|d| !d.exists()).collect();
        let Some((first, rest)) = missing.split_first() else {
            info!("[{} {}] already present, skipping", item.name, item.version);
            summary.skipped += 1;
            continue;
        };

        info!("[{} {}] downloading {}", item.name, item.version, item.url);
        if let Err(e) = downloader.download_file(&item.url, first).await {
            warn!("{}: {}", key, e);
            summary.failed += 1;
            continue;
        }

        for dest in rest {
            if let Err(e) = copy_artifact(first, dest).await {
                warn!("{}: could not copy to {:?}: {}", key, dest, e);
            }
        }
        summary.downloaded += 1;
    }

    summary
}

async fn copy_artifact(from: &Path, to: &Path) -> UpdaterResult<()> {
    if let Some(parent) = to.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| UpdaterError::io(parent, e))?;
    }
    tokio::fs::copy(from, to)
        .await
        .map_err(|e| UpdaterError::io(to, e))?;
    Ok(())
}
