use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::error::{UpdaterError, UpdaterResult};
use crate::core::loaders::LoaderKind;
use crate::core::version::VERSION_MANIFEST_URL;

/// `source_mappings.yaml`: endpoints, target directories and aliases per source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceMappings {
    #[serde(default)]
    pub sources: BTreeMap<String, SourceMapping>,
}

/// Every field is optional; registry URLs fall back to the public services.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceMapping {
    /// Engine: manifest URL. Loader: artifact URL template. Modrinth: version
    /// list template.
    #[serde(default)]
    pub manifest_url: Option<String>,
    /// Loader listing template (`{minecraft_version}`).
    #[serde(default)]
    pub versions_url: Option<String>,
    #[serde(default)]
    pub api_base: Option<String>,
    #[serde(default)]
    pub files_url: Option<String>,
    #[serde(default)]
    pub mod_info_url: Option<String>,
    #[serde(default)]
    pub target_dir: Option<PathBuf>,
    #[serde(default)]
    pub filename_pattern: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Mod name → registry project id/slug.
    #[serde(default)]
    pub project_mappings: BTreeMap<String, String>,
}

impl SourceMappings {
    pub async fn load(path: &Path) -> UpdaterResult<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| UpdaterError::io(path, e))?;
        let mappings: Self = serde_yaml::from_str(&raw).map_err(|source| UpdaterError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Loaded {} source mapping(s) from {:?}", mappings.sources.len(), path);
        Ok(mappings)
    }

    /// Read-only commands can run on the public endpoints alone.
    pub async fn load_or_default(path: &Path) -> UpdaterResult<Self> {
        if tokio::fs::try_exists(path).await.unwrap_or(false) {
            Self::load(path).await
        } else {
            warn!("{:?} not found, using public registry endpoints", path);
            Ok(Self::default())
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sources.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&SourceMapping> {
        self.sources.get(id)
    }

    pub fn require(&self, id: &str) -> UpdaterResult<&SourceMapping> {
        self.get(id)
            .ok_or_else(|| UpdaterError::UnknownSource(id.to_string()))
    }

    /// Directory artifacts of source `id` are written to.
    pub fn target_dir(&self, id: &str) -> UpdaterResult<PathBuf> {
        self.require(id)?
            .target_dir
            .clone()
            .ok_or_else(|| UpdaterError::Config(format!("source '{}' has no target_dir", id)))
    }

    pub fn engine_manifest_url(&self) -> String {
        self.get("mojang")
            .and_then(|m| m.manifest_url.clone())
            .unwrap_or_else(|| VERSION_MANIFEST_URL.to_string())
    }

    pub fn loader_versions_url(&self, kind: LoaderKind) -> Option<String> {
        self.get(kind.id()).and_then(|m| m.versions_url.clone())
    }

    pub fn loader_artifact_url(&self, kind: LoaderKind) -> Option<String> {
        self.get(kind.id())
            .and_then(|m| m.manifest_url.clone())
            .or_else(|| kind.default_server_jar_url())
    }
}

/// Substitute `{name}` placeholders. Unknown placeholders are left as-is.
pub fn fill_template(template: &str, vars: &[(&str, &str)]) -> String {
    vars.iter().fold(template.to_string(), |acc, (name, value)| {
        acc.replace(&format!("{{{}}}", name), value)
    })
}
