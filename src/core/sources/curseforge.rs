use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{ModProvider, ModQuery, ModResolution, Resolution, UnresolvedReason, ARTIFACT_EXTENSION};
use crate::core::config::{fill_template, Environment, ModSourceKind, ModSpec, SourceMapping};
use crate::core::error::UpdaterResult;
use crate::core::http::{fetch_json, Lookup};

pub const CURSEFORGE_API_BASE: &str = "https://api.curseforge.com/v1";

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

/// A file as listed by `/mods/<id>/files`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurseForgeFile {
    pub id: u64,
    #[serde(default)]
    pub display_name: String,
    /// Game versions and loader names mixed together ("1.21.1", "Fabric", "Server").
    #[serde(default)]
    pub game_versions: Vec<String>,
    /// Null when the author disabled third-party distribution.
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
}

impl CurseForgeFile {
    /// The registry has no structured loader field, so the loader is matched
    /// as a substring of any tag.
    pub fn supports(&self, query: &ModQuery<'_>) -> bool {
        let tag = query.loader.display_tag();
        self.game_versions.iter().any(|gv| gv.contains(tag))
            && self.game_versions.iter().any(|gv| gv == query.minecraft_version)
    }

    /// A pin matches the numeric file id or appears in the display name.
    pub fn matches_pin(&self, pin: &str) -> bool {
        self.id.to_string() == pin || self.display_name.contains(pin)
    }
}

/// Secondary registry. Every call needs an API key.
pub struct CurseForgeSource {
    client: reqwest::Client,
    api_key: Option<String>,
    api_base: String,
    files_url: String,
    mod_info_url: String,
}

impl CurseForgeSource {
    pub fn from_mapping(
        client: reqwest::Client,
        mapping: Option<&SourceMapping>,
        api_key: Option<String>,
    ) -> Self {
        let api_base = mapping
            .and_then(|m| m.api_base.clone())
            .unwrap_or_else(|| CURSEFORGE_API_BASE.to_string());

        Self {
            client,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            files_url: mapping
                .and_then(|m| m.files_url.clone())
                .unwrap_or_else(|| format!("{}/mods/{{project_id}}/files", api_base)),
            mod_info_url: mapping
                .and_then(|m| m.mod_info_url.clone())
                .unwrap_or_else(|| format!("{}/mods/{{project_id}}", api_base)),
            api_base,
        }
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    fn headers<'k>(&self, key: &'k str) -> [(&'static str, &'k str); 2] {
        [("Accept", "application/json"), ("x-api-key", key)]
    }

    /// Whether the project endpoint knows `project_id`.
    pub async fn lookup_project(&self, project_id: u64) -> Result<bool, UnresolvedReason> {
        let key = self.api_key.as_deref().ok_or(UnresolvedReason::CredentialMissing)?;
        let url = fill_template(&self.mod_info_url, &[("project_id", &project_id.to_string())]);

        fetch_json::<serde_json::Value>(&self.client, &url, &[], &self.headers(key))
            .await
            .map(|found| matches!(found, Lookup::Found(ref v) if v.get("data").is_some()))
            .map_err(|e| UnresolvedReason::Unavailable(e.to_string()))
    }

    async fn file(&self, key: &str, project_id: u64, file_id: u64) -> UpdaterResult<Lookup<CurseForgeFile>> {
        let url = format!("{}/mods/{}/files/{}", self.api_base, project_id, file_id);
        let found = fetch_json::<Envelope<CurseForgeFile>>(&self.client, &url, &[], &self.headers(key)).await?;
        Ok(found.map(|e| e.data))
    }

    async fn files(
        &self,
        key: &str,
        project_id: u64,
        minecraft_version: &str,
    ) -> UpdaterResult<Lookup<Vec<CurseForgeFile>>> {
        let url = fill_template(&self.files_url, &[("project_id", &project_id.to_string())]);
        let found = fetch_json::<Envelope<Vec<CurseForgeFile>>>(
            &self.client,
            &url,
            &[("gameVersion", minecraft_version)],
            &self.headers(key),
        )
        .await?;
        Ok(found.map(|e| e.data))
    }

    fn resolution(spec: &ModSpec, project_id: u64, file: CurseForgeFile, url: String) -> ModResolution {
        ModResolution {
            mod_name: spec.name.clone(),
            version: file.display_name,
            download_url: url,
            file_name: file
                .file_name
                .unwrap_or_else(|| format!("{}.{}", spec.name, ARTIFACT_EXTENSION)),
            provider: ModSourceKind::Curseforge,
            project_id: Some(project_id.to_string()),
            // no side-support data on this registry
            environment: Some(Environment::Both),
            file_id: Some(file.id),
        }
    }
}

/// First listed file fitting the query (and the pin, if any) with a usable URL.
pub fn select_file(files: Vec<CurseForgeFile>, query: &ModQuery<'_>) -> Option<(CurseForgeFile, String)> {
    files.into_iter().find_map(|file| {
        let fits = file.supports(query)
            && query.pinned_version.map_or(true, |pin| file.matches_pin(pin));
        match (&file.download_url, fits) {
            (Some(url), true) => {
                let url = url.clone();
                Some((file, url))
            }
            _ => None,
        }
    })
}

#[async_trait]
impl ModProvider for CurseForgeSource {
    async fn resolve(&self, spec: &ModSpec, query: &ModQuery<'_>) -> Resolution {
        let Some(key) = self.api_key.as_deref() else {
            return Err(UnresolvedReason::CredentialMissing);
        };
        let Some(project_id) = spec.project_id else {
            return Err(UnresolvedReason::MissingParameter("project_id"));
        };
        let unavailable = |e: crate::core::error::UpdaterError| UnresolvedReason::Unavailable(e.to_string());

        // A configured file is taken as-is for the configured version; for any
        // other pair it must list that pair or the file list is searched.
        if let Some(file_id) = spec.file_id {
            if let Lookup::Found(file) = self.file(key, project_id, file_id).await.map_err(unavailable)? {
                let fits = query.pinned_version.is_some() || file.supports(query);
                if let (Some(url), true) = (file.download_url.clone(), fits) {
                    return Ok(Self::resolution(spec, project_id, file, url));
                }
            }
            debug!("{}: file {} not usable here, listing files", spec.name, file_id);
        }

        let files = match self
            .files(key, project_id, query.minecraft_version)
            .await
            .map_err(unavailable)?
        {
            Lookup::Found(files) => files,
            Lookup::NotFound => return Err(UnresolvedReason::NotFound),
        };

        select_file(files, query)
            .map(|(file, url)| Self::resolution(spec, project_id, file, url))
            .ok_or(UnresolvedReason::NoCompatibleVersion)
    }

    async fn project_exists(&self, spec: &ModSpec) -> Result<bool, UnresolvedReason> {
        let project_id = spec.project_id.ok_or(UnresolvedReason::MissingParameter("project_id"))?;
        self.lookup_project(project_id).await
    }
}
