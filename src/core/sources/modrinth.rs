use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{ModProvider, ModQuery, ModResolution, Resolution, UnresolvedReason, ARTIFACT_EXTENSION};
use crate::core::config::{fill_template, Environment, ModSourceKind, ModSpec, SourceMapping};
use crate::core::http::{fetch_json, Lookup, APP_USER_AGENT};

pub const MODRINTH_API_BASE: &str = "https://api.modrinth.com/v2";

/// One entry of `/project/<id>/version`.
#[derive(Debug, Clone, Deserialize)]
pub struct ModrinthVersion {
    pub version_number: String,
    #[serde(default)]
    pub loaders: Vec<String>,
    #[serde(default)]
    pub game_versions: Vec<String>,
    #[serde(default)]
    pub files: Vec<ModrinthFile>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModrinthFile {
    pub url: String,
    #[serde(default)]
    pub filename: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ModrinthProject {
    #[serde(default = "required")]
    client_side: String,
    #[serde(default = "required")]
    server_side: String,
}

fn required() -> String {
    "required".to_string()
}

impl ModrinthVersion {
    /// Lists both the loader and the exact game version.
    pub fn supports(&self, query: &ModQuery<'_>) -> bool {
        self.loaders.iter().any(|l| l == query.loader.id())
            && self.game_versions.iter().any(|g| g == query.minecraft_version)
    }
}

/// Primary registry. Keyless; project ids come from aliases, slugs or names.
pub struct ModrinthSource {
    client: reqwest::Client,
    api_base: String,
    versions_url: String,
    user_agent: String,
    aliases: BTreeMap<String, String>,
    /// Side support per project, fetched at most once per run.
    sides: Mutex<HashMap<String, Environment>>,
}

impl ModrinthSource {
    pub fn from_mapping(client: reqwest::Client, mapping: Option<&SourceMapping>) -> Self {
        let api_base = mapping
            .and_then(|m| m.api_base.clone())
            .unwrap_or_else(|| MODRINTH_API_BASE.to_string());
        let versions_url = mapping
            .and_then(|m| m.manifest_url.clone())
            .unwrap_or_else(|| format!("{}/project/{{project_id}}/version", api_base));

        Self {
            client,
            versions_url,
            user_agent: mapping
                .and_then(|m| m.user_agent.clone())
                .unwrap_or_else(|| APP_USER_AGENT.to_string()),
            aliases: mapping.map(|m| m.project_mappings.clone()).unwrap_or_default(),
            api_base,
            sides: Mutex::new(HashMap::new()),
        }
    }

    /// Alias table first, then the slug override, then the mod name.
    pub fn project_id_for<'a>(&'a self, spec: &'a ModSpec) -> &'a str {
        self.aliases
            .get(&spec.name)
            .map(String::as_str)
            .or(spec.slug.as_deref())
            .unwrap_or(&spec.name)
    }

    async fn versions(
        &self,
        project_id: &str,
        query: &ModQuery<'_>,
    ) -> Result<Lookup<Vec<ModrinthVersion>>, UnresolvedReason> {
        let url = fill_template(&self.versions_url, &[("project_id", project_id)]);
        let game_versions = format!("[\"{}\"]", query.minecraft_version);
        let loaders = format!("[\"{}\"]", query.loader.id());

        fetch_json(
            &self.client,
            &url,
            &[("game_versions", &game_versions), ("loaders", &loaders)],
            &[("User-Agent", &self.user_agent)],
        )
        .await
        .map_err(|e| UnresolvedReason::Unavailable(e.to_string()))
    }

    /// Side support from the project endpoint. Failures read as `Both`.
    pub async fn environment(&self, project_id: &str) -> Environment {
        if let Some(env) = self.cached_side(project_id) {
            return env;
        }

        let url = format!("{}/project/{}", self.api_base, project_id);
        let env = match fetch_json::<ModrinthProject>(
            &self.client,
            &url,
            &[],
            &[("User-Agent", &self.user_agent)],
        )
        .await
        {
            Ok(Lookup::Found(p)) => Environment::from_side_support(&p.client_side, &p.server_side),
            Ok(Lookup::NotFound) => Environment::Both,
            Err(e) => {
                warn!("Side support for {} unavailable: {}", project_id, e);
                return Environment::Both;
            }
        };

        if let Ok(mut sides) = self.sides.lock() {
            sides.insert(project_id.to_string(), env);
        }
        env
    }

    fn cached_side(&self, project_id: &str) -> Option<Environment> {
        self.sides.lock().ok()?.get(project_id).copied()
    }
}

/// First version in registry order that fits the query (and the pin, if any).
pub fn select_version<'v>(
    versions: &'v [ModrinthVersion],
    query: &ModQuery<'_>,
) -> Option<&'v ModrinthVersion> {
    versions.iter().find(|v| {
        v.supports(query)
            && !v.files.is_empty()
            && query.pinned_version.map_or(true, |pin| v.version_number == pin)
    })
}

#[async_trait]
impl ModProvider for ModrinthSource {
    async fn resolve(&self, spec: &ModSpec, query: &ModQuery<'_>) -> Resolution {
        let project_id = self.project_id_for(spec).to_string();

        let versions = match self.versions(&project_id, query).await? {
            Lookup::Found(v) => v,
            Lookup::NotFound => return Err(UnresolvedReason::NotFound),
        };

        let Some(version) = select_version(&versions, query) else {
            debug!(
                "{}: none of {} version(s) fit MC {} + {}",
                spec.name,
                versions.len(),
                query.minecraft_version,
                query.loader
            );
            return Err(UnresolvedReason::NoCompatibleVersion);
        };

        // select_version only returns versions with files
        let file = &version.files[0];
        let environment = self.environment(&project_id).await;

        Ok(ModResolution {
            mod_name: spec.name.clone(),
            version: version.version_number.clone(),
            download_url: file.url.clone(),
            file_name: file
                .filename
                .clone()
                .unwrap_or_else(|| format!("{}.{}", project_id, ARTIFACT_EXTENSION)),
            provider: ModSourceKind::Modrinth,
            project_id: Some(project_id),
            environment: Some(environment),
            file_id: None,
        })
    }
}
