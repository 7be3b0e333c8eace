use tracing::{debug, info};

use super::fabric::{loader_versions, LoaderEntry};
use super::LoaderKind;
use crate::core::config::fill_template;
use crate::core::error::UpdaterResult;
use crate::core::http::{fetch_json, Lookup};

/// Loader-axis registry: lists loader builds that support a game version.
#[derive(Debug, Clone)]
pub struct LoaderRegistry {
    kind: LoaderKind,
    client: reqwest::Client,
    versions_url: String,
}

impl LoaderRegistry {
    /// `versions_url` is a template with a `{minecraft_version}` placeholder;
    /// `None` uses the public meta service for `kind`.
    pub fn new(kind: LoaderKind, client: reqwest::Client, versions_url: Option<&str>) -> Self {
        Self {
            kind,
            client,
            versions_url: versions_url
                .map(str::to_string)
                .unwrap_or_else(|| kind.default_versions_url()),
        }
    }

    pub fn kind(&self) -> LoaderKind {
        self.kind
    }

    /// Loader versions for `minecraft_version`, newest first as the registry
    /// lists them. An empty list means no loader support for that version.
    pub async fn versions_for(&self, minecraft_version: &str) -> UpdaterResult<Vec<String>> {
        let url = fill_template(
            &self.versions_url,
            &[("minecraft_version", minecraft_version)],
        );

        let versions = match fetch_json::<Vec<LoaderEntry>>(&self.client, &url, &[], &[]).await? {
            Lookup::Found(entries) => loader_versions(entries),
            Lookup::NotFound => {
                debug!("{} meta has no listing for {}", self.kind, minecraft_version);
                Vec::new()
            }
        };

        info!(
            "{} loader versions for Minecraft {}: {}",
            self.kind,
            minecraft_version,
            versions.len()
        );
        Ok(versions)
    }
}
