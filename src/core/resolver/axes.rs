use async_trait::async_trait;

use crate::core::error::UpdaterResult;
use crate::core::loaders::{LoaderKind, LoaderRegistry};
use crate::core::version::VersionManifest;

/// Candidate lists for the engine and loader axes, in registry order.
#[async_trait]
pub trait VersionAxes: Send + Sync {
    fn loader_kind(&self) -> LoaderKind;

    /// Whether the engine registry lists `version` at all.
    async fn engine_exists(&self, version: &str) -> UpdaterResult<bool>;

    /// Releases strictly newer than `current`, newest first.
    async fn engine_candidates(&self, current: &str) -> UpdaterResult<Vec<String>>;

    /// Loader versions supporting `engine_version`, newest first.
    async fn loader_candidates(&self, engine_version: &str) -> UpdaterResult<Vec<String>>;
}

/// The live Mojang manifest plus a loader meta service.
pub struct RemoteAxes {
    client: reqwest::Client,
    manifest_url: String,
    loaders: LoaderRegistry,
}

impl RemoteAxes {
    pub fn new(client: reqwest::Client, manifest_url: String, loaders: LoaderRegistry) -> Self {
        Self {
            client,
            manifest_url,
            loaders,
        }
    }
}

#[async_trait]
impl VersionAxes for RemoteAxes {
    fn loader_kind(&self) -> LoaderKind {
        self.loaders.kind()
    }

    async fn engine_exists(&self, version: &str) -> UpdaterResult<bool> {
        Ok(VersionManifest::fetch(&self.client, &self.manifest_url)
            .await?
            .found()
            .is_some_and(|m| m.find_version(version).is_some()))
    }

    async fn engine_candidates(&self, current: &str) -> UpdaterResult<Vec<String>> {
        Ok(VersionManifest::fetch(&self.client, &self.manifest_url)
            .await?
            .found()
            .map(|m| m.releases_newer_than(current).newer)
            .unwrap_or_default())
    }

    async fn loader_candidates(&self, engine_version: &str) -> UpdaterResult<Vec<String>> {
        self.loaders.versions_for(engine_version).await
    }
}
