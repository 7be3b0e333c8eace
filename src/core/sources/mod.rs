// ─── Mod Sources ───
// One resolution contract, one implementation per place mods are published.

pub mod curseforge;
pub mod direct;
pub mod modrinth;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::config::{Environment, ModSourceKind, ModSpec, SourceMappings};
use crate::core::loaders::LoaderKind;

pub use curseforge::CurseForgeSource;
pub use direct::DirectSource;
pub use modrinth::ModrinthSource;

/// File extension every mod artifact is expected to carry.
pub const ARTIFACT_EXTENSION: &str = "jar";

/// A concrete artifact chosen for one mod.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModResolution {
    pub mod_name: String,
    pub version: String,
    pub download_url: String,
    pub file_name: String,
    pub provider: ModSourceKind,
    /// Registry project the artifact came from (slug, numeric id).
    #[serde(default)]
    pub project_id: Option<String>,
    /// Side support reported by the registry, when it reports one.
    #[serde(default)]
    pub environment: Option<Environment>,
    #[serde(default)]
    pub file_id: Option<u64>,
}

/// Why a provider could not produce a resolution. None of these abort a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnresolvedReason {
    /// The registry says the project does not exist.
    NotFound,
    /// The project exists but no file matches the game version and loader.
    NoCompatibleVersion,
    CredentialMissing,
    MissingParameter(&'static str),
    /// Transport or protocol failure, scoped to this one mod.
    Unavailable(String),
}

impl std::fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnresolvedReason::NotFound => write!(f, "project not found"),
            UnresolvedReason::NoCompatibleVersion => write!(f, "no compatible version"),
            UnresolvedReason::CredentialMissing => write!(f, "API key not set"),
            UnresolvedReason::MissingParameter(name) => write!(f, "missing '{}'", name),
            UnresolvedReason::Unavailable(msg) => write!(f, "registry unavailable: {}", msg),
        }
    }
}

pub type Resolution = Result<ModResolution, UnresolvedReason>;

/// The (game, loader) pair a mod must fit, plus an optional version pin.
#[derive(Debug, Clone, Copy)]
pub struct ModQuery<'a> {
    pub minecraft_version: &'a str,
    pub loader: LoaderKind,
    pub loader_version: &'a str,
    /// `Some` resolves exactly the configured version; `None` takes the
    /// newest compatible one.
    pub pinned_version: Option<&'a str>,
}

impl<'a> ModQuery<'a> {
    pub fn latest(minecraft_version: &'a str, loader: LoaderKind, loader_version: &'a str) -> Self {
        Self {
            minecraft_version,
            loader,
            loader_version,
            pinned_version: None,
        }
    }

    pub fn pinned(mut self, version: Option<&'a str>) -> Self {
        self.pinned_version = version;
        self
    }
}

#[async_trait]
pub trait ModProvider: Send + Sync {
    async fn resolve(&self, spec: &ModSpec, query: &ModQuery<'_>) -> Resolution;

    /// Whether the registry knows the mod's project at all. Providers
    /// without a project endpoint report `true`.
    async fn project_exists(&self, _spec: &ModSpec) -> Result<bool, UnresolvedReason> {
        Ok(true)
    }
}

/// Routes each mod to the provider its `source` names.
pub struct ModSources {
    modrinth: ModrinthSource,
    curseforge: CurseForgeSource,
    direct: DirectSource,
}

impl ModSources {
    pub fn new(
        client: reqwest::Client,
        mappings: &SourceMappings,
        curseforge_api_key: Option<String>,
    ) -> Self {
        Self {
            modrinth: ModrinthSource::from_mapping(client.clone(), mappings.get("modrinth")),
            curseforge: CurseForgeSource::from_mapping(
                client,
                mappings.get("curseforge"),
                curseforge_api_key,
            ),
            direct: DirectSource,
        }
    }

    pub fn curseforge(&self) -> &CurseForgeSource {
        &self.curseforge
    }
}

#[async_trait]
impl ModProvider for ModSources {
    async fn resolve(&self, spec: &ModSpec, query: &ModQuery<'_>) -> Resolution {
        match spec.source {
            ModSourceKind::Modrinth => self.modrinth.resolve(spec, query).await,
            ModSourceKind::Curseforge => self.curseforge.resolve(spec, query).await,
            ModSourceKind::Custom => self.direct.resolve(spec, query).await,
        }
    }

    async fn project_exists(&self, spec: &ModSpec) -> Result<bool, UnresolvedReason> {
        match spec.source {
            ModSourceKind::Curseforge => self.curseforge.project_exists(spec).await,
            ModSourceKind::Modrinth | ModSourceKind::Custom => Ok(true),
        }
    }
}
