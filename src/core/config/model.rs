use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::error::{UpdaterError, UpdaterResult};
use crate::core::loaders::LoaderKind;

/// `config.yaml`: what the server runs today and which mods it carries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub minecraft: MinecraftSection,
    #[serde(alias = "fabric")]
    pub loader: LoaderSection,
    #[serde(default)]
    pub mods: Vec<ModSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinecraftSection {
    pub version: String,
    #[serde(default = "default_engine_source")]
    pub source: String,
}

fn default_engine_source() -> String {
    "mojang".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderSection {
    pub version: String,
    /// Doubles as the source-mapping key (`fabric`, `quilt`).
    #[serde(default)]
    pub source: LoaderKind,
}

/// Where a mod's artifacts come from.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ModSourceKind {
    /// Modrinth, keyless.
    #[default]
    Modrinth,
    /// CurseForge, needs an API key.
    Curseforge,
    /// A fixed download URL.
    Custom,
}

impl ModSourceKind {
    /// Key into `source_mappings.yaml`.
    pub fn id(&self) -> &'static str {
        match self {
            ModSourceKind::Modrinth => "modrinth",
            ModSourceKind::Curseforge => "curseforge",
            ModSourceKind::Custom => "custom",
        }
    }
}

impl std::fmt::Display for ModSourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Which side of the game a mod must be installed on.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Client,
    Server,
    #[default]
    Both,
}

impl Environment {
    /// Classify from Modrinth-style side support (`required` / `optional` /
    /// `unsupported`). Unrecognised combinations stay `Both`.
    pub fn from_side_support(client_side: &str, server_side: &str) -> Self {
        let supported = |side: &str| side == "required" || side == "optional";

        match (supported(client_side), supported(server_side)) {
            (true, true) => Environment::Both,
            (true, false) if server_side == "unsupported" => Environment::Client,
            (false, true) if client_side == "unsupported" => Environment::Server,
            _ => Environment::Both,
        }
    }

    pub fn on_server(&self) -> bool {
        matches!(self, Environment::Server | Environment::Both)
    }

    pub fn on_client(&self) -> bool {
        matches!(self, Environment::Client | Environment::Both)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Client => write!(f, "client"),
            Environment::Server => write!(f, "server"),
            Environment::Both => write!(f, "both"),
        }
    }
}

/// One configured mod.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default)]
    pub source: ModSourceKind,
    /// Modrinth slug override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<Environment>,
}

impl ModSpec {
    pub fn new(name: impl Into<String>, source: ModSourceKind) -> Self {
        Self {
            name: name.into(),
            version: None,
            source,
            slug: None,
            project_id: None,
            file_id: None,
            download_url: None,
            environment: None,
        }
    }

    pub fn environment(&self) -> Environment {
        self.environment.unwrap_or_default()
    }
}

impl ServerConfig {
    pub async fn load(path: &Path) -> UpdaterResult<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| UpdaterError::io(path, e))?;
        let config = Self::parse(&raw).map_err(|source| UpdaterError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;

        info!(
            "Loaded {:?}: Minecraft {}, {} {}, {} mod(s)",
            path,
            config.minecraft.version,
            config.loader.source,
            config.loader.version,
            config.mods.len()
        );
        Ok(config)
    }

    pub fn parse(raw: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(raw)
    }

    /// Whole-document rewrite; comments in the original file are not kept.
    pub async fn save(&self, path: &Path) -> UpdaterResult<()> {
        let yaml = serde_yaml::to_string(self).map_err(|source| UpdaterError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;
        tokio::fs::write(path, yaml)
            .await
            .map_err(|e| UpdaterError::io(path, e))
    }
}
