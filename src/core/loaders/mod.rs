pub mod fabric;
pub mod quilt;
pub mod registry;

use serde::{Deserialize, Serialize};

pub use registry::LoaderRegistry;

/// Supported server-side mod loaders.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LoaderKind {
    #[default]
    Fabric,
    Quilt,
}

impl LoaderKind {
    /// Loader id as Modrinth lists it in a version's `loaders`.
    pub fn id(&self) -> &'static str {
        match self {
            LoaderKind::Fabric => "fabric",
            LoaderKind::Quilt => "quilt",
        }
    }

    /// Free-text tag CurseForge mixes into `gameVersions`.
    pub fn display_tag(&self) -> &'static str {
        match self {
            LoaderKind::Fabric => "Fabric",
            LoaderKind::Quilt => "Quilt",
        }
    }

    pub fn default_versions_url(&self) -> String {
        match self {
            LoaderKind::Fabric => fabric::versions_url_template(),
            LoaderKind::Quilt => quilt::versions_url_template(),
        }
    }

    /// Download template for the loader's server artifact, if one is public.
    pub fn default_server_jar_url(&self) -> Option<String> {
        match self {
            LoaderKind::Fabric => Some(fabric::server_jar_url_template()),
            LoaderKind::Quilt => None,
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "fabric" => Some(LoaderKind::Fabric),
            "quilt" => Some(LoaderKind::Quilt),
            _ => None,
        }
    }
}

impl std::fmt::Display for LoaderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_tag())
    }
}
