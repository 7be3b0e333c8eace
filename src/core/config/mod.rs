pub mod dotenv;
pub mod mappings;
pub mod model;
pub mod validate;

pub use mappings::{fill_template, SourceMapping, SourceMappings};
pub use model::{Environment, LoaderSection, MinecraftSection, ModSourceKind, ModSpec, ServerConfig};
pub use validate::{ConfigValidator, ValidationReport};

pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";
pub const DEFAULT_MAPPINGS_FILE: &str = "source_mappings.yaml";
pub const CURSEFORGE_API_KEY_VAR: &str = "CURSEFORGE_API_KEY";
