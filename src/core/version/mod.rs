pub mod compare;
pub mod manifest;
pub mod server;

pub use compare::{compare_versions, is_newer};
pub use manifest::{ReleaseScan, VersionEntry, VersionManifest, VERSION_MANIFEST_URL};
pub use server::resolve_server_jar;
