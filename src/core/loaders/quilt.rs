/// Quilt Meta mirrors Fabric Meta's loader listing under `/v3`.
pub const QUILT_META_BASE: &str = "https://meta.quiltmc.org/v3";

pub fn versions_url_template() -> String {
    format!("{}/versions/loader/{{minecraft_version}}", QUILT_META_BASE)
}
