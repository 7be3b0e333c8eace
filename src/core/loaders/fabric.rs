use serde::Deserialize;

pub const FABRIC_META_BASE: &str = "https://meta.fabricmc.net/v2";

/// Installer version baked into the default server launcher URL.
pub const FABRIC_INSTALLER_VERSION: &str = "1.0.1";

/// Loader versions for one game version, newest first.
pub fn versions_url_template() -> String {
    format!("{}/versions/loader/{{minecraft_version}}", FABRIC_META_BASE)
}

/// Executable server launcher for a (game, loader) pair.
pub fn server_jar_url_template() -> String {
    format!(
        "{}/versions/loader/{{minecraft_version}}/{{version}}/{}/server/jar",
        FABRIC_META_BASE, FABRIC_INSTALLER_VERSION
    )
}

/// One row of `/versions/loader/<mc>`. Quilt Meta uses the same shape.
#[derive(Debug, Deserialize)]
pub struct LoaderEntry {
    #[serde(default)]
    pub loader: LoaderVersion,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoaderVersion {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub stable: Option<bool>,
}

/// Keep registry order; rows without a version are dropped.
pub fn loader_versions(entries: Vec<LoaderEntry>) -> Vec<String> {
    entries
        .into_iter()
        .map(|e| e.loader.version)
        .filter(|v| !v.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_meta_rows_in_order() {
        let json = r#"[
            {"loader": {"separator": ".", "build": 10, "maven": "net.fabricmc:fabric-loader:0.16.10", "version": "0.16.10", "stable": true},
             "intermediary": {"version": "1.21.1"}},
            {"loader": {"version": "0.16.9", "stable": true}},
            {"loader": {"version": ""}},
            {"loader": {"build": 3, "stable": false}},
            {"intermediary": {"version": "1.21.1"}},
            {"loader": {"version": "0.16.8"}}
        ]"#;
        let entries: Vec<LoaderEntry> = serde_json::from_str(json).unwrap();
        assert_eq!(loader_versions(entries), vec!["0.16.10", "0.16.9", "0.16.8"]);
    }

    #[test]
    fn templates_carry_placeholders() {
        assert!(versions_url_template().ends_with("/versions/loader/{minecraft_version}"));
        assert!(server_jar_url_template().contains("{minecraft_version}/{version}/"));
    }
}
