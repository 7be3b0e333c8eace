// ─── Server Artifact ───
// Reads the per-version document to locate the dedicated server jar.

use serde::Deserialize;
use tracing::debug;

use super::manifest::VersionManifest;
use crate::core::error::UpdaterResult;
use crate::core::http::{fetch_json, Lookup};

/// The slice of a Mojang version JSON we care about.
#[derive(Debug, Deserialize)]
pub struct VersionDocument {
    pub id: Option<String>,
    pub downloads: Option<VersionDownloads>,
}

#[derive(Debug, Deserialize)]
pub struct VersionDownloads {
    pub client: Option<DownloadArtifact>,
    pub server: Option<DownloadArtifact>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DownloadArtifact {
    pub url: String,
    #[serde(default)]
    pub size: Option<u64>,
}

impl VersionDocument {
    pub fn server_url(&self) -> Option<&str> {
        self.downloads
            .as_ref()
            .and_then(|d| d.server.as_ref())
            .map(|a| a.url.as_str())
    }
}

/// Resolve the server jar URL for `version`.
///
/// `Ok(None)` when the manifest, the version, or its server download is absent.
pub async fn resolve_server_jar(
    client: &reqwest::Client,
    manifest_url: &str,
    version: &str,
) -> UpdaterResult<Option<String>> {
    let Some(manifest) = VersionManifest::fetch(client, manifest_url).await?.found() else {
        return Ok(None);
    };
    let Some(entry) = manifest.find_version(version) else {
        debug!("Version {} not in manifest", version);
        return Ok(None);
    };

    let document = fetch_json::<VersionDocument>(client, &entry.url, &[], &[]).await?;
    Ok(match document {
        Lookup::Found(doc) => doc.server_url().map(str::to_string),
        Lookup::NotFound => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::http::build_http_client;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn version_without_server_download_has_no_url() {
        let doc: VersionDocument =
            serde_json::from_str(r#"{"id": "1.2.5", "downloads": {"client": {"url": "c"}}}"#)
                .unwrap();
        assert_eq!(doc.server_url(), None);
    }

    #[tokio::test]
    async fn follows_manifest_entry_to_server_jar() {
        let server = MockServer::start().await;
        let manifest = serde_json::json!({
            "latest": {"release": "1.21.1", "snapshot": "1.21.1"},
            "versions": [
                {"id": "1.21.1", "type": "release", "url": format!("{}/v/1.21.1.json", server.uri())}
            ]
        });
        Mock::given(method("GET"))
            .and(path("/manifest.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(manifest))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v/1.21.1.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "1.21.1",
                "downloads": {"server": {"url": "https://piston-data.example/server.jar", "size": 51627615}}
            })))
            .mount(&server)
            .await;

        let client = build_http_client().unwrap();
        let manifest_url = format!("{}/manifest.json", server.uri());

        let url = resolve_server_jar(&client, &manifest_url, "1.21.1").await.unwrap();
        assert_eq!(url.as_deref(), Some("https://piston-data.example/server.jar"));

        let missing = resolve_server_jar(&client, &manifest_url, "1.8.9").await.unwrap();
        assert_eq!(missing, None);
    }
}
