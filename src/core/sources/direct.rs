use async_trait::async_trait;

use super::{ModProvider, ModQuery, ModResolution, Resolution, UnresolvedReason, ARTIFACT_EXTENSION};
use crate::core::config::{ModSourceKind, ModSpec};

/// Label used when a direct link carries no declared version.
const UNVERSIONED: &str = "direct";

/// A fixed download URL. No registry is consulted, so the link fits any
/// (game, loader) pair as far as the resolver can tell.
pub struct DirectSource;

/// Last path segment of `url` (query and fragment dropped), or
/// `<mod_name>.jar` when that segment is not a jar.
pub fn file_name_from_url(url: &str, mod_name: &str) -> String {
    let without_query = url.split(['?', '#']).next().unwrap_or(url);
    let segment = without_query.rsplit('/').next().unwrap_or_default();
    let suffix = format!(".{}", ARTIFACT_EXTENSION);

    if segment.len() > suffix.len() && segment.ends_with(&suffix) {
        segment.to_string()
    } else {
        format!("{}{}", mod_name, suffix)
    }
}

#[async_trait]
impl ModProvider for DirectSource {
    async fn resolve(&self, spec: &ModSpec, _query: &ModQuery<'_>) -> Resolution {
        let url = spec
            .download_url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .ok_or(UnresolvedReason::MissingParameter("download_url"))?;

        Ok(ModResolution {
            mod_name: spec.name.clone(),
            version: spec.version.clone().unwrap_or_else(|| UNVERSIONED.to_string()),
            download_url: url.to_string(),
            file_name: file_name_from_url(url, &spec.name),
            provider: ModSourceKind::Custom,
            project_id: None,
            environment: None,
            file_id: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::loaders::LoaderKind;

    #[test]
    fn filename_comes_from_last_segment() {
        assert_eq!(
            file_name_from_url("https://example.com/files/tweaks-1.0.jar?token=abc", "tweaks"),
            "tweaks-1.0.jar"
        );
    }

    #[test]
    fn non_jar_segment_falls_back_to_mod_name() {
        assert_eq!(
            file_name_from_url("https://example.com/download?id=42", "tweaks"),
            "tweaks.jar"
        );
        assert_eq!(file_name_from_url("https://example.com/files/", "tweaks"), "tweaks.jar");
        assert_eq!(file_name_from_url("https://example.com/.jar", "tweaks"), "tweaks.jar");
    }

    #[tokio::test]
    async fn declared_url_is_authoritative() {
        let mut spec = ModSpec::new("tweaks", ModSourceKind::Custom);
        spec.download_url = Some("https://example.com/files/tweaks-1.0.jar".into());
        let query = ModQuery::latest("1.99", LoaderKind::Quilt, "9.9.9");

        let resolved = DirectSource.resolve(&spec, &query).await.unwrap();
        assert_eq!(resolved.download_url, "https://example.com/files/tweaks-1.0.jar");
        assert_eq!(resolved.version, "direct");
        assert_eq!(resolved.provider, ModSourceKind::Custom);
    }

    #[tokio::test]
    async fn missing_url_is_unresolved() {
        let spec = ModSpec::new("tweaks", ModSourceKind::Custom);
        let query = ModQuery::latest("1.21.1", LoaderKind::Fabric, "0.16.5");
        assert_eq!(
            DirectSource.resolve(&spec, &query).await,
            Err(UnresolvedReason::MissingParameter("download_url"))
        );
    }
}
