use std::path::Path;

use futures_util::StreamExt;
use reqwest::Client;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::core::error::{UpdaterError, UpdaterResult};
use crate::core::http::TRANSFER_TIMEOUT;

/// Sequential artifact downloader. One transfer at a time, no retries.
pub struct Downloader {
    client: Client,
}

impl Downloader {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    // ── Single file download ────────────────────────────

    /// Stream `url` into `dest`, creating parent directories as needed.
    ///
    /// On any failure after the file was created the partial file is
    /// removed, so a later existence check never mistakes it for a
    /// finished artifact. Returns the number of bytes written.
    pub async fn download_file(&self, url: &str, dest: &Path) -> UpdaterResult<u64> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| UpdaterError::io(parent, e))?;
        }

        let response = self
            .client
            .get(url)
            .timeout(TRANSFER_TIMEOUT)
            .send()
            .await
            .map_err(|e| UpdaterError::unavailable(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpdaterError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let result = Self::write_body(response, url, dest).await;
        if result.is_err() {
            if let Err(e) = tokio::fs::remove_file(dest).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!("Could not remove partial file {:?}: {}", dest, e);
                }
            }
        }
        result
    }

    async fn write_body(response: reqwest::Response, url: &str, dest: &Path) -> UpdaterResult<u64> {
        // file handle is dropped at the end of this block before any cleanup
        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(|e| UpdaterError::io(dest, e))?;

        let mut written = 0u64;
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| UpdaterError::unavailable(url, e))?;
            file.write_all(&chunk)
                .await
                .map_err(|e| UpdaterError::io(dest, e))?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(|e| UpdaterError::io(dest, e))?;

        debug!("Downloaded: {} -> {:?} ({} bytes)", url, dest, written);
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::http::build_http_client;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn streams_into_nested_destination() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/server.jar"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![7u8; 4096]))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("a/b/server.jar");
        let downloader = Downloader::new(build_http_client().unwrap());

        let written = downloader
            .download_file(&format!("{}/server.jar", server.uri()), &dest)
            .await
            .unwrap();
        assert_eq!(written, 4096);
        assert_eq!(std::fs::read(&dest).unwrap().len(), 4096);
    }

    #[tokio::test]
    async fn http_error_leaves_no_file_behind() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("mods/blocked.jar");
        let downloader = Downloader::new(build_http_client().unwrap());

        let err = downloader
            .download_file(&format!("{}/blocked.jar", server.uri()), &dest)
            .await
            .unwrap_err();
        assert!(matches!(err, UpdaterError::DownloadFailed { status: 403, .. }));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn unreachable_host_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("x.jar");
        let downloader = Downloader::new(build_http_client().unwrap());

        // port 9 (discard) is closed on test hosts
        let err = downloader
            .download_file("http://127.0.0.1:9/x.jar", &dest)
            .await
            .unwrap_err();
        assert!(matches!(err, UpdaterError::Unavailable { .. }));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn truncated_body_removes_partial_file() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await;
            socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100000\r\n\r\n")
                .await
                .unwrap();
            socket.write_all(&[1u8; 5000]).await.unwrap();
            socket.flush().await.unwrap();
        });

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("mods/cut.jar");
        let downloader = Downloader::new(build_http_client().unwrap());

        let err = downloader
            .download_file(&format!("http://{}/cut.jar", addr), &dest)
            .await
            .unwrap_err();
        assert!(matches!(err, UpdaterError::Unavailable { .. }));
        assert!(!dest.exists());
    }
}
