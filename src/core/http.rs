use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::core::error::{UpdaterError, UpdaterResult};

pub const APP_USER_AGENT: &str = "minecraft-server-manager/1.0";

/// Per-request budget for registry metadata lookups.
pub const METADATA_TIMEOUT: Duration = Duration::from_secs(10);

/// Per-request budget for binary artifact transfers.
pub const TRANSFER_TIMEOUT: Duration = Duration::from_secs(60);

pub fn build_http_client() -> Result<Client, reqwest::Error> {
    let mut default_headers = HeaderMap::new();
    default_headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("identity"));

    Client::builder()
        .user_agent(APP_USER_AGENT)
        .default_headers(default_headers)
        .build()
}

/// Outcome of a registry lookup that reached the server.
///
/// A 404 is an answer, not a failure: the registry says the thing does not
/// exist. Everything else that goes wrong is `UpdaterError::Unavailable`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
}

impl<T> Lookup<T> {
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::NotFound => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        match self {
            Lookup::Found(value) => Lookup::Found(f(value)),
            Lookup::NotFound => Lookup::NotFound,
        }
    }
}

/// GET `url` and decode the JSON body under the metadata timeout.
pub async fn fetch_json<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    query: &[(&str, &str)],
    headers: &[(&str, &str)],
) -> UpdaterResult<Lookup<T>> {
    let mut request = client.get(url).timeout(METADATA_TIMEOUT);
    if !query.is_empty() {
        request = request.query(query);
    }
    for (name, value) in headers {
        request = request.header(*name, *value);
    }

    let response = request
        .send()
        .await
        .map_err(|e| UpdaterError::unavailable(url, e))?;

    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        debug!("{} -> 404", url);
        return Ok(Lookup::NotFound);
    }
    if !status.is_success() {
        return Err(UpdaterError::unavailable(url, format!("HTTP {}", status)));
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| UpdaterError::unavailable(url, e))?;

    serde_json::from_slice(&body)
        .map(Lookup::Found)
        .map_err(|e| UpdaterError::unavailable(url, format!("malformed payload: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize, PartialEq)]
    struct Payload {
        value: u32,
    }

    #[tokio::test]
    async fn not_found_is_a_distinct_empty_answer() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = build_http_client().unwrap();
        let url = format!("{}/missing", server.uri());
        let result: Lookup<Payload> = fetch_json(&client, &url, &[], &[]).await.unwrap();
        assert_eq!(result, Lookup::NotFound);
    }

    #[tokio::test]
    async fn server_errors_and_bad_payloads_are_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/boom"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/garbage"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = build_http_client().unwrap();
        for route in ["boom", "garbage"] {
            let url = format!("{}/{}", server.uri(), route);
            let result = fetch_json::<Payload>(&client, &url, &[], &[]).await;
            assert!(matches!(result, Err(UpdaterError::Unavailable { .. })));
        }
    }

    #[tokio::test]
    async fn sends_query_and_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data"))
            .and(query_param("gameVersion", "1.21.1"))
            .and(header("x-api-key", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"value": 7}"#))
            .mount(&server)
            .await;

        let client = build_http_client().unwrap();
        let url = format!("{}/data", server.uri());
        let result: Lookup<Payload> = fetch_json(
            &client,
            &url,
            &[("gameVersion", "1.21.1")],
            &[("x-api-key", "secret")],
        )
        .await
        .unwrap();
        assert_eq!(result, Lookup::Found(Payload { value: 7 }));
    }
}
