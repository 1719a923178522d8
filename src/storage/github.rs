//! GitHub contents API storage implementation.
//!
//! The artifact lives in a repository file. Reads return the blob `sha`
//! as the version token; writes send it back, and GitHub answers `409`
//! when the file moved on in the meantime.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::StoreConfig;
use crate::storage::{ContentStore, StoredContent};

#[derive(Debug, Deserialize)]
struct ContentResponse {
    #[serde(default)]
    content: String,
    #[serde(default)]
    encoding: Option<String>,
    sha: String,
}

#[derive(Debug, Serialize)]
struct UpdateRequest<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
    branch: &'a str,
}

#[derive(Debug, Deserialize)]
struct UpdateResponse {
    commit: CommitRef,
}

#[derive(Debug, Deserialize)]
struct CommitRef {
    sha: String,
}

/// Repository-file backed content store.
pub struct GitHubStore {
    client: Client,
    token: String,
    url: String,
    branch: String,
}

impl GitHubStore {
    pub fn new(client: Client, config: &StoreConfig, token: impl Into<String>) -> Result<Self> {
        if config.owner.is_empty() || config.repo.is_empty() {
            return Err(AppError::config("store.owner and store.repo must be set"));
        }
        let url = format!(
            "{}/repos/{}/{}/contents/{}",
            config.api_base.trim_end_matches('/'),
            config.owner,
            config.repo,
            config.path.trim_start_matches('/')
        );
        Ok(Self {
            client,
            token: token.into(),
            url,
            branch: config.branch.clone(),
        })
    }

    fn request(&self, method: reqwest::Method) -> reqwest::RequestBuilder {
        self.client
            .request(method, &self.url)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .bearer_auth(&self.token)
    }
}

#[async_trait]
impl ContentStore for GitHubStore {
    async fn read(&self) -> Result<Option<StoredContent>> {
        let response = self
            .request(reqwest::Method::GET)
            .query(&[("ref", self.branch.as_str())])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            log::info!("No existing artifact at {}", self.location());
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::store(format!("GET {} returned {status}: {body}", self.url)));
        }

        let file: ContentResponse = response.json().await?;
        if file.encoding.as_deref().is_some_and(|e| e != "base64") {
            return Err(AppError::store(format!(
                "{} has unsupported encoding {:?}",
                self.location(),
                file.encoding
            )));
        }

        // The API wraps base64 at 60 columns.
        let clean: String = file.content.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = STANDARD.decode(clean)?;

        Ok(Some(StoredContent {
            bytes,
            version: file.sha,
        }))
    }

    async fn write(&self, bytes: &[u8], version: Option<&str>, message: &str) -> Result<String> {
        let body = UpdateRequest {
            message,
            content: STANDARD.encode(bytes),
            sha: version,
            branch: &self.branch,
        };

        let response = self
            .request(reqwest::Method::PUT)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::CONFLICT {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::StaleVersion(format!("{}: {body}", self.location())));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::store(format!("PUT {} returned {status}: {body}", self.url)));
        }

        let update: UpdateResponse = response.json().await?;
        log::info!("Committed {} as {}", self.location(), update.commit.sha);
        Ok(update.commit.sha)
    }

    fn location(&self) -> String {
        format!("{}@{}", self.url, self.branch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn store(server: &MockServer) -> GitHubStore {
        let config = StoreConfig {
            api_base: server.uri(),
            owner: "org".into(),
            repo: "site".into(),
            path: "data/posts.json".into(),
            ..StoreConfig::default()
        };
        GitHubStore::new(Client::new(), &config, "secret-token").unwrap()
    }

    const CONTENT_PATH: &str = "/repos/org/site/contents/data/posts.json";

    #[tokio::test]
    async fn test_read_decodes_wrapped_base64() {
        let server = MockServer::start().await;
        let encoded = STANDARD.encode(br#"{"hashes":["abc"]}"#);
        let wrapped = format!("{}\n{}\n", &encoded[..10], &encoded[10..]);

        Mock::given(method("GET"))
            .and(path(CONTENT_PATH))
            .and(query_param("ref", "main"))
            .and(header("authorization", "Bearer secret-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": wrapped,
                "encoding": "base64",
                "sha": "v1"
            })))
            .mount(&server)
            .await;

        let stored = store(&server).read().await.unwrap().unwrap();
        assert_eq!(stored.version, "v1");
        assert_eq!(stored.bytes, br#"{"hashes":["abc"]}"#);
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(CONTENT_PATH))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        assert!(store(&server).read().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_write_sends_version_token() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(CONTENT_PATH))
            .and(body_partial_json(serde_json::json!({
                "sha": "v1",
                "branch": "main",
                "message": "update",
                "content": STANDARD.encode(b"{}")
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": { "sha": "v2" },
                "commit": { "sha": "c0ffee" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let commit = store(&server).write(b"{}", Some("v1"), "update").await.unwrap();
        assert_eq!(commit, "c0ffee");
    }

    #[tokio::test]
    async fn test_write_conflict_is_stale_version() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(CONTENT_PATH))
            .respond_with(ResponseTemplate::new(409).set_body_string("sha mismatch"))
            .mount(&server)
            .await;

        let err = store(&server).write(b"{}", Some("old"), "update").await.unwrap_err();
        assert!(matches!(err, AppError::StaleVersion(_)));
    }

    #[test]
    fn test_new_requires_repository() {
        let result = GitHubStore::new(Client::new(), &StoreConfig::default(), "t");
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
