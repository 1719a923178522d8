// src/sources/twitter.rs

//! Twitter/X list timelines as a post source.
//!
//! Authenticates app-only: the api key and secret are exchanged once for a
//! bearer token, which then reads `GET /2/lists/{id}/tweets`.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::{CollectionConfig, Link, Post, SourceConfig, Timeline};
use crate::sources::{PostSource, SourceCredentials};

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Default, Deserialize)]
struct ListTweetsResponse {
    #[serde(default)]
    data: Vec<ApiTweet>,
    #[serde(default)]
    errors: Vec<ApiProblem>,
}

#[derive(Debug, Deserialize)]
struct ApiTweet {
    id: String,
    text: String,
    #[serde(default)]
    entities: Option<ApiEntities>,
    /// Present on long-form posts; `text` is then truncated
    #[serde(default)]
    note_tweet: Option<ApiNoteTweet>,
}

#[derive(Debug, Deserialize)]
struct ApiNoteTweet {
    text: String,
    #[serde(default)]
    entities: Option<ApiEntities>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiEntities {
    #[serde(default)]
    urls: Vec<ApiUrl>,
}

#[derive(Debug, Deserialize)]
struct ApiUrl {
    url: String,
    #[serde(default)]
    expanded_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiProblem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    detail: String,
}

impl ApiTweet {
    fn into_post(self) -> Post {
        let (text, entities) = match self.note_tweet {
            Some(note) => (note.text, note.entities),
            None => (self.text, self.entities),
        };
        let links = entities
            .unwrap_or_default()
            .urls
            .into_iter()
            .filter_map(|u| {
                u.expanded_url.map(|expanded| Link {
                    short: u.url,
                    expanded,
                })
            })
            .collect();
        Post {
            id: self.id,
            text,
            links,
        }
    }
}

/// Post source reading list timelines.
pub struct TwitterSource {
    client: Client,
    api_base: String,
    bearer: String,
}

impl TwitterSource {
    /// Exchange credentials for a bearer token and build the source.
    pub async fn connect(
        client: Client,
        config: &SourceConfig,
        credentials: &SourceCredentials,
    ) -> Result<Self> {
        let api_base = config.api_base.trim_end_matches('/').to_string();
        let response = client
            .post(format!("{api_base}/oauth2/token"))
            .basic_auth(&credentials.api_key, Some(&credentials.api_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| AppError::post_source("oauth2/token", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::post_source(
                "oauth2/token",
                format!("{status}: {body}"),
            ));
        }
        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::post_source("oauth2/token", e))?;

        Ok(Self::with_bearer(client, api_base, token.access_token))
    }

    /// Build a source from an existing bearer token.
    pub fn with_bearer(
        client: Client,
        api_base: impl Into<String>,
        bearer: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_base: api_base.into(),
            bearer: bearer.into(),
        }
    }
}

#[async_trait]
impl PostSource for TwitterSource {
    async fn fetch_timeline(
        &self,
        collection: &CollectionConfig,
        max_results: usize,
    ) -> Result<Timeline> {
        if collection.list_id.is_empty() {
            return Err(AppError::post_source(&collection.name, "list_id is not set"));
        }

        let url = format!("{}/2/lists/{}/tweets", self.api_base, collection.list_id);
        let max = max_results.to_string();
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.bearer)
            .query(&[
                ("max_results", max.as_str()),
                ("tweet.fields", "entities,note_tweet"),
            ])
            .send()
            .await
            .map_err(|e| AppError::post_source(&collection.name, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::post_source(
                &collection.name,
                format!("{status}: {body}"),
            ));
        }

        let page: ListTweetsResponse = response
            .json()
            .await
            .map_err(|e| AppError::post_source(&collection.name, e))?;

        if page.data.is_empty() && !page.errors.is_empty() {
            let problems: Vec<String> = page
                .errors
                .iter()
                .map(|p| format!("{}: {}", p.title, p.detail))
                .collect();
            return Err(AppError::post_source(&collection.name, problems.join("; ")));
        }

        let timeline = Timeline::from_posts(page.data.into_iter().map(ApiTweet::into_post));
        log::info!(
            "Fetched {} posts for collection {}",
            timeline.len(),
            collection.name
        );
        Ok(timeline)
    }
}
