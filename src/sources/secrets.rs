//! Secret retrieval and credential decoding.

use async_trait::async_trait;

use crate::error::{AppError, Result};

/// Trait for secret backends.
#[async_trait]
pub trait SecretSource: Send + Sync {
    /// Fetch the raw payload of a named secret.
    async fn fetch(&self, name: &str) -> Result<Vec<u8>>;
}

/// Reads secrets from environment variables.
///
/// `postfeed/store-token` is looked up as `POSTFEED_STORE_TOKEN`.
#[derive(Debug, Clone, Default)]
pub struct EnvSecrets;

impl EnvSecrets {
    pub fn variable_name(name: &str) -> String {
        name.chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect()
    }
}

#[async_trait]
impl SecretSource for EnvSecrets {
    async fn fetch(&self, name: &str) -> Result<Vec<u8>> {
        let var = Self::variable_name(name);
        std::env::var(&var)
            .map(String::into_bytes)
            .map_err(|e| AppError::secret(name, format!("{var}: {e}")))
    }
}

/// Reads secrets from AWS Secrets Manager.
#[cfg(feature = "lambda")]
pub struct AwsSecrets {
    client: aws_sdk_secretsmanager::Client,
}

#[cfg(feature = "lambda")]
impl AwsSecrets {
    pub fn new(client: aws_sdk_secretsmanager::Client) -> Self {
        Self { client }
    }

    /// Create from the ambient AWS configuration.
    pub async fn from_env() -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(aws_sdk_secretsmanager::Client::new(&config))
    }
}

#[cfg(feature = "lambda")]
#[async_trait]
impl SecretSource for AwsSecrets {
    async fn fetch(&self, name: &str) -> Result<Vec<u8>> {
        let output = self
            .client
            .get_secret_value()
            .secret_id(name)
            .send()
            .await
            .map_err(|e| AppError::secret(name, e.into_service_error()))?;

        if let Some(text) = output.secret_string() {
            return Ok(text.as_bytes().to_vec());
        }
        output
            .secret_binary()
            .map(|blob| blob.as_ref().to_vec())
            .ok_or_else(|| AppError::secret(name, "secret has no payload"))
    }
}

/// Access token for the content store.
#[derive(Clone, PartialEq, Eq)]
pub struct StoreToken(pub String);

impl StoreToken {
    pub fn parse(name: &str, payload: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(payload).map_err(|e| AppError::secret(name, e))?;
        let token = text.trim();
        if token.is_empty() {
            return Err(AppError::secret(name, "token is empty"));
        }
        Ok(Self(token.to_string()))
    }
}

impl std::fmt::Debug for StoreToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StoreToken(***)")
    }
}

/// The four post-source credential fields.
#[derive(Clone, PartialEq, Eq)]
pub struct SourceCredentials {
    pub api_key: String,
    pub api_secret: String,
    pub access_token: String,
    pub access_secret: String,
}

impl SourceCredentials {
    pub fn parse(name: &str, payload: &[u8], delimiter: &str) -> Result<Self> {
        let text = std::str::from_utf8(payload).map_err(|e| AppError::secret(name, e))?;
        let fields: Vec<&str> = text.trim().split(delimiter).map(str::trim).collect();

        match fields.as_slice() {
            [api_key, api_secret, access_token, access_secret]
                if fields.iter().all(|f| !f.is_empty()) =>
            {
                Ok(Self {
                    api_key: api_key.to_string(),
                    api_secret: api_secret.to_string(),
                    access_token: access_token.to_string(),
                    access_secret: access_secret.to_string(),
                })
            }
            _ => Err(AppError::secret(
                name,
                format!(
                    "expected 4 non-empty fields separated by {delimiter:?}, found {}",
                    fields.len()
                ),
            )),
        }
    }
}

impl std::fmt::Debug for SourceCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceCredentials")
            .field("api_key", &self.api_key)
            .finish_non_exhaustive()
    }
}
