//! Utility functions and helpers.

pub mod http;

use crate::error::{AppError, Result};
use crate::models::{Config, SecretsConfig};
use crate::sources::{SecretSource, SourceCredentials, StoreToken};

/// Fetch and decode both secrets concurrently.
pub async fn load_credentials(
    secrets: &dyn SecretSource,
    names: &SecretsConfig,
) -> Result<(StoreToken, SourceCredentials)> {
    let (token, credentials) = tokio::try_join!(
        secrets.fetch(&names.store_token),
        secrets.fetch(&names.source_credentials)
    )?;
    Ok((
        StoreToken::parse(&names.store_token, &token)?,
        SourceCredentials::parse(&names.source_credentials, &credentials, &names.delimiter)?,
    ))
}

/// Load a config file if given, otherwise defaults, then validate.
pub fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load(path)
            .map_err(|e| AppError::config(format!("{}: {e}", path.display())))?,
        None => Config::default(),
    };
    config.validate()?;
    Ok(config)
}
