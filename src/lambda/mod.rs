// src/lambda/mod.rs

//! AWS Lambda handler for the publishing pipeline.
//!
//! Each scheduled invocation:
//! 1. Fetches the store token and post-source credentials
//! 2. Reads every collection timeline and the current artifact
//! 3. Parses, stitches and fingerprints each collection
//! 4. Publishes the artifact when a fingerprint changed
//!
//! ## Environment Variables
//!
//! - `CONFIG_PATH`: Bundled TOML config (defaults apply when unset)
//! - `STORE_OWNER`, `STORE_REPO`, `STORE_PATH`, `STORE_BRANCH`: Content store target
//! - `STORE_TOKEN_SECRET`, `SOURCE_CREDENTIALS_SECRET`: Secret names
//! - `MAX_RESULTS`: Posts requested per collection
//! - `LIST_ID_<NAME>`: List id for the collection `<name>`
//! - `RUST_LOG`: Log level (e.g., `info`, `debug`)

use lambda_runtime::{Error as LambdaError, LambdaEvent};

use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, instrument};

use crate::error::Result;
use crate::models::Config;
use crate::pipeline::{PublishOutcome, SyncOptions, SyncReport, run_sync};
use crate::sources::{AwsSecrets, TwitterSource};
use crate::storage::GitHubStore;
use crate::utils::{http, load_credentials};

/// Lambda response payload.
#[derive(Debug, Serialize, Default)]
pub struct SyncResponse {
    pub success: bool,

    /// Whether the artifact was written
    pub published: bool,

    pub dry_run: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,

    pub records: usize,

    /// Posts that produced no record
    pub post_errors: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Assembled artifact, returned on dry runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<Value>,

    pub execution_time_ms: u64,
}

impl SyncResponse {
    fn from_report(report: &SyncReport, dry_run: bool) -> Self {
        let artifact = match &report.outcome {
            PublishOutcome::DryRun(artifact) => serde_json::to_value(artifact).ok(),
            _ => None,
        };
        Self {
            success: true,
            published: report.outcome.commit().is_some(),
            dry_run,
            commit: report.outcome.commit().map(str::to_string),
            records: report.record_count(),
            post_errors: report.error_count(),
            error: None,
            artifact,
            execution_time_ms: 0,
        }
    }
}

/// Read the `dry_run` attribute; absent or unreadable means false.
pub fn dry_run_flag(payload: &Value) -> bool {
    match payload.get("dry_run").or_else(|| payload.get("dryRun")) {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(s)) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// Main Lambda handler function.
#[instrument(skip(event))]
pub async fn handler(event: LambdaEvent<Value>) -> std::result::Result<SyncResponse, LambdaError> {
    let start = std::time::Instant::now();
    let (payload, _context) = event.into_parts();
    let dry_run = dry_run_flag(&payload);

    info!("Starting sync: dry_run={}", dry_run);

    match run_lambda_sync(dry_run).await {
        Ok(report) => {
            let mut response = SyncResponse::from_report(&report, dry_run);
            response.execution_time_ms = start.elapsed().as_millis() as u64;
            info!(
                "Sync completed: {} records, {} post errors, published={} in {}ms",
                response.records, response.post_errors, response.published, response.execution_time_ms
            );
            Ok(response)
        }
        Err(e) => {
            if e.is_post_source() {
                error!("Post source API failed, nothing published: {}", e);
            } else {
                error!("Sync failed: {}", e);
            }
            Ok(SyncResponse {
                success: false,
                dry_run,
                error: Some(e.to_string()),
                execution_time_ms: start.elapsed().as_millis() as u64,
                ..Default::default()
            })
        }
    }
}

/// Internal sync logic.
async fn run_lambda_sync(dry_run: bool) -> Result<SyncReport> {
    let config = load_lambda_config()?;

    let secrets = AwsSecrets::from_env().await;
    let (token, credentials) = load_credentials(&secrets, &config.secrets).await?;

    let client = http::create_client(&config.source)?;
    let posts = TwitterSource::connect(client.clone(), &config.source, &credentials).await?;
    let store = GitHubStore::new(client, &config.store, token.0)?;

    run_sync(&config, &posts, &store, SyncOptions { dry_run }).await
}

/// Load configuration suitable for Lambda environment.
fn load_lambda_config() -> Result<Config> {
    let mut config = match std::env::var("CONFIG_PATH") {
        Ok(path) => Config::load(&path)?,
        Err(_) => Config::default(),
    };
    apply_overrides(&mut config, |key| std::env::var(key).ok());
    config.validate()?;
    Ok(config)
}

/// Override config values from environment-style lookups.
fn apply_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    let targets = [
        ("STORE_OWNER", &mut config.store.owner),
        ("STORE_REPO", &mut config.store.repo),
        ("STORE_PATH", &mut config.store.path),
        ("STORE_BRANCH", &mut config.store.branch),
        ("STORE_TOKEN_SECRET", &mut config.secrets.store_token),
        ("SOURCE_CREDENTIALS_SECRET", &mut config.secrets.source_credentials),
    ];
    for (key, target) in targets {
        if let Some(value) = lookup(key) {
            *target = value;
        }
    }

    if let Some(n) = lookup("MAX_RESULTS").and_then(|v| v.parse().ok()) {
        config.source.max_results = n;
    }

    for collection in &mut config.collections {
        let key = format!("LIST_ID_{}", collection.name.to_ascii_uppercase());
        if let Some(id) = lookup(&key) {
            collection.list_id = id;
        }
    }
}
