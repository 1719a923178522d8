//! postfeed CLI
//!
//! Local execution entry point. For AWS Lambda, use `postfeed-lambda`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use postfeed::{
    error::{AppError, Result},
    models::{Config, RecordKind},
    pipeline::{self, PublishOutcome, SyncOptions},
    services::{ParseOutcome, RecordParser},
    sources::{
        EnvSecrets, FixtureSource, PostSource, SecretSource, SourceCredentials, StoreToken,
        TwitterSource,
    },
    storage::{ContentStore, GitHubStore, LocalStorage},
    utils::{http, load_config, load_credentials},
};

/// postfeed - curated post lists to a published dataset
#[derive(Parser, Debug)]
#[command(name = "postfeed", version, about = "Publish curated posts as a dataset")]
struct Cli {
    /// Path to config file (defaults apply when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch, parse and publish every collection
    Sync {
        /// Assemble and print the artifact without writing it
        #[arg(long)]
        dry_run: bool,

        /// Read posts from a JSON fixture instead of the post source API
        #[arg(long)]
        posts: Option<PathBuf>,

        /// Publish to a local directory instead of the content store
        #[arg(long)]
        store_dir: Option<PathBuf>,
    },

    /// Parse a single post text file and print the outcome
    Parse {
        #[arg(long, value_enum)]
        kind: KindArg,

        file: PathBuf,
    },

    /// Validate configuration
    Validate,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum KindArg {
    Announcement,
    Event,
    Bulletin,
}

impl From<KindArg> for RecordKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Announcement => RecordKind::Announcement,
            KindArg::Event => RecordKind::Event,
            KindArg::Bulletin => RecordKind::Bulletin,
        }
    }
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool, configured: &str) {
    let level = if verbose { "debug" } else { configured };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Pick the post source and content store for a sync run.
///
/// Secrets are only read for the remote collaborators actually in use.
async fn build_collaborators(
    config: &Config,
    posts: Option<PathBuf>,
    store_dir: Option<PathBuf>,
) -> Result<(Box<dyn PostSource>, Box<dyn ContentStore>)> {
    let client = http::create_client(&config.source)?;
    let secrets = EnvSecrets;
    let names = &config.secrets;

    let (credentials, token) = match (&posts, &store_dir) {
        (None, None) => {
            let (token, credentials) = load_credentials(&secrets, names).await?;
            (Some(credentials), Some(token))
        }
        (None, Some(_)) => {
            let payload = secrets.fetch(&names.source_credentials).await?;
            let credentials =
                SourceCredentials::parse(&names.source_credentials, &payload, &names.delimiter)?;
            (Some(credentials), None)
        }
        (Some(_), None) => {
            let payload = secrets.fetch(&names.store_token).await?;
            (None, Some(StoreToken::parse(&names.store_token, &payload)?))
        }
        (Some(_), Some(_)) => (None, None),
    };

    let source: Box<dyn PostSource> = match (posts, credentials) {
        (Some(path), _) => Box::new(FixtureSource::load(&path).await?),
        (None, Some(credentials)) => {
            Box::new(TwitterSource::connect(client.clone(), &config.source, &credentials).await?)
        }
        (None, None) => return Err(AppError::config("post source credentials are missing")),
    };

    let store: Box<dyn ContentStore> = match (store_dir, token) {
        (Some(dir), _) => Box::new(LocalStorage::new(dir)),
        (None, Some(token)) => Box::new(GitHubStore::new(client, &config.store, token.0)?),
        (None, None) => return Err(AppError::config("content store token is missing")),
    };

    Ok((source, store))
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load_or_default(path),
        None => Config::default(),
    };
    init_logging(cli.verbose, &config.logging.level);

    match cli.command {
        Command::Sync {
            dry_run,
            posts,
            store_dir,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let run = async {
                let (source, store) = build_collaborators(&config, posts, store_dir).await?;
                let report = pipeline::run_sync(
                    &config,
                    source.as_ref(),
                    store.as_ref(),
                    SyncOptions { dry_run },
                )
                .await?;
                Ok::<_, AppError>((report, store.location()))
            };

            let (report, location) = match run.await {
                Ok(done) => done,
                Err(e) => {
                    if e.is_post_source() {
                        log::error!("Post source API failed, nothing published: {}", e);
                    } else {
                        log::error!("Sync failed: {}", e);
                    }
                    return Err(e);
                }
            };

            for collection in &report.collections {
                log::info!(
                    "{}: {} records, {} errors, digest {}",
                    collection.name,
                    collection.records.len(),
                    collection.errors.len(),
                    collection.digest.get(..12).unwrap_or(&collection.digest)
                );
            }

            match &report.outcome {
                PublishOutcome::Unchanged => log::info!("Nothing changed; not published"),
                PublishOutcome::DryRun(artifact) => {
                    println!("{}", serde_json::to_string_pretty(artifact)?);
                }
                PublishOutcome::Published { commit, .. } => {
                    log::info!("Published to {} as {}", location, commit);
                }
            }
        }

        Command::Parse { kind, file } => {
            let text = std::fs::read_to_string(&file)?;
            let post_id = file.display().to_string();
            let parser = RecordParser::new(kind.into(), &config.parser);

            let output = match parser.parse(&post_id, &text) {
                ParseOutcome::Primary(record) => serde_json::json!({ "record": record }),
                ParseOutcome::Continuation(text) => serde_json::json!({ "continuation": text }),
                ParseOutcome::Failed(error) => serde_json::json!({ "error": error }),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!(
                "✓ Config OK ({} collections: {})",
                config.collections.len(),
                config.collection_names().join(", ")
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_absent_secrets() -> Config {
        let mut config = Config::default();
        config.secrets.store_token = "postfeed-test/absent-token".into();
        config.secrets.source_credentials = "postfeed-test/absent-credentials".into();
        config
    }

    #[tokio::test]
    async fn test_local_collaborators_need_no_secrets() {
        let tmp = tempfile::TempDir::new().unwrap();
        let posts = tmp.path().join("posts.json");
        std::fs::write(&posts, r#"{"news": []}"#).unwrap();

        let (_, store) = build_collaborators(
            &config_with_absent_secrets(),
            Some(posts),
            Some(tmp.path().to_path_buf()),
        )
        .await
        .unwrap();
        assert!(store.read().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remote_collaborators_report_missing_secret() {
        let tmp = tempfile::TempDir::new().unwrap();
        let posts = tmp.path().join("posts.json");
        std::fs::write(&posts, "{}").unwrap();
        let config = config_with_absent_secrets();

        let err = build_collaborators(&config, Some(posts), None)
            .await
            .err()
            .unwrap();
        assert!(matches!(err, AppError::Secret { ref name, .. } if name == "postfeed-test/absent-token"));

        let err = build_collaborators(&config, None, None).await.err().unwrap();
        assert!(matches!(err, AppError::Secret { .. }));
        assert!(!err.is_post_source());
    }
}
