//! Publish decision and artifact assembly.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{Baseline, CollectionReport, PublishedArtifact};
use crate::storage::{ContentStore, StoredContent};

/// What the publish step did.
#[derive(Debug, Clone)]
pub enum PublishOutcome {
    /// Every digest matched the baseline; nothing was written
    Unchanged,
    /// Assembled for inspection only
    DryRun(PublishedArtifact),
    Published {
        commit: String,
        artifact: PublishedArtifact,
    },
}

impl PublishOutcome {
    pub fn artifact(&self) -> Option<&PublishedArtifact> {
        match self {
            PublishOutcome::Unchanged => None,
            PublishOutcome::DryRun(artifact) => Some(artifact),
            PublishOutcome::Published { artifact, .. } => Some(artifact),
        }
    }

    pub fn commit(&self) -> Option<&str> {
        match self {
            PublishOutcome::Published { commit, .. } => Some(commit),
            _ => None,
        }
    }
}

/// Names of the collections whose digest differs from the baseline.
///
/// `reports` must be in configured collection order; positions matter for
/// baselines that only carry the positional digest array.
pub fn changed_collections<'a>(
    baseline: &Baseline,
    reports: &'a [CollectionReport],
) -> Vec<&'a str> {
    reports
        .iter()
        .enumerate()
        .filter(|(i, report)| baseline.digest_for(&report.name, *i) != Some(report.digest.as_str()))
        .map(|(_, report)| report.name.as_str())
        .collect()
}

/// Collections the baseline still publishes but the reports no longer carry.
///
/// Positional baselines cannot name them, so extra positions are reported
/// as `#<index>`.
pub fn removed_collections(baseline: &Baseline, reports: &[CollectionReport]) -> Vec<String> {
    if baseline.digests.is_empty() {
        return (reports.len()..baseline.hashes.len())
            .map(|i| format!("#{i}"))
            .collect();
    }
    baseline
        .digests
        .keys()
        .filter(|name| !reports.iter().any(|report| &report.name == *name))
        .cloned()
        .collect()
}

/// Build the artifact from collection reports in configured order.
pub fn assemble(reports: &[CollectionReport], updated_at: DateTime<Utc>) -> PublishedArtifact {
    let mut datasets = BTreeMap::new();
    let mut digests = BTreeMap::new();
    let mut errors = BTreeMap::new();
    let mut hashes = Vec::with_capacity(reports.len());

    for report in reports {
        datasets.insert(report.name.clone(), report.records.clone());
        digests.insert(report.name.clone(), report.digest.clone());
        errors.insert(report.name.clone(), report.errors.clone());
        hashes.push(report.digest.clone());
    }

    PublishedArtifact {
        datasets,
        hashes,
        digests,
        errors,
        updated_at,
    }
}

/// Decide whether to publish and, if so, write or emit the artifact.
///
/// `previous` is the store content read at the start of the run; its
/// version token guards the write.
pub async fn publish(
    store: &dyn ContentStore,
    reports: &[CollectionReport],
    previous: Option<&StoredContent>,
    dry_run: bool,
    message: &str,
) -> Result<PublishOutcome> {
    let baseline = previous
        .map(|stored| Baseline::from_artifact_bytes(&stored.bytes))
        .unwrap_or_default();
    let removed = removed_collections(&baseline, reports);
    let changed: Vec<&str> = changed_collections(&baseline, reports)
        .into_iter()
        .chain(removed.iter().map(String::as_str))
        .collect();

    if changed.is_empty() && !dry_run {
        log::info!("No collection changed since the last publish");
        return Ok(PublishOutcome::Unchanged);
    }

    let artifact = assemble(reports, Utc::now());
    if dry_run {
        log::info!(
            "Dry run: {} records, {} errors, changed: [{}]",
            artifact.record_count(),
            artifact.error_count(),
            changed.join(", ")
        );
        return Ok(PublishOutcome::DryRun(artifact));
    }

    let bytes = artifact.to_json()?;
    let message = format!("{} ({})", message, changed.join(", "));
    let commit = store
        .write(&bytes, previous.map(|stored| stored.version.as_str()), &message)
        .await?;

    log::info!(
        "Published {} records to {} ({})",
        artifact.record_count(),
        store.location(),
        commit
    );
    Ok(PublishOutcome::Published { commit, artifact })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::RecordKind;
    use crate::storage::LocalStorage;
    use tempfile::TempDir;

    fn report(name: &str, digest: &str) -> CollectionReport {
        CollectionReport {
            name: name.into(),
            kind: RecordKind::Announcement,
            records: Vec::new(),
            errors: Vec::new(),
            digest: digest.into(),
        }
    }

    fn stored(json: &str) -> StoredContent {
        StoredContent {
            bytes: json.as_bytes().to_vec(),
            version: "v1".into(),
        }
    }

    #[test]
    fn test_changed_collections_positional() {
        let baseline = Baseline::from_artifact_bytes(br#"{"hashes": ["a", "b"]}"#);
        let reports = [report("one", "a"), report("two", "x"), report("three", "c")];
        assert_eq!(changed_collections(&baseline, &reports), vec!["two", "three"]);
    }

    #[test]
    fn test_changed_collections_named() {
        let baseline =
            Baseline::from_artifact_bytes(br#"{"hashes": ["b", "a"], "digests": {"one": "a", "two": "b"}}"#);
        let reports = [report("one", "a"), report("two", "b")];
        assert!(changed_collections(&baseline, &reports).is_empty());
    }

    #[test]
    fn test_removed_collections() {
        let named = Baseline::from_artifact_bytes(
            br#"{"hashes": ["a", "b"], "digests": {"one": "a", "gone": "b"}}"#,
        );
        let reports = [report("one", "a")];
        assert_eq!(removed_collections(&named, &reports), vec!["gone"]);

        let positional = Baseline::from_artifact_bytes(br#"{"hashes": ["a", "b", "c"]}"#);
        assert_eq!(removed_collections(&positional, &reports), vec!["#1", "#2"]);

        let same = Baseline::from_artifact_bytes(br#"{"hashes": ["a"]}"#);
        assert!(removed_collections(&same, &reports).is_empty());
    }

    #[tokio::test]
    async fn test_removed_collection_forces_publish() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStorage::new(tmp.path());
        store
            .write(
                br#"{"one": [], "gone": [], "hashes": ["a", "b"], "digests": {"one": "a", "gone": "b"}}"#,
                None,
                "seed",
            )
            .await
            .unwrap();
        let previous = store.read().await.unwrap().unwrap();

        let outcome = publish(&store, &[report("one", "a")], Some(&previous), false, "msg")
            .await
            .unwrap();

        let artifact = outcome.artifact().unwrap();
        assert!(outcome.commit().is_some());
        assert!(!artifact.datasets.contains_key("gone"));
        assert_eq!(artifact.hashes, vec!["a"]);
    }

    #[test]
    fn test_assemble_aligns_hashes_with_order() {
        let reports = [report("zeta", "1"), report("alpha", "2")];
        let artifact = assemble(&reports, Utc::now());
        assert_eq!(artifact.hashes, vec!["1", "2"]);
        assert_eq!(artifact.digests["alpha"], "2");
        assert!(artifact.datasets.contains_key("zeta"));
    }

    #[tokio::test]
    async fn test_unchanged_does_not_write() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStorage::new(tmp.path());
        let previous = stored(r#"{"hashes": ["a"]}"#);

        let outcome = publish(&store, &[report("one", "a")], Some(&previous), false, "msg")
            .await
            .unwrap();

        assert!(matches!(outcome, PublishOutcome::Unchanged));
        assert!(store.read().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_dry_run_assembles_without_writing() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStorage::new(tmp.path());
        let previous = stored(r#"{"hashes": ["a"]}"#);

        let outcome = publish(&store, &[report("one", "a")], Some(&previous), true, "msg")
            .await
            .unwrap();

        assert_eq!(outcome.artifact().unwrap().hashes, vec!["a"]);
        assert!(outcome.commit().is_none());
        assert!(store.read().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_first_publish_creates_artifact() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStorage::new(tmp.path());

        let outcome = publish(&store, &[report("one", "a")], None, false, "msg")
            .await
            .unwrap();

        assert!(outcome.commit().is_some());
        let written = store.read().await.unwrap().unwrap();
        let baseline = Baseline::from_artifact_bytes(&written.bytes);
        assert_eq!(baseline.hashes, vec!["a"]);
    }

    #[tokio::test]
    async fn test_stale_token_propagates() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStorage::new(tmp.path());
        store.write(br#"{"hashes": ["old"]}"#, None, "seed").await.unwrap();
        let previous = store.read().await.unwrap().unwrap();
        store.write(br#"{"hashes": ["newer"]}"#, Some(&previous.version), "race").await.unwrap();

        let err = publish(&store, &[report("one", "a")], Some(&previous), false, "msg")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::StaleVersion(_)));
    }
}
