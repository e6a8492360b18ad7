//! Applying a filter tree to a full snapshot for public export.
//!
//! Publishing produces two documents: the admin checkpoint (every live
//! document, unfiltered) and the public state (incidents narrowed by the
//! filter tree). Soft-deleted documents are left out of both and reported
//! so the caller can purge them from the source.

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use incident_map_filter_models::FilterNode;
use incident_map_incident_models::{Incident, IncidentDb};
use serde::Serialize;
use thiserror::Error;

use crate::evaluate::{CompiledFilters, EvalContext};

/// File name of the filtered public snapshot.
pub const STATE_FILE: &str = "state.json";

/// File name of the unfiltered admin checkpoint.
pub const CHECKPOINT_FILE: &str = "adminCheckpointState.json";

/// Errors from writing published snapshots.
#[derive(Debug, Error)]
pub enum PublishError {
    /// A snapshot could not be encoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A snapshot could not be written.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
}

/// Incidents of `db` that pass every root filter, in id order.
#[must_use]
pub fn filter_incidents<'d>(
    db: &'d IncidentDb,
    filters: &[FilterNode],
) -> Vec<(&'d String, &'d Incident)> {
    let ctx = EvalContext::new(db);
    CompiledFilters::compile(filters).apply(&db.incidents, &ctx)
}

/// Number of incidents of `db` that pass every root filter.
#[must_use]
pub fn count_matching(db: &IncidentDb, filters: &[FilterNode]) -> usize {
    let ctx = EvalContext::new(db);
    let compiled = CompiledFilters::compile(filters);
    db.incidents
        .values()
        .filter(|incident| compiled.passes(incident, &ctx))
        .count()
}

/// A document left out of the export because it is soft-deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovedDocument {
    /// `Categories`, `Types` or `Incidents`.
    pub collection: String,
    /// Document id.
    pub id: String,
}

/// Summary of one publish run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishReport {
    /// Timestamp stamped on both snapshots.
    pub read_at: String,
    /// Live incidents in the checkpoint.
    pub total_incidents: usize,
    /// Incidents that passed the filter tree.
    pub published_incidents: usize,
    /// Soft-deleted documents excluded from both snapshots.
    pub removed: Vec<RemovedDocument>,
    /// Filter kinds in the tree that had no evaluator.
    pub unsupported_kinds: Vec<String>,
}

/// The two snapshots of a publish run and its report.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedState {
    /// Every live document.
    pub checkpoint: IncidentDb,
    /// Live categories and types with the filtered incidents.
    pub public: IncidentDb,
    /// What happened.
    pub report: PublishReport,
}

impl PublishedState {
    /// Builds both snapshots from `db`, stamping them with `read_at`.
    #[must_use]
    pub fn build(db: &IncidentDb, filters: &[FilterNode], read_at: DateTime<Utc>) -> Self {
        let read_at = read_at.to_rfc3339_opts(SecondsFormat::Millis, true);

        let removed = db
            .deleted_ids()
            .into_iter()
            .map(|(collection, id)| RemovedDocument {
                collection: collection.to_string(),
                id,
            })
            .collect::<Vec<_>>();

        let mut checkpoint = db.without_deleted();
        checkpoint.read_at = Some(read_at.clone());

        let ctx = EvalContext::new(&checkpoint);
        let compiled = CompiledFilters::compile(filters);
        let incidents = compiled
            .apply(&checkpoint.incidents, &ctx)
            .into_iter()
            .map(|(id, incident)| (id.clone(), incident.clone()))
            .collect();
        let unsupported_kinds = compiled
            .unsupported_kinds()
            .into_iter()
            .map(ToString::to_string)
            .collect();

        let public = IncidentDb {
            categories: checkpoint.categories.clone(),
            types: checkpoint.types.clone(),
            incidents,
            read_at: Some(read_at.clone()),
        };

        let report = PublishReport {
            read_at,
            total_incidents: checkpoint.incidents.len(),
            published_incidents: public.incidents.len(),
            removed,
            unsupported_kinds,
        };

        log::info!(
            "Publishing {}/{} incidents ({} soft-deleted document(s) excluded)",
            report.published_incidents,
            report.total_incidents,
            report.removed.len()
        );

        Self {
            checkpoint,
            public,
            report,
        }
    }

    /// Writes [`STATE_FILE`] and [`CHECKPOINT_FILE`] into `dir`, minified.
    ///
    /// Each file is written to a `.tmp` sibling and renamed into place.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError`] if encoding fails or a file cannot be
    /// written.
    pub fn write(&self, dir: &Path) -> Result<Vec<PathBuf>, PublishError> {
        std::fs::create_dir_all(dir).map_err(|source| PublishError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut written = Vec::with_capacity(2);
        for (name, snapshot) in [
            (CHECKPOINT_FILE, &self.checkpoint),
            (STATE_FILE, &self.public),
        ] {
            let path = dir.join(name);
            write_atomic(&path, &serde_json::to_string(snapshot)?)?;
            log::info!("Wrote {}", path.display());
            written.push(path);
        }
        Ok(written)
    }
}

fn write_atomic(path: &Path, contents: &str) -> Result<(), PublishError> {
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, contents).map_err(|source| PublishError::Io {
        path: tmp.clone(),
        source,
    })?;
    std::fs::rename(&tmp, path).map_err(|source| PublishError::Io {
        path: path.to_path_buf(),
        source,
    })
}
