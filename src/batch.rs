//! Batch migration of record documents on disk
//!
//! A document wraps one record with the version it was written at and its type:
//!
//! ```json
//! { "DataVersion": 1343, "type": "Entity", "data": { "id": "minecraft:zombie" } }
//! ```
//!
//! Failures are isolated per document: a record that cannot be migrated is reported and the
//! walk carries on, unless `fail_fast` is set.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::bootstrap::Migrator;
use crate::config::MigrateConfig;
use crate::error::{MigrationError, Result};
use crate::record::Record;
use crate::version::VersionKey;

/// A record as stored on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "DataVersion")]
    pub data_version: u32,

    #[serde(rename = "type")]
    pub type_name: String,

    pub data: serde_json::Value,
}

impl Document {
    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Migrate this document to `to`, returning `None` when it is already there untouched
    ///
    /// `DataVersion` holds whole versions only, so `to` must have step 0.
    pub fn migrate(&self, migrator: &Migrator, to: VersionKey) -> Result<Option<Document>> {
        if to.step() != 0 {
            return Err(MigrationError::InvalidVersion(format!(
                "{to}: documents can only be migrated to a whole DataVersion"
            )));
        }
        let handle = migrator.registry().lookup(&self.type_name)?;
        let record = Record::try_from(self.data.clone())?;
        let converted = migrator.convert(handle, &record, self.data_version, to)?;
        if converted.is_none() && self.data_version == to.major() {
            return Ok(None);
        }

        let data = match converted {
            Some(record) => serde_json::Value::from(&record),
            None => self.data.clone(),
        };
        Ok(Some(Document {
            data_version: to.major(),
            type_name: self.type_name.clone(),
            data,
        }))
    }

    pub fn to_string(&self, pretty: bool) -> Result<String> {
        Ok(if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        })
    }
}

/// What happened to one document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Migrated,
    Current,
}

/// A document that failed to migrate
#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Summary of a batch run
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub root: PathBuf,
    pub target: VersionKey,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub scanned: usize,
    pub migrated: usize,
    pub current: usize,
    pub failures: Vec<FileFailure>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Migrate one document file, writing the result to `output` (or back in place)
pub fn migrate_file(
    migrator: &Migrator,
    path: &Path,
    output: Option<&Path>,
    to: VersionKey,
    pretty: bool,
) -> Result<Outcome> {
    let document = Document::parse(&fs::read_to_string(path)?)?;
    let Some(migrated) = document.migrate(migrator, to)? else {
        return Ok(Outcome::Current);
    };

    let destination = output.unwrap_or(path);
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(destination, migrated.to_string(pretty)?)?;
    debug!(path = %path.display(), from = document.data_version, to = %to, "migrated document");
    Ok(Outcome::Migrated)
}

/// Migrate every document under `root` to the configured current version
///
/// With `out_dir`, results are written under it mirroring the layout below `root` and the
/// inputs are left alone.
pub fn migrate_dir(
    migrator: &Migrator,
    root: &Path,
    out_dir: Option<&Path>,
    config: &MigrateConfig,
) -> Result<BatchReport> {
    let started_at = Utc::now();
    let target = migrator.current();
    let pretty = config.io.output_format.is_pretty();

    let mut report = BatchReport {
        root: root.to_path_buf(),
        target,
        started_at,
        finished_at: started_at,
        scanned: 0,
        migrated: 0,
        current: 0,
        failures: Vec::new(),
    };

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().unwrap_or(root).to_path_buf();
                let error = MigrationError::from(std::io::Error::from(e));
                if config.batch.fail_fast {
                    return Err(error);
                }
                warn!(path = %path.display(), error = %error, "failed to read directory entry");
                report.failures.push(FileFailure {
                    path,
                    error: error.to_string(),
                });
                continue;
            }
        };
        let path = entry.path();
        let accepted = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| config.accepts_extension(ext));
        if !entry.file_type().is_file() || !accepted {
            continue;
        }
        report.scanned += 1;

        let output = out_dir.map(|dir| dir.join(path.strip_prefix(root).unwrap_or(path)));
        let result = migrate_file(migrator, path, output.as_deref(), target, pretty).and_then(|outcome| {
            // keep the output tree complete
            if let (Outcome::Current, Some(output)) = (outcome, &output) {
                copy_unchanged(path, output)?;
            }
            Ok(outcome)
        });
        match result {
            Ok(Outcome::Migrated) => report.migrated += 1,
            Ok(Outcome::Current) => report.current += 1,
            Err(e) if config.batch.fail_fast => return Err(e),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to migrate document");
                report.failures.push(FileFailure {
                    path: path.to_path_buf(),
                    error: e.to_string(),
                });
            }
        }
    }

    report.finished_at = Utc::now();
    info!(
        scanned = report.scanned,
        migrated = report.migrated,
        failed = report.failures.len(),
        target = %target,
        "batch migration finished"
    );
    Ok(report)
}

fn copy_unchanged(path: &Path, output: &Path) -> Result<()> {
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(path, output)?;
    Ok(())
}
