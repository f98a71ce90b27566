//! Error types for the migration engine

use thiserror::Error;

use crate::record::Kind;
use crate::version::VersionKey;

/// Result type for migration operations
pub type Result<T> = std::result::Result<T, MigrationError>;

/// Migration engine errors
///
/// Registration errors (`StepOutOfRange`, `OutOfOrder`, `UndeclaredVersion`, `Frozen`,
/// `DuplicateType`, `WrongKind`) are programmer errors and abort boot. `TypeMismatch` is raised
/// per record while converting; callers decide whether to skip that record or abort a batch.
#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("Version step {step} for {major} is outside 0..={max}", max = crate::version::MAX_STEP)]
    StepOutOfRange { major: u32, step: u32 },

    #[error("Rule for {type_name} registered at {version}, behind checkpoint {latest}")]
    OutOfOrder {
        type_name: String,
        version: VersionKey,
        latest: VersionKey,
    },

    #[error("Version {version} is not declared as a converter checkpoint, yet {type_name} has a converter there")]
    UndeclaredVersion { type_name: String, version: VersionKey },

    #[error("Registry is frozen: cannot {operation}")]
    Frozen { operation: &'static str },

    #[error("Registry is still building: freeze it before converting")]
    NotFrozen,

    #[error("Unknown schema type: {0}")]
    UnknownType(String),

    #[error("Schema type already registered: {0}")]
    DuplicateType(String),

    #[error("Schema type {type_name} is {actual}, cannot {operation}")]
    WrongKind {
        type_name: String,
        actual: &'static str,
        operation: &'static str,
    },

    #[error("Cannot convert {type_name} backwards from {from} to {to}")]
    ReversedVersions {
        type_name: String,
        from: VersionKey,
        to: VersionKey,
    },

    #[error("Type mismatch in {type_name} at {version}: expected {expected}, found {found} in {fragment}")]
    TypeMismatch {
        type_name: String,
        version: VersionKey,
        expected: Kind,
        found: Kind,
        fragment: String,
    },

    #[error("Invalid version: {0}")]
    InvalidVersion(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
