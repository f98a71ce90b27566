//! Record Schemas
//!
//! A versioned schema migration engine for persisted game records: worlds, chunks, entities,
//! block entities, item stacks, players. A record written by any past release is upgraded to
//! the current layout by running every registered rule between its version and the target.
//!
//! ## Features
//!
//! - **Ordered versions**: rules are keyed by `(DataVersion, step)` packed into one integer
//! - **Floor lookup**: hooks and walkers registered at a version apply to every later one
//! - **Nested walking**: walkers hand embedded records to their own type's converters
//! - **Per-identifier rules**: entity, block entity and item rules keyed by `id`
//! - **Two-phase lifecycle**: registration is single-threaded, conversion is shared read-only
//!
//! ## Architecture
//!
//! ```text
//! TypeRegistry ─┬─ SchemaType ────────── ConverterChain + RuleTable<Hook> + RuleTable<walker>
//!               ├─ KeyedSchemaType ───── SchemaType + per-id RuleTables
//!               └─ ScalarSchemaType ──── ConverterChain + RuleTable<Hook>
//!
//! convert(record, from, to):
//!   for converter in (from, to]:  hooks.pre → converter → hooks.post
//!   at to:                        hooks.pre → walkers   → hooks.post
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use record_schemas::{global, json};
//!
//! let migrator = global()?;
//! let zombie = json::from_str(r#"{"id": "Zombie", "Health": 20.0}"#)?;
//! let upgraded = migrator.upgrade(migrator.types().entity, &zombie, 99)?;
//! assert!(upgraded.is_some());
//! # Ok::<(), record_schemas::MigrationError>(())
//! ```

pub mod batch;
pub mod bootstrap;
pub mod catalog;
pub mod chain;
pub mod config;
pub mod converters;
pub mod error;
pub mod hooks;
pub mod json;
pub mod keyed;
pub mod migration;
pub mod record;
pub mod registry;
pub mod rules;
pub mod scalar;
pub mod schema;
pub mod table;
pub mod version;
pub mod walkers;

mod versions;

pub use batch::{BatchReport, Document};
pub use bootstrap::{bootstrap, global, Migrator, Types};
pub use catalog::VersionCatalog;
pub use config::MigrateConfig;
pub use error::{MigrationError, Result};
pub use migration::Migration;
pub use record::{Compound, Kind, Record};
pub use registry::{RegistryState, TypeHandle, TypeInfo, TypeKind, TypeRegistry};
pub use rules::{rule, Converter, Hook, RuleFn};
pub use version::VersionKey;

/// DataVersions that carry built-in rules, ascending
pub fn builtin_versions() -> impl Iterator<Item = u32> {
    versions::registered()
}
