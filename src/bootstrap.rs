//! Registry bootstrap
//!
//! Declares every migratable type, runs each version module's registration in ascending
//! version order, then freezes the registry. The resulting [`Migrator`] is what loaders hold.

use std::sync::OnceLock;

use tracing::{debug, info};

use crate::catalog::VersionCatalog;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::record::Record;
use crate::registry::{TypeHandle, TypeRegistry};
use crate::version::VersionKey;
use crate::versions;

/// Handles of every standard type
#[derive(Debug, Clone, Copy)]
pub struct Types {
    pub level: TypeHandle,
    pub player: TypeHandle,
    pub chunk: TypeHandle,
    pub entity_chunk: TypeHandle,
    pub entity: TypeHandle,
    pub tile_entity: TypeHandle,
    pub item_stack: TypeHandle,
    pub block_state: TypeHandle,
    pub block_name: TypeHandle,
    pub item_name: TypeHandle,
    pub entity_name: TypeHandle,
    pub objective: TypeHandle,
    pub structure: TypeHandle,
    pub untagged_spawner: TypeHandle,
}

impl Types {
    /// Register every standard type, without rules
    pub fn register(registry: &mut TypeRegistry) -> Result<Self> {
        Ok(Self {
            level: registry.register_type("Level")?,
            player: registry.register_type("Player")?,
            chunk: registry.register_type("Chunk")?,
            entity_chunk: registry.register_type("EntityChunk")?,
            entity: registry.register_keyed_type("Entity")?,
            tile_entity: registry.register_keyed_type("TileEntity")?,
            item_stack: registry.register_keyed_type("ItemStack")?,
            block_state: registry.register_type("BlockState")?,
            block_name: registry.register_scalar_type("BlockName")?,
            item_name: registry.register_scalar_type("ItemName")?,
            entity_name: registry.register_scalar_type("EntityName")?,
            objective: registry.register_type("Objective")?,
            structure: registry.register_type("Structure")?,
            untagged_spawner: registry.register_type("UntaggedSpawner")?,
        })
    }
}

/// A frozen registry with its standard types and target version
pub struct Migrator {
    registry: TypeRegistry,
    types: Types,
    current: VersionKey,
}

impl Migrator {
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn types(&self) -> &Types {
        &self.types
    }

    /// Version records are brought to by [`upgrade`](Self::upgrade)
    pub fn current(&self) -> VersionKey {
        self.current
    }

    /// Migrate a record written at `from` to the current version
    pub fn upgrade(&self, handle: TypeHandle, record: &Record, from: impl Into<VersionKey>) -> Result<Option<Record>> {
        self.registry.convert(handle, record, from, self.current)
    }

    /// Migrate between two explicit versions
    pub fn convert(
        &self,
        handle: TypeHandle,
        record: &Record,
        from: impl Into<VersionKey>,
        to: impl Into<VersionKey>,
    ) -> Result<Option<Record>> {
        self.registry.convert(handle, record, from, to)
    }
}

/// Build and freeze the standard registry
pub fn bootstrap(config: &EngineConfig) -> Result<Migrator> {
    let mut registry = if config.strict_catalog {
        TypeRegistry::with_catalog(VersionCatalog::standard())
    } else {
        TypeRegistry::new()
    };

    debug!(strict_catalog = config.strict_catalog, "registering types");
    let types = Types::register(&mut registry)?;
    versions::register_all(&mut registry, &types)?;
    registry.freeze()?;

    info!(
        types = registry.len(),
        rules = registry.rule_count(),
        current = config.current_version,
        "migrator ready"
    );

    Ok(Migrator {
        registry,
        types,
        current: VersionKey::of(config.current_version),
    })
}

/// The process-wide migrator, built with default settings on first use
pub fn global() -> Result<&'static Migrator> {
    static GLOBAL: OnceLock<Migrator> = OnceLock::new();
    if let Some(migrator) = GLOBAL.get() {
        return Ok(migrator);
    }
    let migrator = bootstrap(&EngineConfig::default())?;
    Ok(GLOBAL.get_or_init(|| migrator))
}
