//! Type Registry
//!
//! Owns every schema type and enforces the two-phase lifecycle: rules are registered while
//! `Building` (single-threaded, `&mut self`), then the registry is frozen once and shared
//! read-only between any number of converting threads.
//!
//! Registration is checked against a monotonic checkpoint shared by all types, so a rule can
//! never be added behind one already registered, whichever type that was.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use tracing::{debug, info};

use crate::catalog::VersionCatalog;
use crate::error::{MigrationError, Result};
use crate::keyed::KeyedSchemaType;
use crate::record::Record;
use crate::rules::{Converter, Hook, RuleFn};
use crate::scalar::ScalarSchemaType;
use crate::schema::SchemaType;
use crate::version::VersionKey;

/// Index of a registered type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeHandle(usize);

impl TypeHandle {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Registry lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistryState {
    Building,
    Frozen,
}

/// Which flavour of schema type a handle refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Structured,
    Keyed,
    Scalar,
}

impl TypeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeKind::Structured => "structured",
            TypeKind::Keyed => "keyed",
            TypeKind::Scalar => "scalar",
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

enum TypeEntry {
    Structured(SchemaType),
    Keyed(KeyedSchemaType),
    Scalar(ScalarSchemaType),
}

impl TypeEntry {
    fn name(&self) -> &str {
        match self {
            TypeEntry::Structured(t) => t.name(),
            TypeEntry::Keyed(t) => t.name(),
            TypeEntry::Scalar(t) => t.name(),
        }
    }

    fn kind(&self) -> TypeKind {
        match self {
            TypeEntry::Structured(_) => TypeKind::Structured,
            TypeEntry::Keyed(_) => TypeKind::Keyed,
            TypeEntry::Scalar(_) => TypeKind::Scalar,
        }
    }

    fn rule_count(&self) -> usize {
        match self {
            TypeEntry::Structured(t) => t.rule_count(),
            TypeEntry::Keyed(t) => t.rule_count(),
            TypeEntry::Scalar(t) => t.rule_count(),
        }
    }

    fn latest_converter(&self) -> Option<VersionKey> {
        match self {
            TypeEntry::Structured(t) => t.converters().latest(),
            TypeEntry::Keyed(t) => t.base().converters().latest(),
            TypeEntry::Scalar(t) => t.converters().latest(),
        }
    }
}

/// Summary of one registered type
#[derive(Debug, Clone, Serialize)]
pub struct TypeInfo {
    pub name: String,
    pub kind: TypeKind,
    pub rules: usize,
    pub latest_converter: Option<VersionKey>,
}

/// The set of migratable types
pub struct TypeRegistry {
    types: Vec<TypeEntry>,
    names: HashMap<String, TypeHandle>,
    state: RegistryState,
    checkpoint: VersionKey,
    catalog: Option<VersionCatalog>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// An empty registry accepting converters at any key
    pub fn new() -> Self {
        Self {
            types: Vec::new(),
            names: HashMap::new(),
            state: RegistryState::Building,
            checkpoint: VersionKey::MIN,
            catalog: None,
        }
    }

    /// An empty registry that only accepts converters at keys declared in `catalog`
    pub fn with_catalog(catalog: VersionCatalog) -> Self {
        Self {
            catalog: Some(catalog),
            ..Self::new()
        }
    }

    pub fn state(&self) -> RegistryState {
        self.state
    }

    pub fn is_frozen(&self) -> bool {
        self.state == RegistryState::Frozen
    }

    /// Highest key any rule has been registered at
    pub fn checkpoint(&self) -> VersionKey {
        self.checkpoint
    }

    pub fn catalog(&self) -> Option<&VersionCatalog> {
        self.catalog.as_ref()
    }

    /// Register a structured type
    pub fn register_type(&mut self, name: &str) -> Result<TypeHandle> {
        self.add_type(name, TypeEntry::Structured(SchemaType::new(name)))
    }

    /// Register a type whose records dispatch on their identifier
    pub fn register_keyed_type(&mut self, name: &str) -> Result<TypeHandle> {
        self.add_type(name, TypeEntry::Keyed(KeyedSchemaType::new(name)))
    }

    /// Register a type of bare scalar values
    pub fn register_scalar_type(&mut self, name: &str) -> Result<TypeHandle> {
        self.add_type(name, TypeEntry::Scalar(ScalarSchemaType::new(name)))
    }

    fn add_type(&mut self, name: &str, entry: TypeEntry) -> Result<TypeHandle> {
        self.ensure_building("register a type")?;
        if self.names.contains_key(name) {
            return Err(MigrationError::DuplicateType(name.to_string()));
        }
        let handle = TypeHandle(self.types.len());
        debug!(type_name = name, kind = %entry.kind(), "registering type");
        self.types.push(entry);
        self.names.insert(name.to_string(), handle);
        Ok(handle)
    }

    /// Find a type by name
    pub fn handle(&self, name: &str) -> Option<TypeHandle> {
        self.names.get(name).copied()
    }

    /// Find a type by name, failing with `UnknownType`
    pub fn lookup(&self, name: &str) -> Result<TypeHandle> {
        self.handle(name)
            .ok_or_else(|| MigrationError::UnknownType(name.to_string()))
    }

    pub fn name(&self, handle: TypeHandle) -> Result<&str> {
        self.entry(handle).map(TypeEntry::name)
    }

    pub fn kind(&self, handle: TypeHandle) -> Result<TypeKind> {
        self.entry(handle).map(TypeEntry::kind)
    }

    /// Register a converter at `(major, step)`
    pub fn register_converter(
        &mut self,
        handle: TypeHandle,
        major: u32,
        step: u32,
        transform: RuleFn,
    ) -> Result<()> {
        let version = self.admit(handle, major, step, true, "register a converter")?;
        let converter = Converter::new(version, transform);
        match self.entry_mut(handle)? {
            TypeEntry::Structured(t) => t.add_converter(converter),
            TypeEntry::Keyed(t) => t.base_mut().add_converter(converter),
            TypeEntry::Scalar(t) => t.add_converter(converter),
        }
    }

    /// Register a hook at `(major, step)`
    pub fn register_hook(&mut self, handle: TypeHandle, major: u32, step: u32, hook: Hook) -> Result<()> {
        let version = self.admit(handle, major, step, false, "register a hook")?;
        match self.entry_mut(handle)? {
            TypeEntry::Structured(t) => t.add_hook(version, hook),
            TypeEntry::Keyed(t) => t.base_mut().add_hook(version, hook),
            TypeEntry::Scalar(t) => t.add_hook(version, hook),
        }
        Ok(())
    }

    /// Register a structure walker at `(major, step)`
    pub fn register_walker(&mut self, handle: TypeHandle, major: u32, step: u32, walker: RuleFn) -> Result<()> {
        let version = self.admit(handle, major, step, false, "register a walker")?;
        match self.entry_mut(handle)? {
            TypeEntry::Structured(t) => t.add_walker(version, walker),
            TypeEntry::Keyed(t) => t.base_mut().add_walker(version, walker),
            TypeEntry::Scalar(_) => return Err(self.wrong_kind(handle, "register a walker")),
        }
        Ok(())
    }

    /// Register a walker that only runs for records carrying `identifier`
    pub fn register_identifier_walker(
        &mut self,
        handle: TypeHandle,
        identifier: &str,
        major: u32,
        step: u32,
        walker: RuleFn,
    ) -> Result<()> {
        let version = self.admit(handle, major, step, false, "register an identifier walker")?;
        self.keyed_mut(handle, "register an identifier walker")?
            .add_identifier_walker(identifier, version, walker);
        Ok(())
    }

    /// Register a hook that only brackets records carrying `identifier`
    pub fn register_identifier_hook(
        &mut self,
        handle: TypeHandle,
        identifier: &str,
        major: u32,
        step: u32,
        hook: Hook,
    ) -> Result<()> {
        let version = self.admit(handle, major, step, false, "register an identifier hook")?;
        self.keyed_mut(handle, "register an identifier hook")?
            .add_identifier_hook(identifier, version, hook);
        Ok(())
    }

    /// Register a converter that only fires for records carrying `identifier`
    pub fn register_identifier_converter(
        &mut self,
        handle: TypeHandle,
        identifier: &str,
        major: u32,
        step: u32,
        transform: RuleFn,
    ) -> Result<()> {
        let version = self.admit(handle, major, step, true, "register an identifier converter")?;
        self.keyed_mut(handle, "register an identifier converter")?
            .add_identifier_converter(identifier, version, transform)
    }

    /// Make `to_id` reuse the walkers `from_id` has at `(major, step)`
    ///
    /// Returns the number of walkers copied.
    pub fn copy_walkers(
        &mut self,
        handle: TypeHandle,
        major: u32,
        step: u32,
        from_id: &str,
        to_id: &str,
    ) -> Result<usize> {
        let version = self.admit(handle, major, step, false, "copy walkers")?;
        Ok(self
            .keyed_mut(handle, "copy walkers")?
            .copy_walkers(version, from_id, to_id))
    }

    /// End registration; the registry is read-only from here on
    pub fn freeze(&mut self) -> Result<()> {
        self.ensure_building("freeze")?;
        self.state = RegistryState::Frozen;
        info!(
            types = self.types.len(),
            rules = self.rule_count(),
            checkpoint = %self.checkpoint,
            "type registry frozen"
        );
        Ok(())
    }

    /// Migrate `record` of type `handle` from one version to another
    ///
    /// Returns `Ok(None)` when nothing changed; the input is never modified.
    pub fn convert(
        &self,
        handle: TypeHandle,
        record: &Record,
        from: impl Into<VersionKey>,
        to: impl Into<VersionKey>,
    ) -> Result<Option<Record>> {
        if !self.is_frozen() {
            return Err(MigrationError::NotFrozen);
        }
        self.convert_nested(handle, record, from.into(), to.into())
    }

    /// Like [`convert`](Self::convert), returning the input itself when unchanged
    pub fn migrate(
        &self,
        handle: TypeHandle,
        record: Record,
        from: impl Into<VersionKey>,
        to: impl Into<VersionKey>,
    ) -> Result<Record> {
        Ok(self.convert(handle, &record, from, to)?.unwrap_or(record))
    }

    pub(crate) fn convert_nested(
        &self,
        handle: TypeHandle,
        record: &Record,
        from: VersionKey,
        to: VersionKey,
    ) -> Result<Option<Record>> {
        match self.entry(handle)? {
            TypeEntry::Structured(t) => t.convert(self, record, from, to),
            TypeEntry::Keyed(t) => t.convert(self, record, from, to),
            TypeEntry::Scalar(t) => t.convert(self, record, from, to),
        }
    }

    /// Summaries of every registered type, in registration order
    pub fn types(&self) -> Vec<TypeInfo> {
        self.types
            .iter()
            .map(|entry| TypeInfo {
                name: entry.name().to_string(),
                kind: entry.kind(),
                rules: entry.rule_count(),
                latest_converter: entry.latest_converter(),
            })
            .collect()
    }

    /// Total number of registered rules
    pub fn rule_count(&self) -> usize {
        self.types.iter().map(TypeEntry::rule_count).sum()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Check a registration and advance the checkpoint
    fn admit(
        &mut self,
        handle: TypeHandle,
        major: u32,
        step: u32,
        converter: bool,
        operation: &'static str,
    ) -> Result<VersionKey> {
        self.ensure_building(operation)?;
        let version = VersionKey::new(major, step)?;
        let type_name = self.entry(handle)?.name().to_string();

        if version < self.checkpoint {
            return Err(MigrationError::OutOfOrder {
                type_name,
                version,
                latest: self.checkpoint,
            });
        }
        if converter {
            if let Some(catalog) = &self.catalog {
                if !catalog.is_declared(version) {
                    return Err(MigrationError::UndeclaredVersion { type_name, version });
                }
            }
        }

        self.checkpoint = version;
        Ok(version)
    }

    fn ensure_building(&self, operation: &'static str) -> Result<()> {
        match self.state {
            RegistryState::Building => Ok(()),
            RegistryState::Frozen => Err(MigrationError::Frozen { operation }),
        }
    }

    fn entry(&self, handle: TypeHandle) -> Result<&TypeEntry> {
        self.types
            .get(handle.0)
            .ok_or_else(|| MigrationError::UnknownType(format!("#{}", handle.0)))
    }

    fn entry_mut(&mut self, handle: TypeHandle) -> Result<&mut TypeEntry> {
        self.types
            .get_mut(handle.0)
            .ok_or_else(|| MigrationError::UnknownType(format!("#{}", handle.0)))
    }

    fn keyed_mut(&mut self, handle: TypeHandle, operation: &'static str) -> Result<&mut KeyedSchemaType> {
        if self.kind(handle)? != TypeKind::Keyed {
            return Err(self.wrong_kind(handle, operation));
        }
        match self.entry_mut(handle)? {
            TypeEntry::Keyed(t) => Ok(t),
            _ => Err(MigrationError::UnknownType(format!("#{}", handle.0))),
        }
    }

    fn wrong_kind(&self, handle: TypeHandle, operation: &'static str) -> MigrationError {
        match self.entry(handle) {
            Ok(entry) => MigrationError::WrongKind {
                type_name: entry.name().to_string(),
                actual: entry.kind().as_str(),
                operation,
            },
            Err(err) => err,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Compound;
    use crate::rules::rule;

    fn noop() -> RuleFn {
        rule(|_, _| Ok(None))
    }

    #[test]
    fn test_lifecycle() {
        let mut registry = TypeRegistry::new();
        let level = registry.register_type("Level").unwrap();
        assert_eq!(registry.state(), RegistryState::Building);

        let err = registry.convert(level, &Record::compound(), 99u32, 100u32).unwrap_err();
        assert!(matches!(err, MigrationError::NotFrozen));

        registry.freeze().unwrap();
        assert!(registry.is_frozen());

        let err = registry.register_converter(level, 200, 0, noop()).unwrap_err();
        assert!(matches!(err, MigrationError::Frozen { .. }));
        assert!(matches!(registry.register_type("Chunk"), Err(MigrationError::Frozen { .. })));
        assert!(matches!(registry.freeze(), Err(MigrationError::Frozen { .. })));

        assert!(registry.convert(level, &Record::compound(), 99u32, 100u32).unwrap().is_none());
    }

    #[test]
    fn test_global_checkpoint_spans_types() {
        let mut registry = TypeRegistry::new();
        let chunk = registry.register_type("Chunk").unwrap();
        let player = registry.register_type("Player").unwrap();

        registry.register_converter(chunk, 705, 0, noop()).unwrap();
        registry.register_hook(player, 705, 0, Hook::new()).unwrap();

        let err = registry.register_walker(player, 704, 0, noop()).unwrap_err();
        match err {
            MigrationError::OutOfOrder { type_name, version, latest } => {
                assert_eq!(type_name, "Player");
                assert_eq!(version, VersionKey::of(704));
                assert_eq!(latest, VersionKey::of(705));
            }
            other => panic!("expected OutOfOrder, got {other:?}"),
        }

        registry.register_converter(player, 705, 1, noop()).unwrap();
        assert_eq!(registry.checkpoint(), VersionKey::new(705, 1).unwrap());
    }

    #[test]
    fn test_step_out_of_range() {
        let mut registry = TypeRegistry::new();
        let chunk = registry.register_type("Chunk").unwrap();
        let err = registry.register_converter(chunk, 1451, 256, noop()).unwrap_err();
        assert!(matches!(err, MigrationError::StepOutOfRange { major: 1451, step: 256 }));
    }

    #[test]
    fn test_strict_catalog_rejects_undeclared_converter() {
        let mut registry = TypeRegistry::with_catalog(VersionCatalog::standard());
        let chunk = registry.register_type("Chunk").unwrap();

        registry.register_converter(chunk, 1451, 3, noop()).unwrap();
        let err = registry.register_converter(chunk, 1452, 0, noop()).unwrap_err();
        assert!(matches!(err, MigrationError::UndeclaredVersion { .. }));

        // hooks and walkers may sit anywhere
        registry.register_walker(chunk, 1452, 0, noop()).unwrap();
    }

    #[test]
    fn test_kind_checks() {
        let mut registry = TypeRegistry::new();
        let biome = registry.register_scalar_type("Biome").unwrap();
        let chunk = registry.register_type("Chunk").unwrap();

        assert!(matches!(
            registry.register_walker(biome, 100, 0, noop()),
            Err(MigrationError::WrongKind { actual: "scalar", .. })
        ));
        assert!(matches!(
            registry.copy_walkers(chunk, 100, 0, "a", "b"),
            Err(MigrationError::WrongKind { actual: "structured", .. })
        ));
        assert!(matches!(
            registry.register_type("Chunk"),
            Err(MigrationError::DuplicateType(_))
        ));
        assert!(matches!(registry.lookup("Nope"), Err(MigrationError::UnknownType(_))));
    }

    #[test]
    fn test_walker_recurses_into_other_type() {
        let mut registry = TypeRegistry::new();
        let item = registry.register_type("Item").unwrap();
        let player = registry.register_type("Player").unwrap();

        registry
            .register_converter(
                item,
                100,
                0,
                rule(|record, m| {
                    let item = m.expect_compound(record)?;
                    let mut item = item.clone();
                    if !item.rename("tag", "components") {
                        return Ok(None);
                    }
                    Ok(Some(Record::Compound(item)))
                }),
            )
            .unwrap();
        registry
            .register_walker(player, 100, 0, rule(move |record, m| {
                let player = m.expect_compound(record)?;
                Ok(m.convert_field(item, player, "SelectedItem")?
                    .and_then(|selected| crate::migration::splice(player, vec![("SelectedItem".to_string(), selected)])))
            }))
            .unwrap();
        registry.freeze().unwrap();

        let mut held = Compound::new();
        held.insert("id", "stick");
        held.insert("tag", Compound::new());
        let mut player_record = Compound::new();
        player_record.insert("SelectedItem", held);
        // a field named like the item's would be untouched by the player's own converters
        player_record.insert("tag", 7i32);

        let out = registry
            .convert(player, &Record::Compound(player_record), 99u32, 150u32)
            .unwrap()
            .unwrap();
        let out = out.as_compound().unwrap();
        assert_eq!(out.get_i64("tag"), Some(7));
        let selected = out.get_compound("SelectedItem").unwrap();
        assert!(selected.contains_key("components"));
        assert!(!selected.contains_key("tag"));
    }

    #[test]
    fn test_types_listing() {
        let mut registry = TypeRegistry::new();
        let entity = registry.register_keyed_type("Entity").unwrap();
        registry.register_converter(entity, 100, 0, noop()).unwrap();
        registry.register_identifier_walker(entity, "zombie", 100, 0, noop()).unwrap();

        let types = registry.types();
        assert_eq!(types.len(), 1);
        assert_eq!(types[0].kind, TypeKind::Keyed);
        assert_eq!(types[0].rules, 2);
        assert_eq!(types[0].latest_converter, Some(VersionKey::of(100)));
    }
}
