//! Identifier-keyed schema types
//!
//! Record families such as entities or block entities share one structure but differ by the
//! identifier stored under [`IDENTIFIER_KEY`](crate::record::IDENTIFIER_KEY). A
//! [`KeyedSchemaType`] runs the ordinary [`SchemaType`] algorithm and additionally consults
//! per-identifier hooks and walkers, looked up with the record's identifier as it stands at
//! each checkpoint (after any renaming converters have run).

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::error::Result;
use crate::record::Record;
use crate::registry::TypeRegistry;
use crate::rules::{rule, Converter, Hook, RuleFn};
use crate::schema::{SchemaType, Scoped};
use crate::table::RuleTable;
use crate::version::VersionKey;

#[derive(Clone, Default)]
struct IdentifierRules {
    hooks: RuleTable<Hook>,
    walkers: RuleTable<RuleFn>,
}

/// A schema type whose records dispatch on their identifier
pub struct KeyedSchemaType {
    base: SchemaType,
    by_id: HashMap<String, IdentifierRules>,
}

impl KeyedSchemaType {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            base: SchemaType::new(name),
            by_id: HashMap::new(),
        }
    }

    /// The identifier-agnostic part of this type
    pub fn base(&self) -> &SchemaType {
        &self.base
    }

    pub(crate) fn base_mut(&mut self) -> &mut SchemaType {
        &mut self.base
    }

    pub fn name(&self) -> &str {
        self.base.name()
    }

    /// Identifiers with at least one scoped rule, sorted
    pub fn identifiers(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.by_id.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Walkers registered for `identifier` at exactly `version`
    pub fn identifier_walkers(&self, identifier: &str, version: VersionKey) -> Option<&[RuleFn]> {
        self.by_id.get(identifier)?.walkers.get(version)
    }

    pub fn rule_count(&self) -> usize {
        self.base.rule_count()
            + self
                .by_id
                .values()
                .map(|rules| rules.hooks.len() + rules.walkers.len())
                .sum::<usize>()
    }

    pub(crate) fn add_identifier_walker(&mut self, identifier: &str, version: VersionKey, walker: RuleFn) {
        self.by_id
            .entry(identifier.to_string())
            .or_default()
            .walkers
            .insert(version, walker);
    }

    pub(crate) fn add_identifier_hook(&mut self, identifier: &str, version: VersionKey, hook: Hook) {
        self.by_id
            .entry(identifier.to_string())
            .or_default()
            .hooks
            .insert(version, hook);
    }

    /// Add a converter that only fires for records carrying `identifier`
    pub(crate) fn add_identifier_converter(
        &mut self,
        identifier: &str,
        version: VersionKey,
        transform: RuleFn,
    ) -> Result<()> {
        let identifier = identifier.to_string();
        let guarded = rule(move |record: &Record, migration| {
            if record.identifier() != Some(identifier.as_str()) {
                return Ok(None);
            }
            transform(record, migration)
        });
        self.base.add_converter(Converter::new(version, guarded))
    }

    /// Register the walkers `from_id` has at `version` under `to_id`, at the same key
    ///
    /// Returns the number of walkers copied. Nothing is registered when `from_id` has no
    /// walkers at or below `version`.
    pub(crate) fn copy_walkers(&mut self, version: VersionKey, from_id: &str, to_id: &str) -> usize {
        let copied: Vec<RuleFn> = match self
            .by_id
            .get(from_id)
            .and_then(|rules| rules.walkers.floor(version))
        {
            Some(walkers) => walkers.to_vec(),
            None => {
                warn!(type_name = %self.name(), from_id, to_id, %version, "no walkers to copy");
                return 0;
            }
        };

        debug!(
            type_name = %self.name(),
            from_id,
            to_id,
            %version,
            count = copied.len(),
            "copying walkers"
        );

        let count = copied.len();
        let target = self.by_id.entry(to_id.to_string()).or_default();
        for walker in copied {
            target.walkers.insert(version, walker);
        }
        count
    }

    pub(crate) fn convert(
        &self,
        registry: &TypeRegistry,
        record: &Record,
        from: VersionKey,
        to: VersionKey,
    ) -> Result<Option<Record>> {
        self.base
            .convert_scoped(registry, record, from, to, Some(self as &dyn Scoped))
    }
}

impl Scoped for KeyedSchemaType {
    fn hooks(&self, identifier: Option<&str>, at: VersionKey) -> &[Hook] {
        identifier
            .and_then(|id| self.by_id.get(id))
            .and_then(|rules| rules.hooks.floor(at))
            .unwrap_or_default()
    }

    fn walkers(&self, identifier: Option<&str>, at: VersionKey) -> &[RuleFn] {
        identifier
            .and_then(|id| self.by_id.get(id))
            .and_then(|rules| rules.walkers.floor(at))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Compound;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn entity(id: &str) -> Record {
        let mut entity = Compound::new();
        entity.insert("id", id);
        Record::Compound(entity)
    }

    fn frozen() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry.freeze().unwrap();
        registry
    }

    fn marking(field: &'static str) -> RuleFn {
        rule(move |record: &Record, _| {
            let mut entity = record.as_compound().cloned().unwrap_or_default();
            entity.insert(field, true);
            Ok(Some(Record::Compound(entity)))
        })
    }

    #[test]
    fn test_identifier_walkers_only_fire_for_matching_id() {
        let mut keyed = KeyedSchemaType::new("Entity");
        keyed.add_identifier_walker("zombie", VersionKey::of(100), marking("walked"));

        let registry = frozen();
        let zombie = keyed
            .convert(&registry, &entity("zombie"), VersionKey::of(99), VersionKey::of(150))
            .unwrap()
            .unwrap();
        assert_eq!(zombie.as_compound().unwrap().get("walked"), Some(&Record::Byte(1)));

        let pig = keyed
            .convert(&registry, &entity("pig"), VersionKey::of(99), VersionKey::of(150))
            .unwrap();
        assert!(pig.is_none());
    }

    #[test]
    fn test_copy_walkers_aliases_identifier() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut keyed = KeyedSchemaType::new("Entity");
        keyed.add_identifier_walker("zombie", VersionKey::of(100), {
            let calls = Arc::clone(&calls);
            rule(move |_, _| {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(None)
            })
        });

        assert_eq!(keyed.copy_walkers(VersionKey::of(120), "zombie", "husk"), 1);
        assert_eq!(keyed.copy_walkers(VersionKey::of(120), "creeper", "husk"), 0);
        assert!(keyed.identifier_walkers("husk", VersionKey::of(120)).is_some());

        let registry = frozen();
        keyed
            .convert(&registry, &entity("husk"), VersionKey::of(99), VersionKey::of(119))
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        keyed
            .convert(&registry, &entity("husk"), VersionKey::of(99), VersionKey::of(130))
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_identifier_lookup_uses_converted_id() {
        let mut keyed = KeyedSchemaType::new("Entity");
        keyed
            .add_converter_for_test(VersionKey::of(110), |entity: &mut Compound| {
                if entity.get_str("id") == Some("Zombie") {
                    entity.insert("id", "minecraft:zombie");
                }
            });
        keyed.add_identifier_walker("minecraft:zombie", VersionKey::of(100), marking("walked"));

        let registry = frozen();
        let out = keyed
            .convert(&registry, &entity("Zombie"), VersionKey::of(99), VersionKey::of(120))
            .unwrap()
            .unwrap();
        let out = out.as_compound().unwrap();
        assert_eq!(out.get_str("id"), Some("minecraft:zombie"));
        assert!(out.contains_key("walked"));
    }

    #[test]
    fn test_identifier_converter_is_guarded() {
        let mut keyed = KeyedSchemaType::new("TileEntity");
        keyed
            .add_identifier_converter("Sign", VersionKey::of(101), marking("converted"))
            .unwrap();

        let registry = frozen();
        let sign = keyed
            .convert(&registry, &entity("Sign"), VersionKey::of(100), VersionKey::of(101))
            .unwrap();
        assert!(sign.is_some());

        let chest = keyed
            .convert(&registry, &entity("Chest"), VersionKey::of(100), VersionKey::of(101))
            .unwrap();
        assert!(chest.is_none());
    }

    impl KeyedSchemaType {
        fn add_converter_for_test<F>(&mut self, version: VersionKey, edit: F)
        where
            F: Fn(&mut Compound) + Send + Sync + 'static,
        {
            let transform = rule(move |record: &Record, _| {
                let mut entity = record.as_compound().cloned().unwrap_or_default();
                edit(&mut entity);
                Ok(Some(Record::Compound(entity)))
            });
            self.base.add_converter(Converter::new(version, transform)).unwrap();
        }
    }
}
