//! Standard converters
//!
//! Most version steps are renames: an identifier, a field, a bare value. These builders turn a
//! renaming function into a converter for the matching record shape.

use std::collections::HashMap;

use crate::record::{Record, IDENTIFIER_KEY};
use crate::rules::{rule, RuleFn};

/// A renaming function backed by a fixed `(old, new)` table
pub fn table(entries: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> + Send + Sync + 'static {
    let map: HashMap<&'static str, &'static str> = entries.iter().copied().collect();
    move |old: &str| map.get(old).map(|new| new.to_string())
}

/// Rename a compound's identifier
pub fn rename_identifiers<F>(rename: F) -> RuleFn
where
    F: Fn(&str) -> Option<String> + Send + Sync + 'static,
{
    rule(move |record: &Record, _| {
        let Some(compound) = record.as_compound() else {
            return Ok(None);
        };
        let Some(renamed) = compound.identifier().and_then(&rename) else {
            return Ok(None);
        };
        let mut compound = compound.clone();
        compound.insert(IDENTIFIER_KEY, renamed);
        Ok(Some(Record::Compound(compound)))
    })
}

/// Rename a bare string value
pub fn rename_values<F>(rename: F) -> RuleFn
where
    F: Fn(&str) -> Option<String> + Send + Sync + 'static,
{
    rule(move |record: &Record, _| Ok(record.as_str().and_then(&rename).map(Record::from)))
}

/// Move `from` to `to` within a compound; absent `from` means already migrated
pub fn rename_field(from: &'static str, to: &'static str) -> RuleFn {
    rule(move |record: &Record, m| {
        let compound = m.expect_compound(record)?;
        if !compound.contains_key(from) {
            return Ok(None);
        }
        let mut compound = compound.clone();
        compound.rename(from, to);
        Ok(Some(Record::Compound(compound)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Compound;
    use crate::registry::TypeRegistry;

    const RENAMES: &[(&str, &str)] = &[("minecraft:snowman", "minecraft:snow_golem")];

    #[test]
    fn test_renames() {
        let mut registry = TypeRegistry::new();
        let entity = registry.register_keyed_type("Entity").unwrap();
        let name = registry.register_scalar_type("EntityName").unwrap();
        registry.register_converter(entity, 1510, 0, rename_identifiers(table(RENAMES))).unwrap();
        registry.register_converter(name, 1510, 0, rename_values(table(RENAMES))).unwrap();
        registry.freeze().unwrap();

        let mut snowman = Compound::new();
        snowman.insert("id", "minecraft:snowman");
        let out = registry
            .convert(entity, &Record::Compound(snowman), 1509u32, 1510u32)
            .unwrap()
            .unwrap();
        assert_eq!(out.identifier(), Some("minecraft:snow_golem"));

        let out = registry
            .convert(name, &Record::from("minecraft:snowman"), 1509u32, 1510u32)
            .unwrap();
        assert_eq!(out, Some(Record::from("minecraft:snow_golem")));

        let out = registry
            .convert(name, &Record::from("minecraft:pig"), 1509u32, 1510u32)
            .unwrap();
        assert!(out.is_none());
    }
}
