//! Scalar schema types
//!
//! Bare values such as a biome or block name string. They have no children to walk and no
//! identifier to dispatch on, so only converters and hooks apply.

use crate::chain::ConverterChain;
use crate::error::Result;
use crate::migration::Migration;
use crate::record::Record;
use crate::registry::TypeRegistry;
use crate::rules::{Converter, Hook};
use crate::schema::{check_range, Pass};
use crate::table::RuleTable;
use crate::version::VersionKey;

pub struct ScalarSchemaType {
    name: String,
    converters: ConverterChain,
    hooks: RuleTable<Hook>,
}

impl ScalarSchemaType {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            converters: ConverterChain::new(),
            hooks: RuleTable::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn converters(&self) -> &ConverterChain {
        &self.converters
    }

    pub fn rule_count(&self) -> usize {
        self.converters.len() + self.hooks.len()
    }

    pub(crate) fn add_converter(&mut self, converter: Converter) -> Result<()> {
        self.converters.push(&self.name, converter)
    }

    pub(crate) fn add_hook(&mut self, version: VersionKey, hook: Hook) {
        self.hooks.insert(version, hook);
    }

    pub(crate) fn convert(
        &self,
        registry: &TypeRegistry,
        record: &Record,
        from: VersionKey,
        to: VersionKey,
    ) -> Result<Option<Record>> {
        check_range(&self.name, from, to)?;
        if from == to {
            return Ok(None);
        }

        let mut pass = Pass::new(record);
        for converter in self.converters.between(from, to) {
            let at = converter.version();
            let migration = Migration::new(registry, &self.name, from, to, at);
            let hooks = self.hooks.floor(at).unwrap_or_default();
            pass.pre_hooks(hooks, &migration)?;
            pass.apply(converter.transform(), &migration)?;
            pass.post_hooks(hooks, &migration)?;
        }

        let migration = Migration::new(registry, &self.name, from, to, to);
        let hooks = self.hooks.floor(to).unwrap_or_default();
        pass.pre_hooks(hooks, &migration)?;
        pass.post_hooks(hooks, &migration)?;

        Ok(pass.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::rule;

    #[test]
    fn test_scalar_converters_and_hooks() {
        let mut biome = ScalarSchemaType::new("Biome");
        biome
            .add_converter(Converter::new(
                VersionKey::of(1901),
                rule(|record, m| {
                    let name = m.expect_str(record)?;
                    Ok((name == "minecraft:mutated_plains")
                        .then(|| Record::from("minecraft:sunflower_plains")))
                }),
            ))
            .unwrap();
        biome.add_hook(
            VersionKey::of(1900),
            Hook::new().with_post(|record, _| {
                Ok(record
                    .as_str()
                    .filter(|name| !name.contains(':'))
                    .map(|name| Record::from(format!("minecraft:{name}"))))
            }),
        );

        let mut registry = TypeRegistry::new();
        registry.freeze().unwrap();

        let out = biome
            .convert(&registry, &Record::from("minecraft:mutated_plains"), VersionKey::of(1900), VersionKey::of(1950))
            .unwrap();
        assert_eq!(out, Some(Record::from("minecraft:sunflower_plains")));

        let out = biome
            .convert(&registry, &Record::from("ocean"), VersionKey::of(1900), VersionKey::of(1950))
            .unwrap();
        assert_eq!(out, Some(Record::from("minecraft:ocean")));

        let err = biome
            .convert(&registry, &Record::Int(1), VersionKey::of(1900), VersionKey::of(1950))
            .unwrap_err();
        assert!(matches!(err, crate::error::MigrationError::TypeMismatch { .. }));
    }
}
