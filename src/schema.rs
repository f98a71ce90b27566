//! Structured schema types
//!
//! A [`SchemaType`] is the unit of migration for one category of compound record
//! ("Chunk", "Player", "Level"). Conversion runs in a fixed order:
//!
//! 1. every converter with `from < version <= to`, ascending, each bracketed by the hook group
//!    floor-matched at the converter's version (`pre` in order, `post` in reverse);
//! 2. one final pass at `to`: the hook group floor-matched at `to` brackets the walker group
//!    floor-matched at `to`.
//!
//! Structural changes land before walkers recurse, so walkers always see the current shape.

use std::borrow::Cow;

use tracing::trace;

use crate::chain::ConverterChain;
use crate::error::{MigrationError, Result};
use crate::migration::Migration;
use crate::record::Record;
use crate::registry::TypeRegistry;
use crate::rules::{Converter, Hook, RuleFn};
use crate::table::RuleTable;
use crate::version::VersionKey;

/// A record being carried through one `convert` call
///
/// Holds the input by reference until the first rule returns a replacement.
pub(crate) struct Pass<'r> {
    current: Cow<'r, Record>,
    changed: bool,
}

impl<'r> Pass<'r> {
    pub(crate) fn new(record: &'r Record) -> Self {
        Self {
            current: Cow::Borrowed(record),
            changed: false,
        }
    }

    pub(crate) fn current(&self) -> &Record {
        &self.current
    }

    pub(crate) fn apply(&mut self, rule: &RuleFn, migration: &Migration<'_>) -> Result<()> {
        if let Some(replacement) = rule(&*self.current, migration)? {
            self.current = Cow::Owned(replacement);
            self.changed = true;
        }
        Ok(())
    }

    pub(crate) fn apply_all(&mut self, rules: &[RuleFn], migration: &Migration<'_>) -> Result<()> {
        for rule in rules {
            self.apply(rule, migration)?;
        }
        Ok(())
    }

    pub(crate) fn pre_hooks(&mut self, hooks: &[Hook], migration: &Migration<'_>) -> Result<()> {
        for pre in hooks.iter().filter_map(Hook::pre) {
            self.apply(pre, migration)?;
        }
        Ok(())
    }

    pub(crate) fn post_hooks(&mut self, hooks: &[Hook], migration: &Migration<'_>) -> Result<()> {
        for post in hooks.iter().rev().filter_map(Hook::post) {
            self.apply(post, migration)?;
        }
        Ok(())
    }

    pub(crate) fn finish(self) -> Option<Record> {
        self.changed.then(|| self.current.into_owned())
    }
}

/// Precondition shared by every kind of type: versions never run backwards
pub(crate) fn check_range(type_name: &str, from: VersionKey, to: VersionKey) -> Result<()> {
    if from > to {
        return Err(MigrationError::ReversedVersions {
            type_name: type_name.to_string(),
            from,
            to,
        });
    }
    Ok(())
}

/// Per-identifier rules consulted by keyed types at each checkpoint
pub(crate) trait Scoped {
    fn hooks(&self, identifier: Option<&str>, at: VersionKey) -> &[Hook];
    fn walkers(&self, identifier: Option<&str>, at: VersionKey) -> &[RuleFn];
}

/// A migratable category of compound records
pub struct SchemaType {
    name: String,
    converters: ConverterChain,
    hooks: RuleTable<Hook>,
    walkers: RuleTable<RuleFn>,
}

impl SchemaType {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            converters: ConverterChain::new(),
            hooks: RuleTable::new(),
            walkers: RuleTable::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn converters(&self) -> &ConverterChain {
        &self.converters
    }

    pub fn hooks(&self) -> &RuleTable<Hook> {
        &self.hooks
    }

    pub fn walkers(&self) -> &RuleTable<RuleFn> {
        &self.walkers
    }

    pub(crate) fn add_converter(&mut self, converter: Converter) -> Result<()> {
        self.converters.push(&self.name, converter)
    }

    pub(crate) fn add_hook(&mut self, version: VersionKey, hook: Hook) {
        self.hooks.insert(version, hook);
    }

    pub(crate) fn add_walker(&mut self, version: VersionKey, walker: RuleFn) {
        self.walkers.insert(version, walker);
    }

    /// Total number of registered rules
    pub fn rule_count(&self) -> usize {
        self.converters.len() + self.hooks.len() + self.walkers.len()
    }

    pub(crate) fn convert(
        &self,
        registry: &TypeRegistry,
        record: &Record,
        from: VersionKey,
        to: VersionKey,
    ) -> Result<Option<Record>> {
        self.convert_scoped(registry, record, from, to, None)
    }

    pub(crate) fn convert_scoped(
        &self,
        registry: &TypeRegistry,
        record: &Record,
        from: VersionKey,
        to: VersionKey,
        scoped: Option<&dyn Scoped>,
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
            let scoped_hooks = scoped.map_or(&[][..], |s| s.hooks(pass.current().identifier(), at));

            trace!(type_name = %self.name, version = %at, "applying converter");

            pass.pre_hooks(hooks, &migration)?;
            pass.pre_hooks(scoped_hooks, &migration)?;
            pass.apply(converter.transform(), &migration)?;
            pass.post_hooks(scoped_hooks, &migration)?;
            pass.post_hooks(hooks, &migration)?;
        }

        let migration = Migration::new(registry, &self.name, from, to, to);
        let hooks = self.hooks.floor(to).unwrap_or_default();
        let scoped_hooks = scoped.map_or(&[][..], |s| s.hooks(pass.current().identifier(), to));

        pass.pre_hooks(hooks, &migration)?;
        pass.pre_hooks(scoped_hooks, &migration)?;

        pass.apply_all(self.walkers.floor(to).unwrap_or_default(), &migration)?;
        if let Some(scoped) = scoped {
            // identifier walkers follow the structure walkers, keyed by the current identifier
            let walkers = scoped.walkers(pass.current().identifier(), to);
            pass.apply_all(walkers, &migration)?;
        }

        pass.post_hooks(scoped_hooks, &migration)?;
        pass.post_hooks(hooks, &migration)?;

        Ok(pass.finish())
    }
}
