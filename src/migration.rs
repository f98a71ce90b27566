//! Migration context
//!
//! Every rule receives a [`Migration`] describing the call it runs in: the type being
//! converted, the source and target versions, and the checkpoint currently being applied.
//! Walkers use it to recurse into nested records of other types by handle.

use crate::error::{MigrationError, Result};
use crate::record::{Compound, Kind, Record};
use crate::registry::{TypeHandle, TypeRegistry};
use crate::version::VersionKey;

/// The context a rule runs in
#[derive(Clone, Copy)]
pub struct Migration<'a> {
    registry: &'a TypeRegistry,
    type_name: &'a str,
    from: VersionKey,
    to: VersionKey,
    at: VersionKey,
}

impl<'a> Migration<'a> {
    pub(crate) fn new(
        registry: &'a TypeRegistry,
        type_name: &'a str,
        from: VersionKey,
        to: VersionKey,
        at: VersionKey,
    ) -> Self {
        Self {
            registry,
            type_name,
            from,
            to,
            at,
        }
    }

    pub fn registry(&self) -> &'a TypeRegistry {
        self.registry
    }

    /// Name of the type whose rules are running
    pub fn type_name(&self) -> &'a str {
        self.type_name
    }

    /// Version the record was written at
    pub fn from(&self) -> VersionKey {
        self.from
    }

    /// Version the record is being brought to
    pub fn to(&self) -> VersionKey {
        self.to
    }

    /// The checkpoint being applied: a converter's key, or `to` during the final pass
    pub fn at(&self) -> VersionKey {
        self.at
    }

    /// Convert a nested record through another type, over the same version range
    pub fn convert(&self, target: TypeHandle, record: &Record) -> Result<Option<Record>> {
        self.registry.convert_nested(target, record, self.from, self.to)
    }

    /// Convert `parent[field]` through `target`; absent fields are left alone
    pub fn convert_field(
        &self,
        target: TypeHandle,
        parent: &Compound,
        field: &str,
    ) -> Result<Option<Record>> {
        match parent.get(field) {
            Some(child) => self.convert(target, child),
            None => Ok(None),
        }
    }

    /// Convert every element of the list `parent[field]` through `target`
    ///
    /// Returns the replacement list if any element changed. A missing field, or one that is not
    /// a list, is treated as already migrated.
    pub fn convert_list(
        &self,
        target: TypeHandle,
        parent: &Compound,
        field: &str,
    ) -> Result<Option<Record>> {
        let Some(items) = parent.get_list(field) else {
            return Ok(None);
        };
        Ok(self.convert_items(target, items)?.map(Record::List))
    }

    /// Convert each record of a slice through `target`
    pub fn convert_items(&self, target: TypeHandle, items: &[Record]) -> Result<Option<Vec<Record>>> {
        let mut converted: Option<Vec<Record>> = None;
        for (index, item) in items.iter().enumerate() {
            if let Some(replacement) = self.convert(target, item)? {
                converted.get_or_insert_with(|| items.to_vec())[index] = replacement;
            }
        }
        Ok(converted)
    }

    /// Build the error for a record whose shape the current rule cannot handle
    pub fn mismatch(&self, expected: Kind, record: &Record) -> MigrationError {
        MigrationError::TypeMismatch {
            type_name: self.type_name.to_string(),
            version: self.at,
            expected,
            found: record.kind(),
            fragment: record.fragment(),
        }
    }

    /// The record as a compound, or a `TypeMismatch`
    pub fn expect_compound<'r>(&self, record: &'r Record) -> Result<&'r Compound> {
        record
            .as_compound()
            .ok_or_else(|| self.mismatch(Kind::Compound, record))
    }

    /// The record as a string, or a `TypeMismatch`
    pub fn expect_str<'r>(&self, record: &'r Record) -> Result<&'r str> {
        record
            .as_str()
            .ok_or_else(|| self.mismatch(Kind::String, record))
    }
}

/// Copy `parent` with each `(field, value)` replaced, or `None` when there is nothing to replace
pub fn splice(parent: &Compound, changes: Vec<(String, Record)>) -> Option<Record> {
    if changes.is_empty() {
        return None;
    }
    let mut updated = parent.clone();
    for (field, value) in changes {
        updated.insert(field, value);
    }
    Some(Record::Compound(updated))
}
