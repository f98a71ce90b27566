//! Rule tables
//!
//! Hooks and walkers apply from the version they were registered at until a newer group
//! replaces them, so they are looked up by floor ("nearest key at or below") rather than by
//! exact key. Groups live in a sorted vector and are found by binary search.

use crate::version::VersionKey;

/// Rules grouped by version key, answering floor queries
#[derive(Clone)]
pub struct RuleTable<T> {
    groups: Vec<(VersionKey, Vec<T>)>,
}

impl<T> RuleTable<T> {
    pub fn new() -> Self {
        Self { groups: Vec::new() }
    }

    /// Add a rule to the group at `key`, keeping registration order within the group
    pub fn insert(&mut self, key: VersionKey, rule: T) {
        match self.groups.binary_search_by_key(&key, |(k, _)| *k) {
            Ok(index) => self.groups[index].1.push(rule),
            Err(index) => self.groups.insert(index, (key, vec![rule])),
        }
    }

    /// The group with the greatest key `<= key`
    pub fn floor(&self, key: VersionKey) -> Option<&[T]> {
        self.floor_entry(key).map(|(_, rules)| rules)
    }

    /// Like [`floor`](Self::floor), also returning the group's own key
    pub fn floor_entry(&self, key: VersionKey) -> Option<(VersionKey, &[T])> {
        let end = self.groups.partition_point(|(k, _)| *k <= key);
        end.checked_sub(1).map(|index| {
            let (k, rules) = &self.groups[index];
            (*k, rules.as_slice())
        })
    }

    /// The group registered at exactly `key`
    pub fn get(&self, key: VersionKey) -> Option<&[T]> {
        self.groups
            .binary_search_by_key(&key, |(k, _)| *k)
            .ok()
            .map(|index| self.groups[index].1.as_slice())
    }

    /// Every group with a key `<= key`, ascending
    pub fn up_to(&self, key: VersionKey) -> impl Iterator<Item = (VersionKey, &[T])> {
        let end = self.groups.partition_point(|(k, _)| *k <= key);
        self.groups[..end].iter().map(|(k, rules)| (*k, rules.as_slice()))
    }

    /// The highest key holding a group
    pub fn last_key(&self) -> Option<VersionKey> {
        self.groups.last().map(|(k, _)| *k)
    }

    /// Number of groups
    pub fn groups(&self) -> usize {
        self.groups.len()
    }

    /// Number of rules across all groups
    pub fn len(&self) -> usize {
        self.groups.iter().map(|(_, rules)| rules.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl<T> Default for RuleTable<T> {
    fn default() -> Self {
        Self::new()
    }
}
