//! Standard hooks
//!
//! Identifiers became namespaced (`minecraft:zombie`) at different versions for different
//! record families. These hooks normalize a bare identifier before any converter at or above
//! their checkpoint sees it, so converters only ever match the namespaced form.

use std::sync::OnceLock;

use regex::Regex;

use crate::record::{Record, IDENTIFIER_KEY};
use crate::rules::Hook;

/// Namespace assumed for identifiers without one
pub const DEFAULT_NAMESPACE: &str = "minecraft";

fn resource_location() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?:[a-z0-9_.-]+:)?[a-z0-9_./-]+$").expect("resource location pattern")
    })
}

/// The namespaced form of `value`, or `None` when it is already namespaced or is not a valid
/// resource location (legacy `"Zombie"` style names are left alone)
pub fn namespaced(value: &str) -> Option<String> {
    if value.contains(':') || !resource_location().is_match(value) {
        return None;
    }
    Some(format!("{DEFAULT_NAMESPACE}:{value}"))
}

/// Pre-hook namespacing the string stored under `field` of a compound
pub fn enforce_namespaced(field: &'static str) -> Hook {
    Hook::new().with_pre(move |record: &Record, _| {
        let Some(compound) = record.as_compound() else {
            return Ok(None);
        };
        let Some(fixed) = compound.get_str(field).and_then(namespaced) else {
            return Ok(None);
        };
        let mut compound = compound.clone();
        compound.insert(field, fixed);
        Ok(Some(Record::Compound(compound)))
    })
}

/// Pre-hook namespacing a record's identifier
pub fn enforce_namespaced_id() -> Hook {
    enforce_namespaced(IDENTIFIER_KEY)
}

/// Pre-hook namespacing a bare string value; numeric legacy ids pass through
pub fn enforce_namespaced_value() -> Hook {
    Hook::new().with_pre(|record: &Record, _| Ok(record.as_str().and_then(namespaced).map(Record::from)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespaced() {
        assert_eq!(namespaced("stone"), Some("minecraft:stone".to_string()));
        assert_eq!(namespaced("minecraft:stone"), None);
        assert_eq!(namespaced("Zombie"), None);
        assert_eq!(namespaced("mob/zombie"), Some("minecraft:mob/zombie".to_string()));
        assert_eq!(namespaced(""), None);
    }

    #[test]
    fn test_value_hook_passes_numbers() {
        let hook = enforce_namespaced_value();
        let registry = {
            let mut registry = crate::registry::TypeRegistry::new();
            registry.freeze().unwrap();
            registry
        };
        let key = crate::version::VersionKey::of(99);
        let migration = crate::migration::Migration::new(&registry, "BlockName", key, key, key);
        let pre = hook.pre().unwrap();

        assert_eq!(pre(&Record::Int(1), &migration).unwrap(), None);
        assert_eq!(
            pre(&Record::from("stone"), &migration).unwrap(),
            Some(Record::from("minecraft:stone"))
        );
    }
}
