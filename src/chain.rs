//! Converter chains

use crate::error::{MigrationError, Result};
use crate::rules::Converter;
use crate::version::VersionKey;

/// The version-ordered converters of one schema type
///
/// Converters sharing a key run in registration order; a converter keyed below the chain's
/// latest key is rejected.
#[derive(Clone, Default)]
pub struct ConverterChain {
    converters: Vec<Converter>,
}

impl ConverterChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a converter, enforcing ascending registration
    ///
    /// A converter at the same key as the latest is accepted and runs after it; several
    /// identifier converters share the key of the change they belong to.
    pub fn push(&mut self, type_name: &str, converter: Converter) -> Result<()> {
        if let Some(latest) = self.latest() {
            if converter.version() < latest {
                return Err(MigrationError::OutOfOrder {
                    type_name: type_name.to_string(),
                    version: converter.version(),
                    latest,
                });
            }
        }
        self.converters.push(converter);
        Ok(())
    }

    /// Converters with `from < version <= to`, ascending
    pub fn between(&self, from: VersionKey, to: VersionKey) -> impl Iterator<Item = &Converter> {
        let start = self.converters.partition_point(|c| c.version() <= from);
        let end = self.converters.partition_point(|c| c.version() <= to).max(start);
        self.converters[start..end].iter()
    }

    pub fn latest(&self) -> Option<VersionKey> {
        self.converters.last().map(Converter::version)
    }

    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::rule;

    fn converter(major: u32) -> Converter {
        Converter::new(VersionKey::of(major), rule(|_, _| Ok(None)))
    }

    #[test]
    fn test_strict_order() {
        let mut chain = ConverterChain::new();
        chain.push("Item", converter(3)).unwrap();
        chain.push("Item", converter(5)).unwrap();

        let err = chain.push("Item", converter(4)).unwrap_err();
        assert!(matches!(err, MigrationError::OutOfOrder { ref type_name, .. } if type_name == "Item"));
        assert_eq!(chain.len(), 2);

        // same key as the latest
        chain.push("Item", converter(5)).unwrap();
        assert_eq!(chain.len(), 3);
    }

    #[test]
    fn test_between_is_half_open() {
        let mut chain = ConverterChain::new();
        for major in [100, 102, 102, 705, 1451] {
            chain.push("Entity", converter(major)).unwrap();
        }

        let fired: Vec<_> = chain
            .between(VersionKey::of(100), VersionKey::of(705))
            .map(|c| c.version().major())
            .collect();
        assert_eq!(fired, vec![102, 102, 705]);

        assert_eq!(chain.between(VersionKey::of(705), VersionKey::of(705)).count(), 0);
        assert_eq!(chain.between(VersionKey::of(2000), VersionKey::of(99)).count(), 0);
    }
}
