//! Version keys
//!
//! Every rule in the engine is keyed by a `(major, step)` pair. `major` is the DataVersion a
//! record was written under; `step` orders several breaking changes that share one DataVersion.
//! The pair is packed into a single `u64` so every lookup is an integer comparison:
//!
//! ```text
//!  63            40 39                          8 7        0
//! +----------------+-----------------------------+----------+
//! |   zero (24)    |        major (u32)          | step (8) |
//! +----------------+-----------------------------+----------+
//! ```
//!
//! The layout is fixed for the lifetime of a build; keys are never persisted.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{MigrationError, Result};

/// Number of low bits reserved for the step
pub const STEP_BITS: u32 = 8;

/// Largest step accepted by [`VersionKey::new`]
pub const MAX_STEP: u32 = (1 << STEP_BITS) - 1;

/// Pack `(major, step)` into its ordered integer form
pub fn encode(major: u32, step: u32) -> Result<u64> {
    if step > MAX_STEP {
        return Err(MigrationError::StepOutOfRange { major, step });
    }
    Ok(((major as u64) << STEP_BITS) | step as u64)
}

/// Split a packed key back into `(major, step)`
pub fn decode(key: u64) -> (u32, u32) {
    ((key >> STEP_BITS) as u32, (key & MAX_STEP as u64) as u32)
}

/// A totally ordered `(major, step)` schema version
///
/// Serialized in its display form (`"1451.3"`); a bare integer deserializes as a DataVersion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionKey(u64);

impl VersionKey {
    /// The lowest possible key
    pub const MIN: VersionKey = VersionKey(0);

    /// Create a key, rejecting steps outside `0..=MAX_STEP`
    pub fn new(major: u32, step: u32) -> Result<Self> {
        encode(major, step).map(Self)
    }

    /// Key for a plain DataVersion (step 0)
    pub const fn of(major: u32) -> Self {
        Self((major as u64) << STEP_BITS)
    }

    /// The DataVersion part
    pub const fn major(self) -> u32 {
        (self.0 >> STEP_BITS) as u32
    }

    /// The sub-step part
    pub const fn step(self) -> u32 {
        (self.0 & MAX_STEP as u64) as u32
    }

    /// The packed integer
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl From<u32> for VersionKey {
    fn from(major: u32) -> Self {
        Self::of(major)
    }
}

impl fmt::Display for VersionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.step() {
            0 => write!(f, "{}", self.major()),
            step => write!(f, "{}.{}", self.major(), step),
        }
    }
}

impl Serialize for VersionKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum VersionRepr {
    Major(u32),
    Text(String),
}

impl<'de> Deserialize<'de> for VersionKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        match VersionRepr::deserialize(deserializer)? {
            VersionRepr::Major(major) => Ok(Self::of(major)),
            VersionRepr::Text(text) => text.parse().map_err(de::Error::custom),
        }
    }
}

impl FromStr for VersionKey {
    type Err = MigrationError;

    /// Parse `"1451"` or `"1451.3"`
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || MigrationError::InvalidVersion(s.to_string());
        let (major, step) = match s.trim().split_once('.') {
            Some((major, step)) => (major, step),
            None => (s.trim(), "0"),
        };
        let major = major.parse::<u32>().map_err(|_| invalid())?;
        let step = step.parse::<u32>().map_err(|_| invalid())?;
        Self::new(major, step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding_is_lexicographic() {
        let keys = [
            VersionKey::new(99, 0).unwrap(),
            VersionKey::new(99, 1).unwrap(),
            VersionKey::new(99, MAX_STEP).unwrap(),
            VersionKey::new(100, 0).unwrap(),
            VersionKey::new(1451, 7).unwrap(),
            VersionKey::new(2730, 0).unwrap(),
        ];
        assert!(keys.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_decode() {
        let key = encode(1451, 3).unwrap();
        assert_eq!(decode(key), (1451, 3));

        let key = VersionKey::new(u32::MAX, MAX_STEP).unwrap();
        assert_eq!(key.major(), u32::MAX);
        assert_eq!(key.step(), MAX_STEP);
    }

    #[test]
    fn test_step_out_of_range() {
        let err = VersionKey::new(1451, MAX_STEP + 1).unwrap_err();
        assert!(matches!(err, MigrationError::StepOutOfRange { major: 1451, .. }));
    }

    #[test]
    fn test_display_and_parse() {
        assert_eq!(VersionKey::of(705).to_string(), "705");
        assert_eq!(VersionKey::new(1451, 3).unwrap().to_string(), "1451.3");

        assert_eq!("1451.3".parse::<VersionKey>().unwrap(), VersionKey::new(1451, 3).unwrap());
        assert_eq!("99".parse::<VersionKey>().unwrap(), VersionKey::of(99));
        assert!("abc".parse::<VersionKey>().is_err());
        assert!("1451.999".parse::<VersionKey>().is_err());
    }

    #[test]
    fn test_serde_uses_display_form() {
        let key = VersionKey::new(1451, 3).unwrap();
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"1451.3\"");
        assert_eq!(serde_json::to_string(&VersionKey::of(2730)).unwrap(), "\"2730\"");

        assert_eq!(serde_json::from_str::<VersionKey>("\"1451.3\"").unwrap(), key);
        assert_eq!(serde_json::from_str::<VersionKey>("2730").unwrap(), VersionKey::of(2730));
        assert!(serde_json::from_str::<VersionKey>("\"1451.x\"").is_err());
    }
}
