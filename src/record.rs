//! Records
//!
//! The semi-structured value being migrated: scalars, lists and string-keyed compounds,
//! mirroring the tag set of the stored format.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Reserved compound key holding a record's identifier (`"minecraft:zombie"`)
pub const IDENTIFIER_KEY: &str = "id";

/// Longest fragment of a record quoted in an error message
const FRAGMENT_LIMIT: usize = 256;

/// A record value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Record {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    ByteArray(Vec<i8>),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
    List(Vec<Record>),
    Compound(Compound),
}

/// The shape of a record, used in diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    String,
    ByteArray,
    IntArray,
    LongArray,
    List,
    Compound,
}

impl Kind {
    /// Whether this kind holds a single number
    pub fn is_number(&self) -> bool {
        matches!(
            self,
            Kind::Byte | Kind::Short | Kind::Int | Kind::Long | Kind::Float | Kind::Double
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            Kind::Byte => "byte",
            Kind::Short => "short",
            Kind::Int => "int",
            Kind::Long => "long",
            Kind::Float => "float",
            Kind::Double => "double",
            Kind::String => "string",
            Kind::ByteArray => "byte_array",
            Kind::IntArray => "int_array",
            Kind::LongArray => "long_array",
            Kind::List => "list",
            Kind::Compound => "compound",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Record {
    /// An empty compound
    pub fn compound() -> Self {
        Record::Compound(Compound::new())
    }

    /// The shape of this record
    pub fn kind(&self) -> Kind {
        match self {
            Record::Byte(_) => Kind::Byte,
            Record::Short(_) => Kind::Short,
            Record::Int(_) => Kind::Int,
            Record::Long(_) => Kind::Long,
            Record::Float(_) => Kind::Float,
            Record::Double(_) => Kind::Double,
            Record::String(_) => Kind::String,
            Record::ByteArray(_) => Kind::ByteArray,
            Record::IntArray(_) => Kind::IntArray,
            Record::LongArray(_) => Kind::LongArray,
            Record::List(_) => Kind::List,
            Record::Compound(_) => Kind::Compound,
        }
    }

    pub fn as_compound(&self) -> Option<&Compound> {
        match self {
            Record::Compound(compound) => Some(compound),
            _ => None,
        }
    }

    pub fn as_compound_mut(&mut self) -> Option<&mut Compound> {
        match self {
            Record::Compound(compound) => Some(compound),
            _ => None,
        }
    }

    pub fn into_compound(self) -> Option<Compound> {
        match self {
            Record::Compound(compound) => Some(compound),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Record]> {
        match self {
            Record::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Record::String(value) => Some(value),
            _ => None,
        }
    }

    /// Any integral or floating value, widened to `i64` (floats truncate)
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Record::Byte(v) => Some(v as i64),
            Record::Short(v) => Some(v as i64),
            Record::Int(v) => Some(v as i64),
            Record::Long(v) => Some(v),
            Record::Float(v) => Some(v as i64),
            Record::Double(v) => Some(v as i64),
            _ => None,
        }
    }

    /// Any numeric value, widened to `f64`
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Record::Byte(v) => Some(v as f64),
            Record::Short(v) => Some(v as f64),
            Record::Int(v) => Some(v as f64),
            Record::Long(v) => Some(v as f64),
            Record::Float(v) => Some(v as f64),
            Record::Double(v) => Some(v),
            _ => None,
        }
    }

    /// The identifier of a compound record, if it carries one
    pub fn identifier(&self) -> Option<&str> {
        self.as_compound().and_then(Compound::identifier)
    }

    /// A bounded textual excerpt of this record for error messages
    pub fn fragment(&self) -> String {
        let text = serde_json::Value::from(self).to_string();
        if text.len() <= FRAGMENT_LIMIT {
            return text;
        }
        let mut end = FRAGMENT_LIMIT;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &text[..end])
    }
}

impl From<bool> for Record {
    fn from(value: bool) -> Self {
        Record::Byte(value as i8)
    }
}

impl From<i8> for Record {
    fn from(value: i8) -> Self {
        Record::Byte(value)
    }
}

impl From<i16> for Record {
    fn from(value: i16) -> Self {
        Record::Short(value)
    }
}

impl From<i32> for Record {
    fn from(value: i32) -> Self {
        Record::Int(value)
    }
}

impl From<i64> for Record {
    fn from(value: i64) -> Self {
        Record::Long(value)
    }
}

impl From<f32> for Record {
    fn from(value: f32) -> Self {
        Record::Float(value)
    }
}

impl From<f64> for Record {
    fn from(value: f64) -> Self {
        Record::Double(value)
    }
}

impl From<&str> for Record {
    fn from(value: &str) -> Self {
        Record::String(value.to_string())
    }
}

impl From<String> for Record {
    fn from(value: String) -> Self {
        Record::String(value)
    }
}

impl From<Vec<Record>> for Record {
    fn from(items: Vec<Record>) -> Self {
        Record::List(items)
    }
}

impl From<Compound> for Record {
    fn from(compound: Compound) -> Self {
        Record::Compound(compound)
    }
}

/// A string-keyed map of records
///
/// Key order carries no meaning; a sorted map keeps output deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Compound(BTreeMap<String, Record>);

impl Compound {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Record> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Record> {
        self.0.get_mut(key)
    }

    /// Insert a value, returning the one it replaced
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Record>) -> Option<Record> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Record> {
        self.0.remove(key)
    }

    /// Move the value at `from` to `to`, overwriting `to`. Returns false if `from` is absent.
    pub fn rename(&mut self, from: &str, to: impl Into<String>) -> bool {
        match self.0.remove(from) {
            Some(value) => {
                self.0.insert(to.into(), value);
                true
            }
            None => false,
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Record)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Record::as_str)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Record::as_i64)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Record::as_f64)
    }

    pub fn get_compound(&self, key: &str) -> Option<&Compound> {
        self.get(key).and_then(Record::as_compound)
    }

    pub fn get_compound_mut(&mut self, key: &str) -> Option<&mut Compound> {
        self.get_mut(key).and_then(Record::as_compound_mut)
    }

    pub fn get_list(&self, key: &str) -> Option<&[Record]> {
        self.get(key).and_then(Record::as_list)
    }

    pub fn get_list_mut(&mut self, key: &str) -> Option<&mut Vec<Record>> {
        match self.get_mut(key) {
            Some(Record::List(items)) => Some(items),
            _ => None,
        }
    }

    /// The value of the reserved identifier key
    pub fn identifier(&self) -> Option<&str> {
        self.get_str(IDENTIFIER_KEY)
    }
}

impl FromIterator<(String, Record)> for Compound {
    fn from_iter<I: IntoIterator<Item = (String, Record)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Compound {
    type Item = (String, Record);
    type IntoIter = std::collections::btree_map::IntoIter<String, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rename_and_identifier() {
        let mut item = Compound::new();
        item.insert("id", "minecraft:stick");
        item.insert("tag", Compound::new());

        assert_eq!(item.identifier(), Some("minecraft:stick"));
        assert!(item.rename("tag", "components"));
        assert!(!item.rename("tag", "components"));
        assert!(item.get_compound("components").is_some());
        assert!(!item.contains_key("tag"));
    }

    #[test]
    fn test_numeric_widening() {
        let mut data = Compound::new();
        data.insert("Count", 3i8);
        data.insert("Damage", 7i16);
        data.insert("Health", 20.5f32);

        assert_eq!(data.get_i64("Count"), Some(3));
        assert_eq!(data.get_i64("Damage"), Some(7));
        assert_eq!(data.get_f64("Health"), Some(20.5));
        assert_eq!(data.get_i64("missing"), None);
        assert_eq!(Record::from("x").as_i64(), None);
    }

    #[test]
    fn test_fragment_is_bounded() {
        let long = Record::String("x".repeat(4 * FRAGMENT_LIMIT));
        let fragment = long.fragment();
        assert!(fragment.len() <= FRAGMENT_LIMIT + 3);
        assert!(fragment.ends_with("..."));

        assert_eq!(Record::Int(5).fragment(), "5");
    }

    #[test]
    fn test_kind() {
        assert_eq!(Record::compound().kind(), Kind::Compound);
        assert!(Kind::Short.is_number());
        assert!(!Kind::IntArray.is_number());
        assert_eq!(Kind::LongArray.to_string(), "long_array");
    }
}
