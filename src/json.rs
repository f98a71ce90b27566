//! JSON bridge
//!
//! Some record families (advancements, stats, options) are stored as JSON rather than in the
//! binary tag format. They are mapped onto [`Record`] so one engine migrates both:
//! integers become `Long`, other numbers `Double`, booleans `Byte`. `null` and integers past
//! `i64::MAX` have no record form.

use serde_json::{Map, Number, Value};

use crate::error::{MigrationError, Result};
use crate::record::{Compound, Record};

impl TryFrom<Value> for Record {
    type Error = MigrationError;

    fn try_from(value: Value) -> Result<Self> {
        Ok(match value {
            Value::Null => return Err(MigrationError::InvalidRecord("null has no record form".into())),
            Value::Bool(b) => Record::from(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Record::Long(i),
                None if n.is_u64() => {
                    return Err(MigrationError::InvalidRecord(format!("integer {n} does not fit in a long")))
                }
                None => Record::Double(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => Record::String(s),
            Value::Array(items) => Record::List(
                items
                    .into_iter()
                    .map(Record::try_from)
                    .collect::<Result<Vec<_>>>()?,
            ),
            Value::Object(map) => Record::Compound(
                map.into_iter()
                    .map(|(k, v)| Record::try_from(v).map(|r| (k, r)))
                    .collect::<Result<Compound>>()?,
            ),
        })
    }
}

fn float(value: f64) -> Value {
    Number::from_f64(value).map(Value::Number).unwrap_or(Value::Null)
}

impl From<&Record> for Value {
    fn from(record: &Record) -> Self {
        match record {
            Record::Byte(v) => Value::from(*v),
            Record::Short(v) => Value::from(*v),
            Record::Int(v) => Value::from(*v),
            Record::Long(v) => Value::from(*v),
            Record::Float(v) => float(*v as f64),
            Record::Double(v) => float(*v),
            Record::String(s) => Value::String(s.clone()),
            Record::ByteArray(items) => items.iter().map(|v| Value::from(*v)).collect(),
            Record::IntArray(items) => items.iter().map(|v| Value::from(*v)).collect(),
            Record::LongArray(items) => items.iter().map(|v| Value::from(*v)).collect(),
            Record::List(items) => items.iter().map(Value::from).collect(),
            Record::Compound(compound) => Value::Object(
                compound
                    .iter()
                    .map(|(k, v)| (k.to_string(), Value::from(v)))
                    .collect::<Map<_, _>>(),
            ),
        }
    }
}

/// Parse a JSON document into a record
pub fn from_str(text: &str) -> Result<Record> {
    let value: Value = serde_json::from_str(text)?;
    Record::try_from(value)
}

/// Render a record as JSON
pub fn to_string(record: &Record, pretty: bool) -> Result<String> {
    let value = Value::from(record);
    Ok(if pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_to_record() {
        let record = Record::try_from(json!({
            "id": "minecraft:stick",
            "Count": 1,
            "Health": 0.5,
            "Glowing": true,
            "Pos": [1.0, 64.0, -3.5]
        }))
        .unwrap();

        let compound = record.as_compound().unwrap();
        assert_eq!(compound.get("Count"), Some(&Record::Long(1)));
        assert_eq!(compound.get("Health"), Some(&Record::Double(0.5)));
        assert_eq!(compound.get("Glowing"), Some(&Record::Byte(1)));
        assert_eq!(compound.get_list("Pos").map(<[Record]>::len), Some(3));
    }

    #[test]
    fn test_null_is_rejected() {
        assert!(Record::try_from(json!({"a": null})).is_err());
    }

    #[test]
    fn test_oversized_integer_is_rejected() {
        let err = Record::try_from(json!({"seed": u64::MAX})).unwrap_err();
        assert!(matches!(err, MigrationError::InvalidRecord(_)));

        assert_eq!(Record::try_from(json!(i64::MAX)).unwrap(), Record::Long(i64::MAX));
        assert_eq!(Record::try_from(json!(1.5)).unwrap(), Record::Double(1.5));
    }

    #[test]
    fn test_record_to_json() {
        let mut compound = Compound::new();
        compound.insert("id", "minecraft:zombie");
        compound.insert("UUID", Record::IntArray(vec![1, 2, 3, 4]));
        compound.insert("Motion", Record::List(vec![Record::Float(f32::NAN)]));

        let value = Value::from(&Record::Compound(compound));
        assert_eq!(value["id"], "minecraft:zombie");
        assert_eq!(value["UUID"], json!([1, 2, 3, 4]));
        assert_eq!(value["Motion"], json!([null]));
    }

    #[test]
    fn test_text_roundtrip() {
        let text = r#"{"id":"minecraft:stick","tag":{"dmg":1}}"#;
        let record = from_str(text).unwrap();
        assert_eq!(to_string(&record, false).unwrap(), text);
    }
}
