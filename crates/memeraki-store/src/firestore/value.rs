//! Encoding of field values into Firestore's typed JSON representation.

use std::collections::BTreeMap;

use memeraki_model::FieldValue;
use serde_json::{Map, Value, json};

/// Encode one value. Integers travel as strings, as the REST API requires
/// for 64-bit values.
pub fn encode_value(value: &FieldValue) -> Value {
    match value {
        FieldValue::Text(text) => json!({ "stringValue": text }),
        FieldValue::Integer(n) => json!({ "integerValue": n.to_string() }),
        FieldValue::Float(n) => json!({ "doubleValue": n }),
        FieldValue::Boolean(b) => json!({ "booleanValue": b }),
        FieldValue::List(items) => {
            let values: Vec<Value> = items
                .iter()
                .map(|item| json!({ "stringValue": item }))
                .collect();
            json!({ "arrayValue": { "values": values } })
        }
    }
}

/// Encode a document's field map.
pub fn encode_fields(fields: &BTreeMap<String, FieldValue>) -> Value {
    let map: Map<String, Value> = fields
        .iter()
        .map(|(name, value)| (name.clone(), encode_value(value)))
        .collect();
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_encoding() {
        assert_eq!(
            encode_value(&FieldValue::from("Warli")),
            json!({ "stringValue": "Warli" })
        );
        assert_eq!(
            encode_value(&FieldValue::Integer(-42)),
            json!({ "integerValue": "-42" })
        );
        assert_eq!(
            encode_value(&FieldValue::Float(2.5)),
            json!({ "doubleValue": 2.5 })
        );
        assert_eq!(
            encode_value(&FieldValue::Boolean(false)),
            json!({ "booleanValue": false })
        );
    }

    #[test]
    fn list_encoding() {
        let value = FieldValue::List(vec!["Hindi".to_string(), "Maithili".to_string()]);
        assert_eq!(
            encode_value(&value),
            json!({ "arrayValue": { "values": [
                { "stringValue": "Hindi" },
                { "stringValue": "Maithili" }
            ] } })
        );
    }

    #[test]
    fn field_map_encoding() {
        let fields = BTreeMap::from([
            ("name".to_string(), FieldValue::from("Gond")),
            ("artist_count".to_string(), FieldValue::Integer(12)),
        ]);
        assert_eq!(
            encode_fields(&fields),
            json!({
                "name": { "stringValue": "Gond" },
                "artist_count": { "integerValue": "12" }
            })
        );
    }
}
