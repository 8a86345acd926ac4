use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::schedule::canonical::{Evidence, Tier};
use crate::schedule::loose::{number_loose, read_optional_bool, read_optional_string};

/// One untrusted schedule record as emitted by the extraction service.
///
/// Every field is optional and loosely typed, so the record keeps the raw
/// object and exposes tolerant accessors instead of a fixed struct.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateSchedule {
    fields: Map<String, Value>,
}

impl CandidateSchedule {
    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self { fields }),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key).filter(|value| !value.is_null())
    }

    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn text(&self, key: &str) -> Option<String> {
        read_optional_string(self.get(key))
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        number_loose(self.get(key))
    }

    pub fn flag(&self, key: &str) -> Option<bool> {
        read_optional_bool(self.get(key))
    }

    pub fn tiers(&self) -> Vec<Tier> {
        let Some(items) = self.get("tiers").and_then(Value::as_array) else {
            return Vec::new();
        };
        items
            .iter()
            .filter_map(Value::as_object)
            .map(|tier| Tier {
                tier_name: read_optional_string(tier.get("tier_name")),
                price: number_loose(tier.get("price")),
                applied_when: read_optional_string(tier.get("applied_when")),
                min_quantity: number_loose(tier.get("min_quantity")),
            })
            .collect()
    }

    pub fn evidence(&self) -> Vec<Evidence> {
        let Some(items) = self.get("evidence").and_then(Value::as_array) else {
            return Vec::new();
        };
        items
            .iter()
            .filter_map(Value::as_object)
            .map(|entry| Evidence {
                page: number_loose(entry.get("page")).map(|page| page.round() as i64),
                snippet: read_optional_string(entry.get("snippet")),
                field_supported: read_optional_string(entry.get("field_supported")),
            })
            .collect()
    }

    pub fn issues(&self) -> Vec<String> {
        let Some(items) = self.get("issues").and_then(Value::as_array) else {
            return Vec::new();
        };
        items
            .iter()
            .filter_map(Value::as_str)
            .map(std::string::ToString::to_string)
            .collect()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }
}

impl From<Map<String, Value>> for CandidateSchedule {
    fn from(fields: Map<String, Value>) -> Self {
        Self::from_map(fields)
    }
}
