//! Base implementation of records.
use crate::error::HarnessError;
use serde::{Deserialize, Serialize};
use std::collections::{
    btree_map::{Iter, Keys},
    BTreeMap,
};

/// Represents possible types of values in a [`Record`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RecordValue {
    /// A scalar, e.g., an episode return or a step count.
    Scalar(f32),

    /// A 1-dimensional array.
    Array1(Vec<f32>),

    /// A 2-dimensional array with its shape.
    Array2(Vec<f32>, [usize; 2]),

    /// A text value.
    String(String),
}

/// A mapping from names to [`RecordValue`]s.
///
/// Keys are kept sorted, so a serialized record is stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record(BTreeMap<String, RecordValue>);

impl Record {
    /// Creates an empty record.
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    /// Creates a record containing a single scalar value.
    pub fn from_scalar(name: impl Into<String>, value: f32) -> Self {
        let mut map = BTreeMap::new();
        map.insert(name.into(), RecordValue::Scalar(value));
        Self(map)
    }

    /// Creates a record from a slice of key-value pairs.
    pub fn from_slice<K: Into<String> + Clone>(s: &[(K, RecordValue)]) -> Self {
        Self(
            s.iter()
                .map(|(k, v)| (k.clone().into(), v.clone()))
                .collect(),
        )
    }

    /// Returns an iterator over the keys in the record.
    pub fn keys(&self) -> Keys<'_, String, RecordValue> {
        self.0.keys()
    }

    /// Inserts a key-value pair, replacing any previous value of the key.
    pub fn insert(&mut self, k: impl Into<String>, v: RecordValue) {
        self.0.insert(k.into(), v);
    }

    /// Returns an iterator over the key-value pairs in the record.
    pub fn iter(&self) -> Iter<'_, String, RecordValue> {
        self.0.iter()
    }

    /// Gets a reference to the value associated with the given key.
    pub fn get(&self, k: &str) -> Option<&RecordValue> {
        self.0.get(k)
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Checks if the record is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Merges two records, consuming both.
    ///
    /// Values of `record` overwrite values of `self` with the same key.
    pub fn merge(self, record: Record) -> Self {
        Record(self.0.into_iter().chain(record.0).collect())
    }

    /// Gets a scalar value from the record.
    pub fn get_scalar(&self, k: &str) -> Result<f32, HarnessError> {
        match self.0.get(k) {
            Some(RecordValue::Scalar(v)) => Ok(*v),
            Some(_) => Err(HarnessError::RecordValueTypeError("Scalar".to_string())),
            None => Err(HarnessError::RecordKeyError(k.to_string())),
        }
    }

    /// Gets a 1-dimensional array from the record.
    pub fn get_array1(&self, k: &str) -> Result<Vec<f32>, HarnessError> {
        match self.0.get(k) {
            Some(RecordValue::Array1(v)) => Ok(v.clone()),
            Some(_) => Err(HarnessError::RecordValueTypeError("Array1".to_string())),
            None => Err(HarnessError::RecordKeyError(k.to_string())),
        }
    }

    /// Gets a string value from the record.
    pub fn get_string(&self, k: &str) -> Result<String, HarnessError> {
        match self.0.get(k) {
            Some(RecordValue::String(s)) => Ok(s.clone()),
            Some(_) => Err(HarnessError::RecordValueTypeError("String".to_string())),
            None => Err(HarnessError::RecordKeyError(k.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_later_wins() {
        let a = Record::from_slice(&[
            ("shared", RecordValue::Scalar(1.0)),
            ("only_a", RecordValue::Scalar(2.0)),
        ]);
        let b = Record::from_slice(&[
            ("shared", RecordValue::Scalar(10.0)),
            ("only_b", RecordValue::String("b".to_string())),
        ]);
        let merged = a.merge(b);

        assert_eq!(merged.len(), 3);
        assert_eq!(merged.get_scalar("shared").unwrap(), 10.0);
        assert_eq!(merged.get_scalar("only_a").unwrap(), 2.0);
        assert_eq!(merged.get_string("only_b").unwrap(), "b");
    }

    #[test]
    fn test_typed_getters_report_errors() {
        let record = Record::from_scalar("loss", 0.5);

        match record.get_array1("loss") {
            Err(HarnessError::RecordValueTypeError(t)) => assert_eq!(t, "Array1"),
            other => panic!("unexpected: {:?}", other),
        }
        match record.get_scalar("missing") {
            Err(HarnessError::RecordKeyError(k)) => assert_eq!(k, "missing"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_json_roundtrip_keeps_variants() {
        let mut record = Record::empty();
        record.insert("w", RecordValue::Array2(vec![1.0, 2.0, 3.0, 4.0], [2, 2]));
        record.insert("name", RecordValue::String("sac".to_string()));

        let s = serde_json::to_string(&record).unwrap();
        let record_: Record = serde_json::from_str(&s).unwrap();
        assert_eq!(record, record_);
    }
}
