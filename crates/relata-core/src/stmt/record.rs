use super::Value;

use indexmap::IndexMap;
use std::ops;

/// An insertion-ordered mapping from column (or relation) name to value.
///
/// Payloads handed to the entity engine, key results of inserts and result
/// rows are all records.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Record {
    fields: IndexMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.fields.get_mut(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Inserts a value, returning the previous one. A replaced key keeps its
    /// original position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(name.into(), value.into())
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.shift_remove(name)
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.fields.values()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.fields.iter()
    }

    /// Returns the record restricted to the given names, in the order the
    /// names are given. Missing names are skipped.
    pub fn project<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Record {
        names
            .into_iter()
            .filter_map(|name| {
                self.fields
                    .get(name)
                    .map(|value| (name.to_string(), value.clone()))
            })
            .collect()
    }

    /// Splits the record in two: fields whose name satisfies `f` and the
    /// rest. Order is preserved on both sides.
    pub fn partition(self, mut f: impl FnMut(&str, &Value) -> bool) -> (Record, Record) {
        let mut matched = Record::new();
        let mut rest = Record::new();

        for (name, value) in self.fields {
            if f(&name, &value) {
                matched.fields.insert(name, value);
            } else {
                rest.fields.insert(name, value);
            }
        }

        (matched, rest)
    }
}

impl ops::Index<&str> for Record {
    type Output = Value;

    #[track_caller]
    fn index(&self, name: &str) -> &Value {
        match self.fields.get(name) {
            Some(value) => value,
            None => panic!("record has no field `{name}`; fields={:?}", self.fields.keys()),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Record {
            fields: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl From<serde_json::Value> for Record {
    /// Non-object JSON values produce an empty record.
    fn from(value: serde_json::Value) -> Self {
        match Value::from(value) {
            Value::Record(record) => record,
            _ => Record::new(),
        }
    }
}
