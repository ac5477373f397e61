use std::collections::BTreeMap;

use crate::error::{EngineError, Result};
use crate::record::Record;
use crate::schema::Schema;
use crate::value::Value;

/// A schema plus a sorted index from key-tuple to record, exposing only
/// insert-if-absent, lookup-by-key, full scan in key order, and
/// match-by-common-attributes — the operator pipeline's only view onto a
/// table's contents.
pub struct Table {
    schema: Schema,
    key_indices: Vec<usize>,
    index: BTreeMap<Vec<Value>, Record>,
}

impl Table {
    pub(crate) fn new(schema: Schema) -> Self {
        let key_indices = schema
            .key()
            .iter()
            .map(|name| schema.index_of(name).expect("key attribute in schema"))
            .collect();
        Self {
            schema,
            key_indices,
            index: BTreeMap::new(),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn insert_record(&mut self, values: Vec<Value>) -> Result<Record> {
        let record = Record::new(&self.schema, values)?;
        let key = record.project(&self.key_indices);
        if self.index.contains_key(&key) {
            tracing::debug!(table = ?self.schema.attributes(), "rejected duplicate key");
            return Err(EngineError::DuplicateKey);
        }
        tracing::debug!(table = ?self.schema.attributes(), "inserted record");
        self.index.insert(key, record.clone());
        Ok(record)
    }

    pub fn find_by_key(&self, key: &[Value]) -> Option<&Record> {
        self.index.get(key)
    }

    /// Records in key order.
    pub fn scan(&self) -> impl Iterator<Item = &Record> {
        self.index.values()
    }

    /// Finds every record matching `probe` on the given common attributes. Uses
    /// the fast path — a single key-tuple lookup — when `common` is a superset
    /// of this table's primary key; otherwise falls back to a linear scan.
    pub fn match_common(
        &self,
        common: &[String],
        probe: &Record,
        probe_schema: &Schema,
    ) -> Vec<&Record> {
        let key = self.schema.key();
        let can_use_key = !key.is_empty() && key.iter().all(|k| common.iter().any(|c| c == k));

        let agrees = |candidate: &Record| {
            common.iter().all(|attr| {
                let li = probe_schema.index_of(attr).expect("common attr in probe schema");
                let ri = self.schema.index_of(attr).expect("common attr in table schema");
                probe.value(li) == candidate.value(ri)
            })
        };

        if can_use_key {
            let key_tuple: Vec<Value> = key
                .iter()
                .map(|k| {
                    probe
                        .value(probe_schema.index_of(k).expect("common attr in probe schema"))
                        .clone()
                })
                .collect();
            match self.index.get(&key_tuple) {
                Some(candidate) if agrees(candidate) => vec![candidate],
                _ => Vec::new(),
            }
        } else {
            self.index.values().filter(|r| agrees(r)).collect()
        }
    }
}
