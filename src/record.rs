use crate::error::{EngineError, Result};
use crate::schema::Schema;
use crate::value::Value;

/// A fixed-length tuple of values anchored to a schema's positional order.
/// Immutable after construction.
#[derive(Debug, Clone)]
pub struct Record {
    values: Vec<Value>,
}

impl Record {
    pub fn new(schema: &Schema, values: Vec<Value>) -> Result<Self> {
        if values.len() != schema.len() {
            return Err(EngineError::ArityMismatch {
                expected: schema.len(),
                found: values.len(),
            });
        }
        Ok(Self { values })
    }

    pub fn value(&self, index: usize) -> &Value {
        &self.values[index]
    }

    pub fn get(&self, schema: &Schema, name: &str) -> Option<&Value> {
        schema.index_of(name).map(|i| &self.values[i])
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// The projection of this record onto the given positional indices, in order —
    /// used to build a table's key-tuple or an aggregation's group key.
    pub fn project(&self, indices: &[usize]) -> Vec<Value> {
        indices.iter().map(|&i| self.values[i].clone()).collect()
    }
}
