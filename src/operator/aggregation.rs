use std::collections::HashMap;

use crate::error::{EngineError, Result};
use crate::operator::{Operator, RecordStream};
use crate::record::Record;
use crate::schema::{Schema, SchemaBuilder};
use crate::value::Value;

/// One of the five known aggregate functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateKind {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl AggregateKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "count" => Some(Self::Count),
            "sum" => Some(Self::Sum),
            "avg" => Some(Self::Avg),
            "min" => Some(Self::Min),
            "max" => Some(Self::Max),
            _ => None,
        }
    }
}

/// An aggregate description resolved by the query compiler: which function,
/// which argument attribute, and the output attribute name.
#[derive(Debug, Clone)]
pub struct AggregateSpec {
    pub kind: AggregateKind,
    pub argument: String,
    pub output_name: String,
}

/// Mutable accumulator state for one aggregate, one group. Expressed as an
/// enum with inherent `update`/`merge`/`finish` methods rather than a boxed
/// trait object: the set of functions is closed and known at compile time, so
/// there is no need to erase the type and no heterogeneous-merge problem to
/// solve.
#[derive(Clone)]
enum Accumulator {
    Count(i64),
    Sum(Option<Value>),
    Avg { sum: Option<Value>, count: i64 },
    Min(Option<Value>),
    Max(Option<Value>),
}

fn add(a: &Value, b: &Value) -> Value {
    match (a, b) {
        (Value::Integer(x), Value::Integer(y)) => Value::Integer(x + y),
        (x, y) => Value::Floating(as_f64(x) + as_f64(y)),
    }
}

fn as_f64(v: &Value) -> f64 {
    match v {
        Value::Integer(i) => *i as f64,
        Value::Floating(f) => *f,
        Value::Text(_) => 0.0,
    }
}

impl Accumulator {
    fn new(kind: AggregateKind) -> Self {
        match kind {
            AggregateKind::Count => Accumulator::Count(0),
            AggregateKind::Sum => Accumulator::Sum(None),
            AggregateKind::Avg => Accumulator::Avg { sum: None, count: 0 },
            AggregateKind::Min => Accumulator::Min(None),
            AggregateKind::Max => Accumulator::Max(None),
        }
    }

    fn update(&mut self, value: &Value) -> Result<()> {
        match self {
            Accumulator::Count(n) => *n += 1,
            Accumulator::Sum(current) => {
                let numeric = value.as_number()?;
                *current = Some(match current.take() {
                    Some(acc) => add(&acc, &numeric),
                    None => numeric,
                });
            }
            Accumulator::Avg { sum, count } => {
                let numeric = value.as_number()?;
                *sum = Some(match sum.take() {
                    Some(acc) => add(&acc, &numeric),
                    None => numeric,
                });
                *count += 1;
            }
            Accumulator::Min(current) => {
                if current.as_ref().map_or(true, |c| value_less_than(value, c)) {
                    *current = Some(value.clone());
                }
            }
            Accumulator::Max(current) => {
                if current.as_ref().map_or(true, |c| value_less_than(c, value)) {
                    *current = Some(value.clone());
                }
            }
        }
        Ok(())
    }

    /// Commutatively combines two states as if they had processed the
    /// concatenation of their inputs. Only meaningful between two accumulators
    /// of the same kind; used by a parallel collector should one ever be built
    /// on top of this pipeline (see the concurrency notes in the crate docs).
    fn merge(&mut self, other: Accumulator) {
        match (self, other) {
            (Accumulator::Count(a), Accumulator::Count(b)) => *a += b,
            (Accumulator::Sum(a), Accumulator::Sum(b)) => {
                *a = match (a.take(), b) {
                    (Some(x), Some(y)) => Some(add(&x, &y)),
                    (Some(x), None) => Some(x),
                    (None, y) => y,
                };
            }
            (Accumulator::Avg { sum: sa, count: ca }, Accumulator::Avg { sum: sb, count: cb }) => {
                *sa = match (sa.take(), sb) {
                    (Some(x), Some(y)) => Some(add(&x, &y)),
                    (Some(x), None) => Some(x),
                    (None, y) => y,
                };
                *ca += cb;
            }
            (Accumulator::Min(a), Accumulator::Min(b)) => {
                if let Some(b) = b {
                    if a.as_ref().map_or(true, |a| value_less_than(&b, a)) {
                        *a = Some(b);
                    }
                }
            }
            (Accumulator::Max(a), Accumulator::Max(b)) => {
                if let Some(b) = b {
                    if a.as_ref().map_or(true, |a| value_less_than(a, &b)) {
                        *a = Some(b);
                    }
                }
            }
            _ => unreachable!("merge is only ever called between same-kind accumulators"),
        }
    }

    fn finish(&self) -> Value {
        match self {
            Accumulator::Count(n) => Value::Integer(*n),
            Accumulator::Sum(v) => v.clone().unwrap_or(Value::Integer(0)),
            Accumulator::Avg { sum, count } => {
                let count = *count;
                match sum {
                    Some(Value::Integer(i)) if count > 0 => Value::Integer(i / count),
                    Some(v) if count > 0 => Value::Floating(as_f64(v) / count as f64),
                    _ => Value::Integer(0),
                }
            }
            Accumulator::Min(v) | Accumulator::Max(v) => v.clone().unwrap_or(Value::Integer(0)),
        }
    }
}

fn value_less_than(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Text(x), Value::Text(y)) => x < y,
        _ => as_f64(a) < as_f64(b),
    }
}

/// Partitions the input into groups keyed by grouping-attribute values and
/// maintains one accumulator per aggregate spec per group. Consumes the full
/// input eagerly. Groups are emitted in insertion-order-of-first-key-seen.
pub struct Aggregation {
    child: Box<dyn Operator>,
    group_indices: Vec<usize>,
    specs: Vec<(AggregateKind, usize, String)>,
    schema: Schema,
}

impl Aggregation {
    pub fn new(
        child: Box<dyn Operator>,
        group_attrs: &[String],
        specs: &[AggregateSpec],
    ) -> Result<Self> {
        let child_schema = child.schema();
        let group_indices = group_attrs
            .iter()
            .map(|name| {
                child_schema
                    .index_of(name)
                    .ok_or_else(|| EngineError::UnboundVariable(name.clone()))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut resolved_specs = Vec::with_capacity(specs.len());
        let mut builder = SchemaBuilder::new();
        for name in group_attrs {
            builder = builder.attribute(name.clone())?;
        }
        for spec in specs {
            let idx = child_schema
                .index_of(&spec.argument)
                .ok_or_else(|| EngineError::UnboundVariable(spec.argument.clone()))?;
            resolved_specs.push((spec.kind, idx, spec.output_name.clone()));
            builder = builder.attribute(spec.output_name.clone())?;
        }
        let schema = builder.build()?;

        Ok(Self {
            child,
            group_indices,
            specs: resolved_specs,
            schema,
        })
    }
}

impl Operator for Aggregation {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn stream(&self) -> RecordStream {
        let mut order: Vec<Vec<Value>> = Vec::new();
        let mut groups: HashMap<Vec<Value>, usize> = HashMap::new();
        let mut states: Vec<Vec<Accumulator>> = Vec::new();

        for item in self.child.stream() {
            let record = match item {
                Ok(r) => r,
                Err(e) => return Box::new(std::iter::once(Err(e))),
            };
            let key = record.project(&self.group_indices);
            let group_idx = *groups.entry(key.clone()).or_insert_with(|| {
                order.push(key);
                states.push(
                    self.specs
                        .iter()
                        .map(|(kind, _, _)| Accumulator::new(*kind))
                        .collect(),
                );
                states.len() - 1
            });
            for (acc, (_, arg_idx, _)) in states[group_idx].iter_mut().zip(self.specs.iter()) {
                if let Err(e) = acc.update(record.value(*arg_idx)) {
                    return Box::new(std::iter::once(Err(e)));
                }
            }
        }

        let schema = self.schema.clone();
        let mut output = Vec::with_capacity(order.len());
        for (key, accs) in order.into_iter().zip(states.into_iter()) {
            let mut values = key;
            values.extend(accs.iter().map(Accumulator::finish));
            match Record::new(&schema, values) {
                Ok(r) => output.push(Ok(r)),
                Err(e) => {
                    output.push(Err(e));
                    break;
                }
            }
        }
        Box::new(output.into_iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::Scan;
    use crate::schema::SchemaBuilder;
    use crate::table::Table;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn employees_table() -> Rc<RefCell<Table>> {
        let schema = SchemaBuilder::new()
            .attribute("employeeNumber")
            .unwrap()
            .attribute("zipCode")
            .unwrap()
            .key(["employeeNumber"])
            .build()
            .unwrap();
        let table = Rc::new(RefCell::new(Table::new(schema)));
        for (n, zip) in [("E00", 1), ("E01", 1), ("E02", 2)] {
            table
                .borrow_mut()
                .insert_record(vec![Value::Text(n.into()), Value::Integer(zip)])
                .unwrap();
        }
        table
    }

    #[test]
    fn count_with_no_grouping_yields_one_row() {
        let table = employees_table();
        let scan = Box::new(Scan::new(table));
        let agg = Aggregation::new(
            scan,
            &[],
            &[AggregateSpec {
                kind: AggregateKind::Count,
                argument: "employeeNumber".to_string(),
                output_name: "count".to_string(),
            }],
        )
        .unwrap();
        let rows: Vec<Record> = agg.stream().collect::<Result<Vec<Record>>>().unwrap();
        assert_eq!(rows.len(), 1);
        assert!(matches!(rows[0].value(0), Value::Integer(3)));
    }

    #[test]
    fn group_by_partitions_and_counts_per_group() {
        let table = employees_table();
        let scan = Box::new(Scan::new(table));
        let agg = Aggregation::new(
            scan,
            &["zipCode".to_string()],
            &[AggregateSpec {
                kind: AggregateKind::Count,
                argument: "employeeNumber".to_string(),
                output_name: "employeeCount".to_string(),
            }],
        )
        .unwrap();
        let rows: Vec<Record> = agg.stream().collect::<Result<Vec<Record>>>().unwrap();
        assert_eq!(rows.len(), 2);
        let first = rows.iter().find(|r| matches!(r.value(0), Value::Integer(1))).unwrap();
        assert!(matches!(first.value(1), Value::Integer(2)));
    }
}
