use crate::error::Result;
use crate::expr::{Evaluator, Parser};
use crate::operator::{Operator, RecordStream};
use crate::record::Record;
use crate::schema::{Schema, SchemaBuilder};

/// Rewrites each record through an ordered list of named arithmetic expressions.
/// Per-record evaluation failures propagate, ending the sequence at that record.
pub struct Projection {
    child: Box<dyn Operator>,
    evaluators: Vec<Evaluator>,
    schema: Schema,
}

impl Projection {
    pub fn new(child: Box<dyn Operator>, defs: Vec<(String, &str)>) -> Result<Self> {
        let mut builder = SchemaBuilder::new();
        let mut evaluators = Vec::with_capacity(defs.len());
        for (name, expr) in defs {
            builder = builder.attribute(name)?;
            let parsed = Parser::parse_arithmetic(expr)?;
            evaluators.push(Evaluator::new(parsed, child.schema())?);
        }
        let schema = builder.build()?;
        Ok(Self {
            child,
            evaluators,
            schema,
        })
    }
}

impl Operator for Projection {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn stream(&self) -> RecordStream {
        let evaluators = self.evaluators.clone();
        let schema = self.schema.clone();
        Box::new(self.child.stream().map(move |item| {
            let record = item?;
            let values = evaluators
                .iter()
                .map(|e| e.evaluate_value(&record))
                .collect::<Result<Vec<_>>>()?;
            Record::new(&schema, values)
        }))
    }
}
