use crate::error::Result;
use crate::expr::{Evaluator, Parser};
use crate::operator::{Operator, RecordStream};
use crate::schema::Schema;

/// Filters a sub-pipeline by a predicate. Per-record evaluation failures are
/// swallowed (the record is dropped, not propagated) — the source behavior.
pub struct Selection {
    child: Box<dyn Operator>,
    evaluator: Evaluator,
}

impl Selection {
    pub fn new(child: Box<dyn Operator>, predicate: &str) -> Result<Self> {
        let parsed = Parser::parse_logical(predicate)?;
        let evaluator = Evaluator::new(parsed, child.schema())?;
        Ok(Self { child, evaluator })
    }
}

impl Operator for Selection {
    fn schema(&self) -> &Schema {
        self.child.schema()
    }

    fn stream(&self) -> RecordStream {
        let evaluator = self.evaluator.clone();
        Box::new(self.child.stream().filter_map(move |item| match item {
            Err(e) => Some(Err(e)),
            Ok(record) => match evaluator.evaluate_predicate(&record) {
                Ok(true) => Some(Ok(record)),
                Ok(false) => None,
                Err(error) => {
                    tracing::trace!(%error, "selection swallowed per-record evaluation error");
                    None
                }
            },
        }))
    }
}
