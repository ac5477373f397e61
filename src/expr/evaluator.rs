use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{EngineError, Result};
use crate::expr::ast::{Node, VariableSlot};
use crate::expr::parser::ParsedExpr;
use crate::record::Record;
use crate::schema::Schema;
use crate::value::Value;

/// Binds a record's attribute values into an expression's Variable leaves, by a
/// resolved index computed once at construction, then evaluates.
///
/// Cheaply cloneable (an `Rc` clone per variable plus a plain `Vec` of indices)
/// so an operator can hand out its own binding cursor without sharing mutable
/// state with a sibling consumer.
#[derive(Clone)]
pub struct Evaluator {
    root: Node,
    bindings: Vec<(Rc<RefCell<VariableSlot>>, usize)>,
}

impl Evaluator {
    pub fn new(expr: ParsedExpr, schema: &Schema) -> Result<Self> {
        let bindings = expr
            .variables
            .iter()
            .map(|slot| {
                let name = slot.borrow().name.clone();
                schema
                    .index_of(&name)
                    .map(|idx| (slot.clone(), idx))
                    .ok_or(EngineError::UnboundVariable(name))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            root: expr.root,
            bindings,
        })
    }

    fn bind(&self, record: &Record) {
        for (slot, idx) in &self.bindings {
            slot.borrow_mut().bound = Some(record.value(*idx).clone());
        }
    }

    pub fn evaluate_value(&self, record: &Record) -> Result<Value> {
        self.bind(record);
        self.root.evaluate()?.into_value()
    }

    pub fn evaluate_predicate(&self, record: &Record) -> Result<bool> {
        self.bind(record);
        self.root.evaluate()?.into_boolean()
    }
}
