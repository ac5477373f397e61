use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{EngineError, Result};
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

/// A Variable leaf's shared, mutable binding slot. Reference-counted and
/// interior-mutable so that every occurrence of the same name in an AST points
/// at the same slot: binding it once updates every use. This also makes the
/// slot (and therefore any `Node`/`Evaluator` holding one) non-`Send`, which is
/// exactly the property that keeps a single AST from being handed to two
/// parallel workers at once.
#[derive(Debug)]
pub struct VariableSlot {
    pub name: String,
    pub bound: Option<Value>,
}

impl VariableSlot {
    pub fn new(name: impl Into<String>) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self {
            name: name.into(),
            bound: None,
        }))
    }
}

/// The expression AST: a single tagged sum type, one variant per node kind,
/// rather than a class hierarchy. `evaluate` is a match over this enum.
#[derive(Clone)]
pub enum Node {
    Constant(Value),
    Variable(Rc<RefCell<VariableSlot>>),
    Negate(Box<Node>),
    Arithmetic(ArithmeticOp, Box<Node>, Box<Node>),
    Comparison(CompareOp, Box<Node>, Box<Node>),
    Logical(LogicalOp, Box<Node>, Box<Node>),
}

/// The result of evaluating a node: either a scalar Value (constants, variables,
/// arithmetic, negation) or a boolean (comparisons, logical combinations). Kept
/// distinct from `Value` because booleans are not part of the Value union.
pub enum EvalResult {
    Value(Value),
    Boolean(bool),
}

impl EvalResult {
    pub fn into_value(self) -> Result<Value> {
        match self {
            EvalResult::Value(v) => Ok(v),
            EvalResult::Boolean(b) => Err(EngineError::UnsupportedOperation(format!(
                "expected a value, found boolean `{b}`"
            ))),
        }
    }

    pub fn into_boolean(self) -> Result<bool> {
        match self {
            EvalResult::Boolean(b) => Ok(b),
            EvalResult::Value(v) => Err(EngineError::UnsupportedOperation(format!(
                "expected a boolean, found value `{v}`"
            ))),
        }
    }
}

fn numeric_binary(
    op: ArithmeticOp,
    left: Value,
    right: Value,
) -> Result<Value> {
    let left = left.as_number()?;
    let right = right.as_number()?;
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => Ok(Value::Integer(match op {
            ArithmeticOp::Add => a + b,
            ArithmeticOp::Sub => a - b,
            ArithmeticOp::Mul => a * b,
            ArithmeticOp::Div => a / b,
        })),
        (a, b) => {
            let a = as_f64(&a);
            let b = as_f64(&b);
            Ok(Value::Floating(match op {
                ArithmeticOp::Add => a + b,
                ArithmeticOp::Sub => a - b,
                ArithmeticOp::Mul => a * b,
                ArithmeticOp::Div => a / b,
            }))
        }
    }
}

fn as_f64(v: &Value) -> f64 {
    match v {
        Value::Integer(i) => *i as f64,
        Value::Floating(f) => *f,
        Value::Text(_) => unreachable!("as_number already rejects non-numeric text"),
    }
}

fn numeric_compare(op: CompareOp, left: Value, right: Value) -> Result<bool> {
    let left = left.as_number()?;
    let right = right.as_number()?;
    let ordering = match (&left, &right) {
        (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
        _ => as_f64(&left)
            .partial_cmp(&as_f64(&right))
            .unwrap_or(std::cmp::Ordering::Equal),
    };
    Ok(match op {
        CompareOp::Eq => ordering.is_eq(),
        CompareOp::Ne => !ordering.is_eq(),
        CompareOp::Lt => ordering.is_lt(),
        CompareOp::Le => ordering.is_le(),
        CompareOp::Gt => ordering.is_gt(),
        CompareOp::Ge => ordering.is_ge(),
    })
}

impl Node {
    pub fn evaluate(&self) -> Result<EvalResult> {
        match self {
            Node::Constant(v) => Ok(EvalResult::Value(v.clone())),
            Node::Variable(slot) => {
                let slot = slot.borrow();
                slot.bound
                    .clone()
                    .map(EvalResult::Value)
                    .ok_or_else(|| EngineError::UnboundVariable(slot.name.clone()))
            }
            Node::Negate(child) => {
                let value = child.evaluate()?.into_value()?.as_number()?;
                Ok(EvalResult::Value(match value {
                    Value::Integer(i) => Value::Integer(-i),
                    Value::Floating(f) => Value::Floating(-f),
                    Value::Text(_) => unreachable!("as_number already rejects non-numeric text"),
                }))
            }
            Node::Arithmetic(op, left, right) => {
                let left = left.evaluate()?.into_value()?;
                let right = right.evaluate()?.into_value()?;
                Ok(EvalResult::Value(numeric_binary(*op, left, right)?))
            }
            Node::Comparison(op, left, right) => {
                let left = left.evaluate()?.into_value()?;
                let right = right.evaluate()?.into_value()?;
                if matches!(op, CompareOp::Eq | CompareOp::Ne) && (left.is_text() || right.is_text())
                {
                    let equal = left.to_string() == right.to_string();
                    Ok(EvalResult::Boolean(if *op == CompareOp::Eq {
                        equal
                    } else {
                        !equal
                    }))
                } else {
                    Ok(EvalResult::Boolean(numeric_compare(*op, left, right)?))
                }
            }
            Node::Logical(op, left, right) => {
                let left = left.evaluate()?.into_boolean()?;
                let right = right.evaluate()?.into_boolean()?;
                Ok(EvalResult::Boolean(match op {
                    LogicalOp::And => left && right,
                    LogicalOp::Or => left || right,
                }))
            }
        }
    }
}
