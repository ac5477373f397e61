//! An embedded, in-memory relational query engine.
//!
//! Client code defines tables and their schemas, inserts records under a
//! primary-key constraint, and issues queries as textual fragments: a
//! projection list, a table expression built from natural joins, and an
//! optional predicate, with optional grouping attributes.
//!
//! ```
//! use oxide_reldb::{Database, Value};
//!
//! let mut db = Database::new("example");
//! let projects = db
//!     .create_table("projects")
//!     .attribute("projectName").unwrap()
//!     .attribute("budget").unwrap()
//!     .key(["projectName"])
//!     .finish()
//!     .unwrap();
//! projects
//!     .borrow_mut()
//!     .insert_record(vec![Value::Text("P00".into()), Value::Floating(1_000_000.0)])
//!     .unwrap();
//!
//! let result = db.select("*", "projects").unwrap();
//! assert_eq!(result.rows().count(), 1);
//! ```

mod database;
mod error;
mod expr;
mod lexer;
mod operator;
mod query;
mod record;
mod schema;
mod table;
mod value;

pub use database::{Database, QueryResult, TableBuilder, TableHandle};
pub use error::{EngineError, Result};
pub use expr::{ArithmeticOp, CompareOp, Evaluator, LogicalOp, Node, ParsedExpr, Parser, VariableSlot};
pub use lexer::{Token, TokenKind, Tokenizer};
pub use operator::{AggregateKind, AggregateSpec, Aggregation, NaturalJoin, Operator, Projection, RecordStream, Scan, Selection};
pub use record::Record;
pub use schema::{Schema, SchemaBuilder};
pub use table::Table;
pub use value::Value;
