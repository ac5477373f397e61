mod aggregation;
mod join;
mod projection;
mod scan;
mod selection;

pub use aggregation::{AggregateKind, AggregateSpec, Aggregation};
pub use join::NaturalJoin;
pub use projection::Projection;
pub use scan::Scan;
pub use selection::Selection;

use crate::error::EngineError;
use crate::record::Record;
use crate::schema::Schema;

/// A lazy, single-pass sequence of (possibly failing) records.
pub type RecordStream = Box<dyn Iterator<Item = Result<Record, EngineError>>>;

/// A node in the query pipeline: exposes its output schema (computed eagerly
/// at construction) and a factory for a lazy record sequence.
pub trait Operator {
    fn schema(&self) -> &Schema;
    fn stream(&self) -> RecordStream;
}
