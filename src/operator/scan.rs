use std::cell::RefCell;
use std::rc::Rc;

use crate::operator::{Operator, RecordStream};
use crate::schema::Schema;
use crate::table::Table;

/// Reads a table directly. Each invocation of `stream()` starts a fresh
/// iteration over the table's current contents, in key order.
pub struct Scan {
    table: Rc<RefCell<Table>>,
    schema: Schema,
}

impl Scan {
    pub fn new(table: Rc<RefCell<Table>>) -> Self {
        let schema = table.borrow().schema().clone();
        Self { table, schema }
    }
}

impl Operator for Scan {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn stream(&self) -> RecordStream {
        let records: Vec<_> = self.table.borrow().scan().cloned().collect();
        Box::new(records.into_iter().map(Ok))
    }
}
