use std::cell::RefCell;
use std::rc::Rc;

use crate::operator::{Operator, RecordStream};
use crate::record::Record;
use crate::schema::Schema;
use crate::table::Table;

/// Joins a left sub-pipeline against a right table on their common attributes.
/// Preserves left's traversal order; within a left record, right-match order.
pub struct NaturalJoin {
    left: Box<dyn Operator>,
    right: Rc<RefCell<Table>>,
    common: Vec<String>,
    schema: Schema,
}

impl NaturalJoin {
    pub fn new(left: Box<dyn Operator>, right: Rc<RefCell<Table>>) -> Self {
        let right_schema = right.borrow().schema().clone();
        let common = left.schema().common_attributes(&right_schema);
        let schema = left.schema().natural_join(&right_schema);
        Self {
            left,
            right,
            common,
            schema,
        }
    }
}

impl Operator for NaturalJoin {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn stream(&self) -> RecordStream {
        let left_schema = self.left.schema().clone();
        let output_schema = self.schema.clone();
        let right = self.right.clone();
        let common = self.common.clone();

        let mut output = Vec::new();
        for item in self.left.stream() {
            let left_record = match item {
                Ok(r) => r,
                Err(e) => {
                    output.push(Err(e));
                    continue;
                }
            };
            let right_table = right.borrow();
            let matches = right_table.match_common(&common, &left_record, &left_schema);
            for right_record in matches {
                let values = output_schema
                    .attributes()
                    .iter()
                    .map(|attr| {
                        if let Some(i) = left_schema.index_of(attr) {
                            left_record.value(i).clone()
                        } else {
                            let i = right_table
                                .schema()
                                .index_of(attr)
                                .expect("output attribute exists in left or right schema");
                            right_record.value(i).clone()
                        }
                    })
                    .collect();
                output.push(Record::new(&output_schema, values));
            }
        }
        Box::new(output.into_iter())
    }
}
