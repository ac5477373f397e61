use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::Result;
use crate::operator::Operator;
use crate::query::{self, TableLookup};
use crate::record::Record;
use crate::schema::SchemaBuilder;
use crate::table::Table;

pub type TableHandle = Rc<RefCell<Table>>;

/// Top-level facade: owns a named collection of tables and compiles query
/// strings against them.
pub struct Database {
    name: String,
    tables: HashMap<String, TableHandle>,
}

impl Database {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        tracing::debug!(database = %name, "created");
        Self {
            name,
            tables: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns a fluent builder for a new table named `name`. Call
    /// `SchemaBuilder::attribute`/`SchemaBuilder::key` to shape the schema,
    /// then `finish` to validate and register the table.
    pub fn create_table(&mut self, name: impl Into<String>) -> TableBuilder<'_> {
        TableBuilder {
            database: self,
            name: name.into(),
            builder: SchemaBuilder::new(),
        }
    }

    pub fn table(&self, name: &str) -> Option<TableHandle> {
        self.tables.get(name).cloned()
    }

    pub fn select(&self, projection: &str, tables: &str) -> Result<QueryResult> {
        self.select_group_by_where(projection, tables, None, None)
    }

    pub fn select_where(&self, projection: &str, tables: &str, predicate: &str) -> Result<QueryResult> {
        self.select_group_by_where(projection, tables, Some(predicate), None)
    }

    pub fn select_group_by(&self, projection: &str, tables: &str, grouping: &str) -> Result<QueryResult> {
        self.select_group_by_where(projection, tables, None, Some(grouping))
    }

    pub fn select_group_by_where(
        &self,
        projection: &str,
        tables: &str,
        predicate: Option<&str>,
        grouping: Option<&str>,
    ) -> Result<QueryResult> {
        let pipeline = query::compile(self, projection, tables, predicate, grouping)?;
        Ok(QueryResult { pipeline })
    }
}

impl TableLookup for Database {
    fn lookup(&self, name: &str) -> Option<TableHandle> {
        self.table(name)
    }
}

/// The root of a compiled operator pipeline, ready to be pulled.
pub struct QueryResult {
    pipeline: Box<dyn Operator>,
}

impl QueryResult {
    pub fn schema(&self) -> &crate::schema::Schema {
        self.pipeline.schema()
    }

    pub fn rows(&self) -> impl Iterator<Item = Result<Record>> {
        self.pipeline.stream()
    }
}

/// Fluent schema builder returned by `Database::create_table`, tied to the
/// database it will register the finished table in.
pub struct TableBuilder<'a> {
    database: &'a mut Database,
    name: String,
    builder: SchemaBuilder,
}

impl<'a> TableBuilder<'a> {
    pub fn attribute(mut self, name: impl Into<String>) -> Result<Self> {
        self.builder = self.builder.attribute(name)?;
        Ok(self)
    }

    pub fn key<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.builder = self.builder.key(names);
        self
    }

    /// Validates the schema and registers the table under its name.
    pub fn finish(self) -> Result<TableHandle> {
        let schema = self.builder.build()?;
        let table = Rc::new(RefCell::new(Table::new(schema)));
        tracing::debug!(database = %self.database.name, table = %self.name, "registered table");
        self.database.tables.insert(self.name, table.clone());
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn load_projects(db: &mut Database) {
        let table = db
            .create_table("projects")
            .attribute("projectName")
            .unwrap()
            .attribute("budget")
            .unwrap()
            .key(["projectName"])
            .finish()
            .unwrap();
        let budgets = [1_000_000.0, 2_000_000.0, 3_000_000.0, 1_000_000.0, 2_000_000.0, 3_000_000.0];
        for (i, budget) in budgets.iter().enumerate() {
            table
                .borrow_mut()
                .insert_record(vec![Value::Text(format!("P0{i}")), Value::Floating(*budget)])
                .unwrap();
        }
    }

    #[test]
    fn select_star_returns_every_record_in_key_order() {
        let mut db = Database::new("test");
        load_projects(&mut db);
        let result = db.select("*", "projects").unwrap();
        let rows: Vec<_> = result.rows().collect::<Result<Vec<_>>>().unwrap();
        assert_eq!(rows.len(), 6);
    }

    #[test]
    fn select_where_filters_by_predicate() {
        let mut db = Database::new("test");
        load_projects(&mut db);
        let result = db.select_where("*", "projects", "budget > 1000000").unwrap();
        let rows: Vec<_> = result.rows().collect::<Result<Vec<_>>>().unwrap();
        assert_eq!(rows.len(), 4);
    }

    #[test]
    fn unknown_table_errors_at_compile_time_not_at_first_pull() {
        let db = Database::new("test");
        assert!(db.select("*", "nope").is_err());
    }
}
