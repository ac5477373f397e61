//! Minimal end-to-end walkthrough: two tables, a join, a predicate, and a
//! grouped aggregate. Run with `cargo run --example basic`.

use oxide_reldb::{Database, Value};

fn main() {
    tracing_subscriber::fmt::init();

    let mut db = Database::new("company");

    let projects = db
        .create_table("projects")
        .attribute("projectName")
        .unwrap()
        .attribute("budget")
        .unwrap()
        .key(["projectName"])
        .finish()
        .unwrap();
    for (name, budget) in [("P00", 1_000_000.0), ("P01", 2_000_000.0)] {
        projects
            .borrow_mut()
            .insert_record(vec![Value::Text(name.to_string()), Value::Floating(budget)])
            .unwrap();
    }

    let employees = db
        .create_table("employees")
        .attribute("employeeNumber")
        .unwrap()
        .attribute("projectName")
        .unwrap()
        .key(["employeeNumber"])
        .finish()
        .unwrap();
    for (n, project) in [("E00", "P00"), ("E01", "P01"), ("E02", "P01")] {
        employees
            .borrow_mut()
            .insert_record(vec![Value::Text(n.to_string()), Value::Text(project.to_string())])
            .unwrap();
    }

    let result = db
        .select_where(
            "employeeNumber, budget",
            "employees natural join projects",
            "budget > 1000000",
        )
        .unwrap();
    for row in result.rows() {
        let row = row.unwrap();
        println!("{} earns a project with budget {}", row.value(0), row.value(1));
    }

    let grouped = db
        .select_group_by(
            "projectName, count(employeeNumber) as headcount",
            "employees",
            "projectName",
        )
        .unwrap();
    for row in grouped.rows() {
        let row = row.unwrap();
        println!("{}: {} employees", row.value(0), row.value(1));
    }
}
