use oxide_reldb::{Database, Record, Value};

// Zip codes cluster into blocks of decreasing size (6, 5, 5, 3) so that,
// grouped and sorted ascending, the first group has 6 members and the last 3.
fn zip_for(i: usize) -> i64 {
    match i {
        0..=5 => 12222,
        6..=10 => 12223,
        11..=15 => 12224,
        _ => 12225,
    }
}

// Employees cluster onto one project per distinct budget (6, 6, 7 members) so
// that, grouped by budget after the join and sorted ascending, the first
// group has 6 members and the last 7 — matching the cross-table scenario.
fn project_for(i: usize) -> String {
    match i {
        0..=5 => "P00".to_string(),
        6..=11 => "P01".to_string(),
        _ => "P02".to_string(),
    }
}

fn build_database() -> Database {
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
    let budgets = [
        1_000_000.0,
        2_000_000.0,
        3_000_000.0,
        1_000_000.0,
        2_000_000.0,
        3_000_000.0,
    ];
    for (i, budget) in budgets.iter().enumerate() {
        projects
            .borrow_mut()
            .insert_record(vec![Value::Text(format!("P0{i}")), Value::Floating(*budget)])
            .unwrap();
    }

    let employees = db
        .create_table("employees")
        .attribute("employeeNumber")
        .unwrap()
        .attribute("zipCode")
        .unwrap()
        .attribute("projectName")
        .unwrap()
        .key(["employeeNumber"])
        .finish()
        .unwrap();
    for i in 0..19 {
        employees
            .borrow_mut()
            .insert_record(vec![
                Value::Text(format!("E{i:02}")),
                Value::Integer(zip_for(i)),
                Value::Text(project_for(i)),
            ])
            .unwrap();
    }

    db
}

fn text_at(record: &Record, i: usize) -> String {
    record.value(i).to_string()
}

#[test]
fn scenario_1_selection_filters_by_predicate() {
    let db = build_database();
    let result = db
        .select_where("*", "projects", "budget > 1000000")
        .unwrap();
    let rows: Vec<_> = result.rows().collect::<Result<Vec<_>, _>>().unwrap();
    assert_eq!(rows.len(), 4);
    assert_eq!(text_at(&rows[0], 0), "P01");
    assert_eq!(text_at(&rows[rows.len() - 1], 0), "P05");
}

#[test]
fn scenario_2_natural_join_projects_employee_and_budget() {
    let db = build_database();
    let result = db
        .select("employeeNumber, budget", "employees natural join projects")
        .unwrap();
    let rows: Vec<_> = result.rows().collect::<Result<Vec<_>, _>>().unwrap();
    assert_eq!(rows.len(), 19);
    assert_eq!(text_at(&rows[0], 0), "E00");
    assert_eq!(text_at(&rows[0], 1), "1000000");
    assert_eq!(text_at(&rows[18], 0), "E18");
    assert_eq!(text_at(&rows[18], 1), "3000000");
}

#[test]
fn scenario_3_join_then_filter_by_employee_number() {
    let db = build_database();
    let result = db
        .select_group_by_where(
            "budget",
            "employees natural join projects",
            Some("employeeNumber = \"E15\""),
            None,
        )
        .unwrap();
    let rows: Vec<_> = result.rows().collect::<Result<Vec<_>, _>>().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(text_at(&rows[0], 0), "3000000");
}

#[test]
fn scenario_4_count_with_no_group_by() {
    let db = build_database();
    let result = db
        .select("count(employeeNumber) as count", "employees")
        .unwrap();
    let rows: Vec<_> = result.rows().collect::<Result<Vec<_>, _>>().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(text_at(&rows[0], 0), "19");
}

#[test]
fn scenario_5_sum_with_no_group_by() {
    let db = build_database();
    let result = db.select("sum(budget) as sumBudget", "projects").unwrap();
    let rows: Vec<_> = result.rows().collect::<Result<Vec<_>, _>>().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(text_at(&rows[0], 0), "12000000");
}

#[test]
fn scenario_6_group_by_zip_code() {
    let db = build_database();
    let result = db
        .select_group_by(
            "zipCode, count(employeeNumber) as employeeCount",
            "employees",
            "zipCode",
        )
        .unwrap();
    let mut rows: Vec<_> = result.rows().collect::<Result<Vec<_>, _>>().unwrap();
    rows.sort_by_key(|r| text_at(r, 0));
    assert_eq!(rows.len(), 4);
    assert_eq!(text_at(&rows[0], 0), "12222");
    assert_eq!(text_at(&rows[0], 1), "6");
    assert_eq!(text_at(&rows[rows.len() - 1], 0), "12225");
    assert_eq!(text_at(&rows[rows.len() - 1], 1), "3");
}

#[test]
fn scenario_7_group_by_budget_after_join() {
    let db = build_database();
    let result = db
        .select_group_by(
            "budget, count(employeeNumber) as employeeCount",
            "employees natural join projects",
            "budget",
        )
        .unwrap();
    let mut rows: Vec<_> = result.rows().collect::<Result<Vec<_>, _>>().unwrap();
    rows.sort_by_key(|r| text_at(r, 0));
    assert_eq!(rows.len(), 3);
    assert_eq!(text_at(&rows[0], 0), "1000000");
    assert_eq!(text_at(&rows[0], 1), "6");
    assert_eq!(text_at(&rows[rows.len() - 1], 0), "3000000");
    assert_eq!(text_at(&rows[rows.len() - 1], 1), "7");
}
