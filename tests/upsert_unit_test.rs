//! Unit tests for the natural-key upsert builder.
//!
//! Run with: cargo test --test upsert_unit_test

use sea_orm::Value;
use sea_orm::sea_query::{QueryStatementWriter, SqliteQueryBuilder};

use turbine_sync::store::{Assign, UpsertSpec, tables};

const FLAGS: UpsertSpec = UpsertSpec {
    table: "Plant",
    columns: &["Plant_Name", "IsPlant", "Updated_Time"],
    conflict: &["Plant_Name"],
    on_conflict: &[
        ("IsPlant", Assign::Accumulate),
        ("Updated_Time", Assign::Touch),
    ],
};

fn render(upsert: &UpsertSpec, values: Vec<Value>) -> String {
    upsert.statement(values)
        .expect("statement")
        .to_string(SqliteQueryBuilder)
}

#[test]
fn accumulate_and_touch_render_as_update_clauses() {
    let sql = render(&FLAGS, vec!["15S1".into(), true.into(), Value::String(None)]);

    assert!(sql.contains("DO UPDATE SET"), "{sql}");
    assert!(sql.contains("\"IsPlant\" = \"IsPlant\" OR \"excluded\".\"IsPlant\""), "{sql}");
    assert!(sql.contains("\"Updated_Time\" = CURRENT_TIMESTAMP"), "{sql}");
}

#[test]
fn overwrite_takes_the_incoming_value() {
    let sql = render(
        &tables::SERIAL_NUMBER_PROFILE,
        vec![1_i32.into(), "SN01".into()],
    );

    assert!(sql.contains("\"Tracking_Number\" = \"excluded\".\"Tracking_Number\""), "{sql}");
}

#[test]
fn empty_update_list_ignores_duplicates() {
    let sql = render(&tables::LOCATION, vec!["DK-15S1-WTG01".into()]);

    assert!(sql.contains("ON CONFLICT"), "{sql}");
    assert!(sql.ends_with("DO NOTHING"), "{sql}");
}

#[test]
fn arity_mismatch_is_rejected() {
    let err = FLAGS.statement(vec!["15S1".into()]).expect_err("arity");

    assert!(err.to_string().contains("expects 3 values, got 1"), "{err}");
}
