// Copyright 2025 Filterql Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! End-to-end tests for the convenience surface: scalar expression
//! evaluation against single rows, row selection, and tree generation.

use std::sync::Arc;

use filterql::api::{evaluate_expression, generate_expression_tree, select};
use filterql::core::{DataType, Value, ValueType};
use filterql::data::DataTable;
use uuid::Uuid;

fn guid(n: u8) -> Uuid {
    let digit = char::from_digit(n as u32, 16).unwrap();
    let text: String = "11111111-1111-1111-1111-111111111111"
        .chars()
        .map(|c| if c == '1' { digit } else { c })
        .collect();
    Uuid::parse_str(&text).unwrap()
}

fn measurements() -> Arc<DataTable> {
    let mut table = DataTable::new("ActiveMeasurements");
    table.add_column("SignalID", DataType::Guid).unwrap();
    table.add_column("ID", DataType::String).unwrap();
    table.add_column("PointTag", DataType::String).unwrap();
    table.add_column("SignalType", DataType::String).unwrap();
    table.add_column("Frequency", DataType::Double).unwrap();

    let rows: Vec<(Uuid, &str, &str, &str, Value)> = vec![
        (guid(1), "PPA:1", "GPA_SHELBY:FREQ", "FREQ", Value::Double(59.97)),
        (guid(2), "PPA:2", "GPA_SHELBY:VPHM", "VPHM", Value::null_undefined()),
        (guid(3), "PPA:3", "GPA_TVA:FREQ", "FREQ", Value::Double(60.01)),
        (guid(4), "PPA:4", "GPA_TVA:VPHM", "VPHM", Value::Double(60.00)),
    ];

    for (signal_id, id, tag, signal_type, frequency) in rows {
        table
            .add_row(vec![
                Value::Guid(signal_id),
                Value::text(id),
                Value::text(tag),
                Value::text(signal_type),
                frequency,
            ])
            .unwrap();
    }

    Arc::new(table)
}

#[test]
fn test_scalar_coalesce_on_null_row() {
    // Spec scenario: Coalesce of a null Frequency yields the fallback
    let table = measurements();
    let row = table.row(1).unwrap();

    let value = evaluate_expression(&table, row, "Coalesce(Frequency, -1.0)").unwrap();
    assert_eq!(value, Value::Double(-1.0));
    assert_eq!(value.value_type(), ValueType::Double);
}

#[test]
fn test_scalar_expression_is_not_forced_boolean() {
    let table = measurements();
    let row = table.row(0).unwrap();

    // A bare column reference is a legal scalar expression
    let value = evaluate_expression(&table, row, "Frequency").unwrap();
    assert_eq!(value, Value::Double(59.97));

    let value = evaluate_expression(&table, row, "SubString(PointTag, 0, 3)").unwrap();
    assert_eq!(value, Value::text("GPA"));

    let value = evaluate_expression(&table, row, "Len(Trim(ID))").unwrap();
    assert_eq!(value, Value::Int32(5));
}

#[test]
fn test_scalar_convert_round_trip() {
    let table = measurements();
    let row = table.row(0).unwrap();

    let value = evaluate_expression(
        &table,
        row,
        "Convert(Convert(Frequency, 'String'), 'Double')",
    )
    .unwrap();
    assert_eq!(value, Value::Double(59.97));
}

#[test]
fn test_scalar_boolean_expression() {
    let table = measurements();

    let value =
        evaluate_expression(&table, table.row(0).unwrap(), "SignalType = 'FREQ'").unwrap();
    assert_eq!(value, Value::Boolean(true));

    // Null propagation surfaces as a null boolean, not an error
    let value =
        evaluate_expression(&table, table.row(1).unwrap(), "Frequency > 60").unwrap();
    assert_eq!(value, Value::Null(ValueType::Boolean));
}

#[test]
fn test_scalar_regex_functions() {
    let table = measurements();
    let row = table.row(2).unwrap();

    let value = evaluate_expression(&table, row, "RegExVal('[0-9]+', ID)").unwrap();
    assert_eq!(value, Value::text("3"));

    let value = evaluate_expression(&table, row, "IsRegExMatch('TVA', PointTag)").unwrap();
    assert_eq!(value, Value::Boolean(true));
}

#[test]
fn test_select_returns_matching_rows() {
    let table = measurements();

    let rows = select(&table, "SignalType = 'FREQ'").unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].as_string(2), Some("GPA_SHELBY:FREQ"));
    assert_eq!(rows[1].as_string(2), Some("GPA_TVA:FREQ"));
}

#[test]
fn test_select_accepts_full_filter_statements() {
    let table = measurements();

    let rows = select(
        &table,
        "FILTER TOP 1 ActiveMeasurements WHERE SignalType = 'VPHM' ORDER BY PointTag",
    )
    .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].as_string(2), Some("GPA_SHELBY:VPHM"));
}

#[test]
fn test_select_needs_no_id_mapping() {
    let mut table = DataTable::new("Plain");
    table.add_column("Name", DataType::String).unwrap();
    table.add_column("Weight", DataType::Int32).unwrap();
    table
        .add_row(vec![Value::text("a"), Value::Int32(10)])
        .unwrap();
    table
        .add_row(vec![Value::text("b"), Value::Int32(20)])
        .unwrap();
    let table = Arc::new(table);

    let rows = select(&table, "Weight >= 15").unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].as_string(0), Some("b"));
}

#[test]
fn test_generate_expression_tree_wraps_bare_expressions() {
    let table = measurements();

    let tree = generate_expression_tree(&table, "SignalType = 'FREQ'").unwrap();
    assert_eq!(tree.table.name(), "ActiveMeasurements");
    assert_eq!(tree.top_limit, -1);
    assert!(tree.root.is_some());
}

#[test]
fn test_generate_expression_tree_uses_verbatim_filter_text() {
    let table = measurements();

    let tree = generate_expression_tree(
        &table,
        "FILTER TOP 2 ActiveMeasurements WHERE TRUE ORDER BY PointTag DESC",
    )
    .unwrap();
    assert_eq!(tree.top_limit, 2);
    assert_eq!(tree.order_by_terms.len(), 1);
    assert!(!tree.order_by_terms[0].ascending);
}

#[test]
fn test_generated_tree_evaluates_rows() {
    let table = measurements();
    let tree = generate_expression_tree(&table, "Frequency IS NOT NULL").unwrap();

    assert_eq!(
        tree.evaluate(table.row(0).unwrap()).unwrap(),
        Value::Boolean(true)
    );
    assert_eq!(
        tree.evaluate(table.row(1).unwrap()).unwrap(),
        Value::Boolean(false)
    );
}

#[test]
fn test_parse_errors_carry_offending_text() {
    let table = measurements();

    let err = select(&table, "NoSuchColumn = 1").unwrap_err();
    assert!(err.to_string().contains("NoSuchColumn"));

    let err = select(&table, "SignalType IN ()").unwrap_err();
    assert!(err.to_string().contains("IN"));

    let err = select(&table, "Convert(Frequency)").unwrap_err();
    assert!(err.to_string().contains("CONVERT") || err.to_string().contains("argument"));
}

#[test]
fn test_evaluation_errors_surface_from_select() {
    let table = measurements();

    // Cross-category comparison
    let err = select(&table, "SignalType > 1").unwrap_err();
    assert!(err.to_string().contains("cannot compare"));

    // Bitwise on a float column
    let err = select(&table, "(Frequency & 1) = 1").unwrap_err();
    assert!(err.to_string().contains("'&'"));

    // Integer division by zero
    let err = select(&table, "(1 / 0) = 1").unwrap_err();
    assert!(err.to_string().contains("division by zero"));
}
