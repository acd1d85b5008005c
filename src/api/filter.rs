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

//! Filter-expression engine handle
//!
//! [`FilterExpressionParser`] owns a filter text and drives parsing and
//! execution against a dataset: each FILTER statement scans its table
//! applying TOP, ORDER BY, and signal-ID deduplication; identifier
//! statements resolve measurements against the primary table.
//!
//! TOP is applied while scanning, before ORDER BY - `TOP n ... ORDER BY`
//! returns the first n matching rows in table order, then sorted. This
//! mirrors the platform's established behavior and is part of the
//! contract.

use std::cmp::Ordering;
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use uuid::Uuid;

use crate::core::{DataType, Error, Result, Value, ValueType};
use crate::data::{DataRow, DataSet, DataTable};
use crate::parser::ast::{
    ExpressionTree, IdentifierStatement, OrderByTerm, Statement,
};
use crate::parser::Parser;

/// Default primary measurement table name
pub const DEFAULT_PRIMARY_TABLE: &str = "ActiveMeasurements";

/// Per-table column names identifying a measurement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableIdFields {
    /// Signal ID column (a GUID)
    pub signal_id_field: String,
    /// Measurement key column (a string, e.g. "PPA:42")
    pub measurement_key_field: String,
    /// Point tag column (a string)
    pub point_tag_field: String,
}

impl Default for TableIdFields {
    fn default() -> Self {
        Self {
            signal_id_field: "SignalID".to_string(),
            measurement_key_field: "ID".to_string(),
            point_tag_field: "PointTag".to_string(),
        }
    }
}

/// Parser and executor handle for one filter text
///
/// Construct with the filter text, assign a dataset, then call
/// [`evaluate`](FilterExpressionParser::evaluate); the matched signal IDs
/// and rows accumulate on the handle per the tracking flags.
pub struct FilterExpressionParser {
    filter_text: String,
    data_set: Option<DataSet>,
    primary_table_name: String,
    table_id_fields: FxHashMap<String, TableIdFields>,
    track_filtered_signal_ids: bool,
    track_filtered_rows: bool,
    statements: Option<Vec<Statement>>,
    filtered_signal_ids: Vec<Uuid>,
    filtered_signal_id_set: FxHashSet<Uuid>,
    filtered_rows: Vec<DataRow>,
}

impl FilterExpressionParser {
    /// Create a new parser handle for the given filter text.
    ///
    /// Signal-ID tracking defaults on, row tracking off, and the primary
    /// table defaults to `ActiveMeasurements` with the standard
    /// `{SignalID, ID, PointTag}` ID-field mapping.
    pub fn new(filter_text: impl Into<String>) -> Self {
        let mut table_id_fields = FxHashMap::default();
        table_id_fields.insert(
            DEFAULT_PRIMARY_TABLE.to_ascii_lowercase(),
            TableIdFields::default(),
        );

        Self {
            filter_text: filter_text.into(),
            data_set: None,
            primary_table_name: DEFAULT_PRIMARY_TABLE.to_string(),
            table_id_fields,
            track_filtered_signal_ids: true,
            track_filtered_rows: false,
            statements: None,
            filtered_signal_ids: Vec::new(),
            filtered_signal_id_set: FxHashSet::default(),
            filtered_rows: Vec::new(),
        }
    }

    /// The filter text this handle was constructed with
    pub fn filter_text(&self) -> &str {
        &self.filter_text
    }

    /// The assigned dataset, if any
    pub fn data_set(&self) -> Option<&DataSet> {
        self.data_set.as_ref()
    }

    /// Assign the dataset to evaluate against. Invalidates any statements
    /// parsed against a previous dataset.
    pub fn set_data_set(&mut self, data_set: DataSet) {
        self.data_set = Some(data_set);
        self.statements = None;
    }

    /// The primary measurement table name used for identifier statements
    pub fn primary_measurement_table_name(&self) -> &str {
        &self.primary_table_name
    }

    /// Set the primary measurement table name
    pub fn set_primary_measurement_table_name(&mut self, name: impl Into<String>) {
        self.primary_table_name = name.into();
    }

    /// The ID-field mapping registered for a table, if any
    pub fn table_id_fields(&self, table_name: &str) -> Option<&TableIdFields> {
        self.table_id_fields
            .get(&table_name.to_ascii_lowercase())
    }

    /// Register the ID-field mapping for a table
    pub fn set_table_id_fields(&mut self, table_name: impl Into<String>, fields: TableIdFields) {
        self.table_id_fields
            .insert(table_name.into().to_ascii_lowercase(), fields);
    }

    /// Whether matched signal IDs are being tracked
    pub fn track_filtered_signal_ids(&self) -> bool {
        self.track_filtered_signal_ids
    }

    /// Enable or disable signal-ID tracking
    pub fn set_track_filtered_signal_ids(&mut self, track: bool) {
        self.track_filtered_signal_ids = track;
    }

    /// Whether matched rows are being tracked
    pub fn track_filtered_rows(&self) -> bool {
        self.track_filtered_rows
    }

    /// Enable or disable row tracking
    pub fn set_track_filtered_rows(&mut self, track: bool) {
        self.track_filtered_rows = track;
    }

    /// Matched signal IDs in match order, deduplicated
    pub fn filtered_signal_ids(&self) -> &[Uuid] {
        &self.filtered_signal_ids
    }

    /// Matched signal IDs as a set
    pub fn filtered_signal_id_set(&self) -> &FxHashSet<Uuid> {
        &self.filtered_signal_id_set
    }

    /// Matched rows in match order
    pub fn filtered_rows(&self) -> &[DataRow] {
        &self.filtered_rows
    }

    /// Parse (if not already parsed) and execute every statement of the
    /// filter text, populating the accumulators.
    ///
    /// Accumulators are cleared on entry; a failure part-way leaves the
    /// partial results of this call only.
    pub fn evaluate(&mut self) -> Result<()> {
        let data_set = self.data_set.clone().ok_or(Error::NoDataSet)?;

        self.filtered_signal_ids.clear();
        self.filtered_signal_id_set.clear();
        self.filtered_rows.clear();

        if self.statements.is_none() {
            self.statements = Some(Parser::new(&self.filter_text).parse(&data_set)?);
        }

        let statements = self.statements.clone().unwrap_or_default();
        for statement in &statements {
            match statement {
                Statement::Filter(tree) => self.execute_filter_statement(tree)?,
                Statement::Identifier(identifier) => {
                    self.resolve_identifier_statement(&data_set, identifier)
                }
            }
        }

        Ok(())
    }

    // =========================================================================
    // FILTER statement execution
    // =========================================================================

    /// Scan the tree's table, collecting matched rows with TOP applied
    /// during the scan, then sort and append to the accumulators
    fn execute_filter_statement(&mut self, tree: &ExpressionTree) -> Result<()> {
        let table = &tree.table;

        let signal_id_column = if self.track_filtered_signal_ids {
            let fields = self
                .table_id_fields
                .get(&table.name().to_ascii_lowercase())
                .ok_or_else(|| Error::IdFieldsNotFound(table.name().to_string()))?;
            let column = table.column(&fields.signal_id_field).ok_or_else(|| {
                Error::SignalIdColumnNotFound {
                    column: fields.signal_id_field.clone(),
                    table: table.name().to_string(),
                }
            })?;
            Some(column.index())
        } else {
            None
        };

        let mut matched: Vec<DataRow> = Vec::new();

        for i in 0..table.row_count() {
            if tree.top_limit > -1 && matched.len() as i32 >= tree.top_limit {
                break;
            }

            let Some(row) = table.row(i) else { continue };

            let result = tree.evaluate(row)?;
            if result.value_type() != ValueType::Boolean {
                return Err(Error::evaluation(format!(
                    "final expression tree evaluation did not result in a boolean value, result type is \"{}\"",
                    result.value_type()
                )));
            }

            // A null result means no match
            if result.as_boolean() != Some(true) {
                continue;
            }

            match signal_id_column {
                Some(index) => {
                    if let Some(signal_id) = row.as_guid(index) {
                        if !signal_id.is_nil() && self.filtered_signal_id_set.insert(signal_id) {
                            matched.push(row.clone());
                        }
                    }
                }
                None => matched.push(row.clone()),
            }
        }

        if matched.is_empty() {
            return Ok(());
        }

        if !tree.order_by_terms.is_empty() {
            matched.sort_by(|left, right| compare_rows(left, right, &tree.order_by_terms));
        }

        for row in matched {
            if let Some(index) = signal_id_column {
                if let Some(signal_id) = row.as_guid(index) {
                    self.filtered_signal_ids.push(signal_id);
                }
            }
            if self.track_filtered_rows {
                self.filtered_rows.push(row);
            }
        }

        Ok(())
    }

    // =========================================================================
    // Identifier statement resolution
    // =========================================================================

    /// Resolve one identifier statement against the primary table.
    ///
    /// Resolution is best-effort: a missing table, mapping, or column
    /// contributes nothing rather than failing the evaluation.
    fn resolve_identifier_statement(
        &mut self,
        data_set: &DataSet,
        identifier: &IdentifierStatement,
    ) {
        if let IdentifierStatement::SignalId(signal_id) = identifier {
            if self.track_filtered_signal_ids
                && !signal_id.is_nil()
                && self.filtered_signal_id_set.insert(*signal_id)
            {
                self.filtered_signal_ids.push(*signal_id);
            }
            if !self.track_filtered_rows {
                return;
            }
        }

        let Some(table) = data_set.table(&self.primary_table_name) else {
            return;
        };
        let Some(fields) = self
            .table_id_fields
            .get(&self.primary_table_name.to_ascii_lowercase())
        else {
            return;
        };
        let Some(signal_id_column) = table.column(&fields.signal_id_field) else {
            return;
        };
        let signal_id_index = signal_id_column.index();
        let key_field = fields.measurement_key_field.clone();
        let tag_field = fields.point_tag_field.clone();
        let table = Arc::clone(table);

        match identifier {
            IdentifierStatement::SignalId(signal_id) => {
                if signal_id.is_nil() {
                    return;
                }
                for row in table.rows() {
                    if row.as_guid(signal_id_index) == Some(*signal_id) {
                        self.filtered_rows.push(row.clone());
                        return;
                    }
                }
            }
            IdentifierStatement::MeasurementKey(key) => {
                self.map_measurement(&table, signal_id_index, &key_field, key);
            }
            IdentifierStatement::PointTag(tag) => {
                self.map_measurement(&table, signal_id_index, &tag_field, tag);
            }
        }
    }

    /// Resolve a string identifier against a column of the primary table.
    ///
    /// The scan stops at the first row whose column value matches
    /// (case-insensitively); that row contributes at most one signal ID
    /// and at most one row.
    fn map_measurement(
        &mut self,
        table: &Arc<DataTable>,
        signal_id_index: usize,
        column_name: &str,
        mapping_value: &str,
    ) {
        let Some(column) = table.column(column_name) else {
            return;
        };
        let column_index = column.index();

        for row in table.rows() {
            let Some(field) = row.as_string(column_index) else {
                continue;
            };
            if !field.eq_ignore_ascii_case(mapping_value) {
                continue;
            }

            if self.track_filtered_signal_ids {
                if let Some(signal_id) = row.as_guid(signal_id_index) {
                    if !signal_id.is_nil() && self.filtered_signal_id_set.insert(signal_id) {
                        self.filtered_signal_ids.push(signal_id);
                        if self.track_filtered_rows {
                            self.filtered_rows.push(row.clone());
                        }
                    }
                }
            } else if self.track_filtered_rows {
                self.filtered_rows.push(row.clone());
            }

            return;
        }
    }
}

// =========================================================================
// Row ordering
// =========================================================================

/// Compare two rows under the ORDER BY terms; the first non-equal term
/// decides, equal rows keep their scan order (the sort is stable)
fn compare_rows(left: &DataRow, right: &DataRow, terms: &[OrderByTerm]) -> Ordering {
    for term in terms {
        let (a, b) = if term.ascending {
            (left, right)
        } else {
            (right, left)
        };

        let ordering = compare_cells(
            a.value(term.column.index),
            b.value(term.column.index),
            term.column.data_type,
        );
        if ordering != Ordering::Equal {
            return ordering;
        }
    }

    Ordering::Equal
}

/// Compare two cells of the same declared column type, nulls first
fn compare_cells(left: Option<&Value>, right: Option<&Value>, data_type: DataType) -> Ordering {
    let left = left.filter(|v| !v.is_null());
    let right = right.filter(|v| !v.is_null());

    match (left, right) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(l), Some(r)) => {
            if data_type == DataType::String {
                // String ordering for ORDER BY is case-insensitive
                match (l.as_str(), r.as_str()) {
                    (Some(a), Some(b)) => cmp_ignore_ascii_case(a, b),
                    _ => Ordering::Equal,
                }
            } else {
                l.compare(r).unwrap_or(Ordering::Equal)
            }
        }
    }
}

/// Case-insensitive string ordering without allocation
fn cmp_ignore_ascii_case(a: &str, b: &str) -> Ordering {
    let mut left = a.bytes().map(|c| c.to_ascii_lowercase());
    let mut right = b.bytes().map(|c| c.to_ascii_lowercase());

    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                if x != y {
                    return x.cmp(&y);
                }
            }
        }
    }
}

// =========================================================================
// Convenience surface
// =========================================================================

/// Generate an expression tree for a table from filter text.
///
/// Text not starting with `FILTER ` is wrapped as
/// `FILTER <tableName> WHERE <filterText>`; resolution is scoped to the
/// given table.
pub fn generate_expression_tree(
    table: &Arc<DataTable>,
    filter_text: &str,
) -> Result<Arc<ExpressionTree>> {
    let text = ensure_filter_statement(table.name(), filter_text);

    let mut data_set = DataSet::new();
    data_set.add_table(Arc::clone(table));

    let statements = Parser::new(&text).parse(&data_set)?;
    statements
        .into_iter()
        .rev()
        .find_map(|statement| match statement {
            Statement::Filter(tree) => Some(tree),
            _ => None,
        })
        .ok_or_else(|| {
            Error::parse(format!("no FILTER statement found in '{}'", filter_text))
        })
}

/// Evaluate a scalar expression against a single row of a table.
///
/// The expression is not required to reduce to a boolean; the raw value
/// is returned.
pub fn evaluate_expression(
    table: &Arc<DataTable>,
    row: &DataRow,
    filter_text: &str,
) -> Result<Value> {
    generate_expression_tree(table, filter_text)?.evaluate(row)
}

/// Select the rows of a table matching filter text.
///
/// Row tracking is enabled and signal-ID tracking disabled, so rows are
/// returned without requiring an ID-field mapping.
pub fn select(table: &Arc<DataTable>, filter_text: &str) -> Result<Vec<DataRow>> {
    let text = ensure_filter_statement(table.name(), filter_text);

    let mut data_set = DataSet::new();
    data_set.add_table(Arc::clone(table));

    let mut parser = FilterExpressionParser::new(text);
    parser.set_data_set(data_set);
    parser.set_primary_measurement_table_name(table.name());
    parser.set_track_filtered_signal_ids(false);
    parser.set_track_filtered_rows(true);
    parser.evaluate()?;

    Ok(parser.filtered_rows.clone())
}

/// Wrap bare expression text into a FILTER statement when needed
fn ensure_filter_statement(table_name: &str, filter_text: &str) -> String {
    let trimmed = filter_text.trim_start();
    let is_filter = trimmed.len() >= 7 && trimmed[..7].eq_ignore_ascii_case("FILTER ");

    if is_filter {
        filter_text.to_string()
    } else {
        format!("FILTER {} WHERE {}", table_name, filter_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let parser = FilterExpressionParser::new("FILTER T WHERE TRUE");
        assert!(parser.track_filtered_signal_ids());
        assert!(!parser.track_filtered_rows());
        assert_eq!(
            parser.primary_measurement_table_name(),
            "ActiveMeasurements"
        );

        let fields = parser.table_id_fields("activemeasurements").unwrap();
        assert_eq!(fields.signal_id_field, "SignalID");
        assert_eq!(fields.measurement_key_field, "ID");
        assert_eq!(fields.point_tag_field, "PointTag");
    }

    #[test]
    fn test_evaluate_without_data_set_fails() {
        let mut parser = FilterExpressionParser::new("FILTER T WHERE TRUE");
        assert_eq!(parser.evaluate().unwrap_err(), Error::NoDataSet);
    }

    #[test]
    fn test_ensure_filter_statement() {
        assert_eq!(
            ensure_filter_statement("T", "SignalType = 'FREQ'"),
            "FILTER T WHERE SignalType = 'FREQ'"
        );
        assert_eq!(
            ensure_filter_statement("T", "FILTER Other WHERE x = 1"),
            "FILTER Other WHERE x = 1"
        );
        assert_eq!(
            ensure_filter_statement("T", "filter Other WHERE x = 1"),
            "filter Other WHERE x = 1"
        );
    }

    #[test]
    fn test_cmp_ignore_ascii_case() {
        assert_eq!(cmp_ignore_ascii_case("abc", "ABC"), Ordering::Equal);
        assert_eq!(cmp_ignore_ascii_case("abc", "abd"), Ordering::Less);
        assert_eq!(cmp_ignore_ascii_case("b", "A"), Ordering::Greater);
        assert_eq!(cmp_ignore_ascii_case("ab", "abc"), Ordering::Less);
    }

    #[test]
    fn test_compare_cells_nulls_first() {
        let null = Value::Null(ValueType::Double);
        let value = Value::Double(1.0);

        assert_eq!(
            compare_cells(Some(&null), Some(&value), DataType::Double),
            Ordering::Less
        );
        assert_eq!(
            compare_cells(Some(&value), Some(&null), DataType::Double),
            Ordering::Greater
        );
        assert_eq!(
            compare_cells(Some(&null), Some(&null), DataType::Double),
            Ordering::Equal
        );
        assert_eq!(
            compare_cells(None, Some(&value), DataType::Double),
            Ordering::Less
        );
    }
}
