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

//! Table and dataset types for filterql
//!
//! A [`DataSet`] maps table names to [`DataTable`]s; a table is an ordered
//! schema of [`DataColumn`]s plus an ordered sequence of rows. All name
//! lookup - tables and columns alike - is case-insensitive via an
//! ASCII-folded key map, while original casing is preserved for display.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::row::DataRow;
use crate::core::{DataType, Error, Result, Value};

/// A column definition in a measurement table schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataColumn {
    /// Column name as declared
    name: String,
    /// Zero-based index within the table
    index: usize,
    /// Declared column data type
    data_type: DataType,
}

impl DataColumn {
    /// Column name as declared
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Zero-based index within the table
    pub fn index(&self) -> usize {
        self.index
    }

    /// Declared column data type
    pub fn data_type(&self) -> DataType {
        self.data_type
    }
}

impl fmt::Display for DataColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.data_type)
    }
}

/// A named measurement table: ordered columns plus ordered rows
#[derive(Debug, Clone, Default)]
pub struct DataTable {
    name: String,
    columns: Vec<DataColumn>,
    column_indexes: FxHashMap<String, usize>,
    rows: Vec<DataRow>,
}

impl DataTable {
    /// Create a new empty table
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            column_indexes: FxHashMap::default(),
            rows: Vec::new(),
        }
    }

    /// Table name as declared
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a column to the schema
    ///
    /// Columns must be added before rows; a duplicate name (compared
    /// case-insensitively) replaces nothing and is rejected.
    pub fn add_column(&mut self, name: impl Into<String>, data_type: DataType) -> Result<()> {
        let name = name.into();
        let key = name.to_ascii_lowercase();

        if self.column_indexes.contains_key(&key) {
            return Err(Error::parse(format!(
                "duplicate column '{}' in table '{}'",
                name, self.name
            )));
        }

        let index = self.columns.len();
        self.column_indexes.insert(key, index);
        self.columns.push(DataColumn {
            name,
            index,
            data_type,
        });
        Ok(())
    }

    /// Number of columns in the schema
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Look up a column by name (case-insensitive)
    pub fn column(&self, name: &str) -> Option<&DataColumn> {
        self.column_indexes
            .get(&name.to_ascii_lowercase())
            .map(|&i| &self.columns[i])
    }

    /// Column at the given index
    pub fn column_at(&self, index: usize) -> Option<&DataColumn> {
        self.columns.get(index)
    }

    /// All columns in schema order
    pub fn columns(&self) -> &[DataColumn] {
        &self.columns
    }

    /// Append a row, coercing each cell into its column's value type.
    ///
    /// NULL cells take the column's type hint; numeric cells convert
    /// between numeric representations; any other type mismatch is
    /// rejected.
    pub fn add_row(&mut self, cells: Vec<Value>) -> Result<()> {
        if cells.len() != self.columns.len() {
            return Err(Error::RowWidthMismatch {
                expected: self.columns.len(),
                got: cells.len(),
            });
        }

        let mut coerced = Vec::with_capacity(cells.len());
        for (cell, column) in cells.into_iter().zip(&self.columns) {
            coerced.push(coerce_cell(cell, column)?);
        }

        self.rows.push(DataRow::new(coerced));
        Ok(())
    }

    /// Number of rows in the table
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Row at the given index
    pub fn row(&self, index: usize) -> Option<&DataRow> {
        self.rows.get(index)
    }

    /// All rows in table order
    pub fn rows(&self) -> &[DataRow] {
        &self.rows
    }
}

impl fmt::Display for DataTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{} columns, {} rows]",
            self.name,
            self.columns.len(),
            self.rows.len()
        )
    }
}

/// Coerce a cell value into the canonical value type of its column
fn coerce_cell(cell: Value, column: &DataColumn) -> Result<Value> {
    let target = column.data_type().value_type();

    if cell.is_null() {
        return Ok(Value::Null(target));
    }
    if cell.value_type() == target {
        return Ok(cell);
    }

    // Numeric representations convert; anything else is a schema violation
    if cell.value_type().is_numeric() && target.is_numeric() {
        let converted = cell.convert_to(target);
        if !converted.is_null() {
            return Ok(converted);
        }
    }

    Err(Error::InvalidCellValue {
        column: column.name().to_string(),
        value_type: cell.value_type().to_string(),
        data_type: column.data_type().to_string(),
    })
}

/// A collection of measurement tables addressed by case-insensitive name
#[derive(Debug, Clone, Default)]
pub struct DataSet {
    tables: Vec<Arc<DataTable>>,
    by_name: FxHashMap<String, usize>,
}

impl DataSet {
    /// Create a new empty dataset
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table, replacing any existing table with the same name
    /// (compared case-insensitively)
    pub fn add_table(&mut self, table: impl Into<Arc<DataTable>>) {
        let table = table.into();
        let key = table.name().to_ascii_lowercase();

        match self.by_name.get(&key) {
            Some(&i) => self.tables[i] = table,
            None => {
                self.by_name.insert(key, self.tables.len());
                self.tables.push(table);
            }
        }
    }

    /// Look up a table by name (case-insensitive)
    pub fn table(&self, name: &str) -> Option<&Arc<DataTable>> {
        self.by_name
            .get(&name.to_ascii_lowercase())
            .map(|&i| &self.tables[i])
    }

    /// Number of tables in the dataset
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Table names in insertion order
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|t| t.name())
    }
}
