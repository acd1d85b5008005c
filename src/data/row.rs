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

//! Row type for filterql - a tuple of nullable measurement cells
//!
//! Cells are stored in the runtime value model (narrow integer column
//! types are widened on load), so reads are direct variant accesses.
//! Storage is `Arc<[Value]>` so cloning a matched row during filtering
//! is O(1).

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::core::Value;

/// A measurement table row containing nullable column values
#[derive(Debug, Clone, PartialEq)]
pub struct DataRow {
    cells: Arc<[Value]>,
}

impl DataRow {
    /// Create a row from its cell values
    pub fn new(cells: Vec<Value>) -> Self {
        Self {
            cells: Arc::from(cells),
        }
    }

    /// Number of cells in the row
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns true if the row has no cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Raw cell access; NULL cells are typed [`Value::Null`]
    pub fn value(&self, index: usize) -> Option<&Value> {
        self.cells.get(index)
    }

    /// Cell as a string; None when NULL, absent, or differently typed
    pub fn as_string(&self, index: usize) -> Option<&str> {
        self.value(index).and_then(Value::as_str)
    }

    /// Cell as a boolean
    pub fn as_boolean(&self, index: usize) -> Option<bool> {
        self.value(index).and_then(Value::as_boolean)
    }

    /// Cell as a timestamp
    pub fn as_datetime(&self, index: usize) -> Option<DateTime<Utc>> {
        self.value(index).and_then(Value::as_datetime)
    }

    /// Cell as a 32-bit float
    pub fn as_single(&self, index: usize) -> Option<f32> {
        match self.value(index) {
            Some(Value::Single(v)) => Some(*v),
            _ => None,
        }
    }

    /// Cell as a 64-bit float
    pub fn as_double(&self, index: usize) -> Option<f64> {
        match self.value(index) {
            Some(Value::Double(v)) => Some(*v),
            _ => None,
        }
    }

    /// Cell as a decimal
    pub fn as_decimal(&self, index: usize) -> Option<Decimal> {
        match self.value(index) {
            Some(Value::Decimal(d)) => Some(*d),
            _ => None,
        }
    }

    /// Cell as a GUID
    pub fn as_guid(&self, index: usize) -> Option<Uuid> {
        self.value(index).and_then(Value::as_guid)
    }

    /// Cell as a 32-bit integer
    pub fn as_int32(&self, index: usize) -> Option<i32> {
        match self.value(index) {
            Some(Value::Int32(v)) => Some(*v),
            _ => None,
        }
    }

    /// Cell as a 64-bit integer; Int32 cells widen
    pub fn as_int64(&self, index: usize) -> Option<i64> {
        self.value(index).and_then(Value::as_int64)
    }
}

impl fmt::Display for DataRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, cell) in self.cells.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", cell)?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ValueType;

    fn sample_row() -> DataRow {
        DataRow::new(vec![
            Value::Guid(Uuid::nil()),
            Value::text("PPA:1"),
            Value::Double(59.97),
            Value::Null(ValueType::Double),
            Value::Int32(7),
        ])
    }

    #[test]
    fn test_typed_accessors() {
        let row = sample_row();
        assert_eq!(row.as_guid(0), Some(Uuid::nil()));
        assert_eq!(row.as_string(1), Some("PPA:1"));
        assert_eq!(row.as_double(2), Some(59.97));
        assert_eq!(row.as_int32(4), Some(7));
        assert_eq!(row.as_int64(4), Some(7));
    }

    #[test]
    fn test_null_cell_reads_as_none() {
        let row = sample_row();
        assert_eq!(row.as_double(3), None);
        assert!(row.value(3).unwrap().is_null());
    }

    #[test]
    fn test_mismatched_type_reads_as_none() {
        let row = sample_row();
        assert_eq!(row.as_double(1), None);
        assert_eq!(row.as_guid(2), None);
    }

    #[test]
    fn test_out_of_range_index() {
        let row = sample_row();
        assert_eq!(row.value(99), None);
        assert_eq!(row.as_string(99), None);
    }

    #[test]
    fn test_clone_is_cheap_and_equal() {
        let row = sample_row();
        let copy = row.clone();
        assert_eq!(row, copy);
        assert_eq!(copy.len(), 5);
    }
}
