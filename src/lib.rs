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

//! # filterql - filter-expression engine for time-series measurements
//!
//! filterql parses SQL-like filter statements and evaluates them against
//! in-memory measurement tables, producing matched signal IDs, matched
//! rows, or scalar expression values:
//!
//! ```text
//! FILTER TOP 10 ActiveMeasurements
//! WHERE SignalType = 'FREQ' AND Frequency > 59.95
//! ORDER BY PointTag
//! ```
//!
//! A filter text holds one or more semicolon-separated statements; besides
//! FILTER statements, standalone measurement identifiers are accepted -
//! GUIDs, measurement keys (`PPA:42`), and point tags (`"GPA_SHELBY:FREQ"`).
//!
//! ## Quick start
//!
//! ```rust
//! use filterql::api::FilterExpressionParser;
//! use filterql::core::{DataType, Value};
//! use filterql::data::{DataSet, DataTable};
//! use uuid::Uuid;
//!
//! let mut table = DataTable::new("ActiveMeasurements");
//! table.add_column("SignalID", DataType::Guid).unwrap();
//! table.add_column("SignalType", DataType::String).unwrap();
//! table
//!     .add_row(vec![
//!         Value::Guid(Uuid::parse_str("11111111-1111-1111-1111-111111111111").unwrap()),
//!         Value::text("FREQ"),
//!     ])
//!     .unwrap();
//!
//! let mut data_set = DataSet::new();
//! data_set.add_table(table);
//!
//! let mut parser =
//!     FilterExpressionParser::new("FILTER ActiveMeasurements WHERE SignalType = 'FREQ'");
//! parser.set_data_set(data_set);
//! parser.evaluate().unwrap();
//!
//! assert_eq!(parser.filtered_signal_ids().len(), 1);
//! ```
//!
//! ## Modules
//!
//! - [`api`] - the engine handle ([`api::FilterExpressionParser`]) and
//!   convenience surface
//! - [`crate::core`] - [`Value`], type universes, and the error type
//! - [`data`] - the in-memory measurement data model
//! - [`parser`] - lexer, Pratt parser, and AST
//! - [`executor`] - the expression evaluator and function library
//!
//! ## Notable contracts
//!
//! - `TOP` is applied during the table scan, before `ORDER BY`.
//! - A null WHERE result is treated as a non-match, never an error.
//! - Matched signal IDs are deduplicated and the zero GUID is never
//!   reported.

pub mod api;
pub mod core;
pub mod data;
pub mod executor;
pub mod parser;

pub use crate::api::{
    evaluate_expression, generate_expression_tree, select, FilterExpressionParser, TableIdFields,
};
pub use crate::core::{DataType, Error, Result, Value, ValueType};
pub use crate::data::{DataColumn, DataRow, DataSet, DataTable};
pub use crate::parser::{Expression, ExpressionTree, Statement};
