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

//! In-memory measurement data model
//!
//! The value-typed, column-oriented store the filter engine evaluates
//! against:
//!
//! - [`DataSet`] - case-insensitive mapping from table name to table
//! - [`DataTable`] - ordered schema plus ordered rows
//! - [`DataColumn`] - name, index, and declared [`crate::core::DataType`]
//! - [`DataRow`] - nullable cells with typed accessors
//!
//! The engine only ever reads this model; loading it is the caller's
//! responsibility.

pub mod row;
pub mod table;

pub use row::DataRow;
pub use table::{DataColumn, DataSet, DataTable};
