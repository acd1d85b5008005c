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

//! Public engine interface
//!
//! - [`FilterExpressionParser`] - the parse-and-execute handle with its
//!   accumulators and tracking flags
//! - [`TableIdFields`] - per-table measurement ID column mapping
//! - [`generate_expression_tree`], [`evaluate_expression`], [`select`] -
//!   the convenience surface for one-off trees, scalar evaluation, and
//!   row selection

pub mod filter;

pub use filter::{
    evaluate_expression, generate_expression_tree, select, FilterExpressionParser, TableIdFields,
    DEFAULT_PRIMARY_TABLE,
};
