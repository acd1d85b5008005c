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

//! Expression evaluation
//!
//! Reduces parsed expression trees to values, one row at a time:
//!
//! - [`evaluator`] - recursive tree reduction with type widening and
//!   null propagation
//! - [`functions`] - the built-in scalar function library
//! - [`pattern_cache`] - process-wide compiled regex cache backing LIKE
//!   and the regex functions

pub mod evaluator;
pub(crate) mod functions;
pub(crate) mod pattern_cache;

pub use evaluator::evaluate;
