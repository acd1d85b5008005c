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

//! Core types for filterql
//!
//! This module provides the fundamental building blocks of the engine:
//!
//! - [`Error`] / [`Result`] - the single crate-wide error type
//! - [`DataType`] / [`ValueType`] - column and runtime type universes
//! - [`Value`] - the tagged runtime value union

pub mod error;
pub mod types;
pub mod value;

pub use error::{Error, Result};
pub use types::{DataType, ValueType};
pub use value::{parse_guid, parse_timestamp, Value};
