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

//! Core type definitions for filterql
//!
//! This module defines the two type universes of the engine: [`DataType`],
//! the closed set of column types a measurement table may declare, and
//! [`ValueType`], the narrower set of runtime value types the expression
//! evaluator computes with. Narrow integer column types widen into the
//! value model when a cell is read.

use std::fmt;
use std::str::FromStr;

use super::error::Error;

/// Column data types a measurement table schema may declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DataType {
    /// UTF-8 text string
    String = 0,
    /// Boolean true/false
    Boolean = 1,
    /// Timestamp (stored as UTC)
    DateTime = 2,
    /// 32-bit floating point number
    Single = 3,
    /// 64-bit floating point number
    Double = 4,
    /// Fixed-precision decimal number
    Decimal = 5,
    /// 16-byte globally unique identifier
    Guid = 6,
    /// 8-bit signed integer
    Int8 = 7,
    /// 16-bit signed integer
    Int16 = 8,
    /// 32-bit signed integer
    Int32 = 9,
    /// 64-bit signed integer
    Int64 = 10,
    /// 8-bit unsigned integer
    UInt8 = 11,
    /// 16-bit unsigned integer
    UInt16 = 12,
    /// 32-bit unsigned integer
    UInt32 = 13,
    /// 64-bit unsigned integer
    UInt64 = 14,
}

impl DataType {
    /// The runtime value type cells of this column widen into when read.
    ///
    /// Narrow integers widen to `Int32`, `UInt32` widens to `Int64`, and
    /// `UInt64` is carried as `Int64` (values beyond `i64::MAX` are not
    /// representable in the value model and must be loaded as `Double`).
    pub fn value_type(&self) -> ValueType {
        match self {
            DataType::String => ValueType::String,
            DataType::Boolean => ValueType::Boolean,
            DataType::DateTime => ValueType::DateTime,
            DataType::Single => ValueType::Single,
            DataType::Double => ValueType::Double,
            DataType::Decimal => ValueType::Decimal,
            DataType::Guid => ValueType::Guid,
            DataType::Int8 | DataType::Int16 | DataType::Int32 => ValueType::Int32,
            DataType::UInt8 | DataType::UInt16 => ValueType::Int32,
            DataType::Int64 | DataType::UInt32 | DataType::UInt64 => ValueType::Int64,
        }
    }

    /// Returns true if this column type holds numeric cells
    pub fn is_numeric(&self) -> bool {
        self.value_type().is_numeric()
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::String => write!(f, "String"),
            DataType::Boolean => write!(f, "Boolean"),
            DataType::DateTime => write!(f, "DateTime"),
            DataType::Single => write!(f, "Single"),
            DataType::Double => write!(f, "Double"),
            DataType::Decimal => write!(f, "Decimal"),
            DataType::Guid => write!(f, "Guid"),
            DataType::Int8 => write!(f, "Int8"),
            DataType::Int16 => write!(f, "Int16"),
            DataType::Int32 => write!(f, "Int32"),
            DataType::Int64 => write!(f, "Int64"),
            DataType::UInt8 => write!(f, "UInt8"),
            DataType::UInt16 => write!(f, "UInt16"),
            DataType::UInt32 => write!(f, "UInt32"),
            DataType::UInt64 => write!(f, "UInt64"),
        }
    }
}

/// Runtime value types computed by the expression evaluator
///
/// `Undefined` is the type assigned to a typed-null value when the origin
/// type is unknown, e.g. the `NULL` literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum ValueType {
    /// Boolean true/false
    Boolean = 0,
    /// 32-bit signed integer
    Int32 = 1,
    /// 64-bit signed integer
    Int64 = 2,
    /// Fixed-precision decimal number
    Decimal = 3,
    /// 32-bit floating point number
    Single = 4,
    /// 64-bit floating point number
    Double = 5,
    /// UTF-8 text string
    String = 6,
    /// Timestamp (UTC)
    DateTime = 7,
    /// 16-byte globally unique identifier
    Guid = 8,
    /// Null value of unknown origin type
    #[default]
    Undefined = 9,
}

impl ValueType {
    /// Returns true if this type participates in arithmetic
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ValueType::Int32
                | ValueType::Int64
                | ValueType::Decimal
                | ValueType::Single
                | ValueType::Double
        )
    }

    /// Returns true if this type holds whole numbers
    pub fn is_integer(&self) -> bool {
        matches!(self, ValueType::Int32 | ValueType::Int64)
    }

    /// Widening precedence used to join two operand types.
    /// Higher rank wins: Double > Single > Decimal > Int64 > Int32 > Boolean.
    fn widening_rank(&self) -> Option<u8> {
        match self {
            ValueType::Boolean => Some(0),
            ValueType::Int32 => Some(1),
            ValueType::Int64 => Some(2),
            ValueType::Decimal => Some(3),
            ValueType::Single => Some(4),
            ValueType::Double => Some(5),
            _ => None,
        }
    }

    /// Compute the widening join of two operand types.
    ///
    /// `Undefined` acts as a wildcard: a typed null of unknown origin joins
    /// to the other operand's type. Returns `None` when either type sits
    /// outside the widening lattice.
    pub fn join(self, other: ValueType) -> Option<ValueType> {
        if self == ValueType::Undefined {
            return if other == ValueType::Undefined || other.widening_rank().is_some() {
                Some(other)
            } else {
                None
            };
        }
        if other == ValueType::Undefined {
            return self.widening_rank().map(|_| self);
        }

        let left = self.widening_rank()?;
        let right = other.widening_rank()?;
        Some(if left >= right { self } else { other })
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Boolean => write!(f, "Boolean"),
            ValueType::Int32 => write!(f, "Int32"),
            ValueType::Int64 => write!(f, "Int64"),
            ValueType::Decimal => write!(f, "Decimal"),
            ValueType::Single => write!(f, "Single"),
            ValueType::Double => write!(f, "Double"),
            ValueType::String => write!(f, "String"),
            ValueType::DateTime => write!(f, "DateTime"),
            ValueType::Guid => write!(f, "Guid"),
            ValueType::Undefined => write!(f, "Undefined"),
        }
    }
}

impl FromStr for ValueType {
    type Err = Error;

    /// Parse a `Convert` target type name (case-insensitive), accepting the
    /// common aliases for each value type
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BOOLEAN" | "BOOL" => Ok(ValueType::Boolean),
            "INT32" | "INT" | "INTEGER" => Ok(ValueType::Int32),
            "INT64" | "LONG" | "BIGINT" => Ok(ValueType::Int64),
            "DECIMAL" | "NUMERIC" => Ok(ValueType::Decimal),
            "SINGLE" | "FLOAT" => Ok(ValueType::Single),
            "DOUBLE" => Ok(ValueType::Double),
            "STRING" | "VARCHAR" | "TEXT" => Ok(ValueType::String),
            "DATETIME" | "DATE" | "TIMESTAMP" => Ok(ValueType::DateTime),
            "GUID" | "UUID" => Ok(ValueType::Guid),
            _ => Err(Error::evaluation(format!(
                "unknown conversion target type '{}'",
                s
            ))),
        }
    }
}
