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

//! Abstract syntax tree types for the filter-expression parser
//!
//! A parsed filter text is a sequence of [`Statement`]s. Each `FILTER`
//! statement lowers to an [`ExpressionTree`] bound to its target table;
//! each identifier statement names a measurement directly. Expression
//! nodes are owned by their parents - the AST is a tree, never a DAG.

use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use crate::core::{DataType, Value};
use crate::data::DataTable;

/// Unary operator types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Unary plus (identity on numerics)
    Plus,
    /// Numeric negation
    Minus,
    /// Logical NOT on booleans, bitwise complement on integers
    Not,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Plus => write!(f, "+"),
            UnaryOp::Minus => write!(f, "-"),
            UnaryOp::Not => write!(f, "NOT "),
        }
    }
}

/// Binary (and postfix null-test) operator types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorType {
    Multiply,
    Divide,
    Modulus,
    Add,
    Subtract,
    BitShiftLeft,
    BitShiftRight,
    BitwiseAnd,
    BitwiseOr,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Equal,
    NotEqual,
    IsNull,
    IsNotNull,
    Like,
    NotLike,
    And,
    Or,
}

impl OperatorType {
    /// Returns true for the math operator group
    pub fn is_math(&self) -> bool {
        matches!(
            self,
            OperatorType::Multiply
                | OperatorType::Divide
                | OperatorType::Modulus
                | OperatorType::Add
                | OperatorType::Subtract
        )
    }

    /// Returns true for the bitwise operator group
    pub fn is_bitwise(&self) -> bool {
        matches!(
            self,
            OperatorType::BitShiftLeft
                | OperatorType::BitShiftRight
                | OperatorType::BitwiseAnd
                | OperatorType::BitwiseOr
        )
    }

    /// Returns true for the comparison operator group
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            OperatorType::LessThan
                | OperatorType::LessThanOrEqual
                | OperatorType::GreaterThan
                | OperatorType::GreaterThanOrEqual
                | OperatorType::Equal
                | OperatorType::NotEqual
        )
    }
}

impl fmt::Display for OperatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperatorType::Multiply => write!(f, "*"),
            OperatorType::Divide => write!(f, "/"),
            OperatorType::Modulus => write!(f, "%"),
            OperatorType::Add => write!(f, "+"),
            OperatorType::Subtract => write!(f, "-"),
            OperatorType::BitShiftLeft => write!(f, "<<"),
            OperatorType::BitShiftRight => write!(f, ">>"),
            OperatorType::BitwiseAnd => write!(f, "&"),
            OperatorType::BitwiseOr => write!(f, "|"),
            OperatorType::LessThan => write!(f, "<"),
            OperatorType::LessThanOrEqual => write!(f, "<="),
            OperatorType::GreaterThan => write!(f, ">"),
            OperatorType::GreaterThanOrEqual => write!(f, ">="),
            OperatorType::Equal => write!(f, "="),
            OperatorType::NotEqual => write!(f, "<>"),
            OperatorType::IsNull => write!(f, "IS NULL"),
            OperatorType::IsNotNull => write!(f, "IS NOT NULL"),
            OperatorType::Like => write!(f, "LIKE"),
            OperatorType::NotLike => write!(f, "NOT LIKE"),
            OperatorType::And => write!(f, "AND"),
            OperatorType::Or => write!(f, "OR"),
        }
    }
}

/// Built-in function kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    Coalesce,
    Convert,
    IIf,
    IsRegExMatch,
    Len,
    RegExVal,
    SubString,
    Trim,
}

impl FunctionKind {
    /// Map a function name to its kind (case-insensitive).
    ///
    /// `COALESCE` and `ISNULL` are the same function; any name starting
    /// with `SUBSTR` maps to `SubString`.
    pub fn from_name(name: &str) -> Option<FunctionKind> {
        let upper = name.to_ascii_uppercase();
        match upper.as_str() {
            "COALESCE" | "ISNULL" => Some(FunctionKind::Coalesce),
            "CONVERT" => Some(FunctionKind::Convert),
            "IIF" => Some(FunctionKind::IIf),
            "ISREGEXMATCH" => Some(FunctionKind::IsRegExMatch),
            "LEN" => Some(FunctionKind::Len),
            "REGEXVAL" => Some(FunctionKind::RegExVal),
            "TRIM" => Some(FunctionKind::Trim),
            _ if upper.starts_with("SUBSTR") => Some(FunctionKind::SubString),
            _ => None,
        }
    }

    /// Allowed argument count range, checked at AST build time
    pub fn arity(&self) -> (usize, usize) {
        match self {
            FunctionKind::Coalesce => (2, usize::MAX),
            FunctionKind::Convert => (2, 2),
            FunctionKind::IIf => (3, 3),
            FunctionKind::IsRegExMatch => (2, 2),
            FunctionKind::Len => (1, 1),
            FunctionKind::RegExVal => (2, 2),
            FunctionKind::SubString => (2, 3),
            FunctionKind::Trim => (1, 1),
        }
    }
}

impl fmt::Display for FunctionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionKind::Coalesce => write!(f, "COALESCE"),
            FunctionKind::Convert => write!(f, "CONVERT"),
            FunctionKind::IIf => write!(f, "IIF"),
            FunctionKind::IsRegExMatch => write!(f, "ISREGEXMATCH"),
            FunctionKind::Len => write!(f, "LEN"),
            FunctionKind::RegExVal => write!(f, "REGEXVAL"),
            FunctionKind::SubString => write!(f, "SUBSTRING"),
            FunctionKind::Trim => write!(f, "TRIM"),
        }
    }
}

/// A column reference resolved against the statement's target table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    /// Zero-based column index within the table
    pub index: usize,
    /// Column name as declared
    pub name: String,
    /// Declared column data type
    pub data_type: DataType,
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// An expression tree node
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Literal value
    Literal(Value),
    /// Column reference
    Column(ColumnRef),
    /// Unary operator applied to a child expression
    Unary {
        op: UnaryOp,
        child: Box<Expression>,
    },
    /// Binary operator; `right` is None for IS [NOT] NULL
    Operator {
        op: OperatorType,
        left: Box<Expression>,
        right: Option<Box<Expression>>,
    },
    /// `value [NOT] IN (arguments...)`
    InList {
        value: Box<Expression>,
        arguments: Vec<Expression>,
        negated: bool,
    },
    /// Built-in function call
    Function {
        kind: FunctionKind,
        arguments: Vec<Expression>,
    },
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal(value) => match value {
                Value::Str(s) => write!(f, "'{}'", s),
                Value::DateTime(t) => write!(f, "#{}#", t.to_rfc3339()),
                other => write!(f, "{}", other),
            },
            Expression::Column(column) => write!(f, "{}", column),
            Expression::Unary { op, child } => write!(f, "{}{}", op, child),
            Expression::Operator { op, left, right } => match right {
                Some(right) => write!(f, "({} {} {})", left, op, right),
                None => write!(f, "({} {})", left, op),
            },
            Expression::InList {
                value,
                arguments,
                negated,
            } => {
                write!(f, "({} ", value)?;
                if *negated {
                    write!(f, "NOT ")?;
                }
                write!(f, "IN (")?;
                for (i, argument) in arguments.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", argument)?;
                }
                write!(f, "))")
            }
            Expression::Function { kind, arguments } => {
                write!(f, "{}(", kind)?;
                for (i, argument) in arguments.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", argument)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// A single ORDER BY term
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderByTerm {
    /// Column to sort by
    pub column: ColumnRef,
    /// Ascending when true, descending when false
    pub ascending: bool,
}

/// The lowered form of one FILTER statement
#[derive(Debug, Clone)]
pub struct ExpressionTree {
    /// Target measurement table, resolved at parse time
    pub table: Arc<DataTable>,
    /// The WHERE expression; absent only for degenerate statements
    pub root: Option<Expression>,
    /// TOP limit; negative means no limit
    pub top_limit: i32,
    /// ORDER BY terms in declaration order
    pub order_by_terms: Vec<OrderByTerm>,
}

impl ExpressionTree {
    /// Create a new expression tree bound to its target table
    pub fn new(table: Arc<DataTable>) -> Self {
        Self {
            table,
            root: None,
            top_limit: -1,
            order_by_terms: Vec::new(),
        }
    }
}

/// A standalone measurement identifier statement
#[derive(Debug, Clone, PartialEq)]
pub enum IdentifierStatement {
    /// Bare, braced, or quoted GUID literal naming a signal directly
    SignalId(Uuid),
    /// Measurement-key literal resolved against the primary table
    MeasurementKey(String),
    /// Point-tag literal resolved against the primary table
    PointTag(String),
}

/// One parsed statement of a filter text
#[derive(Debug, Clone)]
pub enum Statement {
    /// A FILTER statement with its lowered expression tree
    Filter(Arc<ExpressionTree>),
    /// A standalone identifier statement
    Identifier(IdentifierStatement),
}
