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

//! Expression evaluator
//!
//! Reduces an expression tree against a single row into a [`Value`].
//! Evaluation is pure: the tree and row are read-only and no state is
//! carried between rows. Null propagation is pervasive - any operator
//! with a null operand yields a typed null - except for the three-valued
//! AND/OR table and the null-handling functions.

use std::cmp::Ordering;

use rust_decimal::Decimal;

use super::functions;
use super::pattern_cache::{get_or_compile, like_to_regex};
use crate::core::{Error, Result, Value, ValueType};
use crate::data::DataRow;
use crate::parser::ast::{ColumnRef, Expression, ExpressionTree, OperatorType, UnaryOp};

impl ExpressionTree {
    /// Evaluate this tree's root expression against a row.
    ///
    /// A tree without a root (degenerate statement) evaluates to an
    /// untyped null.
    pub fn evaluate(&self, row: &DataRow) -> Result<Value> {
        match &self.root {
            Some(root) => evaluate(root, row),
            None => Ok(Value::null_undefined()),
        }
    }
}

/// Evaluate an expression against a row
pub fn evaluate(expr: &Expression, row: &DataRow) -> Result<Value> {
    match expr {
        Expression::Literal(value) => Ok(value.clone()),
        Expression::Column(column) => Ok(evaluate_column(column, row)),
        Expression::Unary { op, child } => {
            let value = evaluate(child, row)?;
            apply_unary(*op, value, expr)
        }
        Expression::Operator { op, left, right } => {
            let left_value = evaluate(left, row)?;
            let right_value = match right {
                Some(right) => Some(evaluate(right, row)?),
                None => None,
            };
            apply_operator(*op, left_value, right_value, expr)
        }
        Expression::InList {
            value,
            arguments,
            negated,
        } => evaluate_in_list(value, arguments, *negated, row),
        Expression::Function { kind, arguments } => {
            let mut values = Vec::with_capacity(arguments.len());
            for argument in arguments {
                values.push(evaluate(argument, row)?);
            }
            functions::dispatch(*kind, &values)
        }
    }
}

/// Read a column cell, typed by the column's declared data type
fn evaluate_column(column: &ColumnRef, row: &DataRow) -> Value {
    match row.value(column.index) {
        Some(value) => value.clone(),
        None => Value::Null(column.data_type.value_type()),
    }
}

/// Apply a unary operator to an evaluated child value
fn apply_unary(op: UnaryOp, value: Value, expr: &Expression) -> Result<Value> {
    if value.is_null() {
        return Ok(Value::Null(value.value_type()));
    }

    match op {
        UnaryOp::Plus => match value {
            Value::Int32(_)
            | Value::Int64(_)
            | Value::Decimal(_)
            | Value::Single(_)
            | Value::Double(_) => Ok(value),
            other => Err(Error::evaluation(format!(
                "cannot apply unary '+' to {} in \"{}\"",
                other.value_type(),
                expr
            ))),
        },
        UnaryOp::Minus => match value {
            Value::Int32(v) => v
                .checked_neg()
                .map(Value::Int32)
                .ok_or_else(|| overflow(expr)),
            Value::Int64(v) => v
                .checked_neg()
                .map(Value::Int64)
                .ok_or_else(|| overflow(expr)),
            Value::Decimal(d) => Ok(Value::Decimal(-d)),
            Value::Single(v) => Ok(Value::Single(-v)),
            Value::Double(v) => Ok(Value::Double(-v)),
            other => Err(Error::evaluation(format!(
                "cannot apply unary '-' to {} in \"{}\"",
                other.value_type(),
                expr
            ))),
        },
        UnaryOp::Not => match value {
            Value::Boolean(b) => Ok(Value::Boolean(!b)),
            Value::Int32(v) => Ok(Value::Int32(!v)),
            Value::Int64(v) => Ok(Value::Int64(!v)),
            other => Err(Error::evaluation(format!(
                "cannot apply NOT to {} in \"{}\"",
                other.value_type(),
                expr
            ))),
        },
    }
}

/// Apply a binary (or IS [NOT] NULL) operator to evaluated operands
fn apply_operator(
    op: OperatorType,
    left: Value,
    right: Option<Value>,
    expr: &Expression,
) -> Result<Value> {
    match op {
        OperatorType::IsNull => Ok(Value::Boolean(left.is_null())),
        OperatorType::IsNotNull => Ok(Value::Boolean(!left.is_null())),
        _ => {
            let right = right.ok_or_else(|| {
                Error::evaluation(format!("operator {} is missing its right operand", op))
            })?;

            if op.is_math() {
                apply_math(op, left, right, expr)
            } else if op.is_bitwise() {
                apply_bitwise(op, left, right, expr)
            } else if op.is_comparison() {
                apply_comparison(op, left, right, expr)
            } else {
                match op {
                    OperatorType::And | OperatorType::Or => {
                        apply_logical(op, left, right, expr)
                    }
                    OperatorType::Like | OperatorType::NotLike => {
                        apply_like(op, left, right, expr)
                    }
                    _ => unreachable!("operator groups are exhaustive"),
                }
            }
        }
    }
}

/// Arithmetic: widen both operands to their join type, then dispatch
fn apply_math(op: OperatorType, left: Value, right: Value, expr: &Expression) -> Result<Value> {
    let target = join_numeric(&left, &right, op, expr)?;

    if left.is_null() || right.is_null() {
        return Ok(Value::Null(target));
    }

    let left = left.widen_to(target).ok_or_else(|| overflow(expr))?;
    let right = right.widen_to(target).ok_or_else(|| overflow(expr))?;

    match (left, right) {
        (Value::Int32(l), Value::Int32(r)) => int32_math(op, l, r, expr),
        (Value::Int64(l), Value::Int64(r)) => int64_math(op, l, r, expr),
        (Value::Decimal(l), Value::Decimal(r)) => decimal_math(op, l, r, expr),
        (Value::Single(l), Value::Single(r)) => Ok(Value::Single(float32_math(op, l, r))),
        (Value::Double(l), Value::Double(r)) => Ok(Value::Double(float64_math(op, l, r))),
        _ => unreachable!("operands widened to a common type"),
    }
}

fn int32_math(op: OperatorType, l: i32, r: i32, expr: &Expression) -> Result<Value> {
    let result = match op {
        OperatorType::Multiply => l.wrapping_mul(r),
        OperatorType::Add => l.wrapping_add(r),
        OperatorType::Subtract => l.wrapping_sub(r),
        OperatorType::Divide | OperatorType::Modulus if r == 0 => {
            return Err(Error::DivisionByZero)
        }
        OperatorType::Divide => l.checked_div(r).ok_or_else(|| overflow(expr))?,
        OperatorType::Modulus => l.checked_rem(r).ok_or_else(|| overflow(expr))?,
        _ => unreachable!(),
    };
    Ok(Value::Int32(result))
}

fn int64_math(op: OperatorType, l: i64, r: i64, expr: &Expression) -> Result<Value> {
    let result = match op {
        OperatorType::Multiply => l.wrapping_mul(r),
        OperatorType::Add => l.wrapping_add(r),
        OperatorType::Subtract => l.wrapping_sub(r),
        OperatorType::Divide | OperatorType::Modulus if r == 0 => {
            return Err(Error::DivisionByZero)
        }
        OperatorType::Divide => l.checked_div(r).ok_or_else(|| overflow(expr))?,
        OperatorType::Modulus => l.checked_rem(r).ok_or_else(|| overflow(expr))?,
        _ => unreachable!(),
    };
    Ok(Value::Int64(result))
}

fn decimal_math(op: OperatorType, l: Decimal, r: Decimal, expr: &Expression) -> Result<Value> {
    let result = match op {
        OperatorType::Multiply => l.checked_mul(r),
        OperatorType::Add => l.checked_add(r),
        OperatorType::Subtract => l.checked_sub(r),
        OperatorType::Divide | OperatorType::Modulus if r.is_zero() => {
            return Err(Error::DivisionByZero)
        }
        OperatorType::Divide => l.checked_div(r),
        OperatorType::Modulus => l.checked_rem(r),
        _ => unreachable!(),
    };
    result.map(Value::Decimal).ok_or_else(|| overflow(expr))
}

fn float32_math(op: OperatorType, l: f32, r: f32) -> f32 {
    match op {
        OperatorType::Multiply => l * r,
        OperatorType::Divide => l / r,
        OperatorType::Modulus => l % r,
        OperatorType::Add => l + r,
        OperatorType::Subtract => l - r,
        _ => unreachable!(),
    }
}

fn float64_math(op: OperatorType, l: f64, r: f64) -> f64 {
    match op {
        OperatorType::Multiply => l * r,
        OperatorType::Divide => l / r,
        OperatorType::Modulus => l % r,
        OperatorType::Add => l + r,
        OperatorType::Subtract => l - r,
        _ => unreachable!(),
    }
}

/// Bitwise and shift operators over integer operands
fn apply_bitwise(op: OperatorType, left: Value, right: Value, expr: &Expression) -> Result<Value> {
    let integer_type = |value: &Value| -> Result<ValueType> {
        let vt = value.value_type();
        if vt.is_integer() || vt == ValueType::Undefined {
            Ok(vt)
        } else {
            Err(Error::evaluation(format!(
                "cannot apply operator '{}' to {} in \"{}\"",
                op, vt, expr
            )))
        }
    };

    let left_type = integer_type(&left)?;
    let right_type = integer_type(&right)?;

    // Shifts keep the left operand's type; & and | join the operand types
    let target = match op {
        OperatorType::BitShiftLeft | OperatorType::BitShiftRight => {
            if left_type.is_integer() {
                left_type
            } else {
                right_type
            }
        }
        _ => {
            if left_type == ValueType::Int64 || right_type == ValueType::Int64 {
                ValueType::Int64
            } else if left_type.is_integer() || right_type.is_integer() {
                ValueType::Int32
            } else {
                ValueType::Undefined
            }
        }
    };

    if left.is_null() || right.is_null() {
        return Ok(Value::Null(target));
    }

    match op {
        OperatorType::BitShiftLeft | OperatorType::BitShiftRight => {
            let count = right.as_int64().unwrap_or(0) as u32;
            match left {
                Value::Int32(v) => Ok(Value::Int32(match op {
                    OperatorType::BitShiftLeft => v.wrapping_shl(count),
                    _ => v.wrapping_shr(count),
                })),
                Value::Int64(v) => Ok(Value::Int64(match op {
                    OperatorType::BitShiftLeft => v.wrapping_shl(count),
                    _ => v.wrapping_shr(count),
                })),
                _ => unreachable!("operand type checked above"),
            }
        }
        _ => {
            if target == ValueType::Int64 {
                let l = left.as_int64().unwrap_or(0);
                let r = right.as_int64().unwrap_or(0);
                Ok(Value::Int64(match op {
                    OperatorType::BitwiseAnd => l & r,
                    _ => l | r,
                }))
            } else {
                let l = left.as_int64().unwrap_or(0) as i32;
                let r = right.as_int64().unwrap_or(0) as i32;
                Ok(Value::Int32(match op {
                    OperatorType::BitwiseAnd => l & r,
                    _ => l | r,
                }))
            }
        }
    }
}

/// Comparison operators; any null operand yields a null boolean
fn apply_comparison(
    op: OperatorType,
    left: Value,
    right: Value,
    expr: &Expression,
) -> Result<Value> {
    if left.is_null() || right.is_null() {
        return Ok(Value::Null(ValueType::Boolean));
    }

    let result = match op {
        OperatorType::Equal => left.equals(&right),
        OperatorType::NotEqual => left.equals(&right).map(|eq| !eq),
        OperatorType::LessThan => left.compare(&right).map(|ord| ord == Ordering::Less),
        OperatorType::LessThanOrEqual => {
            left.compare(&right).map(|ord| ord != Ordering::Greater)
        }
        OperatorType::GreaterThan => left.compare(&right).map(|ord| ord == Ordering::Greater),
        OperatorType::GreaterThanOrEqual => {
            left.compare(&right).map(|ord| ord != Ordering::Less)
        }
        _ => unreachable!("caller checked the comparison group"),
    };

    result.map(Value::Boolean).map_err(|e| match e {
        Error::Evaluation(message) => {
            Error::evaluation(format!("{} in \"{}\"", message, expr))
        }
        other => other,
    })
}

/// Three-valued AND/OR
fn apply_logical(op: OperatorType, left: Value, right: Value, expr: &Expression) -> Result<Value> {
    let as_tristate = |value: &Value| -> Result<Option<bool>> {
        if value.is_null() {
            return Ok(None);
        }
        value.as_boolean().map(Some).ok_or_else(|| {
            Error::evaluation(format!(
                "cannot apply {} to {} in \"{}\"",
                op,
                value.value_type(),
                expr
            ))
        })
    };

    let l = as_tristate(&left)?;
    let r = as_tristate(&right)?;

    let result = match op {
        OperatorType::And => match (l, r) {
            (Some(false), _) | (_, Some(false)) => Some(false),
            (Some(true), Some(true)) => Some(true),
            _ => None,
        },
        OperatorType::Or => match (l, r) {
            (Some(true), _) | (_, Some(true)) => Some(true),
            (Some(false), Some(false)) => Some(false),
            _ => None,
        },
        _ => unreachable!(),
    };

    Ok(match result {
        Some(b) => Value::Boolean(b),
        None => Value::Null(ValueType::Boolean),
    })
}

/// LIKE and NOT LIKE with SQL wildcard translation
fn apply_like(op: OperatorType, left: Value, right: Value, expr: &Expression) -> Result<Value> {
    if left.is_null() || right.is_null() {
        return Ok(Value::Null(ValueType::Boolean));
    }

    let (subject, pattern) = match (left.as_str(), right.as_str()) {
        (Some(subject), Some(pattern)) => (subject, pattern),
        _ => {
            return Err(Error::evaluation(format!(
                "{} requires string operands, got {} and {} in \"{}\"",
                op,
                left.value_type(),
                right.value_type(),
                expr
            )))
        }
    };

    let regex = get_or_compile(&like_to_regex(pattern))?;
    let matched = regex.is_match(subject);
    Ok(Value::Boolean(match op {
        OperatorType::Like => matched,
        _ => !matched,
    }))
}

/// IN list membership with SQL three-valued semantics
fn evaluate_in_list(
    value: &Expression,
    arguments: &[Expression],
    negated: bool,
    row: &DataRow,
) -> Result<Value> {
    let needle = evaluate(value, row)?;
    if needle.is_null() {
        return Ok(Value::Null(ValueType::Boolean));
    }

    let mut saw_null = false;
    let mut found = false;
    for argument in arguments {
        let candidate = evaluate(argument, row)?;
        if candidate.is_null() {
            saw_null = true;
            continue;
        }
        if needle.equals(&candidate)? {
            found = true;
            break;
        }
    }

    if !found && saw_null {
        return Ok(Value::Null(ValueType::Boolean));
    }
    Ok(Value::Boolean(found != negated))
}

/// Numeric join of operand types with a descriptive error
fn join_numeric(
    left: &Value,
    right: &Value,
    op: OperatorType,
    expr: &Expression,
) -> Result<ValueType> {
    let left_type = left.value_type();
    let right_type = right.value_type();
    let numeric = |vt: ValueType| vt.is_numeric() || vt == ValueType::Undefined;

    if numeric(left_type) && numeric(right_type) {
        if let Some(join) = left_type.join(right_type) {
            return Ok(join);
        }
    }

    Err(Error::evaluation(format!(
        "cannot apply operator '{}' to {} and {} in \"{}\"",
        op, left_type, right_type, expr
    )))
}

fn overflow(expr: &Expression) -> Error {
    Error::evaluation(format!("numeric overflow evaluating \"{}\"", expr))
}
