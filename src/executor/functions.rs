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

//! Built-in scalar functions
//!
//! The eight functions of the filter grammar, dispatched by
//! [`FunctionKind`] after the evaluator has reduced every argument.
//! Arity is validated at AST build time; these implementations assume
//! argument counts are in range.
//!
//! Null handling: `Coalesce` and `IIf` define their own; every other
//! function propagates a null argument as a null of its result type.

use std::str::FromStr;

use super::pattern_cache::get_or_compile;
use crate::core::{Error, Result, Value, ValueType};
use crate::parser::ast::FunctionKind;

/// Dispatch a function call over its evaluated arguments
pub(crate) fn dispatch(kind: FunctionKind, args: &[Value]) -> Result<Value> {
    match kind {
        FunctionKind::Coalesce => Ok(coalesce(args)),
        FunctionKind::Convert => convert(&args[0], &args[1]),
        FunctionKind::IIf => iif(&args[0], &args[1], &args[2]),
        FunctionKind::IsRegExMatch => is_regex_match(&args[0], &args[1]),
        FunctionKind::Len => len(&args[0]),
        FunctionKind::RegExVal => regex_val(&args[0], &args[1]),
        FunctionKind::SubString => substring(&args[0], &args[1], args.get(2)),
        FunctionKind::Trim => trim(&args[0]),
    }
}

/// COALESCE(a1, ..., an): the first non-null argument, or null.
///
/// The result type is derived from all arguments: numeric arguments
/// widen to their join, so the result type does not depend on which
/// argument happened to be non-null.
fn coalesce(args: &[Value]) -> Value {
    let target = derived_type(args.iter().map(Value::value_type));

    match args.iter().find(|value| !value.is_null()) {
        Some(value) => widen_to_derived(value.clone(), target),
        None => match target {
            Some(target) => Value::Null(target),
            None => args[0].clone(),
        },
    }
}

/// CONVERT(x, typeName): explicit cast by case-insensitive type name.
///
/// An unknown target type name is an error; an unparseable conversion
/// yields a null of the target type.
fn convert(value: &Value, type_name: &Value) -> Result<Value> {
    let name = type_name.as_str().ok_or_else(|| {
        Error::evaluation(format!(
            "CONVERT type name must be a string, got {}",
            type_name.value_type()
        ))
    })?;

    let target = ValueType::from_str(name)?;
    Ok(value.convert_to(target))
}

/// IIF(cond, t, f): `t` when the condition is true, `f` otherwise
/// (a null condition selects `f`).
///
/// The result type is derived from both branches: numeric branches widen
/// to their join, so the result type does not depend on which branch the
/// condition selects.
fn iif(condition: &Value, when_true: &Value, when_false: &Value) -> Result<Value> {
    if !condition.is_null() && condition.as_boolean().is_none() {
        return Err(Error::evaluation(format!(
            "IIF condition must be a boolean, got {}",
            condition.value_type()
        )));
    }

    let target = when_true.value_type().join(when_false.value_type());
    let selected = match condition.as_boolean() {
        Some(true) => when_true.clone(),
        _ => when_false.clone(),
    };

    Ok(widen_to_derived(selected, target))
}

/// ISREGEXMATCH(pattern, s): whether the pattern matches anywhere in s
fn is_regex_match(pattern: &Value, subject: &Value) -> Result<Value> {
    if pattern.is_null() || subject.is_null() {
        return Ok(Value::Null(ValueType::Boolean));
    }

    let (pattern, subject) = string_pair("ISREGEXMATCH", pattern, subject)?;
    let regex = get_or_compile(pattern)?;
    Ok(Value::Boolean(regex.is_match(subject)))
}

/// LEN(x): length of the value's string form
fn len(value: &Value) -> Result<Value> {
    if value.is_null() {
        return Ok(Value::Null(ValueType::Int32));
    }

    let text = value.to_string();
    Ok(Value::Int32(text.len() as i32))
}

/// REGEXVAL(pattern, s): the first match of the pattern in s, or null
fn regex_val(pattern: &Value, subject: &Value) -> Result<Value> {
    if pattern.is_null() || subject.is_null() {
        return Ok(Value::Null(ValueType::String));
    }

    let (pattern, subject) = string_pair("REGEXVAL", pattern, subject)?;
    let regex = get_or_compile(pattern)?;
    Ok(match regex.find(subject) {
        Some(found) => Value::text(found.as_str()),
        None => Value::Null(ValueType::String),
    })
}

/// SUBSTRING(s, start, length?): zero-based, clamped to bounds; an
/// omitted length takes the rest of the string
fn substring(value: &Value, start: &Value, length: Option<&Value>) -> Result<Value> {
    if value.is_null() || start.is_null() || length.is_some_and(Value::is_null) {
        return Ok(Value::Null(ValueType::String));
    }

    let text = value.as_str().ok_or_else(|| {
        Error::evaluation(format!(
            "SUBSTRING requires a string value, got {}",
            value.value_type()
        ))
    })?;
    let start = integer_argument("SUBSTRING", "start", start)?;
    let length = match length {
        Some(length) => Some(integer_argument("SUBSTRING", "length", length)?),
        None => None,
    };

    let chars: Vec<char> = text.chars().collect();
    let begin = start.clamp(0, chars.len() as i64) as usize;
    let end = match length {
        Some(length) if length > 0 => (begin + length as usize).min(chars.len()),
        Some(_) => begin,
        None => chars.len(),
    };

    Ok(Value::text(chars[begin..end].iter().collect::<String>()))
}

/// TRIM(x): the value's string form without leading or trailing ASCII
/// whitespace
fn trim(value: &Value) -> Result<Value> {
    if value.is_null() {
        return Ok(Value::Null(ValueType::String));
    }

    let text = value.to_string();
    Ok(Value::text(
        text.trim_matches(|c: char| c.is_ascii_whitespace()),
    ))
}

/// Derive the common result type of a set of argument types: the
/// widening join when every type participates in it, None otherwise
/// (strings, GUIDs, and date/times keep their own type)
fn derived_type(mut types: impl Iterator<Item = ValueType>) -> Option<ValueType> {
    let first = types.next()?;
    types.try_fold(first, |join, value_type| join.join(value_type))
}

/// Widen a selected value to the derived result type when one exists;
/// typed nulls re-type to the derived type
fn widen_to_derived(value: Value, target: Option<ValueType>) -> Value {
    match target {
        Some(target) if value.is_null() => Value::Null(target),
        Some(target) => value.widen_to(target).unwrap_or(value),
        None => value,
    }
}

/// Require two string arguments for the regex functions
fn string_pair<'a>(
    function: &str,
    pattern: &'a Value,
    subject: &'a Value,
) -> Result<(&'a str, &'a str)> {
    match (pattern.as_str(), subject.as_str()) {
        (Some(pattern), Some(subject)) => Ok((pattern, subject)),
        _ => Err(Error::evaluation(format!(
            "{} requires string arguments, got {} and {}",
            function,
            pattern.value_type(),
            subject.value_type()
        ))),
    }
}

/// Require an integer argument (Int32 or Int64)
fn integer_argument(function: &str, name: &str, value: &Value) -> Result<i64> {
    value.as_int64().ok_or_else(|| {
        Error::evaluation(format!(
            "{} {} must be an integer, got {}",
            function,
            name,
            value.value_type()
        ))
    })
}
