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

//! Expression parsing methods for the filter-expression parser
//!
//! Pratt parsing with the precedence levels fixed by the grammar contract
//! (see [`Precedence`]). Literal lowering follows the engine's exact
//! rules: integers bucket by i32/i64 bounds, non-scientific numerics
//! prefer decimal, GUID and date/time literals shed their delimiters.

use super::ast::{ColumnRef, Expression, FunctionKind, OperatorType, UnaryOp};
use super::parser::Parser;
use super::precedence::Precedence;
use super::token::TokenType;
use crate::core::value::{parse_guid, parse_timestamp};
use crate::core::{Error, Result, Value};

impl Parser {
    /// Parse an expression with the given precedence
    pub(crate) fn parse_expression(&mut self, precedence: Precedence) -> Result<Expression> {
        let mut left = self.parse_prefix_expression()?;

        while self.is_infix_token() && precedence < self.cur_precedence() {
            left = self.parse_infix_expression(left)?;
        }

        Ok(left)
    }

    /// Check if the current token can start an infix clause
    fn is_infix_token(&self) -> bool {
        match self.cur_token.token_type {
            TokenType::Operator => !matches!(self.cur_token.literal.as_str(), "~" | "!"),
            TokenType::Keyword => {
                self.cur_token.is_keyword("AND")
                    || self.cur_token.is_keyword("OR")
                    || self.cur_token.is_keyword("LIKE")
                    || self.cur_token.is_keyword("IN")
                    || self.cur_token.is_keyword("IS")
                    || (self.cur_token.is_keyword("NOT")
                        && (self.peek_token.is_keyword("LIKE") || self.peek_token.is_keyword("IN")))
            }
            _ => false,
        }
    }

    /// Parse a prefix expression (literals, column names, unary operators,
    /// function calls, parenthesized sub-expressions)
    fn parse_prefix_expression(&mut self) -> Result<Expression> {
        self.check_lex_error()?;

        match self.cur_token.token_type {
            TokenType::Integer => self.parse_integer_literal(),
            TokenType::Numeric => self.parse_numeric_literal(),
            TokenType::String => self.parse_string_literal(),
            TokenType::DateTime => self.parse_datetime_literal(),
            TokenType::Guid => self.parse_guid_literal(),
            TokenType::Identifier => self.parse_column_name(),
            TokenType::Keyword => self.parse_keyword_expression(),
            TokenType::Operator => self.parse_unary_expression(),
            TokenType::Punctuator if self.cur_token.is_punctuator("(") => {
                self.next_token();
                let inner = self.parse_expression(Precedence::Lowest)?;
                self.expect_punctuator(")")?;
                Ok(inner)
            }
            _ => Err(Error::parse(format!(
                "unexpected token '{}' in expression at {}",
                self.cur_token.literal, self.cur_token.position
            ))),
        }
    }

    /// Lower an INTEGER literal: parse as double, then bucket by range
    fn parse_integer_literal(&mut self) -> Result<Expression> {
        let literal = self.cur_token.literal.clone();
        let value: f64 = literal.parse().map_err(|_| {
            Error::parse(format!("could not parse '{}' as integer", literal))
        })?;
        self.next_token();

        let value = if value > i64::MAX as f64 {
            Value::Double(value)
        } else if value > i32::MAX as f64 {
            Value::Int64(value as i64)
        } else {
            Value::Int32(value as i32)
        };
        Ok(Expression::Literal(value))
    }

    /// Lower a NUMERIC literal: scientific notation parses as double,
    /// otherwise decimal with a double fallback
    fn parse_numeric_literal(&mut self) -> Result<Expression> {
        let literal = self.cur_token.literal.clone();
        self.next_token();

        let value = if literal.contains('E') || literal.contains('e') {
            Value::Double(literal.parse().map_err(|_| {
                Error::parse(format!("could not parse '{}' as number", literal))
            })?)
        } else {
            match literal.parse() {
                Ok(decimal) => Value::Decimal(decimal),
                Err(_) => Value::Double(literal.parse().map_err(|_| {
                    Error::parse(format!("could not parse '{}' as number", literal))
                })?),
            }
        };
        Ok(Expression::Literal(value))
    }

    /// Lower a STRING literal: strip the surrounding single quotes
    fn parse_string_literal(&mut self) -> Result<Expression> {
        let inner = strip_wrapping(&self.cur_token.literal, '\'', '\'');
        let value = Value::text(inner);
        self.next_token();
        Ok(Expression::Literal(value))
    }

    /// Lower a DATETIME literal: strip the '#' delimiters and parse
    fn parse_datetime_literal(&mut self) -> Result<Expression> {
        let literal = self.cur_token.literal.clone();
        let inner = strip_wrapping(&literal, '#', '#');
        let timestamp = parse_timestamp(inner)
            .map_err(|_| Error::parse(format!("invalid date/time literal {}", literal)))?;
        self.next_token();
        Ok(Expression::Literal(Value::DateTime(timestamp)))
    }

    /// Lower a GUID literal: strip quotes and optional braces
    fn parse_guid_literal(&mut self) -> Result<Expression> {
        let literal = self.cur_token.literal.clone();
        let inner = strip_wrapping(&literal, '\'', '\'');
        let guid = parse_guid(inner)
            .ok_or_else(|| Error::parse(format!("invalid GUID literal {}", literal)))?;
        self.next_token();
        Ok(Expression::Literal(Value::Guid(guid)))
    }

    /// Resolve a column name against the active FILTER statement's table
    fn parse_column_name(&mut self) -> Result<Expression> {
        let name = self.cur_token.literal.clone();
        let table = self.current_table.as_ref().ok_or_else(|| {
            Error::parse(format!(
                "column reference '{}' outside of a FILTER statement",
                name
            ))
        })?;

        let column = table
            .column(&name)
            .ok_or_else(|| Error::column_not_found(&name, table.name()))?;

        let column_ref = ColumnRef {
            index: column.index(),
            name: column.name().to_string(),
            data_type: column.data_type(),
        };
        self.next_token();
        Ok(Expression::Column(column_ref))
    }

    /// Parse keyword-introduced prefix forms: boolean and NULL literals,
    /// NOT, and function calls
    fn parse_keyword_expression(&mut self) -> Result<Expression> {
        if self.cur_token.is_keyword("TRUE") {
            self.next_token();
            return Ok(Expression::Literal(Value::Boolean(true)));
        }
        if self.cur_token.is_keyword("FALSE") {
            self.next_token();
            return Ok(Expression::Literal(Value::Boolean(false)));
        }
        if self.cur_token.is_keyword("NULL") {
            self.next_token();
            return Ok(Expression::Literal(Value::null_undefined()));
        }
        if self.cur_token.is_keyword("NOT") {
            self.next_token();
            let child = self.parse_expression(Precedence::Not)?;
            return Ok(Expression::Unary {
                op: UnaryOp::Not,
                child: Box::new(child),
            });
        }

        if let Some(kind) = FunctionKind::from_name(&self.cur_token.literal) {
            return self.parse_function_call(kind);
        }

        Err(Error::parse(format!(
            "unexpected keyword '{}' in expression at {}",
            self.cur_token.literal, self.cur_token.position
        )))
    }

    /// Parse a unary operator expression (-, +, ~, !)
    fn parse_unary_expression(&mut self) -> Result<Expression> {
        let op = match self.cur_token.literal.as_str() {
            "+" => UnaryOp::Plus,
            "-" => UnaryOp::Minus,
            "~" | "!" => UnaryOp::Not,
            other => {
                return Err(Error::parse(format!(
                    "unexpected operator '{}' in expression at {}",
                    other, self.cur_token.position
                )))
            }
        };
        self.next_token();

        let child = self.parse_expression(Precedence::Prefix)?;
        Ok(Expression::Unary {
            op,
            child: Box::new(child),
        })
    }

    /// Parse a function call; the current token is the function keyword
    fn parse_function_call(&mut self, kind: FunctionKind) -> Result<Expression> {
        let name = self.cur_token.literal.clone();
        self.next_token();
        self.expect_punctuator("(")?;

        let arguments = if self.cur_token.is_punctuator(")") {
            Vec::new()
        } else {
            self.parse_expression_list()?
        };
        self.expect_punctuator(")")?;

        let (min, max) = kind.arity();
        if arguments.len() < min || arguments.len() > max {
            let expected = match (min, max) {
                (min, usize::MAX) => format!("at least {}", min),
                (min, max) if min == max => format!("{}", min),
                (min, max) => format!("{} to {}", min, max),
            };
            return Err(Error::parse(format!(
                "function '{}' expects {} argument(s), got {}",
                name,
                expected,
                arguments.len()
            )));
        }

        Ok(Expression::Function { kind, arguments })
    }

    /// Parse a comma-separated expression list
    pub(crate) fn parse_expression_list(&mut self) -> Result<Vec<Expression>> {
        let mut expressions = vec![self.parse_expression(Precedence::Lowest)?];

        while self.cur_token.is_punctuator(",") {
            self.next_token();
            expressions.push(self.parse_expression(Precedence::Lowest)?);
        }

        Ok(expressions)
    }

    /// Parse an infix clause with `left` already built
    fn parse_infix_expression(&mut self, left: Expression) -> Result<Expression> {
        if self.cur_token_is(TokenType::Operator) {
            return self.parse_binary_operator(left);
        }

        // Keyword-introduced predicates
        if self.cur_token.is_keyword("AND") || self.cur_token.is_keyword("OR") {
            let op = if self.cur_token.is_keyword("AND") {
                OperatorType::And
            } else {
                OperatorType::Or
            };
            self.next_token();
            let right = self.parse_expression(Precedence::Logical)?;
            return Ok(binary(op, left, right));
        }

        if self.cur_token.is_keyword("LIKE") {
            self.next_token();
            let right = self.parse_expression(Precedence::Predicate)?;
            return Ok(binary(OperatorType::Like, left, right));
        }

        if self.cur_token.is_keyword("IN") {
            self.next_token();
            return self.parse_in_list(left, false);
        }

        if self.cur_token.is_keyword("NOT") {
            self.next_token();
            if self.accept_keyword("LIKE") {
                let right = self.parse_expression(Precedence::Predicate)?;
                return Ok(binary(OperatorType::NotLike, left, right));
            }
            self.expect_keyword("IN")?;
            return self.parse_in_list(left, true);
        }

        if self.cur_token.is_keyword("IS") {
            self.next_token();
            let negated = self.accept_keyword("NOT");
            self.expect_keyword("NULL")?;
            return Ok(Expression::Operator {
                op: if negated {
                    OperatorType::IsNotNull
                } else {
                    OperatorType::IsNull
                },
                left: Box::new(left),
                right: None,
            });
        }

        Err(Error::parse(format!(
            "unexpected token '{}' in expression at {}",
            self.cur_token.literal, self.cur_token.position
        )))
    }

    /// Parse a symbolic binary operator clause
    fn parse_binary_operator(&mut self, left: Expression) -> Result<Expression> {
        let (op, operand_precedence) = match self.cur_token.literal.as_str() {
            "*" => (OperatorType::Multiply, Precedence::Math),
            "/" => (OperatorType::Divide, Precedence::Math),
            "%" => (OperatorType::Modulus, Precedence::Math),
            "+" => (OperatorType::Add, Precedence::Math),
            "-" => (OperatorType::Subtract, Precedence::Math),
            "<<" => (OperatorType::BitShiftLeft, Precedence::Bitwise),
            ">>" => (OperatorType::BitShiftRight, Precedence::Bitwise),
            "&" => (OperatorType::BitwiseAnd, Precedence::Bitwise),
            "|" => (OperatorType::BitwiseOr, Precedence::Bitwise),
            "<" => (OperatorType::LessThan, Precedence::Predicate),
            "<=" => (OperatorType::LessThanOrEqual, Precedence::Predicate),
            ">" => (OperatorType::GreaterThan, Precedence::Predicate),
            ">=" => (OperatorType::GreaterThanOrEqual, Precedence::Predicate),
            "=" | "==" => (OperatorType::Equal, Precedence::Predicate),
            "<>" | "!=" => (OperatorType::NotEqual, Precedence::Predicate),
            "&&" => (OperatorType::And, Precedence::Logical),
            "||" => (OperatorType::Or, Precedence::Logical),
            other => {
                return Err(Error::parse(format!(
                    "unexpected operator '{}' in expression at {}",
                    other, self.cur_token.position
                )))
            }
        };
        self.next_token();

        let right = self.parse_expression(operand_precedence)?;
        Ok(binary(op, left, right))
    }

    /// Parse the parenthesized argument list of an IN predicate
    fn parse_in_list(&mut self, value: Expression, negated: bool) -> Result<Expression> {
        self.expect_punctuator("(")?;

        if self.cur_token.is_punctuator(")") {
            return Err(Error::parse(format!(
                "not enough expressions found for \"IN\" operation at {}",
                self.cur_token.position
            )));
        }

        let arguments = self.parse_expression_list()?;
        self.expect_punctuator(")")?;

        Ok(Expression::InList {
            value: Box::new(value),
            arguments,
            negated,
        })
    }
}

/// Construct a binary operator expression
fn binary(op: OperatorType, left: Expression, right: Expression) -> Expression {
    Expression::Operator {
        op,
        left: Box::new(left),
        right: Some(Box::new(right)),
    }
}

/// Strip a wrapping delimiter pair when present
fn strip_wrapping<'a>(s: &'a str, open: char, close: char) -> &'a str {
    if s.len() >= 2 && s.starts_with(open) && s.ends_with(close) {
        &s[open.len_utf8()..s.len() - close.len_utf8()]
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DataType, ValueType};
    use crate::data::{DataSet, DataTable};
    use crate::parser::ast::Statement;

    fn test_data_set() -> DataSet {
        let mut table = DataTable::new("ActiveMeasurements");
        table.add_column("SignalID", DataType::Guid).unwrap();
        table.add_column("SignalType", DataType::String).unwrap();
        table.add_column("Frequency", DataType::Double).unwrap();
        table.add_column("ID", DataType::String).unwrap();

        let mut data_set = DataSet::new();
        data_set.add_table(table);
        data_set
    }

    fn parse_root(filter: &str) -> Expression {
        let data_set = test_data_set();
        let statements = Parser::new(filter).parse(&data_set).unwrap();
        match statements.into_iter().next().unwrap() {
            Statement::Filter(tree) => tree.root.clone().unwrap(),
            other => panic!("expected filter statement, got {:?}", other),
        }
    }

    fn parse_where(expr: &str) -> Expression {
        parse_root(&format!("FILTER ActiveMeasurements WHERE {}", expr))
    }

    #[test]
    fn test_integer_literal_bucketing() {
        assert_eq!(
            parse_where("Frequency > 60"),
            binary(
                OperatorType::GreaterThan,
                Expression::Column(ColumnRef {
                    index: 2,
                    name: "Frequency".to_string(),
                    data_type: DataType::Double,
                }),
                Expression::Literal(Value::Int32(60)),
            )
        );

        // Beyond i32 range becomes Int64
        match parse_where("Frequency > 3000000000") {
            Expression::Operator { right, .. } => {
                assert_eq!(
                    *right.unwrap(),
                    Expression::Literal(Value::Int64(3_000_000_000))
                );
            }
            other => panic!("unexpected {:?}", other),
        }

        // Beyond i64 range becomes Double
        match parse_where("Frequency > 99999999999999999999") {
            Expression::Operator { right, .. } => {
                assert_eq!(
                    *right.unwrap(),
                    Expression::Literal(Value::Double(1e20))
                );
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_numeric_literal_lowering() {
        match parse_where("Frequency > 59.97") {
            Expression::Operator { right, .. } => {
                let right = *right.unwrap();
                assert_eq!(
                    right,
                    Expression::Literal(Value::Decimal("59.97".parse().unwrap()))
                );
            }
            other => panic!("unexpected {:?}", other),
        }

        match parse_where("Frequency > 5.997E1") {
            Expression::Operator { right, .. } => {
                assert_eq!(*right.unwrap(), Expression::Literal(Value::Double(59.97)));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_null_and_boolean_literals() {
        match parse_where("TRUE") {
            Expression::Literal(Value::Boolean(true)) => {}
            other => panic!("unexpected {:?}", other),
        }
        match parse_where("NULL") {
            Expression::Literal(Value::Null(ValueType::Undefined)) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_flat_math_precedence_is_left_associative() {
        // The grammar keeps one precedence level for all math operators:
        // 1 + 2 * 3 parses as (1 + 2) * 3
        let expr = parse_where("1 + 2 * 3");
        assert_eq!(expr.to_string(), "((1 + 2) * 3)");
    }

    #[test]
    fn test_bitwise_binds_looser_than_math() {
        let expr = parse_where("1 << 2 + 3");
        assert_eq!(expr.to_string(), "(1 << (2 + 3))");
    }

    #[test]
    fn test_comparison_binds_looser_than_bitwise() {
        let expr = parse_where("1 & 3 = 1");
        assert_eq!(expr.to_string(), "((1 & 3) = 1)");
    }

    #[test]
    fn test_logical_flat_and_left_associative() {
        let expr = parse_where("TRUE OR FALSE AND TRUE");
        assert_eq!(expr.to_string(), "((true OR false) AND true)");
    }

    #[test]
    fn test_not_binds_tighter_than_logical() {
        let expr = parse_where("NOT TRUE AND FALSE");
        assert_eq!(expr.to_string(), "(NOT true AND false)");
        match parse_where("NOT TRUE AND FALSE") {
            Expression::Operator {
                op: OperatorType::And,
                left,
                ..
            } => {
                assert!(matches!(*left, Expression::Unary { .. }));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_not_consumes_comparison() {
        match parse_where("NOT Frequency > 60") {
            Expression::Unary {
                op: UnaryOp::Not,
                child,
            } => {
                assert!(matches!(
                    *child,
                    Expression::Operator {
                        op: OperatorType::GreaterThan,
                        ..
                    }
                ));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parenthesized_expression() {
        let expr = parse_where("(1 + 2) * (3 + 4)");
        assert_eq!(expr.to_string(), "((1 + 2) * (3 + 4))");
    }

    #[test]
    fn test_unary_minus() {
        match parse_where("Frequency > -1") {
            Expression::Operator { right, .. } => {
                assert!(matches!(
                    *right.unwrap(),
                    Expression::Unary {
                        op: UnaryOp::Minus,
                        ..
                    }
                ));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_alternate_operator_spellings() {
        assert_eq!(
            parse_where("1 == 2").to_string(),
            parse_where("1 = 2").to_string()
        );
        assert_eq!(
            parse_where("1 != 2").to_string(),
            parse_where("1 <> 2").to_string()
        );
        assert_eq!(
            parse_where("TRUE && FALSE").to_string(),
            parse_where("TRUE AND FALSE").to_string()
        );
        assert_eq!(
            parse_where("TRUE || FALSE").to_string(),
            parse_where("TRUE OR FALSE").to_string()
        );
    }

    #[test]
    fn test_like_and_not_like() {
        match parse_where("SignalType LIKE '%FR%'") {
            Expression::Operator {
                op: OperatorType::Like,
                ..
            } => {}
            other => panic!("unexpected {:?}", other),
        }
        match parse_where("SignalType NOT LIKE '%FR%'") {
            Expression::Operator {
                op: OperatorType::NotLike,
                ..
            } => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_is_null_forms() {
        match parse_where("Frequency IS NULL") {
            Expression::Operator {
                op: OperatorType::IsNull,
                right,
                ..
            } => assert!(right.is_none()),
            other => panic!("unexpected {:?}", other),
        }
        match parse_where("Frequency IS NOT NULL") {
            Expression::Operator {
                op: OperatorType::IsNotNull,
                ..
            } => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_in_list() {
        match parse_where("SignalType IN ('FREQ', 'VPHM')") {
            Expression::InList {
                arguments, negated, ..
            } => {
                assert_eq!(arguments.len(), 2);
                assert!(!negated);
            }
            other => panic!("unexpected {:?}", other),
        }
        match parse_where("SignalType NOT IN ('FREQ')") {
            Expression::InList { negated, .. } => assert!(negated),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_empty_in_list_is_structural_error() {
        let data_set = test_data_set();
        let err = Parser::new("FILTER ActiveMeasurements WHERE SignalType IN ()")
            .parse(&data_set)
            .unwrap_err();
        assert!(err.to_string().contains("IN"));
    }

    #[test]
    fn test_function_call_parsing() {
        match parse_where("Coalesce(Frequency, -1.0) > 0") {
            Expression::Operator { left, .. } => match *left {
                Expression::Function { kind, arguments } => {
                    assert_eq!(kind, FunctionKind::Coalesce);
                    assert_eq!(arguments.len(), 2);
                }
                other => panic!("unexpected {:?}", other),
            },
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_function_arity_is_checked_at_build() {
        let data_set = test_data_set();
        let err = Parser::new("FILTER ActiveMeasurements WHERE Len() = 0")
            .parse(&data_set)
            .unwrap_err();
        assert!(err.to_string().contains("argument"));

        let err = Parser::new("FILTER ActiveMeasurements WHERE IIF(TRUE, 1) = 1")
            .parse(&data_set)
            .unwrap_err();
        assert!(err.to_string().contains("argument"));
    }

    #[test]
    fn test_unknown_column_is_resolution_error() {
        let data_set = test_data_set();
        let err = Parser::new("FILTER ActiveMeasurements WHERE Missing = 1")
            .parse(&data_set)
            .unwrap_err();
        assert_eq!(
            err,
            Error::column_not_found("Missing", "ActiveMeasurements")
        );
    }

    #[test]
    fn test_guid_literal_in_expression() {
        match parse_where("SignalID = '11111111-1111-1111-1111-111111111111'") {
            Expression::Operator { right, .. } => {
                assert!(matches!(
                    *right.unwrap(),
                    Expression::Literal(Value::Guid(_))
                ));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_datetime_literal_in_expression() {
        match parse_where("Frequency IS NULL AND #2019-01-01 00:00:00# > #2018-01-01#") {
            Expression::Operator {
                op: OperatorType::And,
                ..
            } => {}
            other => panic!("unexpected {:?}", other),
        }
    }
}
