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

//! Filter-expression parser
//!
//! This module turns filter statement text into typed expression trees:
//!
//! - [`Lexer`] - tokenizer for filter text
//! - [`Parser`] - Pratt parser building [`ast`] nodes from tokens
//! - [`ast`] - expression, statement, and expression-tree types
//! - [`token`] - token types
//!
//! Table and column references are resolved against a
//! [`crate::data::DataSet`] during parsing, so a successfully parsed
//! [`ast::ExpressionTree`] is ready for row evaluation.

pub mod ast;
pub mod lexer;
#[allow(clippy::module_inception)]
pub mod parser;
pub mod precedence;
pub mod token;

// Expression and statement parsing are implemented as impl blocks on Parser
mod expressions;
mod statements;

pub use ast::{
    ColumnRef, Expression, ExpressionTree, FunctionKind, IdentifierStatement, OperatorType,
    OrderByTerm, Statement, UnaryOp,
};
pub use lexer::Lexer;
pub use parser::Parser;
pub use precedence::Precedence;
pub use token::{is_keyword, is_operator, is_punctuator, Position, Token, TokenType, KEYWORDS,
    OPERATORS, PUNCTUATORS};

use crate::core::Result;
use crate::data::DataSet;

/// Parse filter text into statements against the given dataset.
///
/// This is the main entry point for parsing filter strings; it is
/// equivalent to constructing a [`Parser`] and calling
/// [`Parser::parse`].
pub fn parse_filter(filter_text: &str, data_set: &DataSet) -> Result<Vec<Statement>> {
    Parser::new(filter_text).parse(data_set)
}
