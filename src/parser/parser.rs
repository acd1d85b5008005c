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

//! Filter-expression parser - main Parser struct and core parsing logic
//!
//! The parser is a Pratt parser over the lexer's token stream. Statement
//! and expression parsing methods live in sibling modules as impl blocks
//! on [`Parser`]; this module provides the token plumbing they share.

use std::sync::Arc;

use super::ast::Statement;
use super::lexer::Lexer;
use super::precedence::Precedence;
use super::token::{Token, TokenType};
use crate::core::{Error, Result};
use crate::data::{DataSet, DataTable};

/// Filter-expression parser using Pratt parsing for expressions
pub struct Parser {
    /// The lexer providing tokens
    lexer: Lexer,
    /// Current token being examined
    pub(crate) cur_token: Token,
    /// Next token (peek)
    pub(crate) peek_token: Token,
    /// Target table of the FILTER statement being parsed, for column
    /// resolution
    pub(crate) current_table: Option<Arc<DataTable>>,
}

impl Parser {
    /// Create a new parser for the given filter text
    pub fn new(input: &str) -> Self {
        let mut lexer = Lexer::new(input);
        let cur_token = next_meaningful(&mut lexer);
        let peek_token = next_meaningful(&mut lexer);

        Self {
            lexer,
            cur_token,
            peek_token,
            current_table: None,
        }
    }

    /// Parse every semicolon-separated statement of the filter text.
    ///
    /// Table and column references resolve against `data_set`; the first
    /// structural or resolution failure aborts the parse.
    pub fn parse(&mut self, data_set: &DataSet) -> Result<Vec<Statement>> {
        let mut statements = Vec::new();

        loop {
            while self.cur_token.is_punctuator(";") {
                self.next_token();
            }
            if self.cur_token.is_eof() {
                break;
            }

            statements.push(self.parse_statement(data_set)?);

            if !self.cur_token.is_punctuator(";") && !self.cur_token.is_eof() {
                return Err(Error::parse(format!(
                    "unexpected input after statement: '{}' at {}",
                    self.cur_token.literal, self.cur_token.position
                )));
            }
        }

        Ok(statements)
    }

    // =========================================================================
    // Token plumbing
    // =========================================================================

    /// Advance to the next token, skipping comments
    pub(crate) fn next_token(&mut self) {
        self.cur_token = std::mem::replace(&mut self.peek_token, next_meaningful(&mut self.lexer));
    }

    /// Check the current token for a lexer error and surface it
    pub(crate) fn check_lex_error(&self) -> Result<()> {
        if self.cur_token.is_error() {
            return Err(Error::parse(format!(
                "{} at {}",
                self.cur_token
                    .error
                    .as_deref()
                    .unwrap_or("invalid token"),
                self.cur_token.position
            )));
        }
        Ok(())
    }

    /// Check if the current token has the given type
    pub(crate) fn cur_token_is(&self, token_type: TokenType) -> bool {
        self.cur_token.token_type == token_type
    }

    /// Check if the peek token has the given type
    pub(crate) fn peek_token_is(&self, token_type: TokenType) -> bool {
        self.peek_token.token_type == token_type
    }

    /// Consume the current token if it is the given keyword
    pub(crate) fn accept_keyword(&mut self, keyword: &str) -> bool {
        if self.cur_token.is_keyword(keyword) {
            self.next_token();
            true
        } else {
            false
        }
    }

    /// Require and consume the given keyword
    pub(crate) fn expect_keyword(&mut self, keyword: &str) -> Result<()> {
        if !self.accept_keyword(keyword) {
            return Err(Error::parse(format!(
                "expected '{}', found '{}' at {}",
                keyword, self.cur_token.literal, self.cur_token.position
            )));
        }
        Ok(())
    }

    /// Require and consume the given punctuator
    pub(crate) fn expect_punctuator(&mut self, punct: &str) -> Result<()> {
        if !self.cur_token.is_punctuator(punct) {
            return Err(Error::parse(format!(
                "expected '{}', found '{}' at {}",
                punct, self.cur_token.literal, self.cur_token.position
            )));
        }
        self.next_token();
        Ok(())
    }

    /// Precedence of the current token when used as an infix operator
    pub(crate) fn cur_precedence(&self) -> Precedence {
        match self.cur_token.token_type {
            TokenType::Operator | TokenType::Keyword => {
                Precedence::for_operator(&self.cur_token.literal)
            }
            _ => Precedence::Lowest,
        }
    }
}

/// Pull the next non-comment token from the lexer
fn next_meaningful(lexer: &mut Lexer) -> Token {
    loop {
        let token = lexer.next_token();
        if token.token_type != TokenType::Comment {
            return token;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_plumbing_skips_comments() {
        let mut parser = Parser::new("FILTER -- note\n T");
        assert!(parser.cur_token.is_keyword("FILTER"));
        assert_eq!(parser.peek_token.token_type, TokenType::Identifier);
        parser.next_token();
        assert_eq!(parser.cur_token.literal, "T");
    }

    #[test]
    fn test_expect_keyword() {
        let mut parser = Parser::new("WHERE x");
        assert!(parser.expect_keyword("WHERE").is_ok());
        assert!(parser.expect_keyword("WHERE").is_err());
    }

    #[test]
    fn test_expect_punctuator_message() {
        let mut parser = Parser::new("FILTER");
        let err = parser.expect_punctuator("(").unwrap_err();
        assert!(err.to_string().contains("expected '('"));
        assert!(err.to_string().contains("FILTER"));
    }

    #[test]
    fn test_empty_input_parses_to_no_statements() {
        let data_set = DataSet::new();
        assert!(Parser::new("").parse(&data_set).unwrap().is_empty());
        assert!(Parser::new(" ; ; ").parse(&data_set).unwrap().is_empty());
    }
}
