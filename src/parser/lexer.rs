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

//! Filter-expression lexer (tokenizer)
//!
//! Tokenizes filter statement text. Beyond the usual identifier, keyword,
//! number, and operator forms, the filter grammar has four literal shapes
//! of its own: `#...#` date/time literals, bare or braced or quoted GUID
//! literals, `SOURCE:n` measurement-key literals, and double-quoted
//! point-tag literals.

use super::token::{
    is_keyword, is_operator, is_operator_char, is_punctuator, Position, Token, TokenType,
};

/// Filter-expression lexer
pub struct Lexer {
    /// Input string
    input: Vec<char>,
    /// Current position in input (points to current char)
    position: usize,
    /// Current reading position in input (after current char)
    read_position: usize,
    /// Current character under examination
    ch: char,
    /// Current position tracking
    pos: Position,
}

impl Lexer {
    /// Create a new lexer for the given input
    pub fn new(input: &str) -> Self {
        let chars: Vec<char> = input.chars().collect();
        let mut lexer = Self {
            input: chars,
            position: 0,
            read_position: 0,
            ch: '\0',
            pos: Position::new(0, 1, 1),
        };
        lexer.read_char();
        lexer
    }

    /// Read the next character
    fn read_char(&mut self) {
        if self.ch == '\n' {
            self.pos.line += 1;
            self.pos.column = 1;
        } else if self.ch != '\0' {
            self.pos.column += 1;
        }

        if self.read_position >= self.input.len() {
            self.ch = '\0'; // EOF
        } else {
            self.ch = self.input[self.read_position];
            self.position = self.read_position;
            self.read_position += 1;
        }

        self.pos.offset = self.position;
    }

    /// Peek at the next character without advancing
    fn peek_char(&self) -> char {
        self.peek_char_n(1)
    }

    /// Peek at a character N positions ahead without advancing
    fn peek_char_n(&self, n: usize) -> char {
        let pos = self.read_position + n - 1;
        if pos >= self.input.len() {
            '\0'
        } else {
            self.input[pos]
        }
    }

    /// Get the next token
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let pos = self.pos;

        match self.ch {
            '\0' => Token::eof(pos),

            // String literal (single quotes); a GUID-shaped string lexes
            // as a GUID literal per the grammar
            '\'' => match self.read_string_literal() {
                Some(literal) => {
                    let inner = literal.trim_matches('\'');
                    if is_guid_shape(inner) {
                        Token::new(TokenType::Guid, literal, pos)
                    } else {
                        Token::new(TokenType::String, literal, pos)
                    }
                }
                None => Token::error("unterminated string literal", "'", pos),
            },

            // Point tag literal (double quotes)
            '"' => match self.read_delimited('"') {
                Some(literal) => Token::new(TokenType::PointTag, literal, pos),
                None => Token::error("unterminated point tag literal", "\"", pos),
            },

            // Date/time literal (#...#)
            '#' => match self.read_delimited('#') {
                Some(literal) => Token::new(TokenType::DateTime, literal, pos),
                None => Token::error("unterminated date/time literal", "#", pos),
            },

            // Braced GUID literal ({...})
            '{' => {
                let literal = self.read_braced();
                let inner = literal.trim_start_matches('{').trim_end_matches('}');
                if literal.ends_with('}') && is_guid_shape(inner) {
                    Token::new(TokenType::Guid, literal, pos)
                } else {
                    Token::error("malformed GUID literal", literal, pos)
                }
            }

            // Single line comment (--)
            // Only when followed by whitespace or EOF; '--3' is double negation
            '-' if self.peek_char() == '-' && self.is_comment_start_after_dashes() => {
                let literal = self.read_line_comment();
                Token::new(TokenType::Comment, literal, pos)
            }

            // Multi-line comment (/* ... */)
            '/' if self.peek_char() == '*' => match self.read_block_comment() {
                Some(literal) => Token::new(TokenType::Comment, literal, pos),
                None => Token::error("unterminated block comment", "/*", pos),
            },

            // Bare GUID literal; must be probed before numbers and
            // identifiers since hex digits overlap with both
            c if c.is_ascii_hexdigit() && self.guid_ahead() => {
                let literal = self.read_guid();
                Token::new(TokenType::Guid, literal, pos)
            }

            // Number literal
            c if c.is_ascii_digit() => {
                let literal = self.read_number();
                if literal.contains('.') || literal.contains('e') || literal.contains('E') {
                    Token::new(TokenType::Numeric, literal, pos)
                } else {
                    Token::new(TokenType::Integer, literal, pos)
                }
            }

            // Punctuator
            c if is_punctuator(c) => {
                self.read_char();
                Token::new(TokenType::Punctuator, c.to_string(), pos)
            }

            // Operator
            c if is_operator_char(c) => {
                let literal = self.read_operator();
                if is_operator(&literal) {
                    Token::new(TokenType::Operator, literal, pos)
                } else {
                    Token::error(
                        format!("unrecognized operator: {:?}", literal),
                        literal.clone(),
                        pos,
                    )
                }
            }

            // Identifier, keyword, or measurement key
            c if c.is_alphabetic() || c == '_' => {
                let literal = self.read_identifier();
                if self.ch == ':' && self.peek_is_key_char() {
                    let literal = self.read_measurement_key(literal);
                    Token::new(TokenType::MeasurementKey, literal, pos)
                } else if is_keyword(&literal) {
                    Token::new(TokenType::Keyword, literal.to_ascii_uppercase(), pos)
                } else {
                    Token::new(TokenType::Identifier, literal, pos)
                }
            }

            // Unrecognized character
            c => {
                self.read_char();
                Token::error(
                    format!("unrecognized character: {:?}", c),
                    c.to_string(),
                    pos,
                )
            }
        }
    }

    /// Check if the character after '--' marks a comment rather than
    /// a double negation
    fn is_comment_start_after_dashes(&self) -> bool {
        matches!(self.peek_char_n(2), '\0' | ' ' | '\t' | '\n' | '\r')
    }

    /// Skip whitespace characters
    fn skip_whitespace(&mut self) {
        while self.ch.is_whitespace() {
            self.read_char();
        }
    }

    /// Read an identifier
    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        result.push(self.ch);
        self.read_char();

        while self.ch.is_alphanumeric() || self.ch == '_' {
            result.push(self.ch);
            self.read_char();
        }

        result
    }

    /// True when the char after ':' can continue a measurement key
    fn peek_is_key_char(&self) -> bool {
        let c = self.peek_char();
        c.is_alphanumeric() || c == '_'
    }

    /// Read the remainder of a measurement key after its source acronym
    fn read_measurement_key(&mut self, source: String) -> String {
        let mut result = source;
        result.push(self.ch); // ':'
        self.read_char();

        while self.ch.is_alphanumeric() || self.ch == '_' {
            result.push(self.ch);
            self.read_char();
        }

        result
    }

    /// Read a number (integer or numeric)
    fn read_number(&mut self) -> String {
        let mut result = String::new();
        result.push(self.ch);
        self.read_char();

        while self.ch.is_ascii_digit() {
            result.push(self.ch);
            self.read_char();
        }

        // Fractional part
        if self.ch == '.' && self.peek_char().is_ascii_digit() {
            result.push(self.ch);
            self.read_char();

            while self.ch.is_ascii_digit() {
                result.push(self.ch);
                self.read_char();
            }
        }

        // Exponent
        if (self.ch == 'e' || self.ch == 'E')
            && (self.peek_char().is_ascii_digit()
                || ((self.peek_char() == '+' || self.peek_char() == '-')
                    && self.peek_char_n(2).is_ascii_digit()))
        {
            result.push(self.ch);
            self.read_char();

            if self.ch == '+' || self.ch == '-' {
                result.push(self.ch);
                self.read_char();
            }

            while self.ch.is_ascii_digit() {
                result.push(self.ch);
                self.read_char();
            }
        }

        result
    }

    /// Read a string literal (single-quoted), collapsing doubled quotes;
    /// None when unterminated
    fn read_string_literal(&mut self) -> Option<String> {
        let quote = self.ch;
        let mut result = String::new();
        result.push(quote);
        self.read_char(); // consume opening quote

        loop {
            if self.ch == '\0' {
                return None;
            } else if self.ch == quote {
                if self.peek_char() == quote {
                    // SQL-style escape: '' becomes '
                    result.push(self.ch);
                    self.read_char();
                    self.read_char();
                } else {
                    result.push(quote);
                    self.read_char();
                    return Some(result);
                }
            } else {
                result.push(self.ch);
                self.read_char();
            }
        }
    }

    /// Read a delimiter-bounded literal (point tags, date/times), keeping
    /// the delimiters; None when unterminated
    fn read_delimited(&mut self, delimiter: char) -> Option<String> {
        let mut result = String::new();
        result.push(self.ch);
        self.read_char(); // consume opening delimiter

        while self.ch != delimiter {
            if self.ch == '\0' {
                return None;
            }
            result.push(self.ch);
            self.read_char();
        }

        result.push(self.ch);
        self.read_char(); // consume closing delimiter
        Some(result)
    }

    /// Read a braced GUID candidate, stopping at '}' or a clearly
    /// non-GUID character
    fn read_braced(&mut self) -> String {
        let mut result = String::new();
        result.push(self.ch); // '{'
        self.read_char();

        while self.ch.is_ascii_hexdigit() || self.ch == '-' {
            result.push(self.ch);
            self.read_char();
        }

        if self.ch == '}' {
            result.push(self.ch);
            self.read_char();
        }

        result
    }

    /// Check whether a bare GUID literal starts at the current character
    fn guid_ahead(&self) -> bool {
        // Offset 0 is the current char, offsets 1.. are peeks
        let char_at = |i: usize| {
            if i == 0 {
                self.ch
            } else {
                self.peek_char_n(i)
            }
        };

        for i in 0..36 {
            let c = char_at(i);
            let ok = match i {
                8 | 13 | 18 | 23 => c == '-',
                _ => c.is_ascii_hexdigit(),
            };
            if !ok {
                return false;
            }
        }

        // Must not run into a longer identifier-like token
        let next = char_at(36);
        !(next.is_alphanumeric() || next == '_')
    }

    /// Consume a bare GUID literal (caller verified the shape)
    fn read_guid(&mut self) -> String {
        let mut result = String::with_capacity(36);
        for _ in 0..36 {
            result.push(self.ch);
            self.read_char();
        }
        result
    }

    /// Read a single-line comment (--)
    fn read_line_comment(&mut self) -> String {
        let mut result = String::new();

        while self.ch != '\n' && self.ch != '\0' {
            result.push(self.ch);
            self.read_char();
        }

        result
    }

    /// Read a block comment (/* ... */); None when unterminated
    fn read_block_comment(&mut self) -> Option<String> {
        let mut result = String::new();
        result.push(self.ch); // '/'
        self.read_char();
        result.push(self.ch); // '*'
        self.read_char();

        while !(self.ch == '*' && self.peek_char() == '/') {
            if self.ch == '\0' {
                return None;
            }
            result.push(self.ch);
            self.read_char();
        }

        result.push(self.ch); // '*'
        self.read_char();
        result.push(self.ch); // '/'
        self.read_char();
        Some(result)
    }

    /// Read an operator with maximal munch
    fn read_operator(&mut self) -> String {
        let mut result = String::new();
        let first_char = self.ch;
        result.push(first_char);
        self.read_char();

        if self.ch != '\0' {
            let two_chars: String = [first_char, self.ch].iter().collect();
            if is_operator(&two_chars) {
                result.push(self.ch);
                self.read_char();
            }
        }

        result
    }
}

/// Check whether a string has the 8-4-4-4-12 hex GUID shape
fn is_guid_shape(s: &str) -> bool {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() != 36 {
        return false;
    }
    chars.iter().enumerate().all(|(i, c)| match i {
        8 | 13 | 18 | 23 => *c == '-',
        _ => c.is_ascii_hexdigit(),
    })
}
