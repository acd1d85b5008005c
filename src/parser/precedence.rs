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

//! Operator precedence levels for the Pratt parser
//!
//! The levels mirror the filter grammar's rule nesting exactly rather
//! than conventional SQL precedence: AND and OR share one level, all
//! math operators share one level, and all bitwise operators share one
//! level below math. Within a level operators associate left.

/// Precedence levels (higher number = higher precedence)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
#[derive(Default)]
pub enum Precedence {
    /// Lowest precedence
    #[default]
    Lowest = 1,
    /// Logical operators (AND, OR, &&, ||) - one shared level
    Logical = 2,
    /// NOT prefix at the expression level
    Not = 3,
    /// Predicates (=, <>, <, <=, >, >=, LIKE, IN, IS)
    Predicate = 4,
    /// Bitwise operators (<<, >>, &, |) - one shared level
    Bitwise = 5,
    /// Math operators (*, /, %, +, -) - one shared level
    Math = 6,
    /// Prefix operators (-, +, ~, !)
    Prefix = 7,
}

impl Precedence {
    /// Get the precedence for an infix operator or keyword spelling
    pub fn for_operator(op: &str) -> Precedence {
        match op.to_ascii_uppercase().as_str() {
            "AND" | "OR" | "&&" | "||" => Precedence::Logical,
            "NOT" => Precedence::Not,
            "=" | "==" | "<>" | "!=" | "<" | "<=" | ">" | ">=" | "LIKE" | "IN" | "IS" => {
                Precedence::Predicate
            }
            "<<" | ">>" | "&" | "|" => Precedence::Bitwise,
            "*" | "/" | "%" | "+" | "-" => Precedence::Math,
            _ => Precedence::Lowest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence_ordering() {
        assert!(Precedence::Prefix > Precedence::Math);
        assert!(Precedence::Math > Precedence::Bitwise);
        assert!(Precedence::Bitwise > Precedence::Predicate);
        assert!(Precedence::Predicate > Precedence::Not);
        assert!(Precedence::Not > Precedence::Logical);
        assert!(Precedence::Logical > Precedence::Lowest);
    }

    #[test]
    fn test_flat_levels_from_the_grammar() {
        // The grammar keeps one level for all math operators and one for
        // both logical operators
        assert_eq!(
            Precedence::for_operator("+"),
            Precedence::for_operator("*")
        );
        assert_eq!(
            Precedence::for_operator("AND"),
            Precedence::for_operator("OR")
        );
        assert_eq!(
            Precedence::for_operator("&&"),
            Precedence::for_operator("AND")
        );
        assert_eq!(
            Precedence::for_operator("<<"),
            Precedence::for_operator("|")
        );
    }

    #[test]
    fn test_operator_precedence() {
        assert_eq!(Precedence::for_operator("="), Precedence::Predicate);
        assert_eq!(Precedence::for_operator("like"), Precedence::Predicate);
        assert_eq!(Precedence::for_operator("&"), Precedence::Bitwise);
        assert_eq!(Precedence::for_operator("%"), Precedence::Math);
        assert_eq!(Precedence::for_operator("??"), Precedence::Lowest);
    }
}
