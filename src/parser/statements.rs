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

//! Statement parsing methods for the filter-expression parser
//!
//! A filter text is a semicolon-separated mix of FILTER statements and
//! standalone identifier statements (GUIDs, measurement keys, point
//! tags). FILTER statements lower to an [`ExpressionTree`] with table and
//! column references resolved eagerly.

use std::sync::Arc;

use super::ast::{
    ColumnRef, ExpressionTree, IdentifierStatement, OrderByTerm, Statement,
};
use super::parser::Parser;
use super::precedence::Precedence;
use super::token::TokenType;
use crate::core::value::parse_guid;
use crate::core::{Error, Result};
use crate::data::DataSet;

impl Parser {
    /// Parse one statement; the current token is its first token
    pub(crate) fn parse_statement(&mut self, data_set: &DataSet) -> Result<Statement> {
        self.check_lex_error()?;

        match self.cur_token.token_type {
            TokenType::Keyword if self.cur_token.is_keyword("FILTER") => {
                self.parse_filter_statement(data_set)
            }
            TokenType::Guid | TokenType::MeasurementKey | TokenType::PointTag => {
                self.parse_identifier_statement()
            }
            _ => Err(Error::parse(format!(
                "expected FILTER statement or measurement identifier, found '{}' at {}",
                self.cur_token.literal, self.cur_token.position
            ))),
        }
    }

    /// Parse a FILTER statement:
    /// `FILTER (TOP n)? tableName WHERE expression (ORDER BY term, ...)?`
    fn parse_filter_statement(&mut self, data_set: &DataSet) -> Result<Statement> {
        self.expect_keyword("FILTER")?;

        let top_limit = if self.accept_keyword("TOP") {
            self.parse_top_limit()?
        } else {
            -1
        };

        if !self.cur_token_is(TokenType::Identifier) {
            return Err(Error::parse(format!(
                "expected table name, found '{}' at {}",
                self.cur_token.literal, self.cur_token.position
            )));
        }
        let table_name = self.cur_token.literal.clone();
        let table = data_set
            .table(&table_name)
            .cloned()
            .ok_or_else(|| Error::TableNotFound(table_name.clone()))?;
        self.next_token();

        self.current_table = Some(Arc::clone(&table));
        let result = self.parse_filter_body(table, top_limit);
        self.current_table = None;

        result.map(|tree| Statement::Filter(Arc::new(tree)))
    }

    /// Parse the WHERE clause and optional ORDER BY of a FILTER statement
    fn parse_filter_body(
        &mut self,
        table: Arc<crate::data::DataTable>,
        top_limit: i32,
    ) -> Result<ExpressionTree> {
        self.expect_keyword("WHERE")?;

        let mut tree = ExpressionTree::new(table);
        tree.top_limit = top_limit;
        tree.root = Some(self.parse_expression(Precedence::Lowest)?);

        if self.accept_keyword("ORDER") {
            self.expect_keyword("BY")?;

            loop {
                tree.order_by_terms.push(self.parse_ordering_term(&tree)?);
                if !self.cur_token.is_punctuator(",") {
                    break;
                }
                self.next_token();
            }
        }

        Ok(tree)
    }

    /// Parse the TOP limit, allowing an optional sign as the original
    /// grammar does; a negative limit means "no limit"
    fn parse_top_limit(&mut self) -> Result<i32> {
        let negative = if self.cur_token.is_operator("-") {
            self.next_token();
            true
        } else {
            false
        };

        if !self.cur_token_is(TokenType::Integer) {
            return Err(Error::parse(format!(
                "expected TOP limit, found '{}' at {}",
                self.cur_token.literal, self.cur_token.position
            )));
        }

        let literal = self.cur_token.literal.clone();
        let limit: i32 = literal
            .parse()
            .map_err(|_| Error::parse(format!("invalid TOP limit '{}'", literal)))?;
        self.next_token();

        Ok(if negative { -limit } else { limit })
    }

    /// Parse one ordering term: `columnName (ASC | DESC)?`
    fn parse_ordering_term(&mut self, tree: &ExpressionTree) -> Result<OrderByTerm> {
        if !self.cur_token_is(TokenType::Identifier) {
            return Err(Error::parse(format!(
                "expected order by column name, found '{}' at {}",
                self.cur_token.literal, self.cur_token.position
            )));
        }

        let name = self.cur_token.literal.clone();
        let column = tree
            .table
            .column(&name)
            .ok_or_else(|| Error::column_not_found(&name, tree.table.name()))?;
        let column = ColumnRef {
            index: column.index(),
            name: column.name().to_string(),
            data_type: column.data_type(),
        };
        self.next_token();

        let ascending = if self.accept_keyword("DESC") {
            false
        } else {
            self.accept_keyword("ASC");
            true
        };

        Ok(OrderByTerm { column, ascending })
    }

    /// Parse a standalone identifier statement
    fn parse_identifier_statement(&mut self) -> Result<Statement> {
        let literal = self.cur_token.literal.clone();

        let statement = match self.cur_token.token_type {
            TokenType::Guid => {
                let inner = literal.trim_matches('\'');
                let guid = parse_guid(inner)
                    .ok_or_else(|| Error::parse(format!("invalid GUID literal {}", literal)))?;
                IdentifierStatement::SignalId(guid)
            }
            TokenType::MeasurementKey => IdentifierStatement::MeasurementKey(literal),
            TokenType::PointTag => {
                IdentifierStatement::PointTag(literal.trim_matches('"').to_string())
            }
            _ => unreachable!("caller checked the token type"),
        };
        self.next_token();

        Ok(Statement::Identifier(statement))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DataType;
    use crate::data::DataTable;
    use uuid::Uuid;

    fn test_data_set() -> DataSet {
        let mut table = DataTable::new("ActiveMeasurements");
        table.add_column("SignalID", DataType::Guid).unwrap();
        table.add_column("PointTag", DataType::String).unwrap();
        table.add_column("SignalType", DataType::String).unwrap();

        let mut other = DataTable::new("Statistics");
        other.add_column("SignalID", DataType::Guid).unwrap();
        other.add_column("Source", DataType::String).unwrap();

        let mut data_set = DataSet::new();
        data_set.add_table(table);
        data_set.add_table(other);
        data_set
    }

    fn parse(filter: &str) -> Vec<Statement> {
        Parser::new(filter).parse(&test_data_set()).unwrap()
    }

    #[test]
    fn test_basic_filter_statement() {
        let statements = parse("FILTER ActiveMeasurements WHERE SignalType = 'FREQ'");
        assert_eq!(statements.len(), 1);
        match &statements[0] {
            Statement::Filter(tree) => {
                assert_eq!(tree.table.name(), "ActiveMeasurements");
                assert_eq!(tree.top_limit, -1);
                assert!(tree.root.is_some());
                assert!(tree.order_by_terms.is_empty());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_table_name_is_case_insensitive() {
        let statements = parse("FILTER activemeasurements WHERE SignalType = 'FREQ'");
        match &statements[0] {
            Statement::Filter(tree) => assert_eq!(tree.table.name(), "ActiveMeasurements"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_top_limit() {
        match &parse("FILTER TOP 5 ActiveMeasurements WHERE TRUE")[0] {
            Statement::Filter(tree) => assert_eq!(tree.top_limit, 5),
            other => panic!("unexpected {:?}", other),
        }

        // Signed limit is tolerated and means "no limit" when negative
        match &parse("FILTER TOP -1 ActiveMeasurements WHERE TRUE")[0] {
            Statement::Filter(tree) => assert_eq!(tree.top_limit, -1),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_order_by_terms() {
        let statements =
            parse("FILTER ActiveMeasurements WHERE TRUE ORDER BY SignalType DESC, PointTag");
        match &statements[0] {
            Statement::Filter(tree) => {
                assert_eq!(tree.order_by_terms.len(), 2);
                assert_eq!(tree.order_by_terms[0].column.name, "SignalType");
                assert!(!tree.order_by_terms[0].ascending);
                assert_eq!(tree.order_by_terms[1].column.name, "PointTag");
                assert!(tree.order_by_terms[1].ascending);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_multiple_statements() {
        let statements = parse(
            "FILTER ActiveMeasurements WHERE SignalType = 'FREQ'; \
             FILTER Statistics WHERE Source = 'PPA'",
        );
        assert_eq!(statements.len(), 2);
        match &statements[1] {
            Statement::Filter(tree) => assert_eq!(tree.table.name(), "Statistics"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_identifier_statements() {
        let statements = parse(
            "'11111111-1111-1111-1111-111111111111'; PPA:42; \"GPA_TVA:VPHM\"",
        );
        assert_eq!(statements.len(), 3);

        match &statements[0] {
            Statement::Identifier(IdentifierStatement::SignalId(guid)) => {
                assert_eq!(
                    *guid,
                    Uuid::parse_str("11111111-1111-1111-1111-111111111111").unwrap()
                );
            }
            other => panic!("unexpected {:?}", other),
        }
        match &statements[1] {
            Statement::Identifier(IdentifierStatement::MeasurementKey(key)) => {
                assert_eq!(key, "PPA:42");
            }
            other => panic!("unexpected {:?}", other),
        }
        match &statements[2] {
            Statement::Identifier(IdentifierStatement::PointTag(tag)) => {
                assert_eq!(tag, "GPA_TVA:VPHM");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_bare_and_braced_guid_statements() {
        let statements = parse(
            "11111111-1111-1111-1111-111111111111; {22222222-2222-2222-2222-222222222222}",
        );
        assert_eq!(statements.len(), 2);
        for statement in &statements {
            assert!(matches!(
                statement,
                Statement::Identifier(IdentifierStatement::SignalId(_))
            ));
        }
    }

    #[test]
    fn test_mixed_statement_kinds() {
        let statements =
            parse("PPA:1; FILTER ActiveMeasurements WHERE SignalType = 'FREQ'; PPA:2");
        assert_eq!(statements.len(), 3);
        assert!(matches!(statements[1], Statement::Filter(_)));
    }

    #[test]
    fn test_unknown_table_is_resolution_error() {
        let err = Parser::new("FILTER NoSuchTable WHERE x = 1")
            .parse(&test_data_set())
            .unwrap_err();
        assert_eq!(err, Error::TableNotFound("NoSuchTable".to_string()));
    }

    #[test]
    fn test_unknown_order_by_column() {
        let err = Parser::new("FILTER ActiveMeasurements WHERE TRUE ORDER BY Missing")
            .parse(&test_data_set())
            .unwrap_err();
        assert_eq!(
            err,
            Error::column_not_found("Missing", "ActiveMeasurements")
        );
    }

    #[test]
    fn test_missing_where_is_structural_error() {
        let err = Parser::new("FILTER ActiveMeasurements SignalType = 'FREQ'")
            .parse(&test_data_set())
            .unwrap_err();
        assert!(err.to_string().contains("WHERE"));
    }

    #[test]
    fn test_trailing_junk_rejected() {
        let err = Parser::new("FILTER ActiveMeasurements WHERE TRUE extra")
            .parse(&test_data_set())
            .unwrap_err();
        assert!(err.to_string().contains("extra"));
    }

    #[test]
    fn test_statement_values_survive_parse() {
        // A query containing every literal shape parses in one pass
        let statements = parse(
            "FILTER TOP 10 ActiveMeasurements \
             WHERE SignalType IN ('FREQ', 'VPHM') AND PointTag LIKE 'GPA%' \
             ORDER BY PointTag DESC",
        );
        match &statements[0] {
            Statement::Filter(tree) => {
                assert_eq!(tree.top_limit, 10);
                assert_eq!(tree.order_by_terms.len(), 1);
                let root = tree.root.as_ref().unwrap();
                assert!(root.to_string().contains("LIKE"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_value_literals_do_not_leak_between_statements() {
        let statements = parse(
            "FILTER ActiveMeasurements WHERE SignalType = 'FREQ'; \
             '33333333-3333-3333-3333-333333333333'",
        );
        assert_eq!(statements.len(), 2);
        match &statements[0] {
            Statement::Filter(tree) => {
                let root = tree.root.as_ref().unwrap();
                assert_eq!(root.to_string(), "(SignalType = 'FREQ')");
                assert!(!root.to_string().contains("3333"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
