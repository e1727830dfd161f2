use crate::error::{Error, Result};
use crate::sql::parser::ast::{Condition, Join, JoinType, LogicalOp, Statement};
use crate::sql::parser::lexer::{Keyword, Token, tokenize};
use crate::sql::types::{DataType, Value};

pub mod ast;
pub mod lexer;

/// Parser - Converts the token stream into a Statement
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// Creates a new parser for the given query text
    pub fn new(input: &str) -> Self {
        Parser {
            tokens: tokenize(input),
            pos: 0,
        }
    }

    /// Parses the input into a statement. The trailing `;` is optional.
    pub fn parse(&mut self) -> Result<Statement> {
        let stmt = self.parse_statement()?;
        self.next_if_token(Token::Semicolon);
        // No tokens allowed after the statement
        if let Some(token) = self.peek() {
            return Err(Error::Syntax(format!("[Parser] Unexpected token {}", token)));
        }
        Ok(stmt)
    }

    /// Parses a statement based on the command keyword
    fn parse_statement(&mut self) -> Result<Statement> {
        match self.peek() {
            Some(Token::Keyword(Keyword::Create)) => self.parse_create_table(),
            Some(Token::Keyword(Keyword::Insert)) => self.parse_insert(),
            Some(Token::Keyword(Keyword::Select)) => self.parse_select(),
            Some(Token::Keyword(Keyword::Update)) => self.parse_update(),
            Some(Token::Keyword(Keyword::Delete)) => self.parse_delete(),
            Some(Token::Keyword(Keyword::Begin)) => self.parse_bare(Statement::Begin),
            Some(Token::Keyword(Keyword::Commit)) => self.parse_bare(Statement::Commit),
            Some(Token::Keyword(Keyword::Rollback)) => self.parse_bare(Statement::Rollback),
            Some(t) => Err(Error::Syntax(format!("[Parser] Unknown command {}", t))),
            None => Err(Error::Syntax("[Parser] Empty query".to_string())),
        }
    }

    /// BEGIN / COMMIT / ROLLBACK take no arguments
    fn parse_bare(&mut self, stmt: Statement) -> Result<Statement> {
        self.next()?;
        Ok(stmt)
    }

    /// Parses CREATE TABLE statement
    fn parse_create_table(&mut self) -> Result<Statement> {
        self.next_expect(Token::Keyword(Keyword::Create))?;
        self.next_expect(Token::Keyword(Keyword::Table))?;
        let name = self.next_ident()?;
        self.next_expect(Token::OpenParen)?;

        let mut columns = Vec::new();
        loop {
            columns.push(self.parse_column()?);
            if self.next_if_token(Token::Comma).is_none() {
                break;
            }
        }
        self.next_expect(Token::CloseParen)?;
        Ok(Statement::CreateTable { name, columns })
    }

    /// Parses `name type [AUTO_INCREMENT]`
    fn parse_column(&mut self) -> Result<ast::Column> {
        let name = self.next_ident()?;
        let datatype = match self.next()? {
            Token::Keyword(Keyword::String) => DataType::String,
            Token::Keyword(Keyword::Integer) => DataType::Integer,
            Token::Keyword(Keyword::Float) => DataType::Float,
            token => {
                return Err(Error::Syntax(format!(
                    "[Parser] Unknown data type {} for column {}",
                    token, name
                )));
            }
        };
        let auto_increment = self
            .next_if_token(Token::Keyword(Keyword::AutoIncrement))
            .is_some();
        if auto_increment && datatype != DataType::Integer {
            return Err(Error::Syntax(format!(
                "[Parser] AUTO_INCREMENT requires an INTEGER column, {} is {}",
                name, datatype
            )));
        }
        Ok(ast::Column {
            name,
            datatype,
            auto_increment,
        })
    }

    /// Parses INSERT statement
    fn parse_insert(&mut self) -> Result<Statement> {
        self.next_expect(Token::Keyword(Keyword::Insert))?;
        self.next_expect(Token::Keyword(Keyword::Into))?;
        let table_name = self.next_ident()?;
        self.next_expect(Token::Keyword(Keyword::Values))?;
        self.next_expect(Token::OpenParen)?;

        let mut values = Vec::new();
        if self.next_if_token(Token::CloseParen).is_none() {
            loop {
                values.push(self.parse_raw_value()?);
                match self.next()? {
                    Token::CloseParen => break,
                    Token::Comma => {}
                    token => {
                        return Err(Error::Syntax(format!("[Parser] Unexpected token {}", token)));
                    }
                }
            }
        }
        Ok(Statement::Insert { table_name, values })
    }

    /// Parses SELECT statement
    fn parse_select(&mut self) -> Result<Statement> {
        self.next_expect(Token::Keyword(Keyword::Select))?;

        let mut columns = Vec::new();
        if self.next_if_token(Token::Ident("*".to_string())).is_none() {
            loop {
                columns.push(self.next_ident()?);
                if self.next_if_token(Token::Comma).is_none() {
                    break;
                }
            }
        }

        self.next_expect(Token::Keyword(Keyword::From))?;
        let table_name = self.next_ident()?;
        let join = self.parse_join(&table_name)?;
        Ok(Statement::Select {
            columns,
            table_name,
            join,
            where_clause: self.parse_where_clause()?,
        })
    }

    /// Parses an optional `[INNER|LEFT|RIGHT] JOIN other ON a.col = b.col`
    fn parse_join(&mut self, from: &str) -> Result<Option<Join>> {
        let join_type = match self.peek() {
            Some(Token::Keyword(Keyword::Join)) => JoinType::Inner,
            Some(Token::Keyword(Keyword::Inner)) => {
                self.next()?;
                JoinType::Inner
            }
            Some(Token::Keyword(Keyword::Left)) => {
                self.next()?;
                JoinType::Left
            }
            Some(Token::Keyword(Keyword::Right)) => {
                self.next()?;
                JoinType::Right
            }
            _ => return Ok(None),
        };
        self.next_expect(Token::Keyword(Keyword::Join))?;
        let table_name = self.next_ident()?;
        self.next_expect(Token::Keyword(Keyword::On))?;
        let mut left_column = self.next_ident()?;
        self.next_expect(Token::Operator(ast::Operator::Equal))?;
        let mut right_column = self.next_ident()?;

        // ON b.x = a.y names the joined table first
        if !from.eq_ignore_ascii_case(&table_name)
            && qualifier_is(&left_column, &table_name)
            && qualifier_is(&right_column, from)
        {
            std::mem::swap(&mut left_column, &mut right_column);
        }

        Ok(Some(Join {
            join_type,
            table_name,
            left_column,
            right_column,
        }))
    }

    /// Parses UPDATE statement
    fn parse_update(&mut self) -> Result<Statement> {
        self.next_expect(Token::Keyword(Keyword::Update))?;
        let table_name = self.next_ident()?;
        self.next_expect(Token::Keyword(Keyword::Set))?;
        let column = self.next_ident()?;
        self.next_expect(Token::Operator(ast::Operator::Equal))?;
        let value = self.parse_raw_value()?;
        if self.next_if_token(Token::Comma).is_some() {
            return Err(Error::Syntax(
                "[Parser] UPDATE supports exactly one column per statement".to_string(),
            ));
        }
        Ok(Statement::Update {
            table_name,
            column,
            value,
            where_clause: self.parse_where_clause()?,
        })
    }

    /// Parses DELETE statement
    fn parse_delete(&mut self) -> Result<Statement> {
        self.next_expect(Token::Keyword(Keyword::Delete))?;
        self.next_expect(Token::Keyword(Keyword::From))?;
        let table_name = self.next_ident()?;
        Ok(Statement::Delete {
            table_name,
            where_clause: self.parse_where_clause()?,
        })
    }

    /// Raw text of an INSERT or SET value, `None` for an unquoted NULL
    fn parse_raw_value(&mut self) -> Result<Option<String>> {
        match self.next()? {
            Token::String(s) | Token::Ident(s) => Ok(Some(s)),
            Token::Keyword(Keyword::Null) => Ok(None),
            token => Err(Error::Syntax(format!(
                "[Parser] Unexpected value token {}",
                token
            ))),
        }
    }

    fn parse_where_clause(&mut self) -> Result<Option<Condition>> {
        if self.next_if_token(Token::Keyword(Keyword::Where)).is_none() {
            return Ok(None);
        }
        Ok(Some(self.parse_condition()?))
    }

    /// Parses a condition up to the end of input or an unmatched `)`.
    ///
    /// AND and OR share one precedence level and associate to the left:
    /// `a OR b AND c` is `(a OR b) AND c`.
    fn parse_condition(&mut self) -> Result<Condition> {
        let mut current: Option<Condition> = None;
        loop {
            match self.peek() {
                None | Some(Token::CloseParen) => break,
                Some(Token::Keyword(k @ (Keyword::And | Keyword::Or))) => {
                    let logical_op = if *k == Keyword::And {
                        LogicalOp::And
                    } else {
                        LogicalOp::Or
                    };
                    self.next()?;
                    let left = current.take().ok_or_else(|| {
                        Error::Syntax(format!("[Parser] {:?} without a left operand", logical_op))
                    })?;
                    let right = self.parse_operand()?;
                    current = Some(Condition::Compound {
                        left: Box::new(left),
                        right: Box::new(right),
                        logical_op,
                    });
                }
                Some(token) => {
                    if current.is_some() {
                        return Err(Error::Syntax(format!(
                            "[Parser] Expected AND or OR, got {}",
                            token
                        )));
                    }
                    current = Some(self.parse_operand()?);
                }
            }
        }
        current.ok_or_else(|| Error::Syntax("[Parser] Empty condition".to_string()))
    }

    /// A parenthesized group or a single `column op literal` predicate
    fn parse_operand(&mut self) -> Result<Condition> {
        if self.next_if_token(Token::OpenParen).is_some() {
            let condition = self.parse_condition()?;
            self.next_expect(Token::CloseParen)?;
            return Ok(condition);
        }
        self.parse_predicate()
    }

    fn parse_predicate(&mut self) -> Result<Condition> {
        if self.tokens.len() - self.pos.min(self.tokens.len()) < 3 {
            return Err(Error::Syntax(
                "[Parser] Condition needs a column, an operator and a value".to_string(),
            ));
        }
        let column = self.next_ident()?;
        let operator = match self.next()? {
            Token::Operator(op) => op,
            token => {
                return Err(Error::Syntax(format!(
                    "[Parser] Expected comparison operator, got {}",
                    token
                )));
            }
        };
        let value = match self.next()? {
            Token::String(s) => Value::String(s),
            Token::Ident(s) => parse_number(&s)?,
            token => {
                return Err(Error::Syntax(format!(
                    "[Parser] Expected literal, got {}",
                    token
                )));
            }
        };
        Ok(Condition::Simple {
            column,
            operator,
            value,
        })
    }

    /// Peeks at the next token
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    /// Consumes and returns the next token
    fn next(&mut self) -> Result<Token> {
        let token = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or_else(|| Error::Syntax("[Parser] Unexpected end of input".to_string()))?;
        self.pos += 1;
        Ok(token)
    }

    /// Expects and consumes an identifier
    fn next_ident(&mut self) -> Result<String> {
        match self.next()? {
            Token::Ident(ident) => Ok(ident),
            token => Err(Error::Syntax(format!(
                "[Parser] Expected ident, got token {}",
                token
            ))),
        }
    }

    /// Expects a specific token, returns error if different
    fn next_expect(&mut self, expect: Token) -> Result<()> {
        let token = self.next().map_err(|_| {
            Error::Syntax(format!("[Parser] Expected token {}, got end of input", expect))
        })?;
        if token != expect {
            return Err(Error::Syntax(format!(
                "[Parser] Expected token {}, got {}",
                expect, token
            )));
        }
        Ok(())
    }

    /// Consumes next token if it matches the given token
    fn next_if_token(&mut self, token: Token) -> Option<Token> {
        self.peek().filter(|t| **t == token)?;
        self.next().ok()
    }
}

/// Parses a condition from `tokens[start..end]`, returning it along with the
/// index just past the last consumed token. Parsing stops early at an
/// unmatched `)`, which is consumed.
pub fn parse_condition(tokens: &[Token], start: usize, end: usize) -> Result<(Condition, usize)> {
    let end = end.min(tokens.len());
    let mut parser = Parser {
        tokens: tokens[..end].to_vec(),
        pos: start,
    };
    let condition = parser.parse_condition()?;
    parser.next_if_token(Token::CloseParen);
    Ok((condition, parser.pos))
}

/// Unquoted literal: integer first, then float
fn parse_number(text: &str) -> Result<Value> {
    if let Ok(i) = text.parse::<i64>() {
        return Ok(Value::Integer(i));
    }
    match text.parse::<f64>() {
        Ok(f) if f.is_finite() => Ok(Value::Float(f)),
        _ => Err(Error::Syntax(format!(
            "[Parser] Invalid literal {}, quote string values",
            text
        ))),
    }
}

fn qualifier_is(column: &str, table: &str) -> bool {
    column
        .rsplit_once('.')
        .is_some_and(|(qualifier, _)| qualifier.eq_ignore_ascii_case(table))
}
