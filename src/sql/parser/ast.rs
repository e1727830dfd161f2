use std::fmt::Display;

use crate::{
    error::Result,
    sql::{
        schema::{Label, resolve},
        types::{DataType, Row, Value},
    },
};

/// Abstract Syntax Tree (AST) node definitions for statements
#[derive(Debug, PartialEq)]
pub enum Statement {
    /// CREATE TABLE statement
    CreateTable {
        name: String,
        columns: Vec<Column>,
    },
    /// INSERT statement; values are raw text, `None` for an unquoted NULL
    Insert {
        table_name: String,
        values: Vec<Option<String>>,
    },
    /// SELECT statement
    Select {
        /// Projected column names, empty for `*`
        columns: Vec<String>,
        table_name: String,
        join: Option<Join>,
        where_clause: Option<Condition>,
    },
    /// UPDATE statement, exactly one column
    Update {
        table_name: String,
        column: String,
        value: Option<String>,
        where_clause: Option<Condition>,
    },
    /// DELETE statement
    Delete {
        table_name: String,
        where_clause: Option<Condition>,
    },
    Begin,
    Commit,
    Rollback,
}

/// Column definition for CREATE TABLE statements
#[derive(Debug, PartialEq)]
pub struct Column {
    pub name: String,
    pub datatype: DataType,
    pub auto_increment: bool,
}

/// `[INNER|LEFT|RIGHT] JOIN table ON left_column = right_column`
///
/// `left_column` always belongs to the FROM table.
#[derive(Debug, PartialEq)]
pub struct Join {
    pub join_type: JoinType,
    pub table_name: String,
    pub left_column: String,
    pub right_column: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
}

/// Comparison operators of a simple predicate
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operator {
    Equal,
    NotEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
}

impl Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Operator::Equal => "=",
            Operator::NotEqual => "!=",
            Operator::Less => "<",
            Operator::Greater => ">",
            Operator::LessEqual => "<=",
            Operator::GreaterEqual => ">=",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogicalOp {
    And,
    Or,
}

/// WHERE clause expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Simple {
        column: String,
        operator: Operator,
        value: Value,
    },
    Compound {
        left: Box<Condition>,
        right: Box<Condition>,
        logical_op: LogicalOp,
    },
}

impl Condition {
    /// Evaluates the condition against one row whose columns are described by `labels`.
    pub fn evaluate(&self, labels: &[Label], row: &Row) -> Result<bool> {
        match self {
            Condition::Simple {
                column,
                operator,
                value,
            } => {
                let index = resolve(labels, column)?;
                row[index].compare(*operator, value)
            }
            Condition::Compound {
                left,
                right,
                logical_op: LogicalOp::And,
            } => Ok(left.evaluate(labels, row)? && right.evaluate(labels, row)?),
            Condition::Compound {
                left,
                right,
                logical_op: LogicalOp::Or,
            } => Ok(left.evaluate(labels, row)? || right.evaluate(labels, row)?),
        }
    }
}
