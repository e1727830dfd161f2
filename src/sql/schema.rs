use std::{collections::BTreeMap, fmt::Display};

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    sql::{
        parser::ast::Condition,
        types::{DataType, Row, Value},
    },
};

/// Column schema definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub datatype: DataType,
    #[serde(default)]
    pub auto_increment: bool,
}

/// A table: schema, rows in insertion order, and auto-increment counters.
///
/// Every row has exactly `columns.len()` cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
    /// Last value handed out per auto-increment column, keyed by lowercase name
    pub auto_increment: BTreeMap<String, i64>,
}

impl Table {
    /// Creates an empty table; the name is normalized to lowercase.
    pub fn new(name: &str, columns: Vec<Column>) -> Result<Self> {
        let auto_increment = columns
            .iter()
            .filter(|c| c.auto_increment)
            .map(|c| (c.name.to_lowercase(), 0))
            .collect();
        let table = Self {
            name: name.to_lowercase(),
            columns,
            rows: Vec::new(),
            auto_increment,
        };
        table.validate()?;
        Ok(table)
    }

    /// Validates table schema
    pub fn validate(&self) -> Result<()> {
        if !is_valid_name(&self.name) {
            return Err(Error::Syntax(format!("invalid table name {}", self.name)));
        }
        if self.columns.is_empty() {
            return Err(Error::Syntax(format!("table {} has no columns", self.name)));
        }
        for (i, column) in self.columns.iter().enumerate() {
            if !is_valid_name(&column.name) {
                return Err(Error::Syntax(format!("invalid column name {}", column.name)));
            }
            if column.auto_increment && column.datatype != DataType::Integer {
                return Err(Error::Syntax(format!(
                    "AUTO_INCREMENT column {} must be INTEGER",
                    column.name
                )));
            }
            if self.columns[..i]
                .iter()
                .any(|c| c.name.eq_ignore_ascii_case(&column.name))
            {
                return Err(Error::Syntax(format!(
                    "duplicate column {} in table {}",
                    column.name, self.name
                )));
            }
        }
        Ok(())
    }

    /// Returns the column index for a given column name, accepting `table.column`
    pub fn get_col_index(&self, col_name: &str) -> Result<usize> {
        resolve(&self.labels(), col_name)
    }

    /// Header labels, one per column
    pub fn labels(&self) -> Vec<Label> {
        self.columns
            .iter()
            .map(|c| Label::new(&self.name, &c.name))
            .collect()
    }

    /// Appends a row built from positional values for the non-auto-increment
    /// columns; auto-increment columns take the next counter value and
    /// missing trailing values become Null. When exactly one value per column
    /// is supplied, the values at auto-increment positions are ignored.
    ///
    /// Returns the stored row.
    pub fn insert(&mut self, values: &[Option<String>]) -> Result<Row> {
        let auto_count = self.columns.iter().filter(|c| c.auto_increment).count();
        let full_width = auto_count > 0 && values.len() == self.columns.len();
        if !full_width && values.len() > self.columns.len() - auto_count {
            return Err(Error::Syntax(format!(
                "table {} takes at most {} values, got {}",
                self.name,
                self.columns.len() - auto_count,
                values.len()
            )));
        }

        // Coerce everything before touching the counters
        let mut supplied = values.iter();
        let mut row = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            if column.auto_increment {
                if full_width {
                    supplied.next();
                }
                row.push(Value::Null);
                continue;
            }
            row.push(match supplied.next() {
                Some(Some(text)) => column.datatype.coerce(text)?,
                Some(None) | None => Value::Null,
            });
        }

        for (i, column) in self.columns.iter().enumerate() {
            if column.auto_increment {
                let counter = self
                    .auto_increment
                    .entry(column.name.to_lowercase())
                    .or_insert(0);
                *counter += 1;
                row[i] = Value::Integer(*counter);
            }
        }

        self.rows.push(row.clone());
        Ok(row)
    }

    /// Returns copies of the rows matching the condition, all rows without one
    pub fn select(&self, condition: Option<&Condition>) -> Result<Vec<Row>> {
        let matches = self.matching(condition)?;
        Ok(self
            .rows
            .iter()
            .zip(matches)
            .filter(|(_, m)| *m)
            .map(|(row, _)| row.clone())
            .collect())
    }

    /// Overwrites `column` in every matching row.
    ///
    /// Returns `(row_index, old_value)` for each changed row, in row order.
    pub fn update(
        &mut self,
        column: &str,
        value: Option<&str>,
        condition: Option<&Condition>,
    ) -> Result<Vec<(usize, Value)>> {
        let index = self.get_col_index(column)?;
        let new_value = match value {
            Some(text) => self.columns[index].datatype.coerce(text)?,
            None => Value::Null,
        };
        let matches = self.matching(condition)?;

        let mut changed = Vec::new();
        for (i, row) in self.rows.iter_mut().enumerate() {
            if matches[i] {
                let old = std::mem::replace(&mut row[index], new_value.clone());
                changed.push((i, old));
            }
        }
        Ok(changed)
    }

    /// Removes every matching row, keeping the order of the rest.
    ///
    /// Returns the removed rows in the order they were encountered.
    pub fn delete(&mut self, condition: Option<&Condition>) -> Result<Vec<Row>> {
        let matches = self.matching(condition)?;
        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(self.rows.len());
        for (row, m) in std::mem::take(&mut self.rows).into_iter().zip(matches) {
            if m {
                removed.push(row);
            } else {
                kept.push(row);
            }
        }
        self.rows = kept;
        Ok(removed)
    }

    /// Evaluates the condition against every row up front so that a failing
    /// row aborts the statement before anything is mutated.
    fn matching(&self, condition: Option<&Condition>) -> Result<Vec<bool>> {
        let Some(condition) = condition else {
            return Ok(vec![true; self.rows.len()]);
        };
        let labels = self.labels();
        self.rows
            .iter()
            .map(|row| condition.evaluate(&labels, row))
            .collect()
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_')
}

/// Names one column of a row set: owning table plus column name.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub table: String,
    pub column: String,
}

impl Label {
    pub fn new(table: &str, column: &str) -> Self {
        Self {
            table: table.to_string(),
            column: column.to_string(),
        }
    }
}

impl Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.table, self.column)
    }
}

/// Resolves a possibly qualified column name against a header.
///
/// Matching is case-insensitive on the part after the last `.`. A qualifier
/// that names one of the header's tables picks that table's column; otherwise
/// the first column with that name wins.
pub fn resolve(labels: &[Label], name: &str) -> Result<usize> {
    let (qualifier, column) = match name.rsplit_once('.') {
        Some((q, c)) => (Some(q), c),
        None => (None, name),
    };
    let by_name = |l: &Label| l.column.eq_ignore_ascii_case(column);

    qualifier
        .and_then(|q| {
            labels
                .iter()
                .position(|l| l.table.eq_ignore_ascii_case(q) && by_name(l))
        })
        .or_else(|| labels.iter().position(by_name))
        .ok_or_else(|| Error::ColumnNotFound(name.to_string()))
}

/// Rows with their header, as produced by a scan or a join
#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    pub labels: Vec<Label>,
    pub rows: Vec<Row>,
}

impl Relation {
    /// Keeps the rows matching the condition
    pub fn filter(self, condition: Option<&Condition>) -> Result<Self> {
        let Some(condition) = condition else {
            return Ok(self);
        };
        let mut rows = Vec::new();
        for row in self.rows {
            if condition.evaluate(&self.labels, &row)? {
                rows.push(row);
            }
        }
        Ok(Self {
            labels: self.labels,
            rows,
        })
    }

    /// Keeps the named columns in the given order; no names keeps everything
    pub fn project(self, columns: &[String]) -> Result<Self> {
        if columns.is_empty() {
            return Ok(self);
        }
        let indexes = columns
            .iter()
            .map(|c| resolve(&self.labels, c))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            labels: indexes.iter().map(|&i| self.labels[i].clone()).collect(),
            rows: self
                .rows
                .into_iter()
                .map(|row| indexes.iter().map(|&i| row[i].clone()).collect())
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Column, Label, Relation, Table, resolve};
    use crate::{
        error::{Error, Result},
        sql::{
            parser::ast::{Condition, Operator},
            types::{DataType, Value},
        },
    };

    fn users() -> Result<Table> {
        Table::new(
            "Users",
            vec![
                Column {
                    name: "id".to_string(),
                    datatype: DataType::Integer,
                    auto_increment: true,
                },
                Column {
                    name: "Name".to_string(),
                    datatype: DataType::String,
                    auto_increment: false,
                },
                Column {
                    name: "score".to_string(),
                    datatype: DataType::Float,
                    auto_increment: false,
                },
            ],
        )
    }

    fn text(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    fn id_gt(n: i64) -> Condition {
        Condition::Simple {
            column: "id".to_string(),
            operator: Operator::Greater,
            value: Value::Integer(n),
        }
    }

    #[test]
    fn test_create_validates() -> Result<()> {
        let table = users()?;
        assert_eq!(table.name, "users");
        assert_eq!(table.auto_increment.get("id"), Some(&0));

        let dup = Table::new(
            "t",
            vec![
                Column {
                    name: "a".to_string(),
                    datatype: DataType::Integer,
                    auto_increment: false,
                },
                Column {
                    name: "A".to_string(),
                    datatype: DataType::String,
                    auto_increment: false,
                },
            ],
        );
        assert!(matches!(dup, Err(Error::Syntax(_))));
        assert!(matches!(Table::new("t", vec![]), Err(Error::Syntax(_))));
        assert!(matches!(
            Table::new(
                "../etc",
                vec![Column {
                    name: "a".to_string(),
                    datatype: DataType::Integer,
                    auto_increment: false,
                }]
            ),
            Err(Error::Syntax(_))
        ));
        Ok(())
    }

    #[test]
    fn test_insert() -> Result<()> {
        let mut table = users()?;
        assert_eq!(
            table.insert(&[text("Alice"), text("9.5")])?,
            vec![Value::Integer(1), Value::String("Alice".into()), Value::Float(9.5)]
        );
        // trailing columns default to Null
        assert_eq!(
            table.insert(&[text("Bob")])?,
            vec![Value::Integer(2), Value::String("Bob".into()), Value::Null]
        );
        // one value per column: the auto-increment slot is ignored
        assert_eq!(
            table.insert(&[text("77"), text("Carol"), None])?,
            vec![Value::Integer(3), Value::String("Carol".into()), Value::Null]
        );
        assert_eq!(table.rows.len(), 3);

        // failed coercion neither appends nor advances the counter
        assert!(matches!(
            table.insert(&[text("Dan"), text("high")]),
            Err(Error::TypeMismatch(_))
        ));
        assert!(matches!(
            table.insert(&[text("a"), text("1"), text("2"), text("3")]),
            Err(Error::Syntax(_))
        ));
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.insert(&[text("Eve")])?[0], Value::Integer(4));
        Ok(())
    }

    #[test]
    fn test_select_update_delete() -> Result<()> {
        let mut table = users()?;
        for name in ["a", "b", "c", "d"] {
            table.insert(&[text(name)])?;
        }

        let rows = table.select(Some(&id_gt(2)))?;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][1], Value::String("c".into()));
        assert_eq!(table.select(None)?.len(), 4);

        let changed = table.update("SCORE", Some("1.25"), Some(&id_gt(3)))?;
        assert_eq!(changed, vec![(3, Value::Null)]);
        assert_eq!(table.rows[3][2], Value::Float(1.25));
        assert!(matches!(
            table.update("missing", Some("1"), None),
            Err(Error::ColumnNotFound(_))
        ));
        assert!(matches!(
            table.update("score", Some("x"), None),
            Err(Error::TypeMismatch(_))
        ));

        let removed = table.delete(Some(&Condition::Simple {
            column: "users.id".to_string(),
            operator: Operator::LessEqual,
            value: Value::Integer(2),
        }))?;
        assert_eq!(removed.len(), 2);
        assert_eq!(removed[0][0], Value::Integer(1));
        assert_eq!(removed[1][0], Value::Integer(2));
        let ids: Vec<Value> = table.rows.iter().map(|r| r[0].clone()).collect();
        assert_eq!(ids, vec![Value::Integer(3), Value::Integer(4)]);
        Ok(())
    }

    #[test]
    fn test_condition_error_leaves_rows_untouched() -> Result<()> {
        let mut table = users()?;
        table.insert(&[text("a")])?;
        table.insert(&[text("b")])?;
        let bad = Condition::Simple {
            column: "name".to_string(),
            operator: Operator::Greater,
            value: Value::String("a".into()),
        };
        assert!(matches!(table.delete(Some(&bad)), Err(Error::UnsupportedOperator(_))));
        assert!(table.update("score", Some("1"), Some(&bad)).is_err());
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][2], Value::Null);
        Ok(())
    }

    #[test]
    fn test_resolve() -> Result<()> {
        let labels = vec![
            Label::new("a", "id"),
            Label::new("b", "id"),
            Label::new("b", "v"),
        ];
        assert_eq!(resolve(&labels, "id")?, 0);
        assert_eq!(resolve(&labels, "B.ID")?, 1);
        assert_eq!(resolve(&labels, "x.v")?, 2);
        assert_eq!(resolve(&labels, "w"), Err(Error::ColumnNotFound("w".to_string())));
        Ok(())
    }

    #[test]
    fn test_relation_project() -> Result<()> {
        let relation = Relation {
            labels: vec![Label::new("t", "a"), Label::new("t", "b")],
            rows: vec![vec![Value::Integer(1), Value::String("x".into())]],
        };
        let projected = relation.project(&["b".to_string(), "a".to_string()])?;
        assert_eq!(projected.rows, vec![vec![Value::String("x".into()), Value::Integer(1)]]);
        assert_eq!(projected.labels[0].to_string(), "t.b");
        Ok(())
    }
}
