use std::collections::{BTreeMap, BTreeSet};

use crate::sql::{
    schema::Table,
    types::{Row, Value},
};

/// An undoable change, recorded only while a transaction is open
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// A row appended to `table`
    Insert { table: String, row: Row },
    /// `column` of the row at `row_index` held `old_value`. The index is only
    /// meaningful until the next structural change to the table.
    Update {
        table: String,
        row_index: usize,
        column: String,
        old_value: Value,
    },
    /// A row removed from `table`
    Delete { table: String, row: Row },
}

impl Operation {
    fn table(&self) -> &str {
        match self {
            Operation::Insert { table, .. }
            | Operation::Update { table, .. }
            | Operation::Delete { table, .. } => table,
        }
    }
}

/// Undo log of the open transaction, append-only until COMMIT or ROLLBACK
#[derive(Debug, Default)]
pub struct Transaction {
    operations: Vec<Operation>,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, operation: Operation) {
        self.operations.push(operation);
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Replays the log newest first against `tables`:
    /// an insert drops the table's last row, a delete re-appends the row at
    /// the end, an update restores the old value if the row position still
    /// exists. Returns the names of the tables that were touched.
    pub fn undo(self, tables: &mut BTreeMap<String, Table>) -> BTreeSet<String> {
        let mut touched = BTreeSet::new();
        for operation in self.operations.into_iter().rev() {
            let Some(table) = tables.get_mut(operation.table()) else {
                continue;
            };
            touched.insert(table.name.clone());
            match operation {
                Operation::Insert { .. } => {
                    table.rows.pop();
                }
                Operation::Delete { row, .. } => table.rows.push(row),
                Operation::Update {
                    row_index,
                    column,
                    old_value,
                    ..
                } => {
                    let Ok(index) = table.get_col_index(&column) else {
                        continue;
                    };
                    if let Some(row) = table.rows.get_mut(row_index) {
                        row[index] = old_value;
                    }
                }
            }
        }
        touched
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::{Operation, Transaction};
    use crate::{
        error::Result,
        sql::{
            schema::{Column, Table},
            types::{DataType, Value},
        },
    };

    fn tables() -> Result<BTreeMap<String, Table>> {
        let mut table = Table::new(
            "t",
            vec![Column {
                name: "v".to_string(),
                datatype: DataType::Integer,
                auto_increment: false,
            }],
        )?;
        for v in ["1", "2", "3"] {
            table.insert(&[Some(v.to_string())])?;
        }
        Ok(BTreeMap::from([("t".to_string(), table)]))
    }

    fn column(tables: &BTreeMap<String, Table>) -> Vec<Value> {
        tables["t"].rows.iter().map(|r| r[0].clone()).collect()
    }

    #[test]
    fn test_undo_in_reverse() -> Result<()> {
        let mut tables = tables()?;
        let mut txn = Transaction::new();
        let t = tables.get_mut("t").unwrap();

        let removed = t.delete(None)?;
        for row in removed {
            txn.record(Operation::Delete {
                table: "t".to_string(),
                row,
            });
        }
        let row = t.insert(&[Some("9".to_string())])?;
        txn.record(Operation::Insert {
            table: "t".to_string(),
            row,
        });
        for (row_index, old_value) in t.update("v", Some("0"), None)? {
            txn.record(Operation::Update {
                table: "t".to_string(),
                row_index,
                column: "v".to_string(),
                old_value,
            });
        }
        assert_eq!(column(&tables), vec![Value::Integer(0)]);
        assert_eq!(txn.len(), 5);

        let touched = txn.undo(&mut tables);
        assert_eq!(touched.into_iter().collect::<Vec<_>>(), vec!["t".to_string()]);
        // deleted rows come back at the end, newest delete first
        assert_eq!(
            column(&tables),
            vec![Value::Integer(3), Value::Integer(2), Value::Integer(1)]
        );
        Ok(())
    }

    #[test]
    fn test_undo_update_out_of_range_is_noop() -> Result<()> {
        let mut tables = tables()?;
        let mut txn = Transaction::new();
        txn.record(Operation::Update {
            table: "t".to_string(),
            row_index: 10,
            column: "v".to_string(),
            old_value: Value::Integer(42),
        });
        txn.record(Operation::Insert {
            table: "gone".to_string(),
            row: vec![],
        });
        assert!(txn.undo(&mut tables).contains("t"));
        assert_eq!(
            column(&tables),
            vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)]
        );
        Ok(())
    }
}
