use std::{collections::BTreeMap, sync::RwLock};

use tracing::{debug, info, warn};

use crate::{
    config::Config,
    error::{Error, Result},
    sql::{
        executor::{Executor, ResultSet, join},
        parser::{
            Parser,
            ast::{Condition, JoinType},
        },
        schema::{Column, Relation, Table},
        types::Row,
    },
    storage::{disk::DiskEngine, engine::Engine},
};

use self::transaction::{Operation, Transaction};

pub mod persist;
pub mod transaction;

/// Everything guarded by the database lock
struct Catalog<E: Engine> {
    /// Keyed by lowercase table name
    tables: BTreeMap<String, Table>,
    transaction: Option<Transaction>,
    storage: E,
}

/// An embedded database: all tables in memory behind one reader-writer
/// lock, each mutation persisted before the lock is released.
///
/// Reads (SELECT, joins) take the lock shared; everything else takes it
/// exclusively for the whole call, including the record write.
pub struct Database<E: Engine> {
    catalog: RwLock<Catalog<E>>,
}

impl Database<DiskEngine> {
    /// Opens the database stored in `config.data_dir`, loading every table record found there
    pub fn open(config: &Config) -> Result<Self> {
        Self::new(DiskEngine::new(&config.data_dir, &config.extension)?)
    }
}

/// The `'static` bound is required by the boxed executors.
impl<E: Engine + 'static> Database<E> {
    /// Parses and executes one statement
    pub fn execute(&self, sql: &str) -> Result<ResultSet> {
        let stmt = Parser::new(sql).parse()?;
        debug!(statement = ?stmt, "executing");
        <dyn Executor<E>>::build(stmt).execute(self)
    }
}

impl<E: Engine> Database<E> {
    /// Builds a database over `storage`, loading all existing records
    pub fn new(mut storage: E) -> Result<Self> {
        let tables = persist::load_all(&mut storage)?;
        info!(tables = tables.len(), "database loaded");
        Ok(Self {
            catalog: RwLock::new(Catalog {
                tables,
                transaction: None,
                storage,
            }),
        })
    }

    /// Names of all tables, sorted
    pub fn table_names(&self) -> Result<Vec<String>> {
        Ok(self.catalog.read()?.tables.keys().cloned().collect())
    }

    pub fn create_table(&self, name: &str, columns: Vec<Column>) -> Result<()> {
        let mut guard = self.catalog.write()?;
        let Catalog {
            tables, storage, ..
        } = &mut *guard;

        let table = Table::new(name, columns)?;
        if tables.contains_key(&table.name) {
            return Err(Error::TableAlreadyExists(table.name));
        }
        info!(table = %table.name, columns = table.columns.len(), "created table");
        // A failed write still leaves the table registered in memory
        let table = tables.entry(table.name.clone()).or_insert(table);
        persist::save(storage, table)
    }

    /// Inserts one row; see [`Table::insert`] for how values map to columns
    pub fn insert(&self, table_name: &str, values: &[Option<String>]) -> Result<Row> {
        let mut guard = self.catalog.write()?;
        let Catalog {
            tables,
            transaction,
            storage,
        } = &mut *guard;

        let table = must_get_table_mut(tables, table_name)?;
        let row = table.insert(values)?;
        if let Some(txn) = transaction {
            txn.record(Operation::Insert {
                table: table.name.clone(),
                row: row.clone(),
            });
        }
        persist::save(storage, table)?;
        Ok(row)
    }

    /// Copies of the matching rows with the table's header
    pub fn select(&self, table_name: &str, condition: Option<&Condition>) -> Result<Relation> {
        let guard = self.catalog.read()?;
        let table = must_get_table(&guard.tables, table_name)?;
        Ok(Relation {
            labels: table.labels(),
            rows: table.select(condition)?,
        })
    }

    /// Sets `column` on matching rows, returning how many changed
    pub fn update(
        &self,
        table_name: &str,
        column: &str,
        value: Option<&str>,
        condition: Option<&Condition>,
    ) -> Result<usize> {
        let mut guard = self.catalog.write()?;
        let Catalog {
            tables,
            transaction,
            storage,
        } = &mut *guard;

        let table = must_get_table_mut(tables, table_name)?;
        let changed = table.update(column, value, condition)?;
        if let Some(txn) = transaction {
            for (row_index, old_value) in &changed {
                txn.record(Operation::Update {
                    table: table.name.clone(),
                    row_index: *row_index,
                    column: column.to_string(),
                    old_value: old_value.clone(),
                });
            }
        }
        persist::save(storage, table)?;
        Ok(changed.len())
    }

    /// Removes matching rows, returning how many were removed
    pub fn delete(&self, table_name: &str, condition: Option<&Condition>) -> Result<usize> {
        let mut guard = self.catalog.write()?;
        let Catalog {
            tables,
            transaction,
            storage,
        } = &mut *guard;

        let table = must_get_table_mut(tables, table_name)?;
        let removed = table.delete(condition)?;
        let count = removed.len();
        if let Some(txn) = transaction {
            for row in removed {
                txn.record(Operation::Delete {
                    table: table.name.clone(),
                    row,
                });
            }
        }
        persist::save(storage, table)?;
        Ok(count)
    }

    /// Equality join of two tables under one shared lock
    pub fn join(
        &self,
        join_type: JoinType,
        left_table: &str,
        right_table: &str,
        left_column: &str,
        right_column: &str,
    ) -> Result<Relation> {
        let guard = self.catalog.read()?;
        let left = must_get_table(&guard.tables, left_table)?;
        let right = must_get_table(&guard.tables, right_table)?;
        join::join(join_type, left, right, left_column, right_column)
    }

    pub fn begin(&self) -> Result<()> {
        let mut guard = self.catalog.write()?;
        if guard.transaction.is_some() {
            return Err(Error::TransactionState(
                "a transaction is already open".to_string(),
            ));
        }
        guard.transaction = Some(Transaction::new());
        info!("transaction started");
        Ok(())
    }

    /// Discards the undo log; every change is already on disk
    pub fn commit(&self) -> Result<()> {
        let mut guard = self.catalog.write()?;
        let txn = guard.transaction.take().ok_or_else(no_transaction)?;
        info!(operations = txn.len(), "transaction committed");
        Ok(())
    }

    /// Undoes the open transaction and rewrites every table it touched.
    ///
    /// The transaction is closed even if a record write fails; the first
    /// write error is returned.
    pub fn rollback(&self) -> Result<()> {
        let mut guard = self.catalog.write()?;
        let Catalog {
            tables,
            transaction,
            storage,
        } = &mut *guard;

        let txn = transaction.take().ok_or_else(no_transaction)?;
        if txn.is_empty() {
            info!("transaction rolled back, nothing to undo");
            return Ok(());
        }
        let undone = txn.len();
        let touched = txn.undo(tables);

        let mut result = Ok(());
        for name in &touched {
            let Some(table) = tables.get(name) else {
                continue;
            };
            if let Err(err) = persist::save(storage, table) {
                warn!(table = %name, error = %err, "failed to persist rolled back table");
                if result.is_ok() {
                    result = Err(err);
                }
            }
        }
        info!(operations = undone, tables = touched.len(), "transaction rolled back");
        result
    }
}

fn no_transaction() -> Error {
    Error::TransactionState("no transaction is open".to_string())
}

fn must_get_table<'a>(tables: &'a BTreeMap<String, Table>, name: &str) -> Result<&'a Table> {
    tables
        .get(&name.to_lowercase())
        .ok_or_else(|| Error::TableNotFound(name.to_string()))
}

fn must_get_table_mut<'a>(
    tables: &'a mut BTreeMap<String, Table>,
    name: &str,
) -> Result<&'a mut Table> {
    tables
        .get_mut(&name.to_lowercase())
        .ok_or_else(|| Error::TableNotFound(name.to_string()))
}
