use crate::{
    error::Result,
    sql::{
        engine::Database,
        executor::{
            mutation::{Delete, Insert, Update},
            query::Select,
            schema::CreateTable,
            transaction::{Control, TransactionControl},
        },
        parser::ast::Statement,
        types::Row,
    },
    storage::engine::Engine,
};

pub mod join;
mod mutation;
mod query;
mod schema;
mod transaction;

/// Statement executor
pub trait Executor<E: Engine> {
    fn execute(self: Box<Self>, db: &Database<E>) -> Result<ResultSet>;
}

/// Routes a parsed statement to its executor
///
/// The `'static` bound is required for trait object usage.
impl<E: Engine + 'static> dyn Executor<E> {
    pub fn build(stmt: Statement) -> Box<dyn Executor<E>> {
        match stmt {
            Statement::CreateTable { name, columns } => CreateTable::new(name, columns),
            Statement::Insert { table_name, values } => Insert::new(table_name, values),
            Statement::Select {
                columns,
                table_name,
                join,
                where_clause,
            } => Select::new(columns, table_name, join, where_clause),
            Statement::Update {
                table_name,
                column,
                value,
                where_clause,
            } => Update::new(table_name, column, value, where_clause),
            Statement::Delete {
                table_name,
                where_clause,
            } => Delete::new(table_name, where_clause),
            Statement::Begin => TransactionControl::new(Control::Begin),
            Statement::Commit => TransactionControl::new(Control::Commit),
            Statement::Rollback => TransactionControl::new(Control::Rollback),
        }
    }
}

/// Execution result set
#[derive(Debug, PartialEq)]
pub enum ResultSet {
    CreateTable { table_name: String },
    Insert { count: usize },
    Scan { columns: Vec<String>, rows: Vec<Row> },
    Update { count: usize },
    Delete { count: usize },
    Begin,
    Commit,
    Rollback,
}

impl ResultSet {
    /// Returned rows; empty for statements that do not return rows
    pub fn rows(&self) -> &[Row] {
        match self {
            ResultSet::Scan { rows, .. } => rows,
            _ => &[],
        }
    }

    pub fn into_rows(self) -> Vec<Row> {
        match self {
            ResultSet::Scan { rows, .. } => rows,
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ResultSet;
    use crate::{
        error::{Error, Result},
        sql::{engine::Database, types::Value},
        storage::memory::MemoryEngine,
    };

    fn int(v: i64) -> Value {
        Value::Integer(v)
    }

    fn text(v: &str) -> Value {
        Value::String(v.to_string())
    }

    fn columns(result: ResultSet) -> Vec<String> {
        match result {
            ResultSet::Scan { columns, .. } => columns,
            other => panic!("expected scan, got {:?}", other),
        }
    }

    fn joined() -> Result<Database<MemoryEngine>> {
        let db = Database::new(MemoryEngine::new())?;
        db.execute("CREATE TABLE a (id INTEGER)")?;
        db.execute("CREATE TABLE b (aid INTEGER, v STRING)")?;
        for id in 1..=3 {
            db.execute(&format!("INSERT INTO a VALUES ({})", id))?;
        }
        Ok(db)
    }

    #[test]
    fn test_statement_results() -> Result<()> {
        let db = Database::new(MemoryEngine::new())?;
        assert_eq!(
            db.execute("CREATE TABLE Notes (id INTEGER AUTO_INCREMENT, body STRING)")?,
            ResultSet::CreateTable {
                table_name: "notes".to_string()
            }
        );
        assert_eq!(
            db.execute("INSERT INTO notes VALUES ('hi')")?,
            ResultSet::Insert { count: 1 }
        );
        assert_eq!(db.execute("BEGIN")?, ResultSet::Begin);
        assert_eq!(db.execute("ROLLBACK")?, ResultSet::Rollback);
        assert_eq!(db.execute("BEGIN;")?, ResultSet::Begin);
        assert_eq!(db.execute("COMMIT")?, ResultSet::Commit);
        assert!(matches!(db.execute("COMMIT"), Err(Error::TransactionState(_))));
        Ok(())
    }

    #[test]
    fn test_left_join_without_matches() -> Result<()> {
        let db = joined()?;
        let result = db.execute("SELECT * FROM a LEFT JOIN b ON a.id = b.aid")?;
        assert_eq!(
            result.rows(),
            &[
                vec![int(1), Value::Null, Value::Null],
                vec![int(2), Value::Null, Value::Null],
                vec![int(3), Value::Null, Value::Null],
            ]
        );
        assert_eq!(columns(result), vec!["a.id", "b.aid", "b.v"]);

        let rows = db.execute("SELECT v FROM a LEFT JOIN b ON a.id = b.aid")?.into_rows();
        assert_eq!(rows, vec![vec![Value::Null]; 3]);
        Ok(())
    }

    #[test]
    fn test_joins() -> Result<()> {
        let db = joined()?;
        db.execute("INSERT INTO b VALUES (2, 'two')")?;
        db.execute("INSERT INTO b VALUES (5, 'five')")?;

        assert_eq!(
            db.execute("SELECT a.id, b.v FROM a JOIN b ON a.id = b.aid")?.into_rows(),
            vec![vec![int(2), text("two")]]
        );
        assert_eq!(
            db.execute("SELECT * FROM a INNER JOIN b ON b.aid = a.id")?.into_rows(),
            vec![vec![int(2), int(2), text("two")]]
        );
        assert_eq!(
            db.execute("SELECT * FROM a RIGHT JOIN b ON a.id = b.aid")?.into_rows(),
            vec![
                vec![int(2), text("two"), int(2)],
                vec![int(5), text("five"), Value::Null],
            ]
        );
        assert_eq!(
            db.execute("SELECT id FROM a LEFT JOIN b ON a.id = b.aid WHERE v = 'two'")?
                .into_rows(),
            vec![vec![int(2)]]
        );
        assert!(matches!(
            db.execute("SELECT * FROM a JOIN c ON a.id = c.x"),
            Err(Error::TableNotFound(_))
        ));
        Ok(())
    }

    #[test]
    fn test_flat_and_or_precedence() -> Result<()> {
        let db = Database::new(MemoryEngine::new())?;
        db.execute("CREATE TABLE t (a INTEGER, b INTEGER, c INTEGER)")?;
        db.execute("INSERT INTO t VALUES (1, 0, 0)")?;
        db.execute("INSERT INTO t VALUES (1, 0, 3)")?;
        db.execute("INSERT INTO t VALUES (0, 2, 3)")?;

        // (a=1 OR b=2) AND c=3, so the first row does not qualify
        assert_eq!(
            db.execute("SELECT * FROM t WHERE a = 1 OR b = 2 AND c = 3")?.into_rows(),
            vec![vec![int(1), int(0), int(3)], vec![int(0), int(2), int(3)]]
        );
        assert_eq!(
            db.execute("SELECT * FROM t WHERE a = 1 OR (b = 2 AND c = 3)")?.rows().len(),
            3
        );
        Ok(())
    }

    #[test]
    fn test_projection_headers() -> Result<()> {
        let db = joined()?;
        let result = db.execute("SELECT ID, id FROM A")?;
        assert_eq!(result.rows()[0], vec![int(1), int(1)]);
        assert_eq!(columns(result), vec!["id", "id"]);
        assert!(matches!(
            db.execute("SELECT nope FROM a"),
            Err(Error::ColumnNotFound(_))
        ));
        Ok(())
    }
}
