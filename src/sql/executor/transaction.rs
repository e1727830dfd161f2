use crate::{
    error::Result,
    sql::{
        engine::Database,
        executor::{Executor, ResultSet},
    },
    storage::engine::Engine,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Control {
    Begin,
    Commit,
    Rollback,
}

/// BEGIN / COMMIT / ROLLBACK executor
pub struct TransactionControl {
    control: Control,
}

impl TransactionControl {
    pub fn new(control: Control) -> Box<Self> {
        Box::new(Self { control })
    }
}

impl<E: Engine> Executor<E> for TransactionControl {
    fn execute(self: Box<Self>, db: &Database<E>) -> Result<ResultSet> {
        match self.control {
            Control::Begin => {
                db.begin()?;
                Ok(ResultSet::Begin)
            }
            Control::Commit => {
                db.commit()?;
                Ok(ResultSet::Commit)
            }
            Control::Rollback => {
                db.rollback()?;
                Ok(ResultSet::Rollback)
            }
        }
    }
}
