use crate::{
    error::Result,
    sql::{
        engine::Database,
        executor::{Executor, ResultSet},
        parser::ast::Condition,
    },
    storage::engine::Engine,
};

/// INSERT executor
pub struct Insert {
    table_name: String,
    values: Vec<Option<String>>,
}

impl Insert {
    pub fn new(table_name: String, values: Vec<Option<String>>) -> Box<Self> {
        Box::new(Self { table_name, values })
    }
}

impl<E: Engine> Executor<E> for Insert {
    fn execute(self: Box<Self>, db: &Database<E>) -> Result<ResultSet> {
        db.insert(&self.table_name, &self.values)?;
        Ok(ResultSet::Insert { count: 1 })
    }
}

/// UPDATE executor
pub struct Update {
    table_name: String,
    column: String,
    value: Option<String>,
    condition: Option<Condition>,
}

impl Update {
    pub fn new(
        table_name: String,
        column: String,
        value: Option<String>,
        condition: Option<Condition>,
    ) -> Box<Self> {
        Box::new(Self {
            table_name,
            column,
            value,
            condition,
        })
    }
}

impl<E: Engine> Executor<E> for Update {
    fn execute(self: Box<Self>, db: &Database<E>) -> Result<ResultSet> {
        let count = db.update(
            &self.table_name,
            &self.column,
            self.value.as_deref(),
            self.condition.as_ref(),
        )?;
        Ok(ResultSet::Update { count })
    }
}

/// DELETE executor
pub struct Delete {
    table_name: String,
    condition: Option<Condition>,
}

impl Delete {
    pub fn new(table_name: String, condition: Option<Condition>) -> Box<Self> {
        Box::new(Self {
            table_name,
            condition,
        })
    }
}

impl<E: Engine> Executor<E> for Delete {
    fn execute(self: Box<Self>, db: &Database<E>) -> Result<ResultSet> {
        let count = db.delete(&self.table_name, self.condition.as_ref())?;
        Ok(ResultSet::Delete { count })
    }
}
