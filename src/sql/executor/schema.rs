use crate::{
    error::Result,
    sql::{
        engine::Database,
        executor::{Executor, ResultSet},
        parser::ast,
        schema,
    },
    storage::engine::Engine,
};

/// CREATE TABLE executor
pub struct CreateTable {
    name: String,
    columns: Vec<ast::Column>,
}

impl CreateTable {
    pub fn new(name: String, columns: Vec<ast::Column>) -> Box<Self> {
        Box::new(Self { name, columns })
    }
}

impl<E: Engine> Executor<E> for CreateTable {
    fn execute(self: Box<Self>, db: &Database<E>) -> Result<ResultSet> {
        let columns = self
            .columns
            .into_iter()
            .map(|c| schema::Column {
                name: c.name,
                datatype: c.datatype,
                auto_increment: c.auto_increment,
            })
            .collect();
        db.create_table(&self.name, columns)?;
        Ok(ResultSet::CreateTable {
            table_name: self.name.to_lowercase(),
        })
    }
}
