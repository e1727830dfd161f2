use crate::{
    error::Result,
    sql::{
        engine::Database,
        executor::{Executor, ResultSet},
        parser::ast::{Condition, Join},
        schema::Relation,
    },
    storage::engine::Engine,
};

/// SELECT executor: scan or join, then filter, then project
pub struct Select {
    columns: Vec<String>,
    table_name: String,
    join: Option<Join>,
    condition: Option<Condition>,
}

impl Select {
    pub fn new(
        columns: Vec<String>,
        table_name: String,
        join: Option<Join>,
        condition: Option<Condition>,
    ) -> Box<Self> {
        Box::new(Self {
            columns,
            table_name,
            join,
            condition,
        })
    }
}

impl<E: Engine> Executor<E> for Select {
    fn execute(self: Box<Self>, db: &Database<E>) -> Result<ResultSet> {
        let relation = match &self.join {
            None => db.select(&self.table_name, self.condition.as_ref())?,
            Some(join) => db
                .join(
                    join.join_type,
                    &self.table_name,
                    &join.table_name,
                    &join.left_column,
                    &join.right_column,
                )?
                .filter(self.condition.as_ref())?,
        };
        let Relation { labels, rows } = relation.project(&self.columns)?;

        // Qualify names only when more than one table contributes
        let single_table = labels.windows(2).all(|w| w[0].table == w[1].table);
        let columns = labels
            .iter()
            .map(|l| {
                if single_table {
                    l.column.clone()
                } else {
                    l.to_string()
                }
            })
            .collect();
        Ok(ResultSet::Scan { columns, rows })
    }
}
