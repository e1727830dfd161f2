use crate::{
    error::Result,
    sql::{
        parser::ast::JoinType,
        schema::{Relation, Table},
        types::{Row, Value},
    },
};

/// Resolves the join columns and runs the requested equality join.
///
/// The header follows the row layout: for INNER and LEFT the left table's
/// columns come first, for RIGHT the right table's do.
pub fn join(
    join_type: JoinType,
    left: &Table,
    right: &Table,
    left_column: &str,
    right_column: &str,
) -> Result<Relation> {
    let left_col = left.get_col_index(left_column)?;
    let right_col = right.get_col_index(right_column)?;

    let (labels, rows) = match join_type {
        JoinType::Inner => (
            [left.labels(), right.labels()].concat(),
            inner_join(left, right, left_col, right_col),
        ),
        JoinType::Left => (
            [left.labels(), right.labels()].concat(),
            left_join(left, right, left_col, right_col),
        ),
        JoinType::Right => (
            [right.labels(), left.labels()].concat(),
            right_join(left, right, left_col, right_col),
        ),
    };
    Ok(Relation { labels, rows })
}

/// Nested loop over every pair; a pair matches when the join keys are equal
pub fn inner_join(left: &Table, right: &Table, left_col: usize, right_col: usize) -> Vec<Row> {
    let mut rows = Vec::new();
    for lrow in &left.rows {
        for rrow in &right.rows {
            if lrow[left_col].join_eq(&rrow[right_col]) {
                rows.push([lrow.as_slice(), rrow.as_slice()].concat());
            }
        }
    }
    rows
}

/// Like [`inner_join`], but a left row without any match is emitted once,
/// padded with one Null per right column
pub fn left_join(left: &Table, right: &Table, left_col: usize, right_col: usize) -> Vec<Row> {
    let mut rows = Vec::new();
    for lrow in &left.rows {
        let mut matched = false;
        for rrow in &right.rows {
            if lrow[left_col].join_eq(&rrow[right_col]) {
                rows.push([lrow.as_slice(), rrow.as_slice()].concat());
                matched = true;
            }
        }

        if !matched {
            let mut row = lrow.clone();
            row.extend(std::iter::repeat_n(Value::Null, right.columns.len()));
            rows.push(row);
        }
    }
    rows
}

/// A left join with the sides swapped: rows come out right-then-left
pub fn right_join(left: &Table, right: &Table, left_col: usize, right_col: usize) -> Vec<Row> {
    left_join(right, left, right_col, left_col)
}
