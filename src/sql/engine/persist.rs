//! Table records: one self-contained JSON document per table.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    error::{Error, Result},
    sql::{
        schema::{Column, Table},
        types::{DataType, Row, Value},
    },
    storage::engine::Engine,
};

/// Record layout as written
#[derive(Serialize)]
struct TableRecord<'a> {
    name: &'a str,
    columns: &'a [Column],
    rows: &'a [Row],
    auto_increment: &'a BTreeMap<String, i64>,
}

/// Record layout as read back; cells stay loosely typed until repaired
#[derive(Deserialize)]
struct StoredTable {
    name: String,
    columns: Vec<Column>,
    rows: Vec<Vec<serde_json::Value>>,
    #[serde(default)]
    auto_increment: BTreeMap<String, i64>,
}

pub fn encode(table: &Table) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(&TableRecord {
        name: &table.name,
        columns: &table.columns,
        rows: &table.rows,
        auto_increment: &table.auto_increment,
    })?)
}

/// Decodes a record and coerces every cell to its declared column type.
pub fn decode(data: &[u8]) -> Result<Table> {
    let stored: StoredTable = serde_json::from_slice(data)?;
    let name = stored.name.to_lowercase();

    let mut rows = Vec::with_capacity(stored.rows.len());
    for (i, raw) in stored.rows.into_iter().enumerate() {
        if raw.len() != stored.columns.len() {
            return Err(Error::Persistence(format!(
                "table {} row {} has {} values, expected {}",
                name,
                i,
                raw.len(),
                stored.columns.len()
            )));
        }
        let row = raw
            .into_iter()
            .zip(&stored.columns)
            .map(|(cell, column)| {
                repair(cell, column.datatype).map_err(|err| {
                    Error::Persistence(format!(
                        "table {} row {} column {}: {}",
                        name, i, column.name, err
                    ))
                })
            })
            .collect::<Result<Row>>()?;
        rows.push(row);
    }

    // Counters never fall behind ids already handed out
    let mut auto_increment = BTreeMap::new();
    for (i, column) in stored.columns.iter().enumerate() {
        if !column.auto_increment {
            continue;
        }
        let key = column.name.to_lowercase();
        let stored_counter = stored.auto_increment.get(&key).copied().unwrap_or(0);
        let max_id = rows
            .iter()
            .filter_map(|row| match row[i] {
                Value::Integer(v) => Some(v),
                _ => None,
            })
            .max()
            .unwrap_or(0);
        auto_increment.insert(key, stored_counter.max(max_id));
    }

    let table = Table {
        name,
        columns: stored.columns,
        rows,
        auto_increment,
    };
    table.validate()?;
    Ok(table)
}

/// JSON does not keep INTEGER and FLOAT apart reliably, so every cell is
/// brought back to the column type on load.
fn repair(cell: serde_json::Value, datatype: DataType) -> Result<Value> {
    use serde_json::Value as Json;

    match (datatype, cell) {
        (_, Json::Null) => Ok(Value::Null),
        (DataType::Integer, Json::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
            .map(Value::Integer)
            .ok_or_else(|| Error::TypeMismatch(format!("{} is not an INTEGER", n))),
        (DataType::Float, Json::Number(n)) => n
            .as_f64()
            .map(Value::Float)
            .ok_or_else(|| Error::TypeMismatch(format!("{} is not a FLOAT", n))),
        (DataType::Integer | DataType::Float, Json::String(s)) => datatype.coerce(&s),
        (DataType::String, Json::String(s)) => Ok(Value::String(s)),
        (DataType::String, other) => Ok(Value::String(other.to_string())),
        (_, other) => Err(Error::TypeMismatch(format!(
            "{} cannot be stored as {}",
            other, datatype
        ))),
    }
}

/// Overwrites the table's record
pub fn save<E: Engine>(storage: &mut E, table: &Table) -> Result<()> {
    let data = encode(table)?;
    storage.set(&table.name, data)?;
    debug!(table = %table.name, rows = table.rows.len(), "saved table record");
    Ok(())
}

/// Loads every record in the store. A record that cannot be read or decoded
/// is skipped with a warning; the rest still load.
pub fn load_all<E: Engine>(storage: &mut E) -> Result<BTreeMap<String, Table>> {
    let mut tables = BTreeMap::new();
    for key in storage.keys()? {
        let loaded = storage
            .get(&key)
            .and_then(|data| {
                data.ok_or_else(|| Error::Persistence(format!("record {} vanished", key)))
            })
            .and_then(|data| decode(&data));
        match loaded {
            Ok(table) => {
                if tables.contains_key(&table.name) {
                    warn!(
                        record = %key,
                        table = %table.name,
                        "duplicate table record, keeping the later one"
                    );
                }
                tables.insert(table.name.clone(), table);
            }
            Err(err) => warn!(record = %key, error = %err, "skipping unreadable table record"),
        }
    }
    Ok(tables)
}
