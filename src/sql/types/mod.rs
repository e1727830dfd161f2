use std::{cmp::Ordering, fmt::Display};

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    sql::parser::ast::Operator,
};

/// Supported column types, fixed when the column is declared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DataType {
    String,
    Integer,
    Float,
}

impl DataType {
    /// Converts textual input into a value of this type.
    ///
    /// STRING takes the text unchanged; INTEGER and FLOAT must parse, and
    /// FLOAT must be finite so the value survives a round trip through the
    /// record format.
    pub fn coerce(&self, text: &str) -> Result<Value> {
        match self {
            DataType::String => Ok(Value::String(text.to_string())),
            DataType::Integer => text.trim().parse::<i64>().map(Value::Integer).map_err(|err| {
                Error::TypeMismatch(format!("cannot convert '{}' to INTEGER: {}", text, err))
            }),
            DataType::Float => match text.trim().parse::<f64>() {
                Ok(f) if f.is_finite() => Ok(Value::Float(f)),
                Ok(_) => Err(Error::TypeMismatch(format!(
                    "cannot convert '{}' to FLOAT: not a finite number",
                    text
                ))),
                Err(err) => Err(Error::TypeMismatch(format!(
                    "cannot convert '{}' to FLOAT: {}",
                    text, err
                ))),
            },
        }
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            DataType::String => "STRING",
            DataType::Integer => "INTEGER",
            DataType::Float => "FLOAT",
        })
    }
}

/// A single cell. Stored cells always match their column type or are Null.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Float(f64),
    String(String),
}

impl Value {
    /// Returns the data type of the value, or None if it's Null
    pub fn datatype(&self) -> Option<DataType> {
        match self {
            Self::Null => None,
            Self::Integer(_) => Some(DataType::Integer),
            Self::Float(_) => Some(DataType::Float),
            Self::String(_) => Some(DataType::String),
        }
    }

    /// Evaluates `self <op> operand` for a WHERE predicate.
    ///
    /// A Null cell never matches. Both sides must have the same type, so an
    /// INTEGER cell against a float literal is a type mismatch; strings only
    /// support `=` and `!=`.
    pub fn compare(&self, op: Operator, operand: &Value) -> Result<bool> {
        let ordering = match (self, operand) {
            (Value::Null, _) => return Ok(false),
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => match a.partial_cmp(b) {
                Some(o) => o,
                None => return Ok(false),
            },
            (Value::String(a), Value::String(b)) => match op {
                Operator::Equal => return Ok(a == b),
                Operator::NotEqual => return Ok(a != b),
                _ => {
                    return Err(Error::UnsupportedOperator(format!(
                        "{} is not defined for STRING",
                        op
                    )))
                }
            },
            (left, right) => {
                return Err(Error::TypeMismatch(format!(
                    "cannot compare {} with {}",
                    type_name(left),
                    type_name(right)
                )))
            }
        };

        Ok(match op {
            Operator::Equal => ordering == Ordering::Equal,
            Operator::NotEqual => ordering != Ordering::Equal,
            Operator::Less => ordering == Ordering::Less,
            Operator::Greater => ordering == Ordering::Greater,
            Operator::LessEqual => ordering != Ordering::Greater,
            Operator::GreaterEqual => ordering != Ordering::Less,
        })
    }

    /// Join key equality: numbers compare by value across INTEGER/FLOAT,
    /// strings exactly, every other pairing (Null included) is unequal.
    pub fn join_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Integer(_) | Value::Float(_), Value::Integer(_) | Value::Float(_)) => {
                numeric(self) == numeric(other)
            }
            (Value::String(a), Value::String(b)) => a == b,
            _ => false,
        }
    }
}

fn numeric(value: &Value) -> f64 {
    match value {
        Value::Integer(i) => *i as f64,
        Value::Float(f) => *f,
        _ => f64::NAN,
    }
}

fn type_name(value: &Value) -> String {
    value
        .datatype()
        .map_or_else(|| "NULL".to_string(), |dt| dt.to_string())
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Integer(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::String(v) => write!(f, "{}", v),
        }
    }
}

/// A row is a vector of values, one per column
pub type Row = Vec<Value>;

#[cfg(test)]
mod tests {
    use super::{DataType, Value};
    use crate::{
        error::{Error, Result},
        sql::parser::ast::Operator,
    };

    #[test]
    fn test_coerce() -> Result<()> {
        assert_eq!(DataType::Integer.coerce("42")?, Value::Integer(42));
        assert_eq!(DataType::Integer.coerce("-7")?, Value::Integer(-7));
        assert_eq!(DataType::Float.coerce("2.5")?, Value::Float(2.5));
        assert_eq!(DataType::Float.coerce("3")?, Value::Float(3.0));
        assert_eq!(
            DataType::String.coerce(" spaced out ")?,
            Value::String(" spaced out ".to_string())
        );

        assert!(matches!(DataType::Integer.coerce("4.2"), Err(Error::TypeMismatch(_))));
        assert!(matches!(DataType::Integer.coerce("abc"), Err(Error::TypeMismatch(_))));
        assert!(matches!(DataType::Float.coerce("inf"), Err(Error::TypeMismatch(_))));
        Ok(())
    }

    #[test]
    fn test_compare() -> Result<()> {
        let two = Value::Integer(2);
        assert!(two.compare(Operator::Greater, &Value::Integer(1))?);
        assert!(two.compare(Operator::LessEqual, &Value::Integer(2))?);
        assert!(!two.compare(Operator::NotEqual, &Value::Integer(2))?);
        assert!(Value::Float(2.5).compare(Operator::GreaterEqual, &Value::Float(2.5))?);
        assert!(matches!(
            two.compare(Operator::Less, &Value::Float(2.5)),
            Err(Error::TypeMismatch(_))
        ));
        assert!(matches!(
            Value::Float(2.0).compare(Operator::Equal, &Value::Integer(2)),
            Err(Error::TypeMismatch(_))
        ));

        let s = Value::String("bob".to_string());
        assert!(s.compare(Operator::Equal, &Value::String("bob".to_string()))?);
        assert!(s.compare(Operator::NotEqual, &Value::String("Bob".to_string()))?);
        assert!(matches!(
            s.compare(Operator::Less, &Value::String("c".to_string())),
            Err(Error::UnsupportedOperator(_))
        ));
        assert!(matches!(
            s.compare(Operator::Equal, &Value::Integer(1)),
            Err(Error::TypeMismatch(_))
        ));

        assert!(!Value::Null.compare(Operator::Equal, &Value::Integer(1))?);
        Ok(())
    }

    #[test]
    fn test_join_eq() {
        assert!(Value::Integer(3).join_eq(&Value::Float(3.0)));
        assert!(Value::Float(1.5).join_eq(&Value::Float(1.5)));
        assert!(!Value::Integer(3).join_eq(&Value::String("3".to_string())));
        assert!(!Value::Null.join_eq(&Value::Null));
    }

    #[test]
    fn test_serialize() -> Result<()> {
        let row = vec![
            Value::Integer(1),
            Value::Float(0.5),
            Value::String("a".to_string()),
            Value::Null,
        ];
        assert_eq!(serde_json::to_string(&row)?, r#"[1,0.5,"a",null]"#);
        assert_eq!(serde_json::to_string(&DataType::Integer)?, r#""INTEGER""#);
        Ok(())
    }
}
