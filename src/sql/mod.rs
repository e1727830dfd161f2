//! SQL processing module
//!
//! This module provides:
//! - `parser`: SQL lexer, AST and recursive-descent parser
//! - `types`: column types and cell values
//! - `schema`: tables, columns and row sets
//! - `executor`: one executor per statement kind
//! - `engine`: the locked catalog, undo-log transactions and persistence

pub mod engine;
pub mod executor;
pub mod parser;
pub mod schema;
pub mod types;
