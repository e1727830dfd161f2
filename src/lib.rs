//! QuillDB - a minimal embedded relational store
//!
//! This crate provides:
//! - SQL parsing (lexer, parser, AST) for a small statement set
//! - Equality joins (INNER, LEFT, RIGHT)
//! - Undo-log transactions (BEGIN, COMMIT, ROLLBACK)
//! - One JSON record per table, rewritten after every change

pub mod config;
pub mod error;
pub mod sql;
pub mod storage;

pub use config::Config;
pub use error::{Error, Result};
pub use sql::{engine::Database, executor::ResultSet};
