//! Durable record storage, one record per table

pub mod disk;
pub mod engine;
pub mod memory;
