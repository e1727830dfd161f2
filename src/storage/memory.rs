use std::collections::BTreeMap;

use crate::{error::Result, storage::engine::Engine};

/// In-memory record store, lost on drop
#[derive(Debug, Default)]
pub struct MemoryEngine {
    data: BTreeMap<String, Vec<u8>>,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self { data: BTreeMap::new() }
    }
}

impl Engine for MemoryEngine {
    fn set(&mut self, key: &str, value: Vec<u8>) -> Result<()> {
        self.data.insert(key.to_string(), value);
        Ok(())
    }

    fn get(&mut self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.data.get(key).cloned())
    }

    fn keys(&mut self) -> Result<Vec<String>> {
        Ok(self.data.keys().cloned().collect())
    }
}
