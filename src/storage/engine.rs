use crate::error::Result;

/// Abstract record store: named byte blobs, each overwritten as a whole.
///
/// Different from sql::engine::Database which operates on tables.
pub trait Engine {
    /// Replaces the record stored under `key`
    fn set(&mut self, key: &str, value: Vec<u8>) -> Result<()>;
    fn get(&mut self, key: &str) -> Result<Option<Vec<u8>>>;
    /// Lists every stored key in ascending order
    fn keys(&mut self) -> Result<Vec<String>>;
}

#[cfg(test)]
mod tests {
    use super::Engine;
    use crate::{
        error::Result,
        storage::{disk::DiskEngine, memory::MemoryEngine},
    };

    fn test_point_opt(mut eng: impl Engine) -> Result<()> {
        assert_eq!(eng.get("not_exist")?, None);

        eng.set("aa", vec![1, 2, 3, 4])?;
        assert_eq!(eng.get("aa")?, Some(vec![1, 2, 3, 4]));

        eng.set("aa", vec![5, 6])?;
        assert_eq!(eng.get("aa")?, Some(vec![5, 6]));

        eng.set("cc", vec![])?;
        assert_eq!(eng.get("cc")?, Some(vec![]));
        Ok(())
    }

    fn test_keys(mut eng: impl Engine) -> Result<()> {
        assert!(eng.keys()?.is_empty());
        eng.set("users", b"u".to_vec())?;
        eng.set("orders", b"o".to_vec())?;
        eng.set("users", b"u2".to_vec())?;
        assert_eq!(eng.keys()?, vec!["orders".to_string(), "users".to_string()]);
        Ok(())
    }

    #[test]
    fn test_memory() -> Result<()> {
        test_point_opt(MemoryEngine::new())?;
        test_keys(MemoryEngine::new())?;
        Ok(())
    }

    #[test]
    fn test_disk() -> Result<()> {
        let dir = tempfile::tempdir()?;
        test_point_opt(DiskEngine::new(dir.path().join("a"), "json")?)?;
        test_keys(DiskEngine::new(dir.path().join("b"), "json")?)?;
        Ok(())
    }
}
