use std::{
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;

use crate::{error::Result, storage::engine::Engine};

/// Record store backed by a directory: key `users` lives in `users.<ext>`.
///
/// Every write goes to a temporary file in the same directory that is then
/// renamed over the record, so a crash leaves either the old or the new
/// record, never a torn one.
#[derive(Debug)]
pub struct DiskEngine {
    dir: PathBuf,
    extension: String,
}

impl DiskEngine {
    /// Opens (creating if needed) the data directory
    pub fn new(dir: impl AsRef<Path>, extension: &str) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            extension: extension.to_string(),
        })
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", key, self.extension))
    }
}

impl Engine for DiskEngine {
    fn set(&mut self, key: &str, value: Vec<u8>) -> Result<()> {
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(&value)?;
        tmp.as_file().sync_all()?;
        tmp.persist(self.path(key))?;
        Ok(())
    }

    fn get(&mut self, key: &str) -> Result<Option<Vec<u8>>> {
        match fs::read(self.path(key)) {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn keys(&mut self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|e| e.to_str()) != Some(self.extension.as_str()) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                keys.push(stem.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }
}
