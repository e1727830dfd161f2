use std::path::{Path, PathBuf};

/// Where table records live on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Directory scanned at open; one record file per table
    pub data_dir: PathBuf,
    /// File extension of table records, without the dot
    pub extension: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            extension: "json".to_string(),
        }
    }
}

impl Config {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::Config;

    #[test]
    fn test_config() {
        let default = Config::default();
        assert_eq!(default.data_dir, PathBuf::from("."));
        assert_eq!(default.extension, "json");

        let cfg = Config::new("/var/lib/quill").with_extension(".tbl");
        assert_eq!(cfg.data_dir, PathBuf::from("/var/lib/quill"));
        assert_eq!(cfg.extension, "tbl");
    }
}
