//! Partition store: the filesystem layout shared by the aggregator and the range loader.
//!
//! ```text
//! <logs>/<HourKey>/*          raw partition, rows `date|article|price`
//! <output>/<HourKey>.txt      aggregate file, rows `formatted_date|article|total_sales`
//! <output>/error.log          append-only `<HourKey>: <message>` lines
//! ```
//!
//! There is no locking. The aggregator is the only writer and replaces files by rename.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::domain::HourKey;

pub const DEFAULT_LOGS_DIR: &str = "./logs";
pub const DEFAULT_OUTPUT_DIR: &str = "./output";
pub const AGGREGATE_EXT: &str = "txt";
pub const ERROR_LOG_NAME: &str = "error.log";

const ENV_LOGS_DIR: &str = "SALES_LOGS_DIR";
const ENV_OUTPUT_DIR: &str = "SALES_OUTPUT_DIR";

/// Resolved input/output roots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLayout {
    pub logs_root: PathBuf,
    pub output_root: PathBuf,
}

impl Default for StoreLayout {
    fn default() -> Self {
        Self::new(DEFAULT_LOGS_DIR, DEFAULT_OUTPUT_DIR)
    }
}

impl StoreLayout {
    pub fn new(logs_root: impl Into<PathBuf>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            logs_root: logs_root.into(),
            output_root: output_root.into(),
        }
    }

    /// Resolve roots: explicit overrides, then `SALES_LOGS_DIR`/`SALES_OUTPUT_DIR`
    /// (a `.env` file is honored), then `./logs` and `./output`.
    pub fn resolve(logs_override: Option<PathBuf>, output_override: Option<PathBuf>) -> Self {
        dotenvy::dotenv().ok();
        let logs_root = logs_override
            .or_else(|| std::env::var_os(ENV_LOGS_DIR).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOGS_DIR));
        let output_root = output_override
            .or_else(|| std::env::var_os(ENV_OUTPUT_DIR).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
        Self { logs_root, output_root }
    }

    pub fn raw_partition_dir(&self, key: &HourKey) -> PathBuf {
        self.logs_root.join(key.to_string())
    }

    pub fn aggregate_path(&self, key: &HourKey) -> PathBuf {
        self.output_root.join(format!("{key}.{AGGREGATE_EXT}"))
    }

    /// Hidden sibling the aggregator writes before renaming over `aggregate_path`.
    pub fn temp_path(&self, key: &HourKey) -> PathBuf {
        self.output_root.join(format!(".{key}.{AGGREGATE_EXT}.tmp"))
    }

    pub fn error_log_path(&self) -> PathBuf {
        self.output_root.join(ERROR_LOG_NAME)
    }

    /// All aggregate files in the output root whose name yields a valid hour key,
    /// sorted by key. Entries that do not are logged and skipped.
    pub fn list_aggregates(&self) -> Vec<(HourKey, PathBuf)> {
        let entries = match fs::read_dir(&self.output_root) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %self.output_root.display(), "cannot list output directory: {e}");
                return Vec::new();
            }
        };

        let mut out = Vec::new();
        for entry in entries.filter_map(Result::ok) {
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                warn!(path = %path.display(), "skipping entry with non UTF-8 name");
                continue;
            };
            if name == ERROR_LOG_NAME || name.starts_with('.') {
                debug!(name, "skipping bookkeeping file");
                continue;
            }
            match hour_key_from_file_name(name) {
                Ok(key) => out.push((key, path)),
                Err(e) => warn!(name, "skipping file: {e}"),
            }
        }
        out.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
        out
    }
}

/// Derive the hour key from a file name: everything before the first `.`.
pub fn hour_key_from_file_name(name: &str) -> Result<HourKey, String> {
    let stem = name.split('.').next().unwrap_or(name);
    HourKey::parse(stem)
}

/// `true` for files engines treat as hidden/metadata (`.crc`, `_SUCCESS`, ...).
pub fn is_hidden_name(name: &str) -> bool {
    name.starts_with('.') || name.starts_with('_')
}

pub(crate) fn ensure_dir(path: &Path) -> std::io::Result<()> {
    fs::create_dir_all(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_follow_layout() {
        let layout = StoreLayout::new("/data/logs", "/data/output");
        let key = HourKey::parse("2024112014").unwrap();
        assert_eq!(layout.raw_partition_dir(&key), PathBuf::from("/data/logs/2024112014"));
        assert_eq!(layout.aggregate_path(&key), PathBuf::from("/data/output/2024112014.txt"));
        assert_eq!(layout.error_log_path(), PathBuf::from("/data/output/error.log"));
        assert_eq!(
            layout.temp_path(&key),
            PathBuf::from("/data/output/.2024112014.txt.tmp")
        );
    }

    #[test]
    fn explicit_overrides_win() {
        let layout = StoreLayout::resolve(Some("a".into()), Some("b".into()));
        assert_eq!(layout, StoreLayout::new("a", "b"));
    }

    #[test]
    fn file_name_key_uses_first_segment() {
        assert_eq!(
            hour_key_from_file_name("2024112010.txt").unwrap().to_string(),
            "2024112010"
        );
        assert_eq!(
            hour_key_from_file_name("2024112010.txt.bak").unwrap().to_string(),
            "2024112010"
        );
        assert!(hour_key_from_file_name("notes.txt").is_err());
    }

    #[test]
    fn listing_skips_bookkeeping_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["2024112110.txt", "2024112010.txt", "error.log", ".2024112210.txt.tmp", "readme.md"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        let layout = StoreLayout::new(dir.path().join("logs"), dir.path());
        let keys: Vec<String> = layout
            .list_aggregates()
            .into_iter()
            .map(|(k, _)| k.to_string())
            .collect();
        assert_eq!(keys, vec!["2024112010", "2024112110"]);
    }

    #[test]
    fn listing_missing_root_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let layout = StoreLayout::new(dir.path(), dir.path().join("nope"));
        assert!(layout.list_aggregates().is_empty());
    }
}
