//! File I/O helpers with atomic writes
//!
//! Writes go to a sibling temp file that is synced and renamed over the
//! target, so a crash never leaves a half-written data file behind.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::SpendwiseError;

/// Read JSON from a file, returning a default value if the file doesn't exist
pub fn read_json<T, P>(path: P) -> Result<T, SpendwiseError>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if !path.exists() {
        return Ok(T::default());
    }
    parse_file(path)
}

/// Read JSON from a file that must exist
pub fn read_json_required<T, P>(path: P) -> Result<T, SpendwiseError>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if !path.exists() {
        return Err(SpendwiseError::Storage(format!(
            "File not found: {}",
            path.display()
        )));
    }
    parse_file(path)
}

fn parse_file<T: DeserializeOwned>(path: &Path) -> Result<T, SpendwiseError> {
    let file = File::open(path).map_err(|e| {
        SpendwiseError::Storage(format!("Failed to open {}: {}", path.display(), e))
    })?;

    serde_json::from_reader(BufReader::new(file)).map_err(|e| {
        SpendwiseError::Storage(format!("Failed to parse {}: {}", path.display(), e))
    })
}

/// Serialize `data` as pretty JSON and write it atomically
pub fn write_json_atomic<T, P>(path: P, data: &T) -> Result<(), SpendwiseError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    write_atomic(path.as_ref(), |writer| {
        serde_json::to_writer_pretty(writer, data)
            .map_err(|e| SpendwiseError::Storage(format!("Failed to serialize data: {}", e)))
    })
}

/// Run `fill` against a buffered temp file, then move it over `path`
pub fn write_atomic<F>(path: &Path, fill: F) -> Result<(), SpendwiseError>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<(), SpendwiseError>,
{
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            SpendwiseError::Storage(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    let temp_path = temp_path_for(path);
    let file = File::create(&temp_path)
        .map_err(|e| SpendwiseError::Storage(format!("Failed to create temp file: {}", e)))?;

    let mut writer = BufWriter::new(file);
    let written = fill(&mut writer).and_then(|_| {
        writer
            .flush()
            .map_err(|e| SpendwiseError::Storage(format!("Failed to flush data: {}", e)))?;
        writer
            .get_ref()
            .sync_all()
            .map_err(|e| SpendwiseError::Storage(format!("Failed to sync data: {}", e)))
    });

    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        SpendwiseError::Storage(format!("Failed to rename temp file: {}", e))
    })
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Check if a file exists and contains well-formed JSON
pub fn json_file_valid<P: AsRef<Path>>(path: P) -> bool {
    File::open(path.as_ref())
        .map(|file| serde_json::from_reader::<_, serde_json::Value>(BufReader::new(file)).is_ok())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
    struct Sample {
        name: String,
        value: i32,
    }

    fn sample() -> Sample {
        Sample {
            name: "coop".to_string(),
            value: 42,
        }
    }

    #[test]
    fn test_read_missing_returns_default() {
        let temp_dir = TempDir::new().unwrap();
        let data: Sample = read_json(temp_dir.path().join("missing.json")).unwrap();
        assert_eq!(data, Sample::default());
    }

    #[test]
    fn test_write_creates_parents_and_leaves_no_temp() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("data.json");

        write_json_atomic(&path, &sample()).unwrap();

        assert!(path.exists());
        assert!(!temp_dir.path().join("nested").join("data.json.tmp").exists());
        let loaded: Sample = read_json_required(&path).unwrap();
        assert_eq!(loaded, sample());
    }

    #[test]
    fn test_failed_fill_keeps_original() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data.json");
        write_json_atomic(&path, &sample()).unwrap();

        let result = write_atomic(&path, |_| Err(SpendwiseError::Storage("boom".into())));
        assert!(result.is_err());

        let loaded: Sample = read_json(&path).unwrap();
        assert_eq!(loaded, sample());
        assert!(!temp_dir.path().join("data.json.tmp").exists());
    }

    #[test]
    fn test_json_file_valid() {
        let temp_dir = TempDir::new().unwrap();
        let valid = temp_dir.path().join("valid.json");
        let invalid = temp_dir.path().join("invalid.json");

        fs::write(&valid, r#"{"name": "test"}"#).unwrap();
        fs::write(&invalid, "not json at all").unwrap();

        assert!(json_file_valid(&valid));
        assert!(!json_file_valid(&invalid));
        assert!(!json_file_valid(temp_dir.path().join("missing.json")));
    }

    #[test]
    fn test_read_required_missing_fails() {
        let temp_dir = TempDir::new().unwrap();
        let result = read_json_required::<Sample, _>(temp_dir.path().join("missing.json"));
        assert!(matches!(result, Err(SpendwiseError::Storage(_))));
    }
}
