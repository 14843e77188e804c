//! First-run storage setup
//!
//! Seeds the starter categories (with their matching keywords) the first time
//! the data directory is used. Existing data is never touched.

use tracing::info;

use crate::config::paths::SpendwisePaths;
use crate::error::SpendwiseError;
use crate::models::DefaultCategory;

use super::categories::CategoryData;
use super::file_io::write_json_atomic;

/// Initialize storage for a fresh installation
///
/// Returns the number of categories that were seeded (0 if categories
/// already existed).
pub fn initialize_storage(paths: &SpendwisePaths) -> Result<usize, SpendwiseError> {
    paths.ensure_directories()?;

    if !needs_initialization(paths) {
        return Ok(0);
    }

    let categories: Vec<_> = DefaultCategory::all()
        .iter()
        .enumerate()
        .map(|(i, default)| default.to_category(i as i32))
        .collect();
    let count = categories.len();

    write_json_atomic(paths.categories_file(), &CategoryData { categories })?;
    info!(count, "seeded default categories");

    Ok(count)
}

/// Check if the category file still has to be created
pub fn needs_initialization(paths: &SpendwisePaths) -> bool {
    !paths.categories_file().exists()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DEFAULT_CATEGORY_NAME;
    use tempfile::TempDir;

    #[test]
    fn test_initialize_storage() {
        let temp_dir = TempDir::new().unwrap();
        let paths = SpendwisePaths::with_base_dir(temp_dir.path().to_path_buf());

        assert!(needs_initialization(&paths));
        assert_eq!(initialize_storage(&paths).unwrap(), 14);
        assert!(!needs_initialization(&paths));
        assert!(paths.backup_dir().exists());

        let content = std::fs::read_to_string(paths.categories_file()).unwrap();
        let data: CategoryData = serde_json::from_str(&content).unwrap();
        assert_eq!(data.categories[0].name, "Groceries");
        assert!(data.categories[0].keywords.contains(&"migros".to_string()));
        assert!(data
            .categories
            .iter()
            .any(|c| c.name == DEFAULT_CATEGORY_NAME && c.keywords.is_empty()));
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let paths = SpendwisePaths::with_base_dir(temp_dir.path().to_path_buf());

        initialize_storage(&paths).unwrap();
        std::fs::write(paths.categories_file(), r#"{"categories": []}"#).unwrap();

        assert_eq!(initialize_storage(&paths).unwrap(), 0);
        let content = std::fs::read_to_string(paths.categories_file()).unwrap();
        assert!(content.contains("[]"));
    }
}
