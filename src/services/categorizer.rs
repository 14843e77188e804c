//! Keyword-based transaction categorizer
//!
//! Categories are tried in their sort order; the first one with a keyword
//! contained in the (lower-cased) description wins. Income is never
//! auto-categorized and always lands in the default category.

use std::collections::BTreeMap;

use crate::models::{Category, CategoryId, TransactionType, DEFAULT_CATEGORY_NAME};

/// Matches descriptions against category keywords
#[derive(Debug, Clone)]
pub struct Categorizer {
    categories: Vec<Category>,
    default_name: String,
}

impl Categorizer {
    /// Build from categories in matching order. Categories without keywords
    /// never match and are dropped.
    pub fn new(categories: Vec<Category>) -> Self {
        Self::with_default_name(categories, DEFAULT_CATEGORY_NAME)
    }

    pub fn with_default_name(categories: Vec<Category>, default_name: &str) -> Self {
        let mut categories: Vec<_> = categories
            .into_iter()
            .filter(|c| !c.keywords.is_empty())
            .collect();
        // Stable sort keeps the caller's order for equal sort_order
        categories.sort_by_key(|c| c.sort_order);

        Self {
            categories,
            default_name: default_name.to_string(),
        }
    }

    /// The first category with a keyword found in `description`
    pub fn categorize(&self, description: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.matches(description))
    }

    /// Matching category name, or the default name when nothing matches
    pub fn categorize_name(&self, description: &str) -> String {
        self.categorize(description)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| self.default_name.clone())
    }

    /// Pick a category ID for a new transaction
    ///
    /// Income and unmatched expenses get `default_id`.
    pub fn detect_category_id(
        &self,
        description: &str,
        kind: TransactionType,
        default_id: CategoryId,
    ) -> CategoryId {
        if kind == TransactionType::Income {
            return default_id;
        }
        self.categorize(description)
            .map(|c| c.id)
            .unwrap_or(default_id)
    }

    /// Group descriptions by the category name they match
    pub fn group_descriptions<S: AsRef<str>>(
        &self,
        descriptions: &[S],
    ) -> BTreeMap<String, Vec<String>> {
        let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for description in descriptions {
            let description = description.as_ref();
            grouped
                .entry(self.categorize_name(description))
                .or_default()
                .push(description.to_string());
        }
        grouped
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
