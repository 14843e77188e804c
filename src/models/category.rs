//! Category model
//!
//! A category is a spending bucket with an optional default monthly budget
//! limit and a list of keywords used to auto-categorize transactions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::CategoryId;
use super::money::Money;

/// Name of the catch-all category for income and unmatched descriptions
pub const DEFAULT_CATEGORY_NAME: &str = "Miscellaneous";

/// Shown wherever a transaction points at a category that no longer exists
pub const UNKNOWN_CATEGORY_NAME: &str = "Unknown";

/// A spending category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,

    pub name: String,

    /// Lower-case substrings matched against transaction descriptions
    #[serde(default)]
    pub keywords: Vec<String>,

    /// Default monthly limit, used when no month-specific budget is set
    #[serde(default)]
    pub budget_limit: Option<Money>,

    /// Display and keyword-matching priority (lower first)
    #[serde(default)]
    pub sort_order: i32,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: CategoryId::new(),
            name: name.into().trim().to_string(),
            keywords: Vec::new(),
            budget_limit: None,
            sort_order: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_keywords<I, S>(name: impl Into<String>, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut category = Self::new(name);
        for keyword in keywords {
            category.add_keyword(keyword.as_ref());
        }
        category
    }

    pub fn set_budget_limit(&mut self, limit: Money) {
        self.budget_limit = Some(limit);
        self.updated_at = Utc::now();
    }

    pub fn clear_budget_limit(&mut self) {
        self.budget_limit = None;
        self.updated_at = Utc::now();
    }

    /// Add a keyword (normalized to lower case). Returns false if it was
    /// empty or already present.
    pub fn add_keyword(&mut self, keyword: &str) -> bool {
        let keyword = keyword.trim().to_lowercase();
        if keyword.is_empty() || self.keywords.contains(&keyword) {
            return false;
        }
        self.keywords.push(keyword);
        self.updated_at = Utc::now();
        true
    }

    pub fn remove_keyword(&mut self, keyword: &str) -> bool {
        let keyword = keyword.trim().to_lowercase();
        let before = self.keywords.len();
        self.keywords.retain(|k| *k != keyword);
        let removed = self.keywords.len() != before;
        if removed {
            self.updated_at = Utc::now();
        }
        removed
    }

    /// Whether any keyword occurs in the description (case-insensitive)
    pub fn matches(&self, description: &str) -> bool {
        let description = description.to_lowercase();
        self.keywords
            .iter()
            .any(|k| !k.is_empty() && description.contains(k.as_str()))
    }

    pub fn validate(&self) -> Result<(), CategoryValidationError> {
        if self.name.trim().is_empty() {
            return Err(CategoryValidationError::EmptyName);
        }

        if self.name.chars().count() > 50 {
            return Err(CategoryValidationError::NameTooLong(self.name.chars().count()));
        }

        if let Some(limit) = self.budget_limit {
            if limit.is_negative() {
                return Err(CategoryValidationError::NegativeLimit);
            }
        }

        Ok(())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Resolve a category name, falling back to "Unknown"
pub fn category_name(categories: &[Category], id: CategoryId) -> String {
    categories
        .iter()
        .find(|c| c.id == id)
        .map(|c| c.name.clone())
        .unwrap_or_else(|| UNKNOWN_CATEGORY_NAME.to_string())
}

/// Starter categories offered on first run, in keyword-matching order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultCategory {
    Groceries,
    CryptoExchange,
    Transportation,
    DiningOut,
    Health,
    Entertainment,
    Education,
    Clothing,
    Utilities,
    Insurance,
    Travel,
    Gifts,
    Electronics,
    Miscellaneous,
}

impl DefaultCategory {
    pub fn all() -> &'static [Self] {
        &[
            Self::Groceries,
            Self::CryptoExchange,
            Self::Transportation,
            Self::DiningOut,
            Self::Health,
            Self::Entertainment,
            Self::Education,
            Self::Clothing,
            Self::Utilities,
            Self::Insurance,
            Self::Travel,
            Self::Gifts,
            Self::Electronics,
            Self::Miscellaneous,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Groceries => "Groceries",
            Self::CryptoExchange => "Crypto/Exchange",
            Self::Transportation => "Transportation",
            Self::DiningOut => "Dining Out",
            Self::Health => "Health",
            Self::Entertainment => "Entertainment",
            Self::Education => "Education",
            Self::Clothing => "Clothing",
            Self::Utilities => "Utilities",
            Self::Insurance => "Insurance",
            Self::Travel => "Travel",
            Self::Gifts => "Gifts",
            Self::Electronics => "Electronics",
            Self::Miscellaneous => DEFAULT_CATEGORY_NAME,
        }
    }

    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Self::Groceries => &[
                "coop", "migros", "aldi", "lidl", "denner", "volg", "spar", "migrolino", "manor",
                "avec", "supermarket", "peroni", "bäckerei", "conditorei", "bakery",
                "lebensmittel",
            ],
            Self::CryptoExchange => &[
                "exchange to", "btc", "eur", "usd", "chf", "doge", "dot", "eth", "crypto",
                "wallet", "transaction", "balance migration", "transfer", "revolut",
                "payment from", "card top-up",
            ],
            Self::Transportation => &[
                "sbb", "cff", "ffs", "tram", "bus", "train", "billett", "fahrkarte", "ticket",
                "easypark", "parkhaus", "park", "atm azienda", "autostrade", "milano serravalle",
                "funicolare", "tpg", "vbl", "zvv", "trainline", "uber", "bolt", "taxi",
            ],
            Self::DiningOut => &[
                "restaurant", "ristorante", "cafe", "bar", "mcdonald", "burger", "sushi",
                "pizzeria", "tapas", "grill", "rice up", "food", "snack", "kebab", "coffee",
                "pub", "brewery", "gastro", "lounge",
            ],
            Self::Health => &[
                "pharmacy", "apotheke", "doctor", "hospital", "spital", "clinic", "doterra",
                "dentist", "arztpraxis", "medbase",
            ],
            Self::Entertainment => &[
                "cinema", "kino", "movie", "netflix", "spotify", "disney+", "games", "concert",
                "eventim", "ticketcorner", "theater", "gardaland", "karting", "allianz cinema",
                "moon and stars", "naturklang", "tickets", "event",
            ],
            Self::Education => &[
                "zhaw", "school", "university", "course", "tuition", "studies", "weiterbildung",
                "edu",
            ],
            Self::Clothing => &[
                "h&m", "zara", "tally", "snipes", "jack & jones", "clothing", "shoes", "sneakers",
                "jeans", "shirt", "boutique", "under armour", "uniqlo", "adidas", "nike", "puma",
                "clothes", "fashion", "outfit", "dress",
            ],
            Self::Utilities => &[
                "swisscom", "salt", "sunrise", "internet", "apple", "google", "microsoft",
                "spotify", "netflix", "abonnement", "tv", "subscription", "revolut", "top-up",
                "refill", "payment", "facebook", "ups",
            ],
            Self::Insurance => &[
                "axa", "zurich insurance", "mobiliar", "generali", "insurance", "policy",
                "healthcare", "versicherung", "premium", "prämie", "rentenversicherung",
                "pension", "life insurance", "accident insurance", "liability insurance",
            ],
            Self::Travel => &[
                "hotel", "hostel", "bnb", "booking", "airbnb", "trip", "flight", "flug",
                "transfer", "cash at", "airport", "sightseeing", "zugreise", "expedia", "kayak",
                "getyourguide", "nomad", "rental", "carpi", "boat",
            ],
            Self::Gifts => &[
                "gift", "present", "birthday", "donation", "unicef", "gofundme", "spende",
            ],
            Self::Electronics => &[
                "amazon", "galaxus", "microspot", "digikey", "fust", "interdiscount",
                "media markt", "alternate", "whirlpool", "apple", "logitech", "microsoft", "asus",
            ],
            Self::Miscellaneous => &[],
        }
    }

    /// Build the Category for this default at a given sort position
    pub fn to_category(&self, sort_order: i32) -> Category {
        let mut category = Category::with_keywords(self.name(), self.keywords().iter());
        category.sort_order = sort_order;
        category
    }
}

/// Validation errors for categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryValidationError {
    EmptyName,
    NameTooLong(usize),
    NegativeLimit,
}

impl fmt::Display for CategoryValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Category name cannot be empty"),
            Self::NameTooLong(len) => {
                write!(f, "Category name too long ({} chars, max 50)", len)
            }
            Self::NegativeLimit => write!(f, "Budget limit cannot be negative"),
        }
    }
}

impl std::error::Error for CategoryValidationError {}
