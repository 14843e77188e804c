//! Strongly-typed ID wrappers for entity types
//!
//! Newtype wrappers keep transaction and category IDs from being mixed up at
//! compile time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! define_id {
    ($name:ident, $display_prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Create a new random ID
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Short form shown to users, e.g. `txn-1a2b3c4d`
            pub fn short(&self) -> String {
                format!("{}{}", $display_prefix, &self.0.simple().to_string()[..8])
            }

            /// Whether a user-supplied prefix (with or without the type
            /// prefix) identifies this ID
            pub fn matches_prefix(&self, input: &str) -> bool {
                let input = input.trim().to_lowercase();
                let input = input.strip_prefix($display_prefix).unwrap_or(&input);
                !input.is_empty()
                    && (self.0.to_string().starts_with(input)
                        || self.0.simple().to_string().starts_with(input))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.short())
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                let s = s.strip_prefix($display_prefix).unwrap_or(s);
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

define_id!(TransactionId, "txn-");
define_id!(CategoryId, "cat-");
