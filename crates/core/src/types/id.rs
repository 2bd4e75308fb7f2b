//! Opaque product identifiers.
//!
//! Product IDs come from server-rendered markup, so the same catalog may hand
//! out numeric IDs (`7`) or string IDs (`"sku-7"`). Both forms are kept as-is
//! and compared strictly: `7` and `"7"` are different products.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A product identifier as it appears in `data-product-id` and cart JSON.
///
/// Serialized untagged, so a cart written by the browser
/// (`{"id": 7, ...}` or `{"id": "7", ...}`) round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductId {
    /// Numeric identifier.
    Number(i64),
    /// String identifier.
    Text(String),
}

impl ProductId {
    /// Returns the numeric value if this is a numeric ID.
    #[must_use]
    pub const fn as_number(&self) -> Option<i64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }

    /// Value used when matching `data-product-id="..."` attributes.
    #[must_use]
    pub fn attribute_value(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ProductId {
    fn from(id: i64) -> Self {
        Self::Number(id)
    }
}

impl From<i32> for ProductId {
    fn from(id: i32) -> Self {
        Self::Number(i64::from(id))
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_string())
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        Self::Text(id)
    }
}

/// Parses command-line and attribute input: all-digit values become numeric IDs.
impl FromStr for ProductId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Ok(trimmed
            .parse::<i64>()
            .map_or_else(|_| Self::Text(trimmed.to_string()), Self::Number))
    }
}
