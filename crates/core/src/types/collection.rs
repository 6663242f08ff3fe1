//! Collection kinds mirrored from the remote document store.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a name does not match any mirrored collection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown collection: {0}")]
pub struct UnknownCollection(pub String);

/// The three remote collections the admin core keeps replicas of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    Products,
    Categories,
    Orders,
}

impl CollectionKind {
    /// All collection kinds, in replica-setup order.
    pub const ALL: [Self; 3] = [Self::Products, Self::Categories, Self::Orders];

    /// The collection name used by the remote store.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Categories => "categories",
            Self::Orders => "orders",
        }
    }
}

impl core::fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl core::str::FromStr for CollectionKind {
    type Err = UnknownCollection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "products" => Ok(Self::Products),
            "categories" => Ok(Self::Categories),
            "orders" => Ok(Self::Orders),
            _ => Err(UnknownCollection(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_names_match_remote_store() {
        assert_eq!(CollectionKind::Products.as_str(), "products");
        assert_eq!(CollectionKind::Categories.as_str(), "categories");
        assert_eq!(CollectionKind::Orders.as_str(), "orders");
    }

    #[test]
    fn test_collection_from_str() {
        assert_eq!("orders".parse::<CollectionKind>(), Ok(CollectionKind::Orders));
        let err = "invoices".parse::<CollectionKind>().unwrap_err();
        assert_eq!(err.to_string(), "unknown collection: invoices");
    }

    #[test]
    fn test_all_covers_every_kind() {
        for kind in CollectionKind::ALL {
            assert_eq!(kind.as_str().parse::<CollectionKind>(), Ok(kind));
        }
    }
}
