//! Stable string identifiers for catalog entries.
//!
//! Each catalog collection gets its own newtype so a building id can never
//! be passed where a card id is expected.

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Create a new identifier.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Identifier of a townsfolk card definition (not a copy in a pile).
    CardId
);
string_id!(
    /// Identifier of a village building.
    BuildingId
);
string_id!(
    /// Identifier of a raid location.
    LocationId
);
string_id!(
    /// Identifier of a sub-location, unique within its raid location.
    SubLocationId
);
string_id!(
    /// Identifier of an offering tile.
    OfferingId
);
string_id!(
    /// Identifier of a resource exchange.
    ExchangeId
);
