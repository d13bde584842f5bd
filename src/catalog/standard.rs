//! The bundled base-game catalog.

use super::registry::{Catalog, CatalogSource};
use crate::core::CatalogError;

/// Raw JSON of the bundled catalog.
pub const STANDARD_CATALOG_JSON: &str = include_str!("../../data/standard_catalog.json");

impl Catalog {
    /// Load the bundled base-game catalog.
    ///
    /// ```
    /// use raiders_engine::catalog::Catalog;
    ///
    /// let catalog = Catalog::standard().unwrap();
    /// assert_eq!(catalog.raid_locations().count(), 10);
    /// ```
    pub fn standard() -> Result<Self, CatalogError> {
        Self::from_json(STANDARD_CATALOG_JSON)
    }

    /// The bundled records, for building variants on top of them.
    pub fn standard_source() -> Result<CatalogSource, CatalogError> {
        Ok(serde_json::from_str(STANDARD_CATALOG_JSON)?)
    }
}
