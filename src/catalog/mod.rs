//! Static game data.
//!
//! - `ids`: string newtypes for every catalog collection
//! - `definition`: cards, buildings, raid locations, offerings, exchanges
//! - `registry`: `Catalog`, the validated and indexed collection of them
//! - `standard`: the bundled base-game catalog
//!
//! A `Catalog` is loaded once, never mutated, and shared by reference
//! between any number of games.

mod definition;
mod ids;
mod registry;
mod standard;

pub use definition::{
    BuildingDefinition, CardDefinition, ExchangeDefinition, LocationKind, OfferingDefinition,
    RaidLocationDefinition, SubLocationDefinition, VpTier,
};
pub use ids::{BuildingId, CardId, ExchangeId, LocationId, OfferingId, SubLocationId};
pub use registry::{Catalog, CatalogSource};
pub use standard::STANDARD_CATALOG_JSON;
