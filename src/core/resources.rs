//! Resource kinds and per-player resource counters.
//!
//! Counters are unsigned. Every debit goes through `ResourceBag::sub` or
//! `ResourceBag::sub_bag`, which refuse to go below zero and report the
//! shortfall instead of clamping.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// A tracked resource kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Silver,
    Gold,
    Provisions,
    Iron,
    Livestock,
}

impl Resource {
    /// Every resource kind, in counter order.
    pub const ALL: [Resource; 5] = [
        Resource::Silver,
        Resource::Gold,
        Resource::Provisions,
        Resource::Iron,
        Resource::Livestock,
    ];

    /// Plunder is what raids hand out: gold, iron and livestock.
    #[must_use]
    pub const fn is_plunder(self) -> bool {
        matches!(self, Resource::Gold | Resource::Iron | Resource::Livestock)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Resource::Silver => "silver",
            Resource::Gold => "gold",
            Resource::Provisions => "provisions",
            Resource::Iron => "iron",
            Resource::Livestock => "livestock",
        }
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A debit that would take a counter below zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("needs {required} {resource}, holds {held}")]
pub struct Shortfall {
    pub resource: Resource,
    pub required: u32,
    pub held: u32,
}

/// A credit that would overflow a counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("{resource} counter overflow")]
pub struct ResourceOverflow {
    pub resource: Resource,
}

/// Mapping resource kind -> quantity.
///
/// Missing entries read as zero and zero entries are never stored, so two
/// bags with the same holdings always compare equal.
///
/// ```
/// use raiders_engine::core::{Resource, ResourceBag};
///
/// let mut bag = ResourceBag::from_pairs(&[(Resource::Silver, 3)]);
/// let cost = ResourceBag::from_pairs(&[(Resource::Silver, 2)]);
///
/// assert!(bag.covers(&cost));
/// bag.sub_bag(&cost).unwrap();
/// assert_eq!(bag.get(Resource::Silver), 1);
/// assert!(bag.sub_bag(&cost).is_err());
/// assert_eq!(bag.get(Resource::Silver), 1);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "BTreeMap<Resource, u32>", into = "BTreeMap<Resource, u32>")]
pub struct ResourceBag {
    counts: BTreeMap<Resource, u32>,
}

impl ResourceBag {
    /// Create an empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a bag from (resource, quantity) pairs. Repeated kinds add up.
    #[must_use]
    pub fn from_pairs(pairs: &[(Resource, u32)]) -> Self {
        pairs.iter().copied().collect()
    }

    /// Builder: add `amount` of `resource`.
    #[must_use]
    pub fn with(mut self, resource: Resource, amount: u32) -> Self {
        let entry = self.counts.entry(resource).or_insert(0);
        *entry = entry.saturating_add(amount);
        self.counts.retain(|_, n| *n > 0);
        self
    }

    /// Quantity held of `resource`.
    #[must_use]
    pub fn get(&self, resource: Resource) -> u32 {
        self.counts.get(&resource).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all quantities.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.counts.values().copied().fold(0, u32::saturating_add)
    }

    /// Non-zero entries in resource order.
    pub fn iter(&self) -> impl Iterator<Item = (Resource, u32)> + '_ {
        self.counts.iter().map(|(r, n)| (*r, *n))
    }

    /// Check whether this bag holds at least everything in `cost`.
    #[must_use]
    pub fn covers(&self, cost: &ResourceBag) -> bool {
        self.shortfall(cost).is_none()
    }

    /// First resource (in resource order) this bag cannot pay for.
    #[must_use]
    pub fn shortfall(&self, cost: &ResourceBag) -> Option<Shortfall> {
        cost.iter().find_map(|(resource, required)| {
            let held = self.get(resource);
            (held < required).then_some(Shortfall { resource, required, held })
        })
    }

    /// Credit `amount` of `resource`.
    pub fn add(&mut self, resource: Resource, amount: u32) -> Result<(), ResourceOverflow> {
        if amount == 0 {
            return Ok(());
        }
        let current = self.get(resource);
        let next = current
            .checked_add(amount)
            .ok_or(ResourceOverflow { resource })?;
        self.counts.insert(resource, next);
        Ok(())
    }

    /// Debit `amount` of `resource`; fails without touching the bag when
    /// the holding is too small.
    pub fn sub(&mut self, resource: Resource, amount: u32) -> Result<(), Shortfall> {
        if amount == 0 {
            return Ok(());
        }
        let held = self.get(resource);
        let next = held.checked_sub(amount).ok_or(Shortfall {
            resource,
            required: amount,
            held,
        })?;
        if next == 0 {
            self.counts.remove(&resource);
        } else {
            self.counts.insert(resource, next);
        }
        Ok(())
    }

    /// Credit every entry of `other`. All-or-nothing.
    pub fn add_bag(&mut self, other: &ResourceBag) -> Result<(), ResourceOverflow> {
        for (resource, amount) in other.iter() {
            if self.get(resource).checked_add(amount).is_none() {
                return Err(ResourceOverflow { resource });
            }
        }
        for (resource, amount) in other.iter() {
            self.add(resource, amount)?;
        }
        Ok(())
    }

    /// Debit every entry of `cost`. All-or-nothing.
    pub fn sub_bag(&mut self, cost: &ResourceBag) -> Result<(), Shortfall> {
        if let Some(shortfall) = self.shortfall(cost) {
            return Err(shortfall);
        }
        for (resource, amount) in cost.iter() {
            self.sub(resource, amount)?;
        }
        Ok(())
    }

    /// Remove up to `amount` of `resource`, returning how much was removed.
    pub fn take_up_to(&mut self, resource: Resource, amount: u32) -> u32 {
        let taken = self.get(resource).min(amount);
        // Cannot fail: `taken` never exceeds the holding.
        let _ = self.sub(resource, taken);
        taken
    }

    /// Copy of this bag with `amount` less of `resource`, floored at zero.
    #[must_use]
    pub fn reduced(&self, resource: Resource, amount: u32) -> ResourceBag {
        let mut out = self.clone();
        out.take_up_to(resource, amount);
        out
    }

    /// Remove and return everything in the bag.
    pub fn drain(&mut self) -> ResourceBag {
        std::mem::take(self)
    }
}

impl FromIterator<(Resource, u32)> for ResourceBag {
    fn from_iter<I: IntoIterator<Item = (Resource, u32)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(ResourceBag::new(), |bag, (resource, amount)| bag.with(resource, amount))
    }
}

impl From<BTreeMap<Resource, u32>> for ResourceBag {
    fn from(map: BTreeMap<Resource, u32>) -> Self {
        map.into_iter().collect()
    }
}

impl From<ResourceBag> for BTreeMap<Resource, u32> {
    fn from(bag: ResourceBag) -> Self {
        bag.counts
    }
}

impl std::fmt::Display for ResourceBag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return f.write_str("nothing");
        }
        let mut first = true;
        for (resource, amount) in self.iter() {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{amount} {resource}")?;
            first = false;
        }
        Ok(())
    }
}
