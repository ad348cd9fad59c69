pub mod sequence;

use crate::domain::appliance::{Appliance, ApplianceId};

pub use sequence::{RefreshSequencer, RefreshTicket};

/// Default number of prefix suggestions.
pub const DEFAULT_SUGGESTION_LIMIT: usize = 5;

/// A snapshot of the rentable catalog, in backend order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Catalog {
    appliances: Vec<Appliance>,
}

impl Catalog {
    pub fn new(appliances: Vec<Appliance>) -> Self {
        Self { appliances }
    }

    pub fn appliances(&self) -> &[Appliance] {
        &self.appliances
    }

    pub fn into_appliances(self) -> Vec<Appliance> {
        self.appliances
    }

    pub fn len(&self) -> usize {
        self.appliances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.appliances.is_empty()
    }

    pub fn find(&self, appliance_id: &ApplianceId) -> Option<&Appliance> {
        self.appliances.iter().find(|appliance| &appliance.id == appliance_id)
    }

    pub fn search(&self, term: &str) -> Vec<Appliance> {
        search(&self.appliances, term)
    }

    pub fn suggest(&self, prefix: &str, limit: usize) -> Vec<String> {
        suggest(&self.appliances, prefix, limit)
    }
}

/// Case-insensitive substring filter on name. A blank term keeps everything.
pub fn search(all: &[Appliance], term: &str) -> Vec<Appliance> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return all.to_vec();
    }
    all.iter().filter(|appliance| appliance.search_key().contains(&needle)).cloned().collect()
}

/// Names starting with `prefix`, ignoring ASCII case, capped at `limit`. An
/// empty prefix yields nothing.
pub fn suggest(all: &[Appliance], prefix: &str, limit: usize) -> Vec<String> {
    let needle = prefix.trim();
    if needle.is_empty() {
        return Vec::new();
    }
    all.iter()
        .filter(|appliance| appliance.name_starts_with(needle))
        .take(limit)
        .map(|appliance| appliance.name.clone())
        .collect()
}
