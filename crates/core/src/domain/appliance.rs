use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::amount;
use crate::validation::ValidationErrors;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplianceId(pub String);

impl ApplianceId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ApplianceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A rentable catalog entry. `price` is the rental price per day.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appliance {
    #[serde(rename = "_id", alias = "id")]
    pub id: ApplianceId,
    pub name: String,
    #[serde(default, with = "amount")]
    pub price: Decimal,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img_url: Option<String>,
}

impl Appliance {
    /// Lower-cased name used for keyword and substring matching.
    pub fn search_key(&self) -> String {
        self.name.to_lowercase()
    }

    /// Prefix match folding ASCII letters only, the same rule SQLite `LIKE`
    /// applies. `"É"` does not match `"éclair"`.
    pub fn name_starts_with(&self, prefix: &str) -> bool {
        let (name, prefix) = (self.name.as_bytes(), prefix.as_bytes());
        name.len() >= prefix.len() && name[..prefix.len()].eq_ignore_ascii_case(prefix)
    }
}

/// Admin payload for inserting an appliance.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAppliance {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub img_url: Option<String>,
    #[serde(default, with = "amount")]
    pub price: Decimal,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub available: bool,
}

impl NewAppliance {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.name.trim().is_empty() {
            errors.add("name", "Appliance name is required");
        }
        if self.price.is_sign_negative() {
            errors.add("price", "Price cannot be negative");
        }
        errors.into_result()
    }

    pub fn into_appliance(self, id: ApplianceId) -> Appliance {
        Appliance {
            id,
            name: self.name.trim().to_string(),
            price: self.price,
            details: self.details,
            available: self.available,
            img_url: self.img_url.filter(|url| !url.trim().is_empty()),
        }
    }
}

/// Admin payload for a partial update. Absent fields keep their value; an empty
/// name or details string, or a zero price, is ignored the same way.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliancePatch {
    pub name: Option<String>,
    pub img_url: Option<String>,
    #[serde(default, with = "amount::option")]
    pub price: Option<Decimal>,
    pub details: Option<String>,
    pub available: Option<bool>,
}

impl AppliancePatch {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.price.is_some_and(|price| price.is_sign_negative()) {
            errors.add("price", "Price cannot be negative");
        }
        errors.into_result()
    }

    pub fn apply_to(self, appliance: &mut Appliance) {
        if let Some(name) = self.name.filter(|name| !name.trim().is_empty()) {
            appliance.name = name;
        }
        if let Some(img_url) = self.img_url {
            appliance.img_url = Some(img_url).filter(|url| !url.is_empty());
        }
        if let Some(price) = self.price.filter(|price| !price.is_zero()) {
            appliance.price = price;
        }
        if let Some(details) = self.details.filter(|details| !details.is_empty()) {
            appliance.details = details;
        }
        if let Some(available) = self.available {
            appliance.available = available;
        }
    }
}
