//! Product Model

use super::duration::DurationSpec;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One purchasable duration for a profile tier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingOption {
    pub duration: DurationSpec,
    pub price: f64,
}

/// A profile tier of a streaming product (e.g. "Premium", "Shared Slot")
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileTier {
    pub name: String,
    /// Shared tiers deliver a shared credential gated by access codes
    #[serde(default)]
    pub is_shared_profile: bool,
    pub pricing_options: Vec<PricingOption>,
}

impl ProfileTier {
    /// Find the pricing option matching a requested duration
    pub fn pricing_option(&self, duration: &DurationSpec) -> Option<&PricingOption> {
        self.pricing_options.iter().find(|opt| {
            opt.duration.unit == duration.unit && opt.duration.value == duration.value
        })
    }
}

/// Product entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    /// Streaming platform identifier (e.g. "netflix", "spotify")
    pub platform_type: String,
    pub profile_tiers: Vec<ProfileTier>,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Find a profile tier by name
    pub fn tier(&self, name: &str) -> Option<&ProfileTier> {
        self.profile_tiers.iter().find(|t| t.name == name)
    }
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub description: Option<String>,
    pub platform_type: String,
    pub profile_tiers: Vec<ProfileTier>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::duration::DurationUnit;

    fn sample() -> Product {
        Product {
            id: Some("product:netflix".into()),
            name: "Netflix".into(),
            description: None,
            platform_type: "netflix".into(),
            profile_tiers: vec![ProfileTier {
                name: "Premium".into(),
                is_shared_profile: false,
                pricing_options: vec![PricingOption {
                    duration: DurationSpec::new(1.0, DurationUnit::Month),
                    price: 12.99,
                }],
            }],
            is_active: true,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_tier_lookup() {
        let p = sample();
        assert!(p.tier("Premium").is_some());
        assert!(p.tier("Basic").is_none());
    }

    #[test]
    fn test_pricing_option_match() {
        let p = sample();
        let tier = p.tier("Premium").unwrap();
        let hit = tier.pricing_option(&DurationSpec::new(1.0, DurationUnit::Month));
        assert_eq!(hit.unwrap().price, 12.99);
        let miss = tier.pricing_option(&DurationSpec::new(1.0, DurationUnit::Year));
        assert!(miss.is_none());
    }
}
