//! Resource extraction: turns a planet deposit into a synthetic recipe whose
//! steady-state throughput equals the deposit's daily yield.

use crate::MS_PER_DAY;
use crate::registry::{MaterialAmount, Planet, PlanetResource, Recipe};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceType {
    Mineral,
    Gaseous,
    Liquid,
}

impl ResourceType {
    /// Fraction of a day the extractor's apparatus spends gathering.
    pub fn daily_share(self) -> f64 {
        match self {
            ResourceType::Mineral => 12.0 / 24.0,
            ResourceType::Gaseous => 6.0 / 24.0,
            // 4h48m
            ResourceType::Liquid => 288.0 / 1440.0,
        }
    }

    /// Ticker of the building that extracts this resource type.
    pub fn extractor(self) -> &'static str {
        match self {
            ResourceType::Mineral => "EXT",
            ResourceType::Gaseous => "COL",
            ResourceType::Liquid => "RIG",
        }
    }

    pub fn from_extractor(building_ticker: &str) -> Option<Self> {
        match building_ticker {
            "EXT" => Some(ResourceType::Mineral),
            "COL" => Some(ResourceType::Gaseous),
            "RIG" => Some(ResourceType::Liquid),
            _ => None,
        }
    }
}

/// Yield and duration of one extraction cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractionCycle {
    pub amount: f64,
    pub time_ms: f64,
}

/// Compute one extraction cycle for a deposit.
///
/// `daily_potential` must be positive; callers only pass deposits present on
/// the planet.
pub fn extraction_cycle(resource_type: ResourceType, daily_potential: f64) -> ExtractionCycle {
    debug_assert!(
        daily_potential > 0.0,
        "extraction potential must be positive, got {daily_potential}"
    );
    let amount = (daily_potential * resource_type.daily_share()).ceil().trunc();
    ExtractionCycle {
        amount,
        time_ms: amount * (MS_PER_DAY / daily_potential),
    }
}

/// The synthetic, input-less recipe for extracting one deposit.
pub fn extraction_recipe(resource: &PlanetResource) -> Recipe {
    let extractor = resource.resource_type.extractor();
    let cycle = extraction_cycle(resource.resource_type, resource.daily_extraction);
    Recipe {
        recipe_id: format!("{extractor}#{}", resource.ticker),
        building_ticker: extractor.to_string(),
        inputs: Vec::new(),
        outputs: vec![MaterialAmount::new(&resource.ticker, cycle.amount)],
        time_ms: cycle.time_ms,
    }
}

/// Recipes an extractor can run on a planet: one per deposit of the
/// extractor's resource type. Empty for non-extractor buildings.
pub fn extraction_recipes(building_ticker: &str, planet: &Planet) -> Vec<Recipe> {
    let Some(resource_type) = ResourceType::from_extractor(building_ticker) else {
        return Vec::new();
    };
    planet
        .resources
        .iter()
        .filter(|r| r.resource_type == resource_type && r.daily_extraction > 0.0)
        .map(extraction_recipe)
        .collect()
}
