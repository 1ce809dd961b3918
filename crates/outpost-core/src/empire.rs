//! Empire context: faction and planetary-permit usage, which together scale
//! the faction efficiency bonus.

use crate::id::ExpertiseType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Faction {
    Antares,
    Benten,
    Hortus,
    Moria,
}

/// Efficiency bonus a faction grants to one expertise category, if any.
pub fn faction_bonus(faction: Faction, expertise: ExpertiseType) -> Option<f64> {
    use ExpertiseType::*;
    let favoured = match faction {
        Faction::Antares => matches!(expertise, Electronics | Manufacturing),
        Faction::Benten => matches!(expertise, Chemistry | FuelRefining),
        Faction::Hortus => matches!(expertise, Agriculture | FoodIndustries),
        Faction::Moria => matches!(expertise, Construction | Metallurgy | ResourceExtraction),
    };
    favoured.then_some(0.01)
}

/// Faction and permit usage of the empire a plan belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmpireContext {
    pub faction: Faction,
    pub permits_used: u32,
    pub permits_total: u32,
}

impl EmpireContext {
    /// `2 × (3 − 2 × used/total)`. An empire with no permits counts as fully
    /// used.
    pub fn permit_multiplier(&self) -> f64 {
        let ratio = if self.permits_total == 0 {
            1.0
        } else {
            f64::from(self.permits_used) / f64::from(self.permits_total)
        };
        2.0 * (-2.0 * ratio + 3.0)
    }

    /// Efficiency factor for a building of `expertise`, if the faction
    /// favours it.
    pub fn faction_factor(&self, expertise: ExpertiseType) -> Option<f64> {
        faction_bonus(self.faction, expertise).map(|bonus| 1.0 + bonus * self.permit_multiplier())
    }
}

/// Looks up empires by id.
pub trait EmpireProvider {
    fn empire(&self, empire_id: &str) -> Option<&EmpireContext>;
}

impl EmpireProvider for HashMap<String, EmpireContext> {
    fn empire(&self, empire_id: &str) -> Option<&EmpireContext> {
        self.get(empire_id)
    }
}
