//! The editable plan definition and the validated mutations over it.

use crate::empire::{EmpireContext, EmpireProvider, Faction};
use crate::id::{
    CogcProgram, ExpertiseType, InfrastructureType, PerExpertise, PerInfrastructure, PerWorkforce,
    WorkforceType,
};
use crate::production::recipe_options;
use crate::registry::{BuildingType, GameDataProvider, RegistryError};
use crate::workforce::{Luxuries, LuxuryTier};
use serde::{Deserialize, Serialize};

pub const MIN_PERMITS: u8 = 1;
pub const MAX_PERMITS: u8 = 3;
pub const MAX_EXPERTS: u8 = 5;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    #[error("{what} index {index} out of range")]
    IndexOutOfRange { what: &'static str, index: usize },
    #[error("building '{building}' has no recipe options")]
    NoRecipeOptions { building: String },
    #[error("building '{0}' is not a production building")]
    NotProduction(String),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// `amount` parallel batches of one recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRecipe {
    pub recipe_id: String,
    pub amount: u32,
}

/// An installed production building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanBuilding {
    /// Building ticker.
    pub name: String,
    pub amount: u32,
    #[serde(default)]
    pub active_recipes: Vec<PlanRecipe>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanPlanet {
    pub planet_id: String,
    pub permits: u8,
    #[serde(default)]
    pub corphq: bool,
    #[serde(default)]
    pub cogc: CogcProgram,
    #[serde(default)]
    pub experts: PerExpertise<u8>,
    #[serde(default)]
    pub workforce: PerWorkforce<Luxuries>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanData {
    pub planet: PlanPlanet,
    #[serde(default)]
    pub infrastructure: PerInfrastructure<u32>,
    #[serde(default)]
    pub buildings: Vec<PlanBuilding>,
}

impl PlanData {
    pub fn new(planet_id: &str) -> Self {
        Self {
            planet: PlanPlanet {
                planet_id: planet_id.to_string(),
                permits: MIN_PERMITS,
                corphq: false,
                cogc: CogcProgram::None,
                experts: PerExpertise::default(),
                workforce: PerWorkforce::default(),
            },
            infrastructure: PerInfrastructure::default(),
            buildings: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmpireMembership {
    pub empire_id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    /// Assigned by the persistence layer on first save.
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub planet_id: String,
    pub faction: Faction,
    pub permits_used: u32,
    pub permits_total: u32,
    /// Use this plan's own faction and permits even when it belongs to an empire.
    #[serde(default)]
    pub override_empire: bool,
    pub data: PlanData,
    #[serde(default)]
    pub empires: Vec<EmpireMembership>,
}

impl Plan {
    pub fn new(planet_id: &str, empire: EmpireContext) -> Self {
        Self {
            uuid: None,
            name: None,
            planet_id: planet_id.to_string(),
            faction: empire.faction,
            permits_used: empire.permits_used,
            permits_total: empire.permits_total,
            override_empire: false,
            data: PlanData::new(planet_id),
            empires: Vec::new(),
        }
    }

    /// The plan's own faction and permit snapshot.
    pub fn empire_snapshot(&self) -> EmpireContext {
        EmpireContext {
            faction: self.faction,
            permits_used: self.permits_used,
            permits_total: self.permits_total,
        }
    }

    /// Empire the plan is evaluated under: the snapshot when overridden,
    /// else the first membership the provider knows, else the snapshot.
    pub fn empire_context(&self, provider: &dyn EmpireProvider) -> EmpireContext {
        if self.override_empire {
            return self.empire_snapshot();
        }
        self.empires
            .iter()
            .find_map(|m| provider.empire(&m.empire_id))
            .copied()
            .unwrap_or_else(|| self.empire_snapshot())
    }

    // -----------------------------------------------------------------------
    // Planet
    // -----------------------------------------------------------------------

    pub fn set_corphq(&mut self, corphq: bool) {
        self.data.planet.corphq = corphq;
    }

    pub fn set_cogc(&mut self, cogc: CogcProgram) {
        self.data.planet.cogc = cogc;
    }

    pub fn set_permits(&mut self, permits: i64) {
        self.data.planet.permits =
            permits.clamp(i64::from(MIN_PERMITS), i64::from(MAX_PERMITS)) as u8;
    }

    pub fn set_workforce_luxury(&mut self, workforce: WorkforceType, tier: LuxuryTier, enabled: bool) {
        self.data.planet.workforce[workforce].set(tier, enabled);
    }

    pub fn toggle_workforce_luxury(&mut self, workforce: WorkforceType, tier: LuxuryTier) {
        let luxuries = &mut self.data.planet.workforce[workforce];
        let enabled = !luxuries.get(tier);
        luxuries.set(tier, enabled);
    }

    pub fn set_expert(&mut self, expertise: ExpertiseType, amount: i64) {
        self.data.planet.experts[expertise] = amount.clamp(0, i64::from(MAX_EXPERTS)) as u8;
    }

    pub fn set_infrastructure(&mut self, infrastructure: InfrastructureType, amount: u32) {
        self.data.infrastructure[infrastructure] = amount;
    }

    pub fn rename(&mut self, name: &str) {
        let name = name.trim();
        if !name.is_empty() {
            self.name = Some(name.to_string());
        }
    }

    // -----------------------------------------------------------------------
    // Buildings
    // -----------------------------------------------------------------------

    fn building_mut(&mut self, index: usize) -> Result<&mut PlanBuilding, PlanError> {
        self.data
            .buildings
            .get_mut(index)
            .ok_or(PlanError::IndexOutOfRange {
                what: "building",
                index,
            })
    }

    fn recipe_mut(
        &mut self,
        building_index: usize,
        recipe_index: usize,
    ) -> Result<&mut PlanRecipe, PlanError> {
        self.building_mut(building_index)?
            .active_recipes
            .get_mut(recipe_index)
            .ok_or(PlanError::IndexOutOfRange {
                what: "recipe",
                index: recipe_index,
            })
    }

    fn production_ticker(game: &dyn GameDataProvider, ticker: &str) -> Result<String, PlanError> {
        let building = game.building(ticker)?;
        if building.building_type != BuildingType::Production {
            return Err(PlanError::NotProduction(ticker.to_string()));
        }
        Ok(building.ticker.clone())
    }

    /// Append one idle copy of a production building.
    pub fn add_building(&mut self, game: &dyn GameDataProvider, ticker: &str) -> Result<(), PlanError> {
        let name = Self::production_ticker(game, ticker)?;
        self.data.buildings.push(PlanBuilding {
            name,
            amount: 1,
            active_recipes: Vec::new(),
        });
        Ok(())
    }

    pub fn delete_building(&mut self, index: usize) -> Result<PlanBuilding, PlanError> {
        if index >= self.data.buildings.len() {
            return Err(PlanError::IndexOutOfRange {
                what: "building",
                index,
            });
        }
        Ok(self.data.buildings.remove(index))
    }

    /// Replace the building at `index` with another ticker. Its recipes
    /// belong to the old building and are dropped.
    pub fn change_building(
        &mut self,
        game: &dyn GameDataProvider,
        index: usize,
        ticker: &str,
    ) -> Result<(), PlanError> {
        let name = Self::production_ticker(game, ticker)?;
        let building = self.building_mut(index)?;
        building.name = name;
        building.active_recipes.clear();
        Ok(())
    }

    pub fn set_building_amount(&mut self, index: usize, amount: u32) -> Result<(), PlanError> {
        self.building_mut(index)?.amount = amount;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Recipes
    // -----------------------------------------------------------------------

    /// Activate the building's first recipe option with one batch.
    pub fn add_recipe(
        &mut self,
        game: &dyn GameDataProvider,
        building_index: usize,
    ) -> Result<(), PlanError> {
        let planet = game.planet(&self.data.planet.planet_id)?;
        let building = self.building_mut(building_index)?;
        let options = recipe_options(game, &building.name, planet)?;
        let first = options.first().ok_or_else(|| PlanError::NoRecipeOptions {
            building: building.name.clone(),
        })?;
        building.active_recipes.push(PlanRecipe {
            recipe_id: first.recipe_id.clone(),
            amount: 1,
        });
        Ok(())
    }

    pub fn delete_recipe(
        &mut self,
        building_index: usize,
        recipe_index: usize,
    ) -> Result<PlanRecipe, PlanError> {
        let building = self.building_mut(building_index)?;
        if recipe_index >= building.active_recipes.len() {
            return Err(PlanError::IndexOutOfRange {
                what: "recipe",
                index: recipe_index,
            });
        }
        Ok(building.active_recipes.remove(recipe_index))
    }

    /// Switch an active assignment to another recipe the building offers.
    pub fn change_recipe(
        &mut self,
        game: &dyn GameDataProvider,
        building_index: usize,
        recipe_index: usize,
        recipe_id: &str,
    ) -> Result<(), PlanError> {
        let planet = game.planet(&self.data.planet.planet_id)?;
        self.recipe_mut(building_index, recipe_index)?;
        let ticker = self.data.buildings[building_index].name.clone();
        let options = recipe_options(game, &ticker, planet)?;
        if options.is_empty() {
            return Err(PlanError::NoRecipeOptions { building: ticker });
        }
        if !options.iter().any(|r| r.recipe_id == recipe_id) {
            return Err(RegistryError::not_loaded("recipe", recipe_id).into());
        }
        self.recipe_mut(building_index, recipe_index)?.recipe_id = recipe_id.to_string();
        Ok(())
    }

    pub fn set_recipe_amount(
        &mut self,
        building_index: usize,
        recipe_index: usize,
        amount: u32,
    ) -> Result<(), PlanError> {
        self.recipe_mut(building_index, recipe_index)?.amount = amount;
        Ok(())
    }
}
