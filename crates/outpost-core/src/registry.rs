//! Static game data: materials, buildings, recipes and planets, plus the
//! provider seam the engine reads them through.

use crate::extraction::ResourceType;
use crate::id::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A quantity of one material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialAmount {
    pub ticker: String,
    pub amount: f64,
}

impl MaterialAmount {
    pub fn new(ticker: &str, amount: f64) -> Self {
        Self {
            ticker: ticker.to_string(),
            amount,
        }
    }
}

/// A tradeable material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub ticker: String,
    pub name: String,
    pub category: String,
    /// Tonnes per unit.
    pub weight: f64,
    /// Cubic metres per unit.
    pub volume: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuildingType {
    Infrastructure,
    Planetary,
    Production,
}

/// A building template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub ticker: String,
    pub name: String,
    pub building_type: BuildingType,
    pub expertise: Option<ExpertiseType>,
    pub area_cost: u32,
    /// Headcount required per workforce type to run one building.
    pub workforce: PerWorkforce<u32>,
    /// Beds provided per workforce type; habitation modules only.
    pub habitation: Option<PerWorkforce<u32>>,
    pub construction_materials: Vec<MaterialAmount>,
}

impl Building {
    pub fn total_workforce(&self) -> u32 {
        self.workforce.iter().map(|(_, &n)| n).sum()
    }
}

/// A production recipe. Inputs and outputs keep the order of the game data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub recipe_id: String,
    pub building_ticker: String,
    pub inputs: Vec<MaterialAmount>,
    pub outputs: Vec<MaterialAmount>,
    /// Nominal duration of one batch in milliseconds.
    pub time_ms: f64,
}

/// A resource deposit on a planet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetResource {
    pub ticker: String,
    pub resource_type: ResourceType,
    /// Units per day one extractor yields at full efficiency.
    pub daily_extraction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Planet {
    pub planet_id: String,
    pub name: String,
    /// Rocky planets have a surface; gas giants don't.
    pub surface: bool,
    pub gravity: f64,
    pub pressure: f64,
    pub temperature: f64,
    /// `-1.0` marks an infertile planet.
    pub fertility: f64,
    pub resources: Vec<PlanetResource>,
    pub cogc_program: CogcProgram,
}

// ===========================================================================
// Provider seam
// ===========================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("{kind} '{key}' not loaded")]
    NotLoaded { kind: &'static str, key: String },
}

impl RegistryError {
    pub fn not_loaded(kind: &'static str, key: &str) -> Self {
        RegistryError::NotLoaded {
            kind,
            key: key.to_string(),
        }
    }
}

/// Read access to static game data. Unknown keys are an error, never a default.
pub trait GameDataProvider {
    fn material(&self, ticker: &str) -> Result<&Material, RegistryError>;

    fn building(&self, ticker: &str) -> Result<&Building, RegistryError>;

    /// Recipes a building can run. Empty for known buildings without recipes
    /// (extractors derive theirs from the planet).
    fn recipes_for_building(&self, ticker: &str) -> Result<&[Recipe], RegistryError>;

    fn planet(&self, planet_id: &str) -> Result<&Planet, RegistryError>;
}

// ===========================================================================
// In-memory registry
// ===========================================================================

/// Collects game data and validates cross references on [`build`](Self::build).
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    materials: HashMap<String, Material>,
    buildings: HashMap<String, Building>,
    recipes: Vec<Recipe>,
    planets: HashMap<String, Planet>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a material, replacing any previous one with the same ticker.
    pub fn register_material(&mut self, material: Material) -> &mut Self {
        self.materials.insert(material.ticker.clone(), material);
        self
    }

    pub fn register_building(&mut self, building: Building) -> &mut Self {
        self.buildings.insert(building.ticker.clone(), building);
        self
    }

    pub fn register_recipe(&mut self, recipe: Recipe) -> &mut Self {
        self.recipes.push(recipe);
        self
    }

    pub fn register_planet(&mut self, planet: Planet) -> &mut Self {
        self.planets.insert(planet.planet_id.clone(), planet);
        self
    }

    pub fn has_material(&self, ticker: &str) -> bool {
        self.materials.contains_key(ticker)
    }

    pub fn has_building(&self, ticker: &str) -> bool {
        self.buildings.contains_key(ticker)
    }

    /// Freeze the registry. Every material a building or recipe references,
    /// and every building a recipe runs in, must be registered.
    pub fn build(self) -> Result<Registry, RegistryError> {
        for building in self.buildings.values() {
            for entry in &building.construction_materials {
                if !self.materials.contains_key(&entry.ticker) {
                    return Err(RegistryError::not_loaded("material", &entry.ticker));
                }
            }
        }

        let mut recipes: HashMap<String, Vec<Recipe>> = self
            .buildings
            .keys()
            .map(|ticker| (ticker.clone(), Vec::new()))
            .collect();

        for recipe in self.recipes {
            for entry in recipe.inputs.iter().chain(recipe.outputs.iter()) {
                if !self.materials.contains_key(&entry.ticker) {
                    return Err(RegistryError::not_loaded("material", &entry.ticker));
                }
            }
            recipes
                .get_mut(&recipe.building_ticker)
                .ok_or_else(|| RegistryError::not_loaded("building", &recipe.building_ticker))?
                .push(recipe);
        }

        Ok(Registry {
            materials: self.materials,
            buildings: self.buildings,
            recipes,
            planets: self.planets,
        })
    }
}

/// Immutable game data. Frozen after [`RegistryBuilder::build`].
#[derive(Debug)]
pub struct Registry {
    materials: HashMap<String, Material>,
    buildings: HashMap<String, Building>,
    recipes: HashMap<String, Vec<Recipe>>,
    planets: HashMap<String, Planet>,
}

impl Registry {
    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    pub fn building_count(&self) -> usize {
        self.buildings.len()
    }

    pub fn recipe_count(&self) -> usize {
        self.recipes.values().map(Vec::len).sum()
    }

    pub fn planet_count(&self) -> usize {
        self.planets.len()
    }

    /// All buildings of one type, sorted by ticker.
    pub fn buildings_of_type(&self, building_type: BuildingType) -> Vec<&Building> {
        let mut found: Vec<_> = self
            .buildings
            .values()
            .filter(|b| b.building_type == building_type)
            .collect();
        found.sort_by(|a, b| a.ticker.cmp(&b.ticker));
        found
    }
}

impl GameDataProvider for Registry {
    fn material(&self, ticker: &str) -> Result<&Material, RegistryError> {
        self.materials
            .get(ticker)
            .ok_or_else(|| RegistryError::not_loaded("material", ticker))
    }

    fn building(&self, ticker: &str) -> Result<&Building, RegistryError> {
        self.buildings
            .get(ticker)
            .ok_or_else(|| RegistryError::not_loaded("building", ticker))
    }

    fn recipes_for_building(&self, ticker: &str) -> Result<&[Recipe], RegistryError> {
        self.recipes
            .get(ticker)
            .map(Vec::as_slice)
            .ok_or_else(|| RegistryError::not_loaded("building", ticker))
    }

    fn planet(&self, planet_id: &str) -> Result<&Planet, RegistryError> {
        self.planets
            .get(planet_id)
            .ok_or_else(|| RegistryError::not_loaded("planet", planet_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn material(ticker: &str) -> Material {
        Material {
            ticker: ticker.to_string(),
            name: ticker.to_lowercase(),
            category: "test".to_string(),
            weight: 1.0,
            volume: 1.0,
        }
    }

    fn smelter() -> Building {
        Building {
            ticker: "SME".to_string(),
            name: "smelter".to_string(),
            building_type: BuildingType::Production,
            expertise: Some(ExpertiseType::Metallurgy),
            area_cost: 17,
            workforce: PerWorkforce {
                pioneer: 50,
                ..Default::default()
            },
            habitation: None,
            construction_materials: vec![MaterialAmount::new("BSE", 6.0)],
        }
    }

    fn smelt_iron() -> Recipe {
        Recipe {
            recipe_id: "6xFEO=>3xFE".to_string(),
            building_ticker: "SME".to_string(),
            inputs: vec![MaterialAmount::new("FEO", 6.0)],
            outputs: vec![MaterialAmount::new("FE", 3.0)],
            time_ms: 21_600_000.0,
        }
    }

    fn setup_builder() -> RegistryBuilder {
        let mut b = RegistryBuilder::new();
        b.register_material(material("FEO"))
            .register_material(material("FE"))
            .register_material(material("BSE"))
            .register_building(smelter())
            .register_recipe(smelt_iron());
        b
    }

    #[test]
    fn register_and_build() {
        let reg = setup_builder().build().unwrap();
        assert_eq!(reg.material_count(), 3);
        assert_eq!(reg.building_count(), 1);
        assert_eq!(reg.recipe_count(), 1);
        assert_eq!(reg.planet_count(), 0);
    }

    #[test]
    fn recipes_are_grouped_by_building() {
        let reg = setup_builder().build().unwrap();
        let recipes = reg.recipes_for_building("SME").unwrap();
        assert_eq!(recipes.len(), 1);
        assert_eq!(recipes[0].recipe_id, "6xFEO=>3xFE");
    }

    #[test]
    fn unknown_keys_are_not_loaded_errors() {
        let reg = setup_builder().build().unwrap();
        let err = reg.building("PP1").unwrap_err();
        assert_eq!(err, RegistryError::not_loaded("building", "PP1"));
        assert_eq!(err.to_string(), "building 'PP1' not loaded");
        assert!(reg.material("XYZ").is_err());
        assert!(reg.planet("KW-688c").is_err());
        assert!(reg.recipes_for_building("PP1").is_err());
    }

    #[test]
    fn build_rejects_recipe_with_unknown_material() {
        let mut b = setup_builder();
        let mut recipe = smelt_iron();
        recipe.outputs.push(MaterialAmount::new("SLAG", 1.0));
        b.register_recipe(recipe);
        assert!(matches!(
            b.build(),
            Err(RegistryError::NotLoaded { kind: "material", ref key }) if key == "SLAG"
        ));
    }

    #[test]
    fn build_rejects_recipe_for_unknown_building() {
        let mut b = setup_builder();
        let mut recipe = smelt_iron();
        recipe.building_ticker = "FRM".to_string();
        b.register_recipe(recipe);
        assert!(matches!(
            b.build(),
            Err(RegistryError::NotLoaded { kind: "building", .. })
        ));
    }

    #[test]
    fn build_rejects_unknown_construction_material() {
        let mut b = RegistryBuilder::new();
        b.register_building(smelter());
        assert!(b.build().is_err());
    }

    #[test]
    fn total_workforce_sums_all_tiers() {
        let mut building = smelter();
        building.workforce.settler = 20;
        assert_eq!(building.total_workforce(), 70);
    }
}
