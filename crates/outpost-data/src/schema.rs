//! Serde data file structs for game content definitions.
//!
//! These structs define the on-disk format for materials, buildings,
//! recipes, planets and empires. They are deserialized from RON, JSON, or
//! TOML data files and then resolved into core types by the loader.
//! References between files (material tickers, building tickers) and closed
//! key names (workforce types, expertise, resource types) stay strings here
//! so the loader can report what failed to resolve and where.
//!
//! Exchange quotes and CX preferences have no references to resolve and are
//! read straight into [`outpost_core::price`] types.

use serde::Deserialize;
use std::collections::BTreeMap;

// ===========================================================================
// Materials
// ===========================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct MaterialData {
    pub ticker: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    pub weight: f64,
    pub volume: f64,
}

// ===========================================================================
// Buildings
// ===========================================================================

/// A material amount, either as a `("TICKER", amount)` tuple or spelled out.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AmountData {
    Short(String, f64),
    Full { ticker: String, amount: f64 },
}

impl AmountData {
    pub fn ticker(&self) -> &str {
        match self {
            AmountData::Short(ticker, _) | AmountData::Full { ticker, .. } => ticker,
        }
    }

    pub fn amount(&self) -> f64 {
        match self {
            AmountData::Short(_, amount) | AmountData::Full { amount, .. } => *amount,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BuildingData {
    pub ticker: String,
    #[serde(default)]
    pub name: String,
    /// `INFRASTRUCTURE`, `PLANETARY` or `PRODUCTION`.
    #[serde(rename = "type")]
    pub building_type: String,
    #[serde(default)]
    pub expertise: Option<String>,
    pub area_cost: u32,
    /// Headcount keyed by workforce type name (`PIONEER`, ...).
    #[serde(default)]
    pub workforce: BTreeMap<String, u32>,
    /// Beds keyed by workforce type name. Habitation modules only.
    #[serde(default)]
    pub habitation: Option<BTreeMap<String, u32>>,
    #[serde(default)]
    pub construction_materials: Vec<AmountData>,
}

// ===========================================================================
// Recipes
// ===========================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct RecipeData {
    pub recipe_id: String,
    pub building: String,
    #[serde(default)]
    pub inputs: Vec<AmountData>,
    pub outputs: Vec<AmountData>,
    /// Nominal batch duration in milliseconds.
    pub time_ms: f64,
}

// ===========================================================================
// Planets
// ===========================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct PlanetResourceData {
    pub ticker: String,
    /// `MINERAL`, `GASEOUS` or `LIQUID`.
    #[serde(rename = "type")]
    pub resource_type: String,
    pub daily_extraction: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlanetData {
    pub planet_id: String,
    #[serde(default)]
    pub name: String,
    pub surface: bool,
    pub gravity: f64,
    pub pressure: f64,
    pub temperature: f64,
    #[serde(default = "infertile")]
    pub fertility: f64,
    #[serde(default)]
    pub resources: Vec<PlanetResourceData>,
    /// Raw COGC program string; absent means no program.
    #[serde(default)]
    pub cogc_program: Option<String>,
}

fn infertile() -> f64 {
    -1.0
}

// ===========================================================================
// Empires
// ===========================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct EmpireData {
    pub empire_id: String,
    /// `ANTARES`, `BENTEN`, `HORTUS` or `MORIA`.
    pub faction: String,
    pub permits_used: u32,
    pub permits_total: u32,
}
