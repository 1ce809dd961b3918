//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use crate::empire::{EmpireContext, Faction};
use crate::extraction::ResourceType;
use crate::id::*;
use crate::plan::{Plan, PlanBuilding, PlanRecipe};
use crate::price::{
    CxPreferences, ExchangeEntry, ExchangePreference, MarketData, PlanetTickerPreferences,
    PreferenceType, TickerPreference, UNIVERSE_30D,
};
use crate::registry::*;

pub const HOME_PLANET: &str = "KW-688c";
pub const GAS_PLANET: &str = "OT-580a";
pub const SAMPLE_CX: &str = "cx-1";

pub const SMELT_FE: &str = "6xFEO 1xC=>3xFE";
pub const PREFAB_BSE: &str = "2xLST=>1xBSE";
pub const PREFAB_BBH: &str = "1xFE 1xLST=>1xBBH";
pub const GROW_GRN: &str = "4xH2O=>4xGRN";

// ===========================================================================
// Materials
// ===========================================================================

/// `(ticker, category, weight, volume, universe price)`
const MATERIALS: &[(&str, &str, f64, f64, f64)] = &[
    // consumables
    ("DW", "consumables (basic)", 0.1, 0.1, 70.0),
    ("RAT", "consumables (basic)", 0.21, 0.1, 110.0),
    ("OVE", "consumables (basic)", 0.02, 0.025, 90.0),
    ("EXO", "consumables (basic)", 0.1, 0.025, 250.0),
    ("PT", "consumables (basic)", 0.25, 0.5, 200.0),
    ("COF", "consumables (luxury)", 0.1, 0.1, 450.0),
    ("PWO", "consumables (luxury)", 0.05, 0.05, 290.0),
    ("KOM", "consumables (luxury)", 0.1, 0.1, 600.0),
    ("REP", "consumables (luxury)", 0.002, 0.002, 1_100.0),
    // construction
    ("BSE", "construction prefabs", 0.3, 0.5, 1_300.0),
    ("BBH", "construction prefabs", 0.5, 0.8, 1_600.0),
    ("BDE", "construction prefabs", 0.1, 1.5, 1_400.0),
    ("MCG", "construction materials", 0.24, 0.1, 16.0),
    ("AEF", "construction parts", 1.5, 1.5, 900.0),
    ("MGC", "construction parts", 0.6, 0.9, 1_700.0),
    ("BL", "construction parts", 1.0, 2.0, 5_500.0),
    ("SEA", "construction materials", 0.15, 0.07, 300.0),
    ("HSE", "construction parts", 2.0, 3.0, 6_000.0),
    ("INS", "construction materials", 0.06, 0.1, 150.0),
    ("TSH", "construction parts", 2.4, 1.5, 7_000.0),
    // production
    ("FEO", "ores", 5.9, 1.0, 110.0),
    ("FE", "metals", 7.8, 1.0, 400.0),
    ("C", "elements", 2.25, 1.0, 150.0),
    ("LST", "minerals", 2.73, 1.0, 110.0),
    ("H2O", "liquids", 0.2, 0.2, 40.0),
    ("GRN", "agricultural products", 0.9, 0.9, 80.0),
    ("NE", "gases", 0.0009, 0.001, 330.0),
];

fn material(ticker: &str, category: &str, weight: f64, volume: f64) -> Material {
    Material {
        ticker: ticker.to_string(),
        name: ticker.to_lowercase(),
        category: category.to_string(),
        weight,
        volume,
    }
}

// ===========================================================================
// Buildings
// ===========================================================================

fn amounts(list: &[(&str, f64)]) -> Vec<MaterialAmount> {
    list.iter().map(|&(t, a)| MaterialAmount::new(t, a)).collect()
}

fn infrastructure(
    ticker: &str,
    area_cost: u32,
    habitation: Option<PerWorkforce<u32>>,
    construction: &[(&str, f64)],
) -> Building {
    Building {
        ticker: ticker.to_string(),
        name: ticker.to_lowercase(),
        building_type: BuildingType::Infrastructure,
        expertise: None,
        area_cost,
        workforce: PerWorkforce::default(),
        habitation,
        construction_materials: amounts(construction),
    }
}

fn production(
    ticker: &str,
    expertise: ExpertiseType,
    area_cost: u32,
    pioneers: u32,
    construction: &[(&str, f64)],
) -> Building {
    Building {
        ticker: ticker.to_string(),
        name: ticker.to_lowercase(),
        building_type: BuildingType::Production,
        expertise: Some(expertise),
        area_cost,
        workforce: PerWorkforce {
            pioneer: pioneers,
            ..Default::default()
        },
        habitation: None,
        construction_materials: amounts(construction),
    }
}

fn recipe(id: &str, building: &str, inputs: &[(&str, f64)], outputs: &[(&str, f64)], hours: f64) -> Recipe {
    Recipe {
        recipe_id: id.to_string(),
        building_ticker: building.to_string(),
        inputs: amounts(inputs),
        outputs: amounts(outputs),
        time_ms: hours * 3_600_000.0,
    }
}

// ===========================================================================
// Planets
// ===========================================================================

fn deposit(ticker: &str, resource_type: ResourceType, daily_extraction: f64) -> PlanetResource {
    PlanetResource {
        ticker: ticker.to_string(),
        resource_type,
        daily_extraction,
    }
}

/// A temperate rocky planet with iron ore and water.
pub fn home_planet() -> Planet {
    Planet {
        planet_id: HOME_PLANET.to_string(),
        name: "Etherwind".to_string(),
        surface: true,
        gravity: 0.96,
        pressure: 0.94,
        temperature: 22.5,
        fertility: 0.05,
        resources: vec![
            deposit("FEO", ResourceType::Mineral, 22.3),
            deposit("H2O", ResourceType::Liquid, 14.5),
        ],
        cogc_program: CogcProgram::None,
    }
}

/// A cold, low-gravity gas giant with only neon.
pub fn gas_planet() -> Planet {
    Planet {
        planet_id: GAS_PLANET.to_string(),
        name: "Boreas".to_string(),
        surface: false,
        gravity: 0.18,
        pressure: 2.4,
        temperature: -58.0,
        fertility: -1.0,
        resources: vec![deposit("NE", ResourceType::Gaseous, 9.1)],
        cogc_program: CogcProgram::Advertising(ExpertiseType::Chemistry),
    }
}

// ===========================================================================
// Registry
// ===========================================================================

/// A small but complete game-data set: housing, a smelter, a prefab plant
/// with two recipes, a farm and a mineral extractor.
pub fn sample_registry() -> Registry {
    let mut b = RegistryBuilder::new();
    for &(ticker, category, weight, volume, _) in MATERIALS {
        b.register_material(material(ticker, category, weight, volume));
    }

    b.register_building(infrastructure(
        "HB1",
        10,
        Some(PerWorkforce {
            pioneer: 100,
            ..Default::default()
        }),
        &[("BSE", 4.0), ("BDE", 2.0)],
    ))
    .register_building(infrastructure(
        "HBB",
        14,
        Some(PerWorkforce {
            pioneer: 75,
            settler: 75,
            ..Default::default()
        }),
        &[("BBH", 4.0), ("BSE", 2.0)],
    ))
    .register_building(infrastructure("STO", 9, None, &[("BSE", 6.0)]))
    .register_building(production(
        "SME",
        ExpertiseType::Metallurgy,
        17,
        50,
        &[("BSE", 6.0)],
    ))
    .register_building(production(
        "PP1",
        ExpertiseType::Construction,
        19,
        80,
        &[("BBH", 4.0), ("BSE", 3.0)],
    ))
    .register_building(production(
        "FRM",
        ExpertiseType::Agriculture,
        30,
        50,
        &[("BBH", 4.0), ("BSE", 4.0)],
    ))
    .register_building(production(
        "EXT",
        ExpertiseType::ResourceExtraction,
        25,
        60,
        &[("BSE", 4.0), ("BBH", 4.0)],
    ));

    b.register_recipe(recipe(SMELT_FE, "SME", &[("FEO", 6.0), ("C", 1.0)], &[("FE", 3.0)], 6.0))
        .register_recipe(recipe(PREFAB_BSE, "PP1", &[("LST", 2.0)], &[("BSE", 1.0)], 3.6))
        .register_recipe(recipe(
            PREFAB_BBH,
            "PP1",
            &[("FE", 1.0), ("LST", 1.0)],
            &[("BBH", 1.0)],
            4.8,
        ))
        .register_recipe(recipe(GROW_GRN, "FRM", &[("H2O", 4.0)], &[("GRN", 4.0)], 6.0));

    b.register_planet(home_planet()).register_planet(gas_planet());

    // The fixture tables above are consistent, so building cannot fail.
    b.build().unwrap()
}

// ===========================================================================
// Market
// ===========================================================================

fn quote(ticker: &str, exchange_code: &str, ask: Option<f64>, bid: Option<f64>, average: f64) -> ExchangeEntry {
    ExchangeEntry {
        ticker: ticker.to_string(),
        exchange_code: exchange_code.to_string(),
        ask,
        bid,
        price_average: average,
        supply: 1_000.0,
        demand: 1_000.0,
    }
}

/// Universe averages for every sample material, AI1 quotes for iron, and
/// one CX ([`SAMPLE_CX`]) that trades on AI1 and fixes drinking water on the
/// home planet.
pub fn sample_market() -> MarketData {
    let mut market = MarketData::new();
    for &(ticker, _, _, _, price) in MATERIALS {
        market.insert_exchange(quote(ticker, UNIVERSE_30D, None, None, price));
    }
    market
        .insert_exchange(quote("FE", "AI1", Some(420.0), Some(385.0), 401.0))
        .insert_exchange(quote("FEO", "AI1", Some(115.0), Some(104.0), 109.0));

    market.insert_preferences(CxPreferences {
        id: SAMPLE_CX.to_string(),
        name: "AI1 trading".to_string(),
        empire_tickers: Vec::new(),
        planet_tickers: vec![PlanetTickerPreferences {
            planet_id: HOME_PLANET.to_string(),
            preferences: vec![TickerPreference {
                ticker: "DW".to_string(),
                preference_type: PreferenceType::Buy,
                value: 55.0,
            }],
        }],
        empire_exchanges: vec![
            ExchangePreference {
                preference_type: PreferenceType::Buy,
                exchange: "AI1_BUY".to_string(),
            },
            ExchangePreference {
                preference_type: PreferenceType::Sell,
                exchange: "AI1_SELL".to_string(),
            },
        ],
        planet_exchanges: Vec::new(),
    });
    market
}

// ===========================================================================
// Plans
// ===========================================================================

pub fn sample_empire() -> EmpireContext {
    EmpireContext {
        faction: Faction::Antares,
        permits_used: 1,
        permits_total: 2,
    }
}

/// A base on the home planet with nothing installed.
pub fn empty_plan() -> Plan {
    Plan::new(HOME_PLANET, sample_empire())
}

/// Two housed smelters fed by one iron-ore extractor.
pub fn sample_plan() -> Plan {
    let mut plan = empty_plan();
    plan.rename("Iron works");
    plan.set_permits(2);
    plan.set_expert(ExpertiseType::Metallurgy, 1);
    plan.set_infrastructure(InfrastructureType::Hb1, 2);
    plan.data.buildings = vec![
        PlanBuilding {
            name: "SME".to_string(),
            amount: 2,
            active_recipes: vec![PlanRecipe {
                recipe_id: SMELT_FE.to_string(),
                amount: 1,
            }],
        },
        PlanBuilding {
            name: "EXT".to_string(),
            amount: 1,
            active_recipes: vec![PlanRecipe {
                recipe_id: "EXT#FEO".to_string(),
                amount: 1,
            }],
        },
    ];
    plan
}
