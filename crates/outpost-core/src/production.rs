//! Production buildings: active recipe scheduling, daily material flow, and
//! per-recipe economics.

use crate::MS_PER_DAY;
use crate::efficiency::{Efficiency, EfficiencyContext, building_efficiency};
use crate::extraction::{ResourceType, extraction_recipes};
use crate::id::PerWorkforce;
use crate::material_io::{MaterialIoMinimal, combine};
use crate::plan::PlanBuilding;
use crate::price::{MarketDataProvider, PriceDirection, PriceResolver};
use crate::registry::{Building, GameDataProvider, MaterialAmount, Planet, Recipe, RegistryError};
use crate::workforce::{Luxuries, building_workforce_materials};
use serde::Serialize;

/// An active recipe assignment after efficiency adjustment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveRecipe {
    pub recipe_id: String,
    /// Parallel batches per cycle.
    pub amount: u32,
    /// `nominal × amount ÷ efficiency`; infinite at zero efficiency.
    pub time_ms: f64,
    /// Share of the building's cycle spent on this recipe.
    pub daily_share: f64,
    pub recipe: Recipe,
}

/// A recipe the building could run, with projected economics for one building.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeOption {
    pub recipe: Recipe,
    pub runs_per_day: f64,
    pub daily_revenue: f64,
    /// Days until construction cost is recovered. Infinite when the recipe
    /// never pays back.
    pub roi: f64,
    /// Cost per produced unit; `None` when nothing is produced.
    pub cogm: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductionBuilding {
    pub ticker: String,
    pub amount: u32,
    pub active_recipes: Vec<ActiveRecipe>,
    pub recipe_options: Vec<RecipeOption>,
    pub efficiency: Efficiency,
    /// Sum of the active recipes' adjusted times.
    pub total_batch_time: f64,
    pub daily_cycles: f64,
    /// Per single building, including planet environment materials.
    pub construction_materials: Vec<MaterialAmount>,
    pub construction_cost: f64,
    /// Daily crew consumption of one building.
    pub workforce_materials: Vec<MaterialAmount>,
    pub workforce_daily_cost: f64,
    /// Daily flow of all installed copies.
    pub material_io: Vec<MaterialIoMinimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductionResult {
    pub buildings: Vec<ProductionBuilding>,
    pub material_io: Vec<MaterialIoMinimal>,
}

/// Everything production needs besides the plan's building list.
#[derive(Clone, Copy)]
pub struct ProductionContext<'a> {
    pub game: &'a dyn GameDataProvider,
    pub market: &'a dyn MarketDataProvider,
    pub efficiency: EfficiencyContext<'a>,
    pub luxuries: &'a PerWorkforce<Luxuries>,
    pub depreciation_days: f64,
}

// ---------------------------------------------------------------------------
// Recipes
// ---------------------------------------------------------------------------

/// Recipes a building can run on a planet. Extractors get one synthetic
/// recipe per matching deposit.
pub fn recipe_options(
    game: &dyn GameDataProvider,
    building_ticker: &str,
    planet: &Planet,
) -> Result<Vec<Recipe>, RegistryError> {
    game.building(building_ticker)?;
    if ResourceType::from_extractor(building_ticker).is_some() {
        return Ok(extraction_recipes(building_ticker, planet));
    }
    Ok(game.recipes_for_building(building_ticker)?.to_vec())
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

/// Extra materials the planet's environment demands for a building of `area`.
pub fn planet_construction_materials(planet: &Planet, area: u32) -> Vec<MaterialAmount> {
    let area = f64::from(area);
    let mut materials = Vec::new();

    if planet.surface {
        materials.push(MaterialAmount::new("MCG", area * 4.0));
    } else {
        materials.push(MaterialAmount::new("AEF", (area / 3.0).ceil()));
    }

    if planet.gravity < 0.25 {
        materials.push(MaterialAmount::new("MGC", 1.0));
    } else if planet.gravity > 2.5 {
        materials.push(MaterialAmount::new("BL", 1.0));
    }

    if planet.pressure < 0.25 {
        materials.push(MaterialAmount::new("SEA", area));
    } else if planet.pressure > 2.0 {
        materials.push(MaterialAmount::new("HSE", 1.0));
    }

    if planet.temperature < -25.0 {
        materials.push(MaterialAmount::new("INS", area * 10.0));
    } else if planet.temperature > 75.0 {
        materials.push(MaterialAmount::new("TSH", 1.0));
    }

    materials
}

/// Building and environment materials merged by ticker.
pub fn construction_materials(building: &Building, planet: &Planet) -> Vec<MaterialAmount> {
    let lines: Vec<MaterialIoMinimal> = building
        .construction_materials
        .iter()
        .chain(planet_construction_materials(planet, building.area_cost).iter())
        .map(|m| MaterialIoMinimal::consumed(&m.ticker, m.amount))
        .collect();
    combine(&[lines.as_slice()])
        .into_iter()
        .map(|line| MaterialAmount {
            ticker: line.ticker,
            amount: line.input,
        })
        .collect()
}

/// Σ amount × BUY price.
pub fn buy_cost(
    materials: &[MaterialAmount],
    prices: &mut PriceResolver,
    market: &dyn MarketDataProvider,
) -> f64 {
    materials
        .iter()
        .map(|m| m.amount * prices.price(market, &m.ticker, PriceDirection::Buy))
        .sum()
}

fn sell_value(
    materials: &[MaterialAmount],
    prices: &mut PriceResolver,
    market: &dyn MarketDataProvider,
) -> f64 {
    materials
        .iter()
        .map(|m| m.amount * prices.price(market, &m.ticker, PriceDirection::Sell))
        .sum()
}

// ---------------------------------------------------------------------------
// Buildings
// ---------------------------------------------------------------------------

struct BuildingCosts {
    construction: f64,
    workforce_daily: f64,
    depreciation_days: f64,
}

fn recipe_option(
    recipe: &Recipe,
    efficiency: f64,
    costs: &BuildingCosts,
    prices: &mut PriceResolver,
    market: &dyn MarketDataProvider,
) -> RecipeOption {
    let runs_per_day = if recipe.time_ms > 0.0 {
        MS_PER_DAY * efficiency / recipe.time_ms
    } else {
        0.0
    };

    let input_cost = buy_cost(&recipe.inputs, prices, market);
    let output_value = sell_value(&recipe.outputs, prices, market);
    let depreciation = costs.construction / costs.depreciation_days;

    let daily_revenue =
        runs_per_day * (output_value - input_cost) - depreciation - costs.workforce_daily;
    let roi = if daily_revenue > 0.0 {
        costs.construction / daily_revenue
    } else {
        f64::INFINITY
    };

    let daily_output: f64 = runs_per_day * recipe.outputs.iter().map(|m| m.amount).sum::<f64>();
    let cogm = (daily_output > 0.0).then(|| {
        (runs_per_day * input_cost + depreciation + costs.workforce_daily) / daily_output
    });

    RecipeOption {
        recipe: recipe.clone(),
        runs_per_day,
        daily_revenue,
        roi,
        cogm,
    }
}

pub fn calculate_building(
    plan_building: &PlanBuilding,
    ctx: &ProductionContext<'_>,
    prices: &mut PriceResolver,
) -> Result<ProductionBuilding, RegistryError> {
    let building = ctx.game.building(&plan_building.name)?;
    let planet = ctx.efficiency.planet;
    let efficiency = building_efficiency(building, &ctx.efficiency);

    let construction_materials = construction_materials(building, planet);
    let workforce_materials = building_workforce_materials(building, ctx.luxuries);
    let costs = BuildingCosts {
        construction: buy_cost(&construction_materials, prices, ctx.market),
        workforce_daily: buy_cost(&workforce_materials, prices, ctx.market),
        depreciation_days: ctx.depreciation_days,
    };

    let options = recipe_options(ctx.game, &building.ticker, planet)?;

    let mut active_recipes = plan_building
        .active_recipes
        .iter()
        .map(|active| {
            let recipe = options
                .iter()
                .find(|r| r.recipe_id == active.recipe_id)
                .ok_or_else(|| RegistryError::not_loaded("recipe", &active.recipe_id))?;
            let time_ms = if efficiency.total > 0.0 {
                recipe.time_ms * f64::from(active.amount) / efficiency.total
            } else {
                f64::INFINITY
            };
            Ok(ActiveRecipe {
                recipe_id: active.recipe_id.clone(),
                amount: active.amount,
                time_ms,
                daily_share: 0.0,
                recipe: recipe.clone(),
            })
        })
        .collect::<Result<Vec<_>, RegistryError>>()?;

    let total_batch_time: f64 = active_recipes.iter().map(|r| r.time_ms).sum();
    let running = total_batch_time.is_finite() && total_batch_time > 0.0;

    let mut daily_cycles = 0.0;
    let mut material_io = Vec::new();
    if running {
        daily_cycles = MS_PER_DAY * f64::from(plan_building.amount) / total_batch_time;
        let mut lines = Vec::new();
        for active in &mut active_recipes {
            active.daily_share = active.time_ms / total_batch_time;
            let runs = f64::from(active.amount) * daily_cycles;
            lines.extend(
                active
                    .recipe
                    .inputs
                    .iter()
                    .map(|m| MaterialIoMinimal::consumed(&m.ticker, m.amount * runs)),
            );
            lines.extend(
                active
                    .recipe
                    .outputs
                    .iter()
                    .map(|m| MaterialIoMinimal::produced(&m.ticker, m.amount * runs)),
            );
        }
        material_io = combine(&[lines.as_slice()]);
    }

    let recipe_options = options
        .iter()
        .map(|recipe| recipe_option(recipe, efficiency.total, &costs, prices, ctx.market))
        .collect();

    log::debug!(
        "{} x{}: efficiency {:.4}, {:.3} cycles/day",
        building.ticker,
        plan_building.amount,
        efficiency.total,
        daily_cycles
    );

    Ok(ProductionBuilding {
        ticker: building.ticker.clone(),
        amount: plan_building.amount,
        active_recipes,
        recipe_options,
        efficiency,
        total_batch_time,
        daily_cycles,
        construction_materials,
        construction_cost: costs.construction,
        workforce_materials,
        workforce_daily_cost: costs.workforce_daily,
        material_io,
    })
}

pub fn calculate_production(
    buildings: &[PlanBuilding],
    ctx: &ProductionContext<'_>,
    prices: &mut PriceResolver,
) -> Result<ProductionResult, RegistryError> {
    let buildings = buildings
        .iter()
        .map(|b| calculate_building(b, ctx, prices))
        .collect::<Result<Vec<_>, RegistryError>>()?;
    let ledgers: Vec<&[MaterialIoMinimal]> =
        buildings.iter().map(|b| b.material_io.as_slice()).collect();
    let material_io = combine(&ledgers);
    Ok(ProductionResult {
        buildings,
        material_io,
    })
}
