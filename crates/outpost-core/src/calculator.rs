//! Plan calculation: the pure pipeline from a [`Plan`] to a [`PlanResult`].
//!
//! Stages run in dependency order:
//!
//! 1. workforce (capacity from infrastructure, demand from production)
//! 2. area usage
//! 3. experts
//! 4. production, using the efficiency context built from 1 and 3
//! 5. the final ledger: workforce consumption combined with production,
//!    enhanced with weight/volume and priced

use crate::efficiency::{EfficiencyContext, ExpertElement, calculate_experts};
use crate::empire::{EmpireContext, EmpireProvider};
use crate::id::{CogcProgram, InfrastructureType, PerExpertise, PerInfrastructure, PerWorkforce};
use crate::material_io::{MaterialIo, MaterialIoMinimal, apply_prices, combine, enhance};
use crate::plan::Plan;
use crate::price::{MarketDataProvider, PriceResolver};
use crate::production::{
    ProductionContext, ProductionResult, buy_cost, calculate_production, construction_materials,
};
use crate::registry::{GameDataProvider, MaterialAmount, Planet, RegistryError};
use crate::workforce::{WorkforceElement, calculate_workforce, workforce_consumption};
use serde::{Deserialize, Serialize};

/// Game constants the calculation depends on.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalcConfig {
    /// Area taken by the core module every base starts with.
    pub core_module_area: u32,
    pub base_area: u32,
    pub area_per_permit: u32,
    /// Days over which construction cost is written off.
    pub depreciation_days: f64,
}

impl Default for CalcConfig {
    fn default() -> Self {
        Self {
            core_module_area: 25,
            base_area: 250,
            area_per_permit: 250,
            depreciation_days: 180.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AreaResult {
    pub used: u64,
    pub total: u64,
    /// Negative when the plan overbuilds.
    pub left: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanResult {
    pub corphq: bool,
    pub cogc: CogcProgram,
    pub workforce: PerWorkforce<WorkforceElement>,
    pub area: AreaResult,
    pub infrastructure: PerInfrastructure<u32>,
    pub experts: PerExpertise<ExpertElement>,
    pub production: ProductionResult,
    pub workforce_materials: Vec<MaterialIoMinimal>,
    /// Daily balance of the whole base, sorted by ticker.
    pub material_io: Vec<MaterialIo>,
    /// Σ priced deltas.
    pub profit: f64,
    /// Everything the installed buildings cost to construct.
    pub construction_materials: Vec<MaterialAmount>,
    pub construction_cost: f64,
}

/// Evaluates plans against game and market data.
pub struct PlanCalculator<'a> {
    game: &'a dyn GameDataProvider,
    market: &'a dyn MarketDataProvider,
    config: CalcConfig,
}

impl<'a> PlanCalculator<'a> {
    pub fn new(game: &'a dyn GameDataProvider, market: &'a dyn MarketDataProvider) -> Self {
        Self::with_config(game, market, CalcConfig::default())
    }

    pub fn with_config(
        game: &'a dyn GameDataProvider,
        market: &'a dyn MarketDataProvider,
        config: CalcConfig,
    ) -> Self {
        Self {
            game,
            market,
            config,
        }
    }

    pub fn config(&self) -> &CalcConfig {
        &self.config
    }

    /// Calculate under the empire the plan resolves to through `empires`.
    pub fn calculate_for_empire(
        &self,
        plan: &Plan,
        empires: &dyn EmpireProvider,
        prices: &mut PriceResolver,
    ) -> Result<PlanResult, RegistryError> {
        let empire = plan.empire_context(empires);
        self.calculate(plan, Some(&empire), prices)
    }

    /// Calculate a plan. Without an empire no faction bonus applies.
    ///
    /// `prices` is re-scoped to the plan's planet; its CX selection is kept.
    pub fn calculate(
        &self,
        plan: &Plan,
        empire: Option<&EmpireContext>,
        prices: &mut PriceResolver,
    ) -> Result<PlanResult, RegistryError> {
        let data = &plan.data;
        let planet = self.game.planet(&data.planet.planet_id)?;
        let cx_id = prices.cx_id().map(str::to_string);
        prices.invalidate(cx_id.as_deref(), Some(planet.planet_id.as_str()));

        let workforce = self.workforce(plan)?;
        log::debug!("workforce resolved for plan on {}", planet.planet_id);

        let area = self.area(plan)?;
        let experts = calculate_experts(&data.planet.experts);

        let ctx = ProductionContext {
            game: self.game,
            market: self.market,
            efficiency: EfficiencyContext {
                planet,
                corphq: data.planet.corphq,
                cogc: data.planet.cogc,
                workforce: &workforce,
                experts: &experts,
                empire,
            },
            luxuries: &data.planet.workforce,
            depreciation_days: self.config.depreciation_days,
        };
        let production = calculate_production(&data.buildings, &ctx, prices)?;
        log::debug!(
            "production resolved: {} buildings, {} materials",
            production.buildings.len(),
            production.material_io.len()
        );

        let workforce_materials = workforce_consumption(&workforce);
        let combined = combine(&[workforce_materials.as_slice(), production.material_io.as_slice()]);
        let mut material_io = enhance(&combined, self.game)?;
        apply_prices(&mut material_io, prices, self.market);
        let profit = material_io.iter().map(|m| m.price).sum();

        let construction_materials = self.construction_materials(plan, planet)?;
        let construction_cost = buy_cost(&construction_materials, prices, self.market);

        Ok(PlanResult {
            corphq: data.planet.corphq,
            cogc: data.planet.cogc,
            workforce,
            area,
            infrastructure: data.infrastructure,
            experts,
            production,
            workforce_materials,
            material_io,
            profit,
            construction_materials,
            construction_cost,
        })
    }

    fn workforce(&self, plan: &Plan) -> Result<PerWorkforce<WorkforceElement>, RegistryError> {
        let data = &plan.data;
        let mut capacity = PerWorkforce::<u64>::default();
        for (infrastructure, &count) in data.infrastructure.iter() {
            if count == 0 {
                continue;
            }
            let building = self.game.building(infrastructure.as_str())?;
            if let Some(habitation) = &building.habitation {
                for (wf, &beds) in habitation.iter() {
                    capacity[wf] = capacity[wf].saturating_add(u64::from(beds) * u64::from(count));
                }
            }
        }

        let mut required = PerWorkforce::<u64>::default();
        for plan_building in &data.buildings {
            let building = self.game.building(&plan_building.name)?;
            for (wf, &headcount) in building.workforce.iter() {
                required[wf] = required[wf]
                    .saturating_add(u64::from(headcount) * u64::from(plan_building.amount));
            }
        }

        Ok(calculate_workforce(&required, &capacity, &data.planet.workforce))
    }

    fn area(&self, plan: &Plan) -> Result<AreaResult, RegistryError> {
        let data = &plan.data;
        let footprint = |area_cost: u32, count: u32| u64::from(area_cost) * u64::from(count);
        let mut used = u64::from(self.config.core_module_area);
        for (infrastructure, &count) in data.infrastructure.iter() {
            if count > 0 {
                let building = self.game.building(infrastructure.as_str())?;
                used = used.saturating_add(footprint(building.area_cost, count));
            }
        }
        for plan_building in &data.buildings {
            let building = self.game.building(&plan_building.name)?;
            used = used.saturating_add(footprint(building.area_cost, plan_building.amount));
        }

        let total = u64::from(self.config.base_area)
            + footprint(self.config.area_per_permit, u32::from(data.planet.permits));
        let as_i64 = |n: u64| i64::try_from(n).unwrap_or(i64::MAX);
        Ok(AreaResult {
            used,
            total,
            left: as_i64(total) - as_i64(used),
        })
    }

    fn construction_materials(
        &self,
        plan: &Plan,
        planet: &Planet,
    ) -> Result<Vec<MaterialAmount>, RegistryError> {
        let data = &plan.data;
        let mut installed: Vec<(&str, u32)> = InfrastructureType::ALL
            .iter()
            .map(|&i| (i.as_str(), data.infrastructure[i]))
            .collect();
        installed.extend(data.buildings.iter().map(|b| (b.name.as_str(), b.amount)));

        let mut lines = Vec::new();
        for (ticker, count) in installed {
            if count == 0 {
                continue;
            }
            let building = self.game.building(ticker)?;
            lines.extend(
                construction_materials(building, planet)
                    .into_iter()
                    .map(|m| MaterialIoMinimal::consumed(&m.ticker, m.amount * f64::from(count))),
            );
        }
        Ok(combine(&[lines.as_slice()])
            .into_iter()
            .map(|line| MaterialAmount {
                ticker: line.ticker,
                amount: line.input,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::empire::Faction;
    use crate::test_utils::{empty_plan, sample_market, sample_plan, sample_registry};

    #[test]
    fn empty_plan_uses_only_core_module() {
        let registry = sample_registry();
        let market = sample_market();
        let calc = PlanCalculator::new(&registry, &market);
        let mut prices = PriceResolver::new(None, None);

        let mut plan = empty_plan();
        for permits in 1..=3 {
            plan.set_permits(permits);
            let result = calc.calculate(&plan, None, &mut prices).unwrap();
            assert_eq!(result.area.used, 25);
            assert_eq!(result.area.total, 250 + permits as u64 * 250);
            assert!(result.material_io.iter().all(|m| m.delta == 0.0));
            assert_eq!(result.profit, 0.0);
            for (_, element) in result.workforce.iter() {
                assert_eq!(element.satisfaction, 0.0);
            }
        }
    }

    #[test]
    fn sample_plan_is_fully_staffed() {
        let registry = sample_registry();
        let market = sample_market();
        let calc = PlanCalculator::new(&registry, &market);
        let mut prices = PriceResolver::new(None, None);

        let result = calc.calculate(&sample_plan(), None, &mut prices).unwrap();
        let pioneers = result.workforce.pioneer;
        assert!(pioneers.required > 0);
        assert!(pioneers.capacity >= pioneers.required);
        assert_eq!(pioneers.satisfaction, 1.0);
        assert!(result.area.left > 0);
        assert!(result.construction_cost > 0.0);
        assert_eq!(prices.planet_id(), Some("KW-688c"));
    }

    #[test]
    fn workforce_eats_from_the_final_ledger() {
        let registry = sample_registry();
        let market = sample_market();
        let calc = PlanCalculator::new(&registry, &market);
        let mut prices = PriceResolver::new(None, None);

        let result = calc.calculate(&sample_plan(), None, &mut prices).unwrap();
        let dw = result.material_io.iter().find(|m| m.ticker == "DW").unwrap();
        assert!(dw.delta < 0.0);
        assert!(dw.price < 0.0);

        let profit: f64 = result.material_io.iter().map(|m| m.price).sum();
        assert_eq!(result.profit, profit);
    }

    #[test]
    fn favoured_faction_raises_output() {
        let registry = sample_registry();
        let market = sample_market();
        let calc = PlanCalculator::new(&registry, &market);
        let mut prices = PriceResolver::new(None, None);
        let plan = sample_plan();

        let plain = calc.calculate(&plan, None, &mut prices).unwrap();
        let empire = EmpireContext {
            faction: Faction::Moria,
            permits_used: 1,
            permits_total: 2,
        };
        let boosted = calc.calculate(&plan, Some(&empire), &mut prices).unwrap();

        let output = |r: &PlanResult| -> f64 { r.production.material_io.iter().map(|m| m.output).sum() };
        assert!(output(&boosted) > output(&plain));
    }

    #[test]
    fn unknown_planet_is_an_error() {
        let registry = sample_registry();
        let market = sample_market();
        let calc = PlanCalculator::new(&registry, &market);
        let mut plan = empty_plan();
        plan.data.planet.planet_id = "ZZ-999z".to_string();
        let err = calc
            .calculate(&plan, None, &mut PriceResolver::default())
            .unwrap_err();
        assert_eq!(err, RegistryError::not_loaded("planet", "ZZ-999z"));
    }

    #[test]
    fn infrastructure_counts_toward_area_and_construction() {
        let registry = sample_registry();
        let market = sample_market();
        let calc = PlanCalculator::new(&registry, &market);
        let mut plan = empty_plan();
        plan.set_infrastructure(InfrastructureType::Hb1, 2);

        let result = calc
            .calculate(&plan, None, &mut PriceResolver::default())
            .unwrap();
        let hb1 = registry.building("HB1").unwrap();
        assert_eq!(result.area.used, 25 + 2 * u64::from(hb1.area_cost));
        assert_eq!(result.infrastructure.hb1, 2);
        assert_eq!(
            result.workforce.pioneer.capacity,
            2 * u64::from(hb1.habitation.unwrap().pioneer)
        );

        let mcg = result
            .construction_materials
            .iter()
            .find(|m| m.ticker == "MCG")
            .unwrap();
        assert_eq!(mcg.amount, 2.0 * 4.0 * f64::from(hb1.area_cost));
    }

    #[test]
    fn huge_counts_do_not_overflow_headcount_or_area() {
        let registry = sample_registry();
        let market = sample_market();
        let calc = PlanCalculator::new(&registry, &market);
        let mut plan = empty_plan();
        plan.add_building(&registry, "SME").unwrap();
        plan.set_building_amount(0, 100_000_000).unwrap();
        plan.set_infrastructure(InfrastructureType::Hb1, u32::MAX);

        let result = calc
            .calculate(&plan, None, &mut PriceResolver::default())
            .unwrap();
        let sme = registry.building("SME").unwrap();
        let hb1 = registry.building("HB1").unwrap();
        let pioneers = result.workforce.pioneer;
        assert_eq!(pioneers.required, u64::from(sme.workforce.pioneer) * 100_000_000);
        assert_eq!(
            pioneers.capacity,
            u64::from(hb1.habitation.unwrap().pioneer) * u64::from(u32::MAX)
        );
        assert_eq!(
            result.area.used,
            25 + u64::from(sme.area_cost) * 100_000_000
                + u64::from(hb1.area_cost) * u64::from(u32::MAX)
        );
        assert!(result.area.left < 0);
        assert_eq!(
            result.area.left,
            result.area.total as i64 - result.area.used as i64
        );
    }

    #[test]
    fn config_overrides_area_constants() {
        let registry = sample_registry();
        let market = sample_market();
        let config = CalcConfig {
            core_module_area: 0,
            base_area: 100,
            ..Default::default()
        };
        let calc = PlanCalculator::with_config(&registry, &market, config);
        let result = calc
            .calculate(&empty_plan(), None, &mut PriceResolver::default())
            .unwrap();
        assert_eq!(result.area.used, 0);
        assert_eq!(result.area.total, 350);
    }
}
