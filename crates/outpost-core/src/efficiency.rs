//! Production efficiency: independent multiplicative factors whose product
//! scales how fast a building completes its recipes.

use crate::empire::EmpireContext;
use crate::id::{CogcProgram, PerExpertise, PerWorkforce};
use crate::registry::{Building, Planet};
use crate::workforce::WorkforceElement;
use serde::Serialize;

/// Bonus by number of assigned experts. Counts outside the table give 0.
pub const EXPERT_BONUS: [f64; 6] = [0.0, 0.0306, 0.0696, 0.1248, 0.1974, 0.284];

pub const HEADQUARTERS_FACTOR: f64 = 1.1;
pub const COGC_FACTOR: f64 = 1.25;

/// Buildings whose output depends on soil fertility.
pub const FARMING_BUILDINGS: [&str; 2] = ["FRM", "ORC"];

pub fn expert_bonus(amount: i64) -> f64 {
    usize::try_from(amount)
        .ok()
        .and_then(|i| EXPERT_BONUS.get(i).copied())
        .unwrap_or(0.0)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ExpertElement {
    pub amount: u8,
    pub bonus: f64,
}

pub fn calculate_experts(experts: &PerExpertise<u8>) -> PerExpertise<ExpertElement> {
    experts.map(|_, &amount| ExpertElement {
        amount,
        bonus: expert_bonus(i64::from(amount)),
    })
}

/// Fertility multiplier for farming buildings. Infertile planets (`-1`) give 0.
pub fn fertility_factor(fertility: f64) -> f64 {
    if fertility == -1.0 {
        0.0
    } else {
        (1.0 + fertility) * (10.0 / 33.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EfficiencyKind {
    Fertility,
    Headquarters,
    Cogc,
    Expert,
    Workforce,
    Faction,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EfficiencyElement {
    pub kind: EfficiencyKind,
    pub value: f64,
}

/// Contributing factors and their product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Efficiency {
    pub elements: Vec<EfficiencyElement>,
    pub total: f64,
}

impl Efficiency {
    pub fn from_elements(elements: Vec<EfficiencyElement>) -> Self {
        let total = elements.iter().map(|e| e.value).product();
        Self { elements, total }
    }

    pub fn element(&self, kind: EfficiencyKind) -> Option<f64> {
        self.elements.iter().find(|e| e.kind == kind).map(|e| e.value)
    }
}

/// Plan-wide state every building's efficiency is evaluated against.
#[derive(Debug, Clone, Copy)]
pub struct EfficiencyContext<'a> {
    pub planet: &'a Planet,
    pub corphq: bool,
    pub cogc: CogcProgram,
    pub workforce: &'a PerWorkforce<WorkforceElement>,
    pub experts: &'a PerExpertise<ExpertElement>,
    pub empire: Option<&'a EmpireContext>,
}

pub fn building_efficiency(building: &Building, ctx: &EfficiencyContext<'_>) -> Efficiency {
    let mut elements = Vec::new();
    let mut push = |kind, value| elements.push(EfficiencyElement { kind, value });

    if FARMING_BUILDINGS.contains(&building.ticker.as_str()) {
        push(EfficiencyKind::Fertility, fertility_factor(ctx.planet.fertility));
    }

    if ctx.corphq {
        push(EfficiencyKind::Headquarters, HEADQUARTERS_FACTOR);
    }

    if let Some(expertise) = building.expertise {
        if ctx.cogc.advertised() == Some(expertise) {
            push(EfficiencyKind::Cogc, COGC_FACTOR);
        }

        let expert = ctx.experts[expertise];
        if expert.amount > 0 {
            push(EfficiencyKind::Expert, 1.0 + expert.bonus);
        }
    }

    let total_workforce = building.total_workforce();
    if total_workforce > 0 {
        let total = f64::from(total_workforce);
        let weighted: f64 = building
            .workforce
            .iter()
            .map(|(wf, &n)| ctx.workforce[wf].efficiency * (f64::from(n) / total))
            .sum();
        push(EfficiencyKind::Workforce, weighted);
    }

    if let (Some(empire), Some(expertise)) = (ctx.empire, building.expertise) {
        if let Some(factor) = empire.faction_factor(expertise) {
            push(EfficiencyKind::Faction, factor);
        }
    }

    Efficiency::from_elements(elements)
}
