//! Workforce satisfaction, per-head efficiency and luxury-gated consumption.

use crate::id::{PerWorkforce, WorkforceType};
use crate::material_io::{MaterialIoMinimal, combine};
use crate::registry::{Building, MaterialAmount};
use serde::{Deserialize, Serialize};

/// Efficiency of a fully housed worker with only basic needs met.
pub const BASE_EFFICIENCY: f64 = 0.02 * (1.0 + 10.0 / 3.0) * (1.0 + 4.0) * (1.0 + 5.0 / 6.0);
pub const LUX1_FACTOR: f64 = 1.0 + 1.0 / 11.0;
pub const LUX2_FACTOR: f64 = 1.0 + 2.0 / 13.0;

/// Which luxury tiers a workforce type is provisioned with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Luxuries {
    pub lux1: bool,
    pub lux2: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LuxuryTier {
    Lux1,
    Lux2,
}

impl Luxuries {
    pub fn get(&self, tier: LuxuryTier) -> bool {
        match tier {
            LuxuryTier::Lux1 => self.lux1,
            LuxuryTier::Lux2 => self.lux2,
        }
    }

    pub fn set(&mut self, tier: LuxuryTier, enabled: bool) {
        match tier {
            LuxuryTier::Lux1 => self.lux1 = enabled,
            LuxuryTier::Lux2 => self.lux2 = enabled,
        }
    }
}

/// Resolved state of one workforce type on a plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct WorkforceElement {
    pub required: u64,
    pub capacity: u64,
    /// `capacity - required`; negative when short of beds.
    pub left: i64,
    pub lux1: bool,
    pub lux2: bool,
    pub satisfaction: f64,
    /// Satisfaction times per-head efficiency.
    pub efficiency: f64,
}

/// Share of required workers that have a bed, capped at 1. Zero when nobody
/// is required.
pub fn satisfaction(required: u64, capacity: u64) -> f64 {
    if required == 0 {
        0.0
    } else if capacity >= required {
        1.0
    } else {
        capacity as f64 / required as f64
    }
}

/// Per-head efficiency from provisioned luxuries. Zero when nobody is required.
pub fn per_head_efficiency(required: u64, luxuries: Luxuries) -> f64 {
    if required == 0 {
        return 0.0;
    }
    let mut efficiency = BASE_EFFICIENCY;
    if luxuries.lux1 {
        efficiency *= LUX1_FACTOR;
    }
    if luxuries.lux2 {
        efficiency *= LUX2_FACTOR;
    }
    efficiency
}

pub fn workforce_element(required: u64, capacity: u64, luxuries: Luxuries) -> WorkforceElement {
    let satisfaction = satisfaction(required, capacity);
    WorkforceElement {
        required,
        capacity,
        left: saturating_i64(capacity) - saturating_i64(required),
        lux1: luxuries.lux1,
        lux2: luxuries.lux2,
        satisfaction,
        efficiency: satisfaction * per_head_efficiency(required, luxuries),
    }
}

fn saturating_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

pub fn calculate_workforce(
    required: &PerWorkforce<u64>,
    capacity: &PerWorkforce<u64>,
    luxuries: &PerWorkforce<Luxuries>,
) -> PerWorkforce<WorkforceElement> {
    PerWorkforce::from_fn(|wf| workforce_element(required[wf], capacity[wf], luxuries[wf]))
}

// ---------------------------------------------------------------------------
// Consumption
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NeedGate {
    Base,
    Lux1,
    Lux2,
}

impl NeedGate {
    pub fn open(self, luxuries: Luxuries) -> bool {
        match self {
            NeedGate::Base => true,
            NeedGate::Lux1 => luxuries.lux1,
            NeedGate::Lux2 => luxuries.lux2,
        }
    }
}

/// Daily need of one material per 100 workers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Need {
    pub ticker: &'static str,
    pub per_hundred: f64,
    pub gate: NeedGate,
}

const fn need(ticker: &'static str, per_hundred: f64, gate: NeedGate) -> Need {
    Need {
        ticker,
        per_hundred,
        gate,
    }
}

use NeedGate::{Base, Lux1, Lux2};

const PIONEER_NEEDS: &[Need] = &[
    need("DW", 4.0, Base),
    need("RAT", 4.0, Base),
    need("OVE", 0.5, Base),
    need("COF", 0.5, Lux1),
    need("PWO", 0.2, Lux2),
];

const SETTLER_NEEDS: &[Need] = &[
    need("DW", 5.0, Base),
    need("RAT", 6.0, Base),
    need("EXO", 0.5, Base),
    need("PT", 0.5, Base),
    need("KOM", 1.0, Lux1),
    need("REP", 0.2, Lux2),
];

const TECHNICIAN_NEEDS: &[Need] = &[
    need("DW", 7.5, Base),
    need("RAT", 7.0, Base),
    need("MED", 0.5, Base),
    need("HMS", 0.5, Base),
    need("SCN", 0.1, Base),
    need("ALE", 1.0, Lux1),
    need("SC", 0.1, Lux2),
];

const ENGINEER_NEEDS: &[Need] = &[
    need("DW", 10.0, Base),
    need("FIM", 7.0, Base),
    need("MED", 0.5, Base),
    need("HSS", 0.2, Base),
    need("PDA", 0.1, Base),
    need("GIN", 1.0, Lux1),
    need("VG", 0.2, Lux2),
];

const SCIENTIST_NEEDS: &[Need] = &[
    need("DW", 10.0, Base),
    need("MEA", 7.0, Base),
    need("MED", 0.5, Base),
    need("LC", 0.2, Base),
    need("WS", 0.1, Base),
    need("WIN", 1.0, Lux1),
    need("NST", 0.1, Lux2),
];

pub fn needs(workforce: WorkforceType) -> &'static [Need] {
    match workforce {
        WorkforceType::Pioneer => PIONEER_NEEDS,
        WorkforceType::Settler => SETTLER_NEEDS,
        WorkforceType::Technician => TECHNICIAN_NEEDS,
        WorkforceType::Engineer => ENGINEER_NEEDS,
        WorkforceType::Scientist => SCIENTIST_NEEDS,
    }
}

/// Daily consumption of `headcount` workers of one type.
pub fn consumption(
    workforce: WorkforceType,
    headcount: u64,
    luxuries: Luxuries,
) -> Vec<MaterialIoMinimal> {
    if headcount == 0 {
        return Vec::new();
    }
    needs(workforce)
        .iter()
        .filter(|n| n.gate.open(luxuries))
        .map(|n| MaterialIoMinimal::consumed(n.ticker, n.per_hundred / 100.0 * headcount as f64))
        .collect()
}

/// Consumption of the whole plan: only housed workers eat.
pub fn workforce_consumption(workforce: &PerWorkforce<WorkforceElement>) -> Vec<MaterialIoMinimal> {
    let ledgers: Vec<Vec<MaterialIoMinimal>> = workforce
        .iter()
        .map(|(wf, element)| {
            let headcount = element.capacity.min(element.required);
            consumption(
                wf,
                headcount,
                Luxuries {
                    lux1: element.lux1,
                    lux2: element.lux2,
                },
            )
        })
        .collect();
    let slices: Vec<&[MaterialIoMinimal]> = ledgers.iter().map(Vec::as_slice).collect();
    combine(&slices)
}

/// Daily consumption of the crew of a single building.
pub fn building_workforce_materials(
    building: &Building,
    luxuries: &PerWorkforce<Luxuries>,
) -> Vec<MaterialAmount> {
    let ledgers: Vec<Vec<MaterialIoMinimal>> = building
        .workforce
        .iter()
        .map(|(wf, &headcount)| consumption(wf, u64::from(headcount), luxuries[wf]))
        .collect();
    let slices: Vec<&[MaterialIoMinimal]> = ledgers.iter().map(Vec::as_slice).collect();
    combine(&slices)
        .into_iter()
        .map(|line| MaterialAmount {
            ticker: line.ticker,
            amount: line.input,
        })
        .collect()
}
