//! Material ledgers: per-ticker input/output sums, their combination, and
//! enrichment with physical and monetary attributes.

use crate::price::{MarketDataProvider, PriceDirection, PriceResolver};
use crate::registry::{GameDataProvider, RegistryError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One ledger line: how much of a material is consumed and produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialIoMinimal {
    pub ticker: String,
    pub input: f64,
    pub output: f64,
}

impl MaterialIoMinimal {
    pub fn consumed(ticker: &str, amount: f64) -> Self {
        Self {
            ticker: ticker.to_string(),
            input: amount,
            output: 0.0,
        }
    }

    pub fn produced(ticker: &str, amount: f64) -> Self {
        Self {
            ticker: ticker.to_string(),
            input: 0.0,
            output: amount,
        }
    }

    pub fn delta(&self) -> f64 {
        self.output - self.input
    }
}

/// Merge ledgers into one with a single line per ticker, sorted by ticker.
/// Inputs and outputs of the same ticker are summed independently.
///
/// Every ledger this crate produces is in that normalized form, and
/// `combine(&[ledger])` returns a normalized ledger unchanged. An unsorted or
/// duplicated ledger comes back normalized rather than equal.
pub fn combine(ledgers: &[&[MaterialIoMinimal]]) -> Vec<MaterialIoMinimal> {
    let mut merged: BTreeMap<&str, (f64, f64)> = BTreeMap::new();
    for entry in ledgers.iter().flat_map(|ledger| ledger.iter()) {
        let slot = merged.entry(entry.ticker.as_str()).or_insert((0.0, 0.0));
        slot.0 += entry.input;
        slot.1 += entry.output;
    }
    merged
        .into_iter()
        .map(|(ticker, (input, output))| MaterialIoMinimal {
            ticker: ticker.to_string(),
            input,
            output,
        })
        .collect()
}

/// A ledger line with weight, volume and price attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialIo {
    pub ticker: String,
    pub input: f64,
    pub output: f64,
    /// `output - input`; positive means surplus.
    pub delta: f64,
    pub individual_weight: f64,
    pub individual_volume: f64,
    pub total_weight: f64,
    pub total_volume: f64,
    /// `delta` times the resolved unit price. Zero until [`apply_prices`] runs.
    pub price: f64,
}

/// Attach material weight and volume to each line, sorted by ticker.
pub fn enhance(
    ledger: &[MaterialIoMinimal],
    game: &dyn GameDataProvider,
) -> Result<Vec<MaterialIo>, RegistryError> {
    let mut enhanced = ledger
        .iter()
        .map(|entry| {
            let material = game.material(&entry.ticker)?;
            let delta = entry.delta();
            Ok(MaterialIo {
                ticker: entry.ticker.clone(),
                input: entry.input,
                output: entry.output,
                delta,
                individual_weight: material.weight,
                individual_volume: material.volume,
                total_weight: delta.abs() * material.weight,
                total_volume: delta.abs() * material.volume,
                price: 0.0,
            })
        })
        .collect::<Result<Vec<_>, RegistryError>>()?;
    enhanced.sort_by(|a, b| a.ticker.cmp(&b.ticker));
    Ok(enhanced)
}

/// Price every line: a surplus is sold, a deficit is bought.
pub fn apply_prices(
    ledger: &mut [MaterialIo],
    prices: &mut PriceResolver,
    market: &dyn MarketDataProvider,
) {
    for entry in ledger {
        let direction = if entry.delta >= 0.0 {
            PriceDirection::Sell
        } else {
            PriceDirection::Buy
        };
        entry.price = entry.delta * prices.price(market, &entry.ticker, direction);
    }
}
