//! Outpost Core -- the plan calculation engine for planetary base planning.
//!
//! Given static game data, market prices and an editable [`plan::Plan`],
//! the engine derives workforce satisfaction, area usage, per-building
//! efficiency and production, and the priced daily material balance of the
//! base. Everything is a pure, synchronous computation over in-memory data.
//!
//! # Pipeline
//!
//! [`calculator::PlanCalculator::calculate`] runs these stages in order:
//!
//! 1. **Workforce** -- beds from infrastructure against headcount demanded
//!    by production buildings, luxury-adjusted efficiency.
//! 2. **Area** -- core module, infrastructure and production footprint.
//! 3. **Experts** -- bonus per expertise category.
//! 4. **Production** -- efficiency stack per building, recipe time sharing,
//!    daily cycles, recipe economics.
//! 5. **Material balance** -- workforce consumption combined with production,
//!    enriched with weight, volume and price.
//!
//! # Key Types
//!
//! - [`registry::Registry`] -- Immutable game data (materials, buildings,
//!   recipes, planets) behind the [`registry::GameDataProvider`] trait.
//! - [`price::PriceResolver`] -- Layered buy/sell price lookup with an
//!   explicit, instance-scoped memo.
//! - [`plan::Plan`] -- The editable plan and its validated mutations.
//! - [`calculator::PlanResult`] -- Everything derived from one plan.
//! - [`id::PerWorkforce`], [`id::PerExpertise`], [`id::PerInfrastructure`] --
//!   Fixed tables indexed by closed key enums.

pub mod calculator;
pub mod efficiency;
pub mod empire;
pub mod extraction;
pub mod id;
pub mod material_io;
pub mod plan;
pub mod price;
pub mod production;
pub mod registry;
pub mod workforce;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

/// Milliseconds in one game day.
pub const MS_PER_DAY: f64 = 86_400_000.0;
