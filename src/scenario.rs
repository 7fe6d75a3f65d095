//! Reference coal distribution scenario.
//!
//! The planner core takes every table as an explicit input; this module owns
//! the canned business data of the reference scenario and the random
//! factory-capacity draw. Keeping the sampling here, behind a caller-supplied
//! RNG, leaves [`crate::plan`] fully deterministic and testable with fixed
//! capacities.

use std::collections::HashMap;
use std::ops::RangeInclusive;

use rand::Rng;

use crate::network::{DistributionNetwork, Symbol};

/// Uniform range the factory capacities are drawn from.
pub const CAPACITY_RANGE: RangeInclusive<u32> = 100..=150;

/// Draw a capacity for each factory from [`CAPACITY_RANGE`].
pub fn sample_factory_capacities<R: Rng>(
    factories: &[Symbol],
    rng: &mut R,
) -> HashMap<Symbol, u32> {
    factories
        .iter()
        .map(|f| (f.clone(), rng.random_range(CAPACITY_RANGE)))
        .collect()
}

/// The reference scenario tables with the given factory capacities.
pub fn reference_network(factory_capacity: HashMap<Symbol, u32>) -> DistributionNetwork {
    let supplier_capacity = [("supplier1", 120), ("supplier2", 100), ("supplier3", 80)]
        .into_iter()
        .map(|(s, cap)| (Symbol::from(s), cap))
        .collect();

    let supply_cost = [
        (("supplier1", "factory1"), 4.0),
        (("supplier1", "factory2"), 6.0),
        (("supplier2", "factory1"), 5.0),
        (("supplier2", "factory2"), 3.0),
        (("supplier3", "factory1"), 7.0),
        (("supplier3", "factory2"), 4.0),
    ]
    .into_iter()
    .map(|((s, f), cost)| ((Symbol::from(s), Symbol::from(f)), cost))
    .collect();

    let delivery_cost = [
        (("factory1", "customer1"), 20.0),
        (("factory1", "customer2"), 35.0),
        (("factory2", "customer1"), 25.0),
        (("factory2", "customer2"), 30.0),
    ]
    .into_iter()
    .map(|((f, c), cost)| ((Symbol::from(f), Symbol::from(c)), cost))
    .collect();

    let demand_negative = [("customer1", 50), ("customer2", 40)]
        .into_iter()
        .map(|(c, d)| (Symbol::from(c), d))
        .collect();

    let demand_positive = [("customer1", 60), ("customer2", 30)]
        .into_iter()
        .map(|(c, d)| (Symbol::from(c), d))
        .collect();

    let production_rate = |rate: f64| -> HashMap<Symbol, f64> {
        [("factory1", rate), ("factory2", rate)]
            .into_iter()
            .map(|(f, r)| (Symbol::from(f), r))
            .collect()
    };

    DistributionNetwork {
        supplier_capacity,
        supply_cost,
        delivery_cost,
        demand_negative,
        demand_positive,
        factory_capacity,
        production_rate_negative: production_rate(39.39),
        production_rate_positive: production_rate(39.39),
        surcharge_negative: 5.0,
        surcharge_positive: 8.0,
    }
}

/// Convenience: the reference scenario with every factory fixed to the same
/// capacity.
pub fn reference_network_with_uniform_capacity(capacity: u32) -> DistributionNetwork {
    let factories = [Symbol::from("factory1"), Symbol::from("factory2")];
    reference_network(factories.into_iter().map(|f| (f, capacity)).collect())
}
