//! Data model of the coal distribution network.
//!
//! A [`DistributionNetwork`] holds the tabular business data the planner works
//! from: supplier capacities, shipping cost tables for both legs of the
//! network, per-grade customer demand, factory throughput capacities and
//! production costs.
//!
//! The sets of suppliers, factories and customers are never configured
//! separately - they are derived from the keys of the shipping cost tables.
//! [`DistributionNetwork::suppliers`], [`DistributionNetwork::factories`] and
//! [`DistributionNetwork::customers`] are the single source of truth for which
//! participants exist; no other list of them is kept anywhere.
//!
//! [`DistributionNetwork::validate`] checks referential consistency across the
//! tables before any solver is involved. In particular it rejects a factory
//! that appears on only one side of the network: such a factory would get a
//! flow-balance constraint summing over an empty set, silently forcing its
//! throughput to zero instead of failing loudly.

use std::collections::HashMap;
use std::{error::Error, fmt};

use itertools::Itertools;
use string_cache::DefaultAtom;

/// Interned identifier for suppliers, factories and customers.
pub type Symbol = DefaultAtom;

/// The two coal grades tracked independently through the network.
///
/// "Negative" and "positive" are product variants, not numeric signs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Grade {
    Negative,
    Positive,
}

impl Grade {
    pub const ALL: [Grade; 2] = [Grade::Negative, Grade::Positive];
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Grade::Negative => write!(f, "negative"),
            Grade::Positive => write!(f, "positive"),
        }
    }
}

/// Error response of [`DistributionNetwork::validate`].
///
/// Raised before any solver call; a failed build is fatal to that model but
/// not to the process.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelConstructionError {
    /// A shipping cost table has no entries at all.
    EmptyTable(&'static str),
    /// A cost, rate or surcharge is negative, NaN or infinite.
    InvalidValue {
        table: &'static str,
        key: String,
        value: f64,
    },
    /// A derived supplier, factory or customer has no entry in a required table.
    MissingEntry { table: &'static str, key: String },
    /// A factory appears in one shipping cost table but not the other.
    FactoryMismatch {
        factory: Symbol,
        missing_from: &'static str,
    },
}

impl fmt::Display for ModelConstructionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelConstructionError::EmptyTable(table) => {
                write!(f, "{} table is empty", table)
            }
            ModelConstructionError::InvalidValue { table, key, value } => {
                write!(f, "{} entry {} has invalid value {}", table, key, value)
            }
            ModelConstructionError::MissingEntry { table, key } => {
                write!(f, "{} has no entry for {}", table, key)
            }
            ModelConstructionError::FactoryMismatch {
                factory,
                missing_from,
            } => {
                write!(
                    f,
                    "factory {} is missing from the {} table",
                    factory, missing_from
                )
            }
        }
    }
}

impl Error for ModelConstructionError {}

const SUPPLY_COST: &str = "supply cost";
const DELIVERY_COST: &str = "delivery cost";
const SUPPLIER_CAPACITY: &str = "supplier capacity";
const FACTORY_CAPACITY: &str = "factory capacity";
const PRODUCTION_RATE: &str = "production rate";
const SURCHARGE: &str = "production surcharge";
const DEMAND: &str = "demand";

/// Tabular input data for one planning run.
///
/// All tables are plain fields so scenarios and test fixtures can be built as
/// struct literals; nothing here is global or shared between runs. Quantities
/// are `u32` (non-negative by construction), money is `f64` and validated.
#[derive(Debug, Clone)]
pub struct DistributionNetwork {
    /// Maximum outbound units per supplier
    pub supplier_capacity: HashMap<Symbol, u32>,
    /// Unit shipping cost, (supplier, factory) keys
    pub supply_cost: HashMap<(Symbol, Symbol), f64>,
    /// Unit shipping cost, (factory, customer) keys
    pub delivery_cost: HashMap<(Symbol, Symbol), f64>,
    /// Minimum units of negative coal required per customer
    pub demand_negative: HashMap<Symbol, u32>,
    /// Minimum units of positive coal required per customer
    pub demand_positive: HashMap<Symbol, u32>,
    /// Maximum total throughput per factory, both grades combined
    pub factory_capacity: HashMap<Symbol, u32>,
    /// Flat per-unit production rate for negative coal, per factory
    pub production_rate_negative: HashMap<Symbol, f64>,
    /// Flat per-unit production rate for positive coal, per factory
    pub production_rate_positive: HashMap<Symbol, f64>,
    /// Grade-specific per-unit surcharge for negative coal
    pub surcharge_negative: f64,
    /// Grade-specific per-unit surcharge for positive coal
    pub surcharge_positive: f64,
}

fn sorted_unique(symbols: impl Iterator<Item = Symbol>) -> Vec<Symbol> {
    symbols
        .unique()
        .sorted_by(|a, b| (**a).cmp(&**b))
        .collect()
}

impl DistributionNetwork {
    /// Suppliers, derived from the first components of the supply cost keys.
    pub fn suppliers(&self) -> Vec<Symbol> {
        sorted_unique(self.supply_cost.keys().map(|(s, _)| s.clone()))
    }

    /// Factories, derived from the second components of the supply cost keys.
    ///
    /// `validate` guarantees this agrees with the factory set reachable from
    /// the delivery cost table.
    pub fn factories(&self) -> Vec<Symbol> {
        sorted_unique(self.supply_cost.keys().map(|(_, f)| f.clone()))
    }

    /// Customers, derived from the second components of the delivery cost keys.
    pub fn customers(&self) -> Vec<Symbol> {
        sorted_unique(self.delivery_cost.keys().map(|(_, c)| c.clone()))
    }

    /// Demand table for the given grade.
    pub fn demand(&self, grade: Grade) -> &HashMap<Symbol, u32> {
        match grade {
            Grade::Negative => &self.demand_negative,
            Grade::Positive => &self.demand_positive,
        }
    }

    /// Per-factory production rate table for the given grade.
    pub fn production_rate(&self, grade: Grade) -> &HashMap<Symbol, f64> {
        match grade {
            Grade::Negative => &self.production_rate_negative,
            Grade::Positive => &self.production_rate_positive,
        }
    }

    /// Grade-specific production surcharge.
    pub fn surcharge(&self, grade: Grade) -> f64 {
        match grade {
            Grade::Negative => self.surcharge_negative,
            Grade::Positive => self.surcharge_positive,
        }
    }

    /// Check referential consistency across all input tables.
    ///
    /// Runs before model construction so that a malformed scenario fails fast
    /// instead of producing a silently degenerate program.
    pub fn validate(&self) -> Result<(), ModelConstructionError> {
        if self.supply_cost.is_empty() {
            return Err(ModelConstructionError::EmptyTable(SUPPLY_COST));
        }
        if self.delivery_cost.is_empty() {
            return Err(ModelConstructionError::EmptyTable(DELIVERY_COST));
        }

        for ((origin, destination), &cost) in &self.supply_cost {
            check_money(SUPPLY_COST, format!("({},{})", origin, destination), cost)?;
        }
        for ((origin, destination), &cost) in &self.delivery_cost {
            check_money(
                DELIVERY_COST,
                format!("({},{})", origin, destination),
                cost,
            )?;
        }

        // The two factory derivations must agree, else a flow-balance
        // constraint would sum over an empty set and pin the factory to zero.
        let inbound_factories = self.factories();
        let outbound_factories =
            sorted_unique(self.delivery_cost.keys().map(|(f, _)| f.clone()));
        for factory in &outbound_factories {
            if !inbound_factories.contains(factory) {
                return Err(ModelConstructionError::FactoryMismatch {
                    factory: factory.clone(),
                    missing_from: SUPPLY_COST,
                });
            }
        }
        for factory in &inbound_factories {
            if !outbound_factories.contains(factory) {
                return Err(ModelConstructionError::FactoryMismatch {
                    factory: factory.clone(),
                    missing_from: DELIVERY_COST,
                });
            }
        }

        for supplier in self.suppliers() {
            if !self.supplier_capacity.contains_key(&supplier) {
                return Err(ModelConstructionError::MissingEntry {
                    table: SUPPLIER_CAPACITY,
                    key: supplier.to_string(),
                });
            }
        }

        for factory in &inbound_factories {
            if !self.factory_capacity.contains_key(factory) {
                return Err(ModelConstructionError::MissingEntry {
                    table: FACTORY_CAPACITY,
                    key: factory.to_string(),
                });
            }
            for grade in Grade::ALL {
                match self.production_rate(grade).get(factory) {
                    None => {
                        return Err(ModelConstructionError::MissingEntry {
                            table: PRODUCTION_RATE,
                            key: format!("{} ({})", factory, grade),
                        });
                    }
                    Some(&rate) => {
                        check_money(PRODUCTION_RATE, format!("{} ({})", factory, grade), rate)?
                    }
                }
            }
        }

        for grade in Grade::ALL {
            check_money(SURCHARGE, grade.to_string(), self.surcharge(grade))?;
            for customer in self.customers() {
                if !self.demand(grade).contains_key(&customer) {
                    return Err(ModelConstructionError::MissingEntry {
                        table: DEMAND,
                        key: format!("{} ({})", customer, grade),
                    });
                }
            }
        }

        Ok(())
    }
}

fn check_money(table: &'static str, key: String, value: f64) -> Result<(), ModelConstructionError> {
    if !value.is_finite() || value < 0.0 {
        Err(ModelConstructionError::InvalidValue { table, key, value })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario;

    fn reference() -> DistributionNetwork {
        scenario::reference_network(
            [(Symbol::from("factory1"), 150), (Symbol::from("factory2"), 150)]
                .into_iter()
                .collect(),
        )
    }

    #[test]
    fn test_reference_network_is_valid() {
        assert!(reference().validate().is_ok());
    }

    #[test]
    fn test_derived_sets_are_sorted_and_unique() {
        let network = reference();
        assert_eq!(
            network.suppliers(),
            vec![
                Symbol::from("supplier1"),
                Symbol::from("supplier2"),
                Symbol::from("supplier3")
            ]
        );
        assert_eq!(
            network.factories(),
            vec![Symbol::from("factory1"), Symbol::from("factory2")]
        );
        assert_eq!(
            network.customers(),
            vec![Symbol::from("customer1"), Symbol::from("customer2")]
        );
    }

    #[test]
    fn test_empty_cost_table_rejected() {
        let mut network = reference();
        network.supply_cost.clear();
        assert!(matches!(
            network.validate(),
            Err(ModelConstructionError::EmptyTable(_))
        ));
    }

    #[test]
    fn test_negative_cost_rejected() {
        let mut network = reference();
        network
            .supply_cost
            .insert((Symbol::from("supplier1"), Symbol::from("factory1")), -4.0);
        assert!(matches!(
            network.validate(),
            Err(ModelConstructionError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_nan_rate_rejected() {
        let mut network = reference();
        network
            .production_rate_positive
            .insert(Symbol::from("factory2"), f64::NAN);
        assert!(matches!(
            network.validate(),
            Err(ModelConstructionError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_factory_without_inbound_leg_rejected() {
        let mut network = reference();
        // factory3 can deliver but nothing can reach it
        network.delivery_cost.insert(
            (Symbol::from("factory3"), Symbol::from("customer1")),
            12.0,
        );
        let err = network.validate().unwrap_err();
        assert_eq!(
            err,
            ModelConstructionError::FactoryMismatch {
                factory: Symbol::from("factory3"),
                missing_from: "supply cost",
            }
        );
    }

    #[test]
    fn test_factory_without_outbound_leg_rejected() {
        let mut network = reference();
        network
            .supply_cost
            .insert((Symbol::from("supplier1"), Symbol::from("factory3")), 9.0);
        network.factory_capacity.insert(Symbol::from("factory3"), 120);
        network
            .production_rate_negative
            .insert(Symbol::from("factory3"), 39.39);
        network
            .production_rate_positive
            .insert(Symbol::from("factory3"), 39.39);
        let err = network.validate().unwrap_err();
        assert_eq!(
            err,
            ModelConstructionError::FactoryMismatch {
                factory: Symbol::from("factory3"),
                missing_from: "delivery cost",
            }
        );
    }

    #[test]
    fn test_missing_supplier_capacity_rejected() {
        let mut network = reference();
        network.supplier_capacity.remove(&Symbol::from("supplier2"));
        assert!(matches!(
            network.validate(),
            Err(ModelConstructionError::MissingEntry { table: "supplier capacity", .. })
        ));
    }

    #[test]
    fn test_missing_demand_rejected() {
        let mut network = reference();
        network.demand_positive.remove(&Symbol::from("customer2"));
        assert!(matches!(
            network.validate(),
            Err(ModelConstructionError::MissingEntry { table: "demand", .. })
        ));
    }

    #[test]
    fn test_missing_production_rate_rejected() {
        let mut network = reference();
        network
            .production_rate_negative
            .remove(&Symbol::from("factory1"));
        assert!(matches!(
            network.validate(),
            Err(ModelConstructionError::MissingEntry { table: "production rate", .. })
        ));
    }
}
