//! Distribution plan generation for coal networks.
//!
//! This module translates the tabular business data of a
//! [`DistributionNetwork`] into a mixed-integer linear program, hands it to
//! the LP solver backend and extracts a typed [`DistributionPlan`] from the
//! optimal assignment.
//!
//! # Model shape
//!
//! Three families of non-negative integer decision variables, one variable
//! per cost-table key:
//!
//! - `x[s,f]` - units shipped from supplier `s` to factory `f`
//! - `y_negative[f,c]` / `y_positive[f,c]` - units of each coal grade shipped
//!   from factory `f` to customer `c`
//!
//! Four constraint families: per-factory flow balance (inbound equals
//! outbound - factories cannot store or lose material), per-supplier capacity,
//! per-customer per-grade minimum demand (over-delivery permitted), and
//! per-factory throughput capacity. The objective minimises shipping cost
//! plus, on the delivery leg, the factory production rate and the
//! grade-specific surcharge.
//!
//! Solver-reported infeasibility is an expected business outcome and comes
//! back as [`PlanOutcome::Infeasible`], not as an error; solver faults
//! propagate as errors.
//!
//! # Usage Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use coalflow::plan::{PlanArgs, plan_main};
//!
//! let args = PlanArgs {
//!     seed: Some(42),
//!     capacity: None,
//!     report: None,
//!     csv: None,
//!     time_limit: None,
//! };
//!
//! plan_main(args)?;
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::fs;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::*;
use clap::Parser;
use itertools::Itertools;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::lp_solver::{
    LPSolution, LinearExpression, OptimisationSense, OptimisationStatus, VariableId, VariableType,
};
use crate::network::{DistributionNetwork, Grade, Symbol};
use crate::{AppError, constraint, lp_model_builder, scenario};

pub mod report;

/// Command-line arguments for the planning run.
#[derive(Parser, Debug)]
pub struct PlanArgs {
    /// Seed for the factory capacity draw (a fresh OS seed is used if omitted)
    #[clap(long)]
    pub seed: Option<u64>,

    /// Fix every factory capacity to this value instead of sampling
    #[clap(long)]
    pub capacity: Option<u32>,

    /// Report output file (default: stdout)
    #[clap(long, short)]
    pub report: Option<PathBuf>,

    /// Shipment table CSV output file
    #[clap(long)]
    pub csv: Option<PathBuf>,

    /// Solver time limit in seconds
    #[clap(long, short('t'))]
    pub time_limit: Option<f64>,
}

/// Units shipped from a supplier to a factory in an optimal plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupplyShipment {
    pub supplier: Symbol,
    pub factory: Symbol,
    pub units: u64,
}

/// Units of one coal grade shipped from a factory to a customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeShipment {
    pub factory: Symbol,
    pub customer: Symbol,
    pub grade: Grade,
    pub units: u64,
}

/// The complete optimal assignment returned by the solver.
///
/// Holds every decision variable's value, including zeros; the report layer
/// filters for positive volumes. Read-only once built.
#[derive(Debug, Clone)]
pub struct DistributionPlan {
    pub total_cost: f64,
    pub supply: Vec<SupplyShipment>,
    pub deliveries: Vec<GradeShipment>,
}

impl DistributionPlan {
    /// Total units entering the given factory from all suppliers.
    pub fn factory_inbound(&self, factory: &Symbol) -> u64 {
        self.supply
            .iter()
            .filter(|s| s.factory == *factory)
            .map(|s| s.units)
            .sum()
    }

    /// Total units of both grades leaving the given factory.
    pub fn factory_outbound(&self, factory: &Symbol) -> u64 {
        self.deliveries
            .iter()
            .filter(|d| d.factory == *factory)
            .map(|d| d.units)
            .sum()
    }

    /// Total units leaving the given supplier.
    pub fn supplier_outbound(&self, supplier: &Symbol) -> u64 {
        self.supply
            .iter()
            .filter(|s| s.supplier == *supplier)
            .map(|s| s.units)
            .sum()
    }

    /// Total units of one grade delivered to the given customer.
    pub fn delivered_to(&self, customer: &Symbol, grade: Grade) -> u64 {
        self.deliveries
            .iter()
            .filter(|d| d.customer == *customer && d.grade == grade)
            .map(|d| d.units)
            .sum()
    }

    /// Units on a single supplier-to-factory route.
    pub fn supplied(&self, supplier: &str, factory: &str) -> u64 {
        self.supply
            .iter()
            .filter(|s| &*s.supplier == supplier && &*s.factory == factory)
            .map(|s| s.units)
            .sum()
    }

    /// Units of one grade on a single factory-to-customer route.
    pub fn delivered(&self, factory: &str, customer: &str, grade: Grade) -> u64 {
        self.deliveries
            .iter()
            .filter(|d| &*d.factory == factory && &*d.customer == customer && d.grade == grade)
            .map(|d| d.units)
            .sum()
    }
}

/// Outcome of one planning run.
///
/// Infeasibility and unboundedness are values rather than errors: they are
/// answers about the business data, not software faults.
#[derive(Debug, Clone)]
pub enum PlanOutcome {
    Optimal(DistributionPlan),
    Infeasible,
    Unbounded,
}

/// Build the distribution MIP for `network` and solve it.
///
/// Validates the network first, so referential inconsistencies fail fast
/// before any solver call. `time_limit` bounds the backend's wall-clock time;
/// hitting it without a proven status is reported as a solver error, distinct
/// from infeasibility.
pub fn plan_distribution(
    network: &DistributionNetwork,
    time_limit: Option<Duration>,
) -> Result<PlanOutcome> {
    network.validate()?;

    let suppliers = network.suppliers();
    let factories = network.factories();
    let customers = network.customers();

    let supply_routes: Vec<(Symbol, Symbol)> = sorted_routes(network.supply_cost.keys());
    let delivery_routes: Vec<(Symbol, Symbol)> = sorted_routes(network.delivery_cost.keys());

    let mut builder = lp_model_builder!();

    // x: shipments from suppliers to factories
    let supply_vars: HashMap<(Symbol, Symbol), VariableId<_>> = supply_routes
        .iter()
        .map(|route| {
            let var = builder.add_variable(
                format!("x[{},{}]", route.0, route.1),
                VariableType::Integer,
                0.0,
                f64::INFINITY,
            );
            (route.clone(), var)
        })
        .collect();

    // y: per-grade shipments from factories to customers
    let mut delivery_vars: HashMap<(Grade, (Symbol, Symbol)), VariableId<_>> = HashMap::new();
    for grade in Grade::ALL {
        for route in &delivery_routes {
            let var = builder.add_variable(
                format!("y_{}[{},{}]", grade, route.0, route.1),
                VariableType::Integer,
                0.0,
                f64::INFINITY,
            );
            delivery_vars.insert((grade, route.clone()), var);
        }
    }

    // Flow balance: input to each factory equals output from that factory
    for f in &factories {
        let inbound: LinearExpression<_> = supply_routes
            .iter()
            .filter(|(_, factory)| factory == f)
            .map(|route| supply_vars[route])
            .sum();
        let outbound = grade_outbound(&delivery_routes, &delivery_vars, f);
        builder.add_constraint(constraint!(
            format!("flow_balance_{}", f),
            (inbound - outbound) == 0.0
        ));
    }

    // Supplier capacity
    for s in &suppliers {
        let shipped: LinearExpression<_> = supply_routes
            .iter()
            .filter(|(supplier, _)| supplier == s)
            .map(|route| supply_vars[route])
            .sum();
        builder.add_constraint(constraint!(
            format!("supplier_capacity_{}", s),
            (shipped) <= network.supplier_capacity[s] as f64
        ));
    }

    // Customer demand for each grade
    for c in &customers {
        for grade in Grade::ALL {
            let delivered: LinearExpression<_> = delivery_routes
                .iter()
                .filter(|(_, customer)| customer == c)
                .map(|route| delivery_vars[&(grade, route.clone())])
                .sum();
            builder.add_constraint(constraint!(
                format!("demand_{}_{}", grade, c),
                (delivered) >= network.demand(grade)[c] as f64
            ));
        }
    }

    // Factory throughput capacity over both grades
    for f in &factories {
        let outbound = grade_outbound(&delivery_routes, &delivery_vars, f);
        builder.add_constraint(constraint!(
            format!("factory_capacity_{}", f),
            (outbound) <= network.factory_capacity[f] as f64
        ));
    }

    // Objective: freight on both legs plus production costs per grade
    let mut objective: LinearExpression<_> = supply_routes
        .iter()
        .map(|route| network.supply_cost[route] * supply_vars[route])
        .sum();
    for grade in Grade::ALL {
        let rates = network.production_rate(grade);
        let surcharge = network.surcharge(grade);
        let production: LinearExpression<_> = delivery_routes
            .iter()
            .map(|route| {
                let unit_cost = network.delivery_cost[route] + rates[&route.0] + surcharge;
                unit_cost * delivery_vars[&(grade, route.clone())]
            })
            .sum();
        objective = objective + production;
    }
    builder.set_objective(objective, OptimisationSense::Minimise);

    if let Some(limit) = time_limit {
        builder.set_time_limit(limit);
    }

    let solution = builder.solve()?;

    match solution.status {
        OptimisationStatus::Optimal | OptimisationStatus::Feasible => {
            let supply = supply_routes
                .iter()
                .map(|route| {
                    let units = variable_units(&solution, supply_vars[route])?;
                    Ok(SupplyShipment {
                        supplier: route.0.clone(),
                        factory: route.1.clone(),
                        units,
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            let mut deliveries = Vec::new();
            for grade in Grade::ALL {
                for route in &delivery_routes {
                    let units = variable_units(&solution, delivery_vars[&(grade, route.clone())])?;
                    deliveries.push(GradeShipment {
                        factory: route.0.clone(),
                        customer: route.1.clone(),
                        grade,
                        units,
                    });
                }
            }

            Ok(PlanOutcome::Optimal(DistributionPlan {
                total_cost: solution.objective_value,
                supply,
                deliveries,
            }))
        }
        OptimisationStatus::Infeasible | OptimisationStatus::InfeasibleOrUnbounded => {
            Ok(PlanOutcome::Infeasible)
        }
        OptimisationStatus::Unbounded => Ok(PlanOutcome::Unbounded),
        OptimisationStatus::Other(status) => {
            Err(anyhow!("solver returned no conclusive status: {}", status))
        }
    }
}

fn sorted_routes<'a>(keys: impl Iterator<Item = &'a (Symbol, Symbol)>) -> Vec<(Symbol, Symbol)> {
    keys.cloned()
        .sorted_by(|a, b| (&*a.0, &*a.1).cmp(&(&*b.0, &*b.1)))
        .collect()
}

fn grade_outbound<Brand>(
    delivery_routes: &[(Symbol, Symbol)],
    delivery_vars: &HashMap<(Grade, (Symbol, Symbol)), VariableId<Brand>>,
    factory: &Symbol,
) -> LinearExpression<Brand> {
    delivery_routes
        .iter()
        .filter(|(f, _)| f == factory)
        .map(|route| {
            delivery_vars[&(Grade::Negative, route.clone())]
                + delivery_vars[&(Grade::Positive, route.clone())]
        })
        .sum()
}

fn variable_units<Brand>(solution: &LPSolution<Brand>, var: VariableId<Brand>) -> Result<u64> {
    let value = solution
        .get_value(var)
        .ok_or_else(|| anyhow!("variable value missing from solution"))?;
    Ok(value.round().max(0.0) as u64)
}

/// Run a full build/solve/report cycle for the reference scenario.
///
/// Factory capacities come from `--capacity` when given, otherwise they are
/// drawn from the scenario's uniform range with `--seed` (or OS entropy).
/// Infeasible and unbounded outcomes are reported textually and then mapped
/// to a non-zero exit through [`AppError`].
pub fn plan_main(args: PlanArgs) -> Result<()> {
    let PlanArgs {
        seed,
        capacity,
        ref report,
        ref csv,
        time_limit,
    } = args;

    let mut network = scenario::reference_network(HashMap::new());
    let factories = network.factories();
    network.factory_capacity = match capacity {
        Some(capacity) => factories.iter().map(|f| (f.clone(), capacity)).collect(),
        None => {
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_os_rng(),
            };
            scenario::sample_factory_capacities(&factories, &mut rng)
        }
    };

    let time_limit = time_limit.map(Duration::try_from_secs_f64).transpose()?;
    let outcome = plan_distribution(&network, time_limit)?;

    match report {
        Some(path) => {
            let mut out = BufWriter::new(fs::File::create(path)?);
            report::write_report(&mut out, &network, &outcome)?;
        }
        None => {
            let stdout = io::stdout();
            report::write_report(&mut stdout.lock(), &network, &outcome)?;
        }
    }

    if let Some(path) = csv {
        let mut csv_file = BufWriter::new(fs::File::create(path)?);
        report::write_shipments_csv(&mut csv_file, &outcome)?;
    }

    match outcome {
        PlanOutcome::Optimal(_) => Ok(()),
        PlanOutcome::Infeasible => Err(AppError::Infeasible.into()),
        PlanOutcome::Unbounded => Err(AppError::Unbounded.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::ModelConstructionError;
    use crate::scenario::reference_network_with_uniform_capacity;

    fn solve(network: &DistributionNetwork) -> PlanOutcome {
        plan_distribution(network, None).expect("solver should not fault")
    }

    fn optimal(network: &DistributionNetwork) -> DistributionPlan {
        match solve(network) {
            PlanOutcome::Optimal(plan) => plan,
            other => panic!("expected an optimal plan, got {:?}", other),
        }
    }

    /// Check every constraint family against the returned plan.
    fn assert_plan_satisfies(plan: &DistributionPlan, network: &DistributionNetwork) {
        for factory in network.factories() {
            assert_eq!(
                plan.factory_inbound(&factory),
                plan.factory_outbound(&factory),
                "flow balance violated at {}",
                factory
            );
            assert!(
                plan.factory_outbound(&factory) <= network.factory_capacity[&factory] as u64,
                "throughput capacity violated at {}",
                factory
            );
        }
        for supplier in network.suppliers() {
            assert!(
                plan.supplier_outbound(&supplier) <= network.supplier_capacity[&supplier] as u64,
                "capacity violated at {}",
                supplier
            );
        }
        for customer in network.customers() {
            for grade in Grade::ALL {
                assert!(
                    plan.delivered_to(&customer, grade) >= network.demand(grade)[&customer] as u64,
                    "{} demand unmet at {}",
                    grade,
                    customer
                );
            }
        }
    }

    /// Recompute the objective from the shipment quantities and unit costs.
    fn recompute_cost(plan: &DistributionPlan, network: &DistributionNetwork) -> f64 {
        let freight: f64 = plan
            .supply
            .iter()
            .map(|s| {
                s.units as f64 * network.supply_cost[&(s.supplier.clone(), s.factory.clone())]
            })
            .sum();
        let production: f64 = plan
            .deliveries
            .iter()
            .map(|d| {
                let unit = network.delivery_cost[&(d.factory.clone(), d.customer.clone())]
                    + network.production_rate(d.grade)[&d.factory]
                    + network.surcharge(d.grade);
                d.units as f64 * unit
            })
            .sum();
        freight + production
    }

    #[test]
    fn test_reference_scenario_optimum() {
        let network = reference_network_with_uniform_capacity(150);
        let plan = optimal(&network);

        assert_plan_satisfies(&plan, &network);
        assert!(
            (plan.total_cost - 13210.20).abs() < 1e-6,
            "unexpected total cost {}",
            plan.total_cost
        );
        assert!(
            (recompute_cost(&plan, &network) - plan.total_cost).abs() < 1e-6,
            "reported objective disagrees with recomputed cost"
        );

        // The optimum is unique: customer1 is served through factory1 fed by
        // supplier1, customer2 through factory2 fed by supplier2.
        assert_eq!(plan.supplied("supplier1", "factory1"), 110);
        assert_eq!(plan.supplied("supplier2", "factory2"), 70);
        assert_eq!(plan.delivered("factory1", "customer1", Grade::Negative), 50);
        assert_eq!(plan.delivered("factory1", "customer1", Grade::Positive), 60);
        assert_eq!(plan.delivered("factory2", "customer2", Grade::Negative), 40);
        assert_eq!(plan.delivered("factory2", "customer2", Grade::Positive), 30);
    }

    #[test]
    fn test_demand_met_exactly_when_overdelivery_costs() {
        let network = reference_network_with_uniform_capacity(150);
        let plan = optimal(&network);

        // Every unit has positive cost, so the optimum never over-delivers
        for customer in network.customers() {
            for grade in Grade::ALL {
                assert_eq!(
                    plan.delivered_to(&customer, grade),
                    network.demand(grade)[&customer] as u64
                );
            }
        }
    }

    #[test]
    fn test_binding_factory_capacity_reroutes_flow() {
        let network = reference_network_with_uniform_capacity(100);
        let plan = optimal(&network);

        assert_plan_satisfies(&plan, &network);
        // factory1 can no longer carry all 110 units for customer1; ten units
        // shift to the dearer factory2 route.
        assert_eq!(plan.factory_outbound(&Symbol::from("factory1")), 100);
        assert!(
            (plan.total_cost - 13250.20).abs() < 1e-6,
            "unexpected total cost {}",
            plan.total_cost
        );
    }

    #[test]
    fn test_cost_monotone_in_demand() {
        let base = reference_network_with_uniform_capacity(150);
        let base_cost = optimal(&base).total_cost;

        let mut tightened = base.clone();
        tightened
            .demand_negative
            .insert(Symbol::from("customer1"), 60);
        let tightened_cost = optimal(&tightened).total_cost;

        assert!(
            tightened_cost >= base_cost,
            "raising demand cannot cut cost ({} < {})",
            tightened_cost,
            base_cost
        );
    }

    #[test]
    fn test_infeasible_when_demand_exceeds_supply() {
        let mut network = reference_network_with_uniform_capacity(150);
        // Total demand 600 against 300 units of supplier capacity
        for customer in ["customer1", "customer2"] {
            network
                .demand_negative
                .insert(Symbol::from(customer), 150);
            network
                .demand_positive
                .insert(Symbol::from(customer), 150);
        }

        assert!(matches!(solve(&network), PlanOutcome::Infeasible));
    }

    #[test]
    fn test_validation_failure_reported_before_solving() {
        let mut network = reference_network_with_uniform_capacity(150);
        network.factory_capacity.remove(&Symbol::from("factory2"));

        let err = plan_distribution(&network, None).unwrap_err();
        assert!(err.downcast_ref::<ModelConstructionError>().is_some());
    }
}
