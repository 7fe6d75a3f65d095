//! Coal distribution planning library
//!
//! This library builds a mixed-integer linear program for a two-leg coal
//! distribution network (suppliers → factories → customers, with two coal
//! grades tracked independently), delegates the solve to an external MIP
//! engine and reports the optimal shipment plan.
//!
//! # Overview
//!
//! The planner's own work is deliberately thin: it declares the decision
//! variables, assembles the linear constraints from small tables of costs,
//! capacities and demands, sets the minimisation objective and hands the model
//! to a solver backend. All of the numerical heavy lifting happens inside the
//! backend (COIN-OR CBC by default, Gurobi optionally).
//!
//! # Workflow
//!
//! 1. Describe the business data as a [`network::DistributionNetwork`]
//!    (or start from [`scenario::reference_network`])
//! 2. Call [`plan::plan_distribution`] to build, validate and solve the model
//! 3. Render the outcome with [`plan::report::write_report`]
//!
//! ```no_run
//! # fn main() -> anyhow::Result<()> {
//! use coalflow::plan::{PlanOutcome, plan_distribution};
//! use coalflow::scenario::reference_network_with_uniform_capacity;
//!
//! let network = reference_network_with_uniform_capacity(150);
//! match plan_distribution(&network, None)? {
//!     PlanOutcome::Optimal(plan) => println!("total cost {:.2}", plan.total_cost),
//!     PlanOutcome::Infeasible => println!("no feasible plan"),
//!     PlanOutcome::Unbounded => println!("model unbounded"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - **[`network`]**: input tables, identifier-set derivation and referential
//!   validation
//! - **[`plan`]**: model construction, solving and report rendering
//! - **[`scenario`]**: the reference data tables and the seedable
//!   factory-capacity sampler
//! - **[`lp_solver`]**: linear programming solver abstraction layer

use std::{error::Error, fmt};

use clap::Parser;

pub mod lp_solver;
pub mod network;
pub mod plan;
pub mod scenario;

// Re-export the main types and functions for easy access
pub use network::{DistributionNetwork, Grade, ModelConstructionError, Symbol};
pub use plan::{DistributionPlan, PlanArgs, PlanOutcome, plan_distribution, plan_main};

/// Application-level outcomes that map to a non-zero process exit.
///
/// Infeasibility is an expected answer about the business data; it is still
/// surfaced in the exit code so scripted callers can tell the cases apart.
#[derive(Debug, PartialEq, Eq)]
pub enum AppError {
    /// The planning problem is infeasible (no assignment satisfies all constraints).
    Infeasible,
    /// The planning problem is unbounded.
    Unbounded,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Infeasible => write!(f, "Problem Infeasible"),
            AppError::Unbounded => write!(f, "Problem Unbounded"),
        }
    }
}

impl Error for AppError {}

/// Command-line interface arguments for the coal distribution planner.
///
/// Running the binary performs a single build → solve → report cycle on the
/// reference scenario and writes the report to standard output (or the file
/// given with `--report`).
#[derive(Debug, Parser)]
#[clap(
    name = "coalflow",
    about = "Coal distribution planning through mixed-integer programming"
)]
pub struct CLIArguments {
    #[clap(flatten)]
    pub plan: PlanArgs,
}
