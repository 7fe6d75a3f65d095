//! Linear Programming (LP) solver abstraction layer
//!
//! This module provides a backend-agnostic way to describe mixed-integer
//! linear programs, keeping the rest of the crate independent of specific
//! solver implementations like Gurobi and coin_cbc.
//!
//! # Type Safety with Branded Types
//!
//! All core types (`VariableId`, `LinearExpression`, `Constraint`,
//! `LPModelBuilder`) carry a generic `Brand` type parameter:
//!
//! - Variables from one builder cannot be accidentally used with another builder
//! - Constraints are type-checked to ensure they only use variables from their builder
//! - No runtime overhead - the brand is a zero-sized phantom type
//!
//! Use the `lp_model_builder!()` macro to create builders with guaranteed
//! unique brands:
//!
//! ```rust
//! use coalflow::constraint;
//! use coalflow::lp_model_builder;
//! use coalflow::lp_solver::{OptimisationSense, VariableType};
//!
//! let mut builder = lp_model_builder!();
//! let x = builder.add_variable("x", VariableType::Integer, 0.0, f64::INFINITY);
//! let y = builder.add_variable("y", VariableType::Integer, 0.0, f64::INFINITY);
//!
//! builder.add_constraint(constraint!("throughput", (x + y) <= 10.0));
//! builder.set_objective(4.0 * x + 3.0 * y, OptimisationSense::Minimise);
//! ```
//!
//! Variables and constraints are named: backends that support it attach the
//! names to the solver model, which makes infeasibility diagnostics readable.
//!
//! # Expression Building
//!
//! Linear expressions support natural operator overloading (see [`ops`]), and
//! `LinearExpression` implements `Sum` over both variables and expressions, so
//! constraint bodies over whole shipment families can be written as iterator
//! `.sum()` chains.
//!
//! # Solver Selection
//!
//! The solver backend is selected via the `COALFLOW_LP_SOLVER` environment
//! variable:
//! - `"gurobi"` - Use Gurobi (requires `gurobi` feature)
//! - `"coin_cbc"` or `"cbc"` - Use COIN-OR CBC (requires `coin_cbc` feature)
//!
//! If not set, the solver defaults to Gurobi if available, otherwise CBC.

use anyhow::Result;
use std::env;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

/// Variable domains supported by the LP backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableType {
    /// Continuous variable (can take any real value)
    Continuous,
    /// Integer variable (can only take integer values)
    Integer,
    /// Binary variable (can only take values 0 or 1)
    Binary,
}

/// Constraint sense for linear constraints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintSense {
    /// Less than or equal to (≤)
    LessEqual,
    /// Equal to (=)
    Equal,
    /// Greater than or equal to (≥)
    GreaterEqual,
}

/// Optimisation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimisationSense {
    Minimise,
    Maximise,
}

/// Status reported by the backend after `optimize()` returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimisationStatus {
    /// Optimal solution found
    Optimal,
    /// Feasible solution found, but not necessarily optimal
    Feasible,
    /// Problem is infeasible (no solution exists)
    Infeasible,
    /// Problem is unbounded
    Unbounded,
    /// Problem is infeasible or unbounded
    InfeasibleOrUnbounded,
    /// Other status (solver-specific)
    Other(&'static str),
}

/// Available LP solver backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SolverBackend {
    #[cfg(feature = "gurobi")]
    Gurobi,
    #[cfg(feature = "coin_cbc")]
    CoinCbc,
}

impl SolverBackend {
    /// Get the solver backend from environment variable or use fallback logic
    fn from_env_or_default() -> Result<Self> {
        if let Ok(solver_name) = env::var("COALFLOW_LP_SOLVER") {
            match solver_name.to_lowercase().as_str() {
                "gurobi" => {
                    #[cfg(feature = "gurobi")]
                    return Ok(SolverBackend::Gurobi);
                    #[cfg(not(feature = "gurobi"))]
                    return Err(anyhow::anyhow!(
                        "Gurobi solver requested via COALFLOW_LP_SOLVER but gurobi feature not enabled"
                    ));
                }
                "coin_cbc" | "coin-cbc" | "cbc" => {
                    #[cfg(feature = "coin_cbc")]
                    return Ok(SolverBackend::CoinCbc);
                    #[cfg(not(feature = "coin_cbc"))]
                    return Err(anyhow::anyhow!(
                        "Coin CBC solver requested via COALFLOW_LP_SOLVER but coin_cbc feature not enabled"
                    ));
                }
                _ => {
                    return Err(anyhow::anyhow!(
                        "Invalid solver '{}' in COALFLOW_LP_SOLVER. Valid options: gurobi, coin_cbc",
                        solver_name
                    ));
                }
            }
        }

        // Fallback logic: prefer gurobi if available, then coin_cbc
        #[cfg(feature = "gurobi")]
        return Ok(SolverBackend::Gurobi);

        #[allow(unreachable_code)]
        #[cfg(feature = "coin_cbc")]
        return Ok(SolverBackend::CoinCbc);

        #[cfg(not(any(feature = "gurobi", feature = "coin_cbc")))]
        Err(anyhow::anyhow!(
            "No LP solver backend available. Please enable a solver feature (e.g., 'gurobi' or 'coin_cbc')"
        ))
    }
}

/// A linear expression term: coefficient * variable
#[derive(Debug, Clone)]
pub struct LinearTerm<Brand> {
    pub coefficient: f64,
    pub variable: VariableId<Brand>,
}

/// A linear expression: sum of terms plus constant
#[derive(Debug, Clone)]
pub struct LinearExpression<Brand> {
    pub terms: Vec<LinearTerm<Brand>>,
    pub constant: f64,
}

impl<Brand> LinearExpression<Brand> {
    /// Create a new linear expression with a constant term
    pub fn new(constant: f64) -> Self {
        Self {
            terms: Vec::new(),
            constant,
        }
    }

    /// Add a term to the expression
    pub fn add_term(&mut self, coefficient: f64, variable: VariableId<Brand>) {
        self.terms.push(LinearTerm {
            coefficient,
            variable,
        });
    }

    /// Create a linear expression from a single variable
    pub fn from_variable(variable: VariableId<Brand>) -> Self {
        Self {
            terms: vec![LinearTerm {
                coefficient: 1.0,
                variable,
            }],
            constant: 0.0,
        }
    }
}

impl<Brand> From<VariableId<Brand>> for LinearExpression<Brand> {
    fn from(variable: VariableId<Brand>) -> Self {
        Self::from_variable(variable)
    }
}

/// Unique identifier for a variable in the LP model
///
/// The `Brand` type parameter ensures that variables can only be used with the
/// builder that created them. This is enforced at compile time.
pub struct VariableId<Brand> {
    pub(crate) id: usize,
    pub(crate) _brand: PhantomData<fn() -> Brand>,
}

// Manual trait implementations that don't require Brand to implement anything
impl<Brand> std::fmt::Debug for VariableId<Brand> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VariableId").field("id", &self.id).finish()
    }
}

impl<Brand> Clone for VariableId<Brand> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Brand> Copy for VariableId<Brand> {}

impl<Brand> PartialEq for VariableId<Brand> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<Brand> Eq for VariableId<Brand> {}

impl<Brand> std::hash::Hash for VariableId<Brand> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Unique identifier for a constraint in the LP model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConstraintId(pub(crate) usize);

/// A named linear constraint
///
/// Constraints relate a linear expression to a constant. The name is carried
/// through to backends that support row names, which keeps solver diagnostics
/// readable. The `Brand` type parameter ensures constraints can only use
/// variables from the builder that will consume them.
#[derive(Debug, Clone)]
pub struct Constraint<Brand> {
    pub(crate) name: Arc<str>,
    pub(crate) expression: LinearExpression<Brand>,
    pub(crate) sense: ConstraintSense,
    pub(crate) rhs: f64,
}

impl<Brand> Constraint<Brand> {
    /// Create a new constraint
    pub fn new(
        name: impl Into<Arc<str>>,
        expression: impl Into<LinearExpression<Brand>>,
        sense: ConstraintSense,
        rhs: f64,
    ) -> Self {
        Self {
            name: name.into(),
            expression: expression.into(),
            sense,
            rhs,
        }
    }

    /// Create an equality constraint: expression == rhs
    pub fn eq(
        name: impl Into<Arc<str>>,
        expression: impl Into<LinearExpression<Brand>>,
        rhs: f64,
    ) -> Self {
        Self::new(name, expression, ConstraintSense::Equal, rhs)
    }

    /// Create a less-than-or-equal constraint: expression <= rhs
    pub fn le(
        name: impl Into<Arc<str>>,
        expression: impl Into<LinearExpression<Brand>>,
        rhs: f64,
    ) -> Self {
        Self::new(name, expression, ConstraintSense::LessEqual, rhs)
    }

    /// Create a greater-than-or-equal constraint: expression >= rhs
    pub fn ge(
        name: impl Into<Arc<str>>,
        expression: impl Into<LinearExpression<Brand>>,
        rhs: f64,
    ) -> Self {
        Self::new(name, expression, ConstraintSense::GreaterEqual, rhs)
    }

    /// Diagnostic name of the constraint
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Variable information stored in the model
#[derive(Debug, Clone)]
pub(crate) struct VariableInfo {
    pub(crate) name: Arc<str>,
    pub(crate) var_type: VariableType,
    pub(crate) lower_bound: f64,
    pub(crate) upper_bound: f64,
}

/// Objective function information
#[derive(Debug, Clone)]
pub(crate) struct ObjectiveInfo<Brand> {
    pub(crate) expression: LinearExpression<Brand>,
    pub(crate) sense: OptimisationSense,
}

/// Result of solving an LP model
#[derive(Debug, Clone)]
pub struct LPSolution<Brand> {
    pub status: OptimisationStatus,
    pub objective_value: f64,
    pub(crate) variable_values: Vec<f64>,
    pub(crate) _brand: PhantomData<fn() -> Brand>,
}

impl<Brand> LPSolution<Brand> {
    /// Get the value of a variable from the solution
    pub fn get_value(&self, var_id: VariableId<Brand>) -> Option<f64> {
        self.variable_values.get(var_id.id).copied()
    }
}

/// Builder for LP models that can work with different backends
///
/// The `Brand` type parameter ensures type safety - variables from one builder
/// cannot be accidentally used with another builder. Use the
/// `lp_model_builder!()` macro to create builders with unique brands.
pub struct LPModelBuilder<Brand> {
    pub(crate) variables: Vec<VariableInfo>,
    pub(crate) constraints: Vec<Constraint<Brand>>,
    pub(crate) objective: Option<ObjectiveInfo<Brand>>,
    pub(crate) time_limit: Option<Duration>,
    _brand: PhantomData<fn() -> Brand>,
}

impl<Brand> LPModelBuilder<Brand> {
    /// Create a new LP model builder
    pub fn new() -> Self {
        Self {
            variables: Vec::new(),
            constraints: Vec::new(),
            objective: None,
            time_limit: None,
            _brand: PhantomData,
        }
    }

    /// Add a named variable to the model
    pub fn add_variable(
        &mut self,
        name: impl Into<Arc<str>>,
        var_type: VariableType,
        lower_bound: f64,
        upper_bound: f64,
    ) -> VariableId<Brand> {
        let var_id = VariableId {
            id: self.variables.len(),
            _brand: PhantomData,
        };
        self.variables.push(VariableInfo {
            name: name.into(),
            var_type,
            lower_bound,
            upper_bound,
        });
        var_id
    }

    /// Add a constraint to the model
    pub fn add_constraint(&mut self, constraint: Constraint<Brand>) -> ConstraintId {
        let constr_id = ConstraintId(self.constraints.len());
        self.constraints.push(constraint);
        constr_id
    }

    /// Set the objective function
    pub fn set_objective(
        &mut self,
        expression: impl Into<LinearExpression<Brand>>,
        sense: OptimisationSense,
    ) {
        self.objective = Some(ObjectiveInfo {
            expression: expression.into(),
            sense,
        });
    }

    /// Limit the backend's wall-clock solve time. A run that hits the limit
    /// without proving a status surfaces as a solver error, not as
    /// infeasibility.
    pub fn set_time_limit(&mut self, limit: Duration) {
        self.time_limit = Some(limit);
    }

    /// Solve the model using the configured backend
    pub fn solve(&self) -> Result<LPSolution<Brand>> {
        let solver = SolverBackend::from_env_or_default()?;

        match solver {
            #[cfg(feature = "gurobi")]
            SolverBackend::Gurobi => crate::lp_solver::gurobi::solve_gurobi(self),

            #[cfg(feature = "coin_cbc")]
            SolverBackend::CoinCbc => crate::lp_solver::coin_cbc::solve_coin_cbc(self),
        }
    }
}

impl<Brand> Default for LPModelBuilder<Brand> {
    fn default() -> Self {
        Self::new()
    }
}

// Macros for convenient syntax
pub mod macros;

// Operator overloading for linear expressions
pub mod ops;

pub mod output_suppression;

#[cfg(feature = "gurobi")]
pub mod gurobi;

#[cfg(feature = "coin_cbc")]
pub mod coin_cbc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{constraint, lp_model_builder};

    #[test]
    fn test_constraint_macro() {
        let mut builder = lp_model_builder!();
        let x = builder.add_variable("x", VariableType::Continuous, 0.0, 10.0);
        let y = builder.add_variable("y", VariableType::Continuous, 0.0, 10.0);

        let c = constraint!((x + y) == 10.0);
        assert_eq!(c.sense, ConstraintSense::Equal);
        assert_eq!(c.rhs, 10.0);

        let c = constraint!((2.0 * x) <= 5.0);
        assert_eq!(c.sense, ConstraintSense::LessEqual);
        assert_eq!(c.rhs, 5.0);

        let c = constraint!((x - y) >= 0.0);
        assert_eq!(c.sense, ConstraintSense::GreaterEqual);
        assert_eq!(c.rhs, 0.0);
    }

    #[test]
    fn test_named_constraint_macro() {
        let mut builder = lp_model_builder!();
        let x = builder.add_variable("x", VariableType::Integer, 0.0, f64::INFINITY);

        let c = constraint!("capacity_x", (x) <= 120.0);
        assert_eq!(c.name(), "capacity_x");
        assert_eq!(c.sense, ConstraintSense::LessEqual);

        let unnamed = constraint!((x) >= 0.0);
        assert_eq!(unnamed.name(), "");
    }

    #[test]
    fn test_constraint_macro_with_builder() {
        let mut builder = lp_model_builder!();
        let x = builder.add_variable("x", VariableType::Continuous, 0.0, 10.0);
        let y = builder.add_variable("y", VariableType::Continuous, 0.0, 10.0);

        builder.add_constraint(constraint!((x + y) == 10.0));
        builder.add_constraint(constraint!((x) <= 5.0));

        assert_eq!(builder.constraints.len(), 2);
    }

    #[test]
    fn test_constraint_builders() {
        let mut builder = lp_model_builder!();
        let x = builder.add_variable("x", VariableType::Continuous, 0.0, 10.0);

        let c = Constraint::eq("balance", x + 5.0, 10.0);
        assert_eq!(c.sense, ConstraintSense::Equal);

        let c = Constraint::le("cap", x * 2.0, 10.0);
        assert_eq!(c.sense, ConstraintSense::LessEqual);

        let c = Constraint::ge("demand", x - 1.0, 0.0);
        assert_eq!(c.sense, ConstraintSense::GreaterEqual);
    }

    #[test]
    fn test_variable_names_recorded() {
        let mut builder = lp_model_builder!();
        let _ = builder.add_variable(
            "x[supplier1,factory1]",
            VariableType::Integer,
            0.0,
            f64::INFINITY,
        );
        assert_eq!(&*builder.variables[0].name, "x[supplier1,factory1]");
        assert_eq!(builder.variables[0].var_type, VariableType::Integer);
    }

    #[test]
    fn test_add_variable_to_linear_expression() {
        let mut builder = lp_model_builder!();
        let x = builder.add_variable("x", VariableType::Continuous, 0.0, 10.0);
        let y = builder.add_variable("y", VariableType::Continuous, 0.0, 10.0);

        let expr = 2.0 * x + 5.0;

        assert_eq!(expr.terms.len(), 1);
        assert_eq!(expr.terms[0].coefficient, 2.0);
        assert_eq!(expr.terms[0].variable, x);
        assert_eq!(expr.constant, 5.0);

        let result = expr + y;

        assert_eq!(result.terms.len(), 2, "Result should have exactly two terms");
        assert_eq!(result.constant, 5.0, "Constant should be preserved as 5.0");
        assert_eq!(result.terms[1].coefficient, 1.0);
        assert_eq!(result.terms[1].variable, y);
    }
}
