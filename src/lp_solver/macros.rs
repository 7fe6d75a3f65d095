//! Macros for the LP solver module
//!
//! This module contains all the macros used by the LP solver, providing
//! convenient syntax for creating models and constraints.

/// Create a new LP model builder with a unique brand
///
/// This macro ensures that each model builder has a unique type-level brand,
/// preventing accidental mixing of variables between different models.
///
/// # Examples
///
/// ```rust
/// use coalflow::lp_model_builder;
/// use coalflow::lp_solver::VariableType;
///
/// // Anonymous brand (each call creates unique anonymous type)
/// let mut builder = lp_model_builder!();
/// let x = builder.add_variable("x", VariableType::Integer, 0.0, f64::INFINITY);
///
/// // Named brand (easier to identify in type system and errors)
/// let mut shipment_model = lp_model_builder!(ShipmentModel);
/// let units = shipment_model.add_variable("units", VariableType::Integer, 0.0, 100.0);
///
/// // This would cause a compile-time error due to different brands:
/// // builder.add_constraint(coalflow::constraint!((units) <= 50.0)); // ERROR!
/// ```
#[macro_export]
macro_rules! lp_model_builder {
    // Named brand - user provides the brand name
    ($brand_name:ident) => {{
        struct $brand_name;
        $crate::lp_solver::LPModelBuilder::<$brand_name>::new()
    }};

    // Anonymous brand - the `UniqueBrand` struct is defined locally within the
    // `{{ ... }}` block, so each macro invocation creates a fresh scope with its
    // own distinct `UniqueBrand` type
    () => {{
        struct UniqueBrand;
        $crate::lp_solver::LPModelBuilder::<UniqueBrand>::new()
    }};
}

/// Create constraints using natural comparison syntax
///
/// This macro provides a declarative way to create `Constraint` objects using
/// comparison-like syntax. The left-hand side must be in parentheses. An
/// optional first argument names the constraint for solver diagnostics.
///
/// # Examples
///
/// ```rust
/// use coalflow::constraint;
/// use coalflow::lp_model_builder;
/// use coalflow::lp_solver::VariableType;
///
/// let mut builder = lp_model_builder!();
/// let x = builder.add_variable("x", VariableType::Integer, 0.0, f64::INFINITY);
/// let y = builder.add_variable("y", VariableType::Integer, 0.0, f64::INFINITY);
///
/// // Unnamed constraints
/// let c1 = constraint!((x + y) == 10.0);
/// let c2 = constraint!((2.0 * x) <= 5.0);
///
/// // Named constraints
/// builder.add_constraint(constraint!("flow_balance", (x - y) == 0.0));
/// builder.add_constraint(constraint!(format!("capacity_{}", "f1"), (x) <= 120.0));
/// ```
#[macro_export]
macro_rules! constraint {
    // Unnamed constraints (most common case)
    (($lhs:expr) == $rhs:expr) => {
        $crate::lp_solver::Constraint::new(
            std::sync::Arc::<str>::from(""),
            $lhs,
            $crate::lp_solver::ConstraintSense::Equal,
            $rhs as f64,
        )
    };
    (($lhs:expr) <= $rhs:expr) => {
        $crate::lp_solver::Constraint::new(
            std::sync::Arc::<str>::from(""),
            $lhs,
            $crate::lp_solver::ConstraintSense::LessEqual,
            $rhs as f64,
        )
    };
    (($lhs:expr) >= $rhs:expr) => {
        $crate::lp_solver::Constraint::new(
            std::sync::Arc::<str>::from(""),
            $lhs,
            $crate::lp_solver::ConstraintSense::GreaterEqual,
            $rhs as f64,
        )
    };

    // Named constraints (with name parameter)
    ($name:expr, ($lhs:expr) == $rhs:expr) => {
        $crate::lp_solver::Constraint::new(
            std::sync::Arc::<str>::from($name),
            $lhs,
            $crate::lp_solver::ConstraintSense::Equal,
            $rhs as f64,
        )
    };
    ($name:expr, ($lhs:expr) <= $rhs:expr) => {
        $crate::lp_solver::Constraint::new(
            std::sync::Arc::<str>::from($name),
            $lhs,
            $crate::lp_solver::ConstraintSense::LessEqual,
            $rhs as f64,
        )
    };
    ($name:expr, ($lhs:expr) >= $rhs:expr) => {
        $crate::lp_solver::Constraint::new(
            std::sync::Arc::<str>::from($name),
            $lhs,
            $crate::lp_solver::ConstraintSense::GreaterEqual,
            $rhs as f64,
        )
    };
}
