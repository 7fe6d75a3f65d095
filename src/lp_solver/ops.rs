//! Operator overloading for linear programming expressions
//!
//! Variables and expressions support natural arithmetic operators:
//!
//! ```ignore
//! let expr1 = x + y;             // Addition
//! let expr2 = x - y;             // Subtraction
//! let expr3 = 2.0 * x;           // Scalar multiplication (left)
//! let expr4 = x * 2.0;           // Scalar multiplication (right)
//! let expr5 = x + 2.0 * y + 5.0; // Complex expressions
//! ```
//!
//! `LinearExpression` also implements `Sum` over both variables and
//! expressions, so a constraint body over a whole shipment family can be
//! written as an iterator chain:
//!
//! ```ignore
//! let inbound: LinearExpression<_> = routes.iter().map(|r| vars[r]).sum();
//! ```
//!
//! All operations maintain the brand type parameter, ensuring variables from
//! different models cannot be accidentally mixed.

use super::{LinearExpression, LinearTerm, VariableId};

// ============================================================================
// Operators for LinearExpression
// ============================================================================

impl<Brand> std::ops::Add<LinearExpression<Brand>> for LinearExpression<Brand> {
    type Output = LinearExpression<Brand>;

    fn add(self, other: LinearExpression<Brand>) -> Self::Output {
        let mut terms = self.terms;
        terms.extend(other.terms);
        LinearExpression {
            terms,
            constant: self.constant + other.constant,
        }
    }
}

impl<Brand> std::ops::Add<VariableId<Brand>> for LinearExpression<Brand> {
    type Output = LinearExpression<Brand>;

    fn add(mut self, other: VariableId<Brand>) -> Self::Output {
        self.add_term(1.0, other);
        self
    }
}

impl<Brand> std::ops::Add<f64> for LinearExpression<Brand> {
    type Output = LinearExpression<Brand>;

    fn add(self, other: f64) -> Self::Output {
        LinearExpression {
            terms: self.terms,
            constant: self.constant + other,
        }
    }
}

impl<Brand> std::ops::Sub<LinearExpression<Brand>> for LinearExpression<Brand> {
    type Output = LinearExpression<Brand>;

    fn sub(self, other: LinearExpression<Brand>) -> Self::Output {
        let mut terms = self.terms;
        terms.extend(other.terms.into_iter().map(|term| LinearTerm {
            coefficient: -term.coefficient,
            variable: term.variable,
        }));
        LinearExpression {
            terms,
            constant: self.constant - other.constant,
        }
    }
}

impl<Brand> std::ops::Sub<VariableId<Brand>> for LinearExpression<Brand> {
    type Output = LinearExpression<Brand>;

    fn sub(mut self, other: VariableId<Brand>) -> Self::Output {
        self.add_term(-1.0, other);
        self
    }
}

impl<Brand> std::ops::Sub<f64> for LinearExpression<Brand> {
    type Output = LinearExpression<Brand>;

    fn sub(self, other: f64) -> Self::Output {
        LinearExpression {
            terms: self.terms,
            constant: self.constant - other,
        }
    }
}

impl<Brand> std::ops::Mul<f64> for LinearExpression<Brand> {
    type Output = LinearExpression<Brand>;

    fn mul(self, other: f64) -> Self::Output {
        LinearExpression {
            terms: self
                .terms
                .into_iter()
                .map(|term| LinearTerm {
                    coefficient: term.coefficient * other,
                    variable: term.variable,
                })
                .collect(),
            constant: self.constant * other,
        }
    }
}

impl<Brand> std::ops::Mul<LinearExpression<Brand>> for f64 {
    type Output = LinearExpression<Brand>;

    fn mul(self, other: LinearExpression<Brand>) -> Self::Output {
        other * self
    }
}

// ============================================================================
// Operators for VariableId
// ============================================================================

impl<Brand> std::ops::Add<LinearExpression<Brand>> for VariableId<Brand> {
    type Output = LinearExpression<Brand>;

    fn add(self, other: LinearExpression<Brand>) -> Self::Output {
        LinearExpression::from_variable(self) + other
    }
}

impl<Brand> std::ops::Add<VariableId<Brand>> for VariableId<Brand> {
    type Output = LinearExpression<Brand>;

    fn add(self, other: VariableId<Brand>) -> Self::Output {
        LinearExpression::from_variable(self) + other
    }
}

impl<Brand> std::ops::Add<f64> for VariableId<Brand> {
    type Output = LinearExpression<Brand>;

    fn add(self, other: f64) -> Self::Output {
        LinearExpression::from_variable(self) + other
    }
}

impl<Brand> std::ops::Sub<VariableId<Brand>> for VariableId<Brand> {
    type Output = LinearExpression<Brand>;

    fn sub(self, other: VariableId<Brand>) -> Self::Output {
        LinearExpression::from_variable(self) - other
    }
}

impl<Brand> std::ops::Sub<LinearExpression<Brand>> for VariableId<Brand> {
    type Output = LinearExpression<Brand>;

    fn sub(self, other: LinearExpression<Brand>) -> Self::Output {
        LinearExpression::from_variable(self) - other
    }
}

impl<Brand> std::ops::Sub<f64> for VariableId<Brand> {
    type Output = LinearExpression<Brand>;

    fn sub(self, other: f64) -> Self::Output {
        LinearExpression::from_variable(self) - other
    }
}

impl<Brand> std::ops::Mul<f64> for VariableId<Brand> {
    type Output = LinearExpression<Brand>;

    fn mul(self, other: f64) -> Self::Output {
        LinearExpression::from_variable(self) * other
    }
}

impl<Brand> std::ops::Mul<VariableId<Brand>> for f64 {
    type Output = LinearExpression<Brand>;

    fn mul(self, other: VariableId<Brand>) -> Self::Output {
        other * self
    }
}

// ============================================================================
// Reverse operators for f64
// ============================================================================

impl<Brand> std::ops::Add<VariableId<Brand>> for f64 {
    type Output = LinearExpression<Brand>;

    fn add(self, other: VariableId<Brand>) -> Self::Output {
        LinearExpression::from_variable(other) + self
    }
}

impl<Brand> std::ops::Add<LinearExpression<Brand>> for f64 {
    type Output = LinearExpression<Brand>;

    fn add(self, other: LinearExpression<Brand>) -> Self::Output {
        other + self
    }
}

// ============================================================================
// Sums over families of variables and expressions
// ============================================================================

impl<Brand> std::iter::Sum<LinearExpression<Brand>> for LinearExpression<Brand> {
    fn sum<I: Iterator<Item = LinearExpression<Brand>>>(iter: I) -> Self {
        iter.fold(LinearExpression::new(0.0), |acc, expr| acc + expr)
    }
}

impl<Brand> std::iter::Sum<VariableId<Brand>> for LinearExpression<Brand> {
    fn sum<I: Iterator<Item = VariableId<Brand>>>(iter: I) -> Self {
        iter.fold(LinearExpression::new(0.0), |acc, var| acc + var)
    }
}

#[cfg(test)]
mod tests {
    use crate::lp_model_builder;
    use crate::lp_solver::{LinearExpression, VariableType};

    #[test]
    fn test_branded_type_safety() {
        let mut builder1 = lp_model_builder!();
        let mut builder2 = lp_model_builder!();

        let x = builder1.add_variable("x", VariableType::Continuous, 0.0, 10.0);
        let y = builder2.add_variable("y", VariableType::Continuous, 0.0, 10.0);

        let _expr1 = x + 2.0;
        let _expr2 = y * 3.0;

        // This would NOT compile (uncomment to verify):
        // let _mixed = x + y;  // ERROR: different brands
    }

    #[test]
    fn test_expression_operations() {
        let mut builder = lp_model_builder!();
        let x = builder.add_variable("x", VariableType::Continuous, 0.0, 10.0);
        let y = builder.add_variable("y", VariableType::Continuous, 0.0, 10.0);

        let expr = 2.0 * x + 3.0 * y + 5.0;
        assert_eq!(expr.constant, 5.0);
        assert_eq!(expr.terms.len(), 2);

        let expr2 = x + y;
        let expr3 = x - y;
        let expr4 = 2.0 * x;
        let expr5 = x * 2.0;

        assert_eq!(expr2.terms.len(), 2);
        assert_eq!(expr3.terms.len(), 2);
        assert_eq!(expr3.terms[1].coefficient, -1.0);
        assert_eq!(expr4.terms.len(), 1);
        assert_eq!(expr5.terms.len(), 1);
    }

    #[test]
    fn test_sum_over_variables() {
        let mut builder = lp_model_builder!();
        let vars: Vec<_> = (0..4)
            .map(|i| {
                builder.add_variable(
                    format!("x{}", i),
                    VariableType::Integer,
                    0.0,
                    f64::INFINITY,
                )
            })
            .collect();

        let total: LinearExpression<_> = vars.iter().copied().sum();
        assert_eq!(total.terms.len(), 4);
        assert_eq!(total.constant, 0.0);
        assert!(total.terms.iter().all(|t| t.coefficient == 1.0));
    }

    #[test]
    fn test_sum_over_expressions() {
        let mut builder = lp_model_builder!();
        let x = builder.add_variable("x", VariableType::Integer, 0.0, f64::INFINITY);
        let y = builder.add_variable("y", VariableType::Integer, 0.0, f64::INFINITY);

        let total: LinearExpression<_> = [4.0 * x, 3.0 * y].into_iter().sum();
        assert_eq!(total.terms.len(), 2);
        assert_eq!(total.terms[0].coefficient, 4.0);
        assert_eq!(total.terms[1].coefficient, 3.0);
    }
}
