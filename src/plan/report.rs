//! Report rendering for distribution plans.
//!
//! Purely presentational: the writers format a [`PlanOutcome`] for humans
//! (text report with prettytable tables) or downstream tooling (CSV shipment
//! table) without mutating the plan. The report distinguishes the optimal
//! case from solver-reported infeasibility, which is an expected business
//! outcome.

use std::io::Write;

use anyhow::Result;
use prettytable::*;

use crate::network::DistributionNetwork;
use crate::plan::PlanOutcome;

/// Write the human-readable planning report.
///
/// For an optimal outcome: the objective total to two decimal places, every
/// decision variable with strictly positive value, and each factory's
/// capacity. Infeasible and unbounded outcomes produce a single diagnostic
/// line.
pub fn write_report<W: Write>(
    out: &mut W,
    network: &DistributionNetwork,
    outcome: &PlanOutcome,
) -> Result<()> {
    match outcome {
        PlanOutcome::Optimal(plan) => {
            writeln!(out, "Optimal solution found. Total cost: {:.2}", plan.total_cost)?;

            writeln!(out, "\nShipments with positive volume:")?;
            let mut shipments = Table::new();
            shipments.set_titles(row!["Shipment", "Units"]);
            shipments.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
            for shipment in plan.supply.iter().filter(|s| s.units > 0) {
                shipments.add_row(row![
                    format!("x[{},{}]", shipment.supplier, shipment.factory),
                    shipment.units
                ]);
            }
            for delivery in plan.deliveries.iter().filter(|d| d.units > 0) {
                shipments.add_row(row![
                    format!(
                        "y_{}[{},{}]",
                        delivery.grade, delivery.factory, delivery.customer
                    ),
                    delivery.units
                ]);
            }
            shipments.print(out)?;

            writeln!(out, "\nFactory capacities:")?;
            let mut capacities = Table::new();
            capacities.set_titles(row!["Factory", "Units"]);
            capacities.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
            for factory in network.factories() {
                capacities.add_row(row![factory, network.factory_capacity[&factory]]);
            }
            capacities.print(out)?;
        }
        PlanOutcome::Infeasible => {
            writeln!(out, "No feasible solution found.")?;
        }
        PlanOutcome::Unbounded => {
            writeln!(out, "Model is unbounded; the cost tables admit no finite optimum.")?;
        }
    }

    Ok(())
}

/// Write the positive shipments as CSV rows.
///
/// Supplier-to-factory rows leave the grade column empty; delivery rows carry
/// the coal grade. Non-optimal outcomes produce only the header.
pub fn write_shipments_csv<W: Write>(out: &mut W, outcome: &PlanOutcome) -> Result<()> {
    writeln!(out, "origin,destination,grade,units")?;
    if let PlanOutcome::Optimal(plan) = outcome {
        for shipment in plan.supply.iter().filter(|s| s.units > 0) {
            writeln!(
                out,
                "{},{},,{}",
                shipment.supplier, shipment.factory, shipment.units
            )?;
        }
        for delivery in plan.deliveries.iter().filter(|d| d.units > 0) {
            writeln!(
                out,
                "{},{},{},{}",
                delivery.factory, delivery.customer, delivery.grade, delivery.units
            )?;
        }
    }
    Ok(())
}
