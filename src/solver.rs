//! Solving an assembled problem with HiGHS.
use crate::builder::ModelProblem;
use crate::cost::annual_cost_of_component;
use crate::expression::Expression;
use crate::registry::{ComponentID, CostKind};
use crate::timescale::PeriodID;
use crate::units::Money;
use anyhow::{Result, anyhow};
use highs::{HighsModelStatus, RowProblem as Problem, Sense};
use log::info;

/// The values of the decision variables at the optimum, along with the problem they solve
#[derive(Debug, Clone, PartialEq)]
pub struct Solution<'a> {
    problem: ModelProblem<'a>,
    values: Vec<f64>,
}

impl<'a> Solution<'a> {
    /// The problem which was solved
    pub fn problem(&self) -> &ModelProblem<'a> {
        &self.problem
    }

    /// Evaluate an expression at the optimum
    pub fn value_of(&self, expression: &Expression) -> f64 {
        expression.evaluate(&self.values)
    }

    /// The discounted cost of a period at the optimum
    pub fn system_cost_per_period(&self, period: &PeriodID) -> Money {
        Money(self.value_of(self.problem.costs().system_cost_per_period(period)))
    }

    /// The total discounted cost at the optimum.
    ///
    /// This is calculated from the period costs, so is exactly their sum.
    pub fn system_cost(&self) -> Money {
        self.problem
            .timescales()
            .iter_periods()
            .map(|period| self.system_cost_per_period(&period.id))
            .sum()
    }

    /// The undiscounted annual cost of a component in a period, at the optimum
    pub fn annual_cost_of_component(
        &self,
        kind: CostKind,
        component: &ComponentID,
        period: &PeriodID,
    ) -> Result<Money> {
        let expression = annual_cost_of_component(
            self.problem.quantities(),
            self.problem.timescales(),
            kind,
            component,
            period,
        )?;
        Ok(Money(self.value_of(&expression)))
    }
}

impl<'a> ModelProblem<'a> {
    /// Minimise `SystemCost` subject to the problem's constraints
    pub fn solve(self) -> Result<Solution<'a>> {
        let mut problem = Problem::default();

        // HiGHS has no objective offset, so the constant part of the objective is ignored here and
        // included when the costs are evaluated
        let mut objective = vec![0.0; self.variables().len()];
        for (var, coeff) in self.costs().system_cost().iter_terms() {
            objective[var.index()] = coeff;
        }
        let columns: Vec<_> = self
            .variables()
            .iter()
            .map(|(var, def)| problem.add_column(objective[var.index()], def.min..=def.max))
            .collect();

        let mut num_rows = 0;
        for constraint in self.iter_constraints() {
            let constant = constraint.expression.constant_value();
            let terms = constraint
                .expression
                .iter_terms()
                .map(|(var, coeff)| (columns[var.index()], coeff));
            problem.add_row((constraint.min - constant)..=(constraint.max - constant), terms);
            num_rows += 1;
        }
        info!(
            "Solving problem with {} columns and {num_rows} rows",
            columns.len()
        );

        let mut highs_model = problem.optimise(Sense::Minimise);
        enable_highs_logging(&mut highs_model);

        let solved = highs_model.solve();
        match solved.status() {
            HighsModelStatus::Optimal => {
                let values = solved.get_solution().columns().to_vec();
                let solution = Solution {
                    problem: self,
                    values,
                };
                info!("Optimal system cost: {}", solution.system_cost());
                Ok(solution)
            }
            status => Err(anyhow!("Could not solve: {status:?}")),
        }
    }
}

/// Enable logging for the HiGHS solver
fn enable_highs_logging(model: &mut highs::Model) {
    // Skip this step if logging is disabled (e.g. when running tests)
    if let Ok(log_level) = std::env::var(crate::log::LOG_LEVEL_ENV_VAR) {
        if log_level.eq_ignore_ascii_case("off") {
            return;
        }
    }

    model.set_option("log_to_console", true);
    model.set_option("output_flag", true);
}
