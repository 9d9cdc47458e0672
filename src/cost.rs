//! Aggregation of cost components into the objective function.
//!
//! Cost components are registered by name in one of two lists. Components in
//! `Cost_Components_Per_TP` are in real $/hour and indexed by timepoint; components in
//! `Cost_Components_Per_Period` are in real $/year and indexed by period. For each period, these
//! are combined into an annual cost, which is then discounted back to the base financial year to
//! give `SystemCostPerPeriod`. The objective, `SystemCost`, is the sum of these over all periods.
use crate::error::ModelError;
use crate::expression::{Expression, QuantityTable, lookup};
use crate::finance::DiscountFactors;
use crate::registry::{ComponentID, ComponentRegistry, CostKind};
use crate::timescale::{PeriodID, Timescales};
use indexmap::IndexMap;

/// The discounted cost of each period and of the whole study
#[derive(Debug, Clone, PartialEq)]
pub struct SystemCosts {
    per_period: IndexMap<PeriodID, Expression>,
    total: Expression,
}

impl SystemCosts {
    /// `SystemCostPerPeriod`: the NPV in the base year of all costs incurred in a period.
    ///
    /// # Panics
    ///
    /// If the period is not part of the model.
    pub fn system_cost_per_period(&self, period: &PeriodID) -> &Expression {
        &self.per_period[period]
    }

    /// `SystemCost`: the NPV of all costs over the study. This is the objective to be minimised.
    pub fn system_cost(&self) -> &Expression {
        &self.total
    }
}

/// The undiscounted annual cost of a single component in a period.
///
/// For a per-period component this is its value in the period. For a per-timepoint component it
/// is the sum over the period's timepoints of the hourly cost weighted by the hours per year each
/// timepoint represents.
pub fn annual_cost_of_component(
    quantities: &QuantityTable,
    timescales: &Timescales,
    kind: CostKind,
    component: &ComponentID,
    period: &PeriodID,
) -> Result<Expression, ModelError> {
    let undefined = || ModelError::UndefinedComponent {
        list: kind.list_name(),
        component: component.to_string(),
    };

    match kind {
        CostKind::PerPeriod => {
            let quantity = quantities.period(component).ok_or_else(undefined)?;
            Ok(lookup(quantity, component, period)?.clone())
        }
        CostKind::PerTimepoint => {
            let quantity = quantities.timepoint(component).ok_or_else(undefined)?;
            let mut total = Expression::default();
            for tp in timescales.iter_timepoints_in_period(period) {
                total += &(lookup(quantity, component, &tp.id)? * tp.weight_in_year.value());
            }
            Ok(total)
        }
    }
}

/// Build `SystemCostPerPeriod` and `SystemCost` from a frozen registry.
///
/// Per-period components are summed and discounted with the period's annual factor. Per-timepoint
/// components are discounted with the timepoint's factor, which already includes the timepoint's
/// share of the year, so the two routes give the same result for the same annual cost.
pub fn build_system_costs(
    registry: &ComponentRegistry,
    quantities: &QuantityTable,
    timescales: &Timescales,
    discount_factors: &DiscountFactors,
) -> Result<SystemCosts, ModelError> {
    if !registry.is_frozen() {
        return Err(ModelError::RegistryNotFrozen("Objective function"));
    }

    let mut per_period = IndexMap::new();
    for period in timescales.iter_periods() {
        let mut annual = Expression::default();
        for component in registry.cost_list(CostKind::PerPeriod).entries()? {
            annual += &annual_cost_of_component(
                quantities,
                timescales,
                CostKind::PerPeriod,
                component,
                &period.id,
            )?;
        }
        let annual_factor = discount_factors.bring_annual_costs_to_base_year(&period.id);
        let mut cost = &annual * annual_factor.value();

        for component in registry.cost_list(CostKind::PerTimepoint).entries()? {
            let quantity =
                quantities
                    .timepoint(component)
                    .ok_or_else(|| ModelError::UndefinedComponent {
                        list: CostKind::PerTimepoint.list_name(),
                        component: component.to_string(),
                    })?;
            for tp in timescales.iter_timepoints_in_period(&period.id) {
                let factor = discount_factors.bring_timepoint_costs_to_base_year(&tp.id);
                cost += &(lookup(quantity, component, &tp.id)? * factor.value());
            }
        }

        per_period.insert(period.id.clone(), cost);
    }

    let total = per_period.values().sum();
    Ok(SystemCosts { per_period, total })
}
