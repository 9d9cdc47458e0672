//! General functions related to finance.
//!
//! All dollar amounts reported by the model are in real dollars of the base financial year.
//! Costs entered in `dollar_year` dollars and incurred in future periods are brought back to the
//! base year with the discount rate.
use crate::timescale::{PeriodID, TimepointID, Timescales};
use crate::units::{Dimensionless, Hours};
use indexmap::IndexMap;

/// Financial parameters for the model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Financials {
    /// The year whose dollars all reported costs are expressed in
    pub base_financial_year: u32,
    /// The year for which all financial inputs are entered
    pub dollar_year: u32,
    /// The annual real discount rate
    pub discount_rate: Dimensionless,
}

/// Coefficient converting a uniform series of payments over `years` periods into a present value
/// at the start of the first period.
///
/// Payments are assumed to come at the beginning of each period (an annuity due).
pub fn uniform_series_to_present_value(discount_rate: Dimensionless, years: f64) -> Dimensionless {
    if discount_rate == Dimensionless(0.0) {
        return Dimensionless(years);
    }

    let one = Dimensionless(1.0);
    (one - (one + discount_rate).powf(-years)) / discount_rate * (one + discount_rate)
}

/// Coefficient converting money at some future point back `years` years
pub fn future_to_present_value(discount_rate: Dimensionless, years: f64) -> Dimensionless {
    (Dimensionless(1.0) + discount_rate).powf(-years)
}

/// Coefficient converting money at one point in time to its value `years` years in the future.
///
/// This is the inverse of [`future_to_present_value`] for the same rate and number of years.
pub fn present_to_future_value(interest_rate: Dimensionless, years: f64) -> Dimensionless {
    (Dimensionless(1.0) + interest_rate).powf(years)
}

/// Discount factors bringing costs in each period and timepoint back to the base year.
///
/// These are computed once for a model build and not changed afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscountFactors {
    annual: IndexMap<PeriodID, Dimensionless>,
    timepoint: IndexMap<TimepointID, Hours>,
}

impl DiscountFactors {
    /// Calculate the discount factors for every period and timepoint.
    ///
    /// For each period, the factor for annual costs converts a uniform stream of yearly costs over
    /// the period into a lump sum at the start of the period, then discounts it by the number of
    /// years between the dollar year and the base financial year. The factor for a timepoint is
    /// the factor for its period multiplied by the hours per year it represents, so that a cost
    /// in $/hour multiplied by it gives an NPV.
    pub fn new(financials: &Financials, timescales: &Timescales) -> Self {
        let rate = financials.discount_rate;
        let years_to_base =
            f64::from(financials.dollar_year) - f64::from(financials.base_financial_year);
        let to_base_year = future_to_present_value(rate, years_to_base);

        let annual: IndexMap<_, _> = timescales
            .iter_periods()
            .map(|period| {
                let factor = uniform_series_to_present_value(rate, period.length_years);
                (period.id.clone(), factor * to_base_year)
            })
            .collect();

        let timepoint = timescales
            .iter_timepoints()
            .map(|tp| (tp.id.clone(), annual[&tp.period] * tp.weight_in_year))
            .collect();

        Self { annual, timepoint }
    }

    /// The factor converting uniform annual costs in a period to NPV in the base year.
    ///
    /// # Panics
    ///
    /// If the period is not part of the model.
    pub fn bring_annual_costs_to_base_year(&self, period: &PeriodID) -> Dimensionless {
        self.annual[period]
    }

    /// The factor converting an hourly cost in a timepoint to NPV in the base year.
    ///
    /// # Panics
    ///
    /// If the timepoint is not part of the model.
    pub fn bring_timepoint_costs_to_base_year(&self, timepoint: &TimepointID) -> Hours {
        self.timepoint[timepoint]
    }
}
