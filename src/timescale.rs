//! Periods and timepoints.
//!
//! The model is built for a series of multi-year investment periods. Each period is represented
//! by a sample of timepoints, each of which stands in for a number of hours within the period
//! (its weight).
use crate::id::define_id_type;
use crate::units::{Dimensionless, Hours};
use anyhow::{Context, Result, ensure};
use indexmap::IndexMap;
use log::warn;

define_id_type! {PeriodID}
define_id_type! {TimepointID}

/// Hours in a non-leap year
const HOURS_PER_YEAR: f64 = 8760.0;

/// Relative tolerance when checking that timepoint weights add up to a year
const TIME_WEIGHT_TOLERANCE: f64 = 0.01;

/// An investment period
#[derive(Debug, Clone, PartialEq)]
pub struct Period {
    /// The period's ID
    pub id: PeriodID,
    /// The number of years the period spans
    pub length_years: f64,
}

/// A representative sample of time within a period
#[derive(Debug, Clone, PartialEq)]
pub struct Timepoint {
    /// The timepoint's ID
    pub id: TimepointID,
    /// The period to which the timepoint belongs
    pub period: PeriodID,
    /// The number of hours this timepoint represents over the whole period
    pub weight: Hours,
    /// The number of hours this timepoint represents in a typical year of the period
    pub weight_in_year: Hours,
    /// A label for the timepoint, used in output files
    pub timestamp: String,
}

/// The periods and timepoints of a model
#[derive(Debug, Clone, PartialEq)]
pub struct Timescales {
    periods: IndexMap<PeriodID, Period>,
    timepoints: IndexMap<TimepointID, Timepoint>,
    timepoints_in_period: IndexMap<PeriodID, Vec<TimepointID>>,
}

impl Timescales {
    /// Create a new [`Timescales`], checking that the periods and timepoints are consistent.
    ///
    /// Every timepoint must belong to a known period and every period must have at least one
    /// timepoint.
    pub fn new(periods: Vec<Period>, timepoints: Vec<Timepoint>) -> Result<Self> {
        ensure!(!periods.is_empty(), "No periods provided");

        let mut period_map = IndexMap::new();
        for period in periods {
            ensure!(
                period.length_years.is_finite() && period.length_years > 0.0,
                "Length of period {} must be a positive number",
                period.id
            );
            let id = period.id.clone();
            ensure!(
                period_map.insert(id.clone(), period).is_none(),
                "Duplicate period {id}"
            );
        }

        let mut timepoints_in_period: IndexMap<PeriodID, Vec<TimepointID>> = period_map
            .keys()
            .map(|id| (id.clone(), Vec::new()))
            .collect();
        let mut timepoint_map = IndexMap::new();
        for timepoint in timepoints {
            ensure!(
                timepoint.weight.is_finite() && timepoint.weight > Hours(0.0),
                "Weight of timepoint {} must be a positive number",
                timepoint.id
            );
            let tps = timepoints_in_period
                .get_mut(&timepoint.period)
                .with_context(|| {
                    format!(
                        "Timepoint {} refers to unknown period {}",
                        timepoint.id, timepoint.period
                    )
                })?;
            tps.push(timepoint.id.clone());

            let id = timepoint.id.clone();
            ensure!(
                timepoint_map.insert(id.clone(), timepoint).is_none(),
                "Duplicate timepoint {id}"
            );
        }

        for (period_id, tps) in &timepoints_in_period {
            ensure!(!tps.is_empty(), "Period {period_id} has no timepoints");
        }

        let timescales = Self {
            periods: period_map,
            timepoints: timepoint_map,
            timepoints_in_period,
        };
        timescales.check_time_weights();

        Ok(timescales)
    }

    /// Warn if the timepoints in a period don't add up to a full year.
    ///
    /// Annual costs are not scaled to compensate, so the objective will be off by this factor.
    fn check_time_weights(&self) {
        for period in self.periods.values() {
            let hours: Hours = self
                .iter_timepoints_in_period(&period.id)
                .map(|tp| tp.weight_in_year)
                .sum();
            let ratio = hours / Hours(HOURS_PER_YEAR);
            if (ratio - Dimensionless(1.0)).value().abs() > TIME_WEIGHT_TOLERANCE {
                warn!(
                    "Timepoints in period {} represent {} hours per year rather than {}",
                    period.id, hours, HOURS_PER_YEAR
                );
            }
        }
    }

    /// Iterate over the periods, in input order
    pub fn iter_periods(&self) -> indexmap::map::Values<'_, PeriodID, Period> {
        self.periods.values()
    }

    /// Iterate over the timepoints, in input order
    pub fn iter_timepoints(&self) -> indexmap::map::Values<'_, TimepointID, Timepoint> {
        self.timepoints.values()
    }

    /// Iterate over the timepoints in the given period.
    ///
    /// # Panics
    ///
    /// If the period is not part of the model.
    pub fn iter_timepoints_in_period<'a>(
        &'a self,
        period: &PeriodID,
    ) -> impl Iterator<Item = &'a Timepoint> + use<'a> {
        self.timepoints_in_period[period]
            .iter()
            .map(|id| &self.timepoints[id])
    }

    /// Get a period by ID
    pub fn period(&self, id: &PeriodID) -> Option<&Period> {
        self.periods.get(id)
    }

    /// Get a timepoint by ID
    pub fn timepoint(&self, id: &TimepointID) -> Option<&Timepoint> {
        self.timepoints.get(id)
    }

    /// Get the period of a timepoint
    pub fn tp_period(&self, timepoint: &Timepoint) -> &Period {
        // NB: Checked in constructor
        &self.periods[&timepoint.period]
    }

    /// The number of periods
    pub fn num_periods(&self) -> usize {
        self.periods.len()
    }

    /// The number of timepoints
    pub fn num_timepoints(&self) -> usize {
        self.timepoints.len()
    }
}
