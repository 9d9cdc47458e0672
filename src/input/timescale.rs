//! Code for reading periods and timepoints from CSV files.
use super::*;
use crate::timescale::{Period, Timepoint, Timescales};
use crate::units::Hours;
use serde::Deserialize;

const PERIODS_FILE_NAME: &str = "periods.csv";
const TIMEPOINTS_FILE_NAME: &str = "timepoints.csv";

/// A period, as read from file
#[derive(Debug, Deserialize, PartialEq)]
struct PeriodRaw {
    #[serde(rename = "INVESTMENT_PERIOD")]
    id: String,
    period_start: u32,
    period_end: u32,
}

impl PeriodRaw {
    fn into_period(self) -> Result<Period> {
        ensure!(
            self.period_end >= self.period_start,
            "Period {} ends before it starts",
            self.id
        );

        Ok(Period {
            id: self.id.into(),
            length_years: f64::from(self.period_end - self.period_start + 1),
        })
    }
}

/// A timepoint, as read from file
#[derive(Debug, Deserialize, PartialEq)]
struct TimepointRaw {
    timepoint_id: String,
    timestamp: String,
    tp_period: String,
    tp_weight: Hours,
}

/// Read periods and timepoints from the model directory.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
pub fn read_timescales(model_dir: &Path) -> Result<Timescales> {
    let periods_path = model_dir.join(PERIODS_FILE_NAME);
    let periods = read_csv::<PeriodRaw>(&periods_path)?
        .map(PeriodRaw::into_period)
        .collect::<Result<Vec<_>>>()
        .with_context(|| input_err_msg(&periods_path))?;

    let timepoints_path = model_dir.join(TIMEPOINTS_FILE_NAME);
    let timepoints = read_timepoints_from_iter(read_csv(&timepoints_path)?, &periods)
        .with_context(|| input_err_msg(&timepoints_path))?;

    Timescales::new(periods, timepoints).with_context(|| input_err_msg(&timepoints_path))
}

fn read_timepoints_from_iter<I>(iter: I, periods: &[Period]) -> Result<Vec<Timepoint>>
where
    I: Iterator<Item = TimepointRaw>,
{
    iter.map(|raw| {
        let period = periods
            .iter()
            .find(|period| *period.id.0 == *raw.tp_period)
            .with_context(|| {
                format!(
                    "Timepoint {} refers to unknown period {}",
                    raw.timepoint_id, raw.tp_period
                )
            })?;

        // The weight is spread evenly over the years of the period
        let weight_in_year = Hours(raw.tp_weight.value() / period.length_years);
        Ok(Timepoint {
            id: raw.timepoint_id.into(),
            period: period.id.clone(),
            weight: raw.tp_weight,
            weight_in_year,
            timestamp: raw.timestamp,
        })
    })
    .collect()
}
