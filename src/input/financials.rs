//! Code for reading financial parameters from a CSV file.
use super::*;
use crate::finance::Financials;
use serde::Deserialize;

const FINANCIALS_FILE_NAME: &str = "financials.csv";

/// The contents of the financials file.
///
/// Every parameter is mandatory, but is read as optional so that an empty cell or missing column
/// can be reported as missing data.
#[derive(Debug, Deserialize, PartialEq)]
struct FinancialsRaw {
    #[serde(default)]
    base_financial_year: Option<u32>,
    #[serde(default)]
    dollar_year: Option<u32>,
    #[serde(default)]
    discount_rate: Option<Dimensionless>,
}

/// Read the model's financial parameters.
///
/// The file must have exactly one row.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
pub fn read_financials(model_dir: &Path) -> Result<Financials> {
    let file_path = model_dir.join(FINANCIALS_FILE_NAME);
    read_financials_from_iter(read_csv(&file_path)?).with_context(|| input_err_msg(&file_path))
}

fn read_financials_from_iter<I>(mut iter: I) -> Result<Financials>
where
    I: Iterator<Item = FinancialsRaw>,
{
    let raw = iter.next().context("No financial parameters given")?;
    ensure!(
        iter.next().is_none(),
        "Financial parameters must be given on a single row"
    );

    let base_financial_year = require_value(
        raw.base_financial_year,
        "base_financial_year",
        FINANCIALS_FILE_NAME,
    )?;
    let dollar_year = require_value(raw.dollar_year, "dollar_year", FINANCIALS_FILE_NAME)?;
    let discount_rate = require_value(raw.discount_rate, "discount_rate", FINANCIALS_FILE_NAME)?;
    ensure!(
        discount_rate.is_finite() && discount_rate >= Dimensionless(0.0),
        "discount_rate must be a finite, non-negative number"
    );

    Ok(Financials {
        base_financial_year,
        dollar_year,
        discount_rate,
    })
}
