//! Helpers for checking the files written by a model run.
#![allow(dead_code)]
use float_cmp::assert_approx_eq;
use itertools::Itertools;
use serde::Deserialize;
use std::path::Path;

#[derive(Deserialize)]
pub struct ElectricityCostRow {
    #[serde(rename = "PERIOD")]
    pub period: String,
    #[serde(rename = "SystemCostPerPeriod_NPV")]
    pub system_cost_npv: f64,
    #[serde(rename = "SystemCostPerPeriod_Real")]
    pub system_cost_real: f64,
    #[serde(rename = "SystemDemand_MWh")]
    pub system_demand: f64,
}

#[derive(Deserialize)]
pub struct CostItemRow {
    #[serde(rename = "PERIOD")]
    pub period: String,
    #[serde(rename = "Component_type")]
    pub component_type: String,
    #[serde(rename = "AnnualCost_NPV")]
    pub annual_cost_npv: f64,
}

/// Read every row of a CSV file in the output folder
pub fn read_rows<T: for<'de> Deserialize<'de>>(output_dir: &Path, file_name: &str) -> Vec<T> {
    csv::Reader::from_path(output_dir.join(file_name))
        .unwrap()
        .into_deserialize()
        .try_collect()
        .unwrap()
}

/// Read the header and records of `load_balance.csv`
pub fn read_load_balance(output_dir: &Path) -> (Vec<String>, Vec<csv::StringRecord>) {
    let mut reader = csv::Reader::from_path(output_dir.join("load_balance.csv")).unwrap();
    let header = reader.headers().unwrap().iter().map(String::from).collect();
    let records = reader.records().try_collect().unwrap();

    (header, records)
}

/// Check that itemised costs add up to the cost of each period
pub fn check_costs_add_up(output_dir: &Path) {
    let costs: Vec<ElectricityCostRow> = read_rows(output_dir, "electricity_cost.csv");
    let items: Vec<CostItemRow> = read_rows(output_dir, "costs_itemized.csv");
    assert!(!costs.is_empty());

    // Annual components are listed before timepoint components
    let first_timepoint = items
        .iter()
        .position(|item| item.component_type == "timepoint")
        .unwrap();
    assert!(
        items[first_timepoint..]
            .iter()
            .all(|item| item.component_type == "timepoint")
    );

    for cost in &costs {
        let total: f64 = items
            .iter()
            .filter(|item| item.period == cost.period)
            .map(|item| item.annual_cost_npv)
            .sum();
        assert_approx_eq!(f64, total, cost.system_cost_npv, epsilon = 1e-6 * total.abs());
        assert!(cost.system_cost_real > 0.0);
        assert!(cost.system_demand > 0.0);
    }
}
