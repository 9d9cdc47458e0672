//! The module responsible for writing output data to disk.
use crate::expression::lookup;
use crate::generator::ZONE_TOTAL_EXCESS_GEN;
use crate::registry::{Bus, ComponentID, CostKind, Direction};
use crate::solver::Solution;
use crate::timescale::PeriodID;
use crate::units::{Energy, Money, MoneyPerEnergy};
use crate::zone::LoadZones;
use anyhow::{Context, Result, ensure};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::fs::File;
use std::path::{Path, PathBuf};
use strum::IntoEnumIterator;

pub mod metadata;

/// The output file name for the energy balance of each zone
const LOAD_BALANCE_FILE_NAME: &str = "load_balance.csv";

/// The output file name for the cost of each period
const ELECTRICITY_COST_FILE_NAME: &str = "electricity_cost.csv";

/// The output file name for the annual cost of each cost component
const COSTS_ITEMIZED_FILE_NAME: &str = "costs_itemized.csv";

/// Get the default output folder for the model at `model_dir`.
///
/// This is a folder with the same name as the model inside `results_root`.
pub fn get_output_dir(model_dir: &Path, results_root: &Path) -> Result<PathBuf> {
    // Canonicalise in case the user has specified "."
    let model_dir = model_dir
        .canonicalize()
        .context("Could not resolve path to model")?;

    let model_name = model_dir
        .file_name()
        .context("Model cannot be in root folder")?
        .to_str()
        .context("Invalid chars in model dir name")?;

    Ok(results_root.join(model_name))
}

/// Create a new output directory, returning whether an existing one was overwritten.
///
/// If the directory exists and isn't empty, `allow_overwrite` must be true, in which case its
/// contents are deleted.
pub fn create_output_directory(output_dir: &Path, allow_overwrite: bool) -> Result<bool> {
    let mut overwrite = false;
    if output_dir.is_dir() {
        if fs::read_dir(output_dir)?.next().is_none() {
            // Empty folders can be reused without complaint
            return Ok(false);
        }

        ensure!(
            allow_overwrite,
            "Output folder already exists and is not empty. Use --overwrite to replace it."
        );
        fs::remove_dir_all(output_dir)?;
        overwrite = true;
    }

    fs::create_dir_all(output_dir)?;

    Ok(overwrite)
}

/// Represents a row in the electricity cost CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct ElectricityCostRow {
    #[serde(rename = "PERIOD")]
    period: PeriodID,
    #[serde(rename = "SystemCostPerPeriod_NPV")]
    system_cost_npv: Money,
    #[serde(rename = "SystemCostPerPeriod_Real")]
    system_cost_real: Money,
    /// Left empty for periods without demand
    #[serde(rename = "EnergyCostReal_per_MWh")]
    energy_cost_real: Option<MoneyPerEnergy>,
    #[serde(rename = "SystemDemand_MWh")]
    system_demand: Energy,
}

/// Represents a row in the itemised costs CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct CostItemRow {
    #[serde(rename = "PERIOD")]
    period: PeriodID,
    #[serde(rename = "Component")]
    component: ComponentID,
    #[serde(rename = "Component_type")]
    component_type: CostKind,
    #[serde(rename = "AnnualCost_NPV")]
    annual_cost_npv: Money,
    #[serde(rename = "AnnualCost_Real")]
    annual_cost_real: Money,
}

/// An object for writing the results of a solved model to file
pub struct DataWriter {
    load_balance_writer: csv::Writer<File>,
    electricity_cost_writer: csv::Writer<File>,
    costs_itemized_writer: csv::Writer<File>,
}

impl DataWriter {
    /// Open CSV files to write output data to
    ///
    /// # Arguments
    ///
    /// * `output_path` - Folder where files will be saved
    pub fn create(output_path: &Path) -> Result<Self> {
        let new_writer = |file_name| {
            let file_path = output_path.join(file_name);
            csv::Writer::from_path(file_path)
        };

        Ok(Self {
            load_balance_writer: new_writer(LOAD_BALANCE_FILE_NAME)?,
            electricity_cost_writer: new_writer(ELECTRICITY_COST_FILE_NAME)?,
            costs_itemized_writer: new_writer(COSTS_ITEMIZED_FILE_NAME)?,
        })
    }

    /// Write the value of every central bus component for each zone and timepoint.
    ///
    /// Columns follow the order in which components were registered: injections, then withdrawals,
    /// then `ZoneTotalExcessGen`, which is zero if no module defines it.
    pub fn write_load_balance(&mut self, solution: &Solution) -> Result<()> {
        let problem = solution.problem();
        let quantities = problem.quantities();
        let lists = problem
            .registry()
            .bus_lists(Bus::Central)
            .context("Model has no central bus")?;
        let mut components = Vec::new();
        for direction in Direction::iter() {
            components.extend(lists.list(direction).entries()?);
        }

        let mut header = vec!["load_zone".to_string(), "timestamp".to_string()];
        header.extend(components.iter().map(|id| id.to_string()));
        header.push(ZONE_TOTAL_EXCESS_GEN.to_string());
        self.load_balance_writer.write_record(&header)?;

        let excess_id = ComponentID::new(ZONE_TOTAL_EXCESS_GEN);
        let excess = quantities.zone_timepoint(&excess_id);
        for zone in problem.zones() {
            for timepoint in problem.timescales().iter_timepoints() {
                let index = (zone.clone(), timepoint.id.clone());
                let mut record = vec![zone.to_string(), timepoint.timestamp.clone()];
                for id in &components {
                    let quantity = quantities
                        .zone_timepoint(id)
                        .with_context(|| format!("Component {id} is not defined"))?;
                    let value = solution.value_of(lookup(quantity, id, &index)?);
                    record.push(value.to_string());
                }

                let excess_value = match excess {
                    Some(quantity) => solution.value_of(lookup(quantity, &excess_id, &index)?),
                    None => 0.0,
                };
                record.push(excess_value.to_string());
                self.load_balance_writer.write_record(&record)?;
            }
        }

        Ok(())
    }

    /// Write the discounted and real cost of each period, along with the average cost of energy
    pub fn write_electricity_cost(
        &mut self,
        solution: &Solution,
        load_zones: &LoadZones,
    ) -> Result<()> {
        let problem = solution.problem();
        for period in problem.timescales().iter_periods() {
            let annual_factor = problem
                .discount_factors()
                .bring_annual_costs_to_base_year(&period.id);
            let system_cost_npv = solution.system_cost_per_period(&period.id);
            let system_cost_real = Money(system_cost_npv.value() / annual_factor.value());
            let system_demand = load_zones.system_demand_in_period_mwh(&period.id);
            let energy_cost_real =
                (system_demand > Energy(0.0)).then(|| system_cost_real / system_demand);

            let row = ElectricityCostRow {
                period: period.id.clone(),
                system_cost_npv,
                system_cost_real,
                energy_cost_real,
                system_demand,
            };
            self.electricity_cost_writer.serialize(row)?;
        }

        Ok(())
    }

    /// Write the annual cost of every registered cost component in every period.
    ///
    /// Per-period components come first, then per-timepoint components.
    pub fn write_costs_itemized(&mut self, solution: &Solution) -> Result<()> {
        let problem = solution.problem();
        for kind in CostKind::iter() {
            for period in problem.timescales().iter_periods() {
                let annual_factor = problem
                    .discount_factors()
                    .bring_annual_costs_to_base_year(&period.id);
                for component in problem.registry().cost_list(kind).entries()? {
                    let annual_cost_real =
                        solution.annual_cost_of_component(kind, component, &period.id)?;
                    let row = CostItemRow {
                        period: period.id.clone(),
                        component: component.clone(),
                        component_type: kind,
                        annual_cost_npv: annual_cost_real * annual_factor,
                        annual_cost_real,
                    };
                    self.costs_itemized_writer.serialize(row)?;
                }
            }
        }

        Ok(())
    }

    /// Flush the underlying streams
    pub fn flush(&mut self) -> Result<()> {
        self.load_balance_writer.flush()?;
        self.electricity_cost_writer.flush()?;
        self.costs_itemized_writer.flush()?;

        Ok(())
    }
}

/// Write all results for a solved model to `output_path`
pub fn write_results(output_path: &Path, solution: &Solution, load_zones: &LoadZones) -> Result<()> {
    let mut writer = DataWriter::create(output_path)?;
    writer.write_load_balance(solution)?;
    writer.write_electricity_cost(solution, load_zones)?;
    writer.write_costs_itemized(solution)?;
    writer.flush()?;
    info!("Results written to {}", output_path.display());

    Ok(())
}
