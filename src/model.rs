//! The model: all the input data needed to build and solve a planning problem.
use crate::builder::{ModelBuilder, ModelProblem};
use crate::finance::Financials;
use crate::generator::GenerationProjects;
use crate::input::financials::read_financials;
use crate::input::generator::read_generators;
use crate::input::local_td::read_local_td;
use crate::input::timescale::read_timescales;
use crate::input::zone::read_load_zones;
use crate::local_td::LocalTD;
use crate::registry::BusLayout;
use crate::timescale::Timescales;
use crate::zone::LoadZones;
use anyhow::Result;
use log::info;
use std::path::{Path, PathBuf};

pub mod parameters;
pub use parameters::ModelParameters;

/// Model definition
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    /// Path to model folder
    pub model_path: PathBuf,
    /// Periods and timepoints
    pub timescales: Timescales,
    /// Financial parameters
    pub financials: Financials,
    /// Load zones and their demand
    pub load_zones: LoadZones,
    /// Generation projects
    pub generators: GenerationProjects,
    /// Local T&D, if enabled
    pub local_td: Option<LocalTD>,
}

impl Model {
    /// Read a model from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `model_dir` - Folder containing model configuration files
    pub fn from_path<P: AsRef<Path>>(model_dir: P) -> Result<Model> {
        let model_dir = model_dir.as_ref();
        let parameters = ModelParameters::from_path(model_dir)?;
        let timescales = read_timescales(model_dir)?;
        let financials = read_financials(model_dir)?;
        let load_zones = read_load_zones(model_dir, &timescales)?;
        let generators = read_generators(model_dir, load_zones.zones(), &timescales)?;
        let local_td = if parameters.local_td {
            Some(read_local_td(model_dir, load_zones.zones())?)
        } else {
            None
        };

        Ok(Model {
            model_path: model_dir.to_path_buf(),
            timescales,
            financials,
            load_zones,
            generators,
            local_td,
        })
    }

    /// Which buses each zone has
    pub fn bus_layout(&self) -> BusLayout {
        if self.local_td.is_some() {
            BusLayout::WithDistributedBus
        } else {
            BusLayout::CentralOnly
        }
    }

    /// Assemble the optimisation problem from the model's modules
    pub fn build(&self) -> Result<ModelProblem<'_>> {
        info!("Building model with {:?}", self.bus_layout());
        let mut builder = ModelBuilder::new(
            &self.timescales,
            self.load_zones.zones(),
            self.financials,
            self.bus_layout(),
        );

        builder.declare(&self.load_zones)?;
        builder.declare(&self.generators)?;
        if let Some(local_td) = &self.local_td {
            builder.declare(local_td)?;
        }

        builder.finalize()
    }
}
