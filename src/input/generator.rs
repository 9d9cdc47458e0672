//! Code for reading generation projects from CSV files.
use super::*;
use crate::generator::{GenerationProjects, Generator, GeneratorID, GeneratorMap};
use crate::id::IDCollection;
use crate::timescale::Timescales;
use crate::units::{MoneyPerCapacity, MoneyPerEnergy, Power};
use crate::zone::ZoneID;
use indexmap::IndexMap;
use serde::Deserialize;

const GENERATION_PROJECTS_FILE_NAME: &str = "generation_projects.csv";
const CAPACITY_FACTORS_FILE_NAME: &str = "variable_capacity_factors.csv";

/// A generation project, as read from file
#[derive(Debug, Deserialize, PartialEq)]
struct GeneratorRaw {
    #[serde(rename = "GENERATION_PROJECT")]
    id: String,
    gen_load_zone: String,
    gen_capacity_mw: Power,
    gen_variable_om: MoneyPerEnergy,
    gen_fixed_om: MoneyPerCapacity,
}

/// A maximum capacity factor for a generator in a timepoint, as read from file
#[derive(Debug, Deserialize, PartialEq)]
struct CapacityFactorRaw {
    #[serde(rename = "GENERATION_PROJECT")]
    generator_id: String,
    timepoint: String,
    #[serde(deserialize_with = "deserialise_proportion")]
    gen_max_capacity_factor: Dimensionless,
}

/// Read generation projects from the model directory.
///
/// Both files are optional. A model without generation projects can only be solved if something
/// else meets demand.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `zones` - The model's load zones
/// * `timescales` - The model's periods and timepoints
pub fn read_generators(
    model_dir: &Path,
    zones: &IndexSet<ZoneID>,
    timescales: &Timescales,
) -> Result<GenerationProjects> {
    let file_path = model_dir.join(GENERATION_PROJECTS_FILE_NAME);
    let mut generators = read_generators_from_iter(read_csv_optional(&file_path)?, zones)
        .with_context(|| input_err_msg(&file_path))?;

    let file_path = model_dir.join(CAPACITY_FACTORS_FILE_NAME);
    read_capacity_factors_from_iter(
        read_csv_optional(&file_path)?,
        &mut generators,
        timescales,
    )
    .with_context(|| input_err_msg(&file_path))?;

    Ok(GenerationProjects::new(generators))
}

fn read_generators_from_iter<I>(iter: I, zones: &IndexSet<ZoneID>) -> Result<GeneratorMap>
where
    I: Iterator<Item = GeneratorRaw>,
{
    let mut generators = GeneratorMap::new();
    for raw in iter {
        let id = GeneratorID::from(raw.id);
        let load_zone = zones.get_id(&raw.gen_load_zone)?;
        ensure!(
            raw.gen_capacity_mw.is_finite() && raw.gen_capacity_mw >= Power(0.0),
            "Capacity of generator {id} must be a non-negative number"
        );
        ensure!(
            raw.gen_variable_om.is_finite() && raw.gen_fixed_om.is_finite(),
            "Costs of generator {id} must be finite"
        );

        let generator = Generator {
            id: id.clone(),
            load_zone,
            capacity: raw.gen_capacity_mw,
            variable_om: raw.gen_variable_om,
            fixed_om: raw.gen_fixed_om,
            max_capacity_factors: IndexMap::new(),
        };
        ensure!(
            generators.insert(id.clone(), generator).is_none(),
            "Duplicate generator {id}"
        );
    }

    Ok(generators)
}

fn read_capacity_factors_from_iter<I>(
    iter: I,
    generators: &mut GeneratorMap,
    timescales: &Timescales,
) -> Result<()>
where
    I: Iterator<Item = CapacityFactorRaw>,
{
    for raw in iter {
        let generator = generators
            .get_mut(raw.generator_id.as_str())
            .with_context(|| format!("Unknown generator {}", raw.generator_id))?;
        let timepoint = timescales
            .timepoint(&raw.timepoint.as_str().into())
            .with_context(|| format!("Unknown timepoint {}", raw.timepoint))?
            .id
            .clone();
        ensure!(
            generator
                .max_capacity_factors
                .insert(timepoint, raw.gen_max_capacity_factor)
                .is_none(),
            "Duplicate capacity factor for generator {} and timepoint {}",
            raw.generator_id,
            raw.timepoint
        );
    }

    Ok(())
}
