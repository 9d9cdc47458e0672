//! Code for reading load zones and demand from CSV files.
use super::*;
use crate::error::ModelError;
use crate::id::IDCollection;
use crate::timescale::Timescales;
use crate::units::Power;
use crate::zone::{DemandMap, LoadZones, ZONE_DEMAND_MW, ZoneID};
use serde::Deserialize;

const LOAD_ZONES_FILE_NAME: &str = "load_zones.csv";
const LOADS_FILE_NAME: &str = "loads.csv";

/// Demand for a zone and timepoint, as read from file
#[derive(Debug, Deserialize, PartialEq)]
struct DemandRaw {
    #[serde(rename = "LOAD_ZONE")]
    zone: String,
    #[serde(rename = "TIMEPOINT")]
    timepoint: String,
    #[serde(default)]
    zone_demand_mw: Option<Power>,
}

/// Read load zones and their demand from the model directory.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `timescales` - The model's periods and timepoints
pub fn read_load_zones(model_dir: &Path, timescales: &Timescales) -> Result<LoadZones> {
    let zones_path = model_dir.join(LOAD_ZONES_FILE_NAME);
    let zones = read_id_file::<ZoneID>(&zones_path, "LOAD_ZONE")?;
    ensure!(
        !zones.is_empty(),
        ModelError::missing_data("LOAD_ZONES", zones_path.display())
    );

    let loads_path = model_dir.join(LOADS_FILE_NAME);
    let demand = read_demand_from_iter(read_csv(&loads_path)?, &zones, timescales)
        .with_context(|| input_err_msg(&loads_path))?;

    LoadZones::new(zones, demand, timescales).with_context(|| input_err_msg(&loads_path))
}

fn read_demand_from_iter<I>(
    iter: I,
    zones: &IndexSet<ZoneID>,
    timescales: &Timescales,
) -> Result<DemandMap>
where
    I: Iterator<Item = DemandRaw>,
{
    let mut demand = DemandMap::new();
    for raw in iter {
        let zone = zones.get_id(&raw.zone)?;
        let timepoint = timescales
            .timepoint(&raw.timepoint.as_str().into())
            .with_context(|| format!("Unknown timepoint {}", raw.timepoint))?
            .id
            .clone();
        let value = require_value(
            raw.zone_demand_mw,
            ZONE_DEMAND_MW,
            format!("({zone}, {timepoint})"),
        )?;
        ensure!(
            demand.insert((zone, timepoint), value).is_none(),
            "Duplicate demand entry for zone {} and timepoint {}",
            raw.zone,
            raw.timepoint
        );
    }

    Ok(demand)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{assert_error, timescales};
    use rstest::rstest;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn demand(zone: &str, timepoint: &str, value: f64) -> DemandRaw {
        DemandRaw {
            zone: zone.into(),
            timepoint: timepoint.into(),
            zone_demand_mw: Some(Power(value)),
        }
    }

    fn zones() -> IndexSet<ZoneID> {
        ["north".into()].into_iter().collect()
    }

    #[rstest]
    fn test_read_load_zones(timescales: Timescales) {
        let dir = tempdir().unwrap();
        {
            let mut file = File::create(dir.path().join(LOAD_ZONES_FILE_NAME)).unwrap();
            writeln!(file, "LOAD_ZONE\nnorth").unwrap();
            let mut file = File::create(dir.path().join(LOADS_FILE_NAME)).unwrap();
            writeln!(
                file,
                "LOAD_ZONE,TIMEPOINT,zone_demand_mw
north,2030_day,100
north,2030_night,50
north,2040_day,120
north,2040_night,60"
            )
            .unwrap();
        }

        let load_zones = read_load_zones(dir.path(), &timescales).unwrap();
        assert_eq!(load_zones.zones(), &zones());
        assert_eq!(
            load_zones.demand(&"north".into(), &"2040_night".into()),
            Power(60.0)
        );
    }

    #[rstest]
    fn test_missing_demand_entry(timescales: Timescales) {
        let dir = tempdir().unwrap();
        {
            let mut file = File::create(dir.path().join(LOAD_ZONES_FILE_NAME)).unwrap();
            writeln!(file, "LOAD_ZONE\nnorth").unwrap();
            let mut file = File::create(dir.path().join(LOADS_FILE_NAME)).unwrap();
            writeln!(file, "LOAD_ZONE,TIMEPOINT,zone_demand_mw\nnorth,2030_day,100").unwrap();
        }

        let err = read_load_zones(dir.path(), &timescales).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ModelError>(),
            Some(ModelError::MissingData { .. })
        ));
    }

    #[rstest]
    fn test_unknown_zone(timescales: Timescales) {
        assert_error!(
            read_demand_from_iter(
                [demand("south", "2030_day", 1.0)].into_iter(),
                &zones(),
                &timescales
            ),
            "Unknown ID south found"
        );
    }

    #[rstest]
    fn test_unknown_timepoint(timescales: Timescales) {
        assert_error!(
            read_demand_from_iter(
                [demand("north", "2050_day", 1.0)].into_iter(),
                &zones(),
                &timescales
            ),
            "Unknown timepoint 2050_day"
        );
    }

    #[rstest]
    fn test_duplicate_entry(timescales: Timescales) {
        assert_error!(
            read_demand_from_iter(
                [
                    demand("north", "2030_day", 1.0),
                    demand("north", "2030_day", 2.0)
                ]
                .into_iter(),
                &zones(),
                &timescales
            ),
            "Duplicate demand entry for zone north and timepoint 2030_day"
        );
    }

    #[rstest]
    fn test_empty_demand_value(timescales: Timescales) {
        let raw = DemandRaw {
            zone_demand_mw: None,
            ..demand("north", "2030_day", 0.0)
        };
        let err = read_demand_from_iter([raw].into_iter(), &zones(), &timescales).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ModelError>(),
            Some(&ModelError::missing_data(ZONE_DEMAND_MW, "(north, 2030_day)"))
        );
    }

    #[rstest]
    fn test_no_load_zones(timescales: Timescales) {
        let dir = tempdir().unwrap();
        {
            let mut file = File::create(dir.path().join(LOAD_ZONES_FILE_NAME)).unwrap();
            writeln!(file, "LOAD_ZONE").unwrap();
            let mut file = File::create(dir.path().join(LOADS_FILE_NAME)).unwrap();
            writeln!(file, "LOAD_ZONE,TIMEPOINT,zone_demand_mw\nnorth,2030_day,100").unwrap();
        }

        let err = read_load_zones(dir.path(), &timescales).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ModelError>(),
            Some(ModelError::MissingData { name, .. }) if name == "LOAD_ZONES"
        ));
    }
}
