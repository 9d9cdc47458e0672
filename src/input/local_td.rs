//! Code for reading local T&D parameters from a CSV file.
use super::*;
use crate::id::IDCollection;
use crate::local_td::LocalTD;
use crate::zone::ZoneID;
use indexmap::IndexMap;
use serde::Deserialize;

const LOCAL_TD_FILE_NAME: &str = "local_td.csv";

/// Local T&D parameters for a zone, as read from file
#[derive(Debug, Deserialize, PartialEq)]
struct LocalTDRaw {
    #[serde(rename = "LOAD_ZONE")]
    zone: String,
    local_td_loss_rate: Dimensionless,
}

/// Read local T&D loss rates from the model directory.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `zones` - The model's load zones
pub fn read_local_td(model_dir: &Path, zones: &IndexSet<ZoneID>) -> Result<LocalTD> {
    let file_path = model_dir.join(LOCAL_TD_FILE_NAME);
    read_local_td_from_iter(read_csv(&file_path)?, zones).with_context(|| input_err_msg(&file_path))
}

fn read_local_td_from_iter<I>(iter: I, zones: &IndexSet<ZoneID>) -> Result<LocalTD>
where
    I: Iterator<Item = LocalTDRaw>,
{
    let mut loss_rates = IndexMap::new();
    for raw in iter {
        let zone = zones.get_id(&raw.zone)?;
        ensure!(
            loss_rates.insert(zone, raw.local_td_loss_rate).is_none(),
            "Duplicate entry for zone {}",
            raw.zone
        );
    }

    LocalTD::new(loss_rates)
}
