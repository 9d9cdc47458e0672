//! Common routines for handling input data.
use crate::error::ModelError;
use crate::id::IDLike;
use crate::units::Dimensionless;
use anyhow::{Context, Result, ensure};
use indexmap::IndexSet;
use serde::de::{Deserialize, DeserializeOwned, Deserializer};
use std::fmt::Display;
use std::fs;
use std::path::Path;

pub mod financials;
pub mod generator;
pub mod local_td;
pub mod timescale;
pub mod zone;

/// Read a series of type `T`s from a CSV file.
///
/// Will raise an error if the file is empty.
///
/// # Arguments
///
/// * `file_path` - Path to the CSV file
pub fn read_csv<T: DeserializeOwned>(file_path: &Path) -> Result<std::vec::IntoIter<T>> {
    let vec = read_csv_internal(file_path)?;
    ensure!(!vec.is_empty(), "CSV file {} cannot be empty", file_path.display());

    Ok(vec.into_iter())
}

/// Read a series of type `T`s from a CSV file.
///
/// Unlike [`read_csv`], a missing file is treated the same as an empty one.
///
/// # Arguments
///
/// * `file_path` - Path to the CSV file
pub fn read_csv_optional<T: DeserializeOwned>(file_path: &Path) -> Result<std::vec::IntoIter<T>> {
    if !file_path.exists() {
        return Ok(Vec::new().into_iter());
    }

    Ok(read_csv_internal(file_path)?.into_iter())
}

fn read_csv_internal<T: DeserializeOwned>(file_path: &Path) -> Result<Vec<T>> {
    let vec = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(file_path)
        .with_context(|| input_err_msg(file_path))?
        .into_deserialize()
        .collect::<Result<Vec<T>, _>>()
        .with_context(|| input_err_msg(file_path))?;

    Ok(vec)
}

/// Parse a TOML file at the specified path.
///
/// # Arguments
///
/// * `file_path` - Path to the TOML file
///
/// # Returns
///
/// * The deserialised TOML data or an error if the file could not be read or parsed.
pub fn read_toml<T: DeserializeOwned>(file_path: &Path) -> Result<T> {
    let toml_str = fs::read_to_string(file_path).with_context(|| input_err_msg(file_path))?;
    let toml_data = toml::from_str(&toml_str).with_context(|| input_err_msg(file_path))?;
    Ok(toml_data)
}

/// Read an f64, checking that it is between 0 and 1
pub fn deserialise_proportion<'de, D>(deserialiser: D) -> Result<Dimensionless, D::Error>
where
    D: Deserializer<'de>,
{
    let value: f64 = Deserialize::deserialize(deserialiser)?;
    if !(0.0..=1.0).contains(&value) {
        Err(serde::de::Error::custom("Value must be between 0 and 1"))?;
    }

    Ok(Dimensionless(value))
}

/// Get the value of a mandatory parameter read from file.
///
/// An empty CSV cell or a missing column is read as `None`, which is reported as
/// [`ModelError::MissingData`] for `name` at `index`.
pub fn require_value<T>(value: Option<T>, name: &str, index: impl Display) -> Result<T, ModelError> {
    value.ok_or_else(|| ModelError::missing_data(name, index))
}

/// Read a set of IDs from a CSV file with a single column, checking there are no duplicates.
///
/// The set may be empty: callers decide whether that is an error.
pub fn read_id_file<ID: IDLike>(file_path: &Path, column: &str) -> Result<IndexSet<ID>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(file_path)
        .with_context(|| input_err_msg(file_path))?;
    let headers = reader.headers().with_context(|| input_err_msg(file_path))?;
    let index = headers
        .iter()
        .position(|header| header == column)
        .with_context(|| format!("Missing column {column} in {}", file_path.display()))?;

    let mut ids = IndexSet::new();
    for record in reader.records() {
        let record = record.with_context(|| input_err_msg(file_path))?;
        let id = record
            .get(index)
            .with_context(|| format!("Missing value for {column} in {}", file_path.display()))?;
        ensure!(
            !ids.contains(id),
            "Duplicate {column} {id} in {}",
            file_path.display()
        );
        ids.insert(ID::from(id.to_string()));
    }

    Ok(ids)
}

/// Format an error message to include the file path.
///
/// To be used with [`anyhow::Context`].
pub fn input_err_msg<P: AsRef<Path>>(file_path: P) -> String {
    format!("Error reading {}", file_path.as_ref().display())
}
