//! Defines the `ModelParameters` struct, which represents the contents of `model.toml`.
use crate::input::{input_err_msg, read_toml};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

const MODEL_PARAMETERS_FILE_NAME: &str = "model.toml";

/// Represents the contents of the entire model file.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ModelParameters {
    /// Whether to model local transmission and distribution.
    ///
    /// If enabled, each zone has a distributed bus from which demand is withdrawn, and loss rates
    /// must be given in `local_td.csv`.
    #[serde(default)]
    pub local_td: bool,
}

impl ModelParameters {
    /// Read a model file from the specified directory.
    ///
    /// The file is optional; if it doesn't exist, default parameters are used.
    ///
    /// # Arguments
    ///
    /// * `model_dir` - Folder containing model configuration files
    pub fn from_path<P: AsRef<Path>>(model_dir: P) -> Result<ModelParameters> {
        let file_path = model_dir.as_ref().join(MODEL_PARAMETERS_FILE_NAME);
        if !file_path.is_file() {
            return Ok(ModelParameters::default());
        }

        read_toml(&file_path).with_context(|| input_err_msg(&file_path))
    }
}
