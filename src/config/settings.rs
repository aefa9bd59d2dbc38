//! Settings module.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;

use super::parameters::Parameters;
use crate::errors::SirError;

/// Grid of transmission rates to sweep over.
///
/// The grid holds `samples + 1` values, linearly spaced from `start` to `end` inclusive.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct SweepSettings {
    pub start: f64,
    pub end: f64,
    pub samples: usize,
}

impl Default for SweepSettings {
    fn default() -> Self {
        Self {
            start: 0.,
            end: 1.,
            samples: 100,
        }
    }
}

impl SweepSettings {
    pub fn transmission_rates(&self) -> Vec<f64> {
        if self.samples == 0 {
            return vec![self.start];
        }
        (0..=self.samples)
            .map(|i| self.start + (self.end - self.start) * i as f64 / self.samples as f64)
            .collect()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Settings {
    pub recovery_rate: f64,
    #[serde(default)]
    pub sweep: SweepSettings,
    #[serde(default = "default_replicates")]
    pub replicates: usize,
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_replicates() -> usize {
    1
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            recovery_rate: 0.1,
            sweep: SweepSettings::default(),
            replicates: default_replicates(),
            seed: None,
        }
    }
}

/// Failure to load or store settings, tagged with the file involved where there is one.
#[derive(Debug)]
pub enum SettingsError {
    Io { path: String, error: std::io::Error },
    Yaml(serde_yaml::Error),
    Invalid(SirError),
}

impl std::error::Error for SettingsError {}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::Io { path, error } => write!(formatter, "{path}: {error}"),
            SettingsError::Yaml(error) => write!(formatter, "malformed settings: {error}"),
            SettingsError::Invalid(error) => write!(formatter, "invalid settings: {error}"),
        }
    }
}

impl std::fmt::Display for Settings {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let yaml = serde_yaml::to_string(self).map_err(|_| std::fmt::Error)?;
        write!(formatter, "{}", yaml.trim_end())
    }
}

impl Settings {
    /// Parameters for every point of the sweep, in grid order.
    pub fn parameters(&self) -> Vec<Parameters> {
        self.sweep
            .transmission_rates()
            .into_iter()
            .map(|beta| Parameters::new(beta, self.recovery_rate))
            .collect()
    }

    /// Check every parameter set of the sweep.
    pub fn validate(&self) -> Result<(), SettingsError> {
        self.parameters()
            .iter()
            .try_for_each(Parameters::validate)
            .map_err(SettingsError::Invalid)
    }

    /// Parse and validate settings from YAML.
    pub fn read(reader: &mut dyn std::io::Read) -> Result<Settings, SettingsError> {
        let settings: Settings = serde_yaml::from_reader(reader).map_err(SettingsError::Yaml)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn read_from_file(path: &str) -> Result<Settings, SettingsError> {
        let file = fs::File::open(path).map_err(|error| SettingsError::Io {
            path: path.to_owned(),
            error,
        })?;
        Self::read(&mut std::io::BufReader::new(file))
    }

    /// Store the settings next to the results of a sweep, so the sweep can be rerun.
    pub fn write_to_file(&self, path: &str) -> Result<(), SettingsError> {
        let io_error = |error| SettingsError::Io {
            path: path.to_owned(),
            error,
        };
        let file = fs::File::create(path).map_err(io_error)?;
        let mut writer = std::io::BufWriter::new(file);
        serde_yaml::to_writer(&mut writer, self).map_err(SettingsError::Yaml)?;
        writer.flush().map_err(io_error)
    }
}

/// Path for the settings that belong to a results file: same stem, `yaml` extension.
pub fn settings_path_for(output: &str) -> String {
    Path::new(output)
        .with_extension("yaml")
        .to_string_lossy()
        .into_owned()
}
