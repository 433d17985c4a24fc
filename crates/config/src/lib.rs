//! Configuration models and loaders for Kerbol porkchop jobs.

use std::fs::File;
use std::path::{Path, PathBuf};

use kerbol_ephemeris::{BodyId, EphemerisError, KerbolSystem};
use kerbol_impulsive::TransferDirection;
use kerbol_transfer::{GridSearchProblem, TimeRange};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One porkchop search, as written in a job file. Times in seconds, altitudes in metres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PorkchopConfig {
    #[serde(default)]
    pub name: Option<String>,
    /// Departure body name (case-insensitive).
    pub from: String,
    /// Arrival body name (case-insensitive).
    pub to: String,
    pub departure_start_s: f64,
    pub departure_end_s: f64,
    pub tof_min_s: f64,
    pub tof_max_s: f64,
    pub grid_departure: usize,
    pub grid_tof: usize,
    pub parking_altitude_m: f64,
    /// Enables the capture burn when present.
    #[serde(default)]
    pub capture_altitude_m: Option<f64>,
    #[serde(default)]
    pub workers: Option<usize>,
    #[serde(default)]
    pub direction: TransferDirection,
}

/// Errors that can occur while loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error(transparent)]
    Body(#[from] EphemerisError),
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

impl PorkchopConfig {
    /// Check grid sizes, windows, altitudes, worker count and body names.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bodies()?;
        if self.grid_departure == 0 {
            return Err(invalid("grid_departure", "must be at least 1"));
        }
        if self.grid_tof == 0 {
            return Err(invalid("grid_tof", "must be at least 1"));
        }
        if !self.departure_start_s.is_finite()
            || !self.departure_end_s.is_finite()
            || self.departure_end_s < self.departure_start_s
        {
            return Err(invalid(
                "departure_end_s",
                format!(
                    "window [{}, {}] is inverted or not finite",
                    self.departure_start_s, self.departure_end_s
                ),
            ));
        }
        if self.tof_min_s.is_nan()
            || self.tof_min_s <= 0.0
            || !self.tof_max_s.is_finite()
            || self.tof_max_s < self.tof_min_s
        {
            return Err(invalid(
                "tof_max_s",
                format!(
                    "time of flight window [{}, {}] must be positive and ordered",
                    self.tof_min_s, self.tof_max_s
                ),
            ));
        }
        if self.parking_altitude_m.is_nan() || self.parking_altitude_m < 0.0 {
            return Err(invalid(
                "parking_altitude_m",
                format!("{} is negative", self.parking_altitude_m),
            ));
        }
        if let Some(altitude) = self.capture_altitude_m {
            if altitude.is_nan() || altitude < 0.0 {
                return Err(invalid(
                    "capture_altitude_m",
                    format!("{altitude} is negative"),
                ));
            }
        }
        if let Some(workers) = self.workers {
            if workers == 0 || workers > self.grid_departure {
                return Err(invalid(
                    "workers",
                    format!("{workers} must be between 1 and grid_departure"),
                ));
            }
        }
        Ok(())
    }

    /// Resolve `from` and `to` against the body table.
    pub fn bodies(&self) -> Result<(BodyId, BodyId), ConfigError> {
        Ok((self.from.parse()?, self.to.parse()?))
    }

    /// Grid search inputs with altitudes converted to periapsis radii.
    pub fn to_problem(&self, system: &KerbolSystem) -> Result<GridSearchProblem, ConfigError> {
        self.validate()?;
        let (body1, body2) = self.bodies()?;
        let mut problem = GridSearchProblem::new(
            body1,
            body2,
            TimeRange::new(self.departure_start_s, self.departure_end_s),
            TimeRange::new(self.tof_min_s, self.tof_max_s),
            self.grid_departure,
            self.grid_tof,
            system.body(body1).radius + self.parking_altitude_m,
        )
        .with_direction(self.direction);
        if let Some(altitude) = self.capture_altitude_m {
            problem = problem.with_capture(system.body(body2).radius + altitude);
        }
        Ok(problem)
    }
}

/// Load porkchop jobs from a YAML list, a single TOML file, or a directory of TOML files.
///
/// Every job is validated before it is returned.
pub fn load_porkchop_configs<P: AsRef<Path>>(path: P) -> Result<Vec<PorkchopConfig>, ConfigError> {
    let configs: Vec<PorkchopConfig> = load_records(path)?;
    for config in &configs {
        config.validate()?;
    }
    Ok(configs)
}

fn load_records<T, P>(path: P) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if path.is_dir() {
        read_dir_records(path)
    } else if path.extension().map(|ext| ext == "toml").unwrap_or(false) {
        let contents = std::fs::read_to_string(path)?;
        let record: T = toml::from_str(&contents)?;
        Ok(vec![record])
    } else {
        let reader = File::open(path)?;
        Ok(serde_yaml::from_reader(reader)?)
    }
}

fn read_dir_records<T>(dir: &Path) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
{
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().map(|ext| ext == "toml").unwrap_or(false))
        .collect();
    entries.sort();
    entries
        .into_iter()
        .map(|path| {
            let contents = std::fs::read_to_string(&path)?;
            Ok(toml::from_str(&contents)?)
        })
        .collect()
}
