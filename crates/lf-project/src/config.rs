//! Run configuration.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Options for one load-flow run over a schematic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RunConfig {
    pub frequency_hz: f64,
    /// Bus whose generator becomes the external grid.
    pub slack_bus: String,
    pub init: InitMode,
    pub max_iteration: MaxIteration,
    pub enforce_q_lims: bool,
    /// Use the digits of each bus name as its network index.
    pub similar_bus_indices: bool,
    /// Write the network tables before and after solving.
    pub export_results: bool,
    /// Build the schematic project before reading its line constants.
    pub build_before_run: bool,
    pub compiler: Compiler,
    /// Override workbook directory, relative to the schematic.
    pub override_dir: PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            frequency_hz: 60.0,
            slack_bus: "Bus1".to_string(),
            init: InitMode::Auto,
            max_iteration: MaxIteration::Auto,
            enforce_q_lims: false,
            similar_bus_indices: true,
            export_results: true,
            build_before_run: false,
            compiler: Compiler::Gfortran46,
            override_dir: PathBuf::from("man_input"),
        }
    }
}

/// Solver start point.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InitMode {
    #[default]
    Auto,
    Flat,
    Dc,
    Results,
}

impl FromStr for InitMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "flat" => Ok(Self::Flat),
            "dc" => Ok(Self::Dc),
            "results" => Ok(Self::Results),
            other => Err(format!("unknown init mode '{other}'")),
        }
    }
}

/// Iteration cap: `auto` leaves the choice to the solver.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "MaxIterationRepr", into = "MaxIterationRepr")]
pub enum MaxIteration {
    #[default]
    Auto,
    Count(u32),
}

impl MaxIteration {
    pub fn as_option(self) -> Option<u32> {
        match self {
            MaxIteration::Auto => None,
            MaxIteration::Count(n) => Some(n),
        }
    }
}

impl fmt::Display for MaxIteration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaxIteration::Auto => write!(f, "auto"),
            MaxIteration::Count(n) => write!(f, "{n}"),
        }
    }
}

impl FromStr for MaxIteration {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("auto") {
            return Ok(MaxIteration::Auto);
        }
        match s.parse::<u32>() {
            Ok(n) if n > 0 => Ok(MaxIteration::Count(n)),
            _ => Err(format!("max iteration must be 'auto' or a positive integer, got '{s}'")),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum MaxIterationRepr {
    Count(u32),
    Keyword(String),
}

impl TryFrom<MaxIterationRepr> for MaxIteration {
    type Error = String;

    fn try_from(repr: MaxIterationRepr) -> Result<Self, Self::Error> {
        match repr {
            MaxIterationRepr::Count(n) => n.to_string().parse(),
            MaxIterationRepr::Keyword(s) => s.parse(),
        }
    }
}

impl From<MaxIteration> for MaxIterationRepr {
    fn from(value: MaxIteration) -> Self {
        match value {
            MaxIteration::Auto => MaxIterationRepr::Keyword("auto".to_string()),
            MaxIteration::Count(n) => MaxIterationRepr::Count(n),
        }
    }
}

/// Fortran compiler the schematic project is built with; selects the build folder.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Compiler {
    Gfortran42,
    #[default]
    Gfortran46,
}

impl Compiler {
    /// Extension of the build folder, e.g. `<project>.gf46`.
    pub fn folder_extension(self) -> &'static str {
        match self {
            Compiler::Gfortran42 => "gf42",
            Compiler::Gfortran46 => "gf46",
        }
    }
}

impl FromStr for Compiler {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gfortran42" | "gf42" | "4.2.1" => Ok(Compiler::Gfortran42),
            "gfortran46" | "gf46" | "4.6.2" => Ok(Compiler::Gfortran46),
            other => Err(format!("unknown compiler '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_missing_fields() {
        let cfg: RunConfig = serde_yaml::from_str("slack_bus: Bus3\nfrequency_hz: 50\n").unwrap();
        assert_eq!(cfg.slack_bus, "Bus3");
        assert_eq!(cfg.frequency_hz, 50.0);
        assert_eq!(cfg.init, InitMode::Auto);
        assert!(cfg.similar_bus_indices);
        assert!(cfg.export_results);
        assert_eq!(cfg.compiler, Compiler::Gfortran46);
    }

    #[test]
    fn max_iteration_accepts_keyword_or_count() {
        let cfg: RunConfig = serde_yaml::from_str("max_iteration: auto").unwrap();
        assert_eq!(cfg.max_iteration, MaxIteration::Auto);
        let cfg: RunConfig = serde_yaml::from_str("max_iteration: 25").unwrap();
        assert_eq!(cfg.max_iteration, MaxIteration::Count(25));
        assert!(serde_yaml::from_str::<RunConfig>("max_iteration: lots").is_err());
        assert!(serde_yaml::from_str::<RunConfig>("max_iteration: 0").is_err());
    }

    #[test]
    fn config_yaml_round_trip() {
        let cfg = RunConfig {
            max_iteration: MaxIteration::Count(10),
            init: InitMode::Dc,
            compiler: Compiler::Gfortran42,
            ..RunConfig::default()
        };
        let text = serde_yaml::to_string(&cfg).unwrap();
        let back: RunConfig = serde_yaml::from_str(&text).unwrap();
        assert_eq!(cfg, back);
    }

    #[test]
    fn parse_cli_strings() {
        assert_eq!("Flat".parse::<InitMode>().unwrap(), InitMode::Flat);
        assert_eq!("AUTO".parse::<MaxIteration>().unwrap(), MaxIteration::Auto);
        assert_eq!("4.2.1".parse::<Compiler>().unwrap(), Compiler::Gfortran42);
        assert_eq!(Compiler::Gfortran46.folder_extension(), "gf46");
    }
}
