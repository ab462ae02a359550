use serde::{Deserialize, Serialize};
use std::fs::read_to_string;
use std::path::Path;
use std::str::FromStr;

use crate::error::Result;

pub const DEFAULT_MAX_ACTIVE_SHIPS: u32 = 4;
pub const DEFAULT_MAX_SCORE_PER_HERO: u32 = 10;
pub const DEFAULT_MAX_SCORE_PER_TRINKET: u32 = 10;
pub const DEFAULT_HEROES_PATH: &str = "Files/heroes.csv";
pub const DEFAULT_TRINKETS_PATH: &str = "Files/trinkets.csv";

/// Tunables consumed by the model builder. Every field has a default, so a
/// config file only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Exact number of ships that must sail.
    pub max_active_ships: u32,
    pub max_score_per_hero: u32,
    pub max_score_per_trinket: u32,
    pub eligibility: Eligibility,
    pub solver: SolverOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_active_ships: DEFAULT_MAX_ACTIVE_SHIPS,
            max_score_per_hero: DEFAULT_MAX_SCORE_PER_HERO,
            max_score_per_trinket: DEFAULT_MAX_SCORE_PER_TRINKET,
            eligibility: Eligibility::default(),
            solver: SolverOptions::default(),
        }
    }
}

impl Config {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_yaml_str(&read_to_string(path)?)
    }
}

/// Which ships a hero may be posted to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Eligibility {
    /// Only ships named in the hero's preferences get assignment variables.
    #[default]
    PreferredShips,
    /// Every ship in the fleet gets assignment variables for every hero.
    AnyShip,
}

impl FromStr for Eligibility {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "preferred-ships" => Ok(Eligibility::PreferredShips),
            "any-ship" => Ok(Eligibility::AnyShip),
            other => Err(format!(
                "unknown eligibility '{other}' (expected preferred-ships or any-ship)"
            )),
        }
    }
}

/// Passed through to the solving backend untouched. Backends ignore what
/// they cannot honour.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverOptions {
    pub time_limit_secs: Option<u64>,
    pub threads: Option<u32>,
    /// Search node budget for the exhaustive backend.
    pub node_limit: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = Config::from_yaml_str("max_active_ships: 2\n").unwrap();
        assert_eq!(config.max_active_ships, 2);
        assert_eq!(config.max_score_per_hero, 10);
        assert_eq!(config.max_score_per_trinket, 10);
        assert_eq!(config.eligibility, Eligibility::PreferredShips);
        assert_eq!(config.solver, SolverOptions::default());
    }

    #[test]
    fn nested_solver_options_and_eligibility_parse() {
        let yaml = "eligibility: any-ship\nsolver:\n  time_limit_secs: 30\n";
        let config = Config::from_yaml_str(yaml).unwrap();
        assert_eq!(config.eligibility, Eligibility::AnyShip);
        assert_eq!(config.solver.time_limit_secs, Some(30));
        assert_eq!(config.solver.node_limit, None);
    }

    #[test]
    fn eligibility_from_flag_value() {
        assert_eq!("any-ship".parse::<Eligibility>(), Ok(Eligibility::AnyShip));
        assert!("everywhere".parse::<Eligibility>().is_err());
    }
}
