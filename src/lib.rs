pub mod config;
pub mod error;
pub mod loader;
pub mod model;
pub mod report;
pub mod selection;
pub mod solver;
pub mod types;

#[cfg(test)]
mod properties;

use serde::Deserialize;
use std::collections::HashSet;
use std::fs::read_to_string;
use std::path::Path;
use tracing::info;

pub use config::{Config, Eligibility, SolverOptions};
pub use error::{CrewError, Result};
pub use report::{Posting, Report, Score};
pub use selection::Exclusions;
pub use solver::{Backend, SolveCapability, SolveStatus};
pub use types::{Fleet, Hero, Role, Trinket};

use solver::LpSolver;

/// A roster, an inventory and the settings to crew them with.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Problem {
    #[serde(default)]
    pub heroes: Vec<Hero>,
    #[serde(default)]
    pub trinkets: Vec<Trinket>,
    #[serde(default)]
    pub config: Config,
    #[serde(default)]
    pub exclude: Exclusions,
}

impl Problem {
    pub fn new(heroes: Vec<Hero>, trinkets: Vec<Trinket>) -> Self {
        Self {
            heroes,
            trinkets,
            ..Self::default()
        }
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let problem: Problem = serde_yaml::from_str(yaml)?;
        problem.validate()?;
        Ok(problem)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_yaml_str(&read_to_string(path)?)
    }

    /// Load heroes and trinkets from the flat files. Malformed rows are
    /// logged and dropped.
    pub fn from_csv_files(heroes: impl AsRef<Path>, trinkets: impl AsRef<Path>) -> Result<Self> {
        let heroes = loader::read_heroes(heroes)?;
        let trinkets = loader::read_trinkets(trinkets)?;
        info!(
            heroes = heroes.records.len(),
            trinkets = trinkets.records.len(),
            skipped = heroes.skipped.len() + trinkets.skipped.len(),
            "loaded records"
        );
        Ok(Self::new(heroes.records, trinkets.records))
    }

    /// Names must be unique, since they identify heroes and trinkets in
    /// preferences and reports.
    pub fn validate(&self) -> Result<()> {
        let mut heroes = HashSet::new();
        if let Some(hero) = self.heroes.iter().find(|h| !heroes.insert(h.name.as_str())) {
            return Err(CrewError::DuplicateHero(hero.name.clone()));
        }
        let mut trinkets = HashSet::new();
        if let Some(trinket) = self.trinkets.iter().find(|t| !trinkets.insert(t.name.as_str())) {
            return Err(CrewError::DuplicateTrinket(trinket.name.clone()));
        }
        Ok(())
    }

    /// Every ship any hero prefers, before exclusions.
    pub fn ships(&self) -> Vec<String> {
        types::derive_ships(&self.heroes)
    }

    pub fn fleet(&self) -> Fleet {
        Fleet::excluding(self.heroes.clone(), self.trinkets.clone(), &self.exclude)
    }

    /// Solve with the good_lp backend.
    pub fn solve(&self) -> Result<Report> {
        self.solve_with(&LpSolver::new(self.config.solver.clone()))
    }

    /// Fails only when the roster or inventory repeats a name.
    pub fn solve_with(&self, solver: &dyn SolveCapability) -> Result<Report> {
        self.validate()?;
        let fleet = self.fleet();
        let (model, space) = model::build(&fleet, &self.config);
        let outcome = solver.solve(&model);
        let report = report::interpret(&outcome, &space, &fleet);

        info!(
            backend = solver.name(),
            status = %report.status,
            score = report.score.map(|s| s.total),
            "solve finished"
        );
        Ok(report)
    }
}
