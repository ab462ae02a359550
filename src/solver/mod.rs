//! The contract between the model and whatever searches it.
//!
//! A [`SolveCapability`] takes a finished [`Model`] and blocks until it
//! reaches a terminal [`SolveStatus`]. Values are only present for
//! optimal and feasible outcomes.

pub mod exhaustive;
pub mod lp;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::SolverOptions;
use crate::error::CrewError;
use crate::model::{Model, VarId};
pub use exhaustive::ExhaustiveSolver;
pub use lp::LpSolver;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolveStatus {
    Optimal,
    /// A solution was found but not proven optimal before a limit hit.
    Feasible,
    Infeasible,
    /// The search stopped without a solution or a proof of infeasibility.
    Unknown,
}

impl SolveStatus {
    pub fn has_solution(self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::Feasible)
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SolveStatus::Optimal => "optimal",
            SolveStatus::Feasible => "feasible",
            SolveStatus::Infeasible => "infeasible",
            SolveStatus::Unknown => "unknown",
        })
    }
}

/// Solved value of every model variable, indexed by [`VarId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Values(Vec<i64>);

impl Values {
    pub fn new(values: Vec<i64>) -> Self {
        Self(values)
    }

    pub fn value(&self, var: VarId) -> i64 {
        self.0[var.index()]
    }

    pub fn is_set(&self, var: VarId) -> bool {
        self.value(var) == 1
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveOutcome {
    status: SolveStatus,
    values: Option<Values>,
}

impl SolveOutcome {
    /// `status` must be optimal or feasible.
    pub fn solved(status: SolveStatus, values: Values) -> Self {
        debug_assert!(status.has_solution());
        Self {
            status,
            values: Some(values),
        }
    }

    pub fn infeasible() -> Self {
        Self {
            status: SolveStatus::Infeasible,
            values: None,
        }
    }

    pub fn unknown() -> Self {
        Self {
            status: SolveStatus::Unknown,
            values: None,
        }
    }

    pub fn status(&self) -> SolveStatus {
        self.status
    }

    pub fn values(&self) -> Option<&Values> {
        self.values.as_ref()
    }

    pub fn objective(&self, model: &Model) -> Option<i64> {
        self.values
            .as_ref()
            .map(|values| model.objective().eval(values.as_slice()))
    }
}

pub trait SolveCapability {
    fn name(&self) -> &'static str;

    fn solve(&self, model: &Model) -> SolveOutcome;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Backend {
    /// MILP through good_lp.
    #[default]
    Lp,
    /// Complete enumeration, for small fleets and cross-checking.
    Exhaustive,
}

impl Backend {
    pub fn solver(self, options: &SolverOptions) -> Box<dyn SolveCapability> {
        match self {
            Backend::Lp => Box::new(LpSolver::new(options.clone())),
            Backend::Exhaustive => Box::new(ExhaustiveSolver::with_node_limit(options.node_limit)),
        }
    }
}

impl FromStr for Backend {
    type Err = CrewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lp" => Ok(Backend::Lp),
            "exhaustive" => Ok(Backend::Exhaustive),
            other => Err(CrewError::UnknownBackend(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_optimal_and_feasible_carry_solutions() {
        assert!(SolveStatus::Optimal.has_solution());
        assert!(SolveStatus::Feasible.has_solution());
        assert!(!SolveStatus::Infeasible.has_solution());
        assert!(!SolveStatus::Unknown.has_solution());
        assert!(SolveOutcome::infeasible().values().is_none());
    }

    #[test]
    fn backend_names_parse() {
        assert_eq!("lp".parse::<Backend>().unwrap(), Backend::Lp);
        assert_eq!("exhaustive".parse::<Backend>().unwrap(), Backend::Exhaustive);
        assert!(matches!(
            "gurobi".parse::<Backend>(),
            Err(CrewError::UnknownBackend(name)) if name == "gurobi"
        ));
        assert_eq!(Backend::Exhaustive.solver(&SolverOptions::default()).name(), "exhaustive");
    }
}
