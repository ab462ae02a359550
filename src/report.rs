use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::model::VariableSpace;
use crate::solver::{SolveOutcome, SolveStatus};
use crate::types::{Fleet, Role};

/// The decoded answer to a crew problem.
///
/// A report without a solution (`status` infeasible or unknown) has no
/// score and empty maps. A solved report can still have empty maps, and
/// the two are told apart by `status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub status: SolveStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<Score>,
    /// Ship → its crew, ordered by role.
    #[serde(default)]
    pub ships: BTreeMap<String, Vec<Posting>>,
    /// Hero → the trinket they carry.
    #[serde(default)]
    pub trinkets: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub hero: String,
    pub role: Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub crew: i64,
    pub trinkets: i64,
    pub total: i64,
}

impl Report {
    pub fn unsolved(status: SolveStatus) -> Self {
        Self {
            status,
            score: None,
            ships: BTreeMap::new(),
            trinkets: BTreeMap::new(),
        }
    }

    pub fn is_solved(&self) -> bool {
        self.status.has_solution()
    }

    pub fn assigned_heroes(&self) -> usize {
        self.ships.values().map(Vec::len).sum()
    }
}

/// Read the solved variable values back into ships, postings and trinkets.
pub fn interpret(outcome: &SolveOutcome, space: &VariableSpace, fleet: &Fleet) -> Report {
    let Some(values) = outcome.values() else {
        return Report::unsolved(outcome.status());
    };

    let mut ships: BTreeMap<String, Vec<Posting>> = BTreeMap::new();
    for (hero, ship, role, var) in space.assign_vars() {
        if values.is_set(var) {
            ships
                .entry(fleet.ships()[ship].clone())
                .or_default()
                .push(Posting {
                    hero: fleet.heroes()[hero].name.clone(),
                    role,
                });
        }
    }
    for crew in ships.values_mut() {
        crew.sort_by_key(|posting| posting.role);
    }

    let trinkets = space
        .hold_vars()
        .filter(|&(_, _, var)| values.is_set(var))
        .map(|(hero, trinket, _)| {
            (
                fleet.heroes()[hero].name.clone(),
                fleet.trinkets()[trinket].name.clone(),
            )
        })
        .collect();

    Report {
        status: outcome.status(),
        score: Some(Score {
            crew: values.value(space.crew_score),
            trinkets: values.value(space.trinket_score),
            total: values.value(space.overall_score),
        }),
        ships,
        trinkets,
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(score) = self.score.filter(|_| self.is_solved()) else {
            return writeln!(f, "No solution found (model status: {}).", self.status);
        };

        writeln!(
            f,
            "Solution found ({}): score {} (crew {}, trinkets {}).",
            self.status, score.total, score.crew, score.trinkets
        )?;

        if self.ships.is_empty() {
            writeln!(f, "\nNo heroes were assigned to a ship.")?;
        }
        for (ship, crew) in &self.ships {
            writeln!(f, "\nAssignments for ship {ship}:")?;
            for posting in crew {
                writeln!(f, "  Hero {} is assigned to {}.", posting.hero, posting.role)?;
            }
        }

        if self.trinkets.is_empty() {
            writeln!(f, "\nNo trinkets were assigned.")?;
        } else {
            writeln!(f, "\nTrinket assignments:")?;
            for (hero, trinket) in &self.trinkets {
                writeln!(f, "  Hero {hero} is assigned trinket {trinket}.")?;
            }
        }
        Ok(())
    }
}
