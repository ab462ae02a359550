use tracing::debug;

use crate::model::{Constraint, Model, Relation, Sense};
use crate::solver::{SolveCapability, SolveOutcome, SolveStatus, Values};

/// Depth-first enumeration of every variable in declaration order.
///
/// Before branching on a variable its range is narrowed by every constraint
/// it appears in, using the interval of values the other free variables
/// could still reach, so dead branches are never entered. Exact and
/// deterministic: among equally good solutions the first one found in
/// enumeration order wins.
#[derive(Debug, Clone, Default)]
pub struct ExhaustiveSolver {
    node_limit: Option<u64>,
}

impl ExhaustiveSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node_limit(node_limit: Option<u64>) -> Self {
        Self { node_limit }
    }
}

impl SolveCapability for ExhaustiveSolver {
    fn name(&self) -> &'static str {
        "exhaustive"
    }

    fn solve(&self, model: &Model) -> SolveOutcome {
        let mut search = Search::new(model, self.node_limit);
        if (0..model.constraints().len()).all(|c| search.can_satisfy(c)) {
            search.descend(0);
        }
        debug!(nodes = search.nodes, cut = search.cut, "exhaustive search finished");

        match (search.best, search.cut) {
            (Some((_, values)), false) => {
                SolveOutcome::solved(SolveStatus::Optimal, Values::new(values))
            }
            (Some((_, values)), true) => {
                SolveOutcome::solved(SolveStatus::Feasible, Values::new(values))
            }
            (None, false) => SolveOutcome::infeasible(),
            (None, true) => SolveOutcome::unknown(),
        }
    }
}

struct Search<'m> {
    model: &'m Model,
    bounds: Vec<(i64, i64)>,
    values: Vec<Option<i64>>,
    /// Constraint indices each variable appears in.
    watches: Vec<Vec<usize>>,
    nodes: u64,
    node_limit: Option<u64>,
    cut: bool,
    best: Option<(i64, Vec<i64>)>,
}

impl<'m> Search<'m> {
    fn new(model: &'m Model, node_limit: Option<u64>) -> Self {
        let variables = model.variables();
        let mut watches = vec![Vec::new(); variables.len()];
        for (idx, constraint) in model.constraints().iter().enumerate() {
            for &(var, _) in constraint.expr.terms() {
                let watched = &mut watches[var.index()];
                if watched.last() != Some(&idx) {
                    watched.push(idx);
                }
            }
        }

        Self {
            model,
            bounds: variables.iter().map(|def| def.domain.bounds()).collect(),
            values: vec![None; variables.len()],
            watches,
            nodes: 0,
            node_limit,
            cut: false,
            best: None,
        }
    }

    fn descend(&mut self, depth: usize) {
        if depth == self.values.len() {
            self.record_leaf();
            return;
        }

        let Some((min, max)) = self.narrow(depth) else {
            return;
        };
        for value in min..=max {
            self.nodes += 1;
            if self.node_limit.is_some_and(|limit| self.nodes > limit) {
                self.cut = true;
                return;
            }

            self.values[depth] = Some(value);
            self.descend(depth + 1);
            if self.cut {
                return;
            }
        }
        self.values[depth] = None;
    }

    /// Values of the free variable `var` that keep every constraint it
    /// appears in satisfiable, or `None` when there are none.
    fn narrow(&self, var: usize) -> Option<(i64, i64)> {
        let (mut min, mut max) = self.bounds[var];
        for &idx in &self.watches[var] {
            let constraint = &self.model.constraints()[idx];
            let mut coefficient = 0;
            let (mut low, mut high) = (0i64, 0i64);
            for &(other, c) in constraint.expr.terms() {
                if other.index() == var {
                    coefficient += c;
                } else {
                    let (lo, hi) = self.reach(other.index(), c);
                    low += lo;
                    high += hi;
                }
            }

            // coefficient * var has to land in [need_low, need_high]
            let rhs = constraint.rhs;
            let (need_low, need_high) = match constraint.relation {
                Relation::Eq => (Some(rhs - high), Some(rhs - low)),
                Relation::Le => (None, Some(rhs - low)),
                Relation::Ge => (Some(rhs - high), None),
            };
            if coefficient == 0 {
                if need_low.is_some_and(|n| n > 0) || need_high.is_some_and(|n| n < 0) {
                    return None;
                }
                continue;
            }
            let (lower, upper) = if coefficient > 0 {
                (
                    need_low.map(|n| div_ceil(n, coefficient)),
                    need_high.map(|n| div_floor(n, coefficient)),
                )
            } else {
                (
                    need_high.map(|n| div_ceil(n, coefficient)),
                    need_low.map(|n| div_floor(n, coefficient)),
                )
            };
            if let Some(lower) = lower {
                min = min.max(lower);
            }
            if let Some(upper) = upper {
                max = max.min(upper);
            }
        }
        (min <= max).then_some((min, max))
    }

    /// Range `coefficient * var` can still take.
    fn reach(&self, var: usize, coefficient: i64) -> (i64, i64) {
        match self.values[var] {
            Some(value) => (coefficient * value, coefficient * value),
            None => {
                let (min, max) = self.bounds[var];
                if coefficient >= 0 {
                    (coefficient * min, coefficient * max)
                } else {
                    (coefficient * max, coefficient * min)
                }
            }
        }
    }

    fn record_leaf(&mut self) {
        let values: Vec<i64> = self.values.iter().map(|v| v.unwrap_or(0)).collect();
        let objective = self.model.objective().eval(&values);
        let improves = match &self.best {
            None => true,
            Some((best, _)) => match self.model.sense() {
                Sense::Maximise => objective > *best,
                Sense::Minimise => objective < *best,
            },
        };
        if improves {
            self.best = Some((objective, values));
        }
    }

    /// Whether some completion of the current partial assignment could still
    /// satisfy constraint `idx`.
    fn can_satisfy(&self, idx: usize) -> bool {
        let constraint: &Constraint = &self.model.constraints()[idx];
        let (low, high) = constraint
            .expr
            .terms()
            .iter()
            .map(|&(var, coefficient)| self.reach(var.index(), coefficient))
            .fold((0, 0), |(low, high), (lo, hi)| (low + lo, high + hi));

        match constraint.relation {
            Relation::Eq => low <= constraint.rhs && constraint.rhs <= high,
            Relation::Le => low <= constraint.rhs,
            Relation::Ge => high >= constraint.rhs,
        }
    }
}

fn div_floor(a: i64, b: i64) -> i64 {
    let q = a / b;
    if a % b != 0 && (a < 0) != (b < 0) {
        q - 1
    } else {
        q
    }
}

fn div_ceil(a: i64, b: i64) -> i64 {
    let q = a / b;
    if a % b != 0 && (a < 0) == (b < 0) {
        q + 1
    } else {
        q
    }
}
