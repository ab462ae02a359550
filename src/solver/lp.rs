use good_lp::{
    Expression, ProblemVariables, ResolutionError, Solution, SolverModel, Variable, variable,
    variables,
};
#[cfg(feature = "cbc")]
use good_lp::solvers::coin_cbc::coin_cbc;
#[cfg(not(feature = "cbc"))]
use good_lp::solvers::microlp::microlp;
use tracing::{info, warn};

use crate::config::SolverOptions;
use crate::model::{Constraint, Domain, LinearExpr, Model, Relation, Sense};
use crate::solver::{SolveCapability, SolveOutcome, SolveStatus, Values};

/// MILP backend on top of good_lp: microlp by default, COIN-OR CBC with the
/// `cbc` feature.
#[derive(Debug, Clone, Default)]
pub struct LpSolver {
    options: SolverOptions,
}

impl LpSolver {
    pub fn new(options: SolverOptions) -> Self {
        Self { options }
    }
}

impl SolveCapability for LpSolver {
    fn name(&self) -> &'static str {
        "lp"
    }

    fn solve(&self, model: &Model) -> SolveOutcome {
        // Constraints over no variables never reach the backend
        let (constant, linear): (Vec<_>, Vec<_>) =
            model.constraints().iter().partition(|c| c.expr.is_empty());
        if let Some(violated) = constant.iter().find(|c| !c.is_satisfied(&[])) {
            info!(constraint = %violated.name, "constant constraint cannot hold");
            return SolveOutcome::infeasible();
        }

        // lp_vars[i] mirrors VarId(i)
        let (problem_vars, lp_vars) = init_variables(model);
        let objective = to_expression(model.objective(), &lp_vars);
        let constraints = linear
            .into_iter()
            .map(|constraint| to_constraint(constraint, &lp_vars))
            .collect();

        let problem = LpProblem {
            vars: problem_vars,
            sense: model.sense(),
            objective,
            constraints,
        };
        match run(problem, &lp_vars, &self.options) {
            Ok((status, values)) => SolveOutcome::solved(status, Values::new(values)),
            Err(ResolutionError::Infeasible) => SolveOutcome::infeasible(),
            Err(err) => {
                warn!("solver gave up: {err}");
                SolveOutcome::unknown()
            }
        }
    }
}

struct LpProblem {
    vars: ProblemVariables,
    sense: Sense,
    objective: Expression,
    constraints: Vec<good_lp::Constraint>,
}

fn init_variables(model: &Model) -> (ProblemVariables, Vec<Variable>) {
    let mut problem_vars = variables!();
    let lp_vars = model
        .variables()
        .iter()
        .map(|def| {
            let definition = match def.domain {
                Domain::Binary => variable().binary(),
                Domain::Integer { min, max } => {
                    variable().integer().min(min as f64).max(max as f64)
                }
            };
            problem_vars.add(definition.name(def.name.clone()))
        })
        .collect();
    (problem_vars, lp_vars)
}

fn to_expression(expr: &LinearExpr, lp_vars: &[Variable]) -> Expression {
    expr.terms().iter().fold(
        Expression::from(0.0),
        |sum, &(var, coefficient)| sum + lp_vars[var.index()] * (coefficient as f64),
    )
}

fn to_constraint(constraint: &Constraint, lp_vars: &[Variable]) -> good_lp::Constraint {
    let lhs = to_expression(&constraint.expr, lp_vars);
    let rhs = constraint.rhs as f64;
    match constraint.relation {
        Relation::Eq => lhs.eq(rhs),
        Relation::Le => lhs.leq(rhs),
        Relation::Ge => lhs.geq(rhs),
    }
}

/// Solver values are floats; integral variables come back within tolerance.
fn read_values(solution: &impl Solution, lp_vars: &[Variable]) -> Vec<i64> {
    lp_vars
        .iter()
        .map(|&var| solution.value(var).round() as i64)
        .collect()
}

#[cfg(not(feature = "cbc"))]
fn run(
    problem: LpProblem,
    lp_vars: &[Variable],
    options: &SolverOptions,
) -> Result<(SolveStatus, Vec<i64>), ResolutionError> {
    if options.time_limit_secs.is_some() || options.threads.is_some() {
        warn!("time limit and thread count need the cbc feature; ignoring them");
    }
    let model = match problem.sense {
        Sense::Maximise => problem.vars.maximise(problem.objective).using(microlp),
        Sense::Minimise => problem.vars.minimise(problem.objective).using(microlp),
    };
    let model = problem
        .constraints
        .into_iter()
        .fold(model, |m, c| m.with(c));
    let solution = model.solve()?;
    info!("microlp finished");
    Ok((SolveStatus::Optimal, read_values(&solution, lp_vars)))
}

#[cfg(feature = "cbc")]
fn run(
    problem: LpProblem,
    lp_vars: &[Variable],
    options: &SolverOptions,
) -> Result<(SolveStatus, Vec<i64>), ResolutionError> {
    let mut model = match problem.sense {
        Sense::Maximise => problem.vars.maximise(problem.objective).using(coin_cbc),
        Sense::Minimise => problem.vars.minimise(problem.objective).using(coin_cbc),
    };
    #[cfg(not(debug_assertions))]
    model.set_parameter("loglevel", "0");
    if let Some(seconds) = options.time_limit_secs {
        model.set_parameter("seconds", &seconds.to_string());
    }
    if let Some(threads) = options.threads {
        model.set_parameter("threads", &threads.to_string());
    }
    let model = problem
        .constraints
        .into_iter()
        .fold(model, |m, c| m.with(c));
    let solution = model.solve()?;

    // A time limit can stop CBC on an incumbent it has not proven optimal.
    let status = if solution.model().is_proven_optimal() {
        SolveStatus::Optimal
    } else {
        SolveStatus::Feasible
    };
    info!(%status, "cbc finished");
    Ok((status, read_values(&solution, lp_vars)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Variables;
    use crate::solver::ExhaustiveSolver;

    fn assignment_model() -> Model {
        // two workers, two jobs, each job done once, each worker at most once
        let mut vars = Variables::new();
        let x = [
            [vars.binary("w0j0"), vars.binary("w0j1")],
            [vars.binary("w1j0"), vars.binary("w1j1")],
        ];
        let score = LinearExpr::new()
            .with(x[0][0], 3)
            .with(x[0][1], 1)
            .with(x[1][0], 2)
            .with(x[1][1], 4);
        (0..2)
            .fold(Model::new(vars), |m, i| {
                m.with(Constraint::eq(
                    format!("job {i}"),
                    [x[0][i], x[1][i]].into_iter().collect(),
                    1,
                ))
                .with(Constraint::leq(
                    format!("worker {i}"),
                    [x[i][0], x[i][1]].into_iter().collect(),
                    1,
                ))
            })
            .maximise(score)
    }

    #[test]
    fn solves_a_small_assignment() {
        let model = assignment_model();
        let outcome = LpSolver::default().solve(&model);

        assert_eq!(outcome.status(), SolveStatus::Optimal);
        assert_eq!(outcome.objective(&model), Some(7));
        assert_eq!(outcome.values().unwrap().as_slice(), &[1, 0, 0, 1]);
    }

    #[test]
    fn agrees_with_enumeration() {
        let model = assignment_model();
        let lp = LpSolver::default().solve(&model);
        let exhaustive = ExhaustiveSolver::new().solve(&model);

        assert_eq!(lp.objective(&model), exhaustive.objective(&model));
    }

    #[test]
    fn reports_infeasible_models() {
        let mut vars = Variables::new();
        let a = vars.binary("a");
        let b = vars.binary("b");
        let model = Model::new(vars)
            .with(Constraint::eq("both", [a, b].into_iter().collect(), 2))
            .with(Constraint::leq("not a", LinearExpr::from(a), 0))
            .maximise(LinearExpr::from(b));

        assert_eq!(LpSolver::default().solve(&model).status(), SolveStatus::Infeasible);
    }

    #[test]
    fn constant_constraints_are_checked_before_solving() {
        let mut vars = Variables::new();
        let a = vars.binary("a");
        let holds = Model::new(vars.clone())
            .with(Constraint::eq("no ships", LinearExpr::new(), 0))
            .maximise(LinearExpr::from(a));
        let fails = Model::new(vars)
            .with(Constraint::eq("one ship", LinearExpr::new(), 1))
            .maximise(LinearExpr::from(a));

        assert_eq!(LpSolver::default().solve(&holds).objective(&holds), Some(1));
        assert_eq!(LpSolver::default().solve(&fails).status(), SolveStatus::Infeasible);
    }
}
