//! Solver-agnostic linear model: variables, integer-coefficient linear
//! expressions, constraints and an objective.
//!
//! Variables are registered on [`Variables`] and frozen when handed to
//! [`Model::new`]. A [`Model`] only accepts constraints and an objective,
//! so nothing can add a variable once constraint assembly has started.

pub mod constraints;
pub mod objective;
pub mod variables;

use tracing::debug;

use crate::config::Config;
use crate::types::Fleet;
pub use variables::VariableSpace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarId(usize);

impl VarId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    Binary,
    Integer { min: i64, max: i64 },
}

impl Domain {
    pub fn bounds(self) -> (i64, i64) {
        match self {
            Domain::Binary => (0, 1),
            Domain::Integer { min, max } => (min, max),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarDef {
    pub name: String,
    pub domain: Domain,
}

/// Variable registry, open for registration until moved into a [`Model`].
#[derive(Debug, Clone, Default)]
pub struct Variables {
    defs: Vec<VarDef>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn binary(&mut self, name: impl Into<String>) -> VarId {
        self.add(name, Domain::Binary)
    }

    pub fn integer(&mut self, name: impl Into<String>, min: i64, max: i64) -> VarId {
        self.add(name, Domain::Integer { min, max })
    }

    fn add(&mut self, name: impl Into<String>, domain: Domain) -> VarId {
        let id = VarId(self.defs.len());
        self.defs.push(VarDef {
            name: name.into(),
            domain,
        });
        id
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinearExpr {
    terms: Vec<(VarId, i64)>,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, var: VarId, coefficient: i64) {
        self.terms.push((var, coefficient));
    }

    pub fn with(mut self, var: VarId, coefficient: i64) -> Self {
        self.add(var, coefficient);
        self
    }

    pub fn terms(&self) -> &[(VarId, i64)] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn eval(&self, values: &[i64]) -> i64 {
        self.terms
            .iter()
            .map(|&(var, coefficient)| coefficient * values[var.index()])
            .sum()
    }
}

impl FromIterator<VarId> for LinearExpr {
    fn from_iter<I: IntoIterator<Item = VarId>>(iter: I) -> Self {
        Self {
            terms: iter.into_iter().map(|var| (var, 1)).collect(),
        }
    }
}

impl From<VarId> for LinearExpr {
    fn from(var: VarId) -> Self {
        Self::new().with(var, 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Eq,
    Le,
    Ge,
}

/// `expr <relation> rhs`, with every variable kept on the left-hand side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub name: String,
    pub expr: LinearExpr,
    pub relation: Relation,
    pub rhs: i64,
}

impl Constraint {
    pub fn eq(name: impl Into<String>, expr: LinearExpr, rhs: i64) -> Self {
        Self::new(name, expr, Relation::Eq, rhs)
    }

    pub fn leq(name: impl Into<String>, expr: LinearExpr, rhs: i64) -> Self {
        Self::new(name, expr, Relation::Le, rhs)
    }

    pub fn geq(name: impl Into<String>, expr: LinearExpr, rhs: i64) -> Self {
        Self::new(name, expr, Relation::Ge, rhs)
    }

    fn new(name: impl Into<String>, expr: LinearExpr, relation: Relation, rhs: i64) -> Self {
        Self {
            name: name.into(),
            expr,
            relation,
            rhs,
        }
    }

    pub fn is_satisfied(&self, values: &[i64]) -> bool {
        let lhs = self.expr.eval(values);
        match self.relation {
            Relation::Eq => lhs == self.rhs,
            Relation::Le => lhs <= self.rhs,
            Relation::Ge => lhs >= self.rhs,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Sense {
    #[default]
    Maximise,
    Minimise,
}

#[derive(Debug, Clone, Default)]
pub struct Model {
    variables: Vec<VarDef>,
    constraints: Vec<Constraint>,
    objective: LinearExpr,
    sense: Sense,
}

impl Model {
    pub fn new(variables: Variables) -> Self {
        Self {
            variables: variables.defs,
            ..Self::default()
        }
    }

    pub fn with(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn maximise(mut self, objective: LinearExpr) -> Self {
        self.objective = objective;
        self.sense = Sense::Maximise;
        self
    }

    pub fn minimise(mut self, objective: LinearExpr) -> Self {
        self.objective = objective;
        self.sense = Sense::Minimise;
        self
    }

    pub fn variables(&self) -> &[VarDef] {
        &self.variables
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn objective(&self) -> &LinearExpr {
        &self.objective
    }

    pub fn sense(&self) -> Sense {
        self.sense
    }

    /// Checks a full assignment against every constraint and variable domain.
    pub fn is_feasible(&self, values: &[i64]) -> bool {
        values.len() == self.variables.len()
            && self.variables.iter().zip(values).all(|(def, &value)| {
                let (min, max) = def.domain.bounds();
                (min..=max).contains(&value)
            })
            && self.constraints.iter().all(|c| c.is_satisfied(values))
    }
}

/// Build the complete model for a fleet: variable space first, then the hard
/// constraints, then the scoring relations and objective.
pub fn build(fleet: &Fleet, config: &Config) -> (Model, VariableSpace) {
    let (variables, space) = VariableSpace::build(fleet, config);
    let model = Model::new(variables);
    let model = constraints::assemble(model, &space, fleet, config);
    let model = objective::assemble(model, &space, fleet, config);

    debug!(
        heroes = fleet.heroes().len(),
        ships = fleet.ships().len(),
        trinkets = fleet.trinkets().len(),
        variables = model.variables().len(),
        constraints = model.constraints().len(),
        "assembled crew model"
    );

    (model, space)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constraints_evaluate_against_values() {
        let mut vars = Variables::new();
        let a = vars.binary("a");
        let b = vars.binary("b");
        let c = vars.integer("c", 0, 5);
        let model = Model::new(vars)
            .with(Constraint::leq("one of a b", [a, b].into_iter().collect(), 1))
            .with(Constraint::eq("c is 3a", LinearExpr::from(c).with(a, -3), 0));

        assert!(model.is_feasible(&[1, 0, 3]));
        assert!(model.is_feasible(&[0, 0, 0]));
        assert!(!model.is_feasible(&[1, 1, 3]));
        assert!(!model.is_feasible(&[1, 0, 2]));
        // out of domain
        assert!(!model.is_feasible(&[0, 2, 0]));
        assert!(!model.is_feasible(&[0, 0]));
    }
}
