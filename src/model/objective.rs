use crate::config::Config;
use crate::model::{Constraint, LinearExpr, Model, VariableSpace};
use crate::types::{Fleet, Hero, Role};

/// Score for posting a hero to a ship and role they both prefer.
pub const JOINT_PREFERENCE_WEIGHT: i64 = 10;

/// Weight of an assignment in the crew score.
///
/// Only ship and role preferred together score; a single matching
/// preference earns no partial credit.
pub fn preference_weight(hero: &Hero, ship: &str, role: Role) -> Option<i64> {
    (hero.prefers_ship(ship) && hero.prefers_role(role)).then_some(JOINT_PREFERENCE_WEIGHT)
}

/// Sum of weighted `assign` variables over every jointly preferred
/// (ship, role) of every hero.
pub fn crew_preference_score(space: &VariableSpace, fleet: &Fleet) -> LinearExpr {
    let mut score = LinearExpr::new();
    for (hero_idx, hero) in fleet.heroes().iter().enumerate() {
        for ship in &hero.preferred_ships {
            // excluded ships have no index
            let Some(ship_idx) = fleet.ship_index(ship) else {
                continue;
            };
            for role in Role::ALL {
                let Some(weight) = preference_weight(hero, ship, role) else {
                    continue;
                };
                if let Some(var) = space.assign(hero_idx, ship_idx, role) {
                    score.add(var, weight);
                }
            }
        }
    }
    score
}

/// Every preferred trinket a hero can actually hold scores the full
/// per-trinket maximum.
pub fn trinket_preference_score(
    space: &VariableSpace,
    fleet: &Fleet,
    config: &Config,
) -> LinearExpr {
    let weight = i64::from(config.max_score_per_trinket);
    let mut score = LinearExpr::new();
    for (hero_idx, hero) in fleet.heroes().iter().enumerate() {
        for trinket in &hero.preferred_trinkets {
            let var = fleet
                .trinket_index(trinket)
                .and_then(|trinket_idx| space.hold(hero_idx, trinket_idx));
            if let Some(var) = var {
                score.add(var, weight);
            }
        }
    }
    score
}

/// Tie the score accumulators to their contributions and maximise the
/// overall score.
pub fn assemble(model: Model, space: &VariableSpace, fleet: &Fleet, config: &Config) -> Model {
    let crew = crew_preference_score(space, fleet).with(space.crew_score, -1);
    let trinkets = trinket_preference_score(space, fleet, config).with(space.trinket_score, -1);
    let overall = LinearExpr::from(space.overall_score)
        .with(space.crew_score, -1)
        .with(space.trinket_score, -1);

    model
        .with(Constraint::eq("crew score", crew, 0))
        .with(Constraint::eq("trinket score", trinkets, 0))
        .with(Constraint::eq("overall score", overall, 0))
        .maximise(LinearExpr::from(space.overall_score))
}
