use crate::config::Config;
use crate::model::{Constraint, LinearExpr, Model, VariableSpace};
use crate::types::{Fleet, ROLES_PER_SHIP, Role};

/// Post every hard constraint that makes a variable assignment a legal
/// crew and trinket configuration.
pub fn assemble(model: Model, space: &VariableSpace, fleet: &Fleet, config: &Config) -> Model {
    let model = constrain_active_ship_count(model, space, config);
    let model = constrain_roles_filled_on_active_ships(model, space, fleet);
    let model = constrain_ship_headcount(model, space, fleet);
    let model = constrain_one_post_per_hero(model, space, fleet);
    let model = constrain_trinket_inventory(model, space, fleet);
    constrain_one_trinket_per_hero(model, space, fleet)
}

/// Exactly `max_active_ships` ships sail; sailing fewer is not allowed.
fn constrain_active_ship_count(model: Model, space: &VariableSpace, config: &Config) -> Model {
    let active: LinearExpr = space.active_vars().iter().copied().collect();
    model.with(Constraint::eq(
        "active ship count",
        active,
        i64::from(config.max_active_ships),
    ))
}

/// Each post on a ship is held by exactly one hero when the ship is active
/// and by nobody otherwise.
fn constrain_roles_filled_on_active_ships(
    model: Model,
    space: &VariableSpace,
    fleet: &Fleet,
) -> Model {
    let heroes = fleet.heroes().len();
    fleet
        .ships()
        .iter()
        .enumerate()
        .fold(model, |m, (ship_idx, ship)| {
            Role::ALL.into_iter().fold(m, |m2, role| {
                let holders: LinearExpr = (0..heroes)
                    .filter_map(|hero| space.assign(hero, ship_idx, role))
                    .collect();
                let lhs = holders.with(space.active(ship_idx), -1);
                m2.with(Constraint::eq(format!("{ship} {role} filled"), lhs, 0))
            })
        })
}

/// An active ship carries a full crew, an inactive one carries nobody.
fn constrain_ship_headcount(model: Model, space: &VariableSpace, fleet: &Fleet) -> Model {
    let heroes = fleet.heroes().len();
    fleet
        .ships()
        .iter()
        .enumerate()
        .fold(model, |m, (ship_idx, ship)| {
            let crew: LinearExpr = (0..heroes)
                .flat_map(|hero| {
                    Role::ALL
                        .into_iter()
                        .filter_map(move |role| space.assign(hero, ship_idx, role))
                })
                .collect();
            let lhs = crew.with(space.active(ship_idx), -(ROLES_PER_SHIP as i64));
            m.with(Constraint::eq(format!("{ship} headcount"), lhs, 0))
        })
}

/// A hero serves on at most one ship in at most one role.
fn constrain_one_post_per_hero(model: Model, space: &VariableSpace, fleet: &Fleet) -> Model {
    let ships = fleet.ships().len();
    fleet
        .heroes()
        .iter()
        .enumerate()
        .fold(model, |m, (hero_idx, hero)| {
            let posts: LinearExpr = (0..ships)
                .flat_map(|ship| {
                    Role::ALL
                        .into_iter()
                        .filter_map(move |role| space.assign(hero_idx, ship, role))
                })
                .collect();
            if posts.is_empty() {
                return m;
            }
            m.with(Constraint::leq(format!("{} single post", hero.name), posts, 1))
        })
}

/// No trinket is handed out more often than it is stocked.
fn constrain_trinket_inventory(model: Model, space: &VariableSpace, fleet: &Fleet) -> Model {
    let heroes = fleet.heroes().len();
    fleet
        .trinkets()
        .iter()
        .enumerate()
        .fold(model, |m, (trinket_idx, trinket)| {
            let holders: LinearExpr = (0..heroes)
                .filter_map(|hero| space.hold(hero, trinket_idx))
                .collect();
            if holders.is_empty() {
                return m;
            }
            m.with(Constraint::leq(
                format!("{} inventory", trinket.name),
                holders,
                i64::from(trinket.amount),
            ))
        })
}

/// A hero carries at most one trinket.
fn constrain_one_trinket_per_hero(model: Model, space: &VariableSpace, fleet: &Fleet) -> Model {
    let trinkets = fleet.trinkets().len();
    fleet
        .heroes()
        .iter()
        .enumerate()
        .fold(model, |m, (hero_idx, hero)| {
            let held: LinearExpr = (0..trinkets)
                .filter_map(|trinket| space.hold(hero_idx, trinket))
                .collect();
            if held.is_empty() {
                return m;
            }
            m.with(Constraint::leq(format!("{} single trinket", hero.name), held, 1))
        })
}
