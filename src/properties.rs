//! Invariants every solved crew report must satisfy, checked over random
//! small fleets with the exhaustive solver.

use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

use crate::model;
use crate::solver::{ExhaustiveSolver, SolveCapability};
use crate::types::{ROLES_PER_SHIP, Role};
use crate::{Eligibility, Hero, Problem, Trinket};

const SHIPS: [&str; 2] = ["Pearl", "Wasp"];
const ROLE_LABELS: [&str; 4] = ["Captain", "First Mate", "Gunner", "Cook"];
const TRINKETS: [&str; 2] = ["Compass", "Idol"];

fn subset(labels: &'static [&'static str]) -> impl Strategy<Value = Vec<&'static str>> {
    proptest::sample::subsequence(labels, 0..=labels.len())
}

fn hero(idx: usize) -> impl Strategy<Value = Hero> {
    (subset(&ROLE_LABELS), subset(&SHIPS), subset(&TRINKETS)).prop_map(
        move |(roles, ships, trinkets)| {
            Hero::new(format!("hero{idx}"))
                .with_roles(roles)
                .with_ships(ships)
                .with_trinkets(trinkets)
        },
    )
}

fn problem() -> impl Strategy<Value = Problem> {
    let heroes = (0usize..=5).prop_flat_map(|count| (0..count).map(hero).collect::<Vec<_>>());
    let amounts = proptest::collection::vec(0u32..=2, TRINKETS.len());
    (heroes, amounts, 0u32..=2, any::<bool>()).prop_map(
        |(heroes, amounts, max_active_ships, any_ship)| {
            let trinkets = TRINKETS
                .iter()
                .zip(amounts)
                .map(|(name, amount)| Trinket::new(*name, amount))
                .collect();
            let mut problem = Problem::new(heroes, trinkets);
            problem.config.max_active_ships = max_active_ships;
            problem.config.eligibility = if any_ship {
                Eligibility::AnyShip
            } else {
                Eligibility::PreferredShips
            };
            problem
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn solved_reports_respect_every_hard_constraint(problem in problem()) {
        let report = problem.solve_with(&ExhaustiveSolver::new()).unwrap();
        prop_assume!(report.is_solved());

        // exactly max_active_ships ships sail, each with a full crew
        prop_assert_eq!(report.ships.len(), problem.config.max_active_ships as usize);
        let mut posted = BTreeSet::new();
        for crew in report.ships.values() {
            prop_assert_eq!(crew.len(), ROLES_PER_SHIP);
            let roles: Vec<Role> = crew.iter().map(|p| p.role).collect();
            prop_assert_eq!(roles, Role::ALL.to_vec());
            for posting in crew {
                // nobody serves twice
                prop_assert!(posted.insert(posting.hero.clone()));
            }
        }

        let mut handed_out: BTreeMap<&str, u32> = BTreeMap::new();
        for trinket in report.trinkets.values() {
            *handed_out.entry(trinket.as_str()).or_default() += 1;
        }
        for trinket in &problem.trinkets {
            let count = handed_out.get(trinket.name.as_str()).copied().unwrap_or(0);
            prop_assert!(count <= trinket.amount);
        }
    }

    #[test]
    fn raw_solution_satisfies_the_model(problem in problem()) {
        let fleet = problem.fleet();
        let (model, space) = model::build(&fleet, &problem.config);
        let outcome = ExhaustiveSolver::new().solve(&model);
        prop_assume!(outcome.status().has_solution());
        let values = outcome.values().unwrap();
        prop_assert!(model.is_feasible(values.as_slice()));

        // at most one trinket per hero, read straight from the variables
        for hero in 0..fleet.heroes().len() {
            let held = (0..fleet.trinkets().len())
                .filter_map(|trinket| space.hold(hero, trinket))
                .filter(|&var| values.is_set(var))
                .count();
            prop_assert!(held <= 1);
        }
    }

    #[test]
    fn score_matches_the_preferences_it_rewards(problem in problem()) {
        let report = problem.solve_with(&ExhaustiveSolver::new()).unwrap();
        prop_assume!(report.is_solved());
        let score = report.score.unwrap();

        let heroes: BTreeMap<&str, &Hero> =
            problem.heroes.iter().map(|h| (h.name.as_str(), h)).collect();
        let crew: i64 = report
            .ships
            .iter()
            .flat_map(|(ship, crew)| crew.iter().map(move |p| (ship, p)))
            .filter(|(ship, p)| {
                let hero = heroes[p.hero.as_str()];
                hero.prefers_ship(ship) && hero.prefers_role(p.role)
            })
            .count() as i64
            * model::objective::JOINT_PREFERENCE_WEIGHT;
        let trinkets: i64 = report
            .trinkets
            .iter()
            .filter(|(hero, trinket)| heroes[hero.as_str()].prefers_trinket(trinket))
            .count() as i64
            * i64::from(problem.config.max_score_per_trinket);

        prop_assert_eq!(score.crew, crew);
        prop_assert_eq!(score.trinkets, trinkets);
        prop_assert_eq!(score.total, crew + trinkets);
    }

    #[test]
    fn unsolved_reports_carry_no_assignments(problem in problem()) {
        let report = problem.solve_with(&ExhaustiveSolver::new()).unwrap();
        prop_assume!(!report.is_solved());

        prop_assert!(report.score.is_none());
        prop_assert!(report.ships.is_empty());
        prop_assert!(report.trinkets.is_empty());
    }
}
