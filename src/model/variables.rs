use crate::config::{Config, Eligibility};
use crate::model::{VarId, Variables};
use crate::types::{Fleet, ROLES_PER_SHIP, Role};

/// Dense lookup of every decision variable in a crew model.
///
/// `assign` is indexed `[hero][ship][role]` and `hold` `[hero][trinket]`.
/// A `None` slot means the combination is not allowed and contributes
/// nothing to any sum.
#[derive(Debug, Clone)]
pub struct VariableSpace {
    heroes: usize,
    ships: usize,
    trinkets: usize,
    active: Vec<VarId>,
    assign: Vec<Option<VarId>>,
    hold: Vec<Option<VarId>>,
    pub crew_score: VarId,
    pub trinket_score: VarId,
    pub overall_score: VarId,
}

impl VariableSpace {
    pub fn build(fleet: &Fleet, config: &Config) -> (Variables, Self) {
        let heroes = fleet.heroes();
        let ships = fleet.ships();
        let trinkets = fleet.trinkets();
        let mut vars = Variables::new();

        // Activation flags go first so the gating variables are decided
        // before the posts they gate.
        let active = ships
            .iter()
            .map(|ship| vars.binary(format!("active[{ship}]")))
            .collect();

        let mut assign = Vec::with_capacity(heroes.len() * ships.len() * ROLES_PER_SHIP);
        for hero in heroes {
            for ship in ships {
                let eligible = match config.eligibility {
                    Eligibility::PreferredShips => hero.prefers_ship(ship),
                    Eligibility::AnyShip => true,
                };
                for role in Role::ALL {
                    let var = eligible
                        .then(|| vars.binary(format!("assign[{}, {ship}, {role}]", hero.name)));
                    assign.push(var);
                }
            }
        }

        let mut hold = Vec::with_capacity(heroes.len() * trinkets.len());
        for hero in heroes {
            for trinket in trinkets {
                let var = trinket
                    .in_stock()
                    .then(|| vars.binary(format!("hold[{}, {}]", hero.name, trinket.name)));
                hold.push(var);
            }
        }

        let hero_count = heroes.len() as i64;
        let crew_max = hero_count * i64::from(config.max_score_per_hero);
        let trinket_max = hero_count * i64::from(config.max_score_per_trinket);
        let crew_score = vars.integer("crew_score", 0, crew_max);
        let trinket_score = vars.integer("trinket_score", 0, trinket_max);
        let overall_score = vars.integer("overall_score", 0, crew_max + trinket_max);

        let space = Self {
            heroes: heroes.len(),
            ships: ships.len(),
            trinkets: trinkets.len(),
            active,
            assign,
            hold,
            crew_score,
            trinket_score,
            overall_score,
        };
        (vars, space)
    }

    pub fn active(&self, ship: usize) -> VarId {
        self.active[ship]
    }

    pub fn active_vars(&self) -> &[VarId] {
        &self.active
    }

    pub fn assign(&self, hero: usize, ship: usize, role: Role) -> Option<VarId> {
        if hero >= self.heroes || ship >= self.ships {
            return None;
        }
        self.assign[(hero * self.ships + ship) * ROLES_PER_SHIP + role.index()]
    }

    pub fn hold(&self, hero: usize, trinket: usize) -> Option<VarId> {
        if hero >= self.heroes || trinket >= self.trinkets {
            return None;
        }
        self.hold[hero * self.trinkets + trinket]
    }

    /// Every existing `assign` variable as `(hero, ship, role, var)`.
    pub fn assign_vars(&self) -> impl Iterator<Item = (usize, usize, Role, VarId)> + '_ {
        self.assign.iter().enumerate().filter_map(|(slot, var)| {
            let var = (*var)?;
            let role = Role::ALL[slot % ROLES_PER_SHIP];
            let ship = (slot / ROLES_PER_SHIP) % self.ships;
            let hero = slot / (ROLES_PER_SHIP * self.ships);
            Some((hero, ship, role, var))
        })
    }

    /// Every existing `hold` variable as `(hero, trinket, var)`.
    pub fn hold_vars(&self) -> impl Iterator<Item = (usize, usize, VarId)> + '_ {
        self.hold.iter().enumerate().filter_map(|(slot, var)| {
            let var = (*var)?;
            Some((slot / self.trinkets, slot % self.trinkets, var))
        })
    }
}
