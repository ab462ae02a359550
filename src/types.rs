use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use crate::selection::Exclusions;

/// Number of posts on every ship, one per [`Role`].
pub const ROLES_PER_SHIP: usize = Role::ALL.len();

/// The closed set of posts a ship must fill when it sails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    Captain,
    #[serde(rename = "First Mate")]
    FirstMate,
    Gunner,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Captain, Role::FirstMate, Role::Gunner];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Role::Captain => "Captain",
            Role::FirstMate => "First Mate",
            Role::Gunner => "Gunner",
        }
    }

    /// Preference labels come from hand-edited files, so case and
    /// surrounding whitespace are ignored.
    pub fn matches(self, label: &str) -> bool {
        self.label().eq_ignore_ascii_case(label.trim())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.matches(s))
            .ok_or_else(|| format!("unknown role '{s}'"))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hero {
    pub name: String,
    #[serde(default, rename = "roles")]
    pub preferred_roles: BTreeSet<String>,
    /// Carried through from the input files. No constraint or score reads it.
    #[serde(default, rename = "partners")]
    pub preferred_partners: BTreeSet<String>,
    #[serde(default, rename = "ships")]
    pub preferred_ships: BTreeSet<String>,
    #[serde(default, rename = "trinkets")]
    pub preferred_trinkets: BTreeSet<String>,
}

impl Hero {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.preferred_roles.extend(roles.into_iter().map(Into::into));
        self
    }

    pub fn with_ships<I, S>(mut self, ships: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.preferred_ships.extend(ships.into_iter().map(Into::into));
        self
    }

    pub fn with_trinkets<I, S>(mut self, trinkets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.preferred_trinkets
            .extend(trinkets.into_iter().map(Into::into));
        self
    }

    pub fn prefers_role(&self, role: Role) -> bool {
        self.preferred_roles.iter().any(|label| role.matches(label))
    }

    pub fn prefers_ship(&self, ship: &str) -> bool {
        self.preferred_ships.contains(ship)
    }

    pub fn prefers_trinket(&self, trinket: &str) -> bool {
        self.preferred_trinkets.contains(trinket)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trinket {
    pub name: String,
    pub amount: u32,
}

impl Trinket {
    pub fn new(name: impl Into<String>, amount: u32) -> Self {
        Self {
            name: name.into(),
            amount,
        }
    }

    pub fn in_stock(&self) -> bool {
        self.amount > 0
    }
}

/// Distinct ship labels across the roster, ordered by the first hero that
/// names them. A hero's own preferences are a set, so ships first seen on
/// the same hero come out alphabetically.
pub fn derive_ships(heroes: &[Hero]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    heroes
        .iter()
        .flat_map(|hero| hero.preferred_ships.iter())
        .filter(|ship| seen.insert(ship.as_str()))
        .cloned()
        .collect()
}

/// The post-exclusion roster, ship list and trinket inventory a model is
/// built from. Indices into these lists are the keys of the variable space.
#[derive(Debug, Clone, Default)]
pub struct Fleet {
    heroes: Vec<Hero>,
    ships: Vec<String>,
    trinkets: Vec<Trinket>,
    ship_lookup: HashMap<String, usize>,
    trinket_lookup: HashMap<String, usize>,
}

impl Fleet {
    pub fn new(heroes: Vec<Hero>, trinkets: Vec<Trinket>) -> Self {
        Self::excluding(heroes, trinkets, &Exclusions::default())
    }

    /// Ships are derived from the full roster before any hero is dropped, then
    /// excluded ships are removed.
    pub fn excluding(heroes: Vec<Hero>, trinkets: Vec<Trinket>, exclusions: &Exclusions) -> Self {
        let ships: Vec<String> = derive_ships(&heroes)
            .into_iter()
            .filter(|ship| !exclusions.ships.contains(ship))
            .collect();
        let heroes: Vec<Hero> = heroes
            .into_iter()
            .filter(|hero| !exclusions.heroes.contains(&hero.name))
            .collect();

        let ship_lookup = ships
            .iter()
            .enumerate()
            .map(|(idx, ship)| (ship.clone(), idx))
            .collect();
        let trinket_lookup = trinkets
            .iter()
            .enumerate()
            .map(|(idx, trinket)| (trinket.name.clone(), idx))
            .collect();

        Self {
            heroes,
            ships,
            trinkets,
            ship_lookup,
            trinket_lookup,
        }
    }

    pub fn heroes(&self) -> &[Hero] {
        &self.heroes
    }

    pub fn ships(&self) -> &[String] {
        &self.ships
    }

    pub fn trinkets(&self) -> &[Trinket] {
        &self.trinkets
    }

    pub fn ship_index(&self, ship: &str) -> Option<usize> {
        self.ship_lookup.get(ship).copied()
    }

    pub fn trinket_index(&self, trinket: &str) -> Option<usize> {
        self.trinket_lookup.get(trinket).copied()
    }
}
