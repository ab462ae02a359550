use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::io::{BufRead, Write};

use crate::error::Result;

/// Heroes and ships to leave out before the model is built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Exclusions {
    pub heroes: BTreeSet<String>,
    pub ships: BTreeSet<String>,
}

impl Exclusions {
    pub fn is_empty(&self) -> bool {
        self.heroes.is_empty() && self.ships.is_empty()
    }

    pub fn merge(&mut self, other: Exclusions) {
        self.heroes.extend(other.heroes);
        self.ships.extend(other.ships);
    }
}

/// Decides which heroes and ships to exclude, given the full lists.
pub trait ExclusionSource {
    fn select(&mut self, heroes: &[String], ships: &[String]) -> Result<Exclusions>;
}

/// Fixed exclusions, e.g. from the command line, filtered to names that exist.
impl ExclusionSource for Exclusions {
    fn select(&mut self, heroes: &[String], ships: &[String]) -> Result<Exclusions> {
        Ok(Exclusions {
            heroes: self
                .heroes
                .iter()
                .filter(|name| heroes.contains(name))
                .cloned()
                .collect(),
            ships: self
                .ships
                .iter()
                .filter(|name| ships.contains(name))
                .cloned()
                .collect(),
        })
    }
}

/// Numbered checklist on a terminal (or any reader/writer pair).
pub struct Prompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn choose(&mut self, kind: &str, choices: &[String]) -> Result<BTreeSet<String>> {
        if choices.is_empty() {
            return Ok(BTreeSet::new());
        }

        writeln!(self.output, "Select the {kind} you want to exclude:")?;
        for (idx, choice) in choices.iter().enumerate() {
            writeln!(self.output, "  {:>2}) {choice}", idx + 1)?;
        }

        loop {
            write!(
                self.output,
                "Numbers separated by spaces or commas, blank for none: "
            )?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(BTreeSet::new());
            }
            match parse_picks(&line, choices.len()) {
                Ok(picks) => return Ok(picks.into_iter().map(|idx| choices[idx].clone()).collect()),
                Err(token) => writeln!(self.output, "'{token}' is not a number from the list.")?,
            }
        }
    }
}

impl<R: BufRead, W: Write> ExclusionSource for Prompt<R, W> {
    fn select(&mut self, heroes: &[String], ships: &[String]) -> Result<Exclusions> {
        Ok(Exclusions {
            heroes: self.choose("heroes", heroes)?,
            ships: self.choose("ships", ships)?,
        })
    }
}

/// One-based picks to zero-based indices; the first bad token is returned
/// as the error.
fn parse_picks(line: &str, count: usize) -> std::result::Result<BTreeSet<usize>, String> {
    line.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(|token| match token.parse::<usize>() {
            Ok(pick) if (1..=count).contains(&pick) => Ok(pick - 1),
            _ => Err(token.to_string()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn prompt_reads_picks_for_heroes_then_ships() {
        let input = "2, 3\n\n";
        let mut output = Vec::new();
        let mut prompt = Prompt::new(input.as_bytes(), &mut output);

        let picked = prompt
            .select(&names(&["Anne", "Bart", "Cole"]), &names(&["Pearl"]))
            .unwrap();

        assert_eq!(picked.heroes, ["Bart".to_string(), "Cole".to_string()].into());
        assert!(picked.ships.is_empty());
        let shown = String::from_utf8(output).unwrap();
        assert!(shown.contains("Select the heroes you want to exclude:"));
        assert!(shown.contains("   1) Pearl"));
    }

    #[test]
    fn prompt_asks_again_after_bad_input() {
        let input = "7\nfoo\n1\n";
        let mut output = Vec::new();
        let mut prompt = Prompt::new(input.as_bytes(), &mut output);

        let picked = prompt.select(&names(&["Anne", "Bart"]), &[]).unwrap();

        assert_eq!(picked.heroes, ["Anne".to_string()].into());
        let shown = String::from_utf8(output).unwrap();
        assert!(shown.contains("'7' is not a number from the list."));
        assert!(shown.contains("'foo' is not a number from the list."));
    }

    #[test]
    fn closed_input_excludes_nothing() {
        let mut prompt = Prompt::new("".as_bytes(), Vec::new());
        let picked = prompt.select(&names(&["Anne"]), &names(&["Pearl"])).unwrap();
        assert!(picked.is_empty());
    }

    #[test]
    fn static_exclusions_ignore_unknown_names() {
        let mut fixed = Exclusions {
            heroes: ["Anne".to_string(), "Nobody".to_string()].into(),
            ships: ["Wasp".to_string()].into(),
        };
        let picked = fixed.select(&names(&["Anne", "Bart"]), &names(&["Pearl"])).unwrap();

        assert_eq!(picked.heroes, ["Anne".to_string()].into());
        assert!(picked.ships.is_empty());
    }
}
