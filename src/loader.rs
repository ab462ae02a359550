//! Flat-file loading of hero and trinket records.
//!
//! Hero rows: `name,roles,partners,ships,trinkets` where every list is
//! `|`-separated. Trinket rows: `name,amount`. No header row. Rows that
//! cannot be read are skipped and reported; the rest still load.

use csv::{ReaderBuilder, StringRecord};
use std::collections::{BTreeSet, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::warn;

use crate::error::Result;
use crate::types::{Hero, Trinket};

const HERO_FIELDS: usize = 5;
const TRINKET_FIELDS: usize = 2;
const LIST_SEPARATOR: char = '|';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    pub line: u64,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loaded<T> {
    pub records: Vec<T>,
    pub skipped: Vec<SkippedRow>,
}

pub fn read_heroes(path: impl AsRef<Path>) -> Result<Loaded<Hero>> {
    parse_heroes(File::open(path)?)
}

pub fn read_trinkets(path: impl AsRef<Path>) -> Result<Loaded<Trinket>> {
    parse_trinkets(File::open(path)?)
}

pub fn parse_heroes(reader: impl Read) -> Result<Loaded<Hero>> {
    let mut names = HashSet::new();
    parse_rows(reader, "hero", |record| {
        if record.len() < HERO_FIELDS {
            return Err(format!(
                "expected {HERO_FIELDS} fields, found {}",
                record.len()
            ));
        }
        let name = record[0].trim();
        if name.is_empty() {
            return Err("empty hero name".to_string());
        }
        if !names.insert(name.to_string()) {
            return Err(format!("duplicate hero '{name}'"));
        }

        Ok(Hero {
            name: name.to_string(),
            preferred_roles: split_list(&record[1]),
            preferred_partners: split_list(&record[2]),
            preferred_ships: split_list(&record[3]),
            preferred_trinkets: split_list(&record[4]),
        })
    })
}

pub fn parse_trinkets(reader: impl Read) -> Result<Loaded<Trinket>> {
    let mut names = HashSet::new();
    parse_rows(reader, "trinket", |record| {
        if record.len() < TRINKET_FIELDS {
            return Err(format!(
                "expected {TRINKET_FIELDS} fields, found {}",
                record.len()
            ));
        }
        let name = record[0].trim();
        if name.is_empty() {
            return Err("empty trinket name".to_string());
        }
        let amount = record[1]
            .trim()
            .parse::<u32>()
            .map_err(|err| format!("bad amount '{}': {err}", record[1].trim()))?;
        if !names.insert(name.to_string()) {
            return Err(format!("duplicate trinket '{name}'"));
        }

        Ok(Trinket::new(name, amount))
    })
}

fn parse_rows<T>(
    reader: impl Read,
    kind: &str,
    mut parse: impl FnMut(&StringRecord) -> std::result::Result<T, String>,
) -> Result<Loaded<T>> {
    let mut csv = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut records = Vec::new();
    let mut skipped = Vec::new();
    for row in csv.records() {
        let record = match row {
            Ok(record) => record,
            Err(err) if err.is_io_error() => return Err(err.into()),
            // e.g. invalid UTF-8; the reader carries on with the next row
            Err(err) => {
                let line = err.position().map(|p| p.line()).unwrap_or_default();
                let reason = err.to_string();
                warn!(line, kind, %reason, "skipping unreadable row");
                skipped.push(SkippedRow { line, reason });
                continue;
            }
        };
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        match parse(&record) {
            Ok(value) => records.push(value),
            Err(reason) => {
                warn!(line, kind, %reason, "skipping malformed row");
                skipped.push(SkippedRow { line, reason });
            }
        }
    }

    Ok(Loaded { records, skipped })
}

fn split_list(field: &str) -> BTreeSet<String> {
    field
        .split(LIST_SEPARATOR)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEROES: &str = "\
Anne,Captain|Gunner,Bart,Pearl|Wasp,Compass
Bart,First Mate,,Pearl,
Broken,Captain
Anne,Gunner,,Wasp,
Cole, Gunner , , Wasp ,Spyglass|Compass
";

    #[test]
    fn hero_rows_parse_into_sets() {
        let loaded = parse_heroes(HEROES.as_bytes()).unwrap();
        let names: Vec<_> = loaded.records.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["Anne", "Bart", "Cole"]);

        let anne = &loaded.records[0];
        assert!(anne.preferred_roles.contains("Gunner"));
        assert!(anne.prefers_ship("Wasp"));
        assert!(anne.preferred_partners.contains("Bart"));

        let bart = &loaded.records[1];
        assert!(bart.preferred_partners.is_empty());
        assert!(bart.preferred_trinkets.is_empty());

        let cole = &loaded.records[2];
        assert!(cole.prefers_ship("Wasp"));
        assert_eq!(cole.preferred_trinkets.len(), 2);
    }

    #[test]
    fn short_and_duplicate_hero_rows_are_skipped() {
        let loaded = parse_heroes(HEROES.as_bytes()).unwrap();
        let lines: Vec<_> = loaded.skipped.iter().map(|s| s.line).collect();
        assert_eq!(lines, vec![3, 4]);
        assert!(loaded.skipped[0].reason.contains("expected 5 fields"));
        assert!(loaded.skipped[1].reason.contains("duplicate hero"));
    }

    #[test]
    fn undecodable_row_is_skipped_and_the_rest_load() {
        let input: &[u8] = b"Anne,Captain,,Pearl,\nB\xffrt,Gunner,,Pearl,\nCole,Gunner,,Pearl,\n";
        let loaded = parse_heroes(input).unwrap();

        let names: Vec<_> = loaded.records.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["Anne", "Cole"]);
        assert_eq!(loaded.skipped.len(), 1);
        assert_eq!(loaded.skipped[0].line, 2);
    }

    #[test]
    fn trinket_rows_keep_zero_stock_and_skip_garbage() {
        let input = "Compass,2\nIdol,0\nLantern\nSpyglass,many\n\nRope, 3 \n";
        let loaded = parse_trinkets(input.as_bytes()).unwrap();

        assert_eq!(
            loaded.records,
            vec![
                Trinket::new("Compass", 2),
                Trinket::new("Idol", 0),
                Trinket::new("Rope", 3),
            ]
        );
        assert_eq!(loaded.skipped.len(), 2);
        assert!(loaded.skipped[1].reason.starts_with("bad amount 'many'"));
    }
}
