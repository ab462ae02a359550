//! Command-line front end: load a roster, pick exclusions, solve, print.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crewpack::config::{DEFAULT_HEROES_PATH, DEFAULT_TRINKETS_PATH};
use crewpack::selection::{ExclusionSource, Prompt};
use crewpack::{Backend, Config, Eligibility, Exclusions, Problem, Report, Result};

/// Crew ships with heroes and hand out trinkets, maximising preference score
#[derive(Parser, Debug)]
#[command(name = "crewpack", version)]
struct Args {
    /// Problem file with heroes, trinkets, config and exclusions
    problem: Option<PathBuf>,

    /// Hero CSV, used when no problem file is given
    #[arg(long, default_value = DEFAULT_HEROES_PATH)]
    heroes: PathBuf,

    /// Trinket CSV, used when no problem file is given
    #[arg(long, default_value = DEFAULT_TRINKETS_PATH)]
    trinkets: PathBuf,

    /// Config file; replaces any config in the problem file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Exact number of ships that must sail
    #[arg(long)]
    max_active_ships: Option<u32>,

    /// preferred-ships or any-ship
    #[arg(long)]
    eligibility: Option<Eligibility>,

    /// Leave a hero out (repeatable)
    #[arg(long = "exclude-hero", value_name = "NAME")]
    exclude_heroes: Vec<String>,

    /// Leave a ship out (repeatable)
    #[arg(long = "exclude-ship", value_name = "NAME")]
    exclude_ships: Vec<String>,

    /// Pick exclusions from a numbered list on the terminal
    #[arg(long, short = 'i')]
    interactive: bool,

    /// lp or exhaustive
    #[arg(long, default_value = "lp")]
    backend: Backend,

    /// Give up after this many seconds (lp backend)
    #[arg(long, value_name = "SECS")]
    time_limit: Option<u64>,

    /// Report format on stdout
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Yaml,
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("crewpack=info")),
        )
        .init();

    match run(args) {
        Ok(report) if report.is_solved() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(2),
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<Report> {
    let mut problem = match &args.problem {
        Some(path) => Problem::from_yaml_file(path)?,
        None => Problem::from_csv_files(&args.heroes, &args.trinkets)?,
    };
    if let Some(path) = &args.config {
        problem.config = Config::from_yaml_file(path)?;
    }
    if let Some(max_active_ships) = args.max_active_ships {
        problem.config.max_active_ships = max_active_ships;
    }
    if let Some(eligibility) = args.eligibility {
        problem.config.eligibility = eligibility;
    }
    if let Some(secs) = args.time_limit {
        problem.config.solver.time_limit_secs = Some(secs);
    }

    let heroes: Vec<String> = problem.heroes.iter().map(|h| h.name.clone()).collect();
    let ships = problem.ships();

    let mut fixed = Exclusions {
        heroes: args.exclude_heroes.into_iter().collect(),
        ships: args.exclude_ships.into_iter().collect(),
    };
    let picked = fixed.select(&heroes, &ships)?;
    problem.exclude.merge(picked);
    if args.interactive {
        let stdin = io::stdin();
        let mut prompt = Prompt::new(stdin.lock(), io::stdout());
        let picked = prompt.select(&heroes, &ships)?;
        problem.exclude.merge(picked);
    }
    if !problem.exclude.is_empty() {
        info!(
            heroes = problem.exclude.heroes.len(),
            ships = problem.exclude.ships.len(),
            "applying exclusions"
        );
    }

    let solver = args.backend.solver(&problem.config.solver);
    let report = problem.solve_with(solver.as_ref())?;

    let mut stdout = io::stdout().lock();
    match args.format {
        Format::Text => write!(stdout, "{report}")?,
        Format::Yaml => write!(stdout, "{}", serde_yaml::to_string(&report)?)?,
    }
    stdout.flush()?;
    Ok(report)
}
