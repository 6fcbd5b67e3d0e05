#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a Skirmish match in the terminal.

mod board;
mod input;

use std::io::{self, BufRead, Write};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use skirmish_core::{Command, Event, Team, UnitKind};
use skirmish_system_bootstrap::{match_setup, parse_roster, seeded_rosters, Bootstrap, MapPreset};
use skirmish_system_tactics::Tactics;
use skirmish_world::{self as world, query, World};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::board::{describe_outcome, render_board, Narrator};
use crate::input::{parse_input, HELP};

/// Turn-based grid tactics between two teams of three units.
#[derive(Debug, Parser)]
#[command(name = "skirmish", version, about)]
struct CliArgs {
    /// Battlefield to play on.
    #[arg(long, value_enum, default_value_t = MapArg::Large)]
    map: MapArg,

    /// Comma-separated unit kinds of team A.
    #[arg(long, default_value = "archer,swordsman,wizard")]
    team_a: String,

    /// Comma-separated unit kinds of team B.
    #[arg(long, default_value = "invincible,bomber,archer")]
    team_b: String,

    /// Draw both rosters at random instead of reading them from the flags.
    #[arg(long)]
    random_rosters: bool,

    /// Seed for the random roster draw.
    #[arg(long)]
    seed: Option<u64>,

    /// Who controls team A.
    #[arg(long = "a", value_enum, default_value_t = Controller::Human)]
    controller_a: Controller,

    /// Who controls team B.
    #[arg(long = "b", value_enum, default_value_t = Controller::Ai)]
    controller_b: Controller,

    /// Stops the match once this round is over.
    #[arg(long)]
    max_rounds: Option<u32>,

    /// Log filter used when `RUST_LOG` is not set.
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum MapArg {
    Large,
    Small,
}

impl From<MapArg> for MapPreset {
    fn from(value: MapArg) -> Self {
        match value {
            MapArg::Large => MapPreset::Large,
            MapArg::Small => MapPreset::Small,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Controller {
    Human,
    Ai,
}

/// Entry point for the Skirmish command-line interface.
fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(&args.log_level)?;
    run(&args)
}

fn init_tracing(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .with_context(|| format!("invalid log level {level:?}"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
    Ok(())
}

fn rosters(args: &CliArgs) -> Result<(Vec<UnitKind>, Vec<UnitKind>)> {
    if args.random_rosters {
        let seed = args.seed.unwrap_or_else(rand::random);
        info!(seed, "drawing random rosters");
        return Ok(seeded_rosters(seed));
    }

    let team_a = parse_roster(&args.team_a).context("failed to read --team-a")?;
    let team_b = parse_roster(&args.team_b).context("failed to read --team-b")?;
    Ok((team_a, team_b))
}

fn run(args: &CliArgs) -> Result<()> {
    let (team_a, team_b) = rosters(args)?;
    let setup = match_setup(args.map.into(), &team_a, &team_b)
        .context("failed to assemble the match")?;
    let mut world = World::new(setup).context("failed to start the match")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    writeln!(out, "{}", Bootstrap.welcome_banner(&world))?;
    let narrator = Narrator::new(&world);
    let mut controllers = [
        (args.controller_a == Controller::Ai).then(|| Tactics::new(Team::A)),
        (args.controller_b == Controller::Ai).then(|| Tactics::new(Team::B)),
    ];
    let mut events: Vec<Event> = Vec::new();

    loop {
        if query::match_outcome(&world).is_over() {
            break;
        }
        if let Some(limit) = args.max_rounds {
            if query::round(&world) > limit {
                warn!(limit, "round limit reached");
                writeln!(out, "round limit of {limit} reached")?;
                break;
            }
        }
        let Some(active) = query::active_unit(&world) else {
            break;
        };

        let opponents = query::team_roster(&world, active.team.opponent());
        let mut proposals = Vec::new();
        for tactics in controllers.iter_mut().flatten() {
            tactics.handle(
                &events,
                query::phase(&world),
                Some(&active),
                &opponents,
                query::terrain(&world),
                &mut proposals,
            );
        }

        let human = controllers
            .iter()
            .flatten()
            .all(|tactics| tactics.team() != active.team);
        let command = if human {
            write!(
                out,
                "{}team {} > ",
                render_board(&world),
                active.team.label()
            )?;
            out.flush()?;
            let Some(line) = lines.next() else {
                info!("input closed, leaving the match");
                events.clear();
                world::apply(&mut world, Command::Quit, &mut events);
                break;
            };
            let line = line.context("failed to read player input")?;
            match parse_input(&line) {
                Some(command) => command,
                None => {
                    writeln!(out, "{HELP}")?;
                    continue;
                }
            }
        } else {
            let Some(command) = proposals.pop() else {
                bail!("tactics for team {} proposed no command", active.team.label());
            };
            command
        };

        events.clear();
        world::apply(&mut world, command, &mut events);
        for event in &events {
            if let Some(line) = narrator.narrate(event) {
                writeln!(out, "{line}")?;
            }
        }
    }

    writeln!(out, "{}", describe_outcome(query::match_outcome(&world)))?;
    for team in Team::ALL {
        let survivors = query::team_roster(&world, team).len();
        writeln!(out, "team {}: {survivors} units standing", team.label())?;
    }
    Ok(())
}
