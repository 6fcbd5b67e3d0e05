//! Plain-text presentation of the battlefield and of world events.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt::Write as _,
};

use skirmish_core::{
    AttackSlot, CellCoord, Event, HealSource, MatchOutcome, Phase, Team, UnitId, UnitKind,
    UnitSnapshot,
};
use skirmish_world::{query, World};

const MOVE_MARK: char = '*';
const ZONE_MARK: char = 'x';

/// Renders the terrain, the units and the active unit's highlights.
///
/// Team A units are drawn in upper case, team B units in lower case. Legal
/// destinations are marked while the move phase is open, attack zones after.
pub(crate) fn render_board(world: &World) -> String {
    let units: BTreeMap<CellCoord, char> = Team::ALL
        .into_iter()
        .flat_map(|team| query::team_roster(world, team))
        .map(|unit| (unit.cell, unit_symbol(&unit)))
        .collect();
    let highlights = highlighted_cells(world);
    let terrain = query::terrain(world);

    let mut board = String::from("   ");
    for column in 0..terrain.size() {
        board.push(char::from_digit(column % 10, 10).unwrap_or(' '));
    }
    board.push('\n');

    for (row, cells) in (0_u32..).zip(terrain.rows()) {
        let _ = write!(board, "{row:>2} ");
        for (column, kind) in (0_u32..).zip(cells) {
            let cell = CellCoord::new(column, row);
            let symbol = units.get(&cell).copied().unwrap_or_else(|| {
                if highlights.contains(&cell) {
                    highlight_symbol(query::phase(world))
                } else {
                    kind.symbol()
                }
            });
            board.push(symbol);
        }
        board.push('\n');
    }

    for team in Team::ALL {
        for unit in query::team_roster(world, team) {
            let _ = writeln!(board, "{}", describe_unit(&unit));
        }
    }
    board
}

fn highlighted_cells(world: &World) -> BTreeSet<CellCoord> {
    match query::phase(world) {
        Phase::MoveOpen => query::movable_cells(world),
        Phase::MoveClosed | Phase::AttackPending => AttackSlot::ALL
            .into_iter()
            .flat_map(|slot| query::attackable_cells(world, slot))
            .collect(),
        Phase::TurnDone => BTreeSet::new(),
    }
}

const fn highlight_symbol(phase: Phase) -> char {
    match phase {
        Phase::MoveOpen => MOVE_MARK,
        _ => ZONE_MARK,
    }
}

fn unit_symbol(unit: &UnitSnapshot) -> char {
    let letter = match unit.kind {
        UnitKind::Archer => 'a',
        UnitKind::Swordsman => 's',
        UnitKind::Wizard => 'w',
        UnitKind::Invincible => 'i',
        UnitKind::Bomber => 'b',
    };
    match unit.team {
        Team::A => letter.to_ascii_uppercase(),
        Team::B => letter,
    }
}

fn describe_unit(unit: &UnitSnapshot) -> String {
    let normal = unit.attack(AttackSlot::Normal);
    let special = unit.attack(AttackSlot::Special);
    format!(
        "{marker}{team}{id} {kind:<10} ({column},{row}) hp {health}/{max} def {defense} move {budget}/{speed} | 1: {n_name} {n_power}/{n_range} | 2: {s_name} {s_power}/{s_range}",
        marker = if unit.selected { '>' } else { ' ' },
        team = unit.team.label(),
        id = unit.id.get(),
        kind = unit.kind.name(),
        column = unit.cell.column(),
        row = unit.cell.row(),
        health = unit.health,
        max = unit.max_health,
        defense = unit.defense,
        budget = unit.movement_budget,
        speed = unit.movement_speed,
        n_name = normal.name(),
        n_power = normal.power(),
        n_range = normal.range(),
        s_name = special.name(),
        s_power = special.power(),
        s_range = special.range(),
    )
}

/// Turns world events into one-line messages for the players.
#[derive(Debug)]
pub(crate) struct Narrator {
    labels: BTreeMap<UnitId, String>,
}

impl Narrator {
    /// Captures unit labels while every unit is still on the board.
    pub(crate) fn new(world: &World) -> Self {
        let labels = Team::ALL
            .into_iter()
            .flat_map(|team| query::team_roster(world, team))
            .map(|unit| {
                let label = format!("{}{} {}", unit.team.label(), unit.id.get(), unit.kind.name());
                (unit.id, label)
            })
            .collect();
        Self { labels }
    }

    fn label(&self, unit: UnitId) -> &str {
        self.labels.get(&unit).map_or("unknown unit", String::as_str)
    }

    /// Describes a single event, or `None` when it is not worth printing.
    pub(crate) fn narrate(&self, event: &Event) -> Option<String> {
        let line = match event {
            Event::RoundStarted { round } => format!("=== round {round} ==="),
            Event::TurnStarted { unit, .. } => format!("{} takes the field", self.label(*unit)),
            Event::UnitMoved {
                unit,
                to,
                remaining_budget,
                ..
            } => format!(
                "{} moves to ({},{}), {remaining_budget} moves left",
                self.label(*unit),
                to.column(),
                to.row()
            ),
            Event::MoveRejected {
                unit,
                reason,
                remaining_budget,
                ..
            } => format!(
                "{} cannot move: {reason}, {remaining_budget} moves left",
                self.label(*unit)
            ),
            Event::UnitHealed {
                unit,
                source,
                amount,
                health,
            } => {
                let cause = match source {
                    HealSource::Terrain => "the healing zone",
                    HealSource::Spell => "a healing spell",
                };
                format!(
                    "{} regains {amount} health from {cause} ({health} now)",
                    self.label(*unit)
                )
            }
            Event::MovePhaseClosed { unit, .. } => {
                format!("{} holds position; choose 1, 2, l or s", self.label(*unit))
            }
            Event::UnitAttacked {
                attacker,
                target,
                damage,
                remaining_health,
                ..
            } => format!(
                "{} hits {} for {damage} ({remaining_health} health left)",
                self.label(*attacker),
                self.label(*target)
            ),
            Event::UnitDefeated { unit, .. } => format!("{} is defeated", self.label(*unit)),
            Event::ActionRejected { unit, reason } => {
                format!("{}: {reason}", self.label(*unit))
            }
            Event::CommandIgnored { phase, .. } => {
                format!("that command is not available during {phase:?}")
            }
            Event::MatchEnded { outcome } => describe_outcome(*outcome),
            Event::AttackZonesReady { .. } | Event::TurnEnded { .. } => return None,
        };
        Some(line)
    }
}

/// Final message for a match result.
pub(crate) fn describe_outcome(outcome: MatchOutcome) -> String {
    match outcome {
        MatchOutcome::InProgress => "the match is still in progress".to_owned(),
        MatchOutcome::Won { winner } => format!("team {} wins the match", winner.label()),
        MatchOutcome::Aborted => "the match was abandoned".to_owned(),
    }
}
