#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Nearest-target tactics that play one team of a Skirmish match.

use std::collections::BTreeSet;

use skirmish_core::{
    AttackSlot, CellCoord, Command, Direction, Event, Phase, Team, TerrainGrid, UnitSnapshot,
};
use skirmish_world::rules;

/// Pure system that reacts to world events and emits commands for one team.
#[derive(Debug)]
pub struct Tactics {
    team: Team,
    visited: BTreeSet<CellCoord>,
}

impl Tactics {
    /// Creates a tactics system controlling the provided team.
    #[must_use]
    pub fn new(team: Team) -> Self {
        Self {
            team,
            visited: BTreeSet::new(),
        }
    }

    /// Team controlled by this system.
    #[must_use]
    pub const fn team(&self) -> Team {
        self.team
    }

    /// Consumes world events and immutable views to emit at most one command.
    ///
    /// Nothing is emitted unless the active unit belongs to the controlled team.
    pub fn handle(
        &mut self,
        events: &[Event],
        phase: Phase,
        active: Option<&UnitSnapshot>,
        opponents: &[UnitSnapshot],
        terrain: &TerrainGrid,
        out: &mut Vec<Command>,
    ) {
        if events
            .iter()
            .any(|event| matches!(event, Event::TurnStarted { .. }))
        {
            self.visited.clear();
        }

        let Some(active) = active.filter(|unit| unit.team == self.team) else {
            return;
        };

        let command = match phase {
            Phase::MoveOpen => self.plan_move(active, opponents, terrain),
            Phase::MoveClosed | Phase::AttackPending => plan_action(active, opponents, terrain),
            Phase::TurnDone => return,
        };
        out.push(command);
    }

    fn plan_move(
        &mut self,
        active: &UnitSnapshot,
        opponents: &[UnitSnapshot],
        terrain: &TerrainGrid,
    ) -> Command {
        let _ = self.visited.insert(active.cell);

        if best_hitting_slot(active, opponents, terrain).is_some() {
            return Command::ValidatePosition;
        }

        let Some(target) = opponents
            .iter()
            .min_by_key(|opponent| active.cell.manhattan_distance(opponent.cell))
        else {
            return Command::ValidatePosition;
        };

        let current = active.cell.manhattan_distance(target.cell);
        Direction::ALL
            .into_iter()
            .filter_map(|direction| {
                rules::resolve_move(terrain, active.kind, active.cell, direction)
                    .ok()
                    .map(|landing| (direction, landing))
            })
            .filter(|(_, landing)| !self.visited.contains(landing))
            .map(|(direction, landing)| (landing.manhattan_distance(target.cell), direction))
            .filter(|(distance, _)| *distance < current)
            .min_by_key(|(distance, _)| *distance)
            .map_or(Command::ValidatePosition, |(_, direction)| {
                Command::MoveActive { direction }
            })
    }
}

fn plan_action(
    active: &UnitSnapshot,
    opponents: &[UnitSnapshot],
    terrain: &TerrainGrid,
) -> Command {
    if let Some(slot) = best_hitting_slot(active, opponents, terrain) {
        Command::SelectAttack { slot }
    } else if active.kind.can_heal() && active.is_wounded() {
        Command::Heal
    } else {
        Command::SkipTurn
    }
}

fn best_hitting_slot(
    active: &UnitSnapshot,
    opponents: &[UnitSnapshot],
    terrain: &TerrainGrid,
) -> Option<AttackSlot> {
    AttackSlot::ALL
        .into_iter()
        .filter(|slot| {
            let zone = rules::attack_zone(terrain, active.kind, active.cell, active.attack(*slot));
            opponents.iter().any(|opponent| zone.contains(&opponent.cell))
        })
        .max_by_key(|slot| active.attack(*slot).power())
}
