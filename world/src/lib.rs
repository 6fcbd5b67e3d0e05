#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative match state for Skirmish.
//!
//! The world owns the terrain, both rosters and the per-unit turn protocol.
//! Adapters and systems mutate it exclusively through [`apply`] and observe it
//! through the [`query`] module.

pub mod rules;

use std::collections::BTreeSet;

use skirmish_core::{
    ActionRejection, AttackProfile, AttackSlot, CellCoord, Command, Direction, Event, HealSource,
    MatchOutcome, MatchSetup, Phase, SetupError, Team, TerrainGrid, TerrainKind, UnitId, UnitKind,
    UnitSnapshot, UnitSpec, ROSTER_SIZE, WELCOME_BANNER,
};
use thiserror::Error;
use tracing::{debug, info};

const TERRAIN_HEAL_AMOUNT: i32 = 1;
const SPELL_HEAL_AMOUNT: i32 = 4;

/// Represents the authoritative state of a single match.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    terrain: TerrainGrid,
    rosters: [Vec<Unit>; 2],
    turn: Turn,
    round: u32,
    outcome: MatchOutcome,
}

impl World {
    /// Validates the setup and activates the first unit of team A.
    pub fn new(setup: MatchSetup) -> Result<Self, SetupError> {
        let MatchSetup {
            terrain,
            team_a,
            team_b,
        } = setup;

        let mut next_id = 0_u32;
        let mut rosters: [Vec<Unit>; 2] = [Vec::new(), Vec::new()];
        for (team, specs) in [(Team::A, team_a), (Team::B, team_b)] {
            validate_roster(&terrain, team, &specs)?;
            rosters[roster_index(team)] = specs
                .into_iter()
                .map(|spec| {
                    let id = UnitId::new(next_id);
                    next_id = next_id.saturating_add(1);
                    Unit::from_spec(id, team, spec)
                })
                .collect();
        }

        let mut world = Self {
            banner: WELCOME_BANNER,
            terrain,
            rosters,
            turn: Turn::new(Team::A, 0),
            round: 1,
            outcome: MatchOutcome::InProgress,
        };
        let mut opening = Vec::new();
        world.activate(Team::A, 0, &mut opening);
        debug!(events = opening.len(), "match initialised");
        Ok(world)
    }

    fn roster(&self, team: Team) -> &[Unit] {
        &self.rosters[roster_index(team)]
    }

    fn active(&self) -> Option<&Unit> {
        if self.outcome.is_over() {
            return None;
        }
        self.roster(self.turn.team).get(self.turn.cursor)
    }

    fn active_mut(&mut self) -> Option<&mut Unit> {
        if self.outcome.is_over() {
            return None;
        }
        let cursor = self.turn.cursor;
        self.rosters[roster_index(self.turn.team)].get_mut(cursor)
    }

    fn activate(&mut self, team: Team, cursor: usize, out_events: &mut Vec<Event>) {
        self.turn = Turn::new(team, cursor);
        let round = self.round;
        let Some(unit) = self.active_mut() else {
            return;
        };
        unit.selected = true;
        unit.movement_budget = unit.movement_speed;
        let (id, exhausted) = (unit.id, unit.movement_budget == 0);

        debug!(unit = id.get(), team = team.label(), round, "turn started");
        out_events.push(Event::TurnStarted {
            unit: id,
            team,
            round,
        });

        if exhausted {
            self.close_move_phase(out_events);
        }
    }

    fn move_active(&mut self, direction: Direction, out_events: &mut Vec<Event>) {
        let (team, cursor) = (self.turn.team, self.turn.cursor);
        let terrain = &self.terrain;
        let Some(unit) = self.rosters[roster_index(team)].get_mut(cursor) else {
            return;
        };

        // A rejected request still spends one unit of budget.
        unit.movement_budget = unit.movement_budget.saturating_sub(1);
        match rules::resolve_move(terrain, unit.kind, unit.cell, direction) {
            Ok(to) => {
                let from = unit.cell;
                unit.cell = to;
                out_events.push(Event::UnitMoved {
                    unit: unit.id,
                    from,
                    to,
                    remaining_budget: unit.movement_budget,
                });

                if terrain.terrain_at(to) == Ok(TerrainKind::HealingZone) {
                    if let Some(amount) = unit.restore(TERRAIN_HEAL_AMOUNT) {
                        out_events.push(Event::UnitHealed {
                            unit: unit.id,
                            source: HealSource::Terrain,
                            amount,
                            health: unit.health,
                        });
                    }
                }
            }
            Err(reason) => {
                debug!(unit = unit.id.get(), ?direction, %reason, "move rejected");
                out_events.push(Event::MoveRejected {
                    unit: unit.id,
                    direction,
                    reason,
                    remaining_budget: unit.movement_budget,
                });
            }
        }

        if unit.movement_budget == 0 {
            self.close_move_phase(out_events);
        }
    }

    fn close_move_phase(&mut self, out_events: &mut Vec<Event>) {
        let (team, cursor) = (self.turn.team, self.turn.cursor);
        let terrain = &self.terrain;
        let Some(unit) = self.rosters[roster_index(team)].get_mut(cursor) else {
            return;
        };
        unit.movement_budget = 0;
        let zones = AttackZones::compute(terrain, unit.kind, unit.cell, &unit.attacks);
        let (id, cell) = (unit.id, unit.cell);

        self.turn.phase = Phase::MoveClosed;
        out_events.push(Event::MovePhaseClosed { unit: id, cell });
        out_events.push(Event::AttackZonesReady {
            unit: id,
            normal: zones.normal.iter().copied().collect(),
            special: zones.special.iter().copied().collect(),
        });
        self.turn.zones = Some(zones);
    }

    fn attack(&mut self, slot: AttackSlot, out_events: &mut Vec<Event>) {
        self.turn.phase = Phase::AttackPending;
        let Some(attacker) = self.active().map(Unit::snapshot) else {
            return;
        };

        let opponent = attacker.team.opponent();
        let target_index = self.turn.zones.as_ref().and_then(|zones| {
            let zone = zones.get(slot);
            self.roster(opponent)
                .iter()
                .position(|unit| zone.contains(&unit.cell))
        });
        let Some(target_index) = target_index else {
            reject(attacker.id, ActionRejection::NoTargetInZone, out_events);
            return;
        };

        let damage = i32::try_from(attacker.attack(slot).power()).unwrap_or(i32::MAX);
        let opponents = &mut self.rosters[roster_index(opponent)];
        let Some(target) = opponents.get_mut(target_index) else {
            return;
        };
        target.health = target.health.saturating_sub(damage);
        out_events.push(Event::UnitAttacked {
            attacker: attacker.id,
            target: target.id,
            slot,
            damage,
            remaining_health: target.health,
        });

        if target.health <= 0 {
            let defeated = opponents.remove(target_index);
            info!(
                unit = defeated.id.get(),
                kind = defeated.kind.name(),
                team = opponent.label(),
                "unit defeated"
            );
            out_events.push(Event::UnitDefeated {
                unit: defeated.id,
                team: opponent,
            });
        }

        self.finish_turn(out_events);
    }

    fn heal_active(&mut self, out_events: &mut Vec<Event>) {
        self.turn.phase = Phase::AttackPending;
        let Some(unit) = self.active_mut() else {
            return;
        };
        let id = unit.id;

        let outcome = if !unit.kind.can_heal() {
            Err(ActionRejection::CannotHeal)
        } else {
            unit.restore(SPELL_HEAL_AMOUNT)
                .map(|amount| (amount, unit.health))
                .ok_or(ActionRejection::FullHealth)
        };

        match outcome {
            Ok((amount, health)) => {
                out_events.push(Event::UnitHealed {
                    unit: id,
                    source: HealSource::Spell,
                    amount,
                    health,
                });
                self.finish_turn(out_events);
            }
            Err(reason) => reject(id, reason, out_events),
        }
    }

    fn finish_turn(&mut self, out_events: &mut Vec<Event>) {
        if let Some(unit) = self.active_mut() {
            unit.selected = false;
            unit.movement_budget = 0;
            let id = unit.id;
            debug!(unit = id.get(), "turn ended");
            out_events.push(Event::TurnEnded { unit: id });
        }
        self.turn.zones = None;
        self.turn.phase = Phase::TurnDone;
        self.advance(out_events);
    }

    fn advance(&mut self, out_events: &mut Vec<Event>) {
        if let Err(empty) = self.ensure_rosters() {
            debug!(%empty, "win condition reached");
            self.end_match(
                MatchOutcome::Won {
                    winner: empty.team.opponent(),
                },
                out_events,
            );
            return;
        }

        let next_cursor = self.turn.cursor.saturating_add(1);
        let (team, cursor) = if next_cursor < self.roster(self.turn.team).len() {
            (self.turn.team, next_cursor)
        } else {
            (self.turn.team.opponent(), 0)
        };

        if team == Team::A && cursor == 0 {
            self.round = self.round.saturating_add(1);
            out_events.push(Event::RoundStarted { round: self.round });
        }
        self.activate(team, cursor, out_events);
    }

    fn ensure_rosters(&self) -> Result<(), EmptyRoster> {
        match Team::ALL.into_iter().find(|team| self.roster(*team).is_empty()) {
            Some(team) => Err(EmptyRoster { team }),
            None => Ok(()),
        }
    }

    fn end_match(&mut self, outcome: MatchOutcome, out_events: &mut Vec<Event>) {
        for unit in self.rosters.iter_mut().flatten() {
            unit.selected = false;
            unit.movement_budget = 0;
        }
        self.outcome = outcome;
        self.turn.phase = Phase::TurnDone;
        self.turn.zones = None;
        info!(?outcome, round = self.round, "match ended");
        out_events.push(Event::MatchEnded { outcome });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if world.outcome.is_over() {
        ignore(world, command, out_events);
        return;
    }

    match (world.turn.phase, command) {
        (_, Command::Quit) => world.end_match(MatchOutcome::Aborted, out_events),
        (Phase::MoveOpen, Command::MoveActive { direction }) => {
            world.move_active(direction, out_events);
        }
        (Phase::MoveOpen, Command::ValidatePosition) => world.close_move_phase(out_events),
        (Phase::MoveClosed | Phase::AttackPending, Command::SelectAttack { slot }) => {
            world.attack(slot, out_events);
        }
        (Phase::MoveClosed | Phase::AttackPending, Command::Heal) => {
            world.heal_active(out_events);
        }
        (Phase::MoveClosed | Phase::AttackPending, Command::SkipTurn) => {
            world.turn.phase = Phase::AttackPending;
            world.finish_turn(out_events);
        }
        _ => ignore(world, command, out_events),
    }
}

fn reject(unit: UnitId, reason: ActionRejection, out_events: &mut Vec<Event>) {
    debug!(unit = unit.get(), %reason, "action rejected");
    out_events.push(Event::ActionRejected { unit, reason });
}

fn ignore(world: &World, command: Command, out_events: &mut Vec<Event>) {
    let phase = world.turn.phase;
    debug!(?command, ?phase, "command ignored");
    out_events.push(Event::CommandIgnored { command, phase });
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::collections::BTreeSet;

    use super::{rules, AttackZones, World};
    use skirmish_core::{
        AttackSlot, CellCoord, MatchOutcome, Phase, Team, TerrainGrid, UnitId, UnitSnapshot,
    };

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the battlefield terrain.
    #[must_use]
    pub fn terrain(world: &World) -> &TerrainGrid {
        &world.terrain
    }

    /// Current state of the turn protocol.
    #[must_use]
    pub fn phase(world: &World) -> Phase {
        world.turn.phase
    }

    /// One-based index of the current round.
    #[must_use]
    pub fn round(world: &World) -> u32 {
        world.round
    }

    /// Reports whether the match is over and who won it.
    #[must_use]
    pub fn match_outcome(world: &World) -> MatchOutcome {
        world.outcome
    }

    /// Captures the unit whose turn is in progress, if any.
    #[must_use]
    pub fn active_unit(world: &World) -> Option<UnitSnapshot> {
        world.active().map(super::Unit::snapshot)
    }

    /// Captures the surviving units of the provided team in turn order.
    #[must_use]
    pub fn team_roster(world: &World, team: Team) -> Vec<UnitSnapshot> {
        world
            .roster(team)
            .iter()
            .map(super::Unit::snapshot)
            .collect()
    }

    /// Looks up a surviving unit by identifier.
    #[must_use]
    pub fn unit(world: &World, id: UnitId) -> Option<UnitSnapshot> {
        world
            .rosters
            .iter()
            .flatten()
            .find(|unit| unit.id == id)
            .map(super::Unit::snapshot)
    }

    /// Cells the active unit could still end its move phase on.
    ///
    /// Empty once the move phase is closed or when no unit is active.
    #[must_use]
    pub fn movable_cells(world: &World) -> BTreeSet<CellCoord> {
        match world.active() {
            Some(unit) if world.turn.phase == Phase::MoveOpen => rules::reachable_cells(
                &world.terrain,
                unit.kind,
                unit.cell,
                unit.movement_budget,
            ),
            _ => BTreeSet::new(),
        }
    }

    /// Cells targeted by the active unit's attack in the provided slot.
    ///
    /// After the move phase closes this is the zone computed at closing time;
    /// before that it previews the zone from the unit's current cell.
    #[must_use]
    pub fn attackable_cells(world: &World, slot: AttackSlot) -> BTreeSet<CellCoord> {
        if let Some(zones) = &world.turn.zones {
            return zones.get(slot).clone();
        }
        world
            .active()
            .map(|unit| {
                AttackZones::compute(&world.terrain, unit.kind, unit.cell, &unit.attacks)
                    .get(slot)
                    .clone()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Error)]
#[error("team {team:?} has no units left")]
struct EmptyRoster {
    team: Team,
}

#[derive(Debug)]
struct Turn {
    team: Team,
    cursor: usize,
    phase: Phase,
    zones: Option<AttackZones>,
}

impl Turn {
    fn new(team: Team, cursor: usize) -> Self {
        Self {
            team,
            cursor,
            phase: Phase::MoveOpen,
            zones: None,
        }
    }
}

#[derive(Clone, Debug)]
struct AttackZones {
    normal: BTreeSet<CellCoord>,
    special: BTreeSet<CellCoord>,
}

impl AttackZones {
    fn compute(
        terrain: &TerrainGrid,
        kind: UnitKind,
        cell: CellCoord,
        attacks: &[AttackProfile; 2],
    ) -> Self {
        Self {
            normal: rules::attack_zone(terrain, kind, cell, attacks[AttackSlot::Normal.index()]),
            special: rules::attack_zone(terrain, kind, cell, attacks[AttackSlot::Special.index()]),
        }
    }

    fn get(&self, slot: AttackSlot) -> &BTreeSet<CellCoord> {
        match slot {
            AttackSlot::Normal => &self.normal,
            AttackSlot::Special => &self.special,
        }
    }
}

#[derive(Clone, Debug)]
struct Unit {
    id: UnitId,
    team: Team,
    kind: UnitKind,
    cell: CellCoord,
    health: i32,
    max_health: i32,
    defense: i32,
    movement_speed: u32,
    movement_budget: u32,
    attacks: [AttackProfile; 2],
    selected: bool,
}

impl Unit {
    fn from_spec(id: UnitId, team: Team, spec: UnitSpec) -> Self {
        Self {
            id,
            team,
            kind: spec.kind,
            cell: spec.cell,
            health: spec.stats.health,
            max_health: spec.stats.max_health,
            defense: spec.stats.defense,
            movement_speed: spec.stats.movement,
            movement_budget: 0,
            attacks: spec.stats.attacks,
            selected: false,
        }
    }

    fn snapshot(&self) -> UnitSnapshot {
        UnitSnapshot {
            id: self.id,
            team: self.team,
            kind: self.kind,
            cell: self.cell,
            health: self.health,
            max_health: self.max_health,
            defense: self.defense,
            movement_speed: self.movement_speed,
            movement_budget: self.movement_budget,
            attacks: self.attacks,
            selected: self.selected,
        }
    }

    /// Restores up to `amount` health; `None` when already at full health.
    fn restore(&mut self, amount: i32) -> Option<i32> {
        if self.health >= self.max_health {
            return None;
        }
        let healed = self.health.saturating_add(amount).min(self.max_health);
        let restored = healed - self.health;
        self.health = healed;
        Some(restored)
    }
}

fn roster_index(team: Team) -> usize {
    match team {
        Team::A => 0,
        Team::B => 1,
    }
}

fn validate_roster(
    terrain: &TerrainGrid,
    team: Team,
    specs: &[UnitSpec],
) -> Result<(), SetupError> {
    if specs.is_empty() {
        return Err(SetupError::EmptyRoster { team });
    }
    if specs.len() > ROSTER_SIZE {
        return Err(SetupError::RosterTooLarge {
            team,
            count: specs.len(),
        });
    }

    for (index, spec) in specs.iter().enumerate() {
        let stats = &spec.stats;
        if stats.health < 1 || stats.health > stats.max_health {
            return Err(SetupError::InvalidHealth {
                team,
                index,
                health: stats.health,
                max_health: stats.max_health,
            });
        }
        if !terrain.contains(spec.cell) {
            return Err(SetupError::StartOutOfBounds {
                team,
                index,
                cell: spec.cell,
            });
        }
        if !terrain.is_passable(spec.cell, spec.kind) {
            return Err(SetupError::StartBlocked {
                team,
                index,
                cell: spec.cell,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_setup(team_a: Vec<UnitSpec>, team_b: Vec<UnitSpec>) -> MatchSetup {
        MatchSetup::new(TerrainGrid::filled(8, TerrainKind::Open), team_a, team_b)
    }

    fn unit(kind: UnitKind, column: u32, row: u32) -> UnitSpec {
        UnitSpec::new(kind, CellCoord::new(column, row))
    }

    #[test]
    fn new_activates_first_unit_of_team_a() {
        let world = World::new(open_setup(
            vec![unit(UnitKind::Archer, 0, 0), unit(UnitKind::Wizard, 1, 0)],
            vec![unit(UnitKind::Bomber, 7, 7)],
        ))
        .expect("valid setup");

        let active = query::active_unit(&world).expect("active unit");
        assert_eq!(active.id, UnitId::new(0));
        assert_eq!(active.team, Team::A);
        assert!(active.selected);
        assert_eq!(active.movement_budget, active.movement_speed);
        assert_eq!(query::phase(&world), Phase::MoveOpen);
        assert_eq!(query::round(&world), 1);
        assert_eq!(query::welcome_banner(&world), WELCOME_BANNER);
    }

    #[test]
    fn identifiers_follow_setup_order() {
        let world = World::new(open_setup(
            vec![unit(UnitKind::Archer, 0, 0), unit(UnitKind::Wizard, 1, 0)],
            vec![unit(UnitKind::Bomber, 7, 7), unit(UnitKind::Swordsman, 6, 7)],
        ))
        .expect("valid setup");

        let ids: Vec<u32> = Team::ALL
            .into_iter()
            .flat_map(|team| query::team_roster(&world, team))
            .map(|snapshot| snapshot.id.get())
            .collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }

    #[test]
    fn setup_rejects_invalid_rosters() {
        let empty = World::new(open_setup(Vec::new(), vec![unit(UnitKind::Bomber, 7, 7)]));
        assert_eq!(
            empty.err(),
            Some(SetupError::EmptyRoster { team: Team::A })
        );

        let crowded = World::new(open_setup(
            vec![unit(UnitKind::Archer, 0, 0)],
            vec![unit(UnitKind::Bomber, 7, 7); 4],
        ));
        assert_eq!(
            crowded.err(),
            Some(SetupError::RosterTooLarge {
                team: Team::B,
                count: 4,
            })
        );

        let outside = World::new(open_setup(
            vec![unit(UnitKind::Archer, 8, 0)],
            vec![unit(UnitKind::Bomber, 7, 7)],
        ));
        assert_eq!(
            outside.err(),
            Some(SetupError::StartOutOfBounds {
                team: Team::A,
                index: 0,
                cell: CellCoord::new(8, 0),
            })
        );
    }

    #[test]
    fn setup_rejects_health_outside_the_valid_range() {
        let mut fallen = unit(UnitKind::Swordsman, 1, 0);
        fallen.stats.health = 0;
        let mut overcharged = unit(UnitKind::Wizard, 7, 6);
        overcharged.stats.health = 13;

        let dead_start = World::new(open_setup(
            vec![unit(UnitKind::Archer, 0, 0), fallen],
            vec![unit(UnitKind::Bomber, 7, 7)],
        ));
        assert_eq!(
            dead_start.err(),
            Some(SetupError::InvalidHealth {
                team: Team::A,
                index: 1,
                health: 0,
                max_health: 10,
            })
        );

        let over_start = World::new(open_setup(
            vec![unit(UnitKind::Archer, 0, 0)],
            vec![overcharged],
        ));
        assert_eq!(
            over_start.err(),
            Some(SetupError::InvalidHealth {
                team: Team::B,
                index: 0,
                health: 13,
                max_health: 12,
            })
        );
    }

    #[test]
    fn setup_rejects_units_starting_on_water_unless_amphibious() {
        let water = CellCoord::new(3, 3);
        let terrain = TerrainGrid::filled(8, TerrainKind::Open)
            .with_terrain(water, TerrainKind::Water)
            .expect("cell inside grid");

        let swimmer = World::new(MatchSetup::new(
            terrain.clone(),
            vec![UnitSpec::new(UnitKind::Wizard, water)],
            vec![unit(UnitKind::Bomber, 7, 7)],
        ));
        assert!(swimmer.is_ok());

        let sinker = World::new(MatchSetup::new(
            terrain,
            vec![unit(UnitKind::Archer, 0, 0)],
            vec![UnitSpec::new(UnitKind::Bomber, water)],
        ));
        assert_eq!(
            sinker.err(),
            Some(SetupError::StartBlocked {
                team: Team::B,
                index: 0,
                cell: water,
            })
        );
    }

    #[test]
    fn zero_speed_unit_starts_with_closed_move_phase() {
        let world = World::new(open_setup(
            vec![unit(UnitKind::Swordsman, 0, 0).with_movement(0)],
            vec![unit(UnitKind::Bomber, 7, 7)],
        ))
        .expect("valid setup");

        assert_eq!(query::phase(&world), Phase::MoveClosed);
        assert!(query::movable_cells(&world).is_empty());
    }

    #[test]
    fn restore_caps_at_max_health() {
        let mut wizard = Unit::from_spec(
            UnitId::new(0),
            Team::A,
            unit(UnitKind::Wizard, 0, 0).with_health(10),
        );

        assert_eq!(wizard.restore(SPELL_HEAL_AMOUNT), Some(2));
        assert_eq!(wizard.health, wizard.max_health);
        assert_eq!(wizard.restore(TERRAIN_HEAL_AMOUNT), None);
    }

    #[test]
    fn attackable_cells_preview_follows_the_unit() {
        let mut world = World::new(open_setup(
            vec![unit(UnitKind::Swordsman, 0, 0)],
            vec![unit(UnitKind::Bomber, 7, 7)],
        ))
        .expect("valid setup");
        let mut events = Vec::new();

        let before = query::attackable_cells(&world, AttackSlot::Normal);
        apply(
            &mut world,
            Command::MoveActive {
                direction: Direction::South,
            },
            &mut events,
        );
        let after = query::attackable_cells(&world, AttackSlot::Normal);

        assert!(before.contains(&CellCoord::new(0, 1)));
        assert!(after.contains(&CellCoord::new(0, 2)));
        assert_ne!(before, after);
    }
}
