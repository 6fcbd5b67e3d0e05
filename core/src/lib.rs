#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Skirmish engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative match world, and pure systems. Adapters submit [`Command`]
//! values describing the input of the active player, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. Systems consume event streams,
//! query immutable snapshots, and respond exclusively with new commands.

mod terrain;
mod unit;

pub use terrain::{GridError, LayoutError, TerrainGrid, TerrainKind};
pub use unit::{
    AttackProfile, AttackSlot, UnitKind, UnitSnapshot, UnitSpec, UnitStats, ROSTER_SIZE,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Skirmish.";

/// Commands that express all permissible inputs to a running match.
///
/// Every command is addressed to the currently active unit; the world decides
/// whether the command is valid in the current [`Phase`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    /// Requests that the active unit move one request in the given direction.
    MoveActive {
        /// Direction of travel for the attempted move.
        direction: Direction,
    },
    /// Ends the move phase early, discarding any remaining budget.
    ValidatePosition,
    /// Resolves the attack of the given slot against the computed zone.
    SelectAttack {
        /// Attack profile used for damage and zone geometry.
        slot: AttackSlot,
    },
    /// Casts the healing spell of the active unit.
    Heal,
    /// Ends the active unit's turn without acting.
    SkipTurn,
    /// Aborts the match immediately.
    Quit,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Announces that control passed back to the first team.
    RoundStarted {
        /// One-based index of the round that began.
        round: u32,
    },
    /// Announces that a unit became the active unit.
    TurnStarted {
        /// Identifier of the unit that is now active.
        unit: UnitId,
        /// Team owning the active unit.
        team: Team,
        /// Round in which the turn takes place.
        round: u32,
    },
    /// Confirms that the active unit changed position.
    UnitMoved {
        /// Identifier of the unit that moved.
        unit: UnitId,
        /// Cell the unit occupied before the move.
        from: CellCoord,
        /// Cell the unit occupies after the move.
        to: CellCoord,
        /// Movement requests left in the current move phase.
        remaining_budget: u32,
    },
    /// Reports that a move request left the unit in place.
    MoveRejected {
        /// Identifier of the unit that attempted to move.
        unit: UnitId,
        /// Direction of the rejected request.
        direction: Direction,
        /// Specific reason the move failed.
        reason: MoveRejection,
        /// Movement requests left in the current move phase.
        remaining_budget: u32,
    },
    /// Confirms that a unit regained health.
    UnitHealed {
        /// Identifier of the healed unit.
        unit: UnitId,
        /// What triggered the healing.
        source: HealSource,
        /// Health points actually restored.
        amount: i32,
        /// Health of the unit after healing.
        health: i32,
    },
    /// Announces that the active unit's move phase is over.
    MovePhaseClosed {
        /// Identifier of the unit whose move phase closed.
        unit: UnitId,
        /// Final cell of the unit for this turn.
        cell: CellCoord,
    },
    /// Publishes the attack zones computed when the move phase closed.
    AttackZonesReady {
        /// Identifier of the unit the zones belong to.
        unit: UnitId,
        /// Cells targetable by the normal attack, in ascending order.
        normal: Vec<CellCoord>,
        /// Cells targetable by the special attack, in ascending order.
        special: Vec<CellCoord>,
    },
    /// Confirms that an attack struck an opposing unit.
    UnitAttacked {
        /// Identifier of the attacking unit.
        attacker: UnitId,
        /// Identifier of the unit that was struck.
        target: UnitId,
        /// Attack slot that was used.
        slot: AttackSlot,
        /// Damage subtracted from the target's health.
        damage: i32,
        /// Health of the target after the attack.
        remaining_health: i32,
    },
    /// Confirms that a unit was removed from its team's roster.
    UnitDefeated {
        /// Identifier of the defeated unit.
        unit: UnitId,
        /// Team that lost the unit.
        team: Team,
    },
    /// Reports that an attack-phase action was rejected without ending the turn.
    ActionRejected {
        /// Identifier of the active unit.
        unit: UnitId,
        /// Specific reason the action failed.
        reason: ActionRejection,
    },
    /// Reports that a command is not accepted in the current phase.
    CommandIgnored {
        /// Command that was ignored.
        command: Command,
        /// Phase the controller was in when the command arrived.
        phase: Phase,
    },
    /// Announces that the active unit finished its turn.
    TurnEnded {
        /// Identifier of the unit whose turn ended.
        unit: UnitId,
    },
    /// Announces that the match is over.
    MatchEnded {
        /// Final result of the match.
        outcome: MatchOutcome,
    },
}

/// One of the two opposing sides of a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Team {
    /// The side that acts first in every round.
    A,
    /// The side that acts second in every round.
    B,
}

impl Team {
    /// Both teams in turn order.
    pub const ALL: [Team; 2] = [Team::A, Team::B];

    /// Returns the opposing team.
    #[must_use]
    pub const fn opponent(self) -> Team {
        match self {
            Team::A => Team::B,
            Team::B => Team::A,
        }
    }

    /// Short human-readable label of the team.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Team::A => "A",
            Team::B => "B",
        }
    }
}

/// Cardinal movement directions available to units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// All cardinal directions in clockwise order starting at north.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Column and row delta of a single step in this direction.
    #[must_use]
    pub const fn delta(self) -> (i64, i64) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }
}

/// Unique identifier assigned to a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(u32);

impl UnitId {
    /// Creates a new unit identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Returns the cell displaced by the given signed offset.
    ///
    /// Yields `None` when either component would leave the `u32` range; upper
    /// grid bounds are not checked here.
    #[must_use]
    pub fn offset(self, columns: i64, rows: i64) -> Option<CellCoord> {
        let column = u32::try_from(i64::from(self.column) + columns).ok()?;
        let row = u32::try_from(i64::from(self.row) + rows).ok()?;
        Some(CellCoord::new(column, row))
    }

    /// Returns the cell `distance` steps away in the given direction.
    #[must_use]
    pub fn step(self, direction: Direction, distance: u32) -> Option<CellCoord> {
        let (dx, dy) = direction.delta();
        let distance = i64::from(distance);
        self.offset(dx * distance, dy * distance)
    }
}

/// States of the per-unit turn protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// The active unit accepts directional move requests.
    MoveOpen,
    /// The move phase ended and attack zones were computed.
    MoveClosed,
    /// The controller awaits a terminal action after a rejected one.
    AttackPending,
    /// No unit is active; only reached once the match is over.
    TurnDone,
}

/// Result of a match as observed by adapters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchOutcome {
    /// Both rosters still contain units.
    InProgress,
    /// One roster was emptied.
    Won {
        /// Team whose opponent has no units left.
        winner: Team,
    },
    /// The match was aborted by a quit request.
    Aborted,
}

impl MatchOutcome {
    /// Reports whether the match reached a terminal state.
    #[must_use]
    pub const fn is_over(self) -> bool {
        !matches!(self, MatchOutcome::InProgress)
    }

    /// Returns the winning team, if any.
    #[must_use]
    pub const fn winner(self) -> Option<Team> {
        match self {
            MatchOutcome::Won { winner } => Some(winner),
            _ => None,
        }
    }
}

/// What restored a unit's health.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HealSource {
    /// The unit finished a move on a healing zone.
    Terrain,
    /// The unit cast its healing spell.
    Spell,
}

/// Reasons a directional move request may leave the unit in place.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum MoveRejection {
    /// The first cell on the path lies outside the grid.
    #[error("destination lies outside the grid")]
    OutOfBounds,
    /// The first cell on the path is blocking terrain for the unit.
    #[error("destination terrain blocks the unit")]
    BlockedTerrain,
}

/// Reasons an attack-phase action may be rejected without ending the turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum ActionRejection {
    /// No opposing unit stands on any cell of the selected zone.
    #[error("no opposing unit occupies the attack zone")]
    NoTargetInZone,
    /// The active unit has no healing spell.
    #[error("the unit cannot heal")]
    CannotHeal,
    /// The active unit is already at maximum health.
    #[error("the unit is already at full health")]
    FullHealth,
}

/// Reasons a [`MatchSetup`] may be refused by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum SetupError {
    /// A team was configured without units.
    #[error("team {team:?} has no units")]
    EmptyRoster {
        /// Team with the empty roster.
        team: Team,
    },
    /// A team was configured with more units than a roster may hold.
    #[error("team {team:?} fields {count} units but a roster holds at most {max}", max = ROSTER_SIZE)]
    RosterTooLarge {
        /// Team with the oversized roster.
        team: Team,
        /// Number of configured units.
        count: usize,
    },
    /// A unit starts outside the grid.
    #[error("unit {index} of team {team:?} starts outside the grid at {cell:?}")]
    StartOutOfBounds {
        /// Team owning the unit.
        team: Team,
        /// Position of the unit within its roster.
        index: usize,
        /// Configured starting cell.
        cell: CellCoord,
    },
    /// A unit starts with health outside `1..=max_health`.
    #[error("unit {index} of team {team:?} starts with {health} of {max_health} health")]
    InvalidHealth {
        /// Team owning the unit.
        team: Team,
        /// Position of the unit within its roster.
        index: usize,
        /// Configured health.
        health: i32,
        /// Configured maximum health.
        max_health: i32,
    },
    /// A unit starts on terrain its movement rule cannot stand on.
    #[error("unit {index} of team {team:?} starts on blocking terrain at {cell:?}")]
    StartBlocked {
        /// Team owning the unit.
        team: Team,
        /// Position of the unit within its roster.
        index: usize,
        /// Configured starting cell.
        cell: CellCoord,
    },
}

/// Initial configuration consumed by the world before the first turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchSetup {
    /// Terrain of the battlefield for the whole match.
    pub terrain: TerrainGrid,
    /// Units of team A in turn order.
    pub team_a: Vec<UnitSpec>,
    /// Units of team B in turn order.
    pub team_b: Vec<UnitSpec>,
}

impl MatchSetup {
    /// Bundles terrain and both rosters into a setup.
    #[must_use]
    pub fn new(terrain: TerrainGrid, team_a: Vec<UnitSpec>, team_b: Vec<UnitSpec>) -> Self {
        Self {
            terrain,
            team_a,
            team_b,
        }
    }

    /// Units configured for the provided team.
    #[must_use]
    pub fn roster(&self, team: Team) -> &[UnitSpec] {
        match team {
            Team::A => &self.team_a,
            Team::B => &self.team_b,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        ActionRejection, CellCoord, Command, Direction, MatchOutcome, MoveRejection, Team, UnitId,
    };
    use serde::{de::DeserializeOwned, Serialize};

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = CellCoord::new(1, 1);
        let destination = CellCoord::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    #[test]
    fn offset_refuses_negative_components() {
        let origin = CellCoord::new(0, 3);
        assert_eq!(origin.offset(-1, 0), None);
        assert_eq!(origin.offset(0, -3), Some(CellCoord::new(0, 0)));
    }

    #[test]
    fn step_scales_with_distance() {
        let origin = CellCoord::new(5, 5);
        assert_eq!(
            origin.step(Direction::East, 2),
            Some(CellCoord::new(7, 5))
        );
        assert_eq!(
            origin.step(Direction::North, 5),
            Some(CellCoord::new(5, 0))
        );
        assert_eq!(origin.step(Direction::West, 6), None);
    }

    #[test]
    fn opponent_is_an_involution() {
        for team in Team::ALL {
            assert_ne!(team.opponent(), team);
            assert_eq!(team.opponent().opponent(), team);
        }
    }

    #[test]
    fn outcome_reports_winner_only_when_won() {
        assert_eq!(MatchOutcome::InProgress.winner(), None);
        assert_eq!(MatchOutcome::Aborted.winner(), None);
        assert!(MatchOutcome::Aborted.is_over());
        assert_eq!(
            MatchOutcome::Won { winner: Team::B }.winner(),
            Some(Team::B)
        );
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn commands_round_trip_through_bincode() {
        assert_round_trip(&Command::MoveActive {
            direction: Direction::West,
        });
        assert_round_trip(&Command::Quit);
    }

    #[test]
    fn rejection_reasons_round_trip_through_bincode() {
        assert_round_trip(&MoveRejection::BlockedTerrain);
        assert_round_trip(&ActionRejection::NoTargetInZone);
        assert_round_trip(&UnitId::new(7));
    }
}
