//! Per-variant movement rules and attack-zone geometry.
//!
//! Every unit kind maps to one [`VariantRules`] entry. Both the single-move
//! API used by the turn controller and the reachability search used for
//! previews go through [`resolve_move`], so the two cannot disagree.

use std::collections::{BTreeSet, VecDeque};

use skirmish_core::{
    AttackProfile, CellCoord, Direction, MoveRejection, TerrainGrid, UnitKind,
};

/// Relative cells struck by the invincible unit, independent of the attack slot.
///
/// The eight neighbours plus the sixteen cells at Chebyshev distance two.
pub const INVINCIBLE_OFFSETS: [(i64, i64); 24] = [
    (0, -1),
    (0, 1),
    (-1, 0),
    (-1, -1),
    (1, 0),
    (1, -1),
    (1, 1),
    (-1, 1),
    (-2, -2),
    (-2, -1),
    (-2, 0),
    (-2, 1),
    (-2, 2),
    (-1, -2),
    (-1, 2),
    (0, -2),
    (0, 2),
    (1, -2),
    (1, 2),
    (2, -2),
    (2, -1),
    (2, 0),
    (2, 1),
    (2, 2),
];

/// How a single directional request displaces a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MovementRule {
    /// One cell per request over dry land.
    SingleStep,
    /// Up to two cells per request, stopping early in front of an obstacle.
    Leap,
    /// One cell per request, water included.
    Amphibious,
}

/// Shape of the cells an attack can reach.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZoneShape {
    /// Cells along the four cardinal lines from `nearest` up to the attack range.
    CardinalRay {
        /// Distance of the first targetable cell on each line.
        nearest: u32,
    },
    /// Every cell within Manhattan distance of the attack range, own cell included.
    Diamond,
    /// A fixed list of relative offsets that ignores the attack range.
    Offsets(&'static [(i64, i64)]),
    /// Cells at Manhattan distance between `max(1, range / 2)` and the range.
    Annulus,
}

/// Movement rule and zone shape of one unit kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VariantRules {
    /// Rule applied to directional move requests.
    pub movement: MovementRule,
    /// Shape of both attack zones.
    pub zone: ZoneShape,
}

/// Looks up the rules of the provided unit kind.
#[must_use]
pub const fn variant_rules(kind: UnitKind) -> VariantRules {
    match kind {
        UnitKind::Archer => VariantRules {
            movement: MovementRule::Leap,
            zone: ZoneShape::CardinalRay { nearest: 2 },
        },
        UnitKind::Swordsman => VariantRules {
            movement: MovementRule::SingleStep,
            zone: ZoneShape::CardinalRay { nearest: 1 },
        },
        UnitKind::Wizard => VariantRules {
            movement: MovementRule::Amphibious,
            zone: ZoneShape::Diamond,
        },
        UnitKind::Invincible => VariantRules {
            movement: MovementRule::Leap,
            zone: ZoneShape::Offsets(&INVINCIBLE_OFFSETS),
        },
        UnitKind::Bomber => VariantRules {
            movement: MovementRule::SingleStep,
            zone: ZoneShape::Annulus,
        },
    }
}

/// Resolves one directional move request without mutating anything.
///
/// Returns the landing cell, or the reason the unit stays where it is.
pub fn resolve_move(
    terrain: &TerrainGrid,
    kind: UnitKind,
    from: CellCoord,
    direction: Direction,
) -> Result<CellCoord, MoveRejection> {
    match variant_rules(kind).movement {
        MovementRule::SingleStep | MovementRule::Amphibious => {
            try_step(terrain, kind, from, direction)
        }
        MovementRule::Leap => try_leap(terrain, kind, from, direction),
    }
}

/// Attempts to advance a single cell.
pub fn try_step(
    terrain: &TerrainGrid,
    kind: UnitKind,
    from: CellCoord,
    direction: Direction,
) -> Result<CellCoord, MoveRejection> {
    let next = from
        .step(direction, 1)
        .filter(|cell| terrain.contains(*cell))
        .ok_or(MoveRejection::OutOfBounds)?;

    if terrain.is_passable(next, kind) {
        Ok(next)
    } else {
        Err(MoveRejection::BlockedTerrain)
    }
}

/// Attempts to advance two cells, validating the intermediate cell first.
///
/// A blocked or out-of-bounds intermediate cell rejects the move. A blocked
/// or out-of-bounds far cell lands the unit on the intermediate cell.
pub fn try_leap(
    terrain: &TerrainGrid,
    kind: UnitKind,
    from: CellCoord,
    direction: Direction,
) -> Result<CellCoord, MoveRejection> {
    let intermediate = try_step(terrain, kind, from, direction)?;
    Ok(try_step(terrain, kind, intermediate, direction).unwrap_or(intermediate))
}

/// Computes every cell a unit could end its move phase on.
///
/// The starting cell is always part of the result.
#[must_use]
pub fn reachable_cells(
    terrain: &TerrainGrid,
    kind: UnitKind,
    from: CellCoord,
    budget: u32,
) -> BTreeSet<CellCoord> {
    match variant_rules(kind).movement {
        MovementRule::SingleStep | MovementRule::Amphibious => {
            flood_reachable(terrain, kind, from, budget)
        }
        MovementRule::Leap => leap_reachable(terrain, kind, from, budget),
    }
}

fn flood_reachable(
    terrain: &TerrainGrid,
    kind: UnitKind,
    from: CellCoord,
    budget: u32,
) -> BTreeSet<CellCoord> {
    let mut reached = BTreeSet::new();
    let mut frontier = VecDeque::new();
    let _ = reached.insert(from);
    frontier.push_back((from, 0_u32));

    while let Some((cell, depth)) = frontier.pop_front() {
        if depth >= budget {
            continue;
        }
        for direction in Direction::ALL {
            let Ok(next) = resolve_move(terrain, kind, cell, direction) else {
                continue;
            };
            if reached.insert(next) {
                frontier.push_back((next, depth + 1));
            }
        }
    }

    reached
}

// Accumulates intermediate and far cells alike; the intermediate cell is
// listed even when the request itself would carry the unit past it.
fn leap_reachable(
    terrain: &TerrainGrid,
    kind: UnitKind,
    from: CellCoord,
    budget: u32,
) -> BTreeSet<CellCoord> {
    let mut reached = BTreeSet::from([from]);

    for _ in 0..budget {
        let mut discovered = Vec::new();
        for cell in &reached {
            for direction in Direction::ALL {
                let Ok(intermediate) = try_step(terrain, kind, *cell, direction) else {
                    continue;
                };
                discovered.push(intermediate);
                if let Ok(landing) = try_leap(terrain, kind, *cell, direction) {
                    discovered.push(landing);
                }
            }
        }

        let before = reached.len();
        reached.extend(discovered);
        if reached.len() == before {
            break;
        }
    }

    reached
}

/// Computes the cells reachable by an attack of the given profile.
///
/// Only grid bounds are applied; terrain never blocks an attack.
#[must_use]
pub fn attack_zone(
    terrain: &TerrainGrid,
    kind: UnitKind,
    from: CellCoord,
    attack: AttackProfile,
) -> BTreeSet<CellCoord> {
    let range = attack.range();
    match variant_rules(kind).zone {
        ZoneShape::CardinalRay { nearest } => Direction::ALL
            .into_iter()
            .flat_map(|direction| (nearest..=range).map(move |distance| (direction, distance)))
            .filter_map(|(direction, distance)| from.step(direction, distance))
            .filter(|cell| terrain.contains(*cell))
            .collect(),
        ZoneShape::Diamond => manhattan_ring(terrain, from, 0, range),
        ZoneShape::Offsets(offsets) => offsets
            .iter()
            .filter_map(|(dx, dy)| from.offset(*dx, *dy))
            .filter(|cell| terrain.contains(*cell))
            .collect(),
        ZoneShape::Annulus => manhattan_ring(terrain, from, (range / 2).max(1), range),
    }
}

fn manhattan_ring(
    terrain: &TerrainGrid,
    from: CellCoord,
    min_distance: u32,
    max_distance: u32,
) -> BTreeSet<CellCoord> {
    let radius = i64::from(max_distance);
    (-radius..=radius)
        .flat_map(|dx| (-radius..=radius).map(move |dy| (dx, dy)))
        .filter(|(dx, dy)| {
            let distance = dx.unsigned_abs() + dy.unsigned_abs();
            distance >= u64::from(min_distance) && distance <= u64::from(max_distance)
        })
        .filter_map(|(dx, dy)| from.offset(dx, dy))
        .filter(|cell| terrain.contains(*cell))
        .collect()
}
