//! Unit kinds, their stat tables and read-only unit snapshots.

use serde::{Deserialize, Serialize};

use crate::{CellCoord, Team, UnitId};

/// Number of units each team fields in a standard match.
pub const ROSTER_SIZE: usize = 3;

/// Closed set of unit variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnitKind {
    /// Leaping ranged unit with a cardinal ray that skips the adjacent cell.
    Archer,
    /// Single-step melee unit with a short cardinal ray.
    Swordsman,
    /// Amphibious caster with a diamond-shaped zone and a healing spell.
    Wizard,
    /// Leaping heavy unit with a fixed ring-shaped zone.
    Invincible,
    /// Single-step unit whose bombs only land on distant cells.
    Bomber,
}

impl UnitKind {
    /// Every unit kind in declaration order.
    pub const ALL: [UnitKind; 5] = [
        UnitKind::Archer,
        UnitKind::Swordsman,
        UnitKind::Wizard,
        UnitKind::Invincible,
        UnitKind::Bomber,
    ];

    /// Lowercase name of the kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            UnitKind::Archer => "archer",
            UnitKind::Swordsman => "swordsman",
            UnitKind::Wizard => "wizard",
            UnitKind::Invincible => "invincible",
            UnitKind::Bomber => "bomber",
        }
    }

    /// Reports whether the kind may cross water.
    #[must_use]
    pub const fn is_amphibious(self) -> bool {
        matches!(self, UnitKind::Wizard)
    }

    /// Reports whether the kind knows the healing spell.
    #[must_use]
    pub const fn can_heal(self) -> bool {
        matches!(self, UnitKind::Wizard)
    }

    /// Stat line every unit of this kind starts a match with.
    #[must_use]
    pub const fn base_stats(self) -> UnitStats {
        match self {
            UnitKind::Archer => UnitStats::new(
                15,
                1,
                3,
                [
                    AttackProfile::new("Arrow Shot", 2, 3),
                    AttackProfile::new("Power Arrow", 4, 2),
                ],
            ),
            UnitKind::Swordsman => UnitStats::new(
                10,
                2,
                3,
                [
                    AttackProfile::new("Sword Slash", 3, 1),
                    AttackProfile::new("Heavy Strike", 6, 1),
                ],
            ),
            UnitKind::Wizard => UnitStats::new(
                12,
                2,
                3,
                [
                    AttackProfile::new("Gladio", 4, 2),
                    AttackProfile::new("Incendio", 8, 2),
                ],
            ),
            UnitKind::Invincible => UnitStats::new(
                40,
                3,
                3,
                [
                    AttackProfile::new("Big Slash", 4, 1),
                    AttackProfile::new("Two Blades Style", 6, 2),
                ],
            ),
            UnitKind::Bomber => UnitStats::new(
                15,
                2,
                3,
                [
                    AttackProfile::new("Aqua Bomb", 5, 3),
                    AttackProfile::new("Lava Bomb", 7, 6),
                ],
            ),
        }
    }
}

/// Index of one of the two attack profiles every unit carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AttackSlot {
    /// Attack index 0.
    Normal,
    /// Attack index 1.
    Special,
}

impl AttackSlot {
    /// Both slots in index order.
    pub const ALL: [AttackSlot; 2] = [AttackSlot::Normal, AttackSlot::Special];

    /// Numeric attack index of the slot.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            AttackSlot::Normal => 0,
            AttackSlot::Special => 1,
        }
    }
}

/// Named power and range pair of a single attack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AttackProfile {
    name: &'static str,
    power: u32,
    range: u32,
}

impl AttackProfile {
    /// Creates a new attack profile.
    #[must_use]
    pub const fn new(name: &'static str, power: u32, range: u32) -> Self {
        Self { name, power, range }
    }

    /// Display name of the attack.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Damage dealt to the struck unit.
    #[must_use]
    pub const fn power(&self) -> u32 {
        self.power
    }

    /// Range parameter fed into the zone geometry of the unit kind.
    #[must_use]
    pub const fn range(&self) -> u32 {
        self.range
    }
}

/// Mutable stat line of a unit at match start.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UnitStats {
    /// Upper bound for health.
    pub max_health: i32,
    /// Health at match start.
    pub health: i32,
    /// Defense rating, displayed but not applied to damage.
    pub defense: i32,
    /// Movement requests granted at the start of every turn.
    pub movement: u32,
    /// Normal and special attack profiles.
    pub attacks: [AttackProfile; 2],
}

impl UnitStats {
    /// Creates a stat line starting at full health.
    #[must_use]
    pub const fn new(
        max_health: i32,
        defense: i32,
        movement: u32,
        attacks: [AttackProfile; 2],
    ) -> Self {
        Self {
            max_health,
            health: max_health,
            defense,
            movement,
            attacks,
        }
    }

    /// Attack profile stored in the provided slot.
    #[must_use]
    pub const fn attack(&self, slot: AttackSlot) -> AttackProfile {
        self.attacks[slot.index()]
    }
}

/// Description of a unit to place on the grid at match start.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UnitSpec {
    /// Variant of the unit.
    pub kind: UnitKind,
    /// Starting cell of the unit.
    pub cell: CellCoord,
    /// Stat line of the unit.
    pub stats: UnitStats,
}

impl UnitSpec {
    /// Describes a unit of the given kind with its base stats.
    #[must_use]
    pub const fn new(kind: UnitKind, cell: CellCoord) -> Self {
        Self {
            kind,
            cell,
            stats: kind.base_stats(),
        }
    }

    /// Overrides the starting health, clamped to `1..=max_health`.
    #[must_use]
    pub fn with_health(mut self, health: i32) -> Self {
        self.stats.health = health.clamp(1, self.stats.max_health);
        self
    }

    /// Overrides the number of movement requests granted per turn.
    #[must_use]
    pub fn with_movement(mut self, movement: u32) -> Self {
        self.stats.movement = movement;
        self
    }
}

/// Immutable representation of a single unit's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnitSnapshot {
    /// Unique identifier assigned to the unit.
    pub id: UnitId,
    /// Team owning the unit.
    pub team: Team,
    /// Variant of the unit.
    pub kind: UnitKind,
    /// Grid cell currently occupied by the unit.
    pub cell: CellCoord,
    /// Current health.
    pub health: i32,
    /// Upper bound for health.
    pub max_health: i32,
    /// Defense rating.
    pub defense: i32,
    /// Movement requests granted at the start of every turn.
    pub movement_speed: u32,
    /// Movement requests left in the current move phase.
    pub movement_budget: u32,
    /// Normal and special attack profiles.
    pub attacks: [AttackProfile; 2],
    /// Indicates whether the unit is the active unit.
    pub selected: bool,
}

impl UnitSnapshot {
    /// Attack profile stored in the provided slot.
    #[must_use]
    pub const fn attack(&self, slot: AttackSlot) -> AttackProfile {
        self.attacks[slot.index()]
    }

    /// Reports whether the unit lost any health.
    #[must_use]
    pub const fn is_wounded(&self) -> bool {
        self.health < self.max_health
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_starts_at_full_health() {
        for kind in UnitKind::ALL {
            let stats = kind.base_stats();
            assert_eq!(stats.health, stats.max_health);
            assert!(stats.movement > 0);
        }
    }

    #[test]
    fn stat_table_matches_roster_menu() {
        let table = [
            (UnitKind::Archer, 15, 1, 3, ("Arrow Shot", 2, 3), ("Power Arrow", 4, 2)),
            (UnitKind::Swordsman, 10, 2, 3, ("Sword Slash", 3, 1), ("Heavy Strike", 6, 1)),
            (UnitKind::Wizard, 12, 2, 3, ("Gladio", 4, 2), ("Incendio", 8, 2)),
            (UnitKind::Invincible, 40, 3, 3, ("Big Slash", 4, 1), ("Two Blades Style", 6, 2)),
            (UnitKind::Bomber, 15, 2, 3, ("Aqua Bomb", 5, 3), ("Lava Bomb", 7, 6)),
        ];

        for (kind, max_health, defense, movement, normal, special) in table {
            let stats = kind.base_stats();
            assert_eq!(stats.max_health, max_health, "{kind:?} health");
            assert_eq!(stats.defense, defense, "{kind:?} defense");
            assert_eq!(stats.movement, movement, "{kind:?} movement");
            for (slot, (name, power, range)) in AttackSlot::ALL.into_iter().zip([normal, special]) {
                let attack = stats.attack(slot);
                assert_eq!(attack.name(), name);
                assert_eq!(attack.power(), power, "{kind:?} {slot:?} power");
                assert_eq!(attack.range(), range, "{kind:?} {slot:?} range");
            }
        }
    }

    #[test]
    fn special_slot_selects_second_profile() {
        let stats = UnitKind::Archer.base_stats();
        assert_eq!(stats.attack(AttackSlot::Normal).name(), "Arrow Shot");
        assert_eq!(stats.attack(AttackSlot::Special).power(), 4);
        assert_eq!(stats.attack(AttackSlot::Special).range(), 2);
    }

    #[test]
    fn spec_overrides_clamp_health() {
        let spec = UnitSpec::new(UnitKind::Swordsman, CellCoord::new(0, 0))
            .with_health(25)
            .with_movement(1);
        assert_eq!(spec.stats.health, 10);
        assert_eq!(spec.stats.movement, 1);

        let wounded = spec.with_health(-4);
        assert_eq!(wounded.stats.health, 1);
    }

    #[test]
    fn only_wizards_cross_water_and_heal() {
        for kind in UnitKind::ALL {
            assert_eq!(kind.is_amphibious(), kind == UnitKind::Wizard);
            assert_eq!(kind.can_heal(), kind == UnitKind::Wizard);
        }
    }
}
