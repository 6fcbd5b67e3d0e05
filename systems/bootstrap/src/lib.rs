#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure bootstrap system that prepares a Skirmish match.
//!
//! Supplies the built-in battlefields, the fixed starting cells of both teams
//! and the roster helpers adapters use to assemble a [`MatchSetup`].

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use skirmish_core::{
    CellCoord, LayoutError, MatchSetup, Team, TerrainGrid, UnitKind, UnitSpec, ROSTER_SIZE,
};
use skirmish_world::{query, World};
use thiserror::Error;

const LARGE_LAYOUT: &str = "
    .............T#+.
    .............T#..
    ...#T........T##.
    ####T....~...TTT.
    TTTTT....~~......
    .................
    ......TTTT.......
    ..T...T~~T......~
    ..T....~~T.....~+
    TTT...T~TT....~..
    ......T......~...
    .................
    ..##........TTTTT
    T..#........T####
    TT..........T#...
    ...#....~........
    ..+#...~~~.......
";

const SMALL_LAYOUT: &str = "
    .......T.+
    ..#..~.TT.
    ..........
    ......~...
    .T.T~T...~
    T..T~T..~.
    .......~..
    ..........
    .#......#.
    +#..~~....
";

/// Produces data required to greet the players.
#[derive(Debug, Default)]
pub struct Bootstrap;

impl Bootstrap {
    /// Derives the banner that should be shown when the match starts.
    #[must_use]
    pub fn welcome_banner<'world>(&self, world: &'world World) -> &'world str {
        query::welcome_banner(world)
    }
}

/// Built-in battlefields.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MapPreset {
    /// Seventeen by seventeen map with rivers, forests and three healing zones.
    #[default]
    Large,
    /// Ten by ten skirmish map.
    Small,
}

impl MapPreset {
    /// Every preset in declaration order.
    pub const ALL: [MapPreset; 2] = [MapPreset::Large, MapPreset::Small];

    /// Lowercase name of the preset.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            MapPreset::Large => "large",
            MapPreset::Small => "small",
        }
    }

    /// Text layout of the preset, one line per row.
    #[must_use]
    pub const fn layout(self) -> &'static str {
        match self {
            MapPreset::Large => LARGE_LAYOUT,
            MapPreset::Small => SMALL_LAYOUT,
        }
    }

    /// Parses the preset layout into a terrain grid.
    pub fn terrain(self) -> Result<TerrainGrid, LayoutError> {
        TerrainGrid::parse(self.layout())
    }
}

/// Fixed starting cells of a team on a grid of the provided edge length.
///
/// Team A gathers in the top-left corner, team B in the bottom-right one.
#[must_use]
pub fn starting_cells(team: Team, size: u32) -> [CellCoord; ROSTER_SIZE] {
    let far = size.saturating_sub(1);
    let near = size.saturating_sub(2);
    match team {
        Team::A => [
            CellCoord::new(0, 0),
            CellCoord::new(1, 0),
            CellCoord::new(0, 1),
        ],
        Team::B => [
            CellCoord::new(far, far),
            CellCoord::new(far, near),
            CellCoord::new(near, far),
        ],
    }
}

/// Errors raised while reading or drawing a roster.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RosterError {
    /// The roster lists no units.
    #[error("roster lists no units")]
    Empty,
    /// The roster lists fewer units than a team fields.
    #[error("roster lists {count} units but a team fields exactly {size}", size = ROSTER_SIZE)]
    TooFew {
        /// Number of listed units.
        count: usize,
    },
    /// The roster lists more units than a team may field.
    #[error("roster lists {count} units but a team fields exactly {size}", size = ROSTER_SIZE)]
    TooMany {
        /// Number of listed units.
        count: usize,
    },
    /// A listed name matches no unit kind.
    #[error("unknown unit {name:?}; expected one of archer, swordsman, wizard, invincible, bomber")]
    UnknownUnit {
        /// Offending name.
        name: String,
    },
    /// A unit kind is listed more than once.
    #[error("unit {kind:?} is listed more than once")]
    Duplicate {
        /// Repeated kind.
        kind: UnitKind,
    },
}

/// Errors raised while assembling a match setup.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BootstrapError {
    /// The preset layout could not be parsed.
    #[error("invalid map layout: {0}")]
    Layout(#[from] LayoutError),
    /// A roster is unusable.
    #[error("invalid roster for team {team:?}: {source}")]
    Roster {
        /// Team owning the roster.
        team: Team,
        /// Underlying roster problem.
        #[source]
        source: RosterError,
    },
}

/// Parses a comma-separated list of unit names such as `archer,wizard,bomber`.
///
/// Names are case-insensitive and surrounding whitespace is ignored. A roster
/// names exactly three distinct kinds.
pub fn parse_roster(list: &str) -> Result<Vec<UnitKind>, RosterError> {
    let kinds = list
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(parse_unit)
        .collect::<Result<Vec<_>, _>>()?;
    check_roster(&kinds)?;
    Ok(kinds)
}

fn parse_unit(name: &str) -> Result<UnitKind, RosterError> {
    UnitKind::ALL
        .into_iter()
        .find(|kind| kind.name().eq_ignore_ascii_case(name))
        .ok_or_else(|| RosterError::UnknownUnit {
            name: name.to_owned(),
        })
}

fn check_roster(kinds: &[UnitKind]) -> Result<(), RosterError> {
    if kinds.is_empty() {
        return Err(RosterError::Empty);
    }
    if kinds.len() < ROSTER_SIZE {
        return Err(RosterError::TooFew { count: kinds.len() });
    }
    if kinds.len() > ROSTER_SIZE {
        return Err(RosterError::TooMany { count: kinds.len() });
    }
    for (index, kind) in kinds.iter().enumerate() {
        if kinds[..index].contains(kind) {
            return Err(RosterError::Duplicate { kind: *kind });
        }
    }
    Ok(())
}

/// Draws a full roster of distinct kinds uniformly from every unit kind.
pub fn random_roster<R: Rng>(rng: &mut R) -> Vec<UnitKind> {
    UnitKind::ALL
        .choose_multiple(rng, ROSTER_SIZE)
        .copied()
        .collect()
}

/// Draws the rosters of both teams from a single seed, team A first.
#[must_use]
pub fn seeded_rosters(seed: u64) -> (Vec<UnitKind>, Vec<UnitKind>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let team_a = random_roster(&mut rng);
    let team_b = random_roster(&mut rng);
    (team_a, team_b)
}

/// Places both rosters on their starting cells of the preset map.
pub fn match_setup(
    preset: MapPreset,
    team_a: &[UnitKind],
    team_b: &[UnitKind],
) -> Result<MatchSetup, BootstrapError> {
    let terrain = preset.terrain()?;
    let size = terrain.size();
    let team_a = place_roster(Team::A, team_a, size)?;
    let team_b = place_roster(Team::B, team_b, size)?;
    Ok(MatchSetup::new(terrain, team_a, team_b))
}

fn place_roster(
    team: Team,
    kinds: &[UnitKind],
    size: u32,
) -> Result<Vec<UnitSpec>, BootstrapError> {
    check_roster(kinds).map_err(|source| BootstrapError::Roster { team, source })?;
    Ok(kinds
        .iter()
        .zip(starting_cells(team, size))
        .map(|(kind, cell)| UnitSpec::new(*kind, cell))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::TerrainKind;

    #[test]
    fn presets_parse_into_square_grids() {
        assert_eq!(MapPreset::Large.terrain().map(|grid| grid.size()), Ok(17));
        assert_eq!(MapPreset::Small.terrain().map(|grid| grid.size()), Ok(10));
    }

    #[test]
    fn large_preset_keeps_its_healing_corners() {
        let terrain = MapPreset::Large.terrain().expect("layout parses");
        for cell in [
            CellCoord::new(15, 0),
            CellCoord::new(16, 8),
            CellCoord::new(2, 16),
        ] {
            assert_eq!(terrain.terrain_at(cell), Ok(TerrainKind::HealingZone));
        }
    }

    #[test]
    fn starting_cells_mirror_across_the_grid() {
        assert_eq!(
            starting_cells(Team::B, 17),
            [
                CellCoord::new(16, 16),
                CellCoord::new(16, 15),
                CellCoord::new(15, 16),
            ]
        );
        assert_eq!(starting_cells(Team::A, 10)[2], CellCoord::new(0, 1));
    }

    #[test]
    fn parse_roster_accepts_mixed_case_and_spaces() {
        assert_eq!(
            parse_roster(" Archer, wizard ,BOMBER"),
            Ok(vec![UnitKind::Archer, UnitKind::Wizard, UnitKind::Bomber])
        );
    }

    #[test]
    fn parse_roster_reports_problems() {
        assert_eq!(
            parse_roster("archer,knight"),
            Err(RosterError::UnknownUnit {
                name: "knight".to_owned(),
            })
        );
        assert_eq!(parse_roster(" , "), Err(RosterError::Empty));
        assert_eq!(
            parse_roster("wizard"),
            Err(RosterError::TooFew { count: 1 })
        );
        assert_eq!(
            parse_roster("archer,wizard,bomber,swordsman"),
            Err(RosterError::TooMany { count: 4 })
        );
    }

    #[test]
    fn parse_roster_rejects_repeated_kinds() {
        assert_eq!(
            parse_roster("archer,Archer,archer"),
            Err(RosterError::Duplicate {
                kind: UnitKind::Archer,
            })
        );
        assert_eq!(
            parse_roster("wizard,bomber,wizard"),
            Err(RosterError::Duplicate {
                kind: UnitKind::Wizard,
            })
        );
    }

    #[test]
    fn seeded_rosters_are_reproducible() {
        let first = seeded_rosters(0x5eed);
        let second = seeded_rosters(0x5eed);

        assert_eq!(first, second);
        assert_eq!(first.0.len(), ROSTER_SIZE);
        assert_eq!(first.1.len(), ROSTER_SIZE);
    }

    #[test]
    fn random_rosters_never_repeat_a_kind() {
        for seed in 0..100 {
            let (team_a, team_b) = seeded_rosters(seed);
            assert_eq!(check_roster(&team_a), Ok(()), "seed {seed}");
            assert_eq!(check_roster(&team_b), Ok(()), "seed {seed}");
        }
    }

    #[test]
    fn match_setup_places_units_in_roster_order() {
        let setup = match_setup(
            MapPreset::Small,
            &[UnitKind::Swordsman, UnitKind::Archer, UnitKind::Wizard],
            &[UnitKind::Bomber, UnitKind::Invincible, UnitKind::Archer],
        )
        .expect("valid setup");

        let team_a: Vec<_> = setup.roster(Team::A).iter().map(|spec| spec.cell).collect();
        assert_eq!(
            team_a,
            vec![
                CellCoord::new(0, 0),
                CellCoord::new(1, 0),
                CellCoord::new(0, 1),
            ]
        );
        assert_eq!(setup.roster(Team::B)[0].cell, CellCoord::new(9, 9));
        assert_eq!(setup.roster(Team::B)[0].kind, UnitKind::Bomber);
    }

    #[test]
    fn match_setup_rejects_empty_rosters() {
        assert_eq!(
            match_setup(
                MapPreset::Large,
                &[UnitKind::Archer, UnitKind::Wizard, UnitKind::Bomber],
                &[],
            ),
            Err(BootstrapError::Roster {
                team: Team::B,
                source: RosterError::Empty,
            })
        );
    }

    #[test]
    fn match_setup_rejects_short_rosters() {
        assert_eq!(
            match_setup(
                MapPreset::Small,
                &[UnitKind::Archer],
                &[UnitKind::Wizard, UnitKind::Bomber, UnitKind::Archer],
            ),
            Err(BootstrapError::Roster {
                team: Team::A,
                source: RosterError::TooFew { count: 1 },
            })
        );
    }

    #[test]
    fn every_preset_accepts_every_kind_in_every_slot() {
        for preset in MapPreset::ALL {
            for rotation in 0..UnitKind::ALL.len() {
                let mut kinds = UnitKind::ALL;
                kinds.rotate_left(rotation);
                let roster = &kinds[..ROSTER_SIZE];
                let setup = match_setup(preset, roster, roster).expect("valid setup");
                let world = World::new(setup).expect("world accepts preset");

                assert_eq!(
                    Bootstrap.welcome_banner(&world),
                    skirmish_core::WELCOME_BANNER
                );
            }
        }
    }
}
