//! Maps typed player input onto engine commands.

use skirmish_core::{AttackSlot, Command, Direction};

/// Reminder printed whenever the player types something unrecognised.
pub(crate) const HELP: &str = "\
moves: up/u, down/d, left, right/r (also north/east/south/west)
actions: enter or v to validate, 1 normal attack, 2 special attack, l heal, s skip, e or q to quit";

/// Interprets a single line of player input.
///
/// An empty line validates the current position.
pub(crate) fn parse_input(line: &str) -> Option<Command> {
    let token = line.trim().to_ascii_lowercase();
    let command = match token.as_str() {
        "u" | "up" | "north" => Command::MoveActive {
            direction: Direction::North,
        },
        "d" | "down" | "south" => Command::MoveActive {
            direction: Direction::South,
        },
        "left" | "west" => Command::MoveActive {
            direction: Direction::West,
        },
        "r" | "right" | "east" => Command::MoveActive {
            direction: Direction::East,
        },
        "" | "v" | "validate" | "space" => Command::ValidatePosition,
        "1" => Command::SelectAttack {
            slot: AttackSlot::Normal,
        },
        "2" => Command::SelectAttack {
            slot: AttackSlot::Special,
        },
        "l" | "heal" => Command::Heal,
        "s" | "skip" => Command::SkipTurn,
        "e" | "q" | "quit" | "exit" => Command::Quit,
        _ => return None,
    };
    Some(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directions_accept_words_and_letters() {
        assert_eq!(
            parse_input("up"),
            Some(Command::MoveActive {
                direction: Direction::North,
            })
        );
        assert_eq!(
            parse_input(" R "),
            Some(Command::MoveActive {
                direction: Direction::East,
            })
        );
        assert_eq!(
            parse_input("West"),
            Some(Command::MoveActive {
                direction: Direction::West,
            })
        );
    }

    #[test]
    fn empty_line_validates() {
        assert_eq!(parse_input("\n"), Some(Command::ValidatePosition));
        assert_eq!(parse_input("v"), Some(Command::ValidatePosition));
    }

    #[test]
    fn action_keys_map_to_attack_phase_commands() {
        assert_eq!(
            parse_input("2"),
            Some(Command::SelectAttack {
                slot: AttackSlot::Special,
            })
        );
        assert_eq!(parse_input("l"), Some(Command::Heal));
        assert_eq!(parse_input("s"), Some(Command::SkipTurn));
        assert_eq!(parse_input("e"), Some(Command::Quit));
    }

    #[test]
    fn unknown_input_is_rejected() {
        assert_eq!(parse_input("jump"), None);
        assert_eq!(parse_input("3"), None);
    }
}
