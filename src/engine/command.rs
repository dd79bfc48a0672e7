//! Commands a human can type during the game.

use crate::game::core::Square;

/// A line of human input.
#[derive(Debug, PartialEq, Eq)]
pub(super) enum Command {
    Play(Square),
    Board,
    Help,
    Quit,
    Unknown(String),
}

impl Command {
    pub(super) fn parse(input: &str) -> Self {
        let input = input.trim();
        match input {
            "board" => Self::Board,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            _ => Square::try_from(input).map_or_else(|_| Self::Unknown(input.to_string()), Self::Play),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_square() {
        assert_eq!(
            Command::parse("1111\n"),
            Command::Play(Square::try_from(40).unwrap())
        );
        assert_eq!(
            Command::parse("  0000 "),
            Command::Play(Square::try_from(0).unwrap())
        );
    }

    #[test]
    fn parse_keywords() {
        assert_eq!(Command::parse("board"), Command::Board);
        assert_eq!(Command::parse("help"), Command::Help);
        assert_eq!(Command::parse("?"), Command::Help);
        assert_eq!(Command::parse("quit\n"), Command::Quit);
        assert_eq!(Command::parse("exit"), Command::Quit);
    }

    #[test]
    fn unknown() {
        assert_eq!(Command::parse(""), Command::Unknown(String::new()));
        assert_eq!(Command::parse("3000"), Command::Unknown("3000".to_string()));
        assert_eq!(Command::parse("111"), Command::Unknown("111".to_string()));
        assert_eq!(
            Command::parse("unknown command"),
            Command::Unknown("unknown command".to_string())
        );
    }
}
