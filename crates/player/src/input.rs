//! Commands read from stdin.

use loopstage_core::Choice;

/// One line of user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Choose(Choice),
    Tap,
    Metrics,
    Quit,
}

impl Command {
    /// Parse a trimmed input line. Empty lines are not commands.
    pub fn parse(line: &str) -> Result<Option<Command>, String> {
        let command = match line.trim().to_ascii_lowercase().as_str() {
            "" => return Ok(None),
            "a" => Command::Choose(Choice::A),
            "b" => Command::Choose(Choice::B),
            "t" | "tap" => Command::Tap,
            "m" | "metrics" => Command::Metrics,
            "q" | "quit" | "exit" => Command::Quit,
            other => return Err(format!("unknown command: {}", other)),
        };
        Ok(Some(command))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Choose(Choice::A) => "choice_a",
            Command::Choose(Choice::B) => "choice_b",
            Command::Tap => "tap",
            Command::Metrics => "metrics",
            Command::Quit => "quit",
        }
    }
}

pub const HELP: &str = "commands: a | b (choose), t (tap), m (metrics), q (quit)";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("a"), Ok(Some(Command::Choose(Choice::A))));
        assert_eq!(Command::parse(" B \n"), Ok(Some(Command::Choose(Choice::B))));
        assert_eq!(Command::parse("tap"), Ok(Some(Command::Tap)));
        assert_eq!(Command::parse("q"), Ok(Some(Command::Quit)));
        assert_eq!(Command::parse("metrics"), Ok(Some(Command::Metrics)));
    }

    #[test]
    fn test_parse_empty_and_unknown() {
        assert_eq!(Command::parse("   "), Ok(None));
        assert!(Command::parse("jump").unwrap_err().contains("jump"));
    }
}
