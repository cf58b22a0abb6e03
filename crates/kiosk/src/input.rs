//! Keyboard input for the terminal kiosk.
//!
//! The binary reads stdin line by line; each line maps to at most one
//! [`KeyAction`].

use poster_core::rotation::Direction;

/// What a line of input asks the kiosk to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Navigate(Direction),
    /// Zero-based poster index.
    Jump(usize),
    Refresh,
    Quit,
}

const LEFT_ARROW: &str = "\u{1b}[D";
const RIGHT_ARROW: &str = "\u{1b}[C";

/// Parse one input line. Unrecognised input yields `None`.
///
/// Numbers are 1-based as shown in the position label.
pub fn parse_key(line: &str) -> Option<KeyAction> {
    let raw = line.trim_end_matches(['\r', '\n']);
    if raw == LEFT_ARROW {
        return Some(KeyAction::Navigate(Direction::Previous));
    }
    if raw == RIGHT_ARROW {
        return Some(KeyAction::Navigate(Direction::Next));
    }

    let key = raw.trim().to_ascii_lowercase();
    match key.as_str() {
        "h" | "a" | "p" | "left" | "prev" => Some(KeyAction::Navigate(Direction::Previous)),
        "l" | "d" | "n" | "right" | "next" => Some(KeyAction::Navigate(Direction::Next)),
        "r" | "refresh" => Some(KeyAction::Refresh),
        "q" | "quit" | "exit" => Some(KeyAction::Quit),
        other => match other.parse::<usize>() {
            Ok(position) if position >= 1 => Some(KeyAction::Jump(position - 1)),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrows_and_letters_navigate() {
        assert_eq!(
            parse_key("\u{1b}[D\n"),
            Some(KeyAction::Navigate(Direction::Previous))
        );
        assert_eq!(parse_key("\u{1b}[C"), Some(KeyAction::Navigate(Direction::Next)));
        assert_eq!(parse_key("H"), Some(KeyAction::Navigate(Direction::Previous)));
        assert_eq!(parse_key(" right "), Some(KeyAction::Navigate(Direction::Next)));
    }

    #[test]
    fn numbers_jump_one_based() {
        assert_eq!(parse_key("1"), Some(KeyAction::Jump(0)));
        assert_eq!(parse_key("12"), Some(KeyAction::Jump(11)));
        assert_eq!(parse_key("0"), None);
        assert_eq!(parse_key("-3"), None);
    }

    #[test]
    fn control_keys() {
        assert_eq!(parse_key("r"), Some(KeyAction::Refresh));
        assert_eq!(parse_key("q\r\n"), Some(KeyAction::Quit));
        assert_eq!(parse_key(""), None);
        assert_eq!(parse_key("xyz"), None);
    }
}
