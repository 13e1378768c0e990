//! Fixed keyboard contract.
//!
//! | Key                    | Effect                                  |
//! |------------------------|-----------------------------------------|
//! | ArrowUp / ArrowLeft    | press `Left`, move to previous if powered |
//! | ArrowDown / ArrowRight | press `Right`, move to next if powered  |
//! | Enter / Space          | press `Play`, play current if powered   |
//! | `c` / `C`              | insert a coin                           |
//! | `p` / `P`              | toggle cabinet power                    |

use crate::selection::Direction;

/// Frontend-neutral key identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Enter,
    Space,
    Char(char),
}

/// Arcade cabinet controls that show a press pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    Left,
    Right,
    Play,
}

/// Engine operation a key maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Move the shared selection; only while powered.
    Move(Direction),
    /// Play the selected item; only while powered.
    Play,
    AddCoin,
    TogglePower,
}

/// Result of routing a key through the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    /// Control to pulse before acting.
    pub press: Option<Control>,
    pub action: Action,
    /// The frontend must not run its own handling for this key.
    pub suppress_default: bool,
}

/// Map a key to its contract entry. Unlisted keys return `None`.
pub fn route(key: Key) -> Option<Route> {
    let route = match key {
        Key::ArrowUp | Key::ArrowLeft => Route {
            press: Some(Control::Left),
            action: Action::Move(Direction::Prev),
            suppress_default: true,
        },
        Key::ArrowDown | Key::ArrowRight => Route {
            press: Some(Control::Right),
            action: Action::Move(Direction::Next),
            suppress_default: true,
        },
        Key::Enter | Key::Space | Key::Char(' ') => Route {
            press: Some(Control::Play),
            action: Action::Play,
            suppress_default: true,
        },
        Key::Char('c') | Key::Char('C') => Route {
            press: None,
            action: Action::AddCoin,
            suppress_default: false,
        },
        Key::Char('p') | Key::Char('P') => Route {
            press: None,
            action: Action::TogglePower,
            suppress_default: false,
        },
        Key::Char(_) => return None,
    };
    Some(route)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrows_pair_up() {
        assert_eq!(route(Key::ArrowUp), route(Key::ArrowLeft));
        assert_eq!(route(Key::ArrowDown), route(Key::ArrowRight));
        let prev = route(Key::ArrowLeft).expect("routed");
        assert_eq!(prev.action, Action::Move(Direction::Prev));
        assert_eq!(prev.press, Some(Control::Left));
        assert!(prev.suppress_default);
    }

    #[test]
    fn space_and_enter_play() {
        for key in [Key::Enter, Key::Space, Key::Char(' ')] {
            let routed = route(key).expect("routed");
            assert_eq!(routed.action, Action::Play);
            assert_eq!(routed.press, Some(Control::Play));
        }
    }

    #[test]
    fn coin_and_power_are_case_insensitive_and_not_suppressed() {
        assert_eq!(route(Key::Char('c')), route(Key::Char('C')));
        assert_eq!(route(Key::Char('p')), route(Key::Char('P')));
        let coin = route(Key::Char('c')).expect("routed");
        assert_eq!(coin.action, Action::AddCoin);
        assert!(coin.press.is_none());
        assert!(!coin.suppress_default);
    }

    #[test]
    fn other_keys_are_ignored() {
        assert!(route(Key::Char('x')).is_none());
        assert!(route(Key::Char('1')).is_none());
    }
}
