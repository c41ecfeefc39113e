//! Keyboard shortcut representation and its text form ("Ctrl+Shift+N").

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from parsing shortcut text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShortcutParseError {
    #[error("empty shortcut")]
    Empty,

    #[error("shortcut '{0}' has modifiers but no key")]
    MissingKey(String),

    #[error("shortcut '{shortcut}': unknown key '{key}'")]
    UnknownKey { shortcut: String, key: String },

    #[error("shortcut '{shortcut}': '{part}' is not a modifier")]
    UnexpectedPart { shortcut: String, part: String },
}

/// The non-modifier part of a shortcut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
    /// A printable character, stored uppercase for letters.
    Char(char),
    /// Function key F1..=F12.
    F(u8),
    Enter,
    Escape,
    Tab,
    Backspace,
    Delete,
    Insert,
    Home,
    End,
    PageUp,
    PageDown,
    Up,
    Down,
    Left,
    Right,
    Space,
}

impl Key {
    fn parse(part: &str) -> Option<Self> {
        let lower = part.to_ascii_lowercase();
        let key = match lower.as_str() {
            "enter" | "return" => Self::Enter,
            "esc" | "escape" => Self::Escape,
            "tab" => Self::Tab,
            "backspace" => Self::Backspace,
            "del" | "delete" => Self::Delete,
            "ins" | "insert" => Self::Insert,
            "home" => Self::Home,
            "end" => Self::End,
            "pgup" | "pageup" => Self::PageUp,
            "pgdn" | "pgdown" | "pagedown" => Self::PageDown,
            "up" => Self::Up,
            "down" => Self::Down,
            "left" => Self::Left,
            "right" => Self::Right,
            "space" => Self::Space,
            _ => {
                if let Some(n) = lower.strip_prefix('f')
                    && let Ok(n) = n.parse::<u8>()
                {
                    return (1..=12).contains(&n).then_some(Self::F(n));
                }
                let mut chars = part.chars();
                let c = chars.next()?;
                if chars.next().is_some() || c.is_whitespace() || c.is_control() {
                    return None;
                }
                Self::Char(c.to_ascii_uppercase())
            }
        };
        Some(key)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Char(c) => write!(f, "{c}"),
            Self::F(n) => write!(f, "F{n}"),
            Self::Enter => f.write_str("Enter"),
            Self::Escape => f.write_str("Esc"),
            Self::Tab => f.write_str("Tab"),
            Self::Backspace => f.write_str("Backspace"),
            Self::Delete => f.write_str("Delete"),
            Self::Insert => f.write_str("Insert"),
            Self::Home => f.write_str("Home"),
            Self::End => f.write_str("End"),
            Self::PageUp => f.write_str("PageUp"),
            Self::PageDown => f.write_str("PageDown"),
            Self::Up => f.write_str("Up"),
            Self::Down => f.write_str("Down"),
            Self::Left => f.write_str("Left"),
            Self::Right => f.write_str("Right"),
            Self::Space => f.write_str("Space"),
        }
    }
}

/// A key plus modifiers. Text form is `Ctrl+Alt+Shift+Key` in that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Shortcut {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub key: Key,
}

impl Shortcut {
    pub fn new(key: Key) -> Self {
        Self {
            ctrl: false,
            alt: false,
            shift: false,
            key,
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn alt(mut self) -> Self {
        self.alt = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }
}

impl FromStr for Shortcut {
    type Err = ShortcutParseError;

    /// Case-insensitive; "Cmd" is accepted as Ctrl.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if text.is_empty() {
            return Err(ShortcutParseError::Empty);
        }

        // The key is whatever follows the last separator; "Ctrl++" and a
        // bare "+" name the plus key itself.
        let (modifiers, key_part) = if text == "+" {
            ("", "+")
        } else if let Some(modifiers) = text.strip_suffix("++") {
            (modifiers, "+")
        } else {
            match text.rsplit_once('+') {
                Some((modifiers, key)) => (modifiers, key.trim()),
                None => ("", text),
            }
        };

        let mut shortcut = Shortcut::new(Key::Space);
        let parts = (!modifiers.is_empty()).then(|| modifiers.split('+'));
        for part in parts.into_iter().flatten().map(str::trim) {
            match part.to_ascii_lowercase().as_str() {
                "ctrl" | "control" | "cmd" => shortcut.ctrl = true,
                "alt" | "option" => shortcut.alt = true,
                "shift" => shortcut.shift = true,
                _ => {
                    return Err(ShortcutParseError::UnexpectedPart {
                        shortcut: text.to_string(),
                        part: part.to_string(),
                    });
                }
            }
        }

        if key_part.is_empty() {
            return Err(ShortcutParseError::MissingKey(text.to_string()));
        }
        shortcut.key = Key::parse(key_part).ok_or_else(|| ShortcutParseError::UnknownKey {
            shortcut: text.to_string(),
            key: key_part.to_string(),
        })?;
        Ok(shortcut)
    }
}

impl fmt::Display for Shortcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl {
            f.write_str("Ctrl+")?;
        }
        if self.alt {
            f.write_str("Alt+")?;
        }
        if self.shift {
            f.write_str("Shift+")?;
        }
        write!(f, "{}", self.key)
    }
}

impl TryFrom<String> for Shortcut {
    type Error = ShortcutParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Shortcut> for String {
    fn from(value: Shortcut) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn parse_normalizes_case_and_order() {
        let shortcut: Shortcut = "shift+ctrl+n".parse().unwrap();
        assert_eq!(shortcut, Shortcut::new(Key::Char('N')).ctrl().shift());
        assert_eq!(shortcut.to_string(), "Ctrl+Shift+N");
    }

    #[test]
    fn parse_special_keys() {
        assert_eq!("F11".parse::<Shortcut>().unwrap().key, Key::F(11));
        assert_eq!("Shift+F3".parse::<Shortcut>().unwrap().to_string(), "Shift+F3");
        assert_eq!("escape".parse::<Shortcut>().unwrap().to_string(), "Esc");
        assert_eq!("Ctrl+Space".parse::<Shortcut>().unwrap().key, Key::Space);
        assert_eq!("Cmd+,".parse::<Shortcut>().unwrap().to_string(), "Ctrl+,");
        assert_eq!("Ctrl+-".parse::<Shortcut>().unwrap().key, Key::Char('-'));
    }

    #[test]
    fn plus_key_survives_text_round_trip() {
        let zoom_in = Shortcut::new(Key::Char('+')).ctrl();
        assert_eq!(zoom_in.to_string(), "Ctrl++");
        assert_eq!("Ctrl++".parse::<Shortcut>().unwrap(), zoom_in);
        assert_eq!("ctrl++".parse::<Shortcut>().unwrap(), zoom_in);
        assert_eq!("+".parse::<Shortcut>().unwrap().key, Key::Char('+'));
        assert_eq!(
            "Ctrl+Shift++".parse::<Shortcut>().unwrap().to_string(),
            "Ctrl+Shift++"
        );
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!("".parse::<Shortcut>().unwrap_err(), ShortcutParseError::Empty);
        assert!(matches!(
            "Ctrl+".parse::<Shortcut>().unwrap_err(),
            ShortcutParseError::MissingKey(_)
        ));
        assert!(matches!(
            "Ctrl+F13".parse::<Shortcut>().unwrap_err(),
            ShortcutParseError::UnknownKey { .. }
        ));
        assert!(matches!(
            "Hyper+K".parse::<Shortcut>().unwrap_err(),
            ShortcutParseError::UnexpectedPart { .. }
        ));
    }

    #[test]
    fn serde_uses_text_form() {
        let shortcut: Shortcut = "Ctrl+Alt+M".parse().unwrap();
        let json = serde_json::to_string(&shortcut).unwrap();
        assert_eq!(json, "\"Ctrl+Alt+M\"");
        let back: Shortcut = serde_json::from_str("\"ctrl+alt+m\"").unwrap();
        assert_eq!(back, shortcut);
    }
}
