//! Controller kinds and grid coordinates.
//!
//! A placed action lives either on a discrete key ([`Controller::Keypad`]) or
//! on a rotary dial with an adjacent touch strip ([`Controller::Encoder`]).
//! The host reports the kind in the `willAppear` payload; the runtime keeps
//! it per context so that overloaded event names can be decoded correctly.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The hardware surface an action instance is placed on.
///
/// Serialised with the host's spelling: `"Keypad"` or `"Encoder"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Controller {
    /// A discrete, button-like key.
    #[default]
    Keypad,
    /// A rotary dial with a touch-strip segment.
    Encoder,
}

impl Controller {
    /// Returns the wire spelling of this controller kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Controller::Keypad => "Keypad",
            Controller::Encoder => "Encoder",
        }
    }
}

impl fmt::Display for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position of a control on a device grid.
///
/// Absent for controls that are not placed on a grid (for example actions
/// nested inside a multi-action).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Coordinates {
    /// Zero-based column, counted from the left.
    pub column: u32,
    /// Zero-based row, counted from the top.
    pub row: u32,
}

impl Coordinates {
    pub fn new(row: u32, column: u32) -> Self {
        Self { column, row }
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_controller_defaults_to_keypad() {
        assert_eq!(Controller::default(), Controller::Keypad);
    }

    #[test]
    fn test_controller_uses_host_spelling_on_the_wire() {
        // Arrange / Act
        let json = serde_json::to_string(&Controller::Encoder).unwrap();

        // Assert
        assert_eq!(json, "\"Encoder\"");
        let parsed: Controller = serde_json::from_str("\"Keypad\"").unwrap();
        assert_eq!(parsed, Controller::Keypad);
    }

    #[test]
    fn test_coordinates_display_is_row_then_column() {
        let c = Coordinates::new(2, 4);
        assert_eq!(c.to_string(), "(2, 4)");
    }

    #[test]
    fn test_coordinates_deserialize_from_host_object() {
        let c: Coordinates = serde_json::from_str(r#"{"row":0,"column":1}"#).unwrap();
        assert_eq!(c, Coordinates { column: 1, row: 0 });
    }
}
