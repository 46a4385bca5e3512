//! Aktionen, die ein Agent auf dem Gerät ausführen kann.
//!
//! [`Action`] ist eine geschlossene Menge von Varianten mit jeweils eigener
//! Nutzlast. [`RawAction`] bildet das lose Format `{action_type, pos?,
//! direction?, end?}` ab, in dem Agents üblicherweise Aktionen liefern; die
//! Umwandlung prüft, ob die für den Typ nötigen Felder vorhanden sind.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pixel-Koordinate auf dem Bildschirm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// Zelle eines m×n-Rasters über dem Bildschirm (Zeile, Spalte).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Cell {
    pub row: u32,
    pub col: u32,
}

impl Cell {
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

/// Wischrichtung. Die Codes 0..=3 folgen der Reihenfolge oben, unten, links, rechts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn code(self) -> u8 {
        match self {
            Direction::Up => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Right => 3,
        }
    }

    pub fn from_code(code: u8) -> Result<Self, ActionError> {
        match code {
            0 => Ok(Direction::Up),
            1 => Ok(Direction::Down),
            2 => Ok(Direction::Left),
            3 => Ok(Direction::Right),
            other => Err(ActionError::UnknownDirection(other)),
        }
    }

    /// Einheitsvektor der Richtung. Vertikal ist er doppelt so lang wie horizontal.
    pub fn vector(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -2),
            Direction::Down => (0, 2),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// Eine UI-Aktion. `P` ist der Positionstyp: [`Point`] für Pixel,
/// [`Cell`] für das Raster des Diskretisierungs-Adapters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action<P = Point> {
    Home,
    Back,
    Tap { pos: P },
    Hold { pos: P },
    SwipeDirectional { pos: P, direction: Direction },
    SwipePoints { pos: P, end: P },
}

impl<P> Action<P> {
    /// Numerischer Aktionstyp (0 = Home … 5 = Wischen zwischen zwei Punkten).
    pub fn action_type(&self) -> u8 {
        match self {
            Action::Home => 0,
            Action::Back => 1,
            Action::Tap { .. } => 2,
            Action::Hold { .. } => 3,
            Action::SwipeDirectional { .. } => 4,
            Action::SwipePoints { .. } => 5,
        }
    }

    /// Überführt alle Positionen (`pos` und `end`) in einen anderen Positionstyp.
    pub fn map_positions<Q>(self, mut f: impl FnMut(P) -> Q) -> Action<Q> {
        match self {
            Action::Home => Action::Home,
            Action::Back => Action::Back,
            Action::Tap { pos } => Action::Tap { pos: f(pos) },
            Action::Hold { pos } => Action::Hold { pos: f(pos) },
            Action::SwipeDirectional { pos, direction } => Action::SwipeDirectional {
                pos: f(pos),
                direction,
            },
            Action::SwipePoints { pos, end } => {
                let pos = f(pos);
                Action::SwipePoints { pos, end: f(end) }
            }
        }
    }
}

/// Fehler beim Umwandeln einer [`RawAction`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("unknown action type: {0}")]
    UnknownType(u8),
    #[error("unknown direction: {0}")]
    UnknownDirection(u8),
    #[error("action type {action_type} requires field `{field}`")]
    MissingField {
        action_type: u8,
        field: &'static str,
    },
}

/// Lose Form einer Aktion. Welche Felder Pflicht sind, hängt von
/// `action_type` ab; überzählige Felder werden ignoriert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAction<P = Point> {
    pub action_type: u8,
    pub pos: Option<P>,
    pub direction: Option<u8>,
    pub end: Option<P>,
}

impl<P> TryFrom<RawAction<P>> for Action<P> {
    type Error = ActionError;

    fn try_from(raw: RawAction<P>) -> Result<Self, Self::Error> {
        let action_type = raw.action_type;
        let missing = |field| ActionError::MissingField { action_type, field };
        match action_type {
            0 => Ok(Action::Home),
            1 => Ok(Action::Back),
            2 => Ok(Action::Tap {
                pos: raw.pos.ok_or_else(|| missing("pos"))?,
            }),
            3 => Ok(Action::Hold {
                pos: raw.pos.ok_or_else(|| missing("pos"))?,
            }),
            4 => {
                let pos = raw.pos.ok_or_else(|| missing("pos"))?;
                let code = raw.direction.ok_or_else(|| missing("direction"))?;
                Ok(Action::SwipeDirectional {
                    pos,
                    direction: Direction::from_code(code)?,
                })
            }
            5 => {
                let pos = raw.pos.ok_or_else(|| missing("pos"))?;
                let end = raw.end.ok_or_else(|| missing("end"))?;
                Ok(Action::SwipePoints { pos, end })
            }
            other => Err(ActionError::UnknownType(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn raw_action_requires_fields_per_type() {
        let raw: RawAction = serde_json::from_value(json!({
            "action_type": 4,
            "pos": {"x": 10, "y": 20}
        }))
        .unwrap();
        assert_eq!(
            Action::try_from(raw),
            Err(ActionError::MissingField {
                action_type: 4,
                field: "direction"
            })
        );

        let raw: RawAction = serde_json::from_value(json!({"action_type": 5, "pos": {"x": 1, "y": 2}})).unwrap();
        assert!(matches!(
            Action::try_from(raw),
            Err(ActionError::MissingField { field: "end", .. })
        ));
    }

    #[test]
    fn raw_action_ignores_extra_fields() {
        let raw: RawAction = serde_json::from_value(json!({
            "action_type": 0,
            "pos": {"x": 10, "y": 20},
            "direction": 3,
            "end": {"x": 1, "y": 1}
        }))
        .unwrap();
        assert_eq!(Action::try_from(raw), Ok(Action::Home));

        let raw = RawAction {
            action_type: 2,
            pos: Some(Point::new(5, 6)),
            direction: Some(9),
            end: None,
        };
        assert_eq!(
            Action::try_from(raw),
            Ok(Action::Tap {
                pos: Point::new(5, 6)
            })
        );
    }

    #[test]
    fn raw_action_rejects_unknown_codes() {
        let raw = RawAction::<Point> {
            action_type: 6,
            pos: None,
            direction: None,
            end: None,
        };
        assert_eq!(Action::try_from(raw), Err(ActionError::UnknownType(6)));

        let raw = RawAction {
            action_type: 4,
            pos: Some(Point::new(0, 0)),
            direction: Some(4),
            end: None,
        };
        assert_eq!(Action::try_from(raw), Err(ActionError::UnknownDirection(4)));
    }

    #[test]
    fn direction_codes_are_stable() {
        for code in 0..4u8 {
            assert_eq!(Direction::from_code(code).unwrap().code(), code);
        }
        assert_eq!(Direction::Up.vector(), (0, -2));
        assert_eq!(Direction::Right.vector(), (1, 0));
    }

    #[test]
    fn map_positions_converts_pos_and_end() {
        let action = Action::SwipePoints {
            pos: Cell::new(1, 2),
            end: Cell::new(3, 4),
        };
        let mapped = action.map_positions(|c| Point::new(c.col as i32 * 10, c.row as i32 * 10));
        assert_eq!(
            mapped,
            Action::SwipePoints {
                pos: Point::new(20, 10),
                end: Point::new(40, 30)
            }
        );
        assert_eq!(mapped.action_type(), 5);
        assert_eq!(Action::<Cell>::Back.map_positions(|_| Point::default()), Action::Back);
    }

    #[test]
    fn action_json_uses_type_tag() {
        let action: Action = serde_json::from_value(json!({
            "type": "swipe_directional",
            "pos": {"x": 3, "y": 4},
            "direction": "left"
        }))
        .unwrap();
        assert_eq!(
            action,
            Action::SwipeDirectional {
                pos: Point::new(3, 4),
                direction: Direction::Left
            }
        );
    }
}
