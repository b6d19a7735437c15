use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Opaque connection identifier assigned by the transport layer
pub type ConnId = String;

/// Number of candies on the board
pub const CANDY_COUNT: usize = 15;

/// One of the two player slots in the lobby
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Seat(pub u8);

impl Seat {
    /// The opposing seat
    pub fn other(self) -> Seat {
        Seat(1 - self.0)
    }
}

impl Serialize for Seat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.0)
    }
}

// Accepts both a number and a numeric string: JSON object keys (the
// poisonCandies map) arrive as strings.
impl<'de> Deserialize<'de> for Seat {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SeatVisitor;

        impl<'de> Visitor<'de> for SeatVisitor {
            type Value = Seat;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a seat index (0 or 1)")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Seat, E> {
                match v {
                    0 | 1 => Ok(Seat(v as u8)),
                    _ => Err(E::custom(format!("invalid seat index: {v}"))),
                }
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Seat, E> {
                v.parse::<u64>()
                    .map_err(E::custom)
                    .and_then(|n| self.visit_u64(n))
            }
        }

        deserializer.deserialize_any(SeatVisitor)
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Terminal outcome of a game. A seat winner goes on the wire as a number,
/// mutual elimination as the string `"both"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winner {
    Seat(Seat),
    Both,
}

impl Serialize for Winner {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Winner::Seat(seat) => serializer.serialize_u8(seat.0),
            Winner::Both => serializer.serialize_str("both"),
        }
    }
}

impl<'de> Deserialize<'de> for Winner {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct WinnerVisitor;

        impl<'de> Visitor<'de> for WinnerVisitor {
            type Value = Winner;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a seat index or the string \"both\"")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Winner, E> {
                match v {
                    0 | 1 => Ok(Winner::Seat(Seat(v as u8))),
                    _ => Err(E::custom(format!("invalid seat index: {v}"))),
                }
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Winner, E> {
                if v == "both" {
                    Ok(Winner::Both)
                } else {
                    Err(E::custom(format!("invalid winner: {v:?}")))
                }
            }
        }

        deserializer.deserialize_any(WinnerVisitor)
    }
}

/// Authoritative per-game state, broadcast verbatim in `gameStart`,
/// `updateState` and `gameOver` payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    /// `true` while the candy at that index is still on the board
    pub candies: Vec<bool>,
    /// Poison choice per seat; partially populated during selection
    pub poison_candies: BTreeMap<Seat, usize>,
    pub turn: Seat,
    /// Seconds remaining in the current turn; may dip below zero for one
    /// tick before the timeout is processed
    pub timer: i32,
    pub game_over: bool,
    pub winner: Option<Winner>,
    /// Set once both poisons are chosen and `gameStart` has been broadcast
    #[serde(skip)]
    pub started: bool,
}

impl GameState {
    pub fn new(turn_seconds: i32) -> Self {
        Self {
            candies: vec![true; CANDY_COUNT],
            poison_candies: BTreeMap::new(),
            turn: Seat(0),
            timer: turn_seconds,
            game_over: false,
            winner: None,
            started: false,
        }
    }

    /// Whether `index` is any seat's chosen poison
    pub fn is_poison(&self, index: usize) -> bool {
        self.poison_candies.values().any(|&p| p == index)
    }

    /// Whether every candy still on the board is someone's poison
    pub fn only_poison_left(&self) -> bool {
        self.candies
            .iter()
            .enumerate()
            .filter(|(_, present)| **present)
            .all(|(i, _)| self.is_poison(i))
    }
}
