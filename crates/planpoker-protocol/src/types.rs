//! Identity types and the vote deck.
//!
//! Everything here travels on the wire, so every type derives serde
//! traits and the JSON shape is pinned down by the tests at the bottom.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::InvalidVoteValue;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Identifier of a participant.
///
/// Assigned by the transport layer when a connection is accepted; the
/// core treats it as an opaque string. Unique within a room.
///
/// `#[serde(transparent)]` keeps it a bare JSON string rather than
/// `{ "0": "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(pub String);

impl ParticipantId {
    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ParticipantId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Identifier of a room, chosen by the clients.
///
/// Any string is a valid room id. A room that doesn't exist yet is
/// simply created by the first join.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for RoomId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// ---------------------------------------------------------------------------
// RawVote: what a client actually sent
// ---------------------------------------------------------------------------

/// An unvalidated vote as it arrived from a client.
///
/// Clients send either a JSON number or a JSON string. We accept any of
/// those at the decoding stage so that an out-of-deck value (say `7`)
/// reaches the room layer, where it is logged and dropped instead of
/// failing the whole message.
///
/// `#[serde(untagged)]` tries each variant in order. `Integer` comes
/// before `Float` so that `5` decodes (and re-encodes) as `5`, not `5.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawVote {
    /// A whole number, e.g. `8`.
    Integer(i64),
    /// A number with a fractional part, e.g. `0.5`.
    Float(f64),
    /// A string, e.g. `"?"` or `"coffee"`.
    Text(String),
}

impl fmt::Display for RawVote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<i64> for RawVote {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<&str> for RawVote {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// VoteValue: the deck
// ---------------------------------------------------------------------------

/// One card of the planning-poker deck.
///
/// This is the single canonical set of vote values. Every inbound vote is
/// validated against it via `VoteValue::try_from(RawVote)`.
///
/// On the wire the point cards are numbers and the two special cards are
/// strings:
///
/// ```text
/// 1  2  3  5  8  13  "?"  "coffee"
/// ```
///
/// `"coffee"` is also what the countdown fills in for participants who
/// didn't vote in time. The coffee glyph (`"☕️"`) used by older clients is
/// accepted as an alias but always sent back as `"coffee"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawVote", into = "RawVote")]
pub enum VoteValue {
    One,
    Two,
    Three,
    Five,
    Eight,
    Thirteen,
    /// "I don't know" (`"?"`).
    Unsure,
    /// "I need a break", also the no-answer default (`"coffee"`).
    Coffee,
}

impl VoteValue {
    /// Every card, in deck order.
    pub const DECK: [VoteValue; 8] = [
        Self::One,
        Self::Two,
        Self::Three,
        Self::Five,
        Self::Eight,
        Self::Thirteen,
        Self::Unsure,
        Self::Coffee,
    ];

    /// The story points of a numeric card, `None` for `?` and coffee.
    pub fn points(self) -> Option<u8> {
        match self {
            Self::One => Some(1),
            Self::Two => Some(2),
            Self::Three => Some(3),
            Self::Five => Some(5),
            Self::Eight => Some(8),
            Self::Thirteen => Some(13),
            Self::Unsure | Self::Coffee => None,
        }
    }

    fn from_points(points: i64) -> Option<Self> {
        Self::DECK
            .into_iter()
            .find(|card| card.points().map(i64::from) == Some(points))
    }
}

impl fmt::Display for VoteValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.points() {
            Some(points) => write!(f, "{points}"),
            None if *self == Self::Unsure => f.write_str("?"),
            None => f.write_str("coffee"),
        }
    }
}

impl TryFrom<RawVote> for VoteValue {
    type Error = InvalidVoteValue;

    fn try_from(raw: RawVote) -> Result<Self, Self::Error> {
        let parsed = match &raw {
            RawVote::Integer(n) => Self::from_points(*n),
            RawVote::Float(n) if n.fract() == 0.0 => {
                Self::from_points(*n as i64)
            }
            RawVote::Float(_) => None,
            RawVote::Text(s) => match s.as_str() {
                "?" => Some(Self::Unsure),
                "coffee" | "☕️" | "☕" => Some(Self::Coffee),
                _ => None,
            },
        };
        parsed.ok_or(InvalidVoteValue(raw))
    }
}

impl From<VoteValue> for RawVote {
    fn from(value: VoteValue) -> Self {
        match value.points() {
            Some(points) => Self::Integer(i64::from(points)),
            None => Self::Text(value.to_string()),
        }
    }
}
