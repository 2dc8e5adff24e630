// ── Device status wire format ──
//
// The controller reports its state as a single line of space-separated
// tokens. Token positions are fixed; labels between them are ignored:
//
//   door0: <state> <age> door1: <state> <age> temp: <t> rssi: <r> heap: <h> uptime: <u>
//
// Numeric tokens that fail to parse fall back to a sentinel instead of
// failing the whole payload; a short payload is a protocol error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Sentinel for a temperature token the device sent but we could not parse.
/// Readings at or below this value mean "no reading".
pub const UNKNOWN_TEMPERATURE: f32 = -198.4;

const MIN_STATUS_TOKENS: usize = 14;

/// Reported position of a single door.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DoorState {
    Unknown,
    Open,
    Closed,
    Opening,
    Closing,
}

impl DoorState {
    /// Parse a door-state name, case-insensitively. Anything that is not
    /// one of the five known names (including the empty string) is
    /// [`DoorState::Unknown`].
    pub fn parse(name: &str) -> Self {
        if name.eq_ignore_ascii_case("open") {
            Self::Open
        } else if name.eq_ignore_ascii_case("closed") {
            Self::Closed
        } else if name.eq_ignore_ascii_case("opening") {
            Self::Opening
        } else if name.eq_ignore_ascii_case("closing") {
            Self::Closing
        } else {
            Self::Unknown
        }
    }

    /// A door counts as moving while it is opening or closing.
    pub fn is_moving(self) -> bool {
        matches!(self, Self::Opening | Self::Closing)
    }
}

/// A well-formed status snapshot from the device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// When this snapshot was received and parsed.
    pub timestamp: DateTime<Utc>,
    pub door0_state: DoorState,
    /// Seconds since door 0 last changed state.
    pub door0_age: u32,
    pub door1_state: DoorState,
    /// Seconds since door 1 last changed state.
    pub door1_age: u32,
    /// Ambient temperature in °C, or [`UNKNOWN_TEMPERATURE`].
    pub temperature: f32,
    /// Device uptime in seconds.
    pub uptime: u32,
    /// WiFi signal strength in dBm.
    pub rssi: i32,
    /// Free heap in bytes.
    pub heap: u32,
}

impl StatusSnapshot {
    /// `true` while either door is opening or closing.
    pub fn is_moving(&self) -> bool {
        self.door0_state.is_moving() || self.door1_state.is_moving()
    }

    /// The temperature reading, if the device produced a usable one.
    pub fn temperature_reading(&self) -> Option<f32> {
        (self.temperature > UNKNOWN_TEMPERATURE).then_some(self.temperature)
    }
}

/// Parse a raw status line into a snapshot, stamped with the current time.
pub(crate) fn parse_status(raw: &str) -> Result<StatusSnapshot, Error> {
    let tokens: Vec<&str> = raw.split_whitespace().collect();

    if tokens.len() < MIN_STATUS_TOKENS {
        return Err(Error::proto("unable to parse status response"));
    }

    Ok(StatusSnapshot {
        timestamp: Utc::now(),
        door0_state: DoorState::parse(tokens[1]),
        door0_age: tokens[2].parse().unwrap_or(0),
        door1_state: DoorState::parse(tokens[4]),
        door1_age: tokens[5].parse().unwrap_or(0),
        temperature: tokens[7].parse().unwrap_or(UNKNOWN_TEMPERATURE),
        rssi: tokens[9].parse().unwrap_or(0),
        heap: tokens[11].parse().unwrap_or(0),
        uptime: tokens[13].parse().unwrap_or(0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW: &str = "door0: closed 1816 door1: open 42 temp: 21.5 rssi: -67 heap: 24816 uptime: 86927";

    #[test]
    fn door_state_names_are_case_insensitive() {
        for name in ["open", "OPEN", "oPeN", "Open"] {
            assert_eq!(DoorState::parse(name), DoorState::Open);
        }
        for name in ["closed", "CLOSED", "cLoSeD", "Closed"] {
            assert_eq!(DoorState::parse(name), DoorState::Closed);
        }
        for name in ["opening", "OPENING", "oPeNiNg", "Opening"] {
            assert_eq!(DoorState::parse(name), DoorState::Opening);
        }
        for name in ["closing", "CLOSING", "cLoSiNg", "Closing"] {
            assert_eq!(DoorState::parse(name), DoorState::Closing);
        }
    }

    #[test]
    fn unrecognized_door_state_names_map_to_unknown() {
        for name in ["unknown", "UNKNOWN", "NotFound", "garbage", ""] {
            assert_eq!(DoorState::parse(name), DoorState::Unknown);
        }
    }

    #[test]
    fn full_payload_parses() {
        let snapshot = parse_status(RAW).expect("well-formed payload");
        assert_eq!(snapshot.door0_state, DoorState::Closed);
        assert_eq!(snapshot.door0_age, 1816);
        assert_eq!(snapshot.door1_state, DoorState::Open);
        assert_eq!(snapshot.door1_age, 42);
        assert_eq!(snapshot.temperature, 21.5);
        assert_eq!(snapshot.rssi, -67);
        assert_eq!(snapshot.heap, 24816);
        assert_eq!(snapshot.uptime, 86927);
        assert!(!snapshot.is_moving());
    }

    #[test]
    fn short_payload_is_a_protocol_error() {
        for raw in ["", "door0: open", "a b c d e f g h i j k l m"] {
            assert!(matches!(parse_status(raw), Err(Error::Proto { .. })));
        }
    }

    #[test]
    fn bad_numeric_tokens_fall_back_to_sentinels() {
        let raw = "door0: opening x door1: closed y temp: z rssi: w heap: v uptime: u";
        let snapshot = parse_status(raw).expect("sentinels, not failure");
        assert_eq!(snapshot.door0_age, 0);
        assert_eq!(snapshot.door1_age, 0);
        assert_eq!(snapshot.temperature, UNKNOWN_TEMPERATURE);
        assert_eq!(snapshot.temperature_reading(), None);
        assert_eq!(snapshot.rssi, 0);
        assert_eq!(snapshot.heap, 0);
        assert_eq!(snapshot.uptime, 0);
        assert!(snapshot.is_moving());
    }
}
