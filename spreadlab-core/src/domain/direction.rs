//! Directional state of the spread book.

use serde::{Deserialize, Serialize};

/// Which side of the spread the strategy wants to hold.
///
/// LongSpread buys leg A and sells the hedge in leg B; ShortSpread is the
/// mirror image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    #[default]
    Flat,
    LongSpread,
    ShortSpread,
}

impl Direction {
    /// +1 for LongSpread, -1 for ShortSpread, 0 for Flat.
    pub fn sign(&self) -> f64 {
        match self {
            Direction::Flat => 0.0,
            Direction::LongSpread => 1.0,
            Direction::ShortSpread => -1.0,
        }
    }

    pub fn is_flat(&self) -> bool {
        matches!(self, Direction::Flat)
    }

    /// Get the opposite direction (for position flips).
    pub fn opposite(&self) -> Self {
        match self {
            Direction::LongSpread => Direction::ShortSpread,
            Direction::ShortSpread => Direction::LongSpread,
            Direction::Flat => Direction::Flat,
        }
    }

    /// Direction implied by a signed exposure.
    pub fn from_sign(value: f64) -> Self {
        if value > 0.0 {
            Direction::LongSpread
        } else if value < 0.0 {
            Direction::ShortSpread
        } else {
            Direction::Flat
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_and_opposite() {
        assert_eq!(Direction::LongSpread.sign(), 1.0);
        assert_eq!(Direction::ShortSpread.sign(), -1.0);
        assert_eq!(Direction::Flat.sign(), 0.0);
        assert_eq!(Direction::LongSpread.opposite(), Direction::ShortSpread);
        assert_eq!(Direction::Flat.opposite(), Direction::Flat);
    }

    #[test]
    fn from_sign_roundtrip() {
        for d in [Direction::Flat, Direction::LongSpread, Direction::ShortSpread] {
            assert_eq!(Direction::from_sign(d.sign()), d);
        }
    }

    #[test]
    fn serializes_screaming_snake() {
        let json = serde_json::to_string(&Direction::ShortSpread).unwrap();
        assert_eq!(json, "\"SHORT_SPREAD\"");
    }
}
