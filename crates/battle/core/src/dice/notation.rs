//! Dice notation (`NdM`, `NdM+K`, `NdM-K`, `dM`).

use core::fmt;
use core::str::FromStr;

/// Parsed dice expression.
///
/// Malformed text never raises: [`DiceNotation::parse_or_default`] falls back
/// to `1d6`, which is what every caller in the engine uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiceNotation {
    pub count: u32,
    pub sides: u32,
    pub modifier: i32,
}

/// Reasons a dice expression was rejected.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum NotationError {
    #[error("empty dice expression")]
    Empty,

    #[error("missing 'd' separator in {0:?}")]
    MissingSeparator(String),

    #[error("invalid number in {0:?}")]
    InvalidNumber(String),

    #[error("dice count {0} outside 1..=32")]
    CountOutOfRange(u32),

    #[error("unsupported die size d{0}")]
    UnsupportedSides(u32),
}

impl DiceNotation {
    pub const MAX_COUNT: u32 = 32;
    pub const SUPPORTED_SIDES: [u32; 9] = [2, 3, 4, 6, 8, 10, 12, 20, 100];
    pub const DEFAULT: Self = Self::new(1, 6, 0);

    pub const fn new(count: u32, sides: u32, modifier: i32) -> Self {
        Self {
            count,
            sides,
            modifier,
        }
    }

    /// Parses `text`, falling back to `1d6` on any error.
    pub fn parse_or_default(text: &str) -> Self {
        text.parse().unwrap_or(Self::DEFAULT)
    }

    /// Average total rounded down, used by deterministic damage estimates.
    pub fn average(&self) -> i32 {
        let dice = (self.count * (self.sides + 1) / 2) as i32;
        dice + self.modifier
    }

    /// Highest possible total; a critical hit rolls twice the dice.
    pub fn maximum(&self, critical: bool) -> i32 {
        let count = if critical { self.count * 2 } else { self.count };
        (count * self.sides) as i32 + self.modifier
    }

    pub fn with_count(self, count: u32) -> Self {
        Self { count, ..self }
    }
}

impl Default for DiceNotation {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl FromStr for DiceNotation {
    type Err = NotationError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let trimmed = text.trim().to_ascii_lowercase();
        if trimmed.is_empty() {
            return Err(NotationError::Empty);
        }

        let (count_part, rest) = trimmed
            .split_once('d')
            .ok_or_else(|| NotationError::MissingSeparator(trimmed.clone()))?;

        let count = if count_part.is_empty() {
            1
        } else {
            count_part
                .parse::<u32>()
                .map_err(|_| NotationError::InvalidNumber(trimmed.clone()))?
        };

        let (sides_part, modifier) = match rest.find(['+', '-']) {
            Some(idx) => {
                let (sides, modifier) = rest.split_at(idx);
                let modifier = modifier
                    .parse::<i32>()
                    .map_err(|_| NotationError::InvalidNumber(trimmed.clone()))?;
                (sides, modifier)
            }
            None => (rest, 0),
        };

        let sides = sides_part
            .parse::<u32>()
            .map_err(|_| NotationError::InvalidNumber(trimmed.clone()))?;

        if count == 0 || count > Self::MAX_COUNT {
            return Err(NotationError::CountOutOfRange(count));
        }
        if !Self::SUPPORTED_SIDES.contains(&sides) {
            return Err(NotationError::UnsupportedSides(sides));
        }

        Ok(Self::new(count, sides, modifier))
    }
}

impl fmt::Display for DiceNotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)?;
        match self.modifier {
            0 => Ok(()),
            m if m > 0 => write!(f, "+{m}"),
            m => write!(f, "{m}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_forms() {
        assert_eq!("2d6".parse(), Ok(DiceNotation::new(2, 6, 0)));
        assert_eq!("1d8+3".parse(), Ok(DiceNotation::new(1, 8, 3)));
        assert_eq!("3d4-1".parse(), Ok(DiceNotation::new(3, 4, -1)));
        assert_eq!("d20".parse(), Ok(DiceNotation::new(1, 20, 0)));
        assert_eq!(" 2D10 ".parse(), Ok(DiceNotation::new(2, 10, 0)));
    }

    #[test]
    fn malformed_falls_back_to_1d6() {
        for text in ["", "banana", "0d6", "2d7", "99d6", "2d", "xd6", "2d6+x"] {
            assert_eq!(DiceNotation::parse_or_default(text), DiceNotation::DEFAULT);
        }
    }

    #[test]
    fn display_round_trips_modifier_sign() {
        assert_eq!(DiceNotation::new(1, 8, 3).to_string(), "1d8+3");
        assert_eq!(DiceNotation::new(3, 4, -1).to_string(), "3d4-1");
        assert_eq!(DiceNotation::new(2, 6, 0).to_string(), "2d6");
    }

    #[test]
    fn average_rounds_down() {
        assert_eq!(DiceNotation::new(1, 6, 0).average(), 3);
        assert_eq!(DiceNotation::new(2, 6, 1).average(), 8);
    }
}
