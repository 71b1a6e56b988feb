//! Construction-time settings for a board. Read once when the session
//! starts; nothing here is saved anywhere.
use crate::error::BoardError;
use crate::ring::MAX_SPAN;

/// the lab board ships with four lamps and two digits
pub const DEFAULT_RING_SPAN: u8 = 4;
pub const DEFAULT_R1: f64 = 1_000.0;
pub const DEFAULT_R2: f64 = 10_000.0;
pub const DEFAULT_C: f64 = 7.37e-6;
pub const DEFAULT_DIGITS: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct BoardConfig {
    /// lamps on the 4017, 1..=10
    pub ring_span: u8,
    /// 555 timing resistors (ohms) and capacitor (farads)
    pub r1: f64,
    pub r2: f64,
    pub c: f64,
    /// 4026s in the display chain
    pub digits: usize,
}

impl Default for BoardConfig {
    fn default() -> Self {
        BoardConfig {
            ring_span: DEFAULT_RING_SPAN,
            r1: DEFAULT_R1,
            r2: DEFAULT_R2,
            c: DEFAULT_C,
            digits: DEFAULT_DIGITS,
        }
    }
}

impl BoardConfig {
    /// check every field up front, so a bad value never gets as far as
    /// spawning anything
    pub fn validate(&self) -> Result<(), BoardError> {
        if self.ring_span < 1 || self.ring_span > MAX_SPAN {
            return Err(BoardError::invalid(
                "ring_span",
                format!("must be between 1 and {}, got {}", MAX_SPAN, self.ring_span),
            ));
        }
        for (name, v) in [("r1", self.r1), ("r2", self.r2), ("c", self.c)] {
            if !(v > 0.0 && v.is_finite()) {
                return Err(BoardError::invalid(name, format!("must be > 0, got {}", v)));
            }
        }
        if self.digits == 0 {
            return Err(BoardError::invalid("digits", "need at least one digit"));
        }
        Ok(())
    }
}
