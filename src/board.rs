//! The counter half of the board: one lamp chaser and one digit chain, which
//! share a clock and are always locked, stepped and read together.
use crate::chip::Chip;
use crate::decade::CounterChain;
use crate::error::BoardError;
use crate::ring::RingCounter;

/// one digit as seen from outside
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigitState {
    pub value: u8,
    pub carry: bool,
    pub segments: u8,
}

/// a consistent picture of every counter at one instant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub ring_mask: u32,
    pub ring_span: u8,
    /// lead (least significant) digit first
    pub digits: Vec<DigitState>,
}

impl CounterSnapshot {
    /// the decimal reading across the digit chain
    pub fn count(&self) -> u64 {
        self.digits.iter().rev().fold(0u64, |acc, d| {
            acc.saturating_mul(10).saturating_add(u64::from(d.value))
        })
    }

    /// lamps in panel order, leftmost (most significant output) first
    pub fn lamps(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.ring_span)
            .rev()
            .map(move |bit| self.ring_mask & (1 << bit) != 0)
    }
}

#[derive(Debug, Clone)]
pub struct Board {
    ring: RingCounter,
    chain: CounterChain,
}

impl Board {
    pub fn new(ring_span: u8, digits: usize) -> Result<Board, BoardError> {
        Ok(Board {
            ring: RingCounter::new(ring_span)?,
            chain: CounterChain::new(digits)?,
        })
    }

    /// a full clock period has elapsed: step the lamps and ripple the digits
    pub fn clock(&mut self) {
        self.ring.advance();
        self.chain.advance();
    }

    /// a 555 period while the digits are switched to the external clock
    pub fn clock_lamps(&mut self) {
        self.ring.advance();
    }

    /// an edge on the external clock input; only the 4026s are wired to it
    pub fn clock_digits(&mut self) {
        self.chain.advance();
    }

    pub fn reset(&mut self) {
        self.ring.reset();
        self.chain.reset();
    }

    /// clear the digit display, leave the lamps alone
    pub fn reset_digits(&mut self) {
        self.chain.reset();
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            ring_mask: self.ring.current_mask(),
            ring_span: self.ring.span(),
            digits: self
                .chain
                .digits()
                .iter()
                .map(|d| DigitState {
                    value: d.digit(),
                    carry: d.carry(),
                    segments: d.segments(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_propagates_errors() {
        assert_eq!(Board::new(0, 2).unwrap_err().parameter(), "ring_span");
        assert_eq!(Board::new(4, 0).unwrap_err().parameter(), "digits");
    }

    #[test]
    fn test_clock_steps_everything() -> Result<(), BoardError> {
        let mut b = Board::new(4, 2)?;
        for _ in 0..12 {
            b.clock();
        }
        let s = b.snapshot();
        assert_eq!(s.ring_mask, 0b1000);
        assert_eq!(s.count(), 12);
        assert_eq!(s.digits.len(), 2);
        assert_eq!(s.digits[0].value, 2);
        assert_eq!(s.digits[1].value, 1);
        Ok(())
    }

    #[test]
    fn test_reset_digits_keeps_lamps() -> Result<(), BoardError> {
        let mut b = Board::new(5, 1)?;
        b.clock();
        b.clock();
        b.reset_digits();
        let s = b.snapshot();
        assert_eq!(s.ring_mask, 0b00100);
        assert_eq!(s.count(), 0);
        b.reset();
        assert_eq!(b.snapshot().ring_mask, 0b10000);
        Ok(())
    }

    #[test]
    fn test_split_clocks() -> Result<(), BoardError> {
        let mut b = Board::new(4, 2)?;
        b.clock_digits();
        b.clock_digits();
        let s = b.snapshot();
        assert_eq!(s.ring_mask, 0b1000);
        assert_eq!(s.count(), 2);
        b.clock_lamps();
        let s = b.snapshot();
        assert_eq!(s.ring_mask, 0b0100);
        assert_eq!(s.count(), 2);
        Ok(())
    }

    #[test]
    fn test_lamps_left_to_right() -> Result<(), BoardError> {
        let mut b = Board::new(3, 1)?;
        b.clock();
        let lamps: Vec<bool> = b.snapshot().lamps().collect();
        assert_eq!(lamps, [false, true, false]);
        Ok(())
    }
}
