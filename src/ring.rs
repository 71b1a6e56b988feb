//! CD4017 wired as a 1-of-N lamp chaser. The reset pin is tied to output
//! `span`, so only the top `span` outputs ever light.
//!
//! Power-on lights the most significant lamp; each clock edge walks the lit
//! lamp one place toward bit 0, and falling off the end brings it back to
//! the top.
use crate::chip::Chip;
use crate::error::BoardError;

/// the CD4017 only has ten decoded outputs
pub const MAX_SPAN: u8 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RingCounter {
    span: u8,
    mask: u32,
}

impl RingCounter {
    pub fn new(span: u8) -> Result<RingCounter, BoardError> {
        if span < 1 || span > MAX_SPAN {
            return Err(BoardError::invalid(
                "ring_span",
                format!("must be between 1 and {}, got {}", MAX_SPAN, span),
            ));
        }
        Ok(RingCounter {
            span,
            mask: initial_mask(span),
        })
    }

    pub fn span(&self) -> u8 {
        self.span
    }

    pub fn current_mask(&self) -> u32 {
        self.mask
    }

    /// index of the lit output, 0 = least significant
    pub fn position(&self) -> u8 {
        self.mask.trailing_zeros() as u8
    }
}

fn initial_mask(span: u8) -> u32 {
    1 << (span - 1)
}

impl Chip for RingCounter {
    fn advance(&mut self) {
        self.mask >>= 1;
        if self.mask == 0 {
            self.mask = initial_mask(self.span);
        }
    }

    fn reset(&mut self) {
        self.mask = initial_mask(self.span);
    }

    fn value(&self) -> u32 {
        self.mask
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_mask_is_top_lamp() -> Result<(), BoardError> {
        assert_eq!(RingCounter::new(1)?.current_mask(), 0b1);
        assert_eq!(RingCounter::new(4)?.current_mask(), 0b1000);
        assert_eq!(RingCounter::new(10)?.current_mask(), 0b10_0000_0000);
        Ok(())
    }

    #[test]
    fn test_rejects_bad_span() {
        assert!(RingCounter::new(0).is_err());
        assert!(RingCounter::new(11).is_err());
        assert_eq!(RingCounter::new(11).unwrap_err().parameter(), "ring_span");
    }

    #[test]
    fn test_walks_right_then_wraps() -> Result<(), BoardError> {
        let mut r = RingCounter::new(4)?;
        let mut seen = Vec::new();
        for _ in 0..5 {
            r.advance();
            seen.push(r.current_mask());
        }
        assert_eq!(seen, [0b0100, 0b0010, 0b0001, 0b1000, 0b0100]);
        Ok(())
    }

    #[test]
    fn test_period_equals_span() -> Result<(), BoardError> {
        for span in 1..=MAX_SPAN {
            let mut r = RingCounter::new(span)?;
            let start = r.current_mask();
            for step in 1..=span {
                r.advance();
                assert_eq!(r.current_mask().count_ones(), 1);
                if step < span {
                    assert_ne!(r.current_mask(), start, "span {} step {}", span, step);
                }
            }
            assert_eq!(r.current_mask(), start, "span {}", span);
        }
        Ok(())
    }

    #[test]
    fn test_span_one_never_moves() -> Result<(), BoardError> {
        let mut r = RingCounter::new(1)?;
        r.advance_by(7);
        assert_eq!(r.current_mask(), 1);
        assert_eq!(r.position(), 0);
        Ok(())
    }

    #[test]
    fn test_reset_restores_top() -> Result<(), BoardError> {
        let mut r = RingCounter::new(6)?;
        r.advance_by(3);
        assert_eq!(r.position(), 2);
        r.reset();
        assert_eq!(r.current_mask(), 0b10_0000);
        assert_eq!(r.current_mask().count_ones(), 1);
        assert_eq!(r.value(), r.current_mask());
        Ok(())
    }
}
