//! CD4026 decade counters with decoded seven-segment outputs, and the ripple
//! chain that turns several of them into a multi-digit display.
//!
//! Digit 0 is the lead (units). It sees every clock edge; each later digit
//! is clocked by the carry out of the digit before it.
use crate::chip::Chip;
use crate::error::BoardError;

/// segment bits, a = bit 0 through g = bit 6
pub const SEG_A: u8 = 1 << 0;
pub const SEG_B: u8 = 1 << 1;
pub const SEG_C: u8 = 1 << 2;
pub const SEG_D: u8 = 1 << 3;
pub const SEG_E: u8 = 1 << 4;
pub const SEG_F: u8 = 1 << 5;
pub const SEG_G: u8 = 1 << 6;

/// what the 4026 drives onto its segment pins for each digit
#[rustfmt::skip]
const SEVEN_SEGMENT: [u8; 10] = [
    SEG_A | SEG_B | SEG_C | SEG_D | SEG_E | SEG_F,          // 0
    SEG_B | SEG_C,                                          // 1
    SEG_A | SEG_B | SEG_D | SEG_E | SEG_G,                  // 2
    SEG_A | SEG_B | SEG_C | SEG_D | SEG_G,                  // 3
    SEG_B | SEG_C | SEG_F | SEG_G,                          // 4
    SEG_A | SEG_C | SEG_D | SEG_F | SEG_G,                  // 5
    SEG_A | SEG_C | SEG_D | SEG_E | SEG_F | SEG_G,          // 6
    SEG_A | SEG_B | SEG_C,                                  // 7
    SEG_A | SEG_B | SEG_C | SEG_D | SEG_E | SEG_F | SEG_G,  // 8
    SEG_A | SEG_B | SEG_C | SEG_D | SEG_F | SEG_G,          // 9
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecadeCounter {
    value: u8,
    carry: bool,
}

impl DecadeCounter {
    pub fn new() -> Self {
        DecadeCounter::default()
    }

    pub fn digit(&self) -> u8 {
        self.value
    }

    /// true only straight after a 9 -> 0 rollover
    pub fn carry(&self) -> bool {
        self.carry
    }

    /// clock input wired to the previous digit's carry out. A missing pulse
    /// leaves the counter, carry included, exactly as it was.
    pub fn advance_if_carried(&mut self, carry_in: bool) {
        if carry_in {
            self.advance();
        }
    }

    pub fn segments(&self) -> u8 {
        SEVEN_SEGMENT[self.value as usize]
    }
}

impl Chip for DecadeCounter {
    fn advance(&mut self) {
        if self.value == 9 {
            self.value = 0;
            self.carry = true;
        } else {
            self.value += 1;
            self.carry = false;
        }
    }

    fn reset(&mut self) {
        self.value = 0;
        self.carry = false;
    }

    fn value(&self) -> u32 {
        u32::from(self.value)
    }
}

/// decade counters in ripple order, lead (least significant) digit first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterChain {
    digits: Vec<DecadeCounter>,
}

impl CounterChain {
    pub fn new(len: usize) -> Result<CounterChain, BoardError> {
        if len == 0 {
            return Err(BoardError::invalid("digits", "need at least one digit"));
        }
        Ok(CounterChain {
            digits: vec![DecadeCounter::new(); len],
        })
    }

    /// one clock edge into the lead digit, rippled through the whole chain
    /// in a single left-to-right pass. A digit only passes a carry on if it
    /// was itself clocked this time round, so a carry flag left over from an
    /// earlier rollover never leaks into a later cycle.
    pub fn advance(&mut self) {
        let mut carry_in = true;
        for d in self.digits.iter_mut() {
            d.advance_if_carried(carry_in);
            carry_in = carry_in && d.carry();
        }
    }

    pub fn reset(&mut self) {
        for d in self.digits.iter_mut() {
            d.reset();
        }
    }

    pub fn digits(&self) -> &[DecadeCounter] {
        &self.digits
    }

    /// the number on the display, saturating if the chain is absurdly long
    pub fn count(&self) -> u64 {
        self.digits.iter().rev().fold(0u64, |acc, d| {
            acc.saturating_mul(10).saturating_add(u64::from(d.digit()))
        })
    }
}
