//! # timer
//!
//! NE555 wired astable. The datasheet gives
//!   t_high = ln2 * (R1 + R2) * C
//!   t_low  = ln2 * R2 * C
//! and the output spends t_high HIGH then t_low LOW, forever. We don't model
//! the capacitor; the only thing we keep is the timing, and we honour it by
//! actually sleeping. This is the sole source of simulated time.
use crate::error::BoardError;
use std::f64::consts::LN_2;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

pub struct TimingSource {
    high: Duration,
    low: Duration,
    period: f64,
    frequency: f64,
    level: AtomicBool,
}

impl TimingSource {
    /// r1, r2 in ohms and c in farads; all must be positive
    pub fn new(r1: f64, r2: f64, c: f64) -> Result<TimingSource, BoardError> {
        check_positive("r1", r1)?;
        check_positive("r2", r2)?;
        check_positive("c", c)?;

        let high = LN_2 * (r1 + r2) * c;
        let low = LN_2 * r2 * c;
        let period = high + low;
        let frequency = if period > 0.0 { 1.0 / period } else { 0.0 };
        Ok(TimingSource {
            high: to_duration(high)?,
            low: to_duration(low)?,
            period,
            frequency,
            level: AtomicBool::new(false),
        })
    }

    /// flip the output, then sit out the half of the cycle we just entered
    pub fn advance_half_cycle(&self) {
        spin_sleep::sleep(self.flip());
    }

    /// as `advance_half_cycle`, but gives up early once `keep_going` says
    /// no. The sleep is chopped into slices no longer than `slice` so the
    /// condition is looked at regularly. Returns false if the half-cycle was
    /// cut short; the level stays wherever the edge left it.
    pub fn advance_half_cycle_while(&self, keep_going: impl Fn() -> bool, slice: Duration) -> bool {
        let deadline = Instant::now() + self.flip();
        loop {
            if !keep_going() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            spin_sleep::sleep((deadline - now).min(slice));
        }
    }

    // toggles the level and says how long the new level lasts
    fn flip(&self) -> Duration {
        let was_high = self.level.fetch_xor(true, Ordering::AcqRel);
        if was_high {
            self.low
        } else {
            self.high
        }
    }

    pub fn is_high(&self) -> bool {
        self.level.load(Ordering::Acquire)
    }

    /// Hz; 0 for a degenerate period
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// seconds
    pub fn period(&self) -> f64 {
        self.period
    }

    pub fn high_duration(&self) -> Duration {
        self.high
    }

    pub fn low_duration(&self) -> Duration {
        self.low
    }
}

fn check_positive(name: &'static str, v: f64) -> Result<(), BoardError> {
    // NaN fails this too
    if v > 0.0 && v.is_finite() {
        Ok(())
    } else {
        Err(BoardError::invalid(name, format!("must be > 0, got {}", v)))
    }
}

fn to_duration(secs: f64) -> Result<Duration, BoardError> {
    Duration::try_from_secs_f64(secs)
        .map_err(|_| BoardError::invalid("c", format!("{} s is not a usable duration", secs)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_board_timings() -> Result<(), BoardError> {
        let t = TimingSource::new(1000.0, 10000.0, 7.37e-6)?;
        let high = t.high_duration().as_secs_f64();
        let low = t.low_duration().as_secs_f64();
        assert!((high - LN_2 * 11000.0 * 7.37e-6).abs() < EPS);
        assert!((low - LN_2 * 10000.0 * 7.37e-6).abs() < EPS);
        assert!((t.period() - (high + low)).abs() < EPS);
        assert!((t.frequency() - 1.0 / t.period()).abs() < EPS);
        Ok(())
    }

    #[test]
    fn test_high_longer_than_low() -> Result<(), BoardError> {
        let t = TimingSource::new(1.0, 1.0, 1e-6)?;
        assert!(t.high_duration() > t.low_duration());
        Ok(())
    }

    #[test]
    fn test_rejects_non_positive() {
        assert_eq!(TimingSource::new(0.0, 1.0, 1.0).err().map(|e| e.parameter()), Some("r1"));
        assert_eq!(TimingSource::new(1.0, -1.0, 1.0).err().map(|e| e.parameter()), Some("r2"));
        assert_eq!(TimingSource::new(1.0, 1.0, 0.0).err().map(|e| e.parameter()), Some("c"));
        assert!(TimingSource::new(f64::NAN, 1.0, 1.0).is_err());
        assert!(TimingSource::new(1e300, 1e300, 1e300).is_err());
    }

    #[test]
    fn test_level_starts_low_and_alternates() -> Result<(), BoardError> {
        let t = TimingSource::new(1.0, 1.0, 1e-7)?;
        assert!(!t.is_high());
        t.advance_half_cycle();
        assert!(t.is_high());
        t.advance_half_cycle();
        assert!(!t.is_high());
        Ok(())
    }

    #[test]
    fn test_half_cycle_sleeps_for_high_duration() -> Result<(), BoardError> {
        // t_high ~ 13.9ms, t_low ~ 6.9ms
        let t = TimingSource::new(1000.0, 1000.0, 1e-5)?;
        let start = Instant::now();
        t.advance_half_cycle();
        assert!(start.elapsed() >= t.high_duration());
        let start = Instant::now();
        t.advance_half_cycle();
        assert!(start.elapsed() >= t.low_duration());
        Ok(())
    }

    #[test]
    fn test_half_cycle_runs_to_deadline() -> Result<(), BoardError> {
        let t = TimingSource::new(1000.0, 1000.0, 1e-5)?;
        let start = Instant::now();
        assert!(t.advance_half_cycle_while(|| true, Duration::from_millis(2)));
        assert!(start.elapsed() >= t.high_duration());
        Ok(())
    }

    #[test]
    fn test_half_cycle_cut_short() -> Result<(), BoardError> {
        // a ten second HIGH
        let t = TimingSource::new(1.0, 1.0, 10.0 / (LN_2 * 2.0))?;
        let stop = AtomicBool::new(true);
        let start = Instant::now();
        let keep_going = || !stop.load(Ordering::Acquire);
        assert!(!t.advance_half_cycle_while(keep_going, Duration::from_millis(5)));
        assert!(start.elapsed() < Duration::from_secs(1));
        // the edge still happened
        assert!(t.is_high());
        Ok(())
    }
}
