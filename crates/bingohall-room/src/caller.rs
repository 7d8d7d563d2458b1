//! Number calling: which numbers are out, and which one comes next.

use std::time::{Duration, Instant};

use bingohall_protocol::{Letter, MAX_NUMBER};
use rand::Rng;
use rand::seq::IndexedRandom;

/// A single successful call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Call {
    pub number: u8,
    pub letter: Letter,
}

/// Why a call was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CallError {
    /// The previous call was less than one cooldown ago.
    #[error("cooldown active for another {remaining:?}")]
    Cooldown { remaining: Duration },

    /// All `MAX_NUMBER` numbers are already out.
    #[error("every number has been called")]
    Exhausted,
}

/// Tracks the numbers called in one game and draws the next one.
///
/// The called sequence only grows: no number appears twice and none is
/// ever taken back. Draws are uniform over whatever has not been called
/// yet.
#[derive(Debug, Clone)]
pub struct CallSequencer {
    called: Vec<u8>,
    /// `is_called[n]` mirrors `called.contains(&n)`.
    is_called: [bool; MAX_NUMBER as usize + 1],
    last_call_at: Option<Instant>,
    cooldown: Duration,
}

impl CallSequencer {
    /// An empty sequence with the given minimum gap between calls.
    pub fn new(cooldown: Duration) -> Self {
        Self {
            called: Vec::with_capacity(usize::from(MAX_NUMBER)),
            is_called: [false; MAX_NUMBER as usize + 1],
            last_call_at: None,
            cooldown,
        }
    }

    /// Numbers called so far, oldest first.
    pub fn called(&self) -> &[u8] {
        &self.called
    }

    /// Returns `true` if `number` has been called.
    pub fn is_called(&self, number: u8) -> bool {
        self.is_called
            .get(usize::from(number))
            .copied()
            .unwrap_or(false)
    }

    /// How many numbers are still in the pool.
    pub fn remaining(&self) -> usize {
        usize::from(MAX_NUMBER) - self.called.len()
    }

    /// When the last successful call happened.
    pub fn last_call_at(&self) -> Option<Instant> {
        self.last_call_at
    }

    /// Time left before a call is allowed at `now`, or `None` if a call
    /// would be accepted.
    pub fn cooldown_remaining(&self, now: Instant) -> Option<Duration> {
        let last = self.last_call_at?;
        let elapsed = now.saturating_duration_since(last);
        (elapsed < self.cooldown).then(|| self.cooldown - elapsed)
    }

    /// Draws the next number.
    ///
    /// The cooldown check and the timestamp update happen in this one call,
    /// so the caller only needs to hold the room for its duration.
    ///
    /// # Errors
    /// - [`CallError::Cooldown`] if the last call was too recent
    /// - [`CallError::Exhausted`] if nothing is left to call
    pub fn draw_next<R: Rng + ?Sized>(
        &mut self,
        now: Instant,
        rng: &mut R,
    ) -> Result<Call, CallError> {
        if let Some(remaining) = self.cooldown_remaining(now) {
            return Err(CallError::Cooldown { remaining });
        }

        let uncalled: Vec<u8> =
            (1..=MAX_NUMBER).filter(|n| !self.is_called(*n)).collect();
        let number = *uncalled.choose(rng).ok_or(CallError::Exhausted)?;
        let letter =
            Letter::for_number(number).expect("drawn from 1..=MAX_NUMBER");

        self.called.push(number);
        self.is_called[usize::from(number)] = true;
        self.last_call_at = Some(now);

        Ok(Call { number, letter })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    const COOLDOWN: Duration = Duration::from_secs(5);

    #[test]
    fn test_first_call_is_never_throttled() {
        let mut seq = CallSequencer::new(COOLDOWN);
        let mut rng = StdRng::seed_from_u64(1);
        let call = seq.draw_next(Instant::now(), &mut rng).unwrap();
        assert_eq!(Letter::for_number(call.number), Some(call.letter));
        assert_eq!(seq.called(), &[call.number]);
        assert!(seq.is_called(call.number));
    }

    #[test]
    fn test_second_call_inside_cooldown_is_refused() {
        let mut seq = CallSequencer::new(COOLDOWN);
        let mut rng = StdRng::seed_from_u64(2);
        let t0 = Instant::now();
        seq.draw_next(t0, &mut rng).unwrap();

        let err = seq
            .draw_next(t0 + Duration::from_secs(2), &mut rng)
            .unwrap_err();
        assert_eq!(
            err,
            CallError::Cooldown {
                remaining: Duration::from_secs(3)
            }
        );
        assert_eq!(seq.called().len(), 1, "refused call must not draw");

        seq.draw_next(t0 + COOLDOWN, &mut rng).unwrap();
        assert_eq!(seq.called().len(), 2);
    }

    #[test]
    fn test_refused_call_does_not_reset_cooldown() {
        let mut seq = CallSequencer::new(COOLDOWN);
        let mut rng = StdRng::seed_from_u64(3);
        let t0 = Instant::now();
        seq.draw_next(t0, &mut rng).unwrap();
        let _ = seq.draw_next(t0 + Duration::from_secs(4), &mut rng);
        assert_eq!(seq.last_call_at(), Some(t0));
    }

    #[test]
    fn test_draws_every_number_exactly_once_then_exhausts() {
        let mut seq = CallSequencer::new(Duration::ZERO);
        let mut rng = StdRng::seed_from_u64(4);
        let now = Instant::now();

        for _ in 0..MAX_NUMBER {
            seq.draw_next(now, &mut rng).unwrap();
        }

        let unique: HashSet<u8> = seq.called().iter().copied().collect();
        assert_eq!(unique.len(), usize::from(MAX_NUMBER));
        assert_eq!(seq.remaining(), 0);
        assert_eq!(seq.draw_next(now, &mut rng), Err(CallError::Exhausted));
        assert_eq!(seq.called().len(), usize::from(MAX_NUMBER));
    }

    #[test]
    fn test_cooldown_remaining_is_none_before_any_call() {
        let seq = CallSequencer::new(COOLDOWN);
        assert_eq!(seq.cooldown_remaining(Instant::now()), None);
    }

    #[test]
    fn test_is_called_out_of_domain() {
        let seq = CallSequencer::new(COOLDOWN);
        assert!(!seq.is_called(0));
        assert!(!seq.is_called(200));
    }
}
