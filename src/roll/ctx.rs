use super::roller::Roller;
use crate::common::*;
use crate::error::{RResult, RollError};

pub type DefaultRoller = rand::prelude::ThreadRng;

/// Draw cap used by [`RollContext::default`].
pub const DEFAULT_MAX_ROLLS: usize = 10_000;

/// Owns the random source for an evaluation and counts the draws made with it.
pub struct RollContext<R = DefaultRoller> {
    max_rolls: Option<usize>,
    rolls: usize,
    roller: R,
}

impl<R: Roller> RollContext<R> {
    pub fn new(max_rolls: Option<usize>, roller: R) -> Self {
        Self {
            max_rolls,
            rolls: 0,
            roller,
        }
    }

    pub fn new_bounded(max_rolls: usize, roller: R) -> Self {
        Self::new(Some(max_rolls), roller)
    }

    pub fn new_unbounded(roller: R) -> Self {
        Self::new(None, roller)
    }

    /// Number of dice drawn since the last [`reset`](Self::reset).
    pub fn rolls(&self) -> usize {
        self.rolls
    }

    pub fn reset(&mut self) {
        self.rolls = 0;
    }

    pub fn roller(&self) -> &R {
        &self.roller
    }

    fn count_rolls(&mut self, n: usize) -> RResult<()> {
        self.rolls += n;
        if self.max_rolls.map_or(false, |max| self.rolls > max) {
            Err(RollError::TooManyRolls)
        } else {
            Ok(())
        }
    }

    pub fn roll(&mut self, num: usize, sides: NonZeroUInt) -> RResult<Vec<Int>> {
        self.count_rolls(num)?;
        Ok((0..num)
            .map(|_| Int::from(self.roller.roll(sides)))
            .collect())
    }

    pub fn roll_one(&mut self, sides: NonZeroUInt) -> RResult<Int> {
        self.count_rolls(1)?;
        Ok(Int::from(self.roller.roll(sides)))
    }
}

impl Default for RollContext {
    fn default() -> Self {
        Self::new(Some(DEFAULT_MAX_ROLLS), rand::thread_rng())
    }
}
