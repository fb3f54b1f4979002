use crate::common::{NonZeroUInt, UInt};
use rand::Rng;

/// A source of die faces.
///
/// Every [`rand::Rng`] is a `Roller`, so a seeded generator gives reproducible rolls.
pub trait Roller {
    /// Draws a face uniformly from `1..=sides`.
    fn roll(&mut self, sides: NonZeroUInt) -> UInt;
}

impl<R: Rng> Roller for R {
    fn roll(&mut self, sides: NonZeroUInt) -> UInt {
        self.gen_range(1..=sides.get())
    }
}

#[cfg(test)]
pub(crate) use scripted::{SequenceRoller, StepRoller};
