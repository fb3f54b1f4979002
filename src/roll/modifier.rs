use super::{ctx::RollContext, dice::DiceExpression, roller::Roller};
use crate::common::*;
use crate::error::{ModifierError, RResult};
use std::fmt;
use tracing::debug;

#[enum_dispatch::enum_dispatch]
pub trait Modify {
    /// Rejects settings that could never terminate, before anything is drawn.
    fn check(&self, sides: NonZeroUInt) -> RResult<()>;

    /// Applies the modifier to every current roll of `target`.
    fn apply<R: Roller>(&self, ctx: &mut RollContext<R>, target: &mut DiceExpression)
        -> RResult<()>;
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[enum_dispatch::enum_dispatch(Modify)]
pub enum DiceModifier {
    Explode(Explode),
    Keep(Keep),
    Reroll(Reroll),
}

impl fmt::Display for DiceModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explode(x) => fmt::Display::fmt(x, f),
            Self::Keep(x) => fmt::Display::fmt(x, f),
            Self::Reroll(x) => fmt::Display::fmt(x, f),
        }
    }
}

macro_rules! modifier_impl {
    ($(($name:ident, $prefix:literal, $default:ident)),+ $(,)?) => {$(
        #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name {
            pub select: Select,
            pub value: UInt,
        }

        impl $name {
            pub const DEFAULT_SELECT: Select = Select::$default;

            pub const fn new(select: Select, value: UInt) -> Self {
                Self { select, value }
            }

            pub const fn high(value: UInt) -> Self {
                Self::new(Select::High, value)
            }

            pub const fn low(value: UInt) -> Self {
                Self::new(Select::Low, value)
            }

            /// Parses `<prefix>[l|h]<value>`, e.g. `kh2` or `e6`.
            pub(crate) fn parse(s: &str) -> Option<Self> {
                let rest = s.strip_prefix($prefix)?;
                let (select, digits) = match rest.as_bytes().first()? {
                    b'h' => (Select::High, &rest[1..]),
                    b'l' => (Select::Low, &rest[1..]),
                    _ => (Self::DEFAULT_SELECT, rest),
                };
                digits.parse().ok().map(|value| Self::new(select, value))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str($prefix)?;
                if self.select != Self::DEFAULT_SELECT {
                    write!(f, "{}", self.select)?;
                }
                write!(f, "{}", self.value)
            }
        }
    )+};
}

modifier_impl!(
    (Explode, "e", High),
    (Keep, "k", High),
    (Reroll, "r", Low),
);

/// Whether `value` lies on the selected side of `threshold` (inclusive).
fn meets(select: Select, threshold: UInt, value: Int) -> bool {
    match select {
        Select::High => value >= Int::from(threshold),
        Select::Low => value <= Int::from(threshold),
    }
}

/// A threshold every face of the die satisfies would never stop repeating.
fn is_degenerate(select: Select, threshold: UInt, sides: NonZeroUInt) -> bool {
    match select {
        Select::High => threshold <= 1,
        Select::Low => threshold >= sides.get(),
    }
}

impl Modify for Explode {
    fn check(&self, sides: NonZeroUInt) -> RResult<()> {
        if is_degenerate(self.select, self.value, sides) {
            return Err(ModifierError::InfiniteExplode(self.to_string()).into());
        }
        Ok(())
    }

    fn apply<R: Roller>(
        &self,
        ctx: &mut RollContext<R>,
        target: &mut DiceExpression,
    ) -> RResult<()> {
        let sides = target.dice_size;
        self.check(sides)?;

        for roll in &mut target.rolls {
            if !meets(self.select, self.value, roll.value) {
                continue;
            }
            roll.explosions.push(roll.value);
            loop {
                let next = ctx.roll_one(sides)?;
                roll.explosions.push(next);
                if !meets(self.select, self.value, next) {
                    break;
                }
            }
            roll.value = roll.explosions.iter().sum();
            debug!(modifier = %self, explosions = ?roll.explosions, "die exploded");
        }
        Ok(())
    }
}

impl Modify for Keep {
    fn check(&self, _: NonZeroUInt) -> RResult<()> {
        if self.value < 1 {
            return Err(ModifierError::KeepTooFew(self.to_string()).into());
        }
        Ok(())
    }

    fn apply<R: Roller>(&self, _: &mut RollContext<R>, target: &mut DiceExpression) -> RResult<()> {
        self.check(target.dice_size)?;
        let available = target.rolls.len();
        let keep = self.value as usize;
        if keep > available {
            return Err(ModifierError::KeepTooMany {
                modifier: self.to_string(),
                requested: self.value,
                available,
            }
            .into());
        }

        match self.select {
            Select::High => target.rolls.sort_by(|a, b| b.value.cmp(&a.value)),
            Select::Low => target.rolls.sort_by(|a, b| a.value.cmp(&b.value)),
        }
        let discarded = target.rolls.split_off(keep);
        debug!(modifier = %self, kept = keep, discarded = discarded.len(), "keep applied");
        target.discarded_rolls.push(discarded);
        Ok(())
    }
}

impl Modify for Reroll {
    fn check(&self, sides: NonZeroUInt) -> RResult<()> {
        if is_degenerate(self.select, self.value, sides) {
            return Err(ModifierError::InfiniteReroll(self.to_string()).into());
        }
        Ok(())
    }

    fn apply<R: Roller>(
        &self,
        ctx: &mut RollContext<R>,
        target: &mut DiceExpression,
    ) -> RResult<()> {
        let sides = target.dice_size;
        self.check(sides)?;

        for roll in &mut target.rolls {
            while meets(self.select, self.value, roll.value) {
                roll.reroll_times += 1;
                roll.value = ctx.roll_one(sides)?;
            }
        }
        debug!(modifier = %self, "reroll applied");
        Ok(())
    }
}
