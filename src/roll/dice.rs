use super::{
    ctx::RollContext,
    modifier::{DiceModifier, Modify},
    roller::Roller,
};
use crate::common::*;
use crate::error::{RResult, RollError};
use crate::parse::DicePart;
use std::fmt;
use tracing::debug;

/// A single die of a dice term.
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Roll {
    /// Current contribution of the die: the sum of `explosions` if it exploded,
    /// otherwise the last face drawn for it.
    pub value: Int,
    pub explosions: Vec<Int>,
    pub reroll_times: usize,
}

impl Roll {
    pub fn new(value: Int) -> Self {
        Self {
            value,
            explosions: Vec::new(),
            reroll_times: 0,
        }
    }

    pub fn exploded(&self) -> bool {
        !self.explosions.is_empty()
    }

    pub fn rerolled(&self) -> bool {
        self.reroll_times > 0
    }
}

impl fmt::Display for Roll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.exploded() {
            let faces = self
                .explosions
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("!");
            f.write_str(&faces)?;
        } else {
            write!(f, "{}", self.value)?;
        }
        if self.rerolled() {
            write!(f, "r{}", self.reroll_times)?;
        }
        Ok(())
    }
}

/// A fully rolled dice term such as `-4d6kh3`.
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiceExpression {
    pub sign: Sign,
    pub dice_amount: Num,
    pub dice_size: NonZeroUInt,
    pub modifiers: Vec<DiceModifier>,
    pub rolls: Vec<Roll>,
    pub discarded_rolls: Vec<Vec<Roll>>,
    pub sum: Int,
}

impl DiceExpression {
    /// Rolls `amount` fresh dice with no modifiers applied yet.
    pub fn roll_new<R: Roller>(
        ctx: &mut RollContext<R>,
        sign: Sign,
        amount: Num,
        size: NonZeroUInt,
    ) -> RResult<Self> {
        let rolls: Vec<_> = ctx
            .roll(amount.get(), size)?
            .into_iter()
            .map(Roll::new)
            .collect();
        let mut ret = Self {
            sign,
            dice_amount: amount,
            dice_size: size,
            modifiers: Vec::new(),
            rolls,
            discarded_rolls: Vec::new(),
            sum: 0,
        };
        ret.sum = ret.total();
        Ok(ret)
    }

    /// Resolves the parts of one dice term in source order.
    pub fn evaluate<R: Roller>(ctx: &mut RollContext<R>, parts: &[DicePart]) -> RResult<Self> {
        Self::check_parts(parts)?;

        let mut sign = Sign::Pos;
        let mut expr: Option<Self> = None;

        for part in parts {
            match *part {
                DicePart::Sign(s) => sign = s,
                DicePart::Dice { count, size } => {
                    expr = Some(Self::roll_new(ctx, sign, count, size)?);
                }
                DicePart::Modifier(modifier) => {
                    let target = expr.as_mut().ok_or_else(|| {
                        RollError::internal(format!("modifier {} precedes its dice", modifier))
                    })?;
                    modifier.apply(ctx, target)?;
                    target.modifiers.push(modifier);
                }
            }
        }

        let mut ret = expr.ok_or_else(|| RollError::internal("dice term without dice"))?;
        ret.sign = sign;
        ret.sum = ret.total();
        debug!(term = %ret, sum = ret.sum, rolls = ?ret.rolls, "dice term rolled");
        Ok(ret)
    }

    fn check_parts(parts: &[DicePart]) -> RResult<()> {
        let mut sides = None;
        for part in parts {
            match part {
                DicePart::Sign(_) => {}
                DicePart::Dice { size, .. } => sides = Some(*size),
                DicePart::Modifier(modifier) => match sides {
                    Some(sides) => modifier.check(sides)?,
                    None => {
                        return Err(RollError::internal(format!(
                            "modifier {} precedes its dice",
                            modifier
                        )))
                    }
                },
            }
        }
        Ok(())
    }

    /// Signed sum of the rolls that are still kept.
    pub fn total(&self) -> Int {
        self.sign.apply(self.rolls.iter().map(|r| r.value).sum())
    }

    pub fn discarded(&self) -> impl Iterator<Item = &Roll> + '_ {
        self.discarded_rolls.iter().flatten()
    }

    /// Number of dice accounted for, kept or discarded.
    pub fn dice_count(&self) -> usize {
        self.rolls.len() + self.discarded_rolls.iter().map(Vec::len).sum::<usize>()
    }
}

impl fmt::Display for DiceExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sign == Sign::Neg {
            write!(f, "{}", self.sign)?;
        }
        write!(f, "{}d{}", self.dice_amount, self.dice_size)?;
        for modifier in &self.modifiers {
            write!(f, "{}", modifier)?;
        }
        Ok(())
    }
}
