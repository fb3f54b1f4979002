//! Rolls dice notation such as `2d6k1+1d20e20-3`.
//!
//! A notation is tokenized, its dice terms are rolled, and the remaining arithmetic is
//! converted to postfix form, validated and reduced. The caller gets the classified tokens
//! back, with every die rolled, alongside the final value.
//!
//! ```
//! use dice_rpn::{roll_with, Number, RollContext};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut ctx = RollContext::new_unbounded(StdRng::seed_from_u64(42));
//! let outcome = roll_with("(1 + 2) * 3", &mut ctx).unwrap();
//! assert_eq!(outcome.result, Number::Int(9));
//! ```

pub mod common;
mod error;
pub mod eval;
pub mod parse;
pub mod roll;
pub mod stringify;

pub use error::{ModifierError, RResult, RollError};
pub use parse::ParsedToken;
pub use roll::{DiceExpression, Number, Roll, RollContext, Roller};
pub use stringify::{MarkdownStringifier, SimpleStringifier, Stringify};

use tracing::debug;

/// The outcome of rolling a notation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RollOutcome {
    /// Every classified token, in source order, with dice terms fully rolled.
    pub breakdown: Vec<ParsedToken>,
    pub result: Number,
}

impl RollOutcome {
    pub fn into_parts(self) -> (Vec<ParsedToken>, Number) {
        (self.breakdown, self.result)
    }

    pub fn render<S: Stringify + Default>(&self) -> String {
        S::default().stringify(self)
    }
}

/// Rolls `notation` with the thread-local RNG and the default roll cap.
pub fn roll(notation: &str) -> RResult<RollOutcome> {
    roll_with(notation, &mut RollContext::<roll::DefaultRoller>::default())
}

/// Rolls `notation` with the random source held by `ctx`.
///
/// # Errors
/// Fails on unrecognised syntax, degenerate modifiers, malformed arithmetic, division by
/// zero, or when `ctx` runs past its roll cap. Nothing is returned for a failed roll.
pub fn roll_with<R: Roller>(notation: &str, ctx: &mut RollContext<R>) -> RResult<RollOutcome> {
    ctx.reset();

    let tokens = parse::tokenize(notation)?;
    let breakdown = parse::classify(&tokens, ctx)?;
    let postfix = eval::to_postfix(&breakdown)?;
    eval::validate(&postfix)?;
    let result = eval::evaluate(&postfix)?;

    debug!(notation, %result, rolls = ctx.rolls(), "rolled");
    Ok(RollOutcome { breakdown, result })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{Int, UInt};
    use crate::roll::roller::{SequenceRoller, StepRoller};
    use proptest::prelude::*;

    fn ctx(faces: &[UInt]) -> RollContext<SequenceRoller> {
        RollContext::new_unbounded(SequenceRoller::new(faces))
    }

    fn check(s: &str, faces: &[UInt], expected: Number) {
        let outcome = roll_with(s, &mut ctx(faces)).unwrap();
        assert_eq!(outcome.result, expected, "rolling {:?}", s);
    }

    fn check_err(s: &str, expected: RollError) {
        assert_eq!(roll_with(s, &mut ctx(&[1])), Err(expected), "rolling {:?}", s);
    }

    fn dice(token: &ParsedToken) -> &DiceExpression {
        match token {
            ParsedToken::DiceExpr(dice) => dice,
            other => panic!("expected dice, found {:?}", other),
        }
    }

    #[test]
    fn test_constant_ones() {
        let outcome = roll_with("3d6", &mut ctx(&[1])).unwrap();
        assert_eq!(outcome.result, Number::Int(3));
        let rolls = &dice(&outcome.breakdown[0]).rolls;
        assert_eq!(rolls, &vec![Roll::new(1); 3]);
    }

    #[test]
    fn test_keep_highest() {
        let (breakdown, result) = roll_with("2d6k1", &mut ctx(&[6, 1])).unwrap().into_parts();
        let dice = dice(&breakdown[0]);
        assert_eq!(dice.rolls, vec![Roll::new(6)]);
        assert_eq!(dice.discarded_rolls, vec![vec![Roll::new(1)]]);
        assert_eq!(result, Number::Int(6));
    }

    #[test]
    fn test_arithmetic_only() {
        check("(1+2)*3", &[1], Number::Int(9));
        check("1 + 2 * 3", &[1], Number::Int(7));
        check("10 - 2 - 3", &[1], Number::Int(11));
        check("8 / 2 / 2", &[1], Number::Float(8.0));
        check("2 * 3 - 4 + 1", &[1], Number::Int(1));
        check("((2))", &[1], Number::Int(2));
        check("7 / 2", &[1], Number::Float(3.5));
        check("+5--3", &[1], Number::Int(8));
    }

    #[test]
    fn test_explode_scenario() {
        check("1d20e20", &[20, 1], Number::Int(21));
    }

    #[test]
    fn test_mixed_notation() {
        check("2d6k1+1d20e20-3", &[6, 1, 20, 4], Number::Int(6 + 24 - 3));
        check("+5--3d4", &[2], Number::Int(5 + 6));
        check("-d6 * (2d4kl1 + 1)", &[3, 4, 1], Number::Int(-3 * 2));
    }

    #[test]
    fn test_zero_result_is_valid() {
        check("1d6-1d6", &[4], Number::Int(0));
        check("0", &[1], Number::Int(0));
    }

    #[test]
    fn test_step_roller() {
        let mut ctx = RollContext::new_bounded(1000, StepRoller::new(common::NonZeroUInt::new(1).unwrap(), 1));
        let outcome = roll_with("4d6 + 1", &mut ctx).unwrap();
        assert_eq!(outcome.result, Number::Int(1 + 2 + 3 + 4 + 1));
    }

    #[test]
    fn test_dangling_operator() {
        assert!(matches!(
            roll_with("1+", &mut ctx(&[1])),
            Err(RollError::InvalidExpression(_))
        ));
        assert!(matches!(
            roll_with("*2", &mut ctx(&[1])),
            Err(RollError::InvalidExpression(_))
        ));
        assert!(matches!(
            roll_with("", &mut ctx(&[1])),
            Err(RollError::InvalidExpression(_))
        ));
    }

    #[test]
    fn test_mismatched_parentheses() {
        assert!(matches!(
            roll_with("2*(3+4", &mut ctx(&[1])),
            Err(RollError::InvalidExpression(_))
        ));
        assert!(matches!(
            roll_with("(1+2))", &mut ctx(&[1])),
            Err(RollError::InvalidExpression(_))
        ));
    }

    #[test]
    fn test_infinite_explode_rejected_before_rolling() {
        let mut ctx = ctx(&[6]);
        assert_eq!(
            roll_with("1d6e1", &mut ctx),
            Err(RollError::Modifier(ModifierError::InfiniteExplode("e1".into())))
        );
        assert_eq!(ctx.rolls(), 0);
        assert_eq!(ctx.roller().drawn, 0);
    }

    #[test]
    fn test_modifier_errors() {
        check_err(
            "1d6r6",
            RollError::Modifier(ModifierError::InfiniteReroll("r6".into())),
        );
        check_err(
            "1d6rh1",
            RollError::Modifier(ModifierError::InfiniteReroll("rh1".into())),
        );
        check_err(
            "1d6el6",
            RollError::Modifier(ModifierError::InfiniteExplode("el6".into())),
        );
        check_err(
            "2d6k3",
            RollError::Modifier(ModifierError::KeepTooMany {
                modifier: "k3".into(),
                requested: 3,
                available: 2,
            }),
        );
        check_err(
            "4d6k3k4",
            RollError::Modifier(ModifierError::KeepTooMany {
                modifier: "k4".into(),
                requested: 4,
                available: 3,
            }),
        );
    }

    #[test]
    fn test_tokenize_errors() {
        check_err(
            "2d6 ? 1",
            RollError::Tokenize {
                position: 5,
                remaining: "? 1".into(),
            },
        );
        assert!(matches!(
            roll_with("1d6k0", &mut ctx(&[1])),
            Err(RollError::Tokenize { .. })
        ));
    }

    #[test]
    fn test_division_by_zero() {
        check_err("1/0", RollError::ZeroDivision);
        check_err("4/(1d6-1d6)", RollError::ZeroDivision);
    }

    #[test]
    fn test_roll_cap() {
        let mut ctx = RollContext::new_bounded(10, SequenceRoller::constant(3));
        assert_eq!(roll_with("11d6", &mut ctx), Err(RollError::TooManyRolls));
        // the counter starts over for every roll
        assert!(roll_with("10d6", &mut ctx).is_ok());
        assert!(roll_with("10d6", &mut ctx).is_ok());
    }

    #[test]
    fn test_default_context() {
        let outcome = roll("3d6kh2 + 1").unwrap();
        let result = outcome.result.as_int();
        assert!((3..=13).contains(&result));
        let dice = dice(&outcome.breakdown[0]);
        assert_eq!(dice.rolls.len(), 2);
        assert_eq!(dice.dice_count(), 3);
    }

    proptest! {
        #[test]
        fn constant_roller_sums(count in 1usize..40, (sides, face) in (1u32..100).prop_flat_map(|s| (Just(s), 1..=s))) {
            let outcome = roll_with(&format!("{}d{}", count, sides), &mut ctx(&[face])).unwrap();
            prop_assert_eq!(outcome.result, Number::Int(count as Int * Int::from(face)));
        }

        #[test]
        fn keep_retains_requested(count in 1usize..20, keep in 1usize..20, seed: u64) {
            prop_assume!(keep <= count);
            let mut ctx = RollContext::new_unbounded(<rand::rngs::StdRng as rand::SeedableRng>::seed_from_u64(seed));
            let outcome = roll_with(&format!("{}d6kl{}", count, keep), &mut ctx).unwrap();
            let dice = dice(&outcome.breakdown[0]);
            prop_assert_eq!(dice.rolls.len(), keep);
            prop_assert_eq!(dice.dice_count(), count);
        }

        #[test]
        fn exploded_value_is_sum_of_explosions(count in 1usize..20, seed: u64) {
            let mut ctx = RollContext::new_unbounded(<rand::rngs::StdRng as rand::SeedableRng>::seed_from_u64(seed));
            let outcome = roll_with(&format!("{}d4e3", count), &mut ctx).unwrap();
            for roll in &dice(&outcome.breakdown[0]).rolls {
                if roll.exploded() {
                    prop_assert_eq!(roll.value, roll.explosions.iter().sum::<Int>());
                    prop_assert!(roll.explosions.len() >= 2);
                } else {
                    prop_assert!(roll.value < 3);
                }
            }
        }

        #[test]
        fn well_formed_expressions_validate(expr in arithmetic_strategy()) {
            let tokens = parse::tokenize(&expr).unwrap();
            let breakdown = parse::classify(&tokens, &mut ctx(&[1])).unwrap();
            let postfix = eval::to_postfix(&breakdown).unwrap();
            prop_assert!(eval::validate(&postfix).is_ok(), "{} -> {:?}", expr, postfix);
        }
    }

    fn arithmetic_strategy() -> impl Strategy<Value = String> {
        let leaf = prop_oneof![
            (1u16..=1000).prop_map(|n| n.to_string()),
            (1u16..=20, 2u16..=20).prop_map(|(count, size)| format!("{}d{}", count, size)),
        ];
        leaf.prop_recursive(4, 32, 2, |inner| {
            prop_oneof![
                inner.clone().prop_map(|e| format!("({})", e)),
                (inner.clone(), prop_oneof![Just("+"), Just("-"), Just("*"), Just("/")], inner)
                    .prop_map(|(l, op, r)| format!("{} {} {}", l, op, r)),
            ]
        })
    }
}
