use super::lexer::RawToken;
use crate::common::*;
use crate::error::{RResult, RollError};
use crate::roll::{DiceExpression, RollContext, Roller};
use std::fmt;

/// A classified token. Dice terms are already rolled at this point.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParsedToken {
    NumericLiteral(Int),
    Operator(BinaryOperator),
    Delimiter(Delimiter),
    DiceExpr(DiceExpression),
}

impl ParsedToken {
    /// The operand value, for literals and dice terms.
    pub fn value(&self) -> Option<Int> {
        match self {
            Self::NumericLiteral(x) => Some(*x),
            Self::DiceExpr(dice) => Some(dice.sum),
            Self::Operator(_) | Self::Delimiter(_) => None,
        }
    }
}

impl fmt::Display for ParsedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NumericLiteral(x) => fmt::Display::fmt(x, f),
            Self::Operator(op) => fmt::Display::fmt(op, f),
            Self::Delimiter(d) => fmt::Display::fmt(d, f),
            Self::DiceExpr(dice) => fmt::Display::fmt(dice, f),
        }
    }
}

/// Classifies raw tokens, rolling every dice term on the way.
pub fn classify<R: Roller>(
    tokens: &[RawToken<'_>],
    ctx: &mut RollContext<R>,
) -> RResult<Vec<ParsedToken>> {
    tokens
        .iter()
        .map(|token| {
            Ok(match token {
                RawToken::NumericLiteral(x) => ParsedToken::NumericLiteral(*x),
                RawToken::Operator(op) => ParsedToken::Operator(*op),
                RawToken::Delimiter(d) => ParsedToken::Delimiter(*d),
                RawToken::DiceExpr(parts) => {
                    ParsedToken::DiceExpr(DiceExpression::evaluate(ctx, parts)?)
                }
                RawToken::Discard(s) => {
                    return Err(RollError::internal(format!(
                        "there shouldn't be a discarded token {:?} here",
                        s
                    )))
                }
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::tokenize;
    use crate::roll::roller::SequenceRoller;

    fn classify_str(s: &str, faces: &[UInt]) -> RResult<Vec<ParsedToken>> {
        let mut ctx = RollContext::new_unbounded(SequenceRoller::new(faces));
        classify(&tokenize(s)?, &mut ctx)
    }

    #[test]
    fn test_classify_arithmetic() {
        let tokens = classify_str("(1 + 2) * -3", &[1]).unwrap();
        assert_eq!(
            tokens,
            vec![
                ParsedToken::Delimiter(Delimiter::Open),
                ParsedToken::NumericLiteral(1),
                ParsedToken::Operator(BinaryOperator::Add),
                ParsedToken::NumericLiteral(2),
                ParsedToken::Delimiter(Delimiter::Close),
                ParsedToken::Operator(BinaryOperator::Mul),
                ParsedToken::NumericLiteral(-3),
            ]
        );
    }

    #[test]
    fn test_classify_rolls_dice_eagerly() {
        let tokens = classify_str("2d6k1 + 1d4", &[6, 1, 3]).unwrap();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].value(), Some(6));
        assert_eq!(tokens[2].value(), Some(3));
        assert_eq!(tokens[1].value(), None);
        assert_eq!(tokens[0].to_string(), "2d6k1");
    }

    #[test]
    fn test_operator_precedence() {
        assert_eq!(BinaryOperator::Add.precedence(), 1);
        assert_eq!(BinaryOperator::Sub.precedence(), 1);
        assert_eq!(BinaryOperator::Mul.precedence(), 2);
        assert_eq!(BinaryOperator::Div.precedence(), 2);
    }

    #[test]
    fn test_discard_is_internal_error() {
        let mut ctx = RollContext::new_unbounded(SequenceRoller::constant(1));
        let tokens = [RawToken::NumericLiteral(1), RawToken::Discard(" ")];
        assert!(matches!(
            classify(&tokens, &mut ctx),
            Err(RollError::Internal(_))
        ));
    }

    #[test]
    fn test_modifier_errors_propagate() {
        assert!(matches!(
            classify_str("1 + 3d6k4", &[2]),
            Err(RollError::Modifier(_))
        ));
    }
}
