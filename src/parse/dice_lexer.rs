use crate::common::*;
use crate::error::{RResult, RollError};
use crate::roll::{DiceModifier, Explode, Keep, Reroll};
use logos::{Lexer, Logos};
use std::fmt;

/// One piece of a dice term, in the order it was written.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DicePart {
    Sign(Sign),
    Dice { count: Num, size: NonZeroUInt },
    Modifier(DiceModifier),
}

impl fmt::Display for DicePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sign(s) => fmt::Display::fmt(s, f),
            Self::Dice { count, size } => write!(f, "{}d{}", count, size),
            Self::Modifier(m) => fmt::Display::fmt(m, f),
        }
    }
}

#[derive(Logos, Debug, Copy, Clone, PartialEq)]
enum PartToken {
    #[regex(r"[+-]", sign)]
    Sign(Sign),

    #[regex(r"([1-9][0-9]*)?d[1-9][0-9]*", dice)]
    Dice((Num, NonZeroUInt)),

    #[regex(r"e[lh]?[1-9][0-9]*", |lex| Explode::parse(lex.slice()))]
    Explode(Explode),
    #[regex(r"k[lh]?[1-9][0-9]*", |lex| Keep::parse(lex.slice()))]
    Keep(Keep),
    #[regex(r"r[lh]?[1-9][0-9]*", |lex| Reroll::parse(lex.slice()))]
    Reroll(Reroll),

    #[error]
    Error,
}

fn sign(lex: &mut Lexer<PartToken>) -> Option<Sign> {
    lex.slice().chars().next().and_then(Sign::from_char)
}

fn dice(lex: &mut Lexer<PartToken>) -> Option<(Num, NonZeroUInt)> {
    let (num, size) = lex.slice().split_once('d')?;
    let num = if num.is_empty() {
        Num::new(1)?
    } else {
        num.parse().ok()?
    };
    Some((num, size.parse().ok()?))
}

/// Splits the text of a single dice term into its parts.
///
/// There is no whitespace rule here: every character has to belong to a part. `offset` is
/// the position of `s` inside the whole notation and is only used for error reporting.
pub fn lex_dice(s: &str, offset: usize) -> RResult<NonEmpty<DicePart>> {
    let mut lex = PartToken::lexer(s);
    let mut parts = Vec::new();
    while let Some(token) = lex.next() {
        let part = match token {
            PartToken::Sign(x) => DicePart::Sign(x),
            PartToken::Dice((count, size)) => DicePart::Dice { count, size },
            PartToken::Explode(x) => DicePart::Modifier(x.into()),
            PartToken::Keep(x) => DicePart::Modifier(x.into()),
            PartToken::Reroll(x) => DicePart::Modifier(x.into()),
            PartToken::Error => {
                let start = lex.span().start;
                return Err(RollError::Tokenize {
                    position: offset + start + 1,
                    remaining: s[start..].to_owned(),
                });
            }
        };
        parts.push(part);
    }
    NonEmpty::try_from_vec(parts).map_err(|_| RollError::internal("empty dice term"))
}
