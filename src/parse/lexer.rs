use super::dice_lexer::{lex_dice, DicePart};
use crate::common::*;
use crate::error::{RResult, RollError};
use logos::{Lexer, Logos};
use std::fmt;
use tracing::trace;

/// A top-level token of a dice notation.
#[derive(Debug, Clone, PartialEq)]
pub enum RawToken<'a> {
    DiceExpr(NonEmpty<DicePart>),
    Operator(BinaryOperator),
    NumericLiteral(Int),
    Delimiter(Delimiter),
    /// Whitespace; dropped by [`tokenize`].
    Discard(&'a str),
}

impl RawToken<'_> {
    fn is_value(&self) -> bool {
        matches!(self, Self::DiceExpr(_) | Self::NumericLiteral(_))
    }
}

impl fmt::Display for RawToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DiceExpr(parts) => parts.iter().try_for_each(|p| write!(f, "{}", p)),
            Self::Operator(op) => fmt::Display::fmt(op, f),
            Self::NumericLiteral(x) => fmt::Display::fmt(x, f),
            Self::Delimiter(d) => fmt::Display::fmt(d, f),
            Self::Discard(s) => f.write_str(s),
        }
    }
}

// Rules tried while a value is acceptable. Signed literals and dice terms are only
// recognised here, which is what turns `5--3` into `5`, `-`, `-3`.
#[derive(Logos, Debug, Copy, Clone, PartialEq)]
enum ExpectOperand {
    #[regex(r"\s+")]
    Whitespace,

    #[token("(", |_| Delimiter::Open)]
    #[token(")", |_| Delimiter::Close)]
    Delimiter(Delimiter),

    #[regex(r"[+-]?([1-9][0-9]*)?d[1-9][0-9]*([ekr][lh]?[1-9][0-9]*)*")]
    DiceExpr,

    #[regex(r"[+-]?[0-9]+", |lex| lex.slice().parse())]
    NumericLiteral(Int),

    #[regex(r"[+\-*/]", |lex| operator(lex.slice()))]
    Operator(BinaryOperator),

    #[error]
    Error,
}

// Rules tried right after a value: anything but another value.
#[derive(Logos, Debug, Copy, Clone, PartialEq)]
enum ExpectOperator {
    #[regex(r"\s+")]
    Whitespace,

    #[token("(", |_| Delimiter::Open)]
    #[token(")", |_| Delimiter::Close)]
    Delimiter(Delimiter),

    #[regex(r"[+\-*/]", |lex| operator(lex.slice()))]
    Operator(BinaryOperator),

    #[error]
    Error,
}

fn operator(s: &str) -> Option<BinaryOperator> {
    s.chars().next().and_then(BinaryOperator::from_char)
}

enum LexState<'s> {
    ExpectOperand(Lexer<'s, ExpectOperand>),
    ExpectOperator(Lexer<'s, ExpectOperator>),
}

/// Splits `s` into top-level tokens, whitespace included.
pub fn lex(s: &str) -> RResult<Vec<RawToken<'_>>> {
    let mut tokens = Vec::new();
    let mut state = LexState::ExpectOperand(ExpectOperand::lexer(s));

    loop {
        state = match state {
            LexState::ExpectOperand(mut lex) => {
                let token = match lex.next() {
                    Some(token) => token,
                    None => break,
                };
                let raw = match token {
                    ExpectOperand::Whitespace => RawToken::Discard(lex.slice()),
                    ExpectOperand::Delimiter(d) => RawToken::Delimiter(d),
                    ExpectOperand::DiceExpr => {
                        RawToken::DiceExpr(lex_dice(lex.slice(), lex.span().start)?)
                    }
                    ExpectOperand::NumericLiteral(x) => RawToken::NumericLiteral(x),
                    ExpectOperand::Operator(op) => RawToken::Operator(op),
                    ExpectOperand::Error => return Err(RollError::tokenize(s, lex.span().start)),
                };
                trace!(token = %raw, "lexed");
                let next = if raw.is_value() {
                    LexState::ExpectOperator(lex.morph())
                } else {
                    LexState::ExpectOperand(lex)
                };
                tokens.push(raw);
                next
            }
            LexState::ExpectOperator(mut lex) => {
                let token = match lex.next() {
                    Some(token) => token,
                    None => break,
                };
                match token {
                    ExpectOperator::Whitespace => {
                        tokens.push(RawToken::Discard(lex.slice()));
                        LexState::ExpectOperator(lex)
                    }
                    ExpectOperator::Delimiter(d) => {
                        tokens.push(RawToken::Delimiter(d));
                        LexState::ExpectOperator(lex)
                    }
                    ExpectOperator::Operator(op) => {
                        trace!(token = %op, "lexed");
                        tokens.push(RawToken::Operator(op));
                        LexState::ExpectOperand(lex.morph())
                    }
                    ExpectOperator::Error => return Err(RollError::tokenize(s, lex.span().start)),
                }
            }
        };
    }

    Ok(tokens)
}

/// Splits a dice notation into tokens, dropping whitespace.
pub fn tokenize(s: &str) -> RResult<Vec<RawToken<'_>>> {
    let mut tokens = lex(s)?;
    tokens.retain(|t| !matches!(t, RawToken::Discard(_)));
    Ok(tokens)
}
