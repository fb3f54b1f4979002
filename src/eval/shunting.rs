use crate::common::*;
use crate::error::{RResult, RollError};
use crate::parse::ParsedToken;
use crate::roll::Number;
use std::fmt;
use tracing::trace;

/// A token of the postfix (RPN) form. Parentheses never survive conversion.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PostfixToken {
    Operand(Number),
    Operator(BinaryOperator),
}

impl fmt::Display for PostfixToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Operand(x) => fmt::Display::fmt(x, f),
            Self::Operator(op) => fmt::Display::fmt(op, f),
        }
    }
}

fn flush(output: &mut Vec<PostfixToken>, frame: Vec<BinaryOperator>) {
    output.extend(frame.into_iter().rev().map(PostfixToken::Operator));
}

/// Reorders classified tokens into postfix form.
///
/// Each open parenthesis gets its own operator stack, so `frames[depth]` only ever holds
/// operators written at that depth. An operator is stacked unless the top of its frame binds
/// tighter, in which case the whole frame is flushed first. Operators of equal precedence
/// therefore stack up and are emitted last-pushed-first: `10 - 2 - 3` becomes `10 2 3 - -`.
/// A `)` flushes its frame; at the end of input only the innermost frame still open is
/// flushed.
pub fn to_postfix(tokens: &[ParsedToken]) -> RResult<Vec<PostfixToken>> {
    let mut output = Vec::with_capacity(tokens.len());
    let mut frames: NonEmpty<Vec<BinaryOperator>> = vec1![Vec::new()];

    for token in tokens {
        match token {
            ParsedToken::NumericLiteral(x) => output.push(PostfixToken::Operand((*x).into())),
            ParsedToken::DiceExpr(dice) => output.push(PostfixToken::Operand(dice.sum.into())),
            ParsedToken::Operator(op) => {
                let frame = frames.last_mut();
                // a looser operator closes off everything stacked at this depth
                if frame.last().map_or(false, |top| top.precedence() > op.precedence()) {
                    flush(&mut output, std::mem::take(frame));
                }
                frame.push(*op);
            }
            ParsedToken::Delimiter(Delimiter::Open) => frames.push(Vec::new()),
            ParsedToken::Delimiter(Delimiter::Close) => {
                let frame = frames
                    .pop()
                    .map_err(|_| RollError::invalid_expression("unmatched ')'"))?;
                flush(&mut output, frame);
            }
        }
    }

    let last = std::mem::take(frames.last_mut());
    flush(&mut output, last);

    trace!(postfix = ?output, "converted to postfix");
    Ok(output)
}
