use super::shunting::PostfixToken;
use crate::common::BinaryOperator;
use crate::error::{RResult, RollError};
use crate::roll::Number;

/// Checks that a postfix sequence reduces to exactly one value.
///
/// Operands count +1 and operators -1. The running count must stay at least 1 once the
/// first token is read, and must end at exactly 1.
pub fn validate(postfix: &[PostfixToken]) -> RResult<()> {
    let mut valence: isize = 0;
    for token in postfix {
        match token {
            PostfixToken::Operand(_) => valence += 1,
            PostfixToken::Operator(op) => {
                valence -= 1;
                if valence < 1 {
                    return Err(RollError::invalid_expression(format!(
                        "operator '{}' is missing an operand",
                        op
                    )));
                }
            }
        }
    }

    if valence == 1 {
        Ok(())
    } else {
        Err(RollError::invalid_expression(format!(
            "expected a single value, found {}",
            valence
        )))
    }
}

/// Reduces a postfix sequence to its value.
pub fn evaluate(postfix: &[PostfixToken]) -> RResult<Number> {
    let mut stack: Vec<Number> = Vec::new();

    for token in postfix {
        match *token {
            PostfixToken::Operand(x) => stack.push(x),
            PostfixToken::Operator(op) => {
                let a = stack.pop();
                let b = stack.pop();
                let (a, b) = a.zip(b).ok_or_else(|| {
                    RollError::internal(format!("operator '{}' ran out of operands", op))
                })?;
                stack.push(apply(op, b, a)?);
            }
        }
    }

    match stack.as_slice() {
        [result] => Ok(*result),
        [] => Err(RollError::internal("nothing left on the stack")),
        rest => Err(RollError::internal(format!(
            "{} values left on the stack",
            rest.len()
        ))),
    }
}

fn apply(op: BinaryOperator, left: Number, right: Number) -> RResult<Number> {
    use BinaryOperator::*;

    Ok(match op {
        Add => left + right,
        Sub => left - right,
        Mul => left * right,
        Div => {
            if right.is_zero() {
                return Err(RollError::ZeroDivision);
            } else {
                left / right
            }
        }
    })
}
