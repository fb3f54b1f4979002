use crate::common::UInt;
use thiserror::Error;

pub type RResult<T> = Result<T, RollError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RollError {
    #[error("unable to tokenize at {position} --> {remaining:?}")]
    Tokenize {
        /// 1-based offset of the first character no rule could consume.
        position: usize,
        remaining: String,
    },
    #[error("{0}")]
    Modifier(#[from] ModifierError),
    #[error("invalid expression: {0}")]
    InvalidExpression(String),
    #[error("too many dice rolled")]
    TooManyRolls,
    #[error("cannot divide by zero")]
    ZeroDivision,
    #[error("internal evaluation error: {0}")]
    Internal(String),
}

impl RollError {
    pub fn tokenize(source: &str, offset: usize) -> Self {
        Self::Tokenize {
            position: offset + 1,
            remaining: source[offset..].to_owned(),
        }
    }

    pub fn invalid_expression(msg: impl ToString) -> Self {
        Self::InvalidExpression(msg.to_string())
    }

    pub fn internal(msg: impl ToString) -> Self {
        Self::Internal(msg.to_string())
    }
}

#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum ModifierError {
    #[error("infinite explode recursion on {0}")]
    InfiniteExplode(String),
    #[error("infinite reroll recursion on {0}")]
    InfiniteReroll(String),
    #[error("you can't keep less than 1 -> {0}")]
    KeepTooFew(String),
    #[error("you can't keep more dice than you have -> {modifier} (requested {requested}, have {available})")]
    KeepTooMany {
        modifier: String,
        requested: UInt,
        available: usize,
    },
}
