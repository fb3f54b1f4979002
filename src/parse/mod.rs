//! Turning notation text into classified tokens.

mod classify;
mod dice_lexer;
mod lexer;

pub use classify::{classify, ParsedToken};
pub use dice_lexer::{lex_dice, DicePart};
pub use lexer::{lex, tokenize, RawToken};
