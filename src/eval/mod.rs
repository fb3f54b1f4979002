//! Arithmetic over classified tokens: postfix conversion, validation and reduction.

mod postfix;
mod shunting;

pub use postfix::{evaluate, validate};
pub use shunting::{to_postfix, PostfixToken};
