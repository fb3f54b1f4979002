mod ctx;
mod dice;
mod modifier;
mod num;
pub(crate) mod roller;

pub use ctx::{DefaultRoller, RollContext, DEFAULT_MAX_ROLLS};
pub use dice::{DiceExpression, Roll};
pub use modifier::{DiceModifier, Explode, Keep, Modify, Reroll};
pub use num::Number;
pub use roller::Roller;
