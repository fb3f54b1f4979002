use crate::common::Delimiter;
use crate::parse::ParsedToken;
use crate::roll::{DiceExpression, Number, Roll};
use crate::RollOutcome;

/// Renders a roll breakdown as text. Every hook can be overridden.
pub trait Stringify {
    fn stringify(&mut self, outcome: &RollOutcome) -> String {
        self.str_outcome(outcome)
    }

    fn str_outcome(&mut self, outcome: &RollOutcome) -> String {
        let tokens = self.str_breakdown(&outcome.breakdown);
        let result = self.str_result(outcome.result);
        format!("{} = {}", tokens, result)
    }

    fn str_breakdown(&mut self, tokens: &[ParsedToken]) -> String {
        let mut ret = String::new();
        let mut after_open = true;
        for token in tokens {
            let is_close = matches!(token, ParsedToken::Delimiter(Delimiter::Close));
            if !after_open && !is_close {
                ret.push(' ');
            }
            ret.push_str(&self.str_token(token));
            after_open = matches!(token, ParsedToken::Delimiter(Delimiter::Open));
        }
        ret
    }

    fn str_token(&mut self, token: &ParsedToken) -> String {
        match token {
            ParsedToken::DiceExpr(dice) => self.str_dice(dice),
            other => other.to_string(),
        }
    }

    fn str_dice(&mut self, dice: &DiceExpression) -> String {
        let mut rolls: Vec<_> = dice.rolls.iter().map(|r| self.str_roll(r, true)).collect();
        rolls.extend(dice.discarded().map(|r| self.str_roll(r, false)));
        format!("{} ({})", dice, rolls.join(", "))
    }

    fn str_roll(&mut self, roll: &Roll, _kept: bool) -> String {
        roll.to_string()
    }

    fn str_result(&mut self, result: Number) -> String {
        result.to_string()
    }
}

#[derive(Default)]
pub struct SimpleStringifier;

impl SimpleStringifier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Stringify for SimpleStringifier {}

/// Strikes through discarded dice and puts the total in backticks.
#[derive(Default)]
pub struct MarkdownStringifier;

impl MarkdownStringifier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Stringify for MarkdownStringifier {
    fn str_roll(&mut self, roll: &Roll, kept: bool) -> String {
        if kept {
            roll.to_string()
        } else {
            format!("~~{}~~", roll)
        }
    }

    fn str_result(&mut self, result: Number) -> String {
        format!("`{}`", result)
    }
}
