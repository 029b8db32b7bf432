//! The two shipped dialogue scripts.

use crate::flows::steps::{Branch, FlowScript, Step, Terminal};

pub const FOOD_TERM: &str = "food_term";
pub const LOCATION_TERM: &str = "location_term";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlowKind {
    Duel,
    Dining,
}

impl FlowKind {
    /// Sent immediately when the conversation starts, before the first
    /// prompt.
    pub fn entry_line(&self) -> &'static str {
        match self {
            Self::Duel => "It's high noon...",
            Self::Dining => "Howdy there partner!",
        }
    }

    pub fn script(&self) -> FlowScript {
        match self {
            Self::Duel => duel_script(),
            Self::Dining => dining_script(),
        }
    }
}

fn duel_script() -> FlowScript {
    FlowScript::new(vec![
        Step {
            prompt: "You sure you want to duel partner?".to_owned(),
            capture_as: None,
            on_negative: Some(Branch::End(Terminal::Say("Wise choice...".to_owned()))),
            on_affirmative: Branch::Advance,
        },
        Step {
            prompt: "old-town-bot looks at you in the eyes as the clock ticks closer to noon, \
                     then you hear the bell tolls. Do you draw?"
                .to_owned(),
            capture_as: None,
            on_negative: Some(Branch::End(Terminal::Say(
                "BAM! You are shot dead by old-town-bot. Long live the bots!".to_owned(),
            ))),
            on_affirmative: Branch::End(Terminal::Say(
                "BAM! You shot old-town-bot but another replaces it :)".to_owned(),
            )),
        },
    ])
}

fn dining_script() -> FlowScript {
    FlowScript::new(vec![
        Step {
            prompt: "Want some food recommendation?".to_owned(),
            capture_as: None,
            on_negative: Some(Branch::End(Terminal::Say("Oh well, maybe next time!".to_owned()))),
            on_affirmative: Branch::Advance,
        },
        Step {
            prompt: "What kind of food you feeling?".to_owned(),
            capture_as: Some(FOOD_TERM),
            on_negative: None,
            on_affirmative: Branch::Advance,
        },
        Step {
            prompt: "What is your address?".to_owned(),
            capture_as: Some(LOCATION_TERM),
            on_negative: None,
            on_affirmative: Branch::End(Terminal::Search {
                term_field: FOOD_TERM,
                location_field: LOCATION_TERM,
            }),
        },
    ])
}

#[cfg(test)]
mod tests {
    use super::{FlowKind, FOOD_TERM, LOCATION_TERM};
    use crate::flows::steps::{Branch, Terminal};

    #[test]
    fn duel_script_has_two_steps_and_no_captures() {
        let script = FlowKind::Duel.script();
        assert_eq!(script.len(), 2);
        for index in 0..script.len() {
            assert!(script.step(index).expect("step exists").capture_as.is_none());
        }
    }

    #[test]
    fn dining_script_ends_in_a_search_over_both_captures() {
        let script = FlowKind::Dining.script();
        assert_eq!(script.len(), 3);
        assert_eq!(script.step(1).expect("food step").capture_as, Some(FOOD_TERM));
        let last = script.step(2).expect("address step");
        assert_eq!(last.capture_as, Some(LOCATION_TERM));
        assert_eq!(
            last.on_affirmative,
            Branch::End(Terminal::Search { term_field: FOOD_TERM, location_field: LOCATION_TERM })
        );
    }

    #[test]
    fn entry_lines_match_the_shipped_personality() {
        assert_eq!(FlowKind::Duel.entry_line(), "It's high noon...");
        assert_eq!(FlowKind::Dining.entry_line(), "Howdy there partner!");
    }
}
