//! The conversation engine: one `ConversationInstance` per in-flight
//! dialogue, advanced by discrete replies.
//!
//! State is the current step index plus the captured-field map, both owned
//! by the instance. Suspension between turns is implicit: the instance sits
//! in the hosting session's map until the next reply arrives. Ended
//! instances are single-shot; advancing them again is a no-op.

use std::collections::HashMap;

use thiserror::Error;

use crate::flows::steps::{Branch, FlowEffect, FlowScript, Terminal};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FlowError {
    #[error("flow script has no steps")]
    EmptyScript,
    #[error("flow script ran out of steps after index {last_step}")]
    ScriptExhausted { last_step: usize },
    #[error("terminal action references uncaptured field `{field}`")]
    MissingCapture { field: &'static str },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnOutcome {
    pub effects: Vec<FlowEffect>,
    pub ended: bool,
}

#[derive(Clone, Debug)]
pub struct ConversationInstance {
    script: FlowScript,
    step_index: usize,
    captured: HashMap<&'static str, String>,
    ended: bool,
}

/// A reply is negative iff its trimmed text case-insensitively equals one
/// of the negation words. Everything else, empty and irrelevant text
/// included, continues the flow. Intentionally loose; the shipped dialogues
/// rely on it.
fn is_negative(reply: &str) -> bool {
    let normalized = reply.trim();
    normalized.eq_ignore_ascii_case("no") || normalized.eq_ignore_ascii_case("nah")
}

impl ConversationInstance {
    /// Begin a conversation: emit the first step's prompt and suspend.
    pub fn start(script: FlowScript) -> Result<(Self, Vec<FlowEffect>), FlowError> {
        let first = script.step(0).ok_or(FlowError::EmptyScript)?;
        let effects = vec![FlowEffect::Prompt(first.prompt.clone())];

        Ok((Self { script, step_index: 0, captured: HashMap::new(), ended: false }, effects))
    }

    /// Feed the next reply into the current step.
    pub fn advance(&mut self, reply: &str) -> Result<TurnOutcome, FlowError> {
        if self.ended {
            return Ok(TurnOutcome { effects: Vec::new(), ended: true });
        }

        let step = self
            .script
            .step(self.step_index)
            .ok_or(FlowError::ScriptExhausted { last_step: self.step_index })?;

        if let Some(field) = step.capture_as {
            self.captured.insert(field, reply.to_owned());
        }

        let branch = if is_negative(reply) {
            step.on_negative.as_ref().unwrap_or(&step.on_affirmative)
        } else {
            &step.on_affirmative
        };

        match branch.clone() {
            Branch::Advance => {
                let next_index = self.step_index + 1;
                let next = self
                    .script
                    .step(next_index)
                    .ok_or(FlowError::ScriptExhausted { last_step: self.step_index })?;
                let prompt = next.prompt.clone();
                self.step_index = next_index;
                Ok(TurnOutcome { effects: vec![FlowEffect::Prompt(prompt)], ended: false })
            }
            Branch::End(terminal) => {
                self.ended = true;
                let effect = self.terminal_effect(terminal)?;
                Ok(TurnOutcome { effects: vec![effect], ended: true })
            }
        }
    }

    pub fn has_ended(&self) -> bool {
        self.ended
    }

    pub fn captured(&self, field: &str) -> Option<&str> {
        self.captured.get(field).map(String::as_str)
    }

    fn terminal_effect(&self, terminal: Terminal) -> Result<FlowEffect, FlowError> {
        match terminal {
            Terminal::Say(text) => Ok(FlowEffect::Say(text)),
            Terminal::Search { term_field, location_field } => {
                let term = self
                    .captured
                    .get(term_field)
                    .cloned()
                    .ok_or(FlowError::MissingCapture { field: term_field })?;
                let location = self
                    .captured
                    .get(location_field)
                    .cloned()
                    .ok_or(FlowError::MissingCapture { field: location_field })?;
                Ok(FlowEffect::Search { term, location })
            }
        }
    }
}
