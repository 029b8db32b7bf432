pub mod catalog;
pub mod engine;
pub mod steps;

pub use catalog::FlowKind;
pub use engine::{ConversationInstance, FlowError, TurnOutcome};
pub use steps::{Branch, FlowEffect, FlowScript, Step, Terminal};
