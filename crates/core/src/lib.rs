pub mod config;
pub mod flows;
pub mod triggers;

pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use flows::catalog::FlowKind;
pub use flows::engine::{ConversationInstance, FlowError, TurnOutcome};
pub use flows::steps::{Branch, FlowEffect, FlowScript, Step, Terminal};
pub use triggers::{
    default_registry, Handler, MessageContext, StaticReply, TriggerBinding, TriggerRegistry,
};
