//! Keyword trigger routing.
//!
//! Incoming message text is matched against an ordered list of bindings.
//! Matching is a case-sensitive substring test, scoped by the channel
//! context the message arrived in. The first binding registered wins; a
//! message that matches nothing is ignored by callers, not an error.

use crate::flows::catalog::FlowKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MessageContext {
    DirectMessage,
    DirectMention,
    Mention,
}

impl MessageContext {
    pub const ALL: [MessageContext; 3] =
        [Self::DirectMessage, Self::DirectMention, Self::Mention];
}

/// Canned single-turn responses. Rendering lives with the chat surface;
/// routing only needs the tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StaticReply {
    Greeting,
    Help,
    SongLyrics,
    FavoriteSong,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Handler {
    Static(StaticReply),
    Conversation(FlowKind),
}

#[derive(Clone, Debug)]
pub struct TriggerBinding {
    keywords: Vec<String>,
    contexts: Vec<MessageContext>,
    pub handler: Handler,
}

impl TriggerBinding {
    pub fn new<K>(keywords: K, contexts: &[MessageContext], handler: Handler) -> Self
    where
        K: IntoIterator,
        K::Item: Into<String>,
    {
        Self {
            keywords: keywords.into_iter().map(Into::into).collect(),
            contexts: contexts.to_vec(),
            handler,
        }
    }

    fn matches(&self, text: &str, context: MessageContext) -> bool {
        self.contexts.contains(&context)
            && self.keywords.iter().any(|keyword| text.contains(keyword.as_str()))
    }
}

#[derive(Clone, Debug, Default)]
pub struct TriggerRegistry {
    bindings: Vec<TriggerBinding>,
}

impl TriggerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<K>(&mut self, keywords: K, contexts: &[MessageContext], handler: Handler)
    where
        K: IntoIterator,
        K::Item: Into<String>,
    {
        self.bindings.push(TriggerBinding::new(keywords, contexts, handler));
    }

    /// First binding (in registration order) whose keyword set and context
    /// set both match, or `None`.
    pub fn resolve(&self, text: &str, context: MessageContext) -> Option<&TriggerBinding> {
        self.bindings.iter().find(|binding| binding.matches(text, context))
    }

    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }
}

/// The shipped binding table. `restraunt` is the product's historical
/// spelling and users type it; keep it.
pub fn default_registry() -> TriggerRegistry {
    let mut registry = TriggerRegistry::new();
    registry.register(
        ["hello", "hi", "howdy"],
        &MessageContext::ALL,
        Handler::Static(StaticReply::Greeting),
    );
    registry.register(["help"], &MessageContext::ALL, Handler::Static(StaticReply::Help));
    registry.register(["sing"], &MessageContext::ALL, Handler::Static(StaticReply::SongLyrics));
    registry.register(
        ["favorite song"],
        &MessageContext::ALL,
        Handler::Static(StaticReply::FavoriteSong),
    );
    registry.register(["duel"], &MessageContext::ALL, Handler::Conversation(FlowKind::Duel));
    registry.register(
        ["hungry", "food", "restraunt"],
        &MessageContext::ALL,
        Handler::Conversation(FlowKind::Dining),
    );
    registry
}
