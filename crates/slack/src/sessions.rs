//! Trigger routing plus in-flight conversations.
//!
//! One `ConversationInstance` per (channel, user) key. A message from a key
//! with an active instance advances that instance; everything else goes
//! through the trigger registry. Captured fields live inside the instance,
//! so concurrent conversations cannot see each other's answers.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::warn;

use drover_core::flows::engine::ConversationInstance;
use drover_core::flows::steps::FlowEffect;
use drover_core::triggers::{default_registry, Handler, TriggerRegistry};
use drover_search::{Business, SearchClient, StaticSearchClient};

use crate::events::{
    EventContext, EventDispatcher, EventHandlerError, HandlerResult, MessageEvent, MessageService,
};
use crate::identity::{IdentityLookup, NoopIdentityLookup};
use crate::outbound::{AttachmentCard, ChatSender, NoopChatSender, OutboundMessage, SendError};
use crate::responder::render_static_reply;

const RESULTS_HEADER: &str = "Yeewhaw, here are some food for you cowboy";
const NO_RESULTS: &str = "Did not find anything :(";
const SEARCH_UNAVAILABLE: &str = "Sorry, service not available right now!";

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct SessionKey {
    channel_id: String,
    user_id: String,
}

impl SessionKey {
    fn for_event(event: &MessageEvent) -> Self {
        Self { channel_id: event.channel_id.clone(), user_id: event.user_id.clone() }
    }
}

pub struct SessionService {
    registry: TriggerRegistry,
    sessions: Mutex<HashMap<SessionKey, ConversationInstance>>,
    sender: Arc<dyn ChatSender>,
    identity: Arc<dyn IdentityLookup>,
    search: Arc<dyn SearchClient>,
}

impl SessionService {
    pub fn new(
        registry: TriggerRegistry,
        sender: Arc<dyn ChatSender>,
        identity: Arc<dyn IdentityLookup>,
        search: Arc<dyn SearchClient>,
    ) -> Self {
        Self { registry, sessions: Mutex::new(HashMap::new()), sender, identity, search }
    }

    pub async fn active_conversation_count(&self) -> usize {
        self.sessions.lock().await.len()
    }

    async fn run_effects(
        &self,
        channel_id: &str,
        effects: Vec<FlowEffect>,
        ctx: &EventContext,
    ) -> Result<(), SendError> {
        for effect in effects {
            match effect {
                FlowEffect::Say(text) | FlowEffect::Prompt(text) => {
                    self.sender.send(channel_id, &OutboundMessage::Text(text)).await?;
                }
                FlowEffect::Search { term, location } => {
                    self.report_search(channel_id, &term, &location, ctx).await?;
                }
            }
        }
        Ok(())
    }

    async fn report_search(
        &self,
        channel_id: &str,
        term: &str,
        location: &str,
        ctx: &EventContext,
    ) -> Result<(), SendError> {
        match self.search.search(term, location).await {
            Ok(businesses) if businesses.is_empty() => {
                self.sender.send(channel_id, &OutboundMessage::text(NO_RESULTS)).await
            }
            Ok(businesses) => {
                self.sender.send(channel_id, &OutboundMessage::text(RESULTS_HEADER)).await?;
                for business in &businesses {
                    self.sender
                        .send(channel_id, &OutboundMessage::Attachment(business_card(business)))
                        .await?;
                }
                Ok(())
            }
            Err(error) => {
                warn!(
                    event_name = "sessions.search_failed",
                    correlation_id = %ctx.correlation_id,
                    channel_id,
                    error = %error,
                    "business search failed; telling the user and ending the conversation"
                );
                self.sender.send(channel_id, &OutboundMessage::text(SEARCH_UNAVAILABLE)).await
            }
        }
    }
}

fn business_card(business: &Business) -> AttachmentCard {
    let mut card = AttachmentCard::new(business.name.clone(), business.url.clone())
        .pretext(format!("Rating: {}", business.rating));
    if let Some(image_url) = &business.image_url {
        card = card.image_url(image_url.clone());
    }
    card
}

#[async_trait]
impl MessageService for SessionService {
    async fn handle_message(
        &self,
        event: &MessageEvent,
        ctx: &EventContext,
    ) -> Result<HandlerResult, EventHandlerError> {
        let key = SessionKey::for_event(event);

        // Replies into an active conversation never re-enter the trigger
        // table; "food" three steps into the dining flow is an answer, not
        // a new flow.
        let advanced = {
            let mut sessions = self.sessions.lock().await;
            match sessions.get_mut(&key) {
                Some(instance) => {
                    let outcome = instance.advance(&event.text)?;
                    if outcome.ended {
                        sessions.remove(&key);
                    }
                    Some(outcome)
                }
                None => None,
            }
        };
        if let Some(outcome) = advanced {
            self.run_effects(&event.channel_id, outcome.effects, ctx).await?;
            return Ok(HandlerResult::Processed);
        }

        let Some(binding) = self.registry.resolve(&event.text, event.context) else {
            return Ok(HandlerResult::Ignored);
        };

        match binding.handler {
            Handler::Static(reply) => {
                let message =
                    render_static_reply(reply, &event.user_id, self.identity.as_ref()).await;
                self.sender.send(&event.channel_id, &message).await?;
            }
            Handler::Conversation(kind) => {
                self.sender
                    .send(&event.channel_id, &OutboundMessage::text(kind.entry_line()))
                    .await?;
                let (instance, effects) = ConversationInstance::start(kind.script())?;
                self.sessions.lock().await.insert(key, instance);
                self.run_effects(&event.channel_id, effects, ctx).await?;
            }
        }

        Ok(HandlerResult::Processed)
    }
}

/// Dispatcher wired with inert collaborators: messages route and flows run,
/// but nothing leaves the process.
pub fn default_dispatcher() -> EventDispatcher {
    let service = SessionService::new(
        default_registry(),
        Arc::new(NoopChatSender),
        Arc::new(NoopIdentityLookup),
        Arc::new(StaticSearchClient::empty()),
    );
    EventDispatcher::new(Arc::new(service))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use super::{SessionService, NO_RESULTS, RESULTS_HEADER, SEARCH_UNAVAILABLE};
    use crate::events::{EventContext, HandlerResult, MessageEvent, MessageService};
    use crate::identity::NoopIdentityLookup;
    use crate::outbound::{ChatSender, OutboundMessage, SendError};
    use drover_core::triggers::{default_registry, MessageContext};
    use drover_search::{Business, StaticSearchClient};

    #[derive(Default)]
    struct RecordingSender {
        sent: Mutex<Vec<(String, OutboundMessage)>>,
    }

    impl RecordingSender {
        async fn texts(&self) -> Vec<String> {
            self.sent
                .lock()
                .await
                .iter()
                .map(|(_, message)| match message {
                    OutboundMessage::Text(text) => text.clone(),
                    OutboundMessage::Attachment(card) => format!("attachment:{}", card.title),
                })
                .collect()
        }
    }

    #[async_trait]
    impl ChatSender for RecordingSender {
        async fn send(
            &self,
            channel_id: &str,
            message: &OutboundMessage,
        ) -> Result<(), SendError> {
            self.sent.lock().await.push((channel_id.to_owned(), message.clone()));
            Ok(())
        }
    }

    fn service_with(
        search: Arc<StaticSearchClient>,
    ) -> (SessionService, Arc<RecordingSender>, Arc<StaticSearchClient>) {
        let sender = Arc::new(RecordingSender::default());
        let service = SessionService::new(
            default_registry(),
            sender.clone(),
            Arc::new(NoopIdentityLookup),
            search.clone(),
        );
        (service, sender, search)
    }

    fn message(user_id: &str, text: &str) -> MessageEvent {
        MessageEvent {
            channel_id: "C1".to_owned(),
            user_id: user_id.to_owned(),
            text: text.to_owned(),
            context: MessageContext::DirectMessage,
        }
    }

    async fn drive(service: &SessionService, user_id: &str, texts: &[&str]) {
        for text in texts {
            service
                .handle_message(&message(user_id, text), &EventContext::default())
                .await
                .expect("handle_message should not fail");
        }
    }

    fn taqueria() -> Business {
        Business {
            name: "La Taqueria".to_owned(),
            rating: 4.5,
            url: "https://example.test/la-taqueria".to_owned(),
            image_url: Some("https://example.test/la-taqueria.jpg".to_owned()),
        }
    }

    #[tokio::test]
    async fn static_trigger_sends_one_reply() {
        let (service, sender, _) = service_with(Arc::new(StaticSearchClient::empty()));

        let result = service
            .handle_message(&message("U1", "howdy"), &EventContext::default())
            .await
            .expect("handle");

        assert_eq!(result, HandlerResult::Processed);
        assert_eq!(sender.texts().await, vec!["Howdy partner!".to_owned()]);
    }

    #[tokio::test]
    async fn unmatched_text_is_ignored_silently() {
        let (service, sender, _) = service_with(Arc::new(StaticSearchClient::empty()));

        let result = service
            .handle_message(&message("U1", "random thread banter"), &EventContext::default())
            .await
            .expect("handle");

        assert_eq!(result, HandlerResult::Ignored);
        assert!(sender.sent.lock().await.is_empty());
    }

    #[tokio::test]
    async fn duel_runs_to_the_win_and_clears_the_session() {
        let (service, sender, _) = service_with(Arc::new(StaticSearchClient::empty()));

        drive(&service, "U1", &["duel", "yes", "yes"]).await;

        assert_eq!(
            sender.texts().await,
            vec![
                "It's high noon...".to_owned(),
                "You sure you want to duel partner?".to_owned(),
                "old-town-bot looks at you in the eyes as the clock ticks closer to noon, then \
                 you hear the bell tolls. Do you draw?"
                    .to_owned(),
                "BAM! You shot old-town-bot but another replaces it :)".to_owned(),
            ]
        );
        assert_eq!(service.active_conversation_count().await, 0);
    }

    #[tokio::test]
    async fn declining_the_duel_ends_after_one_message() {
        let (service, sender, _) = service_with(Arc::new(StaticSearchClient::empty()));

        drive(&service, "U1", &["duel", "no"]).await;

        let texts = sender.texts().await;
        assert_eq!(texts.last(), Some(&"Wise choice...".to_owned()));
        assert_eq!(service.active_conversation_count().await, 0);

        // A stray "no" afterwards matches no trigger and advances nothing.
        let result = service
            .handle_message(&message("U1", "no"), &EventContext::default())
            .await
            .expect("handle");
        assert_eq!(result, HandlerResult::Ignored);
    }

    #[tokio::test]
    async fn dining_flow_searches_with_the_captured_answers() {
        let (service, sender, search) =
            service_with(Arc::new(StaticSearchClient::with_results(vec![taqueria()])));

        drive(&service, "U1", &["hungry", "yes", "tacos", "123 Main St"]).await;

        assert_eq!(search.calls(), vec![("tacos".to_owned(), "123 Main St".to_owned())]);
        let texts = sender.texts().await;
        assert_eq!(
            texts[texts.len() - 2..].to_vec(),
            vec![RESULTS_HEADER.to_owned(), "attachment:La Taqueria".to_owned()]
        );
        assert_eq!(service.active_conversation_count().await, 0);
    }

    #[tokio::test]
    async fn mid_conversation_replies_do_not_start_new_flows() {
        let (service, _, search) =
            service_with(Arc::new(StaticSearchClient::with_results(vec![taqueria()])));

        // "food" is a dining trigger word, but here it is the answer to the
        // second question.
        drive(&service, "U1", &["hungry", "yes", "food", "123 Main St"]).await;

        assert_eq!(search.calls(), vec![("food".to_owned(), "123 Main St".to_owned())]);
    }

    #[tokio::test]
    async fn empty_search_results_produce_exactly_one_message() {
        let (service, sender, _) = service_with(Arc::new(StaticSearchClient::empty()));

        drive(&service, "U1", &["hungry", "yes", "tacos", "123 Main St"]).await;

        let texts = sender.texts().await;
        assert_eq!(texts.iter().filter(|text| *text == NO_RESULTS).count(), 1);
        assert!(!texts.contains(&RESULTS_HEADER.to_owned()));
    }

    #[tokio::test]
    async fn failing_search_produces_exactly_one_unavailable_message() {
        let (service, sender, _) = service_with(Arc::new(StaticSearchClient::unavailable()));

        drive(&service, "U1", &["hungry", "yes", "tacos", "123 Main St"]).await;

        let texts = sender.texts().await;
        assert_eq!(texts.iter().filter(|text| *text == SEARCH_UNAVAILABLE).count(), 1);
        assert_eq!(service.active_conversation_count().await, 0);
    }

    #[tokio::test]
    async fn interleaved_conversations_keep_their_own_captures() {
        let (service, _, search) =
            service_with(Arc::new(StaticSearchClient::with_results(vec![taqueria()])));

        drive(&service, "U1", &["hungry", "yes"]).await;
        drive(&service, "U2", &["hungry", "yes"]).await;
        drive(&service, "U1", &["tacos"]).await;
        drive(&service, "U2", &["bbq"]).await;
        drive(&service, "U2", &["amarillo"]).await;
        drive(&service, "U1", &["123 Main St"]).await;

        let mut calls = search.calls();
        calls.sort();
        assert_eq!(
            calls,
            vec![
                ("bbq".to_owned(), "amarillo".to_owned()),
                ("tacos".to_owned(), "123 Main St".to_owned()),
            ]
        );
    }

    #[tokio::test]
    async fn conversation_start_sends_entry_line_before_the_first_prompt() {
        let (service, sender, _) = service_with(Arc::new(StaticSearchClient::empty()));

        drive(&service, "U1", &["hungry"]).await;

        assert_eq!(
            sender.texts().await,
            vec!["Howdy there partner!".to_owned(), "Want some food recommendation?".to_owned()]
        );
        assert_eq!(service.active_conversation_count().await, 1);
    }
}
