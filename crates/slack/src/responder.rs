//! Canned single-turn replies. Content is part of the bot's shipped
//! personality; change it deliberately.

use tracing::debug;

use drover_core::triggers::StaticReply;

use crate::identity::IdentityLookup;
use crate::outbound::{AttachmentCard, OutboundMessage};

const GREETING_FALLBACK: &str = "Howdy partner!";

const HELP_TEXT: &str = "Howdy cowboy!\n Here are some commands to get you started:\n hello - exchange greetings\nhungry - restraunt query\nfavorite song - I will show you my favorite song\nsing - I will sing you a song\nduel - we duel each other on the old town road";

const SONG_LYRICS: &str = "If you will allow me, mhmm\nYeah, I'm gonna take my horse to the old town road\n I'm gonna ride 'til I can't no more\n I'm gonna take my horse to the old town road\n I'm gonna ride 'til I can't no more";

fn favorite_song_card() -> AttachmentCard {
    AttachmentCard::new(
        "Old Town Road - Lil Nas X",
        "https://www.youtube.com/watch?v=w2Ov5jzm3j8",
    )
    .image_url("https://i.ytimg.com/vi/7ysFgElQtjI/maxresdefault.jpg")
}

/// Render a canned reply. Only the greeting needs the caller's name; a
/// failed lookup degrades to the generic greeting and is never an error.
pub async fn render_static_reply(
    reply: StaticReply,
    user_id: &str,
    identity: &dyn IdentityLookup,
) -> OutboundMessage {
    match reply {
        StaticReply::Greeting => match identity.lookup_user(user_id).await {
            Ok(profile) => OutboundMessage::text(format!("Howdy, {}!", profile.display_name)),
            Err(error) => {
                debug!(
                    event_name = "responder.identity_fallback",
                    user_id,
                    error = %error,
                    "identity lookup failed; greeting without a name"
                );
                OutboundMessage::text(GREETING_FALLBACK)
            }
        },
        StaticReply::Help => OutboundMessage::text(HELP_TEXT),
        StaticReply::SongLyrics => OutboundMessage::text(SONG_LYRICS),
        StaticReply::FavoriteSong => OutboundMessage::Attachment(favorite_song_card()),
    }
}
