//! Chat message strategies.

use super::{deliver, Handler};
use crate::capabilities::Tier;
use crate::errors::AudienceError;
use crate::host::{Primitive, Recipient, RecipientKind};
use crate::payload::Message;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatHandler {
    /// JSON components through the chat API, rendered for the host tier.
    Component,
    /// Flattened plain text. Works for every recipient on every host.
    Plain,
}

impl Handler<Message> for ChatHandler {
    fn name(&self) -> &'static str {
        match self {
            ChatHandler::Component => "chat/component",
            ChatHandler::Plain => "chat/plain",
        }
    }

    fn is_available(&self, kind: RecipientKind, _tier: Tier) -> bool {
        match self {
            ChatHandler::Component => kind == RecipientKind::Player,
            ChatHandler::Plain => true,
        }
    }

    fn apply(&self, recipient: &dyn Recipient, tier: Tier, message: &Message) -> Result<(), AudienceError> {
        self.ensure_available(recipient, tier)?;
        let primitive = match self {
            ChatHandler::Component => Primitive::ComponentMessage(message.render(tier)),
            ChatHandler::Plain => Primitive::TextMessage(message.plain_text()),
        };
        deliver(self.name(), recipient, primitive)
    }
}
