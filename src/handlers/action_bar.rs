//! Action-bar strategies.

use super::{deliver, Handler};
use crate::capabilities::Tier;
use crate::errors::AudienceError;
use crate::host::{Primitive, Recipient, RecipientKind};
use crate::payload::Message;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionBarHandler {
    /// The host's action-bar API.
    Native,
    /// A chat packet at the game-info position, for hosts without the API.
    ChatPacket,
}

impl Handler<Message> for ActionBarHandler {
    fn name(&self) -> &'static str {
        match self {
            ActionBarHandler::Native => "action_bar/native",
            ActionBarHandler::ChatPacket => "action_bar/chat_packet",
        }
    }

    fn is_available(&self, kind: RecipientKind, tier: Tier) -> bool {
        kind == RecipientKind::Player
            && match self {
                ActionBarHandler::Native => tier >= Tier::Modern,
                ActionBarHandler::ChatPacket => tier == Tier::Legacy,
            }
    }

    fn apply(&self, recipient: &dyn Recipient, tier: Tier, message: &Message) -> Result<(), AudienceError> {
        self.ensure_available(recipient, tier)?;
        let json = message.render(tier);
        let primitive = match self {
            ActionBarHandler::Native => Primitive::ActionBar(json),
            ActionBarHandler::ChatPacket => Primitive::ChatPacket(json),
        };
        deliver(self.name(), recipient, primitive)
    }
}
