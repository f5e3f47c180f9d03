//! Single-recipient audiences.

use std::fmt;
use std::sync::Arc;

use super::{guarded, Audience, Operation};
use crate::capabilities::Tier;
use crate::errors::AudienceError;
use crate::handlers::{Bindings, Handlers};
use crate::host::Recipient;

/// Builds [`RecipientAudience`]s for a fixed tier and handler table.
///
/// Cheap to clone; every composite holds one.
#[derive(Debug, Clone)]
pub struct AudienceFactory {
    tier: Tier,
    handlers: Arc<Handlers>,
}

impl AudienceFactory {
    pub fn new(tier: Tier, handlers: Arc<Handlers>) -> Self {
        Self { tier, handlers }
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn handlers(&self) -> &Handlers {
        &self.handlers
    }

    /// A fresh audience bound to `recipient`'s current kind.
    pub fn audience(&self, recipient: Arc<dyn Recipient>) -> RecipientAudience {
        let bindings = self.handlers.bind(recipient.kind(), self.tier);
        RecipientAudience {
            recipient,
            tier: self.tier,
            bindings,
        }
    }
}

/// One recipient and the handler bound for each category.
///
/// The bindings are fixed at construction; look the recipient up again to
/// get a new audience rather than holding one across kind changes.
pub struct RecipientAudience {
    recipient: Arc<dyn Recipient>,
    tier: Tier,
    bindings: Bindings,
}

impl RecipientAudience {
    pub fn recipient(&self) -> &Arc<dyn Recipient> {
        &self.recipient
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// Perform `operation`, reporting what went wrong instead of dropping it.
    pub fn try_dispatch(&self, operation: Operation<'_>) -> Result<(), AudienceError> {
        let recipient = self.recipient.as_ref();
        match operation {
            Operation::Message(message) => self.bindings.message.apply(recipient, self.tier, message),
            Operation::ActionBar(message) => {
                self.bindings.action_bar.apply(recipient, self.tier, message)
            }
            Operation::Title(action) => self.bindings.title.apply(recipient, self.tier, action),
            Operation::BossBar(action) => self.bindings.boss_bar.apply(recipient, self.tier, action),
            Operation::Sound(sound) => self.bindings.sound.apply(recipient, self.tier, sound),
        }
    }
}

impl Audience for RecipientAudience {
    fn dispatch(&self, operation: Operation<'_>) {
        let label = || format!("{} ({})", self.recipient.name(), self.recipient.id());
        if let Some(Err(e)) = guarded(operation, label, || self.try_dispatch(operation)) {
            log::debug!(
                "Dropped {} for {} ({}): {}",
                operation.category(),
                self.recipient.name(),
                self.recipient.id(),
                e
            );
        }
    }
}

impl fmt::Debug for RecipientAudience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecipientAudience")
            .field("recipient", &self.recipient.name())
            .field("kind", &self.recipient.kind())
            .field("tier", &self.tier)
            .field("bindings", &self.bindings)
            .finish()
    }
}
