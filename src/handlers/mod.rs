//! # Handlers
//!
//! A [`Handler`] is one way of performing one category of output on one
//! family of hosts. Handlers for a category are declared in a
//! [`HandlerChain`], newest capability first, and the chain picks the first
//! one whose availability predicate accepts the recipient kind and tier.
//!
//! ## Ordering Policy
//!
//! Within a chain, handlers are ordered by the minimum tier they need,
//! highest first. Handlers with the same minimum tier are ordered by how
//! narrow their recipient-kind predicate is, narrowest first. The final
//! entry is the oldest-compatible fallback. A category a recipient kind can
//! never display (see [`Category::supported_by`]) is bound to
//! [`Binding::Unsupported`] without consulting the chain at all.
//!
//! ## Built-in Chains
//!
//! ```text
//! Message          chat/component → chat/plain
//! ActionBar        action_bar/native → action_bar/chat_packet
//! Banner           title/native → title/packets
//! StatusIndicator  boss_bar/native
//! Sound            sound/with_category → sound/no_category
//! ```

pub mod action_bar;
pub mod boss_bar;
pub mod chain;
pub mod chat;
pub mod registry;
pub mod sound;
pub mod title;

use std::fmt;
use std::sync::Arc;

use crate::capabilities::Tier;
use crate::errors::{AudienceError, HostError};
use crate::host::{Primitive, Recipient, RecipientKind};

pub use action_bar::ActionBarHandler;
pub use boss_bar::BossBarHandler;
pub use chain::HandlerChain;
pub use chat::ChatHandler;
pub use registry::{Bindings, Handlers};
pub use sound::SoundHandler;
pub use title::TitleHandler;

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// A category of output operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Message,
    ActionBar,
    /// Titles.
    Banner,
    /// Boss bars.
    StatusIndicator,
    Sound,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Message,
        Category::ActionBar,
        Category::Banner,
        Category::StatusIndicator,
        Category::Sound,
    ];

    /// Whether a recipient kind can display this category at all.
    pub fn supported_by(&self, kind: RecipientKind) -> bool {
        match kind {
            RecipientKind::Player => true,
            RecipientKind::Console | RecipientKind::RemoteConsole => *self == Category::Message,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Message => "message",
            Category::ActionBar => "action_bar",
            Category::Banner => "banner",
            Category::StatusIndicator => "status_indicator",
            Category::Sound => "sound",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Handler
// ---------------------------------------------------------------------------

/// One strategy for delivering payloads of type `P`.
pub trait Handler<P>: Send + Sync {
    /// Stable identifier, `category/variant`.
    fn name(&self) -> &'static str;

    /// Whether this strategy can serve `kind` on a `tier` host.
    ///
    /// Must be cheap and free of side effects; it decides eligibility only.
    fn is_available(&self, kind: RecipientKind, tier: Tier) -> bool;

    /// Deliver `payload` to `recipient`.
    fn apply(&self, recipient: &dyn Recipient, tier: Tier, payload: &P)
        -> Result<(), AudienceError>;

    /// True only for the chain's "nothing matched" handler.
    fn is_null(&self) -> bool {
        false
    }

    /// Re-check availability at apply time.
    fn ensure_available(&self, recipient: &dyn Recipient, tier: Tier) -> Result<(), AudienceError> {
        let kind = recipient.kind();
        if self.is_available(kind, tier) {
            Ok(())
        } else {
            Err(AudienceError::UnsupportedOperation {
                handler: self.name(),
                kind,
            })
        }
    }
}

/// The handler a chain resolves to when no strategy is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullHandler;

impl<P> Handler<P> for NullHandler {
    fn name(&self) -> &'static str {
        "none"
    }

    fn is_available(&self, _kind: RecipientKind, _tier: Tier) -> bool {
        false
    }

    fn apply(&self, _recipient: &dyn Recipient, _tier: Tier, _payload: &P) -> Result<(), AudienceError> {
        Ok(())
    }

    fn is_null(&self) -> bool {
        true
    }
}

/// Invoke a primitive, mapping a host refusal to `UnsupportedOperation`.
pub(crate) fn deliver(
    handler: &'static str,
    recipient: &dyn Recipient,
    primitive: Primitive,
) -> Result<(), AudienceError> {
    recipient.invoke(primitive).map_err(|e| match e {
        HostError::Rejected { .. } => AudienceError::UnsupportedOperation {
            handler,
            kind: recipient.kind(),
        },
        other => AudienceError::HostLookup(other),
    })
}

// ---------------------------------------------------------------------------
// Binding
// ---------------------------------------------------------------------------

/// The handler bound to one category for one recipient.
pub enum Binding<P> {
    /// Resolved through the chain. May be the chain's [`NullHandler`].
    Resolved(Arc<dyn Handler<P>>),
    /// The recipient kind can never display this category.
    Unsupported,
}

impl<P> Binding<P> {
    /// Name of the bound handler; `None` when unsupported.
    pub fn handler_name(&self) -> Option<&'static str> {
        match self {
            Binding::Resolved(handler) => Some(handler.name()),
            Binding::Unsupported => None,
        }
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, Binding::Unsupported)
    }

    /// Whether applying this binding can never reach the host.
    pub fn is_noop(&self) -> bool {
        match self {
            Binding::Resolved(handler) => handler.is_null(),
            Binding::Unsupported => true,
        }
    }

    pub fn apply(&self, recipient: &dyn Recipient, tier: Tier, payload: &P) -> Result<(), AudienceError> {
        match self {
            Binding::Resolved(handler) => handler.apply(recipient, tier, payload),
            Binding::Unsupported => Ok(()),
        }
    }
}

impl<P> Clone for Binding<P> {
    fn clone(&self) -> Self {
        match self {
            Binding::Resolved(handler) => Binding::Resolved(handler.clone()),
            Binding::Unsupported => Binding::Unsupported,
        }
    }
}

impl<P> fmt::Debug for Binding<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::Resolved(handler) => write!(f, "Resolved({})", handler.name()),
            Binding::Unsupported => f.write_str("Unsupported"),
        }
    }
}
