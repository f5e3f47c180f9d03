//! # audience-platform
//!
//! Version-tolerant output dispatch for game-server style hosts.
//!
//! Calling code sends messages, banners (titles), status indicators (boss
//! bars), action-bar lines and sounds to an [`Audience`] without knowing
//! which of the host's incompatible API generations the recipient supports.
//!
//! ## Architecture
//!
//! ```text
//! Platform::new(host)
//!   │ CapabilityProbe::tier()      → Tier (once, memoized)
//!   │ Handlers::standard()         → one HandlerChain per Category
//!   ▼
//! Platform::player(id) / players() / permission(p) / scope(s) / console()
//!   │
//!   ├── RecipientAudience   (one recipient, one Binding per category)
//!   ├── CompositeAudience   (membership recomputed on every dispatch)
//!   ├── MultiAudience       (fixed list, e.g. console + everyone)
//!   └── EmptyAudience       (lookup found nobody; every operation no-ops)
//!   ▼
//! Handler::apply(recipient, tier, payload) → Recipient::invoke(Primitive)
//! ```
//!
//! Ordinary environment variation (an old host, a disconnected player, a
//! missing permission) never surfaces as an error: the operation is either
//! performed or silently dropped. Only malformed arguments are reported.

pub mod audience;
pub mod capabilities;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod host;
pub mod payload;
pub mod platform;

pub use audience::{
    Audience, AudienceFactory, CompositeAudience, DeliveryReport, EmptyAudience, MemberFilter,
    MultiAudience, Operation, RecipientAudience,
};
pub use capabilities::{CapabilityProbe, Tier};
pub use config::PlatformConfig;
pub use errors::{AudienceError, ConfigError, HostError};
pub use handlers::{Binding, Bindings, Category, Handler, HandlerChain, Handlers, NullHandler};
pub use host::{Host, Primitive, Recipient, RecipientId, RecipientKind, ScopeId};
pub use payload::{
    BossBar, BossBarAction, BossBarColor, BossBarOverlay, Message, Sound, SoundSource, Title,
    TitleAction, TitleTimes,
};
pub use platform::{Platform, Target};
