//! # Host Interface
//!
//! The contract between the dispatch engine and the server it runs inside.
//! The engine never talks to a host API directly: it asks a [`Host`] for
//! recipients and features, and leaf handlers issue [`Primitive`] calls
//! through [`Recipient::invoke`].
//!
//! ```text
//! Host
//!   ├── has_feature(marker)   → CapabilityProbe
//!   ├── console()             → Platform::console()
//!   ├── online() / find(id)   → CompositeAudience / Platform::player()
//!   ▼
//! Recipient
//!   ├── has_permission(p), scope()   → MemberFilter
//!   └── invoke(Primitive)            → leaf Handler
//! ```
//!
//! [`memory::MemoryHost`] is a complete in-process implementation used by
//! the tests and the demo binary.

pub mod memory;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::errors::HostError;
use crate::payload::{BossBarColor, BossBarOverlay, SoundSource, TitleTimes};

/// Identifier of a connected recipient.
pub type RecipientId = Uuid;

// ---------------------------------------------------------------------------
// RecipientKind
// ---------------------------------------------------------------------------

/// The concrete kind of a recipient, which decides what it can display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipientKind {
    /// The server's own console. Text only.
    Console,
    /// A remote admin console session. Text only.
    RemoteConsole,
    /// A connected player with a game client.
    Player,
}

impl RecipientKind {
    pub const ALL: [RecipientKind; 3] = [
        RecipientKind::Console,
        RecipientKind::RemoteConsole,
        RecipientKind::Player,
    ];
}

impl fmt::Display for RecipientKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RecipientKind::Console => "console",
            RecipientKind::RemoteConsole => "remote console",
            RecipientKind::Player => "player",
        })
    }
}

// ---------------------------------------------------------------------------
// ScopeId
// ---------------------------------------------------------------------------

/// The namespace a recipient currently occupies (a world, in game terms).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScopeId(String);

impl ScopeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ScopeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ScopeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// ---------------------------------------------------------------------------
// Primitive
// ---------------------------------------------------------------------------

/// The individual packets of a legacy title sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum TitlePacket {
    Times { fade_in: u32, stay: u32, fade_out: u32 },
    Subtitle(Value),
    Title(Value),
    Clear,
    Reset,
}

/// A single host-level output call.
///
/// Each variant corresponds to one host API entry point; which ones a host
/// accepts depends on its generation.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// Send a JSON component through the chat API.
    ComponentMessage(Value),
    /// Send plain text.
    TextMessage(String),
    /// Native action-bar API.
    ActionBar(Value),
    /// Raw chat packet at the game-info position, above the hotbar.
    ChatPacket(Value),
    /// Native title API.
    ShowTitle {
        title: Value,
        subtitle: Value,
        times: Option<TitleTimes>,
    },
    ClearTitle,
    ResetTitle,
    /// One packet of a legacy title sequence.
    TitlePacket(TitlePacket),
    ShowBossBar {
        id: Uuid,
        name: Value,
        progress: f32,
        color: BossBarColor,
        overlay: BossBarOverlay,
    },
    HideBossBar { id: Uuid },
    /// Play a sound at the recipient's location. `source` is `None` on
    /// hosts without sound categories.
    PlaySound {
        key: String,
        source: Option<SoundSource>,
        volume: f32,
        pitch: f32,
    },
}

impl Primitive {
    pub fn name(&self) -> &'static str {
        match self {
            Primitive::ComponentMessage(_) => "component_message",
            Primitive::TextMessage(_) => "text_message",
            Primitive::ActionBar(_) => "action_bar",
            Primitive::ChatPacket(_) => "chat_packet",
            Primitive::ShowTitle { .. } => "show_title",
            Primitive::ClearTitle => "clear_title",
            Primitive::ResetTitle => "reset_title",
            Primitive::TitlePacket(_) => "title_packet",
            Primitive::ShowBossBar { .. } => "show_boss_bar",
            Primitive::HideBossBar { .. } => "hide_boss_bar",
            Primitive::PlaySound { .. } => "play_sound",
        }
    }
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Any addressable destination for output.
pub trait Recipient: Send + Sync {
    fn id(&self) -> RecipientId;

    fn name(&self) -> &str;

    fn kind(&self) -> RecipientKind;

    /// Whether the recipient currently holds `permission`.
    fn has_permission(&self, permission: &str) -> Result<bool, HostError>;

    /// The scope the recipient is in right now. Consoles have none.
    fn scope(&self) -> Result<Option<ScopeId>, HostError>;

    /// Perform one host output call.
    fn invoke(&self, primitive: Primitive) -> Result<(), HostError>;
}

/// The host environment: its recipient directory and feature set.
pub trait Host: Send + Sync {
    /// Human-readable host version.
    fn version(&self) -> String;

    /// Whether the host exposes the named marker feature.
    fn has_feature(&self, marker: &str) -> Result<bool, HostError>;

    /// The server console.
    fn console(&self) -> Arc<dyn Recipient>;

    /// Every currently connected non-console recipient.
    fn online(&self) -> Result<Vec<Arc<dyn Recipient>>, HostError>;

    /// Look up a connected recipient by id.
    fn find(&self, id: RecipientId) -> Result<Option<Arc<dyn Recipient>>, HostError>;
}
