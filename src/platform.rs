//! The platform: probes the host once and hands out audiences.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use uuid::Uuid;

use crate::audience::{
    Audience, AudienceFactory, CompositeAudience, EmptyAudience, MultiAudience, Operation,
    RecipientAudience,
};
use crate::capabilities::{CapabilityProbe, Tier};
use crate::config::PlatformConfig;
use crate::errors::AudienceError;
use crate::handlers::Handlers;
use crate::host::{Host, Recipient, RecipientId, ScopeId};

/// Entry point for sending output to a host.
///
/// Construction runs the capability probe, so the tier is fixed for the
/// platform's lifetime. Audiences handed out afterwards share the handler
/// table.
pub struct Platform {
    host: Arc<dyn Host>,
    config: PlatformConfig,
    probe: CapabilityProbe,
    factory: AudienceFactory,
}

impl Platform {
    pub fn new(host: Arc<dyn Host>) -> Self {
        Self::with_config(host, PlatformConfig::default())
    }

    pub fn with_config(host: Arc<dyn Host>, config: PlatformConfig) -> Self {
        let handlers = Handlers::standard().with_cache(config.cache_resolutions);
        Self::with_handlers(host, config, handlers)
    }

    /// Use a custom handler table.
    pub fn with_handlers(host: Arc<dyn Host>, config: PlatformConfig, handlers: Handlers) -> Self {
        let probe = CapabilityProbe::from_config(&config);
        let tier = probe.tier(host.as_ref());
        log::info!(
            "Audience platform on {} running {} handlers (marker `{}`{})",
            host.version(),
            tier,
            probe.marker(),
            if config.tier.is_some() { ", forced" } else { "" }
        );
        Self {
            factory: AudienceFactory::new(tier, Arc::new(handlers)),
            host,
            config,
            probe,
        }
    }

    /// Host version string.
    pub fn name(&self) -> String {
        self.host.version()
    }

    pub fn tier(&self) -> Tier {
        self.factory.tier()
    }

    pub fn config(&self) -> &PlatformConfig {
        &self.config
    }

    pub fn probe(&self) -> &CapabilityProbe {
        &self.probe
    }

    pub fn handlers(&self) -> &Handlers {
        self.factory.handlers()
    }

    pub fn host(&self) -> &Arc<dyn Host> {
        &self.host
    }

    /// An audience for one recipient, bound on the spot.
    pub fn audience(&self, recipient: Arc<dyn Recipient>) -> RecipientAudience {
        self.factory.audience(recipient)
    }

    pub fn console(&self) -> RecipientAudience {
        self.audience(self.host.console())
    }

    /// Every connected player.
    pub fn players(&self) -> CompositeAudience {
        CompositeAudience::everyone(self.host.clone(), self.factory.clone())
    }

    /// One player, or the empty audience if they are not connected.
    pub fn player(&self, id: RecipientId) -> Arc<dyn Audience> {
        match self.host.find(id) {
            Ok(Some(recipient)) => Arc::new(self.audience(recipient)),
            Ok(None) => {
                log::debug!("Recipient {} is not connected", id);
                EmptyAudience::shared()
            }
            Err(e) => {
                log::debug!("Lookup of recipient {} failed: {}", id, e);
                EmptyAudience::shared()
            }
        }
    }

    /// Players holding `permission`.
    pub fn permission(&self, permission: &str) -> Result<CompositeAudience, AudienceError> {
        CompositeAudience::permission(self.host.clone(), self.factory.clone(), permission)
    }

    /// Players currently in `scope`.
    pub fn scope(&self, scope: impl Into<ScopeId>) -> Result<CompositeAudience, AudienceError> {
        CompositeAudience::scope(self.host.clone(), self.factory.clone(), scope)
    }

    /// The console followed by every connected player.
    pub fn server(&self) -> MultiAudience {
        let audiences: Vec<Arc<dyn Audience>> =
            vec![Arc::new(self.console()), Arc::new(self.players())];
        MultiAudience::new(audiences)
    }

    pub fn target(&self, target: &Target) -> Result<Arc<dyn Audience>, AudienceError> {
        let audience: Arc<dyn Audience> = match target {
            Target::Console => Arc::new(self.console()),
            Target::Server => Arc::new(self.server()),
            Target::Everyone => Arc::new(self.players()),
            Target::Player(id) => self.player(*id),
            Target::Permission(permission) => Arc::new(self.permission(permission)?),
            Target::Scope(scope) => Arc::new(self.scope(scope.clone())?),
        };
        Ok(audience)
    }

    /// Resolve `target` and perform `operation` on it.
    pub fn dispatch(&self, target: &Target, operation: Operation<'_>) -> Result<(), AudienceError> {
        self.target(target)?.dispatch(operation);
        Ok(())
    }
}

impl fmt::Debug for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Platform")
            .field("host", &self.host.version())
            .field("tier", &self.tier())
            .field("config", &self.config)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Target
// ---------------------------------------------------------------------------

/// A string-addressable audience selector.
///
/// | Text | Target |
/// |---|---|
/// | `console` | the console |
/// | `server` | console and every player |
/// | `everyone` | every player |
/// | `player:<uuid>` | one player |
/// | `permission:<name>` | players holding a permission |
/// | `scope:<id>` | players in a scope |
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Console,
    Server,
    Everyone,
    Player(RecipientId),
    Permission(String),
    Scope(ScopeId),
}

impl FromStr for Target {
    type Err = AudienceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (selector, argument) = match s.split_once(':') {
            Some((selector, argument)) => (selector, Some(argument.trim())),
            None => (s, None),
        };

        let invalid = |reason: &str| AudienceError::InvalidTarget(format!("`{s}`: {reason}"));
        let required = |argument: Option<&str>| match argument {
            Some(a) if !a.is_empty() => Ok(a.to_string()),
            _ => Err(invalid("missing argument")),
        };

        match (selector.to_ascii_lowercase().as_str(), argument) {
            ("console", None) => Ok(Target::Console),
            ("server", None) => Ok(Target::Server),
            ("everyone", None) => Ok(Target::Everyone),
            ("player", argument) => {
                let id = required(argument)?;
                Uuid::parse_str(&id)
                    .map(Target::Player)
                    .map_err(|e| invalid(&e.to_string()))
            }
            ("permission", argument) => required(argument).map(Target::Permission),
            ("scope", argument) => required(argument).map(|id| Target::Scope(ScopeId::new(id))),
            ("console" | "server" | "everyone", Some(_)) => Err(invalid("takes no argument")),
            _ => Err(invalid("unknown selector")),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Console => f.write_str("console"),
            Target::Server => f.write_str("server"),
            Target::Everyone => f.write_str("everyone"),
            Target::Player(id) => write!(f, "player:{id}"),
            Target::Permission(permission) => write!(f, "permission:{permission}"),
            Target::Scope(scope) => write!(f, "scope:{scope}"),
        }
    }
}
