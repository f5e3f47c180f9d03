//! audience-platform demo binary.
//!
//! Builds an in-memory host from a YAML scenario, runs each request through
//! `Platform::dispatch`, and logs what every recipient received.
//!
//! # Environment Variables
//!
//! - `AUDIENCE_TIER`: force `legacy` or `modern` instead of probing
//! - `RUST_LOG`: tracing filter (default: "info,audience_platform=debug")
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin audience-demo -- demos/scenario.yaml
//! # without an argument the built-in scenario is used
//! cargo run --bin audience-demo
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{bail, Context};
use serde::Deserialize;
use uuid::Uuid;

use audience_platform::host::memory::{MemoryHost, MemoryRecipient};
use audience_platform::{
    BossBar, BossBarAction, BossBarColor, BossBarOverlay, Message, Operation, Platform,
    PlatformConfig, Recipient, RecipientKind, Sound, SoundSource, Target, Title, TitleAction,
};

const BUILTIN_SCENARIO: &str = include_str!("../../demos/scenario.yaml");

#[derive(Debug, Deserialize)]
struct Scenario {
    #[serde(default = "default_version")]
    version: String,
    #[serde(default)]
    features: Vec<String>,
    #[serde(default)]
    config: PlatformConfig,
    #[serde(default)]
    recipients: Vec<RecipientSpec>,
    #[serde(default)]
    requests: Vec<Request>,
}

fn default_version() -> String {
    "memory".to_string()
}

#[derive(Debug, Deserialize)]
struct RecipientSpec {
    name: String,
    #[serde(default = "default_kind")]
    kind: RecipientKind,
    scope: Option<String>,
    #[serde(default)]
    permissions: Vec<String>,
}

fn default_kind() -> RecipientKind {
    RecipientKind::Player
}

#[derive(Debug, Deserialize)]
struct Request {
    target: String,
    #[serde(flatten)]
    op: RequestOp,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum RequestOp {
    Message { text: String },
    ActionBar { text: String },
    Title {
        text: String,
        #[serde(default)]
        subtitle: String,
    },
    ClearTitle,
    ResetTitle,
    BossBar {
        text: String,
        #[serde(default = "full")]
        progress: f32,
        #[serde(default)]
        hide: bool,
    },
    Sound {
        key: String,
        #[serde(default = "master")]
        source: SoundSource,
    },
}

fn full() -> f32 {
    1.0
}

fn master() -> SoundSource {
    SoundSource::Master
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,audience_platform=debug".into()),
        )
        .init();

    let scenario: Scenario = match std::env::args().nth(1) {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("reading scenario {path}"))?;
            serde_yaml::from_str(&content).with_context(|| format!("parsing scenario {path}"))?
        }
        None => serde_yaml::from_str(BUILTIN_SCENARIO).context("parsing built-in scenario")?,
    };

    let host = scenario
        .features
        .iter()
        .fold(MemoryHost::new(scenario.version.clone()), |host, feature| {
            host.with_feature(feature)
        });
    let host = Arc::new(host);

    let mut names: HashMap<String, Uuid> = HashMap::new();
    let mut recipients = Vec::new();
    for spec in &scenario.recipients {
        let recipient = match (spec.kind, &spec.scope) {
            (RecipientKind::Player, Some(scope)) => MemoryRecipient::player(&spec.name, scope.as_str()),
            (RecipientKind::Player, None) => bail!("player `{}` needs a scope", spec.name),
            (RecipientKind::RemoteConsole, _) => MemoryRecipient::remote_console(&spec.name),
            (RecipientKind::Console, _) => bail!("the console is built in; remove `{}`", spec.name),
        };
        for permission in &spec.permissions {
            recipient.grant(permission);
        }
        let recipient = host.connect(recipient);
        names.insert(spec.name.clone(), recipient.id());
        recipients.push(recipient);
    }

    let config = scenario.config.with_env_overrides()?;
    config.validate()?;
    let platform = Platform::with_config(host.clone(), config);
    tracing::info!(tier = %platform.tier(), recipients = recipients.len(), "Scenario loaded");

    for request in &scenario.requests {
        let target = resolve_target(&request.target, &names)?;
        tracing::info!("{} <- {:?}", target, request.op);
        run(&platform, &target, &request.op)
            .with_context(|| format!("request to `{}`", request.target))?;
    }

    let console = host.console_recipient().clone();
    for recipient in std::iter::once(&console).chain(&recipients) {
        let received = recipient.received();
        if received.is_empty() {
            tracing::info!("{}: nothing", recipient_label(recipient));
        }
        for primitive in received {
            tracing::info!("{}: {:?}", recipient_label(recipient), primitive);
        }
    }

    Ok(())
}

/// Parse a target, accepting `player:<name>` for scenario recipients.
fn resolve_target(text: &str, names: &HashMap<String, Uuid>) -> anyhow::Result<Target> {
    if let Some(name) = text.trim().strip_prefix("player:") {
        if let Some(id) = names.get(name.trim()) {
            return Ok(Target::Player(*id));
        }
    }
    Ok(text.parse()?)
}

fn run(platform: &Platform, target: &Target, op: &RequestOp) -> anyhow::Result<()> {
    match op {
        RequestOp::Message { text } => {
            platform.dispatch(target, Operation::Message(&Message::text(text.as_str())))?
        }
        RequestOp::ActionBar { text } => {
            platform.dispatch(target, Operation::ActionBar(&Message::text(text.as_str())))?
        }
        RequestOp::Title { text, subtitle } => {
            let action = TitleAction::Show(Title::new(text.as_str(), subtitle.as_str()));
            platform.dispatch(target, Operation::Title(&action))?
        }
        RequestOp::ClearTitle => platform.dispatch(target, Operation::Title(&TitleAction::Clear))?,
        RequestOp::ResetTitle => platform.dispatch(target, Operation::Title(&TitleAction::Reset))?,
        RequestOp::BossBar {
            text,
            progress,
            hide,
        } => {
            let bar = BossBar::new(
                text.as_str(),
                *progress,
                BossBarColor::Purple,
                BossBarOverlay::Progress,
            )?;
            let action = if *hide {
                BossBarAction::Hide(bar)
            } else {
                BossBarAction::Show(bar)
            };
            platform.dispatch(target, Operation::BossBar(&action))?
        }
        RequestOp::Sound { key, source } => {
            let sound = Sound::new(key.as_str(), *source, 1.0, 1.0)?;
            platform.dispatch(target, Operation::Sound(&sound))?
        }
    }
    Ok(())
}

fn recipient_label(recipient: &MemoryRecipient) -> String {
    format!("{} [{}]", recipient.name(), recipient.kind())
}
