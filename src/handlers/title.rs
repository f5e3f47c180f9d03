//! Title (banner) strategies.

use super::{deliver, Handler};
use crate::capabilities::Tier;
use crate::errors::AudienceError;
use crate::host::{Primitive, Recipient, RecipientKind, TitlePacket};
use crate::payload::{Title, TitleAction};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleHandler {
    /// The host's title API.
    Native,
    /// Times, subtitle and title packets sent in sequence.
    Packets,
}

impl TitleHandler {
    /// Send the packet sequence, stopping at the first failure.
    ///
    /// Packets already sent stay sent. The title packet is last, so a cut
    /// sequence leaves only staged times or subtitle and never shows a title.
    fn show_packets(&self, recipient: &dyn Recipient, tier: Tier, title: &Title) -> Result<(), AudienceError> {
        if let Some(times) = title.times {
            let (fade_in, stay, fade_out) = times.as_ticks();
            deliver(
                self.name(),
                recipient,
                Primitive::TitlePacket(TitlePacket::Times {
                    fade_in,
                    stay,
                    fade_out,
                }),
            )?;
        }
        // The client shows the title on receipt, so the subtitle goes first.
        deliver(
            self.name(),
            recipient,
            Primitive::TitlePacket(TitlePacket::Subtitle(title.subtitle.render(tier))),
        )?;
        deliver(
            self.name(),
            recipient,
            Primitive::TitlePacket(TitlePacket::Title(title.title.render(tier))),
        )
    }
}

impl Handler<TitleAction> for TitleHandler {
    fn name(&self) -> &'static str {
        match self {
            TitleHandler::Native => "title/native",
            TitleHandler::Packets => "title/packets",
        }
    }

    fn is_available(&self, kind: RecipientKind, tier: Tier) -> bool {
        kind == RecipientKind::Player
            && match self {
                TitleHandler::Native => tier >= Tier::Modern,
                TitleHandler::Packets => tier == Tier::Legacy,
            }
    }

    fn apply(&self, recipient: &dyn Recipient, tier: Tier, action: &TitleAction) -> Result<(), AudienceError> {
        self.ensure_available(recipient, tier)?;
        match (self, action) {
            (TitleHandler::Native, TitleAction::Show(title)) => deliver(
                self.name(),
                recipient,
                Primitive::ShowTitle {
                    title: title.title.render(tier),
                    subtitle: title.subtitle.render(tier),
                    times: title.times,
                },
            ),
            (TitleHandler::Native, TitleAction::Clear) => {
                deliver(self.name(), recipient, Primitive::ClearTitle)
            }
            (TitleHandler::Native, TitleAction::Reset) => {
                deliver(self.name(), recipient, Primitive::ResetTitle)
            }
            (TitleHandler::Packets, TitleAction::Show(title)) => {
                self.show_packets(recipient, tier, title)
            }
            (TitleHandler::Packets, TitleAction::Clear) => deliver(
                self.name(),
                recipient,
                Primitive::TitlePacket(TitlePacket::Clear),
            ),
            (TitleHandler::Packets, TitleAction::Reset) => deliver(
                self.name(),
                recipient,
                Primitive::TitlePacket(TitlePacket::Reset),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::HostError;
    use crate::host::memory::MemoryRecipient;
    use crate::host::{RecipientId, ScopeId};
    use crate::payload::TitleTimes;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Accepts a fixed number of primitives, then fails.
    struct Flaky {
        inner: MemoryRecipient,
        remaining: AtomicUsize,
    }

    impl Recipient for Flaky {
        fn id(&self) -> RecipientId {
            self.inner.id()
        }
        fn name(&self) -> &str {
            self.inner.name()
        }
        fn kind(&self) -> RecipientKind {
            self.inner.kind()
        }
        fn has_permission(&self, permission: &str) -> Result<bool, HostError> {
            self.inner.has_permission(permission)
        }
        fn scope(&self) -> Result<Option<ScopeId>, HostError> {
            self.inner.scope()
        }
        fn invoke(&self, primitive: Primitive) -> Result<(), HostError> {
            let left = self
                .remaining
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
            match left {
                Ok(_) => self.inner.invoke(primitive),
                Err(_) => Err(HostError::Unavailable("connection reset".to_string())),
            }
        }
    }

    #[test]
    fn test_native_show() {
        let player = MemoryRecipient::player("alice", "world");
        let title = Title::new("Welcome", "to the server");

        TitleHandler::Native
            .apply(&player, Tier::Modern, &TitleAction::Show(title))
            .unwrap();

        assert_eq!(
            player.received(),
            vec![Primitive::ShowTitle {
                title: json!({"text": "Welcome"}),
                subtitle: json!({"text": "to the server"}),
                times: None,
            }]
        );
    }

    #[test]
    fn test_packet_sequence() {
        let player = MemoryRecipient::player("alice", "world");
        let title = Title::new("Round 2", "Fight!").with_times(TitleTimes::default());

        TitleHandler::Packets
            .apply(&player, Tier::Legacy, &TitleAction::Show(title))
            .unwrap();
        TitleHandler::Packets
            .apply(&player, Tier::Legacy, &TitleAction::Reset)
            .unwrap();

        assert_eq!(
            player.received(),
            vec![
                Primitive::TitlePacket(TitlePacket::Times {
                    fade_in: 10,
                    stay: 70,
                    fade_out: 20
                }),
                Primitive::TitlePacket(TitlePacket::Subtitle(json!({"text": "Fight!"}))),
                Primitive::TitlePacket(TitlePacket::Title(json!({"text": "Round 2"}))),
                Primitive::TitlePacket(TitlePacket::Reset),
            ]
        );
    }

    #[test]
    fn test_packets_stop_at_first_rejection() {
        let player = MemoryRecipient::player("alice", "world");
        player.reject("title_packet");

        let err = TitleHandler::Packets.apply(&player, Tier::Legacy, &TitleAction::Clear);
        assert!(matches!(err, Err(AudienceError::UnsupportedOperation { .. })));
        assert_eq!(player.received_count(), 0);
    }

    #[test]
    fn test_cut_sequence_never_shows_title() {
        let title = Title::new("Round 2", "Fight!").with_times(TitleTimes::default());
        for accepted in 0..3 {
            let player = Flaky {
                inner: MemoryRecipient::player("alice", "world"),
                remaining: AtomicUsize::new(accepted),
            };

            let result = TitleHandler::Packets.apply(&player, Tier::Legacy, &TitleAction::Show(title.clone()));

            assert!(matches!(result, Err(AudienceError::HostLookup(_))));
            let received = player.inner.received();
            assert_eq!(received.len(), accepted);
            assert!(!received
                .iter()
                .any(|p| matches!(p, Primitive::TitlePacket(TitlePacket::Title(_)))));
        }
    }
}
