//! Boss bar (status indicator) strategies.

use super::{deliver, Handler};
use crate::capabilities::Tier;
use crate::errors::AudienceError;
use crate::host::{Primitive, Recipient, RecipientKind};
use crate::payload::BossBarAction;

/// Legacy hosts have no boss bar API at all; their chain resolves to the
/// null handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BossBarHandler {
    Native,
}

impl Handler<BossBarAction> for BossBarHandler {
    fn name(&self) -> &'static str {
        "boss_bar/native"
    }

    fn is_available(&self, kind: RecipientKind, tier: Tier) -> bool {
        kind == RecipientKind::Player && tier >= Tier::Modern
    }

    fn apply(&self, recipient: &dyn Recipient, tier: Tier, action: &BossBarAction) -> Result<(), AudienceError> {
        self.ensure_available(recipient, tier)?;
        let primitive = match action {
            BossBarAction::Show(bar) => Primitive::ShowBossBar {
                id: bar.id(),
                name: bar.name.render(tier),
                progress: bar.progress(),
                color: bar.color,
                overlay: bar.overlay,
            },
            BossBarAction::Hide(bar) => Primitive::HideBossBar { id: bar.id() },
        };
        deliver(self.name(), recipient, primitive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::memory::MemoryRecipient;
    use crate::payload::{BossBar, BossBarColor, BossBarOverlay};

    #[test]
    fn test_show_then_hide_same_bar() {
        let player = MemoryRecipient::player("alice", "world");
        let bar = BossBar::new("Ender Dragon", 0.75, BossBarColor::Purple, BossBarOverlay::Progress)
            .unwrap();

        BossBarHandler::Native
            .apply(&player, Tier::Modern, &BossBarAction::Show(bar.clone()))
            .unwrap();
        BossBarHandler::Native
            .apply(&player, Tier::Modern, &BossBarAction::Hide(bar.clone()))
            .unwrap();

        let received = player.received();
        assert_eq!(received.len(), 2);
        assert!(matches!(
            received[0],
            Primitive::ShowBossBar { id, progress, .. } if id == bar.id() && progress == 0.75
        ));
        assert_eq!(received[1], Primitive::HideBossBar { id: bar.id() });
    }

    #[test]
    fn test_not_available_on_legacy() {
        assert!(!BossBarHandler::Native.is_available(RecipientKind::Player, Tier::Legacy));
        assert!(!BossBarHandler::Native.is_available(RecipientKind::Console, Tier::Modern));
    }
}
