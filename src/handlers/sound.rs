//! Sound strategies.

use super::{deliver, Handler};
use crate::capabilities::Tier;
use crate::errors::AudienceError;
use crate::host::{Primitive, Recipient, RecipientKind};
use crate::payload::Sound;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundHandler {
    /// Play with the sound's category, so client volume sliders apply.
    WithCategory,
    /// Play without a category; the host picks its default.
    NoCategory,
}

impl Handler<Sound> for SoundHandler {
    fn name(&self) -> &'static str {
        match self {
            SoundHandler::WithCategory => "sound/with_category",
            SoundHandler::NoCategory => "sound/no_category",
        }
    }

    fn is_available(&self, kind: RecipientKind, tier: Tier) -> bool {
        kind == RecipientKind::Player
            && match self {
                SoundHandler::WithCategory => tier >= Tier::Modern,
                SoundHandler::NoCategory => true,
            }
    }

    fn apply(&self, recipient: &dyn Recipient, tier: Tier, sound: &Sound) -> Result<(), AudienceError> {
        self.ensure_available(recipient, tier)?;
        let source = match self {
            SoundHandler::WithCategory => Some(sound.source),
            SoundHandler::NoCategory => None,
        };
        deliver(
            self.name(),
            recipient,
            Primitive::PlaySound {
                key: sound.key().to_string(),
                source,
                volume: sound.volume(),
                pitch: sound.pitch(),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::memory::MemoryRecipient;
    use crate::payload::SoundSource;

    #[test]
    fn test_category_dropped_on_fallback() {
        let player = MemoryRecipient::player("alice", "world");
        let sound = Sound::new("block.note_block.bell", SoundSource::Record, 0.8, 1.2).unwrap();

        SoundHandler::WithCategory.apply(&player, Tier::Modern, &sound).unwrap();
        SoundHandler::NoCategory.apply(&player, Tier::Legacy, &sound).unwrap();

        let received = player.received();
        assert!(matches!(
            &received[0],
            Primitive::PlaySound { source: Some(SoundSource::Record), key, .. }
                if key == "minecraft:block.note_block.bell"
        ));
        assert!(matches!(&received[1], Primitive::PlaySound { source: None, .. }));
    }
}
