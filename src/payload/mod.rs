//! Output payloads.
//!
//! The component format itself belongs to the caller: a [`Message`] is an
//! opaque JSON text component. The other payloads bundle components with
//! the few typed fields each operation needs.

pub mod color;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::capabilities::Tier;
use crate::errors::AudienceError;

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A pre-built JSON text component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Message(Value);

impl Message {
    /// A plain text component.
    pub fn text(text: impl Into<String>) -> Self {
        let text: String = text.into();
        Self(json!({ "text": text }))
    }

    /// Wrap an already-built component.
    pub fn from_json(component: Value) -> Self {
        Self(component)
    }

    pub fn as_json(&self) -> &Value {
        &self.0
    }

    /// The component as the given host tier can display it.
    ///
    /// Legacy hosts get RGB colours downsampled to the named palette.
    pub fn render(&self, tier: Tier) -> Value {
        let mut rendered = self.0.clone();
        if tier < Tier::Modern {
            color::downsample(&mut rendered);
        }
        rendered
    }

    /// The concatenated text content, for recipients without component support.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        flatten(&self.0, &mut out);
        out
    }

    pub fn is_empty(&self) -> bool {
        self.plain_text().is_empty()
    }
}

impl From<&str> for Message {
    fn from(text: &str) -> Self {
        Self::text(text)
    }
}

impl From<String> for Message {
    fn from(text: String) -> Self {
        Self::text(text)
    }
}

fn flatten(component: &Value, out: &mut String) {
    match component {
        Value::String(text) => out.push_str(text),
        Value::Array(children) => children.iter().for_each(|child| flatten(child, out)),
        Value::Object(map) => {
            if let Some(text) = map.get("text").and_then(Value::as_str) {
                out.push_str(text);
            } else if let Some(key) = map.get("translate").and_then(Value::as_str) {
                out.push_str(key);
            }
            if let Some(extra) = map.get("extra") {
                flatten(extra, out);
            }
        }
        _ => {}
    }
}

// ---------------------------------------------------------------------------
// Title (banner)
// ---------------------------------------------------------------------------

/// Fade timings for a title. One game tick is 50ms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleTimes {
    pub fade_in: Duration,
    pub stay: Duration,
    pub fade_out: Duration,
}

impl TitleTimes {
    pub const TICK: Duration = Duration::from_millis(50);

    pub fn new(fade_in: Duration, stay: Duration, fade_out: Duration) -> Self {
        Self {
            fade_in,
            stay,
            fade_out,
        }
    }

    /// `(fade_in, stay, fade_out)` in ticks, as legacy title packets expect.
    /// Durations too long for a `u32` saturate.
    pub fn as_ticks(&self) -> (u32, u32, u32) {
        let ticks = |d: Duration| {
            u32::try_from(d.as_millis() / Self::TICK.as_millis()).unwrap_or(u32::MAX)
        };
        (ticks(self.fade_in), ticks(self.stay), ticks(self.fade_out))
    }
}

impl Default for TitleTimes {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(500),
            Duration::from_millis(3500),
            Duration::from_millis(1000),
        )
    }
}

/// A title with subtitle and optional custom timings.
#[derive(Debug, Clone, PartialEq)]
pub struct Title {
    pub title: Message,
    pub subtitle: Message,
    pub times: Option<TitleTimes>,
}

impl Title {
    pub fn new(title: impl Into<Message>, subtitle: impl Into<Message>) -> Self {
        Self {
            title: title.into(),
            subtitle: subtitle.into(),
            times: None,
        }
    }

    pub fn with_times(mut self, times: TitleTimes) -> Self {
        self.times = Some(times);
        self
    }
}

/// What to do with the banner slot.
#[derive(Debug, Clone, PartialEq)]
pub enum TitleAction {
    Show(Title),
    /// Hide the current title, keeping timings.
    Clear,
    /// Hide the current title and restore default timings.
    Reset,
}

// ---------------------------------------------------------------------------
// Boss bar (status indicator)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BossBarColor {
    Pink,
    Blue,
    Red,
    Green,
    Yellow,
    Purple,
    White,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BossBarOverlay {
    Progress,
    Notched6,
    Notched10,
    Notched12,
    Notched20,
}

/// A persistent status bar shown at the top of the screen.
///
/// The id is stable for the life of the value so that a later hide reaches
/// the bar shown earlier.
#[derive(Debug, Clone, PartialEq)]
pub struct BossBar {
    id: Uuid,
    pub name: Message,
    progress: f32,
    pub color: BossBarColor,
    pub overlay: BossBarOverlay,
}

impl BossBar {
    /// Create a bar. `progress` must lie in `0.0..=1.0`.
    pub fn new(
        name: impl Into<Message>,
        progress: f32,
        color: BossBarColor,
        overlay: BossBarOverlay,
    ) -> Result<Self, AudienceError> {
        check_progress(progress)?;
        Ok(Self {
            id: Uuid::new_v4(),
            name: name.into(),
            progress,
            color,
            overlay,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn set_progress(&mut self, progress: f32) -> Result<(), AudienceError> {
        check_progress(progress)?;
        self.progress = progress;
        Ok(())
    }
}

fn check_progress(progress: f32) -> Result<(), AudienceError> {
    if (0.0..=1.0).contains(&progress) {
        Ok(())
    } else {
        Err(AudienceError::InvalidArgument(format!(
            "boss bar progress must be within 0.0..=1.0, got {progress}"
        )))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BossBarAction {
    Show(BossBar),
    Hide(BossBar),
}

// ---------------------------------------------------------------------------
// Sound
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundSource {
    Master,
    Music,
    Record,
    Weather,
    Block,
    Hostile,
    Neutral,
    Player,
    Ambient,
    Voice,
}

/// A sound played at the recipient's own location.
#[derive(Debug, Clone, PartialEq)]
pub struct Sound {
    key: String,
    pub source: SoundSource,
    volume: f32,
    pitch: f32,
}

impl Sound {
    /// Create a sound. Un-namespaced keys are placed in `minecraft:`.
    /// Volume and pitch must be finite and not negative.
    pub fn new(
        key: impl Into<String>,
        source: SoundSource,
        volume: f32,
        pitch: f32,
    ) -> Result<Self, AudienceError> {
        let key = key.into();
        let key = key.trim();
        if key.is_empty() {
            return Err(AudienceError::InvalidArgument(
                "sound key must not be empty".to_string(),
            ));
        }
        if !key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || "_-.:/".contains(c))
        {
            return Err(AudienceError::InvalidArgument(format!(
                "invalid sound key `{key}`"
            )));
        }
        check_level("volume", volume)?;
        check_level("pitch", pitch)?;
        let key = if key.contains(':') {
            key.to_string()
        } else {
            format!("minecraft:{key}")
        };

        Ok(Self {
            key,
            source,
            volume,
            pitch,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }
}

fn check_level(what: &str, value: f32) -> Result<(), AudienceError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(AudienceError::InvalidArgument(format!(
            "sound {what} must be finite and not negative, got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_flattens_extra_and_arrays() {
        let message = Message::from_json(json!([
            "Hello, ",
            {"text": "world", "color": "gold", "extra": [{"text": "!"}]},
            {"translate": "chat.type.advancement"}
        ]));
        assert_eq!(message.plain_text(), "Hello, world!chat.type.advancement");
    }

    #[test]
    fn test_render_only_downsamples_on_legacy() {
        let message = Message::from_json(json!({"text": "hi", "color": "#ff5656"}));
        assert_eq!(message.render(Tier::Modern)["color"], "#ff5656");
        assert_eq!(message.render(Tier::Legacy)["color"], "red");
        // The stored component is untouched.
        assert_eq!(message.as_json()["color"], "#ff5656");
    }

    #[test]
    fn test_title_times_ticks() {
        assert_eq!(TitleTimes::default().as_ticks(), (10, 70, 20));

        let long = TitleTimes::new(Duration::MAX, Duration::from_millis(49), Duration::ZERO);
        assert_eq!(long.as_ticks(), (u32::MAX, 0, 0));
    }

    #[test]
    fn test_boss_bar_progress_is_checked() {
        assert!(BossBar::new("raid", 0.5, BossBarColor::Red, BossBarOverlay::Progress).is_ok());
        let err = BossBar::new("raid", 1.5, BossBarColor::Red, BossBarOverlay::Progress);
        assert!(matches!(err, Err(AudienceError::InvalidArgument(_))));
        assert!(BossBar::new("raid", f32::NAN, BossBarColor::Red, BossBarOverlay::Progress).is_err());

        let mut bar = BossBar::new("raid", 0.0, BossBarColor::Red, BossBarOverlay::Notched6).unwrap();
        assert!(bar.set_progress(-0.1).is_err());
        assert_eq!(bar.progress(), 0.0);
    }

    #[test]
    fn test_sound_key_namespacing() {
        let sound = Sound::new("entity.experience_orb.pickup", SoundSource::Player, 1.0, 1.0).unwrap();
        assert_eq!(sound.key(), "minecraft:entity.experience_orb.pickup");

        let custom = Sound::new("myplugin:ding", SoundSource::Master, 1.0, 1.0).unwrap();
        assert_eq!(custom.key(), "myplugin:ding");

        assert!(Sound::new("  ", SoundSource::Master, 1.0, 1.0).is_err());
        assert!(Sound::new("Bad Key", SoundSource::Master, 1.0, 1.0).is_err());
    }

    #[test]
    fn test_sound_levels_are_checked() {
        let quiet = Sound::new("block.note_block.bell", SoundSource::Block, 0.0, 2.0).unwrap();
        assert_eq!((quiet.volume(), quiet.pitch()), (0.0, 2.0));

        for (volume, pitch) in [
            (f32::NAN, 1.0),
            (1.0, f32::NAN),
            (-1.0, 1.0),
            (1.0, -0.5),
            (f32::INFINITY, 1.0),
        ] {
            let result = Sound::new("ui.button.click", SoundSource::Master, volume, pitch);
            assert!(
                matches!(result, Err(AudienceError::InvalidArgument(_))),
                "volume {volume}, pitch {pitch}"
            );
        }
    }
}
