//! The handler table: one chain per category, built once at startup.

use std::sync::Arc;

use super::{
    ActionBarHandler, Binding, BossBarHandler, Category, ChatHandler, Handler, HandlerChain,
    SoundHandler, TitleHandler,
};
use crate::capabilities::Tier;
use crate::host::RecipientKind;
use crate::payload::{BossBarAction, Message, Sound, TitleAction};

/// Read-only table of handler chains.
///
/// Built before the platform starts serving audiences and shared behind an
/// `Arc`; the `with_*` builders consume the table, so there is no way to
/// change a chain once it is in use.
#[derive(Debug)]
pub struct Handlers {
    message: HandlerChain<Message>,
    action_bar: HandlerChain<Message>,
    title: HandlerChain<TitleAction>,
    boss_bar: HandlerChain<BossBarAction>,
    sound: HandlerChain<Sound>,
}

impl Handlers {
    /// The built-in chains.
    pub fn standard() -> Self {
        let message: Vec<Arc<dyn Handler<Message>>> =
            vec![Arc::new(ChatHandler::Component), Arc::new(ChatHandler::Plain)];
        let action_bar: Vec<Arc<dyn Handler<Message>>> = vec![
            Arc::new(ActionBarHandler::Native),
            Arc::new(ActionBarHandler::ChatPacket),
        ];
        let title: Vec<Arc<dyn Handler<TitleAction>>> =
            vec![Arc::new(TitleHandler::Native), Arc::new(TitleHandler::Packets)];
        let boss_bar: Vec<Arc<dyn Handler<BossBarAction>>> = vec![Arc::new(BossBarHandler::Native)];
        let sound: Vec<Arc<dyn Handler<Sound>>> = vec![
            Arc::new(SoundHandler::WithCategory),
            Arc::new(SoundHandler::NoCategory),
        ];

        Self {
            message: HandlerChain::new(Category::Message, message),
            action_bar: HandlerChain::new(Category::ActionBar, action_bar),
            title: HandlerChain::new(Category::Banner, title),
            boss_bar: HandlerChain::new(Category::StatusIndicator, boss_bar),
            sound: HandlerChain::new(Category::Sound, sound),
        }
    }

    /// Turn resolution caching on or off for every chain.
    pub fn with_cache(self, enabled: bool) -> Self {
        Self {
            message: self.message.with_cache(enabled),
            action_bar: self.action_bar.with_cache(enabled),
            title: self.title.with_cache(enabled),
            boss_bar: self.boss_bar.with_cache(enabled),
            sound: self.sound.with_cache(enabled),
        }
    }

    pub fn with_message(mut self, chain: HandlerChain<Message>) -> Self {
        self.message = chain;
        self
    }

    pub fn with_action_bar(mut self, chain: HandlerChain<Message>) -> Self {
        self.action_bar = chain;
        self
    }

    pub fn with_title(mut self, chain: HandlerChain<TitleAction>) -> Self {
        self.title = chain;
        self
    }

    pub fn with_boss_bar(mut self, chain: HandlerChain<BossBarAction>) -> Self {
        self.boss_bar = chain;
        self
    }

    pub fn with_sound(mut self, chain: HandlerChain<Sound>) -> Self {
        self.sound = chain;
        self
    }

    pub fn message(&self) -> &HandlerChain<Message> {
        &self.message
    }

    pub fn action_bar(&self) -> &HandlerChain<Message> {
        &self.action_bar
    }

    pub fn title(&self) -> &HandlerChain<TitleAction> {
        &self.title
    }

    pub fn boss_bar(&self) -> &HandlerChain<BossBarAction> {
        &self.boss_bar
    }

    pub fn sound(&self) -> &HandlerChain<Sound> {
        &self.sound
    }

    /// Resolve every category for one recipient kind on one tier.
    pub fn bind(&self, kind: RecipientKind, tier: Tier) -> Bindings {
        Bindings {
            message: bind_chain(&self.message, kind, tier),
            action_bar: bind_chain(&self.action_bar, kind, tier),
            title: bind_chain(&self.title, kind, tier),
            boss_bar: bind_chain(&self.boss_bar, kind, tier),
            sound: bind_chain(&self.sound, kind, tier),
        }
    }
}

impl Default for Handlers {
    fn default() -> Self {
        Self::standard()
    }
}

fn bind_chain<P: 'static>(chain: &HandlerChain<P>, kind: RecipientKind, tier: Tier) -> Binding<P> {
    if chain.category().supported_by(kind) {
        Binding::Resolved(chain.resolve(kind, tier))
    } else {
        Binding::Unsupported
    }
}

/// The resolved handler for each category, for one recipient.
#[derive(Debug, Clone)]
pub struct Bindings {
    pub message: Binding<Message>,
    pub action_bar: Binding<Message>,
    pub title: Binding<TitleAction>,
    pub boss_bar: Binding<BossBarAction>,
    pub sound: Binding<Sound>,
}

impl Bindings {
    /// Handler names per category, `None` where unsupported.
    pub fn summary(&self) -> Vec<(Category, Option<&'static str>)> {
        vec![
            (Category::Message, self.message.handler_name()),
            (Category::ActionBar, self.action_bar.handler_name()),
            (Category::Banner, self.title.handler_name()),
            (Category::StatusIndicator, self.boss_bar.handler_name()),
            (Category::Sound, self.sound.handler_name()),
        ]
    }
}
