//! # Audiences
//!
//! An [`Audience`] is anything output can be sent to: a single recipient, a
//! group whose membership is recomputed on every call, a fixed combination
//! of other audiences, or nobody at all.
//!
//! Every audience implements one method, [`Audience::dispatch`]; the
//! per-operation helpers (`send_message`, `show_title`, ...) are provided on
//! top of it. Dispatch never fails: an operation the target cannot perform
//! is dropped, and a panic raised by the host while delivering is caught and
//! logged at the audience that made the host call.

pub mod composite;
pub mod recipient;

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use crate::handlers::Category;
use crate::payload::{BossBar, BossBarAction, Message, Sound, Title, TitleAction};

pub use composite::{CompositeAudience, DeliveryReport, MemberFilter};
pub use recipient::{AudienceFactory, RecipientAudience};

// ---------------------------------------------------------------------------
// Operation
// ---------------------------------------------------------------------------

/// One output operation with its payload.
#[derive(Debug, Clone, Copy)]
pub enum Operation<'a> {
    Message(&'a Message),
    ActionBar(&'a Message),
    Title(&'a TitleAction),
    BossBar(&'a BossBarAction),
    Sound(&'a Sound),
}

impl Operation<'_> {
    pub fn category(&self) -> Category {
        match self {
            Operation::Message(_) => Category::Message,
            Operation::ActionBar(_) => Category::ActionBar,
            Operation::Title(_) => Category::Banner,
            Operation::BossBar(_) => Category::StatusIndicator,
            Operation::Sound(_) => Category::Sound,
        }
    }
}

// ---------------------------------------------------------------------------
// Audience
// ---------------------------------------------------------------------------

/// A target for output operations.
pub trait Audience: Send + Sync {
    /// Perform `operation` on every recipient this audience currently covers.
    fn dispatch(&self, operation: Operation<'_>);

    fn send_message(&self, message: &Message) {
        self.dispatch(Operation::Message(message));
    }

    fn send_action_bar(&self, message: &Message) {
        self.dispatch(Operation::ActionBar(message));
    }

    fn show_title(&self, title: &Title) {
        self.dispatch(Operation::Title(&TitleAction::Show(title.clone())));
    }

    fn clear_title(&self) {
        self.dispatch(Operation::Title(&TitleAction::Clear));
    }

    fn reset_title(&self) {
        self.dispatch(Operation::Title(&TitleAction::Reset));
    }

    fn show_boss_bar(&self, bar: &BossBar) {
        self.dispatch(Operation::BossBar(&BossBarAction::Show(bar.clone())));
    }

    fn hide_boss_bar(&self, bar: &BossBar) {
        self.dispatch(Operation::BossBar(&BossBarAction::Hide(bar.clone())));
    }

    fn play_sound(&self, sound: &Sound) {
        self.dispatch(Operation::Sound(sound));
    }
}

/// The audience of nobody. Every operation is a no-op.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyAudience;

impl EmptyAudience {
    pub fn shared() -> Arc<dyn Audience> {
        Arc::new(EmptyAudience)
    }
}

impl Audience for EmptyAudience {
    fn dispatch(&self, _operation: Operation<'_>) {}
}

/// Forwards every operation to a fixed list of audiences, in order.
#[derive(Clone, Default)]
pub struct MultiAudience {
    audiences: Vec<Arc<dyn Audience>>,
}

impl MultiAudience {
    pub fn new(audiences: Vec<Arc<dyn Audience>>) -> Self {
        Self { audiences }
    }

    pub fn len(&self) -> usize {
        self.audiences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.audiences.is_empty()
    }
}

impl Audience for MultiAudience {
    fn dispatch(&self, operation: Operation<'_>) {
        for (index, audience) in self.audiences.iter().enumerate() {
            guarded(operation, || format!("audience #{index}"), || audience.dispatch(operation));
        }
    }
}

/// Run one delivery, containing a panic.
///
/// Returns `None` when `deliver` panicked; the panic is logged against the
/// label produced by `target`.
pub(crate) fn guarded<T>(
    operation: Operation<'_>,
    target: impl FnOnce() -> String,
    deliver: impl FnOnce() -> T,
) -> Option<T> {
    match catch_unwind(AssertUnwindSafe(deliver)) {
        Ok(value) => Some(value),
        Err(payload) => {
            log::warn!(
                "Delivery of {} to {} panicked: {}",
                operation.category(),
                target(),
                panic_message(payload.as_ref())
            );
            None
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
