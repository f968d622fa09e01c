//! Fire-and-forget actions triggered by a verdict.
//!
//! An accepted stroke places a call, a rejected one plays an alert. The
//! machine spawns each trigger on its own task and only logs a failure.

mod audio;
mod call;

pub use audio::SoundCommand;
pub use call::QuickCall;

use crate::error::effects::EffectError;
use crate::session::Session;

use std::future::Future;
use std::sync::Arc;

pub trait CallPlacement: Send + Sync + 'static {
    fn place_call(&self, session: Session) -> impl Future<Output = Result<(), EffectError>> + Send;
}

pub trait AudioAlert: Send + Sync + 'static {
    fn play_alert(&self) -> impl Future<Output = Result<(), EffectError>> + Send;
}

/// The two triggers the machine is wired with.
pub struct SideEffects<C, A> {
    pub calls: Arc<C>,
    pub alerts: Arc<A>,
}

impl<C, A> SideEffects<C, A>
where
    C: CallPlacement,
    A: AudioAlert,
{
    pub fn new(calls: C, alerts: A) -> Self {
        Self {
            calls: Arc::new(calls),
            alerts: Arc::new(alerts),
        }
    }
}
