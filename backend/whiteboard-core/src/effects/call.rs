use crate::crossbar::CrossbarClient;
use crate::effects::CallPlacement;
use crate::error::effects::EffectError;
use crate::session::Session;

use log::info;

/// Places a crossbar quick call to a fixed extension.
#[derive(Clone)]
pub struct QuickCall {
    client: CrossbarClient,
    extension: String,
}

impl QuickCall {
    pub fn new(client: CrossbarClient, extension: impl Into<String>) -> Self {
        Self {
            client,
            extension: extension.into(),
        }
    }
}

impl CallPlacement for QuickCall {
    async fn place_call(&self, session: Session) -> Result<(), EffectError> {
        let call_info = self.client.quickcall(&session, &self.extension).await?;
        info!("Call placed to {}: {call_info}", self.extension);
        Ok(())
    }
}
