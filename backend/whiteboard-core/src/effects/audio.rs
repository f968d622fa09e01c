use crate::effects::AudioAlert;
use crate::error::effects::EffectError;

use common::ErrorLocation;

use std::panic::Location;

use log::{debug, warn};
use tokio::process::Command;

/// Plays the rejection sound by running an external player,
/// e.g. `paplay /usr/share/whiteboard/fail.wav`.
#[derive(Debug, Clone, Default)]
pub struct SoundCommand {
    program: Option<String>,
    args: Vec<String>,
}

impl SoundCommand {
    pub fn new(program: Option<String>, args: Vec<String>) -> Self {
        Self { program, args }
    }
}

impl AudioAlert for SoundCommand {
    async fn play_alert(&self) -> Result<(), EffectError> {
        let Some(program) = &self.program else {
            warn!("Rejected stroke: no alert player configured");
            return Ok(());
        };

        debug!("Playing alert with {program} {:?}", self.args);
        let status = Command::new(program).args(&self.args).status().await?;

        if !status.success() {
            return Err(EffectError::AlertPlayer {
                message: format!("{program} exited with {status}"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(())
    }
}
