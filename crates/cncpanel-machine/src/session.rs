//! Panel session loop

use crate::controller::MachineController;
use cncpanel_core::{Mode, Presentation, Result};
use std::thread;
use std::time::Duration;

/// Why a session ended normally
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// The presentation was closed by the user
    PresentationClosed,
    /// The companion application exited
    CompanionExited,
}

/// Enter `mode`, then poll and publish until the presentation closes or the
/// companion exits
///
/// The controller is shut down on every exit path, including errors.
pub fn run(
    controller: &mut MachineController,
    mode: Mode,
    presentation: &mut dyn Presentation,
    poll_interval: Duration,
) -> Result<ExitReason> {
    let result = match controller.enter_mode(mode) {
        Ok(()) => run_loop(controller, presentation, poll_interval),
        Err(e) => Err(e),
    };

    match &result {
        Ok(reason) => tracing::info!("Session ended: {:?}", reason),
        Err(e) => tracing::error!("Session failed: {}", e),
    }
    if let Err(e) = controller.shutdown() {
        tracing::warn!("Shutdown incomplete: {}", e);
    }
    result
}

fn run_loop(
    controller: &mut MachineController,
    presentation: &mut dyn Presentation,
    poll_interval: Duration,
) -> Result<ExitReason> {
    loop {
        if !presentation.is_open() {
            return Ok(ExitReason::PresentationClosed);
        }
        if controller.companion_exited()? {
            return Ok(ExitReason::CompanionExited);
        }

        controller.poll()?;
        controller.publish(presentation);
        for intent in presentation.take_intents() {
            controller.apply(intent)?;
        }

        thread::sleep(poll_interval);
    }
}
