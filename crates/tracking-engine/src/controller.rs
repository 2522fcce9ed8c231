//! Runs a [`TrackingLoop`] on its own thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use kickbot_common::error::{KickbotError, KickbotResult};

use crate::shared::TrackingShared;
use crate::tracking_loop::TrackingLoop;

const THREAD_NAME: &str = "kickbot-tracking";

/// Handle to a tracking loop running in the background.
///
/// Dropping the controller stops the loop and waits for the thread.
pub struct TrackingController {
    shared: Arc<TrackingShared>,
    stop_flag: Arc<AtomicBool>,
    handle: Option<JoinHandle<KickbotResult<u64>>>,
}

impl TrackingController {
    /// Move `tracking` onto a dedicated thread and start it.
    ///
    /// The loop idles until the shared run flag is set.
    pub fn spawn(mut tracking: TrackingLoop) -> KickbotResult<Self> {
        let shared = tracking.shared();
        let stop_flag = tracking.stop_flag();

        let handle = std::thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || tracking.run())?;
        tracing::info!("Tracking thread started");

        Ok(Self {
            shared,
            stop_flag,
            handle: Some(handle),
        })
    }

    /// Shared controls and published results.
    pub fn shared(&self) -> Arc<TrackingShared> {
        self.shared.clone()
    }

    /// Get the stop flag for external coordination.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop_flag.clone()
    }

    /// Whether the loop has exited, on its own or after a stop.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Signal the loop to stop after its current cycle and wait for it.
    ///
    /// Returns the number of cycles run, or the error that ended the loop.
    pub fn stop(mut self) -> KickbotResult<u64> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> KickbotResult<u64> {
        self.stop_flag.store(true, Ordering::SeqCst);
        let Some(handle) = self.handle.take() else {
            return Ok(0);
        };
        match handle.join() {
            Ok(result) => result,
            Err(panic) => {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                Err(KickbotError::thread(format!(
                    "tracking thread panicked: {message}"
                )))
            }
        }
    }
}

impl Drop for TrackingController {
    fn drop(&mut self) {
        if self.handle.is_some() {
            if let Err(e) = self.shutdown() {
                tracing::warn!(error = %e, "Tracking thread exited with error");
            }
        }
    }
}
