use humantime::format_duration;
use tracing::{debug, info, warn};

use crate::config::StopConfig;
use crate::error::Error;
use crate::signaller::Signaller;

/// How a component reached has-stopped under [`stop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// Stopped after the soft stop, or had already stopped on its own.
    Graceful,
    /// Needed the hard stop.
    Forced,
}

/// Drives one component through the shutdown tiers.
///
/// Triggers a soft stop and waits up to `soft-stop-timeout` for has-stopped.
/// If the component is still running it escalates to a hard stop and waits
/// up to `hard-stop-timeout` more. A component that already reported
/// has-stopped is left alone.
pub async fn stop(signaller: &Signaller, config: &StopConfig) -> Result<StopOutcome, Error> {
    let stopped = signaller.has_stopped_handle();
    if stopped.is_signalled() {
        debug!("component already stopped; nothing to signal");
        return Ok(StopOutcome::Graceful);
    }

    info!(
        timeout = %format_duration(config.soft_stop_timeout),
        "requesting soft stop"
    );
    signaller.trigger_soft_stop();
    if stopped.wait_timeout(config.soft_stop_timeout).await {
        info!("component stopped gracefully");
        return Ok(StopOutcome::Graceful);
    }

    warn!(
        timeout = %format_duration(config.hard_stop_timeout),
        "component still running after soft stop; escalating to hard stop"
    );
    signaller.trigger_hard_stop();
    if stopped.wait_timeout(config.hard_stop_timeout).await {
        info!("component stopped after hard stop");
        return Ok(StopOutcome::Forced);
    }

    Err(Error::StopTimedOut {
        waited: config.total_timeout(),
    })
}
