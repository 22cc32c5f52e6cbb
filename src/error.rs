use std::time::Duration;

use thiserror::Error;

/// Errors surfaced by the supervision helpers.
///
/// The signaller itself never fails; only waiting on a component can.
#[derive(Debug, Error)]
pub enum Error {
    /// The component never reported has-stopped, even after a hard stop.
    #[error("component did not report has-stopped within {waited:?}")]
    StopTimedOut { waited: Duration },
}
