//! Two-tier shutdown signalling for long-running components.
//!
//! A [`Signaller`] is owned by one component and shared with whoever needs to
//! ask it to stop (soft or hard) or to learn that it has stopped. Each signal
//! is a one-shot broadcast that can be queried, awaited through a
//! [`WaitHandle`], or folded into a caller's [`CancellationToken`].
//!
//! [`CancellationToken`]: tokio_util::sync::CancellationToken

pub mod config;
pub mod error;
mod flag;
pub mod signaller;
pub mod supervise;

pub use config::StopConfig;
pub use error::Error;
pub use flag::WaitHandle;
pub use signaller::{Release, Signaller};
pub use supervise::{StopOutcome, stop};
