//! Ctrl-C handling for exports
//!
//! SIGINT flips the export's cancel token instead of killing the process,
//! so an in-flight atomic write still finishes or cleans up its temp file.
//! The export manager polls the token between stages.

use anyhow::Result;
use chemscreen_core::export::CancelToken;
use std::fmt;
use tracing::debug;

/// Unix exit code for SIGINT (128 + 2)
pub(crate) const SIGINT_EXIT_CODE: i32 = 130;

/// Marker error for a user-cancelled export
#[derive(Debug, Clone, Copy)]
pub(crate) struct Cancelled;

impl fmt::Display for Cancelled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "export cancelled")
    }
}

impl std::error::Error for Cancelled {}

/// True if the error chain ends in a user cancellation
pub(crate) fn is_cancelled_error(err: &anyhow::Error) -> bool {
    err.is::<Cancelled>()
}

/// Route Ctrl-C to `token`
pub(crate) fn install_handler(token: &CancelToken) -> Result<()> {
    let token = token.clone();
    ctrlc::set_handler(move || {
        debug!("Received Ctrl-C, cancelling export");
        token.cancel();
    })?;
    Ok(())
}

/// Exit code for a failed command
pub(crate) fn exit_code(err: &anyhow::Error) -> i32 {
    if is_cancelled_error(err) {
        SIGINT_EXIT_CODE
    } else {
        1
    }
}
