//! Exit codes for podsctl
//!
//! Resolution failures carry their own code via `PodsError::code`:
//! 2 unknown service, 3 missing base file, 4 bad config.

use pods_common::PodsError;

/// Exit code for general errors
pub const EXIT_GENERAL_ERROR: i32 = 1;

pub fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<PodsError>()
        .map(PodsError::code)
        .unwrap_or(EXIT_GENERAL_ERROR)
}
