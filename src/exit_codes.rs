//! Exit code constants for the dibs CLI.
//!
//! - 0: Success
//! - 1: Any handled error (validation, conflict, transport, no candidate)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// Handled failure: bad input, lock conflict, transport failure, or nothing to claim.
pub const FAILURE: i32 = 1;
